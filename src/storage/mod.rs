mod store;

pub use store::ParameterStore;

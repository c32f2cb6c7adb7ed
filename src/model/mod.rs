mod factorization;
mod init;
mod layout;
mod scale;
mod view;

pub use factorization::MatrixFactorization;
pub use init::FactorInit;
pub use layout::{MAX_PARAMS, ModelShape, ParameterLayout};
pub use scale::{PREDICTION_RANGE, RatingScale};
pub use view::FactorizationView;

use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The specific result type for fetching the raw tables of a dataset.
pub type Result<T> = std::result::Result<T, DataErr>;

/// Error returned by a `DataSource` whenever a table can't be fetched or holds no usable rows.
///
/// It never leaves the loader, which recovers by substituting the embedded tables.
#[derive(Debug)]
pub enum DataErr {
    Io(io::Error),
    Http(reqwest::Error),
    Status { url: String, status: u16 },
    Empty { table: &'static str },
    Invalid { table: &'static str, reason: String },
}

impl Display for DataErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataErr::Io(e) => write!(f, "io error: {e}"),
            DataErr::Http(e) => write!(f, "http error: {e}"),
            DataErr::Status { url, status } => {
                write!(f, "request to {url} failed with status {status}")
            }
            DataErr::Empty { table } => write!(f, "the {table} table has no valid rows"),
            DataErr::Invalid { table, reason } => write!(f, "the {table} table is unusable: {reason}"),
        }
    }
}

impl Error for DataErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DataErr::Io(e) => Some(e),
            DataErr::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DataErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<reqwest::Error> for DataErr {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

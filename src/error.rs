use std::{
    error::Error,
    fmt::{Display, Formatter},
};

/// Result type used throughout the crate.
pub type ClimoResult<T> = Result<T, Box<dyn Error>>;

/// A period type, date, or configuration value the pipeline cannot work with.
#[derive(Debug, Clone, Copy)]
pub struct ConfigError {
    pub msg: &'static str,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.msg)
    }
}

impl Error for ConfigError {}

/// The storage collaborator could not answer a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub msg: String,
}

impl QueryError {
    pub fn new<S: Into<String>>(msg: S) -> Self {
        QueryError { msg: msg.into() }
    }
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "query failed: {}", self.msg)
    }
}

impl Error for QueryError {}

impl From<rusqlite::Error> for QueryError {
    fn from(err: rusqlite::Error) -> Self {
        QueryError {
            msg: err.to_string(),
        }
    }
}

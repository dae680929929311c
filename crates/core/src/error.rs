use std::result::Result as StdResult;

use thiserror::Error;

/// Errors raised while building or validating domain values.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, Error>;

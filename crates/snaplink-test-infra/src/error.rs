use std::result::Result as StdResult;
use thiserror::Error;

/// Errors that can occur when working with test infrastructure containers.
#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("Container error: {0}")]
    Container(#[from] testcontainers::TestcontainersError),
    #[error("MySQL not ready after {attempts} attempts: {last_error}")]
    NotReady { attempts: u32, last_error: String },
}

pub type Result<T> = StdResult<T, TestInfraError>;

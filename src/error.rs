use std::fmt;
use thiserror::Error;

/// Anything that stops a deal check from reaching a status.
#[derive(Debug, Error)]
pub enum DealError {
    #[error("{0}")]
    Evaluation(String),
}

impl From<anyhow::Error> for DealError {
    fn from(e: anyhow::Error) -> Self {
        // `{:#}` keeps the whole context chain on one line
        DealError::Evaluation(format!("{:#}", e))
    }
}

/// Render a check result the way it is printed: the status itself, or
/// `Error: <message>`.
pub fn render<T: fmt::Display, E: fmt::Display>(result: &Result<T, E>) -> String {
    match result {
        Ok(status) => status.to_string(),
        Err(e) => format!("Error: {}", e),
    }
}

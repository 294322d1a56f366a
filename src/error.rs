use reqwest::StatusCode;
use thiserror::Error;

pub type EtlResult<T> = Result<T, EtlError>;

#[derive(Debug, Error)]
pub enum EtlError {
    /// The marketplace answered with anything other than `200 OK`.
    #[error("failed to fetch data: {status}")]
    Extraction { status: StatusCode },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transformation failed: {0}")]
    Transformation(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("invalid rows: {0}")]
    InvalidRows(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Schema alterations that conflict with the table as it currently exists.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("column {column} already exists on table {table}")]
    DuplicateColumn { table: String, column: String },

    #[error("column {column} does not exist on table {table}")]
    MissingColumn { table: String, column: String },

    #[error("table {0} does not exist")]
    MissingTable(String),
}

impl EtlError {
    /// HTTP status of a failed extraction, if that is what this error is.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            EtlError::Extraction { status } => Some(*status),
            EtlError::Http(e) => e.status(),
            _ => None,
        }
    }
}

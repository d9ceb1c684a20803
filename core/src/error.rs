use crate::types::EntityId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    Export(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: EntityId },

    #[error("{entity} with {field} '{value}' already exists")]
    Duplicate {
        entity: &'static str,
        field:  &'static str,
        value:  String,
    },

    #[error("Rule violation: {0}")]
    Rule(String),

    #[error("Invalid value '{value}' for {field}")]
    InvalidValue { field: &'static str, value: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeskError {
    pub fn not_found(entity: &'static str, id: EntityId) -> Self {
        DeskError::NotFound { entity, id }
    }

    pub fn rule(msg: impl Into<String>) -> Self {
        DeskError::Rule(msg.into())
    }
}

pub type DeskResult<T> = Result<T, DeskError>;

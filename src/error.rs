use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No cast table entry matches the store type.
    #[error("Cannot cast from type '{store_type}'")]
    UnsupportedCast { store_type: String },

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// A node arrived without a piece it cannot be emitted without.
    #[error("{node} expression is missing its {field}")]
    MissingSubExpression {
        node: &'static str,
        field: &'static str,
    },

    #[error("Invalid server version: '{0}'")]
    InvalidServerVersion(String),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

/// Raised when input data fails schema conformance. Every variant names
/// the offending field or operator.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("expected an object")]
    NotAnObject,

    #[error("field `{0}` is not allowed")]
    UnknownField(String),

    #[error("required field `{0}` is missing")]
    MissingField(&'static str),

    #[error("field `{field}` must be of type {expected}")]
    InvalidType {
        field: String,
        expected: &'static str,
    },

    #[error("operator `{operator}` is not allowed on `{field}`")]
    UnknownOperator { field: String, operator: String },

    #[error("operator `{operator}` on `{field}` has an invalid operand")]
    InvalidOperand { field: String, operator: String },
}

/// Failure of a resolution operation: either the input did not validate,
/// or a collaborator (password hashing) failed.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("password hashing failed")]
    Hash(#[source] anyhow::Error),

    #[error("resolved record has an unexpected shape")]
    Shape(#[source] serde_json::Error),
}

//! Error types for the filter model.

use thiserror::Error;

/// Errors raised while building or validating filters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// More than one of `all`/`some`/`none`/`any` is set on one collection node.
    #[error("collection filter at '{path}' sets more than one quantifier ({keys})")]
    AmbiguousQuantifier { path: String, keys: String },

    /// A temporal value could not be read as an ISO-8601 date or date-time.
    #[error("invalid date/time value '{value}': expected an ISO-8601 date or date-time")]
    InvalidDateTime { value: String },

    /// An ordering names a field the entity does not have.
    #[error("unknown field '{name}'")]
    UnknownField { name: String },

    #[error("invalid sort direction '{value}': expected ASC or DESC")]
    InvalidDirection { value: String },
}

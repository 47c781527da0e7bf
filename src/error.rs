//! Error types for sqlbind.

use thiserror::Error;

/// The main error type for sqlbind operations.
#[derive(Debug, Error)]
pub enum BindError {
    /// A getter or setter was requested for a property the type does not expose.
    #[error("There is no {access} for property named '{property}' in '{type_name}'")]
    NoSuchProperty {
        access: &'static str,
        property: String,
        type_name: String,
    },

    /// The type declares no zero-argument constructor.
    #[error("There is no default constructor for '{0}'")]
    NoDefaultConstructor(String),

    /// Two accessor candidates for one property could not be ordered.
    #[error("Illegal overloaded {access} for property '{property}' in '{type_name}': {detail}")]
    AmbiguousAccessor {
        access: &'static str,
        property: String,
        type_name: String,
        detail: String,
    },

    /// Navigation through an object graph failed.
    #[error("Reflection error: {0}")]
    Reflection(String),

    /// Invalid mapper or statement configuration.
    #[error("Builder error: {0}")]
    Builder(String),

    /// An id was registered twice in a strict collection.
    #[error("{collection} already contains value for {id}")]
    DuplicateId { collection: &'static str, id: String },

    /// An id is missing from a strict collection.
    #[error("{collection} does not contain value for {id}")]
    UnknownId { collection: &'static str, id: String },

    /// A short id resolves to entries of several namespaces.
    #[error(
        "{id} is ambiguous in {collection} (try using the full name including the namespace, or rename one of the entries)"
    )]
    AmbiguousId { collection: &'static str, id: String },

    /// Mapper registration or method binding failed.
    #[error("Binding error: {0}")]
    Binding(String),

    /// A value could not be converted or marshalled.
    #[error("Type error: {0}")]
    Type(String),

    /// `select_one` matched more than one row.
    #[error("Expected one result (or none) to be returned by select_one(), but found: {0}")]
    TooManyResults(usize),

    /// Executor misuse, e.g. working on a closed executor.
    #[error("Executor error: {0}")]
    Executor(String),

    /// Failure reported by the transaction layer.
    #[error("Database error: {0}")]
    Database(String),

    /// Settings or mapper files could not be read.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BindError {
    /// Create a builder error.
    pub fn builder(message: impl Into<String>) -> Self {
        Self::Builder(message.into())
    }

    /// Create a binding error.
    pub fn binding(message: impl Into<String>) -> Self {
        Self::Binding(message.into())
    }

    /// Create a type conversion error.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }

    /// Missing getter for `property` on `type_name`.
    pub fn no_getter(property: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::NoSuchProperty {
            access: "getter",
            property: property.into(),
            type_name: type_name.into(),
        }
    }

    /// Missing setter for `property` on `type_name`.
    pub fn no_setter(property: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::NoSuchProperty {
            access: "setter",
            property: property.into(),
            type_name: type_name.into(),
        }
    }
}

/// Result type alias for sqlbind operations.
pub type BindResult<T> = Result<T, BindError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BindError::no_getter("missingProp", "Widget");
        assert_eq!(
            err.to_string(),
            "There is no getter for property named 'missingProp' in 'Widget'"
        );
    }

    #[test]
    fn test_duplicate_display() {
        let err = BindError::DuplicateId {
            collection: "Mapped Statements collection",
            id: "ns.findById".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Mapped Statements collection already contains value for ns.findById"
        );
    }
}

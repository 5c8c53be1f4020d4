//! Error types.

/// Errors that abort a generation run.
///
/// Generation never produces partial output: the first error encountered is
/// returned and no document is emitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// A field (or array items) descriptor names a type absent from the schema.
    #[error("field `{field}` references unknown type `{target}`")]
    UnresolvedReference { field: String, target: String },

    /// A descriptor the type mapper does not recognize.
    #[error("field `{field}` has unhandled type `{ty}`")]
    UnhandledType { field: String, ty: String },

    /// Two distinct schema names map to the same target identifier.
    #[error("naming conflict in {scope}: `{first}` and `{second}` both map to `{identifier}`")]
    NamingConflict {
        scope: String,
        first: String,
        second: String,
        identifier: String,
    },
}

/// Errors from loading a schema document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid schema document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read schema: {0}")]
    Io(#[from] std::io::Error),

    #[error("duplicate type `{0}`")]
    DuplicateType(String),

    #[error("duplicate method `{0}`")]
    DuplicateMethod(String),
}

/// A failed validation, as reported by generated `validate` operations.
///
/// Validation is fail-fast, so exactly one failure is ever reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("Field: {field}, Message: {message}")]
    Field { field: String, message: String },

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        source: Box<ValidationFailure>,
    },
}

impl ValidationFailure {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Field {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn element(index: usize, source: ValidationFailure) -> Self {
        Self::Element {
            index,
            source: Box::new(source),
        }
    }
}

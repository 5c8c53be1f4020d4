//! Traits for code generation backends.

use crate::error::GenerateError;
use crate::generate::{Context, GenerateOptions};
use crate::mapper::TypeTable;
use crate::naming::Naming;
use crate::schema::{Method, Schema, TypeDef};
use crate::validate::Validation;

/// Category of backend output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCategory {
    /// Type declarations (and their validators) only.
    Types,
    /// Type declarations plus an HTTP client.
    Client,
}

/// Declarations for a method's input and output.
///
/// `None` when the method has no inputs (or no outputs).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodIo {
    pub input: Option<String>,
    pub output: Option<String>,
}

/// A code generation backend for one target language.
///
/// Backends only render; iteration order, reference checks, name conflict
/// detection and validation synthesis are shared and live in
/// [`generate`](crate::generate::generate). Each rendered chunk should end
/// with the blank line that separates it from the next one.
///
/// # Implementing Custom Backends
///
/// ```ignore
/// use rpcgen::{BackendCategory, Emitter, MethodIo, generate::Context};
///
/// struct KotlinBackend;
///
/// impl Emitter for KotlinBackend {
///     fn name(&self) -> &'static str { "kotlin-types" }
///     fn language(&self) -> &'static str { "kotlin" }
///     fn extension(&self) -> &'static str { "kt" }
///     fn category(&self) -> BackendCategory { BackendCategory::Types }
///     fn naming(&self) -> Naming { /* ... */ }
///     fn type_table(&self) -> &dyn TypeTable { /* ... */ }
///     fn header(&self, cx: &Context<'_>) -> String { /* ... */ }
///     fn emit_type(&self, cx: &Context<'_>, ty: &TypeDef) -> Result<String, GenerateError> { /* ... */ }
///     fn emit_method_io(&self, cx: &Context<'_>, method: &Method) -> Result<MethodIo, GenerateError> { /* ... */ }
/// }
/// ```
pub trait Emitter: Send + Sync {
    /// Unique backend identifier (e.g., "rust-types", "ruby-client").
    fn name(&self) -> &'static str;

    /// Target language (e.g., "rust", "typescript").
    fn language(&self) -> &'static str;

    /// File extension for generated code (e.g., "rs", "ts").
    fn extension(&self) -> &'static str;

    fn category(&self) -> BackendCategory;

    /// Casing rules for this target.
    fn naming(&self) -> Naming;

    /// Type vocabulary for this target.
    fn type_table(&self) -> &dyn TypeTable;

    /// Whether this backend renders `validate` operations.
    fn supports_validation(&self) -> bool {
        false
    }

    /// Type names declared by the backend's own boilerplate.
    fn reserved_types(&self) -> &'static [&'static str] {
        &[]
    }

    /// Member names declared by the backend's own boilerplate.
    fn reserved_members(&self) -> &'static [&'static str] {
        &[]
    }

    /// Field identifiers that would clash with the validation member the
    /// backend adds to validated declarations.
    fn reserved_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// "Do not edit" banner, package line and imports.
    fn header(&self, cx: &Context<'_>) -> String;

    /// Declaration of a schema type.
    fn emit_type(&self, cx: &Context<'_>, ty: &TypeDef) -> Result<String, GenerateError>;

    /// Validation operation for the declaration named `name`.
    fn emit_validation(
        &self,
        _cx: &Context<'_>,
        _name: &str,
        _validation: &Validation<'_>,
    ) -> Result<String, GenerateError> {
        Ok(String::new())
    }

    /// Input/output declarations of a method.
    fn emit_method_io(&self, cx: &Context<'_>, method: &Method) -> Result<MethodIo, GenerateError>;

    /// Static client boilerplate preceding the stubs.
    fn client_prelude(&self, _cx: &Context<'_>) -> String {
        String::new()
    }

    /// Client stub of a method.
    fn emit_client_stub(&self, _cx: &Context<'_>, _method: &Method) -> Result<String, GenerateError> {
        Ok(String::new())
    }

    /// Static client boilerplate following the stubs (transport primitive).
    fn client_postlude(&self, _cx: &Context<'_>) -> String {
        String::new()
    }

    /// Static boilerplate at the end of the document.
    fn trailer(&self, _cx: &Context<'_>) -> String {
        String::new()
    }

    /// Generate the complete document.
    fn generate(&self, schema: &Schema, options: &GenerateOptions) -> Result<String, GenerateError> {
        crate::generate::generate(self, schema, options)
    }
}

//! The generation driver shared by every backend.
//!
//! [`generate`] checks references and names up front, then asks the backend
//! for each piece of the document in a fixed order:
//!
//! 1. header (banner, package line, imports)
//! 2. one declaration per type, each followed by its validation
//! 3. per method, the input declaration (plus validation) and the output
//!    declaration
//! 4. for clients, the prelude, one stub per method and the postlude
//! 5. the trailer
//!
//! The document is assembled in memory and returned only on success.

use crate::error::GenerateError;
use crate::mapper::{TypeMapper, TypeTable};
use crate::naming::{Convention, NameScope, Naming};
use crate::resolve::Resolver;
use crate::schema::{Field, Method, Schema, TypeDescriptor};
use crate::traits::{BackendCategory, Emitter};
use crate::validate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Claimant of names declared by backend boilerplate.
const BUILTIN: &str = "<built-in>";

/// Per-run generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Go package name. Falls back to the schema's `go.package`, then `api`.
    pub package: Option<String>,
    /// Module imported as `fetch` by the TypeScript client. Empty means the
    /// global `fetch`.
    pub fetch_library: String,
    /// Ruby module wrapping the client.
    pub module: String,
    /// Ruby client class.
    pub class: String,
    /// Go struct tags. Falls back to the schema's `go.tags`, then `json`.
    pub tags: Vec<String>,
    /// Emit validation operations where the backend supports them.
    pub validate: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            package: None,
            fetch_library: "node-fetch".to_string(),
            module: "Api".to_string(),
            class: "Client".to_string(),
            tags: Vec::new(),
            validate: true,
        }
    }
}

/// Everything a backend needs while rendering one document.
pub struct Context<'a> {
    schema: &'a Schema,
    options: &'a GenerateOptions,
    resolver: Resolver<'a>,
    naming: Naming,
    table: &'a dyn TypeTable,
    validate: bool,
}

impl<'a> Context<'a> {
    pub fn new(
        schema: &'a Schema,
        options: &'a GenerateOptions,
        naming: Naming,
        table: &'a dyn TypeTable,
        validate: bool,
    ) -> Self {
        Self {
            schema,
            options,
            resolver: Resolver::new(schema),
            naming,
            table,
            validate,
        }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn options(&self) -> &'a GenerateOptions {
        self.options
    }

    pub fn resolver(&self) -> &Resolver<'a> {
        &self.resolver
    }

    /// Whether validation operations are rendered in this run.
    pub fn validate(&self) -> bool {
        self.validate
    }

    pub fn type_name(&self, raw: &str) -> String {
        self.naming.identifier(raw, Convention::Type)
    }

    pub fn member_name(&self, raw: &str) -> String {
        self.naming.identifier(raw, Convention::Member)
    }

    pub fn field_name(&self, raw: &str) -> String {
        self.naming.identifier(raw, Convention::Field)
    }

    /// `GetUserInput` for `get_user`.
    pub fn input_name(&self, method: &Method) -> String {
        format!("{}Input", self.type_name(&method.name))
    }

    /// `GetUserOutput` for `get_user`.
    pub fn output_name(&self, method: &Method) -> String {
        format!("{}Output", self.type_name(&method.name))
    }

    pub fn mapper(&self) -> TypeMapper<'_> {
        TypeMapper::new(&self.resolver, self.naming, self.table)
    }

    pub fn map_type(&self, field: &Field) -> Result<String, GenerateError> {
        self.mapper().map_type(field)
    }

    pub fn map_descriptor(
        &self,
        field: &str,
        descriptor: &TypeDescriptor,
    ) -> Result<String, GenerateError> {
        self.mapper().map_descriptor(field, descriptor)
    }

    /// Go package name.
    pub fn package(&self) -> &str {
        self.options
            .package
            .as_deref()
            .or(self.schema.go.package.as_deref())
            .unwrap_or("api")
    }

    /// Go struct tags.
    pub fn tags(&self) -> Vec<&str> {
        let tags = if self.options.tags.is_empty() {
            &self.schema.go.tags
        } else {
            &self.options.tags
        };
        if tags.is_empty() {
            vec!["json"]
        } else {
            tags.iter().map(String::as_str).collect()
        }
    }

    /// Whether any field anywhere in the schema matches `pred`.
    pub fn uses(&self, pred: impl Fn(&TypeDescriptor) -> bool) -> bool {
        self.schema
            .fields()
            .any(|f| f.descriptor().is_ok_and(|d| d.any(&pred)))
    }
}

/// Generate the complete document for `schema` with `emitter`.
pub fn generate<E: Emitter + ?Sized>(
    emitter: &E,
    schema: &Schema,
    options: &GenerateOptions,
) -> Result<String, GenerateError> {
    let _span = tracing::debug_span!("generate", backend = emitter.name()).entered();

    let validate = options.validate && emitter.supports_validation();
    let cx = Context::new(
        schema,
        options,
        emitter.naming(),
        emitter.type_table(),
        validate,
    );

    cx.resolver().check_all()?;
    check_names(emitter, &cx)?;

    let mut out = emitter.header(&cx);

    for ty in &schema.types {
        debug!(name = %ty.name, "emitting type");
        out.push_str(&emitter.emit_type(&cx, ty)?);
        if validate {
            let name = cx.type_name(&ty.name);
            let validation = validate::synthesize(&name, &ty.properties)?;
            out.push_str(&emitter.emit_validation(&cx, &name, &validation)?);
        }
    }

    for method in &schema.methods {
        debug!(name = %method.name, "emitting method");
        let io = emitter.emit_method_io(&cx, method)?;
        if let Some(input) = io.input {
            out.push_str(&input);
            if validate {
                let name = cx.input_name(method);
                let validation = validate::synthesize(&name, &method.inputs)?;
                out.push_str(&emitter.emit_validation(&cx, &name, &validation)?);
            }
        }
        if let Some(output) = io.output {
            out.push_str(&output);
        }
    }

    if emitter.category() == BackendCategory::Client {
        out.push_str(&emitter.client_prelude(&cx));
        for method in &schema.methods {
            out.push_str(&emitter.emit_client_stub(&cx, method)?);
        }
        out.push_str(&emitter.client_postlude(&cx));
    }

    out.push_str(&emitter.trailer(&cx));

    let mut document = out.trim_end().to_string();
    document.push('\n');

    info!(
        backend = emitter.name(),
        types = schema.types.len(),
        methods = schema.methods.len(),
        bytes = document.len(),
        "generated"
    );
    Ok(document)
}

/// Fail on any two schema names that collapse to one identifier.
///
/// Type declarations and method input/output declarations share a scope;
/// methods have their own; fields are scoped per declaration.
fn check_names<E: Emitter + ?Sized>(emitter: &E, cx: &Context<'_>) -> Result<(), GenerateError> {
    let mut types = NameScope::new("type declarations");
    for reserved in emitter.reserved_types() {
        types.claim(BUILTIN, reserved)?;
    }
    let mut members = NameScope::new("methods");
    for reserved in emitter.reserved_members() {
        members.claim(BUILTIN, reserved)?;
    }

    for ty in &cx.schema().types {
        types.claim(&ty.name, &cx.type_name(&ty.name))?;
        check_fields(emitter, cx, &format!("fields of `{}`", ty.name), &ty.properties, true)?;
    }

    for method in &cx.schema().methods {
        members.claim(&method.name, &cx.member_name(&method.name))?;
        if !method.inputs.is_empty() {
            types.claim(&format!("{} (input)", method.name), &cx.input_name(method))?;
            check_fields(emitter, cx, &format!("inputs of `{}`", method.name), &method.inputs, true)?;
        }
        if !method.outputs.is_empty() {
            types.claim(&format!("{} (output)", method.name), &cx.output_name(method))?;
            check_fields(emitter, cx, &format!("outputs of `{}`", method.name), &method.outputs, false)?;
        }
    }

    Ok(())
}

fn check_fields<E: Emitter + ?Sized>(
    emitter: &E,
    cx: &Context<'_>,
    label: &str,
    fields: &[Field],
    validated: bool,
) -> Result<(), GenerateError> {
    let mut scope = NameScope::new(label);
    if validated && cx.validate() {
        for reserved in emitter.reserved_fields() {
            scope.claim(BUILTIN, reserved)?;
        }
    }
    for field in fields {
        scope.claim(&field.name, &cx.field_name(&field.name))?;
    }
    Ok(())
}

//! Rust backend.
//!
//! Generates serde structs and, for `rust-types`, `validate(&mut self)`
//! operations backed by a generated `ValidationError`. The `rust-client`
//! backend adds an async [reqwest](https://docs.rs/reqwest) client instead.
//!
//! Generated code depends on `serde`, `serde_json`, `chrono` (when the
//! schema uses timestamps) and `reqwest` (clients only).

use crate::error::GenerateError;
use crate::generate::{Context, GenerateOptions};
use crate::mapper::TypeTable;
use crate::naming::{Case, Escape, Naming};
use crate::output::{GENERATED_BANNER, describe, field_doc, sentence};
use crate::schema::{Field, Method, Schema, TypeDef, TypeDescriptor};
use crate::traits::{BackendCategory, Emitter, MethodIo};
use crate::validate::{DefaultValue, FieldValidation, Step, Validation, ZeroCheck};

/// Static instance of the Rust types backend for the registry.
pub static RUST_TYPES_BACKEND: RustBackend = RustBackend { client: false };

/// Static instance of the Rust client backend for the registry.
pub static RUST_CLIENT_BACKEND: RustBackend = RustBackend { client: true };

// Names the generated code refers to unqualified.
const TYPES_RESERVED_TYPES: &[&str] = &[
    "ValidationError", "String", "Option", "Vec", "Box", "HashMap", "DateTime", "Utc", "Result",
    "Serialize", "Deserialize",
];
const CLIENT_RESERVED_TYPES: &[&str] = &[
    "Client", "ClientError", "String", "Option", "Vec", "Box", "HashMap", "DateTime", "Utc",
    "Result", "Serialize", "Deserialize",
];

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait",
    "true", "try", "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do",
    "final", "macro", "override", "priv", "typeof", "unsized", "virtual", "yield",
];

const NAMING: Naming =
    Naming::new(Case::Pascal, Case::Snake, Case::Snake).with_keywords(KEYWORDS, Escape::RawIdentifier);

/// Rust type vocabulary.
pub struct RustTypes;

impl TypeTable for RustTypes {
    fn string(&self) -> &'static str {
        "String"
    }

    fn int(&self) -> &'static str {
        "i64"
    }

    fn float(&self) -> &'static str {
        "f64"
    }

    fn bool(&self) -> &'static str {
        "bool"
    }

    fn timestamp(&self) -> &'static str {
        "DateTime<Utc>"
    }

    fn object(&self) -> &'static str {
        "HashMap<String, serde_json::Value>"
    }

    fn array(&self, element: &str) -> String {
        format!("Vec<{element}>")
    }

    fn optional(&self, inner: String, _descriptor: &TypeDescriptor) -> String {
        format!("Option<{inner}>")
    }
}

/// Rust code generator.
pub struct RustBackend {
    client: bool,
}

impl RustBackend {
    fn emit_struct(
        &self,
        cx: &Context<'_>,
        doc: &str,
        name: &str,
        fields: &[Field],
    ) -> Result<String, GenerateError> {
        let mut out = String::new();
        out.push_str(&format!("/// {doc}\n"));
        out.push_str("#[derive(Serialize, Deserialize, Debug, Clone)]\n");
        out.push_str(&format!("pub struct {name} {{\n"));
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&self.emit_field(cx, field)?);
        }
        out.push_str("}\n\n");
        Ok(out)
    }

    fn emit_field(&self, cx: &Context<'_>, field: &Field) -> Result<String, GenerateError> {
        let ident = cx.field_name(&field.name);
        let ty = cx.map_type(field)?;

        let mut attrs = Vec::new();
        if ident.trim_start_matches("r#") != field.name {
            attrs.push(format!("rename = {:?}", field.name));
        }
        if !field.required {
            attrs.push(r#"default, skip_serializing_if = "Option::is_none""#.to_string());
        } else if cx.validate() && field.default.is_some() {
            // Validation substitutes the default, so the field may be absent.
            if matches!(field.descriptor()?, TypeDescriptor::Int | TypeDescriptor::String) {
                attrs.push("default".to_string());
            }
        }

        let mut out = format!(
            "    /// {}\n",
            field_doc(ident.trim_start_matches("r#"), field)
        );
        if !attrs.is_empty() {
            out.push_str(&format!("    #[serde({})]\n", attrs.join(", ")));
        }
        out.push_str(&format!("    pub {ident}: {ty},\n"));
        Ok(out)
    }
}

impl Emitter for RustBackend {
    fn name(&self) -> &'static str {
        if self.client { "rust-client" } else { "rust-types" }
    }

    fn language(&self) -> &'static str {
        "rust"
    }

    fn extension(&self) -> &'static str {
        "rs"
    }

    fn category(&self) -> BackendCategory {
        if self.client {
            BackendCategory::Client
        } else {
            BackendCategory::Types
        }
    }

    fn naming(&self) -> Naming {
        NAMING
    }

    fn type_table(&self) -> &dyn TypeTable {
        &RustTypes
    }

    fn supports_validation(&self) -> bool {
        !self.client
    }

    fn reserved_types(&self) -> &'static [&'static str] {
        if self.client { CLIENT_RESERVED_TYPES } else { TYPES_RESERVED_TYPES }
    }

    fn reserved_members(&self) -> &'static [&'static str] {
        if self.client { &["new", "call"] } else { &[] }
    }

    fn header(&self, cx: &Context<'_>) -> String {
        let mut out = format!("// {GENERATED_BANNER}\n\n");
        if cx.uses(|d| *d == TypeDescriptor::Object) {
            out.push_str("use std::collections::HashMap;\n\n");
        }
        if cx.uses(|d| *d == TypeDescriptor::Timestamp) {
            out.push_str("use chrono::{DateTime, Utc};\n");
        }
        out.push_str("use serde::{Deserialize, Serialize};\n\n");
        out
    }

    fn emit_type(&self, cx: &Context<'_>, ty: &TypeDef) -> Result<String, GenerateError> {
        let name = cx.type_name(&ty.name);
        self.emit_struct(cx, &describe(&name, &ty.description), &name, &ty.properties)
    }

    fn emit_validation(
        &self,
        cx: &Context<'_>,
        name: &str,
        validation: &Validation<'_>,
    ) -> Result<String, GenerateError> {
        let mut out = format!("impl {name} {{\n");
        out.push_str("    /// Checks the fields, substituting defaults for zero values.\n");
        out.push_str("    pub fn validate(&mut self) -> Result<(), ValidationError> {\n");
        for field in &validation.fields {
            for step in &field.steps {
                if let Some(block) = validation_block(cx, field, step) {
                    out.push_str(&block);
                    out.push('\n');
                }
            }
        }
        out.push_str("        Ok(())\n");
        out.push_str("    }\n");
        out.push_str("}\n\n");
        Ok(out)
    }

    fn emit_method_io(&self, cx: &Context<'_>, method: &Method) -> Result<MethodIo, GenerateError> {
        let mut io = MethodIo::default();
        if !method.inputs.is_empty() {
            let name = cx.input_name(method);
            io.input = Some(self.emit_struct(cx, &format!("{name} params."), &name, &method.inputs)?);
        }
        if !method.outputs.is_empty() {
            let name = cx.output_name(method);
            io.output = Some(self.emit_struct(cx, &format!("{name} params."), &name, &method.outputs)?);
        }
        Ok(io)
    }

    fn client_prelude(&self, _cx: &Context<'_>) -> String {
        CLIENT_PRELUDE.to_string()
    }

    fn emit_client_stub(&self, cx: &Context<'_>, method: &Method) -> Result<String, GenerateError> {
        let doc = sentence(&method.description).unwrap_or_else(|| format!("Calls `{}`.", method.name));
        let ident = cx.member_name(&method.name);

        let mut out = format!("    /// {doc}\n");
        out.push_str(&format!("    pub async fn {ident}(&self"));
        if !method.inputs.is_empty() {
            out.push_str(&format!(", input: &{}", cx.input_name(method)));
        }
        if method.outputs.is_empty() {
            out.push_str(") -> Result<(), ClientError> {\n");
        } else {
            out.push_str(&format!(") -> Result<{}, ClientError> {{\n", cx.output_name(method)));
        }

        let payload = if method.inputs.is_empty() {
            "None"
        } else {
            out.push_str("        let body = serde_json::to_vec(input)?;\n");
            "Some(body)"
        };
        let call = format!("self.call({:?}, {payload}).await?", method.name);
        if method.outputs.is_empty() {
            out.push_str(&format!("        {call};\n"));
            out.push_str("        Ok(())\n");
        } else {
            out.push_str(&format!("        let res = {call};\n"));
            out.push_str("        Ok(serde_json::from_slice(&res)?)\n");
        }
        out.push_str("    }\n\n");
        Ok(out)
    }

    fn client_postlude(&self, _cx: &Context<'_>) -> String {
        CLIENT_POSTLUDE.to_string()
    }

    fn trailer(&self, cx: &Context<'_>) -> String {
        if self.client {
            CLIENT_ERROR.to_string()
        } else if cx.validate() {
            VALIDATION_ERROR.to_string()
        } else {
            String::new()
        }
    }
}

/// Rust statements for one validation step, or `None` when the step has no
/// runtime check (required arrays and objects are enforced by serde).
fn validation_block(cx: &Context<'_>, validation: &FieldValidation<'_>, step: &Step) -> Option<String> {
    let field = validation.field;
    let this = format!("self.{}", cx.field_name(&field.name));
    let fail = |message: &str| {
        format!(
            "return Err(ValidationError::field({:?}, {:?}));",
            field.name, message
        )
    };

    let block = match step {
        Step::Default(DefaultValue::Int(n)) if field.required => {
            format!("        if {this} == 0 {{\n            {this} = {n};\n        }}\n")
        }
        Step::Default(DefaultValue::Int(n)) => format!(
            "        if {this}.unwrap_or_default() == 0 {{\n            {this} = Some({n});\n        }}\n"
        ),
        Step::Default(DefaultValue::String(s)) if field.required => format!(
            "        if {this}.is_empty() {{\n            {this} = {s:?}.to_string();\n        }}\n"
        ),
        Step::Default(DefaultValue::String(s)) => format!(
            "        if {this}.as_deref().unwrap_or_default().is_empty() {{\n            {this} = Some({s:?}.to_string());\n        }}\n"
        ),
        Step::Required(check) => {
            let condition = match check {
                ZeroCheck::IntZero => format!("{this} == 0"),
                ZeroCheck::FloatZero => format!("{this} == 0.0"),
                ZeroCheck::Empty => format!("{this}.is_empty()"),
                ZeroCheck::ZeroInstant => format!("{this} == DateTime::<Utc>::default()"),
                ZeroCheck::Absent => return None,
            };
            let message = step.message().unwrap_or_default();
            format!("        if {condition} {{\n            {}\n        }}\n", fail(&message))
        }
        Step::Enum(values) => {
            let list = values
                .iter()
                .map(|v| format!("{v:?}"))
                .collect::<Vec<_>>()
                .join(", ");
            let message = step.message().unwrap_or_default();
            if field.required {
                format!(
                    "        if !{this}.is_empty() && ![{list}].contains(&{this}.as_str()) {{\n            {}\n        }}\n",
                    fail(&message)
                )
            } else {
                format!(
                    "        if let Some(value) = {this}.as_deref() {{\n            if !value.is_empty() && ![{list}].contains(&value) {{\n                {}\n            }}\n        }}\n",
                    fail(&message)
                )
            }
        }
        Step::Elements(_) => {
            let items = if field.required {
                format!("{this}.iter_mut().enumerate()")
            } else {
                format!("{this}.iter_mut().flatten().enumerate()")
            };
            format!(
                "        for (i, item) in {items} {{\n            item.validate().map_err(|err| ValidationError::element(i, err))?;\n        }}\n"
            )
        }
    };
    Some(block)
}

/// Generate Rust types with validation.
pub fn generate_rust_types(schema: &Schema, options: &GenerateOptions) -> Result<String, GenerateError> {
    RUST_TYPES_BACKEND.generate(schema, options)
}

/// Generate Rust types and an async client.
pub fn generate_rust_client(schema: &Schema, options: &GenerateOptions) -> Result<String, GenerateError> {
    RUST_CLIENT_BACKEND.generate(schema, options)
}

const VALIDATION_ERROR: &str = r#"/// A failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Field { field: &'static str, message: String },
    Element { index: usize, source: Box<ValidationError> },
}

#[allow(dead_code)]
impl ValidationError {
    fn field(field: &'static str, message: &str) -> Self {
        ValidationError::Field {
            field,
            message: message.to_string(),
        }
    }

    fn element(index: usize, source: ValidationError) -> Self {
        ValidationError::Element {
            index,
            source: Box::new(source),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Field { field, message } => {
                write!(f, "Field: {field}, Message: {message}")
            }
            ValidationError::Element { index, source } => write!(f, "element {index}: {source}"),
        }
    }
}

impl std::error::Error for ValidationError {}
"#;

const CLIENT_PRELUDE: &str = r#"/// Client is the API client.
#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl Client {
    pub fn new(client: reqwest::Client, endpoint: &str, auth_token: Option<String>) -> Client {
        Client {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            auth_token,
        }
    }

"#;

const CLIENT_POSTLUDE: &str = r#"    async fn call(&self, method: &str, input: Option<Vec<u8>>) -> Result<Vec<u8>, ClientError> {
        let uri = format!("{}/{}", self.endpoint, method);

        let mut builder = self
            .client
            .post(&uri)
            .header("Content-Type", "application/json");
        if let Some(data) = input {
            builder = builder.body(data);
        }
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let is_json = resp
                .headers()
                .get("Content-Type")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("application/json"));
            let mut err = if is_json {
                serde_json::from_slice::<ClientError>(&resp.bytes().await?)?
            } else {
                ClientError::default()
            };
            err.status_code = status.as_u16();
            err.status = status.canonical_reason().unwrap_or_default().to_string();
            return Err(err);
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

"#;

const CLIENT_ERROR: &str = r#"/// ClientError is an error returned by the client.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ClientError {
    pub status: String,
    pub status_code: u16,
    #[serde(rename = "type")]
    pub err_type: Option<String>,
    pub message: Option<String>,
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status_code, self.status)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ClientError {}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> ClientError {
        ClientError {
            status: "Internal Server Error".into(),
            status_code: 500,
            err_type: Some("json".into()),
            message: Some(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> ClientError {
        ClientError {
            status: "Internal Server Error".into(),
            status_code: 500,
            err_type: Some("reqwest".into()),
            message: Some(err.to_string()),
        }
    }
}
"#;

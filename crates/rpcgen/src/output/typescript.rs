//! TypeScript type and client generator.

use crate::error::GenerateError;
use crate::generate::{Context, GenerateOptions};
use crate::mapper::TypeTable;
use crate::naming::{Case, Naming};
use crate::output::{GENERATED_BANNER, describe, field_doc, quote, sentence};
use crate::schema::{Field, Method, Schema, TypeDef, TypeDescriptor};
use crate::traits::{BackendCategory, Emitter, MethodIo};

/// Static instance of the TypeScript types backend for the registry.
pub static TYPESCRIPT_TYPES_BACKEND: TypeScriptBackend = TypeScriptBackend { client: false };

/// Static instance of the TypeScript client backend for the registry.
pub static TYPESCRIPT_CLIENT_BACKEND: TypeScriptBackend = TypeScriptBackend { client: true };

// Properties keep their wire names.
const NAMING: Naming = Naming::new(Case::Pascal, Case::Camel, Case::Preserve);

/// TypeScript type vocabulary.
pub struct TypeScriptTypes;

impl TypeTable for TypeScriptTypes {
    fn string(&self) -> &'static str {
        "string"
    }

    fn int(&self) -> &'static str {
        "number"
    }

    fn float(&self) -> &'static str {
        "number"
    }

    fn bool(&self) -> &'static str {
        "boolean"
    }

    fn timestamp(&self) -> &'static str {
        "Date"
    }

    fn object(&self) -> &'static str {
        "Record<string, any>"
    }

    fn array(&self, element: &str) -> String {
        format!("{element}[]")
    }

    // Optionality is expressed with `?` on the property.
    fn optional(&self, inner: String, _descriptor: &TypeDescriptor) -> String {
        inner
    }
}

/// TypeScript code generator.
pub struct TypeScriptBackend {
    client: bool,
}

impl TypeScriptBackend {
    fn emit_interface(
        &self,
        cx: &Context<'_>,
        doc: &str,
        name: &str,
        fields: &[Field],
    ) -> Result<String, GenerateError> {
        let mut out = String::new();
        out.push_str(&format!("/**\n * {}\n */\n", comment(doc)));
        out.push_str(&format!("export interface {name} {{\n"));
        for field in fields {
            let key = if is_identifier(&field.name) {
                field.name.clone()
            } else {
                quote(&field.name)
            };
            let marker = if field.required { "" } else { "?" };
            out.push_str(&format!("  /** {} */\n", comment(&field_doc(&field.name, field))));
            out.push_str(&format!("  {key}{marker}: {}\n", cx.map_type(field)?));
        }
        out.push_str("}\n\n");
        Ok(out)
    }
}

/// Keep free text from closing a block comment early.
fn comment(text: &str) -> String {
    text.replace("*/", "*\\/")
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

impl Emitter for TypeScriptBackend {
    fn name(&self) -> &'static str {
        if self.client {
            "typescript-client"
        } else {
            "typescript-types"
        }
    }

    fn language(&self) -> &'static str {
        "typescript"
    }

    fn extension(&self) -> &'static str {
        "ts"
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
        &TypeScriptTypes
    }

    // Globals the generated code relies on are reserved for both backends.
    fn reserved_types(&self) -> &'static [&'static str] {
        if self.client {
            &["Client", "ClientError", "Date", "Record", "Promise", "Error", "JSON"]
        } else {
            &["Date", "Record"]
        }
    }

    fn reserved_members(&self) -> &'static [&'static str] {
        if self.client { &["constructor", "call"] } else { &[] }
    }

    fn header(&self, cx: &Context<'_>) -> String {
        let mut out = format!("// {GENERATED_BANNER}\n\n");
        let library = &cx.options().fetch_library;
        if self.client && !library.is_empty() {
            out.push_str(&format!("import fetch from '{library}'\n\n"));
        }
        out
    }

    fn emit_type(&self, cx: &Context<'_>, ty: &TypeDef) -> Result<String, GenerateError> {
        let name = cx.type_name(&ty.name);
        self.emit_interface(cx, &describe(&name, &ty.description), &name, &ty.properties)
    }

    fn emit_method_io(&self, cx: &Context<'_>, method: &Method) -> Result<MethodIo, GenerateError> {
        let mut io = MethodIo::default();
        if !method.inputs.is_empty() {
            let name = cx.input_name(method);
            io.input = Some(self.emit_interface(cx, &format!("{name} params."), &name, &method.inputs)?);
        }
        if !method.outputs.is_empty() {
            let name = cx.output_name(method);
            io.output = Some(self.emit_interface(cx, &format!("{name} params."), &name, &method.outputs)?);
        }
        Ok(io)
    }

    fn client_prelude(&self, _cx: &Context<'_>) -> String {
        CLIENT_PRELUDE.to_string()
    }

    fn emit_client_stub(&self, cx: &Context<'_>, method: &Method) -> Result<String, GenerateError> {
        let doc = sentence(&method.description).unwrap_or_else(|| format!("Calls `{}`.", method.name));
        let ident = cx.member_name(&method.name);
        let name = quote(&method.name);

        let (params, call) = if method.inputs.is_empty() {
            (String::new(), format!("this.call({name})"))
        } else {
            (
                format!("params: {}", cx.input_name(method)),
                format!("this.call({name}, params)"),
            )
        };

        let mut out = format!("  /**\n   * {}\n   */\n", comment(&doc));
        if method.outputs.is_empty() {
            out.push_str(&format!("  async {ident}({params}): Promise<void> {{\n"));
            out.push_str(&format!("    await {call}\n"));
        } else {
            out.push_str(&format!(
                "  async {ident}({params}): Promise<{}> {{\n",
                cx.output_name(method)
            ));
            out.push_str(&format!("    return JSON.parse(await {call})\n"));
        }
        out.push_str("  }\n\n");
        Ok(out)
    }

    fn client_postlude(&self, _cx: &Context<'_>) -> String {
        CLIENT_POSTLUDE.to_string()
    }
}

/// Generate TypeScript interfaces.
pub fn generate_typescript_types(
    schema: &Schema,
    options: &GenerateOptions,
) -> Result<String, GenerateError> {
    TYPESCRIPT_TYPES_BACKEND.generate(schema, options)
}

/// Generate TypeScript interfaces and a client class.
pub fn generate_typescript_client(
    schema: &Schema,
    options: &GenerateOptions,
) -> Result<String, GenerateError> {
    TYPESCRIPT_CLIENT_BACKEND.generate(schema, options)
}

const CLIENT_PRELUDE: &str = r#"/**
 * ClientError is thrown for non-2xx responses.
 */
export class ClientError extends Error {
  status: number
  type?: string

  constructor(status: number, message: string, type?: string) {
    super(message)
    this.status = status
    this.type = type
  }
}

/**
 * Client is the API client.
 */
export class Client {
  private url: string
  private authToken?: string

  /**
   * Initialize.
   */
  constructor(params: { url: string, authToken?: string }) {
    this.url = params.url
    this.authToken = params.authToken
  }

"#;

const CLIENT_POSTLUDE: &str = r#"  /**
   * Call method with params via a POST request.
   */
  private async call(method: string, params?: any): Promise<string> {
    const url = this.url + '/' + method

    const headers: Record<string, string> = {
      'Content-Type': 'application/json'
    }
    if (this.authToken) {
      headers['Authorization'] = `Bearer ${this.authToken}`
    }

    const res = await fetch(url, {
      method: 'POST',
      body: JSON.stringify(params),
      headers
    })

    if (res.status >= 300) {
      let err
      try {
        err = await res.json()
      } catch {
        throw new ClientError(res.status, `${res.status} ${res.statusText}`)
      }
      throw new ClientError(res.status, err.message, err.type)
    }

    return res.text()
  }
}
"#;

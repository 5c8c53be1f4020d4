//! Ruby client generator.
//!
//! Ruby has no type declarations to emit; the client takes plain hashes and
//! the field types only appear in the YARD docs of each method.

use crate::error::GenerateError;
use crate::generate::{Context, GenerateOptions};
use crate::mapper::TypeTable;
use crate::naming::{Case, Escape, Naming};
use crate::output::{GENERATED_BANNER, describe, quote, sentence};
use crate::schema::{Method, Schema, TypeDef, TypeDescriptor};
use crate::traits::{BackendCategory, Emitter, MethodIo};

/// Static instance of the Ruby client backend for the registry.
pub static RUBY_CLIENT_BACKEND: RubyBackend = RubyBackend;

const KEYWORDS: &[&str] = &[
    "BEGIN", "END", "alias", "and", "begin", "break", "case", "class", "def", "defined?", "do",
    "else", "elsif", "end", "ensure", "false", "for", "if", "in", "module", "next", "nil", "not",
    "or", "redo", "rescue", "retry", "return", "self", "super", "then", "true", "undef", "unless",
    "until", "when", "while", "yield",
];

const NAMING: Naming = Naming::new(Case::Pascal, Case::Snake, Case::Preserve)
    .with_keywords(KEYWORDS, Escape::TrailingUnderscore);

/// Ruby (YARD) type vocabulary.
pub struct RubyTypes;

impl TypeTable for RubyTypes {
    fn string(&self) -> &'static str {
        "String"
    }

    fn int(&self) -> &'static str {
        "Integer"
    }

    fn float(&self) -> &'static str {
        "Float"
    }

    fn bool(&self) -> &'static str {
        "Boolean"
    }

    fn timestamp(&self) -> &'static str {
        "Time"
    }

    fn object(&self) -> &'static str {
        "Hash"
    }

    fn array(&self, element: &str) -> String {
        format!("Array<{element}>")
    }

    fn optional(&self, inner: String, _descriptor: &TypeDescriptor) -> String {
        format!("{inner}, nil")
    }
}

/// Ruby code generator.
pub struct RubyBackend;

impl Emitter for RubyBackend {
    fn name(&self) -> &'static str {
        "ruby-client"
    }

    fn language(&self) -> &'static str {
        "ruby"
    }

    fn extension(&self) -> &'static str {
        "rb"
    }

    fn category(&self) -> BackendCategory {
        BackendCategory::Client
    }

    fn naming(&self) -> Naming {
        NAMING
    }

    fn type_table(&self) -> &dyn TypeTable {
        &RubyTypes
    }

    fn reserved_members(&self) -> &'static [&'static str] {
        &["call", "initialize"]
    }

    fn header(&self, _cx: &Context<'_>) -> String {
        format!("# {GENERATED_BANNER}\n\nrequire 'net/http'\nrequire 'net/https'\nrequire 'json'\n\n")
    }

    fn emit_type(&self, _cx: &Context<'_>, _ty: &TypeDef) -> Result<String, GenerateError> {
        Ok(String::new())
    }

    fn emit_method_io(&self, _cx: &Context<'_>, _method: &Method) -> Result<MethodIo, GenerateError> {
        Ok(MethodIo::default())
    }

    fn client_prelude(&self, cx: &Context<'_>) -> String {
        let options = cx.options();
        CLIENT_PRELUDE
            .replace("{module}", &cx.type_name(&options.module))
            .replace("{class}", &cx.type_name(&options.class))
    }

    fn emit_client_stub(&self, cx: &Context<'_>, method: &Method) -> Result<String, GenerateError> {
        let doc = sentence(&method.description).unwrap_or_else(|| format!("Calls `{}`.", method.name));
        let ident = cx.member_name(&method.name);
        let name = ruby_quote(&method.name);

        let mut out = format!("\n    # {doc}\n");
        if !method.inputs.is_empty() {
            out.push_str("    #\n");
            out.push_str("    # @param [Hash] params the input for this method.\n");
            for field in &method.inputs {
                let doc = describe(&field.name, &field.description);
                out.push_str(&format!(
                    "    # @option params [{}] :{} {doc}\n",
                    cx.map_type(field)?,
                    field.name
                ));
            }
        }
        if !method.outputs.is_empty() {
            if method.inputs.is_empty() {
                out.push_str("    #\n");
            }
            out.push_str("    # @return [Hash] the output of this method.\n");
        }

        if method.inputs.is_empty() {
            out.push_str(&format!("    def {ident}\n      call {name}\n    end\n"));
        } else {
            out.push_str(&format!("    def {ident}(params)\n      call {name}, params\n    end\n"));
        }
        Ok(out)
    }

    fn client_postlude(&self, _cx: &Context<'_>) -> String {
        CLIENT_POSTLUDE.to_string()
    }
}

/// Double-quoted Ruby string; `#` is escaped so nothing interpolates.
fn ruby_quote(s: &str) -> String {
    quote(s).replace('#', "\\#")
}

/// Generate a Ruby client.
pub fn generate_ruby_client(schema: &Schema, options: &GenerateOptions) -> Result<String, GenerateError> {
    RUBY_CLIENT_BACKEND.generate(schema, options)
}

const CLIENT_PRELUDE: &str = r##"module {module}
  class {class}
    # Error is raised when an API call fails due to a 4xx or 5xx HTTP error.
    class Error < StandardError
      attr_reader :type
      attr_reader :message
      attr_reader :status

      def initialize(status, type = nil, message = nil)
        @status = status
        @type = type
        @message = message
      end

      def to_s
        if @type
          "#{@status} response: #{@type}: #{@message}"
        else
          "#{@status} response"
        end
      end
    end

    # Initialize the client with API endpoint URL and optional authentication token.
    def initialize(url, auth_token = nil)
      @url = url
      @auth_token = auth_token
    end
"##;

const CLIENT_POSTLUDE: &str = r##"
    private

    # Call an API method with optional input parameters.
    def call(method, params = nil)
      url = @url + "/" + method
      header = { "Content-Type" => "application/json" }

      if @auth_token
        header["Authorization"] = "Bearer #{@auth_token}"
      end

      res = Net::HTTP.post URI(url), params.to_json, header
      status = res.code.to_i

      if status >= 300
        begin
          body = JSON.parse(res.body)
        rescue
          raise Error.new(status)
        end
        raise Error.new(status, body["type"], body["message"])
      end

      return nil if res.body.nil? || res.body.empty?
      JSON.parse(res.body)
    end
  end
end
"##;

//! Go type generator.
//!
//! Generates Go structs with configurable struct tags, plus `Validate()`
//! methods, a `ValidationError` type and the `oneOf` helper.

use crate::error::GenerateError;
use crate::generate::{Context, GenerateOptions};
use crate::mapper::TypeTable;
use crate::naming::{Case, Naming};
use crate::output::{GENERATED_BANNER, describe, field_doc, quote};
use crate::schema::{Field, Method, Schema, TypeDef, TypeDescriptor};
use crate::traits::{BackendCategory, Emitter, MethodIo};
use crate::validate::{DefaultValue, Step, Validation, ZeroCheck};

/// Static instance of the Go backend for the registry.
pub static GO_BACKEND: GoBackend = GoBackend;

const NAMING: Naming = Naming::new(Case::Pascal, Case::Pascal, Case::Pascal);

/// Go type vocabulary.
pub struct GoTypes;

impl TypeTable for GoTypes {
    fn string(&self) -> &'static str {
        "string"
    }

    fn int(&self) -> &'static str {
        "int64"
    }

    fn float(&self) -> &'static str {
        "float64"
    }

    fn bool(&self) -> &'static str {
        "bool"
    }

    fn timestamp(&self) -> &'static str {
        "time.Time"
    }

    fn object(&self) -> &'static str {
        "map[string]interface{}"
    }

    fn array(&self, element: &str) -> String {
        format!("[]{element}")
    }

    // Slices and maps are already nil-able.
    fn optional(&self, inner: String, descriptor: &TypeDescriptor) -> String {
        match descriptor {
            TypeDescriptor::Array(_) | TypeDescriptor::Object => inner,
            _ => format!("*{inner}"),
        }
    }
}

/// Go code generator.
pub struct GoBackend;

impl GoBackend {
    fn emit_struct(
        &self,
        cx: &Context<'_>,
        doc: &str,
        name: &str,
        fields: &[Field],
    ) -> Result<String, GenerateError> {
        let mut out = String::new();
        out.push_str(&format!("// {doc}\n"));
        out.push_str(&format!("type {name} struct {{\n"));
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let ident = cx.field_name(&field.name);
            let tags = cx
                .tags()
                .iter()
                .map(|tag| format!("{tag}:{}", quote(&field.name)))
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&format!("\t// {}\n", field_doc(&ident, field)));
            out.push_str(&format!("\t{ident} {} `{tags}`\n", cx.map_type(field)?));
        }
        out.push_str("}\n\n");
        Ok(out)
    }
}

impl Emitter for GoBackend {
    fn name(&self) -> &'static str {
        "go-types"
    }

    fn language(&self) -> &'static str {
        "go"
    }

    fn extension(&self) -> &'static str {
        "go"
    }

    fn category(&self) -> BackendCategory {
        BackendCategory::Types
    }

    fn naming(&self) -> Naming {
        NAMING
    }

    fn type_table(&self) -> &dyn TypeTable {
        &GoTypes
    }

    fn supports_validation(&self) -> bool {
        true
    }

    fn reserved_types(&self) -> &'static [&'static str] {
        &["ValidationError"]
    }

    fn reserved_fields(&self) -> &'static [&'static str] {
        &["Validate"]
    }

    fn header(&self, cx: &Context<'_>) -> String {
        let mut out = format!("// {GENERATED_BANNER}\n\npackage {}\n\n", cx.package());

        let mut imports = Vec::new();
        if cx.validate() {
            imports.push("fmt");
        }
        if cx.uses(|d| *d == TypeDescriptor::Timestamp) {
            imports.push("time");
        }
        match imports.as_slice() {
            [] => {}
            [single] => out.push_str(&format!("import {}\n\n", quote(single))),
            many => {
                out.push_str("import (\n");
                for import in many {
                    out.push_str(&format!("\t{}\n", quote(import)));
                }
                out.push_str(")\n\n");
            }
        }
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
        // Type names starting with a digit are prefixed with `_`, which
        // cannot be a receiver.
        let receiver = match name.chars().next() {
            Some(c) if c.is_ascii_alphabetic() => c.to_ascii_lowercase().to_string(),
            _ => "x".to_string(),
        };

        let mut out = String::from("// Validate implementation.\n");
        out.push_str(&format!("func ({receiver} *{name}) Validate() error {{\n"));
        for field in &validation.fields {
            let this = format!("{receiver}.{}", cx.field_name(&field.field.name));
            for step in &field.steps {
                out.push_str(&validation_block(&this, field.field, step));
                out.push('\n');
            }
        }
        out.push_str("\treturn nil\n");
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

    fn trailer(&self, cx: &Context<'_>) -> String {
        if cx.validate() {
            UTILS.to_string()
        } else {
            String::new()
        }
    }
}

/// Go statements for one validation step on `this` (e.g. `u.Id`).
fn validation_block(this: &str, field: &Field, step: &Step) -> String {
    let fail = |message: &str| {
        format!(
            "return ValidationError{{Field: {}, Message: {}}}",
            quote(&field.name),
            quote(message)
        )
    };

    match step {
        Step::Default(default) => {
            let (zero, value) = match default {
                DefaultValue::Int(n) => ("0", format!("int64({n})")),
                DefaultValue::String(s) => ("\"\"", quote(s)),
            };
            if field.required {
                format!("\tif {this} == {zero} {{\n\t\t{this} = {value}\n\t}}\n")
            } else {
                format!("\tif {this} == nil || *{this} == {zero} {{\n\t\tdef := {value}\n\t\t{this} = &def\n\t}}\n")
            }
        }
        Step::Required(check) => {
            let condition = match check {
                ZeroCheck::IntZero | ZeroCheck::FloatZero => format!("{this} == 0"),
                ZeroCheck::Empty => format!("{this} == \"\""),
                ZeroCheck::Absent => format!("{this} == nil"),
                ZeroCheck::ZeroInstant => format!("{this}.IsZero()"),
            };
            let message = step.message().unwrap_or_default();
            format!("\tif {condition} {{\n\t\t{}\n\t}}\n", fail(&message))
        }
        Step::Enum(values) => {
            let list = values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(", ");
            let message = step.message().unwrap_or_default();
            let condition = if field.required {
                format!("{this} != \"\" && !oneOf({this}, []string{{{list}}})")
            } else {
                format!("{this} != nil && *{this} != \"\" && !oneOf(*{this}, []string{{{list}}})")
            };
            format!("\tif {condition} {{\n\t\t{}\n\t}}\n", fail(&message))
        }
        Step::Elements(_) => format!(
            "\tfor index := range {this} {{\n\t\tif err := {this}[index].Validate(); err != nil {{\n\t\t\treturn fmt.Errorf(\"element %d: %s\", index, err.Error())\n\t\t}}\n\t}}\n"
        ),
    }
}

/// Generate Go types.
pub fn generate_go_types(schema: &Schema, options: &GenerateOptions) -> Result<String, GenerateError> {
    GO_BACKEND.generate(schema, options)
}

const UTILS: &str = r#"// ValidationError is returned when validation fails.
type ValidationError struct {
	Field   string `json:"field"`
	Message string `json:"message"`
}

// Error implementation.
func (e ValidationError) Error() string {
	return fmt.Sprintf("Field: %s, Message: %s", e.Field, e.Message)
}

// oneOf returns true if s is in the values.
func oneOf(s string, values []string) bool {
	for _, v := range values {
		if s == v {
			return true
		}
	}
	return false
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_with_tags() {
        let mut schema = Schema::new();
        schema.go.package = Some("todo".into());
        schema.go.tags = vec!["json".into(), "yaml".into()];
        schema.add_type(
            TypeDef::new(
                "user",
                vec![
                    Field::required("id", TypeDescriptor::Int).with_description("the user id"),
                    Field::optional("name", TypeDescriptor::String),
                    Field::optional("tags", TypeDescriptor::array(TypeDescriptor::String)),
                ],
            )
            .with_description("a registered user"),
        );
        let options = GenerateOptions {
            validate: false,
            ..Default::default()
        };
        insta::assert_snapshot!(generate_go_types(&schema, &options).unwrap(), @r#"
        // Do not edit, this file was generated by rpcgen.

        package todo

        // User is a registered user.
        type User struct {
        	// Id is the user id.
        	Id int64 `json:"id" yaml:"id"`

        	// Name.
        	Name *string `json:"name" yaml:"name"`

        	// Tags.
        	Tags []string `json:"tags" yaml:"tags"`
        }
        "#);
    }

    #[test]
    fn test_validate_method() {
        let mut schema = Schema::new();
        schema.add_type(TypeDef::new(
            "item",
            vec![
                Field::required("id", TypeDescriptor::Int),
                Field::optional("status", TypeDescriptor::String)
                    .with_enum(["open", "done"])
                    .with_default("open"),
                Field::required("children", TypeDescriptor::array(TypeDescriptor::reference("item"))),
            ],
        ));
        let out = generate_go_types(&schema, &GenerateOptions::default()).unwrap();
        let start = out.find("// Validate implementation.").unwrap();
        let end = out.find("// ValidationError is returned").unwrap();
        insta::assert_snapshot!(out[start..end].trim_end(), @r#"
        // Validate implementation.
        func (i *Item) Validate() error {
        	if i.Id == 0 {
        		return ValidationError{Field: "id", Message: "is required"}
        	}

        	if i.Status == nil || *i.Status == "" {
        		def := "open"
        		i.Status = &def
        	}

        	if i.Status != nil && *i.Status != "" && !oneOf(*i.Status, []string{"open", "done"}) {
        		return ValidationError{Field: "status", Message: "must be one of: \"open\", \"done\""}
        	}

        	if i.Children == nil {
        		return ValidationError{Field: "children", Message: "is required"}
        	}

        	for index := range i.Children {
        		if err := i.Children[index].Validate(); err != nil {
        			return fmt.Errorf("element %d: %s", index, err.Error())
        		}
        	}

        	return nil
        }
        "#);
    }

    #[test]
    fn test_imports() {
        let mut schema = Schema::new();
        schema.add_type(TypeDef::new(
            "event",
            vec![Field::optional("at", TypeDescriptor::Timestamp)],
        ));
        let out = generate_go_types(&schema, &GenerateOptions::default()).unwrap();
        assert!(out.contains("package api\n\nimport (\n\t\"fmt\"\n\t\"time\"\n)\n"));
        assert!(out.contains("\tAt *time.Time `json:\"at\"`"));

        let options = GenerateOptions {
            validate: false,
            package: Some("events".into()),
            ..Default::default()
        };
        let out = generate_go_types(&schema, &options).unwrap();
        assert!(out.contains("package events\n\nimport \"time\"\n"));
        assert!(!out.contains("oneOf"));
    }

    #[test]
    fn test_optional_int_default() {
        let mut schema = Schema::new();
        schema.add_method(
            Method::new("list_items").input(Field::optional("limit", TypeDescriptor::Int).with_default(20)),
        );
        let out = generate_go_types(&schema, &GenerateOptions::default()).unwrap();
        assert!(out.contains("type ListItemsInput struct {"));
        assert!(out.contains("func (l *ListItemsInput) Validate() error {"));
        assert!(out.contains("\tif l.Limit == nil || *l.Limit == 0 {\n\t\tdef := int64(20)\n\t\tl.Limit = &def\n\t}\n"));
    }

    #[test]
    fn test_receiver_does_not_clash_with_default_temporary() {
        let mut schema = Schema::new();
        schema.add_type(TypeDef::new(
            "vote",
            vec![Field::optional("status", TypeDescriptor::String).with_default("open")],
        ));
        let out = generate_go_types(&schema, &GenerateOptions::default()).unwrap();
        assert!(out.contains(
            "func (v *Vote) Validate() error {\n\tif v.Status == nil || *v.Status == \"\" {\n\t\tdef := \"open\"\n\t\tv.Status = &def\n\t}\n"
        ));
    }

    #[test]
    fn test_receiver_for_digit_leading_name() {
        let mut schema = Schema::new();
        schema.add_type(TypeDef::new(
            "2fa_code",
            vec![Field::required("code", TypeDescriptor::String)],
        ));
        let out = generate_go_types(&schema, &GenerateOptions::default()).unwrap();
        assert!(out.contains(") Validate() error {\n\tif x.Code == \"\" {"));
        assert!(!out.contains("func (_ "));
    }

    #[test]
    fn test_validate_field_is_reserved() {
        let mut schema = Schema::new();
        schema.add_type(TypeDef::new(
            "job",
            vec![Field::optional("validate", TypeDescriptor::Bool)],
        ));
        let err = generate_go_types(&schema, &GenerateOptions::default()).unwrap_err();
        assert_eq!(
            err,
            GenerateError::NamingConflict {
                scope: "fields of `job`".into(),
                first: "<built-in>".into(),
                second: "validate".into(),
                identifier: "Validate".into(),
            }
        );

        let options = GenerateOptions {
            validate: false,
            ..Default::default()
        };
        let out = generate_go_types(&schema, &options).unwrap();
        assert!(out.contains("\tValidate *bool `json:\"validate\"`"));
    }
}

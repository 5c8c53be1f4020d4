//! Validation synthesis.
//!
//! Turns the declarative constraints on a field list (defaults, required,
//! enum membership, nested element validity) into an ordered list of steps.
//! Backends render the steps as a `validate` operation; [`Validation::check`]
//! evaluates them directly against JSON values.
//!
//! Per field the steps run in the order default, required, enum, elements.
//! Fields run in declaration order. The first failing step ends validation.

use crate::error::{GenerateError, ValidationFailure};
use crate::resolve::Resolver;
use crate::schema::{Field, Reference, TypeDescriptor};
use serde_json::Value;
use tracing::{debug, warn};

/// Message of a failed required check.
pub const REQUIRED_MESSAGE: &str = "is required";

/// One validation step for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Substitute the default when the value is zero/empty.
    Default(DefaultValue),
    /// Fail with [`REQUIRED_MESSAGE`] when the value is zero/empty/absent.
    Required(ZeroCheck),
    /// Fail unless a non-empty value is one of these.
    Enum(Vec<String>),
    /// Validate each element as the referenced type.
    Elements(Reference),
}

/// A default that can be substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    Int(i64),
    String(String),
}

/// What "missing" means for a required field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroCheck {
    /// Int equal to zero.
    IntZero,
    /// Float equal to zero.
    FloatZero,
    /// Empty string.
    Empty,
    /// Unset array or object.
    Absent,
    /// The zero instant.
    ZeroInstant,
}

/// The steps for one field.
#[derive(Debug, Clone)]
pub struct FieldValidation<'s> {
    pub field: &'s Field,
    pub descriptor: TypeDescriptor,
    pub steps: Vec<Step>,
}

/// The steps for a whole type or method input, in field order.
#[derive(Debug, Clone)]
pub struct Validation<'s> {
    pub type_name: String,
    pub fields: Vec<FieldValidation<'s>>,
}

/// Synthesize the validation of `fields`.
///
/// Only fields with at least one applicable step are included.
pub fn synthesize<'s>(type_name: &str, fields: &'s [Field]) -> Result<Validation<'s>, GenerateError> {
    let mut validations = Vec::new();

    for field in fields {
        let descriptor = field.descriptor()?;
        let steps = field_steps(type_name, field, &descriptor);
        if !steps.is_empty() {
            validations.push(FieldValidation {
                field,
                descriptor,
                steps,
            });
        }
    }

    debug!(type_name, fields = validations.len(), "synthesized validation");
    Ok(Validation {
        type_name: type_name.to_string(),
        fields: validations,
    })
}

fn field_steps(owner: &str, field: &Field, descriptor: &TypeDescriptor) -> Vec<Step> {
    let mut steps = Vec::new();

    if let Some(value) = &field.default {
        if let Some(default) = default_value(owner, field, descriptor, value) {
            steps.push(Step::Default(default));
        }
    }

    if field.required {
        if let Some(check) = zero_check(descriptor) {
            steps.push(Step::Required(check));
        }
    }

    if *descriptor == TypeDescriptor::String && !field.enum_values.is_empty() {
        steps.push(Step::Enum(field.enum_values.clone()));
    }

    if let TypeDescriptor::Array(items) = descriptor {
        if let TypeDescriptor::Ref(reference) = items.as_ref() {
            steps.push(Step::Elements(reference.clone()));
        }
    }

    steps
}

fn default_value(
    owner: &str,
    field: &Field,
    descriptor: &TypeDescriptor,
    value: &Value,
) -> Option<DefaultValue> {
    match (descriptor, value) {
        (TypeDescriptor::Int, Value::Number(n)) if n.is_i64() => n.as_i64().map(DefaultValue::Int),
        (TypeDescriptor::String, Value::String(s)) => Some(DefaultValue::String(s.clone())),
        (TypeDescriptor::Int | TypeDescriptor::String, _) => {
            warn!(owner, field = %field.name, default = %value, "default does not match field type, ignoring");
            None
        }
        _ => {
            debug!(owner, field = %field.name, "defaults are only applied to int and string fields");
            None
        }
    }
}

fn zero_check(descriptor: &TypeDescriptor) -> Option<ZeroCheck> {
    match descriptor {
        TypeDescriptor::Int => Some(ZeroCheck::IntZero),
        TypeDescriptor::Float => Some(ZeroCheck::FloatZero),
        TypeDescriptor::String => Some(ZeroCheck::Empty),
        TypeDescriptor::Array(_) | TypeDescriptor::Object => Some(ZeroCheck::Absent),
        TypeDescriptor::Timestamp => Some(ZeroCheck::ZeroInstant),
        TypeDescriptor::Bool | TypeDescriptor::Ref(_) => None,
    }
}

/// The message of a failed enum check, e.g. `must be one of: "a", "b"`.
pub fn enum_message(values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| Value::from(v.as_str()).to_string())
        .collect();
    format!("must be one of: {}", quoted.join(", "))
}

impl Step {
    /// The failure message of this step, if it can fail.
    pub fn message(&self) -> Option<String> {
        match self {
            Step::Required(_) => Some(REQUIRED_MESSAGE.to_string()),
            Step::Enum(values) => Some(enum_message(values)),
            Step::Default(_) | Step::Elements(_) => None,
        }
    }
}

impl ZeroCheck {
    /// Whether `value` (absent when `None`) counts as missing.
    pub fn is_missing(self, value: Option<&Value>) -> bool {
        match (self, value) {
            (_, None | Some(Value::Null)) => true,
            (ZeroCheck::IntZero | ZeroCheck::FloatZero, Some(Value::Number(n))) => {
                n.as_f64() == Some(0.0)
            }
            (ZeroCheck::Empty, Some(Value::String(s))) => s.is_empty(),
            (ZeroCheck::ZeroInstant, Some(Value::String(s))) => {
                s.is_empty() || s.starts_with("0001-01-01T00:00:00")
            }
            _ => false,
        }
    }
}

impl Validation<'_> {
    /// Number of fields with at least one step.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether any step substitutes a default.
    pub fn has_defaults(&self) -> bool {
        self.fields
            .iter()
            .any(|f| f.steps.iter().any(|s| matches!(s, Step::Default(_))))
    }

    /// Evaluate the steps against a JSON object, substituting defaults in place.
    ///
    /// The outer error reports an unresolvable element type; the inner result
    /// is the (single) validation outcome.
    pub fn check(
        &self,
        resolver: &Resolver<'_>,
        value: &mut Value,
    ) -> Result<Result<(), ValidationFailure>, GenerateError> {
        for validation in &self.fields {
            let name = validation.field.name.as_str();
            for step in &validation.steps {
                if let Err(failure) = check_step(step, name, resolver, value)? {
                    return Ok(Err(failure));
                }
            }
        }
        Ok(Ok(()))
    }
}

fn check_step(
    step: &Step,
    name: &str,
    resolver: &Resolver<'_>,
    value: &mut Value,
) -> Result<Result<(), ValidationFailure>, GenerateError> {
    match step {
        Step::Default(default) => {
            let (check, replacement) = match default {
                DefaultValue::Int(n) => (ZeroCheck::IntZero, Value::from(*n)),
                DefaultValue::String(s) => (ZeroCheck::Empty, Value::from(s.as_str())),
            };
            if check.is_missing(value.get(name)) {
                if let Some(object) = value.as_object_mut() {
                    object.insert(name.to_string(), replacement);
                }
            }
        }
        Step::Required(check) => {
            if check.is_missing(value.get(name)) {
                return Ok(Err(ValidationFailure::field(name, REQUIRED_MESSAGE)));
            }
        }
        Step::Enum(values) => {
            if let Some(s) = value.get(name).and_then(Value::as_str) {
                if !s.is_empty() && !values.iter().any(|v| v == s) {
                    return Ok(Err(ValidationFailure::field(name, enum_message(values))));
                }
            }
        }
        Step::Elements(reference) => {
            let ty = resolver.resolve(name, reference)?;
            let child = synthesize(&ty.name, &ty.properties)?;
            if let Some(Value::Array(items)) = value.get_mut(name) {
                for (i, item) in items.iter_mut().enumerate() {
                    if let Err(failure) = child.check(resolver, item)? {
                        return Ok(Err(ValidationFailure::element(i, failure)));
                    }
                }
            }
        }
    }
    Ok(Ok(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Schema, TypeDef};
    use serde_json::json;

    fn check(schema: &Schema, type_name: &str, mut value: Value) -> Result<Value, String> {
        let resolver = Resolver::new(schema);
        let ty = schema.get_type(type_name).unwrap();
        let validation = synthesize(&ty.name, &ty.properties).unwrap();
        validation
            .check(&resolver, &mut value)
            .unwrap()
            .map(|()| value)
            .map_err(|e| e.to_string())
    }

    fn record_schema() -> Schema {
        let mut schema = Schema::new();
        schema.add_type(TypeDef::new(
            "record",
            vec![
                Field::required("id", TypeDescriptor::Int),
                Field::required("name", TypeDescriptor::String).with_enum(["a", "b"]),
            ],
        ));
        schema
    }

    #[test]
    fn round_trip() {
        let schema = record_schema();
        assert!(check(&schema, "record", json!({ "id": 1, "name": "a" })).is_ok());
        assert_eq!(
            check(&schema, "record", json!({ "id": 0, "name": "a" })).unwrap_err(),
            "Field: id, Message: is required"
        );
        assert_eq!(
            check(&schema, "record", json!({ "id": 1, "name": "c" })).unwrap_err(),
            r#"Field: name, Message: must be one of: "a", "b""#
        );
    }

    #[test]
    fn fail_fast_reports_first_field_only() {
        let schema = record_schema();
        assert_eq!(
            check(&schema, "record", json!({ "id": 0, "name": "" })).unwrap_err(),
            "Field: id, Message: is required"
        );
    }

    #[test]
    fn steps_follow_field_order() {
        let fields = vec![
            Field::optional("note", TypeDescriptor::Bool),
            Field::required("status", TypeDescriptor::String)
                .with_default("open")
                .with_enum(["open", "done"]),
            Field::optional("flag", TypeDescriptor::Bool),
            Field::required("count", TypeDescriptor::Int),
            Field::optional("children", TypeDescriptor::array(TypeDescriptor::reference("node"))),
        ];
        let validation = synthesize("node", &fields).unwrap();

        let names: Vec<&str> = validation.fields.iter().map(|f| f.field.name.as_str()).collect();
        assert_eq!(names, vec!["status", "count", "children"]);
        assert_eq!(
            validation.fields[0].steps,
            vec![
                Step::Default(DefaultValue::String("open".into())),
                Step::Required(ZeroCheck::Empty),
                Step::Enum(vec!["open".into(), "done".into()]),
            ]
        );
        assert_eq!(
            validation.fields[2].steps,
            vec![Step::Elements(crate::schema::Reference::new("#/types/node"))]
        );
    }

    #[test]
    fn step_count_matches_fields_with_rules() {
        let fields = vec![
            Field::required("a", TypeDescriptor::Int),
            Field::optional("b", TypeDescriptor::String),
            Field::optional("c", TypeDescriptor::String).with_enum(["x"]),
            Field::required("d", TypeDescriptor::Bool),
            Field::optional("e", TypeDescriptor::array(TypeDescriptor::reference("t"))),
        ];
        let validation = synthesize("t", &fields).unwrap();
        assert_eq!(validation.len(), 3);
    }

    #[test]
    fn unsupported_defaults_are_ignored() {
        let fields = vec![
            Field::optional("ratio", TypeDescriptor::Float).with_default(0.5),
            Field::optional("enabled", TypeDescriptor::Bool).with_default(true),
            Field::optional("limit", TypeDescriptor::Int).with_default("ten"),
        ];
        let validation = synthesize("settings", &fields).unwrap();
        assert!(validation.is_empty());
        assert!(!validation.has_defaults());
    }

    #[test]
    fn defaults_are_substituted() {
        let mut schema = Schema::new();
        schema.add_type(TypeDef::new(
            "page",
            vec![
                Field::optional("size", TypeDescriptor::Int).with_default(20),
                Field::required("order", TypeDescriptor::String).with_default("asc"),
            ],
        ));
        let value = check(&schema, "page", json!({ "size": 0 })).unwrap();
        assert_eq!(value, json!({ "size": 20, "order": "asc" }));

        let value = check(&schema, "page", json!({ "size": 5, "order": "desc" })).unwrap();
        assert_eq!(value, json!({ "size": 5, "order": "desc" }));
    }

    #[test]
    fn elements_are_validated_with_index() {
        let mut schema = Schema::new();
        schema.add_type(TypeDef::new(
            "node",
            vec![
                Field::required("id", TypeDescriptor::Int),
                Field::optional("children", TypeDescriptor::array(TypeDescriptor::reference("node"))),
            ],
        ));

        let err = check(
            &schema,
            "node",
            json!({ "id": 1, "children": [{ "id": 2 }, { "id": 0 }] }),
        )
        .unwrap_err();
        assert_eq!(err, "element 1: Field: id, Message: is required");

        let err = check(
            &schema,
            "node",
            json!({ "id": 1, "children": [{ "id": 2, "children": [{ "id": 0 }] }] }),
        )
        .unwrap_err();
        assert_eq!(err, "element 0: element 0: Field: id, Message: is required");
    }

    #[test]
    fn required_checks_by_kind() {
        assert!(ZeroCheck::Absent.is_missing(None));
        assert!(!ZeroCheck::Absent.is_missing(Some(&json!([]))));
        assert!(ZeroCheck::FloatZero.is_missing(Some(&json!(0.0))));
        assert!(!ZeroCheck::FloatZero.is_missing(Some(&json!(0.1))));
        assert!(ZeroCheck::ZeroInstant.is_missing(Some(&json!("0001-01-01T00:00:00Z"))));
        assert!(!ZeroCheck::ZeroInstant.is_missing(Some(&json!("2024-05-01T10:00:00Z"))));
        assert!(ZeroCheck::Empty.is_missing(Some(&json!(""))));
    }

    #[test]
    fn empty_enum_value_is_skipped() {
        let fields = vec![Field::optional("kind", TypeDescriptor::String).with_enum(["a"])];
        let validation = synthesize("t", &fields).unwrap();
        let schema = Schema::new();
        let resolver = Resolver::new(&schema);
        let mut value = json!({ "kind": "" });
        assert!(validation.check(&resolver, &mut value).unwrap().is_ok());
    }
}

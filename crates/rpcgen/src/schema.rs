//! Schema model.
//!
//! The in-memory form of an RPC schema document: named types, methods with
//! ordered inputs and outputs, and the fields shared by both. The model is
//! built once (from JSON or programmatically) and treated as immutable by
//! every backend.
//!
//! ```
//! use rpcgen::schema::{Field, Method, Schema, TypeDef, TypeDescriptor};
//!
//! let mut schema = Schema::new();
//! schema.add_type(TypeDef::new(
//!     "user",
//!     vec![
//!         Field::required("id", TypeDescriptor::Int),
//!         Field::optional("tags", TypeDescriptor::array(TypeDescriptor::String)),
//!     ],
//! ));
//! schema.add_method(
//!     Method::new("get_user")
//!         .input(Field::required("id", TypeDescriptor::Int))
//!         .output(Field::optional("user", TypeDescriptor::reference("user"))),
//! );
//! assert!(schema.check().is_ok());
//! ```

use crate::error::{GenerateError, LoadError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::io::Read;

/// Prefix of a reference into the schema's type collection.
const TYPES_PREFIX: &str = "#/types/";

/// A complete schema document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    /// Name of the API.
    pub name: String,
    /// Version of the API.
    pub version: String,
    /// Human description of the API.
    pub description: String,
    /// Go specific settings.
    pub go: GoSettings,
    /// Named object types, in declaration order.
    pub types: Vec<TypeDef>,
    /// Remote operations, in declaration order.
    pub methods: Vec<Method>,
}

/// Go settings carried by the schema document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoSettings {
    /// Package name for generated Go code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Struct tags applied to every field (e.g. `json`, `yaml`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A named object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Fields, in declaration order.
    #[serde(default)]
    pub properties: Vec<Field>,
}

/// A named remote operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub inputs: Vec<Field>,
    #[serde(default)]
    pub outputs: Vec<Field>,
}

/// A member of a type, or an input/output of a method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name as it appears on the wire.
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub ty: TypeSpec,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Allowed values, in declaration order.
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

/// The type of a field as written in the document.
///
/// Either a `type` keyword (with `items` for arrays) or a `$ref` to a named
/// type. Use [`TypeSpec::descriptor`] to obtain the checked form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeSpec {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<TypeSpec>>,
}

/// A by-name pointer to a [`TypeDef`].
///
/// Accepts both `#/types/user` and a bare `user`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reference(String);

/// The closed set of field types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    String,
    Int,
    Float,
    Bool,
    Timestamp,
    Object,
    Array(Box<TypeDescriptor>),
    Ref(Reference),
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a schema document from a JSON string.
    pub fn from_json(input: &str) -> Result<Self, LoadError> {
        let schema: Schema = serde_json::from_str(input)?;
        schema.check()?;
        Ok(schema)
    }

    /// Parse a schema document from a reader.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, LoadError> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        Self::from_json(&input)
    }

    /// Convert an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, LoadError> {
        let schema: Schema = serde_json::from_value(value)?;
        schema.check()?;
        Ok(schema)
    }

    /// Check that type and method names are unique.
    pub fn check(&self) -> Result<(), LoadError> {
        let mut seen = HashSet::new();
        for ty in &self.types {
            if !seen.insert(ty.name.as_str()) {
                return Err(LoadError::DuplicateType(ty.name.clone()));
            }
        }

        let mut seen = HashSet::new();
        for method in &self.methods {
            if !seen.insert(method.name.as_str()) {
                return Err(LoadError::DuplicateMethod(method.name.clone()));
            }
        }

        Ok(())
    }

    pub fn add_type(&mut self, ty: TypeDef) {
        self.types.push(ty);
    }

    pub fn add_method(&mut self, method: Method) {
        self.methods.push(method);
    }

    /// Look up a type by name.
    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Every field of every type and method.
    pub fn fields(&self) -> impl Iterator<Item = &Field> + '_ {
        let type_fields = self.types.iter().flat_map(|t| &t.properties);
        let method_fields = self
            .methods
            .iter()
            .flat_map(|m| m.inputs.iter().chain(&m.outputs));
        type_fields.chain(method_fields)
    }

    /// Every field of every type and method, with an `owner.field` label.
    pub fn labeled_fields(&self) -> impl Iterator<Item = (String, &Field)> + '_ {
        let type_fields = self.types.iter().flat_map(|t| {
            t.properties
                .iter()
                .map(move |f| (format!("{}.{}", t.name, f.name), f))
        });
        let method_fields = self.methods.iter().flat_map(|m| {
            m.inputs
                .iter()
                .chain(&m.outputs)
                .map(move |f| (format!("{}.{}", m.name, f.name), f))
        });
        type_fields.chain(method_fields)
    }
}

impl TypeDef {
    pub fn new(name: impl Into<String>, properties: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            properties,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn input(mut self, field: Field) -> Self {
        self.inputs.push(field);
        self
    }

    pub fn output(mut self, field: Field) -> Self {
        self.outputs.push(field);
        self
    }
}

impl Field {
    pub fn required(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            ty: ty.into(),
            required: true,
            default: None,
            enum_values: Vec::new(),
        }
    }

    pub fn optional(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            required: false,
            ..Self::required(name, ty)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// The checked type of this field.
    pub fn descriptor(&self) -> Result<TypeDescriptor, GenerateError> {
        self.ty.descriptor(&self.name)
    }
}

impl TypeSpec {
    /// Convert to a [`TypeDescriptor`], reporting unknown keywords against `field`.
    ///
    /// A `$ref` takes precedence over a `type` keyword.
    pub fn descriptor(&self, field: &str) -> Result<TypeDescriptor, GenerateError> {
        if let Some(reference) = &self.reference {
            return Ok(TypeDescriptor::Ref(reference.clone()));
        }

        let unhandled = |ty: &str| GenerateError::UnhandledType {
            field: field.to_string(),
            ty: ty.to_string(),
        };

        match self.kind.as_deref() {
            Some("string") => Ok(TypeDescriptor::String),
            Some("int") => Ok(TypeDescriptor::Int),
            Some("float") => Ok(TypeDescriptor::Float),
            Some("bool") => Ok(TypeDescriptor::Bool),
            Some("timestamp") => Ok(TypeDescriptor::Timestamp),
            Some("object") => Ok(TypeDescriptor::Object),
            Some("array") => {
                let items = self
                    .items
                    .as_deref()
                    .ok_or_else(|| unhandled("array without items"))?;
                Ok(TypeDescriptor::Array(Box::new(items.descriptor(field)?)))
            }
            Some(other) => Err(unhandled(other)),
            None => Err(unhandled("<missing>")),
        }
    }
}

impl From<TypeDescriptor> for TypeSpec {
    fn from(descriptor: TypeDescriptor) -> Self {
        let keyword = |kind: &str| TypeSpec {
            kind: Some(kind.to_string()),
            ..TypeSpec::default()
        };

        match descriptor {
            TypeDescriptor::String => keyword("string"),
            TypeDescriptor::Int => keyword("int"),
            TypeDescriptor::Float => keyword("float"),
            TypeDescriptor::Bool => keyword("bool"),
            TypeDescriptor::Timestamp => keyword("timestamp"),
            TypeDescriptor::Object => keyword("object"),
            TypeDescriptor::Array(items) => TypeSpec {
                items: Some(Box::new((*items).into())),
                ..keyword("array")
            },
            TypeDescriptor::Ref(reference) => TypeSpec {
                reference: Some(reference),
                ..TypeSpec::default()
            },
        }
    }
}

impl Reference {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The referenced type name.
    pub fn target(&self) -> &str {
        self.0.strip_prefix(TYPES_PREFIX).unwrap_or(&self.0)
    }

    /// The reference as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TypeDescriptor {
    pub fn array(items: TypeDescriptor) -> Self {
        Self::Array(Box::new(items))
    }

    /// A reference to the type named `name`.
    pub fn reference(name: &str) -> Self {
        Self::Ref(Reference::new(format!("{TYPES_PREFIX}{name}")))
    }

    /// Whether this descriptor, or any nested items descriptor, satisfies `pred`.
    pub fn any(&self, pred: &impl Fn(&TypeDescriptor) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match self {
            TypeDescriptor::Array(items) => items.any(pred),
            _ => false,
        }
    }
}

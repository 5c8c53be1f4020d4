//! Projection of schema types onto target type expressions.

use crate::error::GenerateError;
use crate::naming::{Convention, Naming};
use crate::resolve::Resolver;
use crate::schema::{Field, TypeDescriptor};

/// A target language's type vocabulary.
pub trait TypeTable: Send + Sync {
    fn string(&self) -> &'static str;

    /// 64-bit signed integer.
    fn int(&self) -> &'static str;

    /// 64-bit float.
    fn float(&self) -> &'static str;

    fn bool(&self) -> &'static str;

    /// Canonical date-time type.
    fn timestamp(&self) -> &'static str;

    /// Open key/value mapping.
    ///
    /// Deliberately untyped: `object` fields carry no structure to project.
    fn object(&self) -> &'static str;

    /// Homogeneous sequence of `element`.
    fn array(&self, element: &str) -> String;

    /// Wrap the type of a non-required field.
    fn optional(&self, inner: String, descriptor: &TypeDescriptor) -> String;
}

/// Maps fields to target type expressions.
pub struct TypeMapper<'a> {
    resolver: &'a Resolver<'a>,
    naming: Naming,
    table: &'a dyn TypeTable,
}

impl<'a> TypeMapper<'a> {
    pub fn new(resolver: &'a Resolver<'a>, naming: Naming, table: &'a dyn TypeTable) -> Self {
        Self {
            resolver,
            naming,
            table,
        }
    }

    /// The full type of `field`, wrapped when it is not required.
    pub fn map_type(&self, field: &Field) -> Result<String, GenerateError> {
        let descriptor = field.descriptor()?;
        let expr = self.map_descriptor(&field.name, &descriptor)?;
        if field.required {
            Ok(expr)
        } else {
            Ok(self.table.optional(expr, &descriptor))
        }
    }

    /// The unwrapped type of `descriptor`.
    pub fn map_descriptor(
        &self,
        field: &str,
        descriptor: &TypeDescriptor,
    ) -> Result<String, GenerateError> {
        let t = self.table;
        Ok(match descriptor {
            TypeDescriptor::Ref(reference) => {
                let ty = self.resolver.resolve(field, reference)?;
                self.naming.identifier(&ty.name, Convention::Type)
            }
            TypeDescriptor::String => t.string().to_string(),
            TypeDescriptor::Int => t.int().to_string(),
            TypeDescriptor::Float => t.float().to_string(),
            TypeDescriptor::Bool => t.bool().to_string(),
            TypeDescriptor::Timestamp => t.timestamp().to_string(),
            TypeDescriptor::Object => t.object().to_string(),
            TypeDescriptor::Array(items) => t.array(&self.map_descriptor(field, items)?),
        })
    }
}

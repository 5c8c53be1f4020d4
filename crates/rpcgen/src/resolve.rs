//! Reference resolution.
//!
//! References are resolved by name, on demand. A [`Resolver`] indexes the
//! schema's types once so repeated lookups on large schemas stay cheap.

use crate::error::GenerateError;
use crate::schema::{Reference, Schema, TypeDef, TypeDescriptor};
use std::collections::HashMap;

/// Resolve `reference` against `schema` without building an index.
pub fn resolve<'s>(
    schema: &'s Schema,
    field: &str,
    reference: &Reference,
) -> Result<&'s TypeDef, GenerateError> {
    schema
        .get_type(reference.target())
        .ok_or_else(|| unresolved(field, reference))
}

/// Name-indexed view over a schema's types.
#[derive(Debug)]
pub struct Resolver<'s> {
    schema: &'s Schema,
    index: HashMap<&'s str, &'s TypeDef>,
}

impl<'s> Resolver<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        let mut index = HashMap::with_capacity(schema.types.len());
        for ty in &schema.types {
            index.entry(ty.name.as_str()).or_insert(ty);
        }
        Self { schema, index }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Resolve the type `reference` points to.
    ///
    /// `field` names the field holding the reference, for error reporting.
    pub fn resolve(&self, field: &str, reference: &Reference) -> Result<&'s TypeDef, GenerateError> {
        self.index
            .get(reference.target())
            .copied()
            .ok_or_else(|| unresolved(field, reference))
    }

    /// Resolve the reference at the bottom of `descriptor`, looking through arrays.
    ///
    /// Returns `None` for descriptors that bottom out in a primitive.
    pub fn resolve_descriptor(
        &self,
        field: &str,
        descriptor: &TypeDescriptor,
    ) -> Result<Option<&'s TypeDef>, GenerateError> {
        match descriptor {
            TypeDescriptor::Ref(reference) => self.resolve(field, reference).map(Some),
            TypeDescriptor::Array(items) => self.resolve_descriptor(field, items),
            _ => Ok(None),
        }
    }

    /// Check every field descriptor and reference in the schema.
    ///
    /// Errors name the field as `owner.field`.
    pub fn check_all(&self) -> Result<(), GenerateError> {
        for (label, field) in self.schema.labeled_fields() {
            let descriptor = field.ty.descriptor(&label)?;
            self.resolve_descriptor(&label, &descriptor)?;
        }
        Ok(())
    }
}

fn unresolved(field: &str, reference: &Reference) -> GenerateError {
    GenerateError::UnresolvedReference {
        field: field.to_string(),
        target: reference.target().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Field, Method, TypeDef};

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema.add_type(TypeDef::new(
            "user",
            vec![
                Field::required("id", TypeDescriptor::Int),
                Field::optional(
                    "friends",
                    TypeDescriptor::array(TypeDescriptor::reference("user")),
                ),
            ],
        ));
        schema
    }

    #[test]
    fn resolves_by_name() {
        let schema = schema();
        let resolver = Resolver::new(&schema);
        let ty = resolver.resolve("owner", &Reference::new("#/types/user")).unwrap();
        assert_eq!(ty.name, "user");
        assert_eq!(
            resolve(&schema, "owner", &Reference::new("user")).unwrap().name,
            "user"
        );
    }

    #[test]
    fn resolves_through_arrays() {
        let schema = schema();
        let resolver = Resolver::new(&schema);
        let nested = TypeDescriptor::array(TypeDescriptor::array(TypeDescriptor::reference("user")));
        let ty = resolver.resolve_descriptor("matrix", &nested).unwrap();
        assert_eq!(ty.map(|t| t.name.as_str()), Some("user"));
        assert!(
            resolver
                .resolve_descriptor("tags", &TypeDescriptor::array(TypeDescriptor::String))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn self_reference_is_legal() {
        let schema = schema();
        assert!(Resolver::new(&schema).check_all().is_ok());
    }

    #[test]
    fn missing_type_names_field_and_target() {
        let mut schema = schema();
        schema.add_method(
            Method::new("get_team").output(Field::required("team", TypeDescriptor::reference("team"))),
        );
        let err = Resolver::new(&schema).check_all().unwrap_err();
        assert_eq!(
            err,
            GenerateError::UnresolvedReference {
                field: "get_team.team".into(),
                target: "team".into(),
            }
        );
    }

    #[test]
    fn missing_items_reference_is_reported() {
        let mut schema = schema();
        schema.types[0].properties.push(Field::optional(
            "groups",
            TypeDescriptor::array(TypeDescriptor::reference("group")),
        ));
        assert!(matches!(
            Resolver::new(&schema).check_all(),
            Err(GenerateError::UnresolvedReference { field, target })
                if field == "user.groups" && target == "group"
        ));
    }
}

//! Node identity: the contract for globally-identifiable types.
//!
//! Every concrete type in a relay schema exposes an `id: ID!` field whose value encodes
//! the type's tag and the record's raw identifier as one opaque token, and implements
//! the shared `Node` interface so clients can re-fetch any object generically. This
//! module defines the [`RelayType`] trait that concrete types implement; the shared
//! synthesis lives in the [registry](super::registry).

use super::{connection::ConnectionSpec, global_id, Error, Item};
use async_graphql::dynamic::{Field, FieldFuture, FieldValue, TypeRef};
use async_graphql::Value;
use async_trait::async_trait;
use std::sync::Arc;

/// A concrete GraphQL type with a global identity and, optionally, named relations to
/// paginated collections.
///
/// Implementations describe what is specific to the type; the registry synthesizes the
/// rest. Only [`name`](Self::name), [`fields`](Self::fields), and
/// [`resolve_by_id`](Self::resolve_by_id) are required.
#[async_trait]
pub trait RelayType: Send + Sync {
    /// The GraphQL object type name.
    fn name(&self) -> &str;

    /// The type's own fields.
    ///
    /// The `id` field and one connection field per declared relation are synthesized
    /// and must not be listed here.
    fn fields(&self) -> Vec<Field>;

    /// The type's named relations to paginated collections.
    fn connections(&self) -> Vec<(String, ConnectionSpec)> {
        Vec::new()
    }

    /// Extract the raw identifier from a source record.
    ///
    /// The default reads the `id` member; override to bind the codec to another
    /// primary key.
    fn identifier(&self, item: &Item) -> String {
        match item.get("id") {
            Some(Item::String(id)) => id.clone(),
            Some(value) => value.to_string(),
            None => String::new(),
        }
    }

    /// Fetch the record with the given raw identifier.
    ///
    /// `Ok(None)` surfaces as a GraphQL null; returning [`Error::NotFound`] makes a
    /// miss a field error instead. Which of the two is the implementing type's policy.
    async fn resolve_by_id(&self, raw_id: &str) -> Result<Option<Item>, Error>;
}

/// The synthesized `id: ID!` field: the type's tag and the record's identifier, encoded
/// as one opaque token.
pub(crate) fn id_field(ty: Arc<dyn RelayType>) -> Field {
    Field::new("id", TypeRef::named_nn(TypeRef::ID), move |ctx| {
        let ty = Arc::clone(&ty);
        FieldFuture::new(async move {
            let item = ctx.parent_value.try_downcast_ref::<Item>()?;
            let id = global_id::encode(&global_id::type_tag(ty.name()), ty.identifier(item));
            Ok(Some(FieldValue::value(String::from(id))))
        })
    })
}

/// A plain data field backed by the same-named member of the source record.
///
/// The value is converted according to its JSON type; an absent or null member
/// resolves to null.
pub fn item_field(name: impl Into<String>, ty: TypeRef) -> Field {
    let name = name.into();
    let member = name.clone();
    Field::new(name, ty, move |ctx| {
        let member = member.clone();
        FieldFuture::new(async move {
            let item = ctx.parent_value.try_downcast_ref::<Item>()?;
            match item.get(&member) {
                None | Some(Item::Null) => Ok(None),
                Some(value) => Ok(Some(FieldValue::value(Value::from_json(value.clone())?))),
            }
        })
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    struct Probe;

    #[async_trait]
    impl RelayType for Probe {
        fn name(&self) -> &str {
            "Probe"
        }

        fn fields(&self) -> Vec<Field> {
            Vec::new()
        }

        async fn resolve_by_id(&self, _raw_id: &str) -> Result<Option<Item>, Error> {
            Ok(None)
        }
    }

    #[test]
    fn test_default_identifier() {
        assert_eq!(Probe.identifier(&json!({ "id": "abc" })), "abc");
        assert_eq!(Probe.identifier(&json!({ "id": 3 })), "3");
        assert_eq!(Probe.identifier(&json!({ "name": "no id" })), "");
    }
}

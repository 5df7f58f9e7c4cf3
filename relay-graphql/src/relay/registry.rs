//! The schema-build-time registry binding concrete types to the shared machinery.
//!
//! A [`TypeRegistry`] is constructed once while the schema is being assembled, has
//! every concrete [`RelayType`] registered into it, and is then
//! [applied](TypeRegistry::apply) to the schema builder. It owns the names of the two
//! collaborator types every relay schema shares (the `Node` interface and the
//! page-info type) and is passed explicitly wherever those names are needed; nothing
//! here is global, and nothing is mutated after the schema is built.

use super::{
    connection::{connection_field, connection_object, edge_object},
    global_id,
    node::{id_field, RelayType},
    page::Page,
    Error,
};
use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, InputValue, Interface, InterfaceField, Object, SchemaBuilder,
    TypeRef,
};
use std::collections::HashMap;
use std::sync::Arc;

/// The registry of concrete relay types, assembled once at schema-build time.
pub struct TypeRegistry {
    node_name: String,
    page_info_name: String,
    types: Vec<Object>,
    fetchers: HashMap<String, Arc<dyn RelayType>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// A registry using the conventional collaborator type names `Node` and `PageInfo`.
    pub fn new() -> Self {
        Self::with_collaborators("Node", "PageInfo")
    }

    /// A registry using custom names for the node interface and the page-info type.
    pub fn with_collaborators(node: impl Into<String>, page_info: impl Into<String>) -> Self {
        Self {
            node_name: node.into(),
            page_info_name: page_info.into(),
            types: Vec::new(),
            fetchers: HashMap::new(),
        }
    }

    /// The name of the shared node interface.
    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// The name of the page-info type.
    pub fn page_info_name(&self) -> &str {
        &self.page_info_name
    }

    /// Register a concrete type.
    ///
    /// Synthesizes the type's object (its own fields, the `id` field, and one
    /// connection field per declared relation, implementing the node interface) along
    /// with the edge and connection types for each relation, and records the type's
    /// fetcher under its tag for generic re-fetch.
    pub fn register(&mut self, ty: Arc<dyn RelayType>) {
        let mut object = Object::new(ty.name().to_string()).implement(&self.node_name);
        object = object.field(id_field(Arc::clone(&ty)));
        for field in ty.fields() {
            object = object.field(field);
        }
        for (relation, spec) in ty.connections() {
            object = object.field(connection_field(&relation, &spec));
            self.types.push(edge_object(&relation, &spec));
            self.types
                .push(connection_object(&relation, &spec, &self.page_info_name));
        }
        tracing::debug!(ty = ty.name(), "registered relay type");
        self.types.push(object);
        self.fetchers
            .insert(global_id::type_tag(ty.name()), ty);
    }

    /// The root field `node(id: ID!): Node`, re-fetching any object by global id.
    pub fn node_field(&self) -> Field {
        let fetchers = self.fetchers.clone();
        Field::new("node", TypeRef::named(&self.node_name), move |ctx| {
            let fetchers = fetchers.clone();
            FieldFuture::new(async move {
                let token = match ctx.args.get("id") {
                    Some(value) => value.string()?.to_string(),
                    None => return Err(Error::custom("missing id argument").into()),
                };
                Ok(resolve_node(&fetchers, &token).await?)
            })
        })
        .argument(
            InputValue::new("id", TypeRef::named_nn(TypeRef::ID))
                .description("The global id of the node to fetch."),
        )
    }

    /// The root field `nodes(ids: [ID!]!): [Node]`, the plural form of
    /// [`node_field`](Self::node_field).
    pub fn nodes_field(&self) -> Field {
        let fetchers = self.fetchers.clone();
        Field::new("nodes", TypeRef::named_list_nn(&self.node_name), move |ctx| {
            let fetchers = fetchers.clone();
            FieldFuture::new(async move {
                let Some(accessor) = ctx.args.get("ids") else {
                    return Err(Error::custom("missing ids argument").into());
                };
                let ids = accessor.list()?;
                let mut nodes = Vec::new();
                for id in ids.iter() {
                    let token = id.string()?;
                    nodes.push(
                        resolve_node(&fetchers, token)
                            .await?
                            .unwrap_or(FieldValue::NULL),
                    );
                }
                Ok(Some(FieldValue::list(nodes)))
            })
        })
        .argument(
            InputValue::new("ids", TypeRef::named_nn_list_nn(TypeRef::ID))
                .description("The global ids of the nodes to fetch."),
        )
    }

    /// Register the node interface, the page-info type, and every synthesized type.
    pub fn apply(self, builder: SchemaBuilder) -> SchemaBuilder {
        let node = Interface::new(self.node_name)
            .field(InterfaceField::new("id", TypeRef::named_nn(TypeRef::ID)));
        let mut builder = builder
            .register(node)
            .register(page_info_object(&self.page_info_name));
        for ty in self.types {
            builder = builder.register(ty);
        }
        builder
    }
}

/// Decode a global id and dispatch to the owning type's fetcher.
async fn resolve_node(
    fetchers: &HashMap<String, Arc<dyn RelayType>>,
    token: &str,
) -> Result<Option<FieldValue<'static>>, Error> {
    let (tag, raw_id) = global_id::decode_type_and_id(token)?;
    let Some(ty) = fetchers.get(&tag) else {
        return Err(Error::MalformedIdentifier {
            reason: format!("unknown type tag {tag:?}"),
        });
    };
    tracing::debug!(tag = %tag, id = %raw_id, "resolving node by global id");
    let item = ty.resolve_by_id(&raw_id).await?;
    Ok(item.map(|item| FieldValue::owned_any(item).with_type(ty.name().to_string())))
}

/// The default page-info type: boundary fields computed from the page itself.
fn page_info_object(name: &str) -> Object {
    Object::new(name)
        .field(Field::new(
            "hasNextPage",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            |ctx| {
                FieldFuture::new(async move {
                    let page = ctx.parent_value.try_downcast_ref::<Page>()?;
                    Ok(Some(FieldValue::value(page.has_next())))
                })
            },
        ))
        .field(Field::new(
            "hasPreviousPage",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            |ctx| {
                FieldFuture::new(async move {
                    let page = ctx.parent_value.try_downcast_ref::<Page>()?;
                    Ok(Some(FieldValue::value(page.has_previous())))
                })
            },
        ))
        .field(Field::new(
            "startCursor",
            TypeRef::named(TypeRef::STRING),
            |ctx| {
                FieldFuture::new(async move {
                    let page = ctx.parent_value.try_downcast_ref::<Page>()?;
                    Ok(page
                        .start_cursor()
                        .map(|cursor| FieldValue::value(String::from(cursor))))
                })
            },
        ))
        .field(Field::new(
            "endCursor",
            TypeRef::named(TypeRef::STRING),
            |ctx| {
                FieldFuture::new(async move {
                    let page = ctx.parent_value.try_downcast_ref::<Page>()?;
                    Ok(page
                        .end_cursor()
                        .map(|cursor| FieldValue::value(String::from(cursor))))
                })
            },
        ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::relay::{ConnectionSpec, Item};
    use async_trait::async_trait;

    struct Probe;

    #[async_trait]
    impl RelayType for Probe {
        fn name(&self) -> &str {
            "Probe"
        }

        fn fields(&self) -> Vec<Field> {
            Vec::new()
        }

        fn connections(&self) -> Vec<(String, ConnectionSpec)> {
            vec![("readings".into(), ConnectionSpec::new("Reading"))]
        }

        async fn resolve_by_id(&self, _raw_id: &str) -> Result<Option<Item>, Error> {
            Ok(None)
        }
    }

    #[test]
    fn test_register_synthesizes_relation_types() {
        let mut registry = TypeRegistry::new();
        registry.register(Arc::new(Probe));

        // The probe object itself plus an edge and a connection type for the relation.
        assert_eq!(registry.types.len(), 3);
        assert!(registry.fetchers.contains_key("probe"));
    }

    #[test]
    fn test_collaborator_names() {
        let registry = TypeRegistry::with_collaborators("Refetchable", "Paging");
        assert_eq!(registry.node_name(), "Refetchable");
        assert_eq!(registry.page_info_name(), "Paging");
    }
}

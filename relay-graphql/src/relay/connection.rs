//! Synthesis of edge and connection types for declared relations.
//!
//! For a relation named `ships` targeting `Ship` elements, the builder synthesizes a
//! `ShipsEdge` type (`node`, `cursor`), a `ShipsConnection` type (`edges`, `pageInfo`,
//! `totalCount`), and a `ships(first: Int, after: String)` field on the owning type.
//! Synthesis happens once per declared relation at schema-build time; the resulting
//! types are immutable and shared across all requests.
//!
//! Each step of the default resolution pipeline can be overridden per relation through
//! the strategy values on [`ConnectionSpec`]: how the page is produced from the source
//! record ([`ResolveConnection`]), how cursors are attached to its items
//! ([`InjectCursors`]), and how a single edge's cursor is read back
//! ([`ResolveCursor`]).

use super::{
    page::{paginate, Page, PageArgs, CURSOR_FIELD},
    Error, Item,
};
use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, Object, TypeRef};
use derivative::Derivative;
use std::sync::Arc;

/// Produce the [`Page`] backing one connection field invocation.
///
/// The default pipeline reads the relation-named member off the source record and
/// slices it with [`paginate`]; supply an implementation of this trait to fetch the
/// collection elsewhere or to pre-shape the page. Plain closures implement it.
pub trait ResolveConnection: Send + Sync {
    /// Produce a page from the source record and the client's pagination arguments.
    fn resolve(&self, source: &Item, args: &PageArgs) -> Result<Page, Error>;
}

impl<F> ResolveConnection for F
where
    F: Fn(&Item, &PageArgs) -> Result<Page, Error> + Send + Sync,
{
    fn resolve(&self, source: &Item, args: &PageArgs) -> Result<Page, Error> {
        self(source, args)
    }
}

/// Attach cursors to a page's items, producing the edge list.
///
/// The default is [`Page::items_with_cursors`]. An implementation that skips injection
/// leaves the edges without cursors; the default cursor resolution then yields the
/// empty string.
pub trait InjectCursors: Send + Sync {
    /// The page's items, with whatever cursors this strategy attaches.
    fn inject(&self, page: &Page) -> Result<Vec<Item>, Error>;
}

impl<F> InjectCursors for F
where
    F: Fn(&Page) -> Result<Vec<Item>, Error> + Send + Sync,
{
    fn inject(&self, page: &Page) -> Result<Vec<Item>, Error> {
        self(page)
    }
}

/// Compute the cursor of a single edge from its backing item.
pub trait ResolveCursor: Send + Sync {
    /// The cursor for the edge backed by `node`.
    fn resolve(&self, node: &Item) -> Result<String, Error>;
}

impl<F> ResolveCursor for F
where
    F: Fn(&Item) -> Result<String, Error> + Send + Sync,
{
    fn resolve(&self, node: &Item) -> Result<String, Error> {
        self(node)
    }
}

/// The declaration of one named relation to a paginated collection.
///
/// Declared statically per concrete type (see
/// [`RelayType::connections`](super::RelayType::connections)); immutable once the
/// schema is built.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct ConnectionSpec {
    node_type: String,
    #[derivative(Debug = "ignore")]
    resolve: Option<Arc<dyn ResolveConnection>>,
    #[derivative(Debug = "ignore")]
    inject_cursors: Option<Arc<dyn InjectCursors>>,
    #[derivative(Debug = "ignore")]
    resolve_cursor: Option<Arc<dyn ResolveCursor>>,
}

impl ConnectionSpec {
    /// Declare a relation to a collection of `node_type` elements.
    ///
    /// A list-shaped type reference is unwrapped to its element type first, so wrapping
    /// an already-list-valued reference cannot produce a list of lists.
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: unwrap_list(&node_type.into()),
            resolve: None,
            inject_cursors: None,
            resolve_cursor: None,
        }
    }

    /// The element type of this relation.
    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    /// Override how the connection field produces its page.
    pub fn resolve_with(mut self, resolve: impl ResolveConnection + 'static) -> Self {
        self.resolve = Some(Arc::new(resolve));
        self
    }

    /// Override how cursors are attached to the page's items.
    pub fn inject_cursors_with(mut self, inject: impl InjectCursors + 'static) -> Self {
        self.inject_cursors = Some(Arc::new(inject));
        self
    }

    /// Override how a single edge's cursor is computed.
    pub fn resolve_cursor_with(mut self, resolve: impl ResolveCursor + 'static) -> Self {
        self.resolve_cursor = Some(Arc::new(resolve));
        self
    }
}

/// The synthesized edge type name for a relation.
pub fn edge_type_name(relation: &str) -> String {
    format!("{}Edge", capitalize(relation))
}

/// The synthesized connection type name for a relation.
pub fn connection_type_name(relation: &str) -> String {
    format!("{}Connection", capitalize(relation))
}

/// Strip list and non-null wrappers from a type reference, leaving the element type.
///
/// Idempotent: a bare element type passes through unchanged.
fn unwrap_list(ty: &str) -> String {
    let mut name = ty.trim();
    loop {
        let stripped = name.trim_end_matches('!');
        match stripped
            .strip_prefix('[')
            .and_then(|inner| inner.strip_suffix(']'))
        {
            Some(inner) => name = inner.trim(),
            None => return stripped.to_string(),
        }
    }
}

/// Capitalize the first letter of a relation name.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The shared cursor-resolution rule: read the cursor previously injected into the
/// item.
///
/// Injection must have run earlier in the same request; an edge list produced by a
/// custom strategy that skipped injection resolves to the empty string rather than an
/// error.
fn default_cursor(item: &Item) -> String {
    item.get(CURSOR_FIELD)
        .and_then(Item::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Synthesize the edge type for a relation: an element of the collection paired with
/// its cursor.
pub(crate) fn edge_object(relation: &str, spec: &ConnectionSpec) -> Object {
    let cursor_override = spec.resolve_cursor.clone();
    Object::new(edge_type_name(relation))
        .field(Field::new(
            "node",
            TypeRef::named_nn(spec.node_type()),
            |ctx| {
                FieldFuture::new(async move {
                    // The edge's backing value is the node itself.
                    let item = ctx.parent_value.try_downcast_ref::<Item>()?;
                    Ok(Some(FieldValue::owned_any(item.clone())))
                })
            },
        ))
        .field(Field::new(
            "cursor",
            TypeRef::named_nn(TypeRef::STRING),
            move |ctx| {
                let cursor_override = cursor_override.clone();
                FieldFuture::new(async move {
                    let item = ctx.parent_value.try_downcast_ref::<Item>()?;
                    let cursor = match &cursor_override {
                        Some(resolve) => resolve.resolve(item)?,
                        None => default_cursor(item),
                    };
                    Ok(Some(FieldValue::value(cursor)))
                })
            },
        ))
}

/// Synthesize the connection type for a relation: the edge list, the page boundary
/// information, and the collection total.
pub(crate) fn connection_object(
    relation: &str,
    spec: &ConnectionSpec,
    page_info_type: &str,
) -> Object {
    let inject_override = spec.inject_cursors.clone();
    Object::new(connection_type_name(relation))
        .field(Field::new(
            "edges",
            TypeRef::named_list(edge_type_name(relation)),
            move |ctx| {
                let inject_override = inject_override.clone();
                FieldFuture::new(async move {
                    let page = ctx.parent_value.try_downcast_ref::<Page>()?;
                    let items = match &inject_override {
                        Some(inject) => inject.inject(page)?,
                        None => page.items_with_cursors(),
                    };
                    Ok(Some(FieldValue::list(
                        items.into_iter().map(FieldValue::owned_any),
                    )))
                })
            },
        ))
        .field(Field::new(
            "pageInfo",
            TypeRef::named_nn(page_info_type.to_string()),
            |ctx| {
                FieldFuture::new(async move {
                    // The page-info type reads its boundary fields off the page itself.
                    let page = ctx.parent_value.try_downcast_ref::<Page>()?;
                    Ok(Some(FieldValue::owned_any(page.clone())))
                })
            },
        ))
        .field(Field::new(
            "totalCount",
            TypeRef::named_nn(TypeRef::INT),
            |ctx| {
                FieldFuture::new(async move {
                    let page = ctx.parent_value.try_downcast_ref::<Page>()?;
                    Ok(Some(FieldValue::value(page.total)))
                })
            },
        ))
}

/// Synthesize the connection field exposed on the owning type.
///
/// The resolver produces the page consumed by the connection type's own resolvers:
/// either through the relation's [`ResolveConnection`] strategy, or by reading the
/// relation-named member off the source record and slicing it. A missing or non-list
/// member is an empty collection.
pub(crate) fn connection_field(relation: &str, spec: &ConnectionSpec) -> Field {
    let name = relation.to_string();
    let resolve_override = spec.resolve.clone();
    Field::new(
        relation,
        TypeRef::named_nn(connection_type_name(relation)),
        move |ctx| {
            let name = name.clone();
            let resolve_override = resolve_override.clone();
            FieldFuture::new(async move {
                let source = ctx.parent_value.try_downcast_ref::<Item>()?;
                let args = PageArgs::from_ctx(&ctx)?;
                let page = match &resolve_override {
                    Some(resolve) => resolve.resolve(source, &args)?,
                    None => {
                        let collection = match source.get(&name) {
                            Some(Item::Array(items)) => items.clone(),
                            _ => Vec::new(),
                        };
                        paginate(collection, &args)?
                    }
                };
                tracing::debug!(relation = %name, total = page.total, "resolved connection");
                Ok(Some(FieldValue::owned_any(page)))
            })
        },
    )
    .argument(
        InputValue::new("first", TypeRef::named(TypeRef::INT))
            .description("Return at most this many edges."),
    )
    .argument(
        InputValue::new("after", TypeRef::named(TypeRef::STRING))
            .description("Return edges after the given cursor."),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_names() {
        assert_eq!(edge_type_name("ships"), "ShipsEdge");
        assert_eq!(connection_type_name("ships"), "ShipsConnection");
        assert_eq!(edge_type_name("crewMembers"), "CrewMembersEdge");
    }

    #[test]
    fn test_unwrap_list() {
        assert_eq!(unwrap_list("Ship"), "Ship");
        assert_eq!(unwrap_list("[Ship]"), "Ship");
        assert_eq!(unwrap_list("[Ship!]!"), "Ship");
        assert_eq!(unwrap_list("[[Ship]]"), "Ship");
    }

    #[test]
    fn test_wrapping_a_list_type_is_idempotent() {
        // Declaring the relation against a list-shaped reference produces the same
        // shape as declaring it against the element type.
        let from_element = ConnectionSpec::new("Ship");
        let from_list = ConnectionSpec::new("[Ship]");
        assert_eq!(from_element.node_type(), from_list.node_type());
    }

    #[test]
    fn test_default_cursor_reads_injected_member() {
        let mut item = json!({ "id": 1 });
        item[CURSOR_FIELD] = json!("opaque");
        assert_eq!(default_cursor(&item), "opaque");
    }

    #[test]
    fn test_default_cursor_without_injection_is_empty() {
        assert_eq!(default_cursor(&json!({ "id": 1 })), "");
        assert_eq!(default_cursor(&json!(7)), "");
    }

    #[test]
    fn test_spec_debug_skips_strategies() {
        let spec = ConnectionSpec::new("Ship")
            .resolve_cursor_with(|_: &Item| Ok::<String, Error>("fixed".into()));
        let debug = format!("{spec:?}");
        assert!(debug.contains("Ship"));
    }
}

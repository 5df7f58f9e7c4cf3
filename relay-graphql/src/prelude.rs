//! Common items that you will always want in scope when building a relay schema.

pub use crate::relay::{
    connection::{ConnectionSpec, InjectCursors, ResolveConnection, ResolveCursor},
    global_id,
    node::{item_field, RelayType},
    page::{paginate, Page, PageArgs},
    registry::TypeRegistry,
    Error, Item,
};
pub use async_graphql::{self, value};

//! Relay GraphQL adds Relay-style cursor pagination and global object identification to
//! a dynamically built GraphQL schema. It consists of two cooperating pieces:
//!
//! * A [global identifier](relay::global_id) codec, which packs a type name and a raw,
//!   application-level identifier into one opaque, reversible token. Tokens serve both
//!   as node identities (for generic re-fetch through the shared `Node` interface) and
//!   as pagination cursors.
//! * A [connection builder](relay::connection), which takes the relations a type
//!   declares to list-valued collections and synthesizes the Relay connection machinery
//!   around each one: an edge type, a connection (paged list) type, and default
//!   resolvers that slice a collection into a [page](relay::page) and attach a cursor to
//!   every item.
//!
//! The GraphQL execution engine itself is [`async_graphql`]; this crate only builds
//! [`dynamic`](async_graphql::dynamic) types and resolvers on top of it. Applications
//! describe their concrete types by implementing [`RelayType`](relay::RelayType) and
//! registering them with a [`TypeRegistry`](relay::TypeRegistry), which assembles the
//! schema once at startup. Everything the registry produces is immutable afterwards, so
//! the synthesized types can be shared freely across concurrent requests.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

pub mod prelude;
pub mod relay;

// Re-export `async_graphql` directly as an escape hatch.
pub extern crate async_graphql;

/// Initialize tracing.
pub fn init_logging() {
    static ONCE: Once = Once::new();

    ONCE.call_once(|| {
        color_eyre::install().unwrap();
        tracing_subscriber::fmt()
            .with_ansi(true)
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    });
}

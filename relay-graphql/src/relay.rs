//! Relay-style cursor pagination and global object identification.
//!
//! The entrypoint to this module is the [`RelayType`] trait, which a concrete entity
//! type implements to describe its fields, its named relations to paginated
//! collections, and how to re-fetch one of its records by raw identifier. The
//! [`TypeRegistry`] consumes those descriptions at schema-build time and synthesizes
//! the surrounding machinery: a global `id` field on every type, the shared `Node`
//! interface, a `node(id:)` re-fetch field for the query root, and an edge/connection
//! type pair with default resolvers for every declared relation.
//!
//! At request time the synthesized connection resolvers run the
//! [pagination engine](page): a pure, synchronous transform from an already-materialized
//! collection plus `first`/`after` arguments to a windowed [`Page`] with opaque,
//! deterministic, decodable cursors. Nothing in this module performs I/O; fetching the
//! underlying collection belongs to the host application's own resolvers.

use std::fmt::Display;

use snafu::Snafu;

pub mod connection;
pub mod global_id;
pub mod node;
pub mod page;
pub mod registry;

pub use connection::ConnectionSpec;
pub use node::RelayType;
pub use page::{Page, PageArgs};
pub use registry::TypeRegistry;

/// A duck-typed source record.
///
/// Collections handed to the pagination engine are ordered sequences of items, where an
/// item is a JSON object whose members are read by name. Items are owned by the host
/// application; this module treats them as read-only input, except for the single
/// cursor member injected into copies of paginated items (see [`page::CURSOR_FIELD`]).
pub type Item = serde_json::Value;

/// Errors encountered while resolving relay fields.
///
/// All of these are recoverable at the field level: a failing field surfaces as a
/// GraphQL field error without failing the rest of the request.
#[derive(Debug, Snafu)]
pub enum Error {
    /// A token from client input that does not round-trip through the global id codec.
    #[snafu(display("malformed identifier: {reason}"))]
    MalformedIdentifier { reason: String },

    /// A generic re-fetch found no record for a raw identifier.
    ///
    /// Whether a miss is this error or a plain `None` is each concrete type's policy;
    /// see [`RelayType::resolve_by_id`].
    #[snafu(display("no {ty} with id {id}"))]
    NotFound { ty: String, id: String },

    /// A pagination argument outside its valid range.
    #[snafu(display("invalid {name} argument: {value}"))]
    InvalidArgument { name: &'static str, value: i64 },

    /// An error in the host application's resolver.
    #[snafu(display("{message}"))]
    Custom { message: String },
}

impl Error {
    /// An error in the host application's resolver.
    pub fn custom(message: impl Display) -> Self {
        Self::Custom {
            message: message.to_string(),
        }
    }
}

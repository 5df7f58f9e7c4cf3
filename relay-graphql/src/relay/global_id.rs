//! Encoding and decoding of opaque global identifiers.
//!
//! A global identifier packs a type name and a raw, application-level identifier into a
//! single opaque token which clients can hand back to re-fetch any object generically.
//! Pagination cursors use the same scheme under the reserved [`CURSOR_TYPE`] namespace.
//! The transform is pure and deterministic: the same input always yields the same
//! token, tokens never expire, and decoding recovers exactly what was encoded. It is
//! obfuscation, not security; tokens carry no integrity signature.

use super::Error;
use base64::{engine::general_purpose::STANDARD, Engine};
use derive_more::{Deref, Display, From, Into};

/// Separates the type name from the raw identifier inside a token.
///
/// Type names must not contain the separator; raw identifiers may, since decoding
/// splits at the first occurrence only.
const SEPARATOR: char = ':';

/// The namespace under which pagination cursors are encoded.
pub const CURSOR_TYPE: &str = "arrayconnection";

/// An opaque token identifying an object, or a position within a paginated sequence.
#[derive(Clone, Debug, Deref, Display, Eq, From, Into, PartialEq)]
pub struct GlobalId(String);

/// Encode a type name and raw identifier into one opaque token.
pub fn encode(type_name: &str, raw_id: impl std::fmt::Display) -> GlobalId {
    GlobalId(STANDARD.encode(format!("{type_name}{SEPARATOR}{raw_id}")))
}

/// Encode a cursor value under the shared [`CURSOR_TYPE`] namespace.
pub fn encode_cursor(value: i64) -> GlobalId {
    encode(CURSOR_TYPE, value)
}

/// Decode the raw identifier component of a token.
pub fn decode(token: &str) -> Result<String, Error> {
    decode_type_and_id(token).map(|(_, raw_id)| raw_id)
}

/// Decode both components of a token.
///
/// Tokens arrive from untrusted client input; any token that does not round-trip
/// through [`encode`] fails with [`Error::MalformedIdentifier`].
pub fn decode_type_and_id(token: &str) -> Result<(String, String), Error> {
    let bytes = STANDARD
        .decode(token)
        .map_err(|err| Error::MalformedIdentifier {
            reason: err.to_string(),
        })?;
    let decoded = String::from_utf8(bytes).map_err(|err| Error::MalformedIdentifier {
        reason: err.to_string(),
    })?;
    let (type_name, raw_id) =
        decoded
            .split_once(SEPARATOR)
            .ok_or_else(|| Error::MalformedIdentifier {
                reason: format!("missing separator in {decoded:?}"),
            })?;
    Ok((type_name.into(), raw_id.into()))
}

/// Extract an integer cursor value from a token.
///
/// A token that does not decode at all is a [`Error::MalformedIdentifier`], but a
/// well-formed token whose payload is not an integer yields `0`. Callers that want to
/// reject such tokens outright can [`decode`] and parse themselves.
pub fn cursor_id(token: &str) -> Result<i64, Error> {
    let raw_id = decode(token)?;
    Ok(raw_id.parse().unwrap_or(0))
}

/// The namespace under which a type's node identifiers are encoded: the type name with
/// its first letter lowercased.
pub fn type_tag(type_name: &str) -> String {
    let mut chars = type_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

//! JSON codec between typed resource specs and store value bytes.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::CodecError;

/// Decodes a spec from store value bytes.
///
/// `kind` only labels the error; a failure here is non-fatal and callers
/// log and skip the offending event.
pub fn decode_spec<T>(
    kind: &'static str,
    value: &[u8],
) -> std::result::Result<T, CodecError>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(value).map_err(|source| CodecError::Decode {
        kind,
        source,
    })
}

/// Encodes a spec into store value bytes.
///
/// Field order follows the spec struct declaration, so encoding the same
/// spec twice yields identical bytes. Reconcile relies on that to compare
/// desired and observed values directly.
pub fn encode_spec<T>(
    kind: &'static str,
    spec: &T,
) -> std::result::Result<Bytes, CodecError>
where
    T: Serialize,
{
    serde_json::to_vec(spec)
        .map(Bytes::from)
        .map_err(|source| CodecError::Encode {
            kind,
            source,
        })
}

//! Wire codec for coverage tiles.
//!
//! Tiles are protobuf messages without a published schema. The layout in
//! [`messages`] was reconstructed from observed traffic; decoding follows
//! protobuf rules, so:
//!
//! - unrecognized fields are skipped rather than rejected
//! - repeated integers are accepted packed or unpacked
//! - undocumented fields that are known to exist are kept as opaque values
//!   and written back unchanged by [`encode_tile`]
//!
//! # Example
//!
//! ```
//! use panotile::coord::TileCoordinate;
//! use panotile::wire::{decode_tile, encode_tile, DecodedTile};
//!
//! let tile = DecodedTile {
//!     coordinate: Some(TileCoordinate::new(10, 20, 14)),
//!     ..Default::default()
//! };
//! let bytes = encode_tile(&tile);
//! assert_eq!(decode_tile(bytes).unwrap(), tile);
//! ```

mod messages;

pub use messages::{
    AuxValues, CameraPose, CoverageType, DecodedTile, LensParams, RawBatch, RawLocation, RawPano,
    RawProjection,
};

use bytes::{Buf, Bytes};
use prost::Message;
use thiserror::Error;

/// The tile bytes are not a structurally valid coverage tile.
///
/// Raised for truncated input, invalid length prefixes, malformed varints and
/// wire types that contradict a recognized field. The message names the
/// record and field being decoded when the failure occurred.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Malformed tile ({len} bytes): {source}")]
pub struct DecodeError {
    len: usize,
    #[source]
    source: prost::DecodeError,
}

impl DecodeError {
    /// Size of the rejected input in bytes.
    pub fn input_len(&self) -> usize {
        self.len
    }

    /// Description of the failure including the record/field path.
    pub fn context(&self) -> String {
        self.source.to_string()
    }
}

/// Decodes raw tile bytes.
///
/// Accepts anything implementing [`Buf`], e.g. `&[u8]`, `Vec<u8>` or [`Bytes`].
pub fn decode_tile<B: Buf>(mut buf: B) -> Result<DecodedTile, DecodeError> {
    let len = buf.remaining();
    DecodedTile::decode(&mut buf).map_err(|source| DecodeError { len, source })
}

/// Encodes a tile back to its wire representation.
///
/// Recognized and opaque fields are written in field-number order; fields
/// that were skipped during decoding are not reproduced.
pub fn encode_tile(tile: &DecodedTile) -> Bytes {
    Bytes::from(tile.encode_to_vec())
}

//! templated JSON documents: reader, syntax tree, parser and decode engine
//!
//! The pipeline for this notation is
//! raw text → [PeekReader] → [parser] → [Node] tree → [decode] → typed
//! targets carrying [crate::types::Metadata] on every leaf.

pub mod decode;
mod error;
mod node;
mod parser;
mod reader;

pub use decode::{
    decode_with_metadata, Decode, DecodeError, MetadataReceiver, ObjectReader, Shape,
};
pub use error::ParseError;
pub use node::{Key, Node, NodeKind};
pub use parser::{parse, parse_at};
pub use reader::PeekReader;

/// Errors crossing the parse-then-decode boundary.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

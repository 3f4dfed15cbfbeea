//! target-type-driven decoding of syntax nodes
//!
//! The engine matches a node's variant against the target's shape: object
//! nodes populate composites and keyed mappings, array nodes populate
//! sequences, scalar nodes populate matching scalar targets. Mismatches
//! fail with [DecodeError::TypeMismatch]; unknown object keys are ignored
//! for forward compatibility.
//!
//! Two opt-in capabilities let a target customize this:
//! - [Decode]: full custom decoding, the type receives the raw node and is
//!   solely responsible for producing a valid instance;
//! - [MetadataReceiver]: the engine injects the node's own metadata after
//!   decode (see [decode_with_metadata]).
//!
//! Decoding is purely recursive and stateless across sibling fields, so
//! field order must not be relied upon.

use super::node::{Node, NodeKind};
use crate::tracked::{BoolValue, DefaultAt, IntValue, StringListValue, StringValue, Tracked};
use crate::types::{Metadata, Range, Source};
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;

/// Target shapes the engine knows how to populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Composite,
    Mapping,
    Sequence,
    String,
    Number,
    Boolean,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Composite => f.write_str("composite"),
            Shape::Mapping => f.write_str("mapping"),
            Shape::Sequence => f.write_str("sequence"),
            Shape::String => f.write_str("string"),
            Shape::Number => f.write_str("number"),
            Shape::Boolean => f.write_str("boolean"),
        }
    }
}

/// Failures while mapping a syntax node onto a target.
///
/// Fatal to the resource being decoded; adapters may skip the offending
/// resource and continue with its siblings.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("type mismatch at {range}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: Shape,
        found: &'static str,
        range: Range,
    },

    #[error("{message} at {range}")]
    Invalid { message: String, range: Range },
}

impl DecodeError {
    pub fn mismatch(expected: Shape, node: &Node) -> Self {
        DecodeError::TypeMismatch {
            expected,
            found: node.kind_name(),
            range: node.range(),
        }
    }

    pub fn range(&self) -> Range {
        match self {
            DecodeError::TypeMismatch { range, .. } => *range,
            DecodeError::Invalid { range, .. } => *range,
        }
    }
}

/// Decoding of a syntax node into a concrete target type.
pub trait Decode: Sized {
    fn decode(node: &Node, source: &Source) -> Result<Self, DecodeError>;
}

/// Range-receiver capability: implemented by targets that want the raw
/// metadata of the node they were decoded from.
pub trait MetadataReceiver {
    fn set_metadata(&mut self, metadata: Metadata);
}

/// Decodes a node and then hands the node's own metadata to the target.
pub fn decode_with_metadata<T>(node: &Node, source: &Source) -> Result<T, DecodeError>
where
    T: Decode + MetadataReceiver,
{
    let mut target = T::decode(node, source)?;
    target.set_metadata(node.metadata(source));
    Ok(target)
}

impl Decode for String {
    fn decode(node: &Node, _source: &Source) -> Result<Self, DecodeError> {
        node.as_str()
            .map(str::to_string)
            .ok_or_else(|| DecodeError::mismatch(Shape::String, node))
    }
}

impl Decode for bool {
    fn decode(node: &Node, _source: &Source) -> Result<Self, DecodeError> {
        node.as_bool()
            .ok_or_else(|| DecodeError::mismatch(Shape::Boolean, node))
    }
}

impl Decode for i64 {
    fn decode(node: &Node, _source: &Source) -> Result<Self, DecodeError> {
        node.as_i64()
            .ok_or_else(|| DecodeError::mismatch(Shape::Number, node))
    }
}

impl Decode for f64 {
    fn decode(node: &Node, _source: &Source) -> Result<Self, DecodeError> {
        match node.kind() {
            NodeKind::Integer(value) => Ok(*value as f64),
            NodeKind::Decimal(value) => Ok(*value),
            _ => Err(DecodeError::mismatch(Shape::Number, node)),
        }
    }
}

impl Decode for StringValue {
    fn decode(node: &Node, source: &Source) -> Result<Self, DecodeError> {
        Ok(Tracked::new(String::decode(node, source)?, node.metadata(source)))
    }
}

impl Decode for BoolValue {
    fn decode(node: &Node, source: &Source) -> Result<Self, DecodeError> {
        Ok(Tracked::new(bool::decode(node, source)?, node.metadata(source)))
    }
}

impl Decode for IntValue {
    fn decode(node: &Node, source: &Source) -> Result<Self, DecodeError> {
        Ok(Tracked::new(i64::decode(node, source)?, node.metadata(source)))
    }
}

impl Decode for StringListValue {
    fn decode(node: &Node, source: &Source) -> Result<Self, DecodeError> {
        Ok(Tracked::new(
            Vec::<StringValue>::decode(node, source)?,
            node.metadata(source),
        ))
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(node: &Node, source: &Source) -> Result<Self, DecodeError> {
        node.items()
            .ok_or_else(|| DecodeError::mismatch(Shape::Sequence, node))?
            .iter()
            .map(|item| T::decode(item, source))
            .collect()
    }
}

impl<T: Decode> Decode for IndexMap<String, T> {
    fn decode(node: &Node, source: &Source) -> Result<Self, DecodeError> {
        node.entries()
            .ok_or_else(|| DecodeError::mismatch(Shape::Mapping, node))?
            .iter()
            .map(|(key, value)| Ok((key.name.clone(), T::decode(value, source)?)))
            .collect()
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(node: &Node, source: &Source) -> Result<Self, DecodeError> {
        match node.kind() {
            NodeKind::Null => Ok(None),
            _ => Ok(Some(T::decode(node, source)?)),
        }
    }
}

impl Decode for Value {
    fn decode(node: &Node, source: &Source) -> Result<Self, DecodeError> {
        Ok(match node.kind() {
            NodeKind::String(value) => Value::String(value.clone()),
            NodeKind::Integer(value) => Value::Integer(*value),
            NodeKind::Decimal(value) => Value::Decimal(*value),
            NodeKind::Bool(value) => Value::Boolean(*value),
            NodeKind::Null => Value::Null,
            NodeKind::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| Value::decode(item, source))
                    .collect::<Result<_, _>>()?,
            ),
            NodeKind::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| Ok((key.name.clone(), Value::decode(value, source)?)))
                    .collect::<Result<_, DecodeError>>()?,
            ),
        })
    }
}

/// Field-by-field structural decoding of an object node into a composite
/// target. Field names are matched literally against object keys; keys
/// without a matching field are ignored.
pub struct ObjectReader<'n> {
    node: &'n Node,
    source: &'n Source,
}

impl<'n> ObjectReader<'n> {
    pub fn new(node: &'n Node, source: &'n Source) -> Result<Self, DecodeError> {
        match node.kind() {
            NodeKind::Object(_) => Ok(ObjectReader { node, source }),
            _ => Err(DecodeError::mismatch(Shape::Composite, node)),
        }
    }

    /// Metadata of the object node itself.
    pub fn metadata(&self) -> Metadata {
        self.node.metadata(self.source)
    }

    pub fn optional<T: Decode>(&self, key: &str) -> Result<Option<T>, DecodeError> {
        self.node
            .get(key)
            .map(|node| T::decode(node, self.source))
            .transpose()
    }

    pub fn required<T: Decode>(&self, key: &str) -> Result<T, DecodeError> {
        self.optional(key)?.ok_or_else(|| DecodeError::Invalid {
            message: format!("missing field {key:?}"),
            range: self.node.range(),
        })
    }

    /// An absent field decodes to the target's default, stamped with the
    /// enclosing node's range and defaulted provenance.
    pub fn or_default<T: Decode + DefaultAt>(&self, key: &str) -> Result<T, DecodeError> {
        match self.node.get(key) {
            Some(node) => T::decode(node, self.source),
            None => Ok(T::default_at(&self.metadata())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::json::parse;
    use pretty_assertions::assert_eq;

    fn source() -> Source {
        Source::from("test.json")
    }

    #[derive(Debug, PartialEq)]
    struct Endpoint {
        host: StringValue,
        port: IntValue,
        secure: BoolValue,
    }

    impl Decode for Endpoint {
        fn decode(node: &Node, source: &Source) -> Result<Self, DecodeError> {
            let object = ObjectReader::new(node, source)?;
            Ok(Endpoint {
                host: object.or_default("host")?,
                port: object.or_default("port")?,
                secure: object.or_default("secure")?,
            })
        }
    }

    #[test]
    fn present_fields_carry_their_value_token_range() {
        let node = parse("{\n  \"host\": \"internal\"\n}").unwrap();
        let endpoint = Endpoint::decode(&node, &source()).unwrap();

        assert_eq!(endpoint.host.as_str(), "internal");
        assert!(!endpoint.host.metadata().is_defaulted());
        assert_eq!(endpoint.host.metadata().range().to_string(), "2:11-2:20");
    }

    #[test]
    fn absent_fields_default_with_the_enclosing_range() {
        let node = parse("{\n  \"host\": \"internal\"\n}").unwrap();
        let endpoint = Endpoint::decode(&node, &source()).unwrap();

        assert_eq!(*endpoint.port.value(), 0);
        assert!(endpoint.port.metadata().is_defaulted());
        assert_eq!(endpoint.port.metadata().range(), node.range());
        assert!(endpoint.secure.metadata().is_defaulted());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let node = parse(r#"{"host": "h", "unexpected": [1, 2]}"#).unwrap();

        assert!(Endpoint::decode(&node, &source()).is_ok());
    }

    #[test]
    fn shape_mismatches_carry_the_node_range() {
        let node = parse(r#"{"host": [1]}"#).unwrap();
        let error = Endpoint::decode(&node, &source()).unwrap_err();

        assert_eq!(
            error,
            DecodeError::TypeMismatch {
                expected: Shape::String,
                found: "array",
                range: node.get("host").unwrap().range(),
            }
        );
    }

    #[test]
    fn decoding_is_deterministic() {
        let node = parse(r#"{"host": "h", "port": 8080, "secure": true}"#).unwrap();

        let first = Endpoint::decode(&node, &source()).unwrap();
        let second = Endpoint::decode(&node, &source()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn duplicate_keys_decode_to_the_last_value() {
        let node = parse(r#"{"a":1,"a":2}"#).unwrap();
        let source = source();
        let object = ObjectReader::new(&node, &source).unwrap();

        let value: IntValue = object.or_default("a").unwrap();
        assert_eq!(*value.value(), 2);
    }

    #[test]
    fn metadata_receiver_gets_the_node_range() {
        #[derive(Debug)]
        struct Span {
            raw: Value,
            metadata: Option<Metadata>,
        }

        impl Decode for Span {
            fn decode(node: &Node, source: &Source) -> Result<Self, DecodeError> {
                Ok(Span {
                    raw: Value::decode(node, source)?,
                    metadata: None,
                })
            }
        }

        impl MetadataReceiver for Span {
            fn set_metadata(&mut self, metadata: Metadata) {
                self.metadata = Some(metadata);
            }
        }

        let node = parse("[1, 2]").unwrap();
        let span: Span = decode_with_metadata(&node, &source()).unwrap();

        assert_eq!(span.raw, Value::Array(vec![Value::Integer(1), Value::Integer(2)]));
        assert_eq!(span.metadata.unwrap().range(), node.range());
    }

    #[test]
    fn sequences_and_mappings_decode_structurally() {
        let node = parse(r#"{"a": [1, 2], "b": [3]}"#).unwrap();
        let mapping: IndexMap<String, Vec<i64>> =
            IndexMap::decode(&node, &source()).unwrap();

        assert_eq!(mapping["a"], vec![1, 2]);
        assert_eq!(mapping["b"], vec![3]);

        let error = Vec::<i64>::decode(&node, &source()).unwrap_err();
        assert!(matches!(
            error,
            DecodeError::TypeMismatch { expected: Shape::Sequence, found: "object", .. }
        ));
    }
}

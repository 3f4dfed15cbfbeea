//! wrapped values: a primitive bundled with the metadata describing where it
//! came from
//!
//! Equality of wrapped values is defined over the raw value only; metadata
//! never participates, so domain models can be compared for content
//! regardless of which document (or notation) produced them.

use crate::types::Metadata;
use indexmap::IndexMap;

/// A value of type `T` paired with its [Metadata].
#[derive(Debug, Clone)]
pub struct Tracked<T> {
    value: T,
    metadata: Metadata,
}

pub type BoolValue = Tracked<bool>;
pub type IntValue = Tracked<i64>;
pub type StringValue = Tracked<String>;
pub type StringListValue = Tracked<Vec<StringValue>>;

impl<T> Tracked<T> {
    /// A value read verbatim from a document.
    pub fn new(value: T, metadata: Metadata) -> Self {
        Tracked { value, metadata }
    }

    /// A value synthesized because the document omitted it. Carries the
    /// enclosing element's range with defaulted provenance.
    pub fn defaulted(value: T, enclosing: &Metadata) -> Self {
        Tracked {
            value,
            metadata: enclosing.defaulted_at(),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Derives a new wrapped value, keeping metadata and provenance.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Tracked<U> {
        Tracked {
            value: f(self.value),
            metadata: self.metadata,
        }
    }
}

impl Tracked<String> {
    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl Tracked<bool> {
    pub fn is_true(&self) -> bool {
        self.value
    }
}

impl<T: PartialEq> PartialEq for Tracked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for Tracked<T> {}

impl<T: serde::Serialize> serde::Serialize for Tracked<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

/// Construction of a target's default, stamped with defaulted provenance at
/// the enclosing element's range. This is the decode engine's defaulting
/// path for fields absent from the document.
pub trait DefaultAt: Sized {
    fn default_at(enclosing: &Metadata) -> Self;
}

impl<T: Default> DefaultAt for Tracked<T> {
    fn default_at(enclosing: &Metadata) -> Self {
        Tracked::defaulted(T::default(), enclosing)
    }
}

impl<T> DefaultAt for Vec<T> {
    fn default_at(_enclosing: &Metadata) -> Self {
        Vec::new()
    }
}

impl<T> DefaultAt for Option<T> {
    fn default_at(_enclosing: &Metadata) -> Self {
        None
    }
}

impl<K, V> DefaultAt for IndexMap<K, V> {
    fn default_at(_enclosing: &Metadata) -> Self {
        IndexMap::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{Metadata, Position, Range, Source};
    use pretty_assertions::assert_eq;

    fn metadata_at(line: usize) -> Metadata {
        Metadata::new(
            Range::at(Position::new(line, 1)),
            Source::from("test.json"),
        )
    }

    #[test]
    fn equality_ignores_metadata() {
        let a = StringValue::new("same".into(), metadata_at(1));
        let b = StringValue::new("same".into(), metadata_at(99));
        let c = StringValue::new("other".into(), metadata_at(1));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn default_at_stamps_defaulted_provenance() {
        let enclosing = metadata_at(3);
        let value = BoolValue::default_at(&enclosing);

        assert!(!value.is_true());
        assert!(value.metadata().is_defaulted());
        assert_eq!(value.metadata().range(), enclosing.range());
    }

    #[test]
    fn map_keeps_metadata() {
        let status = StringValue::new("Enabled".into(), metadata_at(7));
        let enabled = status.map(|s| s == "Enabled");

        assert!(enabled.is_true());
        assert!(!enabled.metadata().is_defaulted());
        assert_eq!(enabled.metadata().range().start_line(), 7);
    }
}

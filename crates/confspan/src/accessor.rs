//! notation-independent access to declared resources
//!
//! [ResourceAccess] is the capability set each source notation implements
//! once. Adapters only ever talk to this surface: every value they obtain
//! already carries [crate::types::Metadata], and absent properties decode
//! to defaults with defaulted provenance instead of raw zero values.

use crate::tracked::{BoolValue, IntValue, StringListValue, StringValue};
use crate::types::Metadata;
use indexmap::{IndexMap, IndexSet};
use std::fmt;

/// Identity of one declared resource within its document set.
///
/// Templated documents use the logical id, block modules use the
/// `type.name` address. Referencing resources store identities only, never
/// direct links.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        ResourceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parent identity → identities of the resources referencing it.
///
/// Built once per document set and then only read; adapters receive it by
/// reference. A parent absent from the mapping simply has no children —
/// unresolvable references are "relationship absent", not an error.
#[derive(Debug, Default)]
pub struct ChildIndex {
    links: IndexMap<ResourceId, IndexSet<ResourceId>>,
}

impl ChildIndex {
    pub fn insert(&mut self, parent: ResourceId, child: ResourceId) {
        self.links.entry(parent).or_default().insert(child);
    }

    pub fn children_of<'a>(
        &'a self,
        parent: &ResourceId,
    ) -> impl Iterator<Item = &'a ResourceId> + 'a {
        self.links.get(parent).into_iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.links.values().map(IndexSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// The capability set implemented independently per source notation.
pub trait ResourceAccess {
    /// Opaque handle to one declared resource.
    type Handle;

    /// All resources declaring the given type, in declaration order.
    fn resources_by_type(&self, type_name: &str) -> Vec<&Self::Handle>;

    /// Builds the parent → children identity mapping for resources of the
    /// given type, resolved from each child's reference to its parent.
    fn child_resource_ids_by_type(&self, type_name: &str) -> ChildIndex;

    fn resource_id(&self, handle: &Self::Handle) -> ResourceId;

    /// Metadata spanning the whole resource declaration.
    fn resource_metadata(&self, handle: &Self::Handle) -> Metadata;

    /// String property, `""` with defaulted provenance when absent.
    fn string_property(&self, handle: &Self::Handle, name: &str) -> StringValue {
        self.string_property_or(handle, name, "")
    }

    /// String property with an explicit fallback. The fallback carries
    /// defaulted provenance ranged at the resource (absent property) or at
    /// the property itself (present but not a usable string).
    fn string_property_or(&self, handle: &Self::Handle, name: &str, fallback: &str)
        -> StringValue;

    fn bool_property_or(&self, handle: &Self::Handle, name: &str, fallback: bool) -> BoolValue;

    fn int_property_or(&self, handle: &Self::Handle, name: &str, fallback: i64) -> IntValue;

    /// String sequence property; absent sequences decode to an empty list
    /// with defaulted provenance, never a missing state.
    fn string_list_property(&self, handle: &Self::Handle, name: &str) -> StringListValue;
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn children_accumulate_per_parent() {
        let mut index = ChildIndex::default();
        index.insert(ResourceId::new("group.a"), ResourceId::new("rule.one"));
        index.insert(ResourceId::new("group.a"), ResourceId::new("rule.two"));
        index.insert(ResourceId::new("group.a"), ResourceId::new("rule.one"));
        index.insert(ResourceId::new("group.b"), ResourceId::new("rule.three"));

        let children: Vec<_> = index
            .children_of(&ResourceId::new("group.a"))
            .map(ResourceId::as_str)
            .collect();
        assert_eq!(children, vec!["rule.one", "rule.two"]);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn unknown_parents_have_no_children() {
        let index = ChildIndex::default();

        assert!(index.is_empty());
        assert_eq!(index.children_of(&ResourceId::new("group.a")).count(), 0);
    }
}

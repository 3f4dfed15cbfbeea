//! object storage model

use crate::tracked::{BoolValue, StringValue};
use crate::types::Metadata;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Storage {
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Bucket {
    pub metadata: Metadata,
    pub name: StringValue,
    pub acl: StringValue,
    pub force_destroy: BoolValue,
    pub versioning: Versioning,
    pub objects: Vec<BucketObject>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Versioning {
    pub metadata: Metadata,
    pub enabled: BoolValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketObject {
    pub metadata: Metadata,
    pub acl: StringValue,
}

impl PartialEq for Storage {
    fn eq(&self, other: &Self) -> bool {
        self.buckets == other.buckets
    }
}

impl PartialEq for Bucket {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.acl == other.acl
            && self.force_destroy == other.force_destroy
            && self.versioning == other.versioning
            && self.objects == other.objects
    }
}

impl PartialEq for Versioning {
    fn eq(&self, other: &Self) -> bool {
        self.enabled == other.enabled
    }
}

impl PartialEq for BucketObject {
    fn eq(&self, other: &Self) -> bool {
        self.acl == other.acl
    }
}

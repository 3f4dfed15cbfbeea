//! access analyzer model

use crate::tracked::{BoolValue, StringValue};
use crate::types::Metadata;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct AccessAnalyzer {
    pub analyzers: Vec<Analyzer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analyzer {
    pub metadata: Metadata,
    pub name: StringValue,
    pub arn: StringValue,
    pub active: BoolValue,
}

impl PartialEq for AccessAnalyzer {
    fn eq(&self, other: &Self) -> bool {
        self.analyzers == other.analyzers
    }
}

impl PartialEq for Analyzer {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arn == other.arn && self.active == other.active
    }
}

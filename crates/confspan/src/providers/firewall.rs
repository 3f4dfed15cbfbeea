//! firewall model

use crate::tracked::{StringValue, Tracked};
use crate::types::Metadata;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Firewall {
    pub security_groups: Vec<SecurityGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityGroup {
    pub metadata: Metadata,
    pub description: StringValue,
    pub ingress_rules: Vec<SecurityGroupRule>,
    pub egress_rules: Vec<SecurityGroupRule>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityGroupRule {
    pub metadata: Metadata,
    pub description: StringValue,
    pub cidrs: Vec<Tracked<String>>,
}

impl PartialEq for Firewall {
    fn eq(&self, other: &Self) -> bool {
        self.security_groups == other.security_groups
    }
}

impl PartialEq for SecurityGroup {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description
            && self.ingress_rules == other.ingress_rules
            && self.egress_rules == other.egress_rules
    }
}

impl PartialEq for SecurityGroupRule {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description && self.cidrs == other.cidrs
    }
}

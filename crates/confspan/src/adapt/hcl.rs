//! adapters for block-structured modules

use crate::accessor::{ChildIndex, ResourceAccess};
use crate::hcl::{Modules, ResourceBlock};
use crate::providers::firewall::{Firewall, SecurityGroup, SecurityGroupRule};
use crate::providers::storage::{Bucket, BucketObject, Storage, Versioning};

pub fn adapt_firewall(modules: &Modules) -> Firewall {
    let adapter = SecurityGroupAdapter::new(
        modules,
        modules.child_resource_ids_by_type("digitalocean_firewall_rule"),
    );

    Firewall {
        security_groups: modules
            .resources_by_type("digitalocean_firewall_group")
            .into_iter()
            .map(|group| adapter.adapt(group))
            .collect(),
    }
}

#[derive(derive_new::new)]
struct SecurityGroupAdapter<'a> {
    modules: &'a Modules,
    rule_ids: ChildIndex,
}

impl SecurityGroupAdapter<'_> {
    fn adapt(&self, group: &ResourceBlock) -> SecurityGroup {
        let mut ingress_rules = Vec::new();
        let mut egress_rules = Vec::new();

        for rule_id in self.rule_ids.children_of(&group.id()) {
            let Some(rule) = self.modules.resource(rule_id) else {
                continue;
            };
            let adapted = self.adapt_rule(rule);
            match self.modules.string_property(rule, "direction").as_str() {
                "egress" => egress_rules.push(adapted),
                _ => ingress_rules.push(adapted),
            }
        }

        SecurityGroup {
            metadata: self.modules.resource_metadata(group),
            description: self.modules.string_property(group, "description"),
            ingress_rules,
            egress_rules,
        }
    }

    fn adapt_rule(&self, rule: &ResourceBlock) -> SecurityGroupRule {
        SecurityGroupRule {
            metadata: self.modules.resource_metadata(rule),
            description: self.modules.string_property(rule, "description"),
            cidrs: self
                .modules
                .string_list_property(rule, "cidr_blocks")
                .into_value(),
        }
    }
}

pub fn adapt_storage(modules: &Modules) -> Storage {
    let object_ids = modules.child_resource_ids_by_type("digitalocean_spaces_bucket_object");

    Storage {
        buckets: modules
            .resources_by_type("digitalocean_spaces_bucket")
            .into_iter()
            .map(|bucket| adapt_bucket(modules, bucket, &object_ids))
            .collect(),
    }
}

fn adapt_bucket(modules: &Modules, bucket: &ResourceBlock, object_ids: &ChildIndex) -> Bucket {
    let versioning_metadata = bucket
        .body()
        .child("versioning")
        .map(|child| child.metadata().clone())
        .unwrap_or_else(|| modules.resource_metadata(bucket));

    let objects = object_ids
        .children_of(&bucket.id())
        .filter_map(|object_id| modules.resource(object_id))
        .map(|object| BucketObject {
            metadata: modules.resource_metadata(object),
            acl: modules.string_property_or(object, "acl", "public-read"),
        })
        .collect();

    Bucket {
        metadata: modules.resource_metadata(bucket),
        name: modules.string_property(bucket, "name"),
        acl: modules.string_property_or(bucket, "acl", "public-read"),
        force_destroy: modules.bool_property_or(bucket, "force_destroy", false),
        versioning: Versioning {
            metadata: versioning_metadata,
            enabled: modules.bool_property_or(bucket, "versioning.enabled", false),
        },
        objects,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hcl_modules;
    use crate::tracked::Tracked;
    use crate::types::Metadata;
    use pretty_assertions::assert_eq;

    fn tracked<T>(value: T) -> Tracked<T> {
        Tracked::new(value, Metadata::detached())
    }

    fn defaulted<T>(value: T) -> Tracked<T> {
        Tracked::defaulted(value, &Metadata::detached())
    }

    struct StorageCase {
        name: &'static str,
        source: &'static str,
        expected: Storage,
    }

    #[test]
    fn adapt_storage_cases() {
        let cases = vec![
            StorageCase {
                name: "everything defined",
                source: concat!(
                    "resource \"digitalocean_spaces_bucket\" \"logs\" {\n",
                    "  name          = \"logs\"\n",
                    "  acl           = \"private\"\n",
                    "  force_destroy = true\n",
                    "\n",
                    "  versioning {\n",
                    "    enabled = true\n",
                    "  }\n",
                    "}\n",
                    "\n",
                    "resource \"digitalocean_spaces_bucket_object\" \"index\" {\n",
                    "  bucket = digitalocean_spaces_bucket.logs.name\n",
                    "  acl    = \"private\"\n",
                    "}\n",
                ),
                expected: Storage {
                    buckets: vec![Bucket {
                        metadata: Metadata::detached(),
                        name: tracked("logs".to_string()),
                        acl: tracked("private".to_string()),
                        force_destroy: tracked(true),
                        versioning: Versioning {
                            metadata: Metadata::detached(),
                            enabled: tracked(true),
                        },
                        objects: vec![BucketObject {
                            metadata: Metadata::detached(),
                            acl: tracked("private".to_string()),
                        }],
                    }],
                },
            },
            StorageCase {
                name: "defaults",
                source: "resource \"digitalocean_spaces_bucket\" \"empty\" {\n}\n",
                expected: Storage {
                    buckets: vec![Bucket {
                        metadata: Metadata::detached(),
                        name: defaulted(String::new()),
                        acl: defaulted("public-read".to_string()),
                        force_destroy: defaulted(false),
                        versioning: Versioning {
                            metadata: Metadata::detached(),
                            enabled: defaulted(false),
                        },
                        objects: Vec::new(),
                    }],
                },
            },
        ];

        for case in cases {
            let modules = hcl_modules!(case.source);
            assert_eq!(adapt_storage(&modules), case.expected, "{}", case.name);
        }
    }

    #[test]
    fn adapt_storage_lines() {
        let modules = hcl_modules!(concat!(
            "resource \"digitalocean_spaces_bucket\" \"logs\" {\n",
            "  name = \"logs\"\n",
            "\n",
            "  versioning {\n",
            "    enabled = true\n",
            "  }\n",
            "}\n",
        ));

        let storage = adapt_storage(&modules);
        let bucket = &storage.buckets[0];

        assert_eq!(bucket.metadata.range().start_line(), 1);
        assert_eq!(bucket.metadata.range().end_line(), 7);
        assert_eq!(bucket.name.metadata().range().start_line(), 2);
        assert_eq!(bucket.versioning.metadata.range().start_line(), 4);
        assert_eq!(bucket.versioning.metadata.range().end_line(), 6);
        assert_eq!(bucket.versioning.enabled.metadata().range().start_line(), 5);
    }

    #[test]
    fn adapt_firewall_splits_rules_by_direction() {
        let modules = hcl_modules!(concat!(
            "resource \"digitalocean_firewall_group\" \"web\" {\n",
            "  description = \"web tier\"\n",
            "}\n",
            "\n",
            "resource \"digitalocean_firewall_rule\" \"http\" {\n",
            "  group_id    = digitalocean_firewall_group.web.id\n",
            "  direction   = \"ingress\"\n",
            "  description = \"allow http\"\n",
            "  cidr_blocks = [\"0.0.0.0/0\"]\n",
            "}\n",
            "\n",
            "resource \"digitalocean_firewall_rule\" \"out\" {\n",
            "  group_id    = digitalocean_firewall_group.web.id\n",
            "  direction   = \"egress\"\n",
            "  cidr_blocks = [\"10.0.0.0/8\"]\n",
            "}\n",
        ));

        let firewall = adapt_firewall(&modules);
        let expected = Firewall {
            security_groups: vec![SecurityGroup {
                metadata: Metadata::detached(),
                description: tracked("web tier".to_string()),
                ingress_rules: vec![SecurityGroupRule {
                    metadata: Metadata::detached(),
                    description: tracked("allow http".to_string()),
                    cidrs: vec![tracked("0.0.0.0/0".to_string())],
                }],
                egress_rules: vec![SecurityGroupRule {
                    metadata: Metadata::detached(),
                    description: defaulted(String::new()),
                    cidrs: vec![tracked("10.0.0.0/8".to_string())],
                }],
            }],
        };
        assert_eq!(firewall, expected);
    }

    #[test]
    fn adapt_firewall_lines() {
        let modules = hcl_modules!(concat!(
            "resource \"digitalocean_firewall_group\" \"web\" {\n",
            "  description = \"web tier\"\n",
            "}\n",
            "\n",
            "resource \"digitalocean_firewall_rule\" \"http\" {\n",
            "  group_id    = digitalocean_firewall_group.web.id\n",
            "  cidr_blocks = [\"0.0.0.0/0\"]\n",
            "}\n",
        ));

        let firewall = adapt_firewall(&modules);
        let group = &firewall.security_groups[0];

        assert_eq!(group.metadata.range().start_line(), 1);
        assert_eq!(group.metadata.range().end_line(), 3);
        let rule = &group.ingress_rules[0];
        assert_eq!(rule.metadata.range().start_line(), 5);
        assert_eq!(rule.metadata.range().end_line(), 8);
        assert_eq!(rule.cidrs[0].metadata().range().start_line(), 7);
    }
}

//! adapters for templated documents

use crate::accessor::ResourceAccess;
use crate::providers::analyzer::{AccessAnalyzer, Analyzer};
use crate::providers::storage::{Bucket, Storage, Versioning};
use crate::template::{Document, Resource};
use crate::tracked::Tracked;

pub fn adapt_access_analyzer(document: &Document) -> AccessAnalyzer {
    AccessAnalyzer {
        analyzers: document
            .resources_by_type("AWS::AccessAnalyzer::Analyzer")
            .into_iter()
            .map(|analyzer| Analyzer {
                metadata: document.resource_metadata(analyzer),
                name: document.string_property(analyzer, "AnalyzerName"),
                arn: document.string_property(analyzer, "Arn"),
                active: document.bool_property_or(analyzer, "Active", false),
            })
            .collect(),
    }
}

pub fn adapt_storage(document: &Document) -> Storage {
    Storage {
        buckets: document
            .resources_by_type("AWS::S3::Bucket")
            .into_iter()
            .map(|bucket| adapt_bucket(document, bucket))
            .collect(),
    }
}

fn adapt_bucket(document: &Document, bucket: &Resource) -> Bucket {
    let versioning_metadata = bucket
        .property("VersioningConfiguration")
        .map(|property| property.metadata().clone())
        .unwrap_or_else(|| document.resource_metadata(bucket));

    // status keeps its provenance through the comparison
    let versioning_enabled = document
        .string_property(bucket, "VersioningConfiguration.Status")
        .map(|status| status == "Enabled");

    Bucket {
        metadata: document.resource_metadata(bucket),
        name: document.string_property(bucket, "BucketName"),
        acl: document.string_property_or(bucket, "AccessControl", "Private"),
        force_destroy: Tracked::defaulted(false, &document.resource_metadata(bucket)),
        versioning: Versioning {
            metadata: versioning_metadata,
            enabled: versioning_enabled,
        },
        objects: Vec::new(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{Metadata, Source};
    use pretty_assertions::assert_eq;

    fn parse_template(input: &str) -> Document {
        Document::parse(input, Source::from("template.json")).expect("template must parse")
    }

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
                    "{\n",
                    "  \"Resources\": {\n",
                    "    \"Logs\": {\n",
                    "      \"Type\": \"AWS::S3::Bucket\",\n",
                    "      \"Properties\": {\n",
                    "        \"BucketName\": \"logs\",\n",
                    "        \"AccessControl\": \"private\",\n",
                    "        \"VersioningConfiguration\": {\"Status\": \"Enabled\"}\n",
                    "      }\n",
                    "    }\n",
                    "  }\n",
                    "}",
                ),
                expected: Storage {
                    buckets: vec![Bucket {
                        metadata: Metadata::detached(),
                        name: tracked("logs".to_string()),
                        acl: tracked("private".to_string()),
                        force_destroy: defaulted(false),
                        versioning: Versioning {
                            metadata: Metadata::detached(),
                            enabled: tracked(true),
                        },
                        objects: Vec::new(),
                    }],
                },
            },
            StorageCase {
                name: "defaults",
                source: r#"{"Resources": {"Empty": {"Type": "AWS::S3::Bucket"}}}"#,
                expected: Storage {
                    buckets: vec![Bucket {
                        metadata: Metadata::detached(),
                        name: defaulted(String::new()),
                        acl: defaulted("Private".to_string()),
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
            let document = parse_template(case.source);
            assert_eq!(adapt_storage(&document), case.expected, "{}", case.name);
        }
    }

    #[test]
    fn adapt_storage_lines() {
        let document = parse_template(concat!(
            "{\n",
            "  \"Resources\": {\n",
            "    \"Logs\": {\n",
            "      \"Type\": \"AWS::S3::Bucket\",\n",
            "      \"Properties\": {\n",
            "        \"BucketName\": \"logs\",\n",
            "        \"VersioningConfiguration\": {\n",
            "          \"Status\": \"Enabled\"\n",
            "        }\n",
            "      }\n",
            "    }\n",
            "  }\n",
            "}",
        ));

        let storage = adapt_storage(&document);
        let bucket = &storage.buckets[0];

        assert_eq!(bucket.metadata.range().start_line(), 3);
        assert_eq!(bucket.metadata.range().end_line(), 11);
        assert_eq!(bucket.name.metadata().range().start_line(), 6);
        assert_eq!(bucket.versioning.metadata.range().start_line(), 7);
        assert_eq!(bucket.versioning.metadata.range().end_line(), 9);
        assert_eq!(bucket.versioning.enabled.metadata().range().start_line(), 8);
    }

    #[test]
    fn adapt_access_analyzer_cases() {
        let document = parse_template(concat!(
            "{\n",
            "  \"Resources\": {\n",
            "    \"Main\": {\n",
            "      \"Type\": \"AWS::AccessAnalyzer::Analyzer\",\n",
            "      \"Properties\": {\"AnalyzerName\": \"main\"}\n",
            "    }\n",
            "  }\n",
            "}",
        ));

        let expected = AccessAnalyzer {
            analyzers: vec![Analyzer {
                metadata: Metadata::detached(),
                name: tracked("main".to_string()),
                arn: defaulted(String::new()),
                active: defaulted(false),
            }],
        };
        assert_eq!(adapt_access_analyzer(&document), expected);
    }

    #[test]
    fn analyzer_defaults_point_at_the_resource() {
        let document = parse_template(concat!(
            "{\n",
            "  \"Resources\": {\n",
            "    \"Main\": {\"Type\": \"AWS::AccessAnalyzer::Analyzer\"}\n",
            "  }\n",
            "}",
        ));

        let analyzers = adapt_access_analyzer(&document).analyzers;
        let analyzer = &analyzers[0];

        assert!(analyzer.name.metadata().is_defaulted());
        assert_eq!(analyzer.name.metadata().range().start_line(), 3);
        assert_eq!(analyzer.metadata.range().start_line(), 3);
    }
}

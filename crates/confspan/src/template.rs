//! templated JSON documents (CloudFormation-style templates)
//!
//! A [Document] declares resources under a top-level `Resources` object
//! mapping logical ids to [Resource]s; each resource has a `Type` and a
//! `Properties` object. Property values keep their own metadata on every
//! nesting level, so a policy pointing at `Properties.Versioning.Status`
//! reports the exact line of `Status`.
//!
//! Templates may also declare `Parameters`. When a property is written as
//! `{"Ref": "ParamName"}` and the parameter has a `Default`, the property
//! resolves to that default while keeping the referencing property's range.

use crate::accessor::{ChildIndex, ResourceAccess, ResourceId};
use crate::json::{self, Decode, DecodeError, MetadataReceiver, Node, NodeKind, ObjectReader};
use crate::tracked::{BoolValue, IntValue, StringListValue, StringValue, Tracked};
use crate::types::{Metadata, Position, Source};
use crate::value::Value;
use indexmap::IndexMap;
use std::path::Path;

/// One parsed template.
#[derive(Debug)]
pub struct Document {
    source: Source,
    metadata: Metadata,
    resources: IndexMap<String, Resource>,
    parameters: IndexMap<String, Parameter>,
}

impl Document {
    pub fn parse(input: &str, source: Source) -> Result<Self, json::Error> {
        Self::parse_at(input, source, Position::start())
    }

    /// Parses a template embedded in a larger document (e.g. an inline
    /// policy), reporting ranges relative to the enclosing document.
    pub fn parse_at(input: &str, source: Source, start: Position) -> Result<Self, json::Error> {
        let node = json::parse_at(input, start)?;
        let document = json::decode_with_metadata(&node, &source)?;
        Ok(document)
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    /// Resolves a `{"Ref": "ParamName"}` property against the declared
    /// parameter defaults. The resolved value keeps the referencing
    /// property's metadata.
    fn resolve(&self, property: &Property) -> Option<(Value, Metadata)> {
        let PropertyValue::Map(entries) = &property.value else {
            return None;
        };
        if entries.len() != 1 {
            return None;
        }
        let (key, target) = entries.first()?;
        if key != "Ref" {
            return None;
        }

        let parameter = self.parameters.get(target.as_str()?)?;
        let default = parameter.default.clone()?;
        Some((default, property.metadata.clone()))
    }
}

impl Decode for Document {
    fn decode(node: &Node, source: &Source) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(node, source)?;

        let mut resources: IndexMap<String, Resource> = object.or_default("Resources")?;
        let parameters: IndexMap<String, Parameter> = object.or_default("Parameters")?;

        for (logical_id, resource) in &mut resources {
            resource.logical_id = logical_id.clone();
        }

        Ok(Document {
            source: source.clone(),
            metadata: object.metadata(),
            resources,
            parameters,
        })
    }
}

impl MetadataReceiver for Document {
    fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }
}

/// One declared resource.
#[derive(Debug)]
pub struct Resource {
    logical_id: String,
    type_name: StringValue,
    properties: IndexMap<String, Property>,
    metadata: Metadata,
}

impl Resource {
    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn id(&self) -> ResourceId {
        ResourceId::new(self.logical_id.clone())
    }

    pub fn type_name(&self) -> &StringValue {
        &self.type_name
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Property lookup; dotted paths traverse nested maps, e.g.
    /// `"VersioningConfiguration.Status"`.
    pub fn property(&self, path: &str) -> Option<&Property> {
        let mut segments = path.split('.');
        let mut current = self.properties.get(segments.next()?)?;
        for segment in segments {
            match &current.value {
                PropertyValue::Map(entries) => current = entries.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Identities of resources referenced anywhere in the properties via
    /// `{"Ref": "LogicalId"}`.
    pub fn references(&self) -> Vec<ResourceId> {
        let mut out = Vec::new();
        for property in self.properties.values() {
            property.collect_references(&mut out);
        }
        out
    }
}

impl Decode for Resource {
    fn decode(node: &Node, source: &Source) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(node, source)?;
        let mut resource = Resource {
            logical_id: String::new(),
            type_name: object.or_default("Type")?,
            properties: object.or_default("Properties")?,
            metadata: Metadata::detached(),
        };
        resource.set_metadata(object.metadata());
        Ok(resource)
    }
}

impl MetadataReceiver for Resource {
    fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }
}

/// A template parameter; only the default matters for resolution.
#[derive(Debug)]
pub struct Parameter {
    default: Option<Value>,
}

impl Decode for Parameter {
    fn decode(node: &Node, source: &Source) -> Result<Self, DecodeError> {
        let object = ObjectReader::new(node, source)?;
        Ok(Parameter {
            default: object.optional("Default")?,
        })
    }
}

/// A property value with metadata on every nesting level.
#[derive(Debug, Clone)]
pub struct Property {
    value: PropertyValue,
    metadata: Metadata,
}

#[derive(Debug, Clone)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    List(Vec<Property>),
    Map(IndexMap<String, Property>),
    Null,
}

impl Property {
    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            PropertyValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            PropertyValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match &self.value {
            PropertyValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// The plain value, metadata stripped.
    pub fn to_value(&self) -> Value {
        match &self.value {
            PropertyValue::String(value) => Value::String(value.clone()),
            PropertyValue::Integer(value) => Value::Integer(*value),
            PropertyValue::Decimal(value) => Value::Decimal(*value),
            PropertyValue::Bool(value) => Value::Boolean(*value),
            PropertyValue::Null => Value::Null,
            PropertyValue::List(items) => {
                Value::Array(items.iter().map(Property::to_value).collect())
            }
            PropertyValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_value()))
                    .collect(),
            ),
        }
    }

    fn collect_references(&self, out: &mut Vec<ResourceId>) {
        match &self.value {
            PropertyValue::Map(entries) => {
                if entries.len() == 1 {
                    if let Some((key, target)) = entries.first() {
                        if key == "Ref" {
                            if let Some(id) = target.as_str() {
                                out.push(ResourceId::new(id));
                                return;
                            }
                        }
                    }
                }
                for value in entries.values() {
                    value.collect_references(out);
                }
            }
            PropertyValue::List(items) => {
                for item in items {
                    item.collect_references(out);
                }
            }
            _ => {}
        }
    }
}

// custom-decode capability: properties keep the raw node's shape verbatim,
// no structural field matching
impl Decode for Property {
    fn decode(node: &Node, source: &Source) -> Result<Self, DecodeError> {
        let value = match node.kind() {
            NodeKind::String(value) => PropertyValue::String(value.clone()),
            NodeKind::Integer(value) => PropertyValue::Integer(*value),
            NodeKind::Decimal(value) => PropertyValue::Decimal(*value),
            NodeKind::Bool(value) => PropertyValue::Bool(*value),
            NodeKind::Null => PropertyValue::Null,
            NodeKind::Array(items) => PropertyValue::List(
                items
                    .iter()
                    .map(|item| Property::decode(item, source))
                    .collect::<Result<_, _>>()?,
            ),
            NodeKind::Object(entries) => PropertyValue::Map(
                entries
                    .iter()
                    .map(|(key, value)| Ok((key.name.clone(), Property::decode(value, source)?)))
                    .collect::<Result<_, DecodeError>>()?,
            ),
        };
        Ok(Property {
            value,
            metadata: node.metadata(source),
        })
    }
}

impl ResourceAccess for Document {
    type Handle = Resource;

    fn resources_by_type(&self, type_name: &str) -> Vec<&Resource> {
        self.resources
            .values()
            .filter(|resource| resource.type_name.as_str() == type_name)
            .collect()
    }

    fn child_resource_ids_by_type(&self, type_name: &str) -> ChildIndex {
        let mut index = ChildIndex::default();
        for resource in self.resources_by_type(type_name) {
            for parent in resource.references() {
                if self.resources.contains_key(parent.as_str()) {
                    index.insert(parent, resource.id());
                }
            }
        }
        tracing::trace!(%type_name, links = index.len(), "built child resource index");
        index
    }

    fn resource_id(&self, handle: &Resource) -> ResourceId {
        handle.id()
    }

    fn resource_metadata(&self, handle: &Resource) -> Metadata {
        handle.metadata.clone()
    }

    fn string_property_or(&self, handle: &Resource, name: &str, fallback: &str) -> StringValue {
        match handle.property(name) {
            Some(property) => {
                if let Some(value) = property.as_str() {
                    return Tracked::new(value.to_string(), property.metadata.clone());
                }
                if let Some((Value::String(value), metadata)) = self.resolve(property) {
                    return Tracked::new(value, metadata);
                }
                Tracked::defaulted(fallback.to_string(), &property.metadata)
            }
            None => Tracked::defaulted(fallback.to_string(), &handle.metadata),
        }
    }

    fn bool_property_or(&self, handle: &Resource, name: &str, fallback: bool) -> BoolValue {
        match handle.property(name) {
            Some(property) => {
                if let Some(value) = property.as_bool() {
                    return Tracked::new(value, property.metadata.clone());
                }
                if let Some((Value::Boolean(value), metadata)) = self.resolve(property) {
                    return Tracked::new(value, metadata);
                }
                Tracked::defaulted(fallback, &property.metadata)
            }
            None => Tracked::defaulted(fallback, &handle.metadata),
        }
    }

    fn int_property_or(&self, handle: &Resource, name: &str, fallback: i64) -> IntValue {
        match handle.property(name) {
            Some(property) => {
                if let Some(value) = property.as_i64() {
                    return Tracked::new(value, property.metadata.clone());
                }
                if let Some((Value::Integer(value), metadata)) = self.resolve(property) {
                    return Tracked::new(value, metadata);
                }
                Tracked::defaulted(fallback, &property.metadata)
            }
            None => Tracked::defaulted(fallback, &handle.metadata),
        }
    }

    fn string_list_property(&self, handle: &Resource, name: &str) -> StringListValue {
        match handle.property(name) {
            Some(property) => match &property.value {
                PropertyValue::List(items) => {
                    let values = items
                        .iter()
                        .filter_map(|item| {
                            item.as_str()
                                .map(|s| Tracked::new(s.to_string(), item.metadata.clone()))
                        })
                        .collect();
                    Tracked::new(values, property.metadata.clone())
                }
                _ => Tracked::defaulted(Vec::new(), &property.metadata),
            },
            None => Tracked::defaulted(Vec::new(), &handle.metadata),
        }
    }
}

/// All templates of a scan, with their source labels.
#[derive(Debug, Default)]
pub struct Documents {
    documents: Vec<Document>,
}

impl Documents {
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn load_file(&mut self, file_path: &Path) -> Result<(), LoadError> {
        let file_path = file_path.canonicalize()?;
        tracing::info!(path=%file_path.display(), "loading template");

        let file_contents = std::fs::read_to_string(&file_path)?;
        let document = Document::parse(&file_contents, Source::from_path(&file_path))?;

        self.documents.push(document);
        Ok(())
    }

    /// Loads every `*.json` / `*.template` file in the directory. A single
    /// malformed document is logged and skipped; it never aborts the scan.
    pub fn load_directory(&mut self, dir_path: &Path) -> Result<(), LoadError> {
        let mut any_files_found = false;

        let read_dir = std::fs::read_dir(dir_path)?;
        for dir_entry in read_dir {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let file_name = dir_entry.file_name().to_string_lossy().to_string();
            if !file_name.ends_with(".json") && !file_name.ends_with(".template") {
                continue;
            }

            any_files_found = true;
            if let Err(error) = self.load_file(&dir_entry.path()) {
                match error {
                    LoadError::Parse(error) => {
                        tracing::warn!(path = %dir_entry.path().display(), %error, "skipping malformed template");
                    }
                    other => return Err(other),
                }
            }
        }

        if !any_files_found {
            return Err(LoadError::NoFilesFound);
        }

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("no template files found in directory")]
    NoFilesFound,
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("unable to parse template")]
    Parse(#[from] json::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_template(input: &str) -> Document {
        Document::parse(input, Source::from("template.json")).expect("template must parse")
    }

    const BUCKET_TEMPLATE: &str = concat!(
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
    );

    #[test]
    fn resources_carry_their_declaration_span() {
        let document = parse_template(BUCKET_TEMPLATE);
        let resource = document.resource("Logs").unwrap();

        assert_eq!(resource.type_name().as_str(), "AWS::S3::Bucket");
        assert_eq!(resource.metadata().range().start_line(), 3);
        assert_eq!(resource.metadata().range().end_line(), 11);
    }

    #[test]
    fn dotted_paths_reach_nested_properties() {
        let document = parse_template(BUCKET_TEMPLATE);
        let resource = document.resource("Logs").unwrap();

        let status = document.string_property(resource, "VersioningConfiguration.Status");
        assert_eq!(status.as_str(), "Enabled");
        assert!(!status.metadata().is_defaulted());
        assert_eq!(status.metadata().range().start_line(), 8);
    }

    #[test]
    fn property_defaults_are_ranged_at_the_resource() {
        let document = parse_template(r#"{"Resources": {"Empty": {"Type": "AWS::S3::Bucket"}}}"#);
        let resource = document.resource("Empty").unwrap();

        let fallback = document.string_property_or(resource, "AccessControl", "Private");
        assert_eq!(fallback.as_str(), "Private");
        assert!(fallback.metadata().is_defaulted());
        assert_eq!(fallback.metadata().range(), resource.metadata().range());

        let active = document.bool_property_or(resource, "Active", true);
        assert!(active.is_true());
        assert!(active.metadata().is_defaulted());
        assert_eq!(active.metadata().range(), resource.metadata().range());

        let tags = document.string_list_property(resource, "Tags");
        assert!(tags.value().is_empty());
        assert!(tags.metadata().is_defaulted());
    }

    #[test]
    fn parameter_refs_resolve_to_their_defaults() {
        let document = parse_template(concat!(
            "{\n",
            "  \"Parameters\": {\n",
            "    \"BucketAcl\": {\"Type\": \"String\", \"Default\": \"private\"}\n",
            "  },\n",
            "  \"Resources\": {\n",
            "    \"Logs\": {\n",
            "      \"Type\": \"AWS::S3::Bucket\",\n",
            "      \"Properties\": {\"AccessControl\": {\"Ref\": \"BucketAcl\"}}\n",
            "    }\n",
            "  }\n",
            "}",
        ));
        let resource = document.resource("Logs").unwrap();

        let acl = document.string_property(resource, "AccessControl");
        assert_eq!(acl.as_str(), "private");
        assert!(!acl.metadata().is_defaulted());
        // ranged at the referencing property, not the parameter
        assert_eq!(acl.metadata().range().start_line(), 8);
    }

    #[test]
    fn child_resources_link_to_their_parent_by_identity() {
        let document = parse_template(concat!(
            "{\n",
            "  \"Resources\": {\n",
            "    \"Group\": {\"Type\": \"group\"},\n",
            "    \"Rule\": {\n",
            "      \"Type\": \"rule\",\n",
            "      \"Properties\": {\"GroupId\": {\"Ref\": \"Group\"}}\n",
            "    }\n",
            "  }\n",
            "}",
        ));

        let index = document.child_resource_ids_by_type("rule");
        let children: Vec<_> = index
            .children_of(&ResourceId::new("Group"))
            .map(ResourceId::as_str)
            .collect();
        assert_eq!(children, vec!["Rule"]);
    }

    #[test]
    fn references_to_undeclared_parents_are_dropped() {
        let document = parse_template(concat!(
            "{\n",
            "  \"Resources\": {\n",
            "    \"Rule\": {\n",
            "      \"Type\": \"rule\",\n",
            "      \"Properties\": {\"GroupId\": {\"Ref\": \"Elsewhere\"}}\n",
            "    }\n",
            "  }\n",
            "}",
        ));

        assert!(document.child_resource_ids_by_type("rule").is_empty());
    }

    #[test]
    fn string_lists_keep_per_element_ranges() {
        let document = parse_template(concat!(
            "{\n",
            "  \"Resources\": {\n",
            "    \"Logs\": {\n",
            "      \"Type\": \"AWS::S3::Bucket\",\n",
            "      \"Properties\": {\"Tags\": [\"one\",\n",
            "                                  \"two\"]}\n",
            "    }\n",
            "  }\n",
            "}",
        ));
        let resource = document.resource("Logs").unwrap();

        let tags = document.string_list_property(resource, "Tags");
        let lines: Vec<_> = tags
            .value()
            .iter()
            .map(|tag| tag.metadata().range().start_line())
            .collect();
        assert_eq!(lines, vec![5, 6]);
    }
}

//! block-structured modules (Terraform-style `.tf` sources)
//!
//! [Modules] collects every `resource` block across the loaded sources.
//! Positions come from the underlying parser's byte spans, converted to
//! line/column ranges per source, so block handles report the same
//! [crate::types::Metadata] shape as templated documents.

mod block;

pub use block::{AttrValue, BlockAttribute, BlockBody, ChildBlock, ResourceBlock};

use crate::accessor::{ChildIndex, ResourceAccess, ResourceId};
use crate::tracked::{BoolValue, IntValue, StringListValue, StringValue, Tracked};
use crate::types::{LineIndex, Metadata, Source};
use std::path::Path;

/// All resource blocks of a scan.
#[derive(Debug, Default)]
pub struct Modules {
    resources: Vec<ResourceBlock>,
    source_count: usize,
}

impl Modules {
    /// Parses one source and collects its resource blocks. Top-level blocks
    /// other than `resource` (providers, outputs, data sources) are skipped.
    pub fn insert(&mut self, input: &str, source: Source) -> Result<(), LoadError> {
        let body = hcl_edit::parser::parse_body(input)?;
        let index = LineIndex::new(input);

        for block in body.blocks() {
            match ResourceBlock::new(block, &index, &source) {
                Some(resource) => self.resources.push(resource),
                None => {
                    tracing::trace!(%source, ident = block.ident.value().as_str(), "skipping non-resource block");
                }
            }
        }

        self.source_count += 1;
        Ok(())
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceBlock> {
        self.resources.iter()
    }

    pub fn resource(&self, id: &ResourceId) -> Option<&ResourceBlock> {
        self.resources.iter().find(|resource| resource.id() == *id)
    }

    pub fn source_count(&self) -> usize {
        self.source_count
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn load_file(&mut self, file_path: &Path) -> Result<(), LoadError> {
        let file_path = file_path.canonicalize()?;
        tracing::info!(path=%file_path.display(), "loading module source");

        let file_contents = std::fs::read_to_string(&file_path)?;
        self.insert(&file_contents, Source::from_path(&file_path))
    }

    /// Loads every `*.tf` file in the directory. A single malformed source
    /// is logged and skipped; it never aborts the scan.
    pub fn load_directory(&mut self, dir_path: &Path) -> Result<(), LoadError> {
        let mut any_files_found = false;

        let read_dir = std::fs::read_dir(dir_path)?;
        for dir_entry in read_dir {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            if dir_entry.file_name().to_string_lossy().ends_with(".tf") {
                any_files_found = true;
                if let Err(error) = self.load_file(&dir_entry.path()) {
                    match error {
                        LoadError::ParseFailed(error) => {
                            tracing::warn!(path = %dir_entry.path().display(), %error, "skipping malformed module source");
                        }
                        other => return Err(other),
                    }
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
    #[error("no module sources found in directory")]
    NoFilesFound,
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("unable to parse module source")]
    ParseFailed(#[from] hcl_edit::parser::Error),
}

impl ResourceAccess for Modules {
    type Handle = ResourceBlock;

    fn resources_by_type(&self, type_name: &str) -> Vec<&ResourceBlock> {
        self.resources
            .iter()
            .filter(|resource| resource.type_name() == type_name)
            .collect()
    }

    fn child_resource_ids_by_type(&self, type_name: &str) -> ChildIndex {
        let mut index = ChildIndex::default();
        for resource in self.resources_by_type(type_name) {
            for parent in resource.references() {
                if self.resource(&parent).is_some() {
                    index.insert(parent, resource.id());
                }
            }
        }
        tracing::trace!(%type_name, links = index.len(), "built child resource index");
        index
    }

    fn resource_id(&self, handle: &ResourceBlock) -> ResourceId {
        handle.id()
    }

    fn resource_metadata(&self, handle: &ResourceBlock) -> Metadata {
        handle.metadata().clone()
    }

    fn string_property_or(&self, handle: &ResourceBlock, name: &str, fallback: &str) -> StringValue {
        match handle.attribute(name) {
            Some(attribute) => match attribute.as_str() {
                Some(value) => Tracked::new(value.to_string(), attribute.metadata().clone()),
                None => Tracked::defaulted(fallback.to_string(), attribute.metadata()),
            },
            None => Tracked::defaulted(fallback.to_string(), handle.metadata()),
        }
    }

    fn bool_property_or(&self, handle: &ResourceBlock, name: &str, fallback: bool) -> BoolValue {
        match handle.attribute(name) {
            Some(attribute) => match attribute.as_bool() {
                Some(value) => Tracked::new(value, attribute.metadata().clone()),
                None => Tracked::defaulted(fallback, attribute.metadata()),
            },
            None => Tracked::defaulted(fallback, handle.metadata()),
        }
    }

    fn int_property_or(&self, handle: &ResourceBlock, name: &str, fallback: i64) -> IntValue {
        match handle.attribute(name) {
            Some(attribute) => match attribute.as_i64() {
                Some(value) => Tracked::new(value, attribute.metadata().clone()),
                None => Tracked::defaulted(fallback, attribute.metadata()),
            },
            None => Tracked::defaulted(fallback, handle.metadata()),
        }
    }

    fn string_list_property(&self, handle: &ResourceBlock, name: &str) -> StringListValue {
        match handle.attribute(name) {
            Some(attribute) => match attribute.value() {
                AttrValue::List(items) => {
                    let values = items
                        .iter()
                        .filter_map(|item| {
                            item.as_str()
                                .map(|s| Tracked::new(s.to_string(), item.metadata().clone()))
                        })
                        .collect();
                    Tracked::new(values, attribute.metadata().clone())
                }
                _ => Tracked::defaulted(Vec::new(), attribute.metadata()),
            },
            None => Tracked::defaulted(Vec::new(), handle.metadata()),
        }
    }
}

/// Builds [Modules] from inline sources, named `main.tf`, `extra1.tf`, ...
#[macro_export]
macro_rules! hcl_modules {
    ($main:expr $(, $extra:expr)* $(,)?) => {{
        let mut modules = $crate::hcl::Modules::default();
        modules
            .insert($main, $crate::types::Source::from("main.tf"))
            .expect("main.tf must parse");
        let extras: &[&str] = &[$($extra),*];
        for (index, input) in extras.iter().enumerate() {
            let name = format!("extra{}.tf", index + 1);
            modules
                .insert(input, $crate::types::Source::from(name.as_str()))
                .expect("extra source must parse");
        }
        modules
    }};
}

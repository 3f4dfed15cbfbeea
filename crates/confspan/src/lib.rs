//! # confspan - configuration scanning with source spans
//!
//! Parses infrastructure configuration and exposes every decoded value
//! together with the exact place it was written, so findings can point at a
//! line instead of a file.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `confspan` works internally.
//!
//! ### Terms
//!
//! - `range`: inclusive 1-based (line, column) start/end of an element in
//!   its original text ([types::Range])
//! - `metadata`: a range plus the source label and the provenance flag
//!   ([types::Metadata])
//! - `provenance`: whether a value was read verbatim from a document
//!   (explicit) or synthesized because the document omitted it (defaulted).
//!   Defaulted values carry the range of the enclosing element, never an
//!   empty range.
//! - `handle`: a notation's view of one declared resource, only ever used
//!   through [accessor::ResourceAccess]
//!
//! ### The two notations
//!
//! **Templated documents** (`.json` / `.template`) declare resources under
//! a top-level `Resources` object. We parse these ourselves: a
//! char-by-char [json::PeekReader] feeds a recursive-descent parser that
//! records a range on every syntax [json::Node], and the decode engine in
//! [json::decode] maps nodes onto typed targets. Absent fields decode to
//! defaults with defaulted provenance via [tracked::DefaultAt].
//!
//! **Block modules** (`.tf`) are parsed with [hcl_edit]; in hcl terms a
//! file is a `body` holding `attribute`s (key = value) and `block`s (an
//! identifier, optional labels and a nested body). We keep only two-label
//! `resource` blocks, convert the parser's byte spans into ranges with
//! [types::LineIndex], and narrow attribute expressions to
//! [hcl::AttrValue] so lookups never need to evaluate anything.
//!
//! ### The accessor surface
//!
//! Each notation implements [accessor::ResourceAccess] once: resources by
//! type, typed property lookups with fallbacks, and a frozen
//! [accessor::ChildIndex] mapping parent identities to the resources
//! referencing them. Cross-resource links are identities, never direct
//! references.
//!
//! ### Adapters and models
//!
//! [adapt] builds the typed models in [providers] from the accessor
//! surface alone, so a model adapted from a template compares equal to the
//! same configuration written as a block module ([tracked::Tracked]
//! equality ignores metadata).

pub mod accessor;
pub mod adapt;
pub mod hcl;
pub mod json;
pub mod providers;
pub mod template;
pub mod tracked;
pub mod types;
pub mod value;

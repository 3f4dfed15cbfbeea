//! resource blocks and their attributes
//!
//! [ResourceBlock] is the handle the accessor surface hands out for block
//! modules. Attribute expressions are narrowed to [AttrValue] at load time:
//! literals keep their value, traversals become reference paths, and
//! anything requiring evaluation is carried as [AttrValue::Unresolved] so a
//! later lookup can fall back with defaulted provenance instead of failing.

use crate::accessor::ResourceId;
use crate::types::{LineIndex, Metadata, Position, Range, Source};
use crate::value::Value;
use hcl_edit::expr::{Expression, TraversalOperator};
use hcl_edit::structure::Block;
use hcl_edit::Span;
use indexmap::IndexMap;

/// One `resource "type" "name" { ... }` declaration.
#[derive(Debug)]
pub struct ResourceBlock {
    type_name: String,
    name: String,
    body: BlockBody,
    metadata: Metadata,
}

impl ResourceBlock {
    /// Returns `None` for anything that is not a two-label resource block.
    pub(crate) fn new(block: &Block, index: &LineIndex, source: &Source) -> Option<Self> {
        if block.ident.value().as_str() != "resource" || block.labels.len() != 2 {
            return None;
        }
        Some(ResourceBlock {
            type_name: block.labels[0].as_str().to_string(),
            name: block.labels[1].as_str().to_string(),
            body: BlockBody::new(&block.body, index, source),
            metadata: span_metadata(block.span(), index, source),
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `type.name` address used for cross-resource references.
    pub fn id(&self) -> ResourceId {
        ResourceId::new(format!("{}.{}", self.type_name, self.name))
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn body(&self) -> &BlockBody {
        &self.body
    }

    /// Attribute lookup; dotted paths descend into nested blocks, e.g.
    /// `"versioning.enabled"`.
    pub fn attribute(&self, path: &str) -> Option<&BlockAttribute> {
        self.body.attribute(path)
    }

    /// Identities of resources referenced from any attribute expression.
    pub fn references(&self) -> Vec<ResourceId> {
        let mut out = Vec::new();
        self.body.collect_references(&mut out);
        out
    }
}

fn span_metadata(
    span: Option<std::ops::Range<usize>>,
    index: &LineIndex,
    source: &Source,
) -> Metadata {
    let range = match span {
        Some(span) => index.range(span),
        None => Range::at(Position::start()),
    };
    Metadata::new(range, source.clone())
}

/// The attributes and nested blocks of one block body.
#[derive(Debug)]
pub struct BlockBody {
    attributes: IndexMap<String, BlockAttribute>,
    children: Vec<ChildBlock>,
}

impl BlockBody {
    fn new(body: &hcl_edit::structure::Body, index: &LineIndex, source: &Source) -> Self {
        let mut attributes = IndexMap::new();
        for attribute in body.attributes() {
            // repeated attributes resolve to the last occurrence
            attributes.insert(
                attribute.key.value().as_str().to_string(),
                BlockAttribute::new(&attribute.value, index, source),
            );
        }

        let children = body
            .blocks()
            .map(|block| ChildBlock {
                ident: block.ident.value().as_str().to_string(),
                body: BlockBody::new(&block.body, index, source),
                metadata: span_metadata(block.span(), index, source),
            })
            .collect();

        BlockBody {
            attributes,
            children,
        }
    }

    pub fn attribute(&self, path: &str) -> Option<&BlockAttribute> {
        match path.split_once('.') {
            None => self.attributes.get(path),
            Some((head, rest)) => self.child(head)?.body.attribute(rest),
        }
    }

    /// The last nested block with the given ident, matching how overridden
    /// blocks behave.
    pub fn child(&self, ident: &str) -> Option<&ChildBlock> {
        self.children.iter().rev().find(|child| child.ident == ident)
    }

    pub fn children(&self) -> impl Iterator<Item = &ChildBlock> {
        self.children.iter()
    }

    fn collect_references(&self, out: &mut Vec<ResourceId>) {
        for attribute in self.attributes.values() {
            attribute.collect_references(out);
        }
        for child in &self.children {
            child.body.collect_references(out);
        }
    }
}

/// A nested block such as `versioning { ... }`.
#[derive(Debug)]
pub struct ChildBlock {
    ident: String,
    body: BlockBody,
    metadata: Metadata,
}

impl ChildBlock {
    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn body(&self) -> &BlockBody {
        &self.body
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// One attribute with its expression span.
#[derive(Debug)]
pub struct BlockAttribute {
    value: AttrValue,
    metadata: Metadata,
}

/// An attribute expression narrowed to what lookups need.
#[derive(Debug)]
pub enum AttrValue {
    Literal(Value),
    List(Vec<BlockAttribute>),
    /// A traversal such as `group.g.id`, kept as its path segments.
    Reference(Vec<String>),
    /// Anything needing evaluation (templates, function calls, operators).
    Unresolved,
}

impl BlockAttribute {
    fn new(expr: &Expression, index: &LineIndex, source: &Source) -> Self {
        BlockAttribute {
            value: convert(expr, index, source),
            metadata: span_metadata(expr.span(), index, source),
        }
    }

    pub fn value(&self) -> &AttrValue {
        &self.value
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            AttrValue::Literal(value) => value.as_str(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            AttrValue::Literal(value) => value.as_bool(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match &self.value {
            AttrValue::Literal(value) => value.as_i64(),
            _ => None,
        }
    }

    fn collect_references(&self, out: &mut Vec<ResourceId>) {
        match &self.value {
            AttrValue::Reference(path) => {
                // type.name.attr → the first two segments address a resource
                if path.len() >= 2 {
                    out.push(ResourceId::new(format!("{}.{}", path[0], path[1])));
                }
            }
            AttrValue::List(items) => {
                for item in items {
                    item.collect_references(out);
                }
            }
            _ => {}
        }
    }
}

fn convert(expr: &Expression, index: &LineIndex, source: &Source) -> AttrValue {
    match expr {
        Expression::Null(_) => AttrValue::Literal(Value::Null),
        Expression::Bool(value) => AttrValue::Literal(Value::Boolean(*value.value())),
        Expression::Number(number) => AttrValue::Literal(match number.value().as_i64() {
            Some(value) => Value::Integer(value),
            None => Value::Decimal(number.value().as_f64().unwrap_or(f64::NAN)),
        }),
        Expression::String(value) => AttrValue::Literal(Value::String(value.value().clone())),
        Expression::Array(array) => AttrValue::List(
            array
                .iter()
                .map(|element| BlockAttribute::new(element, index, source))
                .collect(),
        ),
        Expression::Object(_) => match literal_value(expr) {
            Some(value) => AttrValue::Literal(value),
            None => AttrValue::Unresolved,
        },
        Expression::Variable(variable) => {
            AttrValue::Reference(vec![variable.value().as_str().to_string()])
        }
        Expression::Traversal(traversal) => match traversal_path(traversal) {
            Some(path) => AttrValue::Reference(path),
            None => AttrValue::Unresolved,
        },
        _ => AttrValue::Unresolved,
    }
}

fn traversal_path(traversal: &hcl_edit::expr::Traversal) -> Option<Vec<String>> {
    let Expression::Variable(root) = &traversal.expr else {
        return None;
    };
    let mut path = vec![root.value().as_str().to_string()];
    for operator in &traversal.operators {
        match operator.value() {
            TraversalOperator::GetAttr(ident) => path.push(ident.value().as_str().to_string()),
            // indexes and splats end the usable part of the path
            _ => break,
        }
    }
    Some(path)
}

/// Fully literal expressions fold into a plain [Value]; anything else is
/// `None`.
fn literal_value(expr: &Expression) -> Option<Value> {
    match expr {
        Expression::Null(_) => Some(Value::Null),
        Expression::Bool(value) => Some(Value::Boolean(*value.value())),
        Expression::Number(number) => Some(match number.value().as_i64() {
            Some(value) => Value::Integer(value),
            None => Value::Decimal(number.value().as_f64().unwrap_or(f64::NAN)),
        }),
        Expression::String(value) => Some(Value::String(value.value().clone())),
        Expression::Array(array) => Some(Value::Array(
            array.iter().map(literal_value).collect::<Option<_>>()?,
        )),
        Expression::Object(object) => Some(Value::Object(
            object
                .iter()
                .map(|(key, value)| Some((object_key(key)?, literal_value(value.expr())?)))
                .collect::<Option<_>>()?,
        )),
        _ => None,
    }
}

fn object_key(key: &hcl_edit::expr::ObjectKey) -> Option<String> {
    match key {
        hcl_edit::expr::ObjectKey::Ident(ident) => Some(ident.value().as_str().to_string()),
        hcl_edit::expr::ObjectKey::Expression(Expression::String(value)) => {
            Some(value.value().clone())
        }
        _ => None,
    }
}

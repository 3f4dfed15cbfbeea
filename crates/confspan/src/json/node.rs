//! position-annotated generic syntax tree
//!
//! Nodes are created exactly once by the parser, read during decode and
//! discarded afterwards; nothing downstream retains them.

use crate::types::{Metadata, Position, Range, Source};

/// One object key together with the range of its quoted name.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    pub name: String,
    pub range: Range,
    /// The quoted source text, kept verbatim so re-serialization does not
    /// shift later tokens when the spelling is non-canonical (escapes).
    pub raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Key/value pairs in declaration order. Duplicate keys are resolved by
    /// the parser: the last occurrence wins and earlier entries are dropped.
    Object(Vec<(Key, Node)>),
    Array(Vec<Node>),
    String(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    Null,
}

/// A syntax tree node owning its exact source range.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeKind,
    range: Range,
    /// Original lexeme of scalar tokens whose canonical spelling may differ
    /// from the source (`1e3`, `"A"`); `None` elsewhere.
    raw: Option<String>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, range: Range) -> Self {
        Node {
            kind,
            range,
            raw: None,
        }
    }

    pub(crate) fn with_raw(kind: NodeKind, range: Range, raw: String) -> Self {
        Node {
            kind,
            range,
            raw: Some(raw),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Object(_) => "object",
            NodeKind::Array(_) => "array",
            NodeKind::String(_) => "string",
            NodeKind::Integer(_) | NodeKind::Decimal(_) => "number",
            NodeKind::Bool(_) => "boolean",
            NodeKind::Null => "null",
        }
    }

    pub fn metadata(&self, source: &Source) -> Metadata {
        Metadata::new(self.range, source.clone())
    }

    pub fn entries(&self) -> Option<&[(Key, Node)]> {
        match &self.kind {
            NodeKind::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.kind {
            NodeKind::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match &self.kind {
            NodeKind::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries()?
            .iter()
            .find(|(k, _)| k.name == key)
            .map(|(_, node)| node)
    }

    /// Re-serializes the tree, padding with whitespace so every token sits
    /// at its recorded position. Reparsing the result yields identical
    /// ranges.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        let mut cursor = Position::start();
        self.write(&mut out, &mut cursor);
        out
    }

    fn write(&self, out: &mut String, cursor: &mut Position) {
        pad_to(out, cursor, self.range.start);
        match &self.kind {
            NodeKind::Object(entries) => {
                emit(out, cursor, "{");
                let last = entries.len().saturating_sub(1);
                for (index, (key, value)) in entries.iter().enumerate() {
                    pad_to(out, cursor, key.range.start);
                    match &key.raw {
                        Some(raw) => emit(out, cursor, raw),
                        None => emit(out, cursor, &quote(&key.name)),
                    }
                    emit(out, cursor, ":");
                    value.write(out, cursor);
                    if index != last {
                        emit(out, cursor, ",");
                    }
                }
                pad_to(out, cursor, self.range.end);
                emit(out, cursor, "}");
            }
            NodeKind::Array(items) => {
                emit(out, cursor, "[");
                let last = items.len().saturating_sub(1);
                for (index, item) in items.iter().enumerate() {
                    item.write(out, cursor);
                    if index != last {
                        emit(out, cursor, ",");
                    }
                }
                pad_to(out, cursor, self.range.end);
                emit(out, cursor, "]");
            }
            NodeKind::String(value) => match &self.raw {
                Some(raw) => emit(out, cursor, raw),
                None => emit(out, cursor, &quote(value)),
            },
            NodeKind::Integer(value) => match &self.raw {
                Some(raw) => emit(out, cursor, raw),
                None => emit(out, cursor, &value.to_string()),
            },
            NodeKind::Decimal(value) => match &self.raw {
                Some(raw) => emit(out, cursor, raw),
                None => emit(out, cursor, &value.to_string()),
            },
            NodeKind::Bool(true) => emit(out, cursor, "true"),
            NodeKind::Bool(false) => emit(out, cursor, "false"),
            NodeKind::Null => emit(out, cursor, "null"),
        }
    }
}

fn pad_to(out: &mut String, cursor: &mut Position, target: Position) {
    while cursor.line < target.line {
        out.push('\n');
        cursor.line += 1;
        cursor.column = 1;
    }
    while cursor.column < target.column {
        out.push(' ');
        cursor.column += 1;
    }
}

fn emit(out: &mut String, cursor: &mut Position, text: &str) {
    for ch in text.chars() {
        out.push(ch);
        if ch == '\n' {
            cursor.line += 1;
            cursor.column = 1;
        } else {
            cursor.column += 1;
        }
    }
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            ch if (ch as u32) < 0x20 => {
                quoted.push_str(&format!("\\u{:04x}", ch as u32));
            }
            ch => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

//! recursive-descent parser for templated JSON documents
//!
//! Produces the position-annotated syntax tree of [super::node]. Each
//! sub-parser records the range from the first consumed character to the
//! last, inclusive; surrounding whitespace and structural punctuation never
//! extend a value's range. `//` and `/* */` comments are tolerated as
//! trivia, since templated documents in the wild carry them.

use super::error::ParseError;
use super::node::{Key, Node, NodeKind};
use super::reader::PeekReader;
use crate::types::{Position, Range};

/// Parses a complete document into a syntax tree.
pub fn parse(input: &str) -> Result<Node, ParseError> {
    parse_at(input, Position::start())
}

/// Parses a document embedded in a larger one, reporting all ranges
/// relative to the enclosing document.
pub fn parse_at(input: &str, start: Position) -> Result<Node, ParseError> {
    let mut parser = Parser {
        reader: PeekReader::starting_at(input, start),
    };

    let node = parser.parse_value()?;

    parser.skip_trivia()?;
    if let Some(found) = parser.reader.peek() {
        return Err(ParseError::Syntax {
            position: parser.reader.position(),
            expected: "end of document",
            found: found.to_string(),
        });
    }

    Ok(node)
}

struct Parser<'a> {
    reader: PeekReader<'a>,
}

impl<'a> Parser<'a> {
    fn parse_value(&mut self) -> Result<Node, ParseError> {
        self.skip_trivia()?;
        match self.reader.peek() {
            None => Err(ParseError::Truncated {
                position: self.reader.position(),
                expected: "value",
            }),
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') => self.parse_string(),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some('t') => self.parse_literal("true", NodeKind::Bool(true)),
            Some('f') => self.parse_literal("false", NodeKind::Bool(false)),
            Some('n') => self.parse_literal("null", NodeKind::Null),
            Some(found) => Err(ParseError::Syntax {
                position: self.reader.position(),
                expected: "value",
                found: found.to_string(),
            }),
        }
    }

    fn parse_object(&mut self) -> Result<Node, ParseError> {
        let start = self.reader.position();
        self.expect('{', "'{'")?;

        let mut entries: Vec<(Key, Node)> = Vec::new();

        self.skip_trivia()?;
        if self.reader.peek() == Some('}') {
            self.reader.advance();
            return Ok(Node::new(
                NodeKind::Object(entries),
                Range::new(start, self.reader.last_position()),
            ));
        }

        loop {
            self.skip_trivia()?;
            let key = self.parse_key()?;
            self.skip_trivia()?;
            self.expect(':', "':'")?;
            let value = self.parse_value()?;

            // last occurrence wins, earlier entries are not retrievable
            if let Some(existing) = entries.iter().position(|(k, _)| k.name == key.name) {
                tracing::trace!(key = %key.name, "duplicate object key, keeping the later value");
                entries.remove(existing);
            }
            entries.push((key, value));

            self.skip_trivia()?;
            match self.reader.peek() {
                Some(',') => {
                    self.reader.advance();
                }
                Some('}') => {
                    self.reader.advance();
                    break;
                }
                Some(found) => {
                    return Err(ParseError::Syntax {
                        position: self.reader.position(),
                        expected: "',' or '}'",
                        found: found.to_string(),
                    })
                }
                None => {
                    return Err(ParseError::Truncated {
                        position: self.reader.position(),
                        expected: "',' or '}'",
                    })
                }
            }
        }

        Ok(Node::new(
            NodeKind::Object(entries),
            Range::new(start, self.reader.last_position()),
        ))
    }

    fn parse_array(&mut self) -> Result<Node, ParseError> {
        let start = self.reader.position();
        self.expect('[', "'['")?;

        let mut items = Vec::new();

        self.skip_trivia()?;
        if self.reader.peek() == Some(']') {
            self.reader.advance();
            return Ok(Node::new(
                NodeKind::Array(items),
                Range::new(start, self.reader.last_position()),
            ));
        }

        loop {
            items.push(self.parse_value()?);

            self.skip_trivia()?;
            match self.reader.peek() {
                Some(',') => {
                    self.reader.advance();
                }
                Some(']') => {
                    self.reader.advance();
                    break;
                }
                Some(found) => {
                    return Err(ParseError::Syntax {
                        position: self.reader.position(),
                        expected: "',' or ']'",
                        found: found.to_string(),
                    })
                }
                None => {
                    return Err(ParseError::Truncated {
                        position: self.reader.position(),
                        expected: "',' or ']'",
                    })
                }
            }
        }

        Ok(Node::new(
            NodeKind::Array(items),
            Range::new(start, self.reader.last_position()),
        ))
    }

    fn parse_string(&mut self) -> Result<Node, ParseError> {
        let (value, raw, range) = self.parse_string_token()?;
        Ok(Node::with_raw(NodeKind::String(value), range, raw))
    }

    fn parse_key(&mut self) -> Result<Key, ParseError> {
        if self.reader.peek() != Some('"') {
            return match self.reader.peek() {
                Some(found) => Err(ParseError::Syntax {
                    position: self.reader.position(),
                    expected: "object key",
                    found: found.to_string(),
                }),
                None => Err(ParseError::Truncated {
                    position: self.reader.position(),
                    expected: "object key",
                }),
            };
        }

        let (name, raw, range) = self.parse_string_token()?;
        Ok(Key {
            name,
            range,
            raw: Some(raw),
        })
    }

    /// Returns the unescaped value, the quoted source text verbatim, and the
    /// range. The raw text backs position-preserving re-serialization: a
    /// re-emitted canonical spelling could be shorter than the original and
    /// would shift every later token on the line.
    fn parse_string_token(&mut self) -> Result<(String, String, Range), ParseError> {
        let start = self.reader.position();
        self.expect('"', "'\"'")?;

        let mut value = String::new();
        let mut raw = String::from("\"");
        loop {
            match self.reader.advance() {
                None => {
                    return Err(ParseError::Truncated {
                        position: self.reader.position(),
                        expected: "closing '\"'",
                    })
                }
                Some('"') => {
                    raw.push('"');
                    break;
                }
                Some('\\') => {
                    raw.push('\\');
                    value.push(self.parse_escape(&mut raw)?);
                }
                Some(ch) => {
                    raw.push(ch);
                    value.push(ch);
                }
            }
        }

        Ok((value, raw, Range::new(start, self.reader.last_position())))
    }

    fn parse_escape(&mut self, raw: &mut String) -> Result<char, ParseError> {
        let position = self.reader.position();
        match self.reader.advance() {
            None => Err(ParseError::Truncated {
                position,
                expected: "escape sequence",
            }),
            Some(marker) => {
                raw.push(marker);
                match marker {
                    '"' => Ok('"'),
                    '\\' => Ok('\\'),
                    '/' => Ok('/'),
                    'b' => Ok('\u{0008}'),
                    'f' => Ok('\u{000c}'),
                    'n' => Ok('\n'),
                    'r' => Ok('\r'),
                    't' => Ok('\t'),
                    'u' => {
                        let mut code = 0u32;
                        for _ in 0..4 {
                            let digit = match self.reader.advance() {
                                None => {
                                    return Err(ParseError::Truncated {
                                        position,
                                        expected: "unicode escape",
                                    })
                                }
                                Some(ch) => {
                                    raw.push(ch);
                                    ch.to_digit(16).ok_or(ParseError::Syntax {
                                        position,
                                        expected: "unicode escape",
                                        found: ch.to_string(),
                                    })?
                                }
                            };
                            code = code * 16 + digit;
                        }
                        char::from_u32(code).ok_or(ParseError::Syntax {
                            position,
                            expected: "unicode escape",
                            found: format!("\\u{code:04x}"),
                        })
                    }
                    found => Err(ParseError::Syntax {
                        position,
                        expected: "escape sequence",
                        found: found.to_string(),
                    }),
                }
            }
        }
    }

    fn parse_number(&mut self) -> Result<Node, ParseError> {
        let start = self.reader.position();
        let mut text = String::new();

        if self.reader.peek() == Some('-') {
            self.reader.advance();
            text.push('-');
        }

        match self.reader.peek() {
            Some(c) if c.is_ascii_digit() => {}
            Some(found) => {
                return Err(ParseError::Syntax {
                    position: self.reader.position(),
                    expected: "digit",
                    found: found.to_string(),
                })
            }
            None => {
                return Err(ParseError::Truncated {
                    position: self.reader.position(),
                    expected: "digit",
                })
            }
        }
        self.consume_digits(&mut text);

        let mut is_decimal = false;

        // the decimal point is only part of the number when a digit follows,
        // otherwise it is a delimiter of the surrounding structure
        if self.reader.peek() == Some('.')
            && self.reader.peek_at(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_decimal = true;
            self.reader.advance();
            text.push('.');
            self.consume_digits(&mut text);
        }

        if matches!(self.reader.peek(), Some('e') | Some('E')) {
            is_decimal = true;
            if let Some(marker) = self.reader.advance() {
                text.push(marker);
            }
            if matches!(self.reader.peek(), Some('+') | Some('-')) {
                if let Some(sign) = self.reader.advance() {
                    text.push(sign);
                }
            }
            match self.reader.peek() {
                Some(c) if c.is_ascii_digit() => self.consume_digits(&mut text),
                Some(found) => {
                    return Err(ParseError::Syntax {
                        position: self.reader.position(),
                        expected: "exponent",
                        found: found.to_string(),
                    })
                }
                None => {
                    return Err(ParseError::Truncated {
                        position: self.reader.position(),
                        expected: "exponent",
                    })
                }
            }
        }

        let range = Range::new(start, self.reader.last_position());
        let kind = if is_decimal {
            NodeKind::Decimal(text.parse().map_err(|_| ParseError::Syntax {
                position: start,
                expected: "number",
                found: text.clone(),
            })?)
        } else {
            match text.parse::<i64>() {
                Ok(value) => NodeKind::Integer(value),
                // out-of-range integers degrade to decimals
                Err(_) => NodeKind::Decimal(text.parse().map_err(|_| ParseError::Syntax {
                    position: start,
                    expected: "number",
                    found: text.clone(),
                })?),
            }
        };

        Ok(Node::with_raw(kind, range, text))
    }

    fn consume_digits(&mut self, text: &mut String) {
        while let Some(c) = self.reader.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            self.reader.advance();
            text.push(c);
        }
    }

    fn parse_literal(&mut self, word: &'static str, kind: NodeKind) -> Result<Node, ParseError> {
        let start = self.reader.position();
        for expected in word.chars() {
            match self.reader.advance() {
                None => {
                    return Err(ParseError::Truncated {
                        position: self.reader.position(),
                        expected: word,
                    })
                }
                Some(found) if found != expected => {
                    return Err(ParseError::Syntax {
                        position: self.reader.last_position(),
                        expected: word,
                        found: found.to_string(),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(Node::new(kind, Range::new(start, self.reader.last_position())))
    }

    fn expect(&mut self, expected_char: char, expected: &'static str) -> Result<(), ParseError> {
        let position = self.reader.position();
        match self.reader.advance() {
            None => Err(ParseError::Truncated { position, expected }),
            Some(found) if found != expected_char => Err(ParseError::Syntax {
                position,
                expected,
                found: found.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.reader.peek() {
                Some(c) if c.is_whitespace() => {
                    self.reader.advance();
                }
                Some('/') if self.reader.peek_at(1) == Some('/') => {
                    while let Some(c) = self.reader.advance() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some('/') if self.reader.peek_at(1) == Some('*') => {
                    self.reader.advance();
                    self.reader.advance();
                    loop {
                        match self.reader.advance() {
                            None => {
                                return Err(ParseError::Truncated {
                                    position: self.reader.position(),
                                    expected: "end of comment",
                                })
                            }
                            Some('*') if self.reader.peek() == Some('/') => {
                                self.reader.advance();
                                break;
                            }
                            Some(_) => {}
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }
}

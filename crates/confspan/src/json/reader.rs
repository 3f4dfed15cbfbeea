//! character reader with lookahead and a running line/column cursor

use crate::types::Position;
use std::collections::VecDeque;

/// Reads characters one at a time while tracking the position of the next
/// unconsumed character. Lookahead is unbounded, but the grammar only ever
/// needs a few characters (e.g. telling a decimal point from a delimiter).
pub struct PeekReader<'a> {
    chars: std::str::Chars<'a>,
    lookahead: VecDeque<char>,
    next_position: Position,
    last_position: Position,
}

impl<'a> PeekReader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::starting_at(input, Position::start())
    }

    /// A reader whose cursor starts somewhere inside an enclosing document,
    /// so embedded sub-documents report ranges relative to it.
    pub fn starting_at(input: &'a str, start: Position) -> Self {
        PeekReader {
            chars: input.chars(),
            lookahead: VecDeque::new(),
            next_position: start,
            last_position: start,
        }
    }

    /// Position of the next unconsumed character.
    pub fn position(&self) -> Position {
        self.next_position
    }

    /// Position of the most recently consumed character.
    pub fn last_position(&self) -> Position {
        self.last_position
    }

    pub fn peek(&mut self) -> Option<char> {
        self.peek_at(0)
    }

    /// Looks ahead `k` characters without consuming anything (0 = next).
    pub fn peek_at(&mut self, k: usize) -> Option<char> {
        while self.lookahead.len() <= k {
            let next = self.chars.next()?;
            self.lookahead.push_back(next);
        }
        self.lookahead.get(k).copied()
    }

    /// Consumes one character, updating the cursor. A line terminator
    /// increments the line and resets the column.
    pub fn advance(&mut self) -> Option<char> {
        let next = self
            .lookahead
            .pop_front()
            .or_else(|| self.chars.next())?;

        self.last_position = self.next_position;
        if next == '\n' {
            self.next_position.line += 1;
            self.next_position.column = 1;
        } else {
            self.next_position.column += 1;
        }

        Some(next)
    }
}

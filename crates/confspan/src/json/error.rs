use crate::types::Position;

/// Failures while building the syntax tree.
///
/// Always fatal to the current document, never to a multi-document run;
/// parsing stops at the first error, there is no resynchronization.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("syntax error at {position}: expected {expected}, found {found}")]
    Syntax {
        position: Position,
        expected: &'static str,
        found: String,
    },

    #[error("unexpected end of input at {position} while reading {expected}")]
    Truncated {
        position: Position,
        expected: &'static str,
    },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Syntax { position, .. } => *position,
            ParseError::Truncated { position, .. } => *position,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn renders_position_and_expectation() {
        let error = ParseError::Syntax {
            position: Position::new(1, 7),
            expected: "value",
            found: "}".to_string(),
        };
        insta::assert_snapshot!(error, @"syntax error at 1:7: expected value, found }");

        let error = ParseError::Truncated {
            position: Position::new(3, 2),
            expected: "closing '\"'",
        };
        insta::assert_snapshot!(error, @r#"unexpected end of input at 3:2 while reading closing '"'"#);
    }
}

use std::fmt;

use crate::token::Token;

/// Everything that can stop a unit from compiling.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Internal(#[from] InternalError),
    #[error("failed to write to sink")]
    Write(#[from] fmt::Error),
}

/// Malformed input. Reported at the first offending token; there is no
/// recovery.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{column}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SyntaxError {
    pub fn at(token: &Token<'_>, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            message: message.into(),
            file: token.loc.file.to_owned(),
            line: token.loc.line,
            column: token.loc.column,
        }
    }

    /// `"{expectation} but found {token}"`.
    pub fn expected(token: &Token<'_>, expectation: &str) -> SyntaxError {
        SyntaxError::at(token, format!("{expectation} but found {}", token.describe()))
    }
}

/// A defect in the compiler itself: an attempt to build, or to print, a tree
/// that breaks the AST's structural rules.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    pub message: String,
}

impl InternalError {
    pub fn new(message: impl Into<String>) -> InternalError {
        InternalError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Loc, TokenKind};

    #[test]
    fn test_display() {
        let token = Token {
            kind: TokenKind::RParen,
            text: ")",
            loc: Loc {
                file: "a.sjs",
                line: 3,
                column: 7,
                offset: 20,
            },
        };
        let syntax = SyntaxError::expected(&token, "expected DECLARATION");
        assert_eq!(syntax.to_string(), "3:7: expected DECLARATION but found RPAREN (`)`)");
        assert_eq!(Error::from(syntax).to_string(), "3:7: expected DECLARATION but found RPAREN (`)`)");

        let internal = Error::from(InternalError::new("bad node"));
        assert_eq!(internal.to_string(), "internal error: bad node");
        assert_ne!(internal, Error::Write(fmt::Error));
    }

    #[test]
    fn test_keywords_and_eof_are_described_by_kind() {
        let at = |kind, text| Token {
            kind,
            text,
            loc: Loc::start_of("a.sjs"),
        };
        let message = |token| SyntaxError::expected(&token, "expected EXPRESSION").message;
        assert_eq!(message(at(TokenKind::Eof, "")), "expected EXPRESSION but found EOF");
        assert_eq!(message(at(TokenKind::If, "if")), "expected EXPRESSION but found if");
        assert_eq!(
            message(at(TokenKind::Symbol, "x")),
            "expected EXPRESSION but found SYMBOL (`x`)"
        );
    }
}

use std::fmt;

use crate::token::TokenKind;

/// One of the two concrete surface syntaxes sharing the abstract grammar.
///
/// The dialect decides which words are keywords, how statement blocks are
/// delimited, and how `if`, `while` and `for` headers are spelled. It never
/// changes the shape of the tree the parser builds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `function f(x) { ... }`, `if (x) { ... } else { ... }`.
    Brace,
    /// `fn f(x) do ... end`, `if x then ... elsif y then ... else ... end`.
    Block,
}

impl Dialect {
    pub const ALL: &[Dialect] = &[Dialect::Brace, Dialect::Block];

    pub fn keywords(self) -> &'static phf::Map<&'static str, TokenKind> {
        match self {
            Dialect::Brace => &BRACE_KEYWORDS,
            Dialect::Block => &BLOCK_KEYWORDS,
        }
    }

    pub fn keyword(self, word: &str) -> Option<TokenKind> {
        self.keywords().get(word).copied()
    }

    pub const fn is_block(self) -> bool {
        matches!(self, Dialect::Block)
    }

    pub const fn function_keyword(self) -> TokenKind {
        match self {
            Dialect::Brace => TokenKind::Function,
            Dialect::Block => TokenKind::Fn,
        }
    }

    pub const fn block_open(self) -> TokenKind {
        match self {
            Dialect::Brace => TokenKind::LBrace,
            Dialect::Block => TokenKind::Do,
        }
    }

    pub const fn block_close(self) -> TokenKind {
        match self {
            Dialect::Brace => TokenKind::RBrace,
            Dialect::Block => TokenKind::End,
        }
    }

    /// Extension of files written in this dialect, without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Dialect::Brace => "mjs",
            Dialect::Block => "sp1",
        }
    }

    /// Recognizes source files by extension.
    pub fn from_extension(extension: &str) -> Option<Dialect> {
        match extension {
            "js" | "mjs" | "sjs" => Some(Dialect::Brace),
            "sp1" => Some(Dialect::Block),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Brace => f.write_str("brace"),
            Dialect::Block => f.write_str("block"),
        }
    }
}

pub static BRACE_KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "as" => TokenKind::As,
    "async" => TokenKind::Async,
    "await" => TokenKind::Await,
    "const" => TokenKind::Const,
    "else" => TokenKind::Else,
    "export" => TokenKind::Export,
    "for" => TokenKind::For,
    "from" => TokenKind::From,
    "function" => TokenKind::Function,
    "if" => TokenKind::If,
    "import" => TokenKind::Import,
    "in" => TokenKind::In,
    "let" => TokenKind::Let,
    "module" => TokenKind::Module,
    "new" => TokenKind::New,
    "of" => TokenKind::Of,
    "return" => TokenKind::Return,
    "throw" => TokenKind::Throw,
    "typeof" => TokenKind::Typeof,
    "var" => TokenKind::Var,
    "while" => TokenKind::While,
};

pub static BLOCK_KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "as" => TokenKind::As,
    "async" => TokenKind::Async,
    "await" => TokenKind::Await,
    "const" => TokenKind::Const,
    "do" => TokenKind::Do,
    "else" => TokenKind::Else,
    "elsif" => TokenKind::Elsif,
    "end" => TokenKind::End,
    "export" => TokenKind::Export,
    "fn" => TokenKind::Fn,
    "for" => TokenKind::For,
    "from" => TokenKind::From,
    "if" => TokenKind::If,
    "import" => TokenKind::Import,
    "in" => TokenKind::In,
    "let" => TokenKind::Let,
    "module" => TokenKind::Module,
    "new" => TokenKind::New,
    "of" => TokenKind::Of,
    "return" => TokenKind::Return,
    "then" => TokenKind::Then,
    "throw" => TokenKind::Throw,
    "typeof" => TokenKind::Typeof,
    "var" => TokenKind::Var,
    "while" => TokenKind::While,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_tables_agree_with_token_spelling() {
        for dialect in Dialect::ALL {
            for (word, kind) in dialect.keywords().entries() {
                assert!(kind.is_keyword(), "{word} is not a keyword kind");
                assert_eq!(kind.spelling(), Some(*word));
            }
        }
    }

    #[test]
    fn test_dialect_specific_words() {
        assert_eq!(Dialect::Brace.keyword("function"), Some(TokenKind::Function));
        assert_eq!(Dialect::Block.keyword("function"), None);
        for word in ["do", "end", "elsif", "fn", "then"] {
            assert_eq!(Dialect::Brace.keyword(word), None, "{word}");
            assert!(Dialect::Block.keyword(word).is_some(), "{word}");
        }
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(Dialect::from_extension("sjs"), Some(Dialect::Brace));
        assert_eq!(Dialect::from_extension("mjs"), Some(Dialect::Brace));
        assert_eq!(Dialect::from_extension("js"), Some(Dialect::Brace));
        assert_eq!(Dialect::from_extension("sp1"), Some(Dialect::Block));
        assert_eq!(Dialect::from_extension("rs"), None);
    }
}

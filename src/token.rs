use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub loc: Loc<'src>,
}

impl Token<'_> {
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Describes the token the way diagnostics report what was found.
    ///
    /// Tokens whose text is fully determined by their kind (keywords and EOF)
    /// are described by the kind alone, others also carry their text.
    pub fn describe(&self) -> String {
        let name = self.kind.name();
        if self.text.is_empty() || self.text == name {
            name.to_owned()
        } else {
            format!("{name} (`{}`)", self.text)
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.loc, self.kind.name(), self.text)
    }
}

/// Position of a token's first character.
///
/// `line` and `column` are 1-based; `offset` is the 0-based byte offset from
/// the start of the unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Loc<'src> {
    pub file: &'src str,
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Loc<'_> {
    pub fn start_of(file: &str) -> Loc<'_> {
        Loc {
            file,
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl fmt::Display for Loc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Trivia
    Newline,
    Whitespace,
    LineComment,
    BlockComment,
    /// The `// OUTPUT:` block closing a test fixture. Never suppressed, since
    /// the parser surfaces it on the unit.
    OutputComment,

    // Literals
    Regexp,
    String,
    /// An unterminated quoted string.
    BadString,
    Boolean,
    Flonum,
    Fixnum,
    Symbol,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBrack,
    RBrack,
    /// `=>`
    Arrow,
    /// `===`
    Identical,
    /// `!==`
    NotIdentical,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    LessEq,
    GreaterEq,
    Less,
    Greater,
    /// `=` and the compound forms `+=`, `-=`, `*=`, `/=`, `%=`.
    Assign,
    Semicolon,
    Comma,
    Colon,
    Dot,
    OrOr,
    AndAnd,
    PlusPlus,
    MinusMinus,
    StarStar,
    Plus,
    Minus,
    Not,
    Star,
    Slash,
    Percent,
    Question,

    // Keywords shared by both dialects
    As,
    Async,
    Await,
    Const,
    Else,
    Export,
    For,
    From,
    If,
    Import,
    In,
    Let,
    Module,
    New,
    Of,
    Return,
    Throw,
    Typeof,
    Var,
    While,

    // Brace dialect keywords
    Function,

    // Block dialect keywords
    Do,
    End,
    Elsif,
    Fn,
    Then,

    Unknown,
    Eof,
}

impl TokenKind {
    /// The token type name. Keywords are named by their own spelling.
    pub const fn name(self) -> &'static str {
        use TokenKind::*;
        match self {
            Newline => "NEWLINE",
            Whitespace => "WHITESPACE",
            LineComment => "EOL_COMMENT",
            BlockComment => "BLOCK_COMMENT",
            OutputComment => "OUTPUT_COMMENT",
            Regexp => "REGEXP",
            String => "STRING",
            BadString => "BADSTRING",
            Boolean => "BOOLEAN",
            Flonum => "FLONUM",
            Fixnum => "FIXNUM",
            Symbol => "SYMBOL",
            LParen => "LPAREN",
            RParen => "RPAREN",
            LBrace => "LBRACE",
            RBrace => "RBRACE",
            LBrack => "LBRACK",
            RBrack => "RBRACK",
            Arrow => "ARROW",
            Identical => "IDENTICAL",
            NotIdentical => "NOTIDENTICAL",
            EqEq => "EQ",
            NotEq => "NEQ",
            LessEq => "LEQ",
            GreaterEq => "GEQ",
            Less => "LT",
            Greater => "GT",
            Assign => "ASSIGN",
            Semicolon => "SEMICOLON",
            Comma => "COMMA",
            Colon => "COLON",
            Dot => "DOT",
            OrOr => "OR",
            AndAnd => "AND",
            PlusPlus => "INC",
            MinusMinus => "DEC",
            StarStar => "EXP",
            Plus => "PLUS",
            Minus => "MINUS",
            Not => "NOT",
            Star => "STAR",
            Slash => "SLASH",
            Percent => "PERCENT",
            Question => "QUESTION",
            Unknown => "UNKNOWN",
            Eof => "EOF",
            keyword => match keyword.spelling() {
                Some(spelling) => spelling,
                None => "KEYWORD",
            },
        }
    }

    /// The fixed text of punctuation and keyword tokens.
    pub const fn spelling(self) -> Option<&'static str> {
        use TokenKind::*;
        let spelling = match self {
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBrack => "[",
            RBrack => "]",
            Arrow => "=>",
            Identical => "===",
            NotIdentical => "!==",
            EqEq => "==",
            NotEq => "!=",
            LessEq => "<=",
            GreaterEq => ">=",
            Less => "<",
            Greater => ">",
            Semicolon => ";",
            Comma => ",",
            Colon => ":",
            Dot => ".",
            OrOr => "||",
            AndAnd => "&&",
            PlusPlus => "++",
            MinusMinus => "--",
            StarStar => "**",
            Plus => "+",
            Minus => "-",
            Not => "!",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Question => "?",
            As => "as",
            Async => "async",
            Await => "await",
            Const => "const",
            Else => "else",
            Export => "export",
            For => "for",
            From => "from",
            If => "if",
            Import => "import",
            In => "in",
            Let => "let",
            Module => "module",
            New => "new",
            Of => "of",
            Return => "return",
            Throw => "throw",
            Typeof => "typeof",
            Var => "var",
            While => "while",
            Function => "function",
            Do => "do",
            End => "end",
            Elsif => "elsif",
            Fn => "fn",
            Then => "then",
            _ => return None,
        };
        Some(spelling)
    }

    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            As | Async
                | Await
                | Const
                | Else
                | Export
                | For
                | From
                | If
                | Import
                | In
                | Let
                | Module
                | New
                | Of
                | Return
                | Throw
                | Typeof
                | Var
                | While
                | Function
                | Do
                | End
                | Elsif
                | Fn
                | Then
        )
    }

    pub fn is_whitespace(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Newline)
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }

    /// Whether the token's text may contain line breaks, in which case the
    /// lexer must scan it to keep positions right.
    pub fn spans_lines(self) -> bool {
        matches!(
            self,
            TokenKind::Newline
                | TokenKind::BlockComment
                | TokenKind::String
                | TokenKind::OutputComment
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling().unwrap_or(self.name()))
    }
}

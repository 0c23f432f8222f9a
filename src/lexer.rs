use crate::{
    dialect::Dialect,
    token::{Loc, Token, TokenKind},
};

/// Starts lexing `src` in the given dialect.
pub fn lex<'src>(dialect: Dialect, file: &'src str, src: &'src str) -> Lexer<'src> {
    Lexer::new(dialect, file, src)
}

/// An on-demand scanner.
///
/// Every call to [`Lexer::next_token`] tries the matchers in [`MATCHERS`] in
/// order against the remaining input, and the *first* one that matches wins.
/// Once the input is exhausted it keeps returning an [`TokenKind::Eof`] token
/// with empty text. Malformed input never fails: it degrades into
/// [`TokenKind::BadString`] or [`TokenKind::Unknown`] tokens, leaving the
/// reporting to the parser.
///
/// As an [`Iterator`], the lexer yields every token, trivia included, and
/// never ends. Pair it with [`crate::util::BreakableIteratorExt::up_to`].
#[derive(Clone)]
pub struct Lexer<'src> {
    dialect: Dialect,
    file: &'src str,
    src: &'src str,
    cursor: usize,
    line: u32,
    column: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(dialect: Dialect, file: &'src str, src: &'src str) -> Lexer<'src> {
        Lexer {
            dialect,
            file,
            src,
            cursor: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn file(&self) -> &'src str {
        self.file
    }

    /// Returns the next token, skipping whitespace and newlines unless
    /// `show_whitespace` is set, and line and block comments unless
    /// `show_comments` is set.
    pub fn next_token(&mut self, show_whitespace: bool, show_comments: bool) -> Token<'src> {
        loop {
            let token = self.scan();
            if !show_whitespace && token.kind.is_whitespace() {
                continue;
            }
            if !show_comments && token.kind.is_comment() {
                continue;
            }
            return token;
        }
    }

    fn scan(&mut self) -> Token<'src> {
        let loc = self.loc();
        let rest = &self.src[self.cursor..];
        if rest.is_empty() {
            return Token {
                kind: TokenKind::Eof,
                text: "",
                loc,
            };
        }
        let (kind, len) = self.match_token(rest);
        let text = &rest[..len];
        self.advance_over(kind, text);
        Token { kind, text, loc }
    }

    fn match_token(&self, rest: &str) -> (TokenKind, usize) {
        for (kind, matcher) in MATCHERS {
            let matched = match matcher {
                Scan::Exact(spelling) => rest.starts_with(spelling).then_some((*kind, spelling.len())),
                Scan::With(scanner) => scanner(rest).map(|len| (*kind, len)),
                Scan::Keyword => {
                    let word = &rest[..scan::word(rest)];
                    self.dialect.keyword(word).map(|kind| (kind, word.len()))
                }
            };
            if let Some(matched) = matched {
                debug_assert!(matched.1 > 0, "{kind:?} matched nothing");
                return matched;
            }
        }
        unreachable!("the last matcher accepts any character")
    }

    fn advance_over(&mut self, kind: TokenKind, text: &str) {
        self.cursor += text.len();
        if kind.spans_lines() {
            for c in text.chars() {
                if c == '\n' {
                    self.line += 1;
                    self.column = 1;
                } else {
                    self.column += 1;
                }
            }
        } else {
            self.column += u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        }
    }

    fn loc(&self) -> Loc<'src> {
        Loc {
            file: self.file,
            line: self.line,
            column: self.column,
            offset: self.cursor,
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Token<'src>> {
        Some(self.next_token(true, true))
    }
}

enum Scan {
    /// Matches this exact text.
    Exact(&'static str),
    /// Returns the byte length of the match, if any.
    With(fn(&str) -> Option<usize>),
    /// A whole word present in the active dialect's keyword table. The table
    /// decides the token kind.
    Keyword,
}

/// Order matters: earlier matchers shadow later ones.
static MATCHERS: &[(TokenKind, Scan)] = &[
    (TokenKind::OutputComment, Scan::With(scan::output_comment)),
    (TokenKind::Newline, Scan::With(scan::newline)),
    (TokenKind::Whitespace, Scan::With(scan::whitespace)),
    (TokenKind::LineComment, Scan::With(scan::line_comment)),
    (TokenKind::BlockComment, Scan::With(scan::block_comment)),
    (TokenKind::Regexp, Scan::With(scan::regexp)),
    (TokenKind::String, Scan::With(scan::string)),
    (TokenKind::BadString, Scan::With(scan::bad_string)),
    (TokenKind::LParen, Scan::Exact("(")),
    (TokenKind::RParen, Scan::Exact(")")),
    (TokenKind::LBrace, Scan::Exact("{")),
    (TokenKind::RBrace, Scan::Exact("}")),
    (TokenKind::LBrack, Scan::Exact("[")),
    (TokenKind::RBrack, Scan::Exact("]")),
    (TokenKind::Arrow, Scan::Exact("=>")),
    (TokenKind::Identical, Scan::Exact("===")),
    (TokenKind::NotIdentical, Scan::Exact("!==")),
    (TokenKind::EqEq, Scan::Exact("==")),
    (TokenKind::NotEq, Scan::Exact("!=")),
    (TokenKind::LessEq, Scan::Exact("<=")),
    (TokenKind::GreaterEq, Scan::Exact(">=")),
    (TokenKind::Less, Scan::Exact("<")),
    (TokenKind::Greater, Scan::Exact(">")),
    (TokenKind::Assign, Scan::With(scan::assign)),
    (TokenKind::Semicolon, Scan::Exact(";")),
    (TokenKind::Comma, Scan::Exact(",")),
    (TokenKind::Colon, Scan::Exact(":")),
    (TokenKind::Dot, Scan::Exact(".")),
    (TokenKind::OrOr, Scan::Exact("||")),
    (TokenKind::AndAnd, Scan::Exact("&&")),
    (TokenKind::PlusPlus, Scan::Exact("++")),
    (TokenKind::MinusMinus, Scan::Exact("--")),
    (TokenKind::StarStar, Scan::Exact("**")),
    (TokenKind::Boolean, Scan::With(scan::boolean)),
    (TokenKind::Symbol, Scan::Keyword),
    (TokenKind::Flonum, Scan::With(scan::flonum)),
    (TokenKind::Symbol, Scan::With(scan::symbol)),
    (TokenKind::Fixnum, Scan::With(scan::fixnum)),
    (TokenKind::Plus, Scan::Exact("+")),
    (TokenKind::Minus, Scan::Exact("-")),
    (TokenKind::Not, Scan::Exact("!")),
    (TokenKind::Star, Scan::Exact("*")),
    (TokenKind::Slash, Scan::Exact("/")),
    (TokenKind::Percent, Scan::Exact("%")),
    (TokenKind::Question, Scan::Exact("?")),
    (TokenKind::Unknown, Scan::With(scan::any)),
];

/// The scanners. Each one receives the remaining input and returns the byte
/// length of the token it recognizes at its start.
mod scan {
    const OUTPUT_MARKER: &str = "OUTPUT:";

    fn is_word(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_'
    }

    fn non_empty(len: usize) -> Option<usize> {
        (len > 0).then_some(len)
    }

    /// Length of the leading run of word characters.
    pub fn word(rest: &str) -> usize {
        rest.find(|c: char| !is_word(c)).unwrap_or(rest.len())
    }

    fn rest_of_line(rest: &str) -> usize {
        rest.find(['\r', '\n']).unwrap_or(rest.len())
    }

    /// One `// OUTPUT:` line followed by any number of `//` lines, with only
    /// whitespace after it until the end of input.
    pub fn output_comment(rest: &str) -> Option<usize> {
        let marker = rest.strip_prefix("//")?.trim_start_matches([' ', '\t']);
        if !marker.starts_with(OUTPUT_MARKER) {
            return None;
        }
        let mut len = rest_of_line(rest);
        loop {
            let tail = &rest[len..];
            let Some(next) = tail.strip_prefix("\r\n").or_else(|| tail.strip_prefix('\n')) else {
                break;
            };
            let indented = next.trim_start_matches([' ', '\t']);
            if !indented.starts_with("//") {
                break;
            }
            let indent = next.len() - indented.len();
            len += (tail.len() - next.len()) + indent + rest_of_line(indented);
        }
        rest[len..].trim().is_empty().then_some(len)
    }

    pub fn newline(rest: &str) -> Option<usize> {
        if rest.starts_with("\r\n") {
            Some(2)
        } else if rest.starts_with('\n') {
            Some(1)
        } else {
            None
        }
    }

    pub fn whitespace(rest: &str) -> Option<usize> {
        let is_space = |c: char| matches!(c, ' ' | '\t' | '\r' | '\x0b' | '\x0c');
        non_empty(rest.find(|c: char| !is_space(c)).unwrap_or(rest.len()))
    }

    pub fn line_comment(rest: &str) -> Option<usize> {
        rest.starts_with("//").then(|| rest_of_line(rest))
    }

    pub fn block_comment(rest: &str) -> Option<usize> {
        let body = rest.strip_prefix("/*")?;
        body.find("*/").map(|end| 2 + end + 2)
    }

    /// `/body/flags`, where the body neither starts with whitespace or `*`
    /// nor spans lines, and `/` inside a `[...]` class does not terminate it.
    pub fn regexp(rest: &str) -> Option<usize> {
        let body = rest.strip_prefix('/')?;
        let first = body.chars().next()?;
        if first.is_whitespace() || first == '*' {
            return None;
        }
        let mut chars = body.char_indices();
        let mut in_class = false;
        let end = loop {
            let (i, c) = chars.next()?;
            match c {
                '\n' | '\r' => return None,
                '\\' => match chars.next() {
                    Some((_, '\n' | '\r')) | None => return None,
                    Some(_) => {}
                },
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break i,
                _ => {}
            }
        };
        let after = 1 + end + 1;
        let flags = rest[after..]
            .find(|c: char| !matches!(c, 'g' | 'm' | 'i' | 's'))
            .unwrap_or(rest.len() - after);
        Some(after + flags)
    }

    /// A terminated string. Quoted strings stay on one line; backtick strings
    /// may span lines.
    pub fn string(rest: &str) -> Option<usize> {
        let quote = rest.chars().next().filter(|c| matches!(c, '"' | '\'' | '`'))?;
        let multiline = quote == '`';
        let mut chars = rest.char_indices().skip(1);
        loop {
            let (i, c) = chars.next()?;
            match c {
                '\\' => match chars.next() {
                    Some((_, '\n')) if !multiline => return None,
                    Some(_) => {}
                    None => return None,
                },
                '\n' if !multiline => return None,
                c if c == quote => return Some(i + 1),
                _ => {}
            }
        }
    }

    /// The remainder of the line after an opening quote with no matching
    /// close.
    pub fn bad_string(rest: &str) -> Option<usize> {
        rest.starts_with(['"', '\'', '`']).then(|| rest_of_line(rest))
    }

    pub fn assign(rest: &str) -> Option<usize> {
        if rest.starts_with('=') {
            Some(1)
        } else if rest.starts_with(['-', '+', '*', '/', '%']) && rest[1..].starts_with('=') {
            Some(2)
        } else {
            None
        }
    }

    pub fn boolean(rest: &str) -> Option<usize> {
        let len = word(rest);
        matches!(&rest[..len], "true" | "false").then_some(len)
    }

    pub fn flonum(rest: &str) -> Option<usize> {
        let digits = |s: &str| s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let int = digits(rest);
        if int == 0 || !rest[int..].starts_with('.') {
            return None;
        }
        let frac = digits(&rest[int + 1..]);
        if frac == 0 {
            return None;
        }
        let mut len = int + 1 + frac;
        if let Some(exponent) = rest[len..].strip_prefix(['e', 'E']) {
            let unsigned = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
            let exp_digits = digits(unsigned);
            if exp_digits > 0 {
                len += 1 + (exponent.len() - unsigned.len()) + exp_digits;
            }
        }
        Some(len)
    }

    pub fn symbol(rest: &str) -> Option<usize> {
        let first = rest.chars().next()?;
        if first.is_ascii_alphabetic() || first == '_' {
            Some(word(rest))
        } else {
            None
        }
    }

    pub fn fixnum(rest: &str) -> Option<usize> {
        non_empty(rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len()))
    }

    pub fn any(rest: &str) -> Option<usize> {
        rest.chars().next().map(char::len_utf8)
    }
}

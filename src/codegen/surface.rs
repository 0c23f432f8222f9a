use crate::dialect::Dialect;

/// Terminal spellings of one dialect. The emitter walks the same tree for
/// both and asks its surface how to spell the delimiters.
pub trait Surface {
    const DIALECT: Dialect;

    const FUNCTION: &'static str;

    const BLOCK_OPEN: &'static str;
    const BLOCK_CLOSE: &'static str;

    /// Around the `if`, `while` and `for` headers.
    const HEADER_OPEN: &'static str;
    const HEADER_CLOSE: &'static str;

    /// Present when `if` chains read `if t then ... elsif t then ... end`
    /// instead of nesting blocks.
    const THEN: Option<&'static str>;

    const MODULE_PREFIX: &'static str;

    /// Whether a `{` at the start of a statement (or of an arrow body) opens
    /// a block rather than an object literal.
    const BRACE_OPENS_BLOCK: bool;
}

impl Surface for Brace {
    const DIALECT: Dialect = Dialect::Brace;

    const FUNCTION: &'static str = "function";

    const BLOCK_OPEN: &'static str = "{";
    const BLOCK_CLOSE: &'static str = "}";

    const HEADER_OPEN: &'static str = "(";
    const HEADER_CLOSE: &'static str = ")";

    const THEN: Option<&'static str> = None;

    // Node has no module declarations.
    const MODULE_PREFIX: &'static str = "// module ";

    const BRACE_OPENS_BLOCK: bool = true;
}

impl Surface for Block {
    const DIALECT: Dialect = Dialect::Block;

    const FUNCTION: &'static str = "fn";

    const BLOCK_OPEN: &'static str = "do";
    const BLOCK_CLOSE: &'static str = "end";

    const HEADER_OPEN: &'static str = "";
    const HEADER_CLOSE: &'static str = "";

    const THEN: Option<&'static str> = Some("then");

    const MODULE_PREFIX: &'static str = "module ";

    const BRACE_OPENS_BLOCK: bool = false;
}

pub struct Brace;

pub struct Block;

#[cfg(test)]
mod tests {
    use super::*;

    fn check<S: Surface>() {
        let dialect = S::DIALECT;
        assert_eq!(dialect.function_keyword().spelling(), Some(S::FUNCTION));
        assert_eq!(dialect.block_open().spelling(), Some(S::BLOCK_OPEN));
        assert_eq!(dialect.block_close().spelling(), Some(S::BLOCK_CLOSE));
        assert_eq!(S::THEN.is_some(), dialect.is_block());
        assert_eq!(S::BRACE_OPENS_BLOCK, !dialect.is_block());
    }

    #[test]
    fn test_spellings_match_the_lexer() {
        check::<Brace>();
        check::<Block>();
    }
}

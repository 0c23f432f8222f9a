/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The code generator takes an AST and prints it back as source text in
/// either dialect.
pub mod codegen {
    pub mod emitter;
    pub mod interface;
    pub mod surface;

    pub use interface::{generate, generate_expr};
}

/// The compile driver ties the phases together and owns the file naming and
/// `// OUTPUT:` conventions.
pub mod compile;

pub mod ast;
pub mod dialect;
pub mod error;
pub mod token;
pub mod util;

use prism::dialect::Dialect;

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
#[clap(rename_all = "snake_case")]
pub enum Language {
    #[value(alias = "js", alias = "sjs")]
    Brace,
    #[value(alias = "sp1")]
    Block,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Dialect::from(*self).fmt(f)
    }
}

impl From<Language> for Dialect {
    fn from(value: Language) -> Self {
        match value {
            Language::Brace => Dialect::Brace,
            Language::Block => Dialect::Block,
        }
    }
}

/// What to print for each input file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Emit {
    /// Write the compiled file.
    #[default]
    Code,
    /// Print the syntax tree to stdout.
    Ast,
    /// Print the token stream to stdout.
    Tokens,
}

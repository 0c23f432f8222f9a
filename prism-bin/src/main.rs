use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use prism::{
    compile,
    dialect::Dialect,
    lexer, parser,
    token::Token,
    util::{tree, BreakableIteratorExt},
};

use crate::language::{Emit, Language};

mod language;

/// Translates between the brace and block dialects.
#[derive(Parser)]
#[command(name = "prism", version, arg_required_else_help = true)]
struct Cli {
    /// Directory for compiled files. Without it, each file is written next
    /// to its source as `NAME.compiled.EXT`.
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Dialect of the compiled files.
    #[arg(long, value_enum, default_value_t = Language::Brace)]
    output_language: Language,

    /// Print the tokens or the syntax tree instead of compiling.
    #[arg(long, value_enum, default_value_t = Emit::Code)]
    emit: Emit,

    /// Log what the compiler does. `RUST_LOG` takes precedence.
    #[arg(short, long)]
    verbose: bool,

    /// Source files; `.sjs`, `.js` and `.mjs` are read as brace, `.sp1` as
    /// block.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut failed = false;
    for path in &cli.files {
        if let Err(error) = run(&cli, path) {
            error!("{error:#}");
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, path: &Path) -> Result<()> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let input = compile::input_dialect(path)
        .with_context(|| format!("{}: unknown source file extension", path.display()))?;
    let filename = path.display().to_string();

    match cli.emit {
        Emit::Tokens => {
            let mut stdout = io::stdout().lock();
            for token in lexer::lex(input, &filename, &text).up_to(Token::is_eof) {
                if !token.kind.is_whitespace() {
                    writeln!(stdout, "{token}")?;
                }
            }
        }
        Emit::Ast => {
            let unit = parser::parse_str(input, &filename, &text)
                .with_context(|| format!("failed to parse {filename}"))?;
            if let Some(unit) = unit {
                tree::print_unit(&mut io::stdout().lock(), &unit)?;
            }
        }
        Emit::Code => {
            let output = Dialect::from(cli.output_language);
            let compiled = compile::transpile(input, output, &filename, &text)
                .with_context(|| format!("failed to compile {filename}"))?;
            if let Some(out_dir) = &cli.out_dir {
                fs::create_dir_all(out_dir)
                    .with_context(|| format!("failed to create {}", out_dir.display()))?;
            }
            let out_path = compile::output_path(path, cli.out_dir.as_deref(), output);
            fs::write(&out_path, compiled)
                .with_context(|| format!("failed to write {}", out_path.display()))?;
            debug!(from = %filename, to = %out_path.display(), "wrote");
        }
    }
    Ok(())
}

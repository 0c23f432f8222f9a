//! Compiles every fixture under `tests/resources`, runs the result with
//! `node`, and compares what it prints against the fixture's `// OUTPUT:`
//! trailer.

use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, ExitCode},
};

use anyhow::{bail, Context, Result};
use pretty_assertions::StrComparison;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use prism::{compile, dialect::Dialect, parser};

const FIXTURE_DIR: &str = "tests/resources";
const NODE: &str = "node";

enum Outcome {
    Pass,
    Fail { expected: String, actual: String },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .without_time()
        .init();

    let fixtures = match find_fixtures(Path::new(FIXTURE_DIR)) {
        Ok(fixtures) => fixtures,
        Err(error) => {
            eprintln!("error: {error:#}");
            return ExitCode::FAILURE;
        }
    };
    println!("Found {} fixture(s) in {FIXTURE_DIR}.", fixtures.len());

    let (mut passed, mut failed) = (0, 0);
    for fixture in &fixtures {
        match run_fixture(fixture) {
            Ok(Outcome::Pass) => {
                println!("PASS {}", fixture.display());
                passed += 1;
            }
            Ok(Outcome::Fail { expected, actual }) => {
                println!("FAIL {}", fixture.display());
                println!("{}", StrComparison::new(&expected, &actual));
                failed += 1;
            }
            Err(error) => {
                println!("FAIL {}: {error:#}", fixture.display());
                failed += 1;
            }
        }
    }

    println!("\n--- Summary ---");
    println!("Passed: {passed}");
    println!("Failed: {failed}");

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Source files under `dir`, recursively, skipping earlier compiler output.
fn find_fixtures(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut fixtures = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries =
            fs::read_dir(&dir).with_context(|| format!("failed to read {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if is_fixture(&path) {
                fixtures.push(path);
            }
        }
    }
    fixtures.sort();
    Ok(fixtures)
}

fn is_fixture(path: &Path) -> bool {
    let compiled = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains(".compiled."));
    !compiled && compile::input_dialect(path).is_some()
}

fn run_fixture(fixture: &Path) -> Result<Outcome> {
    let text = fs::read_to_string(fixture)
        .with_context(|| format!("failed to read {}", fixture.display()))?;
    let Some(input) = compile::input_dialect(fixture) else {
        bail!("unknown source file extension");
    };
    let filename = fixture.display().to_string();

    let trailer = parser::parse_str(input, &filename, &text)?
        .map(|unit| unit.expected_output_trailer)
        .unwrap_or_default();
    let compiled = compile::transpile(input, Dialect::Brace, &filename, &text)?;
    let out_path = compile::output_path(fixture, None, Dialect::Brace);
    fs::write(&out_path, compiled)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    debug!(fixture = %filename, out = %out_path.display(), "compiled");

    let run = Command::new(NODE)
        .arg(&out_path)
        .output()
        .with_context(|| format!("failed to run {NODE}"))?;
    if !run.status.success() {
        bail!(
            "{NODE} exited with {}:\n{}",
            run.status,
            String::from_utf8_lossy(&run.stderr)
        );
    }

    let expected = compile::expected_output(&trailer);
    let actual = compile::normalize_output(&String::from_utf8_lossy(&run.stdout));
    if expected == actual {
        Ok(Outcome::Pass)
    } else {
        Ok(Outcome::Fail { expected, actual })
    }
}

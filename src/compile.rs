use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{codegen, dialect::Dialect, error::Error, parser};

/// Marks the first line of an expected-output trailer, after its `//`.
pub const OUTPUT_MARKER: &str = "OUTPUT:";

/// Reads `text`, written in `input`, and prints it in `output`. Empty input
/// compiles to empty output.
pub fn transpile(
    input: Dialect,
    output: Dialect,
    filename: &str,
    text: &str,
) -> Result<String, Error> {
    debug!(filename, %input, %output, "compiling");
    let Some(unit) = parser::parse_str(input, filename, text)? else {
        debug!(filename, "empty unit");
        return Ok(String::new());
    };
    let mut compiled = String::with_capacity(text.len() + text.len() / 4);
    codegen::generate(output, filename, &unit, &mut compiled)?;
    debug!(filename, bytes = compiled.len(), "compiled");
    Ok(compiled)
}

/// The dialect of a source file, from its extension.
pub fn input_dialect(path: &Path) -> Option<Dialect> {
    path.extension()
        .and_then(|extension| extension.to_str())
        .and_then(Dialect::from_extension)
}

/// Where the compiled form of `input_path` goes: beside it as
/// `name.compiled.<ext>`, or as `out_dir/name.<ext>`.
pub fn output_path(input_path: &Path, out_dir: Option<&Path>, output: Dialect) -> PathBuf {
    let extension = output.extension();
    match out_dir {
        None => input_path.with_extension(format!("compiled.{extension}")),
        Some(out_dir) => {
            let stem = input_path.file_stem().unwrap_or(input_path.as_os_str());
            out_dir.join(format!("{}.{extension}", stem.to_string_lossy()))
        }
    }
}

/// What a fixture expects to print: the trailer without its marker line,
/// every line stripped of its `//`, trimmed, and blank lines dropped.
///
/// The marker is matched the way the lexer finds it, so `//OUTPUT:` and
/// `//   OUTPUT:` work as well as `// OUTPUT:`.
pub fn expected_output(trailer: &str) -> String {
    let mut lines = trailer
        .lines()
        .map(|line| {
            let line = line.trim_start();
            line.strip_prefix("//").unwrap_or(line).trim()
        })
        .skip_while(|line| line.is_empty())
        .peekable();
    if lines.peek().is_some_and(|line| line.starts_with(OUTPUT_MARKER)) {
        lines.next();
    }
    normalize_lines(lines)
}

/// Program output in the form [`expected_output`] produces.
pub fn normalize_output(stdout: &str) -> String {
    normalize_lines(stdout.lines())
}

fn normalize_lines<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    lines
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::SyntaxError;

    #[test]
    fn test_transpile_between_dialects() {
        let src = indoc! {"
            fn double(x) do
              return x * 2;
            end
            log(double(21));
        "};
        let compiled = transpile(Dialect::Block, Dialect::Brace, "a.sp1", src).unwrap();
        assert_eq!(
            compiled,
            indoc! {"
                function double(x) {
                  return x * 2;
                }
                log(double(21));
            "}
        );
    }

    #[test]
    fn test_transpile_empty_input() {
        assert_eq!(transpile(Dialect::Brace, Dialect::Brace, "a.sjs", "  \n\n"), Ok(String::new()));
    }

    #[test]
    fn test_transpile_reports_the_first_error() {
        let error = transpile(Dialect::Brace, Dialect::Brace, "a.sjs", "let x = 1;\n)").unwrap_err();
        let Error::Syntax(SyntaxError {
            message,
            file,
            line,
            column,
        }) = error
        else {
            panic!("expected a syntax error, got {error:?}");
        };
        assert_eq!(file, "a.sjs");
        assert_eq!((line, column), (2, 1));
        assert!(message.contains("DECLARATION"), "{message}");
    }

    #[test]
    fn test_input_dialect() {
        assert_eq!(input_dialect(Path::new("a/b.sjs")), Some(Dialect::Brace));
        assert_eq!(input_dialect(Path::new("b.sp1")), Some(Dialect::Block));
        assert_eq!(input_dialect(Path::new("b.txt")), None);
        assert_eq!(input_dialect(Path::new("Makefile")), None);
    }

    #[test]
    fn test_output_path() {
        let input = Path::new("tests/resources/hello.sjs");
        assert_eq!(
            output_path(input, None, Dialect::Brace),
            Path::new("tests/resources/hello.compiled.mjs")
        );
        assert_eq!(
            output_path(input, None, Dialect::Block),
            Path::new("tests/resources/hello.compiled.sp1")
        );
        assert_eq!(
            output_path(input, Some(Path::new("out")), Dialect::Brace),
            Path::new("out/hello.mjs")
        );
    }

    #[test]
    fn test_output_path_keeps_dots_in_the_stem() {
        let dotted = Path::new("dir/a.b.sjs");
        assert_eq!(
            output_path(dotted, Some(Path::new("out")), Dialect::Brace),
            Path::new("out/a.b.mjs")
        );
        assert_eq!(
            output_path(dotted, None, Dialect::Block),
            Path::new("dir/a.b.compiled.sp1")
        );
        assert_ne!(
            output_path(dotted, Some(Path::new("out")), Dialect::Brace),
            output_path(Path::new("dir/a.sjs"), Some(Path::new("out")), Dialect::Brace)
        );
    }

    #[test]
    fn test_expected_output() {
        let trailer = "// OUTPUT:\n//   1\n  // two words \n//\n// 3";
        assert_eq!(expected_output(trailer), "1\ntwo words\n3");
        assert_eq!(expected_output(""), "");
    }

    #[test]
    fn test_expected_output_marker_spacing() {
        assert_eq!(expected_output("//OUTPUT:\n// 1"), "1");
        assert_eq!(expected_output("//   OUTPUT:\n//2\n  //  3"), "2\n3");
        assert_eq!(expected_output("\t// OUTPUT:\n// x"), "x");
    }

    #[test]
    fn test_normalize_output() {
        assert_eq!(normalize_output("  1\n\ntwo words  \n3\n"), "1\ntwo words\n3");
    }
}

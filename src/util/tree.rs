//! An indented, one-node-per-line rendering of the AST, used by the parser
//! tests and by `prism --emit ast`.

use std::io::{self, Write};

use crate::ast::*;

const INDENT_WIDTH: usize = 2;

fn sp(w: &mut impl Write, i: usize) -> io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}

pub fn print_unit_string(unit: &Unit) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_unit(&mut buf, unit).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_expr_string(expr: &Expr) -> String {
    let mut buf = Vec::with_capacity(512);
    print_expr(&mut buf, 0, expr).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_unit(w: &mut impl Write, unit: &Unit) -> io::Result<()> {
    writeln!(w, "unit")?;
    for comment in &unit.leading_comments {
        print_comment(w, 1, comment)?;
    }
    if let Some(name) = &unit.module_name {
        sp(w, 1)?;
        writeln!(w, "module {name}")?;
    }
    for import in &unit.imports {
        sp(w, 1)?;
        match import {
            Import::List {
                identifiers,
                module_path,
            } => writeln!(w, "import {{ {} }} from {module_path}", identifiers.join(", "))?,
            Import::As { alias, module_path } => {
                writeln!(w, "import * as {alias} from {module_path}")?;
            }
        }
    }
    print_declarations(w, 1, &unit.body)?;
    if !unit.expected_output_trailer.is_empty() {
        sp(w, 1)?;
        writeln!(w, "trailer {:?}", unit.expected_output_trailer)?;
    }
    Ok(())
}

fn print_comment(w: &mut impl Write, i: usize, comment: &Comment) -> io::Result<()> {
    sp(w, i)?;
    writeln!(w, "comment {:?}", comment.text)
}

fn print_declarations(w: &mut impl Write, i: usize, declarations: &[Declaration]) -> io::Result<()> {
    for declaration in declarations {
        print_declaration(w, i, declaration)?;
    }
    Ok(())
}

fn print_declaration(w: &mut impl Write, i: usize, declaration: &Declaration) -> io::Result<()> {
    let export = |exported: &bool| if *exported { "export " } else { "" };
    match declaration {
        Declaration::Function(Function {
            name,
            signature,
            body,
            exported,
            is_async,
        }) => {
            sp(w, i)?;
            let is_async = if *is_async { "async " } else { "" };
            write!(w, "{}{is_async}function {name}", export(exported))?;
            print_signature(w, signature)?;
            print_declarations(w, i + 1, &body.statements)?;
        }
        Declaration::Variable {
            keyword,
            name,
            initializer,
            exported,
        } => {
            sp(w, i)?;
            writeln!(w, "{}{} {name}", export(exported), keyword.spelling())?;
            if let Some(initializer) = initializer {
                print_expr(w, i + 1, initializer)?;
            }
        }
        Declaration::Variables {
            keyword,
            names,
            initializer,
            exported,
        } => {
            sp(w, i)?;
            let names = names.join(", ");
            writeln!(w, "{}{} [{names}]", export(exported), keyword.spelling())?;
            print_expr(w, i + 1, initializer)?;
        }
        Declaration::Statement(statement) => print_statement(w, i, statement)?,
        Declaration::Comments(comments) => {
            sp(w, i)?;
            writeln!(w, "comments")?;
            for comment in comments {
                print_comment(w, i + 1, comment)?;
            }
        }
    }
    Ok(())
}

fn print_signature(w: &mut impl Write, signature: &Signature) -> io::Result<()> {
    writeln!(w, "({})", signature.formal_parameter_names.join(", "))
}

fn print_labeled_block(w: &mut impl Write, i: usize, label: &str, block: &Block) -> io::Result<()> {
    sp(w, i)?;
    writeln!(w, "{label}")?;
    print_declarations(w, i + 1, &block.statements)
}

fn print_statement(w: &mut impl Write, i: usize, statement: &Statement) -> io::Result<()> {
    match statement {
        Statement::If {
            test,
            body,
            else_branch,
        } => {
            sp(w, i)?;
            writeln!(w, "if")?;
            print_expr(w, i + 1, test)?;
            print_labeled_block(w, i + 1, "then", body)?;
            if let Some(else_branch) = else_branch {
                sp(w, i + 1)?;
                writeln!(w, "else")?;
                print_statement(w, i + 2, else_branch)?;
            }
        }
        Statement::While { test, body } => {
            sp(w, i)?;
            writeln!(w, "while")?;
            print_expr(w, i + 1, test)?;
            print_labeled_block(w, i + 1, "do", body)?;
        }
        Statement::For {
            var_keyword,
            vars,
            collection,
            body,
            bracketed,
        } => {
            sp(w, i)?;
            write!(w, "for ")?;
            if let Some(keyword) = var_keyword {
                write!(w, "{} ", keyword.spelling())?;
            }
            let vars = vars.join(", ");
            if *bracketed {
                writeln!(w, "[{vars}] of")?;
            } else {
                writeln!(w, "{vars} of")?;
            }
            print_expr(w, i + 1, collection)?;
            print_labeled_block(w, i + 1, "do", body)?;
        }
        Statement::Throw(expr) => {
            sp(w, i)?;
            writeln!(w, "throw")?;
            print_expr(w, i + 1, expr)?;
        }
        Statement::Return(expr) => {
            sp(w, i)?;
            writeln!(w, "return")?;
            if let Some(expr) = expr {
                print_expr(w, i + 1, expr)?;
            }
        }
        Statement::Expression(expr) => print_expr(w, i, expr)?,
        Statement::Block(block) => print_labeled_block(w, i, "block", block)?,
    }
    Ok(())
}

pub fn print_expr(w: &mut impl Write, i: usize, expr: &Expr) -> io::Result<()> {
    sp(w, i)?;
    match expr {
        Expr::Symbol(name) => writeln!(w, "symbol {name}")?,
        Expr::Literal(literal) => print_literal(w, i, literal)?,
        Expr::Grouping(inner) => {
            writeln!(w, "grouping")?;
            print_expr(w, i + 1, inner)?;
        }
        Expr::UnaryPrefix { op, operand } => {
            writeln!(w, "prefix {}", op.spelling())?;
            print_expr(w, i + 1, operand)?;
        }
        Expr::UnaryPostfix { op, operand } => {
            writeln!(w, "postfix {}", op.spelling())?;
            print_expr(w, i + 1, operand)?;
        }
        Expr::Binary { op, left, right } => {
            writeln!(w, "binary {op}")?;
            print_expr(w, i + 1, left)?;
            print_expr(w, i + 1, right)?;
        }
        Expr::Ternary {
            test,
            if_true,
            if_false,
        } => {
            writeln!(w, "ternary")?;
            print_expr(w, i + 1, test)?;
            print_expr(w, i + 1, if_true)?;
            print_expr(w, i + 1, if_false)?;
        }
        Expr::PostCircumfix {
            circumfix,
            left,
            right,
        } => {
            match circumfix {
                Circumfix::Call => writeln!(w, "call")?,
                Circumfix::Index => writeln!(w, "index")?,
            }
            print_expr(w, i + 1, left)?;
            print_expr(w, i + 1, right)?;
        }
        Expr::Object(pairs) => {
            writeln!(w, "object")?;
            for pair in pairs {
                sp(w, i + 1)?;
                writeln!(w, "pair {}", pair.key.text())?;
                if let Some(value) = &pair.value {
                    print_expr(w, i + 2, value)?;
                }
            }
        }
        Expr::List {
            elements,
            trailing_comma,
        } => {
            if *trailing_comma {
                writeln!(w, "list trailing-comma")?;
            } else {
                writeln!(w, "list")?;
            }
            for element in elements {
                print_expr(w, i + 1, element)?;
            }
        }
        Expr::Array(elements) => {
            writeln!(w, "array")?;
            for element in elements {
                print_expr(w, i + 1, element)?;
            }
        }
    }
    Ok(())
}

/// Expects the indentation to have been written already.
fn print_literal(w: &mut impl Write, i: usize, literal: &Literal) -> io::Result<()> {
    match literal {
        Literal::Boolean { text, .. } => writeln!(w, "boolean {text}")?,
        Literal::Fixnum { text, .. } => writeln!(w, "fixnum {text}")?,
        Literal::Flonum { text, .. } => writeln!(w, "flonum {text}")?,
        Literal::String { text, .. } => writeln!(w, "string {text}")?,
        Literal::Regexp { text, .. } => writeln!(w, "regexp {text}")?,
        Literal::Function {
            name,
            signature,
            body,
        } => {
            write!(w, "function-literal ")?;
            if let Some(name) = name {
                write!(w, "{name}")?;
            }
            print_signature(w, signature)?;
            print_declarations(w, i + 1, &body.statements)?;
        }
        Literal::ArrowExpr { formals, expr } => {
            writeln!(w, "arrow ({})", formals.join(", "))?;
            print_expr(w, i + 1, expr)?;
        }
        Literal::ArrowBlock { formals, block } => {
            writeln!(w, "arrow-block ({})", formals.join(", "))?;
            print_declarations(w, i + 1, &block.statements)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_string_rendering_keeps_source_text() {
        let expr = Expr::Literal(Literal::String {
            value: "\"héllo\"".to_owned(),
            text: "\"héllo\"".to_owned(),
        });
        assert_eq!(print_expr_string(&expr), "string \"héllo\"\n");
        assert_eq!(print_unit_string(&Unit::default()), "unit\n");
    }
}

use std::{fmt, marker::PhantomData};

use tracing::trace;

use crate::{
    ast::{
        precedence, BinaryOp, Block, Circumfix, Comment, Declaration, Expr, Function, Import,
        Literal, Pair, PrefixOp, Signature, Statement, Unit,
    },
    codegen::surface::Surface,
    error::{Error, InternalError},
};

type Result<T = (), E = Error> = std::result::Result<T, E>;

/// Imports whose single-line form would pass this column are wrapped.
const IMPORT_WIDTH: u32 = 72;

const BLOCK_INDENT: &str = "  ";
/// Lines up the wrapped names of an import under its `{`.
const IMPORT_INDENT: &str = "       ";

/// Prints a tree as source text of the dialect `S`.
///
/// The emitter owns the whole printing context: the sink, the indentation and
/// the position of the next character, which decides where imports wrap.
pub struct Emitter<'w, W, S> {
    sink: &'w mut W,
    indent: String,
    line: u32,
    column: u32,
    written: bool,
    _surface: PhantomData<S>,
}

impl<'w, W, S> Emitter<'w, W, S>
where
    W: fmt::Write,
    S: Surface,
{
    pub fn new(sink: &'w mut W) -> Emitter<'w, W, S> {
        Emitter {
            sink,
            indent: String::new(),
            line: 1,
            column: 1,
            written: false,
            _surface: PhantomData,
        }
    }

    pub fn emit_unit(&mut self, unit: &Unit) -> Result {
        trace!(dialect = %S::DIALECT, "emitting unit");
        for comment in &unit.leading_comments {
            self.emit_comment(comment)?;
        }
        if let Some(name) = &unit.module_name {
            self.line_start()?;
            self.emit(S::MODULE_PREFIX)?;
            self.emit(name)?;
            self.emit(";")?;
        }
        for import in &unit.imports {
            self.emit_import(import)?;
        }
        self.emit_declarations(&unit.body)?;
        if !unit.expected_output_trailer.is_empty() {
            self.blank_line()?;
            self.line_start()?;
            self.emit(&unit.expected_output_trailer)?;
        }
        if self.written {
            self.emit("\n")?;
        }
        Ok(())
    }

    /// Prints a lone expression, as the operand of nothing.
    pub fn emit_expression(&mut self, expr: &Expr) -> Result {
        self.emit_expr(expr, precedence::COMMA)
    }
}

/// Declarations and statements.
impl<W, S> Emitter<'_, W, S>
where
    W: fmt::Write,
    S: Surface,
{
    fn emit_comment(&mut self, comment: &Comment) -> Result {
        self.line_start()?;
        self.emit(&comment.text)
    }

    fn emit_import(&mut self, import: &Import) -> Result {
        self.line_start()?;
        match import {
            Import::List {
                identifiers,
                module_path,
            } => {
                let inline = format!(
                    "import {{ {} }} from {module_path};",
                    identifiers.join(", ")
                );
                if !self.passes_width(&inline) {
                    return self.emit(&inline);
                }

                self.emit("import { ")?;
                let mut names = identifiers.iter();
                if let Some(first) = names.next() {
                    self.emit(first)?;
                }
                self.indented(IMPORT_INDENT, |this| {
                    for name in names {
                        this.line_start()?;
                        this.emit(", ")?;
                        this.emit(name)?;
                    }
                    this.line_start()?;
                    this.emit("} from ")?;
                    this.emit(module_path)?;
                    this.emit(";")
                })
            }
            Import::As { alias, module_path } => {
                self.emit(&format!("import * as {alias} from {module_path};"))
            }
        }
    }

    fn emit_declarations(&mut self, declarations: &[Declaration]) -> Result {
        for declaration in declarations {
            self.emit_declaration(declaration)?;
        }
        Ok(())
    }

    fn emit_declaration(&mut self, declaration: &Declaration) -> Result {
        match declaration {
            Declaration::Function(function) => self.emit_function_declaration(function),
            Declaration::Variable {
                keyword,
                name,
                initializer,
                exported,
            } => {
                self.line_start()?;
                self.emit_export(*exported)?;
                self.emit(keyword.spelling())?;
                self.emit(" ")?;
                self.emit(name)?;
                if let Some(initializer) = initializer {
                    self.emit(" = ")?;
                    self.emit_expr(initializer, precedence::ASSIGNMENT)?;
                }
                self.emit(";")
            }
            Declaration::Variables {
                keyword,
                names,
                initializer,
                exported,
            } => {
                self.line_start()?;
                self.emit_export(*exported)?;
                self.emit(keyword.spelling())?;
                self.emit(" [")?;
                self.emit_names(names)?;
                self.emit("] = ")?;
                self.emit_expr(initializer, precedence::ASSIGNMENT)?;
                self.emit(";")
            }
            Declaration::Statement(statement) => self.emit_statement(statement),
            Declaration::Comments(comments) => {
                for comment in comments {
                    self.emit_comment(comment)?;
                }
                Ok(())
            }
        }
    }

    fn emit_function_declaration(&mut self, function: &Function) -> Result {
        self.blank_line()?;
        self.line_start()?;
        self.emit_export(function.exported)?;
        if function.is_async {
            self.emit("async ")?;
        }
        self.emit(S::FUNCTION)?;
        self.emit(" ")?;
        self.emit(&function.name)?;
        self.emit_signature(&function.signature)?;
        self.emit(" ")?;
        self.emit_block(&function.body)
    }

    fn emit_export(&mut self, exported: bool) -> Result {
        if exported {
            self.emit("export ")?;
        }
        Ok(())
    }

    fn emit_statement(&mut self, statement: &Statement) -> Result {
        match statement {
            Statement::If { .. } => {
                self.line_start()?;
                if S::THEN.is_some() {
                    self.emit_if_chain(statement)
                } else {
                    self.emit_nested_if(statement)
                }
            }
            Statement::While { test, body } => {
                self.line_start()?;
                self.emit("while ")?;
                self.emit_header(test)?;
                self.emit(" ")?;
                self.emit_block(body)
            }
            Statement::For {
                var_keyword,
                vars,
                collection,
                body,
                bracketed,
            } => {
                self.line_start()?;
                self.emit("for ")?;
                self.emit(S::HEADER_OPEN)?;
                if let Some(keyword) = var_keyword {
                    self.emit(keyword.spelling())?;
                    self.emit(" ")?;
                }
                let (open, close) = if *bracketed { ("[", "]") } else { ("", "") };
                self.emit(open)?;
                self.emit_names(vars)?;
                self.emit(close)?;
                self.emit(" of ")?;
                self.emit_expr(collection, precedence::COMMA)?;
                self.emit(S::HEADER_CLOSE)?;
                self.emit(" ")?;
                self.emit_block(body)
            }
            Statement::Throw(expr) => {
                self.line_start()?;
                self.emit("throw ")?;
                self.emit_expr(expr, precedence::COMMA)?;
                self.emit(";")
            }
            Statement::Return(expr) => {
                self.line_start()?;
                self.emit("return")?;
                if let Some(expr) = expr {
                    self.emit(" ")?;
                    self.emit_expr(expr, precedence::COMMA)?;
                }
                self.emit(";")
            }
            Statement::Expression(expr) => {
                self.line_start()?;
                if self.is_ambiguous_at_statement_start(expr) {
                    self.emit("(")?;
                    self.emit_expr(expr, precedence::COMMA)?;
                    self.emit(")")?;
                } else {
                    self.emit_expr(expr, precedence::COMMA)?;
                }
                self.emit(";")
            }
            Statement::Block(block) => {
                self.line_start()?;
                self.emit_block(block)
            }
        }
    }

    /// `if (t) { ... } else if (u) { ... } else { ... }`
    fn emit_nested_if(&mut self, statement: &Statement) -> Result {
        let Statement::If {
            test,
            body,
            else_branch,
        } = statement
        else {
            return Err(InternalError::new("expected an If statement").into());
        };
        self.emit("if ")?;
        self.emit_header(test)?;
        self.emit(" ")?;
        self.emit_block(body)?;
        match else_branch.as_deref() {
            None => Ok(()),
            Some(branch @ Statement::If { .. }) => {
                self.emit(" else ")?;
                self.emit_nested_if(branch)
            }
            Some(Statement::Block(block)) => {
                self.emit(" else ")?;
                self.emit_block(block)
            }
            Some(_) => Err(InternalError::new("else branch must be an If or a Block").into()),
        }
    }

    /// `if t then ... elsif u then ... else ... end`
    fn emit_if_chain(&mut self, statement: &Statement) -> Result {
        let then = S::THEN.unwrap_or_default();
        let mut keyword = "if";
        let mut current = statement;
        loop {
            let Statement::If {
                test,
                body,
                else_branch,
            } = current
            else {
                return Err(InternalError::new("expected an If statement").into());
            };
            self.emit(keyword)?;
            self.emit(" ")?;
            self.emit_expr(test, precedence::COMMA)?;
            self.emit(" ")?;
            self.emit(then)?;
            self.emit_indented_declarations(&body.statements)?;

            match else_branch.as_deref() {
                None => break,
                Some(branch @ Statement::If { .. }) => {
                    self.line_start()?;
                    keyword = "elsif";
                    current = branch;
                }
                Some(Statement::Block(block)) => {
                    self.line_start()?;
                    self.emit("else")?;
                    self.emit_indented_declarations(&block.statements)?;
                    break;
                }
                Some(_) => {
                    return Err(InternalError::new("else branch must be an If or a Block").into())
                }
            }
        }
        self.line_start()?;
        self.emit(S::BLOCK_CLOSE)
    }

    fn emit_header(&mut self, test: &Expr) -> Result {
        self.emit(S::HEADER_OPEN)?;
        self.emit_expr(test, precedence::COMMA)?;
        self.emit(S::HEADER_CLOSE)
    }

    fn emit_block(&mut self, block: &Block) -> Result {
        self.emit(S::BLOCK_OPEN)?;
        self.emit_indented_declarations(&block.statements)?;
        self.line_start()?;
        self.emit(S::BLOCK_CLOSE)
    }

    fn emit_indented_declarations(&mut self, declarations: &[Declaration]) -> Result {
        self.indented(BLOCK_INDENT, |this| this.emit_declarations(declarations))
    }

    fn emit_signature(&mut self, signature: &Signature) -> Result {
        self.emit("(")?;
        self.emit_names(&signature.formal_parameter_names)?;
        self.emit(")")
    }

    fn emit_names(&mut self, names: &[String]) -> Result {
        self.emit(&names.join(", "))
    }

    /// A statement that would read back as something else: a block (for an
    /// object literal) or a function declaration.
    fn is_ambiguous_at_statement_start(&self, expr: &Expr) -> bool {
        match leftmost(expr) {
            Expr::Object(_) => S::BRACE_OPENS_BLOCK,
            Expr::Literal(Literal::Function { .. }) => true,
            _ => false,
        }
    }
}

/// Expressions.
impl<W, S> Emitter<'_, W, S>
where
    W: fmt::Write,
    S: Surface,
{
    /// Prints `expr` where an operand of at least `required` precedence is
    /// expected, parenthesizing it otherwise.
    fn emit_expr(&mut self, expr: &Expr, required: u8) -> Result {
        if expr.precedence() < required {
            self.emit("(")?;
            self.emit_bare_expr(expr)?;
            self.emit(")")
        } else {
            self.emit_bare_expr(expr)
        }
    }

    fn emit_bare_expr(&mut self, expr: &Expr) -> Result {
        match expr {
            Expr::Symbol(name) => self.emit(name),
            Expr::Literal(literal) => self.emit_literal(literal),
            Expr::Grouping(inner) => {
                self.emit("(")?;
                self.emit_expr(inner, precedence::COMMA)?;
                self.emit(")")
            }
            Expr::UnaryPrefix {
                op: PrefixOp::New,
                operand,
            } => {
                if !operand.is_symbol_path() {
                    return Err(InternalError::new("`new` target must be a name path").into());
                }
                self.emit("new ")?;
                self.emit_expr(operand, precedence::MEMBER)
            }
            Expr::UnaryPrefix { op, operand } => {
                self.emit(op.spelling())?;
                if op.is_word() || would_merge(*op, operand) {
                    self.emit(" ")?;
                }
                self.emit_expr(operand, precedence::PREFIX)
            }
            Expr::UnaryPostfix { op, operand } => {
                self.emit_expr(operand, precedence::POSTFIX + 1)?;
                self.emit(op.spelling())
            }
            Expr::Binary { op, left, right } => self.emit_binary(*op, left, right),
            Expr::Ternary {
                test,
                if_true,
                if_false,
            } => {
                self.emit_expr(test, precedence::TERNARY + 1)?;
                self.emit(" ? ")?;
                self.emit_expr(if_true, precedence::ASSIGNMENT)?;
                self.emit(" : ")?;
                self.emit_expr(if_false, precedence::ASSIGNMENT)
            }
            Expr::PostCircumfix {
                circumfix: Circumfix::Call,
                left,
                right,
            } => {
                if !matches!(**right, Expr::List { .. }) {
                    return Err(InternalError::new("call arguments must be a List").into());
                }
                self.emit_expr(left, precedence::MEMBER)?;
                self.emit_bare_expr(right)
            }
            Expr::PostCircumfix {
                circumfix: Circumfix::Index,
                left,
                right,
            } => {
                let (open, close) = Circumfix::Index.delimiters();
                self.emit_expr(left, precedence::MEMBER)?;
                self.emit(open)?;
                self.emit_expr(right, precedence::COMMA)?;
                self.emit(close)
            }
            Expr::Object(pairs) => self.emit_layout(("{", "}"), pairs, Self::emit_pair),
            Expr::Array(elements) => self.emit_layout(("[", "]"), elements, |this, element| {
                this.emit_expr(element, precedence::ASSIGNMENT)
            }),
            Expr::List {
                elements,
                trailing_comma,
            } => {
                self.emit("(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.emit(", ")?;
                    }
                    self.emit_expr(element, precedence::ASSIGNMENT)?;
                }
                if *trailing_comma {
                    self.emit(",")?;
                }
                self.emit(")")
            }
        }
    }

    fn emit_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result {
        match op {
            BinaryOp::New => {
                if !left.is_symbol_path() {
                    return Err(InternalError::new("`new` target must be a name path").into());
                }
                if !matches!(right, Expr::List { .. }) {
                    return Err(InternalError::new("`new` arguments must be a List").into());
                }
                self.emit("new ")?;
                self.emit_expr(left, precedence::MEMBER)?;
                self.emit_bare_expr(right)
            }
            BinaryOp::Dot => {
                let Expr::Symbol(name) = right else {
                    return Err(InternalError::new("right side of `.` must be a Symbol").into());
                };
                self.emit_expr(left, precedence::MEMBER)?;
                self.emit(".")?;
                self.emit(name)
            }
            _ => {
                let own = op.precedence();
                let (left_required, right_required) = match op {
                    // A unary operator may not appear unparenthesized on the
                    // left of `**`.
                    BinaryOp::Exp => (precedence::POSTFIX, own),
                    _ if op.is_right_associative() => (own + 1, own),
                    _ => (own, own + 1),
                };
                self.emit_expr(left, left_required)?;
                if op == BinaryOp::Comma {
                    self.emit(", ")?;
                } else {
                    self.emit(" ")?;
                    self.emit(op.spelling())?;
                    self.emit(" ")?;
                }
                self.emit_expr(right, right_required)
            }
        }
    }

    fn emit_literal(&mut self, literal: &Literal) -> Result {
        match literal {
            Literal::Boolean { text, .. }
            | Literal::Fixnum { text, .. }
            | Literal::Flonum { text, .. }
            | Literal::String { text, .. }
            | Literal::Regexp { text, .. } => self.emit(text),
            Literal::Function {
                name,
                signature,
                body,
            } => {
                self.emit(S::FUNCTION)?;
                if let Some(name) = name {
                    self.emit(" ")?;
                    self.emit(name)?;
                }
                self.emit_signature(signature)?;
                self.emit(" ")?;
                self.emit_block(body)
            }
            Literal::ArrowExpr { formals, expr } => {
                self.emit_arrow_head(formals)?;
                if S::BRACE_OPENS_BLOCK && matches!(leftmost(expr), Expr::Object(_)) {
                    self.emit("(")?;
                    self.emit_expr(expr, precedence::COMMA)?;
                    self.emit(")")
                } else {
                    self.emit_expr(expr, precedence::ASSIGNMENT)
                }
            }
            Literal::ArrowBlock { formals, block } => {
                self.emit_arrow_head(formals)?;
                self.emit_block(block)
            }
        }
    }

    fn emit_arrow_head(&mut self, formals: &[String]) -> Result {
        self.emit("(")?;
        self.emit_names(formals)?;
        self.emit(") => ")
    }

    fn emit_pair(&mut self, pair: &Pair) -> Result {
        self.emit(pair.key.text())?;
        if let Some(value) = &pair.value {
            self.emit(": ")?;
            self.emit_expr(value, precedence::ASSIGNMENT)?;
        }
        Ok(())
    }

    /// Up to one item stays on the line. More go one per line, leading-comma
    /// style, with anything an item wraps onto later lines kept under it:
    ///
    /// ```text
    /// [
    ///     a
    ///   , b
    /// ]
    /// ```
    fn emit_layout<T>(
        &mut self,
        (open, close): (&str, &str),
        items: &[T],
        mut emit_item: impl FnMut(&mut Self, &T) -> Result,
    ) -> Result {
        match items {
            [] => {
                self.emit(open)?;
                self.emit(" ")?;
                self.emit(close)
            }
            [item] => {
                self.emit(open)?;
                self.emit(" ")?;
                emit_item(self, item)?;
                self.emit(" ")?;
                self.emit(close)
            }
            _ => {
                self.emit(open)?;
                self.indented(BLOCK_INDENT, |this| {
                    for (i, item) in items.iter().enumerate() {
                        this.line_start()?;
                        this.emit(if i == 0 { "  " } else { ", " })?;
                        this.indented(BLOCK_INDENT, |this| emit_item(this, item))?;
                    }
                    Ok(())
                })?;
                self.line_start()?;
                self.emit(close)
            }
        }
    }
}

/// Utility functions.
impl<W, S> Emitter<'_, W, S>
where
    W: fmt::Write,
    S: Surface,
{
    fn emit(&mut self, text: &str) -> Result {
        self.sink.write_str(text)?;
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.written |= !text.is_empty();
        Ok(())
    }

    /// Moves to a fresh line at the current indentation.
    fn line_start(&mut self) -> Result {
        if self.written {
            self.sink.write_str("\n")?;
            self.line += 1;
            self.column = 1;
        }
        let indent = std::mem::take(&mut self.indent);
        let result = self.emit(&indent);
        self.indent = indent;
        result
    }

    fn blank_line(&mut self) -> Result {
        if self.written {
            self.emit("\n")?;
        }
        Ok(())
    }

    fn indented<F>(&mut self, extra: &str, f: F) -> Result
    where
        F: FnOnce(&mut Self) -> Result,
    {
        let parent = self.indent.len();
        self.indent.push_str(extra);
        let result = f(self);
        self.indent.truncate(parent);
        result
    }

    /// Whether `text`, printed from the current column, would end past
    /// [`IMPORT_WIDTH`].
    fn passes_width(&self, text: &str) -> bool {
        let width = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        self.column.saturating_add(width).saturating_sub(1) > IMPORT_WIDTH
    }
}

/// The node whose text starts the printed form of `expr`.
fn leftmost(expr: &Expr) -> &Expr {
    match expr {
        Expr::Binary { op, left, .. } if *op != BinaryOp::New => leftmost(left),
        Expr::Ternary { test, .. } => leftmost(test),
        Expr::PostCircumfix { left, .. } => leftmost(left),
        Expr::UnaryPostfix { operand, .. } => leftmost(operand),
        _ => expr,
    }
}

/// `- -a` must not print as `--a`, nor `+ ++a` as `+++a`.
fn would_merge(op: PrefixOp, operand: &Expr) -> bool {
    let Expr::UnaryPrefix { op: inner, .. } = operand else {
        return false;
    };
    matches!(
        (op, inner),
        (PrefixOp::Neg, PrefixOp::Neg | PrefixOp::PreDec)
            | (PrefixOp::Plus, PrefixOp::Plus | PrefixOp::PreInc)
    )
}

use std::mem;

use tracing::trace;

use crate::{
    ast::{
        precedence, BinaryOp, Block, Circumfix, Comment, CommentKind, Declaration, Expr, Function,
        Import, Literal, Pair, PostfixOp, PrefixOp, Signature, Statement, Unit, VarKeyword,
    },
    dialect::Dialect,
    error::{Error, SyntaxError},
    lexer::{self, Lexer},
    token::{Loc, Token, TokenKind},
};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Parses a whole unit. Returns `None` for an input with nothing in it but
/// whitespace.
pub fn parse(lexer: Lexer<'_>) -> Result<Option<Unit>> {
    Parser::new(lexer).parse_unit()
}

pub fn parse_str(dialect: Dialect, file: &str, src: &str) -> Result<Option<Unit>> {
    parse(lexer::lex(dialect, file, src))
}

/// Parses a single expression spanning the whole input.
pub fn parse_expr_str(dialect: Dialect, src: &str) -> Result<Expr> {
    let mut parser = Parser::new(lexer::lex(dialect, "<expr>", src));
    let expr = parser.parse_expr()?;
    parser.consume(TokenKind::Eof, "expected end of expression")?;
    Ok(expr)
}

struct Parser<'src> {
    lexer: Lexer<'src>,
    dialect: Dialect,
    current: Token<'src>,
    /// Comments seen since the last declaration boundary.
    comments: Vec<Comment>,
    trailer: Option<&'src str>,
}

impl<'src> Parser<'src> {
    fn parse_unit(&mut self) -> Result<Option<Unit>> {
        let mut leading_comments = mem::take(&mut self.comments);
        if self.current.is_eof() && leading_comments.is_empty() && self.trailer.is_none() {
            return Ok(None);
        }

        let module_name = if self.take(TokenKind::Module) {
            let name = self.consume(TokenKind::Symbol, "expected SYMBOL after `module`")?;
            self.end_statement("expected `;`")?;
            Some(name.text.to_owned())
        } else {
            None
        };
        if self.is(TokenKind::Import) {
            leading_comments.append(&mut self.comments);
        }

        let mut imports = Vec::new();
        while self.is(TokenKind::Import) {
            imports.push(self.parse_import()?);
        }

        let body = self.parse_declarations()?;
        self.consume(TokenKind::Eof, "expected DECLARATION or EOF")?;
        trace!(
            imports = imports.len(),
            declarations = body.len(),
            "parsed unit"
        );

        Ok(Some(Unit {
            leading_comments,
            module_name,
            imports,
            body,
            expected_output_trailer: self.trailer.unwrap_or_default().to_owned(),
        }))
    }

    fn parse_import(&mut self) -> Result<Import> {
        self.consume(TokenKind::Import, "expected `import`")?;
        let import = if self.take(TokenKind::Star) {
            self.consume(TokenKind::As, "expected `as` after `import *`")?;
            let alias = self.consume(TokenKind::Symbol, "expected SYMBOL after `as`")?;
            Import::As {
                alias: alias.text.to_owned(),
                module_path: self.parse_module_path()?,
            }
        } else {
            self.consume(TokenKind::LBrace, "expected `{` after `import`")?;
            let identifiers = self.parse_identifier_list();
            self.consume(TokenKind::RBrace, "expected `,` or `}`")?;
            Import::List {
                identifiers,
                module_path: self.parse_module_path()?,
            }
        };
        self.end_statement("expected `;`")?;
        Ok(import)
    }

    fn parse_module_path(&mut self) -> Result<String> {
        self.consume(TokenKind::From, "expected `from`")?;
        let path = self.consume(
            TokenKind::String,
            "expected STRING after `from` (representing module path)",
        )?;
        Ok(path.text.to_owned())
    }

    /// Parses declarations until a token that cannot start one. Comments
    /// pending at each boundary become [`Declaration::Comments`].
    fn parse_declarations(&mut self) -> Result<Vec<Declaration>> {
        let mut declarations = Vec::new();
        loop {
            if !self.comments.is_empty() {
                declarations.push(Declaration::Comments(mem::take(&mut self.comments)));
            }
            match self.parse_declaration()? {
                Some(declaration) => declarations.push(declaration),
                None => break Ok(declarations),
            }
        }
    }

    fn parse_declaration(&mut self) -> Result<Option<Declaration>> {
        let export = self.is(TokenKind::Export).then(|| self.advance());
        let exported = export.is_some();
        let function_keyword = self.dialect.function_keyword();

        let is_async = self.take(TokenKind::Async);
        if is_async && !self.is(function_keyword) {
            let expectation = format!("expected `{function_keyword}` after `async`");
            return Err(SyntaxError::expected(&self.current, &expectation).into());
        }

        let kind = self.current.kind;
        if kind == TokenKind::Eof {
            return match export {
                Some(_) => Err(
                    SyntaxError::at(&self.current, "unexpected end-of-input after 'export'").into(),
                ),
                None => Ok(None),
            };
        }
        if kind == function_keyword {
            let function = self.parse_function_declaration(exported, is_async)?;
            return Ok(Some(Declaration::Function(function)));
        }
        if let Some(keyword) = var_keyword(kind) {
            return self.parse_variable_declaration(keyword, exported).map(Some);
        }

        if let Some(export) = export {
            let message = if self.starts_statement(kind) {
                "statements cannot be exported"
            } else if self.starts_expression(kind) {
                "expression statements cannot be exported"
            } else {
                return Err(
                    SyntaxError::expected(&self.current, "expected DECLARATION after `export`")
                        .into(),
                );
            };
            return Err(SyntaxError::at(&export, message).into());
        }

        Ok(self.parse_statement()?.map(Declaration::Statement))
    }

    fn parse_function_declaration(&mut self, exported: bool, is_async: bool) -> Result<Function> {
        self.advance(); // function keyword
        let name = self.consume(
            TokenKind::Symbol,
            "expected SYMBOL (to define the function name)",
        )?;
        let signature = self.parse_signature()?;
        let body = self.parse_block("at start of function body")?;
        Ok(Function {
            name: name.text.to_owned(),
            signature,
            body,
            exported,
            is_async,
        })
    }

    fn parse_signature(&mut self) -> Result<Signature> {
        self.consume(
            TokenKind::LParen,
            "expected `(` to begin function parameter list",
        )?;
        let formal_parameter_names = self.parse_identifier_list();
        self.consume(TokenKind::RParen, "expected `,` or `)`")?;
        Ok(Signature {
            formal_parameter_names,
        })
    }

    fn parse_variable_declaration(
        &mut self,
        keyword: VarKeyword,
        exported: bool,
    ) -> Result<Declaration> {
        self.advance(); // let, var or const

        if self.take(TokenKind::LBrack) {
            let names = self.parse_identifier_list();
            if names.is_empty() {
                return Err(SyntaxError::expected(&self.current, "expected SYMBOL").into());
            }
            self.consume(TokenKind::RBrack, "expected `]`")?;
            if !self.is_plain_assign() {
                return Err(
                    SyntaxError::expected(&self.current, "expected '=' after 'let [...]'").into(),
                );
            }
            self.advance();
            let initializer = self.parse_assignment()?;
            self.end_statement("expected `;`")?;
            return Ok(Declaration::Variables {
                keyword,
                names,
                initializer,
                exported,
            });
        }

        let kw = keyword.spelling();
        let name = self.consume(TokenKind::Symbol, &format!("expected SYMBOL after '{kw}'"))?;
        let initializer = if self.is_plain_assign() {
            self.advance();
            Some(self.parse_assignment()?)
        } else {
            None
        };
        self.end_statement(&format!("expected '=' or ';' after '{kw}'"))?;
        Ok(Declaration::Variable {
            keyword,
            name: name.text.to_owned(),
            initializer,
            exported,
        })
    }

    fn parse_statement(&mut self) -> Result<Option<Statement>> {
        let kind = self.current.kind;
        let statement = match kind {
            TokenKind::If => {
                self.advance();
                self.parse_if()?
            }
            TokenKind::While => {
                self.advance();
                self.parse_while()?
            }
            TokenKind::For => {
                self.advance();
                self.parse_for()?
            }
            TokenKind::Throw => {
                self.advance();
                let expr = self.parse_expr()?;
                self.end_statement("expected `;`")?;
                Statement::Throw(expr)
            }
            TokenKind::Return => {
                self.advance();
                let expr = if self.starts_expression(self.current.kind) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                self.end_statement("expected `;`")?;
                Statement::Return(expr)
            }
            kind if kind == self.dialect.block_open() => {
                Statement::Block(self.parse_block("to begin block")?)
            }
            kind if self.starts_expression(kind) => {
                let expr = self.parse_expr()?;
                self.end_statement("expected `;`")?;
                Statement::Expression(expr)
            }
            _ => return Ok(None),
        };
        Ok(Some(statement))
    }

    /// Parses what follows `if`. In the block dialect an `elsif` becomes a
    /// nested `If` in the else branch, and only the innermost one consumes
    /// the closing `end`.
    fn parse_if(&mut self) -> Result<Statement> {
        if !self.dialect.is_block() {
            self.consume(TokenKind::LParen, "expected `(` after `if`")?;
            let test = self.parse_expr()?;
            self.consume(TokenKind::RParen, "expected `)` after `if (EXPRESSION`")?;
            let body = self.parse_block("after `if (EXPRESSION)`")?;
            let else_branch = if self.take(TokenKind::Else) {
                let branch = if self.take(TokenKind::If) {
                    self.parse_if()?
                } else {
                    Statement::Block(self.parse_block("or `if` after `else`")?)
                };
                Some(Box::new(branch))
            } else {
                None
            };
            return Ok(Statement::If {
                test,
                body,
                else_branch,
            });
        }

        let test = self.parse_expr()?;
        self.consume(TokenKind::Then, "expected `then` after `if EXPRESSION`")?;
        let body = Block {
            statements: self.parse_declarations()?,
        };
        let else_branch = if self.take(TokenKind::Elsif) {
            Some(Box::new(self.parse_if()?))
        } else if self.take(TokenKind::Else) {
            let statements = self.parse_declarations()?;
            self.consume(TokenKind::End, "expected DECLARATION or `end`")?;
            Some(Box::new(Statement::Block(Block { statements })))
        } else {
            self.consume(TokenKind::End, "expected DECLARATION, `elsif`, `else` or `end`")?;
            None
        };
        Ok(Statement::If {
            test,
            body,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> Result<Statement> {
        let parenthesized = !self.dialect.is_block();
        if parenthesized {
            self.consume(TokenKind::LParen, "expected `(` after `while`")?;
        }
        let test = self.parse_expr()?;
        let body = if parenthesized {
            self.consume(TokenKind::RParen, "expected `)` after `while (EXPRESSION`")?;
            self.parse_block("after `while (EXPRESSION)`")?
        } else {
            self.parse_block("after `while EXPRESSION`")?
        };
        Ok(Statement::While { test, body })
    }

    fn parse_for(&mut self) -> Result<Statement> {
        let parenthesized = !self.dialect.is_block();
        if parenthesized {
            self.consume(TokenKind::LParen, "expected `(` after `for`")?;
        }
        let var_keyword = var_keyword(self.current.kind);
        if var_keyword.is_some() {
            self.advance();
        }
        let bracketed = self.take(TokenKind::LBrack);
        let vars = self.parse_identifier_list();
        if vars.is_empty() {
            return Err(SyntaxError::expected(&self.current, "expected SYMBOL").into());
        }
        if bracketed {
            self.consume(TokenKind::RBrack, "expected `]`")?;
        }
        self.consume(TokenKind::Of, "expected `of`")?;
        let collection = self.parse_expr()?;
        let body = if parenthesized {
            self.consume(TokenKind::RParen, "expected `)` after `for (...`")?;
            self.parse_block("after `for (...)`")?
        } else {
            self.parse_block("after `for ... of EXPRESSION`")?
        };
        Ok(Statement::For {
            var_keyword,
            vars,
            collection,
            body,
            bracketed,
        })
    }

    fn parse_block(&mut self, context: &str) -> Result<Block> {
        let open = self.dialect.block_open();
        let close = self.dialect.block_close();
        self.consume(open, &format!("expected `{open}` {context}"))?;
        let statements = self.parse_declarations()?;
        self.consume(close, &format!("expected DECLARATION or `{close}`"))?;
        Ok(Block { statements })
    }

    /// `SYMBOL (',' SYMBOL)*`, possibly empty.
    fn parse_identifier_list(&mut self) -> Vec<String> {
        let mut identifiers = Vec::new();
        while self.is(TokenKind::Symbol) {
            identifiers.push(self.advance().text.to_owned());
            if !self.take(TokenKind::Comma) {
                break;
            }
        }
        identifiers
    }

    /// Requires a `;`. The block dialect lets it go before a token that
    /// closes the enclosing construct.
    fn end_statement(&mut self, expectation: &str) -> Result<()> {
        if self.take(TokenKind::Semicolon) {
            return Ok(());
        }
        let closes = matches!(
            self.current.kind,
            TokenKind::End | TokenKind::Else | TokenKind::Elsif | TokenKind::Eof
        );
        if self.dialect.is_block() && closes {
            return Ok(());
        }
        Err(SyntaxError::expected(&self.current, expectation).into())
    }
}

// Expressions
impl<'src> Parser<'src> {
    fn parse_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_assignment()?;
        while self.take(TokenKind::Comma) {
            let right = self.parse_assignment()?;
            left = Expr::binary(BinaryOp::Comma, left, right)?;
        }
        Ok(left)
    }

    /// Assignments and the ternary, both right associative.
    fn parse_assignment(&mut self) -> Result<Expr> {
        let left = self.parse_binary(precedence::OR)?;

        if self.is(TokenKind::Assign) {
            let op_token = self.advance();
            let op = BinaryOp::try_from(op_token.text)?;
            let left = self.operand(left, &op_token)?;
            let right = self.parse_assignment()?;
            return Ok(Expr::binary(op, left, right)?);
        }

        if self.is(TokenKind::Question) {
            let question = self.advance();
            let test = self.operand(left, &question)?;
            let if_true = self.parse_assignment()?;
            self.consume(TokenKind::Colon, "expected `:` after `expr ? expr`")?;
            let if_false = self.parse_assignment()?;
            return Ok(Expr::ternary(test, if_true, if_false));
        }

        Ok(left)
    }

    /// Precedence climbing over the binary operators from `||` to `**`.
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr> {
        let mut left = self.parse_prefix()?;

        while let Some(op) = infix_operator(self.current.kind) {
            let op_precedence = op.precedence();
            if op_precedence < min_precedence {
                break;
            }
            let op_token = self.advance();
            left = self.operand(left, &op_token)?;
            if op == BinaryOp::Exp
                && matches!(&left, Expr::UnaryPrefix { op, .. } if *op != PrefixOp::New)
            {
                let message = "unary operator before `**` must be parenthesized";
                return Err(SyntaxError::at(&op_token, message).into());
            }

            let right_precedence = if op.is_right_associative() {
                op_precedence
            } else {
                op_precedence + 1
            };
            let right = self.parse_binary(right_precedence)?;
            let right = self.operand(right, &op_token)?;
            left = Expr::binary(op, left, right)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        let op = match self.current.kind {
            TokenKind::Minus => PrefixOp::Neg,
            TokenKind::Plus => PrefixOp::Plus,
            TokenKind::Not => PrefixOp::Not,
            TokenKind::PlusPlus => PrefixOp::PreInc,
            TokenKind::MinusMinus => PrefixOp::PreDec,
            TokenKind::Typeof => PrefixOp::Typeof,
            TokenKind::Await => PrefixOp::Await,
            _ => return self.parse_postfix(),
        };
        let op_token = self.advance();
        let operand = self.parse_prefix()?;
        let operand = self.operand(operand, &op_token)?;
        Ok(Expr::unary_prefix(op, operand)?)
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let operand = self.parse_member()?;
        let op = match self.current.kind {
            TokenKind::PlusPlus => PostfixOp::Inc,
            TokenKind::MinusMinus => PostfixOp::Dec,
            _ => return Ok(operand),
        };
        let op_token = self.advance();
        let operand = self.operand(operand, &op_token)?;
        Ok(Expr::unary_postfix(op, operand))
    }

    /// Member access, calls and indexing, left to right.
    fn parse_member(&mut self) -> Result<Expr> {
        let mut value = if self.is(TokenKind::New) {
            let (new, bare) = self.parse_new()?;
            if bare {
                return Ok(new);
            }
            new
        } else {
            self.parse_primary()?
        };

        loop {
            match self.current.kind {
                TokenKind::LParen => {
                    let open = self.current;
                    let left = self.operand(value, &open)?;
                    let args = self.parse_arguments()?;
                    value = Expr::post_circumfix(Circumfix::Call, left, args)?;
                }
                TokenKind::LBrack => {
                    let open = self.advance();
                    let left = self.operand(value, &open)?;
                    let index = self.parse_expr()?;
                    self.consume(TokenKind::RBrack, "expected `]`")?;
                    value = Expr::post_circumfix(Circumfix::Index, left, index)?;
                }
                TokenKind::Dot => {
                    let dot = self.advance();
                    let left = self.operand(value, &dot)?;
                    let name = self.parse_property_name()?;
                    value = Expr::binary(BinaryOp::Dot, left, name)?;
                }
                _ => break Ok(value),
            }
        }
    }

    /// `new NAME(.NAME)* [(args)]`. Also returns whether the argument list
    /// was left out.
    fn parse_new(&mut self) -> Result<(Expr, bool)> {
        self.advance(); // new
        let name = self.consume(TokenKind::Symbol, "expected SYMBOL after `new`")?;
        let mut target = Expr::Symbol(name.text.to_owned());
        while self.take(TokenKind::Dot) {
            let name = self.parse_property_name()?;
            target = Expr::binary(BinaryOp::Dot, target, name)?;
        }
        if self.is(TokenKind::LParen) {
            let args = self.parse_arguments()?;
            Ok((Expr::binary(BinaryOp::New, target, args)?, false))
        } else {
            Ok((Expr::new_bare(target)?, true))
        }
    }

    /// After a `.`, keywords and booleans name properties too.
    fn parse_property_name(&mut self) -> Result<Expr> {
        let kind = self.current.kind;
        if kind == TokenKind::Symbol || kind == TokenKind::Boolean || kind.is_keyword() {
            Ok(Expr::Symbol(self.advance().text.to_owned()))
        } else {
            Err(SyntaxError::expected(&self.current, "expected SYMBOL after `.`").into())
        }
    }

    fn parse_arguments(&mut self) -> Result<Expr> {
        self.consume(TokenKind::LParen, "expected `(`")?;
        let (elements, trailing_comma) = self.parse_list(TokenKind::RParen, Self::parse_assignment)?;
        self.consume(TokenKind::RParen, "expected `)`")?;
        Ok(Expr::List {
            elements,
            trailing_comma,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self.current;
        let text = || token.text.to_owned();
        let literal = match token.kind {
            TokenKind::LParen => return self.parse_parenthesized(),
            TokenKind::LBrace => return self.parse_object(),
            TokenKind::LBrack => return self.parse_array(),
            kind if kind == self.dialect.function_keyword() => {
                return self.parse_function_literal();
            }
            TokenKind::Symbol => Expr::Symbol(text()),
            TokenKind::Boolean => Expr::Literal(Literal::Boolean {
                value: token.text == "true",
                text: text(),
            }),
            TokenKind::Fixnum => {
                let value = token
                    .text
                    .parse()
                    .map_err(|_| SyntaxError::at(&token, "integer literal out of range"))?;
                Expr::Literal(Literal::Fixnum {
                    value,
                    text: text(),
                })
            }
            TokenKind::Flonum => {
                let value = token
                    .text
                    .parse()
                    .map_err(|_| SyntaxError::at(&token, "malformed floating-point literal"))?;
                Expr::Literal(Literal::Flonum {
                    value,
                    text: text(),
                })
            }
            TokenKind::String => Expr::Literal(Literal::String {
                value: text(),
                text: text(),
            }),
            TokenKind::Regexp => Expr::Literal(Literal::Regexp {
                value: text(),
                text: text(),
            }),
            TokenKind::BadString => {
                return Err(SyntaxError::at(&token, "unterminated string literal").into());
            }
            TokenKind::Eof => {
                return Err(SyntaxError::at(&token, "unexpected end-of-input").into());
            }
            _ => return Err(SyntaxError::expected(&token, "expected EXPRESSION").into()),
        };
        self.advance();
        Ok(literal)
    }

    /// `( ... )` is a grouping, a tuple, or the formals of an arrow function,
    /// which is only known once the closing parenthesis has been seen.
    fn parse_parenthesized(&mut self) -> Result<Expr> {
        self.advance(); // (
        let (mut elements, trailing_comma) =
            self.parse_list(TokenKind::RParen, Self::parse_assignment)?;
        self.consume(TokenKind::RParen, "expected `)`")?;

        if self.is(TokenKind::Arrow) {
            return self.parse_arrow(elements);
        }
        if elements.is_empty() {
            return Err(SyntaxError::expected(&self.current, "expected `=>` after `()`").into());
        }
        if elements.len() == 1 && !trailing_comma {
            if let Some(inner) = elements.pop() {
                return Ok(Expr::grouping(inner));
            }
        }
        Ok(Expr::List {
            elements,
            trailing_comma,
        })
    }

    fn parse_arrow(&mut self, elements: Vec<Expr>) -> Result<Expr> {
        let arrow = self.advance();
        let formals = elements
            .into_iter()
            .map(|element| match element {
                Expr::Symbol(name) => Ok(name),
                _ => Err(SyntaxError::expected(
                    &arrow,
                    "expected identifier list before '=>'",
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let literal = if self.is(self.dialect.block_open()) {
            Literal::ArrowBlock {
                formals,
                block: self.parse_block("at start of arrow function body")?,
            }
        } else {
            Literal::ArrowExpr {
                formals,
                expr: Box::new(self.parse_assignment()?),
            }
        };
        Ok(Expr::Literal(literal))
    }

    fn parse_object(&mut self) -> Result<Expr> {
        self.advance(); // {
        let (pairs, _) = self.parse_list(TokenKind::RBrace, Self::parse_pair)?;
        self.consume(TokenKind::RBrace, "expected `}`")?;
        Ok(Expr::Object(pairs))
    }

    fn parse_pair(&mut self) -> Result<Pair> {
        let token = self.current;
        let key = match token.kind {
            TokenKind::Symbol => Expr::Symbol(token.text.to_owned()),
            TokenKind::String => Expr::Literal(Literal::String {
                value: token.text.to_owned(),
                text: token.text.to_owned(),
            }),
            _ => {
                let expectation = "expected SYMBOL or STRING (as object key)";
                return Err(SyntaxError::expected(&token, expectation).into());
            }
        };
        self.advance();
        let value = if self.take(TokenKind::Colon) {
            Some(self.parse_assignment()?)
        } else {
            None
        };
        Ok(Pair::new(key, value)?)
    }

    fn parse_array(&mut self) -> Result<Expr> {
        self.advance(); // [
        let (elements, _) = self.parse_list(TokenKind::RBrack, Self::parse_assignment)?;
        self.consume(TokenKind::RBrack, "expected `]`")?;
        Ok(Expr::Array(elements))
    }

    fn parse_function_literal(&mut self) -> Result<Expr> {
        self.advance(); // function keyword
        let name = self
            .is(TokenKind::Symbol)
            .then(|| self.advance().text.to_owned());
        let signature = self.parse_signature()?;
        let body = self.parse_block("at start of function body")?;
        Ok(Expr::Literal(Literal::Function {
            name,
            signature,
            body,
        }))
    }

    /// Parses `item (',' item)* [',']` until `end` is found. Does **NOT**
    /// consume the end delimiter. Also returns whether a trailing comma was
    /// present.
    fn parse_list<T>(
        &mut self,
        end: TokenKind,
        parse_item: impl Fn(&mut Self) -> Result<T>,
    ) -> Result<(Vec<T>, bool)> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        while !self.is(end) && !self.current.is_eof() {
            items.push(parse_item(self)?);
            trailing_comma = self.take(TokenKind::Comma);
            if !trailing_comma {
                break;
            }
        }
        Ok((items, trailing_comma))
    }

    /// Arrow functions bind looser than every operator, so using one as an
    /// operand without parentheses would not read back the same way.
    fn operand(&self, expr: Expr, operator: &Token<'_>) -> Result<Expr> {
        if expr.is_arrow() {
            let message = format!(
                "arrow function must be parenthesized to be used as an operand of `{}`",
                operator.text
            );
            return Err(SyntaxError::at(operator, message).into());
        }
        Ok(expr)
    }

    fn starts_expression(&self, kind: TokenKind) -> bool {
        use TokenKind::*;
        kind == self.dialect.function_keyword()
            || matches!(
                kind,
                Symbol
                    | Boolean
                    | Fixnum
                    | Flonum
                    | String
                    | BadString
                    | Regexp
                    | LParen
                    | LBrace
                    | LBrack
                    | Minus
                    | Plus
                    | Not
                    | PlusPlus
                    | MinusMinus
                    | Typeof
                    | Await
                    | New
            )
    }

    fn starts_statement(&self, kind: TokenKind) -> bool {
        kind == self.dialect.block_open()
            || matches!(
                kind,
                TokenKind::If
                    | TokenKind::While
                    | TokenKind::For
                    | TokenKind::Throw
                    | TokenKind::Return
            )
    }

    fn is_plain_assign(&self) -> bool {
        self.is(TokenKind::Assign) && self.current.text == "="
    }
}

impl<'src> Parser<'src> {
    fn new(lexer: Lexer<'src>) -> Parser<'src> {
        let mut p = Parser {
            dialect: lexer.dialect(),
            current: Token {
                kind: TokenKind::Eof,
                text: "",
                loc: Loc::start_of(lexer.file()),
            },
            lexer,
            comments: Vec::new(),
            trailer: None,
        };
        p.current = p.next_significant();
        p
    }

    /// Pulls the next non-trivia token, keeping comments and the trailer
    /// aside.
    fn next_significant(&mut self) -> Token<'src> {
        loop {
            let token = self.lexer.next_token(false, true);
            let kind = match token.kind {
                TokenKind::LineComment => CommentKind::Line,
                TokenKind::BlockComment => CommentKind::Block,
                TokenKind::OutputComment => {
                    self.trailer = Some(token.text);
                    continue;
                }
                _ => return token,
            };
            self.comments.push(Comment {
                kind,
                text: token.text.to_owned(),
            });
        }
    }

    /// Returns the current token and advances.
    fn advance(&mut self) -> Token<'src> {
        let current = self.current;
        self.current = self.next_significant();
        current
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.current.kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one. If not, fails
    /// with `"{expectation} but found ..."`.
    fn consume(&mut self, expect: TokenKind, expectation: &str) -> Result<Token<'src>> {
        if self.is(expect) {
            Ok(self.advance())
        } else {
            Err(SyntaxError::expected(&self.current, expectation).into())
        }
    }
}

fn var_keyword(kind: TokenKind) -> Option<VarKeyword> {
    match kind {
        TokenKind::Let => Some(VarKeyword::Let),
        TokenKind::Var => Some(VarKeyword::Var),
        TokenKind::Const => Some(VarKeyword::Const),
        _ => None,
    }
}

fn infix_operator(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::OrOr => BinaryOp::Or,
        TokenKind::AndAnd => BinaryOp::And,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::Identical => BinaryOp::StrictEq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::NotIdentical => BinaryOp::StrictNotEq,
        TokenKind::Less => BinaryOp::Lt,
        TokenKind::Greater => BinaryOp::Gt,
        TokenKind::LessEq => BinaryOp::LtEq,
        TokenKind::GreaterEq => BinaryOp::GtEq,
        TokenKind::In => BinaryOp::In,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::StarStar => BinaryOp::Exp,
        _ => return None,
    };
    Some(op)
}

#[cfg(test)]
mod tests {
    use crate::util::test_utils::tree_tests;

    tree_tests!(
        use brace;

        fn test_precedence_product_binds_tighter() {
            let expr = "1 + 2 * 3";
            let tree_ok = "
                binary +
                  fixnum 1
                  binary *
                    fixnum 2
                    fixnum 3
            ";
        }

        fn test_grouping_is_kept() {
            let expr = "(1 + 2) * 3";
            let tree_ok = "
                binary *
                  grouping
                    binary +
                      fixnum 1
                      fixnum 2
                  fixnum 3
            ";
        }

        fn test_left_associative_layers() {
            let expr = "a - b - c || d && e == f < g";
            let tree_ok = "
                binary ||
                  binary -
                    binary -
                      symbol a
                      symbol b
                    symbol c
                  binary &&
                    symbol d
                    binary ==
                      symbol e
                      binary <
                        symbol f
                        symbol g
            ";
        }

        fn test_exponent_is_right_associative() {
            let expr = "a ** b ** -c";
            let tree_ok = "
                binary **
                  symbol a
                  binary **
                    symbol b
                    prefix -
                      symbol c
            ";
        }

        fn test_unary_before_exponent_is_rejected() {
            let expr = "-a ** 2";
            let error = "1:4: unary operator before `**` must be parenthesized";
        }

        fn test_assignment_and_ternary_are_right_associative() {
            let expr = "a = b += c ? d : e ? f : g";
            let tree_ok = "
                binary =
                  symbol a
                  binary +=
                    symbol b
                    ternary
                      symbol c
                      symbol d
                      ternary
                        symbol e
                        symbol f
                        symbol g
            ";
        }

        fn test_ternary_requires_colon() {
            let expr = "a ? b";
            let error = "1:6: expected `:` after `expr ? expr` but found EOF";
        }

        fn test_comma_is_loosest() {
            let expr = "a = 1, b";
            let tree_ok = "
                binary ,
                  binary =
                    symbol a
                    fixnum 1
                  symbol b
            ";
        }

        fn test_prefix_and_postfix() {
            let expr = "!typeof a++ - --b";
            let tree_ok = "
                binary -
                  prefix !
                    prefix typeof
                      postfix ++
                        symbol a
                  prefix --
                    symbol b
            ";
        }

        fn test_member_call_and_index_chain() {
            let expr = "a.b(1, 2)[c].if";
            let tree_ok = "
                binary .
                  index
                    call
                      binary .
                        symbol a
                        symbol b
                      list
                        fixnum 1
                        fixnum 2
                    symbol c
                  symbol if
            ";
        }

        fn test_new_with_arguments_on_a_path() {
            let expr = "new a.b(1).c";
            let tree_ok = "
                binary .
                  binary new
                    binary .
                      symbol a
                      symbol b
                    list
                      fixnum 1
                  symbol c
            ";
        }

        fn test_bare_new() {
            let expr = "new Map";
            let tree_ok = "
                prefix new
                  symbol Map
            ";
        }

        fn test_bare_new_ends_the_member_chain() {
            let expr = "new a.b[0]";
            let error = "1:8: expected end of expression but found LBRACK (`[`)";
        }

        fn test_new_requires_a_name() {
            let expr = "new (a)";
            let error = "1:5: expected SYMBOL after `new` but found LPAREN (`(`)";
        }

        fn test_arrow_without_formals() {
            let expr = "() => x";
            let tree_ok = "
                arrow ()
                  symbol x
            ";
        }

        fn test_arrow_with_block_body() {
            let expr = "(a, b) => { return a; }";
            let tree_ok = "
                arrow-block (a, b)
                  return
                    symbol a
            ";
        }

        fn test_arrow_formals_must_be_symbols() {
            let expr = "(a, 1) => a";
            let error = "1:8: expected identifier list before '=>' but found ARROW (`=>`)";
        }

        fn test_arrow_body_extends_to_the_right() {
            let expr = "() => a + 1";
            let tree_ok = "
                arrow ()
                  binary +
                    symbol a
                    fixnum 1
            ";
        }

        fn test_arrow_block_as_operand_is_rejected() {
            let expr = "() => {} + 1";
            let error = "1:10: arrow function must be parenthesized to be used as an operand of `+`";
        }

        fn test_single_element_is_grouping() {
            let expr = "(a)";
            let tree_ok = "
                grouping
                  symbol a
            ";
        }

        fn test_trailing_comma_makes_a_list() {
            let expr = "(a,)";
            let tree_ok = "
                list trailing-comma
                  symbol a
            ";
        }

        fn test_tuple() {
            let expr = "(a, b)";
            let tree_ok = "
                list
                  symbol a
                  symbol b
            ";
        }

        fn test_empty_parens_need_an_arrow() {
            let expr = "()";
            let error = "1:3: expected `=>` after `()` but found EOF";
        }

        fn test_object_literal() {
            let expr = r#"{ a: 1, "b": [2, 3], c }"#;
            let tree_ok = r#"
                object
                  pair a
                    fixnum 1
                  pair "b"
                    array
                      fixnum 2
                      fixnum 3
                  pair c
            "#;
        }

        fn test_object_key_must_be_symbol_or_string() {
            let expr = "{ 1: 2 }";
            let error = "1:3: expected SYMBOL or STRING (as object key) but found FIXNUM (`1`)";
        }

        fn test_function_literal() {
            let expr = "function (a) { return a * 2; }";
            let tree_ok = "
                function-literal (a)
                  return
                    binary *
                      symbol a
                      fixnum 2
            ";
        }

        fn test_scalar_literals() {
            let expr = "[true, 1.5e3, 'x', /y/g, 42]";
            let tree_ok = "
                array
                  boolean true
                  flonum 1.5e3
                  string 'x'
                  regexp /y/g
                  fixnum 42
            ";
        }

        fn test_fixnum_overflow() {
            let expr = "99999999999999999999";
            let error = "1:1: integer literal out of range";
        }

        fn test_unterminated_string() {
            let expr = "'abc";
            let error = "1:1: unterminated string literal";
        }

        fn test_unexpected_end_of_input() {
            let expr = "1 +";
            let error = "1:4: unexpected end-of-input";
        }

        fn test_relational_in() {
            let expr = "k in o == true";
            let tree_ok = "
                binary ==
                  binary in
                    symbol k
                    symbol o
                  boolean true
            ";
        }
    );

    tree_tests!(
        use brace;

        fn test_empty_unit() {
            let unit = "  \n\t ";
            let tree_ok = "";
        }

        fn test_module_imports_and_comments() {
            let unit = r#"
                // about
                module m;
                import { a, b } from "./ab.mjs";
                import * as fs from 'fs';
                /* body */
                a(b);
            "#;
            let tree_ok = r#"
                unit
                  comment "// about"
                  module m
                  import { a, b } from "./ab.mjs"
                  import * as fs from 'fs'
                  comments
                    comment "/* body */"
                  call
                    symbol a
                    list
                      symbol b
            "#;
        }

        fn test_function_declarations() {
            let unit = "
                export async function f(a, b) {
                  return;
                }
                function g() { }
            ";
            let tree_ok = "
                unit
                  export async function f(a, b)
                    return
                  function g()
            ";
        }

        fn test_variable_initializer_excludes_comma() {
            let unit = "let x; export const y = 1, 2;";
            let error = "1:26: expected '=' or ';' after 'const' but found COMMA (`,`)";
        }

        fn test_variable_declarations() {
            let unit = "let x; export const y = z = 1; var [a, b] = f();";
            let tree_ok = "
                unit
                  let x
                  export const y
                    binary =
                      symbol z
                      fixnum 1
                  var [a, b]
                    call
                      symbol f
                      list
            ";
        }

        fn test_destructuring_requires_initializer() {
            let unit = "let [x,y];";
            let error = "1:10: expected '=' after 'let [...]' but found SEMICOLON (`;`)";
        }

        fn test_destructuring_rejects_compound_assignment() {
            let unit = "let [x] += 1;";
            let error = "1:9: expected '=' after 'let [...]' but found ASSIGN (`+=`)";
        }

        fn test_lone_paren_is_not_a_declaration() {
            let unit = ")";
            let error = "1:1: expected DECLARATION or EOF but found RPAREN (`)`)";
        }

        fn test_destructuring_without_initializer_mentions_equals() {
            let unit = "let [x, y];";
            let error_contains = "expected '='";
        }

        fn test_export_expression() {
            let unit = "export 7;";
            let error = "1:1: expression statements cannot be exported";
        }

        fn test_export_statement() {
            let unit = "export if (a) { }";
            let error = "1:1: statements cannot be exported";
        }

        fn test_export_at_end_of_input() {
            let unit = "export";
            let error = "1:7: unexpected end-of-input after 'export'";
        }

        fn test_export_nothing() {
            let unit = "export )";
            let error = "1:8: expected DECLARATION after `export` but found RPAREN (`)`)";
        }

        fn test_async_requires_function() {
            let unit = "async let x;";
            let error = "1:7: expected `function` after `async` but found let";
        }

        fn test_missing_semicolon() {
            let unit = "a = 1 b = 2;";
            let error = "1:7: expected `;` but found SYMBOL (`b`)";
        }

        fn test_if_else_if_chain() {
            let unit = "if (true) { 1; } else if (false) { 2; }";
            let tree_ok = "
                unit
                  if
                    boolean true
                    then
                      fixnum 1
                    else
                      if
                        boolean false
                        then
                          fixnum 2
            ";
        }

        fn test_if_requires_parentheses() {
            let unit = "if true { }";
            let error = "1:4: expected `(` after `if` but found BOOLEAN (`true`)";
        }

        fn test_statement_block_and_object_statement() {
            let unit = "{ a; } ({ b: 1 });";
            let tree_ok = "
                unit
                  block
                    symbol a
                  grouping
                    object
                      pair b
                        fixnum 1
            ";
        }

        fn test_loops_and_throw() {
            let unit = "
                while (i < 3) { i += 1; }
                for (const [k, v] of entries) { throw k; }
                for (x of xs) { }
            ";
            let tree_ok = "
                unit
                  while
                    binary <
                      symbol i
                      fixnum 3
                    do
                      binary +=
                        symbol i
                        fixnum 1
                  for const [k, v] of
                    symbol entries
                    do
                      throw
                        symbol k
                  for x of
                    symbol xs
                    do
            ";
        }

        fn test_block_close_expected() {
            let unit = "function f() { 1; ";
            let error = "1:19: expected DECLARATION or `}` but found EOF";
        }

        fn test_trailer_is_kept_verbatim() {
            let unit = "log(1);\n// OUTPUT:\n//  1\n";
            let tree_ok = r#"
                unit
                  call
                    symbol log
                    list
                      fixnum 1
                  trailer "// OUTPUT:\n//  1"
            "#;
        }

        fn test_comments_inside_blocks_stay_there() {
            let unit = "function f() {\n  a;\n  // last\n}\n";
            let tree_ok = r#"
                unit
                  function f()
                    symbol a
                    comments
                      comment "// last"
            "#;
        }
    );

    tree_tests!(
        use block;

        fn test_block_if_elsif_matches_brace_shape() {
            let unit = "if true then 1 elsif false then 2 end";
            let tree_ok = "
                unit
                  if
                    boolean true
                    then
                      fixnum 1
                    else
                      if
                        boolean false
                        then
                          fixnum 2
            ";
        }

        fn test_block_if_else() {
            let unit = "if a then b; else c; end";
            let tree_ok = "
                unit
                  if
                    symbol a
                    then
                      symbol b
                    else
                      block
                        symbol c
            ";
        }

        fn test_block_function_and_loops() {
            let unit = "
                fn f(xs) do
                  for let x of xs do
                    while x do x -= 1 end
                  end
                  return (a) => do a end
                end
            ";
            let tree_ok = "
                unit
                  function f(xs)
                    for let x of
                      symbol xs
                      do
                        while
                          symbol x
                          do
                            binary -=
                              symbol x
                              fixnum 1
                    return
                      arrow-block (a)
                        symbol a
            ";
        }

        fn test_block_statement_uses_do() {
            let unit = "do a; end";
            let tree_ok = "
                unit
                  block
                    symbol a
            ";
        }

        fn test_block_object_at_statement_start() {
            let unit = "{ a: 1 };";
            let tree_ok = "
                unit
                  object
                    pair a
                      fixnum 1
            ";
        }

        fn test_function_is_a_plain_name_in_block() {
            let unit = "function;";
            let tree_ok = "
                unit
                  symbol function
            ";
        }

        fn test_block_if_requires_end() {
            let unit = "if a then b;";
            let error = "1:13: expected DECLARATION, `elsif`, `else` or `end` but found EOF";
        }

        fn test_block_async_requires_fn() {
            let unit = "async function f() do end";
            let error = "1:7: expected `fn` after `async` but found SYMBOL (`function`)";
        }

        fn test_block_semicolon_still_required_mid_block() {
            let unit = "a b";
            let error = "1:3: expected `;` but found SYMBOL (`b`)";
        }
    );
}

// unit ::= [module SYMBOL ';'] import* declaration* EOF
// import ::= import '{' SYMBOL (',' SYMBOL)* '}' from STRING ';'
//          | import '*' as SYMBOL from STRING ';'
// declaration ::= [export] [async] FUNCTION SYMBOL '(' [SYMBOL (',' SYMBOL)*] ')' block
//               | [export] (let | var | const) SYMBOL ['=' expr] ';'
//               | [export] (let | var | const) '[' SYMBOL (',' SYMBOL)* ']' '=' expr ';'
//               | statement
// statement ::= if expr block [else (if ... | block)]
//             | while expr block
//             | for [let | var | const] ['['] SYMBOL (',' SYMBOL)* [']'] of expr block
//             | throw expr ';'
//             | return [expr] ';'
//             | block
//             | expr ';'
// block ::= OPEN declaration* CLOSE
//
// FUNCTION, OPEN and CLOSE are `function`, `{` and `}` in the brace dialect,
// and `fn`, `do` and `end` in the block dialect, where the `if` and `while`
// headers also drop their parentheses (`if e then ... elsif ... else ... end`).

// Precedence, loosest first
//
// ,
// = += -= *= /= %= ?:
// ||
// &&
// == === != !==
// < > <= >= in
// + -
// * / %
// **
// - + ! ++ -- typeof await (prefix)
// ++ -- (postfix)
// new (without arguments)
// . [] () new(...)

use std::fmt;

use crate::error::InternalError;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Unit {
    /// Comments above the module line and the imports.
    pub leading_comments: Vec<Comment>,
    pub module_name: Option<String>,
    pub imports: Vec<Import>,
    pub body: Vec<Declaration>,
    /// The verbatim `// OUTPUT:` block, or empty.
    pub expected_output_trailer: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    /// Includes the `//` or `/* */` delimiters.
    pub text: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Import {
    /// `import { a, b } from "path";`
    List {
        identifiers: Vec<String>,
        /// Keeps its quotes.
        module_path: String,
    },
    /// `import * as alias from "path";`
    As { alias: String, module_path: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Declaration {
    Function(Function),
    Variable {
        keyword: VarKeyword,
        name: String,
        initializer: Option<Expr>,
        exported: bool,
    },
    /// `let [a, b] = expr;`
    Variables {
        keyword: VarKeyword,
        /// Non empty.
        names: Vec<String>,
        initializer: Expr,
        exported: bool,
    },
    Statement(Statement),
    /// Comments found between two declarations, in source order.
    Comments(Vec<Comment>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: String,
    pub signature: Signature,
    pub body: Block,
    pub exported: bool,
    pub is_async: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Signature {
    pub formal_parameter_names: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Declaration>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VarKeyword {
    Let,
    Var,
    Const,
}

impl VarKeyword {
    pub const fn spelling(self) -> &'static str {
        match self {
            VarKeyword::Let => "let",
            VarKeyword::Var => "var",
            VarKeyword::Const => "const",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    If {
        test: Expr,
        body: Block,
        /// Either another `If` (for `else if` and `elsif`) or a `Block`.
        else_branch: Option<Box<Statement>>,
    },
    While {
        test: Expr,
        body: Block,
    },
    For {
        var_keyword: Option<VarKeyword>,
        /// Non empty.
        vars: Vec<String>,
        collection: Expr,
        body: Block,
        /// Whether the variables were written as `[a, b]`.
        bracketed: bool,
    },
    Throw(Expr),
    Return(Option<Expr>),
    Expression(Expr),
    Block(Block),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Symbol(String),
    Literal(Literal),
    /// Parentheses written in the source around a single expression.
    Grouping(Box<Expr>),
    UnaryPrefix {
        op: PrefixOp,
        operand: Box<Expr>,
    },
    UnaryPostfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Ternary {
        test: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
    /// A call (`f(a, b)`, whose right side is a [`Expr::List`]) or an index
    /// (`a[i]`).
    PostCircumfix {
        circumfix: Circumfix,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Object(Vec<Pair>),
    /// A parenthesized list: a tuple or the arguments of a call.
    List {
        elements: Vec<Expr>,
        trailing_comma: bool,
    },
    Array(Vec<Expr>),
}

impl Expr {
    /// Builds a binary node, rejecting a `new` whose right side is not an
    /// argument list or whose target is not a name path, and a `.` whose right
    /// side is not a name.
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Result<Expr, InternalError> {
        match op {
            BinaryOp::New => {
                if !left.is_symbol_path() {
                    return Err(InternalError::new("`new` target must be a name path"));
                }
                if !matches!(right, Expr::List { .. }) {
                    return Err(InternalError::new("`new` arguments must be a List"));
                }
            }
            BinaryOp::Dot if !matches!(right, Expr::Symbol(_)) => {
                return Err(InternalError::new("right side of `.` must be a Symbol"));
            }
            _ => {}
        }
        Ok(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary_prefix(op: PrefixOp, operand: Expr) -> Result<Expr, InternalError> {
        if op == PrefixOp::New && !operand.is_symbol_path() {
            return Err(InternalError::new("`new` target must be a name path"));
        }
        Ok(Expr::UnaryPrefix {
            op,
            operand: Box::new(operand),
        })
    }

    /// `new Target` without an argument list.
    pub fn new_bare(target: Expr) -> Result<Expr, InternalError> {
        Expr::unary_prefix(PrefixOp::New, target)
    }

    pub fn unary_postfix(op: PostfixOp, operand: Expr) -> Expr {
        Expr::UnaryPostfix {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn ternary(test: Expr, if_true: Expr, if_false: Expr) -> Expr {
        Expr::Ternary {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        }
    }

    pub fn post_circumfix(
        circumfix: Circumfix,
        left: Expr,
        right: Expr,
    ) -> Result<Expr, InternalError> {
        if circumfix == Circumfix::Call && !matches!(right, Expr::List { .. }) {
            return Err(InternalError::new("call arguments must be a List"));
        }
        Ok(Expr::PostCircumfix {
            circumfix,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn grouping(inner: Expr) -> Expr {
        Expr::Grouping(Box::new(inner))
    }

    /// Binding strength, from [`precedence::COMMA`] to [`precedence::ATOM`].
    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Literal(literal) if literal.is_arrow() => precedence::ASSIGNMENT,
            Expr::Symbol(_)
            | Expr::Literal(_)
            | Expr::Grouping(_)
            | Expr::Object(_)
            | Expr::List { .. }
            | Expr::Array(_) => precedence::ATOM,
            Expr::UnaryPrefix { op, .. } => op.precedence(),
            Expr::UnaryPostfix { .. } => precedence::POSTFIX,
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Ternary { .. } => precedence::TERNARY,
            Expr::PostCircumfix { .. } => precedence::MEMBER,
        }
    }

    pub fn is_arrow(&self) -> bool {
        matches!(self, Expr::Literal(literal) if literal.is_arrow())
    }

    /// `a` or `a.b.c`.
    pub fn is_symbol_path(&self) -> bool {
        match self {
            Expr::Symbol(_) => true,
            Expr::Binary {
                op: BinaryOp::Dot,
                left,
                right,
            } => left.is_symbol_path() && matches!(**right, Expr::Symbol(_)),
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Boolean { value: bool, text: String },
    Fixnum { value: i64, text: String },
    Flonum { value: f64, text: String },
    /// `value` equals the spelling, quotes included.
    String { value: String, text: String },
    Regexp { value: String, text: String },
    Function {
        name: Option<String>,
        signature: Signature,
        body: Block,
    },
    ArrowExpr {
        formals: Vec<String>,
        expr: Box<Expr>,
    },
    ArrowBlock {
        formals: Vec<String>,
        block: Block,
    },
}

impl Literal {
    pub fn is_arrow(&self) -> bool {
        matches!(self, Literal::ArrowExpr { .. } | Literal::ArrowBlock { .. })
    }
}

/// An object literal entry: `key: value`, or the shorthand `key`.
#[derive(Clone, Debug, PartialEq)]
pub struct Pair {
    pub key: PairKey,
    pub value: Option<Expr>,
}

impl Pair {
    /// Accepts a `Symbol` or a string literal as the key.
    pub fn new(key: Expr, value: Option<Expr>) -> Result<Pair, InternalError> {
        let key = match key {
            Expr::Symbol(name) => PairKey::Symbol(name),
            Expr::Literal(Literal::String { value, text }) => PairKey::String { value, text },
            other => {
                return Err(InternalError::new(format!(
                    "object key must be a Symbol or String, not {other:?}"
                )))
            }
        };
        Ok(Pair { key, value })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PairKey {
    Symbol(String),
    String { value: String, text: String },
}

impl PairKey {
    pub fn text(&self) -> &str {
        match self {
            PairKey::Symbol(name) => name,
            PairKey::String { text, .. } => text,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Circumfix {
    /// `( )`
    Call,
    /// `[ ]`
    Index,
}

impl Circumfix {
    pub const fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            Circumfix::Call => ("(", ")"),
            Circumfix::Index => ("[", "]"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Comma,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    Or,
    And,
    Eq,
    StrictEq,
    NotEq,
    StrictNotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    In,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    Dot,
    /// `new Target(args)`.
    New,
}

impl BinaryOp {
    pub const fn spelling(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Comma => ",",
            Assign => "=",
            AddAssign => "+=",
            SubAssign => "-=",
            MulAssign => "*=",
            DivAssign => "/=",
            ModAssign => "%=",
            Or => "||",
            And => "&&",
            Eq => "==",
            StrictEq => "===",
            NotEq => "!=",
            StrictNotEq => "!==",
            Lt => "<",
            Gt => ">",
            LtEq => "<=",
            GtEq => ">=",
            In => "in",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Exp => "**",
            Dot => ".",
            New => "new",
        }
    }

    pub const fn precedence(self) -> u8 {
        use BinaryOp::*;
        match self {
            Comma => precedence::COMMA,
            Assign | AddAssign | SubAssign | MulAssign | DivAssign | ModAssign => {
                precedence::ASSIGNMENT
            }
            Or => precedence::OR,
            And => precedence::AND,
            Eq | StrictEq | NotEq | StrictNotEq => precedence::EQUALITY,
            Lt | Gt | LtEq | GtEq | In => precedence::RELATIONAL,
            Add | Sub => precedence::ADDITIVE,
            Mul | Div | Mod => precedence::MULTIPLICATIVE,
            Exp => precedence::EXPONENT,
            Dot | New => precedence::MEMBER,
        }
    }

    /// Assignments and `**` group to the right; everything else to the left.
    pub const fn is_right_associative(self) -> bool {
        use BinaryOp::*;
        matches!(
            self,
            Assign | AddAssign | SubAssign | MulAssign | DivAssign | ModAssign | Exp
        )
    }
}

impl TryFrom<&str> for BinaryOp {
    type Error = InternalError;

    fn try_from(spelling: &str) -> Result<BinaryOp, InternalError> {
        use BinaryOp::*;
        const ALL: &[BinaryOp] = &[
            Comma, Assign, AddAssign, SubAssign, MulAssign, DivAssign, ModAssign, Or, And, Eq,
            StrictEq, NotEq, StrictNotEq, Lt, Gt, LtEq, GtEq, In, Add, Sub, Mul, Div, Mod, Exp,
            Dot, New,
        ];
        ALL.iter()
            .copied()
            .find(|op| op.spelling() == spelling)
            .ok_or_else(|| InternalError::new(format!("unknown binary operator `{spelling}`")))
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PrefixOp {
    Neg,
    Plus,
    Not,
    PreInc,
    PreDec,
    Typeof,
    Await,
    /// `new Target` without arguments.
    New,
}

impl PrefixOp {
    pub const fn spelling(self) -> &'static str {
        match self {
            PrefixOp::Neg => "-",
            PrefixOp::Plus => "+",
            PrefixOp::Not => "!",
            PrefixOp::PreInc => "++",
            PrefixOp::PreDec => "--",
            PrefixOp::Typeof => "typeof",
            PrefixOp::Await => "await",
            PrefixOp::New => "new",
        }
    }

    pub const fn precedence(self) -> u8 {
        match self {
            PrefixOp::New => precedence::BARE_NEW,
            _ => precedence::PREFIX,
        }
    }

    /// Word operators need a space before their operand.
    pub const fn is_word(self) -> bool {
        matches!(self, PrefixOp::Typeof | PrefixOp::Await | PrefixOp::New)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PostfixOp {
    Inc,
    Dec,
}

impl PostfixOp {
    pub const fn spelling(self) -> &'static str {
        match self {
            PostfixOp::Inc => "++",
            PostfixOp::Dec => "--",
        }
    }
}

/// Binding strengths shared by the parser and the emitter.
pub mod precedence {
    pub const COMMA: u8 = 1;
    pub const ASSIGNMENT: u8 = 2;
    pub const TERNARY: u8 = 2;
    pub const OR: u8 = 3;
    pub const AND: u8 = 4;
    pub const EQUALITY: u8 = 8;
    pub const RELATIONAL: u8 = 9;
    pub const ADDITIVE: u8 = 11;
    pub const MULTIPLICATIVE: u8 = 12;
    pub const EXPONENT: u8 = 13;
    pub const PREFIX: u8 = 14;
    pub const POSTFIX: u8 = 15;
    pub const BARE_NEW: u8 = 16;
    pub const MEMBER: u8 = 17;
    pub const ATOM: u8 = 18;
}

//! The language-neutral syntax tree. All three parsers produce this shape;
//! nothing in it records which surface a program came from.
//!
//! ```plain
//! program   -> stmt*
//! stmt      -> function | class | var-decl | if | while | for
//!            | return | break | assignment | expr-stmt | block
//! expr      -> binary | unary | call | method-call | member | index
//!            | identifier | literal
//! ```

use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// A statement with the source position of its first token.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: u32,
    pub column: u32,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: u32, column: u32) -> Stmt {
        Stmt { kind, line, column }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    FunctionDef(FunctionDef),
    ClassDef(ClassDef),
    VariableDecl(VariableDecl),
    If(IfStmt),
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    /// Iteration over a single bound variable. `iterable` is absent for
    /// loop headers the parsers recognize but cannot express.
    For {
        variable: String,
        iterable: Option<Expr>,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Assignment {
        target: String,
        op: AssignOp,
        value: Expr,
    },
    Expression(Expr),
    Block(Vec<Stmt>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub parameters: Vec<Param>,
    pub return_type: Option<String>,
    pub body: Vec<Stmt>,
    /// Surface access modifier, if the source spelled one.
    pub access: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<String>,
    pub fields: Vec<VariableDecl>,
    pub methods: Vec<FunctionDef>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDecl {
    pub name: String,
    pub ty: Option<String>,
    pub init: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Vec<Stmt>,
    pub elif_blocks: Vec<(Expr, Vec<Stmt>)>,
    pub else_block: Vec<Stmt>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An expression with the source position of its first token.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: u32,
    pub column: u32,
}

impl Expr {
    pub fn new(kind: ExprKind, line: u32, column: u32) -> Expr {
        Expr { kind, line, column }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    /// A call of a named free function or builtin.
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    /// A call through a receiver expression, `recv.method(args)`.
    MethodCall {
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    /// Plain member access, `recv.name`.
    Member {
        receiver: Box<Expr>,
        name: String,
    },
    /// Subscripting, `recv[index]`.
    Index {
        receiver: Box<Expr>,
        index: Box<Expr>,
    },
    /// A call whose head is itself an expression, `f()(x)` or `xs[0](x)`.
    Invoke {
        target: Box<Expr>,
        args: Vec<Expr>,
    },
    Identifier(String),
    Literal(Literal),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    FloorDiv,
    Pow,
    Eq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    /// `<<`, kept as a plain binary operator so stream chains survive as
    /// expressions rooted at their stream identifier.
    Shl,
    /// `>>`
    Shr,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::FloorDiv => "//",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinOp::Add
                | BinOp::Sub
                | BinOp::Mul
                | BinOp::Div
                | BinOp::Mod
                | BinOp::FloorDiv
                | BinOp::Pow
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Pos,
    Not,
}

impl UnOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Pos => "+",
            UnOp::Not => "!",
        }
    }
}

//! AST for the restricted query language.

use std::fmt;

use crate::frame::Value;

/// A parsed query program: one or more statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

/// A single statement: an expression, optionally assigned to a name.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    /// Assignment target, if the statement has the form `name = expr`.
    pub target: Option<String>,
    pub expr: Expr,
}

/// An expression: a primary followed by method calls and projections.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A name looked up in the execution scope.
    Ident(String),
    /// A literal value.
    Literal(Literal),
    /// `recv.name(args)`.
    MethodCall {
        recv: Box<Expr>,
        name: String,
        args: Vec<Arg>,
    },
    /// `recv["Column"]`.
    Projection { recv: Box<Expr>, column: String },
}

/// A call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A plain expression argument.
    Expr(Expr),
    /// A column comparison, e.g. `"Age" > 30` inside `filter(...)`.
    Comparison {
        column: String,
        op: CmpOp,
        value: Literal,
    },
}

/// Comparison operators accepted inside `filter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Literal values the grammar accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Literal {
    /// Converts the literal into a cell value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Str(s) => Value::Text(s.clone()),
            Self::Int(i) => Value::Int(*i),
            Self::Float(f) => Value::Float(*f),
            Self::Bool(b) => Value::Bool(*b),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

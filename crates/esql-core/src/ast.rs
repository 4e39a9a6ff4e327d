//! Filter-expression abstract syntax tree definitions.
//!
//! Trees are produced once by an external parser and evaluated many times
//! against different events. Every node carries the byte range it was parsed
//! from together with the literal source substring, so evaluation errors can
//! always point back at the offending piece of the filter text.

use std::sync::Arc;

use crate::eval::Value;

/// Source span for error reporting.
/// Uses byte offsets into the original expression text.
pub type Span = std::ops::Range<usize>;

/// AST node with source location and the literal substring it covers.
///
/// The substring is captured at construction time and is used purely for
/// diagnostics, never for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
    pub text: Arc<str>,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span, text: impl Into<Arc<str>>) -> Self {
        Self {
            node,
            span,
            text: text.into(),
        }
    }
}

/// A spanned expression.
pub type SpannedExpr = Spanned<Expr>;

/// Filter expression.
///
/// A closed set of node kinds; the evaluator matches exhaustively so that a
/// new operator cannot be added without handling it everywhere.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Constant value.
    Literal(Value),
    /// Reference to a context attribute of the event under evaluation.
    Attribute(String),
    /// Presence test for a context attribute (`EXISTS attr`).
    Exists(String),
    /// Unary operation.
    Unary {
        op: UnaryOp,
        expr: Box<SpannedExpr>,
    },
    /// Binary operation.
    Binary {
        op: BinaryOp,
        left: Box<SpannedExpr>,
        right: Box<SpannedExpr>,
    },
    /// Set membership test (`x IN (a, b, c)`).
    ///
    /// `NOT IN` arrives from the parser as `Unary(Not, In { .. })`.
    In {
        needle: Box<SpannedExpr>,
        haystack: Vec<SpannedExpr>,
    },
    /// Built-in function call. Arity and shape are validated at parse time;
    /// only argument types are re-checked during evaluation.
    Call {
        name: String,
        args: Vec<SpannedExpr>,
    },
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical negation (`NOT`)
    Not,
    /// Arithmetic negation (`-`)
    Neg,
}

impl UnaryOp {
    /// The operator as it appears in filter source text.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "NOT",
            UnaryOp::Neg => "-",
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    And,
    Or,
    Xor,

    // Pattern matching; `NOT LIKE` arrives as `Unary(Not, Binary(Like, ..))`
    Like,
}

impl BinaryOp {
    /// The operator as it appears in filter source text.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Xor => "XOR",
            BinaryOp::Like => "LIKE",
        }
    }
}

//! Structured, located evaluation errors.
//!
//! Errors are values in this engine: they travel inside
//! [`EvaluationResult`](super::EvaluationResult) rather than unwinding the
//! evaluation, so a partially-evaluated expression can still report where in
//! the filter text the problem occurred. [`EvaluationContext`] binds the
//! current node's span and literal text to every error it constructs, so
//! call sites never thread location data by hand.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::value::CastFailure;
use crate::ast::{Span, SpannedExpr};

/// The kind of evaluation error. Closed set; stable contract for hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Attribute reference not present on the event.
    UnknownIdentifier,
    /// A value could not be coerced to the type an operator or function
    /// required.
    InvalidCast,
    /// Integer division or modulo with a zero divisor.
    DivisionByZero,
    /// A function's own argument-range or internal failure.
    FunctionExecutionError,
    /// Invariant violation (malformed tree); should never occur given a
    /// valid parser.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnknownIdentifier => "unknown identifier",
            ErrorKind::InvalidCast => "invalid cast",
            ErrorKind::DivisionByZero => "division by zero",
            ErrorKind::FunctionExecutionError => "function execution error",
            ErrorKind::Internal => "internal error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error produced during evaluation, located in the filter source text.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message} (in `{expression}` at offset {start}..{end})", start = .span.start, end = .span.end)]
pub struct EvaluationError {
    /// The kind of error.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub message: String,
    /// Byte range of the originating node in the expression text.
    pub span: Span,
    /// The literal substring the originating node was parsed from.
    pub expression: Arc<str>,
}

/// Per-node evaluation state: the current node's span and literal text,
/// exposed as a factory with one named constructor per error kind.
///
/// Created fresh for each node the evaluator visits; never shared across
/// concurrent evaluations.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    span: Span,
    expression: Arc<str>,
}

impl EvaluationContext {
    /// Bind the context to an AST node.
    pub fn node(expr: &SpannedExpr) -> Self {
        Self {
            span: expr.span.clone(),
            expression: expr.text.clone(),
        }
    }

    /// The span of the node under evaluation.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// The literal source text of the node under evaluation.
    pub fn expression_text(&self) -> &str {
        &self.expression
    }

    fn error(&self, kind: ErrorKind, message: String) -> EvaluationError {
        EvaluationError {
            kind,
            message,
            span: self.span.clone(),
            expression: self.expression.clone(),
        }
    }

    /// Attribute reference not found on the event.
    pub fn unknown_identifier(&self, name: &str) -> EvaluationError {
        self.error(
            ErrorKind::UnknownIdentifier,
            format!("no attribute named \"{}\" on this event", name),
        )
    }

    /// A coercion required by an operator or function failed.
    pub fn invalid_cast(&self, failure: CastFailure) -> EvaluationError {
        self.error(ErrorKind::InvalidCast, failure.to_string())
    }

    /// Integer division with a zero divisor.
    pub fn division_by_zero(&self) -> EvaluationError {
        self.error(ErrorKind::DivisionByZero, "division by zero".to_string())
    }

    /// Integer modulo with a zero divisor.
    pub fn modulo_by_zero(&self) -> EvaluationError {
        self.error(ErrorKind::DivisionByZero, "modulo by zero".to_string())
    }

    /// A function failed on its own terms (argument range, internal limit).
    pub fn function_execution_error(
        &self,
        function: &str,
        detail: impl fmt::Display,
    ) -> EvaluationError {
        self.error(
            ErrorKind::FunctionExecutionError,
            format!("{} failed: {}", function, detail),
        )
    }

    /// Invariant violation that a valid parser should make impossible.
    pub fn internal(&self, message: impl Into<String>) -> EvaluationError {
        self.error(ErrorKind::Internal, message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Spanned};
    use crate::eval::Value;

    fn context() -> EvaluationContext {
        let node = Spanned::new(Expr::Attribute("source".into()), 3..9, "source");
        EvaluationContext::node(&node)
    }

    #[test]
    fn errors_carry_location() {
        let err = context().unknown_identifier("source");
        assert_eq!(err.kind, ErrorKind::UnknownIdentifier);
        assert_eq!(err.span, 3..9);
        assert_eq!(&*err.expression, "source");
    }

    #[test]
    fn display_includes_kind_text_and_span() {
        let err = context().division_by_zero();
        let rendered = err.to_string();
        assert!(rendered.contains("division by zero"));
        assert!(rendered.contains("`source`"));
        assert!(rendered.contains("3..9"));
    }

    #[test]
    fn invalid_cast_wraps_failure_detail() {
        let failure = Value::string("yes")
            .coerce(crate::eval::TypeTag::Boolean)
            .unwrap_err();
        let err = context().invalid_cast(failure);
        assert_eq!(err.kind, ErrorKind::InvalidCast);
        assert!(err.message.contains("\"yes\""));
    }

    #[test]
    fn modulo_shares_the_division_kind() {
        assert_eq!(context().modulo_by_zero().kind, ErrorKind::DivisionByZero);
    }
}

//! esql-core: a typed filter-expression engine for structured events.
//!
//! Filter expressions decide, per event, whether the event matches a
//! predicate, the building block of event routing and subscription
//! filtering. This crate is the evaluation engine: it takes an already
//! parsed expression tree (the grammar front-end is a separate concern) and
//! evaluates it against one event at a time, producing a boolean verdict or
//! a structured error that points back at the exact piece of filter text
//! that failed.
//!
//! # Quick start
//!
//! ```
//! use esql_core::{
//!     BinaryOp, EvaluationRuntime, Expr, MapEvent, Spanned, Value,
//! };
//!
//! // RIGHT(subject, 3) = 'log'   (trees normally come from the parser)
//! let expr = Spanned::new(
//!     Expr::Binary {
//!         op: BinaryOp::Eq,
//!         left: Box::new(Spanned::new(
//!             Expr::Call {
//!                 name: "RIGHT".into(),
//!                 args: vec![
//!                     Spanned::new(Expr::Attribute("subject".into()), 6..13, "subject"),
//!                     Spanned::new(Expr::Literal(Value::Integer(3)), 15..16, "3"),
//!                 ],
//!             },
//!             0..17,
//!             "RIGHT(subject, 3)",
//!         )),
//!         right: Box::new(Spanned::new(
//!             Expr::Literal(Value::string("log")),
//!             20..25,
//!             "'log'",
//!         )),
//!     },
//!     0..25,
//!     "RIGHT(subject, 3) = 'log'",
//! );
//!
//! let runtime = EvaluationRuntime::new();
//! let event = MapEvent::new().with_attribute("subject", "access.log");
//! assert_eq!(runtime.evaluate(&expr, &event).value(), &Value::Boolean(true));
//! ```
//!
//! # Architecture
//!
//! - [`ast`]: the expression node model (literals, attribute references,
//!   operators, function calls), each node carrying its source span and text
//! - [`event`]: the read-only attribute lookup seam to the host's event model
//! - [`eval`]: values and coercion, the evaluator, the function library, and
//!   the structured error taxonomy
//!
//! Trees, the function table, and coercion rules are immutable; a runtime
//! can evaluate the same tree concurrently against any number of events.
//!
//! # Errors are values
//!
//! Expected semantic failures (unknown attribute, impossible cast, division
//! by zero, a function rejecting its argument) never unwind. They ride
//! inside [`EvaluationResult`] next to a best-effort value, which is what
//! lets `OR`/`AND` short-circuit across partially-failed operands and lets
//! the final result still name the exact source location of the problem.

pub mod ast;
pub mod event;
pub mod eval;

pub use ast::{BinaryOp, Expr, Span, Spanned, SpannedExpr, UnaryOp};
pub use event::{ChainedEvent, EmptyEvent, Event, MapEvent};
pub use eval::{
    CastFailure, ErrorKind, EvaluationContext, EvaluationError, EvaluationResult,
    EvaluationRuntime, Evaluator, Function, FunctionImpl, FunctionTable, TypeTag, Value,
    STANDARD_LIBRARY,
};

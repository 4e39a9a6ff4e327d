//! Filter-expression evaluation engine.
//!
//! This module provides the runtime half of the filter language:
//!
//! - [`Value`] is the closed set of runtime types with the fixed coercion
//!   rules between them
//! - [`EvaluationResult`] carries a value together with an optional located
//!   error; errors are values here, never unwinding
//! - [`EvaluationContext`] binds a node's source span and text to every
//!   error constructed while that node evaluates
//! - [`FunctionTable`] and [`STANDARD_LIBRARY`] hold the built-in functions
//! - [`Evaluator`] walks the tree; [`EvaluationRuntime`] is the public
//!   entry point
//!
//! # Example
//!
//! ```
//! use esql_core::{EvaluationRuntime, Expr, MapEvent, Spanned, Value};
//!
//! // type = "order.created"   (trees normally come from the parser)
//! let expr = Spanned::new(
//!     Expr::Binary {
//!         op: esql_core::BinaryOp::Eq,
//!         left: Box::new(Spanned::new(Expr::Attribute("type".into()), 0..4, "type")),
//!         right: Box::new(Spanned::new(
//!             Expr::Literal(Value::string("order.created")),
//!             7..22,
//!             "'order.created'",
//!         )),
//!     },
//!     0..22,
//!     "type = 'order.created'",
//! );
//!
//! let event = MapEvent::new().with_attribute("type", "order.created");
//! let runtime = EvaluationRuntime::new();
//! let result = runtime.evaluate(&expr, &event);
//! assert_eq!(result.value(), &Value::Boolean(true));
//! ```

mod error;
mod evaluator;
mod functions;
mod result;
mod runtime;
mod stdlib;
mod value;

pub use error::{ErrorKind, EvaluationContext, EvaluationError};
pub use evaluator::Evaluator;
pub use functions::{Function, FunctionImpl, FunctionTable};
pub use result::EvaluationResult;
pub use runtime::EvaluationRuntime;
pub use stdlib::STANDARD_LIBRARY;
pub use value::{CastFailure, TypeTag, Value};

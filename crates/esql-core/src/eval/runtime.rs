//! The evaluation runtime, the engine's sole public entry point.

use std::sync::Arc;

use super::evaluator::Evaluator;
use super::functions::FunctionTable;
use super::result::EvaluationResult;
use super::stdlib::STANDARD_LIBRARY;
use crate::ast::SpannedExpr;
use crate::event::Event;

/// Evaluates parsed filter expressions against events.
///
/// The runtime owns nothing mutable: it carries a shared, immutable function
/// table and dispatches the tree walk. One runtime can serve any number of
/// concurrent `evaluate` calls over any number of trees.
#[derive(Debug, Clone)]
pub struct EvaluationRuntime {
    functions: Arc<FunctionTable>,
}

impl EvaluationRuntime {
    /// A runtime using the standard built-in function library.
    pub fn new() -> Self {
        Self {
            functions: STANDARD_LIBRARY.clone(),
        }
    }

    /// A runtime with a custom function table, fixed for its lifetime.
    pub fn with_functions(functions: FunctionTable) -> Self {
        Self {
            functions: Arc::new(functions),
        }
    }

    /// The function table call nodes dispatch through.
    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Evaluate one expression tree against one event.
    ///
    /// Returns the filter's verdict (ideally a Boolean) or a structured
    /// error locating the failure in the filter source text. Hosts should
    /// treat an error as "filter did not match" and log the diagnostic.
    pub fn evaluate(&self, expr: &SpannedExpr, event: &dyn Event) -> EvaluationResult {
        Evaluator::new(event, &self.functions).eval(expr)
    }
}

impl Default for EvaluationRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Spanned};
    use crate::eval::{EvaluationResult, Function, TypeTag, Value};
    use crate::event::MapEvent;

    #[test]
    fn default_runtime_has_the_standard_library() {
        let runtime = EvaluationRuntime::new();
        assert!(runtime.functions().contains("LENGTH"));
        assert!(runtime.functions().contains("right"));
    }

    #[test]
    fn runtime_is_reusable_across_events() {
        let runtime = EvaluationRuntime::new();
        let expr = Spanned::new(Expr::Attribute("type".into()), 0..4, "type");

        let a = MapEvent::new().with_attribute("type", "a");
        let b = MapEvent::new().with_attribute("type", "b");
        assert_eq!(runtime.evaluate(&expr, &a).value(), &Value::string("a"));
        assert_eq!(runtime.evaluate(&expr, &b).value(), &Value::string("b"));
    }

    #[test]
    fn custom_function_table() {
        let mut table = FunctionTable::new();
        table.register(Function::fixed(
            "ANSWER",
            vec![],
            TypeTag::Integer,
            |_, _| EvaluationResult::of(Value::Integer(42)),
        ));
        let runtime = EvaluationRuntime::with_functions(table);

        let expr = Spanned::new(
            Expr::Call {
                name: "ANSWER".into(),
                args: vec![],
            },
            0..8,
            "ANSWER()",
        );
        assert_eq!(
            runtime.evaluate(&expr, &MapEvent::new()).value(),
            &Value::Integer(42)
        );
        // The standard library is absent from a custom table.
        assert!(!runtime.functions().contains("LENGTH"));
    }
}

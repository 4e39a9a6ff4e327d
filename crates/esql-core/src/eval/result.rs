//! The engine's uniform evaluation outcome type.

use super::error::EvaluationError;
use super::value::Value;

/// The outcome of evaluating one expression node: a value, with an optional
/// deferred error.
///
/// Once an error is attached the value is advisory only: a best-effort
/// placeholder of the type the node was expected to produce. Strict callers
/// must not trust it; the boolean combinators inspect it to decide
/// short-circuiting, which is exactly why it exists. This two-field shape
/// lets error information flow up through the tree without unwinding, so the
/// final result always knows where in the source text evaluation went wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    value: Value,
    error: Option<EvaluationError>,
}

impl EvaluationResult {
    /// A successful result.
    pub fn of(value: Value) -> Self {
        Self { value, error: None }
    }

    /// A failed result carrying a best-effort placeholder value.
    pub fn of_error(best_effort: Value, error: EvaluationError) -> Self {
        Self {
            value: best_effort,
            error: Some(error),
        }
    }

    /// The carried value. Advisory only when [`error`](Self::error) is set.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The deferred error, if evaluation failed somewhere in the subtree.
    pub fn error(&self) -> Option<&EvaluationError> {
        self.error.as_ref()
    }

    /// Whether an error is attached.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Split into value and error.
    pub fn into_parts(self) -> (Value, Option<EvaluationError>) {
        (self.value, self.error)
    }

    /// Collapse into a strict `Result`, discarding the best-effort value on
    /// failure. This is the view host systems usually want.
    pub fn into_result(self) -> Result<Value, EvaluationError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.value),
        }
    }
}

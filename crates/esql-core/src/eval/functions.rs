//! Function signatures and the registry the evaluator dispatches through.
//!
//! Every built-in function is registered with its declared parameter types
//! and return type. The evaluator coerces already-evaluated argument values
//! to the declared types before invoking the implementation, so function
//! bodies only ever see values of the right shape.

use std::collections::HashMap;
use std::sync::Arc;

use super::error::EvaluationContext;
use super::result::EvaluationResult;
use super::value::{TypeTag, Value};

/// A function implementation.
///
/// Receives the call node's evaluation context (for error attribution) and
/// the argument values, already coerced to the declared parameter types.
pub type FunctionImpl =
    Arc<dyn Fn(&EvaluationContext, &[Value]) -> EvaluationResult + Send + Sync>;

/// A built-in function: signature plus implementation.
#[derive(Clone)]
pub struct Function {
    /// Canonical (uppercase) name.
    name: String,
    /// Declared positional parameter types.
    params: Vec<TypeTag>,
    /// Type of trailing arguments for variadic functions.
    variadic: Option<TypeTag>,
    /// Declared return type.
    result: TypeTag,
    /// The implementation.
    implementation: FunctionImpl,
}

impl Function {
    /// Declare a fixed-arity function.
    pub fn fixed<F>(name: &str, params: Vec<TypeTag>, result: TypeTag, implementation: F) -> Self
    where
        F: Fn(&EvaluationContext, &[Value]) -> EvaluationResult + Send + Sync + 'static,
    {
        Self {
            name: name.to_ascii_uppercase(),
            params,
            variadic: None,
            result,
            implementation: Arc::new(implementation),
        }
    }

    /// Declare a function accepting any number of trailing `tail`-typed
    /// arguments after its positional parameters.
    pub fn variadic<F>(
        name: &str,
        params: Vec<TypeTag>,
        tail: TypeTag,
        result: TypeTag,
        implementation: F,
    ) -> Self
    where
        F: Fn(&EvaluationContext, &[Value]) -> EvaluationResult + Send + Sync + 'static,
    {
        Self {
            name: name.to_ascii_uppercase(),
            params,
            variadic: Some(tail),
            result,
            implementation: Arc::new(implementation),
        }
    }

    /// Canonical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared return type.
    pub fn result_type(&self) -> TypeTag {
        self.result
    }

    /// Whether a call with `arity` arguments matches this signature.
    pub fn arity_matches(&self, arity: usize) -> bool {
        match self.variadic {
            Some(_) => arity >= self.params.len(),
            None => arity == self.params.len(),
        }
    }

    /// The declared type of the argument at `index`, if the signature
    /// covers it.
    pub fn param_type(&self, index: usize) -> Option<TypeTag> {
        self.params.get(index).copied().or(self.variadic)
    }

    /// Invoke the implementation with already-coerced arguments.
    pub fn invoke(&self, ctx: &EvaluationContext, args: &[Value]) -> EvaluationResult {
        (self.implementation)(ctx, args)
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("variadic", &self.variadic)
            .field("result", &self.result)
            .finish()
    }
}

/// Registry of functions available during evaluation.
///
/// Names are case-insensitive; lookup is by canonical uppercase name plus
/// argument count. The standard table is built once at process start and
/// never mutated afterwards; hosts that need a different function set build
/// their own table before handing it to the runtime.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: HashMap<String, Vec<Function>>,
}

impl FunctionTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under its canonical name.
    pub fn register(&mut self, function: Function) {
        self.functions
            .entry(function.name.clone())
            .or_default()
            .push(function);
    }

    /// Resolve a call target by name (case-insensitive) and argument count.
    ///
    /// A fixed-arity signature wins over a variadic one when both match.
    pub fn resolve(&self, name: &str, arity: usize) -> Option<&Function> {
        let canonical = name.to_ascii_uppercase();
        let candidates = self.functions.get(&canonical)?;
        candidates
            .iter()
            .find(|f| f.variadic.is_none() && f.arity_matches(arity))
            .or_else(|| candidates.iter().find(|f| f.arity_matches(arity)))
    }

    /// Check if any signature exists under the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_ascii_uppercase())
    }

    /// Number of distinct function names.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Iterate over all registered signatures.
    pub fn iter(&self) -> impl Iterator<Item = &Function> {
        self.functions.values().flatten()
    }
}

//! Tree-walking evaluator for filter expressions.
//!
//! The evaluator performs a depth-first traversal of the AST, producing an
//! [`EvaluationResult`] per node. It implements:
//!
//! - implicit coercion at operator and argument boundaries
//! - short-circuit evaluation for `AND` and `OR`, driven by the normalized
//!   operand's best-effort value
//! - error propagation without unwinding (errors are carried, not thrown)
//! - function dispatch through the registry
//!
//! Each call is a pure function of (tree, event): no state survives between
//! evaluations and nothing shared is mutated, so one evaluator-per-call can
//! run on any number of threads against the same tree.

use std::cmp::Ordering;

use regex::Regex;

use super::error::{EvaluationContext, EvaluationError};
use super::functions::FunctionTable;
use super::result::EvaluationResult;
use super::value::{TypeTag, Value};
use crate::ast::{BinaryOp, Expr, SpannedExpr, UnaryOp};
use crate::event::Event;

/// The filter-expression evaluator.
///
/// Borrows the event under evaluation and the function registry; holds no
/// mutable state of its own.
pub struct Evaluator<'a> {
    event: &'a dyn Event,
    functions: &'a FunctionTable,
}

impl<'a> Evaluator<'a> {
    /// Create a new evaluator.
    pub fn new(event: &'a dyn Event, functions: &'a FunctionTable) -> Self {
        Self { event, functions }
    }

    /// Evaluate an expression node.
    pub fn eval(&self, expr: &SpannedExpr) -> EvaluationResult {
        let ctx = EvaluationContext::node(expr);
        match &expr.node {
            Expr::Literal(value) => EvaluationResult::of(value.clone()),

            // Absent attributes behave as a falsy placeholder under boolean
            // contexts while still signalling an error to strict callers.
            Expr::Attribute(name) => match self.event.attribute(name) {
                Some(value) => EvaluationResult::of(value),
                None => EvaluationResult::of_error(
                    Value::Boolean(false),
                    ctx.unknown_identifier(name),
                ),
            },

            Expr::Exists(name) => {
                EvaluationResult::of(Value::Boolean(self.event.has_attribute(name)))
            }

            Expr::Unary { op, expr: operand } => self.eval_unary(&ctx, *op, operand),
            Expr::Binary { op, left, right } => self.eval_binary(&ctx, *op, left, right),
            Expr::In { needle, haystack } => self.eval_in(&ctx, needle, haystack),
            Expr::Call { name, args } => self.eval_call(&ctx, name, args),
        }
    }

    // ==================== Coercion helpers ====================

    /// Normalize a child result to the given type.
    ///
    /// An error already carried by the child is kept (the first error wins)
    /// and the coerced value stays available for short-circuit decisions; a
    /// failed coercion surfaces as `InvalidCast` with the type's zero value
    /// as best-effort placeholder.
    fn coerce_result(
        &self,
        ctx: &EvaluationContext,
        result: EvaluationResult,
        to: TypeTag,
    ) -> EvaluationResult {
        let (value, error) = result.into_parts();
        match value.coerce(to) {
            Ok(coerced) => match error {
                Some(err) => EvaluationResult::of_error(coerced, err),
                None => EvaluationResult::of(coerced),
            },
            Err(failure) => {
                let err = error.unwrap_or_else(|| ctx.invalid_cast(failure));
                EvaluationResult::of_error(to.zero_value(), err)
            }
        }
    }

    fn coerce_bool(&self, ctx: &EvaluationContext, value: &Value) -> Result<bool, EvaluationError> {
        match value.coerce(TypeTag::Boolean) {
            Ok(Value::Boolean(b)) => Ok(b),
            Ok(_) => Err(ctx.internal("boolean coercion produced a non-boolean")),
            Err(failure) => Err(ctx.invalid_cast(failure)),
        }
    }

    fn coerce_int(&self, ctx: &EvaluationContext, value: &Value) -> Result<i32, EvaluationError> {
        match value.coerce(TypeTag::Integer) {
            Ok(Value::Integer(i)) => Ok(i),
            Ok(_) => Err(ctx.internal("integer coercion produced a non-integer")),
            Err(failure) => Err(ctx.invalid_cast(failure)),
        }
    }

    // ==================== Operators ====================

    fn eval_unary(
        &self,
        ctx: &EvaluationContext,
        op: UnaryOp,
        operand: &SpannedExpr,
    ) -> EvaluationResult {
        let result = self.eval(operand);
        if result.is_error() {
            // Errors short-circuit unary operators, propagated unchanged.
            return result;
        }

        match op {
            UnaryOp::Not => match self.coerce_bool(ctx, result.value()) {
                Ok(b) => EvaluationResult::of(Value::Boolean(!b)),
                Err(err) => EvaluationResult::of_error(Value::Boolean(false), err),
            },
            UnaryOp::Neg => match self.coerce_int(ctx, result.value()) {
                Ok(n) => EvaluationResult::of(Value::Integer(n.wrapping_neg())),
                Err(err) => EvaluationResult::of_error(Value::Integer(0), err),
            },
        }
    }

    fn eval_binary(
        &self,
        ctx: &EvaluationContext,
        op: BinaryOp,
        left: &SpannedExpr,
        right: &SpannedExpr,
    ) -> EvaluationResult {
        // Short-circuit evaluation for AND and OR
        match op {
            BinaryOp::And => return self.eval_and(ctx, left, right),
            BinaryOp::Or => return self.eval_or(ctx, left, right),
            _ => {}
        }

        match op {
            BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Mod => self.eval_arithmetic(ctx, op, left, right),

            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => self.eval_comparison(ctx, op, left, right),

            BinaryOp::Xor => self.eval_xor(ctx, left, right),
            BinaryOp::Like => self.eval_like(ctx, left, right),

            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }

    /// `OR` short-circuits on a truthy left operand, including an
    /// error-carrying result whose best-effort value is `true`, which is
    /// returned unchanged without evaluating the right operand.
    fn eval_or(
        &self,
        ctx: &EvaluationContext,
        left: &SpannedExpr,
        right: &SpannedExpr,
    ) -> EvaluationResult {
        let left = self.coerce_result(ctx, self.eval(left), TypeTag::Boolean);
        if matches!(left.value(), Value::Boolean(true)) {
            return left;
        }
        self.coerce_result(ctx, self.eval(right), TypeTag::Boolean)
    }

    /// Dual of [`eval_or`](Self::eval_or): short-circuits on a falsy left
    /// operand.
    fn eval_and(
        &self,
        ctx: &EvaluationContext,
        left: &SpannedExpr,
        right: &SpannedExpr,
    ) -> EvaluationResult {
        let left = self.coerce_result(ctx, self.eval(left), TypeTag::Boolean);
        if matches!(left.value(), Value::Boolean(false)) {
            return left;
        }
        self.coerce_result(ctx, self.eval(right), TypeTag::Boolean)
    }

    /// `XOR` cannot short-circuit: both sides are always evaluated and
    /// normalized, with the left error winning.
    fn eval_xor(
        &self,
        ctx: &EvaluationContext,
        left: &SpannedExpr,
        right: &SpannedExpr,
    ) -> EvaluationResult {
        let left = self.coerce_result(ctx, self.eval(left), TypeTag::Boolean);
        let right = self.coerce_result(ctx, self.eval(right), TypeTag::Boolean);
        if left.is_error() {
            return left;
        }
        if right.is_error() {
            return right;
        }
        match (left.value(), right.value()) {
            (Value::Boolean(a), Value::Boolean(b)) => {
                EvaluationResult::of(Value::Boolean(a ^ b))
            }
            _ => EvaluationResult::of_error(
                Value::Boolean(false),
                ctx.internal("boolean normalization produced a non-boolean"),
            ),
        }
    }

    fn eval_arithmetic(
        &self,
        ctx: &EvaluationContext,
        op: BinaryOp,
        left: &SpannedExpr,
        right: &SpannedExpr,
    ) -> EvaluationResult {
        let left = self.eval(left);
        let right = self.eval(right);
        if left.is_error() {
            return left;
        }
        if right.is_error() {
            return right;
        }

        let a = match self.coerce_int(ctx, left.value()) {
            Ok(v) => v,
            Err(err) => return EvaluationResult::of_error(Value::Integer(0), err),
        };
        let b = match self.coerce_int(ctx, right.value()) {
            Ok(v) => v,
            Err(err) => return EvaluationResult::of_error(Value::Integer(0), err),
        };

        let computed = match op {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div => {
                if b == 0 {
                    return EvaluationResult::of_error(
                        Value::Integer(0),
                        ctx.division_by_zero(),
                    );
                }
                a.wrapping_div(b)
            }
            BinaryOp::Mod => {
                if b == 0 {
                    return EvaluationResult::of_error(
                        Value::Integer(0),
                        ctx.modulo_by_zero(),
                    );
                }
                a.wrapping_rem(b)
            }
            _ => {
                return EvaluationResult::of_error(
                    Value::Integer(0),
                    ctx.internal("operator dispatched as arithmetic"),
                )
            }
        };
        EvaluationResult::of(Value::Integer(computed))
    }

    fn eval_comparison(
        &self,
        ctx: &EvaluationContext,
        op: BinaryOp,
        left: &SpannedExpr,
        right: &SpannedExpr,
    ) -> EvaluationResult {
        // Both operands are always evaluated; the left error wins.
        let left = self.eval(left);
        let right = self.eval(right);
        if left.is_error() {
            return left;
        }
        if right.is_error() {
            return right;
        }

        let (a, b) = match self.normalize_comparison_operands(
            ctx,
            left.into_parts().0,
            right.into_parts().0,
        ) {
            Ok(pair) => pair,
            Err(err) => return EvaluationResult::of_error(Value::Boolean(false), err),
        };

        let verdict = match op {
            BinaryOp::Eq => a == b,
            BinaryOp::Ne => a != b,
            op => {
                let Some(ordering) = a.compare(&b) else {
                    return EvaluationResult::of_error(
                        Value::Boolean(false),
                        ctx.internal("comparison operands failed to normalize to one type"),
                    );
                };
                match op {
                    BinaryOp::Lt => ordering == Ordering::Less,
                    BinaryOp::Le => ordering != Ordering::Greater,
                    BinaryOp::Gt => ordering == Ordering::Greater,
                    BinaryOp::Ge => ordering != Ordering::Less,
                    _ => {
                        return EvaluationResult::of_error(
                            Value::Boolean(false),
                            ctx.internal("operator dispatched as comparison"),
                        )
                    }
                }
            }
        };
        EvaluationResult::of(Value::Boolean(verdict))
    }

    /// Bring two operands to one type before comparing.
    ///
    /// Same-type pairs compare natively. When exactly one side is a String,
    /// the String side is cast to the other side's type (the one
    /// unambiguous direction in the coercion table) and a failing cast is
    /// an `InvalidCast`. Any other mixed pair has no preferred direction and
    /// compares by canonical string form.
    fn normalize_comparison_operands(
        &self,
        ctx: &EvaluationContext,
        a: Value,
        b: Value,
    ) -> Result<(Value, Value), EvaluationError> {
        if a.type_tag() == b.type_tag() {
            return Ok((a, b));
        }
        match (a.type_tag(), b.type_tag()) {
            (TypeTag::String, to) => {
                let a = a.coerce(to).map_err(|f| ctx.invalid_cast(f))?;
                Ok((a, b))
            }
            (to, TypeTag::String) => {
                let b = b.coerce(to).map_err(|f| ctx.invalid_cast(f))?;
                Ok((a, b))
            }
            _ => Ok((
                Value::String(a.canonical_string()),
                Value::String(b.canonical_string()),
            )),
        }
    }

    /// Set membership: needle first, then members left to right, stopping at
    /// the first error or the first match.
    fn eval_in(
        &self,
        ctx: &EvaluationContext,
        needle: &SpannedExpr,
        haystack: &[SpannedExpr],
    ) -> EvaluationResult {
        let needle = self.eval(needle);
        if needle.is_error() {
            return needle;
        }
        let needle_value = needle.into_parts().0;

        for member in haystack {
            let member = self.eval(member);
            if member.is_error() {
                return member;
            }
            let (a, b) = match self.normalize_comparison_operands(
                ctx,
                needle_value.clone(),
                member.into_parts().0,
            ) {
                Ok(pair) => pair,
                Err(err) => return EvaluationResult::of_error(Value::Boolean(false), err),
            };
            if a == b {
                return EvaluationResult::of(Value::Boolean(true));
            }
        }
        EvaluationResult::of(Value::Boolean(false))
    }

    fn eval_like(
        &self,
        ctx: &EvaluationContext,
        left: &SpannedExpr,
        right: &SpannedExpr,
    ) -> EvaluationResult {
        let left = self.eval(left);
        let right = self.eval(right);
        if left.is_error() {
            return left;
        }
        if right.is_error() {
            return right;
        }

        // String coercion is total, so both sides always pattern-match.
        let text = left.value().canonical_string();
        let pattern = right.value().canonical_string();

        let regex = match Regex::new(&like_to_regex(&pattern)) {
            Ok(re) => re,
            Err(e) => {
                return EvaluationResult::of_error(
                    Value::Boolean(false),
                    ctx.internal(format!("pattern translation produced an invalid regex: {}", e)),
                )
            }
        };
        EvaluationResult::of(Value::Boolean(regex.is_match(&text)))
    }

    // ==================== Function calls ====================

    fn eval_call(
        &self,
        ctx: &EvaluationContext,
        name: &str,
        args: &[SpannedExpr],
    ) -> EvaluationResult {
        // Arity and shape are validated at parse time; a resolution miss
        // here means the tree and the registry disagree.
        let Some(function) = self.functions.resolve(name, args.len()) else {
            return EvaluationResult::of_error(
                Value::Boolean(false),
                ctx.internal(format!(
                    "no function {} taking {} arguments",
                    name.to_ascii_uppercase(),
                    args.len()
                )),
            );
        };

        let mut values = Vec::with_capacity(args.len());
        for (index, arg) in args.iter().enumerate() {
            let result = self.eval(arg);
            if result.is_error() {
                // First failing argument propagates; the function is never
                // invoked.
                return result;
            }
            let value = result.into_parts().0;

            let Some(declared) = function.param_type(index) else {
                return EvaluationResult::of_error(
                    function.result_type().zero_value(),
                    ctx.internal(format!(
                        "{} has no declared type for argument {}",
                        function.name(),
                        index
                    )),
                );
            };
            match value.coerce(declared) {
                Ok(v) => values.push(v),
                Err(failure) => {
                    // Attributed to the argument's own span, not the call's.
                    let arg_ctx = EvaluationContext::node(arg);
                    return EvaluationResult::of_error(
                        function.result_type().zero_value(),
                        arg_ctx.invalid_cast(failure),
                    );
                }
            }
        }

        function.invoke(ctx, &values)
    }
}

/// Translate a `%`/`_` wildcard pattern into an anchored regex.
///
/// `\%` and `\_` are literal; a backslash before anything else stays a
/// literal backslash. `(?s)` lets `%` and `_` cross newlines.
fn like_to_regex(pattern: &str) -> String {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push_str("(?s)^");
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => re.push_str(".*"),
            '_' => re.push('.'),
            '\\' => match chars.next() {
                Some('%') => re.push('%'),
                Some('_') => re.push('_'),
                Some(other) => {
                    push_literal(&mut re, '\\');
                    push_literal(&mut re, other);
                }
                None => push_literal(&mut re, '\\'),
            },
            other => push_literal(&mut re, other),
        }
    }
    re.push('$');
    re
}

fn push_literal(re: &mut String, c: char) {
    let mut buf = [0u8; 4];
    re.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Spanned;
    use crate::eval::{ErrorKind, STANDARD_LIBRARY};
    use crate::event::{EmptyEvent, MapEvent};

    fn lit(value: Value) -> SpannedExpr {
        let text = value.to_string();
        let span = 0..text.len();
        Spanned::new(Expr::Literal(value), span, text)
    }

    fn attr(name: &str) -> SpannedExpr {
        Spanned::new(Expr::Attribute(name.to_string()), 0..name.len(), name)
    }

    fn binary(op: BinaryOp, left: SpannedExpr, right: SpannedExpr) -> SpannedExpr {
        let text = format!("{} {} {}", left.text, op.as_str(), right.text);
        let span = 0..text.len();
        Spanned::new(
            Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
            text,
        )
    }

    fn unary(op: UnaryOp, operand: SpannedExpr) -> SpannedExpr {
        let text = format!("{} {}", op.as_str(), operand.text);
        let span = 0..text.len();
        Spanned::new(
            Expr::Unary {
                op,
                expr: Box::new(operand),
            },
            span,
            text,
        )
    }

    fn eval(expr: &SpannedExpr, event: &dyn Event) -> EvaluationResult {
        Evaluator::new(event, &STANDARD_LIBRARY).eval(expr)
    }

    #[test]
    fn literal_and_attribute() {
        let event = MapEvent::new().with_attribute("type", "order.created");

        assert_eq!(
            eval(&lit(Value::Integer(7)), &event).value(),
            &Value::Integer(7)
        );
        assert_eq!(
            eval(&attr("type"), &event).value(),
            &Value::string("order.created")
        );

        let missing = eval(&attr("nope"), &event);
        assert_eq!(missing.value(), &Value::Boolean(false));
        assert_eq!(
            missing.error().map(|e| e.kind),
            Some(ErrorKind::UnknownIdentifier)
        );
    }

    #[test]
    fn exists_never_fails() {
        let event = MapEvent::new().with_attribute("subject", "x");
        let present = Spanned::new(Expr::Exists("subject".into()), 0..14, "EXISTS subject");
        let absent = Spanned::new(Expr::Exists("other".into()), 0..12, "EXISTS other");

        assert_eq!(eval(&present, &event).value(), &Value::Boolean(true));
        let result = eval(&absent, &event);
        assert!(!result.is_error());
        assert_eq!(result.value(), &Value::Boolean(false));
    }

    #[test]
    fn not_and_negation() {
        let result = eval(&unary(UnaryOp::Not, lit(Value::Boolean(true))), &EmptyEvent);
        assert_eq!(result.value(), &Value::Boolean(false));

        let result = eval(&unary(UnaryOp::Neg, lit(Value::Integer(3))), &EmptyEvent);
        assert_eq!(result.value(), &Value::Integer(-3));

        // NOT on a non-boolean fails the cast.
        let result = eval(&unary(UnaryOp::Not, lit(Value::Integer(1))), &EmptyEvent);
        assert_eq!(result.error().map(|e| e.kind), Some(ErrorKind::InvalidCast));
        assert_eq!(result.value(), &Value::Boolean(false));
    }

    #[test]
    fn arithmetic_basics() {
        let expr = binary(
            BinaryOp::Add,
            lit(Value::Integer(10)),
            lit(Value::Integer(5)),
        );
        assert_eq!(eval(&expr, &EmptyEvent).value(), &Value::Integer(15));

        // Strings holding integers coerce across arithmetic.
        let expr = binary(
            BinaryOp::Mul,
            lit(Value::string("6")),
            lit(Value::Integer(7)),
        );
        assert_eq!(eval(&expr, &EmptyEvent).value(), &Value::Integer(42));

        let expr = binary(
            BinaryOp::Add,
            lit(Value::string("six")),
            lit(Value::Integer(7)),
        );
        let result = eval(&expr, &EmptyEvent);
        assert_eq!(result.error().map(|e| e.kind), Some(ErrorKind::InvalidCast));
    }

    #[test]
    fn division_and_modulo_by_zero() {
        let expr = binary(
            BinaryOp::Div,
            lit(Value::Integer(10)),
            lit(Value::Integer(0)),
        );
        let result = eval(&expr, &EmptyEvent);
        assert_eq!(
            result.error().map(|e| e.kind),
            Some(ErrorKind::DivisionByZero)
        );
        // The error spans the whole division expression.
        assert_eq!(result.error().map(|e| e.span.clone()), Some(0..6));
        assert_eq!(result.error().map(|e| &*e.expression), Some("10 / 0"));

        let expr = binary(
            BinaryOp::Mod,
            lit(Value::Integer(10)),
            lit(Value::Integer(0)),
        );
        assert_eq!(
            eval(&expr, &EmptyEvent).error().map(|e| e.kind),
            Some(ErrorKind::DivisionByZero)
        );
    }

    #[test]
    fn comparison_same_type() {
        let expr = binary(
            BinaryOp::Lt,
            lit(Value::Integer(3)),
            lit(Value::Integer(5)),
        );
        assert_eq!(eval(&expr, &EmptyEvent).value(), &Value::Boolean(true));

        let expr = binary(
            BinaryOp::Ne,
            lit(Value::string("a")),
            lit(Value::string("b")),
        );
        assert_eq!(eval(&expr, &EmptyEvent).value(), &Value::Boolean(true));
    }

    #[test]
    fn comparison_string_side_is_cast() {
        // "5" = 5: the String side casts to Integer.
        let expr = binary(
            BinaryOp::Eq,
            lit(Value::string("5")),
            lit(Value::Integer(5)),
        );
        assert_eq!(eval(&expr, &EmptyEvent).value(), &Value::Boolean(true));

        let expr = binary(
            BinaryOp::Gt,
            lit(Value::Integer(10)),
            lit(Value::string("9")),
        );
        assert_eq!(eval(&expr, &EmptyEvent).value(), &Value::Boolean(true));

        // An uncastable String side is an invalid cast, not a false verdict.
        let expr = binary(
            BinaryOp::Eq,
            lit(Value::string("high")),
            lit(Value::Integer(5)),
        );
        let result = eval(&expr, &EmptyEvent);
        assert_eq!(result.error().map(|e| e.kind), Some(ErrorKind::InvalidCast));
    }

    #[test]
    fn comparison_mixed_non_string_uses_canonical_form() {
        // Boolean vs Integer has no preferred direction; canonical text
        // forms differ, so equality is false without an error.
        let expr = binary(
            BinaryOp::Eq,
            lit(Value::Boolean(true)),
            lit(Value::Integer(1)),
        );
        let result = eval(&expr, &EmptyEvent);
        assert!(!result.is_error());
        assert_eq!(result.value(), &Value::Boolean(false));
    }

    #[test]
    fn or_short_circuits_on_truthy_left() {
        // missing OR true: the falsy placeholder forces the right side,
        // whose clean true hides the unknown-identifier error.
        let expr = binary(BinaryOp::Or, attr("missing"), lit(Value::Boolean(true)));
        let result = eval(&expr, &EmptyEvent);
        assert!(!result.is_error());
        assert_eq!(result.value(), &Value::Boolean(true));

        // true OR (10 / 0 = 1): the right side is never evaluated, so no
        // division error can appear.
        let div = binary(
            BinaryOp::Div,
            lit(Value::Integer(10)),
            lit(Value::Integer(0)),
        );
        let cmp = binary(BinaryOp::Eq, div, lit(Value::Integer(1)));
        let expr = binary(BinaryOp::Or, lit(Value::Boolean(true)), cmp);
        let result = eval(&expr, &EmptyEvent);
        assert!(!result.is_error());
        assert_eq!(result.value(), &Value::Boolean(true));
    }

    #[test]
    fn or_short_circuits_on_errored_truthy_left() {
        // RIGHT('true', -1) fails but carries the whole string as its
        // best-effort value, which normalizes to a truthy boolean: OR
        // returns immediately, error intact, without evaluating the right
        // side (whose division would otherwise fail too).
        let call = Spanned::new(
            Expr::Call {
                name: "RIGHT".into(),
                args: vec![lit(Value::string("true")), lit(Value::Integer(-1))],
            },
            0..17,
            "RIGHT('true', -1)",
        );
        let div = binary(
            BinaryOp::Div,
            lit(Value::Integer(1)),
            lit(Value::Integer(0)),
        );
        let cmp = binary(BinaryOp::Eq, div, lit(Value::Integer(1)));
        let expr = binary(BinaryOp::Or, call, cmp);

        let result = eval(&expr, &EmptyEvent);
        assert_eq!(result.value(), &Value::Boolean(true));
        assert_eq!(
            result.error().map(|e| e.kind),
            Some(ErrorKind::FunctionExecutionError)
        );
    }

    #[test]
    fn and_short_circuits_on_falsy_left() {
        let div = binary(
            BinaryOp::Div,
            lit(Value::Integer(1)),
            lit(Value::Integer(0)),
        );
        let cmp = binary(BinaryOp::Eq, div, lit(Value::Integer(1)));
        let expr = binary(BinaryOp::And, lit(Value::Boolean(false)), cmp);
        let result = eval(&expr, &EmptyEvent);
        assert!(!result.is_error());
        assert_eq!(result.value(), &Value::Boolean(false));

        // The missing attribute's falsy placeholder short-circuits AND while
        // keeping its error.
        let expr = binary(BinaryOp::And, attr("missing"), lit(Value::Boolean(true)));
        let result = eval(&expr, &EmptyEvent);
        assert_eq!(result.value(), &Value::Boolean(false));
        assert_eq!(
            result.error().map(|e| e.kind),
            Some(ErrorKind::UnknownIdentifier)
        );
    }

    #[test]
    fn xor_evaluates_both_sides() {
        let expr = binary(
            BinaryOp::Xor,
            lit(Value::Boolean(true)),
            lit(Value::Boolean(false)),
        );
        assert_eq!(eval(&expr, &EmptyEvent).value(), &Value::Boolean(true));

        let expr = binary(BinaryOp::Xor, lit(Value::Boolean(true)), attr("missing"));
        let result = eval(&expr, &EmptyEvent);
        assert_eq!(
            result.error().map(|e| e.kind),
            Some(ErrorKind::UnknownIdentifier)
        );
    }

    #[test]
    fn error_propagation_prefers_left() {
        let expr = binary(BinaryOp::Eq, attr("first"), attr("second"));
        let result = eval(&expr, &EmptyEvent);
        let err = result.error().expect("propagated");
        assert_eq!(err.kind, ErrorKind::UnknownIdentifier);
        assert_eq!(&*err.expression, "first");
    }

    #[test]
    fn like_patterns() {
        let cases = [
            ("access.log", "%.log", true),
            ("access.log", "access._og", true),
            ("access.log", "%.txt", false),
            ("100%", "100\\%", true),
            ("a.c", "a.c", true),
            // A regex metacharacter in the pattern is literal text.
            ("abc", "a.c", false),
        ];
        for (text, pattern, expected) in cases {
            let expr = binary(
                BinaryOp::Like,
                lit(Value::string(text)),
                lit(Value::string(pattern)),
            );
            assert_eq!(
                eval(&expr, &EmptyEvent).value(),
                &Value::Boolean(expected),
                "{:?} LIKE {:?}",
                text,
                pattern
            );
        }
    }

    #[test]
    fn in_membership() {
        let needle = attr("type");
        let haystack = vec![
            lit(Value::string("order.created")),
            lit(Value::string("order.deleted")),
        ];
        let expr = Spanned::new(
            Expr::In {
                needle: Box::new(needle),
                haystack,
            },
            0..40,
            "type IN ('order.created', 'order.deleted')",
        );

        let event = MapEvent::new().with_attribute("type", "order.deleted");
        assert_eq!(eval(&expr, &event).value(), &Value::Boolean(true));

        let event = MapEvent::new().with_attribute("type", "order.updated");
        assert_eq!(eval(&expr, &event).value(), &Value::Boolean(false));

        let result = eval(&expr, &EmptyEvent);
        assert_eq!(
            result.error().map(|e| e.kind),
            Some(ErrorKind::UnknownIdentifier)
        );
    }

    #[test]
    fn call_coerces_arguments_and_attributes_errors_to_spans() {
        // RIGHT(subject, "3"): the second argument coerces String to Integer.
        let expr = Spanned::new(
            Expr::Call {
                name: "right".into(),
                args: vec![attr("subject"), lit(Value::string("3"))],
            },
            0..19,
            "RIGHT(subject, '3')",
        );
        let event = MapEvent::new().with_attribute("subject", "access.log");
        assert_eq!(eval(&expr, &event).value(), &Value::string("log"));

        // An uncoercible argument reports against that argument's span.
        let bad = Spanned::new(
            Expr::Call {
                name: "RIGHT".into(),
                args: vec![
                    lit(Value::string("abc")),
                    Spanned::new(Expr::Literal(Value::string("many")), 12..18, "'many'"),
                ],
            },
            0..19,
            "RIGHT('abc', 'many')",
        );
        let result = eval(&bad, &EmptyEvent);
        let err = result.error().expect("cast failure");
        assert_eq!(err.kind, ErrorKind::InvalidCast);
        assert_eq!(err.span, 12..18);
    }

    #[test]
    fn call_with_failing_argument_never_invokes() {
        // LENGTH(missing): the unknown identifier propagates untouched.
        let expr = Spanned::new(
            Expr::Call {
                name: "LENGTH".into(),
                args: vec![attr("missing")],
            },
            0..15,
            "LENGTH(missing)",
        );
        let result = eval(&expr, &EmptyEvent);
        assert_eq!(
            result.error().map(|e| e.kind),
            Some(ErrorKind::UnknownIdentifier)
        );
    }

    #[test]
    fn unknown_function_is_internal() {
        let expr = Spanned::new(
            Expr::Call {
                name: "NO_SUCH_FN".into(),
                args: vec![],
            },
            0..12,
            "NO_SUCH_FN()",
        );
        let result = eval(&expr, &EmptyEvent);
        assert_eq!(result.error().map(|e| e.kind), Some(ErrorKind::Internal));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let expr = binary(
            BinaryOp::Or,
            attr("missing"),
            binary(
                BinaryOp::Eq,
                lit(Value::string("5")),
                lit(Value::Integer(5)),
            ),
        );
        let first = eval(&expr, &EmptyEvent);
        for _ in 0..10 {
            assert_eq!(eval(&expr, &EmptyEvent), first);
        }
    }
}

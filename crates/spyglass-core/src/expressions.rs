//! Condition and template expression surface
//!
//! The expression DSL compiler lives outside this core: probes arrive with
//! their conditions and template expressions already compiled to callables.
//! This module only defines the seam: an expression carries its source text
//! and an evaluation closure, and evaluation failures are explicit values,
//! never unwinding.

use crate::entities::RuntimeValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name-to-value bindings an expression is evaluated against
pub type Bindings = HashMap<String, RuntimeValue>;

/// Build bindings from ordered name/value pairs
pub fn bindings_from(pairs: &[(String, RuntimeValue)]) -> Bindings {
    pairs.iter().cloned().collect()
}

/// Failure while evaluating a compiled expression.
///
/// Carries the expression's source text so the failure can be reported
/// against what the user actually wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionError {
    pub source: String,
    pub message: String,
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to evaluate expression \"{}\": {}",
            self.source, self.message
        )
    }
}

impl std::error::Error for ExpressionError {}

type EvalFn = Arc<dyn Fn(&Bindings) -> std::result::Result<RuntimeValue, String> + Send + Sync>;

/// A compiled expression: source text plus its evaluation closure.
///
/// Used both for probe conditions (result interpreted by truthiness) and for
/// metric value / log template expressions (result used as a value).
#[derive(Clone)]
pub struct ProbeExpression {
    pub source: String,
    eval_fn: EvalFn,
}

impl ProbeExpression {
    pub fn new<F>(source: impl Into<String>, eval_fn: F) -> Self
    where
        F: Fn(&Bindings) -> std::result::Result<RuntimeValue, String> + Send + Sync + 'static,
    {
        Self {
            source: source.into(),
            eval_fn: Arc::new(eval_fn),
        }
    }

    /// Expression that resolves a single name from the bindings.
    ///
    /// Convenience for the most common compiled form; a missing name is an
    /// evaluation failure, as it would be in the target runtime.
    pub fn name_ref(name: impl Into<String>) -> Self {
        let name = name.into();
        let lookup = name.clone();
        Self::new(name, move |bindings| {
            bindings
                .get(&lookup)
                .cloned()
                .ok_or_else(|| format!("name '{}' is not defined", lookup))
        })
    }

    /// Evaluate against the given bindings.
    ///
    /// Failures come back as an [`ExpressionError`] tagged with this
    /// expression's source text; they never unwind.
    pub fn eval(&self, bindings: &Bindings) -> std::result::Result<RuntimeValue, ExpressionError> {
        (self.eval_fn)(bindings).map_err(|message| ExpressionError {
            source: self.source.clone(),
            message,
        })
    }
}

impl fmt::Debug for ProbeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeExpression")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// One segment of a log-message template.
///
/// Templates are sequences of literal text and embedded expressions; the
/// rendered message is their concatenation.
#[derive(Debug, Clone)]
pub enum TemplateSegment {
    Const(String),
    Expr(ProbeExpression),
}

impl TemplateSegment {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Const(text.into())
    }

    pub fn expression(expr: ProbeExpression) -> Self {
        Self::Expr(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_ok() {
        let expr = ProbeExpression::new("x > 0", |b| {
            Ok(RuntimeValue::Bool(matches!(b.get("x"), Some(RuntimeValue::Int(n)) if *n > 0)))
        });
        let bindings = bindings_from(&[("x".to_string(), RuntimeValue::Int(3))]);
        assert_eq!(expr.eval(&bindings), Ok(RuntimeValue::Bool(true)));
    }

    #[test]
    fn test_eval_error_carries_source() {
        let expr = ProbeExpression::new("missing.attr", |_| Err("no such attribute".to_string()));
        let err = expr.eval(&Bindings::new()).unwrap_err();
        assert_eq!(err.source, "missing.attr");
        assert_eq!(err.message, "no such attribute");
        assert!(err.to_string().contains("missing.attr"));
    }

    #[test]
    fn test_name_ref_resolves() {
        let expr = ProbeExpression::name_ref("user_id");
        let bindings = bindings_from(&[("user_id".to_string(), RuntimeValue::Int(7))]);
        assert_eq!(expr.eval(&bindings), Ok(RuntimeValue::Int(7)));
    }

    #[test]
    fn test_name_ref_missing_is_error() {
        let expr = ProbeExpression::name_ref("ghost");
        let err = expr.eval(&Bindings::new()).unwrap_err();
        assert!(err.message.contains("ghost"));
    }

    #[test]
    fn test_debug_does_not_expose_closure() {
        let expr = ProbeExpression::name_ref("x");
        let dbg = format!("{:?}", expr);
        assert!(dbg.contains("ProbeExpression"));
        assert!(dbg.contains("\"x\""));
    }
}

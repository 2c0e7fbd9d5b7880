//! Step evaluation: the seam between playback and language.
//!
//! [`Player`](crate::session::Player) is generic over [`Evaluator`], so the
//! playback loop never learns which language it is demonstrating.  The
//! built-in [`ExprEvaluator`] speaks the expression language in [`expr`];
//! tests drive the loop with canned backends through the same trait.

pub mod builtins;
pub mod expr;

use crate::scope::Scope;
use crate::value::Value;

/// What evaluating one step produced.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalOutcome {
    /// Expression result to print.
    Value(Value),
    /// Statement-shaped or comment-only step: print nothing.
    NoValue,
    /// Diagnostic text to print in the error style.
    Error(String),
}

/// A language backend for demo steps.
///
/// Implementations never panic on malformed input: a bad step becomes an
/// [`EvalOutcome::Error`] and playback continues with the next step.
pub trait Evaluator {
    /// One line identifying the backend, shown at the top of a session.
    fn banner(&self) -> String;

    /// Evaluate one step against the scope.
    fn evaluate(&mut self, text: &str, scope: &mut Scope) -> EvalOutcome;
}

/// The built-in expression language backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExprEvaluator;

impl ExprEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for ExprEvaluator {
    fn banner(&self) -> String {
        format!(
            "pianola {} on {} ({})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        )
    }

    fn evaluate(&mut self, text: &str, scope: &mut Scope) -> EvalOutcome {
        let expr = match expr::parse_step(text) {
            Ok(Some(expr)) => expr,
            Ok(None) => return EvalOutcome::NoValue,
            Err(e) => return EvalOutcome::Error(e),
        };
        let statement = expr.is_statement();
        match expr::eval_expr(&expr, scope) {
            Ok(_) if statement => EvalOutcome::NoValue,
            Ok(v) => EvalOutcome::Value(v),
            Err(e) => EvalOutcome::Error(e),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(text: &str, scope: &mut Scope) -> EvalOutcome {
        ExprEvaluator::new().evaluate(text, scope)
    }

    #[test]
    fn expression_yields_value() {
        let mut scope = Scope::new();
        assert_eq!(outcome("6 * 7", &mut scope), EvalOutcome::Value(Value::Int(42)));
    }

    #[test]
    fn assignment_yields_no_value() {
        let mut scope = Scope::new();
        assert_eq!(outcome("x = 5", &mut scope), EvalOutcome::NoValue);
        assert_eq!(scope.get("x"), Some(&Value::Int(5)));
    }

    #[test]
    fn comment_only_yields_no_value() {
        let mut scope = Scope::new();
        assert_eq!(outcome("# watch this", &mut scope), EvalOutcome::NoValue);
        assert!(scope.is_empty());
    }

    #[test]
    fn parse_failure_yields_error() {
        let mut scope = Scope::new();
        assert!(matches!(outcome("1 +", &mut scope), EvalOutcome::Error(_)));
    }

    #[test]
    fn runtime_failure_yields_error() {
        let mut scope = Scope::new();
        assert_eq!(
            outcome("1 / 0", &mut scope),
            EvalOutcome::Error("division by zero".into())
        );
    }

    #[test]
    fn integer_floor_edges_yield_values() {
        // i64::MIN is reachable through int(); negating it or taking its
        // absolute value widens to a float.
        let mut scope = Scope::new();
        assert_eq!(
            outcome("x = int(\"-9223372036854775808\")", &mut scope),
            EvalOutcome::NoValue
        );
        assert_eq!(scope.get("x"), Some(&Value::Int(i64::MIN)));
        let widened = EvalOutcome::Value(Value::Float(-(i64::MIN as f64)));
        assert_eq!(outcome("-x", &mut scope), widened);
        assert_eq!(outcome("abs(x)", &mut scope), widened);
        assert_eq!(outcome("-\"-9223372036854775808\"", &mut scope), widened);
    }

    #[test]
    fn failed_assignment_leaves_scope_alone() {
        let mut scope = Scope::new();
        assert!(matches!(outcome("x = 1 / 0", &mut scope), EvalOutcome::Error(_)));
        assert_eq!(scope.get("x"), None);
    }

    #[test]
    fn banner_names_the_backend() {
        assert!(ExprEvaluator::new().banner().starts_with("pianola "));
    }
}

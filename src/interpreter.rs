use rustc_hash::FxHashMap;

use crate::error::EvalError;
use crate::language::{ElementSet, Expr};

// ============================================================================
// Environment
// ============================================================================

/// How a name was bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// `NAME = expr`: the strict evaluation result, fixed at assignment time.
    Value(Expr),
    /// `NAME =: expr`: the raw expression, re-resolved against the current
    /// environment at every reference.
    Deferred(Expr),
}

impl Binding {
    pub fn expr(&self) -> &Expr {
        match self {
            Binding::Value(expr) | Binding::Deferred(expr) => expr,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Binding::Deferred(_))
    }
}

/// Name bindings for one calculator session.
///
/// Flat: the language has no scopes. One environment lives for the whole
/// session, grows by assignment and never shrinks. Rebinding a name replaces
/// the previous binding.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: FxHashMap<String, Binding>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn define(&mut self, name: impl Into<String>, binding: Binding) {
        self.bindings.insert(name.into(), binding);
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// ============================================================================
// Evaluator
// ============================================================================

/// Deferred bindings may reference themselves; resolution depth is capped so
/// a cycle fails the statement instead of the process. Legitimate reference
/// chains stay far below this.
const MAX_RESOLVE_DEPTH: usize = 256;

/// Evaluate an expression against an environment.
///
/// With `strict` set, a reference to an unbound name is an error. Otherwise
/// the free variable is echoed back unchanged and evaluation continues
/// around it, producing a partially reduced symbolic result.
pub fn eval(expr: &Expr, env: &Environment, strict: bool) -> Result<Expr, EvalError> {
    eval_at(expr, env, strict, 0)
}

fn eval_at(expr: &Expr, env: &Environment, strict: bool, depth: usize) -> Result<Expr, EvalError> {
    match expr {
        Expr::Constant(_) => Ok(expr.clone()),

        Expr::Set(elements) => {
            // Re-deduplicate: distinct elements may evaluate to equal
            // results, e.g. {A B} with A and B bound to the same set.
            let mut evaluated = ElementSet::new();
            for element in elements.iter() {
                evaluated.insert(eval_at(element, env, strict, depth)?);
            }
            Ok(Expr::Set(evaluated))
        }

        Expr::Variable(name) => match env.lookup(name) {
            // A binding's own definition is resolved leniently no matter how
            // strict the caller is. Deferred bindings get their re-resolve-
            // on-every-reference behavior here: the stored expression is
            // walked against the current environment, never cached.
            Some(binding) => {
                if depth >= MAX_RESOLVE_DEPTH {
                    return Err(EvalError::RecursionLimit { name: name.clone() });
                }
                eval_at(binding.expr(), env, false, depth + 1)
            }
            None if strict => Err(EvalError::UnboundVariable { name: name.clone() }),
            None => Ok(expr.clone()),
        },

        Expr::Op { kind, left, right } => {
            let left = eval_at(left, env, strict, depth)?;
            let right = eval_at(right, env, strict, depth)?;
            match (&left, &right) {
                (Expr::Set(l), Expr::Set(r)) => Ok(kind.apply(l, r)),
                _ if left == right => Ok(kind.apply_to_equal(left)),
                // Partial progress: rebuild the residual over whatever the
                // operands reduced to.
                _ => Ok(Expr::op(*kind, left, right)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::OpKind;
    use crate::parser::parse;

    fn ground(input: &str) -> Expr {
        parse(input).unwrap()
    }

    #[test]
    fn test_constant_evaluates_to_itself() {
        let env = Environment::new();
        assert_eq!(eval(&Expr::Constant(7), &env, true).unwrap(), Expr::Constant(7));
    }

    #[test]
    fn test_unbound_variable_strict_fails() {
        let env = Environment::new();
        let err = eval(&Expr::variable("A"), &env, true).unwrap_err();
        assert_eq!(
            err,
            EvalError::UnboundVariable {
                name: "A".to_string(),
            }
        );
    }

    #[test]
    fn test_unbound_variable_lenient_echoes() {
        let env = Environment::new();
        let expr = Expr::variable("A");
        assert_eq!(eval(&expr, &env, false).unwrap(), expr);
    }

    #[test]
    fn test_variable_resolves_through_binding() {
        let mut env = Environment::new();
        env.define("A", Binding::Value(ground("{1 2}")));
        assert_eq!(eval(&ground("A"), &env, true).unwrap(), ground("{1 2}"));
    }

    #[test]
    fn test_bound_definition_is_resolved_leniently() {
        // Strictness does not reach into a binding's own definition: a
        // deferred binding over a free name resolves to that free name.
        let mut env = Environment::new();
        env.define("Z", Binding::Deferred(ground("Q")));
        assert_eq!(eval(&ground("Z"), &env, true).unwrap(), ground("Q"));
    }

    #[test]
    fn test_set_elements_evaluate_and_rededuplicate() {
        let mut env = Environment::new();
        env.define("A", Binding::Value(ground("{1}")));
        env.define("B", Binding::Value(ground("{1}")));
        let result = eval(&ground("{A B}"), &env, true).unwrap();
        assert_eq!(result, ground("{{1}}"));
    }

    #[test]
    fn test_set_reduction() {
        let mut env = Environment::new();
        env.define("A", Binding::Value(ground("{1 2 3}")));
        env.define("B", Binding::Value(ground("{2 3 4}")));
        assert_eq!(eval(&ground("A n B"), &env, true).unwrap(), ground("{2 3}"));
        assert_eq!(eval(&ground("A u B"), &env, true).unwrap(), ground("{1 2 3 4}"));
        assert_eq!(eval(&ground(r"A \ B"), &env, true).unwrap(), ground("{1}"));
    }

    #[test]
    fn test_equal_symbolic_operands_simplify() {
        let env = Environment::new();
        assert_eq!(eval(&ground("A u A"), &env, false).unwrap(), ground("A"));
        assert_eq!(eval(&ground("A n A"), &env, false).unwrap(), ground("A"));
        assert_eq!(eval(&ground(r"A \ A"), &env, false).unwrap(), Expr::empty_set());
        assert_eq!(
            eval(&ground("A x A"), &env, false).unwrap(),
            Expr::op(OpKind::Product, Expr::variable("A"), Expr::variable("A"))
        );
    }

    #[test]
    fn test_residual_rebuild_over_free_variable() {
        let env = Environment::new();
        let result = eval(&ground("A u {1}"), &env, false).unwrap();
        assert_eq!(result, ground("A u {1}"));
        assert_eq!(result.to_string(), "(A u {1})");
    }

    #[test]
    fn test_partial_reduction_inside_residual() {
        // The reducible half still reduces even when the whole cannot.
        let mut env = Environment::new();
        env.define("B", Binding::Value(ground("{1}")));
        let result = eval(&ground("A u (B u {2})"), &env, false).unwrap();
        assert_eq!(result, ground("A u {1 2}"));
    }

    #[test]
    fn test_deferred_binding_tracks_rebinding() {
        let mut env = Environment::new();
        env.define("A", Binding::Value(ground("{1}")));
        env.define("B", Binding::Deferred(ground("A u {9}")));
        assert_eq!(eval(&ground("B"), &env, false).unwrap(), ground("{1 9}"));

        env.define("A", Binding::Value(ground("{2}")));
        assert_eq!(eval(&ground("B"), &env, false).unwrap(), ground("{2 9}"));
    }

    #[test]
    fn test_self_referential_binding_hits_depth_cap() {
        let mut env = Environment::new();
        env.define("X", Binding::Deferred(ground("X u {1}")));
        let err = eval(&ground("X"), &env, false).unwrap_err();
        assert_eq!(
            err,
            EvalError::RecursionLimit {
                name: "X".to_string(),
            }
        );
    }

    #[test]
    fn test_long_but_finite_chain_resolves() {
        let mut env = Environment::new();
        env.define("A", Binding::Value(ground("{1}")));
        env.define("B", Binding::Deferred(ground("A")));
        env.define("C", Binding::Deferred(ground("B")));
        env.define("D", Binding::Deferred(ground("C")));
        assert_eq!(eval(&ground("D"), &env, true).unwrap(), ground("{1}"));
    }
}

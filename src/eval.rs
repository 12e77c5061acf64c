// ABOUTME: The evaluator: `eval()` plus the primitive/function/macro application rules

use crate::env::Environment;
use crate::error::{LypsResult, RuntimeError};
use crate::value::{LFunction, LMacro, Primitive, PrimitiveFn, Value};
use std::rc::Rc;

/// Evaluates `expr` in `env` (spec.md section 4.3).
///
/// Self-evaluating: numbers, strings, the empty list, maps, functions,
/// macros, primitives. A symbol that resolves in `env` evaluates to its
/// bound value; an unbound symbol evaluates to itself rather than erroring
/// (this is what lets bare constant-like symbols be used without `quote`,
/// and is also what turns "calling an unbound symbol" into the ordinary
/// not-callable error below rather than a separate unbound-symbol error). A
/// non-empty list is a combination: its head is evaluated to find the
/// callable, then dispatched per the callable's own evaluation order.
pub fn eval(env: &Rc<Environment>, expr: &Value) -> LypsResult<Value> {
    match expr {
        Value::Symbol(name) => Ok(env.get(name).unwrap_or_else(|| expr.clone())),
        Value::List(items) => {
            let items = items.borrow();
            if items.is_empty() {
                return Ok(expr.clone());
            }
            let head = eval(env, &items[0])?;
            let rest = &items[1..];
            match head {
                Value::Primitive(p) => apply_primitive(env, p, rest),
                Value::Function(f) => apply_function(env, &f, rest),
                Value::Macro(m) => apply_macro(env, &m, rest),
                other => Err(RuntimeError::new(format!(
                    "{} should evaluate to a primitive or function",
                    other
                ))
                .into()),
            }
        }
        _ => Ok(expr.clone()),
    }
}

fn apply_primitive(env: &Rc<Environment>, p: &'static Primitive, arg_forms: &[Value]) -> LypsResult<Value> {
    match p.func {
        PrimitiveFn::Raw(f) => f(arg_forms, env),
        PrimitiveFn::Std(f) => {
            let args: Vec<Value> = arg_forms.iter().map(|a| eval(env, a)).collect::<LypsResult<_>>()?;
            f(env, &args)
        }
    }
}

/// Opens a child scope of the *caller's* current environment (not a
/// definition-site closure — see [`LFunction`]), binds params positionally
/// to the evaluated arguments (zip: extra args are dropped, missing params
/// are simply left unbound), evaluates the body in order and returns the
/// last expression's value.
fn apply_function(env: &Rc<Environment>, f: &Rc<LFunction>, arg_forms: &[Value]) -> LypsResult<Value> {
    let args: Vec<Value> = arg_forms.iter().map(|a| eval(env, a)).collect::<LypsResult<_>>()?;
    let scope = env.open_scope();
    for (param, arg) in f.params.iter().zip(args.into_iter()) {
        scope.define_local(param.clone(), arg);
    }
    let mut result = Value::nil();
    for expr in &f.body {
        result = eval(&scope, expr)?;
    }
    Ok(result)
}

/// Opens a child scope, binds params positionally to the *raw* (unevaluated)
/// argument forms, evaluates the macro body in that scope to produce a
/// template result, then evaluates that template result again — this time
/// in the caller's original environment, not the macro's scope.
fn apply_macro(env: &Rc<Environment>, m: &Rc<LMacro>, arg_forms: &[Value]) -> LypsResult<Value> {
    let scope = env.open_scope();
    for (param, form) in m.params.iter().zip(arg_forms.iter()) {
        scope.define_local(param.clone(), form.clone());
    }
    let mut expansion = Value::nil();
    for expr in &m.body {
        expansion = eval(&scope, expr)?;
    }
    eval(env, &expansion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_evaluating_atoms() {
        let env = Environment::new_global();
        assert_eq!(eval(&env, &Value::int(42)).unwrap(), Value::int(42));
        assert_eq!(eval(&env, &Value::string("hi")).unwrap(), Value::string("hi"));
        assert_eq!(eval(&env, &Value::nil()).unwrap(), Value::nil());
    }

    #[test]
    fn test_unbound_symbol_self_evaluates() {
        let env = Environment::new_global();
        let sym = Value::symbol("unbound-thing");
        assert_eq!(eval(&env, &sym).unwrap(), sym);
    }

    #[test]
    fn test_bound_symbol_returns_value() {
        let env = Environment::new_global();
        env.define_local("X", Value::int(10));
        assert_eq!(eval(&env, &Value::symbol("x")).unwrap(), Value::int(10));
    }

    #[test]
    fn test_calling_non_callable_head_errors() {
        let env = Environment::new_global();
        let form = Value::list(vec![Value::int(1), Value::int(2)]);
        assert!(eval(&env, &form).is_err());
    }

    #[test]
    fn test_calling_unbound_symbol_head_errors() {
        let env = Environment::new_global();
        let form = Value::list(vec![Value::symbol("no-such-fn"), Value::int(1)]);
        assert!(eval(&env, &form).is_err());
    }

    #[test]
    fn test_apply_primitive_std_evaluates_args_first() {
        let env = Environment::new_global();
        crate::primitives::register_all(&env);
        let form = Value::list(vec![
            Value::symbol("+"),
            Value::list(vec![Value::symbol("+"), Value::int(1), Value::int(1)]),
            Value::int(3),
        ]);
        assert_eq!(eval(&env, &form).unwrap(), Value::int(5));
    }

    #[test]
    fn test_apply_function_does_not_close_over_definition_env() {
        let env = Environment::new_global();
        crate::primitives::register_all(&env);
        env.define_local("N", Value::int(1));
        let f = Value::Function(Rc::new(LFunction {
            name: "f".to_string(),
            params: vec![],
            body: vec![Value::symbol("n")],
        }));
        env.define_local("F", f);

        let scope = env.open_scope();
        scope.define_local("N", Value::int(99));
        let result = eval(&scope, &Value::list(vec![Value::symbol("f")])).unwrap();
        assert_eq!(result, Value::int(99));
    }

    #[test]
    fn test_apply_function_missing_args_left_unbound_self_evaluate() {
        let env = Environment::new_global();
        crate::primitives::register_all(&env);
        let f = Value::Function(Rc::new(LFunction {
            name: "f".to_string(),
            params: vec!["A".to_string(), "B".to_string()],
            body: vec![Value::symbol("b")],
        }));
        env.define_local("F", f);
        let result = eval(&env, &Value::list(vec![Value::symbol("f"), Value::int(1)])).unwrap();
        assert_eq!(result, Value::symbol("b"));
    }

    #[test]
    fn test_apply_macro_expands_then_evaluates_in_caller_env() {
        let env = Environment::new_global();
        crate::primitives::register_all(&env);
        env.define_local("X", Value::int(7));
        // (defmacro!! get-x () (quote x)) -- body returns the symbol `x`,
        // which is then re-evaluated in the caller's env to fetch its value.
        let mac = Value::Macro(Rc::new(LMacro {
            name: "get-x".to_string(),
            params: vec![],
            body: vec![Value::list(vec![Value::symbol("quote"), Value::symbol("x")])],
        }));
        env.define_local("GET-X", mac);
        let result = eval(&env, &Value::list(vec![Value::symbol("get-x")])).unwrap();
        assert_eq!(result, Value::int(7));
    }
}

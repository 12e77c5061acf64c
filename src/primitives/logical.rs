// ABOUTME: Logical primitives (not, and, or) — all stdEvalOrd, no short-circuiting

use crate::env::Environment;
use crate::error::{LypsResult, RuntimeFuncError};
use crate::help::{register_help, HelpEntry};
use crate::value::{Primitive, PrimitiveFn, Value};
use std::rc::Rc;

const USAGE_NOT: &str = "(not <expr>)";
fn lp_not(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity("not", USAGE_NOT, crate::error::ARITY_ONE, args.len()).into());
    }
    Ok(Value::bool_int(!args[0].is_truthy()))
}

/// `and`/`or` are `stdEvalOrd = true` per spec.md section 4.3's special-form
/// enumeration (neither name appears in it), so every argument is already
/// evaluated by the time these run — there is no short-circuiting, and both
/// return 0/1 rather than the winning operand (spec.md section 4.3).
const USAGE_AND: &str = "(and <expr1> <expr2> ...)";
fn lp_and(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() < 2 {
        return Err(RuntimeFuncError::arity("and", USAGE_AND, crate::error::ARITY_AT_LEAST_TWO, args.len()).into());
    }
    Ok(Value::bool_int(args.iter().all(|a| a.is_truthy())))
}

const USAGE_OR: &str = "(or <expr1> <expr2> ...)";
fn lp_or(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() < 2 {
        return Err(RuntimeFuncError::arity("or", USAGE_OR, crate::error::ARITY_AT_LEAST_TWO, args.len()).into());
    }
    Ok(Value::bool_int(args.iter().any(|a| a.is_truthy())))
}

pub fn table() -> Vec<Primitive> {
    vec![
        Primitive { name: "not", usage: USAGE_NOT, func: PrimitiveFn::Std(lp_not) },
        Primitive { name: "and", usage: USAGE_AND, func: PrimitiveFn::Std(lp_and) },
        Primitive { name: "or", usage: USAGE_OR, func: PrimitiveFn::Std(lp_or) },
    ]
}

pub fn register_help() {
    register_help(HelpEntry {
        name: "and".to_string(),
        signature: USAGE_AND.to_string(),
        description: "Returns 1 iff every argument is truthy; all arguments are evaluated first."
            .to_string(),
        examples: vec!["(and 1 2 3) ; => 1".to_string(), "(and 1 0 3) ; => 0".to_string()],
        related: vec!["or".to_string(), "not".to_string()],
        category: "Logical".to_string(),
    });
    register_help(HelpEntry {
        name: "not".to_string(),
        signature: USAGE_NOT.to_string(),
        description: "Returns 1 if the argument is falsy (NULL or integer 0), else 0.".to_string(),
        examples: vec!["(not NULL) ; => 1".to_string(), "(not 5) ; => 0".to_string()],
        related: vec!["and".to_string(), "or".to_string()],
        category: "Logical".to_string(),
    });
    register_help(HelpEntry {
        name: "or".to_string(),
        signature: USAGE_OR.to_string(),
        description: "Returns 1 iff any argument is truthy; all arguments are evaluated first."
            .to_string(),
        examples: vec!["(or 0 NULL 5) ; => 1".to_string(), "(or 0 NULL) ; => 0".to_string()],
        related: vec!["and".to_string(), "not".to_string()],
        category: "Logical".to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;

    fn call(name: &str, args: Vec<Value>) -> LypsResult<Value> {
        let env = Environment::new_global();
        let table = table();
        let prim = table.iter().find(|p| p.name == name).unwrap();
        match prim.func {
            PrimitiveFn::Std(f) => f(&env, &args),
            PrimitiveFn::Raw(_) => unreachable!(),
        }
    }

    #[test]
    fn test_not_null_is_true() {
        assert_eq!(call("not", vec![Value::nil()]).unwrap(), Value::int(1));
    }

    #[test]
    fn test_and_all_truthy() {
        assert_eq!(
            call("and", vec![Value::int(1), Value::int(2), Value::int(3)]).unwrap(),
            Value::int(1)
        );
    }

    #[test]
    fn test_and_one_falsy() {
        assert_eq!(
            call("and", vec![Value::int(1), Value::int(0)]).unwrap(),
            Value::int(0)
        );
    }

    #[test]
    fn test_or_one_truthy() {
        assert_eq!(
            call("or", vec![Value::nil(), Value::int(0), Value::int(7)]).unwrap(),
            Value::int(1)
        );
    }

    #[test]
    fn test_or_all_falsy() {
        assert_eq!(call("or", vec![Value::nil(), Value::int(0)]).unwrap(), Value::int(0));
    }
}

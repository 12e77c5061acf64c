// ABOUTME: Relational primitives (is?, =, <>, <, <=, >, >=)

use crate::env::Environment;
use crate::error::{LypsResult, RuntimeFuncError};
use crate::help::{register_help, HelpEntry};
use crate::primitives::arithmetic::compare;
use crate::value::{Primitive, PrimitiveFn, Value};
use std::cmp::Ordering;
use std::rc::Rc;

const USAGE_IS: &str = "(is? <expr1> <expr2>)";
fn lp_is(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 2 {
        return Err(RuntimeFuncError::arity("is?", USAGE_IS, crate::error::ARITY_TWO, args.len()).into());
    }
    // Atoms compare by value; everything else compares by identity. Since
    // Value's own PartialEq is already value-equality for atoms and
    // pointer/name-identity for callables/lists/maps, the single rule the
    // original spells out differently for atoms vs. objects collapses here
    // into one equality check.
    Ok(Value::bool_int(args[0] == args[1]))
}

/// Builds the consecutive-pairs conjunction that backs `=`, `<>`, `<`,
/// `<=`, `>`, `>=` — each requires 2+ arguments and tests every adjacent
/// pair, short-circuiting to 0 on the first failure (spec.md section 4.4).
fn conjunction(
    name: &'static str,
    usage: &'static str,
    args: &[Value],
    test: impl Fn(&Value, &Value) -> Option<bool>,
) -> LypsResult<Value> {
    if args.len() < 2 {
        return Err(RuntimeFuncError::arity(name, usage, crate::error::ARITY_AT_LEAST_TWO, args.len()).into());
    }
    for pair in args.windows(2) {
        match test(&pair[0], &pair[1]) {
            Some(true) => continue,
            Some(false) => return Ok(Value::int(0)),
            None => {
                return Err(RuntimeFuncError::type_mismatch(name, usage, "a number", &pair[1]).into())
            }
        }
    }
    Ok(Value::int(1))
}

const USAGE_EQ: &str = "(= <expr1> <expr2> ...)";
fn lp_eq(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() < 2 {
        return Err(RuntimeFuncError::arity("=", USAGE_EQ, crate::error::ARITY_AT_LEAST_TWO, args.len()).into());
    }
    for pair in args.windows(2) {
        if pair[0] != pair[1] {
            return Ok(Value::int(0));
        }
    }
    Ok(Value::int(1))
}

const USAGE_NE: &str = "(<> <expr1> <expr2> ...)";
fn lp_ne(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() < 2 {
        return Err(RuntimeFuncError::arity("<>", USAGE_NE, crate::error::ARITY_AT_LEAST_TWO, args.len()).into());
    }
    for pair in args.windows(2) {
        if pair[0] == pair[1] {
            return Ok(Value::int(0));
        }
    }
    Ok(Value::int(1))
}

const USAGE_LT: &str = "(< <expr1> <expr2> ...)";
fn lp_lt(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    conjunction("<", USAGE_LT, args, |a, b| compare(a, b).map(|o| o == Ordering::Less))
}

const USAGE_LE: &str = "(<= <expr1> <expr2> ...)";
fn lp_le(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    conjunction("<=", USAGE_LE, args, |a, b| compare(a, b).map(|o| o != Ordering::Greater))
}

const USAGE_GT: &str = "(> <expr1> <expr2> ...)";
fn lp_gt(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    conjunction(">", USAGE_GT, args, |a, b| compare(a, b).map(|o| o == Ordering::Greater))
}

const USAGE_GE: &str = "(>= <expr1> <expr2> ...)";
fn lp_ge(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    conjunction(">=", USAGE_GE, args, |a, b| compare(a, b).map(|o| o != Ordering::Less))
}

pub fn table() -> Vec<Primitive> {
    vec![
        Primitive { name: "is?", usage: USAGE_IS, func: PrimitiveFn::Std(lp_is) },
        Primitive { name: "=", usage: USAGE_EQ, func: PrimitiveFn::Std(lp_eq) },
        Primitive { name: "<>", usage: USAGE_NE, func: PrimitiveFn::Std(lp_ne) },
        Primitive { name: "<", usage: USAGE_LT, func: PrimitiveFn::Std(lp_lt) },
        Primitive { name: "<=", usage: USAGE_LE, func: PrimitiveFn::Std(lp_le) },
        Primitive { name: ">", usage: USAGE_GT, func: PrimitiveFn::Std(lp_gt) },
        Primitive { name: ">=", usage: USAGE_GE, func: PrimitiveFn::Std(lp_ge) },
    ]
}

pub fn register_help() {
    register_help(HelpEntry {
        name: "=".to_string(),
        signature: USAGE_EQ.to_string(),
        description: "Tests whether all arguments are equal, as the conjunction over every consecutive pair."
            .to_string(),
        examples: vec!["(= 5 5 5) ; => 1".to_string(), "(= 5 5 6) ; => 0".to_string()],
        related: vec!["<>".to_string(), "is?".to_string()],
        category: "Relational".to_string(),
    });
    register_help(HelpEntry {
        name: "is?".to_string(),
        signature: USAGE_IS.to_string(),
        description: "Tests identity for a single pair of values; value equality for atoms."
            .to_string(),
        examples: vec!["(is? 5 5) ; => 1".to_string()],
        related: vec!["=".to_string()],
        category: "Relational".to_string(),
    });
    register_help(HelpEntry {
        name: "<>".to_string(),
        signature: USAGE_NE.to_string(),
        description: "Tests whether any two consecutive arguments differ.".to_string(),
        examples: vec!["(<> 1 2) ; => 1".to_string(), "(<> 1 1) ; => 0".to_string()],
        related: vec!["=".to_string()],
        category: "Relational".to_string(),
    });
    register_help(HelpEntry {
        name: "<".to_string(),
        signature: USAGE_LT.to_string(),
        description: "Tests whether arguments are strictly increasing.".to_string(),
        examples: vec!["(< 1 2 3) ; => 1".to_string()],
        related: vec!["<=".to_string(), ">".to_string()],
        category: "Relational".to_string(),
    });
    register_help(HelpEntry {
        name: "<=".to_string(),
        signature: USAGE_LE.to_string(),
        description: "Tests whether arguments are non-decreasing.".to_string(),
        examples: vec!["(<= 1 1 2) ; => 1".to_string()],
        related: vec!["<".to_string(), ">=".to_string()],
        category: "Relational".to_string(),
    });
    register_help(HelpEntry {
        name: ">".to_string(),
        signature: USAGE_GT.to_string(),
        description: "Tests whether arguments are strictly decreasing.".to_string(),
        examples: vec!["(> 3 2 1) ; => 1".to_string()],
        related: vec![">=".to_string(), "<".to_string()],
        category: "Relational".to_string(),
    });
    register_help(HelpEntry {
        name: ">=".to_string(),
        signature: USAGE_GE.to_string(),
        description: "Tests whether arguments are non-increasing.".to_string(),
        examples: vec!["(>= 2 2 1) ; => 1".to_string()],
        related: vec![">".to_string(), "<=".to_string()],
        category: "Relational".to_string(),
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
    fn test_eq_reflexive_for_every_value() {
        assert_eq!(call("=", vec![Value::int(5), Value::int(5)]).unwrap(), Value::int(1));
        assert_eq!(call("<>", vec![Value::int(5), Value::int(5)]).unwrap(), Value::int(0));
    }

    #[test]
    fn test_lt_chain_conjunction() {
        assert_eq!(
            call("<", vec![Value::int(1), Value::int(2), Value::int(3)]).unwrap(),
            Value::int(1)
        );
        assert_eq!(
            call("<", vec![Value::int(1), Value::int(3), Value::int(2)]).unwrap(),
            Value::int(0)
        );
    }

    #[test]
    fn test_cross_tower_lt() {
        assert_eq!(call("<", vec![Value::int(1), Value::Float(1.5)]).unwrap(), Value::int(1));
    }

    #[test]
    fn test_requires_at_least_two_args() {
        assert!(call("=", vec![Value::int(1)]).is_err());
    }

    #[test]
    fn test_is_single_pair_only() {
        assert_eq!(call("is?", vec![Value::string("a"), Value::string("a")]).unwrap(), Value::int(1));
        assert!(call("is?", vec![Value::int(1)]).is_err());
    }
}

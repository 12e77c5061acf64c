// ABOUTME: Numeric tower arithmetic primitives (+, -, *, /, //, mod, trunc, abs, log, pow, trig, min/max)

use crate::env::Environment;
use crate::error::{LypsResult, RuntimeFuncError};
use crate::help::{register_help, HelpEntry};
use crate::value::{Primitive, PrimitiveFn, Value};
use num_bigint::BigInt;
use num_integer::Integer as _;
use num_rational::BigRational;
use num_traits::{FromPrimitive, Signed, Zero};
use std::cmp::Ordering;
use std::rc::Rc;

/// A pair of operands widened to a common rung of the numeric tower
/// (integer < rational < float), per spec.md section 4.3.
pub enum Widened {
    Int(BigInt, BigInt),
    Rat(BigRational, BigRational),
    Float(f64, f64),
}

impl Widened {
    pub fn eq(&self) -> bool {
        match self {
            Widened::Int(a, b) => a == b,
            Widened::Rat(a, b) => a == b,
            Widened::Float(a, b) => a == b,
        }
    }

    pub fn cmp(&self) -> Option<Ordering> {
        match self {
            Widened::Int(a, b) => Some(a.cmp(b)),
            Widened::Rat(a, b) => Some(a.cmp(b)),
            Widened::Float(a, b) => a.partial_cmp(b),
        }
    }
}

fn to_rational(v: &Value) -> Option<BigRational> {
    match v {
        Value::Integer(n) => Some(BigRational::from_integer(n.clone())),
        Value::Rational(r) => Some(r.clone()),
        _ => None,
    }
}

/// Widens two numeric values to their common tower rung. `None` if either
/// operand is not a number.
pub fn widen_pair(a: &Value, b: &Value) -> Option<Widened> {
    use Value::*;
    match (a, b) {
        (Integer(x), Integer(y)) => Some(Widened::Int(x.clone(), y.clone())),
        (Float(_), _) | (_, Float(_)) => Some(Widened::Float(a.as_f64()?, b.as_f64()?)),
        (Rational(_), _) | (_, Rational(_)) => Some(Widened::Rat(to_rational(a)?, to_rational(b)?)),
        _ => None,
    }
}

pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    widen_pair(a, b).and_then(|w| w.cmp())
}

fn normalize_rational(r: BigRational) -> Value {
    if r.is_integer() {
        Value::Integer(r.to_integer())
    } else {
        Value::Rational(r)
    }
}

fn type_err(name: &str, usage: &str, got: &Value) -> crate::error::LypsError {
    RuntimeFuncError::type_mismatch(name, usage, "a number", got).into()
}

fn add2(name: &str, usage: &str, a: &Value, b: &Value) -> LypsResult<Value> {
    match widen_pair(a, b) {
        Some(Widened::Int(x, y)) => Ok(Value::Integer(x + y)),
        Some(Widened::Rat(x, y)) => Ok(normalize_rational(x + y)),
        Some(Widened::Float(x, y)) => Ok(Value::Float(x + y)),
        None => Err(type_err(name, usage, if a.is_number() { b } else { a })),
    }
}

fn sub2(name: &str, usage: &str, a: &Value, b: &Value) -> LypsResult<Value> {
    match widen_pair(a, b) {
        Some(Widened::Int(x, y)) => Ok(Value::Integer(x - y)),
        Some(Widened::Rat(x, y)) => Ok(normalize_rational(x - y)),
        Some(Widened::Float(x, y)) => Ok(Value::Float(x - y)),
        None => Err(type_err(name, usage, if a.is_number() { b } else { a })),
    }
}

fn mul2(name: &str, usage: &str, a: &Value, b: &Value) -> LypsResult<Value> {
    match widen_pair(a, b) {
        Some(Widened::Int(x, y)) => Ok(Value::Integer(x * y)),
        Some(Widened::Rat(x, y)) => Ok(normalize_rational(x * y)),
        Some(Widened::Float(x, y)) => Ok(Value::Float(x * y)),
        None => Err(type_err(name, usage, if a.is_number() { b } else { a })),
    }
}

fn div2(name: &str, usage: &str, a: &Value, b: &Value) -> LypsResult<Value> {
    match widen_pair(a, b) {
        Some(Widened::Int(x, y)) => {
            if y.is_zero() {
                return Err(RuntimeFuncError::new(name, usage, "division by zero").into());
            }
            Ok(normalize_rational(BigRational::new(x, y)))
        }
        Some(Widened::Rat(x, y)) => {
            if y.is_zero() {
                return Err(RuntimeFuncError::new(name, usage, "division by zero").into());
            }
            Ok(normalize_rational(x / y))
        }
        Some(Widened::Float(x, y)) => {
            if y == 0.0 {
                return Err(RuntimeFuncError::new(name, usage, "division by zero").into());
            }
            Ok(Value::Float(x / y))
        }
        None => Err(type_err(name, usage, if a.is_number() { b } else { a })),
    }
}

fn as_integer<'a>(name: &str, usage: &str, v: &'a Value) -> LypsResult<&'a BigInt> {
    match v {
        Value::Integer(n) => Ok(n),
        _ => Err(RuntimeFuncError::type_mismatch(name, usage, "an integer", v).into()),
    }
}

const USAGE_ADD: &str = "(+ <num1> <num2> ...)";
fn lp_add(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.is_empty() {
        return Err(RuntimeFuncError::arity("+", USAGE_ADD, crate::error::ARITY_AT_LEAST_ONE, 0).into());
    }
    let mut acc = args[0].clone();
    if !acc.is_number() {
        return Err(type_err("+", USAGE_ADD, &acc));
    }
    for arg in &args[1..] {
        acc = add2("+", USAGE_ADD, &acc, arg)?;
    }
    Ok(acc)
}

const USAGE_SUB: &str = "(- <num1> [<num2> ...])";
fn lp_sub(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.is_empty() {
        return Err(RuntimeFuncError::arity("-", USAGE_SUB, crate::error::ARITY_AT_LEAST_ONE, 0).into());
    }
    if args.len() == 1 {
        return sub2("-", USAGE_SUB, &Value::int(0), &args[0]);
    }
    let mut acc = args[0].clone();
    if !acc.is_number() {
        return Err(type_err("-", USAGE_SUB, &acc));
    }
    for arg in &args[1..] {
        acc = sub2("-", USAGE_SUB, &acc, arg)?;
    }
    Ok(acc)
}

const USAGE_MUL: &str = "(* <num1> <num2> ...)";
fn lp_mul(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.is_empty() {
        return Err(RuntimeFuncError::arity("*", USAGE_MUL, crate::error::ARITY_AT_LEAST_ONE, 0).into());
    }
    let mut acc = args[0].clone();
    if !acc.is_number() {
        return Err(type_err("*", USAGE_MUL, &acc));
    }
    for arg in &args[1..] {
        acc = mul2("*", USAGE_MUL, &acc, arg)?;
    }
    Ok(acc)
}

const USAGE_DIV: &str = "(/ <num1> [<num2> ...])";
fn lp_div(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.is_empty() {
        return Err(RuntimeFuncError::arity("/", USAGE_DIV, crate::error::ARITY_AT_LEAST_ONE, 0).into());
    }
    if args.len() == 1 {
        return div2("/", USAGE_DIV, &Value::int(1), &args[0]);
    }
    let mut acc = args[0].clone();
    if !acc.is_number() {
        return Err(type_err("/", USAGE_DIV, &acc));
    }
    for arg in &args[1..] {
        acc = div2("/", USAGE_DIV, &acc, arg)?;
    }
    Ok(acc)
}

const USAGE_INTDIV: &str = "(// <int1> <int2>)";
fn lp_intdiv(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 2 {
        return Err(RuntimeFuncError::arity("//", USAGE_INTDIV, crate::error::ARITY_TWO, args.len()).into());
    }
    let a = as_integer("//", USAGE_INTDIV, &args[0])?;
    let b = as_integer("//", USAGE_INTDIV, &args[1])?;
    if b.is_zero() {
        return Err(RuntimeFuncError::new("//", USAGE_INTDIV, "division by zero").into());
    }
    Ok(Value::Integer(a.div_floor(b)))
}

const USAGE_MOD: &str = "(mod <int1> <int2>)";
fn lp_mod(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 2 {
        return Err(RuntimeFuncError::arity("mod", USAGE_MOD, crate::error::ARITY_TWO, args.len()).into());
    }
    let a = as_integer("mod", USAGE_MOD, &args[0])?;
    let b = as_integer("mod", USAGE_MOD, &args[1])?;
    if b.is_zero() {
        return Err(RuntimeFuncError::new("mod", USAGE_MOD, "division by zero").into());
    }
    Ok(Value::Integer(a.mod_floor(b)))
}

const USAGE_TRUNC: &str = "(trunc <num>)";
fn lp_trunc(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity("trunc", USAGE_TRUNC, crate::error::ARITY_ONE, args.len()).into());
    }
    match &args[0] {
        Value::Integer(n) => Ok(Value::Integer(n.clone())),
        // BigInt's Div truncates toward zero, same as the target semantics.
        Value::Rational(r) => Ok(Value::Integer(r.numer() / r.denom())),
        Value::Float(f) => BigInt::from_f64(f.trunc())
            .map(Value::Integer)
            .ok_or_else(|| RuntimeFuncError::new("trunc", USAGE_TRUNC, "value too large to truncate").into()),
        other => Err(type_err("trunc", USAGE_TRUNC, other)),
    }
}

const USAGE_ABS: &str = "(abs <num>)";
fn lp_abs(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity("abs", USAGE_ABS, crate::error::ARITY_ONE, args.len()).into());
    }
    match &args[0] {
        Value::Integer(n) => Ok(Value::Integer(n.abs())),
        Value::Rational(r) => Ok(Value::Rational(r.abs())),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(type_err("abs", USAGE_ABS, other)),
    }
}

const USAGE_LOG: &str = "(log <num> [<base>])";
fn lp_log(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.is_empty() || args.len() > 2 {
        return Err(
            RuntimeFuncError::arity("log", USAGE_LOG, crate::error::ARITY_ONE_OR_TWO, args.len()).into(),
        );
    }
    let x = args[0]
        .as_f64()
        .ok_or_else(|| type_err("log", USAGE_LOG, &args[0]))?;
    let base = if args.len() == 2 {
        args[1].as_f64().ok_or_else(|| type_err("log", USAGE_LOG, &args[1]))?
    } else {
        10.0
    };
    Ok(Value::Float(x.log(base)))
}

const USAGE_POW: &str = "(pow <base> <power>)";
fn lp_pow(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 2 {
        return Err(RuntimeFuncError::arity("pow", USAGE_POW, crate::error::ARITY_TWO, args.len()).into());
    }
    let base = args[0]
        .as_f64()
        .ok_or_else(|| type_err("pow", USAGE_POW, &args[0]))?;
    let power = args[1]
        .as_f64()
        .ok_or_else(|| type_err("pow", USAGE_POW, &args[1]))?;
    Ok(Value::Float(base.powf(power)))
}

macro_rules! unary_trig {
    ($fn_name:ident, $prim_name:literal, $usage:ident, $usage_str:literal, $op:expr) => {
        const $usage: &str = $usage_str;
        fn $fn_name(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
            if args.len() != 1 {
                return Err(RuntimeFuncError::arity($prim_name, $usage, crate::error::ARITY_ONE, args.len())
                    .into());
            }
            let x = args[0]
                .as_f64()
                .ok_or_else(|| type_err($prim_name, $usage, &args[0]))?;
            let op: fn(f64) -> f64 = $op;
            Ok(Value::Float(op(x)))
        }
    };
}

unary_trig!(lp_sin, "sin", USAGE_SIN, "(sin <radians>)", f64::sin);
unary_trig!(lp_cos, "cos", USAGE_COS, "(cos <radians>)", f64::cos);
unary_trig!(lp_tan, "tan", USAGE_TAN, "(tan <radians>)", f64::tan);
unary_trig!(lp_exp, "exp", USAGE_EXP, "(exp <num>)", f64::exp);

const USAGE_MIN: &str = "(min <num1> <num2> ...)";
fn lp_min(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.is_empty() {
        return Err(RuntimeFuncError::arity("min", USAGE_MIN, crate::error::ARITY_AT_LEAST_ONE, 0).into());
    }
    let mut best = args[0].clone();
    if !best.is_number() {
        return Err(type_err("min", USAGE_MIN, &best));
    }
    for arg in &args[1..] {
        match compare(&best, arg) {
            Some(Ordering::Greater) => best = arg.clone(),
            Some(_) => {}
            None => return Err(type_err("min", USAGE_MIN, arg)),
        }
    }
    Ok(best)
}

const USAGE_MAX: &str = "(max <num1> <num2> ...)";
fn lp_max(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.is_empty() {
        return Err(RuntimeFuncError::arity("max", USAGE_MAX, crate::error::ARITY_AT_LEAST_ONE, 0).into());
    }
    let mut best = args[0].clone();
    if !best.is_number() {
        return Err(type_err("max", USAGE_MAX, &best));
    }
    for arg in &args[1..] {
        match compare(&best, arg) {
            Some(Ordering::Less) => best = arg.clone(),
            Some(_) => {}
            None => return Err(type_err("max", USAGE_MAX, arg)),
        }
    }
    Ok(best)
}

pub fn table() -> Vec<Primitive> {
    vec![
        Primitive { name: "+", usage: USAGE_ADD, func: PrimitiveFn::Std(lp_add) },
        Primitive { name: "-", usage: USAGE_SUB, func: PrimitiveFn::Std(lp_sub) },
        Primitive { name: "*", usage: USAGE_MUL, func: PrimitiveFn::Std(lp_mul) },
        Primitive { name: "/", usage: USAGE_DIV, func: PrimitiveFn::Std(lp_div) },
        Primitive { name: "//", usage: USAGE_INTDIV, func: PrimitiveFn::Std(lp_intdiv) },
        Primitive { name: "mod", usage: USAGE_MOD, func: PrimitiveFn::Std(lp_mod) },
        Primitive { name: "trunc", usage: USAGE_TRUNC, func: PrimitiveFn::Std(lp_trunc) },
        Primitive { name: "abs", usage: USAGE_ABS, func: PrimitiveFn::Std(lp_abs) },
        Primitive { name: "log", usage: USAGE_LOG, func: PrimitiveFn::Std(lp_log) },
        Primitive { name: "pow", usage: USAGE_POW, func: PrimitiveFn::Std(lp_pow) },
        Primitive { name: "sin", usage: USAGE_SIN, func: PrimitiveFn::Std(lp_sin) },
        Primitive { name: "cos", usage: USAGE_COS, func: PrimitiveFn::Std(lp_cos) },
        Primitive { name: "tan", usage: USAGE_TAN, func: PrimitiveFn::Std(lp_tan) },
        Primitive { name: "exp", usage: USAGE_EXP, func: PrimitiveFn::Std(lp_exp) },
        Primitive { name: "min", usage: USAGE_MIN, func: PrimitiveFn::Std(lp_min) },
        Primitive { name: "max", usage: USAGE_MAX, func: PrimitiveFn::Std(lp_max) },
    ]
}

pub fn register_help() {
    register_help(HelpEntry {
        name: "+".to_string(),
        signature: USAGE_ADD.to_string(),
        description: "Sums one or more numbers, widening across the integer/rational/float tower."
            .to_string(),
        examples: vec!["(+ 1 2 3) ; => 6".to_string(), "(+ 1 2/3 0.5) ; => 2.1666666666666665".to_string()],
        related: vec!["-".to_string(), "*".to_string(), "/".to_string()],
        category: "Arithmetic".to_string(),
    });
    register_help(HelpEntry {
        name: "/".to_string(),
        signature: USAGE_DIV.to_string(),
        description: "Divides left to right; two integers divide exactly to an integer or else an exact rational."
            .to_string(),
        examples: vec!["(/ 5 2) ; => 5/2".to_string()],
        related: vec!["//".to_string(), "mod".to_string()],
        category: "Arithmetic".to_string(),
    });
    register_help(HelpEntry {
        name: "-".to_string(),
        signature: USAGE_SUB.to_string(),
        description: "Subtracts left to right; negates its single argument if given only one.".to_string(),
        examples: vec!["(- 10 3) ; => 7".to_string(), "(- 5) ; => -5".to_string()],
        related: vec!["+".to_string()],
        category: "Arithmetic".to_string(),
    });
    register_help(HelpEntry {
        name: "*".to_string(),
        signature: USAGE_MUL.to_string(),
        description: "Multiplies one or more numbers, widening across the numeric tower.".to_string(),
        examples: vec!["(* 2 3 4) ; => 24".to_string()],
        related: vec!["+".to_string(), "/".to_string()],
        category: "Arithmetic".to_string(),
    });
    register_help(HelpEntry {
        name: "//".to_string(),
        signature: USAGE_INTDIV.to_string(),
        description: "Integer floor division of two integers.".to_string(),
        examples: vec!["(// 7 2) ; => 3".to_string(), "(// -7 2) ; => -4".to_string()],
        related: vec!["mod".to_string(), "/".to_string()],
        category: "Arithmetic".to_string(),
    });
    register_help(HelpEntry {
        name: "mod".to_string(),
        signature: USAGE_MOD.to_string(),
        description: "Floored modulo of two integers; satisfies (+ (* (// a b) b) (mod a b)) = a.".to_string(),
        examples: vec!["(mod -7 2) ; => 1".to_string()],
        related: vec!["//".to_string()],
        category: "Arithmetic".to_string(),
    });
    register_help(HelpEntry {
        name: "trunc".to_string(),
        signature: USAGE_TRUNC.to_string(),
        description: "Truncates a number toward zero, returning an integer.".to_string(),
        examples: vec!["(trunc -3.7) ; => -3".to_string()],
        related: vec!["abs".to_string()],
        category: "Arithmetic".to_string(),
    });
    register_help(HelpEntry {
        name: "abs".to_string(),
        signature: USAGE_ABS.to_string(),
        description: "Absolute value, preserving the operand's rung of the numeric tower.".to_string(),
        examples: vec!["(abs -2.5) ; => 2.5".to_string()],
        related: vec!["trunc".to_string()],
        category: "Arithmetic".to_string(),
    });
    register_help(HelpEntry {
        name: "log".to_string(),
        signature: USAGE_LOG.to_string(),
        description: "Logarithm of a number; base defaults to 10.".to_string(),
        examples: vec!["(log 100) ; => 2".to_string(), "(log 8 2) ; => 3".to_string()],
        related: vec!["pow".to_string(), "exp".to_string()],
        category: "Arithmetic".to_string(),
    });
    register_help(HelpEntry {
        name: "pow".to_string(),
        signature: USAGE_POW.to_string(),
        description: "Raises a base to a power, always returning a float.".to_string(),
        examples: vec!["(pow 2 10) ; => 1024".to_string()],
        related: vec!["log".to_string()],
        category: "Arithmetic".to_string(),
    });
    register_help(HelpEntry {
        name: "sin".to_string(),
        signature: USAGE_SIN.to_string(),
        description: "Sine of an angle given in radians.".to_string(),
        examples: vec!["(sin 0) ; => 0".to_string()],
        related: vec!["cos".to_string(), "tan".to_string()],
        category: "Arithmetic".to_string(),
    });
    register_help(HelpEntry {
        name: "cos".to_string(),
        signature: USAGE_COS.to_string(),
        description: "Cosine of an angle given in radians.".to_string(),
        examples: vec!["(cos 0) ; => 1".to_string()],
        related: vec!["sin".to_string(), "tan".to_string()],
        category: "Arithmetic".to_string(),
    });
    register_help(HelpEntry {
        name: "tan".to_string(),
        signature: USAGE_TAN.to_string(),
        description: "Tangent of an angle given in radians.".to_string(),
        examples: vec!["(tan 0) ; => 0".to_string()],
        related: vec!["sin".to_string(), "cos".to_string()],
        category: "Arithmetic".to_string(),
    });
    register_help(HelpEntry {
        name: "exp".to_string(),
        signature: USAGE_EXP.to_string(),
        description: "e raised to the given power.".to_string(),
        examples: vec!["(exp 0) ; => 1".to_string()],
        related: vec!["log".to_string(), "pow".to_string()],
        category: "Arithmetic".to_string(),
    });
    register_help(HelpEntry {
        name: "min".to_string(),
        signature: USAGE_MIN.to_string(),
        description: "Smallest of one or more numbers, preserving its original type.".to_string(),
        examples: vec!["(min 5 2.0 3) ; => 2.0".to_string()],
        related: vec!["max".to_string()],
        category: "Arithmetic".to_string(),
    });
    register_help(HelpEntry {
        name: "max".to_string(),
        signature: USAGE_MAX.to_string(),
        description: "Largest of one or more numbers, preserving its original type.".to_string(),
        examples: vec!["(max 5 2.0 3) ; => 5".to_string()],
        related: vec!["min".to_string()],
        category: "Arithmetic".to_string(),
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
    fn test_add_widens_to_float() {
        let result = call(
            "+",
            vec![Value::int(1), Value::Rational(BigRational::new(2.into(), 3.into())), Value::Float(0.5)],
        )
        .unwrap();
        match result {
            Value::Float(f) => assert!((f - 2.1666666666666665).abs() < 1e-12),
            _ => panic!("expected float"),
        }
    }

    #[test]
    fn test_div_two_ints_exact() {
        assert_eq!(call("/", vec![Value::int(6), Value::int(2)]).unwrap(), Value::int(3));
    }

    #[test]
    fn test_div_two_ints_rational() {
        let result = call("/", vec![Value::int(5), Value::int(2)]).unwrap();
        assert_eq!(format!("{}", result), "5/2");
    }

    #[test]
    fn test_div_by_zero_errors() {
        assert!(call("/", vec![Value::int(1), Value::int(0)]).is_err());
    }

    #[test]
    fn test_sub_unary_negates() {
        assert_eq!(call("-", vec![Value::int(5)]).unwrap(), Value::int(-5));
    }

    #[test]
    fn test_intdiv_and_mod_floor_semantics() {
        // Floor division: (// -7 2) = -4, (mod -7 2) = 1
        assert_eq!(call("//", vec![Value::int(-7), Value::int(2)]).unwrap(), Value::int(-4));
        assert_eq!(call("mod", vec![Value::int(-7), Value::int(2)]).unwrap(), Value::int(1));
    }

    #[test]
    fn test_intdiv_rejects_non_integer() {
        assert!(call("//", vec![Value::Float(1.0), Value::int(2)]).is_err());
    }

    #[test]
    fn test_min_max_preserve_operand_type() {
        let result = call("min", vec![Value::int(5), Value::Float(2.0)]).unwrap();
        assert_eq!(result, Value::Float(2.0));
        assert!(matches!(result, Value::Float(_)));
    }

    #[test]
    fn test_trunc_toward_zero() {
        assert_eq!(call("trunc", vec![Value::Float(-3.7)]).unwrap(), Value::int(-3));
    }

    #[test]
    fn test_abs_preserves_type() {
        assert!(matches!(call("abs", vec![Value::Float(-2.5)]).unwrap(), Value::Float(f) if f == 2.5));
    }
}

// ABOUTME: Type conversion primitives (float, string)

use crate::env::Environment;
use crate::error::{LypsResult, RuntimeFuncError};
use crate::help::{register_help, HelpEntry};
use crate::value::{Primitive, PrimitiveFn, Value};
use std::fmt::Write as _;
use std::rc::Rc;

const USAGE_FLOAT: &str = "(float <expr>)";
fn lp_float(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity("float", USAGE_FLOAT, crate::error::ARITY_ONE, args.len()).into());
    }
    args[0]
        .as_f64()
        .map(Value::Float)
        .ok_or_else(|| RuntimeFuncError::type_mismatch("float", USAGE_FLOAT, "a number", &args[0]).into())
}

/// Concatenates the printed form of every argument. String arguments are
/// quoted in the output — preserved faithfully per spec.md's own framing of
/// this as a confirmation point, not a defect (section 9).
const USAGE_STRING: &str = "(string <expr1> <expr2> ...)";
fn lp_string(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.is_empty() {
        return Err(RuntimeFuncError::arity("string", USAGE_STRING, crate::error::ARITY_AT_LEAST_ONE, 0).into());
    }
    let mut result = String::new();
    for arg in args {
        let _ = write!(result, "{}", arg);
    }
    Ok(Value::string(result))
}

pub fn table() -> Vec<Primitive> {
    vec![
        Primitive { name: "float", usage: USAGE_FLOAT, func: PrimitiveFn::Std(lp_float) },
        Primitive { name: "string", usage: USAGE_STRING, func: PrimitiveFn::Std(lp_string) },
    ]
}

pub fn register_help() {
    register_help(HelpEntry {
        name: "string".to_string(),
        signature: USAGE_STRING.to_string(),
        description: "Concatenates the printed form of each argument; string arguments appear quoted in the result."
            .to_string(),
        examples: vec!["(string 1 \" \" \"x\") ; => \"1 \\\"x\\\"\"".to_string()],
        related: vec!["float".to_string()],
        category: "Conversion".to_string(),
    });
    register_help(HelpEntry {
        name: "float".to_string(),
        signature: USAGE_FLOAT.to_string(),
        description: "Converts a number to its Float representation.".to_string(),
        examples: vec!["(float 5) ; => 5".to_string(), "(float 5/2) ; => 2.5".to_string()],
        related: vec!["trunc".to_string()],
        category: "Conversion".to_string(),
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
    fn test_float_of_integer() {
        assert_eq!(call("float", vec![Value::int(5)]).unwrap(), Value::Float(5.0));
    }

    #[test]
    fn test_string_quotes_string_args() {
        let result = call("string", vec![Value::int(1), Value::string("x")]).unwrap();
        assert_eq!(result, Value::string("1\"x\""));
    }

    #[test]
    fn test_string_requires_at_least_one_arg() {
        assert!(call("string", vec![]).is_err());
    }
}

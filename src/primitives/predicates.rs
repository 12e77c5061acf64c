// ABOUTME: Type predicate primitives (isNull?, isNumber?, isSymbol?, ...)

use crate::env::Environment;
use crate::error::{LypsResult, RuntimeFuncError};
use crate::help::{register_help, HelpEntry};
use crate::value::{Primitive, PrimitiveFn, Value};
use std::rc::Rc;

fn check_one(name: &str, usage: &str, args: &[Value]) -> LypsResult<&Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity(name, usage, crate::error::ARITY_ONE, args.len()).into());
    }
    Ok(&args[0])
}

macro_rules! predicate {
    ($fn_name:ident, $prim_name:literal, $usage:ident, $usage_str:literal, $test:expr) => {
        const $usage: &str = $usage_str;
        fn $fn_name(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
            let arg = check_one($prim_name, $usage, args)?;
            let test: fn(&Value) -> bool = $test;
            Ok(Value::bool_int(test(arg)))
        }
    };
}

predicate!(lp_is_null, "isNull?", USAGE_IS_NULL, "(isNull? <expr>)", Value::is_nil);
predicate!(lp_is_number, "isNumber?", USAGE_IS_NUMBER, "(isNumber? <expr>)", Value::is_number);
predicate!(lp_is_symbol, "isSymbol?", USAGE_IS_SYMBOL, "(isSymbol? <expr>)", |v| matches!(
    v,
    Value::Symbol(_)
));
predicate!(lp_is_atom, "isAtom?", USAGE_IS_ATOM, "(isAtom? <expr>)", Value::is_atom);
predicate!(lp_is_list, "isList?", USAGE_IS_LIST, "(isList? <expr>)", |v| matches!(
    v,
    Value::List(_)
));
predicate!(lp_is_map, "isMap?", USAGE_IS_MAP, "(isMap? <expr>)", |v| matches!(v, Value::Map(_)));
predicate!(lp_is_string, "isString?", USAGE_IS_STRING, "(isString? <expr>)", |v| matches!(
    v,
    Value::String(_)
));
predicate!(lp_is_function, "isFunction?", USAGE_IS_FUNCTION, "(isFunction? <expr>)", |v| {
    matches!(v, Value::Function(_) | Value::Primitive(_))
});

pub fn table() -> Vec<Primitive> {
    vec![
        Primitive { name: "isNull?", usage: USAGE_IS_NULL, func: PrimitiveFn::Std(lp_is_null) },
        Primitive { name: "isNumber?", usage: USAGE_IS_NUMBER, func: PrimitiveFn::Std(lp_is_number) },
        Primitive { name: "isSymbol?", usage: USAGE_IS_SYMBOL, func: PrimitiveFn::Std(lp_is_symbol) },
        Primitive { name: "isAtom?", usage: USAGE_IS_ATOM, func: PrimitiveFn::Std(lp_is_atom) },
        Primitive { name: "isList?", usage: USAGE_IS_LIST, func: PrimitiveFn::Std(lp_is_list) },
        Primitive { name: "isMap?", usage: USAGE_IS_MAP, func: PrimitiveFn::Std(lp_is_map) },
        Primitive { name: "isString?", usage: USAGE_IS_STRING, func: PrimitiveFn::Std(lp_is_string) },
        Primitive { name: "isFunction?", usage: USAGE_IS_FUNCTION, func: PrimitiveFn::Std(lp_is_function) },
    ]
}

pub fn register_help() {
    register_help(HelpEntry {
        name: "isNull?".to_string(),
        signature: USAGE_IS_NULL.to_string(),
        description: "Tests whether a value is the empty list (NULL).".to_string(),
        examples: vec!["(isNull? NULL) ; => 1".to_string(), "(isNull? 0) ; => 0".to_string()],
        related: vec!["isList?".to_string()],
        category: "Predicates".to_string(),
    });
    register_help(HelpEntry {
        name: "isFunction?".to_string(),
        signature: USAGE_IS_FUNCTION.to_string(),
        description: "Tests whether a value is callable: a user function or a primitive."
            .to_string(),
        examples: vec!["(isFunction? +) ; => 1".to_string()],
        related: vec!["isSymbol?".to_string()],
        category: "Predicates".to_string(),
    });
    register_help(HelpEntry {
        name: "isNumber?".to_string(),
        signature: USAGE_IS_NUMBER.to_string(),
        description: "Tests whether a value is an integer, rational, or float.".to_string(),
        examples: vec!["(isNumber? 2/3) ; => 1".to_string()],
        related: vec!["isAtom?".to_string()],
        category: "Predicates".to_string(),
    });
    register_help(HelpEntry {
        name: "isSymbol?".to_string(),
        signature: USAGE_IS_SYMBOL.to_string(),
        description: "Tests whether a value is a symbol.".to_string(),
        examples: vec!["(isSymbol? 'x) ; => 1".to_string()],
        related: vec!["isFunction?".to_string()],
        category: "Predicates".to_string(),
    });
    register_help(HelpEntry {
        name: "isAtom?".to_string(),
        signature: USAGE_IS_ATOM.to_string(),
        description: "Tests whether a value is anything other than a list.".to_string(),
        examples: vec!["(isAtom? \"x\") ; => 1".to_string(), "(isAtom? (list 1)) ; => 0".to_string()],
        related: vec!["isList?".to_string()],
        category: "Predicates".to_string(),
    });
    register_help(HelpEntry {
        name: "isList?".to_string(),
        signature: USAGE_IS_LIST.to_string(),
        description: "Tests whether a value is a list, including NULL.".to_string(),
        examples: vec!["(isList? (list 1 2)) ; => 1".to_string()],
        related: vec!["isNull?".to_string(), "isAtom?".to_string()],
        category: "Predicates".to_string(),
    });
    register_help(HelpEntry {
        name: "isMap?".to_string(),
        signature: USAGE_IS_MAP.to_string(),
        description: "Tests whether a value is a map.".to_string(),
        examples: vec!["(isMap? (map (a 1))) ; => 1".to_string()],
        related: vec!["isList?".to_string()],
        category: "Predicates".to_string(),
    });
    register_help(HelpEntry {
        name: "isString?".to_string(),
        signature: USAGE_IS_STRING.to_string(),
        description: "Tests whether a value is a string.".to_string(),
        examples: vec!["(isString? \"hi\") ; => 1".to_string()],
        related: vec!["isSymbol?".to_string()],
        category: "Predicates".to_string(),
    });
}

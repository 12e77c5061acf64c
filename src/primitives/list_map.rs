// ABOUTME: List and map primitives (list, first, rest, cons, push!, pop!, at, atSet!, join, hasValue?, map, update!, hasKey?)

use crate::env::Environment;
use crate::error::{LypsResult, RuntimeFuncError};
use crate::eval::eval;
use crate::help::{register_help, HelpEntry};
use crate::value::{Primitive, PrimitiveFn, Value};
use num_traits::ToPrimitive;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// The string a key coerces to for map storage / list indexing — symbols
/// use their bare name (not the quoted `Display` form), matching the
/// original's `str(key)` over an `int`/`float`/`str`/`LSymbol`.
fn map_key(v: &Value) -> Option<String> {
    match v {
        Value::Integer(n) => Some(n.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::String(s) => Some(s.to_string()),
        Value::Symbol(s) => Some(s.to_string()),
        _ => None,
    }
}

fn as_list(v: &Value) -> Option<&Rc<RefCell<Vec<Value>>>> {
    match v {
        Value::List(items) => Some(items),
        _ => None,
    }
}

fn as_map(v: &Value) -> Option<&Rc<RefCell<BTreeMap<String, Value>>>> {
    match v {
        Value::Map(map) => Some(map),
        _ => None,
    }
}

const USAGE_LIST: &str = "(list <expr1> <expr2> ...)";
fn lp_list(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.is_empty() {
        return Err(RuntimeFuncError::arity("list", USAGE_LIST, crate::error::ARITY_AT_LEAST_ONE, 0).into());
    }
    Ok(Value::list(args.to_vec()))
}

const USAGE_FIRST: &str = "(first <list>)";
fn lp_first(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity("first", USAGE_FIRST, crate::error::ARITY_ONE, args.len()).into());
    }
    let items = as_list(&args[0])
        .ok_or_else(|| RuntimeFuncError::type_mismatch("first", USAGE_FIRST, "a list", &args[0]))?;
    Ok(items.borrow().first().cloned().unwrap_or_else(Value::nil))
}

const USAGE_REST: &str = "(rest <list>)";
fn lp_rest(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity("rest", USAGE_REST, crate::error::ARITY_ONE, args.len()).into());
    }
    let items = as_list(&args[0])
        .ok_or_else(|| RuntimeFuncError::type_mismatch("rest", USAGE_REST, "a list", &args[0]))?;
    let items = items.borrow();
    if items.len() < 2 {
        Ok(Value::nil())
    } else {
        Ok(Value::list(items[1..].to_vec()))
    }
}

const USAGE_CONS: &str = "(cons <obj> <list>)";
fn lp_cons(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 2 {
        return Err(RuntimeFuncError::arity("cons", USAGE_CONS, crate::error::ARITY_TWO, args.len()).into());
    }
    let items = as_list(&args[1])
        .ok_or_else(|| RuntimeFuncError::type_mismatch("cons", USAGE_CONS, "a list", &args[1]))?;
    let mut new_items = Vec::with_capacity(items.borrow().len() + 1);
    new_items.push(args[0].clone());
    new_items.extend(items.borrow().iter().cloned());
    Ok(Value::list(new_items))
}

const USAGE_PUSH: &str = "(push! <list> <value>)";
fn lp_push(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 2 {
        return Err(RuntimeFuncError::arity("push!", USAGE_PUSH, crate::error::ARITY_TWO, args.len()).into());
    }
    let items = as_list(&args[0])
        .ok_or_else(|| RuntimeFuncError::type_mismatch("push!", USAGE_PUSH, "a list", &args[0]))?;
    items.borrow_mut().push(args[1].clone());
    Ok(args[0].clone())
}

const USAGE_POP: &str = "(pop! <list>)";
fn lp_pop(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity("pop!", USAGE_POP, crate::error::ARITY_ONE, args.len()).into());
    }
    let items = as_list(&args[0])
        .ok_or_else(|| RuntimeFuncError::type_mismatch("pop!", USAGE_POP, "a list", &args[0]))?;
    items
        .borrow_mut()
        .pop()
        .ok_or_else(|| RuntimeFuncError::new("pop!", USAGE_POP, "list is empty").into())
}

const USAGE_AT: &str = "(at <listOrMap> <keyOrIndex>)";
fn lp_at(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 2 {
        return Err(RuntimeFuncError::arity("at", USAGE_AT, crate::error::ARITY_TWO, args.len()).into());
    }
    if let Some(items) = as_list(&args[0]) {
        let index = index_of(&args[1])
            .ok_or_else(|| RuntimeFuncError::new("at", USAGE_AT, "invalid index"))?;
        items
            .borrow()
            .get(index)
            .cloned()
            .ok_or_else(|| RuntimeFuncError::new("at", USAGE_AT, "index out of range").into())
    } else if let Some(map) = as_map(&args[0]) {
        let key = map_key(&args[1]).ok_or_else(|| RuntimeFuncError::new("at", USAGE_AT, "invalid key"))?;
        map.borrow()
            .get(&key)
            .cloned()
            .ok_or_else(|| RuntimeFuncError::new("at", USAGE_AT, "no such key").into())
    } else {
        Err(RuntimeFuncError::type_mismatch("at", USAGE_AT, "a list or map", &args[0]).into())
    }
}

const USAGE_AT_SET: &str = "(atSet! <listOrMap> <keyOrIndex> <value>)";
fn lp_at_set(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 3 {
        return Err(RuntimeFuncError::arity("atSet!", USAGE_AT_SET, crate::error::ARITY_THREE, args.len()).into());
    }
    if let Some(items) = as_list(&args[0]) {
        let index = index_of(&args[1])
            .ok_or_else(|| RuntimeFuncError::new("atSet!", USAGE_AT_SET, "invalid index"))?;
        let mut items = items.borrow_mut();
        if index >= items.len() {
            return Err(RuntimeFuncError::new("atSet!", USAGE_AT_SET, "index out of range").into());
        }
        items[index] = args[2].clone();
    } else if let Some(map) = as_map(&args[0]) {
        let key = map_key(&args[1]).ok_or_else(|| RuntimeFuncError::new("atSet!", USAGE_AT_SET, "invalid key"))?;
        map.borrow_mut().insert(key, args[2].clone());
    } else {
        return Err(RuntimeFuncError::type_mismatch("atSet!", USAGE_AT_SET, "a list or map", &args[0]).into());
    }
    Ok(args[2].clone())
}

fn index_of(v: &Value) -> Option<usize> {
    match v {
        Value::Integer(n) => n.to_usize(),
        _ => None,
    }
}

const USAGE_JOIN: &str = "(join <list1> <list2>)";
fn lp_join(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 2 {
        return Err(RuntimeFuncError::arity("join", USAGE_JOIN, crate::error::ARITY_TWO, args.len()).into());
    }
    let a = as_list(&args[0])
        .ok_or_else(|| RuntimeFuncError::type_mismatch("join", USAGE_JOIN, "a list", &args[0]))?;
    let b = as_list(&args[1])
        .ok_or_else(|| RuntimeFuncError::type_mismatch("join", USAGE_JOIN, "a list", &args[1]))?;
    let mut joined = a.borrow().clone();
    joined.extend(b.borrow().iter().cloned());
    Ok(Value::list(joined))
}

const USAGE_HAS_VALUE: &str = "(hasValue? <listOrMap> <value>)";
fn lp_has_value(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 2 {
        return Err(
            RuntimeFuncError::arity("hasValue?", USAGE_HAS_VALUE, crate::error::ARITY_TWO, args.len()).into(),
        );
    }
    if let Some(items) = as_list(&args[0]) {
        Ok(Value::bool_int(items.borrow().iter().any(|v| v == &args[1])))
    } else if let Some(map) = as_map(&args[0]) {
        Ok(Value::bool_int(map.borrow().values().any(|v| v == &args[1])))
    } else {
        Err(RuntimeFuncError::type_mismatch("hasValue?", USAGE_HAS_VALUE, "a list or map", &args[0]).into())
    }
}

/// `stdEvalOrd = false`: each argument form is an unevaluated `(key value)`
/// pair — the key form is consumed literally (so a bare symbol key names
/// itself rather than being looked up) while the value form is evaluated
/// once, here, directly (spec.md section 4.4; grounded in
/// `LypsInterpreter.constructPrimitives`'s `LP_map`).
const USAGE_MAP: &str = "(map (<key1> <val1>) (<key2> <val2>) ...)";
fn lp_map(args: &[Value], env: &Rc<Environment>) -> LypsResult<Value> {
    if args.is_empty() {
        return Err(RuntimeFuncError::arity("map", USAGE_MAP, crate::error::ARITY_AT_LEAST_ONE, 0).into());
    }
    let mut entries = BTreeMap::new();
    for (i, entry) in args.iter().enumerate() {
        let pair = as_list(entry).map(|items| items.borrow().clone()).ok_or_else(|| {
            RuntimeFuncError::new("map", USAGE_MAP, format!("entry {} is not a (key value) pair", i + 1))
        })?;
        if pair.len() != 2 {
            return Err(RuntimeFuncError::new(
                "map",
                USAGE_MAP,
                format!("entry {} does not contain a (key value) pair", i + 1),
            )
            .into());
        }
        let key = map_key(&pair[0])
            .ok_or_else(|| RuntimeFuncError::new("map", USAGE_MAP, format!("entry {} has an invalid key type", i + 1)))?;
        let value = eval(env, &pair[1])?;
        entries.insert(key, value);
    }
    Ok(Value::Map(Rc::new(RefCell::new(entries))))
}

const USAGE_UPDATE: &str = "(update! <map1> <map2>)";
fn lp_update(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 2 {
        return Err(RuntimeFuncError::arity("update!", USAGE_UPDATE, crate::error::ARITY_TWO, args.len()).into());
    }
    let a = as_map(&args[0])
        .ok_or_else(|| RuntimeFuncError::type_mismatch("update!", USAGE_UPDATE, "a map", &args[0]))?;
    let b = as_map(&args[1])
        .ok_or_else(|| RuntimeFuncError::type_mismatch("update!", USAGE_UPDATE, "a map", &args[1]))?;
    for (k, v) in b.borrow().iter() {
        a.borrow_mut().insert(k.clone(), v.clone());
    }
    Ok(args[0].clone())
}

const USAGE_HAS_KEY: &str = "(hasKey? <map> <key>)";
fn lp_has_key(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 2 {
        return Err(RuntimeFuncError::arity("hasKey?", USAGE_HAS_KEY, crate::error::ARITY_TWO, args.len()).into());
    }
    let map = as_map(&args[0])
        .ok_or_else(|| RuntimeFuncError::type_mismatch("hasKey?", USAGE_HAS_KEY, "a map", &args[0]))?;
    let key = map_key(&args[1]).ok_or_else(|| RuntimeFuncError::new("hasKey?", USAGE_HAS_KEY, "invalid key"))?;
    Ok(Value::bool_int(map.borrow().contains_key(&key)))
}

pub fn table() -> Vec<Primitive> {
    vec![
        Primitive { name: "list", usage: USAGE_LIST, func: PrimitiveFn::Std(lp_list) },
        Primitive { name: "first", usage: USAGE_FIRST, func: PrimitiveFn::Std(lp_first) },
        Primitive { name: "rest", usage: USAGE_REST, func: PrimitiveFn::Std(lp_rest) },
        Primitive { name: "cons", usage: USAGE_CONS, func: PrimitiveFn::Std(lp_cons) },
        Primitive { name: "push!", usage: USAGE_PUSH, func: PrimitiveFn::Std(lp_push) },
        Primitive { name: "pop!", usage: USAGE_POP, func: PrimitiveFn::Std(lp_pop) },
        Primitive { name: "at", usage: USAGE_AT, func: PrimitiveFn::Std(lp_at) },
        Primitive { name: "atSet!", usage: USAGE_AT_SET, func: PrimitiveFn::Std(lp_at_set) },
        Primitive { name: "join", usage: USAGE_JOIN, func: PrimitiveFn::Std(lp_join) },
        Primitive { name: "hasValue?", usage: USAGE_HAS_VALUE, func: PrimitiveFn::Std(lp_has_value) },
        Primitive { name: "map", usage: USAGE_MAP, func: PrimitiveFn::Raw(lp_map) },
        Primitive { name: "update!", usage: USAGE_UPDATE, func: PrimitiveFn::Std(lp_update) },
        Primitive { name: "hasKey?", usage: USAGE_HAS_KEY, func: PrimitiveFn::Std(lp_has_key) },
    ]
}

pub fn register_help() {
    register_help(HelpEntry {
        name: "cons".to_string(),
        signature: USAGE_CONS.to_string(),
        description: "Returns a new list with obj prepended; the original list is not modified."
            .to_string(),
        examples: vec!["(cons 1 (list 2 3)) ; => (1 2 3)".to_string()],
        related: vec!["first".to_string(), "rest".to_string(), "push!".to_string()],
        category: "List/Map".to_string(),
    });
    register_help(HelpEntry {
        name: "map".to_string(),
        signature: USAGE_MAP.to_string(),
        description: "Constructs a map from (key value) pairs; keys are taken literally (not evaluated) and coerced to string."
            .to_string(),
        examples: vec!["(map (a 1) (b 2)) ; => (MAP (A 1) (B 2))".to_string()],
        related: vec!["at".to_string(), "atSet!".to_string(), "hasKey?".to_string()],
        category: "List/Map".to_string(),
    });
    register_help(HelpEntry {
        name: "list".to_string(),
        signature: USAGE_LIST.to_string(),
        description: "Builds a list out of its evaluated arguments.".to_string(),
        examples: vec!["(list 1 2 3) ; => (1 2 3)".to_string()],
        related: vec!["cons".to_string()],
        category: "List/Map".to_string(),
    });
    register_help(HelpEntry {
        name: "first".to_string(),
        signature: USAGE_FIRST.to_string(),
        description: "Returns the first element of a list, or NULL if it's empty.".to_string(),
        examples: vec!["(first (list 1 2 3)) ; => 1".to_string()],
        related: vec!["rest".to_string(), "cons".to_string()],
        category: "List/Map".to_string(),
    });
    register_help(HelpEntry {
        name: "rest".to_string(),
        signature: USAGE_REST.to_string(),
        description: "Returns every element but the first; NULL if the list has fewer than two elements."
            .to_string(),
        examples: vec!["(rest (list 1 2 3)) ; => (2 3)".to_string()],
        related: vec!["first".to_string(), "cons".to_string()],
        category: "List/Map".to_string(),
    });
    register_help(HelpEntry {
        name: "push!".to_string(),
        signature: USAGE_PUSH.to_string(),
        description: "Appends a value onto a list in place, mutating its first argument.".to_string(),
        examples: vec!["(push! lst 4)".to_string()],
        related: vec!["pop!".to_string(), "cons".to_string()],
        category: "List/Map".to_string(),
    });
    register_help(HelpEntry {
        name: "pop!".to_string(),
        signature: USAGE_POP.to_string(),
        description: "Removes and returns a list's last element in place.".to_string(),
        examples: vec!["(pop! lst)".to_string()],
        related: vec!["push!".to_string()],
        category: "List/Map".to_string(),
    });
    register_help(HelpEntry {
        name: "at".to_string(),
        signature: USAGE_AT.to_string(),
        description: "Indexes a list by position or a map by key.".to_string(),
        examples: vec!["(at (list 10 20) 1) ; => 20".to_string()],
        related: vec!["atSet!".to_string()],
        category: "List/Map".to_string(),
    });
    register_help(HelpEntry {
        name: "atSet!".to_string(),
        signature: USAGE_AT_SET.to_string(),
        description: "Mutates a list index or map key in place, returning the new value.".to_string(),
        examples: vec!["(atSet! lst 0 99)".to_string()],
        related: vec!["at".to_string()],
        category: "List/Map".to_string(),
    });
    register_help(HelpEntry {
        name: "join".to_string(),
        signature: USAGE_JOIN.to_string(),
        description: "Concatenates two lists into a new list.".to_string(),
        examples: vec!["(join (list 1) (list 2)) ; => (1 2)".to_string()],
        related: vec!["cons".to_string()],
        category: "List/Map".to_string(),
    });
    register_help(HelpEntry {
        name: "hasValue?".to_string(),
        signature: USAGE_HAS_VALUE.to_string(),
        description: "Tests whether a list or map's values contain a given value.".to_string(),
        examples: vec!["(hasValue? (list 1 2) 2) ; => 1".to_string()],
        related: vec!["hasKey?".to_string()],
        category: "List/Map".to_string(),
    });
    register_help(HelpEntry {
        name: "update!".to_string(),
        signature: USAGE_UPDATE.to_string(),
        description: "Merges a second map's entries into the first in place.".to_string(),
        examples: vec!["(update! m1 m2)".to_string()],
        related: vec!["atSet!".to_string()],
        category: "List/Map".to_string(),
    });
    register_help(HelpEntry {
        name: "hasKey?".to_string(),
        signature: USAGE_HAS_KEY.to_string(),
        description: "Tests whether a map has a given key.".to_string(),
        examples: vec!["(hasKey? m 'a) ; => 1".to_string()],
        related: vec!["hasValue?".to_string(), "at".to_string()],
        category: "List/Map".to_string(),
    });
}

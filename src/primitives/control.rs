// ABOUTME: Control-flow and special-form primitives (lam, block, if, cond, case,
// ABOUTME: quote/backquote/comma/comma-at, while, eval, parse, pprint)

use crate::env::Environment;
use crate::error::{LypsResult, RuntimeFuncError};
use crate::eval::eval;
use crate::help::{register_help, HelpEntry};
use crate::value::{LFunction, Primitive, PrimitiveFn, Value};
use std::rc::Rc;

const USAGE_LAM: &str = "(lam (<param1> <param2> ...) <expr1> <expr2> ...)";
fn lp_lam(args: &[Value], _env: &Rc<Environment>) -> LypsResult<Value> {
    let (params_form, body) = args
        .split_first()
        .ok_or_else(|| RuntimeFuncError::arity("lam", USAGE_LAM, "at least 1", 0))?;
    let params = match params_form {
        Value::List(items) => items
            .borrow()
            .iter()
            .map(|p| {
                p.as_symbol_name()
                    .map(str::to_string)
                    .ok_or_else(|| RuntimeFuncError::type_mismatch("lam", USAGE_LAM, "a symbol", p).into())
            })
            .collect::<LypsResult<Vec<String>>>()?,
        _ => return Err(RuntimeFuncError::type_mismatch("lam", USAGE_LAM, "a parameter list", params_form).into()),
    };
    Ok(Value::Function(Rc::new(LFunction {
        name: String::new(),
        params,
        body: body.to_vec(),
    })))
}

const USAGE_BLOCK: &str = "(block <expr1> <expr2> ...)";
fn lp_block(args: &[Value], env: &Rc<Environment>) -> LypsResult<Value> {
    if args.is_empty() {
        return Err(RuntimeFuncError::arity("block", USAGE_BLOCK, crate::error::ARITY_AT_LEAST_ONE, 0).into());
    }
    let scope = env.open_scope();
    let mut last = Value::nil();
    for expr in args {
        last = eval(&scope, expr)?;
    }
    Ok(last)
}

const USAGE_IF: &str = "(if <cond> <conseq> [<alt>])";
fn lp_if(args: &[Value], env: &Rc<Environment>) -> LypsResult<Value> {
    if !(2..=3).contains(&args.len()) {
        return Err(RuntimeFuncError::arity("if", USAGE_IF, crate::error::ARITY_TWO_OR_THREE, args.len()).into());
    }
    if eval(env, &args[0])?.is_truthy() {
        eval(env, &args[1])
    } else if args.len() == 3 {
        eval(env, &args[2])
    } else {
        Ok(Value::nil())
    }
}

const USAGE_COND: &str = "(cond (<cond1> <expr1>) (<cond2> <expr2>) ...)";
fn lp_cond(args: &[Value], env: &Rc<Environment>) -> LypsResult<Value> {
    if args.is_empty() {
        return Err(RuntimeFuncError::arity("cond", USAGE_COND, crate::error::ARITY_AT_LEAST_ONE, 0).into());
    }
    for (i, case) in args.iter().enumerate() {
        let pair = match case {
            Value::List(items) => items.borrow().clone(),
            _ => {
                return Err(RuntimeFuncError::new(
                    "cond",
                    USAGE_COND,
                    format!("entry {} is not a (<cond> <expr>) pair", i + 1),
                )
                .into())
            }
        };
        if pair.len() != 2 {
            return Err(RuntimeFuncError::new(
                "cond",
                USAGE_COND,
                format!("entry {} does not contain a (<cond> <expr>) pair", i + 1),
            )
            .into());
        }
        if eval(env, &pair[0])?.is_truthy() {
            return eval(env, &pair[1]);
        }
    }
    Ok(Value::nil())
}

const USAGE_CASE: &str = "(case <expr> (<val1> <expr1>) (<val2> <expr2>) ...)";
fn lp_case(args: &[Value], env: &Rc<Environment>) -> LypsResult<Value> {
    let (expr, cases) = args
        .split_first()
        .ok_or_else(|| RuntimeFuncError::arity("case", USAGE_CASE, crate::error::ARITY_AT_LEAST_TWO, 0))?;
    let expr_val = eval(env, expr)?;
    for (i, case) in cases.iter().enumerate() {
        let pair = match case {
            Value::List(items) => items.borrow().clone(),
            _ => {
                return Err(RuntimeFuncError::new(
                    "case",
                    USAGE_CASE,
                    format!("entry {} is not a (<val> <expr>) pair", i + 1),
                )
                .into())
            }
        };
        if pair.len() != 2 {
            return Err(RuntimeFuncError::new(
                "case",
                USAGE_CASE,
                format!("entry {} does not contain a (<val> <expr>) pair", i + 1),
            )
            .into());
        }
        if eval(env, &pair[0])? == expr_val {
            return eval(env, &pair[1]);
        }
    }
    Ok(Value::nil())
}

const USAGE_QUOTE: &str = "(quote <expr>)";
fn lp_quote(args: &[Value], _env: &Rc<Environment>) -> LypsResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity("quote", USAGE_QUOTE, crate::error::ARITY_ONE, args.len()).into());
    }
    Ok(args[0].clone())
}

/// Walks `expr`, evaluating the subordinate form of any `(comma ...)` node
/// in place and splicing the subordinate form of any `(comma-at ...)` node
/// into its enclosing list — matching spec.md section 4.3's quasiquotation
/// rule (a deliberate divergence from the original Python, whose
/// `backquote_expand` never actually splices `COMMA-AT`, substituting a
/// single value just like `COMMA`). `depth` tracks backquote nesting
/// textually; since expansion is only ever entered at depth 1 and any
/// literal nested `(backquote ...)` is rejected outright, it never climbs
/// past 1 in practice, but it is threaded rather than tracked globally.
fn expand_quasiquote(env: &Rc<Environment>, expr: &Value, depth: u32) -> LypsResult<Value> {
    let items = match expr {
        Value::List(items) => items,
        _ => return Ok(expr.clone()),
    };
    let items = items.borrow();
    if items.is_empty() {
        return Ok(Value::nil());
    }
    if let Some(head) = items[0].as_symbol_name() {
        if head == "COMMA" || head == "COMMA-AT" {
            if items.len() != 2 {
                return Err(RuntimeFuncError::arity(
                    if head == "COMMA" { "comma" } else { "comma-at" },
                    "(comma <expr>)",
                    crate::error::ARITY_ONE,
                    items.len().saturating_sub(1),
                )
                .into());
            }
            return eval(env, &items[1]);
        }
        if head == "BACKQUOTE" && depth >= 1 {
            return Err(RuntimeFuncError::new("backquote", USAGE_BACKQUOTE, "cannot nest backquotes").into());
        }
    }
    let mut result = Vec::with_capacity(items.len());
    for elt in items.iter() {
        let splice_target = if let Value::List(sub) = elt {
            let sub = sub.borrow();
            if sub.len() == 2 && sub[0].as_symbol_name() == Some("COMMA-AT") {
                Some(sub[1].clone())
            } else {
                None
            }
        } else {
            None
        };
        if let Some(subordinate) = splice_target {
            match eval(env, &subordinate)? {
                Value::List(xs) => result.extend(xs.borrow().iter().cloned()),
                other => {
                    return Err(RuntimeFuncError::type_mismatch(
                        "comma-at",
                        USAGE_COMMA_AT,
                        "a list",
                        &other,
                    )
                    .into())
                }
            }
        } else {
            result.push(expand_quasiquote(env, elt, depth)?);
        }
    }
    Ok(Value::list(result))
}

const USAGE_BACKQUOTE: &str = "(backquote <expr>)";
fn lp_backquote(args: &[Value], env: &Rc<Environment>) -> LypsResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity("backquote", USAGE_BACKQUOTE, crate::error::ARITY_ONE, args.len())
            .into());
    }
    expand_quasiquote(env, &args[0], 1)
}

const USAGE_COMMA: &str = "(comma <expr>)";
fn lp_comma(_args: &[Value], _env: &Rc<Environment>) -> LypsResult<Value> {
    Err(RuntimeFuncError::new("comma", USAGE_COMMA, "comma can only occur inside a backquote").into())
}

const USAGE_COMMA_AT: &str = "(comma-at <expr>)";
fn lp_comma_at(_args: &[Value], _env: &Rc<Environment>) -> LypsResult<Value> {
    Err(RuntimeFuncError::new("comma-at", USAGE_COMMA_AT, "comma-at can only occur inside a backquote").into())
}

const USAGE_WHILE: &str = "(while <conditionExpr> <bodyExpr>)";
fn lp_while(args: &[Value], env: &Rc<Environment>) -> LypsResult<Value> {
    if args.len() != 2 {
        return Err(RuntimeFuncError::arity("while", USAGE_WHILE, crate::error::ARITY_TWO, args.len()).into());
    }
    let (cond_expr, body_expr) = (&args[0], &args[1]);
    let mut result = Value::nil();
    while eval(env, cond_expr)?.is_truthy() {
        result = eval(env, body_expr)?;
    }
    Ok(result)
}

const USAGE_EVAL: &str = "(eval <expr>)";
fn lp_eval(env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity("eval", USAGE_EVAL, crate::error::ARITY_ONE, args.len()).into());
    }
    eval(env, &args[0])
}

const USAGE_PARSE: &str = "(parse <lypsExpressionString>)";
fn lp_parse(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity("parse", USAGE_PARSE, crate::error::ARITY_ONE, args.len()).into());
    }
    let source = match &args[0] {
        Value::String(s) => s.as_ref(),
        _ => return Err(RuntimeFuncError::type_mismatch("parse", USAGE_PARSE, "a string", &args[0]).into()),
    };
    crate::reader::parse(source).map_err(Into::into)
}

const USAGE_PPRINT: &str = "(pprint <lypsExpr>)";
fn lp_pprint(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity("pprint", USAGE_PPRINT, crate::error::ARITY_ONE, args.len()).into());
    }
    println!("{}", args[0]);
    Ok(args[0].clone())
}

pub fn table() -> Vec<Primitive> {
    vec![
        Primitive { name: "lam", usage: USAGE_LAM, func: PrimitiveFn::Raw(lp_lam) },
        Primitive { name: "block", usage: USAGE_BLOCK, func: PrimitiveFn::Raw(lp_block) },
        Primitive { name: "if", usage: USAGE_IF, func: PrimitiveFn::Raw(lp_if) },
        Primitive { name: "cond", usage: USAGE_COND, func: PrimitiveFn::Raw(lp_cond) },
        Primitive { name: "case", usage: USAGE_CASE, func: PrimitiveFn::Raw(lp_case) },
        Primitive { name: "quote", usage: USAGE_QUOTE, func: PrimitiveFn::Raw(lp_quote) },
        Primitive { name: "backquote", usage: USAGE_BACKQUOTE, func: PrimitiveFn::Raw(lp_backquote) },
        Primitive { name: "comma", usage: USAGE_COMMA, func: PrimitiveFn::Raw(lp_comma) },
        Primitive { name: "comma-at", usage: USAGE_COMMA_AT, func: PrimitiveFn::Raw(lp_comma_at) },
        Primitive { name: "while", usage: USAGE_WHILE, func: PrimitiveFn::Raw(lp_while) },
        Primitive { name: "eval", usage: USAGE_EVAL, func: PrimitiveFn::Std(lp_eval) },
        Primitive { name: "parse", usage: USAGE_PARSE, func: PrimitiveFn::Std(lp_parse) },
        Primitive { name: "pprint", usage: USAGE_PPRINT, func: PrimitiveFn::Std(lp_pprint) },
    ]
}

pub fn register_help() {
    register_help(HelpEntry {
        name: "if".to_string(),
        signature: USAGE_IF.to_string(),
        description: "Evaluates <cond>; if truthy evaluates <conseq>, else the optional <alt> (or NULL)."
            .to_string(),
        examples: vec!["(if (> x 0) 'POS 'NEG)".to_string()],
        related: vec!["cond".to_string(), "case".to_string()],
        category: "Control".to_string(),
    });
    register_help(HelpEntry {
        name: "lam".to_string(),
        signature: USAGE_LAM.to_string(),
        description: "Builds an anonymous function; identical to defun! without a name binding."
            .to_string(),
        examples: vec!["(lam (x) (* x x))".to_string()],
        related: vec!["defun!".to_string(), "block".to_string()],
        category: "Control".to_string(),
    });
    register_help(HelpEntry {
        name: "backquote".to_string(),
        signature: USAGE_BACKQUOTE.to_string(),
        description: "Quotes <expr>, except that (comma x) and (comma-at x) sub-forms are evaluated in place."
            .to_string(),
        examples: vec!["(backquote (1 (comma (+ 1 1)) 3)) ; => (1 2 3)".to_string()],
        related: vec!["quote".to_string(), "comma".to_string()],
        category: "Control".to_string(),
    });
    register_help(HelpEntry {
        name: "block".to_string(),
        signature: USAGE_BLOCK.to_string(),
        description: "Evaluates each expression in order in a fresh scope, returning the last result.".to_string(),
        examples: vec!["(block (def! x 1) (+ x 1)) ; => 2".to_string()],
        related: vec!["lam".to_string()],
        category: "Control".to_string(),
    });
    register_help(HelpEntry {
        name: "cond".to_string(),
        signature: USAGE_COND.to_string(),
        description: "Evaluates each (<cond> <expr>) pair in order, returning the first whose <cond> is truthy."
            .to_string(),
        examples: vec!["(cond (0 'A) (1 'B)) ; => B".to_string()],
        related: vec!["if".to_string(), "case".to_string()],
        category: "Control".to_string(),
    });
    register_help(HelpEntry {
        name: "case".to_string(),
        signature: USAGE_CASE.to_string(),
        description: "Evaluates <expr>, then returns the first case whose value is equal to it.".to_string(),
        examples: vec!["(case 2 (1 'one) (2 'two)) ; => TWO".to_string()],
        related: vec!["cond".to_string()],
        category: "Control".to_string(),
    });
    register_help(HelpEntry {
        name: "quote".to_string(),
        signature: USAGE_QUOTE.to_string(),
        description: "Returns <expr> unevaluated.".to_string(),
        examples: vec!["(quote (+ 1 2)) ; => (+ 1 2)".to_string(), "'(+ 1 2) ; same thing".to_string()],
        related: vec!["backquote".to_string()],
        category: "Control".to_string(),
    });
    register_help(HelpEntry {
        name: "comma".to_string(),
        signature: USAGE_COMMA.to_string(),
        description: "Only meaningful inside backquote: evaluates <expr> in place.".to_string(),
        examples: vec!["`(1 ,(+ 1 1)) ; => (1 2)".to_string()],
        related: vec!["backquote".to_string(), "comma-at".to_string()],
        category: "Control".to_string(),
    });
    register_help(HelpEntry {
        name: "comma-at".to_string(),
        signature: USAGE_COMMA_AT.to_string(),
        description: "Only meaningful inside backquote: evaluates <expr> and splices its list elements in place."
            .to_string(),
        examples: vec!["`(1 ,@(list 2 3) 4) ; => (1 2 3 4)".to_string()],
        related: vec!["comma".to_string(), "backquote".to_string()],
        category: "Control".to_string(),
    });
    register_help(HelpEntry {
        name: "while".to_string(),
        signature: USAGE_WHILE.to_string(),
        description: "Repeats <bodyExpr> while <conditionExpr> is truthy, returning the last body result."
            .to_string(),
        examples: vec!["(while (< n 3) (set! n (+ n 1)))".to_string()],
        related: vec!["if".to_string()],
        category: "Control".to_string(),
    });
    register_help(HelpEntry {
        name: "eval".to_string(),
        signature: USAGE_EVAL.to_string(),
        description: "Evaluates an already-evaluated value a second time, as if it were freshly read.".to_string(),
        examples: vec!["(eval (quote (+ 1 2))) ; => 3".to_string()],
        related: vec!["parse".to_string()],
        category: "Control".to_string(),
    });
    register_help(HelpEntry {
        name: "parse".to_string(),
        signature: USAGE_PARSE.to_string(),
        description: "Reads a string as Lyps source, returning the resulting value without evaluating it."
            .to_string(),
        examples: vec!["(parse \"(+ 1 2)\") ; => (+ 1 2)".to_string()],
        related: vec!["eval".to_string()],
        category: "Control".to_string(),
    });
    register_help(HelpEntry {
        name: "pprint".to_string(),
        signature: USAGE_PPRINT.to_string(),
        description: "Prints a value's pretty-printed form to standard output and returns the value unchanged."
            .to_string(),
        examples: vec!["(pprint (list 1 2 3))".to_string()],
        related: vec!["write!".to_string()],
        category: "Control".to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;

    fn call_raw(name: &str, args: Vec<Value>, env: &Rc<Environment>) -> LypsResult<Value> {
        let table = table();
        let prim = table.iter().find(|p| p.name == name).unwrap();
        match prim.func {
            PrimitiveFn::Raw(f) => f(&args, env),
            PrimitiveFn::Std(f) => f(env, &args),
        }
    }

    #[test]
    fn test_if_picks_then_branch() {
        let env = Environment::new_global();
        let result = call_raw("if", vec![Value::int(1), Value::int(10), Value::int(20)], &env).unwrap();
        assert_eq!(result, Value::int(10));
    }

    #[test]
    fn test_if_missing_alt_is_null() {
        let env = Environment::new_global();
        let result = call_raw("if", vec![Value::int(0), Value::int(10)], &env).unwrap();
        assert!(result.is_nil());
    }

    #[test]
    fn test_cond_first_match_wins() {
        let env = Environment::new_global();
        let cases = vec![
            Value::list(vec![Value::int(0), Value::int(1)]),
            Value::list(vec![Value::int(1), Value::int(2)]),
        ];
        let result = call_raw("cond", cases, &env).unwrap();
        assert_eq!(result, Value::int(2));
    }

    #[test]
    fn test_case_matches_by_value() {
        let env = Environment::new_global();
        let args = vec![
            Value::int(2),
            Value::list(vec![Value::int(1), Value::string("one")]),
            Value::list(vec![Value::int(2), Value::string("two")]),
        ];
        let result = call_raw("case", args, &env).unwrap();
        assert_eq!(result, Value::string("two"));
    }

    #[test]
    fn test_quote_returns_form_unevaluated() {
        let env = Environment::new_global();
        let form = Value::list(vec![Value::symbol("+"), Value::int(1), Value::int(2)]);
        let result = call_raw("quote", vec![form.clone()], &env).unwrap();
        assert_eq!(result, form);
    }

    #[test]
    fn test_lam_builds_anonymous_function() {
        let env = Environment::new_global();
        let result = call_raw(
            "lam",
            vec![Value::list(vec![Value::symbol("x")]), Value::symbol("x")],
            &env,
        )
        .unwrap();
        match result {
            Value::Function(f) => assert!(f.name.is_empty()),
            _ => panic!("expected a function"),
        }
    }

    #[test]
    fn test_backquote_evaluates_comma_only() {
        let env = Environment::new_global();
        crate::primitives::register_all(&env);
        let form = Value::list(vec![
            Value::int(1),
            Value::list(vec![
                Value::symbol("comma"),
                Value::list(vec![Value::symbol("+"), Value::int(1), Value::int(1)]),
            ]),
            Value::int(3),
        ]);
        let result = call_raw("backquote", vec![form], &env).unwrap();
        assert_eq!(result, Value::list(vec![Value::int(1), Value::int(2), Value::int(3)]));
    }

    #[test]
    fn test_while_accumulates_last_body_result() {
        let env = Environment::new_global();
        env.define_local("N", Value::int(0));
        let cond = Value::list(vec![Value::symbol("<"), Value::symbol("N"), Value::int(3)]);
        let body = Value::list(vec![
            Value::symbol("set!"),
            Value::symbol("N"),
            Value::list(vec![Value::symbol("+"), Value::symbol("N"), Value::int(1)]),
        ]);
        crate::primitives::register_all(&env);
        let result = call_raw("while", vec![cond, body], &env).unwrap();
        assert_eq!(result, Value::int(3));
    }

    #[test]
    fn test_comma_outside_backquote_errors() {
        let env = Environment::new_global();
        assert!(call_raw("comma", vec![Value::int(1)], &env).is_err());
    }
}

// ABOUTME: Definition primitives (def!, def!!, defun!, defun!!, defmacro!!, set!, undef!, symtab!)

use crate::env::Environment;
use crate::error::{LypsResult, RuntimeFuncError};
use crate::eval::eval;
use crate::help::{register_help, HelpEntry};
use crate::value::{LFunction, LMacro, Primitive, PrimitiveFn, Value};
use std::rc::Rc;

/// These binders are `stdEvalOrd = false`: the first argument is a literal,
/// unevaluated form. Most callers write it bare (`(def! x 10)`), but since a
/// reader-level quote (`'x`) expands to `(QUOTE X)`, `(def! 'x 10)` is
/// equally valid — unwrap one level of `QUOTE` before requiring a symbol.
fn symbol_name(name: &str, usage: &str, v: &Value) -> LypsResult<String> {
    let target = match v {
        Value::List(items) => {
            let items = items.borrow();
            if items.len() == 2 && items[0].as_symbol_name() == Some("QUOTE") {
                items[1].clone()
            } else {
                v.clone()
            }
        }
        _ => v.clone(),
    };
    target
        .as_symbol_name()
        .map(str::to_string)
        .ok_or_else(|| RuntimeFuncError::type_mismatch(name, usage, "a symbol", v).into())
}

fn param_names(name: &str, usage: &str, v: &Value) -> LypsResult<Vec<String>> {
    match v {
        Value::List(items) => items
            .borrow()
            .iter()
            .map(|p| symbol_name(name, usage, p))
            .collect(),
        _ => Err(RuntimeFuncError::type_mismatch(name, usage, "a list of symbols", v).into()),
    }
}

const USAGE_DEF_LOCAL: &str = "(def! <symbol> <expr>)";
fn lp_def_local(args: &[Value], env: &Rc<Environment>) -> LypsResult<Value> {
    if args.len() != 2 {
        return Err(RuntimeFuncError::arity("def!", USAGE_DEF_LOCAL, crate::error::ARITY_TWO, args.len()).into());
    }
    let name = symbol_name("def!", USAGE_DEF_LOCAL, &args[0])?;
    let mut value = eval(env, &args[1])?;
    name_if_function(&mut value, &name);
    env.define_local(name, value.clone());
    Ok(value)
}

const USAGE_DEF_GLOBAL: &str = "(def!! <symbol> <expr>)";
fn lp_def_global(args: &[Value], env: &Rc<Environment>) -> LypsResult<Value> {
    if args.len() != 2 {
        return Err(RuntimeFuncError::arity("def!!", USAGE_DEF_GLOBAL, crate::error::ARITY_TWO, args.len()).into());
    }
    let name = symbol_name("def!!", USAGE_DEF_GLOBAL, &args[0])?;
    let mut value = eval(env, &args[1])?;
    name_if_function(&mut value, &name);
    env.define_global(name, value.clone());
    Ok(value)
}

/// The original renames an anonymous `lam` result to the name it's being
/// bound to (`val.setName(key)`); since `Value::Function` holds its name in
/// an immutable `Rc<LFunction>`, the only way to rename is to rebuild it —
/// only done when the function is still anonymous.
fn name_if_function(value: &mut Value, name: &str) {
    if let Value::Function(f) = value {
        if f.name.is_empty() {
            *value = Value::Function(Rc::new(LFunction {
                name: name.to_string(),
                params: f.params.clone(),
                body: f.body.clone(),
            }));
        }
    }
}

const USAGE_DEFUN_LOCAL: &str = "(defun! <symbol> (<param1> <param2> ...) <expr1> <expr2> ...)";
fn lp_defun_local(args: &[Value], env: &Rc<Environment>) -> LypsResult<Value> {
    if args.len() < 3 {
        return Err(RuntimeFuncError::arity("defun!", USAGE_DEFUN_LOCAL, "at least 3", args.len()).into());
    }
    let name = symbol_name("defun!", USAGE_DEFUN_LOCAL, &args[0])?;
    let params = param_names("defun!", USAGE_DEFUN_LOCAL, &args[1])?;
    let func = Value::Function(Rc::new(LFunction {
        name: name.clone(),
        params,
        body: args[2..].to_vec(),
    }));
    env.define_local(name, func.clone());
    Ok(func)
}

const USAGE_DEFUN_GLOBAL: &str = "(defun!! <symbol> (<param1> <param2> ...) <expr1> <expr2> ...)";
fn lp_defun_global(args: &[Value], env: &Rc<Environment>) -> LypsResult<Value> {
    if args.len() < 3 {
        return Err(RuntimeFuncError::arity("defun!!", USAGE_DEFUN_GLOBAL, "at least 3", args.len()).into());
    }
    let name = symbol_name("defun!!", USAGE_DEFUN_GLOBAL, &args[0])?;
    let params = param_names("defun!!", USAGE_DEFUN_GLOBAL, &args[1])?;
    let func = Value::Function(Rc::new(LFunction {
        name: name.clone(),
        params,
        body: args[2..].to_vec(),
    }));
    env.define_global(name, func.clone());
    Ok(func)
}

const USAGE_DEFMACRO: &str = "(defmacro!! <symbol> (<param1> <param2> ...) <expr1> <expr2> ...)";
fn lp_defmacro(args: &[Value], env: &Rc<Environment>) -> LypsResult<Value> {
    if args.len() < 3 {
        return Err(RuntimeFuncError::arity("defmacro!!", USAGE_DEFMACRO, "at least 3", args.len()).into());
    }
    let name = symbol_name("defmacro!!", USAGE_DEFMACRO, &args[0])?;
    let params = param_names("defmacro!!", USAGE_DEFMACRO, &args[1])?;
    let mac = Value::Macro(Rc::new(LMacro {
        name: name.clone(),
        params,
        body: args[2..].to_vec(),
    }));
    env.define_global(name, mac.clone());
    Ok(mac)
}

const USAGE_SET: &str = "(set! <symbol> <expr>)";
fn lp_set(args: &[Value], env: &Rc<Environment>) -> LypsResult<Value> {
    if args.len() != 2 {
        return Err(RuntimeFuncError::arity("set!", USAGE_SET, crate::error::ARITY_TWO, args.len()).into());
    }
    let name = symbol_name("set!", USAGE_SET, &args[0])?;
    let mut value = eval(env, &args[1])?;
    name_if_function(&mut value, &name);
    env.set(&name, value.clone())?;
    Ok(value)
}

const USAGE_UNDEF: &str = "(undef! <symbol>)";
fn lp_undef(args: &[Value], env: &Rc<Environment>) -> LypsResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity("undef!", USAGE_UNDEF, crate::error::ARITY_ONE, args.len()).into());
    }
    let name = symbol_name("undef!", USAGE_UNDEF, &args[0])?;
    env.undef(&name)?;
    Ok(Value::nil())
}

const USAGE_SYMTAB: &str = "(symtab!)";
fn lp_symtab(env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if !args.is_empty() {
        return Err(RuntimeFuncError::arity("symtab!", USAGE_SYMTAB, "0", args.len()).into());
    }
    for name in env.local_symbols() {
        println!("{}", name);
    }
    Ok(Value::nil())
}

pub fn table() -> Vec<Primitive> {
    vec![
        Primitive { name: "def!", usage: USAGE_DEF_LOCAL, func: PrimitiveFn::Raw(lp_def_local) },
        Primitive { name: "def!!", usage: USAGE_DEF_GLOBAL, func: PrimitiveFn::Raw(lp_def_global) },
        Primitive { name: "defun!", usage: USAGE_DEFUN_LOCAL, func: PrimitiveFn::Raw(lp_defun_local) },
        Primitive { name: "defun!!", usage: USAGE_DEFUN_GLOBAL, func: PrimitiveFn::Raw(lp_defun_global) },
        Primitive { name: "defmacro!!", usage: USAGE_DEFMACRO, func: PrimitiveFn::Raw(lp_defmacro) },
        Primitive { name: "set!", usage: USAGE_SET, func: PrimitiveFn::Raw(lp_set) },
        Primitive { name: "undef!", usage: USAGE_UNDEF, func: PrimitiveFn::Raw(lp_undef) },
        Primitive { name: "symtab!", usage: USAGE_SYMTAB, func: PrimitiveFn::Std(lp_symtab) },
    ]
}

pub fn register_help() {
    register_help(HelpEntry {
        name: "def!".to_string(),
        signature: USAGE_DEF_LOCAL.to_string(),
        description: "Binds a symbol to a value in the innermost scope. The symbol's name, not its value, is the binding target; both `x` and `'x` are accepted."
            .to_string(),
        examples: vec!["(def! x 10) ; => 10".to_string(), "(def! 'x 10) ; => 10, same binding".to_string()],
        related: vec!["def!!".to_string(), "set!".to_string()],
        category: "Definition".to_string(),
    });
    register_help(HelpEntry {
        name: "defun!!".to_string(),
        signature: USAGE_DEFUN_GLOBAL.to_string(),
        description: "Defines a named function in the global frame.".to_string(),
        examples: vec!["(defun!! square (x) (* x x))".to_string()],
        related: vec!["defun!".to_string(), "lam".to_string()],
        category: "Definition".to_string(),
    });
    register_help(HelpEntry {
        name: "def!!".to_string(),
        signature: USAGE_DEF_GLOBAL.to_string(),
        description: "Binds a symbol to a value in the global frame, bypassing any local scope."
            .to_string(),
        examples: vec!["(def!! counter 0)".to_string()],
        related: vec!["def!".to_string(), "set!".to_string()],
        category: "Definition".to_string(),
    });
    register_help(HelpEntry {
        name: "defun!".to_string(),
        signature: USAGE_DEFUN_LOCAL.to_string(),
        description: "Defines a named function in the innermost scope.".to_string(),
        examples: vec!["(defun! square (x) (* x x))".to_string()],
        related: vec!["defun!!".to_string(), "lam".to_string()],
        category: "Definition".to_string(),
    });
    register_help(HelpEntry {
        name: "set!".to_string(),
        signature: USAGE_SET.to_string(),
        description: "Reassigns an already-bound symbol in whichever scope it's visible from, or defines it locally if absent."
            .to_string(),
        examples: vec!["(set! x (+ x 1))".to_string()],
        related: vec!["def!".to_string(), "undef!".to_string()],
        category: "Definition".to_string(),
    });
    register_help(HelpEntry {
        name: "undef!".to_string(),
        signature: USAGE_UNDEF.to_string(),
        description: "Removes a symbol's binding from whichever scope it's found in; errors if unbound."
            .to_string(),
        examples: vec!["(undef! x)".to_string()],
        related: vec!["def!".to_string(), "set!".to_string()],
        category: "Definition".to_string(),
    });
    register_help(HelpEntry {
        name: "symtab!".to_string(),
        signature: USAGE_SYMTAB.to_string(),
        description: "Prints every symbol bound in the current scope, innermost frame outward."
            .to_string(),
        examples: vec!["(symtab!)".to_string()],
        related: vec!["def!".to_string()],
        category: "Definition".to_string(),
    });
    register_help(HelpEntry {
        name: "defmacro!!".to_string(),
        signature: USAGE_DEFMACRO.to_string(),
        description: "Defines a macro in the global frame; its body runs on unevaluated argument forms and the result is evaluated again in the caller's place."
            .to_string(),
        examples: vec!["(defmacro!! when (c b) `(if ,c ,b NULL))".to_string()],
        related: vec!["defun!!".to_string(), "quote".to_string()],
        category: "Definition".to_string(),
    });
}

// ABOUTME: Console I/O primitives (write!, writeLn!, readLn!)

use crate::env::Environment;
use crate::error::{LypsResult, RuntimeFuncError};
use crate::help::{register_help, HelpEntry};
use crate::value::{Primitive, PrimitiveFn, Value};
use std::io::Write as _;
use std::rc::Rc;

const USAGE_WRITE: &str = "(write! <object>)";
fn lp_write(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity("write!", USAGE_WRITE, crate::error::ARITY_ONE, args.len()).into());
    }
    print!("{}", args[0]);
    let _ = std::io::stdout().flush();
    Ok(args[0].clone())
}

const USAGE_WRITELN: &str = "(writeLn! <object>)";
fn lp_writeln(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeFuncError::arity("writeLn!", USAGE_WRITELN, crate::error::ARITY_ONE, args.len()).into());
    }
    println!("{}", args[0]);
    Ok(args[0].clone())
}

const USAGE_READLN: &str = "(readLn!)";
fn lp_readln(_env: &Rc<Environment>, args: &[Value]) -> LypsResult<Value> {
    if !args.is_empty() {
        return Err(RuntimeFuncError::arity("readLn!", USAGE_READLN, "0", args.len()).into());
    }
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| RuntimeFuncError::new("readLn!", USAGE_READLN, e.to_string()))?;
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Value::string(line))
}

pub fn table() -> Vec<Primitive> {
    vec![
        Primitive { name: "write!", usage: USAGE_WRITE, func: PrimitiveFn::Std(lp_write) },
        Primitive { name: "writeLn!", usage: USAGE_WRITELN, func: PrimitiveFn::Std(lp_writeln) },
        Primitive { name: "readLn!", usage: USAGE_READLN, func: PrimitiveFn::Std(lp_readln) },
    ]
}

pub fn register_help() {
    register_help(HelpEntry {
        name: "writeLn!".to_string(),
        signature: USAGE_WRITELN.to_string(),
        description: "Pretty-prints a value to stdout followed by a newline; returns the value."
            .to_string(),
        examples: vec!["(writeLn! \"hi\") ; prints \"hi\"".to_string()],
        related: vec!["write!".to_string(), "readLn!".to_string()],
        category: "I/O".to_string(),
    });
    register_help(HelpEntry {
        name: "write!".to_string(),
        signature: USAGE_WRITE.to_string(),
        description: "Pretty-prints a value to stdout with no trailing newline; returns the value."
            .to_string(),
        examples: vec!["(write! \"hi\")".to_string()],
        related: vec!["writeLn!".to_string()],
        category: "I/O".to_string(),
    });
    register_help(HelpEntry {
        name: "readLn!".to_string(),
        signature: USAGE_READLN.to_string(),
        description: "Reads a line of input from stdin, stripping the trailing newline, as a string."
            .to_string(),
        examples: vec!["(def! name (readLn!))".to_string()],
        related: vec!["write!".to_string()],
        category: "I/O".to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;

    #[test]
    fn test_write_returns_its_argument() {
        let env = Environment::new_global();
        let result = lp_write(&env, &[Value::int(5)]).unwrap();
        assert_eq!(result, Value::int(5));
    }

    #[test]
    fn test_writeln_wrong_arity_errors() {
        let env = Environment::new_global();
        assert!(lp_writeln(&env, &[]).is_err());
    }

    #[test]
    fn test_readln_rejects_arguments() {
        let env = Environment::new_global();
        assert!(lp_readln(&env, &[Value::int(1)]).is_err());
    }
}

// ABOUTME: The embedder-facing interpreter object: reboot() and eval_string()

use crate::config::NUMERIC_CONSTANTS;
use crate::env::Environment;
use crate::error::LypsResult;
use crate::value::Value;
use std::rc::Rc;

/// Owns one independent environment chain and parser state (spec.md section
/// 5: "embedders wishing to run multiple interpreters must instantiate
/// independent interpreter objects"). The only contract a driver needs:
/// `reboot` and `eval_string` (spec.md section 6).
pub struct Interpreter {
    env: Rc<Environment>,
}

impl Interpreter {
    /// Builds a freshly booted interpreter (equivalent to `new` then `reboot`).
    pub fn new() -> Self {
        let mut interp = Interpreter { env: Environment::new_global() };
        interp.reboot();
        interp
    }

    /// Rebuilds the global frame from the factory primitive table and
    /// re-binds the numeric constants `PI`, `E`, `INF`, `-INF`, `NAN`, and
    /// `NULL` (spec.md section 6). This discards all prior bindings,
    /// including anything the embedder defined — it is a full reset, not an
    /// incremental reload.
    pub fn reboot(&mut self) {
        let env = Environment::new_global();
        crate::primitives::register_all(&env);
        for (name, value) in NUMERIC_CONSTANTS {
            env.define_local(*name, Value::Float(*value));
        }
        env.define_local("NULL", Value::nil());
        self.env = env;
    }

    /// Parses `source` as a single expression and evaluates it in the
    /// current global environment (spec.md section 6's *eval-string* hook).
    pub fn eval_string(&self, source: &str) -> LypsResult<Value> {
        let expr = crate::reader::parse(source)?;
        crate::eval::eval(&self.env, &expr)
    }

    /// Evaluates every top-level form in `source` in order, returning the
    /// last result — used to load `stdlib/Library.lyps` and to run script
    /// files (SPEC_FULL.md section 10.4).
    pub fn eval_program(&self, source: &str) -> LypsResult<Value> {
        let forms = crate::reader::parse_program(source, None)?;
        let mut last = Value::nil();
        for form in &forms {
            last = crate::eval::eval(&self.env, form)?;
        }
        Ok(last)
    }

    pub fn env(&self) -> &Rc<Environment> {
        &self.env
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reboot_binds_numeric_constants() {
        let interp = Interpreter::new();
        assert_eq!(interp.eval_string("PI").unwrap(), Value::Float(std::f64::consts::PI));
        assert!(interp.eval_string("NULL").unwrap().is_nil());
    }

    #[test]
    fn test_eval_string_parses_and_evaluates() {
        let interp = Interpreter::new();
        assert_eq!(interp.eval_string("(+ 1 2)").unwrap(), Value::int(3));
    }

    #[test]
    fn test_reboot_discards_prior_definitions() {
        let mut interp = Interpreter::new();
        interp.eval_string("(def!! x 99)").unwrap();
        assert_eq!(interp.eval_string("x").unwrap(), Value::int(99));
        interp.reboot();
        // x is unbound again post-reboot, so it self-evaluates to the symbol.
        assert_eq!(interp.eval_string("x").unwrap(), Value::symbol("x"));
    }

    #[test]
    fn test_eval_program_runs_multiple_forms_and_returns_last() {
        let interp = Interpreter::new();
        let result = interp.eval_program("(def!! x 1) (def!! y 2) (+ x y)").unwrap();
        assert_eq!(result, Value::int(3));
    }
}

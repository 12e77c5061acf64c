// ABOUTME: Aggregates every primitive category into the global environment

pub mod arithmetic;
pub mod control;
pub mod conversion;
pub mod definition;
pub mod io;
pub mod list_map;
pub mod logical;
pub mod predicates;
pub mod relational;

use crate::env::Environment;
use crate::value::{Primitive, Value};
use std::rc::Rc;

/// Every category's `table()` leaked to `'static` once, at process startup —
/// `Value::Primitive` holds a `&'static Primitive` (spec.md section 3.1), and
/// a primitive's identity (used by `is?`/`=` on callables) must be stable for
/// the life of the process, so each one is built exactly once and never
/// freed.
fn all_primitives() -> Vec<Primitive> {
    let mut all = Vec::new();
    all.extend(arithmetic::table());
    all.extend(predicates::table());
    all.extend(relational::table());
    all.extend(logical::table());
    all.extend(conversion::table());
    all.extend(io::table());
    all.extend(list_map::table());
    all.extend(definition::table());
    all.extend(control::table());
    all
}

/// Binds every primitive into `env`'s frame and registers each category's
/// help text. Called once on a freshly booted global environment (spec.md
/// section 10.3's `reboot()`).
///
/// Bindings are keyed by the primitive's upper-cased name since the reader
/// upper-cases every symbol it scans (`Value::symbol`) — a lowercase key
/// here would simply never be looked up.
pub fn register_all(env: &Rc<Environment>) {
    for primitive in all_primitives() {
        let leaked: &'static Primitive = Box::leak(Box::new(primitive));
        env.define_local(leaked.name.to_uppercase(), Value::Primitive(leaked));
    }

    arithmetic::register_help();
    predicates::register_help();
    relational::register_help();
    logical::register_help();
    conversion::register_help();
    io::register_help();
    list_map::register_help();
    definition::register_help();
    control::register_help();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all_binds_every_primitive() {
        let env = Environment::new_global();
        register_all(&env);
        assert!(env.get("+").is_some());
        assert!(env.get("DEF!").is_some());
        assert!(env.get("IF").is_some());
        assert!(env.get("SYMTAB!").is_some());
    }
}

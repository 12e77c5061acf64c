// ABOUTME: End-to-end tests exercising reader, evaluator, and primitive library together

use lyps::interpreter::Interpreter;
use lyps::value::Value;

fn eval(interp: &Interpreter, src: &str) -> Value {
    interp.eval_string(src).unwrap_or_else(|e| panic!("eval({src:?}) failed: {e}"))
}

fn run(src: &str) -> Value {
    let interp = Interpreter::new();
    eval(&interp, src)
}

#[test]
fn test_literal_tower_widens_to_float() {
    let result = run("(+ 1 2/3 0.5)");
    match result {
        Value::Float(n) => assert!((n - 2.1666666666666665).abs() < 1e-12),
        other => panic!("expected a float, got {other}"),
    }
}

#[test]
fn test_exact_rational_division() {
    let result = run("(/ 5 2)");
    assert_eq!(result.to_string(), "5/2");
}

#[test]
fn test_lexical_scope_shadow_and_leak() {
    let interp = Interpreter::new();
    let result = eval(&interp, "(block (def! 'x 10) (block (def! 'x 20) x))");
    assert_eq!(result, Value::int(20));

    // x never escaped the outer block either — it self-evaluates as a bare symbol.
    let after = eval(&interp, "x");
    assert_eq!(after, Value::symbol("X"));
}

#[test]
fn test_recursion_via_defun_bang_bang() {
    let interp = Interpreter::new();
    eval(&interp, "(defun!! fact (n) (if (<= n 1) 1 (* n (fact (- n 1)))))");
    let result = eval(&interp, "(fact 6)");
    assert_eq!(result, Value::int(720));
}

#[test]
fn test_macro_and_quasiquote_expansion() {
    let interp = Interpreter::new();
    eval(&interp, "(defmacro!! when (c b) `(if ,c ,b NULL))");
    assert_eq!(eval(&interp, "(when 1 42)"), Value::int(42));
    assert_eq!(eval(&interp, "(when 0 42)"), Value::nil());
}

#[test]
fn test_quoting_round_trip_and_equality() {
    let interp = Interpreter::new();
    let quoted = eval(&interp, "'(+ 1 2)");
    match &quoted {
        Value::List(items) => assert_eq!(items.borrow().len(), 3),
        other => panic!("expected a list, got {other}"),
    }
    let is_equal = eval(&interp, "(= (quote (+ 1 2)) '(+ 1 2))");
    assert_eq!(is_equal, Value::int(1));
}

#[test]
fn test_division_by_zero_names_the_primitive() {
    let interp = Interpreter::new();
    let err = interp.eval_string("(/ 1 0)").unwrap_err();
    assert!(err.to_string().contains('/'));
}

#[test]
fn test_comma_at_splices_list_contents() {
    let result = run("`(1 ,@(list 2 3) 4)");
    assert_eq!(result.to_string(), "(1 2 3 4)");
}

#[test]
fn test_eval_idempotent_on_non_combinations() {
    let interp = Interpreter::new();
    let once = eval(&interp, "42");
    let twice = eval(&interp, "(eval 42)");
    assert_eq!(once, twice);
}

#[test]
fn test_read_then_pprint_round_trips() {
    let interp = Interpreter::new();
    let src = "(1 2/3 \"hi\" sym)";
    let parsed = eval(&interp, &format!("'{src}"));
    let printed = parsed.to_string();
    let reparsed = eval(&interp, &format!("'{printed}"));
    assert_eq!(parsed, reparsed);
}

#[test]
fn test_first_rest_of_cons_round_trip() {
    let interp = Interpreter::new();
    eval(&interp, "(def! lst (list 2 3 4))");
    assert_eq!(eval(&interp, "(first (cons 1 lst))"), Value::int(1));
    let rest = eval(&interp, "(rest (cons 1 lst))");
    assert_eq!(rest, eval(&interp, "lst"));
}

#[test]
fn test_is_and_not_equal_reflexivity() {
    let interp = Interpreter::new();
    eval(&interp, "(def! a 7)");
    assert_eq!(eval(&interp, "(= a a)"), Value::int(1));
    assert_eq!(eval(&interp, "(<> a a)"), Value::int(0));
}

#[test]
fn test_integer_division_mod_identity() {
    let interp = Interpreter::new();
    eval(&interp, "(def! a 17)");
    eval(&interp, "(def! b 5)");
    let result = eval(&interp, "(+ (* (// a b) b) (mod a b))");
    assert_eq!(result, eval(&interp, "a"));
}

#[test]
fn test_and_or_associative_over_boolean_outputs() {
    let left = run("(and (and 1 0) 1)");
    let right = run("(and 1 (and 0 1))");
    assert_eq!(left, right);

    let left = run("(or (or 0 1) 0)");
    let right = run("(or 0 (or 1 0))");
    assert_eq!(left, right);
}

#[test]
fn test_null_truthiness() {
    let interp = Interpreter::new();
    assert_eq!(eval(&interp, "(isNull? NULL)"), Value::int(1));
    assert_eq!(eval(&interp, "(not NULL)"), Value::int(1));
    eval(&interp, "(def! a 'a)");
    eval(&interp, "(def! b 'b)");
    assert_eq!(eval(&interp, "(if NULL a b)"), Value::symbol("B"));
}

#[test]
fn test_block_scope_does_not_leak_bindings() {
    let interp = Interpreter::new();
    eval(&interp, "(block (def! shadowed 1))");
    let leaked = eval(&interp, "shadowed");
    assert_eq!(leaked, Value::symbol("SHADOWED"));
}

#[test]
fn test_library_helpers_load_and_work() {
    let interp = Interpreter::new();
    interp
        .eval_program(include_str!("../stdlib/Library.lyps"))
        .expect("Library.lyps should load cleanly");

    assert_eq!(eval(&interp, "(length (list 1 2 3))"), Value::int(3));
    assert_eq!(eval(&interp, "(sum (list 1 2 3 4))"), Value::int(10));
    assert_eq!(eval(&interp, "(reverse (list 1 2 3))").to_string(), "(3 2 1)");
    assert_eq!(eval(&interp, "(filter (lam (x) (> x 2)) (list 1 2 3 4))").to_string(), "(3 4)");
    assert_eq!(eval(&interp, "(even? 4)"), Value::int(1));
    assert_eq!(eval(&interp, "(when 1 99)"), Value::int(99));
    assert_eq!(eval(&interp, "(unless 1 99)"), Value::nil());
}

#[test]
fn test_reboot_clears_user_definitions_but_restores_constants() {
    let mut interp = Interpreter::new();
    eval(&interp, "(def!! leftover 123)");
    interp.reboot();
    assert_eq!(eval(&interp, "leftover"), Value::symbol("LEFTOVER"));
    assert!(matches!(eval(&interp, "PI"), Value::Float(_)));
    assert_eq!(eval(&interp, "NULL"), Value::nil());
}

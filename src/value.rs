// ABOUTME: Value types representing Lyps data structures and expressions

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A user-defined function: `(name, params, body-list)`. Per spec, application
/// opens a child scope of the *caller's* environment at call time rather than
/// closing over a definition-site environment — Lyps functions are not
/// lexically closed, matching the original's `LFunction` (which never stores
/// an environment reference).
#[derive(Debug)]
pub struct LFunction {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Value>,
}

/// A syntactic macro: `(name, params, body-list)`. `stdEvalOrd = false` —
/// argument forms are bound unevaluated; the body's result is evaluated once
/// more in the caller's environment.
#[derive(Debug)]
pub struct LMacro {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Value>,
}

/// A built-in primitive: `(name, usage, fn, stdEvalOrd)`. The `stdEvalOrd`
/// boolean from spec.md becomes the variant tag of [`PrimitiveFn`] instead of
/// a separate flag field, so a primitive can't claim one evaluation order
/// while carrying a function shaped for the other.
#[derive(Clone, Copy)]
pub enum PrimitiveFn {
    /// `stdEvalOrd = true`: receives already-evaluated arguments.
    Std(fn(&std::rc::Rc<crate::env::Environment>, &[Value]) -> crate::error::LypsResult<Value>),
    /// `stdEvalOrd = false`: receives the raw, unevaluated argument forms.
    Raw(fn(&[Value], &std::rc::Rc<crate::env::Environment>) -> crate::error::LypsResult<Value>),
}

pub struct Primitive {
    pub name: &'static str,
    pub usage: &'static str,
    pub func: PrimitiveFn,
}

impl Primitive {
    pub fn std_eval_ord(&self) -> bool {
        matches!(self.func, PrimitiveFn::Std(_))
    }
}

/// The universal tagged value type (spec.md section 3.1).
///
/// List and Map carry interior mutability (`Rc<RefCell<_>>`) because the
/// mutation primitives (`push!`, `pop!`, `atSet!`, `update!`) mutate an
/// existing list/map in place while `cons`/`list`/`map` always build a fresh
/// one — the reader and constructor primitives hand out fresh `Rc`s, the
/// mutators reach through a shared one.
#[derive(Clone)]
pub enum Value {
    Integer(BigInt),
    Rational(BigRational),
    Float(f64),
    String(Rc<str>),
    Symbol(Rc<str>),
    List(Rc<RefCell<Vec<Value>>>),
    Map(Rc<RefCell<BTreeMap<String, Value>>>),
    Function(Rc<LFunction>),
    Macro(Rc<LMacro>),
    Primitive(&'static Primitive),
}

impl Value {
    pub fn nil() -> Value {
        Value::List(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn symbol(name: impl Into<String>) -> Value {
        Value::Symbol(Rc::from(name.into().to_uppercase()))
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Rc::from(s.into()))
    }

    pub fn int(n: i64) -> Value {
        Value::Integer(BigInt::from(n))
    }

    pub fn bool_int(b: bool) -> Value {
        Value::Integer(if b { BigInt::from(1) } else { BigInt::zero() })
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::List(items) if items.borrow().is_empty())
    }

    /// Truthiness per spec.md section 4.3: false iff NULL (empty list) or
    /// integer zero. Floats and rationals are never falsy, even at zero.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::List(items) => !items.borrow().is_empty(),
            Value::Integer(n) => !n.is_zero(),
            _ => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Rational(_) => "rational",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
            Value::Macro(_) => "macro",
            Value::Primitive(_) => "primitive",
        }
    }

    pub fn is_atom(&self) -> bool {
        matches!(
            self,
            Value::Integer(_) | Value::Rational(_) | Value::Float(_) | Value::String(_)
        )
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Rational(_) | Value::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => n.to_f64(),
            Value::Rational(r) => r.to_f64(),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_symbol_name(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Macro(_) | Value::Primitive(_))
    }
}

/// Deep / structural equality, used by `=`, `is?`, `hasValue?`, `case`, and
/// `equal?`-flavored stdlib helpers. Numbers compare across the tower
/// (`Integer(2) = Float(2.0)`), matching the glossary's unified `Number`
/// category; lists and maps compare element-wise; callables compare by
/// identity (pointer or name).
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Integer(_), _) | (Rational(_), _) | (Float(_), _)
                if other.is_number() && self.is_number() =>
            {
                numeric_eq(self, other)
            }
            (String(a), String(b)) => a == b,
            (Symbol(a), Symbol(b)) => a == b,
            (List(a), List(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Map(a), Map(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            }
            (Function(a), Function(b)) => Rc::ptr_eq(a, b),
            (Macro(a), Macro(b)) => Rc::ptr_eq(a, b),
            (Primitive(a), Primitive(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }
}

fn numeric_eq(a: &Value, b: &Value) -> bool {
    use crate::primitives::arithmetic::widen_pair;
    widen_pair(a, b).map(|p| p.eq()).unwrap_or(false)
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Pretty-printer (spec.md section 6): integers/floats print in standard
/// decimal form, rationals as `num/den`, strings quoted, symbols by their
/// (already upper-cased) name, empty list as `NULL`, maps with sorted keys.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Value::Float(n) => {
                if n.is_nan() {
                    write!(f, "NAN")
                } else if n.is_infinite() {
                    write!(f, "{}", if *n > 0.0 { "INF" } else { "-INF" })
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::List(items) => {
                let items = items.borrow();
                if items.is_empty() {
                    return write!(f, "NULL");
                }
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Value::Map(map) => {
                let map = map.borrow();
                writeln!(f, "(MAP")?;
                for (key, value) in map.iter() {
                    writeln!(f, "   ({} {})", key, value)?;
                }
                write!(f, ")")
            }
            Value::Function(func) => {
                write!(f, "(Function {} ({}) ...)", func.name, func.params.join(" "))
            }
            Value::Macro(mac) => {
                write!(f, "(Macro {} ({}) ...)", mac.name, mac.params.join(" "))
            }
            Value::Primitive(p) => write!(f, "(Primitive {})", p.name),
        }
    }
}

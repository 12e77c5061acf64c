// ABOUTME: Syntax highlighter for REPL with color support
// Implements rustyline's Highlighter trait to provide ANSI color codes
// for Lyps syntax elements while preserving display width

use rustyline::Helper;
use rustyline::completion::Completer;
use rustyline::highlight::{Highlighter, CmdKind};
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use std::borrow::Cow;
use std::collections::HashSet;

// ANSI color codes (using 3-bit/4-bit colors for maximum terminal compatibility)
const COLOR_RESET: &str = "\x1b[0m";
const COLOR_PARENS: &str = "\x1b[1;34m"; // Bold blue
const COLOR_SPECIAL_FORM: &str = "\x1b[1;35m"; // Bold magenta
const COLOR_BUILTIN: &str = "\x1b[36m"; // Cyan
const COLOR_NUMBER: &str = "\x1b[33m"; // Yellow
const COLOR_STRING: &str = "\x1b[32m"; // Green
const COLOR_COMMENT: &str = "\x1b[90m"; // Bright black (gray)
const COLOR_QUOTE: &str = "\x1b[1;33m"; // Bold yellow

/// Main highlighter helper for the Lyps REPL.
/// Provides syntax-aware color highlighting for Lyps syntax.
pub struct LispHelper;

impl LispHelper {
    pub fn new() -> Self {
        LispHelper
    }
}

impl Default for LispHelper {
    fn default() -> Self {
        Self::new()
    }
}

// Implement the required rustyline traits
impl Helper for LispHelper {}

impl Completer for LispHelper {
    type Candidate = String;
}

impl Hinter for LispHelper {
    type Hint = String;
}

impl Validator for LispHelper {}

impl Highlighter for LispHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let special_forms = get_special_forms();
        let builtins = get_builtins();

        let highlighted = highlight_line(line, &special_forms, &builtins);

        if highlighted == line {
            Cow::Borrowed(line)
        } else {
            Cow::Owned(highlighted)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true // Always trigger re-highlighting on character input or cursor movement
    }
}

/// Tokenize a line and apply syntax highlighting
fn highlight_line(line: &str, special_forms: &HashSet<&'static str>, builtins: &HashSet<&'static str>) -> String {
    let mut result = String::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            // Comments: everything from ; to end of line
            ';' => {
                result.push_str(COLOR_COMMENT);
                while i < chars.len() && chars[i] != '\n' {
                    result.push(chars[i]);
                    i += 1;
                }
                result.push_str(COLOR_RESET);
            }

            // Strings: preserve exact content but colorize
            '"' => {
                result.push_str(COLOR_STRING);
                result.push('"');
                i += 1;

                let mut found_close = false;
                while i < chars.len() {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        result.push(chars[i]);
                        result.push(chars[i + 1]);
                        i += 2;
                    } else if chars[i] == '"' {
                        result.push('"');
                        i += 1;
                        found_close = true;
                        break;
                    } else {
                        result.push(chars[i]);
                        i += 1;
                    }
                }

                result.push_str(COLOR_RESET);
                if !found_close {
                    while i < chars.len() && chars[i] != '\n' {
                        result.push(chars[i]);
                        i += 1;
                    }
                }
            }

            // Numbers: handle all numeric formats, including rationals (1/2)
            '0'..='9' | '.' => {
                let old_i = i;
                if chars[i] == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                } else if chars[i].is_ascii_digit() {
                    while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '/') {
                        i += 1;
                    }
                    if i < chars.len() && chars[i] == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
                        i += 1;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    }
                } else {
                    result.push(chars[i]);
                    i += 1;
                    continue;
                }

                let num_str: String = chars[old_i..i].iter().collect();
                result.push_str(COLOR_NUMBER);
                result.push_str(&num_str);
                result.push_str(COLOR_RESET);
            }

            // Signed numbers or symbols starting with +/-
            '+' | '-' => {
                if i + 1 < chars.len()
                    && (chars[i + 1].is_ascii_digit()
                        || (chars[i + 1] == '.' && i + 2 < chars.len() && chars[i + 2].is_ascii_digit()))
                {
                    let old_i = i;
                    i += 1;

                    if chars[old_i + 1] == '.' {
                        i += 1;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                    } else {
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                        if i < chars.len() && chars[i] == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
                            i += 1;
                            while i < chars.len() && chars[i].is_ascii_digit() {
                                i += 1;
                            }
                        }
                    }

                    let num_str: String = chars[old_i..i].iter().collect();
                    result.push_str(COLOR_NUMBER);
                    result.push_str(&num_str);
                    result.push_str(COLOR_RESET);
                } else {
                    push_symbol(&mut result, &chars, &mut i, special_forms, builtins);
                }
            }

            // Quote-like special characters
            '\'' | '`' => {
                result.push_str(COLOR_QUOTE);
                result.push(chars[i]);
                i += 1;
                result.push_str(COLOR_RESET);
            }

            // Comma / comma-at reader macros
            ',' => {
                result.push_str(COLOR_QUOTE);
                result.push(',');
                i += 1;
                if i < chars.len() && chars[i] == '@' {
                    result.push('@');
                    i += 1;
                }
                result.push_str(COLOR_RESET);
            }

            // Parentheses and brackets
            '(' | ')' | '[' | ']' | '{' | '}' => {
                result.push_str(COLOR_PARENS);
                result.push(chars[i]);
                i += 1;
                result.push_str(COLOR_RESET);
            }

            // Whitespace
            ' ' | '\t' | '\n' | '\r' => {
                result.push(chars[i]);
                i += 1;
            }

            // Symbols (variables, function/primitive names, etc.)
            _ => push_symbol(&mut result, &chars, &mut i, special_forms, builtins),
        }
    }

    result
}

fn push_symbol(
    result: &mut String,
    chars: &[char],
    i: &mut usize,
    special_forms: &HashSet<&'static str>,
    builtins: &HashSet<&'static str>,
) {
    let start = *i;
    while *i < chars.len()
        && !chars[*i].is_whitespace()
        && !matches!(chars[*i], '(' | ')' | '[' | ']' | '{' | '}' | '"' | ';' | '\'' | '`' | ',')
    {
        *i += 1;
    }

    let symbol: String = chars[start..*i].iter().collect();
    let upper = symbol.to_uppercase();

    if special_forms.contains(upper.as_str()) {
        result.push_str(COLOR_SPECIAL_FORM);
        result.push_str(&symbol);
        result.push_str(COLOR_RESET);
    } else if builtins.contains(upper.as_str()) {
        result.push_str(COLOR_BUILTIN);
        result.push_str(&symbol);
        result.push_str(COLOR_RESET);
    } else {
        result.push_str(&symbol);
    }
}

/// Special forms: spec.md section 4.3's `stdEvalOrd = false` enumeration —
/// these get the head of a combination evaluated under non-standard order,
/// so they're visually distinguished from ordinary callables.
fn get_special_forms() -> HashSet<&'static str> {
    [
        "DEF!", "DEF!!", "DEFUN!", "DEFUN!!", "DEFMACRO!!", "SET!", "UNDEF!", "LAM", "BLOCK", "IF", "COND", "CASE",
        "QUOTE", "BACKQUOTE", "COMMA", "COMMA-AT", "WHILE", "MAP",
    ]
    .iter()
    .copied()
    .collect()
}

/// All other primitives (spec.md section 4.4's full registry), matched
/// case-insensitively since the reader upper-cases every scanned symbol.
fn get_builtins() -> HashSet<&'static str> {
    [
        // Arithmetic
        "+", "-", "*", "/", "//", "MOD", "MIN", "MAX", "TRUNC", "ABS", "LOG", "POW", "SIN", "COS", "TAN", "EXP",
        // Relational
        "=", "<>", "<", ">", "<=", ">=", "IS?",
        // Logical
        "AND", "OR", "NOT",
        // Predicates
        "ISNULL?", "ISNUMBER?", "ISSYMBOL?", "ISATOM?", "ISLIST?", "ISMAP?", "ISSTRING?", "ISFUNCTION?",
        // List/Map
        "LIST", "FIRST", "REST", "CONS", "PUSH!", "POP!", "AT", "ATSET!", "JOIN", "HASVALUE?", "UPDATE!", "HASKEY?",
        // Definition (symtab! only; the raw special forms are listed above)
        "SYMTAB!",
        // Control (std-order only; the raw special forms are listed above)
        "EVAL", "PARSE", "PPRINT",
        // Conversion
        "STRING", "FLOAT",
        // I/O
        "WRITE!", "WRITELN!", "READLN!",
    ]
    .iter()
    .copied()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_highlighting() {
        let special_forms = get_special_forms();
        let builtins = get_builtins();
        let highlighted = highlight_line("42", &special_forms, &builtins);
        assert!(highlighted.contains(COLOR_NUMBER));
    }

    #[test]
    fn test_string_highlighting() {
        let special_forms = get_special_forms();
        let builtins = get_builtins();
        let highlighted = highlight_line("\"hello\"", &special_forms, &builtins);
        assert!(highlighted.contains(COLOR_STRING));
    }

    #[test]
    fn test_comment_highlighting() {
        let special_forms = get_special_forms();
        let builtins = get_builtins();
        let highlighted = highlight_line("; a comment", &special_forms, &builtins);
        assert!(highlighted.contains(COLOR_COMMENT));
    }

    #[test]
    fn test_special_form_highlighting() {
        let special_forms = get_special_forms();
        let builtins = get_builtins();
        let highlighted = highlight_line("(def! x 5)", &special_forms, &builtins);
        assert!(highlighted.contains(COLOR_SPECIAL_FORM));
        assert!(highlighted.contains(COLOR_PARENS));
    }

    #[test]
    fn test_builtin_function_highlighting() {
        let special_forms = get_special_forms();
        let builtins = get_builtins();
        let highlighted = highlight_line("(+ 1 2)", &special_forms, &builtins);
        assert!(highlighted.contains(COLOR_BUILTIN));
        assert!(highlighted.contains(COLOR_PARENS));
    }

    #[test]
    fn test_quote_highlighting() {
        let special_forms = get_special_forms();
        let builtins = get_builtins();
        let highlighted = highlight_line("'(1 2 3)", &special_forms, &builtins);
        assert!(highlighted.contains(COLOR_QUOTE));
    }

    #[test]
    fn test_comma_at_highlighting() {
        let special_forms = get_special_forms();
        let builtins = get_builtins();
        let highlighted = highlight_line("`(1 ,@xs)", &special_forms, &builtins);
        assert!(highlighted.contains(COLOR_QUOTE));
    }

    #[test]
    fn test_lowercase_input_still_classified() {
        let special_forms = get_special_forms();
        let builtins = get_builtins();
        let highlighted = highlight_line("(if x y z)", &special_forms, &builtins);
        assert!(highlighted.contains(COLOR_SPECIAL_FORM));
    }
}

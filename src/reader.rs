// ABOUTME: Recursive-descent reader assembling the token stream into Values

use crate::error::{LypsError, LypsResult, ParseError};
use crate::scanner::{Scanner, TokenKind};
use crate::value::Value;
use num_bigint::BigInt;
use num_rational::BigRational;
use std::str::FromStr;

/// Recursive descent with one-token look-ahead (spec.md section 4.2),
/// grounded in `LypsParser._parseObject`/`_parseList`. Owns the `Scanner`
/// so a single source string can be read as either one expression (the
/// `reboot`/`eval` lifecycle hook's contract) or a sequence of top-level
/// forms (stdlib/library loading).
pub struct Reader {
    scanner: Scanner,
}

impl Reader {
    pub fn new(source: &str, file: Option<String>) -> Self {
        Reader {
            scanner: Scanner::new(source, file),
        }
    }

    fn check_scan_error(&mut self) -> LypsResult<()> {
        if let Some(err) = self.scanner.take_error() {
            return Err(LypsError::Parse(err));
        }
        Ok(())
    }

    fn error_here(&self, message: impl Into<String>) -> LypsError {
        let token = self.scanner.peek_token();
        LypsError::Parse(ParseError::new(
            None,
            token.line,
            token.column,
            String::new(),
            message.into(),
        ))
    }

    /// Reads the next top-level object, or `None` at end of input — used to
    /// load a multi-form source file (a stdlib library, a script).
    pub fn next_object(&mut self) -> LypsResult<Option<Value>> {
        self.check_scan_error()?;
        if self.scanner.peek_token().kind == TokenKind::Eof {
            return Ok(None);
        }
        let value = self.parse_object()?;
        Ok(Some(value))
    }

    fn parse_object(&mut self) -> LypsResult<Value> {
        self.check_scan_error()?;
        let token = self.scanner.peek_token().clone();

        let value = match token.kind {
            TokenKind::Integer => {
                let n = BigInt::from_str(&token.lexeme)
                    .map_err(|_| self.error_here(format!("malformed integer '{}'", token.lexeme)))?;
                self.scanner.advance();
                Value::Integer(n)
            }
            TokenKind::Float => {
                let f: f64 = token
                    .lexeme
                    .parse()
                    .map_err(|_| self.error_here(format!("malformed float '{}'", token.lexeme)))?;
                self.scanner.advance();
                Value::Float(f)
            }
            TokenKind::Frac => {
                let (num_str, den_str) = token
                    .lexeme
                    .split_once('/')
                    .ok_or_else(|| self.error_here("malformed fraction"))?;
                let num = BigInt::from_str(num_str)
                    .map_err(|_| self.error_here(format!("malformed fraction '{}'", token.lexeme)))?;
                let den = BigInt::from_str(den_str)
                    .map_err(|_| self.error_here(format!("malformed fraction '{}'", token.lexeme)))?;
                if den == BigInt::from(0) {
                    return Err(self.error_here("fraction with zero denominator"));
                }
                self.scanner.advance();
                Value::Rational(BigRational::new(num, den))
            }
            TokenKind::String => {
                let inner = &token.lexeme[1..token.lexeme.len() - 1];
                self.scanner.advance();
                Value::string(inner)
            }
            TokenKind::Symbol => {
                self.scanner.advance();
                Value::symbol(token.lexeme)
            }
            TokenKind::OpenParen => self.parse_list()?,
            TokenKind::SingleQuote => self.parse_wrapped("QUOTE")?,
            TokenKind::BackQuote => self.parse_wrapped("BACKQUOTE")?,
            TokenKind::Comma => self.parse_wrapped("COMMA")?,
            TokenKind::CommaAt => self.parse_wrapped("COMMA-AT")?,
            TokenKind::Pound
            | TokenKind::Pipe
            | TokenKind::Colon
            | TokenKind::OpenBracket
            | TokenKind::CloseBracket => {
                let lexeme = token.lexeme.clone();
                self.scanner.advance();
                Value::string(lexeme)
            }
            TokenKind::Eof => return Err(self.error_here("object expected")),
            TokenKind::CloseParen | TokenKind::Semi => {
                return Err(self.error_here("object expected"))
            }
        };

        Ok(value)
    }

    fn parse_wrapped(&mut self, head: &str) -> LypsResult<Value> {
        self.scanner.advance();
        let subordinate = self.parse_object()?;
        Ok(Value::list(vec![Value::symbol(head), subordinate]))
    }

    fn parse_list(&mut self) -> LypsResult<Value> {
        if self.scanner.peek_token().kind != TokenKind::OpenParen {
            return Err(self.error_here("'(' expected"));
        }
        self.scanner.advance();

        let mut items = Vec::new();
        loop {
            self.check_scan_error()?;
            match self.scanner.peek_token().kind {
                TokenKind::CloseParen | TokenKind::Eof => break,
                _ => items.push(self.parse_object()?),
            }
        }

        if self.scanner.peek_token().kind != TokenKind::CloseParen {
            return Err(self.error_here("')' expected"));
        }
        self.scanner.advance();

        Ok(Value::list(items))
    }
}

/// Parses exactly one expression and requires EOF immediately after it —
/// the `eval-string`-facing entry point named in spec.md sections 1 and 4.2.
pub fn parse(source: &str) -> LypsResult<Value> {
    let mut reader = Reader::new(source, None);
    let value = reader.parse_object()?;
    reader.check_scan_error()?;
    if reader.scanner.peek_token().kind != TokenKind::Eof {
        return Err(reader.error_here("EOF expected"));
    }
    Ok(value)
}

/// Parses every top-level form in `source` in order — used to load a
/// multi-form library or script file (spec.md section 10.3/10.4's
/// ambient `runtime_libraries()` loading).
pub fn parse_program(source: &str, file: Option<String>) -> LypsResult<Vec<Value>> {
    let mut reader = Reader::new(source, file);
    let mut forms = Vec::new();
    while let Some(value) = reader.next_object()? {
        forms.push(value);
    }
    Ok(forms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse("42").unwrap(), Value::int(42));
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse("3.14").unwrap(), Value::Float(3.14));
    }

    #[test]
    fn test_parse_fraction_reduces() {
        let v = parse("6/4").unwrap();
        assert_eq!(format!("{}", v), "3/2");
    }

    #[test]
    fn test_parse_fraction_zero_denominator_errors() {
        assert!(parse("5/0").is_err());
    }

    #[test]
    fn test_parse_string_strips_quotes() {
        assert_eq!(parse("\"hello\"").unwrap(), Value::string("hello"));
    }

    #[test]
    fn test_parse_symbol_uppercases() {
        assert_eq!(parse("foo").unwrap(), Value::symbol("FOO"));
    }

    #[test]
    fn test_parse_empty_list_is_nil() {
        assert!(parse("()").unwrap().is_nil());
    }

    #[test]
    fn test_parse_nested_list() {
        let v = parse("(one (two three) four)").unwrap();
        assert_eq!(format!("{}", v), "(ONE (TWO THREE) FOUR)");
    }

    #[test]
    fn test_parse_quote_sugar() {
        let v = parse("'foo").unwrap();
        assert_eq!(format!("{}", v), "(QUOTE FOO)");
    }

    #[test]
    fn test_parse_backquote_comma_sugar() {
        let v = parse("`(a ,b ,@c)").unwrap();
        assert_eq!(format!("{}", v), "(BACKQUOTE (A (COMMA B) (COMMA-AT C)))");
    }

    #[test]
    fn test_trailing_token_after_expression_is_error() {
        assert!(parse("1 2").is_err());
    }

    #[test]
    fn test_unclosed_list_is_error() {
        assert!(parse("(1 2").is_err());
    }

    #[test]
    fn test_reserved_token_is_literal_lexeme() {
        assert_eq!(parse("#").unwrap(), Value::string("#"));
    }

    #[test]
    fn test_parse_program_reads_multiple_forms() {
        let forms = parse_program("(def! x 1) (def! y 2)", None).unwrap();
        assert_eq!(forms.len(), 2);
    }

    #[test]
    fn test_parse_program_empty_source() {
        assert_eq!(parse_program("  ;; just a comment\n", None).unwrap(), vec![]);
    }
}

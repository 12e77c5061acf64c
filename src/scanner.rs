// ABOUTME: Character-level scanner turning source text into a token stream

use crate::error::ParseError;

/// Token kinds per spec.md section 4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Symbol,
    String,
    Integer,
    Float,
    Frac,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Semi,
    Pound,
    Pipe,
    Colon,
    SingleQuote,
    BackQuote,
    Comma,
    CommaAt,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn is_sign(c: char) -> bool {
    c == '+' || c == '-'
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_symbol_extra(c: char) -> bool {
    "~!$%^&*_=\\/?<>".contains(c)
}

fn is_symbol_first(c: char) -> bool {
    is_alpha(c) || is_sign(c) || is_symbol_extra(c)
}

fn is_symbol_rest(c: char) -> bool {
    is_symbol_first(c) || is_digit(c) || c == ':'
}

/// Character cursor over the source string: mark/point/line tracking plus
/// backtrack save/restore, grounded in `Parser.ScannerBuffer`.
#[derive(Debug, Clone)]
struct Buffer {
    source: Vec<char>,
    point: usize,
    mark: usize,
    line: usize,
    line_start: usize,
}

impl Buffer {
    fn new(source: &str) -> Self {
        Buffer {
            source: source.chars().collect(),
            point: 0,
            mark: 0,
            line: 1,
            line_start: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.point).copied()
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.point += 1;
        if c == '\n' {
            self.line += 1;
            self.line_start = self.point;
        }
        Some(c)
    }

    fn mark_start_of_lexeme(&mut self) {
        self.mark = self.point;
    }

    fn lexeme(&self) -> String {
        self.source[self.mark..self.point].iter().collect()
    }

    fn column(&self) -> usize {
        self.point - self.line_start + 1
    }

    fn line_text(&self) -> String {
        let end = self.source[self.line_start..]
            .iter()
            .position(|&c| c == '\n')
            .map(|i| self.line_start + i)
            .unwrap_or(self.source.len());
        self.source[self.line_start..end].iter().collect()
    }
}

/// Snapshot of the buffer's backtracking-relevant state.
#[derive(Debug, Clone)]
struct SavedState {
    point: usize,
    mark: usize,
    line: usize,
    line_start: usize,
}

impl Buffer {
    fn save(&self) -> SavedState {
        SavedState {
            point: self.point,
            mark: self.mark,
            line: self.line,
            line_start: self.line_start,
        }
    }

    fn restore(&mut self, saved: SavedState) {
        self.point = saved.point;
        self.mark = saved.mark;
        self.line = saved.line;
        self.line_start = saved.line_start;
    }
}

/// Classifies the next lexeme into a token kind, skipping whitespace and
/// `;;`-to-newline comments, resolving the sign/digit-vs-symbol ambiguity via
/// bounded rollback (spec.md section 4.1). Grounded in `LypsParser.LypsScanner`.
pub struct Scanner {
    buffer: Buffer,
    file: Option<String>,
    token: Token,
    pending_error: Option<ParseError>,
}

impl Scanner {
    pub fn new(source: &str, file: Option<String>) -> Self {
        let mut scanner = Scanner {
            buffer: Buffer::new(source),
            file,
            token: Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                line: 1,
                column: 1,
            },
            pending_error: None,
        };
        scanner.advance();
        scanner
    }

    pub fn peek_token(&self) -> &Token {
        &self.token
    }

    pub fn advance(&mut self) {
        self.token = self.scan_next_token();
    }

    /// Takes the error raised by the most recent scan, if any — an
    /// unterminated string or an unrecognized character. The [`Reader`](crate::reader::Reader)
    /// checks this after every `advance()`/construction so a bad character
    /// surfaces as a proper `ParseError` instead of a silent `EOF` token.
    pub fn take_error(&mut self) -> Option<ParseError> {
        self.pending_error.take()
    }

    fn error_at(&self, line: usize, column: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(
            self.file.clone(),
            line,
            column,
            self.buffer.line_text(),
            message.into(),
        )
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while matches!(self.buffer.peek(), Some(c) if is_whitespace(c)) {
                self.buffer.consume();
            }
            if self.buffer.peek() == Some(';') {
                let saved = self.buffer.save();
                self.buffer.consume();
                if self.buffer.peek() == Some(';') {
                    while !matches!(self.buffer.peek(), None | Some('\n')) {
                        self.buffer.consume();
                    }
                    continue;
                }
                self.buffer.restore(saved);
            }
            break;
        }
    }

    fn scan_next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let line = self.buffer.line;
        let column = self.buffer.column();
        self.buffer.mark_start_of_lexeme();

        let c = match self.buffer.peek() {
            None => {
                return Token {
                    kind: TokenKind::Eof,
                    lexeme: String::new(),
                    line,
                    column,
                }
            }
            Some(c) => c,
        };

        if c == '"' {
            return self.scan_string(line, column);
        }
        if is_digit(c) || is_sign(c) {
            return self.scan_number_or_symbol(line, column);
        }
        if is_symbol_first(c) {
            return self.scan_symbol(line, column);
        }

        self.buffer.consume();
        let kind = match c {
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '[' => TokenKind::OpenBracket,
            ']' => TokenKind::CloseBracket,
            ';' => TokenKind::Semi,
            '#' => TokenKind::Pound,
            '|' => TokenKind::Pipe,
            ':' => TokenKind::Colon,
            '\'' => TokenKind::SingleQuote,
            '`' => TokenKind::BackQuote,
            ',' => {
                if self.buffer.peek() == Some('@') {
                    self.buffer.consume();
                    TokenKind::CommaAt
                } else {
                    TokenKind::Comma
                }
            }
            other => {
                self.pending_error =
                    Some(self.error_at(line, column, format!("unexpected character '{}'", other)));
                return Token {
                    kind: TokenKind::Eof,
                    lexeme: String::new(),
                    line,
                    column,
                };
            }
        };

        Token {
            kind,
            lexeme: self.buffer.lexeme(),
            line,
            column,
        }
    }

    fn scan_string(&mut self, line: usize, column: usize) -> Token {
        self.buffer.consume(); // opening quote
        loop {
            match self.buffer.peek() {
                Some('"') => {
                    self.buffer.consume();
                    break;
                }
                Some(_) => {
                    self.buffer.consume();
                }
                None => {
                    self.pending_error = Some(self.error_at(line, column, "unterminated string literal"));
                    break;
                }
            }
        }
        Token {
            kind: TokenKind::String,
            lexeme: self.buffer.lexeme(),
            line,
            column,
        }
    }

    /// A leading digit is never `symbol-first` (only sign characters
    /// straddle both classes), so the number-scanner's "restore and reparse
    /// as a symbol" fallback can itself land on a non-symbol-first
    /// character — e.g. `5/x` restores to the bare `5`. That is a scan
    /// error here exactly as in `LypsScanner._scanSymbol`, which raises
    /// `ParseError` in the same situation.
    fn scan_symbol(&mut self, line: usize, column: usize) -> Token {
        match self.buffer.peek() {
            Some(c) if is_symbol_first(c) => {
                self.buffer.consume();
            }
            _ => {
                self.pending_error = Some(self.error_at(line, column, "invalid symbol character"));
                return Token {
                    kind: TokenKind::Eof,
                    lexeme: String::new(),
                    line,
                    column,
                };
            }
        }
        while matches!(self.buffer.peek(), Some(c) if is_symbol_rest(c)) {
            self.buffer.consume();
        }
        Token {
            kind: TokenKind::Symbol,
            lexeme: self.buffer.lexeme(),
            line,
            column,
        }
    }

    /// Bounded-backtracking number/symbol disambiguation (spec.md section
    /// 4.1, steps 1-6), grounded in `LypsScanner._scanNumOrSymbol`.
    fn scan_number_or_symbol(&mut self, line: usize, column: usize) -> Token {
        let saved = self.buffer.save();
        let leader = self.buffer.consume().unwrap();

        if is_sign(leader) {
            match self.buffer.peek() {
                Some(c) if is_digit(c) => {}
                _ => {
                    self.buffer.restore(saved);
                    return self.scan_symbol(line, column);
                }
            }
        }

        while matches!(self.buffer.peek(), Some(c) if is_digit(c)) {
            self.buffer.consume();
        }

        match self.buffer.peek() {
            Some('/') => {
                let slash_saved = self.buffer.save();
                self.buffer.consume();
                if matches!(self.buffer.peek(), Some(c) if is_digit(c)) {
                    while matches!(self.buffer.peek(), Some(c) if is_digit(c)) {
                        self.buffer.consume();
                    }
                    Token {
                        kind: TokenKind::Frac,
                        lexeme: self.buffer.lexeme(),
                        line,
                        column,
                    }
                } else {
                    self.buffer.restore(slash_saved);
                    self.buffer.restore(saved);
                    self.scan_symbol(line, column)
                }
            }
            Some('e') | Some('E') => self.scan_exponent(saved, line, column),
            Some('.') => {
                let dot_saved = self.buffer.save();
                self.buffer.consume();
                if !matches!(self.buffer.peek(), Some(c) if is_digit(c)) {
                    self.buffer.restore(dot_saved);
                    self.buffer.restore(saved);
                    return self.scan_symbol(line, column);
                }
                while matches!(self.buffer.peek(), Some(c) if is_digit(c)) {
                    self.buffer.consume();
                }
                if matches!(self.buffer.peek(), Some('e') | Some('E')) {
                    self.scan_exponent(saved, line, column)
                } else {
                    Token {
                        kind: TokenKind::Float,
                        lexeme: self.buffer.lexeme(),
                        line,
                        column,
                    }
                }
            }
            _ => Token {
                kind: TokenKind::Integer,
                lexeme: self.buffer.lexeme(),
                line,
                column,
            },
        }
    }

    /// Consumes `e`/`E` [sign] digit+ given the digits before it are already
    /// scanned; on shortfall restores all the way back to `saved` and
    /// rescans as a symbol (spec.md section 4.1 steps 4-5).
    fn scan_exponent(&mut self, saved: SavedState, line: usize, column: usize) -> Token {
        let exp_saved = self.buffer.save();
        self.buffer.consume(); // 'e' or 'E'

        if matches!(self.buffer.peek(), Some(c) if is_sign(c)) {
            self.buffer.consume();
        }

        if !matches!(self.buffer.peek(), Some(c) if is_digit(c)) {
            self.buffer.restore(exp_saved);
            self.buffer.restore(saved);
            return self.scan_symbol(line, column);
        }

        while matches!(self.buffer.peek(), Some(c) if is_digit(c)) {
            self.buffer.consume();
        }

        Token {
            kind: TokenKind::Float,
            lexeme: self.buffer.lexeme(),
            line,
            column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(source, None);
        let mut out = Vec::new();
        loop {
            let kind = scanner.peek_token().kind;
            out.push(kind);
            if kind == TokenKind::Eof {
                break;
            }
            scanner.advance();
        }
        out
    }

    fn lexemes(source: &str) -> Vec<String> {
        let mut scanner = Scanner::new(source, None);
        let mut out = Vec::new();
        loop {
            let token = scanner.peek_token().clone();
            if token.kind == TokenKind::Eof {
                break;
            }
            out.push(token.lexeme);
            scanner.advance();
        }
        out
    }

    #[test]
    fn test_empty_source_is_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_parens_and_symbol() {
        assert_eq!(
            kinds("(foo)"),
            vec![
                TokenKind::OpenParen,
                TokenKind::Symbol,
                TokenKind::CloseParen,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_integer() {
        assert_eq!(kinds("42"), vec![TokenKind::Integer, TokenKind::Eof]);
        assert_eq!(kinds("-42"), vec![TokenKind::Integer, TokenKind::Eof]);
    }

    #[test]
    fn test_bare_sign_is_symbol() {
        assert_eq!(kinds("+"), vec![TokenKind::Symbol, TokenKind::Eof]);
        assert_eq!(kinds("-"), vec![TokenKind::Symbol, TokenKind::Eof]);
    }

    #[test]
    fn test_sign_followed_by_non_digit_is_symbol() {
        assert_eq!(kinds("-foo"), vec![TokenKind::Symbol, TokenKind::Eof]);
        assert_eq!(lexemes("-foo"), vec!["-foo".to_string()]);
    }

    #[test]
    fn test_fraction() {
        assert_eq!(kinds("5/2"), vec![TokenKind::Frac, TokenKind::Eof]);
        assert_eq!(lexemes("5/2"), vec!["5/2".to_string()]);
    }

    #[test]
    fn test_slash_without_trailing_digit_is_scan_error() {
        // "5/x" restores all the way back to the leading "5" to reparse as
        // a symbol, but a bare digit isn't symbol-first — same scan error
        // the original scanner raises in this situation.
        let mut scanner = Scanner::new("5/x", None);
        assert_eq!(scanner.peek_token().kind, TokenKind::Eof);
        assert!(scanner.take_error().is_some());
    }

    #[test]
    fn test_float_with_decimal() {
        assert_eq!(kinds("3.14"), vec![TokenKind::Float, TokenKind::Eof]);
    }

    #[test]
    fn test_float_with_exponent() {
        assert_eq!(kinds("1e10"), vec![TokenKind::Float, TokenKind::Eof]);
        assert_eq!(kinds("1e-10"), vec![TokenKind::Float, TokenKind::Eof]);
        assert_eq!(kinds("1.5e+3"), vec![TokenKind::Float, TokenKind::Eof]);
    }

    #[test]
    fn test_exponent_without_digit_is_scan_error() {
        let mut scanner = Scanner::new("1e", None);
        assert_eq!(scanner.peek_token().kind, TokenKind::Eof);
        assert!(scanner.take_error().is_some());
    }

    #[test]
    fn test_dot_without_digit_is_scan_error() {
        let mut scanner = Scanner::new("1.", None);
        assert_eq!(scanner.peek_token().kind, TokenKind::Eof);
        assert!(scanner.take_error().is_some());
    }

    #[test]
    fn test_sign_leads_into_valid_number_after_restore() {
        // "+foo" restores to a symbol cleanly because '+' IS symbol-first.
        assert_eq!(kinds("+foo"), vec![TokenKind::Symbol, TokenKind::Eof]);
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(kinds("\"hello world\""), vec![TokenKind::String, TokenKind::Eof]);
        assert_eq!(lexemes("\"hi\""), vec!["\"hi\"".to_string()]);
    }

    #[test]
    fn test_unterminated_string_reports_error() {
        let mut scanner = Scanner::new("\"unterminated", None);
        assert_eq!(scanner.peek_token().kind, TokenKind::String);
        assert!(scanner.take_error().is_some());
    }

    #[test]
    fn test_reader_macro_tokens() {
        assert_eq!(
            kinds("'`,@, "),
            vec![
                TokenKind::SingleQuote,
                TokenKind::BackQuote,
                TokenKind::CommaAt,
                TokenKind::Comma,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_single_semicolon_is_token_not_comment() {
        assert_eq!(kinds(";"), vec![TokenKind::Semi, TokenKind::Eof]);
    }

    #[test]
    fn test_double_semicolon_is_comment_to_end_of_line() {
        assert_eq!(
            kinds(";; this is a comment\n42"),
            vec![TokenKind::Integer, TokenKind::Eof]
        );
    }

    #[test]
    fn test_comment_then_semi_token() {
        // After a comment ends at the newline, a lone ';' afterward is a
        // real SEMI token, not swallowed by the comment skip.
        assert_eq!(
            kinds(";; comment\n;"),
            vec![TokenKind::Semi, TokenKind::Eof]
        );
    }

    #[test]
    fn test_reserved_single_char_tokens() {
        assert_eq!(
            kinds("#|:[]"),
            vec![
                TokenKind::Pound,
                TokenKind::Pipe,
                TokenKind::Colon,
                TokenKind::OpenBracket,
                TokenKind::CloseBracket,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_line_and_column_tracking() {
        let mut scanner = Scanner::new("foo\nbar", None);
        assert_eq!(scanner.peek_token().line, 1);
        assert_eq!(scanner.peek_token().column, 1);
        scanner.advance();
        assert_eq!(scanner.peek_token().line, 2);
        assert_eq!(scanner.peek_token().column, 1);
    }

    #[test]
    fn test_unexpected_character_reports_error() {
        let mut scanner = Scanner::new("@", None);
        assert!(scanner.take_error().is_some());
        assert_eq!(scanner.peek_token().kind, TokenKind::Eof);
    }
}

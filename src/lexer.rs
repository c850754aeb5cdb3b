// File: src/lexer.rs
//
// Lexical analyzer for CopyClean scripts. Converts source text into a lazy
// stream of tokens, one per `next_token` call.
//
// The only context-sensitive rule is `/`: depending on the previously
// emitted token it is either the divide operator or the start of a regex
// literal. Format strings are ordinary string literals whose opening quote
// is immediately preceded by `f`; the prefix stays in the lexeme.

use crate::ast::{Pos, Span};
use crate::errors::{Error, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Int,
    Float,
    Str,
    FStr,
    Bool,
    Regex,
    KwFunction,
    KwReturns,
    KwIf,
    KwElif,
    KwElse,
    KwWhile,
    KwReturn,
    KwBreak,
    KwContinue,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,
    Plus,
    Minus,
    Star,
    Slash,
    Pow,
    Concat,
    Assign,
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    And,
    Or,
    Not,
    Question,
    Colon,
    Eof,
    Unknown,
}

impl TokenKind {
    /// Whether a token of this kind can be the last token of an expression.
    /// Used to decide if a following `/` is the divide operator.
    fn ends_expression(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::Int
                | TokenKind::Float
                | TokenKind::Str
                | TokenKind::FStr
                | TokenKind::Bool
                | TokenKind::Regex
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::Eof
        )
    }
}

/// A token: kind, the exact source text it covers, and its span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    /// Kind of the most recently emitted token, for the `/` rule.
    last_kind: Option<TokenKind>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer { chars: source.chars().collect(), pos: 0, line: 1, column: 1, last_kind: None }
    }

    fn eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn here(&self) -> Pos {
        Pos::new(self.line, self.column)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek(0) {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') if self.peek(1) == Some('/') => {
                    while let Some(c) = self.peek(0) {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn lexeme_from(&self, start_idx: usize) -> String {
        self.chars[start_idx..self.pos].iter().collect()
    }

    fn token(&mut self, kind: TokenKind, lexeme: String, start: Pos) -> Token {
        self.last_kind = Some(kind);
        Token { kind, lexeme, span: Span::new(start, self.here()) }
    }

    /// Pull the next token. `Eof` repeats once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Token, Box<Error>> {
        self.skip_whitespace_and_comments();

        let start = self.here();
        let start_idx = self.pos;

        let c = match self.peek(0) {
            None => return Ok(self.token(TokenKind::Eof, String::new(), start)),
            Some(c) => c,
        };

        if c.is_ascii_digit() {
            return Ok(self.read_number(start, start_idx));
        }

        // f"..." / f'...' format string
        if c == 'f' && matches!(self.peek(1), Some('"') | Some('\'')) {
            self.advance(); // f
            return self.read_string(start, start_idx, TokenKind::FStr);
        }

        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.read_identifier_or_keyword(start, start_idx));
        }

        if c == '"' || c == '\'' {
            return self.read_string(start, start_idx, TokenKind::Str);
        }

        if c == '/' && self.peek(1) != Some('/') && self.slash_starts_regex() {
            return self.read_regex(start, start_idx);
        }

        Ok(self.read_operator_or_punct(start, start_idx))
    }

    fn read_number(&mut self, start: Pos, start_idx: usize) -> Token {
        let mut is_float = false;

        while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek(0) == Some('.') && matches!(self.peek(1), Some(c) if c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(0), Some('e') | Some('E')) {
            is_float = true;
            self.advance();
            if matches!(self.peek(0), Some('+') | Some('-')) {
                self.advance();
            }
            while matches!(self.peek(0), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        let kind = if is_float { TokenKind::Float } else { TokenKind::Int };
        let lexeme = self.lexeme_from(start_idx);
        self.token(kind, lexeme, start)
    }

    fn read_identifier_or_keyword(&mut self, start: Pos, start_idx: usize) -> Token {
        while matches!(self.peek(0), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }
        let lexeme = self.lexeme_from(start_idx);

        let kind = match lexeme.as_str() {
            "function" => TokenKind::KwFunction,
            "returns" => TokenKind::KwReturns,
            "if" => TokenKind::KwIf,
            "elif" => TokenKind::KwElif,
            "else" => TokenKind::KwElse,
            "while" => TokenKind::KwWhile,
            "return" => TokenKind::KwReturn,
            "break" => TokenKind::KwBreak,
            "continue" => TokenKind::KwContinue,
            "true" | "false" => TokenKind::Bool,
            _ => TokenKind::Identifier,
        };
        self.token(kind, lexeme, start)
    }

    fn read_string(
        &mut self,
        start: Pos,
        start_idx: usize,
        kind: TokenKind,
    ) -> Result<Token, Box<Error>> {
        let quote = self.advance().expect("string starts at a quote");
        loop {
            match self.peek(0) {
                None => {
                    return Err(Error::with_span(
                        ErrorKind::Syntax,
                        "unterminated string literal",
                        Span::new(start, self.here()),
                    ));
                }
                Some('\\') => {
                    // A backslash escapes exactly one following character;
                    // backslash-newline (or CRLF) is a line continuation.
                    self.advance();
                    if self.peek(0) == Some('\r') && self.peek(1) == Some('\n') {
                        self.advance();
                    }
                    if self.peek(0).is_some() {
                        self.advance();
                    }
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let lexeme = self.lexeme_from(start_idx);
        Ok(self.token(kind, lexeme, start))
    }

    /// Forward scan deciding whether the `/` under the cursor opens a regex
    /// literal: it does iff an unescaped closing `/` exists before the end
    /// of the current line.
    fn slash_starts_regex(&self) -> bool {
        if let Some(kind) = self.last_kind {
            if kind.ends_expression() {
                return false;
            }
        }
        let mut i = self.pos + 1;
        while let Some(&c) = self.chars.get(i) {
            match c {
                '\n' => return false,
                '\\' => i += 2,
                '/' => return true,
                _ => i += 1,
            }
        }
        false
    }

    fn read_regex(&mut self, start: Pos, start_idx: usize) -> Result<Token, Box<Error>> {
        self.advance(); // opening '/'
        loop {
            match self.peek(0) {
                None => {
                    return Err(Error::with_span(
                        ErrorKind::Syntax,
                        "unterminated regex literal",
                        Span::new(start, self.here()),
                    ));
                }
                Some('\\') => {
                    self.advance();
                    if self.peek(0).is_some() {
                        self.advance();
                    }
                }
                Some('/') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        // trailing flag letters
        while matches!(self.peek(0), Some(c) if c.is_ascii_alphabetic()) {
            self.advance();
        }
        let lexeme = self.lexeme_from(start_idx);
        Ok(self.token(TokenKind::Regex, lexeme, start))
    }

    fn read_operator_or_punct(&mut self, start: Pos, start_idx: usize) -> Token {
        let c = self.peek(0).expect("caller checked for input");
        let n = self.peek(1);

        let two = match (c, n) {
            ('=', Some('=')) => Some(TokenKind::Eq),
            ('!', Some('=')) => Some(TokenKind::Ne),
            ('>', Some('=')) => Some(TokenKind::Ge),
            ('<', Some('=')) => Some(TokenKind::Le),
            ('&', Some('&')) => Some(TokenKind::And),
            ('|', Some('|')) => Some(TokenKind::Or),
            ('*', Some('*')) => Some(TokenKind::Pow),
            ('+', Some('+')) => Some(TokenKind::Concat),
            _ => None,
        };
        if let Some(kind) = two {
            self.advance();
            self.advance();
            let lexeme = self.lexeme_from(start_idx);
            return self.token(kind, lexeme, start);
        }

        self.advance();
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => TokenKind::Assign,
            '>' => TokenKind::Gt,
            '<' => TokenKind::Lt,
            '!' => TokenKind::Not,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            _ => TokenKind::Unknown,
        };
        let lexeme = self.lexeme_from(start_idx);
        self.token(kind, lexeme, start)
    }
}

/// Decode a string or format-string lexeme into its runtime text: strips the
/// optional `f` prefix and the quotes, drops line continuations, and maps
/// each remaining `\c` escape to `c`.
pub fn decode_string(lexeme: &str) -> String {
    let body = lexeme.strip_prefix('f').unwrap_or(lexeme);
    let mut chars = body.chars();
    let quote = chars.next();
    debug_assert!(matches!(quote, Some('"') | Some('\'')));

    let inner: Vec<char> = chars.collect();
    let inner = &inner[..inner.len().saturating_sub(1)];

    let mut out = String::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        let c = inner[i];
        if c == '\\' && i + 1 < inner.len() {
            match inner[i + 1] {
                '\n' => i += 2,
                '\r' if inner.get(i + 2) == Some(&'\n') => i += 3,
                escaped => {
                    out.push(escaped);
                    i += 2;
                }
            }
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token().expect("test source lexes cleanly");
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex_all(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn numbers_and_operators() {
        assert_eq!(
            kinds("1 + 2.5 * 3e2 ** 2"),
            vec![
                TokenKind::Int,
                TokenKind::Plus,
                TokenKind::Float,
                TokenKind::Star,
                TokenKind::Float,
                TokenKind::Pow,
                TokenKind::Int,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("function foo returns int while true"),
            vec![
                TokenKind::KwFunction,
                TokenKind::Identifier,
                TokenKind::KwReturns,
                TokenKind::Identifier,
                TokenKind::KwWhile,
                TokenKind::Bool,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn multi_char_operators_win_over_prefixes() {
        assert_eq!(
            kinds("a == b != c >= d <= e && f || g ++ h"),
            vec![
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Identifier,
                TokenKind::Ne,
                TokenKind::Identifier,
                TokenKind::Ge,
                TokenKind::Identifier,
                TokenKind::Le,
                TokenKind::Identifier,
                TokenKind::And,
                TokenKind::Identifier,
                TokenKind::Or,
                TokenKind::Identifier,
                TokenKind::Concat,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn slash_after_value_is_divide() {
        assert_eq!(
            kinds("a / b"),
            vec![TokenKind::Identifier, TokenKind::Slash, TokenKind::Identifier, TokenKind::Eof]
        );
        assert_eq!(
            kinds("(1) / 2"),
            vec![
                TokenKind::LParen,
                TokenKind::Int,
                TokenKind::RParen,
                TokenKind::Slash,
                TokenKind::Int,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn slash_in_expression_position_is_regex() {
        let tokens = lex_all("regex r(/[0-9]+/i);");
        let regex_tok = tokens.iter().find(|t| t.kind == TokenKind::Regex).unwrap();
        assert_eq!(regex_tok.lexeme, "/[0-9]+/i");
    }

    #[test]
    fn slash_without_closing_partner_is_divide() {
        // Expression position, but no closing '/' before the end of the
        // line: the forward scan fails and `/` stays a divide operator.
        assert_eq!(
            kinds("( / 5"),
            vec![TokenKind::LParen, TokenKind::Slash, TokenKind::Int, TokenKind::Eof]
        );
    }

    #[test]
    fn escaped_slash_does_not_close_regex() {
        let tokens = lex_all("regex r(/a\\/b/);");
        let regex_tok = tokens.iter().find(|t| t.kind == TokenKind::Regex).unwrap();
        assert_eq!(regex_tok.lexeme, "/a\\/b/");
    }

    #[test]
    fn format_string_prefix_is_kept() {
        let tokens = lex_all("fstring(f\"%1 items\", n)");
        let fstr = tokens.iter().find(|t| t.kind == TokenKind::FStr).unwrap();
        assert_eq!(fstr.lexeme, "f\"%1 items\"");
    }

    #[test]
    fn unterminated_string_is_a_syntax_error() {
        let mut lexer = Lexer::new("\"oops");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.span.unwrap().start, crate::ast::Pos::new(1, 1));
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("x = 1; // trailing note\ny = 2;"),
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Int,
                TokenKind::Semicolon,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Int,
                TokenKind::Semicolon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lexemes_round_trip_the_source() {
        let source = "string s(\"a b\");\nwhile (s.length() > 0) { s = \"\"; };";
        let rebuilt: String = lex_all(source).iter().map(|t| t.lexeme.as_str()).collect();
        let stripped: String = {
            // Remove exactly the characters the lexer may skip. Quoted
            // whitespace stays because it is inside a lexeme.
            let mut out = String::new();
            let mut in_string = false;
            for c in source.chars() {
                if c == '"' {
                    in_string = !in_string;
                }
                if in_string || !c.is_whitespace() {
                    out.push(c);
                }
            }
            out
        };
        assert_eq!(rebuilt, stripped);
    }

    #[test]
    fn spans_are_monotonic() {
        let tokens = lex_all("int n(4) = 2 + 2;\nprint(n);");
        for pair in tokens.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let before = (a.span.end.line, a.span.end.column);
            let after = (b.span.start.line, b.span.start.column);
            assert!(before <= after, "token {:?} overlaps {:?}", a, b);
        }
    }

    #[test]
    fn decode_string_handles_escapes_and_continuations() {
        assert_eq!(decode_string("\"plain\""), "plain");
        assert_eq!(decode_string("'single'"), "single");
        assert_eq!(decode_string("\"a\\\"b\""), "a\"b");
        assert_eq!(decode_string("\"a\\\\b\""), "a\\b");
        assert_eq!(decode_string("\"one\\\ntwo\""), "onetwo");
        assert_eq!(decode_string("f\"%1 ok\""), "%1 ok");
    }

    #[test]
    fn line_and_column_tracking() {
        let tokens = lex_all("x = 1;\n  y = 2;");
        let y = tokens.iter().find(|t| t.lexeme == "y").unwrap();
        assert_eq!(y.span.start, crate::ast::Pos::new(2, 3));
    }
}

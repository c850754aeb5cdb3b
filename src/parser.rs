// File: src/parser.rs
//
// Recursive-descent parser for CopyClean scripts. Holds one token of
// lookahead pulled lazily from the lexer and builds spanned AST nodes;
// expressions use one precedence level per method.

use crate::ast::{Expr, ExprKind, Param, Pos, Span, Stmt, Type};
use crate::ast::Operator;
use crate::errors::{Error, ErrorKind};
use crate::interpreter::value::{RegexValue, Value};
use crate::lexer::{decode_string, Lexer, Token, TokenKind};

/// Identifiers that start a variable declaration or a cast.
const TYPE_NAMES: [&str; 7] = ["int", "float", "boolean", "string", "regex", "match", "list"];

pub struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, Box<Error>> {
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    /// Convenience for lexing and parsing a whole source text.
    pub fn parse_source(source: &str) -> Result<Vec<Stmt>, Box<Error>> {
        Parser::new(Lexer::new(source))?.parse()
    }

    pub fn parse(&mut self) -> Result<Vec<Stmt>, Box<Error>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    // --- token plumbing ---

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn advance(&mut self) -> Result<Token, Box<Error>> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn match_kind(&mut self, kind: TokenKind) -> Result<bool, Box<Error>> {
        if self.check(kind) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, Box<Error>> {
        if self.check(kind) {
            return self.advance();
        }
        Err(Error::syntax(message, self.current.span))
    }

    fn is_type_name(&self) -> bool {
        self.check(TokenKind::Identifier) && TYPE_NAMES.contains(&self.current.lexeme.as_str())
    }

    // --- statements ---

    fn parse_statement(&mut self) -> Result<Stmt, Box<Error>> {
        if self.match_kind(TokenKind::KwFunction)? {
            return self.parse_function_def();
        }
        if self.match_kind(TokenKind::KwIf)? {
            return self.parse_if_statement();
        }
        if self.match_kind(TokenKind::KwWhile)? {
            return self.parse_while_statement();
        }
        if self.match_kind(TokenKind::KwReturn)? {
            let expr = self.parse_expression()?;
            self.expect(TokenKind::Semicolon, "expected ';' after return statement")?;
            return Ok(Stmt::Return(expr));
        }
        if self.match_kind(TokenKind::KwBreak)? {
            self.expect(TokenKind::Semicolon, "expected ';' after 'break'")?;
            return Ok(Stmt::Break);
        }
        if self.match_kind(TokenKind::KwContinue)? {
            self.expect(TokenKind::Semicolon, "expected ';' after 'continue'")?;
            return Ok(Stmt::Continue);
        }

        if self.check(TokenKind::Identifier) {
            if self.is_type_name() {
                return self.parse_var_declaration();
            }
            // Assignment or expression statement; decided by the token
            // following the parsed expression.
            let expr = self.parse_expression()?;
            if self.match_kind(TokenKind::Assign)? {
                let name = match expr.kind {
                    ExprKind::Variable(name) => name,
                    _ => return Err(Error::syntax("invalid assignment target", expr.span)),
                };
                let value = self.parse_expression()?;
                self.expect(TokenKind::Semicolon, "expected ';' after assignment")?;
                return Ok(Stmt::Assignment { name, expr: value });
            }
            self.expect(TokenKind::Semicolon, "expected ';' after expression")?;
            return Ok(Stmt::Expression(expr));
        }

        Err(Error::syntax("unexpected token in statement", self.current.span))
    }

    fn parse_block(&mut self, open_msg: &str, close_msg: &str) -> Result<Vec<Stmt>, Box<Error>> {
        self.expect(TokenKind::LBrace, open_msg)?;
        let mut body = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            body.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace, close_msg)?;
        Ok(body)
    }

    fn parse_var_declaration(&mut self) -> Result<Stmt, Box<Error>> {
        let ty = self.parse_type()?;
        let name_tok = self.expect(TokenKind::Identifier, "expected variable name after type")?;

        self.expect(TokenKind::LParen, "expected '(' after variable name")?;
        let mut init = None;
        if !self.check(TokenKind::RParen) {
            init = Some(self.parse_expression()?);
        }
        self.expect(TokenKind::RParen, "expected ')' after initializer")?;

        // Alternative initializer form: `int n() = expr;`
        if self.match_kind(TokenKind::Assign)? {
            init = Some(self.parse_expression()?);
        }

        self.expect(TokenKind::Semicolon, "expected ';' after variable declaration")?;
        Ok(Stmt::VarDecl { name: name_tok.lexeme, ty, init })
    }

    fn parse_if_statement(&mut self) -> Result<Stmt, Box<Error>> {
        self.expect(TokenKind::LParen, "expected '(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "expected ')' after if condition")?;
        let body = self.parse_block("expected '{' after if condition", "expected '}' after if body")?;

        let mut elif_clauses = Vec::new();
        while self.match_kind(TokenKind::KwElif)? {
            self.expect(TokenKind::LParen, "expected '(' after 'elif'")?;
            let elif_cond = self.parse_expression()?;
            self.expect(TokenKind::RParen, "expected ')' after elif condition")?;
            let elif_body =
                self.parse_block("expected '{' after elif condition", "expected '}' after elif body")?;
            elif_clauses.push((elif_cond, elif_body));
        }

        let mut else_body = Vec::new();
        if self.match_kind(TokenKind::KwElse)? {
            else_body = self.parse_block("expected '{' after 'else'", "expected '}' after else body")?;
        }

        self.expect(TokenKind::Semicolon, "expected ';' after if statement")?;
        Ok(Stmt::If { condition, body, elif_clauses, else_body })
    }

    fn parse_while_statement(&mut self) -> Result<Stmt, Box<Error>> {
        self.expect(TokenKind::LParen, "expected '(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "expected ')' after while condition")?;
        let body =
            self.parse_block("expected '{' after while condition", "expected '}' after while body")?;
        self.expect(TokenKind::Semicolon, "expected ';' after while statement")?;
        Ok(Stmt::While { condition, body })
    }

    fn parse_function_def(&mut self) -> Result<Stmt, Box<Error>> {
        let name_tok = self.expect(TokenKind::Identifier, "expected function name")?;

        // Return type comes before the parameter list:
        // `function name returns type(params)`.
        let mut return_type = None;
        if self.match_kind(TokenKind::KwReturns)? {
            return_type = Some(self.parse_type()?);
        }

        self.expect(TokenKind::LParen, "expected '(' after function name")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let ty = self.parse_type()?;
                let param_name = self.expect(TokenKind::Identifier, "expected parameter name")?;
                params.push(Param { name: param_name.lexeme, ty });
                if !self.match_kind(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "expected ')' after parameters")?;

        let body = self
            .parse_block("expected '{' after function signature", "expected '}' after function body")?;
        self.expect(TokenKind::Semicolon, "expected ';' after function definition")?;

        Ok(Stmt::FunctionDef { name: name_tok.lexeme, params, return_type, body })
    }

    // --- types ---

    fn parse_type(&mut self) -> Result<Type, Box<Error>> {
        let tok = self.expect(TokenKind::Identifier, "expected type name")?;
        match tok.lexeme.as_str() {
            "int" => Ok(Type::Int),
            "float" => Ok(Type::Float),
            "boolean" => Ok(Type::Bool),
            "string" => Ok(Type::String),
            "regex" => Ok(Type::Regex),
            "match" => Ok(Type::Match),
            "list" => {
                self.expect(TokenKind::Lt, "expected '<' after 'list'")?;
                let elem = self.parse_type()?;
                self.expect(TokenKind::Gt, "expected '>' after list element type")?;
                Ok(Type::List(Box::new(elem)))
            }
            other => Err(Error::with_span(
                ErrorKind::Type,
                format!("unknown type: {}", other),
                tok.span,
            )),
        }
    }

    // --- expressions, lowest precedence first ---

    fn parse_expression(&mut self) -> Result<Expr, Box<Error>> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Result<Expr, Box<Error>> {
        let condition = self.parse_logical_or()?;
        if !self.match_kind(TokenKind::Question)? {
            return Ok(condition);
        }
        let then_expr = self.parse_expression()?;
        self.expect(TokenKind::Colon, "expected ':' in ternary expression")?;
        let else_expr = self.parse_expression()?;

        let span = condition.span.to(else_expr.span);
        Ok(Expr::new(
            ExprKind::Ternary {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            span,
        ))
    }

    fn binary(left: Expr, op: Operator, right: Expr) -> Expr {
        let span = left.span.to(right.span);
        Expr::new(ExprKind::Binary { left: Box::new(left), op, right: Box::new(right) }, span)
    }

    fn parse_logical_or(&mut self) -> Result<Expr, Box<Error>> {
        let mut left = self.parse_logical_and()?;
        while self.match_kind(TokenKind::Or)? {
            let right = self.parse_logical_and()?;
            left = Self::binary(left, Operator::Or, right);
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Expr, Box<Error>> {
        let mut left = self.parse_comparison()?;
        while self.match_kind(TokenKind::And)? {
            let right = self.parse_comparison()?;
            left = Self::binary(left, Operator::And, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, Box<Error>> {
        let mut left = self.parse_addition()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Eq => Operator::Eq,
                TokenKind::Ne => Operator::Ne,
                TokenKind::Gt => Operator::Gt,
                TokenKind::Lt => Operator::Lt,
                TokenKind::Ge => Operator::Ge,
                TokenKind::Le => Operator::Le,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_addition()?;
            left = Self::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_addition(&mut self) -> Result<Expr, Box<Error>> {
        let mut left = self.parse_multiplication()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => Operator::Add,
                TokenKind::Minus => Operator::Sub,
                TokenKind::Concat => Operator::Concat,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_multiplication()?;
            left = Self::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_multiplication(&mut self) -> Result<Expr, Box<Error>> {
        let mut left = self.parse_exponentiation()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => Operator::Mul,
                TokenKind::Slash => Operator::Div,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_exponentiation()?;
            left = Self::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_exponentiation(&mut self) -> Result<Expr, Box<Error>> {
        let left = self.parse_unary()?;
        if self.match_kind(TokenKind::Pow)? {
            // Right-associative.
            let right = self.parse_exponentiation()?;
            return Ok(Self::binary(left, Operator::Pow, right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, Box<Error>> {
        let op = match self.current.kind {
            TokenKind::Not => Some(Operator::Not),
            TokenKind::Minus => Some(Operator::Neg),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.current.span.start;
            self.advance()?;
            let expr = self.parse_unary()?;
            let span = Span::new(start, expr.span.end);
            return Ok(Expr::new(ExprKind::Unary { op, expr: Box::new(expr) }, span));
        }
        self.parse_postfix()
    }

    /// Postfix `.member` and `.method(args)` chains.
    fn parse_postfix(&mut self) -> Result<Expr, Box<Error>> {
        let mut expr = self.parse_primary()?;
        while self.match_kind(TokenKind::Dot)? {
            let name_tok = self.expect(TokenKind::Identifier, "expected member name after '.'")?;
            if self.check(TokenKind::LParen) {
                self.advance()?;
                let args = self.parse_call_args()?;
                let rparen = self.expect(TokenKind::RParen, "expected ')' after method arguments")?;
                let span = expr.span.to(rparen.span);
                expr = Expr::new(
                    ExprKind::MethodCall {
                        object: Box::new(expr),
                        method: name_tok.lexeme,
                        args,
                    },
                    span,
                );
            } else {
                let span = expr.span.to(name_tok.span);
                expr = Expr::new(
                    ExprKind::Member { object: Box::new(expr), name: name_tok.lexeme },
                    span,
                );
            }
        }
        Ok(expr)
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, Box<Error>> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_kind(TokenKind::Comma)? {
                    break;
                }
            }
        }
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, Box<Error>> {
        match self.current.kind {
            TokenKind::Int => {
                let tok = self.advance()?;
                let value: i64 = tok
                    .lexeme
                    .parse()
                    .map_err(|_| Error::syntax("invalid integer literal", tok.span))?;
                Ok(Expr::new(ExprKind::Literal(Value::Int(value)), tok.span))
            }
            TokenKind::Float => {
                let tok = self.advance()?;
                let value: f64 = tok
                    .lexeme
                    .parse()
                    .map_err(|_| Error::syntax("invalid float literal", tok.span))?;
                Ok(Expr::new(ExprKind::Literal(Value::Float(value)), tok.span))
            }
            TokenKind::Bool => {
                let tok = self.advance()?;
                Ok(Expr::new(ExprKind::Literal(Value::Bool(tok.lexeme == "true")), tok.span))
            }
            TokenKind::Str | TokenKind::FStr => {
                let tok = self.advance()?;
                Ok(Expr::new(ExprKind::Literal(Value::Str(decode_string(&tok.lexeme))), tok.span))
            }
            TokenKind::Regex => {
                let tok = self.advance()?;
                // Split at the last '/': pattern between the slashes, flag
                // letters after it.
                let lexeme = &tok.lexeme;
                let last_slash = lexeme.rfind('/').expect("regex lexeme contains '/'");
                let pattern = lexeme[1..last_slash].to_string();
                let flags = lexeme[last_slash + 1..].to_string();
                Ok(Expr::new(
                    ExprKind::Literal(Value::Regex(RegexValue { pattern, flags })),
                    tok.span,
                ))
            }
            TokenKind::Identifier => self.parse_identifier_expr(),
            TokenKind::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "expected ')' after expression")?;
                Ok(expr)
            }
            TokenKind::LBrace => self.parse_list_literal(),
            _ => Err(Error::syntax("unexpected token in expression", self.current.span)),
        }
    }

    /// Variable reference, function call, or cast; all start with an
    /// identifier. A reserved type name followed by `(` (or `<` for
    /// `list<T>`) is a cast.
    fn parse_identifier_expr(&mut self) -> Result<Expr, Box<Error>> {
        let is_type = self.is_type_name();
        let tok = self.advance()?;
        let start: Pos = tok.span.start;

        if is_type && (self.check(TokenKind::LParen) || self.check(TokenKind::Lt)) {
            let ty = match tok.lexeme.as_str() {
                "int" => Type::Int,
                "float" => Type::Float,
                "boolean" => Type::Bool,
                "string" => Type::String,
                "regex" => Type::Regex,
                "match" => Type::Match,
                _ => {
                    self.expect(TokenKind::Lt, "expected '<' after 'list' in type cast")?;
                    let elem = self.parse_type()?;
                    self.expect(TokenKind::Gt, "expected '>' after list element type")?;
                    Type::List(Box::new(elem))
                }
            };
            self.expect(TokenKind::LParen, "expected '(' after type in cast")?;
            let inner = self.parse_expression()?;
            let rparen = self.expect(TokenKind::RParen, "expected ')' after type cast expression")?;
            let span = Span::new(start, rparen.span.end);
            return Ok(Expr::new(ExprKind::Cast { ty, expr: Box::new(inner) }, span));
        }

        if self.check(TokenKind::LParen) {
            self.advance()?;
            let args = self.parse_call_args()?;
            let rparen = self.expect(TokenKind::RParen, "expected ')' after function arguments")?;
            let span = Span::new(start, rparen.span.end);
            return Ok(Expr::new(ExprKind::Call { name: tok.lexeme, args }, span));
        }

        Ok(Expr::new(ExprKind::Variable(tok.lexeme), tok.span))
    }

    fn parse_list_literal(&mut self) -> Result<Expr, Box<Error>> {
        let open = self.advance()?;
        let mut elements = Vec::new();
        if !self.check(TokenKind::RBrace) {
            loop {
                elements.push(self.parse_expression()?);
                if !self.match_kind(TokenKind::Comma)? {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RBrace, "expected '}' after list elements")?;
        let span = open.span.to(close.span);
        Ok(Expr::new(ExprKind::ListLiteral(elements), span))
    }
}

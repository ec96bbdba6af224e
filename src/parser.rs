use std::rc::Rc;

use crate::{
    ast::{BinaryOp, Expr, ExprKind, FunctionDecl, Literal, LogicalOp, Stmt, StmtKind, UnaryOp},
    diagnostics::{Diagnostic, LoxError, Result},
    lexer,
    token::{Keyword, Token, TokenKind},
};

pub const MAX_ARITY: usize = 255;

type ParseResult<T> = std::result::Result<T, Diagnostic>;

/// Scans and parses a whole program. Lexical and syntax errors are reported
/// together.
pub fn parse_program(source: &str) -> Result<Vec<Stmt>> {
    let (tokens, mut errors) = lexer::tokenize(source);
    let (program, syntax_errors) = Parser::new(tokens).program();
    errors.extend(syntax_errors);
    if errors.is_empty() {
        Ok(program)
    } else {
        Err(LoxError::Compile(errors))
    }
}

pub fn parse_expression(source: &str) -> Result<Expr> {
    let (tokens, mut errors) = lexer::tokenize(source);
    let (expr, syntax_errors) = Parser::new(tokens).expression();
    errors.extend(syntax_errors);
    match expr {
        Some(expr) if errors.is_empty() => Ok(expr),
        _ => Err(LoxError::Compile(errors)),
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<Diagnostic>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map_or(1, |token| token.line);
            tokens.push(Token::eof(line));
        }
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    pub fn program(mut self) -> (Vec<Stmt>, Vec<Diagnostic>) {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        tracing::debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        (statements, self.errors)
    }

    pub fn expression(mut self) -> (Option<Expr>, Vec<Diagnostic>) {
        let expr = match self.parse_expression() {
            Ok(expr) => Some(expr),
            Err(diagnostic) => {
                self.errors.push(diagnostic);
                None
            }
        };
        (expr, self.errors)
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.matches_keyword(Keyword::Fun) {
            self.function_declaration()
        } else if self.matches_keyword(Keyword::Var) {
            self.var_declaration()
        } else {
            self.statement()
        };
        match result {
            Ok(stmt) => Some(stmt),
            Err(diagnostic) => {
                self.errors.push(diagnostic);
                self.synchronize();
                None
            }
        }
    }

    fn function_declaration(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        let name = self.consume(TokenKind::Identifier, "Expect function name.")?;
        self.consume(TokenKind::LeftParen, "Expect '(' after function name.")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARITY {
                    let diagnostic =
                        Diagnostic::parser(self.peek(), "Can't have more than 255 parameters.");
                    self.errors.push(diagnostic);
                }
                let param = self.consume(TokenKind::Identifier, "Expect parameter name.")?;
                params.push(param.lexeme);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;
        self.consume(TokenKind::LeftBrace, "Expect '{' before function body.")?;
        let body = self.block()?;
        let decl = FunctionDecl {
            name: name.lexeme,
            params,
            body,
            line: name.line,
        };
        Ok(Stmt::new(StmtKind::Function(Rc::new(decl)), line))
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;
        let initializer = if self.matches(TokenKind::Equal) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.consume(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Stmt::new(
            StmtKind::Var {
                name: name.lexeme,
                initializer,
            },
            name.line,
        ))
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.matches_keyword(Keyword::For) {
            return self.for_statement();
        }
        if self.matches_keyword(Keyword::If) {
            return self.if_statement();
        }
        if self.matches_keyword(Keyword::Print) {
            return self.print_statement();
        }
        if self.matches_keyword(Keyword::Return) {
            return self.return_statement();
        }
        if self.matches_keyword(Keyword::While) {
            return self.while_statement();
        }
        if self.matches(TokenKind::LeftBrace) {
            let line = self.previous().line;
            return Ok(Stmt::new(StmtKind::Block(self.block()?), line));
        }
        self.expression_statement()
    }

    /// `for` has no node of its own: it becomes
    /// `{ init; while (cond) { body; increment; } }`.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;
        let initializer = if self.matches(TokenKind::Semicolon) {
            None
        } else if self.matches_keyword(Keyword::Var) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };
        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;
        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;
        if let Some(increment) = increment {
            let increment_line = increment.line;
            body = Stmt::new(
                StmtKind::Block(vec![
                    body,
                    Stmt::new(StmtKind::Expr(increment), increment_line),
                ]),
                line,
            );
        }
        let condition =
            condition.unwrap_or_else(|| Expr::new(ExprKind::Literal(Literal::Bool(true)), line));
        body = Stmt::new(
            StmtKind::While {
                condition,
                body: Box::new(body),
            },
            line,
        );
        if let Some(initializer) = initializer {
            body = Stmt::new(StmtKind::Block(vec![initializer, body]), line);
        }
        Ok(body)
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches_keyword(Keyword::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            line,
        ))
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        let value = self.parse_expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::new(StmtKind::Print(value), line))
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::new(StmtKind::Return(value), line))
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        let line = self.previous().line;
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::new(StmtKind::While { condition, body }, line))
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.parse_expression()?;
        let line = expr.line;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::new(StmtKind::Expr(expr), line))
    }

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;
        if self.matches(TokenKind::Equal) {
            let equals = self.previous().clone();
            let value = self.assignment()?;
            if let ExprKind::Variable(name) = &expr.kind {
                return Ok(Expr::new(
                    ExprKind::Assign {
                        name: name.clone(),
                        value: Box::new(value),
                    },
                    expr.line,
                ));
            }
            self.errors.push(Diagnostic::parser(&equals, "Invalid assignment target."));
        }
        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;
        while self.matches_keyword(Keyword::Or) {
            let line = self.previous().line;
            let right = self.and()?;
            expr = logical(LogicalOp::Or, expr, right, line);
        }
        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches_keyword(Keyword::And) {
            let line = self.previous().line;
            let right = self.equality()?;
            expr = logical(LogicalOp::And, expr, right, line);
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;
        while let Some((op, line)) = self.binary_operator(&[
            (TokenKind::BangEqual, BinaryOp::NotEqual),
            (TokenKind::EqualEqual, BinaryOp::Equal),
        ]) {
            let right = self.comparison()?;
            expr = binary(op, expr, right, line);
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;
        while let Some((op, line)) = self.binary_operator(&[
            (TokenKind::Greater, BinaryOp::Greater),
            (TokenKind::GreaterEqual, BinaryOp::GreaterEqual),
            (TokenKind::Less, BinaryOp::Less),
            (TokenKind::LessEqual, BinaryOp::LessEqual),
        ]) {
            let right = self.term()?;
            expr = binary(op, expr, right, line);
        }
        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;
        while let Some((op, line)) = self.binary_operator(&[
            (TokenKind::Minus, BinaryOp::Sub),
            (TokenKind::Plus, BinaryOp::Add),
        ]) {
            let right = self.factor()?;
            expr = binary(op, expr, right, line);
        }
        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;
        while let Some((op, line)) = self.binary_operator(&[
            (TokenKind::Slash, BinaryOp::Div),
            (TokenKind::Star, BinaryOp::Mul),
        ]) {
            let right = self.unary()?;
            expr = binary(op, expr, right, line);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Negate,
            _ => return self.call(),
        };
        let line = self.advance().line;
        let expr = self.unary()?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                expr: Box::new(expr),
            },
            line,
        ))
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        while self.matches(TokenKind::LeftParen) {
            expr = self.finish_call(expr)?;
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if args.len() >= MAX_ARITY {
                    let diagnostic =
                        Diagnostic::parser(self.peek(), "Can't have more than 255 arguments.");
                    self.errors.push(diagnostic);
                }
                args.push(self.parse_expression()?);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;
        Ok(Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            paren.line,
        ))
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        let kind = match token.kind {
            TokenKind::Keyword(Keyword::False) => ExprKind::Literal(Literal::Bool(false)),
            TokenKind::Keyword(Keyword::True) => ExprKind::Literal(Literal::Bool(true)),
            TokenKind::Keyword(Keyword::Nil) => ExprKind::Literal(Literal::Nil),
            TokenKind::Number | TokenKind::String => {
                ExprKind::Literal(token.literal.clone().unwrap_or(Literal::Nil))
            }
            TokenKind::Identifier => ExprKind::Variable(token.lexeme.clone()),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
                return Ok(Expr::new(ExprKind::Grouping(Box::new(inner)), token.line));
            }
            _ => return Err(Diagnostic::parser(&token, "Expect expression.")),
        };
        self.advance();
        Ok(Expr::new(kind, token.line))
    }

    /// Discards tokens until a likely statement boundary.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            if let TokenKind::Keyword(
                Keyword::Class
                | Keyword::Fun
                | Keyword::Var
                | Keyword::For
                | Keyword::If
                | Keyword::While
                | Keyword::Print
                | Keyword::Return,
            ) = self.peek().kind
            {
                return;
            }
            self.advance();
        }
    }

    fn binary_operator(&mut self, table: &[(TokenKind, BinaryOp)]) -> Option<(BinaryOp, usize)> {
        let kind = self.peek().kind;
        let op = table
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, op)| *op)?;
        let line = self.advance().line;
        Some((op, line))
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn matches_keyword(&mut self, keyword: Keyword) -> bool {
        self.matches(TokenKind::Keyword(keyword))
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(Diagnostic::parser(self.peek(), message))
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr, line: usize) -> Expr {
    Expr::new(
        ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        line,
    )
}

fn logical(op: LogicalOp, left: Expr, right: Expr, line: usize) -> Expr {
    Expr::new(
        ExprKind::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        line,
    )
}

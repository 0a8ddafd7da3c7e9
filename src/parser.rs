use std::rc::Rc;

use crate::error::ErrorReporter;
use crate::expr::Expr;
use crate::stmt::{FunctionDecl, Stmt};
use crate::token::TokenKind::*;
use crate::token::{Literal, Token, TokenKind};
use crate::value::Value;

/// Parse failure signal. The mistake itself was already reported through
/// the shared `ErrorReporter` at the point it was found; this only tells
/// the caller to stop building the current production and synchronize.
struct ParseError;

/// Recursive-descent parser over the full Lox grammar (the scanner/parser
/// pair is "external collaborator" territory per `spec.md` §1, specified
/// here only so the core has an AST to consume).
pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    reporter: &'a ErrorReporter,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, reporter: &'a ErrorReporter) -> Self {
        Parser { tokens, current: 0, reporter }
    }

    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(ParseError) => self.synchronize(),
            }
        }
        statements
    }

    /// Parses a single expression and requires it to consume the entire
    /// token stream up to EOF, for the `evaluate` subcommand and the REPL's
    /// bare-expression grammar extension. Requiring EOF (rather than just
    /// parsing a leading expression) is what keeps a full statement like
    /// `1 + 2;` from being mistaken for the bare expression `1 + 2`.
    pub fn parse_expression(&mut self) -> Result<Expr, ()> {
        let expr = self.expression().map_err(|_| ())?;
        if self.is_at_end() {
            Ok(expr)
        } else {
            Err(())
        }
    }

    fn declaration(&mut self) -> Result<Stmt, ParseError> {
        if self.match_types(&[Class]) {
            return self.class_declaration();
        }
        if self.match_types(&[Fun]) {
            return self.function("function").map(Stmt::Function);
        }
        if self.match_types(&[Var]) {
            return self.var_declaration();
        }
        self.statement()
    }

    fn class_declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(Identifier, "Expect class name.")?.clone();

        let superclass = if self.match_types(&[Less]) {
            self.consume(Identifier, "Expect superclass name.")?;
            Some(Expr::variable(self.previous().clone()))
        } else {
            None
        };

        self.consume(LeftBrace, "Expect '{' before class body.")?;
        let mut methods = Vec::new();
        while !self.check(RightBrace) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }
        self.consume(RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class { name, superclass, methods })
    }

    fn function(&mut self, kind: &str) -> Result<Rc<FunctionDecl>, ParseError> {
        let name = self.consume(Identifier, &format!("Expect {kind} name."))?.clone();
        self.consume(LeftParen, &format!("Expect '(' after {kind} name."))?;
        let mut params = Vec::new();
        if !self.check(RightParen) {
            loop {
                if params.len() >= 255 {
                    self.error(self.peek().clone(), "Can't have more than 255 parameters.");
                }
                params.push(self.consume(Identifier, "Expect parameter name.")?.clone());
                if !self.match_types(&[Comma]) {
                    break;
                }
            }
        }
        self.consume(RightParen, "Expect ')' after parameters.")?;
        self.consume(LeftBrace, &format!("Expect '{{' before {kind} body."))?;
        let body = self.block()?;
        Ok(Rc::new(FunctionDecl { name, params, body }))
    }

    fn var_declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(Identifier, "Expect variable name.")?.clone();
        let initializer = if self.match_types(&[Equal]) { Some(self.expression()?) } else { None };
        self.consume(Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var { name, initializer })
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.match_types(&[For]) {
            return self.for_statement();
        }
        if self.match_types(&[If]) {
            return self.if_statement();
        }
        if self.match_types(&[Print]) {
            return self.print_statement();
        }
        if self.match_types(&[Return]) {
            return self.return_statement();
        }
        if self.match_types(&[While]) {
            return self.while_statement();
        }
        if self.match_types(&[Break]) {
            let keyword = self.previous().clone();
            self.consume(Semicolon, "Expect ';' after 'break'.")?;
            return Ok(Stmt::AbortLoop { keyword });
        }
        if self.match_types(&[Continue]) {
            let keyword = self.previous().clone();
            self.consume(Semicolon, "Expect ';' after 'continue'.")?;
            return Ok(Stmt::AbortLoop { keyword });
        }
        if self.match_types(&[LeftBrace]) {
            return Ok(Stmt::Block(self.block()?));
        }
        self.expression_statement()
    }

    /// Desugars `for (init; cond; inc) body` into
    /// `Block { init?; While(cond, Block([body, inc?]), inc?) }`, preserving
    /// the `While.increment` slot so `continue` still runs `inc`
    /// (`spec.md` §3 invariant).
    fn for_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.match_types(&[Semicolon]) {
            None
        } else if self.match_types(&[Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(Semicolon) { self.expression()? } else { Expr::literal(Value::Boolean(true)) };
        self.consume(Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(RightParen) { Some(self.expression()?) } else { None };
        self.consume(RightParen, "Expect ')' after for clauses.")?;

        // `increment` lives on the `While` node itself rather than being
        // appended inside `body` as a block statement: the interpreter runs
        // it once per iteration after the body, including after `continue`,
        // which only works if it sits outside the body's own statement list
        // (`spec.md` §3 `While.increment` invariant).
        let body = self.statement()?;
        let mut body = Stmt::While { condition, body: Box::new(body), increment };

        if let Some(init) = initializer {
            body = Stmt::Block(vec![init, body]);
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch =
            if self.match_types(&[Else]) { Some(Box::new(self.statement()?)) } else { None };

        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    fn print_statement(&mut self) -> Result<Stmt, ParseError> {
        let value = self.expression()?;
        self.consume(Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print(value))
    }

    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.previous().clone();
        let value = if !self.check(Semicolon) { Some(self.expression()?) } else { None };
        self.consume(Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        self.consume(LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body, increment: None })
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        while !self.check(RightBrace) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }
        self.consume(RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression()?;
        self.consume(Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.or()?;

        if self.match_types(&[Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr.kind {
                crate::expr::ExprKind::Variable { name } => Ok(Expr::assign(name, value)),
                crate::expr::ExprKind::Get { object, name } => Ok(Expr::set(*object, name, value)),
                _ => {
                    self.error(equals, "Invalid assignment target.");
                    Err(ParseError)
                }
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.and()?;
        while self.match_types(&[Or]) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::logical(expr, operator, right);
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.equality()?;
        while self.match_types(&[And]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::logical(expr, operator, right);
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.comparison()?;
        while self.match_types(&[BangEqual, EqualEqual]) {
            let operator = self.previous().clone();
            let right = self.comparison()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.term()?;
        while self.match_types(&[Greater, GreaterEqual, Less, LessEqual]) {
            let operator = self.previous().clone();
            let right = self.term()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.factor()?;
        while self.match_types(&[Minus, Plus]) {
            let operator = self.previous().clone();
            let right = self.factor()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;
        while self.match_types(&[Slash, Star]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            expr = Expr::binary(expr, operator, right);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.match_types(&[Bang, Minus]) {
            let operator = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::unary(operator, right));
        }
        self.call()
    }

    fn call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            if self.match_types(&[LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.match_types(&[Dot]) {
                let name = self.consume(Identifier, "Expect property name after '.'.")?.clone();
                expr = Expr::get(expr, name);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let mut arguments = Vec::new();
        if !self.check(RightParen) {
            loop {
                if arguments.len() >= 255 {
                    self.error(self.peek().clone(), "Can't have more than 255 arguments.");
                }
                arguments.push(self.expression()?);
                if !self.match_types(&[Comma]) {
                    break;
                }
            }
        }
        let paren = self.consume(RightParen, "Expect ')' after arguments.")?.clone();
        Ok(Expr::call(callee, paren, arguments))
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        if self.match_types(&[False]) {
            return Ok(Expr::literal(Value::Boolean(false)));
        }
        if self.match_types(&[True]) {
            return Ok(Expr::literal(Value::Boolean(true)));
        }
        if self.match_types(&[Nil]) {
            return Ok(Expr::literal(Value::Nil));
        }
        if self.match_types(&[Number]) {
            return match self.previous().literal.clone() {
                Literal::Number(n) => Ok(Expr::literal(Value::Number(n))),
                _ => unreachable!("scanner always attaches a Number literal to a NUMBER token"),
            };
        }
        if self.match_types(&[TokenKind::String]) {
            return match self.previous().literal.clone() {
                Literal::String(s) => Ok(Expr::literal(Value::string(s))),
                _ => unreachable!("scanner always attaches a String literal to a STRING token"),
            };
        }
        if self.match_types(&[This]) {
            return Ok(Expr::this(self.previous().clone()));
        }
        if self.match_types(&[Super]) {
            let keyword = self.previous().clone();
            self.consume(Dot, "Expect '.' after 'super'.")?;
            let method = self.consume(Identifier, "Expect superclass method name.")?.clone();
            return Ok(Expr::super_(keyword, method));
        }
        if self.match_types(&[Identifier]) {
            return Ok(Expr::variable(self.previous().clone()));
        }
        if self.match_types(&[LeftParen]) {
            let expr = self.expression()?;
            self.consume(RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::grouping(expr));
        }

        Err(self.error(self.peek().clone(), "Expect expression."))
    }

    fn match_types(&mut self, kinds: &[TokenKind]) -> bool {
        for kind in kinds {
            if self.check(*kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<&Token, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.error(self.peek().clone(), message))
    }

    fn error(&self, token: Token, message: &str) -> ParseError {
        self.reporter.error_at(&token, message);
        ParseError
    }

    /// Discards tokens up to the next statement boundary so the parser can
    /// recover and report further errors in the same pass (`spec.md` §7).
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == Semicolon {
                return;
            }
            match self.peek().kind {
                Class | Fun | Var | For | If | While | Print | Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

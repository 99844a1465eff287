// ABOUTME: Recursive-descent parser turning the token stream into a Program

use crate::ast::{BinaryOp, Block, Expr, Literal, Program, Stmt, UnaryOp};
use crate::error::ParseError;
use crate::lexer::{Token, TokenKind};

pub struct Parser<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser { tokens, index: 0 }
    }

    pub fn parse(mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::Eof) {
            statements.push(self.statement()?);
        }
        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.match_keyword("obj") {
            return self.var_decl();
        }
        if self.match_keyword("function") {
            return self.function_decl();
        }
        if self.match_keyword("if") {
            return self.if_stmt();
        }
        if self.match_keyword("while") {
            return self.while_stmt();
        }
        if self.match_keyword("return") {
            return self.return_stmt();
        }
        if self.match_keyword("try") {
            return self.try_stmt();
        }
        if self.match_keyword("throw") {
            return self.throw_stmt();
        }
        if self.match_punct("{") {
            return Ok(Stmt::Block(self.block_stmt()?));
        }
        let expr = self.expression()?;
        self.consume_optional(";");
        let span = expr.span();
        Ok(Stmt::Expression { expr, span })
    }

    /// Parses the statements of a block whose `{` has already been consumed.
    fn block_stmt(&mut self) -> Result<Block, ParseError> {
        let span = self.previous().span;
        let mut statements = Vec::new();
        while !self.check_punct("}") && !self.check(TokenKind::Eof) {
            statements.push(self.statement()?);
        }
        self.consume_punct("}")?;
        Ok(Block { statements, span })
    }

    fn var_decl(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume_ident("Expected variable name after 'obj'")?;
        let mut initializer = None;
        if self.match_op("=") {
            initializer = Some(self.expression()?);
        }
        self.consume_optional(";");
        Ok(Stmt::VarDecl {
            name: name.lexeme,
            initializer,
            span: name.span,
        })
    }

    fn function_decl(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume_ident("Expected function name")?;
        let expr = self.function_expr(Some(name.lexeme.clone()))?;
        self.consume_optional(";");
        Ok(Stmt::VarDecl {
            name: name.lexeme,
            initializer: Some(expr),
            span: name.span,
        })
    }

    fn if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let condition = self.expression()?;
        self.consume_punct("{")?;
        let then_branch = self.block_stmt()?;
        let mut else_branch = None;
        if self.match_keyword("else") {
            if self.match_keyword("if") {
                else_branch = Some(Box::new(self.if_stmt()?));
            } else if self.match_punct("{") {
                else_branch = Some(Box::new(Stmt::Block(self.block_stmt()?)));
            } else {
                return Err(ParseError::new(
                    "Expected 'if' or block after else",
                    self.peek().span,
                ));
            }
        }
        let span = condition.span();
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            span,
        })
    }

    fn while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let condition = self.expression()?;
        self.consume_punct("{")?;
        let body = self.block_stmt()?;
        let span = condition.span();
        Ok(Stmt::While {
            condition,
            body,
            span,
        })
    }

    fn return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let keyword_span = self.previous().span;
        let value = if self.check_punct(";") || self.check_punct("}") || self.check(TokenKind::Eof)
        {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume_optional(";");
        let span = value.as_ref().map_or(keyword_span, Expr::span);
        Ok(Stmt::Return { value, span })
    }

    fn try_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.previous().span;
        self.consume_punct("{")?;
        let try_block = self.block_stmt()?;
        let mut catch_name = None;
        let mut catch_block = None;
        let mut finally_block = None;
        if self.match_keyword("catch") {
            let name = self.consume_ident("Expected name after catch")?;
            catch_name = Some(name.lexeme);
            self.consume_punct("{")?;
            catch_block = Some(self.block_stmt()?);
        }
        if self.match_keyword("finally") {
            self.consume_punct("{")?;
            finally_block = Some(self.block_stmt()?);
        }
        if catch_block.is_none() && finally_block.is_none() {
            return Err(ParseError::new("try must have catch or finally", span));
        }
        Ok(Stmt::Try {
            try_block,
            catch_name,
            catch_block,
            finally_block,
            span,
        })
    }

    fn throw_stmt(&mut self) -> Result<Stmt, ParseError> {
        let value = self.expression()?;
        self.consume_optional(";");
        let span = value.span();
        Ok(Stmt::Throw { value, span })
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.or()?;
        if self.match_op("=") {
            let value = self.assignment()?;
            let span = expr.span();
            return Ok(Expr::Assign {
                target: Box::new(expr),
                value: Box::new(value),
                span,
            });
        }
        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.and()?;
        while self.match_op("||") {
            let right = self.and()?;
            expr = binary(expr, BinaryOp::Or, right);
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.equality()?;
        while self.match_op("&&") {
            let right = self.equality()?;
            expr = binary(expr, BinaryOp::And, right);
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.comparison()?;
        while let Some(op) = self.match_binary_op(&[("==", BinaryOp::Eq), ("!=", BinaryOp::Ne)]) {
            let right = self.comparison()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.term()?;
        while let Some(op) = self.match_binary_op(&[
            ("<", BinaryOp::Lt),
            ("<=", BinaryOp::Le),
            (">", BinaryOp::Gt),
            (">=", BinaryOp::Ge),
        ]) {
            let right = self.term()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.factor()?;
        while let Some(op) = self.match_binary_op(&[("+", BinaryOp::Add), ("-", BinaryOp::Sub)]) {
            let right = self.factor()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;
        while let Some(op) = self.match_binary_op(&[
            ("*", BinaryOp::Mul),
            ("/", BinaryOp::Div),
            ("%", BinaryOp::Rem),
        ]) {
            let right = self.unary()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = if self.match_op("!") {
            Some(UnaryOp::Not)
        } else if self.match_op("-") {
            Some(UnaryOp::Neg)
        } else {
            None
        };
        if let Some(op) = op {
            let right = self.unary()?;
            let span = right.span();
            return Ok(Expr::Unary {
                op,
                right: Box::new(right),
                span,
            });
        }
        self.call()
    }

    fn call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            if self.match_punct("(") {
                let mut args = Vec::new();
                if !self.check_punct(")") {
                    args.push(self.expression()?);
                    while self.match_punct(",") {
                        args.push(self.expression()?);
                    }
                }
                let paren = self.consume_punct(")")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    span: paren.span,
                };
            } else if self.match_op(".") {
                let name = self.consume_ident("Expected property name after '.'")?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    name: name.lexeme,
                    span: name.span,
                };
            } else if self.match_punct("[") {
                let index = self.expression()?;
                self.consume_punct("]")?;
                let span = index.span();
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                    span,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        if self.match_kind(TokenKind::Number) {
            let token = self.previous().clone();
            let value = number_literal(&token)?;
            return Ok(Expr::Literal {
                value,
                span: token.span,
            });
        }
        if self.match_kind(TokenKind::Str) {
            let token = self.previous().clone();
            return Ok(Expr::Literal {
                value: Literal::Str(token.lexeme),
                span: token.span,
            });
        }
        if self.match_keyword("true") {
            return Ok(Expr::Literal {
                value: Literal::Bool(true),
                span: self.previous().span,
            });
        }
        if self.match_keyword("false") {
            return Ok(Expr::Literal {
                value: Literal::Bool(false),
                span: self.previous().span,
            });
        }
        if self.match_keyword("null") {
            return Ok(Expr::Literal {
                value: Literal::Null,
                span: self.previous().span,
            });
        }
        if self.match_punct("[") {
            let mut items = Vec::new();
            if !self.check_punct("]") {
                items.push(self.expression()?);
                while self.match_punct(",") {
                    items.push(self.expression()?);
                }
            }
            let end = self.consume_punct("]")?;
            return Ok(Expr::Array {
                items,
                span: end.span,
            });
        }
        if self.match_punct("{") {
            let mut pairs = Vec::new();
            if !self.check_punct("}") {
                loop {
                    let key = self.consume_ident("Expected identifier key in object literal")?;
                    self.consume_punct(":")?;
                    let value = self.expression()?;
                    pairs.push((key.lexeme, value));
                    if !self.match_punct(",") {
                        break;
                    }
                }
            }
            let end = self.consume_punct("}")?;
            return Ok(Expr::Object {
                pairs,
                span: end.span,
            });
        }
        if self.match_keyword("function") {
            return self.function_expr(None);
        }
        if self.match_kind(TokenKind::Ident) {
            let token = self.previous().clone();
            return Ok(Expr::Identifier {
                name: token.lexeme,
                span: token.span,
            });
        }
        if self.match_punct("(") {
            let expr = self.expression()?;
            self.consume_punct(")")?;
            return Ok(expr);
        }
        let token = self.peek();
        Err(ParseError::new(
            format!("Unexpected token {:?} '{}'", token.kind, token.lexeme),
            token.span,
        ))
    }

    fn function_expr(&mut self, name: Option<String>) -> Result<Expr, ParseError> {
        self.consume_punct("(")?;
        let mut params = Vec::new();
        if !self.check_punct(")") {
            params.push(self.consume_ident("Expected parameter name")?.lexeme);
            while self.match_punct(",") {
                params.push(self.consume_ident("Expected parameter name")?.lexeme);
            }
        }
        self.consume_punct(")")?;
        self.consume_punct("{")?;
        let body = self.block_stmt()?;
        Ok(Expr::Function {
            name,
            params,
            body: body.statements,
            span: body.span,
        })
    }

    fn consume_optional(&mut self, punct: &str) {
        if self.check_punct(punct) {
            self.advance();
        }
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    fn match_keyword(&mut self, keyword: &str) -> bool {
        if self.check(TokenKind::Keyword) && self.peek().lexeme == keyword {
            self.advance();
            return true;
        }
        false
    }

    fn match_op(&mut self, op: &str) -> bool {
        if self.check(TokenKind::Op) && self.peek().lexeme == op {
            self.advance();
            return true;
        }
        false
    }

    fn match_binary_op(&mut self, table: &[(&str, BinaryOp)]) -> Option<BinaryOp> {
        if self.check(TokenKind::Op) {
            let lexeme = self.peek().lexeme.as_str();
            for (symbol, op) in table {
                if lexeme == *symbol {
                    self.advance();
                    return Some(*op);
                }
            }
        }
        None
    }

    fn match_punct(&mut self, punct: &str) -> bool {
        if self.check_punct(punct) {
            self.advance();
            return true;
        }
        false
    }

    fn consume_ident(&mut self, message: &str) -> Result<Token, ParseError> {
        if self.check(TokenKind::Ident) {
            return Ok(self.advance().clone());
        }
        Err(ParseError::new(message, self.peek().span))
    }

    fn consume_punct(&mut self, punct: &str) -> Result<Token, ParseError> {
        if self.check_punct(punct) {
            return Ok(self.advance().clone());
        }
        Err(ParseError::new(
            format!("Expected '{punct}'"),
            self.peek().span,
        ))
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_punct(&self, punct: &str) -> bool {
        self.check(TokenKind::Punct) && self.peek().lexeme == punct
    }

    fn advance(&mut self) -> &Token {
        let token = &self.tokens[self.index];
        if token.kind != TokenKind::Eof {
            self.index += 1;
        }
        token
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.index]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.index - 1]
    }
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    let span = left.span();
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
        span,
    }
}

fn number_literal(token: &Token) -> Result<Literal, ParseError> {
    if token.lexeme.contains('.') {
        token
            .lexeme
            .parse::<f64>()
            .map(Literal::Float)
            .map_err(|_| invalid_number(token))
    } else {
        token
            .lexeme
            .parse::<i64>()
            .map(Literal::Int)
            .map_err(|_| invalid_number(token))
    }
}

fn invalid_number(token: &Token) -> ParseError {
    ParseError::new(
        format!("Invalid number literal '{}'", token.lexeme),
        token.span,
    )
}

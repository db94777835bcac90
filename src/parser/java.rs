//! Parser for the curly-brace OOP surface: explicit types, access modifiers,
//! brace-delimited blocks, enhanced `for`.
//!
//! Whether a declaration head starts a method or a field is decided by a
//! non-consuming scan over the unconsumed token tail; the cursor itself is
//! never moved and restored.

use crate::{
    ast::{
        AssignOp, BinOp, ClassDef, Expr, ExprKind, FunctionDef, IfStmt, Literal, Param, Program,
        Stmt, StmtKind, UnOp, VariableDecl,
    },
    error::ParseError,
    parser::{binary, comparison_op, TokenCursor},
    token::{Token, TokenKind, TokenValue},
};

const MODIFIERS: &[&str] = &["public", "private", "protected", "static"];

/// Keywords that can open a declaration at statement level.
const DECL_KEYWORDS: &[&str] = &[
    "public", "private", "protected", "static", "void", "int", "double", "float", "boolean",
    "char", "long", "short", "byte",
];

pub(crate) struct Parser<'t> {
    cur: TokenCursor<'t>,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(tokens: &'t [Token]) -> Parser<'t> {
        Parser {
            cur: TokenCursor::new(tokens),
        }
    }

    pub(crate) fn parse(mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !self.cur.at_eof() {
            if let Some(stmt) = self.statement()? {
                statements.push(stmt);
            }
            self.cur.skip_semicolons();
        }
        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Option<Stmt>, ParseError> {
        if self.cur.at_eof() {
            return Ok(None);
        }
        let (line, column) = self.cur.loc();

        if self.cur.is_keyword("class") || self.looks_like_class() {
            let class = self.class_def()?;
            return Ok(Some(Stmt::new(StmtKind::ClassDef(class), line, column)));
        }

        if self.cur.is(TokenKind::Keyword) && DECL_KEYWORDS.contains(&self.cur.peek().text()) {
            if self.looks_like_method() {
                let method = self.method_def()?;
                return Ok(Some(Stmt::new(StmtKind::FunctionDef(method), line, column)));
            }
            let decl = self.variable_decl()?;
            return Ok(Some(Stmt::new(StmtKind::VariableDecl(decl), line, column)));
        }

        if self.cur.is_keyword("if") {
            let stmt = self.if_statement()?;
            return Ok(Some(Stmt::new(StmtKind::If(stmt), line, column)));
        }
        if self.cur.is_keyword("while") {
            self.cur.advance();
            self.cur.consume(TokenKind::LParen)?;
            let condition = self.expression()?;
            self.cur.consume(TokenKind::RParen)?;
            let body = self.braced_or_single()?;
            return Ok(Some(Stmt::new(
                StmtKind::While { condition, body },
                line,
                column,
            )));
        }
        if self.cur.is_keyword("for") {
            return self.for_loop().map(Some);
        }
        if self.cur.is_keyword("return") {
            return self.return_statement().map(Some);
        }
        if self.cur.take_keyword("break") {
            self.cur.take(TokenKind::Semicolon);
            return Ok(Some(Stmt::new(StmtKind::Break, line, column)));
        }

        if self.cur.is(TokenKind::Identifier) {
            let next = self.cur.peek_at(1).map(|t| t.kind);
            if next == Some(TokenKind::Identifier) {
                // Type name followed by variable name.
                let decl = self.variable_decl()?;
                return Ok(Some(Stmt::new(StmtKind::VariableDecl(decl), line, column)));
            }
            if matches!(
                next,
                Some(TokenKind::Assign | TokenKind::PlusAssign | TokenKind::MinusAssign)
            ) {
                return self.assignment().map(Some);
            }
            let expr = self.expression()?;
            self.cur.take(TokenKind::Semicolon);
            return Ok(Some(Stmt::new(StmtKind::Expression(expr), line, column)));
        }

        // Anything unrecognized at statement level is skipped.
        self.cur.advance();
        Ok(None)
    }

    /// True when the tokens ahead read `modifier* type name (`.
    fn looks_like_method(&self) -> bool {
        let rest = self.cur.rest();
        let mut i = 0;
        while rest
            .get(i)
            .is_some_and(|t| MODIFIERS.iter().any(|m| t.is_keyword(m)))
        {
            i += 1;
        }
        if rest.get(i).is_some_and(|t| t.kind == TokenKind::Keyword) {
            i += 1;
            if rest.get(i).is_some_and(|t| t.kind == TokenKind::Identifier) {
                i += 1;
                return rest.get(i).is_some_and(|t| t.kind == TokenKind::LParen);
            }
        }
        false
    }

    /// True when the tokens ahead read `modifier* class`.
    fn looks_like_class(&self) -> bool {
        let rest = self.cur.rest();
        let mut i = 0;
        while rest
            .get(i)
            .is_some_and(|t| MODIFIERS.iter().any(|m| t.is_keyword(m)))
        {
            i += 1;
        }
        rest.get(i).is_some_and(|t| t.is_keyword("class"))
    }

    fn method_def(&mut self) -> Result<FunctionDef, ParseError> {
        let mut access = None;
        while self.cur.is(TokenKind::Keyword) && MODIFIERS.contains(&self.cur.peek().text()) {
            let word = self.cur.advance().text();
            if word != "static" && access.is_none() {
                access = Some(word.to_string());
            }
        }

        let mut return_type = None;
        if self.cur.is(TokenKind::Keyword) {
            return_type = Some(self.cur.advance().text().to_string());
        }

        let name = self.cur.consume(TokenKind::Identifier)?.text().to_string();
        self.cur.consume(TokenKind::LParen)?;
        let parameters = self.typed_parameters()?;
        self.cur.consume(TokenKind::RParen)?;

        self.cur.consume(TokenKind::LBrace)?;
        let body = self.block_statements()?;
        self.cur.consume(TokenKind::RBrace)?;

        Ok(FunctionDef {
            name,
            parameters,
            return_type,
            body,
            access,
        })
    }

    fn typed_parameters(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut parameters = Vec::new();
        while !self.cur.is(TokenKind::RParen) && !self.cur.at_eof() {
            if !matches!(
                self.cur.peek().kind,
                TokenKind::Keyword | TokenKind::Identifier
            ) {
                break;
            }
            let ty = self.cur.advance().text().to_string();
            let name = self.cur.consume(TokenKind::Identifier)?.text().to_string();
            parameters.push(Param { name, ty: Some(ty) });
            if !self.cur.take(TokenKind::Comma) {
                break;
            }
        }
        Ok(parameters)
    }

    fn block_statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        while !self.cur.is(TokenKind::RBrace) && !self.cur.at_eof() {
            if let Some(stmt) = self.statement()? {
                statements.push(stmt);
            }
        }
        Ok(statements)
    }

    fn braced_or_single(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if self.cur.take(TokenKind::LBrace) {
            let body = self.block_statements()?;
            self.cur.consume(TokenKind::RBrace)?;
            return Ok(body);
        }
        Ok(self.statement()?.into_iter().collect())
    }

    fn class_def(&mut self) -> Result<ClassDef, ParseError> {
        while self.cur.is(TokenKind::Keyword) && MODIFIERS.contains(&self.cur.peek().text()) {
            self.cur.advance();
        }
        self.cur.consume_keyword("class")?;
        let name = self.cur.consume(TokenKind::Identifier)?.text().to_string();

        let mut bases = Vec::new();
        if self.cur.take_keyword("extends") {
            bases.push(self.cur.consume(TokenKind::Identifier)?.text().to_string());
        }
        if self.cur.take_keyword("implements") {
            while self.cur.is(TokenKind::Identifier) {
                bases.push(self.cur.advance().text().to_string());
                if !self.cur.take(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.cur.consume(TokenKind::LBrace)?;
        let mut methods = Vec::new();
        let mut fields = Vec::new();
        while !self.cur.is(TokenKind::RBrace) && !self.cur.at_eof() {
            if self.looks_like_method() {
                methods.push(self.method_def()?);
            } else if let Some(stmt) = self.statement()? {
                if let StmtKind::VariableDecl(decl) = stmt.kind {
                    fields.push(decl);
                }
            }
        }
        self.cur.consume(TokenKind::RBrace)?;

        Ok(ClassDef {
            name,
            bases,
            fields,
            methods,
        })
    }

    fn variable_decl(&mut self) -> Result<VariableDecl, ParseError> {
        let mut ty = None;
        while self.cur.is(TokenKind::Keyword) && MODIFIERS.contains(&self.cur.peek().text()) {
            self.cur.advance();
        }
        if matches!(
            self.cur.peek().kind,
            TokenKind::Keyword | TokenKind::Identifier
        ) {
            ty = Some(self.cur.advance().text().to_string());
        }
        let name = self.cur.consume(TokenKind::Identifier)?.text().to_string();
        let mut init = None;
        if self.cur.take(TokenKind::Assign) {
            init = Some(self.expression()?);
        }
        self.cur.take(TokenKind::Semicolon);
        Ok(VariableDecl { name, ty, init })
    }

    fn if_statement(&mut self) -> Result<IfStmt, ParseError> {
        self.cur.consume_keyword("if")?;
        self.cur.consume(TokenKind::LParen)?;
        let condition = self.expression()?;
        self.cur.consume(TokenKind::RParen)?;
        let then_block = self.braced_or_single()?;

        // An `else if` nests as a single-statement else block.
        let mut else_block = Vec::new();
        if self.cur.take_keyword("else") {
            else_block = self.braced_or_single()?;
        }

        Ok(IfStmt {
            condition,
            then_block,
            elif_blocks: Vec::new(),
            else_block,
        })
    }

    fn for_loop(&mut self) -> Result<Stmt, ParseError> {
        let (line, column) = self.cur.loc();
        self.cur.consume_keyword("for")?;
        self.cur.consume(TokenKind::LParen)?;

        let mut variable = String::new();
        let mut iterable = None;
        let is_enhanced = matches!(
            self.cur.peek().kind,
            TokenKind::Keyword | TokenKind::Identifier
        ) && self.cur.peek_at(1).is_some_and(|t| t.kind == TokenKind::Identifier);
        if is_enhanced {
            self.cur.advance(); // element type
            variable = self.cur.consume(TokenKind::Identifier)?.text().to_string();
            if self.cur.take(TokenKind::Colon) {
                iterable = Some(self.expression()?);
            }
        } else {
            // Three-clause headers are recognized but not represented.
            while !self.cur.is(TokenKind::RParen) && !self.cur.at_eof() {
                self.cur.advance();
            }
        }
        self.cur.consume(TokenKind::RParen)?;
        let body = self.braced_or_single()?;

        Ok(Stmt::new(
            StmtKind::For {
                variable,
                iterable,
                body,
            },
            line,
            column,
        ))
    }

    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        let (line, column) = self.cur.loc();
        self.cur.consume_keyword("return")?;
        let value = if self.cur.is(TokenKind::Semicolon) || self.cur.at_eof() {
            None
        } else {
            Some(self.expression()?)
        };
        self.cur.take(TokenKind::Semicolon);
        Ok(Stmt::new(StmtKind::Return(value), line, column))
    }

    fn assignment(&mut self) -> Result<Stmt, ParseError> {
        let (line, column) = self.cur.loc();
        let target = self.cur.consume(TokenKind::Identifier)?.text().to_string();
        let op = if self.cur.take(TokenKind::PlusAssign) {
            AssignOp::AddAssign
        } else if self.cur.take(TokenKind::MinusAssign) {
            AssignOp::SubAssign
        } else {
            self.cur.consume(TokenKind::Assign)?;
            AssignOp::Assign
        };
        let value = self.expression()?;
        self.cur.take(TokenKind::Semicolon);
        Ok(Stmt::new(
            StmtKind::Assignment { target, op, value },
            line,
            column,
        ))
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.logical_or()
    }

    fn logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.logical_and()?;
        while self.cur.take(TokenKind::OrOr) {
            let right = self.logical_and()?;
            left = binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.comparison()?;
        while self.cur.take(TokenKind::AndAnd) {
            let right = self.comparison()?;
            left = binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.additive()?;
        while let Some(op) = comparison_op(self.cur.peek().kind) {
            self.cur.advance();
            let right = self.additive()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.cur.peek().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.cur.advance();
            let right = self.multiplicative()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.cur.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.cur.advance();
            let right = self.unary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let (line, column) = self.cur.loc();
        let op = if self.cur.take(TokenKind::Minus) {
            Some(UnOp::Neg)
        } else if self.cur.take(TokenKind::Plus) {
            Some(UnOp::Pos)
        } else if self.cur.take(TokenKind::Bang) {
            Some(UnOp::Not)
        } else {
            None
        };
        if let Some(op) = op {
            let operand = self.unary()?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                line,
                column,
            ));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            if self.cur.take(TokenKind::LParen) {
                let args = self.arguments()?;
                self.cur.consume(TokenKind::RParen)?;
                let (line, column) = (expr.line, expr.column);
                expr = match expr.kind {
                    ExprKind::Identifier(callee) => {
                        Expr::new(ExprKind::Call { callee, args }, line, column)
                    }
                    kind => Expr::new(
                        ExprKind::Invoke {
                            target: Box::new(Expr::new(kind, line, column)),
                            args,
                        },
                        line,
                        column,
                    ),
                };
            } else if self.cur.take(TokenKind::LBracket) {
                let index = self.expression()?;
                self.cur.consume(TokenKind::RBracket)?;
                let (line, column) = (expr.line, expr.column);
                expr = Expr::new(
                    ExprKind::Index {
                        receiver: Box::new(expr),
                        index: Box::new(index),
                    },
                    line,
                    column,
                );
            } else if self.cur.take(TokenKind::Dot) {
                let name = self.cur.consume(TokenKind::Identifier)?.text().to_string();
                let (line, column) = (expr.line, expr.column);
                if self.cur.take(TokenKind::LParen) {
                    let args = self.arguments()?;
                    self.cur.consume(TokenKind::RParen)?;
                    expr = Expr::new(
                        ExprKind::MethodCall {
                            receiver: Box::new(expr),
                            method: name,
                            args,
                        },
                        line,
                        column,
                    );
                } else {
                    expr = Expr::new(
                        ExprKind::Member {
                            receiver: Box::new(expr),
                            name,
                        },
                        line,
                        column,
                    );
                }
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        while !self.cur.is(TokenKind::RParen) && !self.cur.at_eof() {
            args.push(self.expression()?);
            if !self.cur.take(TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.cur.peek();
        let (line, column) = (tok.line, tok.column);

        match tok.kind {
            TokenKind::Int => {
                let value = match &tok.value {
                    TokenValue::Int(v) => *v,
                    _ => 0,
                };
                self.cur.advance();
                Ok(Expr::new(ExprKind::Literal(Literal::Int(value)), line, column))
            }
            TokenKind::Float => {
                let value = match &tok.value {
                    TokenValue::Float(v) => *v,
                    _ => 0.0,
                };
                self.cur.advance();
                Ok(Expr::new(
                    ExprKind::Literal(Literal::Float(value)),
                    line,
                    column,
                ))
            }
            TokenKind::Str => {
                let value = tok.text().to_string();
                self.cur.advance();
                Ok(Expr::new(ExprKind::Literal(Literal::Str(value)), line, column))
            }
            TokenKind::Keyword if tok.text() == "true" || tok.text() == "false" => {
                let value = tok.text() == "true";
                self.cur.advance();
                Ok(Expr::new(
                    ExprKind::Literal(Literal::Bool(value)),
                    line,
                    column,
                ))
            }
            TokenKind::Keyword if tok.text() == "null" => {
                self.cur.advance();
                Ok(Expr::new(ExprKind::Literal(Literal::Null), line, column))
            }
            TokenKind::Keyword if tok.text() == "this" => {
                self.cur.advance();
                Ok(Expr::new(
                    ExprKind::Identifier("this".to_string()),
                    line,
                    column,
                ))
            }
            TokenKind::Identifier => {
                let name = tok.text().to_string();
                self.cur.advance();
                Ok(Expr::new(ExprKind::Identifier(name), line, column))
            }
            TokenKind::LParen => {
                self.cur.advance();
                let expr = self.expression()?;
                self.cur.consume(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(self.cur.unexpected()),
        }
    }
}

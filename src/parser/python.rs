//! Parser for the indentation-based surface. Blocks are delimited by
//! INDENT/DEDENT tokens; interpolated strings arrive pre-decomposed from the
//! lexer and desugar here into `str(...)` concatenations.

use crate::{
    ast::{
        AssignOp, BinOp, ClassDef, Expr, ExprKind, FunctionDef, IfStmt, Literal, Param, Program,
        Stmt, StmtKind, UnOp,
    },
    error::ParseError,
    parser::{binary, comparison_op, TokenCursor},
    token::{InterpPart, Token, TokenKind, TokenValue},
};

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
        self.cur.skip_newlines();
        while !self.cur.at_eof() {
            if let Some(stmt) = self.statement()? {
                statements.push(stmt);
            }
            self.cur.skip_newlines();
        }
        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Option<Stmt>, ParseError> {
        self.cur.skip_newlines();
        if self.cur.at_eof() || self.cur.is(TokenKind::Dedent) {
            return Ok(None);
        }
        let (line, column) = self.cur.loc();

        if self.cur.is_keyword("def") {
            let func = self.function_def()?;
            return Ok(Some(Stmt::new(StmtKind::FunctionDef(func), line, column)));
        }
        if self.cur.is_keyword("class") {
            let class = self.class_def()?;
            return Ok(Some(Stmt::new(StmtKind::ClassDef(class), line, column)));
        }
        if self.cur.is_keyword("if") {
            let stmt = self.if_statement()?;
            return Ok(Some(Stmt::new(StmtKind::If(stmt), line, column)));
        }
        if self.cur.is_keyword("while") {
            self.cur.advance();
            let condition = self.expression()?;
            self.cur.consume(TokenKind::Colon)?;
            self.cur.skip_newlines();
            let body = self.block()?;
            return Ok(Some(Stmt::new(
                StmtKind::While { condition, body },
                line,
                column,
            )));
        }
        if self.cur.is_keyword("for") {
            return self.for_loop().map(Some);
        }
        if self.cur.take_keyword("break") {
            return Ok(Some(Stmt::new(StmtKind::Break, line, column)));
        }
        if self.cur.is_keyword("return") {
            return self.return_statement().map(Some);
        }

        if self.cur.is(TokenKind::Identifier) {
            let next = self.cur.peek_at(1).map(|t| t.kind);
            if matches!(
                next,
                Some(TokenKind::Assign | TokenKind::PlusAssign | TokenKind::MinusAssign)
            ) {
                return self.assignment().map(Some);
            }
        }
        if matches!(
            self.cur.peek().kind,
            TokenKind::Identifier
                | TokenKind::Int
                | TokenKind::Float
                | TokenKind::Str
                | TokenKind::InterpStr
                | TokenKind::LBracket
                | TokenKind::LParen
                | TokenKind::Minus
        ) || self.cur.is_keyword("not")
            || self.cur.is_keyword("True")
            || self.cur.is_keyword("False")
            || self.cur.is_keyword("None")
        {
            let expr = self.expression()?;
            return Ok(Some(Stmt::new(StmtKind::Expression(expr), line, column)));
        }

        // Anything unrecognized at statement level is skipped.
        self.cur.advance();
        Ok(None)
    }

    fn function_def(&mut self) -> Result<FunctionDef, ParseError> {
        self.cur.consume_keyword("def")?;
        let name = self.cur.consume(TokenKind::Identifier)?.text().to_string();
        self.cur.consume(TokenKind::LParen)?;
        let parameters = self.parameters()?;
        self.cur.consume(TokenKind::RParen)?;

        let mut return_type = None;
        if self.cur.take(TokenKind::Arrow) && self.cur.is(TokenKind::Identifier) {
            return_type = Some(self.cur.advance().text().to_string());
        }

        self.cur.consume(TokenKind::Colon)?;
        self.cur.skip_newlines();
        let body = self.block()?;

        Ok(FunctionDef {
            name,
            parameters,
            return_type,
            body,
            access: None,
        })
    }

    fn parameters(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut parameters = Vec::new();
        while !self.cur.is(TokenKind::RParen) && !self.cur.at_eof() {
            if self.cur.is(TokenKind::Identifier) {
                let name = self.cur.advance().text().to_string();
                let mut ty = None;
                if self.cur.take(TokenKind::Colon) && self.cur.is(TokenKind::Identifier) {
                    ty = Some(self.cur.advance().text().to_string());
                }
                parameters.push(Param { name, ty });
            }
            if !self.cur.take(TokenKind::Comma) {
                break;
            }
        }
        Ok(parameters)
    }

    /// An indented block, or a single inline statement when no INDENT
    /// follows.
    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        if !self.cur.take(TokenKind::Indent) {
            if let Some(stmt) = self.statement()? {
                statements.push(stmt);
            }
            return Ok(statements);
        }
        while !self.cur.is(TokenKind::Dedent) && !self.cur.at_eof() {
            if let Some(stmt) = self.statement()? {
                statements.push(stmt);
            }
            self.cur.skip_newlines();
        }
        self.cur.take(TokenKind::Dedent);
        Ok(statements)
    }

    fn class_def(&mut self) -> Result<ClassDef, ParseError> {
        self.cur.consume_keyword("class")?;
        let name = self.cur.consume(TokenKind::Identifier)?.text().to_string();

        let mut bases = Vec::new();
        if self.cur.take(TokenKind::LParen) {
            while !self.cur.is(TokenKind::RParen) && !self.cur.at_eof() {
                if self.cur.is(TokenKind::Identifier) {
                    bases.push(self.cur.advance().text().to_string());
                }
                if !self.cur.take(TokenKind::Comma) {
                    break;
                }
            }
            self.cur.consume(TokenKind::RParen)?;
        }

        self.cur.consume(TokenKind::Colon)?;
        self.cur.skip_newlines();

        let mut methods = Vec::new();
        if self.cur.take(TokenKind::Indent) {
            while !self.cur.is(TokenKind::Dedent) && !self.cur.at_eof() {
                if self.cur.is_keyword("def") {
                    methods.push(self.function_def()?);
                } else {
                    // Class-level statements other than methods are dropped.
                    self.statement()?;
                }
                self.cur.skip_newlines();
            }
            self.cur.take(TokenKind::Dedent);
        }

        Ok(ClassDef {
            name,
            bases,
            fields: Vec::new(),
            methods,
        })
    }

    fn if_statement(&mut self) -> Result<IfStmt, ParseError> {
        self.cur.consume_keyword("if")?;
        let condition = self.expression()?;
        self.cur.consume(TokenKind::Colon)?;
        self.cur.skip_newlines();
        let then_block = self.block()?;

        let mut elif_blocks = Vec::new();
        while self.cur.take_keyword("elif") {
            let elif_condition = self.expression()?;
            self.cur.consume(TokenKind::Colon)?;
            self.cur.skip_newlines();
            let elif_body = self.block()?;
            elif_blocks.push((elif_condition, elif_body));
        }

        let mut else_block = Vec::new();
        if self.cur.take_keyword("else") {
            self.cur.consume(TokenKind::Colon)?;
            self.cur.skip_newlines();
            else_block = self.block()?;
        }

        Ok(IfStmt {
            condition,
            then_block,
            elif_blocks,
            else_block,
        })
    }

    fn for_loop(&mut self) -> Result<Stmt, ParseError> {
        let (line, column) = self.cur.loc();
        self.cur.consume_keyword("for")?;
        let variable = self.cur.consume(TokenKind::Identifier)?.text().to_string();
        self.cur.consume_keyword("in")?;
        let iterable = self.expression()?;
        self.cur.consume(TokenKind::Colon)?;
        self.cur.skip_newlines();
        let body = self.block()?;
        Ok(Stmt::new(
            StmtKind::For {
                variable,
                iterable: Some(iterable),
                body,
            },
            line,
            column,
        ))
    }

    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        let (line, column) = self.cur.loc();
        self.cur.consume_keyword("return")?;
        let value = if matches!(
            self.cur.peek().kind,
            TokenKind::Newline | TokenKind::Eof | TokenKind::Dedent
        ) {
            None
        } else {
            Some(self.expression()?)
        };
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
        Ok(Stmt::new(
            StmtKind::Assignment { target, op, value },
            line,
            column,
        ))
    }

    pub(crate) fn expression(&mut self) -> Result<Expr, ParseError> {
        self.logical_or()
    }

    fn logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.logical_and()?;
        while self.cur.take_keyword("or") {
            let right = self.logical_and()?;
            left = binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.comparison()?;
        while self.cur.take_keyword("and") {
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
        let mut left = self.power()?;
        loop {
            let op = match self.cur.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                TokenKind::FloorDiv => BinOp::FloorDiv,
                _ => break,
            };
            self.cur.advance();
            let right = self.power()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    // Right associative.
    fn power(&mut self) -> Result<Expr, ParseError> {
        let left = self.unary()?;
        if self.cur.take(TokenKind::Power) {
            let right = self.power()?;
            return Ok(binary(BinOp::Pow, left, right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let (line, column) = self.cur.loc();
        let op = if self.cur.take(TokenKind::Minus) {
            Some(UnOp::Neg)
        } else if self.cur.take(TokenKind::Plus) {
            Some(UnOp::Pos)
        } else if self.cur.take_keyword("not") {
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
            if self.cur.take(TokenKind::Dot) {
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
            } else if self.cur.take(TokenKind::LParen) {
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
            TokenKind::InterpStr => {
                let parts = match &tok.value {
                    TokenValue::Interp(parts) => parts.clone(),
                    _ => Vec::new(),
                };
                self.cur.advance();
                self.interpolation(parts, line, column)
            }
            TokenKind::Keyword if tok.text() == "True" || tok.text() == "False" => {
                let value = tok.text() == "True";
                self.cur.advance();
                Ok(Expr::new(
                    ExprKind::Literal(Literal::Bool(value)),
                    line,
                    column,
                ))
            }
            TokenKind::Keyword if tok.text() == "None" => {
                self.cur.advance();
                Ok(Expr::new(ExprKind::Literal(Literal::Null), line, column))
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
            TokenKind::LBracket => {
                self.cur.advance();
                let mut elements = Vec::new();
                while !self.cur.is(TokenKind::RBracket) && !self.cur.at_eof() {
                    elements.push(self.expression()?);
                    if !self.cur.take(TokenKind::Comma) {
                        break;
                    }
                }
                self.cur.consume(TokenKind::RBracket)?;
                // List literals travel as a synthetic call.
                Ok(Expr::new(
                    ExprKind::Call {
                        callee: "list".into(),
                        args: elements,
                    },
                    line,
                    column,
                ))
            }
            _ => Err(self.cur.unexpected()),
        }
    }

    /// Desugars an interpolated string into a `+`-fold of literal pieces and
    /// `str(expr)` wrappers. A lone literal piece stays a plain literal.
    fn interpolation(
        &mut self,
        parts: Vec<InterpPart>,
        line: u32,
        column: u32,
    ) -> Result<Expr, ParseError> {
        let mut result: Option<Expr> = None;
        for part in parts {
            let node = match part {
                InterpPart::Literal(text) => {
                    Expr::new(ExprKind::Literal(Literal::Str(text)), line, column)
                }
                InterpPart::Expr(tokens) if tokens.is_empty() => {
                    Expr::new(ExprKind::Literal(Literal::Str(String::new())), line, column)
                }
                InterpPart::Expr(mut tokens) => {
                    tokens.push(Token::eof(line, column));
                    let mut sub = Parser::new(&tokens);
                    let inner = sub.expression()?;
                    Expr::new(
                        ExprKind::Call {
                            callee: "str".into(),
                            args: vec![inner],
                        },
                        line,
                        column,
                    )
                }
            };
            result = Some(match result {
                None => node,
                Some(acc) => binary(BinOp::Add, acc, node),
            });
        }
        Ok(result
            .unwrap_or_else(|| Expr::new(ExprKind::Literal(Literal::Str(String::new())), line, column)))
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::lexer;
    use crate::Lang;

    fn parse(source: &str) -> Program {
        let tokens = lexer::tokenize(source, Lang::Python);
        Parser::new(&tokens).parse().expect("parse failed")
    }

    fn parse_expr(source: &str) -> Expr {
        let program = parse(source);
        match program.statements.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Expression(expr)) => expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn function_with_annotations() {
        let source = indoc! {"
            def add(a: int, b: int) -> int:
                return a + b
        "};
        let program = parse(source);
        assert_eq!(program.statements.len(), 1);
        let StmtKind::FunctionDef(func) = &program.statements[0].kind else {
            panic!("expected function definition");
        };
        assert_eq!(func.name, "add");
        assert_eq!(func.parameters.len(), 2);
        assert_eq!(func.parameters[0].ty.as_deref(), Some("int"));
        assert_eq!(func.return_type.as_deref(), Some("int"));
        assert_eq!(func.body.len(), 1);
    }

    #[test]
    fn if_elif_else_chain() {
        let source = indoc! {"
            if a:
                x = 1
            elif b:
                x = 2
            elif c:
                x = 3
            else:
                x = 4
        "};
        let program = parse(source);
        let StmtKind::If(stmt) = &program.statements[0].kind else {
            panic!("expected if statement");
        };
        assert_eq!(stmt.elif_blocks.len(), 2);
        assert_eq!(stmt.else_block.len(), 1);
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse_expr("2 ** 3 ** 4");
        let ExprKind::Binary { op, rhs, .. } = expr.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(op, BinOp::Pow);
        assert!(matches!(
            rhs.kind,
            ExprKind::Binary { op: BinOp::Pow, .. }
        ));
    }

    #[test]
    fn precedence_orders_mul_under_add() {
        let expr = parse_expr("1 + 2 * 3");
        let ExprKind::Binary { op, lhs, rhs } = expr.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(op, BinOp::Add);
        assert!(matches!(lhs.kind, ExprKind::Literal(Literal::Int(1))));
        assert!(matches!(
            rhs.kind,
            ExprKind::Binary { op: BinOp::Mul, .. }
        ));
    }

    #[test]
    fn method_call_and_member_are_first_class() {
        let expr = parse_expr("obj.items[0].count()");
        let ExprKind::MethodCall {
            receiver, method, ..
        } = expr.kind
        else {
            panic!("expected method call");
        };
        assert_eq!(method, "count");
        assert!(matches!(receiver.kind, ExprKind::Index { .. }));
    }

    #[test]
    fn list_literal_becomes_synthetic_call() {
        let expr = parse_expr("[1, 2, 3]");
        let ExprKind::Call { callee, args } = expr.kind else {
            panic!("expected call");
        };
        assert_eq!(callee, "list");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn interpolation_desugars_to_str_concat() {
        let expr = parse_expr("f\"n is {n}\"");
        let ExprKind::Binary { op, lhs, rhs } = expr.kind else {
            panic!("expected concatenation");
        };
        assert_eq!(op, BinOp::Add);
        assert!(matches!(
            lhs.kind,
            ExprKind::Literal(Literal::Str(ref s)) if s == "n is "
        ));
        let ExprKind::Call { callee, args } = rhs.kind else {
            panic!("expected str() wrapper");
        };
        assert_eq!(callee, "str");
        assert!(matches!(args[0].kind, ExprKind::Identifier(ref n) if n == "n"));
    }

    #[test]
    fn bare_return_has_no_value() {
        let source = indoc! {"
            def f():
                return
        "};
        let program = parse(source);
        let StmtKind::FunctionDef(func) = &program.statements[0].kind else {
            panic!("expected function definition");
        };
        assert_eq!(func.body[0].kind, StmtKind::Return(None));
    }

    #[test]
    fn unexpected_token_is_fatal() {
        let tokens = lexer::tokenize("x = )", Lang::Python);
        let err = Parser::new(&tokens).parse().unwrap_err();
        assert!(err.message.contains("unexpected token"));
        assert_eq!(err.line, 1);
    }

    #[test]
    fn call_of_a_non_identifier_head_keeps_its_arguments() {
        let expr = parse_expr("handlers[0](x)");
        let ExprKind::Invoke { target, args } = &expr.kind else {
            panic!("expected invoke, got {:?}", expr.kind);
        };
        assert!(matches!(target.kind, ExprKind::Index { .. }));
        assert_eq!(args.len(), 1);
    }
}

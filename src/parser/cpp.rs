//! Parser for the preprocessor/stream surface. Preprocessor directives and
//! `using namespace std;` are skipped, `std::` qualifiers resolve to their
//! bare names, `cin >> x` lowers to a `read_input()` assignment and `cout`
//! chains survive as left-nested shift expressions rooted at `cout`.

use crate::{
    ast::{
        AssignOp, BinOp, ClassDef, Expr, ExprKind, FunctionDef, IfStmt, Literal, Param, Program,
        Stmt, StmtKind, UnOp, VariableDecl,
    },
    error::ParseError,
    parser::{binary, comparison_op, TokenCursor},
    token::{Token, TokenKind, TokenValue},
};

/// Keywords that can open a declaration at statement level.
const DECL_KEYWORDS: &[&str] = &[
    "int", "double", "float", "bool", "void", "char", "long", "short", "auto",
];

const ACCESS_KEYWORDS: &[&str] = &["public", "private", "protected"];

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

        // A folded `#include`/`#define` line.
        if self.cur.is(TokenKind::Keyword) && self.cur.peek().text().starts_with('#') {
            self.cur.advance();
            return Ok(None);
        }
        if self.cur.is_keyword("using") {
            while !self.cur.take(TokenKind::Semicolon) && !self.cur.at_eof() {
                self.cur.advance();
            }
            return Ok(None);
        }

        if self.cur.is_keyword("class") {
            let class = self.class_def()?;
            return Ok(Some(Stmt::new(StmtKind::ClassDef(class), line, column)));
        }

        if self.cur.is(TokenKind::Keyword) && DECL_KEYWORDS.contains(&self.cur.peek().text()) {
            if self.looks_like_function() {
                let func = self.function_def(None)?;
                return Ok(Some(Stmt::new(StmtKind::FunctionDef(func), line, column)));
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
            if self.stream_read_ahead() {
                return self.cin_statement();
            }
            if self.std_decl_ahead() || self.cur.peek_at(1).is_some_and(|t| t.kind == TokenKind::Identifier) {
                let decl = self.variable_decl()?;
                return Ok(Some(Stmt::new(StmtKind::VariableDecl(decl), line, column)));
            }
            let next = self.cur.peek_at(1).map(|t| t.kind);
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

    /// True when the tokens ahead read `type name (`.
    fn looks_like_function(&self) -> bool {
        let rest = self.cur.rest();
        let mut i = 0;
        while rest.get(i).is_some_and(|t| t.is_keyword("static")) {
            i += 1;
        }
        if rest
            .get(i)
            .is_some_and(|t| matches!(t.kind, TokenKind::Keyword | TokenKind::Identifier))
        {
            i += 1;
            if rest.get(i).is_some_and(|t| t.kind == TokenKind::Identifier) {
                i += 1;
                return rest.get(i).is_some_and(|t| t.kind == TokenKind::LParen);
            }
        }
        false
    }

    /// True when the tokens ahead read `cin >>` or `std::cin >>`.
    fn stream_read_ahead(&self) -> bool {
        let rest = self.cur.rest();
        if rest.first().is_some_and(|t| t.text() == "cin") {
            return rest.get(1).is_some_and(|t| t.kind == TokenKind::Shr);
        }
        if rest.first().is_some_and(|t| t.text() == "std")
            && rest.get(1).is_some_and(|t| t.kind == TokenKind::DoubleColon)
            && rest.get(2).is_some_and(|t| t.text() == "cin")
        {
            return rest.get(3).is_some_and(|t| t.kind == TokenKind::Shr);
        }
        false
    }

    /// True when the tokens ahead read `std::name name`, a declaration with a
    /// qualified type such as `std::string line`.
    fn std_decl_ahead(&self) -> bool {
        let rest = self.cur.rest();
        rest.first().is_some_and(|t| t.text() == "std")
            && rest.get(1).is_some_and(|t| t.kind == TokenKind::DoubleColon)
            && rest.get(2).is_some_and(|t| t.kind == TokenKind::Identifier)
            && rest.get(3).is_some_and(|t| t.kind == TokenKind::Identifier)
    }

    /// Reads a type spelling: an optional `const`, then a keyword type or a
    /// (possibly `std::` qualified) identifier.
    fn type_name(&mut self) -> Option<String> {
        while self.cur.take_keyword("const") {}
        if self.cur.peek().text() == "std"
            && self.cur.peek_at(1).is_some_and(|t| t.kind == TokenKind::DoubleColon)
        {
            self.cur.advance();
            self.cur.advance();
        }
        if matches!(
            self.cur.peek().kind,
            TokenKind::Keyword | TokenKind::Identifier
        ) {
            return Some(self.cur.advance().text().to_string());
        }
        None
    }

    fn function_def(&mut self, access: Option<String>) -> Result<FunctionDef, ParseError> {
        while self.cur.take_keyword("static") {}
        let return_type = self.type_name();
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
            let Some(ty) = self.type_name() else { break };
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
        self.cur.consume_keyword("class")?;
        let name = self.cur.consume(TokenKind::Identifier)?.text().to_string();

        let mut bases = Vec::new();
        if self.cur.take(TokenKind::Colon) {
            loop {
                while self.cur.is(TokenKind::Keyword)
                    && ACCESS_KEYWORDS.contains(&self.cur.peek().text())
                {
                    self.cur.advance();
                }
                if self.cur.is(TokenKind::Identifier) {
                    bases.push(self.cur.advance().text().to_string());
                }
                if !self.cur.take(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.cur.consume(TokenKind::LBrace)?;
        let mut methods = Vec::new();
        let mut fields = Vec::new();
        let mut access = "private".to_string();
        while !self.cur.is(TokenKind::RBrace) && !self.cur.at_eof() {
            // Access labels switch the section.
            if self.cur.is(TokenKind::Keyword)
                && ACCESS_KEYWORDS.contains(&self.cur.peek().text())
                && self.cur.peek_at(1).is_some_and(|t| t.kind == TokenKind::Colon)
            {
                access = self.cur.advance().text().to_string();
                self.cur.advance();
                continue;
            }
            if self.looks_like_function() {
                methods.push(self.function_def(Some(access.clone()))?);
            } else if let Some(stmt) = self.statement()? {
                if let StmtKind::VariableDecl(decl) = stmt.kind {
                    fields.push(decl);
                }
            }
        }
        self.cur.consume(TokenKind::RBrace)?;
        self.cur.take(TokenKind::Semicolon);

        Ok(ClassDef {
            name,
            bases,
            fields,
            methods,
        })
    }

    fn variable_decl(&mut self) -> Result<VariableDecl, ParseError> {
        let ty = self.type_name();
        let name = self.cur.consume(TokenKind::Identifier)?.text().to_string();
        let mut init = None;
        if self.cur.take(TokenKind::Assign) {
            init = Some(self.expression()?);
        }
        self.cur.take(TokenKind::Semicolon);
        Ok(VariableDecl { name, ty, init })
    }

    /// `cin >> a >> b;` lowers to one `read_input()` assignment per target,
    /// wrapped in a block when there is more than one.
    fn cin_statement(&mut self) -> Result<Option<Stmt>, ParseError> {
        let (line, column) = self.cur.loc();
        if self.cur.peek().text() == "std" {
            self.cur.advance();
            self.cur.take(TokenKind::DoubleColon);
        }
        self.cur.advance(); // cin
        let mut reads = Vec::new();
        while self.cur.take(TokenKind::Shr) {
            if !self.cur.is(TokenKind::Identifier) {
                break;
            }
            let target = self.cur.advance().text().to_string();
            let value = Expr::new(
                ExprKind::Call {
                    callee: "read_input".to_string(),
                    args: Vec::new(),
                },
                line,
                column,
            );
            reads.push(Stmt::new(
                StmtKind::Assignment {
                    target,
                    op: AssignOp::Assign,
                    value,
                },
                line,
                column,
            ));
        }
        self.cur.take(TokenKind::Semicolon);
        Ok(match reads.len() {
            0 => None,
            1 => reads.pop(),
            _ => Some(Stmt::new(StmtKind::Block(reads), line, column)),
        })
    }

    fn if_statement(&mut self) -> Result<IfStmt, ParseError> {
        self.cur.consume_keyword("if")?;
        self.cur.consume(TokenKind::LParen)?;
        let condition = self.expression()?;
        self.cur.consume(TokenKind::RParen)?;
        let then_block = self.braced_or_single()?;

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
        // Range-based headers read `type name : iterable`.
        let is_range = matches!(
            self.cur.peek().kind,
            TokenKind::Keyword | TokenKind::Identifier
        ) && self.cur.peek_at(1).is_some_and(|t| t.kind == TokenKind::Identifier)
            && self.cur.peek_at(2).is_some_and(|t| t.kind == TokenKind::Colon);
        if is_range {
            self.cur.advance(); // element type
            variable = self.cur.consume(TokenKind::Identifier)?.text().to_string();
            self.cur.consume(TokenKind::Colon)?;
            iterable = Some(self.expression()?);
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
        let mut left = self.shift()?;
        while let Some(op) = comparison_op(self.cur.peek().kind) {
            self.cur.advance();
            let right = self.shift()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    /// Stream chains build here: `cout << a << b` folds left, so the chain's
    /// root stays the `cout` identifier.
    fn shift(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.additive()?;
        loop {
            let op = match self.cur.peek().kind {
                TokenKind::Shl => BinOp::Shl,
                TokenKind::Shr => BinOp::Shr,
                _ => break,
            };
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
            } else if self.cur.is(TokenKind::Dot) || self.cur.is(TokenKind::Arrow) {
                self.cur.advance();
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
            TokenKind::Keyword if tok.text() == "nullptr" => {
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
                let mut name = tok.text().to_string();
                self.cur.advance();
                // `std::name` resolves to its bare name.
                if name == "std" && self.cur.take(TokenKind::DoubleColon) {
                    name = self.cur.consume(TokenKind::Identifier)?.text().to_string();
                }
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

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::lexer;
    use crate::Lang;

    fn parse(source: &str) -> Program {
        let tokens = lexer::tokenize(source, Lang::Cpp);
        Parser::new(&tokens).parse().expect("parse failed")
    }

    #[test]
    fn directives_and_using_produce_nothing() {
        let source = indoc! {"
            #include <iostream>
            #include <string>
            using namespace std;

            int x = 1;
        "};
        let program = parse(source);
        assert_eq!(program.statements.len(), 1);
        assert!(matches!(
            program.statements[0].kind,
            StmtKind::VariableDecl(_)
        ));
    }

    #[test]
    fn cout_chain_roots_at_the_stream_identifier() {
        let program = parse("cout << \"Sum: \" << a + b << endl;");
        let StmtKind::Expression(expr) = &program.statements[0].kind else {
            panic!("expected expression statement");
        };
        // The chain folds left, so the root's deepest lhs is `cout`.
        let mut node = expr;
        while let ExprKind::Binary {
            op: BinOp::Shl,
            lhs,
            ..
        } = &node.kind
        {
            node = lhs;
        }
        assert!(matches!(node.kind, ExprKind::Identifier(ref n) if n == "cout"));
    }

    #[test]
    fn cin_reads_become_read_input_assignments() {
        let program = parse("cin >> age;");
        let StmtKind::Assignment { target, op, value } = &program.statements[0].kind else {
            panic!("expected assignment, got {:?}", program.statements[0].kind);
        };
        assert_eq!(target, "age");
        assert_eq!(*op, AssignOp::Assign);
        assert!(matches!(
            value.kind,
            ExprKind::Call { ref callee, .. } if callee == "read_input"
        ));
    }

    #[test]
    fn chained_cin_reads_become_a_block() {
        let program = parse("cin >> a >> b;");
        let StmtKind::Block(reads) = &program.statements[0].kind else {
            panic!("expected block");
        };
        assert_eq!(reads.len(), 2);
    }

    #[test]
    fn function_with_typed_parameters() {
        let source = indoc! {"
            int add(int a, int b) {
                return a + b;
            }
        "};
        let program = parse(source);
        let StmtKind::FunctionDef(func) = &program.statements[0].kind else {
            panic!("expected function definition");
        };
        assert_eq!(func.name, "add");
        assert_eq!(func.return_type.as_deref(), Some("int"));
        assert_eq!(func.parameters.len(), 2);
    }

    #[test]
    fn class_sections_assign_access() {
        let source = indoc! {"
            class Point : public Shape {
            public:
                int x;
                int getX() {
                    return x;
                }
            };
        "};
        let program = parse(source);
        let StmtKind::ClassDef(class) = &program.statements[0].kind else {
            panic!("expected class definition");
        };
        assert_eq!(class.bases, vec!["Shape".to_string()]);
        assert_eq!(class.fields.len(), 1);
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.methods[0].access.as_deref(), Some("public"));
    }

    #[test]
    fn qualified_names_resolve_to_bare_names() {
        let program = parse("std::cout << msg << std::endl;");
        let StmtKind::Expression(expr) = &program.statements[0].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::Binary { rhs, .. } = &expr.kind else {
            panic!("expected shift chain");
        };
        assert!(matches!(rhs.kind, ExprKind::Identifier(ref n) if n == "endl"));
    }

    #[test]
    fn qualified_string_declaration() {
        let program = parse("std::string name = \"ada\";");
        let StmtKind::VariableDecl(decl) = &program.statements[0].kind else {
            panic!("expected variable declaration");
        };
        assert_eq!(decl.ty.as_deref(), Some("string"));
        assert_eq!(decl.name, "name");
    }

    #[test]
    fn call_of_a_non_identifier_head_keeps_its_arguments() {
        let program = parse("handlers[0](x);");
        let StmtKind::Expression(expr) = &program.statements[0].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::Invoke { target, args } = &expr.kind else {
            panic!("expected invoke, got {:?}", expr.kind);
        };
        assert!(matches!(target.kind, ExprKind::Index { .. }));
        assert_eq!(args.len(), 1);
    }
}

//! Recursive-descent parsers for the three surfaces over a shared token
//! cursor. All of them produce the language-neutral [`crate::ast`] shape and
//! fail fast on the first syntax error.

use crate::{
    ast::{BinOp, Expr, ExprKind, Program},
    error::ParseError,
    token::{Token, TokenKind},
    Lang,
};

pub mod cpp;
pub mod java;
pub mod python;

pub fn parse(tokens: &[Token], lang: Lang) -> Result<Program, ParseError> {
    if tokens.is_empty() {
        return Ok(Program {
            statements: Vec::new(),
        });
    }
    match lang {
        Lang::Python => python::Parser::new(tokens).parse(),
        Lang::Java => java::Parser::new(tokens).parse(),
        Lang::Cpp => cpp::Parser::new(tokens).parse(),
    }
}

/// Token cursor shared by the parsers. `peek` clamps at the trailing EOF
/// token, so looking past the end is always safe.
pub(crate) struct TokenCursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> TokenCursor<'t> {
    pub(crate) fn new(tokens: &'t [Token]) -> TokenCursor<'t> {
        debug_assert!(!tokens.is_empty());
        TokenCursor { tokens, pos: 0 }
    }

    pub(crate) fn peek(&self) -> &'t Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_at(&self, offset: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + offset)
    }

    /// The unconsumed tail of the token stream, for non-consuming lookahead
    /// scans.
    pub(crate) fn rest(&self) -> &'t [Token] {
        &self.tokens[self.pos.min(self.tokens.len())..]
    }

    pub(crate) fn loc(&self) -> (u32, u32) {
        let tok = self.peek();
        (tok.line, tok.column)
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.peek().is_eof()
    }

    pub(crate) fn advance(&mut self) -> &'t Token {
        let tok = self.peek();
        self.pos += 1;
        tok
    }

    pub(crate) fn is(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(crate) fn is_keyword(&self, word: &str) -> bool {
        self.peek().is_keyword(word)
    }

    /// Consumes the current token if it has `kind`.
    pub(crate) fn take(&mut self, kind: TokenKind) -> bool {
        if self.is(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn take_keyword(&mut self, word: &str) -> bool {
        if self.is_keyword(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn consume(&mut self, kind: TokenKind) -> Result<&'t Token, ParseError> {
        if self.is(kind) {
            Ok(self.advance())
        } else {
            let tok = self.peek();
            Err(ParseError::new(
                format!("expected {:?} but found {:?}", kind, tok.kind),
                tok.line,
                tok.column,
            ))
        }
    }

    pub(crate) fn consume_keyword(&mut self, word: &str) -> Result<&'t Token, ParseError> {
        if self.is_keyword(word) {
            Ok(self.advance())
        } else {
            let tok = self.peek();
            Err(ParseError::new(
                format!("expected '{word}' but found {:?}", tok.kind),
                tok.line,
                tok.column,
            ))
        }
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.is(TokenKind::Newline) {
            self.pos += 1;
        }
    }

    pub(crate) fn skip_semicolons(&mut self) {
        while self.is(TokenKind::Semicolon) {
            self.pos += 1;
        }
    }

    pub(crate) fn unexpected(&self) -> ParseError {
        let tok = self.peek();
        ParseError::new(
            format!("unexpected token {:?}", tok.kind),
            tok.line,
            tok.column,
        )
    }
}

/// Folds two operands into a binary node positioned at the left operand.
pub(crate) fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    let (line, column) = (lhs.line, lhs.column);
    Expr::new(
        ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        line,
        column,
    )
}

/// Maps a comparison token to its operator, shared by all three parsers.
pub(crate) fn comparison_op(kind: TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Eq => Some(BinOp::Eq),
        TokenKind::NotEq => Some(BinOp::NotEq),
        TokenKind::Less => Some(BinOp::Lt),
        TokenKind::Greater => Some(BinOp::Gt),
        TokenKind::LessEq => Some(BinOp::Le),
        TokenKind::GreaterEq => Some(BinOp::Ge),
        _ => None,
    }
}

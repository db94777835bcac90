//! Lexer for the preprocessor/stream surface. Adds `#directive` folding,
//! `::`, `->` and the shift operators the parser treats as stream operators.

use crate::{
    lexer::{is_ident_continue, is_ident_start, Cursor},
    token::{Token, TokenKind, TokenValue, CPP_KEYWORDS},
};

pub fn tokenize(source: &str) -> Vec<Token> {
    let mut cur = Cursor::new(source);
    let mut tokens = Vec::new();

    while let Some(c) = cur.current() {
        if c.is_whitespace() {
            cur.advance();
            continue;
        }
        if c == '#' {
            let token = read_directive(&mut cur);
            tokens.push(token);
            continue;
        }
        if c == '/' && cur.peek(1) == Some('/') {
            cur.skip_line();
            continue;
        }
        if c == '/' && cur.peek(1) == Some('*') {
            cur.skip_block_comment();
            continue;
        }
        if c.is_ascii_digit() {
            let token = cur.read_number();
            tokens.push(token);
            continue;
        }
        if c == '"' || c == '\'' {
            let token = cur.read_string(c);
            tokens.push(token);
            continue;
        }
        if is_ident_start(c) {
            let token = cur.read_identifier(&CPP_KEYWORDS);
            tokens.push(token);
            continue;
        }
        operator(&mut cur, &mut tokens, c);
    }

    let (line, column) = cur.loc();
    tokens.push(Token::eof(line, column));
    tokens
}

/// Folds a whole `#include <...>` / `#define ...` line into one keyword
/// token carrying `#name`; the directive's arguments are discarded.
fn read_directive(cur: &mut Cursor) -> Token {
    let (line, column) = cur.loc();
    cur.advance();
    let mut name = String::from("#");
    while cur.current().is_some_and(is_ident_continue) {
        if let Some(c) = cur.bump() {
            name.push(c);
        }
    }
    cur.skip_line();
    Token::new(TokenKind::Keyword, TokenValue::Text(name), line, column)
}

fn operator(cur: &mut Cursor, tokens: &mut Vec<Token>, c: char) {
    use TokenKind::*;

    let (line, column) = cur.loc();
    let (kind, len) = match (c, cur.peek(1)) {
        (':', Some(':')) => (DoubleColon, 2),
        ('&', Some('&')) => (AndAnd, 2),
        ('|', Some('|')) => (OrOr, 2),
        ('=', Some('=')) => (Eq, 2),
        ('!', Some('=')) => (NotEq, 2),
        ('<', Some('=')) => (LessEq, 2),
        ('>', Some('=')) => (GreaterEq, 2),
        ('-', Some('>')) => (Arrow, 2),
        ('+', Some('=')) => (PlusAssign, 2),
        ('-', Some('=')) => (MinusAssign, 2),
        ('<', Some('<')) => (Shl, 2),
        ('>', Some('>')) => (Shr, 2),
        ('+', _) => (Plus, 1),
        ('-', _) => (Minus, 1),
        ('*', _) => (Star, 1),
        ('/', _) => (Slash, 1),
        ('%', _) => (Percent, 1),
        ('=', _) => (Assign, 1),
        ('<', _) => (Less, 1),
        ('>', _) => (Greater, 1),
        ('!', _) => (Bang, 1),
        ('(', _) => (LParen, 1),
        (')', _) => (RParen, 1),
        ('{', _) => (LBrace, 1),
        ('}', _) => (RBrace, 1),
        ('[', _) => (LBracket, 1),
        (']', _) => (RBracket, 1),
        (',', _) => (Comma, 1),
        (';', _) => (Semicolon, 1),
        (':', _) => (Colon, 1),
        ('.', _) => (Dot, 1),
        _ => {
            // Unknown character (lone & or |, etc.), skip it.
            cur.advance();
            return;
        }
    };
    cur.eat(len);
    tokens.push(Token::bare(kind, line, column));
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn directive_folds_into_one_keyword() {
        let tokens = tokenize("#include <iostream>\nint x;");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[0].text(), "#include");
        assert_eq!(tokens[1].text(), "int");
    }

    #[test]
    fn scope_and_stream_operators() {
        assert_eq!(
            kinds("std::cout << x >> y"),
            vec![
                TokenKind::Identifier,
                TokenKind::DoubleColon,
                TokenKind::Identifier,
                TokenKind::Shl,
                TokenKind::Identifier,
                TokenKind::Shr,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn arrow_and_comparisons() {
        assert_eq!(
            kinds("-> <= < <<"),
            vec![
                TokenKind::Arrow,
                TokenKind::LessEq,
                TokenKind::Less,
                TokenKind::Shl,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lone_ampersand_is_skipped() {
        assert_eq!(
            kinds("a & b"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }
}

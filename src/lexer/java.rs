//! Lexer for the curly-brace OOP surface. Free-form whitespace, `//` and
//! `/* */` comments, char literals folded into strings.

use crate::{
    lexer::{is_ident_start, Cursor},
    token::{Token, TokenKind, JAVA_KEYWORDS},
};

pub fn tokenize(source: &str) -> Vec<Token> {
    let mut cur = Cursor::new(source);
    let mut tokens = Vec::new();

    while let Some(c) = cur.current() {
        if c.is_whitespace() {
            cur.advance();
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
        // Char literals read the same as strings.
        if c == '"' || c == '\'' {
            let token = cur.read_string(c);
            tokens.push(token);
            continue;
        }
        if is_ident_start(c) {
            let token = cur.read_identifier(&JAVA_KEYWORDS);
            tokens.push(token);
            continue;
        }
        operator(&mut cur, &mut tokens, c);
    }

    let (line, column) = cur.loc();
    tokens.push(Token::eof(line, column));
    tokens
}

fn operator(cur: &mut Cursor, tokens: &mut Vec<Token>, c: char) {
    use TokenKind::*;

    let (line, column) = cur.loc();
    let (kind, len) = match (c, cur.peek(1)) {
        ('&', Some('&')) => (AndAnd, 2),
        ('|', Some('|')) => (OrOr, 2),
        ('=', Some('=')) => (Eq, 2),
        ('!', Some('=')) => (NotEq, 2),
        ('<', Some('=')) => (LessEq, 2),
        ('>', Some('=')) => (GreaterEq, 2),
        ('+', Some('=')) => (PlusAssign, 2),
        ('+', Some('+')) => (Increment, 2),
        ('-', Some('=')) => (MinusAssign, 2),
        ('-', Some('-')) => (Decrement, 2),
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
            // Unknown character, skip it.
            cur.advance();
            return;
        }
    };
    cur.eat(len);
    tokens.push(Token::bare(kind, line, column));
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::token::TokenValue;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn comments_produce_no_tokens() {
        let source = indoc! {"
            // line comment
            /* block
               comment */
            int x;
        "};
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn increment_and_shift_operators() {
        assert_eq!(
            kinds("++ -- << >> <= >="),
            vec![
                TokenKind::Increment,
                TokenKind::Decrement,
                TokenKind::Shl,
                TokenKind::Shr,
                TokenKind::LessEq,
                TokenKind::GreaterEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn char_literal_reads_as_string() {
        let tokens = tokenize("'a'");
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].value, TokenValue::Str("a".into()));
    }

    #[test]
    fn keywords_are_classified() {
        let tokens = tokenize("public static void main");
        assert!(tokens[..3].iter().all(|t| t.kind == TokenKind::Keyword));
        assert_eq!(tokens[3].kind, TokenKind::Identifier);
    }
}

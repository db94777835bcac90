use crate::{
    token::{Token, TokenKind, TokenValue},
    Lang,
};

pub mod cpp;
pub mod java;
pub mod python;

/// Tokenizes `source` under the lexical rules of `lang`.
///
/// Lexing is total: unknown characters are skipped and the result always ends
/// with exactly one EOF token.
pub fn tokenize(source: &str, lang: Lang) -> Vec<Token> {
    match lang {
        Lang::Python => python::tokenize(source),
        Lang::Java => java::tokenize(source),
        Lang::Cpp => cpp::tokenize(source),
    }
}

/// Character cursor shared by the three lexers. Tracks the 1-based line and
/// column of the character it currently sits on.
pub(crate) struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

impl Cursor {
    pub(crate) fn new(source: &str) -> Cursor {
        Cursor {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub(crate) fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub(crate) fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    pub(crate) fn loc(&self) -> (u32, u32) {
        (self.line, self.column)
    }

    pub(crate) fn advance(&mut self) {
        if let Some(c) = self.current() {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.current();
        self.advance();
        c
    }

    pub(crate) fn eat(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    /// Skips spaces, tabs and carriage returns, never newlines.
    pub(crate) fn skip_inline_whitespace(&mut self) {
        while matches!(self.current(), Some(' ' | '\t' | '\r')) {
            self.advance();
        }
    }

    /// Skips to (but not past) the next newline.
    pub(crate) fn skip_line(&mut self) {
        while self.current().is_some_and(|c| c != '\n') {
            self.advance();
        }
    }

    /// Skips a `/* ... */` comment, tolerating an unterminated one.
    pub(crate) fn skip_block_comment(&mut self) {
        self.eat(2);
        while let Some(c) = self.current() {
            if c == '*' && self.peek(1) == Some('/') {
                self.eat(2);
                break;
            }
            self.advance();
        }
    }

    /// Reads an integer or float literal. Digits are consumed greedily; a
    /// second `.` terminates the literal.
    pub(crate) fn read_number(&mut self) -> Token {
        let (line, column) = self.loc();
        let mut text = String::new();
        let mut is_float = false;
        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                text.push(c);
            } else if c == '.' && !is_float {
                is_float = true;
                text.push(c);
            } else {
                break;
            }
            self.advance();
        }
        if is_float {
            let value = text.parse().unwrap_or(0.0);
            Token::new(TokenKind::Float, TokenValue::Float(value), line, column)
        } else {
            let value = text.parse().unwrap_or(0);
            Token::new(TokenKind::Int, TokenValue::Int(value), line, column)
        }
    }

    /// Reads a string literal delimited by `quote`, resolving escapes and
    /// tolerating a missing closing quote at end of input.
    pub(crate) fn read_string(&mut self, quote: char) -> Token {
        let (line, column) = self.loc();
        let mut text = String::new();
        self.advance();
        while let Some(c) = self.current() {
            if c == quote {
                self.advance();
                break;
            }
            if c == '\\' {
                self.advance();
                if let Some(escaped) = self.current() {
                    text.push(unescape(escaped));
                    self.advance();
                }
            } else {
                text.push(c);
                self.advance();
            }
        }
        Token::new(TokenKind::Str, TokenValue::Str(text), line, column)
    }

    /// Reads an identifier, classifying it as a keyword when it appears in
    /// `keywords`.
    pub(crate) fn read_identifier(&mut self, keywords: &phf::Set<&'static str>) -> Token {
        let (line, column) = self.loc();
        let mut text = String::new();
        while let Some(c) = self.current() {
            if !is_ident_continue(c) {
                break;
            }
            text.push(c);
            self.advance();
        }
        let kind = if keywords.contains(text.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, TokenValue::Text(text), line, column)
    }
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Resolves the character after a backslash. Unknown escapes pass through.
pub(crate) fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(source: &str, lang: Lang) -> Vec<TokenKind> {
        tokenize(source, lang).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn every_lex_ends_with_a_single_eof() {
        for lang in [Lang::Python, Lang::Java, Lang::Cpp] {
            for source in ["", "x = 1", "@@@ ???", "def f():\n    pass\n"] {
                let tokens = tokenize(source, lang);
                let eofs = tokens.iter().filter(|t| t.is_eof()).count();
                assert_eq!(eofs, 1, "{lang:?} {source:?}");
                assert!(tokens.last().is_some_and(Token::is_eof));
            }
        }
    }

    #[test]
    fn numbers_split_on_second_dot() {
        let tokens = tokenize("1.2.3", Lang::Python);
        assert_eq!(tokens[0].value, TokenValue::Float(1.2));
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(tokens[2].value, TokenValue::Int(3));
    }

    #[test]
    fn string_escapes_resolve() {
        let tokens = tokenize(r#""a\tb\n""#, Lang::Java);
        assert_eq!(tokens[0].value, TokenValue::Str("a\tb\n".into()));
    }

    #[test]
    fn unknown_characters_are_skipped() {
        assert_eq!(
            kinds("a @ b", Lang::Python),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn token_positions_point_at_first_character() {
        let tokens = tokenize("x = 10", Lang::Python);
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 3));
        assert_eq!((tokens[2].line, tokens[2].column), (1, 5));
    }
}

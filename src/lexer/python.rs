//! Lexer for the indentation-based surface. On top of the shared cursor it
//! owns the indent stack and the interpolated-string decomposition.

use crate::{
    lexer::{is_ident_start, unescape, Cursor},
    token::{InterpPart, Token, TokenKind, TokenValue, PYTHON_KEYWORDS},
};

pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).run()
}

struct Lexer {
    cur: Cursor,
    tokens: Vec<Token>,
    /// Indentation widths of the enclosing blocks, always starting at 0.
    indents: Vec<u32>,
}

impl Lexer {
    fn new(source: &str) -> Lexer {
        Lexer {
            cur: Cursor::new(source),
            tokens: Vec::new(),
            indents: vec![0],
        }
    }

    fn run(mut self) -> Vec<Token> {
        let mut at_line_start = true;
        while let Some(c) = self.cur.current() {
            if at_line_start {
                self.handle_indentation();
                at_line_start = false;
                continue;
            }

            if matches!(c, ' ' | '\t' | '\r') {
                self.cur.skip_inline_whitespace();
                continue;
            }
            if c == '\n' {
                let (line, column) = self.cur.loc();
                self.tokens.push(Token::bare(TokenKind::Newline, line, column));
                self.cur.advance();
                at_line_start = true;
                continue;
            }
            if c == '#' {
                self.cur.skip_line();
                continue;
            }
            if c.is_ascii_digit() {
                let token = self.cur.read_number();
                self.tokens.push(token);
                continue;
            }
            if c == 'f' && matches!(self.cur.peek(1), Some('"' | '\'')) {
                let token = self.read_interpolated();
                self.tokens.push(token);
                continue;
            }
            if c == '"' || c == '\'' {
                let token = if self.cur.peek(1) == Some(c) && self.cur.peek(2) == Some(c) {
                    self.read_triple_quoted(c)
                } else {
                    self.cur.read_string(c)
                };
                self.tokens.push(token);
                continue;
            }
            if is_ident_start(c) {
                let token = self.cur.read_identifier(&PYTHON_KEYWORDS);
                self.tokens.push(token);
                continue;
            }
            self.operator(c);
        }

        let (line, column) = self.cur.loc();
        while self.indents.len() > 1 {
            self.indents.pop();
            self.tokens.push(Token::bare(TokenKind::Dedent, line, column));
        }
        self.tokens.push(Token::eof(line, column));
        self.tokens
    }

    /// Measures the indentation of the line the cursor sits at and emits
    /// INDENT/DEDENT tokens against the indent stack. Blank and comment-only
    /// lines never touch the stack.
    fn handle_indentation(&mut self) {
        let (line, _) = self.cur.loc();
        let mut width = 0;
        loop {
            match self.cur.current() {
                Some(' ') => width += 1,
                Some('\t') => width += 4,
                _ => break,
            }
            self.cur.advance();
        }
        if matches!(self.cur.current(), None | Some('\n' | '\r' | '#')) {
            return;
        }

        let current = self.indents.last().copied().unwrap_or(0);
        if width > current {
            self.indents.push(width);
            self.tokens.push(Token::bare(TokenKind::Indent, line, 1));
        } else {
            while self.indents.last().is_some_and(|&top| top > width) {
                self.indents.pop();
                self.tokens.push(Token::bare(TokenKind::Dedent, line, 1));
            }
        }
    }

    fn read_triple_quoted(&mut self, quote: char) -> Token {
        let (line, column) = self.cur.loc();
        self.cur.eat(3);
        let mut text = String::new();
        while let Some(c) = self.cur.current() {
            if c == quote && self.cur.peek(1) == Some(quote) && self.cur.peek(2) == Some(quote) {
                self.cur.eat(3);
                break;
            }
            text.push(c);
            self.cur.advance();
        }
        Token::new(TokenKind::Str, TokenValue::Str(text), line, column)
    }

    /// Decomposes an `f"..."` literal into literal runs and embedded
    /// expressions. Embedded expressions are found by brace-depth scanning
    /// (`{{`/`}}` escape to literal braces) and sub-lexed right here, so the
    /// parser receives finished token sequences.
    fn read_interpolated(&mut self) -> Token {
        let (line, column) = self.cur.loc();
        self.cur.advance();
        let quote = self.cur.bump().unwrap_or('"');
        let mut parts = Vec::new();
        let mut literal = String::new();

        while let Some(c) = self.cur.current() {
            if c == quote {
                self.cur.advance();
                break;
            }
            if c == '{' && self.cur.peek(1) == Some('{') {
                literal.push('{');
                self.cur.eat(2);
                continue;
            }
            if c == '}' && self.cur.peek(1) == Some('}') {
                literal.push('}');
                self.cur.eat(2);
                continue;
            }
            if c == '{' {
                self.cur.advance();
                if !literal.is_empty() {
                    parts.push(InterpPart::Literal(std::mem::take(&mut literal)));
                }
                let mut depth = 1u32;
                let mut expr = String::new();
                while let Some(inner) = self.cur.current() {
                    match inner {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                self.cur.advance();
                                break;
                            }
                        }
                        _ => {}
                    }
                    expr.push(inner);
                    self.cur.advance();
                }
                let mut tokens = tokenize(&expr);
                tokens.pop();
                parts.push(InterpPart::Expr(tokens));
                continue;
            }
            if c == '\\' {
                self.cur.advance();
                if let Some(escaped) = self.cur.current() {
                    literal.push(unescape(escaped));
                    self.cur.advance();
                }
                continue;
            }
            literal.push(c);
            self.cur.advance();
        }

        if !literal.is_empty() {
            parts.push(InterpPart::Literal(literal));
        }
        Token::new(TokenKind::InterpStr, TokenValue::Interp(parts), line, column)
    }

    fn operator(&mut self, c: char) {
        use TokenKind::*;

        let (line, column) = self.cur.loc();
        let (kind, len) = match (c, self.cur.peek(1)) {
            ('=', Some('=')) => (Eq, 2),
            ('!', Some('=')) => (NotEq, 2),
            ('<', Some('=')) => (LessEq, 2),
            ('>', Some('=')) => (GreaterEq, 2),
            ('*', Some('*')) => (Power, 2),
            ('/', Some('/')) => (FloorDiv, 2),
            ('+', Some('=')) => (PlusAssign, 2),
            ('-', Some('=')) => (MinusAssign, 2),
            ('-', Some('>')) => (Arrow, 2),
            ('+', _) => (Plus, 1),
            ('-', _) => (Minus, 1),
            ('*', _) => (Star, 1),
            ('/', _) => (Slash, 1),
            ('%', _) => (Percent, 1),
            ('=', _) => (Assign, 1),
            ('<', _) => (Less, 1),
            ('>', _) => (Greater, 1),
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
                self.cur.advance();
                return;
            }
        };
        self.cur.eat(len);
        self.tokens.push(Token::bare(kind, line, column));
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    fn count(source: &str, kind: TokenKind) -> usize {
        tokenize(source).iter().filter(|t| t.kind == kind).count()
    }

    #[test]
    fn indents_and_dedents_balance() {
        let source = indoc! {"
            def outer():
                if a:
                    b = 1
                c = 2
            d = 3
        "};
        assert_eq!(count(source, TokenKind::Indent), 2);
        assert_eq!(count(source, TokenKind::Dedent), 2);
    }

    #[test]
    fn dedents_flush_at_end_of_input() {
        let source = "if a:\n    if b:\n        c = 1";
        assert_eq!(count(source, TokenKind::Indent), 2);
        assert_eq!(count(source, TokenKind::Dedent), 2);
    }

    #[test]
    fn blank_and_comment_lines_keep_the_stack() {
        let source = indoc! {"
            def f():
                a = 1

                # note
                b = 2
        "};
        assert_eq!(count(source, TokenKind::Indent), 1);
        assert_eq!(count(source, TokenKind::Dedent), 1);
    }

    #[test]
    fn tab_counts_as_four_columns() {
        let source = "if a:\n\tb = 1\nc = 2\n";
        assert_eq!(count(source, TokenKind::Indent), 1);
        assert_eq!(count(source, TokenKind::Dedent), 1);
    }

    #[test]
    fn keywords_are_classified() {
        let tokens = tokenize("def foo");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[0].text(), "def");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn two_char_operators_win_over_single() {
        assert_eq!(
            kinds("** // == -> +="),
            vec![
                TokenKind::Power,
                TokenKind::FloorDiv,
                TokenKind::Eq,
                TokenKind::Arrow,
                TokenKind::PlusAssign,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn triple_quoted_strings_span_lines() {
        let tokens = tokenize("\"\"\"a\nb\"\"\"");
        assert_eq!(tokens[0].value, TokenValue::Str("a\nb".into()));
    }

    #[test]
    fn interpolated_strings_decompose_at_lex_time() {
        let tokens = tokenize("f\"hi {name}!\"");
        let TokenValue::Interp(parts) = &tokens[0].value else {
            panic!("expected interpolated payload: {:?}", tokens[0]);
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], InterpPart::Literal("hi ".into()));
        let InterpPart::Expr(inner) = &parts[1] else {
            panic!("expected embedded expression: {:?}", parts[1]);
        };
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].text(), "name");
        assert_eq!(parts[2], InterpPart::Literal("!".into()));
    }

    #[test]
    fn doubled_braces_escape_to_literals() {
        let tokens = tokenize("f\"{{x}}\"");
        assert_eq!(
            tokens[0].value,
            TokenValue::Interp(vec![InterpPart::Literal("{x}".into())])
        );
    }

    #[test]
    fn nested_braces_stay_in_one_expression() {
        let tokens = tokenize("f\"{ {'a': 1} }\"");
        let TokenValue::Interp(parts) = &tokens[0].value else {
            panic!("expected interpolated payload");
        };
        assert_eq!(parts.len(), 1);
        assert!(matches!(&parts[0], InterpPart::Expr(_)));
    }
}

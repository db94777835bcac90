use std::fmt;

/// A single lexeme produced by one of the surface lexers.
///
/// `line` and `column` are 1-based and point at the first character of the
/// lexeme in the original source.
#[derive(Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, value: TokenValue, line: u32, column: u32) -> Token {
        Token {
            kind,
            value,
            line,
            column,
        }
    }

    pub fn bare(kind: TokenKind, line: u32, column: u32) -> Token {
        Token::new(kind, TokenValue::None, line, column)
    }

    pub fn eof(line: u32, column: u32) -> Token {
        Token::bare(TokenKind::Eof, line, column)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// The textual payload for identifier, keyword and string tokens.
    pub fn text(&self) -> &str {
        match &self.value {
            TokenValue::Text(s) | TokenValue::Str(s) => s,
            _ => "",
        }
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text() == word
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token({:?}, {:?}, line={}, col={})",
            self.kind, self.value, self.line, self.column
        )
    }
}

/// One closed kind enum covers all three surfaces. `Indent`, `Dedent` and
/// `Newline` only ever come out of the Python lexer; `DoubleColon`, `Shl` and
/// `Shr` only out of the brace-language lexers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Eof,

    Int,
    Float,
    Str,
    /// An interpolated string literal; the payload is `TokenValue::Interp`.
    InterpStr,
    Identifier,
    Keyword,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// `**`
    Power,
    /// `//`
    FloorDiv,
    Assign,
    PlusAssign,
    MinusAssign,
    Increment,
    Decrement,
    /// `<<`
    Shl,
    /// `>>`
    Shr,

    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,

    AndAnd,
    OrOr,
    Bang,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,
    /// `::`
    DoubleColon,
    /// `->`
    Arrow,

    Indent,
    Dedent,
    Newline,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenValue {
    None,
    Int(i64),
    Float(f64),
    /// String literal contents, escapes already resolved.
    Str(String),
    /// Identifier, keyword or directive spelling.
    Text(String),
    /// Decomposed interpolated string.
    Interp(Vec<InterpPart>),
}

/// One piece of an interpolated string: either literal text or the token
/// sequence of an embedded expression, sub-lexed at scan time so the parser
/// never has to touch raw source again.
#[derive(Clone, Debug, PartialEq)]
pub enum InterpPart {
    Literal(String),
    Expr(Vec<Token>),
}

pub static PYTHON_KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in",
    "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield", "True", "False", "None",
};

pub static JAVA_KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char",
    "class", "const", "continue", "default", "do", "double", "else", "enum",
    "extends", "final", "finally", "float", "for", "goto", "if", "implements",
    "import", "instanceof", "int", "interface", "long", "native", "new",
    "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while", "true", "false", "null",
};

pub static CPP_KEYWORDS: phf::Set<&'static str> = phf::phf_set! {
    "auto", "break", "case", "char", "const", "continue", "default", "do",
    "double", "else", "enum", "extern", "float", "for", "goto", "if", "int",
    "long", "register", "return", "short", "signed", "sizeof", "static",
    "struct", "switch", "typedef", "union", "unsigned", "void", "volatile",
    "while", "class", "namespace", "template", "typename", "using", "virtual",
    "friend", "public", "protected", "private", "this", "new", "delete",
    "operator", "true", "false", "nullptr", "bool", "try", "catch", "throw",
};

use std::fmt;

/// Source location. `start` and `end` are byte offsets into the lexed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// Token kinds for AGSL / GLSL source.
///
/// The lexer is lossless: whitespace and comments are tokens too, so the
/// concatenated token text always equals the input.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Trivia
    Whitespace,
    LineComment,
    BlockComment,

    // Literals
    Identifier(String),
    NumberLiteral(String),

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Dot,
    Hash,

    // Operators
    Plus,
    PlusPlus,
    Minus,
    MinusMinus,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equals,
    EqualEqual,
    NotEqual,
    Operator(String),

    Unknown(char),
    Eof,
}

impl TokenKind {
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    /// Relational operators that can bound a loop condition.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            TokenKind::Less
                | TokenKind::LessEqual
                | TokenKind::Greater
                | TokenKind::GreaterEqual
                | TokenKind::EqualEqual
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Whitespace => write!(f, "whitespace"),
            TokenKind::LineComment => write!(f, "line comment"),
            TokenKind::BlockComment => write!(f, "block comment"),
            TokenKind::Identifier(s) => write!(f, "{}", s),
            TokenKind::NumberLiteral(s) => write!(f, "{}", s),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::LeftBrace => write!(f, "{{"),
            TokenKind::RightBrace => write!(f, "}}"),
            TokenKind::LeftBracket => write!(f, "["),
            TokenKind::RightBracket => write!(f, "]"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Dot => write!(f, "."),
            TokenKind::Hash => write!(f, "#"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::PlusPlus => write!(f, "++"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::MinusMinus => write!(f, "--"),
            TokenKind::Less => write!(f, "<"),
            TokenKind::LessEqual => write!(f, "<="),
            TokenKind::Greater => write!(f, ">"),
            TokenKind::GreaterEqual => write!(f, ">="),
            TokenKind::Equals => write!(f, "="),
            TokenKind::EqualEqual => write!(f, "=="),
            TokenKind::NotEqual => write!(f, "!="),
            TokenKind::Operator(s) => write!(f, "{}", s),
            TokenKind::Unknown(c) => write!(f, "{}", c),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

/// A token with its kind and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The shader lexer. Never fails: characters it does not understand become
/// [`TokenKind::Unknown`].
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    offset: usize,
    line: usize,
    column: usize,
    comments: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            offset: 0,
            line: 1,
            column: 1,
            comments: true,
        }
    }

    /// A lexer that treats `//` and `/*` as ordinary operators, so text inside
    /// comments is tokenized like code.
    pub fn without_comments(source: &str) -> Self {
        Self {
            comments: false,
            ..Self::new(source)
        }
    }

    /// Tokenize the entire source. The last token is always `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Consume `next` if it is the upcoming character.
    fn eat(&mut self, next: char) -> bool {
        if self.peek() == Some(next) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn next_token(&mut self) -> Token {
        let start = self.offset;
        let line = self.line;
        let column = self.column;

        let ch = match self.peek() {
            Some(ch) => ch,
            None => {
                return Token::new(TokenKind::Eof, Span::new(start, start, line, column));
            }
        };

        let kind = match ch {
            c if c.is_whitespace() => {
                self.read_while(char::is_whitespace);
                TokenKind::Whitespace
            }
            '/' if self.comments && self.peek_next() == Some('/') => {
                self.read_while(|c| c != '\n');
                TokenKind::LineComment
            }
            '/' if self.comments && self.peek_next() == Some('*') => {
                self.advance();
                self.advance();
                // An unterminated block comment runs to the end of input.
                while let Some(c) = self.advance() {
                    if c == '*' && self.eat('/') {
                        break;
                    }
                }
                TokenKind::BlockComment
            }
            c if c.is_ascii_digit()
                || (c == '.' && self.peek_next().is_some_and(|n| n.is_ascii_digit())) =>
            {
                TokenKind::NumberLiteral(self.read_number())
            }
            c if c.is_alphabetic() || c == '_' => {
                TokenKind::Identifier(self.read_while(|c| c.is_alphanumeric() || c == '_'))
            }
            _ => {
                self.advance();
                self.punctuation(ch)
            }
        };

        Token::new(kind, Span::new(start, self.offset, line, column))
    }

    /// Classify punctuation whose first character `ch` was already consumed.
    fn punctuation(&mut self, ch: char) -> TokenKind {
        match ch {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '#' => TokenKind::Hash,
            '+' => {
                if self.eat('+') {
                    TokenKind::PlusPlus
                } else if self.eat('=') {
                    TokenKind::Operator("+=".into())
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    TokenKind::MinusMinus
                } else if self.eat('=') {
                    TokenKind::Operator("-=".into())
                } else {
                    TokenKind::Minus
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::LessEqual
                } else if self.eat('<') {
                    self.compound("<<")
                } else {
                    TokenKind::Less
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::GreaterEqual
                } else if self.eat('>') {
                    self.compound(">>")
                } else {
                    TokenKind::Greater
                }
            }
            '=' => {
                if self.eat('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equals
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::NotEqual
                } else {
                    TokenKind::Operator("!".into())
                }
            }
            '&' | '|' | '^' => {
                if self.eat(ch) {
                    TokenKind::Operator(format!("{ch}{ch}"))
                } else {
                    self.compound(&ch.to_string())
                }
            }
            '*' | '/' | '%' => self.compound(&ch.to_string()),
            '~' | '?' | ':' => TokenKind::Operator(ch.to_string()),
            other => TokenKind::Unknown(other),
        }
    }

    /// An operator optionally followed by `=` (`*=`, `<<=`, ...).
    fn compound(&mut self, op: &str) -> TokenKind {
        if self.eat('=') {
            TokenKind::Operator(format!("{op}="))
        } else {
            TokenKind::Operator(op.to_string())
        }
    }

    /// Digits, fraction, exponent and suffix letters, e.g. `1.0`, `.5`, `2e-3`, `0xFFu`.
    fn read_number(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            let exponent_sign = (c == '+' || c == '-')
                && matches!(text.chars().last(), Some('e' | 'E'))
                && !text.starts_with("0x")
                && !text.starts_with("0X");
            if c.is_ascii_alphanumeric() || c == '.' || exponent_sign {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        text
    }

    fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut result = String::new();
        while let Some(ch) = self.peek() {
            if predicate(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }
}

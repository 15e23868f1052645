//! Tokenizer for the schema language.
//!
//! Malformed literals do not abort the scan: they come out as `Invalid*`
//! tokens carrying the source they covered, and the parser reports them.
//! The last token is always `Eof`.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    Null,
    Any,
    Boolean,
    Integer,
    Number,
    String,
    Date,
    Time,
    DateTime,
    Uuid,
    Email,
    Base64,
    True,
    False,
    This,
    Root,
    Record,
    Model,
    Group,
    Select,
    Of,
}

impl Keyword {
    pub fn lookup(word: &str) -> Option<Self> {
        Some(match word {
            "null" => Self::Null,
            "any" => Self::Any,
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "string" => Self::String,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" => Self::DateTime,
            "uuid" => Self::Uuid,
            "email" => Self::Email,
            "base64" => Self::Base64,
            "true" => Self::True,
            "false" => Self::False,
            "this" => Self::This,
            "root" => Self::Root,
            "record" => Self::Record,
            "model" => Self::Model,
            "group" => Self::Group,
            "select" => Self::Select,
            "of" => Self::Of,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Any => "any",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Uuid => "uuid",
            Self::Email => "email",
            Self::Base64 => "base64",
            Self::True => "true",
            Self::False => "false",
            Self::This => "this",
            Self::Root => "root",
            Self::Record => "record",
            Self::Model => "model",
            Self::Group => "group",
            Self::Select => "select",
            Self::Of => "of",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Pipe,
    Equals,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    QuestionColon,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Ellipsis,
    Keyword(Keyword),
    Identifier,
    /// Unsigned digits, e.g. `42`.
    Natural,
    /// Signed digits, e.g. `-42` or `+42`.
    Integer,
    Real,
    String,
    Regex,
    InvalidReal,
    InvalidString,
    InvalidRegex,
    InvalidChar,
    Eof,
}

impl TokenKind {
    pub fn is_invalid(&self) -> bool {
        matches!(
            self,
            TokenKind::InvalidReal
                | TokenKind::InvalidString
                | TokenKind::InvalidRegex
                | TokenKind::InvalidChar
        )
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            TokenKind::Natural | TokenKind::Integer | TokenKind::Real
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Pipe => "'|'",
            TokenKind::Equals => "'='",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::QuestionColon => "'?:'",
            TokenKind::Less => "'<'",
            TokenKind::LessEqual => "'<='",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::Ellipsis => "'...'",
            TokenKind::Keyword(keyword) => return write!(f, "'{}'", keyword.as_str()),
            TokenKind::Identifier => "identifier",
            TokenKind::Natural => "natural number",
            TokenKind::Integer => "integer",
            TokenKind::Real => "real number",
            TokenKind::String => "string",
            TokenKind::Regex => "regex",
            TokenKind::InvalidReal => "invalid real number",
            TokenKind::InvalidString => "invalid string",
            TokenKind::InvalidRegex => "invalid regex",
            TokenKind::InvalidChar => "invalid character",
            TokenKind::Eof => "end of input",
        };

        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The source text the token covers.
    pub text: String,
    /// Byte offset of the first character.
    pub position: usize,
    pub line: usize,
    pub column: usize,
    /// Length of `text` in bytes.
    pub length: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "{}", self.kind),
            TokenKind::Identifier
            | TokenKind::Natural
            | TokenKind::Integer
            | TokenKind::Real
            | TokenKind::String
            | TokenKind::Regex => write!(f, "{} {}", self.kind, self.text),
            _ if self.kind.is_invalid() => write!(f, "{} {:?}", self.kind, self.text),
            _ => write!(f, "{}", self.kind),
        }
    }
}

/// A cursor over source text tracking line and column, with a stack of
/// marks for speculative scanning.
#[derive(Debug)]
pub struct Scanner<'src> {
    source: &'src str,
    position: usize,
    line: usize,
    column: usize,
    marks: Vec<(usize, usize, usize)>,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
            marks: Vec::new(),
        }
    }

    pub fn is_eof(&self) -> bool {
        self.position >= self.source.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// The character `offset` characters ahead of the cursor.
    pub fn peek(&self, offset: usize) -> Option<char> {
        self.source[self.position..].chars().nth(offset)
    }

    /// Advances over up to `n` characters.
    pub fn consume(&mut self, n: usize) {
        for _ in 0..n {
            let c = match self.peek(0) {
                Some(c) => c,
                None => return,
            };

            self.position += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    pub fn mark(&mut self) {
        self.marks.push((self.position, self.line, self.column));
    }

    /// Drops the latest mark, keeping everything consumed since.
    pub fn commit(&mut self) {
        self.marks.pop();
    }

    /// Returns to the latest mark and drops it.
    pub fn rollback(&mut self) {
        if let Some((position, line, column)) = self.marks.pop() {
            self.position = position;
            self.line = line;
            self.column = column;
        }
    }

    pub fn slice_from(&self, start: usize) -> &'src str {
        &self.source[start..self.position]
    }
}

pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer {
        scanner: Scanner::new(source),
    };

    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token();
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);

        if done {
            return tokens;
        }
    }
}

struct Tokenizer<'src> {
    scanner: Scanner<'src>,
}

impl<'src> Tokenizer<'src> {
    fn next_token(&mut self) -> Token {
        while self.scanner.peek(0).map_or(false, char::is_whitespace) {
            self.scanner.consume(1);
        }

        let start = self.scanner.position();
        let line = self.scanner.line();
        let column = self.scanner.column();

        let kind = match self.scanner.peek(0) {
            None => TokenKind::Eof,
            Some(c) => self.scan(c),
        };

        let text = self.scanner.slice_from(start);
        Token {
            kind,
            text: text.to_owned(),
            position: start,
            line,
            column,
            length: text.len(),
        }
    }

    fn scan(&mut self, c: char) -> TokenKind {
        let single = match c {
            '|' => Some(TokenKind::Pipe),
            '=' => Some(TokenKind::Equals),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            ',' => Some(TokenKind::Comma),
            ':' => Some(TokenKind::Colon),
            _ => None,
        };

        if let Some(kind) = single {
            self.scanner.consume(1);
            return kind;
        }

        match c {
            '<' => self.comparator(TokenKind::Less, TokenKind::LessEqual),
            '>' => self.comparator(TokenKind::Greater, TokenKind::GreaterEqual),
            '?' => {
                self.scanner.consume(1);
                if self.scanner.peek(0) == Some(':') {
                    self.scanner.consume(1);
                    TokenKind::QuestionColon
                } else {
                    TokenKind::InvalidChar
                }
            }
            '.' => self.ellipsis(),
            '\'' => self.string(),
            '/' => self.regex(),
            c if c.is_ascii_alphabetic() || c == '_' => self.word(),
            c if c.is_ascii_digit() => self.number(),
            '+' | '-' if self.scanner.peek(1).map_or(false, |c| c.is_ascii_digit()) => {
                self.number()
            }
            _ => {
                self.scanner.consume(1);
                TokenKind::InvalidChar
            }
        }
    }

    fn comparator(&mut self, strict: TokenKind, inclusive: TokenKind) -> TokenKind {
        self.scanner.mark();
        self.scanner.consume(1);

        if self.scanner.peek(0) == Some('=') {
            self.scanner.consume(1);
            self.scanner.commit();
            return inclusive;
        }

        self.scanner.rollback();
        self.scanner.consume(1);
        strict
    }

    fn ellipsis(&mut self) -> TokenKind {
        let mut dots = 0;
        while dots < 3 && self.scanner.peek(0) == Some('.') {
            self.scanner.consume(1);
            dots += 1;
        }

        if dots == 3 {
            TokenKind::Ellipsis
        } else {
            TokenKind::InvalidChar
        }
    }

    fn word(&mut self) -> TokenKind {
        let start = self.scanner.position();
        while self
            .scanner
            .peek(0)
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.scanner.consume(1);
        }

        match Keyword::lookup(self.scanner.slice_from(start)) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier,
        }
    }

    fn digits(&mut self) -> usize {
        let mut count = 0;
        while self.scanner.peek(0).map_or(false, |c| c.is_ascii_digit()) {
            self.scanner.consume(1);
            count += 1;
        }
        count
    }

    fn number(&mut self) -> TokenKind {
        let mut kind = TokenKind::Natural;
        if let Some('+') | Some('-') = self.scanner.peek(0) {
            self.scanner.consume(1);
            kind = TokenKind::Integer;
        }

        self.digits();

        if self.scanner.peek(0) == Some('.') {
            self.scanner.consume(1);
            if self.digits() == 0 {
                return TokenKind::InvalidReal;
            }
            kind = TokenKind::Real;
        }

        if let Some('e') | Some('E') = self.scanner.peek(0) {
            self.scanner.consume(1);
            if let Some('+') | Some('-') = self.scanner.peek(0) {
                self.scanner.consume(1);
            }
            if self.digits() == 0 {
                return TokenKind::InvalidReal;
            }
            kind = TokenKind::Real;
        }

        kind
    }

    fn string(&mut self) -> TokenKind {
        self.scanner.consume(1);

        loop {
            match self.scanner.peek(0) {
                None | Some('\n') | Some('\r') => return TokenKind::InvalidString,
                Some('\'') => {
                    self.scanner.consume(1);
                    return TokenKind::String;
                }
                Some('\\') => match self.scanner.peek(1) {
                    Some('n') | Some('r') | Some('t') | Some('\\') | Some('\'') | Some('"')
                    | Some('0') => self.scanner.consume(2),
                    Some('x') => {
                        let hex = (2..4).all(|i| {
                            self.scanner
                                .peek(i)
                                .map_or(false, |c| c.is_ascii_hexdigit())
                        });
                        if !hex {
                            self.scanner.consume(2);
                            return TokenKind::InvalidString;
                        }
                        self.scanner.consume(4);
                    }
                    None | Some('\n') | Some('\r') => {
                        self.scanner.consume(1);
                        return TokenKind::InvalidString;
                    }
                    Some(_) => {
                        self.scanner.consume(2);
                        return TokenKind::InvalidString;
                    }
                },
                Some(_) => self.scanner.consume(1),
            }
        }
    }

    fn regex(&mut self) -> TokenKind {
        fn allowed(c: char) -> bool {
            c == '\t' || (' '..='~').contains(&c)
        }

        self.scanner.consume(1);
        let mut empty = true;

        loop {
            match self.scanner.peek(0) {
                Some('/') => {
                    self.scanner.consume(1);
                    if empty {
                        return TokenKind::InvalidRegex;
                    }
                    while self.scanner.peek(0).map_or(false, |c| c.is_ascii_alphabetic()) {
                        self.scanner.consume(1);
                    }
                    return TokenKind::Regex;
                }
                Some('\\') => match self.scanner.peek(1) {
                    Some(c) if allowed(c) => self.scanner.consume(2),
                    _ => {
                        self.scanner.consume(1);
                        return TokenKind::InvalidRegex;
                    }
                },
                Some(c) if allowed(c) => self.scanner.consume(1),
                _ => return TokenKind::InvalidRegex,
            }
            empty = false;
        }
    }
}

/// Decodes a `String` token's text (quotes included) into its value.
pub fn unescape(text: &str) -> Option<String> {
    let body = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        out.push(match chars.next()? {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                char::from(u8::from_str_radix(&hex, 16).ok()?)
            }
            _ => return None,
        });
    }

    Some(out)
}

/// Splits a `Regex` token's text into its pattern and flags.
pub fn split_regex(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_prefix('/')?;
    let close = body.rfind('/')?;
    Some((&body[..close], &body[close + 1..]))
}

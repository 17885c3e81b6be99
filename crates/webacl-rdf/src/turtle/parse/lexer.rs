//! Turtle tokenizer.
//!
//! Produces a flat token stream with line numbers. Escapes in IRIs, strings
//! and local names are resolved here; IRI resolution happens in the parser.

use std::fmt;

use super::error::{ParseError, ParseErrorKind, ParseResult};

/// Characters that may follow `\` in a prefixed local name.
const LOCAL_ESCAPES: &str = "_~.-!$&'()*+,;=/?#@%";

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<...>` with escapes resolved, not yet resolved against the base.
    IriRef(String),
    /// `prefix:local`; `local` may be empty.
    PrefixedName { prefix: String, local: String },
    /// `_:label`
    BlankLabel(String),
    /// Quoted string of any form with escapes resolved.
    String(String),
    /// `@word`: a language tag, or `@prefix` / `@base`.
    AtKeyword(String),
    Integer(String),
    Decimal(String),
    Double(String),
    /// Bare word: `a`, `true`, `false`, `PREFIX`, `BASE`.
    Keyword(String),
    Dot,
    Semicolon,
    Comma,
    LBracket,
    RBracket,
    LParen,
    RParen,
    DoubleCaret,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IriRef(iri) => write!(f, "<{iri}>"),
            Self::PrefixedName { prefix, local } => write!(f, "{prefix}:{local}"),
            Self::BlankLabel(label) => write!(f, "_:{label}"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::AtKeyword(word) => write!(f, "@{word}"),
            Self::Integer(n) | Self::Decimal(n) | Self::Double(n) => write!(f, "{n}"),
            Self::Keyword(word) => write!(f, "'{word}'"),
            Self::Dot => write!(f, "'.'"),
            Self::Semicolon => write!(f, "';'"),
            Self::Comma => write!(f, "','"),
            Self::LBracket => write!(f, "'['"),
            Self::RBracket => write!(f, "']'"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::DoubleCaret => write!(f, "'^^'"),
        }
    }
}

/// A token with the line it starts on.
#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

/// Splits a Turtle document into tokens, skipping whitespace and comments.
///
/// ## Errors
///
/// Returns an error for unterminated strings or IRIs, bad escapes, and
/// characters that cannot start a token.
pub fn tokenize(input: &str) -> ParseResult<Vec<Spanned>> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    Lexer::new(input).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn run(mut self) -> ParseResult<Vec<Spanned>> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
                continue;
            }
            if c == '#' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }

            let line = self.line;
            let token = self.next_token(c)?;
            tokens.push(Spanned { token, line });
        }

        Ok(tokens)
    }

    fn next_token(&mut self, c: char) -> ParseResult<Token> {
        let single = |lexer: &mut Self, token: Token| -> ParseResult<Token> {
            lexer.pos += 1;
            Ok(token)
        };

        match c {
            '<' => self.iri_ref(),
            '"' | '\'' => self.string(c),
            '@' => self.at_keyword(),
            '_' if self.peek_at(1) == Some(':') => self.blank_label(),
            '^' if self.peek_at(1) == Some('^') => {
                self.pos += 2;
                Ok(Token::DoubleCaret)
            }
            '.' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => self.number(),
            '+' | '-' => self.number(),
            c if c.is_ascii_digit() => self.number(),
            '.' => single(self, Token::Dot),
            ';' => single(self, Token::Semicolon),
            ',' => single(self, Token::Comma),
            '[' => single(self, Token::LBracket),
            ']' => single(self, Token::RBracket),
            '(' => single(self, Token::LParen),
            ')' => single(self, Token::RParen),
            c if c == ':' || c == '_' || c.is_alphabetic() => self.name(),
            other => Err(ParseError::new(
                ParseErrorKind::InvalidCharacter,
                self.line,
                format!("unexpected character {other:?}"),
            )),
        }
    }

    fn iri_ref(&mut self) -> ParseResult<Token> {
        let line = self.line;
        self.bump();
        let mut iri = String::new();

        loop {
            match self.bump() {
                Some('>') => return Ok(Token::IriRef(iri)),
                Some('\\') => match self.bump() {
                    Some('u') => iri.push(self.hex_char(4)?),
                    Some('U') => iri.push(self.hex_char(8)?),
                    other => {
                        return Err(ParseError::new(
                            ParseErrorKind::InvalidEscape,
                            self.line,
                            format!("\\{} in IRI", other.map(String::from).unwrap_or_default()),
                        ));
                    }
                },
                Some(c) if c.is_whitespace() || "<\"{}|^`".contains(c) => {
                    return Err(ParseError::invalid_iri(
                        self.line,
                        format!("character {c:?} not allowed in IRI"),
                    ));
                }
                Some(c) => iri.push(c),
                None => return Err(ParseError::eof(line, "'>' closing IRI")),
            }
        }
    }

    fn string(&mut self, quote: char) -> ParseResult<Token> {
        let line = self.line;
        let long = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        let mut value = String::new();

        if long {
            self.pos += 3;
            loop {
                if self.peek() == Some(quote)
                    && self.peek_at(1) == Some(quote)
                    && self.peek_at(2) == Some(quote)
                {
                    self.pos += 3;
                    return Ok(Token::String(value));
                }
                match self.bump() {
                    Some('\\') => value.push(self.escape()?),
                    Some(c) => value.push(c),
                    None => return Err(unterminated(line)),
                }
            }
        }

        self.bump();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(Token::String(value)),
                Some('\\') => value.push(self.escape()?),
                Some('\n' | '\r') | None => return Err(unterminated(line)),
                Some(c) => value.push(c),
            }
        }
    }

    fn escape(&mut self) -> ParseResult<char> {
        match self.bump() {
            Some('t') => Ok('\t'),
            Some('b') => Ok('\u{8}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('f') => Ok('\u{c}'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some('\\') => Ok('\\'),
            Some('u') => self.hex_char(4),
            Some('U') => self.hex_char(8),
            other => Err(ParseError::new(
                ParseErrorKind::InvalidEscape,
                self.line,
                format!("\\{}", other.map(String::from).unwrap_or_default()),
            )),
        }
    }

    fn hex_char(&mut self, digits: usize) -> ParseResult<char> {
        let mut code: u32 = 0;
        for _ in 0..digits {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::InvalidEscape,
                        self.line,
                        format!("expected {digits} hex digits"),
                    )
                })?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::InvalidEscape,
                self.line,
                format!("U+{code:X} is not a character"),
            )
        })
    }

    fn at_keyword(&mut self) -> ParseResult<Token> {
        self.bump();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            self.pos += 1;
        }

        let word: String = self.chars[start..self.pos].iter().collect();
        if !word.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(ParseError::new(
                ParseErrorKind::InvalidCharacter,
                self.line,
                "'@' must be followed by a directive or language tag",
            ));
        }
        Ok(Token::AtKeyword(word))
    }

    fn blank_label(&mut self) -> ParseResult<Token> {
        self.pos += 2;
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            self.pos += 1;
        }
        while self.pos > start && self.chars[self.pos - 1] == '.' {
            self.pos -= 1;
        }

        if self.pos == start {
            return Err(ParseError::new(
                ParseErrorKind::InvalidCharacter,
                self.line,
                "empty blank node label",
            ));
        }
        Ok(Token::BlankLabel(self.chars[start..self.pos].iter().collect()))
    }

    fn number(&mut self) -> ParseResult<Token> {
        let start = self.pos;
        if matches!(self.peek(), Some('+' | '-')) {
            self.pos += 1;
        }

        let int_digits = self.digits();
        let mut frac_digits = 0;
        let mut decimal = false;
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            decimal = true;
            frac_digits = self.digits();
        }

        if int_digits + frac_digits == 0 {
            return Err(ParseError::new(
                ParseErrorKind::InvalidCharacter,
                self.line,
                "sign without digits",
            ));
        }

        let mut double = false;
        if matches!(self.peek(), Some('e' | 'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some('+' | '-')) {
                self.pos += 1;
            }
            if self.digits() == 0 {
                self.pos = mark;
            } else {
                double = true;
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        Ok(if double {
            Token::Double(text)
        } else if decimal {
            Token::Decimal(text)
        } else {
            Token::Integer(text)
        })
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Lexes a prefixed name or a bare keyword.
    fn name(&mut self) -> ParseResult<Token> {
        // (char, escaped)
        let mut chars: Vec<(char, bool)> = Vec::new();

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '%') {
                chars.push((c, false));
                self.pos += 1;
            } else if c == '\\' {
                match self.peek_at(1) {
                    Some(escaped) if LOCAL_ESCAPES.contains(escaped) => {
                        chars.push((escaped, true));
                        self.pos += 2;
                    }
                    _ => {
                        return Err(ParseError::new(
                            ParseErrorKind::InvalidEscape,
                            self.line,
                            "invalid escape in local name",
                        ));
                    }
                }
            } else {
                break;
            }
        }

        // A trailing dot terminates the statement.
        while chars.last() == Some(&('.', false)) {
            chars.pop();
            self.pos -= 1;
        }

        match chars.iter().position(|&(c, escaped)| c == ':' && !escaped) {
            Some(split) => Ok(Token::PrefixedName {
                prefix: chars[..split].iter().map(|&(c, _)| c).collect(),
                local: chars[split + 1..].iter().map(|&(c, _)| c).collect(),
            }),
            None => Ok(Token::Keyword(chars.iter().map(|&(c, _)| c).collect())),
        }
    }
}

fn unterminated(line: usize) -> ParseError {
    ParseError::new(
        ParseErrorKind::UnterminatedString,
        line,
        "string literal is not closed",
    )
}

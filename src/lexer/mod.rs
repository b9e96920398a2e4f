//! Tokenizer for sbt build definitions.
//!
//! Converts `*.sbt` and `project/*.scala` source text into a token *tree*:
//! bracketed regions (`(...)`, `[...]`, `{...}`) become a single
//! [`TokenKind::Group`] holding their children, so the matcher can step over a
//! whole argument list or descend into it.
//!
//! The tokenizer is deliberately shallow. It knows just enough Scala to keep the
//! matcher honest:
//! - dotted identifiers (`Versions.akka`) are one [`TokenKind::Symbol`]
//! - runs of operator characters are one [`TokenKind::Operator`] (`%%%`, `++=`, `:=`)
//! - plain, triple-quoted and interpolated string literals
//! - `//` and (nested) `/* */` comments are dropped along with whitespace
//!
//! Interpolated strings that actually substitute (`s"$name-core"`) become
//! [`TokenKind::Template`], which no string rule matches.
//!
//! Nesting is built with an explicit stack and capped at
//! [`MAX_NESTING_DEPTH`]; deeper input fails with
//! [`ExtractError::NestingTooDeep`].

use crate::constants::MAX_NESTING_DEPTH;
use crate::core::ExtractError;
use std::fmt;

/// Bracket kind of a [`TokenKind::Group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `( ... )`
    Paren,
    /// `[ ... ]`
    Bracket,
    /// `{ ... }`
    Brace,
}

impl Delimiter {
    fn from_open(ch: char) -> Option<Self> {
        match ch {
            '(' => Some(Self::Paren),
            '[' => Some(Self::Bracket),
            '{' => Some(Self::Brace),
            _ => None,
        }
    }

    fn from_close(ch: char) -> Option<Self> {
        match ch {
            ')' => Some(Self::Paren),
            ']' => Some(Self::Bracket),
            '}' => Some(Self::Brace),
            _ => None,
        }
    }

    /// The opening character of this delimiter.
    #[must_use]
    pub const fn open_char(self) -> char {
        match self {
            Self::Paren => '(',
            Self::Bracket => '[',
            Self::Brace => '{',
        }
    }
}

/// What a token is, independent of where it appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier, possibly dotted: `libraryDependencies`, `Versions.akka`
    Symbol(String),
    /// Maximal run of operator characters: `%`, `%%`, `:=`, `++=`
    Operator(String),
    /// String literal with escapes already processed
    Str(String),
    /// Interpolated string that contains substitutions
    Template(String),
    /// Character literal
    Char(String),
    /// Numeric literal, kept verbatim
    Number(String),
    /// `,` `;` `.` and any character the tokenizer has no better name for
    Punct(char),
    /// Bracketed region with its children
    Group {
        /// Which brackets enclose the group
        delimiter: Delimiter,
        /// Tokens between the brackets
        children: Vec<Token>,
    },
}

/// A token with the one-based line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token itself
    pub kind: TokenKind,
    /// One-based line of the first character
    pub line: usize,
}

impl Token {
    /// Create a token at the given line.
    #[must_use]
    pub const fn new(kind: TokenKind, line: usize) -> Self {
        Self {
            kind,
            line,
        }
    }

    /// Text of a symbol, operator, string or number token.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Symbol(s)
            | TokenKind::Operator(s)
            | TokenKind::Str(s)
            | TokenKind::Template(s)
            | TokenKind::Char(s)
            | TokenKind::Number(s) => Some(s),
            TokenKind::Punct(_) | TokenKind::Group { .. } => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Symbol(s) => write!(f, "symbol '{s}'"),
            TokenKind::Operator(s) => write!(f, "operator '{s}'"),
            TokenKind::Str(s) => write!(f, "string \"{s}\""),
            TokenKind::Template(s) => write!(f, "template \"{s}\""),
            TokenKind::Char(s) => write!(f, "char '{s}'"),
            TokenKind::Number(s) => write!(f, "number {s}"),
            TokenKind::Punct(c) => write!(f, "'{c}'"),
            TokenKind::Group {
                delimiter,
                children,
            } => write!(f, "group '{}' with {} tokens", delimiter.open_char(), children.len()),
        }
    }
}

/// Tokenize sbt source text into a token tree.
///
/// # Errors
///
/// Returns a syntax [`ExtractError`] for unterminated strings or comments and
/// for unbalanced delimiters.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ExtractError> {
    Lexer::new(source).tokenize()
}

/// A group whose closing delimiter has not been seen yet.
struct OpenGroup {
    delimiter: Delimiter,
    line: usize,
    /// Tokens of the enclosing level, restored when the group closes
    parent: Vec<Token>,
}

/// Characters that form operators when they appear in a run.
fn is_operator_char(ch: char) -> bool {
    matches!(
        ch,
        '!' | '#' | '%' | '&' | '*' | '+' | '-' | '/' | ':' | '<' | '=' | '>' | '?' | '@' | '\\' | '^' | '|' | '~'
    )
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Tokenizer over a buffered character vector.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
        }
    }

    /// Tokenize the entire input into a token tree.
    ///
    /// # Errors
    ///
    /// See [`tokenize`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ExtractError> {
        let mut stack: Vec<OpenGroup> = Vec::new();
        let mut current: Vec<Token> = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            let Some(ch) = self.peek() else {
                break;
            };
            let line = self.line;

            if let Some(delimiter) = Delimiter::from_open(ch) {
                if stack.len() >= MAX_NESTING_DEPTH {
                    return Err(ExtractError::NestingTooDeep {
                        limit: MAX_NESTING_DEPTH,
                        line,
                    });
                }
                self.advance();
                stack.push(OpenGroup {
                    delimiter,
                    line,
                    parent: std::mem::take(&mut current),
                });
                continue;
            }

            if let Some(delimiter) = Delimiter::from_close(ch) {
                self.advance();
                match stack.pop() {
                    Some(open) if open.delimiter == delimiter => {
                        let children = std::mem::replace(&mut current, open.parent);
                        current.push(Token::new(
                            TokenKind::Group {
                                delimiter,
                                children,
                            },
                            open.line,
                        ));
                    }
                    _ => {
                        return Err(ExtractError::UnexpectedDelimiter {
                            found: ch,
                            line,
                        });
                    }
                }
                continue;
            }

            let token = self.next_token()?;
            current.push(token);
        }

        if let Some(open) = stack.pop() {
            return Err(ExtractError::UnclosedDelimiter {
                open: open.delimiter.open_char(),
                line: open.line,
            });
        }

        Ok(current)
    }

    /// Lex one non-delimiter token starting at the current position.
    fn next_token(&mut self) -> Result<Token, ExtractError> {
        let line = self.line;
        let Some(ch) = self.peek() else {
            return Err(ExtractError::UnterminatedString {
                line,
            });
        };

        let kind = match ch {
            '"' => TokenKind::Str(self.string_literal(false)?),
            '`' => self.backquoted_identifier()?,
            '\'' => self.char_literal(),
            c if c.is_ascii_digit() => self.number_literal(),
            c if is_ident_start(c) => self.identifier_or_interpolation()?,
            c if is_operator_char(c) => self.operator(),
            c => {
                self.advance();
                TokenKind::Punct(c)
            }
        };

        Ok(Token::new(kind, line))
    }

    /// Identifier, extended across `.segment` parts; an identifier immediately
    /// followed by `"` is a string interpolator.
    fn identifier_or_interpolation(&mut self) -> Result<TokenKind, ExtractError> {
        let mut ident = String::new();
        self.take_ident_part(&mut ident);

        if self.peek() == Some('"') {
            let raw = ident == "raw";
            let content = self.string_literal(raw)?;
            return Ok(if content.contains('$') {
                TokenKind::Template(content)
            } else {
                TokenKind::Str(content)
            });
        }

        while self.peek() == Some('.') && self.peek_ahead(1).is_some_and(is_ident_start) {
            self.advance();
            ident.push('.');
            self.take_ident_part(&mut ident);
        }

        Ok(TokenKind::Symbol(ident))
    }

    fn take_ident_part(&mut self, ident: &mut String) {
        while let Some(ch) = self.peek() {
            if !is_ident_part(ch) {
                break;
            }
            ident.push(ch);
            self.advance();
        }
    }

    fn backquoted_identifier(&mut self) -> Result<TokenKind, ExtractError> {
        let line = self.line;
        self.advance();
        let mut ident = String::new();
        loop {
            match self.advance() {
                Some('`') => return Ok(TokenKind::Symbol(ident)),
                Some('\n') | None => {
                    return Err(ExtractError::UnterminatedString {
                        line,
                    });
                }
                Some(ch) => ident.push(ch),
            }
        }
    }

    /// Read a string literal starting at the opening quote.
    fn string_literal(&mut self, raw: bool) -> Result<String, ExtractError> {
        let line = self.line;

        if self.peek_ahead(1) == Some('"') && self.peek_ahead(2) == Some('"') {
            self.position += 3;
            return self.triple_quoted(line);
        }

        self.advance();
        let mut value = String::new();
        loop {
            match self.advance() {
                Some('"') => return Ok(value),
                Some('\n') | None => {
                    return Err(ExtractError::UnterminatedString {
                        line,
                    });
                }
                Some('\\') if !raw => self.escape_sequence(&mut value),
                Some(ch) => value.push(ch),
            }
        }
    }

    fn triple_quoted(&mut self, line: usize) -> Result<String, ExtractError> {
        let mut value = String::new();
        loop {
            if self.peek() == Some('"') && self.peek_ahead(1) == Some('"') && self.peek_ahead(2) == Some('"') {
                self.position += 3;
                // `""""a""""` keeps the surplus quotes as content
                while self.peek() == Some('"') {
                    value.push('"');
                    self.advance();
                }
                return Ok(value);
            }
            match self.advance() {
                Some(ch) => value.push(ch),
                None => {
                    return Err(ExtractError::UnterminatedString {
                        line,
                    });
                }
            }
        }
    }

    fn escape_sequence(&mut self, value: &mut String) {
        match self.advance() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('b') => value.push('\u{8}'),
            Some('f') => value.push('\u{c}'),
            Some('"') => value.push('"'),
            Some('\'') => value.push('\''),
            Some('\\') => value.push('\\'),
            Some('u') => {
                let hex: String = (1..=4).filter_map(|offset| self.peek_ahead(offset - 1)).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => {
                        value.push(decoded);
                        self.position += 4;
                    }
                    _ => value.push_str("\\u"),
                }
            }
            Some(other) => {
                value.push('\\');
                value.push(other);
            }
            None => value.push('\\'),
        }
    }

    /// `'a'`, `'\n'`; anything else starting with a quote is punctuation.
    fn char_literal(&mut self) -> TokenKind {
        if self.peek_ahead(1) == Some('\\') {
            if let Some(len) = (3..=7).find(|&n| self.peek_ahead(n) == Some('\'')) {
                let text: String = self.input[self.position + 1..self.position + len].iter().collect();
                self.position += len + 1;
                return TokenKind::Char(text);
            }
        } else if self.peek_ahead(2) == Some('\'') && self.peek_ahead(1).is_some_and(|c| c != '\n') {
            let text: String = self.input[self.position + 1..self.position + 2].iter().collect();
            self.position += 3;
            return TokenKind::Char(text);
        }

        self.advance();
        TokenKind::Punct('\'')
    }

    fn number_literal(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            let continues = ch.is_ascii_alphanumeric()
                || ch == '_'
                || (ch == '.' && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()));
            if !continues {
                break;
            }
            text.push(ch);
            self.advance();
        }
        TokenKind::Number(text)
    }

    fn operator(&mut self) -> TokenKind {
        let mut op = String::new();
        while let Some(ch) = self.peek() {
            if !is_operator_char(ch) || (!op.is_empty() && self.at_comment_start()) {
                break;
            }
            op.push(ch);
            self.advance();
        }
        TokenKind::Operator(op)
    }

    fn at_comment_start(&self) -> bool {
        self.peek() == Some('/') && matches!(self.peek_ahead(1), Some('/' | '*'))
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ExtractError> {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => self.skip_line_comment(),
                Some('/') if self.peek_ahead(1) == Some('*') => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Scala block comments nest.
    fn skip_block_comment(&mut self) -> Result<(), ExtractError> {
        let line = self.line;
        self.position += 2;
        let mut depth = 1usize;

        while depth > 0 {
            match (self.peek(), self.peek_ahead(1)) {
                (Some('/'), Some('*')) => {
                    self.position += 2;
                    depth += 1;
                }
                (Some('*'), Some('/')) => {
                    self.position += 2;
                    depth -= 1;
                }
                (Some(_), _) => {
                    self.advance();
                }
                (None, _) => {
                    return Err(ExtractError::UnterminatedComment {
                        line,
                    });
                }
            }
        }

        Ok(())
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }
}

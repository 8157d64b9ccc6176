//! Part 21 (STEP physical file) lexer.
//!
//! Produces a stream of [`Spanned`] tokens. Handles keywords (including the
//! hyphenated `ISO-10303-21` markers and `!USER_DEFINED` names), entity
//! references, strings with `''` escapes, reals in the `1.`, `1.5E-3` forms,
//! integers, enumerations, punctuation, and `/* */` comments.

use crate::error::StepError;

/// A token in a STEP file.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Keyword or type name, upper-cased.
    Keyword(String),
    /// Entity reference (`#123`).
    EntityRef(u64),
    /// String literal without quotes.
    String(String),
    /// Real number.
    Real(f64),
    /// Integer number.
    Integer(i64),
    /// Enumeration (`.T.` becomes `Enum("T")`).
    Enum(String),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `=`
    Equals,
    /// `*` (derived value).
    Asterisk,
    /// `$` (unset value).
    Dollar,
}

/// Line/column of a token start, both 1-indexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Line number.
    pub line: usize,
    /// Column number.
    pub col: usize,
}

/// A token with the position it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    /// The token.
    pub token: Token,
    /// Start position.
    pub pos: Position,
}

/// Lexer over raw Part 21 bytes.
pub struct Lexer<'a> {
    input: &'a [u8],
    offset: usize,
    pos: Position,
}

impl<'a> Lexer<'a> {
    /// Create a lexer for the given input.
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            pos: Position { line: 1, col: 1 },
        }
    }

    /// Position just past the last consumed byte.
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Tokenize the remaining input.
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, StepError> {
        let mut tokens = Vec::new();
        while let Some(tok) = self.next_token()? {
            tokens.push(tok);
        }
        Ok(tokens)
    }

    /// Next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Spanned>, StepError> {
        self.skip_trivia()?;

        let Some(ch) = self.peek() else {
            return Ok(None);
        };
        let start = self.pos;

        let token = match ch {
            b'(' | b')' | b',' | b';' | b'=' | b'*' | b'$' => {
                self.bump();
                match ch {
                    b'(' => Token::LParen,
                    b')' => Token::RParen,
                    b',' => Token::Comma,
                    b';' => Token::Semicolon,
                    b'=' => Token::Equals,
                    b'*' => Token::Asterisk,
                    _ => Token::Dollar,
                }
            }
            b'#' => self.entity_ref(start)?,
            b'\'' => self.string(start)?,
            b'.' => self.enumeration(start)?,
            b'-' | b'+' | b'0'..=b'9' => self.number(start)?,
            b'!' | b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.keyword(),
            other => {
                return Err(StepError::lexer(
                    start.line,
                    start.col,
                    format!("unexpected character '{}'", other as char),
                ));
            }
        };

        Ok(Some(Spanned { token, pos: start }))
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.offset).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.input.get(self.offset + ahead).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.offset += 1;
        if ch == b'\n' {
            self.pos.line += 1;
            self.pos.col = 1;
        } else {
            self.pos.col += 1;
        }
        Some(ch)
    }

    /// Consume bytes while `pred` holds and return them as text.
    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> String {
        let begin = self.offset;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        // Only ASCII bytes pass the predicates used here.
        String::from_utf8_lossy(&self.input[begin..self.offset]).into_owned()
    }

    fn skip_trivia(&mut self) -> Result<(), StepError> {
        loop {
            while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
                self.bump();
            }
            if self.peek() == Some(b'/') && self.peek_at(1) == Some(b'*') {
                let start = self.pos;
                self.bump();
                self.bump();
                loop {
                    match (self.peek(), self.peek_at(1)) {
                        (Some(b'*'), Some(b'/')) => {
                            self.bump();
                            self.bump();
                            break;
                        }
                        (Some(_), _) => {
                            self.bump();
                        }
                        (None, _) => {
                            return Err(StepError::lexer(
                                start.line,
                                start.col,
                                "unterminated comment",
                            ));
                        }
                    }
                }
                continue;
            }
            return Ok(());
        }
    }

    fn entity_ref(&mut self, start: Position) -> Result<Token, StepError> {
        self.bump();
        let digits = self.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            return Err(StepError::lexer(start.line, start.col, "expected digits after '#'"));
        }
        digits
            .parse()
            .map(Token::EntityRef)
            .map_err(|_| StepError::lexer(start.line, start.col, format!("invalid entity id #{digits}")))
    }

    fn string(&mut self, start: Position) -> Result<Token, StepError> {
        self.bump();
        let mut content = Vec::new();
        loop {
            match self.bump() {
                None => {
                    return Err(StepError::lexer(start.line, start.col, "unterminated string"));
                }
                Some(b'\'') if self.peek() == Some(b'\'') => {
                    self.bump();
                    content.push(b'\'');
                }
                Some(b'\'') => break,
                Some(ch) => content.push(ch),
            }
        }
        Ok(Token::String(String::from_utf8_lossy(&content).into_owned()))
    }

    fn enumeration(&mut self, start: Position) -> Result<Token, StepError> {
        self.bump();
        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_');
        if self.bump() != Some(b'.') {
            return Err(StepError::lexer(
                start.line,
                start.col,
                format!("unterminated enumeration '.{name}'"),
            ));
        }
        if name.is_empty() {
            return Err(StepError::lexer(start.line, start.col, "empty enumeration"));
        }
        Ok(Token::Enum(name.to_ascii_uppercase()))
    }

    fn number(&mut self, start: Position) -> Result<Token, StepError> {
        let mut text = String::new();
        if let Some(sign @ (b'-' | b'+')) = self.peek() {
            self.bump();
            text.push(sign as char);
        }
        let int_part = self.take_while(|c| c.is_ascii_digit());
        if int_part.is_empty() {
            return Err(StepError::lexer(start.line, start.col, "expected digits in number"));
        }
        text.push_str(&int_part);

        let mut is_real = false;
        // A '.' after digits always belongs to the number: `1.` is a valid real.
        if self.peek() == Some(b'.') {
            is_real = true;
            self.bump();
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        if let Some(e @ (b'E' | b'e')) = self.peek() {
            is_real = true;
            self.bump();
            text.push(e as char);
            if let Some(sign @ (b'-' | b'+')) = self.peek() {
                self.bump();
                text.push(sign as char);
            }
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }

        if is_real {
            text.parse()
                .map(Token::Real)
                .map_err(|_| StepError::lexer(start.line, start.col, format!("invalid real {text}")))
        } else {
            text.parse()
                .map(Token::Integer)
                .map_err(|_| StepError::lexer(start.line, start.col, format!("invalid integer {text}")))
        }
    }

    fn keyword(&mut self) -> Token {
        let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'-' || c == b'!');
        Token::Keyword(name.to_ascii_uppercase())
    }
}

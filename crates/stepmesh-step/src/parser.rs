//! Part 21 parser: builds a raw entity graph from tokens.
//!
//! Entities are kept uninterpreted: an ID, a type name, and nested argument
//! values. Complex instances (`#7 = (A() B(1.0));`) keep every record.

use std::collections::BTreeMap;

use crate::error::StepError;
use crate::lexer::{Lexer, Position, Spanned, Token};

/// A single argument value in a STEP entity.
#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    /// Entity reference (`#123`).
    EntityRef(u64),
    /// String literal.
    String(String),
    /// Real number.
    Real(f64),
    /// Integer number.
    Integer(i64),
    /// Enumeration (`.T.`).
    Enum(String),
    /// Parenthesised list.
    List(Vec<StepValue>),
    /// Derived value (`*`).
    Derived,
    /// Unset value (`$`).
    Null,
    /// Inline typed value, e.g. `LENGTH_MEASURE(2.0)`.
    Typed {
        /// The type name.
        type_name: String,
        /// Arguments.
        args: Vec<StepValue>,
    },
}

impl StepValue {
    /// Entity reference, if this is one.
    pub fn as_entity_ref(&self) -> Option<u64> {
        match self {
            StepValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Real value; integers and single-argument typed measures are accepted.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            StepValue::Real(v) => Some(*v),
            StepValue::Integer(v) => Some(*v as f64),
            StepValue::Typed { args, .. } if args.len() == 1 => args[0].as_real(),
            _ => None,
        }
    }

    /// Integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            StepValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// String value.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            StepValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Enumeration value.
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            StepValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// List contents.
    pub fn as_list(&self) -> Option<&[StepValue]> {
        match self {
            StepValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// True for `$`.
    pub fn is_null(&self) -> bool {
        matches!(self, StepValue::Null)
    }

    /// True for `*`.
    pub fn is_derived(&self) -> bool {
        matches!(self, StepValue::Derived)
    }
}

/// One `NAME(args)` record of an entity instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Record type name.
    pub type_name: String,
    /// Record arguments.
    pub args: Vec<StepValue>,
}

/// A parsed STEP entity instance.
#[derive(Debug, Clone, PartialEq)]
pub struct StepEntity {
    /// Entity ID (from `#123`); `0` for header entities.
    pub id: u64,
    /// Type name of the first record.
    pub type_name: String,
    /// Arguments of the first record.
    pub args: Vec<StepValue>,
    /// Every record, in order; more than one for complex instances.
    pub records: Vec<Record>,
}

impl StepEntity {
    fn new(id: u64, records: Vec<Record>) -> Self {
        let (type_name, args) = records
            .first()
            .map(|r| (r.type_name.clone(), r.args.clone()))
            .unwrap_or_default();
        Self {
            id,
            type_name,
            args,
            records,
        }
    }

    /// True when this is a complex (multi-record) instance.
    pub fn is_complex(&self) -> bool {
        self.records.len() > 1
    }

    /// Find a record by type name.
    pub fn record(&self, type_name: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.type_name == type_name)
    }
}

/// The complete parsed content of a STEP file.
#[derive(Debug, Clone, Default)]
pub struct StepFile {
    /// HEADER section entities.
    pub header: Vec<StepEntity>,
    /// DATA section entities, ordered by ID.
    pub entities: BTreeMap<u64, StepEntity>,
}

impl StepFile {
    /// Get an entity by ID.
    pub fn get(&self, id: u64) -> Option<&StepEntity> {
        self.entities.get(&id)
    }

    /// Get an entity by ID, failing if it is missing.
    pub fn require(&self, id: u64) -> Result<&StepEntity, StepError> {
        self.entities.get(&id).ok_or(StepError::MissingEntity(id))
    }

    /// All entities whose first record has the given type, in ID order.
    pub fn entities_of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a StepEntity> + 'a {
        self.entities.values().filter(move |e| e.type_name == type_name)
    }

    /// Schema names declared by `FILE_SCHEMA`, if present.
    pub fn schemas(&self) -> Vec<String> {
        self.header
            .iter()
            .filter(|e| e.type_name == "FILE_SCHEMA")
            .filter_map(|e| e.args.first().and_then(|v| v.as_list()))
            .flat_map(|list| list.iter().filter_map(|v| v.as_string().map(str::to_owned)))
            .collect()
    }
}

/// Deepest list nesting accepted in an argument list.
const MAX_NESTING: usize = 256;

/// Recursive-descent parser for Part 21 files.
pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    end: Position,
    depth: usize,
}

impl Parser {
    /// Parse a STEP file from bytes.
    pub fn parse(input: &[u8]) -> Result<StepFile, StepError> {
        let lexer = Lexer::new(input);
        let tokens = lexer.tokenize()?;
        let end = tokens.last().map(|t| t.pos).unwrap_or(Position { line: 1, col: 1 });
        Parser {
            tokens,
            pos: 0,
            end,
            depth: 0,
        }
        .file()
    }

    fn file(&mut self) -> Result<StepFile, StepError> {
        let mut file = StepFile::default();

        self.expect_keyword("ISO-10303-21")?;
        self.expect(&Token::Semicolon)?;

        loop {
            let Some(keyword) = self.peek_keyword() else {
                return Err(self.error("expected section keyword"));
            };
            match keyword.as_str() {
                "HEADER" => {
                    self.advance();
                    self.expect(&Token::Semicolon)?;
                    while self.peek_keyword().is_some_and(|k| k != "ENDSEC") {
                        let record = self.record()?;
                        self.expect(&Token::Semicolon)?;
                        file.header.push(StepEntity::new(0, vec![record]));
                    }
                    self.end_section()?;
                }
                "DATA" => {
                    self.advance();
                    // DATA may carry a parameter list in edition 3 files.
                    if self.check(&Token::LParen) {
                        self.arguments()?;
                    }
                    self.expect(&Token::Semicolon)?;
                    while let Some(Token::EntityRef(id)) = self.peek().map(|t| &t.token) {
                        let id = *id;
                        self.advance();
                        self.expect(&Token::Equals)?;
                        let entity = self.instance(id)?;
                        if file.entities.insert(id, entity).is_some() {
                            return Err(StepError::DuplicateEntity(id));
                        }
                    }
                    self.end_section()?;
                }
                "END-ISO-10303-21" => {
                    self.advance();
                    self.expect(&Token::Semicolon)?;
                    return Ok(file);
                }
                other => {
                    return Err(self.error(format!("unexpected section '{other}'")));
                }
            }
        }
    }

    fn end_section(&mut self) -> Result<(), StepError> {
        self.expect_keyword("ENDSEC")?;
        self.expect(&Token::Semicolon)
    }

    /// `NAME(args);` or `(A(args) B(args));`
    fn instance(&mut self, id: u64) -> Result<StepEntity, StepError> {
        let records = if self.check(&Token::LParen) {
            self.advance();
            let mut records = Vec::new();
            while !self.check(&Token::RParen) {
                records.push(self.record()?);
            }
            self.advance();
            if records.is_empty() {
                return Err(self.error(format!("empty complex instance #{id}")));
            }
            records
        } else {
            vec![self.record()?]
        };
        self.expect(&Token::Semicolon)?;
        Ok(StepEntity::new(id, records))
    }

    fn record(&mut self) -> Result<Record, StepError> {
        let Some(type_name) = self.peek_keyword() else {
            return Err(self.error("expected entity type name"));
        };
        self.advance();
        let args = self.arguments()?;
        Ok(Record { type_name, args })
    }

    fn arguments(&mut self) -> Result<Vec<StepValue>, StepError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(format!("argument lists nested deeper than {MAX_NESTING}")));
        }
        self.depth += 1;
        let args = self.argument_list();
        self.depth -= 1;
        args
    }

    fn argument_list(&mut self) -> Result<Vec<StepValue>, StepError> {
        self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        if !self.check(&Token::RParen) {
            args.push(self.value()?);
            while self.check(&Token::Comma) {
                self.advance();
                args.push(self.value()?);
            }
        }
        self.expect(&Token::RParen)?;
        Ok(args)
    }

    fn value(&mut self) -> Result<StepValue, StepError> {
        let Some(spanned) = self.peek() else {
            return Err(self.error("unexpected end of input in argument list"));
        };
        let value = match &spanned.token {
            Token::EntityRef(id) => StepValue::EntityRef(*id),
            Token::String(s) => StepValue::String(s.clone()),
            Token::Real(v) => StepValue::Real(*v),
            Token::Integer(v) => StepValue::Integer(*v),
            Token::Enum(s) => StepValue::Enum(s.clone()),
            Token::Asterisk => StepValue::Derived,
            Token::Dollar => StepValue::Null,
            Token::LParen => return self.arguments().map(StepValue::List),
            Token::Keyword(_) => {
                let Record { type_name, args } = self.record()?;
                return Ok(StepValue::Typed { type_name, args });
            }
            other => {
                let message = format!("unexpected {other:?} in argument list");
                return Err(self.error(message));
            }
        };
        self.advance();
        Ok(value)
    }

    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek_keyword(&self) -> Option<String> {
        match self.peek() {
            Some(Spanned {
                token: Token::Keyword(k),
                ..
            }) => Some(k.clone()),
            _ => None,
        }
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn check(&self, expected: &Token) -> bool {
        self.peek().is_some_and(|t| &t.token == expected)
    }

    fn expect(&mut self, expected: &Token) -> Result<(), StepError> {
        if self.check(expected) {
            self.advance();
            Ok(())
        } else {
            let found = self.peek().map(|t| format!("{:?}", t.token));
            Err(self.error(format!(
                "expected {expected:?}, found {}",
                found.as_deref().unwrap_or("end of input")
            )))
        }
    }

    fn expect_keyword(&mut self, name: &str) -> Result<(), StepError> {
        if self.peek_keyword().as_deref() == Some(name) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected keyword {name}")))
        }
    }

    fn error(&self, message: impl Into<String>) -> StepError {
        let pos = self.peek().map(|t| t.pos).unwrap_or(self.end);
        StepError::syntax(pos.line, pos.col, message)
    }
}

// Path expression parser
//
// Accepts the small dialect documented on `crate::ast::Segment`: member access,
// indices, slices, wildcards and descendant steps. Filters and unions are not
// part of the dialect.

use crate::ast::{is_name_char, PathExpr, Segment};
use thiserror::Error;

/// Parser errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParserError {
    #[error("Path must start with the root '$'")]
    MissingRoot,

    #[error("Unexpected character '{found}' at position {position}")]
    UnexpectedChar { found: char, position: usize },

    #[error("Unexpected end of path")]
    UnexpectedEnd,

    #[error("Expected a member name at position {0}")]
    ExpectedName(usize),

    #[error("Invalid array index: {0}")]
    InvalidIndex(String),

    #[error("Unclosed string literal")]
    UnclosedString,

    #[error("Slice step cannot be zero")]
    ZeroStep,
}

/// Recursive-descent parser over the characters of one path string
pub struct PathParser {
    input: Vec<char>,
    position: usize,
}

impl PathParser {
    pub fn new(input: &str) -> Self {
        PathParser {
            input: input.trim().chars().collect(),
            position: 0,
        }
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if self.position < self.input.len() {
            self.position += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn unexpected(&self) -> ParserError {
        match self.current() {
            Some(found) => ParserError::UnexpectedChar {
                found,
                position: self.position,
            },
            None => ParserError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParserError> {
        if self.current() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Parse the whole input into a [`PathExpr`].
    pub fn parse(&mut self) -> Result<PathExpr, ParserError> {
        if self.current() != Some('$') {
            return Err(ParserError::MissingRoot);
        }
        self.advance();

        let mut segments = Vec::new();
        while let Some(ch) = self.current() {
            let segment = match ch {
                '.' if self.peek(1) == Some('.') => {
                    self.advance();
                    self.advance();
                    self.parse_descendant()?
                }
                '.' => {
                    self.advance();
                    if self.current() == Some('*') {
                        self.advance();
                        Segment::Wildcard
                    } else {
                        Segment::Child(self.read_name()?)
                    }
                }
                '[' => self.parse_bracket()?,
                _ => return Err(self.unexpected()),
            };
            segments.push(segment);
        }

        Ok(PathExpr::new(segments))
    }

    fn parse_descendant(&mut self) -> Result<Segment, ParserError> {
        match self.current() {
            Some('*') => {
                self.advance();
                Ok(Segment::DescendantWildcard)
            }
            Some('[') => match self.parse_bracket()? {
                Segment::Child(key) => Ok(Segment::Descendant(key)),
                Segment::Wildcard => Ok(Segment::DescendantWildcard),
                // `..[0]` and `..[1:2]` are outside the dialect
                _ => Err(ParserError::InvalidIndex(
                    "indices are not supported after '..'".to_string(),
                )),
            },
            _ => Ok(Segment::Descendant(self.read_name()?)),
        }
    }

    fn read_name(&mut self) -> Result<String, ParserError> {
        let start = self.position;
        let mut name = String::new();
        while let Some(ch) = self.current() {
            if !is_name_char(ch) {
                break;
            }
            name.push(ch);
            self.advance();
        }
        if name.is_empty() {
            return match self.current() {
                Some(_) => Err(ParserError::ExpectedName(start)),
                None => Err(ParserError::UnexpectedEnd),
            };
        }
        Ok(name)
    }

    fn parse_bracket(&mut self) -> Result<Segment, ParserError> {
        self.expect('[')?;
        self.skip_whitespace();

        let segment = match self.current() {
            Some('*') => {
                self.advance();
                Segment::Wildcard
            }
            Some(quote @ ('\'' | '"')) => Segment::Child(self.read_quoted(quote)?),
            Some(ch) if ch == '-' || ch == ':' || ch.is_ascii_digit() => {
                self.parse_index_or_slice()?
            }
            _ => return Err(self.unexpected()),
        };

        self.skip_whitespace();
        self.expect(']')?;
        Ok(segment)
    }

    fn read_quoted(&mut self, quote: char) -> Result<String, ParserError> {
        let mut result = String::new();
        self.advance(); // opening quote

        loop {
            match self.current() {
                None => return Err(ParserError::UnclosedString),
                Some(ch) if ch == quote => {
                    self.advance();
                    return Ok(result);
                }
                Some('\\') => {
                    self.advance();
                    match self.current() {
                        None => return Err(ParserError::UnclosedString),
                        Some(escaped) => {
                            result.push(escaped);
                            self.advance();
                        }
                    }
                }
                Some(ch) => {
                    result.push(ch);
                    self.advance();
                }
            }
        }
    }

    fn parse_index_or_slice(&mut self) -> Result<Segment, ParserError> {
        let first = self.read_integer()?;
        self.skip_whitespace();

        if self.current() != Some(':') {
            return match first {
                Some(index) => Ok(Segment::Index(index)),
                None => Err(ParserError::InvalidIndex(String::new())),
            };
        }

        self.advance();
        self.skip_whitespace();
        let end = self.read_integer()?;
        self.skip_whitespace();

        let step = if self.current() == Some(':') {
            self.advance();
            self.skip_whitespace();
            self.read_integer()?
        } else {
            None
        };
        if step == Some(0) {
            return Err(ParserError::ZeroStep);
        }

        Ok(Segment::Slice {
            start: first,
            end,
            step,
        })
    }

    fn read_integer(&mut self) -> Result<Option<i64>, ParserError> {
        let mut text = String::new();
        if self.current() == Some('-') {
            text.push('-');
            self.advance();
        }
        while let Some(ch) = self.current() {
            if !ch.is_ascii_digit() {
                break;
            }
            text.push(ch);
            self.advance();
        }
        if text.is_empty() {
            return Ok(None);
        }
        text.parse::<i64>()
            .map(Some)
            .map_err(|_| ParserError::InvalidIndex(text))
    }
}

/// Parse a path string such as `$.store.book[0].title`.
pub fn parse(path: &str) -> Result<PathExpr, ParserError> {
    PathParser::new(path).parse()
}

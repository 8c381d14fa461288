//! Context path parsing and formatting.
//!
//! Paths use the dotted/bracketed notation of binding expressions:
//! `user.address.street`, `items[0].name`, `map['key with.dots']`, `items.0`.

use crate::error::PathError;
use crate::types::{is_valid_index, PathStep};

/// Parse a context path into steps.
///
/// The empty string is the root path.
///
/// # Example
///
/// ```
/// use beagle_context::{parse_path, PathStep};
///
/// assert_eq!(parse_path("").unwrap(), vec![]);
/// assert_eq!(
///     parse_path("items[1].name").unwrap(),
///     vec![PathStep::from("items"), PathStep::Index(1), PathStep::from("name")]
/// );
/// assert!(parse_path("items[1").is_err());
/// ```
pub fn parse_path(path: &str) -> Result<Vec<PathStep>, PathError> {
    PathParser::new(path).parse()
}

/// Format steps back into path text.
///
/// Keys that cannot be written in dotted form are emitted in bracket form.
///
/// # Example
///
/// ```
/// use beagle_context::{format_path, PathStep};
///
/// let steps = vec![PathStep::from("a"), PathStep::Index(2), PathStep::from("b.c")];
/// assert_eq!(format_path(&steps), "a[2]['b.c']");
/// ```
pub fn format_path(path: &[PathStep]) -> String {
    let mut out = String::new();
    for step in path {
        match step {
            PathStep::Index(idx) => {
                out.push('[');
                out.push_str(&idx.to_string());
                out.push(']');
            }
            PathStep::Key(key) if is_plain_key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathStep::Key(key) => {
                out.push_str("['");
                out.push_str(&key.replace('\\', "\\\\").replace('\'', "\\'"));
                out.push_str("']");
            }
        }
    }
    out
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(is_key_char)
}

pub(crate) fn is_key_char(c: char) -> bool {
    !matches!(c, '.' | '[' | ']' | '\'' | '"' | '(' | ')' | ',' | '{' | '}') && !c.is_whitespace()
}

/// Hand-written cursor over path text.
pub(crate) struct PathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> PathParser<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse(mut self) -> Result<Vec<PathStep>, PathError> {
        let mut steps = Vec::new();
        if self.input.is_empty() {
            return Ok(steps);
        }

        match self.peek() {
            Some('[') => steps.push(self.parse_bracket()?),
            _ => steps.push(PathStep::Key(self.parse_key()?)),
        }

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.advance();
                    steps.push(PathStep::Key(self.parse_key()?));
                }
                '[' => steps.push(self.parse_bracket()?),
                other => {
                    return Err(PathError::UnexpectedChar {
                        ch: other,
                        position: self.pos,
                    })
                }
            }
        }
        Ok(steps)
    }

    fn parse_key(&mut self) -> Result<String, PathError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_key_char(c) {
                self.advance();
            } else {
                break;
            }
        }
        if self.pos == start {
            return match self.peek() {
                None | Some('.') | Some('[') => Err(PathError::EmptySegment(start)),
                Some(ch) => Err(PathError::UnexpectedChar { ch, position: start }),
            };
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_bracket(&mut self) -> Result<PathStep, PathError> {
        let open = self.pos;
        self.advance();
        let step = match self.peek() {
            Some(quote @ ('\'' | '"')) => PathStep::Key(self.parse_quoted(quote)?),
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
                    self.advance();
                }
                let digits = &self.input[start..self.pos];
                if !is_valid_index(digits) {
                    return Err(PathError::InvalidIndex(digits.to_string()));
                }
                let idx = digits
                    .parse::<usize>()
                    .map_err(|_| PathError::InvalidIndex(digits.to_string()))?;
                PathStep::Index(idx)
            }
            None => return Err(PathError::UnclosedBracket(open)),
            Some(']') => return Err(PathError::EmptySegment(self.pos)),
            Some(ch) => {
                return Err(PathError::UnexpectedChar {
                    ch,
                    position: self.pos,
                })
            }
        };
        match self.peek() {
            Some(']') => {
                self.advance();
                Ok(step)
            }
            None => Err(PathError::UnclosedBracket(open)),
            Some(ch) => Err(PathError::UnexpectedChar {
                ch,
                position: self.pos,
            }),
        }
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, PathError> {
        let start = self.pos;
        self.advance();
        let mut result = String::new();
        loop {
            match self.peek() {
                None => return Err(PathError::UnclosedString(start)),
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some(escaped) => {
                            result.push(escaped);
                            self.advance();
                        }
                        None => return Err(PathError::UnclosedString(start)),
                    }
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }
}

//! Tokenizer for `@{…}` binding templates.
//!
//! A template is free text with embedded expressions:
//!
//! ```text
//! Hello @{user.name}, you have @{length(cart.items)} items
//! ```
//!
//! Inside `@{…}` the grammar is small:
//!
//! ```text
//! token    := literal | call | lookup
//! literal  := number | 'string' | true | false | null
//! call     := name '(' [token (',' token)*] ')'
//! lookup   := id ( '.' key | '[' index ']' | '[' 'key' ']' )*
//! ```
//!
//! A `@{` preceded by an odd number of backslashes is literal text; every
//! pair of backslashes in front of `@{` renders as one backslash.

use crate::error::ParseError;
use crate::token::{BindingToken, Fragment, ParsedExpression, Token};
use beagle_context::{parse_path, PathStep};
use regex::Regex;
use serde_json::{Number, Value};
use std::sync::OnceLock;

fn expression_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(\\*)@\{((?:[^'"}]|'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*")*)\}"#).unwrap()
    })
}

/// Extract every unescaped `@{…}` occurrence from `text`.
///
/// # Example
///
/// ```
/// use beagle_expression::get_expressions;
///
/// assert!(get_expressions("plain").is_empty());
/// assert_eq!(get_expressions("@{a} and @{b.c}"), vec!["@{a}", "@{b.c}"]);
/// assert_eq!(get_expressions(r"\@{escaped} @{real}"), vec!["@{real}"]);
/// ```
pub fn get_expressions(text: &str) -> Vec<String> {
    expression_regex()
        .captures_iter(text)
        .filter(|caps| caps[1].len() % 2 == 0)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(whole.as_str()[caps[1].len()..].to_string())
        })
        .collect()
}

/// Tokenize a template string.
///
/// # Example
///
/// ```
/// use beagle_expression::{parse, Token};
///
/// let parsed = parse("@{sum(a.b, 1)}").unwrap();
/// assert!(matches!(parsed.single_token(), Some(Token::Function { name, .. }) if name == "sum"));
/// assert!(parse("@{a[0}").is_err());
/// ```
pub fn parse(expression: &str) -> Result<ParsedExpression, ParseError> {
    let mut fragments = Vec::new();
    let mut text = String::new();
    let mut last = 0;

    for caps in expression_regex().captures_iter(expression) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let slashes = caps[1].len();
        let gap = &expression[last..whole.start()];
        check_no_open_expression(gap, last)?;
        text.push_str(gap);
        text.push_str(&"\\".repeat(slashes / 2));

        if slashes % 2 == 1 {
            text.push_str(&whole.as_str()[slashes..]);
        } else {
            if !text.is_empty() {
                fragments.push(Fragment::Text(std::mem::take(&mut text)));
            }
            let token = ExpressionParser::parse(body.as_str())?;
            fragments.push(Fragment::Token(token));
        }
        last = whole.end();
    }

    let rest = &expression[last..];
    check_no_open_expression(rest, last)?;
    text.push_str(rest);
    if !text.is_empty() {
        fragments.push(Fragment::Text(text));
    }

    Ok(ParsedExpression::new(expression, fragments))
}

/// A `@{` that the expression regex did not consume was never closed.
fn check_no_open_expression(text: &str, offset: usize) -> Result<(), ParseError> {
    let mut search = 0;
    while let Some(found) = text[search..].find("@{") {
        let at = search + found;
        let slashes = text[..at].chars().rev().take_while(|c| *c == '\\').count();
        if slashes % 2 == 0 {
            return Err(ParseError::UnclosedExpression(offset + at));
        }
        search = at + 2;
    }
    Ok(())
}

/// Recursive-descent parser for the body of one `@{…}`.
pub struct ExpressionParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ExpressionParser<'a> {
    /// Parse the text between `@{` and `}`.
    pub fn parse(input: &'a str) -> Result<Token, ParseError> {
        let mut parser = Self { input, pos: 0 };
        parser.skip_whitespace();
        if parser.is_at_end() {
            return Err(ParseError::EmptyExpression);
        }
        let token = parser.parse_token()?;
        parser.skip_whitespace();
        match parser.peek() {
            None => Ok(token),
            Some(ch) => Err(ParseError::UnexpectedChar {
                ch,
                position: parser.pos,
            }),
        }
    }

    fn parse_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(ParseError::UnexpectedEnd),
            Some(quote @ ('\'' | '"')) => Ok(Token::Literal(Value::String(self.parse_string(quote)?))),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some(c) if is_identifier_char(c) => self.parse_identifier_token(),
            Some(ch) => Err(ParseError::UnexpectedChar {
                ch,
                position: self.pos,
            }),
        }
    }

    fn parse_identifier_token(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        let name = self.parse_identifier();

        match self.peek() {
            Some('(') => return self.parse_call(name),
            Some('.') | Some('[') => {}
            _ => match name.as_str() {
                "true" => return Ok(Token::Literal(Value::Bool(true))),
                "false" => return Ok(Token::Literal(Value::Bool(false))),
                "null" => return Ok(Token::Literal(Value::Null)),
                _ => {}
            },
        }

        self.skip_path_tail()?;
        let mut steps = parse_path(&self.input[start..self.pos])?.into_iter();
        match steps.next() {
            Some(PathStep::Key(context_id)) => Ok(Token::Binding(BindingToken::new(context_id, steps.collect()))),
            _ => Err(ParseError::UnexpectedChar {
                ch: self.input[start..].chars().next().unwrap_or('\0'),
                position: start,
            }),
        }
    }

    /// Advance over `.key` and `[...]` steps following a context id; the text
    /// itself is handed to the path parser.
    fn skip_path_tail(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some('.') => {
                    self.advance();
                    self.parse_identifier();
                }
                Some('[') => {
                    let open = self.pos;
                    self.advance();
                    loop {
                        match self.peek() {
                            None => return Err(ParseError::UnclosedBracket(open)),
                            Some(']') => {
                                self.advance();
                                break;
                            }
                            Some(quote @ ('\'' | '"')) => {
                                self.parse_string(quote)?;
                            }
                            Some(_) => self.advance(),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_call(&mut self, name: String) -> Result<Token, ParseError> {
        self.advance();
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.advance();
            return Ok(Token::Function { name, args });
        }
        loop {
            args.push(self.parse_token()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.advance(),
                Some(')') => {
                    self.advance();
                    return Ok(Token::Function { name, args });
                }
                None => return Err(ParseError::UnclosedCall(name)),
                Some(ch) => {
                    return Err(ParseError::UnexpectedChar {
                        ch,
                        position: self.pos,
                    })
                }
            }
        }
    }

    fn parse_number(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        self.skip_digits();
        let mut is_float = false;
        if self.peek() == Some('.') {
            is_float = true;
            self.advance();
            self.skip_digits();
        }
        let text = &self.input[start..self.pos];
        let invalid = || ParseError::InvalidNumber(text.to_string());
        if text.ends_with('.') || text == "-" || text.starts_with("-.") {
            return Err(invalid());
        }
        if matches!(self.peek(), Some(c) if is_identifier_char(c)) {
            return Err(ParseError::UnexpectedChar {
                ch: self.peek().unwrap_or('\0'),
                position: self.pos,
            });
        }
        let number = if is_float {
            text.parse::<f64>().ok().and_then(Number::from_f64).ok_or_else(invalid)?
        } else {
            Number::from(text.parse::<i64>().map_err(|_| invalid())?)
        };
        Ok(Token::Literal(Value::Number(number)))
    }

    fn parse_string(&mut self, quote: char) -> Result<String, ParseError> {
        let start = self.pos;
        self.advance();
        let mut result = String::new();
        loop {
            match self.peek() {
                None => return Err(ParseError::UnclosedString(start)),
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some(escaped) => result.push(escaped),
                        None => return Err(ParseError::UnclosedString(start)),
                    }
                    self.advance();
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }
    }

    fn parse_identifier(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_identifier_char(c)) {
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
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

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(text: &str) -> Token {
        ExpressionParser::parse(text).unwrap()
    }

    fn binding(id: &str, path: Vec<PathStep>) -> Token {
        Token::Binding(BindingToken::new(id, path))
    }

    #[test]
    fn parses_literals() {
        assert_eq!(token("1"), Token::Literal(json!(1)));
        assert_eq!(token("-2"), Token::Literal(json!(-2)));
        assert_eq!(token("1.5"), Token::Literal(json!(1.5)));
        assert_eq!(token("'it\\'s'"), Token::Literal(json!("it's")));
        assert_eq!(token("true"), Token::Literal(json!(true)));
        assert_eq!(token(" null "), Token::Literal(json!(null)));
    }

    #[test]
    fn integer_and_decimal_literals_stay_distinct() {
        assert_ne!(token("1"), token("1.0"));
    }

    #[test]
    fn parses_lookups() {
        assert_eq!(token("user"), binding("user", vec![]));
        assert_eq!(
            token("user.items[0]['first name']"),
            binding(
                "user",
                vec![PathStep::from("items"), PathStep::Index(0), PathStep::from("first name")]
            )
        );
        assert_eq!(
            token("onPress.value"),
            binding("onPress", vec![PathStep::from("value")])
        );
    }

    #[test]
    fn parses_nested_calls() {
        assert_eq!(
            token("sum(a, gt(b.c, 2), 'x')"),
            Token::Function {
                name: "sum".into(),
                args: vec![
                    binding("a", vec![]),
                    Token::Function {
                        name: "gt".into(),
                        args: vec![binding("b", vec![PathStep::from("c")]), Token::Literal(json!(2))],
                    },
                    Token::Literal(json!("x")),
                ],
            }
        );
        assert_eq!(
            token("now()"),
            Token::Function {
                name: "now".into(),
                args: vec![]
            }
        );
    }

    #[test]
    fn rejects_malformed_bodies() {
        assert_eq!(ExpressionParser::parse(""), Err(ParseError::EmptyExpression));
        assert_eq!(ExpressionParser::parse("a[0"), Err(ParseError::UnclosedBracket(1)));
        assert_eq!(
            ExpressionParser::parse("sum(a, b"),
            Err(ParseError::UnclosedCall("sum".into()))
        );
        assert!(matches!(
            ExpressionParser::parse("a b"),
            Err(ParseError::UnexpectedChar { ch: 'b', .. })
        ));
        assert!(matches!(
            ExpressionParser::parse("sum(a))"),
            Err(ParseError::UnexpectedChar { ch: ')', .. })
        ));
        assert_eq!(ExpressionParser::parse("'abc"), Err(ParseError::UnclosedString(0)));
        assert_eq!(ExpressionParser::parse("1."), Err(ParseError::InvalidNumber("1.".into())));
        assert!(matches!(ExpressionParser::parse("a..b"), Err(ParseError::Path(_))));
    }

    #[test]
    fn template_splits_text_and_tokens() {
        let parsed = parse("Hi @{user.name}!").unwrap();
        assert_eq!(
            parsed.fragments(),
            &[
                Fragment::Text("Hi ".into()),
                Fragment::Token(binding("user", vec![PathStep::from("name")])),
                Fragment::Text("!".into()),
            ]
        );
        assert!(parsed.single_token().is_none());
        assert!(parse("@{user.name}").unwrap().single_token().is_some());
    }

    #[test]
    fn closing_brace_inside_string_does_not_end_expression() {
        let parsed = parse("@{concat('}', a)}").unwrap();
        assert!(matches!(parsed.single_token(), Some(Token::Function { args, .. }) if args.len() == 2));
    }

    #[test]
    fn closing_brace_inside_double_quotes_does_not_end_expression() {
        let parsed = parse(r#"@{concat("}", a)}"#).unwrap();
        assert!(matches!(parsed.single_token(), Some(Token::Function { args, .. })
            if args[0] == Token::Literal(json!("}"))));
        assert_eq!(get_expressions(r#"x @{concat("}", a)} y"#), vec![r#"@{concat("}", a)}"#]);
    }

    #[test]
    fn backslashes_escape_expressions() {
        let parsed = parse(r"\@{a}").unwrap();
        assert_eq!(parsed.fragments(), &[Fragment::Text("@{a}".into())]);

        let parsed = parse(r"\\@{a}").unwrap();
        assert_eq!(
            parsed.fragments(),
            &[Fragment::Text("\\".into()), Fragment::Token(binding("a", vec![]))]
        );
    }

    #[test]
    fn unclosed_template_expression_fails() {
        assert_eq!(parse("Hi @{user.name"), Err(ParseError::UnclosedExpression(3)));
        assert!(parse(r"Hi \@{user.name").is_ok());
    }
}

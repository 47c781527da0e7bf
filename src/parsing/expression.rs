//! Parser for the content of a `#{...}` parameter reference.
//!
//! ```text
//! id
//! id:INTEGER
//! author.name, jdbcType=VARCHAR, mode=IN
//! (expression), javaType=int
//! ```

use nom::{
    IResult, Parser,
    bytes::complete::{is_not, take_while},
    character::complete::{char, multispace0},
    combinator::opt,
    multi::many0,
    sequence::preceded,
};

use crate::error::{BindError, BindResult};

/// The pieces of a parameter reference, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterExpression {
    /// Property path, or `None` for a parenthesized expression.
    pub property: Option<String>,
    /// Content of a parenthesized expression.
    pub expression: Option<String>,
    /// The `:TYPE` shorthand.
    pub jdbc_type: Option<String>,
    /// `key=value` options after the first comma.
    pub options: Vec<(String, String)>,
}

impl ParameterExpression {
    pub fn parse(content: &str) -> BindResult<Self> {
        match parse_expression(content) {
            Ok((remaining, parsed)) if remaining.trim().is_empty() => Ok(parsed),
            Ok((remaining, _)) => Err(BindError::builder(format!(
                "Parsing error in {{{}}} in position {}",
                content,
                content.len() - remaining.len()
            ))),
            Err(e) => Err(BindError::builder(format!(
                "Parsing error in {{{}}}: {:?}",
                content, e
            ))),
        }
    }

    /// Value of option `key`, the `:TYPE` shorthand counting as `jdbcType`.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .or_else(|| (key == "jdbcType").then_some(self.jdbc_type.as_deref()).flatten())
    }
}

fn parse_expression(input: &str) -> IResult<&str, ParameterExpression> {
    let (input, _) = multispace0(input)?;
    let (input, (property, expression)) = if input.starts_with('(') {
        let (input, inner) = parenthesized(input)?;
        (input, (None, Some(inner.trim().to_string())))
    } else {
        let (input, name) = is_not(",:").parse(input)?;
        (input, (Some(name.trim().to_string()), None))
    };
    let (input, _) = multispace0(input)?;
    let (input, jdbc_type) = opt(preceded(char(':'), is_not(","))).parse(input)?;
    let (input, options) = many0(preceded(char(','), option)).parse(input)?;

    Ok((
        input,
        ParameterExpression {
            property,
            expression,
            jdbc_type: jdbc_type.map(|t| t.trim().to_string()),
            options,
        },
    ))
}

/// `(...)` with nested parentheses balanced.
fn parenthesized(input: &str) -> IResult<&str, &str> {
    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[i + 1..], &input[1..i]));
                }
            }
            _ => {}
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

/// One `key = value` option.
fn option(input: &str) -> IResult<&str, (String, String)> {
    let (input, _) = multispace0(input)?;
    let (input, key) = take_while(|c: char| c != '=' && c != ',').parse(input)?;
    let (input, value) = opt(preceded(char('='), is_not(","))).parse(input)?;
    Ok((
        input,
        (
            key.trim().to_string(),
            value.map(|v| v.trim().to_string()).unwrap_or_default(),
        ),
    ))
}

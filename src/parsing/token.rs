//! Delimited token scanner for SQL templates.
//!
//! Finds `open ... close` pairs (by default `#{` and `}`) in a single left to
//! right pass and replaces each one with whatever the handler returns:
//!
//! ```text
//! select * from t where id = #{id} and tag = '\#{literal}'
//! ```
//!
//! A backslash directly before an open marker keeps the marker as text. Inside
//! an expression, a backslash before a close marker makes the close marker part
//! of the expression. An expression without a close marker is kept verbatim.

use crate::error::BindResult;

/// Receives the content of every delimited expression.
pub trait TokenHandler {
    fn handle_token(&mut self, content: &str) -> BindResult<String>;
}

impl<F> TokenHandler for F
where
    F: FnMut(&str) -> BindResult<String>,
{
    fn handle_token(&mut self, content: &str) -> BindResult<String> {
        self(content)
    }
}

/// Scanner for one pair of markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParser {
    open: String,
    close: String,
}

impl Default for TokenParser {
    fn default() -> Self {
        Self::new("#{", "}")
    }
}

impl TokenParser {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn open_token(&self) -> &str {
        &self.open
    }

    pub fn close_token(&self) -> &str {
        &self.close
    }

    /// Replace every delimited expression in `text` with the handler's output.
    ///
    /// The first handler error aborts the scan.
    pub fn parse<H>(&self, text: &str, handler: &mut H) -> BindResult<String>
    where
        H: TokenHandler + ?Sized,
    {
        if text.is_empty() {
            return Ok(String::new());
        }
        if self.open.is_empty() || self.close.is_empty() {
            return Ok(text.to_string());
        }
        let Some(mut start) = text.find(&self.open) else {
            return Ok(text.to_string());
        };

        let bytes = text.as_bytes();
        let mut offset = 0;
        let mut out = String::with_capacity(text.len());
        let mut expression = String::new();

        loop {
            if start > 0 && bytes[start - 1] == b'\\' {
                // escaped open marker
                out.push_str(&text[offset..start - 1]);
                out.push_str(&self.open);
                offset = start + self.open.len();
            } else {
                expression.clear();
                out.push_str(&text[offset..start]);
                offset = start + self.open.len();

                let mut end = find_from(text, &self.close, offset);
                while let Some(close_at) = end {
                    if close_at <= offset || bytes[close_at - 1] != b'\\' {
                        expression.push_str(&text[offset..close_at]);
                        break;
                    }
                    // escaped close marker
                    expression.push_str(&text[offset..close_at - 1]);
                    expression.push_str(&self.close);
                    offset = close_at + self.close.len();
                    end = find_from(text, &self.close, offset);
                }

                match end {
                    None => {
                        out.push_str(&text[start..]);
                        offset = text.len();
                    }
                    Some(close_at) => {
                        out.push_str(&handler.handle_token(&expression)?);
                        offset = close_at + self.close.len();
                    }
                }
            }

            match find_from(text, &self.open, offset) {
                Some(next) => start = next,
                None => break,
            }
        }

        if offset < text.len() {
            out.push_str(&text[offset..]);
        }
        Ok(out)
    }
}

fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack.get(from..)?.find(needle).map(|i| i + from)
}

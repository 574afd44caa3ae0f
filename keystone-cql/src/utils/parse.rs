//! Helpers for hand-written recursive-descent parsers of CQL text:
//! type names in schema rows and value literals accepted by codecs.

use std::fmt::Display;

/// An error that can occur during parsing.
#[derive(Copy, Clone, Debug)]
pub struct ParseError {
    remaining: usize,
    cause: ParseErrorCause,
}

impl ParseError {
    /// Given the original string, returns the 1-based position
    /// of the error in characters.
    /// If an incorrect string was given, the function may return None.
    pub fn calculate_position(&self, original: &str) -> Option<usize> {
        calculate_position(original, self.remaining)
    }

    /// Returns the error cause.
    pub fn get_cause(&self) -> ParseErrorCause {
        self.cause
    }
}

/// Cause of the parsing error.
/// Should be lightweight so that it can be quickly discarded.
#[derive(Copy, Clone, Debug)]
pub enum ParseErrorCause {
    Expected(&'static str),
    Other(&'static str),
}

impl Display for ParseErrorCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorCause::Expected(e) => write!(f, "expected {:?}", e),
            ParseErrorCause::Other(e) => f.write_str(e),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// A utility class for building simple recursive-descent parsers.
///
/// Basically, a wrapper over &str with nice methods that help with parsing.
#[derive(Clone, Copy, Debug)]
#[must_use]
pub struct ParserState<'s> {
    s: &'s str,
}

impl<'s> ParserState<'s> {
    /// Creates a new parser from given input string.
    pub fn new(s: &'s str) -> Self {
        Self { s }
    }

    /// Applies given parsing function until it returns false
    /// and returns the final parser state.
    pub fn parse_while(
        self,
        mut parser: impl FnMut(Self) -> ParseResult<(bool, Self)>,
    ) -> ParseResult<Self> {
        let mut me = self;
        loop {
            let (proceed, new_me) = parser(me)?;
            if !proceed {
                return Ok(new_me);
            }
            me = new_me;
        }
    }

    /// If the input string contains given string at the beginning,
    /// returns a new parser state with given string skipped.
    /// Otherwise, returns an error.
    pub fn accept(self, part: &'static str) -> ParseResult<Self> {
        match self.s.strip_prefix(part) {
            Some(s) => Ok(Self { s }),
            None => Err(self.error(ParseErrorCause::Expected(part))),
        }
    }

    /// Returns new parser state with whitespace skipped from the beginning.
    pub fn skip_white(self) -> Self {
        let (_, me) = self.take_while(char::is_whitespace);
        me
    }

    /// Returns the next character without consuming it.
    pub fn peek(self) -> Option<char> {
        self.s.chars().next()
    }

    /// Parses a sequence of digits as an unsigned 16-bit integer.
    pub fn parse_u16(self) -> ParseResult<(u16, Self)> {
        let (digits, p) = self.take_while(|c| c.is_ascii_digit());
        if let Ok(value) = digits.parse() {
            Ok((value, p))
        } else {
            Err(p.error(ParseErrorCause::Other("Expected 16-bit unsigned integer")))
        }
    }

    /// Skips characters from the beginning while they satisfy given predicate
    /// and returns the skipped prefix together with the new parser state.
    pub fn take_while(self, mut pred: impl FnMut(char) -> bool) -> (&'s str, Self) {
        let idx = self.s.find(move |c| !pred(c)).unwrap_or(self.s.len());
        let new = Self { s: &self.s[idx..] };
        (&self.s[..idx], new)
    }

    /// Consumes a single CQL value literal and returns its text.
    ///
    /// Recognized forms:
    /// * a string literal in single quotes, with `''` as an escaped quote,
    /// * a quoted identifier in double quotes, with `""` as an escaped quote,
    /// * a bracketed value (`[...]`, `{...}`, `(...)`), with arbitrary nesting
    ///   and quoted strings inside,
    /// * otherwise, a run of identifier-like characters (letters, digits,
    ///   `-`, `+`, `.`, `_`, `&`), which covers numbers, booleans and `NULL`.
    pub fn take_cql_value(self) -> ParseResult<(&'s str, Self)> {
        let end = match self.peek() {
            Some(quote @ ('\'' | '"')) => self.quoted_len(quote, 0)?,
            Some('[' | '{' | '(') => self.bracketed_len()?,
            _ => {
                let (tok, p) = self.take_while(is_cql_value_char);
                if tok.is_empty() {
                    return Err(p.error(ParseErrorCause::Other("expected a CQL value")));
                }
                tok.len()
            }
        };
        Ok((&self.s[..end], Self { s: &self.s[end..] }))
    }

    // Returns the byte index right after the closing quote of a quoted
    // section starting at `start`.
    fn quoted_len(self, quote: char, start: usize) -> ParseResult<usize> {
        let bytes = self.s.as_bytes();
        let quote = quote as u8;
        let mut idx = start + 1;
        while idx < bytes.len() {
            if bytes[idx] == quote {
                if bytes.get(idx + 1) == Some(&quote) {
                    idx += 2;
                    continue;
                }
                return Ok(idx + 1);
            }
            idx += 1;
        }
        Err(self.error_at(start, ParseErrorCause::Other("unterminated quoted value")))
    }

    fn bracketed_len(self) -> ParseResult<usize> {
        let bytes = self.s.as_bytes();
        let mut stack = Vec::new();
        let mut idx = 0;
        while idx < bytes.len() {
            match bytes[idx] {
                c @ (b'\'' | b'"') => {
                    idx = self.quoted_len(c as char, idx)?;
                    continue;
                }
                b'[' => stack.push(b']'),
                b'{' => stack.push(b'}'),
                b'(' => stack.push(b')'),
                c @ (b']' | b'}' | b')') => {
                    if stack.pop() != Some(c) {
                        return Err(
                            self.error_at(idx, ParseErrorCause::Other("unbalanced brackets"))
                        );
                    }
                    if stack.is_empty() {
                        return Ok(idx + 1);
                    }
                }
                _ => (),
            }
            idx += 1;
        }
        Err(self.error_at(bytes.len(), ParseErrorCause::Other("unclosed bracket")))
    }

    /// Returns the number of remaining bytes to parse.
    pub fn get_remaining(self) -> usize {
        self.s.len()
    }

    /// Returns true if the input string was parsed completely.
    pub fn is_at_eof(self) -> bool {
        self.s.is_empty()
    }

    /// Returns an error with given cause, associated with given position.
    pub fn error(self, cause: ParseErrorCause) -> ParseError {
        ParseError {
            remaining: self.get_remaining(),
            cause,
        }
    }

    fn error_at(self, offset: usize, cause: ParseErrorCause) -> ParseError {
        ParseError {
            remaining: self.get_remaining() - offset,
            cause,
        }
    }

    /// Given the original string, returns the 1-based position
    /// of the error in characters.
    /// If an incorrect string was given, the function may return None.
    pub fn calculate_position(self, original: &str) -> Option<usize> {
        calculate_position(original, self.get_remaining())
    }
}

fn is_cql_value_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '+' | '.' | '_' | '&')
}

fn calculate_position(original: &str, remaining: usize) -> Option<usize> {
    let prefix_len = original.len().checked_sub(remaining)?;
    let prefix = original.get(..prefix_len)?;
    Some(prefix.chars().count() + 1)
}

//! Word splitting for shell command lines.
//!
//! Outside quotes, whitespace, parentheses and commas all separate words, so
//! `dbLoadRecords("db/a.db", "P=X:")` and `dbLoadRecords db/a.db P=X:` parse
//! the same. A `#` that starts a word ends the line.

use std::error::Error;
use std::fmt;
use std::mem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    UnterminatedQuote(char),
    TrailingEscape,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnterminatedQuote(q) => write!(f, "unbalanced quote ({q})"),
            ParseError::TrailingEscape => write!(f, "line ends with an escape character"),
        }
    }
}

impl Error for ParseError {}

/// True for lines that carry no command: blank or `#` comments.
pub fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// True for `#-` comments, which are never echoed.
pub fn is_silent_comment(line: &str) -> bool {
    line.trim_start().starts_with("#-")
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | ',')
}

/// Split a command line into words.
pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) if c == q => quote = None,
            // Single quotes are literal, backslash included.
            Some('\'') => current.push(c),
            Some(_) if c == '\\' => current.push(chars.next().ok_or(ParseError::TrailingEscape)?),
            Some(_) => current.push(c),
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    in_word = true;
                }
                '\\' => {
                    current.push(chars.next().ok_or(ParseError::TrailingEscape)?);
                    in_word = true;
                }
                '#' if !in_word => break,
                c if is_separator(c) => {
                    if in_word {
                        words.push(mem::take(&mut current));
                        in_word = false;
                    }
                }
                c => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }

    if let Some(q) = quote {
        return Err(ParseError::UnterminatedQuote(q));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

//! Low-level token parsers shared by the rule and selector parsers.

use nom::{
    IResult,
    bytes::complete::take_while1,
    error::{Error, ErrorKind},
};

/// Parse a CSS identifier (letters, digits, `-` and `_`).
pub fn parse_ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_')(input)
}

/// Consume a raw value up to (not including) the next `;` or `}` that is not
/// inside a quoted string or parentheses.
pub fn take_value(input: &str) -> IResult<&str, &str> {
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';' | '}' | '{') if depth == 0 => {
                if i == 0 {
                    break;
                }
                return Ok((&input[i..], &input[..i]));
            }
            _ => {}
        }
    }
    if quote.is_some() || input.is_empty() || input.starts_with([';', '}', '{']) {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::TakeUntil)));
    }
    // A value running to end of input is left for the caller to reject.
    Ok(("", input))
}

/// Strip one level of matching single or double quotes.
pub fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Blank out `/* */` comments, keeping byte offsets and newlines intact so
/// positions computed on the result still match the original source.
pub fn blank_comments(source: &str) -> String {
    let mut clean = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            clean.push_str("  ");
            let mut closed = false;
            while let Some(inner) = chars.next() {
                if inner == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    clean.push_str("  ");
                    closed = true;
                    break;
                }
                blank(&mut clean, inner);
            }
            if !closed {
                log::trace!("unterminated comment runs to end of stylesheet");
            }
            continue;
        }
        clean.push(c);
    }
    clean
}

fn blank(out: &mut String, c: char) {
    if c == '\n' {
        out.push('\n');
    } else {
        for _ in 0..c.len_utf8() {
            out.push(' ');
        }
    }
}

//! Tokenizer for Mach assembly text.

use crate::error::AsmError;

/// A single token from an assembly line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// A keyword, register, symbol or other bare word, as written.
    Word(String),
    /// An integer literal (decimal or hex, optionally signed).
    Int(i64),
    /// A literal with a fraction or exponent.
    Float(f64),
    LParen,
    RParen,
    /// `->` before a signature's result type.
    Arrow,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Word(w) => write!(f, "{w}"),
            Token::Int(n) => write!(f, "{n}"),
            Token::Float(x) => write!(f, "{x:?}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Arrow => write!(f, "->"),
        }
    }
}

/// Parse an integer literal: decimal or `0x` hex, with an optional sign.
pub(crate) fn parse_int(word: &str) -> Option<i64> {
    let (negative, digits) = match word.as_bytes().first() {
        Some(b'-') => (true, &word[1..]),
        Some(b'+') => (false, &word[1..]),
        _ => (false, word),
    };
    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()?
    } else {
        return None;
    };
    Some(if negative { -magnitude } else { magnitude })
}

fn is_numeric(word: &str) -> bool {
    let unsigned = word.strip_prefix(['-', '+']).unwrap_or(word);
    unsigned
        .as_bytes()
        .first()
        .is_some_and(|b| b.is_ascii_digit() || *b == b'.')
}

fn classify(word: &str, line_num: usize) -> Result<Token, AsmError> {
    if !is_numeric(word) {
        return Ok(Token::Word(word.to_string()));
    }
    if let Some(n) = parse_int(word) {
        return Ok(Token::Int(n));
    }
    word.parse::<f64>()
        .map(Token::Float)
        .map_err(|_| AsmError::InvalidNumber {
            line: line_num,
            token: word.to_string(),
        })
}

/// First punctuation token inside a whitespace-separated chunk:
/// its byte position, its length and the token.
fn delimiter(s: &str) -> Option<(usize, usize, Token)> {
    s.char_indices().find_map(|(i, c)| match c {
        '(' => Some((i, 1, Token::LParen)),
        ')' => Some((i, 1, Token::RParen)),
        '-' if s[i + 1..].starts_with('>') => Some((i, 2, Token::Arrow)),
        _ => None,
    })
}

/// Tokenize a single line of assembly text.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `;` and extend to end of line. Parentheses and
/// `->` are tokens of their own even when not separated by spaces.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token>, AsmError> {
    let line = match line.find(';') {
        Some(pos) => &line[..pos],
        None => line,
    };

    let mut tokens = Vec::new();
    for chunk in line.split_whitespace() {
        let mut rest = chunk;
        while let Some((pos, len, delim)) = delimiter(rest) {
            if pos > 0 {
                tokens.push(classify(&rest[..pos], line_num)?);
            }
            tokens.push(delim);
            rest = &rest[pos + len..];
        }
        if !rest.is_empty() {
            tokens.push(classify(rest, line_num)?);
        }
    }

    Ok(tokens)
}

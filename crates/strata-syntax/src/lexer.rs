//! Tokenizer for template bodies.
//!
//! The tokenizer splits a body into text runs and the three delimited forms:
//! `{{ expression }}`, `{% tag %}` and `{# comment #}`. A `-` placed directly
//! inside a delimiter (`{%-`, `-%}`) requests trimming of the neighbouring
//! text. Whitespace control is applied by [`tokenize`] after the raw scan.

use crate::error::{ParseError, Result};

/// Options that affect how raw text around tags is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxConfig {
    /// Drop the first newline after a `%}` or `#}` delimiter.
    pub trim_blocks: bool,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self { trim_blocks: true }
    }
}

/// What a token holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// Raw text emitted verbatim.
    Text(&'a str),
    /// Body of an `{{ ... }}` delimiter, with markers removed.
    Output(&'a str),
    /// Body of a `{% ... %}` delimiter, with markers removed.
    Tag(&'a str),
    /// Body of a `{# ... #}` delimiter.
    Comment(&'a str),
}

/// A token plus its position and whitespace-control markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub line: usize,
    pub trim_left: bool,
    pub trim_right: bool,
}

impl<'a> Token<'a> {
    fn text(text: &'a str, line: usize) -> Self {
        Self {
            kind: TokenKind::Text(text),
            line,
            trim_left: false,
            trim_right: false,
        }
    }
}

/// Streaming tokenizer over a template body.
///
/// Yields `Err` once on an unterminated delimiter and then stops.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
        }
    }

    /// Offset of the next opening delimiter in `remaining`.
    fn next_open(remaining: &str) -> Option<usize> {
        let bytes = remaining.as_bytes();
        let mut i = 0;
        while i + 1 < bytes.len() {
            if bytes[i] == b'{' && matches!(bytes[i + 1], b'{' | b'%' | b'#') {
                return Some(i);
            }
            i += 1;
        }
        None
    }

    fn advance(&mut self, consumed: &str) {
        self.pos += consumed.len();
        self.line += consumed.matches('\n').count();
    }
}

/// Finds `closer` in `s`, skipping over quoted string literals when asked.
pub(crate) fn find_closer(s: &str, closer: &str, skip_quotes: bool) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if skip_quotes && (b == b'"' || b == b'\'') {
            i += 1;
            while i < bytes.len() && bytes[i] != b {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            i += 1;
            continue;
        }
        if bytes[i..].starts_with(closer.as_bytes()) {
            return Some(i);
        }
        i += 1;
    }
    None
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }

        let remaining = &self.input[self.pos..];
        let line = self.line;

        match Self::next_open(remaining) {
            Some(0) => {}
            Some(offset) => {
                let text = &remaining[..offset];
                self.advance(text);
                return Some(Ok(Token::text(text, line)));
            }
            None => {
                self.advance(remaining);
                return Some(Ok(Token::text(remaining, line)));
            }
        }

        let (closer, delimiter, skip_quotes) = match remaining.as_bytes()[1] {
            b'{' => ("}}", "{{", true),
            b'%' => ("%}", "{%", true),
            _ => ("#}", "{#", false),
        };

        let Some(end) = find_closer(&remaining[2..], closer, skip_quotes) else {
            self.pos = self.input.len();
            return Some(Err(ParseError::UnclosedTag { line, delimiter }));
        };

        let full = &remaining[..end + 4];
        let mut body = &remaining[2..end + 2];
        let mut trim_left = false;
        let mut trim_right = false;
        if let Some(rest) = body.strip_prefix('-') {
            trim_left = true;
            body = rest;
        }
        if let Some(rest) = body.strip_suffix('-') {
            trim_right = true;
            body = rest;
        }
        self.advance(full);

        let kind = match delimiter {
            "{{" => TokenKind::Output(body.trim()),
            "{%" => TokenKind::Tag(body.trim()),
            _ => TokenKind::Comment(body),
        };
        Some(Ok(Token {
            kind,
            line,
            trim_left,
            trim_right,
        }))
    }
}

/// Tokenizes `input` and applies whitespace control.
pub fn tokenize<'a>(input: &'a str, config: &SyntaxConfig) -> Result<Vec<Token<'a>>> {
    let mut tokens = Tokenizer::new(input).collect::<Result<Vec<_>>>()?;

    for i in 0..tokens.len() {
        let Token {
            kind,
            trim_left,
            trim_right,
            ..
        } = tokens[i];

        if trim_left && i > 0 {
            if let TokenKind::Text(t) = &mut tokens[i - 1].kind {
                let text: &'a str = *t;
                *t = text.trim_end();
            }
        }

        let strip_newline =
            config.trim_blocks && matches!(kind, TokenKind::Tag(_) | TokenKind::Comment(_));
        if i + 1 < tokens.len() {
            if let TokenKind::Text(t) = &mut tokens[i + 1].kind {
                let text: &'a str = *t;
                if trim_right {
                    *t = text.trim_start();
                } else if strip_newline {
                    *t = text
                        .strip_prefix("\r\n")
                        .or_else(|| text.strip_prefix('\n'))
                        .unwrap_or(text);
                }
            }
        }
    }

    Ok(tokens)
}

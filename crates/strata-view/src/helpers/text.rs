//! Text formatting helper.
//!
//! Exposed to templates as `Text`:
//!
//! ```text
//! {{ Text.truncate(post.body, 120) }}
//! {{ Text.to_list(tags) }}
//! {{ Text.highlight(post.body, query) }}
//! ```

use std::sync::Arc;

use minijinja::value::Object;
use minijinja::{Error, ErrorKind, Value};

use crate::inflect;

const DEFAULT_ELLIPSIS: &str = "...";
const DEFAULT_HIGHLIGHT: &str = r#"<span class="highlight">\1</span>"#;

/// Truncates `text` to at most `length` characters, ellipsis included.
///
/// Without `exact`, the cut moves back to the previous space so words stay
/// whole.
pub fn truncate(text: &str, length: usize, ellipsis: &str, exact: bool) -> String {
    if text.chars().count() <= length {
        return text.to_string();
    }
    let keep = length.saturating_sub(ellipsis.chars().count());
    let mut cut: String = text.chars().take(keep).collect();
    if !exact {
        if let Some(space) = cut.rfind(' ') {
            cut.truncate(space);
        }
    }
    cut.push_str(ellipsis);
    cut
}

/// Keeps the last `length` characters, ellipsis included.
pub fn tail(text: &str, length: usize, ellipsis: &str) -> String {
    let total = text.chars().count();
    if total <= length {
        return text.to_string();
    }
    let keep = length.saturating_sub(ellipsis.chars().count());
    let mut out = ellipsis.to_string();
    out.extend(text.chars().skip(total - keep));
    out
}

/// Extracts `radius` characters of context around the first `phrase`.
pub fn excerpt(text: &str, phrase: &str, radius: usize, ellipsis: &str) -> String {
    if text.is_empty() || phrase.is_empty() {
        return truncate(text, radius.saturating_mul(2), ellipsis, true);
    }

    let Some(byte_pos) = find_ignore_ascii_case(text, phrase) else {
        let mut head: String = text.chars().take(radius).collect();
        head.push_str(ellipsis);
        return head;
    };

    let chars: Vec<char> = text.chars().collect();
    let pos = text[..byte_pos].chars().count();
    let phrase_len = phrase.chars().count();
    let start = pos.saturating_sub(radius);
    let end = pos
        .saturating_add(phrase_len)
        .saturating_add(radius)
        .min(chars.len());

    let mut out = String::new();
    if start > 0 {
        out.push_str(ellipsis);
    }
    out.extend(&chars[start..end]);
    if end < chars.len() {
        out.push_str(ellipsis);
    }
    out
}

/// `["a", "b", "c"]` to `a, b and c`.
pub fn to_list(items: &[String], and: &str, separator: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} {and} {last}", init.join(separator)),
    }
}

/// Wraps blank-line separated paragraphs in `<p>` and single newlines in `<br />`.
pub fn auto_paragraph(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::new();
    let mut paragraph: Vec<&str> = Vec::new();

    for line in normalized.split('\n') {
        if line.trim().is_empty() {
            flush(&mut paragraph, &mut out);
        } else {
            paragraph.push(line);
        }
    }
    flush(&mut paragraph, &mut out);
    out
}

fn flush(lines: &mut Vec<&str>, out: &mut String) {
    if !lines.is_empty() {
        out.push_str("<p>");
        out.push_str(&lines.join("<br />\n"));
        out.push_str("</p>\n");
        lines.clear();
    }
}

/// Wraps every case-insensitive occurrence of `phrase` using `format`, where
/// `\1` stands for the matched text.
pub fn highlight(text: &str, phrase: &str, format: &str) -> String {
    if phrase.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = find_ignore_ascii_case(rest, phrase) {
        let end = pos + phrase.len();
        out.push_str(&rest[..pos]);
        out.push_str(&format.replace("\\1", &rest[pos..end]));
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let (h, n) = (haystack.as_bytes(), needle.as_bytes());
    if n.len() > h.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| {
        haystack.is_char_boundary(i)
            && haystack.is_char_boundary(i + n.len())
            && h[i..i + n.len()].eq_ignore_ascii_case(n)
    })
}

/// Template helper wrapping the text functions.
#[derive(Debug, Default)]
pub struct TextHelper;

fn string_arg(args: &[Value], idx: usize, method: &str) -> Result<String, Error> {
    match args.get(idx) {
        Some(v) if v.is_none() || v.is_undefined() => Ok(String::new()),
        Some(v) => Ok(v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string())),
        None => Err(Error::new(
            ErrorKind::MissingArgument,
            format!("Text.{method}() requires argument {}", idx + 1),
        )),
    }
}

fn opt_string(args: &[Value], idx: usize, default: &str) -> String {
    args.get(idx)
        .and_then(|v| v.as_str())
        .unwrap_or(default)
        .to_string()
}

fn opt_usize(args: &[Value], idx: usize, default: usize, method: &str) -> Result<usize, Error> {
    match args.get(idx) {
        None => Ok(default),
        Some(v) => v.as_usize().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("Text.{method}() argument {} must be a number", idx + 1),
            )
        }),
    }
}

impl Object for TextHelper {
    fn call_method(
        self: &Arc<Self>,
        _state: &minijinja::State,
        name: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        let out = match name {
            "truncate" => truncate(
                &string_arg(args, 0, name)?,
                opt_usize(args, 1, 100, name)?,
                &opt_string(args, 2, DEFAULT_ELLIPSIS),
                args.get(3).map(Value::is_true).unwrap_or(true),
            ),
            "tail" => tail(
                &string_arg(args, 0, name)?,
                opt_usize(args, 1, 100, name)?,
                &opt_string(args, 2, DEFAULT_ELLIPSIS),
            ),
            "excerpt" => excerpt(
                &string_arg(args, 0, name)?,
                &string_arg(args, 1, name)?,
                opt_usize(args, 2, 100, name)?,
                &opt_string(args, 3, DEFAULT_ELLIPSIS),
            ),
            "to_list" => {
                let list = args.first().ok_or_else(|| {
                    Error::new(ErrorKind::MissingArgument, "Text.to_list() requires a list")
                })?;
                let items: Vec<String> = list
                    .try_iter()?
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .collect();
                to_list(&items, &opt_string(args, 1, "and"), &opt_string(args, 2, ", "))
            }
            "auto_paragraph" => auto_paragraph(&string_arg(args, 0, name)?),
            "highlight" => highlight(
                &string_arg(args, 0, name)?,
                &string_arg(args, 1, name)?,
                &opt_string(args, 2, DEFAULT_HIGHLIGHT),
            ),
            "slug" => inflect::slug(&string_arg(args, 0, name)?, &opt_string(args, 1, "-")),
            _ => {
                return Err(Error::new(
                    ErrorKind::UnknownMethod,
                    format!("Text has no method '{}'", name),
                ))
            }
        };
        Ok(Value::from(out))
    }
}

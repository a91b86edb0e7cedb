//! Parser from tokens to a node tree.
//!
//! Control-flow constructs (`if`, `for`, `cache`) nest. Block captures
//! (`start` / `end`) are flat statements: whether they balance depends on
//! runtime control flow, so the evaluator checks it, not the parser.

use crate::error::{ParseError, Result};
use crate::lexer::{tokenize, SyntaxConfig, Token, TokenKind};

/// A parsed template body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    pub nodes: Vec<Node>,
}

impl Template {
    /// True if the body declares a parent anywhere at the top level.
    pub fn declares_extend(&self) -> bool {
        self.nodes.iter().any(|n| matches!(n, Node::Extend { .. }))
    }
}

/// An expression kept as source text, evaluated later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub source: String,
    pub line: usize,
}

/// A name argument: either a literal or an expression producing a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameArg {
    Literal(String),
    Expr(Expr),
}

/// Condition of an `if` / `elif` branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Expr(Expr),
    /// `block "name"`: true when the block is defined.
    BlockExists(String),
}

/// How a captured block is committed on `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    #[default]
    Append,
    Prepend,
    Override,
}

/// How an inline block write combines with existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Set,
    Append,
    Prepend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Output(Expr),
    If {
        branches: Vec<(Condition, Vec<Node>)>,
        otherwise: Vec<Node>,
    },
    For {
        var: String,
        iterable: Expr,
        body: Vec<Node>,
        empty: Vec<Node>,
    },
    Extend {
        name: NameArg,
        line: usize,
    },
    Start {
        block: String,
        mode: CaptureMode,
        line: usize,
    },
    End {
        line: usize,
    },
    Write {
        block: String,
        value: Expr,
        mode: WriteMode,
    },
    Reset {
        block: String,
    },
    Fetch {
        block: String,
        default: Option<Expr>,
    },
    Element {
        name: NameArg,
        data: Option<Expr>,
        options: Option<Expr>,
        line: usize,
    },
    Cache {
        key: Expr,
        config: Option<String>,
        body: Vec<Node>,
        line: usize,
    },
}

/// Parses a template body with the default [`SyntaxConfig`].
pub fn parse(source: &str) -> Result<Template> {
    parse_with(source, &SyntaxConfig::default())
}

/// Parses a template body.
pub fn parse_with(source: &str, config: &SyntaxConfig) -> Result<Template> {
    let tokens = tokenize(source, config)?;
    let mut parser = Parser {
        tokens: tokens.into_iter(),
    };
    let (nodes, _) = parser.parse_until(&[])?;
    Ok(Template { nodes })
}

/// A closing or intermediate tag that ended a nested sequence.
struct Stop<'a> {
    keyword: &'a str,
    args: &'a str,
    line: usize,
}

struct Parser<'a> {
    tokens: std::vec::IntoIter<Token<'a>>,
}

const CLOSERS: &[&str] = &["elif", "else", "endif", "endfor", "endcache"];

impl<'a> Parser<'a> {
    /// Parses nodes until one of `terminators` (or end of input).
    fn parse_until(&mut self, terminators: &[&str]) -> Result<(Vec<Node>, Option<Stop<'a>>)> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.next() {
            match token.kind {
                TokenKind::Text(text) => {
                    if !text.is_empty() {
                        nodes.push(Node::Text(text.to_string()));
                    }
                }
                TokenKind::Output(source) => {
                    if source.is_empty() {
                        return Err(ParseError::MissingArgument {
                            line: token.line,
                            tag: "{{ }}",
                            what: "an expression",
                        });
                    }
                    nodes.push(Node::Output(expr(source, token.line)));
                }
                TokenKind::Comment(_) => {}
                TokenKind::Tag(body) => {
                    let (keyword, args) = split_keyword(body);
                    let line = token.line;

                    if terminators.contains(&keyword) {
                        return Ok((
                            nodes,
                            Some(Stop {
                                keyword,
                                args,
                                line,
                            }),
                        ));
                    }
                    if CLOSERS.contains(&keyword) {
                        return Err(ParseError::UnexpectedTag {
                            line,
                            name: keyword.to_string(),
                        });
                    }

                    nodes.push(self.parse_tag(keyword, args, line)?);
                }
            }
        }

        Ok((nodes, None))
    }

    fn parse_tag(&mut self, keyword: &'a str, args: &'a str, line: usize) -> Result<Node> {
        match keyword {
            "if" => self.parse_if(args, line),
            "for" => self.parse_for(args, line),
            "cache" => self.parse_cache(args, line),
            "extend" => {
                let name = name_arg(args, "extend", line)?;
                Ok(Node::Extend { name, line })
            }
            "start" => {
                let (block, rest) = block_name(args, "start", line)?;
                let mode = match rest {
                    "" | "append" => CaptureMode::Append,
                    "prepend" => CaptureMode::Prepend,
                    "override" => CaptureMode::Override,
                    other => {
                        return Err(ParseError::InvalidArgument {
                            line,
                            tag: "start",
                            found: other.to_string(),
                        })
                    }
                };
                Ok(Node::Start { block, mode, line })
            }
            "end" => {
                no_args(args, "end", line)?;
                Ok(Node::End { line })
            }
            "assign" => write_node(args, "assign", WriteMode::Set, line),
            "append" => write_node(args, "append", WriteMode::Append, line),
            "prepend" => write_node(args, "prepend", WriteMode::Prepend, line),
            "reset" => {
                let (block, rest) = block_name(args, "reset", line)?;
                no_args(rest, "reset", line)?;
                Ok(Node::Reset { block })
            }
            "fetch" => {
                let (block, rest) = block_name(args, "fetch", line)?;
                let default = (!rest.is_empty()).then(|| expr(rest, line));
                Ok(Node::Fetch { block, default })
            }
            "element" => {
                let parts = split_keywords(args, &["with", "options"]);
                let name = name_arg(parts.head, "element", line)?;
                let data = parts.get("with").map(|s| expr(s, line));
                let options = parts.get("options").map(|s| expr(s, line));
                for (kw, value) in &parts.keywords {
                    if value.is_empty() {
                        return Err(ParseError::MissingArgument {
                            line,
                            tag: "element",
                            what: if *kw == "with" {
                                "data after `with`"
                            } else {
                                "options after `options`"
                            },
                        });
                    }
                }
                Ok(Node::Element {
                    name,
                    data,
                    options,
                    line,
                })
            }
            other => Err(ParseError::UnknownTag {
                line,
                name: other.to_string(),
            }),
        }
    }

    fn parse_if(&mut self, args: &'a str, line: usize) -> Result<Node> {
        let mut branches = Vec::new();
        let mut cond = condition(args, line)?;

        loop {
            let (body, stop) = self.parse_until(&["elif", "else", "endif"])?;
            let Some(stop) = stop else {
                return Err(ParseError::Unclosed {
                    line,
                    construct: "if",
                });
            };
            branches.push((cond, body));

            match stop.keyword {
                "elif" => cond = condition(stop.args, stop.line)?,
                "else" => {
                    no_args(stop.args, "else", stop.line)?;
                    let (otherwise, end) = self.parse_until(&["endif"])?;
                    if end.is_none() {
                        return Err(ParseError::Unclosed {
                            line,
                            construct: "if",
                        });
                    }
                    return Ok(Node::If {
                        branches,
                        otherwise,
                    });
                }
                _ => {
                    return Ok(Node::If {
                        branches,
                        otherwise: Vec::new(),
                    })
                }
            }
        }
    }

    fn parse_for(&mut self, args: &'a str, line: usize) -> Result<Node> {
        let (var, rest) = split_keyword(args);
        if !is_identifier(var) {
            return Err(ParseError::InvalidArgument {
                line,
                tag: "for",
                found: var.to_string(),
            });
        }
        let (kw, iterable) = split_keyword(rest);
        if kw != "in" || iterable.is_empty() {
            return Err(ParseError::MissingArgument {
                line,
                tag: "for",
                what: "`in` followed by an expression",
            });
        }

        let (body, stop) = self.parse_until(&["else", "endfor"])?;
        let empty = match stop {
            None => {
                return Err(ParseError::Unclosed {
                    line,
                    construct: "for",
                })
            }
            Some(stop) if stop.keyword == "else" => {
                let (empty, end) = self.parse_until(&["endfor"])?;
                if end.is_none() {
                    return Err(ParseError::Unclosed {
                        line,
                        construct: "for",
                    });
                }
                empty
            }
            Some(_) => Vec::new(),
        };

        Ok(Node::For {
            var: var.to_string(),
            iterable: expr(iterable, line),
            body,
            empty,
        })
    }

    fn parse_cache(&mut self, args: &'a str, line: usize) -> Result<Node> {
        let parts = split_keywords(args, &["using"]);
        if parts.head.is_empty() {
            return Err(ParseError::MissingArgument {
                line,
                tag: "cache",
                what: "a key expression",
            });
        }
        let config = match parts.get("using") {
            Some(raw) => {
                let (value, rest) = string_literal(raw, line)?.ok_or_else(|| {
                    ParseError::InvalidArgument {
                        line,
                        tag: "cache",
                        found: raw.to_string(),
                    }
                })?;
                no_args(rest, "cache", line)?;
                Some(value)
            }
            None => None,
        };

        let (body, stop) = self.parse_until(&["endcache"])?;
        if stop.is_none() {
            return Err(ParseError::Unclosed {
                line,
                construct: "cache",
            });
        }

        Ok(Node::Cache {
            key: expr(parts.head, line),
            config,
            body,
            line,
        })
    }
}

fn expr(source: &str, line: usize) -> Expr {
    Expr {
        source: source.trim().to_string(),
        line,
    }
}

fn write_node(args: &str, tag: &'static str, mode: WriteMode, line: usize) -> Result<Node> {
    let (block, rest) = block_name(args, tag, line)?;
    if rest.is_empty() {
        return Err(ParseError::MissingArgument {
            line,
            tag,
            what: "a value expression",
        });
    }
    Ok(Node::Write {
        block,
        value: expr(rest, line),
        mode,
    })
}

fn no_args(args: &str, tag: &'static str, line: usize) -> Result<()> {
    if args.trim().is_empty() {
        Ok(())
    } else {
        Err(ParseError::InvalidArgument {
            line,
            tag,
            found: args.trim().to_string(),
        })
    }
}

fn condition(args: &str, line: usize) -> Result<Condition> {
    let (kw, rest) = split_keyword(args);
    if kw == "block" {
        if let Some((name, tail)) = string_literal(rest, line)? {
            no_args(tail, "if", line)?;
            return Ok(Condition::BlockExists(name));
        }
    }
    if args.trim().is_empty() {
        return Err(ParseError::MissingArgument {
            line,
            tag: "if",
            what: "a condition",
        });
    }
    Ok(Condition::Expr(expr(args, line)))
}

/// Splits off the first whitespace-delimited word.
fn split_keyword(body: &str) -> (&str, &str) {
    let body = body.trim();
    match body.find(char::is_whitespace) {
        Some(idx) => (&body[..idx], body[idx..].trim_start()),
        None => (body, ""),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parses a required quoted block name, returning it and the remaining args.
fn block_name<'s>(args: &'s str, tag: &'static str, line: usize) -> Result<(String, &'s str)> {
    match string_literal(args, line)? {
        Some((name, rest)) if !name.is_empty() => Ok((name, rest)),
        Some(_) => Err(ParseError::InvalidArgument {
            line,
            tag,
            found: "empty block name".to_string(),
        }),
        None if args.trim().is_empty() => Err(ParseError::MissingArgument {
            line,
            tag,
            what: "a quoted block name",
        }),
        None => Err(ParseError::InvalidArgument {
            line,
            tag,
            found: args.trim().to_string(),
        }),
    }
}

fn name_arg(args: &str, tag: &'static str, line: usize) -> Result<NameArg> {
    let args = args.trim();
    if args.is_empty() {
        return Err(ParseError::MissingArgument {
            line,
            tag,
            what: "a name",
        });
    }
    if let Some((value, rest)) = string_literal(args, line)? {
        if rest.is_empty() {
            return Ok(NameArg::Literal(value));
        }
    }
    Ok(NameArg::Expr(expr(args, line)))
}

/// Reads a leading quoted literal from `s`.
///
/// Returns `Ok(None)` when `s` does not start with a quote, and the unescaped
/// value plus the trimmed remainder otherwise.
pub fn string_literal(s: &str, line: usize) -> Result<Option<(String, &str)>> {
    let s = s.trim_start();
    let mut chars = s.char_indices();
    let quote = match chars.next() {
        Some((_, q @ ('"' | '\''))) => q,
        _ => return Ok(None),
    };

    let mut value = String::new();
    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, other)) => value.push(other),
                None => break,
            },
            c if c == quote => {
                let rest = s[idx + c.len_utf8()..].trim();
                return Ok(Some((value, rest)));
            }
            c => value.push(c),
        }
    }
    Err(ParseError::UnterminatedString { line })
}

/// Tag arguments split on top-level keywords.
struct Keywords<'s> {
    head: &'s str,
    keywords: Vec<(&'static str, &'s str)>,
}

impl<'s> Keywords<'s> {
    fn get(&self, keyword: &str) -> Option<&'s str> {
        self.keywords
            .iter()
            .find(|(kw, _)| *kw == keyword)
            .map(|(_, value)| *value)
    }
}

/// Splits `args` at keywords that appear outside quotes and brackets.
fn split_keywords<'s>(args: &'s str, keywords: &[&'static str]) -> Keywords<'s> {
    let bytes = args.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut cuts: Vec<(usize, &'static str)> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 1;
            } else if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            _ if depth == 0 && (i == 0 || bytes[i - 1].is_ascii_whitespace()) => {
                let found = keywords.iter().find(|kw| {
                    let end = i + kw.len();
                    bytes[i..].starts_with(kw.as_bytes())
                        && (end == bytes.len() || bytes[end].is_ascii_whitespace())
                });
                if let Some(kw) = found {
                    cuts.push((i, *kw));
                    i += kw.len();
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }

    let head_end = cuts.first().map(|(pos, _)| *pos).unwrap_or(args.len());
    let mut parts = Keywords {
        head: args[..head_end].trim(),
        keywords: Vec::new(),
    };
    for (idx, (pos, kw)) in cuts.iter().enumerate() {
        let start = pos + kw.len();
        let end = cuts.get(idx + 1).map(|(p, _)| *p).unwrap_or(args.len());
        parts.keywords.push((kw, args[start..end].trim()));
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> NameArg {
        NameArg::Literal(s.to_string())
    }

    fn e(s: &str, line: usize) -> Expr {
        Expr {
            source: s.to_string(),
            line,
        }
    }

    #[test]
    fn test_text_and_output() {
        let t = parse("Hi {{ user.name }}!").unwrap();
        assert_eq!(
            t.nodes,
            vec![
                Node::Text("Hi ".into()),
                Node::Output(e("user.name", 1)),
                Node::Text("!".into()),
            ]
        );
    }

    #[test]
    fn test_empty_output_is_error() {
        let err = parse("{{ }}").unwrap_err();
        assert!(matches!(err, ParseError::MissingArgument { .. }));
    }

    #[test]
    fn test_comments_are_dropped() {
        let t = parse("a{# hidden #}b").unwrap();
        assert_eq!(
            t.nodes,
            vec![Node::Text("a".into()), Node::Text("b".into())]
        );
    }

    mod blocks {
        use super::*;

        #[test]
        fn test_start_end() {
            let t = parse("{% start \"sidebar\" %}x{% end %}").unwrap();
            assert_eq!(
                t.nodes,
                vec![
                    Node::Start {
                        block: "sidebar".into(),
                        mode: CaptureMode::Append,
                        line: 1
                    },
                    Node::Text("x".into()),
                    Node::End { line: 1 },
                ]
            );
        }

        #[test]
        fn test_start_modes() {
            for (src, mode) in [
                ("{% start 'a' prepend %}", CaptureMode::Prepend),
                ("{% start 'a' override %}", CaptureMode::Override),
                ("{% start 'a' append %}", CaptureMode::Append),
            ] {
                let t = parse(src).unwrap();
                assert_eq!(
                    t.nodes[0],
                    Node::Start {
                        block: "a".into(),
                        mode,
                        line: 1
                    }
                );
            }
        }

        #[test]
        fn test_start_unknown_mode() {
            let err = parse("{% start 'a' sideways %}").unwrap_err();
            assert!(matches!(err, ParseError::InvalidArgument { tag: "start", .. }));
        }

        #[test]
        fn test_unbalanced_start_parses() {
            assert!(parse("{% start 'a' %}never closed").is_ok());
        }

        #[test]
        fn test_block_name_must_be_quoted() {
            let err = parse("{% assign title 'x' %}").unwrap_err();
            assert!(matches!(err, ParseError::InvalidArgument { tag: "assign", .. }));
        }

        #[test]
        fn test_writes() {
            let t = parse("{% assign 'a' 1 %}{% append 'a' x %}{% prepend 'a' \"y\" %}").unwrap();
            let modes: Vec<WriteMode> = t
                .nodes
                .iter()
                .map(|n| match n {
                    Node::Write { mode, .. } => *mode,
                    other => panic!("unexpected {other:?}"),
                })
                .collect();
            assert_eq!(
                modes,
                vec![WriteMode::Set, WriteMode::Append, WriteMode::Prepend]
            );
        }

        #[test]
        fn test_write_requires_value() {
            let err = parse("{% append 'a' %}").unwrap_err();
            assert!(matches!(err, ParseError::MissingArgument { tag: "append", .. }));
        }

        #[test]
        fn test_fetch_with_default() {
            let t = parse("{% fetch 'title' 'Untitled' %}").unwrap();
            assert_eq!(
                t.nodes[0],
                Node::Fetch {
                    block: "title".into(),
                    default: Some(e("'Untitled'", 1)),
                }
            );
        }

        #[test]
        fn test_reset() {
            let t = parse("{% reset 'a' %}").unwrap();
            assert_eq!(t.nodes[0], Node::Reset { block: "a".into() });
        }
    }

    mod control {
        use super::*;

        #[test]
        fn test_if_elif_else() {
            let t = parse("{% if a %}A{% elif b %}B{% else %}C{% endif %}").unwrap();
            assert_eq!(
                t.nodes,
                vec![Node::If {
                    branches: vec![
                        (Condition::Expr(e("a", 1)), vec![Node::Text("A".into())]),
                        (Condition::Expr(e("b", 1)), vec![Node::Text("B".into())]),
                    ],
                    otherwise: vec![Node::Text("C".into())],
                }]
            );
        }

        #[test]
        fn test_if_block_exists() {
            let t = parse("{% if block \"nav\" %}x{% endif %}").unwrap();
            match &t.nodes[0] {
                Node::If { branches, .. } => {
                    assert_eq!(branches[0].0, Condition::BlockExists("nav".into()))
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn test_variable_named_block_is_expression() {
            let t = parse("{% if block %}x{% endif %}").unwrap();
            match &t.nodes[0] {
                Node::If { branches, .. } => {
                    assert_eq!(branches[0].0, Condition::Expr(e("block", 1)))
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[test]
        fn test_unclosed_if() {
            let err = parse("line\n{% if a %}x").unwrap_err();
            assert_eq!(
                err,
                ParseError::Unclosed {
                    line: 2,
                    construct: "if"
                }
            );
        }

        #[test]
        fn test_stray_endif() {
            let err = parse("{% endif %}").unwrap_err();
            assert!(matches!(err, ParseError::UnexpectedTag { .. }));
        }

        #[test]
        fn test_for_with_empty() {
            let t = parse("{% for item in items %}{{ item }}{% else %}none{% endfor %}").unwrap();
            assert_eq!(
                t.nodes,
                vec![Node::For {
                    var: "item".into(),
                    iterable: e("items", 1),
                    body: vec![Node::Output(e("item", 1))],
                    empty: vec![Node::Text("none".into())],
                }]
            );
        }

        #[test]
        fn test_for_requires_in() {
            let err = parse("{% for item items %}{% endfor %}").unwrap_err();
            assert!(matches!(err, ParseError::MissingArgument { tag: "for", .. }));
        }

        #[test]
        fn test_for_rejects_bad_variable() {
            let err = parse("{% for 1x in items %}{% endfor %}").unwrap_err();
            assert!(matches!(err, ParseError::InvalidArgument { tag: "for", .. }));
        }

        #[test]
        fn test_unknown_tag() {
            let err = parse("{% include 'x' %}").unwrap_err();
            assert_eq!(
                err,
                ParseError::UnknownTag {
                    line: 1,
                    name: "include".into()
                }
            );
        }

        #[test]
        fn test_cache_block() {
            let t = parse("{% cache 'k' ~ id using \"long\" %}body{% endcache %}").unwrap();
            assert_eq!(
                t.nodes,
                vec![Node::Cache {
                    key: e("'k' ~ id", 1),
                    config: Some("long".into()),
                    body: vec![Node::Text("body".into())],
                    line: 1,
                }]
            );
        }

        #[test]
        fn test_cache_unclosed() {
            let err = parse("{% cache 'k' %}body").unwrap_err();
            assert!(matches!(
                err,
                ParseError::Unclosed {
                    construct: "cache",
                    ..
                }
            ));
        }
    }

    mod composition {
        use super::*;

        #[test]
        fn test_extend_literal() {
            let t = parse("{% extend \"/common/base\" %}").unwrap();
            assert!(t.declares_extend());
            assert_eq!(
                t.nodes[0],
                Node::Extend {
                    name: lit("/common/base"),
                    line: 1
                }
            );
        }

        #[test]
        fn test_extend_expression() {
            let t = parse("{% extend parent_name %}").unwrap();
            assert_eq!(
                t.nodes[0],
                Node::Extend {
                    name: NameArg::Expr(e("parent_name", 1)),
                    line: 1
                }
            );
        }

        #[test]
        fn test_element_with_data_and_options() {
            let t =
                parse("{% element 'sidebar' with {\"title\": \"with options\"} options {\"cache\": true} %}")
                    .unwrap();
            assert_eq!(
                t.nodes[0],
                Node::Element {
                    name: lit("sidebar"),
                    data: Some(e("{\"title\": \"with options\"}", 1)),
                    options: Some(e("{\"cache\": true}", 1)),
                    line: 1,
                }
            );
        }

        #[test]
        fn test_element_name_only() {
            let t = parse("{% element 'Blog.recent' %}").unwrap();
            assert_eq!(
                t.nodes[0],
                Node::Element {
                    name: lit("Blog.recent"),
                    data: None,
                    options: None,
                    line: 1,
                }
            );
        }

        #[test]
        fn test_element_missing_data() {
            let err = parse("{% element 'x' with %}").unwrap_err();
            assert!(matches!(
                err,
                ParseError::MissingArgument { tag: "element", .. }
            ));
        }
    }

    mod literals {
        use super::*;

        #[test]
        fn test_escapes() {
            let (value, rest) = string_literal(r#""a\"b\\c\n" tail"#, 1).unwrap().unwrap();
            assert_eq!(value, "a\"b\\c\n");
            assert_eq!(rest, "tail");
        }

        #[test]
        fn test_not_a_literal() {
            assert_eq!(string_literal("name", 1).unwrap(), None);
        }

        #[test]
        fn test_unterminated() {
            assert_eq!(
                string_literal("'abc", 4).unwrap_err(),
                ParseError::UnterminatedString { line: 4 }
            );
        }

        #[test]
        fn test_keyword_inside_quotes_is_ignored() {
            let parts = split_keywords("'a with b' with data", &["with"]);
            assert_eq!(parts.head, "'a with b'");
            assert_eq!(parts.get("with"), Some("data"));
        }
    }
}

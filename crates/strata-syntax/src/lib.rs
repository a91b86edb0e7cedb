//! Tokenizer and parser for the strata template language.
//!
//! Template bodies mix literal text with three delimited forms:
//!
//! - `{{ expr }}` outputs the value of an expression
//! - `{% tag args %}` runs a statement
//! - `{# ... #}` is a comment and produces nothing
//!
//! This crate only produces a [`Template`] node tree. Expressions are kept as
//! source text ([`Expr`]) and evaluated by the caller.
//!
//! # Example
//!
//! ```rust
//! use strata_syntax::{parse, Node, NameArg};
//!
//! let template = parse("{% extend 'base' %}{% start 'body' %}Hi {{ name }}{% end %}").unwrap();
//! assert!(template.declares_extend());
//! assert!(matches!(
//!     &template.nodes[0],
//!     Node::Extend { name: NameArg::Literal(n), .. } if n == "base"
//! ));
//! ```
//!
//! # Statements
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `if` / `elif` / `else` / `endif` | conditionals, `block "name"` tests block content |
//! | `for x in expr` / `else` / `endfor` | iteration with a `loop` variable |
//! | `extend NAME` | declare the parent template |
//! | `start "b" [append\|prepend\|override]` / `end` | capture output into a block |
//! | `assign`, `append`, `prepend` `"b" expr` | write to a block |
//! | `reset "b"` | clear a block |
//! | `fetch "b" [default]` | output a block |
//! | `element NAME [with expr] [options expr]` | render an element |
//! | `cache expr [using "config"]` / `endcache` | cache a fragment |

mod error;
mod lexer;
mod parser;

pub use error::{ParseError, Result};
pub use lexer::{tokenize, SyntaxConfig, Token, TokenKind, Tokenizer};
pub use parser::{
    parse, parse_with, string_literal, CaptureMode, Condition, Expr, NameArg, Node, Template,
    WriteMode,
};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    // Text that never contains an opening delimiter
    fn plain_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 .,!?:;'\"\n]{0,60}".prop_filter("no braces", |s| !s.contains('{'))
    }

    fn block_name() -> impl Strategy<Value = String> {
        "[a-z_][a-z0-9_]{0,12}"
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn plain_text_is_single_text_node(content in plain_text()) {
            let template = parse(&content).unwrap();
            if content.is_empty() {
                prop_assert!(template.nodes.is_empty());
            } else {
                prop_assert_eq!(template.nodes, vec![Node::Text(content)]);
            }
        }

        #[test]
        fn tokenizer_covers_all_input(content in plain_text(), name in block_name()) {
            let input = format!("{content}{{{{ {name} }}}}{content}");
            let config = SyntaxConfig { trim_blocks: false };
            let tokens = tokenize(&input, &config).unwrap();
            let mut rebuilt = String::new();
            for token in tokens {
                match token.kind {
                    TokenKind::Text(t) => rebuilt.push_str(t),
                    TokenKind::Output(e) => {
                        rebuilt.push_str("{{ ");
                        rebuilt.push_str(e);
                        rebuilt.push_str(" }}");
                    }
                    _ => prop_assert!(false, "unexpected token"),
                }
            }
            prop_assert_eq!(rebuilt, input);
        }

        #[test]
        fn start_end_pairs_parse(name in block_name(), content in plain_text()) {
            let input = format!("{{% start \"{name}\" %}}{content}{{% end %}}");
            let template = parse(&input).unwrap();
            let starts = template.nodes.first();
            let is_start = matches!(starts, Some(Node::Start { block, .. }) if *block == name);
            prop_assert!(is_start);
            prop_assert!(
                matches!(template.nodes.last(), Some(Node::End { .. })),
                "last node is End"
            );
        }

        #[test]
        fn nested_ifs_balance(depth in 1usize..8, content in plain_text()) {
            let mut input = String::new();
            for _ in 0..depth {
                input.push_str("{% if x %}");
            }
            input.push_str(&content);
            for _ in 0..depth {
                input.push_str("{% endif %}");
            }
            prop_assert!(parse(&input).is_ok());

            input.push_str("{% endif %}");
            let is_unexpected = matches!(parse(&input), Err(ParseError::UnexpectedTag { .. }));
            prop_assert!(is_unexpected);
        }
    }
}

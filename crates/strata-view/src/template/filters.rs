//! MiniJinja filter registration.

use minijinja::{Environment, Value};

use crate::inflect;

/// Registers all built-in filters on a minijinja environment.
///
/// | Filter       | Output                                  |
/// |--------------|-----------------------------------------|
/// | `nl`         | value followed by `\n`                  |
/// | `h`          | HTML escaped value                      |
/// | `humanize`   | `blog_posts` → `Blog Posts`             |
/// | `underscore` | `BlogPosts` → `blog_posts`              |
/// | `camelize`   | `blog_posts` → `BlogPosts`              |
/// | `slug`       | `Héllo wörld` → `Hello-world`           |
pub fn register_filters(env: &mut Environment<'static>) {
    // {{ "" | nl }} outputs a blank line.
    env.add_filter("nl", |value: Value| -> String {
        format!("{}\n", display(&value))
    });

    env.add_filter("h", |value: Value| -> String { escape_html(&display(&value)) });

    env.add_filter("humanize", |value: Value| -> String {
        inflect::humanize(&display(&value))
    });

    env.add_filter("underscore", |value: Value| -> String {
        inflect::underscore(&display(&value))
    });

    env.add_filter("camelize", |value: Value| -> String {
        inflect::camelize(&display(&value))
    });

    env.add_filter(
        "slug",
        |value: Value, replacement: Option<String>| -> String {
            inflect::slug(&display(&value), replacement.as_deref().unwrap_or("-"))
        },
    );
}

/// Renders a value as template output. `none` and undefined print nothing.
pub(crate) fn display(value: &Value) -> String {
    if value.is_undefined() || value.is_none() {
        String::new()
    } else if let Some(s) = value.as_str() {
        s.to_string()
    } else {
        value.to_string()
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str, ctx: Value) -> String {
        let mut env = Environment::new();
        register_filters(&mut env);
        env.render_str(source, ctx).unwrap()
    }

    #[test]
    fn test_nl_filter() {
        assert_eq!(render("{{ 'a' | nl }}", minijinja::context! {}), "a\n");
        assert_eq!(render("{{ none | nl }}", minijinja::context! {}), "\n");
    }

    #[test]
    fn test_h_escapes_markup() {
        let out = render(
            "{{ value | h }}",
            minijinja::context! { value => "<a href=\"x\">Tom & 'Jerry'</a>" },
        );
        assert_eq!(
            out,
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_inflection_filters() {
        let out = render(
            "{{ 'blog_posts' | humanize }}|{{ 'BlogPosts' | underscore }}|{{ 'blog_posts' | camelize }}",
            minijinja::context! {},
        );
        assert_eq!(out, "Blog Posts|blog_posts|BlogPosts");
    }

    #[test]
    fn test_slug_filter() {
        assert_eq!(
            render("{{ 'Hello big World' | slug('_') }}", minijinja::context! {}),
            "Hello_big_World"
        );
        assert_eq!(
            render("{{ 'Hello World' | slug }}", minijinja::context! {}),
            "Hello-World"
        );
    }

    #[test]
    fn test_display_values() {
        assert_eq!(display(&Value::UNDEFINED), "");
        assert_eq!(display(&Value::from(())), "");
        assert_eq!(display(&Value::from(42)), "42");
        assert_eq!(display(&Value::from("text")), "text");
    }
}

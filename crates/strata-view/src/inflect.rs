//! Name inflection used for template file names, titles and slugs.

use deunicode::deunicode;
use heck::{ToSnakeCase, ToUpperCamelCase};

/// `ViewAll` / `viewAll` to `view_all`.
pub fn underscore(name: &str) -> String {
    name.to_snake_case()
}

/// `admin_api` to `AdminApi`.
pub fn camelize(name: &str) -> String {
    name.to_upper_camel_case()
}

/// `blog_posts` to `Blog Posts`.
pub fn humanize(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Transliterates to ASCII and joins alphanumeric runs with `replacement`.
pub fn slug(text: &str, replacement: &str) -> String {
    let ascii = deunicode(text);
    let mut out = String::with_capacity(ascii.len());
    let mut pending = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending && !out.is_empty() {
                out.push_str(replacement);
            }
            pending = false;
            out.push(c);
        } else {
            pending = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscore() {
        assert_eq!(underscore("ViewAll"), "view_all");
        assert_eq!(underscore("index"), "index");
        assert_eq!(underscore("view_all"), "view_all");
    }

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("admin"), "Admin");
        assert_eq!(camelize("my_plugin"), "MyPlugin");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("posts"), "Posts");
        assert_eq!(humanize("blog_posts"), "Blog Posts");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Héllo Wörld!", "-"), "Hello-World");
        assert_eq!(slug("  a  b  ", "_"), "a_b");
    }
}

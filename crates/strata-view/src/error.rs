//! Error types for view rendering.
//!
//! Every fallible operation in this crate returns [`ViewError`]. Variants are
//! grouped into coarse [`ErrorCategory`] values so callers can react to a
//! class of failure (a missing file, a security rejection, a misuse of the
//! block API) without matching every variant.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::hooks::HookError;
use crate::paths::TemplateKind;

/// Coarse classification of a [`ViewError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A template, layout, element or parent file could not be resolved.
    NotFound,
    /// A resolved path escaped its template root.
    Security,
    /// The block or inheritance API was used incorrectly.
    Logic,
    /// Invalid configuration, cache options or data.
    Config,
    /// The template body could not be parsed or evaluated.
    Template,
    /// Reading a template from disk failed.
    Io,
    /// A hook listener aborted the render.
    Hook,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::NotFound => "not found",
            ErrorCategory::Security => "security",
            ErrorCategory::Logic => "logic",
            ErrorCategory::Config => "config",
            ErrorCategory::Template => "template",
            ErrorCategory::Io => "io",
            ErrorCategory::Hook => "hook",
        };
        f.write_str(name)
    }
}

/// Error type for all view operations.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("{kind} file \"{name}\" is missing, searched: {}", display_paths(.paths))]
    MissingTemplate {
        kind: TemplateKind,
        name: String,
        paths: Vec<PathBuf>,
    },

    #[error(
        "element \"{name}\" is missing, looked for {} in: {}",
        .candidates.join(", "),
        display_paths(.paths)
    )]
    MissingElement {
        name: String,
        candidates: Vec<String>,
        paths: Vec<PathBuf>,
    },

    #[error(
        "cannot extend an element which does not exist ({name}), searched: {}",
        display_paths(.candidates)
    )]
    MissingParent {
        name: String,
        candidates: Vec<PathBuf>,
    },

    #[error("cannot use \"{name}\" as a template, it is not within any template root")]
    OutsideTemplateRoot { name: String, path: PathBuf },

    #[error("the \"{block}\" block was left open in {}, blocks are not allowed to cross files", .path.display())]
    BlockLeftOpen { block: String, path: PathBuf },

    #[error("a block named \"{0}\" is already open")]
    BlockAlreadyOpen(String),

    #[error("no open block to end")]
    EndWithoutStart,

    #[error("templates cannot extend themselves ({})", .0.display())]
    SelfExtend(PathBuf),

    #[error("extend used outside of a template file")]
    ExtendOutsideFile,

    #[error(
        "templates cannot extend in a loop ({} extends {})",
        .child.display(),
        display_chain(.chain)
    )]
    ExtendLoop {
        child: PathBuf,
        parent: PathBuf,
        /// The parent followed by its declared ancestors.
        chain: Vec<PathBuf>,
    },

    #[error("layout name is empty while auto-layout is enabled")]
    EmptyLayout,

    #[error("template name not provided")]
    EmptyTemplateName,

    #[error("cannot cache content with an empty key")]
    EmptyCacheKey,

    #[error("unknown cache config \"{0}\"")]
    UnknownCacheConfig(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid element options: {0}")]
    InvalidOptions(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("syntax error in {}: {source}", .path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: strata_syntax::ParseError,
    },

    #[error("{}:{line}: {message}", .path.display())]
    Expression {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Hook(#[from] HookError),
}

impl ViewError {
    /// Returns the category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ViewError::MissingTemplate { .. }
            | ViewError::MissingElement { .. }
            | ViewError::MissingParent { .. } => ErrorCategory::NotFound,
            ViewError::OutsideTemplateRoot { .. } => ErrorCategory::Security,
            ViewError::BlockLeftOpen { .. }
            | ViewError::BlockAlreadyOpen(_)
            | ViewError::EndWithoutStart
            | ViewError::SelfExtend(_)
            | ViewError::ExtendLoop { .. }
            | ViewError::ExtendOutsideFile
            | ViewError::EmptyLayout
            | ViewError::EmptyTemplateName => ErrorCategory::Logic,
            ViewError::EmptyCacheKey
            | ViewError::UnknownCacheConfig(_)
            | ViewError::InvalidConfig(_)
            | ViewError::InvalidOptions(_)
            | ViewError::Serialization(_) => ErrorCategory::Config,
            ViewError::Syntax { .. } | ViewError::Expression { .. } => ErrorCategory::Template,
            ViewError::Io { .. } => ErrorCategory::Io,
            ViewError::Hook(_) => ErrorCategory::Hook,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(no paths)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl From<serde_json::Error> for ViewError {
    fn from(err: serde_json::Error) -> Self {
        ViewError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for ViewError {
    fn from(err: serde_yaml::Error) -> Self {
        ViewError::InvalidConfig(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ViewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let missing = ViewError::MissingTemplate {
            kind: TemplateKind::Layout,
            name: "default.tpl".into(),
            paths: vec![],
        };
        assert_eq!(missing.category(), ErrorCategory::NotFound);
        assert!(missing.is_not_found());

        assert_eq!(
            ViewError::OutsideTemplateRoot {
                name: "../secret".into(),
                path: "/etc/secret.tpl".into()
            }
            .category(),
            ErrorCategory::Security
        );
        assert_eq!(
            ViewError::SelfExtend("/a.tpl".into()).category(),
            ErrorCategory::Logic
        );
        assert_eq!(ViewError::EmptyCacheKey.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_block_left_open_display() {
        let err = ViewError::BlockLeftOpen {
            block: "sidebar".into(),
            path: "/t/index.tpl".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"sidebar\""));
        assert!(msg.contains("cross files"));
    }

    #[test]
    fn test_missing_element_lists_candidates() {
        let err = ViewError::MissingElement {
            name: "Blog.recent".into(),
            candidates: vec!["Blog.recent.tpl".into(), "recent.tpl".into()],
            paths: vec!["/app/element".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Blog.recent.tpl, recent.tpl"));
        assert!(msg.contains("/app/element"));
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<Vec<String>>("{").unwrap_err();
        let err: ViewError = yaml_err.into();
        assert_eq!(err.category(), ErrorCategory::Config);
    }
}

//! Child to parent declarations for template inheritance.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, ViewError};

/// Ancestor map for one render pass.
///
/// Each file may declare one parent. Declarations that would make a file
/// its own ancestor are rejected before they are recorded.
#[derive(Debug, Clone, Default)]
pub struct AncestorMap {
    parents: HashMap<PathBuf, PathBuf>,
}

impl AncestorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `child` extends `parent`.
    pub fn declare_extends(&mut self, child: &Path, parent: &Path) -> Result<()> {
        if child == parent {
            return Err(ViewError::SelfExtend(child.to_path_buf()));
        }

        // Walk the parent's chain; reaching the child closes a loop. The map
        // has no cycles, so the chain is at most `len` long.
        let mut cursor = parent;
        for _ in 0..=self.parents.len() {
            match self.parents.get(cursor) {
                Some(next) if next == child => {
                    let mut chain = vec![parent.to_path_buf()];
                    chain.extend(self.ancestors(parent).into_iter().map(Path::to_path_buf));
                    return Err(ViewError::ExtendLoop {
                        child: child.to_path_buf(),
                        parent: parent.to_path_buf(),
                        chain,
                    });
                }
                Some(next) => cursor = next.as_path(),
                None => break,
            }
        }

        self.parents
            .insert(child.to_path_buf(), parent.to_path_buf());
        Ok(())
    }

    pub fn parent_of(&self, child: &Path) -> Option<&Path> {
        self.parents.get(child).map(PathBuf::as_path)
    }

    /// Full ancestor chain of `child`, nearest first.
    pub fn ancestors(&self, child: &Path) -> Vec<&Path> {
        let mut chain = Vec::new();
        let mut cursor = child;
        while let Some(parent) = self.parent_of(cursor) {
            if chain.len() > self.parents.len() {
                break;
            }
            chain.push(parent);
            cursor = parent;
        }
        chain
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn test_simple_extend() {
        let mut map = AncestorMap::new();
        map.declare_extends(&p("/child"), &p("/parent")).unwrap();
        assert_eq!(map.parent_of(&p("/child")), Some(p("/parent").as_path()));
        assert_eq!(map.parent_of(&p("/parent")), None);
    }

    #[test]
    fn test_self_extend_is_rejected() {
        let mut map = AncestorMap::new();
        let err = map.declare_extends(&p("/a"), &p("/a")).unwrap_err();
        assert!(matches!(err, ViewError::SelfExtend(_)));
        assert!(map.is_empty());
    }

    #[test]
    fn test_two_file_loop() {
        let mut map = AncestorMap::new();
        map.declare_extends(&p("/a"), &p("/b")).unwrap();
        let err = map.declare_extends(&p("/b"), &p("/a")).unwrap_err();
        assert!(matches!(err, ViewError::ExtendLoop { .. }));
    }

    #[test]
    fn test_transitive_loop() {
        let mut map = AncestorMap::new();
        map.declare_extends(&p("/a"), &p("/b")).unwrap();
        map.declare_extends(&p("/b"), &p("/c")).unwrap();
        let err = map.declare_extends(&p("/c"), &p("/a")).unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Logic);
        match &err {
            ViewError::ExtendLoop { chain, .. } => {
                assert_eq!(chain, &vec![p("/a"), p("/b"), p("/c")]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "templates cannot extend in a loop (/c extends /a -> /b -> /c)"
        );
        assert_eq!(map.parent_of(&p("/c")), None);
    }

    #[test]
    fn test_ancestors_chain() {
        let mut map = AncestorMap::new();
        map.declare_extends(&p("/a"), &p("/b")).unwrap();
        map.declare_extends(&p("/b"), &p("/c")).unwrap();
        assert_eq!(
            map.ancestors(&p("/a")),
            vec![p("/b").as_path(), p("/c").as_path()]
        );
    }

    #[test]
    fn test_redeclare_replaces_parent() {
        let mut map = AncestorMap::new();
        map.declare_extends(&p("/a"), &p("/b")).unwrap();
        map.declare_extends(&p("/a"), &p("/c")).unwrap();
        assert_eq!(map.parent_of(&p("/a")), Some(p("/c").as_path()));
    }
}

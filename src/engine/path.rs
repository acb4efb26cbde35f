// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Newtype wrapper for the ancestry of a node, root first.
///
/// Paths exist purely for diagnostics. Every branch of a recursive walk gets its
/// own copy via [`NodePath::child`], so siblings never see each other's names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath(pub Vec<String>);

impl NodePath {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Return a new path extended with `name`, leaving `self` untouched.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend(self.0.iter().cloned());
        segments.push(name.into());
        Self(segments)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Name of the deepest node on the path.
    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        write!(f, "{}", self.0.join("."))
    }
}

impl From<Vec<String>> for NodePath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<&[&str]> for NodePath {
    fn from(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_does_not_mutate_parent() {
        let root = NodePath::new().child("web");
        let left = root.child("frontend");
        let right = root.child("backend");

        assert_eq!(root.to_string(), "web");
        assert_eq!(left.to_string(), "web.frontend");
        assert_eq!(right.to_string(), "web.backend");
        assert_eq!(right.leaf(), Some("backend"));
    }

    #[test]
    fn test_empty_path_display() {
        let path = NodePath::new();
        assert!(path.is_empty());
        assert_eq!(path.to_string(), "<root>");
        assert_eq!(path.leaf(), None);
    }
}

//! The [`Path`] data type: an immutable, ordered sequence of path components.
//!
//! Mirrors the teacher's convention of a small, self-contained module with its
//! own `Error` enum (see [`crate::storage::Error`], [`crate::naming::Error`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors raised while constructing or navigating a [`Path`].
///
/// These are the *programmer-error* members of the crate's error taxonomy:
/// they are raised for malformed input or illegal navigation, never as part
/// of ordinary control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The string form did not start with `/`.
    MissingLeadingSlash,
    /// A component was empty (e.g. `//`, or a trailing `/`).
    EmptyComponent,
    /// A component contained a `/` or a `:`.
    InvalidComponent(String),
    /// [`Path::parent`] or [`Path::last_component`] was called on the root path.
    RootHasNoParent,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::MissingLeadingSlash => write!(f, "path must start with '/'"),
            PathError::EmptyComponent => write!(f, "path contains an empty component"),
            PathError::InvalidComponent(c) => {
                write!(f, "component {c:?} contains '/' or ':'")
            }
            PathError::RootHasNoParent => write!(f, "the root path has no parent"),
        }
    }
}

impl std::error::Error for PathError {}

/// An immutable, ordered sequence of non-empty path components.
///
/// The root path has zero components and renders as `"/"`. Equality, hashing
/// and ordering are all component-wise. See `spec.md` §3 for the full
/// contract, in particular the distinction between `isSubpath`-style
/// equal-or-prefix tests and the *strict* prefix test [`Path::is_strict_prefix_of`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    components: Vec<String>,
}

impl Path {
    /// The root path (zero components).
    pub fn root() -> Path {
        Path { components: Vec::new() }
    }

    /// Builds a path from an already-validated component list.
    ///
    /// Used internally by [`Path::join`] and the registration path. Public
    /// callers should go through [`Path::from_str`] / [`str::parse`].
    fn from_components(components: Vec<String>) -> Result<Path, PathError> {
        for c in &components {
            validate_component(c)?;
        }
        Ok(Path { components })
    }

    /// True iff this is the root path.
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// The path's components, in order.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Iterates over the components in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(String::as_str)
    }

    /// The parent path. Fails with [`PathError::RootHasNoParent`] on root.
    pub fn parent(&self) -> Result<Path, PathError> {
        if self.is_root() {
            return Err(PathError::RootHasNoParent);
        }
        Ok(Path { components: self.components[..self.components.len() - 1].to_vec() })
    }

    /// The final component. Fails with [`PathError::RootHasNoParent`] on root.
    pub fn last_component(&self) -> Result<&str, PathError> {
        self.components.last().map(String::as_str).ok_or(PathError::RootHasNoParent)
    }

    /// Builds the child path `self / name`.
    pub fn join(&self, name: &str) -> Result<Path, PathError> {
        validate_component(name)?;
        let mut components = self.components.clone();
        components.push(name.to_owned());
        Ok(Path { components })
    }

    /// Every proper prefix of this path, root first, not including `self`.
    pub fn proper_prefixes(&self) -> Vec<Path> {
        (0..self.components.len())
            .map(|n| Path { components: self.components[..n].to_vec() })
            .collect()
    }

    /// Strict-prefix test: `self ⊏ other` iff `self`'s components are a
    /// proper (strictly shorter) prefix of `other`'s.
    ///
    /// Equal paths are *not* strict prefixes of each other — this is the
    /// corrected semantics called out in `spec.md` §9 note 2; the original
    /// source's `isSubpath` conflates "equal or strict prefix".
    pub fn is_strict_prefix_of(&self, other: &Path) -> bool {
        self.components.len() < other.components.len()
            && other.components[..self.components.len()] == self.components[..]
    }

    /// True iff `other` is an immediate child of `self` (`other.parent() == self`).
    pub fn is_immediate_parent_of(&self, other: &Path) -> bool {
        other.components.len() == self.components.len() + 1
            && other.components[..self.components.len()] == self.components[..]
    }

    /// Relative filesystem path under some storage root (no leading `/`).
    pub fn to_relative_path(&self) -> std::path::PathBuf {
        self.components.iter().collect()
    }
}

fn validate_component(c: &str) -> Result<(), PathError> {
    if c.is_empty() {
        return Err(PathError::EmptyComponent);
    }
    if c.contains('/') || c.contains(':') {
        return Err(PathError::InvalidComponent(c.to_owned()));
    }
    Ok(())
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "/");
        }
        write!(f, "/{}", self.components.join("/"))
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Path, PathError> {
        if s == "/" {
            return Ok(Path::root());
        }
        let rest = s.strip_prefix('/').ok_or(PathError::MissingLeadingSlash)?;
        let components: Vec<String> = rest.split('/').map(str::to_owned).collect();
        Path::from_components(components)
    }
}

impl Serialize for Path {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D>(deserializer: D) -> Result<Path, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_renders_as_slash() {
        assert_eq!(Path::root().to_string(), "/");
        assert!(Path::root().is_root());
    }

    #[test]
    fn round_trip() {
        let p: Path = "/a/b/c".parse().unwrap();
        assert_eq!(p.to_string(), "/a/b/c");
        assert_eq!(p.to_string().parse::<Path>().unwrap(), p);
    }

    #[test]
    fn missing_leading_slash_is_an_error() {
        assert_eq!("foo".parse::<Path>(), Err(PathError::MissingLeadingSlash));
    }

    #[test]
    fn colon_in_component_is_an_error() {
        assert!(matches!(
            "/a:b".parse::<Path>(),
            Err(PathError::InvalidComponent(_))
        ));
    }

    #[test]
    fn root_parent_is_an_error() {
        assert_eq!(Path::root().parent(), Err(PathError::RootHasNoParent));
    }

    #[test]
    fn parent_and_last_component() {
        let p: Path = "/a/b/c".parse().unwrap();
        assert_eq!(p.parent().unwrap().to_string(), "/a/b");
        assert_eq!(p.last_component().unwrap(), "c");
    }

    #[test]
    fn strict_prefix_excludes_equal_paths() {
        let a: Path = "/a".parse().unwrap();
        let b: Path = "/a/b".parse().unwrap();
        assert!(a.is_strict_prefix_of(&b));
        assert!(!a.is_strict_prefix_of(&a));
        assert!(!b.is_strict_prefix_of(&a));
    }

    #[test]
    fn immediate_parent() {
        let d: Path = "/d".parse().unwrap();
        let e: Path = "/d/e".parse().unwrap();
        let f: Path = "/d/e/f".parse().unwrap();
        assert!(d.is_immediate_parent_of(&e));
        assert!(!d.is_immediate_parent_of(&f));
    }

    #[test]
    fn join_builds_child() {
        let d: Path = "/d".parse().unwrap();
        assert_eq!(d.join("e").unwrap().to_string(), "/d/e");
    }
}

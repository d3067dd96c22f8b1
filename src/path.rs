//! Field-path addressing for nested form models.
//!
//! A field path is a sequence of segments locating one field inside a
//! nested model tree. Object fields contribute their name, array elements
//! contribute their numeric index. The rendered form joins segments with
//! `.`, e.g. `address.city.name` or `subModels.0.name`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A single segment in a field path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Seg {
    /// Named field of an object node.
    Field(String),
    /// Index into an array node.
    Index(usize),
}

impl Seg {
    /// Create a field segment.
    #[inline]
    pub fn field(name: impl Into<String>) -> Self {
        Seg::Field(name.into())
    }

    /// Create an index segment.
    #[inline]
    pub fn index(i: usize) -> Self {
        Seg::Index(i)
    }

    /// Get the field name if this is a field segment.
    #[inline]
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Seg::Field(name) => Some(name),
            Seg::Index(_) => None,
        }
    }

    /// Get the index if this is an index segment.
    #[inline]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Seg::Field(_) => None,
            Seg::Index(i) => Some(*i),
        }
    }
}

impl fmt::Display for Seg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seg::Field(name) => write!(f, "{}", name),
            Seg::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for Seg {
    fn from(s: &str) -> Self {
        Seg::Field(s.to_owned())
    }
}

impl From<String> for Seg {
    fn from(s: String) -> Self {
        Seg::Field(s)
    }
}

impl From<usize> for Seg {
    fn from(i: usize) -> Self {
        Seg::Index(i)
    }
}

/// A complete path addressing one field in a model tree.
///
/// Paths are immutable value objects; builder methods return new paths.
///
/// # Examples
///
/// ```
/// use valiform::FieldPath;
///
/// let path = FieldPath::root().field("subModels").index(0).field("name");
/// assert_eq!(path.to_string(), "subModels.0.name");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<Seg>);

impl FieldPath {
    /// Create an empty path (the model root).
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from a vector of segments.
    #[inline]
    pub fn from_segments(segments: Vec<Seg>) -> Self {
        Self(segments)
    }

    /// Append a field segment and return self (builder pattern).
    #[inline]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.0.push(Seg::Field(name.into()));
        self
    }

    /// Append an index segment and return self (builder pattern).
    #[inline]
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Seg::Index(i));
        self
    }

    /// Push a segment onto the path (mutating).
    #[inline]
    pub fn push(&mut self, seg: Seg) {
        self.0.push(seg);
    }

    /// Return a new path with `seg` prepended.
    ///
    /// This is the qualification step ancestors apply to a descendant's
    /// local path: `name` prefixed with the segment `0` and then the field
    /// `subModels` becomes `subModels.0.name`.
    #[inline]
    pub fn prefixed(&self, seg: impl Into<Seg>) -> FieldPath {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.push(seg.into());
        segments.extend(self.0.iter().cloned());
        FieldPath(segments)
    }

    /// Join this path with another path.
    #[inline]
    pub fn join(&self, other: &FieldPath) -> FieldPath {
        let mut result = self.clone();
        result.0.extend(other.0.iter().cloned());
        result
    }

    /// Get the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    /// Check if this path is empty (root).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of segments in this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get the first segment.
    #[inline]
    pub fn first(&self) -> Option<&Seg> {
        self.0.first()
    }

    /// Get the last segment.
    #[inline]
    pub fn last(&self) -> Option<&Seg> {
        self.0.last()
    }

    /// Iterate over the segments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Seg> {
        self.0.iter()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = std::convert::Infallible;

    /// Parse a dot-joined path. Segments that parse as a non-negative
    /// integer become index segments; everything else is a field name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(FieldPath::root());
        }
        let segments = s
            .split('.')
            .filter(|seg| !seg.is_empty())
            .map(|seg| match seg.parse::<usize>() {
                Ok(i) => Seg::Index(i),
                Err(_) => Seg::Field(seg.to_owned()),
            })
            .collect();
        Ok(FieldPath(segments))
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromIterator<Seg> for FieldPath {
    fn from_iter<I: IntoIterator<Item = Seg>>(iter: I) -> Self {
        FieldPath(iter.into_iter().collect())
    }
}

impl IntoIterator for FieldPath {
    type Item = Seg;
    type IntoIter = std::vec::IntoIter<Seg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldPath {
    type Item = &'a Seg;
    type IntoIter = std::slice::Iter<'a, Seg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for FieldPath {
    type Output = Seg;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

// Paths serialize as their dot-joined string form, which is also the shape
// the blur-tracking contract exchanges with state owners.

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Construct a `FieldPath` from a sequence of segments.
///
/// # Examples
///
/// ```
/// use valiform::path;
///
/// // String literals become Field segments, numbers become Index segments
/// let p = path!("subModels", 0, "name");
/// assert_eq!(p.to_string(), "subModels.0.name");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::FieldPath::root()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = $crate::FieldPath::root();
        $(
            p.push($crate::Seg::from($seg));
        )+
        p
    }};
}

use std::fmt;
use std::ops::Deref;

use thiserror::Error;

/// A single `/`-separated piece of a [`Pattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the corresponding path segment byte-for-byte.
    Literal(String),
    /// `{name}`: captures the corresponding path segment under `name`.
    Placeholder(String),
}

impl Segment {
    /// Classify one raw pattern segment.
    ///
    /// A segment is a placeholder only when it both starts with `{` and ends
    /// with `}`. `{}` is a placeholder with an empty name.
    pub fn classify(raw: &str) -> Segment {
        match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => Segment::Placeholder(name.to_string()),
            None => Segment::Literal(raw.to_string()),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Segment::Placeholder(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => f.write_str(text),
            Segment::Placeholder(name) => write!(f, "{{{}}}", name),
        }
    }
}

/// The ways a path can fail to match a pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("pattern `{pattern}` has {pattern_segments} segments but path `{path}` has {path_segments}")]
    LengthMismatch {
        pattern: String,
        path: String,
        pattern_segments: usize,
        path_segments: usize,
    },
    #[error("pattern `{pattern}` does not match path `{path}`: expected `{expected}` at segment {position}, found `{found}`")]
    SegmentMismatch {
        pattern: String,
        path: String,
        /// Zero-based index of the offending segment.
        position: usize,
        expected: String,
        found: String,
    },
}

/// A pattern split into segments, reusable across many paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Split `pattern` on `/`. Empty segments are kept, nothing is trimmed.
    pub fn parse(pattern: &str) -> Pattern {
        Pattern {
            source: pattern.to_string(),
            segments: pattern.split('/').map(Segment::classify).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in left-to-right order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match `path` against this pattern, capturing every placeholder.
    ///
    /// The segment counts are compared before any segment is; the first
    /// literal that differs aborts the match.
    pub fn match_path<'p, 'v>(&'p self, path: &'v str) -> Result<Capture<'p, 'v>, MatchError> {
        let path_segments: Vec<&str> = path.split('/').collect();
        if path_segments.len() != self.segments.len() {
            return Err(MatchError::LengthMismatch {
                pattern: self.source.clone(),
                path: path.to_string(),
                pattern_segments: self.segments.len(),
                path_segments: path_segments.len(),
            });
        }

        let mut capture = Capture::new();
        for (position, (segment, value)) in self.segments.iter().zip(path_segments).enumerate() {
            match segment {
                Segment::Placeholder(name) => {
                    tracing::trace!(placeholder = name.as_str(), value, "captured path segment");
                    capture.pairs.push((name.as_str(), value));
                }
                Segment::Literal(text) if text == value => {}
                Segment::Literal(text) => {
                    return Err(MatchError::SegmentMismatch {
                        pattern: self.source.clone(),
                        path: path.to_string(),
                        position,
                        expected: text.clone(),
                        found: value.to_string(),
                    });
                }
            }
        }
        Ok(capture)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// `(placeholder, value)` pairs in pattern order, borrowed from the pattern
/// and the path.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Capture<'p, 'v> {
    pairs: Vec<(&'p str, &'v str)>,
}

impl<'p, 'v> Capture<'p, 'v> {
    fn new() -> Self {
        Capture { pairs: Vec::new() }
    }

    /// First value captured under `name`.
    pub fn get(&self, name: &str) -> Option<&'v str> {
        self.pairs
            .iter()
            .find_map(|&(key, value)| if key == name { Some(value) } else { None })
    }
}

impl<'p, 'v> FromIterator<(&'p str, &'v str)> for Capture<'p, 'v> {
    fn from_iter<I: IntoIterator<Item = (&'p str, &'v str)>>(iter: I) -> Self {
        Capture {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl<'p, 'v> Deref for Capture<'p, 'v> {
    type Target = [(&'p str, &'v str)];

    fn deref(&self) -> &Self::Target {
        &self.pairs
    }
}

impl fmt::Debug for Capture<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.pairs.iter()).finish()
    }
}


// Path expression syntax tree and concrete locations

use std::fmt;

/// A parsed path expression, always anchored at the root `$`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpr {
    /// Segments following the root
    pub segments: Vec<Segment>,
}

impl PathExpr {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// The bare root path `$`.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Split off the final segment, returning the parent path and that segment.
    ///
    /// Returns `None` for the root path.
    pub fn split_last(&self) -> Option<(PathExpr, &Segment)> {
        let (last, rest) = self.segments.split_last()?;
        Some((PathExpr::new(rest.to_vec()), last))
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for seg in &self.segments {
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

/// One step of a path expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Member access: `.key`, `['key']`
    Child(String),
    /// Array index: `[0]`, `[-1]`
    Index(i64),
    /// Array slice: `[start:end:step]`
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    },
    /// All children: `.*`, `[*]`
    Wildcard,
    /// Descendant members with a given name: `..key`
    Descendant(String),
    /// All descendants: `..*`
    DescendantWildcard,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Child(key) if is_plain_name(key) => write!(f, ".{}", key),
            Segment::Child(key) => write!(f, "['{}']", escape_quoted(key)),
            Segment::Index(i) => write!(f, "[{}]", i),
            Segment::Slice { start, end, step } => {
                write!(f, "[")?;
                if let Some(s) = start {
                    write!(f, "{}", s)?;
                }
                write!(f, ":")?;
                if let Some(e) = end {
                    write!(f, "{}", e)?;
                }
                if let Some(st) = step {
                    write!(f, ":{}", st)?;
                }
                write!(f, "]")
            }
            Segment::Wildcard => write!(f, "[*]"),
            Segment::Descendant(key) => write!(f, "..{}", key),
            Segment::DescendantWildcard => write!(f, "..*"),
        }
    }
}

/// Characters allowed in an unquoted member name.
pub(crate) fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn is_plain_name(key: &str) -> bool {
    !key.is_empty() && key.chars().all(is_name_char)
}

fn escape_quoted(key: &str) -> String {
    key.replace('\\', "\\\\").replace('\'', "\\'")
}

/// One step of a concrete location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    Key(String),
    Index(usize),
}

/// The concrete address of a single node, as produced by [`crate::evaluator::locate`].
///
/// Displays as a normalized path, e.g. `$['store']['book'][0]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location {
    pub steps: Vec<Step>,
}

impl Location {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// A new location one step below this one.
    pub fn child(&self, step: Step) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend(self.steps.iter().cloned());
        steps.push(step);
        Self { steps }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for step in &self.steps {
            match step {
                Step::Key(key) => write!(f, "['{}']", escape_quoted(key))?,
                Step::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Hierarchical names for parameters, columns and index levels.
//!
//! A [`Label`] is a non-empty path of string segments. A single segment is a
//! plain name (`"layer"`), several segments form a hierarchical key such as
//! `("pre_synaptic", "mtype")`. In JSON a plain name encodes as a string and a
//! path as an array of strings.

use crate::error::{StructureError, StructureResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "LabelRepr", into = "LabelRepr")]
pub struct Label {
    segments: Vec<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LabelRepr {
    Name(String),
    Path(Vec<String>),
}

impl TryFrom<LabelRepr> for Label {
    type Error = StructureError;

    fn try_from(repr: LabelRepr) -> Result<Self, Self::Error> {
        match repr {
            LabelRepr::Name(name) => Ok(Label::new(name)),
            LabelRepr::Path(segments) => Label::from_segments(segments),
        }
    }
}

impl From<Label> for LabelRepr {
    fn from(label: Label) -> Self {
        let mut segments = label.segments;
        if segments.len() == 1 {
            LabelRepr::Name(segments.remove(0))
        } else {
            LabelRepr::Path(segments)
        }
    }
}

impl Label {
    /// A plain, single-segment name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// A two-segment hierarchical name
    pub fn pair(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            segments: vec![first.into(), second.into()],
        }
    }

    /// Build a label from path segments.
    ///
    /// # Errors
    ///
    /// Returns `StructureError::MalformedParameterKey` for an empty path.
    pub fn from_segments<I, S>(segments: I) -> StructureResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(StructureError::malformed("()", "a key needs at least one segment"));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of path segments (1 for a plain name)
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// First path segment
    pub fn first(&self) -> &str {
        &self.segments[0]
    }

    /// Segment at `level`, if the label is deep enough
    pub fn level(&self, level: usize) -> Option<&str> {
        self.segments.get(level).map(String::as_str)
    }

    /// Everything after the first segment, `None` for a plain name
    pub fn rest(&self) -> Option<Label> {
        if self.segments.len() > 1 {
            Some(Label {
                segments: self.segments[1..].to_vec(),
            })
        } else {
            None
        }
    }

    /// Concatenate two paths
    pub fn join(&self, other: &Label) -> Label {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Label { segments }
    }

    /// Prefix this label with a new leading segment
    pub fn prefixed(&self, head: impl Into<String>) -> Label {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(head.into());
        segments.extend(self.segments.iter().cloned());
        Label { segments }
    }

    /// True for the single empty-string name that encodes "no sub-structure"
    pub fn is_blank(&self) -> bool {
        self.segments.len() == 1 && self.segments[0].is_empty()
    }

    /// True for a plain name equal to `name`
    pub fn is_name(&self, name: &str) -> bool {
        self.segments.len() == 1 && self.segments[0] == name
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.segments.len() == 1 {
            write!(f, "{}", self.segments[0])
        } else {
            write!(f, "({})", self.segments.join(", "))
        }
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Label::new(name)
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Label::new(name)
    }
}

impl From<&String> for Label {
    fn from(name: &String) -> Self {
        Label::new(name.clone())
    }
}

impl From<(&str, &str)> for Label {
    fn from((first, second): (&str, &str)) -> Self {
        Label::pair(first, second)
    }
}

impl From<&Label> for Label {
    fn from(label: &Label) -> Self {
        label.clone()
    }
}

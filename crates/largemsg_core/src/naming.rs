//! Object key layout for backed payloads.
//!
//! Keys have the form `{base path}/{topic}/{keys|values}/{uuid}`. Empty
//! segments are dropped, so a base path without a path component yields
//! `{topic}/{role}/{uuid}`.

use crate::error::{CoreError, CoreResult};
use largemsg_codec::Location;
use std::fmt;
use uuid::Uuid;

/// Which half of a record a payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordRole {
    /// The record key.
    Key,
    /// The record value.
    Value,
}

impl RecordRole {
    /// Key segment for record keys.
    pub const KEYS: &'static str = "keys";
    /// Key segment for record values.
    pub const VALUES: &'static str = "values";

    /// Maps a host `is_key` flag to a role.
    #[must_use]
    pub const fn from_is_key(is_key: bool) -> Self {
        if is_key {
            Self::Key
        } else {
            Self::Value
        }
    }

    /// Returns the key segment for this role.
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Key => Self::KEYS,
            Self::Value => Self::VALUES,
        }
    }

    /// Parses a key segment.
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            Self::KEYS => Some(Self::Key),
            Self::VALUES => Some(Self::Value),
            _ => None,
        }
    }
}

impl fmt::Display for RecordRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Generates a fresh object key for a payload of `topic`.
///
/// # Errors
///
/// Returns [`CoreError::MissingBasePath`] if `base_path` is `None`.
pub fn make_key(base_path: Option<&Location>, topic: &str, role: RecordRole) -> CoreResult<String> {
    let base = base_path.ok_or(CoreError::MissingBasePath)?;
    let id = Uuid::new_v4().to_string();
    Ok(join_segments(&[base.path(), topic, role.segment(), &id]))
}

/// Returns the prefix shared by every key generated for `topic`, limited to
/// one role if given. The prefix ends with `/` so that `orders` does not
/// match `orders2`.
///
/// # Errors
///
/// Returns [`CoreError::MissingBasePath`] if `base_path` is `None`.
pub fn topic_prefix(
    base_path: Option<&Location>,
    topic: &str,
    role: Option<RecordRole>,
) -> CoreResult<String> {
    let base = base_path.ok_or(CoreError::MissingBasePath)?;
    let mut prefix = match role {
        Some(role) => join_segments(&[base.path(), topic, role.segment()]),
        None => join_segments(&[base.path(), topic]),
    };
    prefix.push('/');
    Ok(prefix)
}

fn join_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

//! Skill identifiers.
//!
//! Skill content (costs, ranges, effects) is configuration supplied from
//! outside the core; within the core a skill is only ever named by id.

use serde::{Deserialize, Serialize};

/// Content identifier of a skill, e.g. `"move"` or `"cleave"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(String);

impl SkillId {
    /// Wrap a content id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SkillId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SkillId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

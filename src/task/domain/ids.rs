//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a delegated task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a task identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for TaskId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = TaskDomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTaskId);
        }
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|_| TaskDomainError::MalformedTaskId(value.to_owned()))
    }
}

/// Caller-supplied task text, trimmed and length-checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDescription(String);

impl TaskDescription {
    /// Creates a validated description no longer than `max_chars`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyDescription`] when the value is blank
    /// and [`TaskDomainError::DescriptionTooLong`] when it exceeds the limit.
    pub fn new(value: impl Into<String>, max_chars: usize) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyDescription);
        }
        let length = trimmed.chars().count();
        if length > max_chars {
            return Err(TaskDomainError::DescriptionTooLong {
                length,
                max: max_chars,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the description as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskDescription {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional supplementary text delivered alongside a description.
///
/// Context is bounded independently from the description and is kept
/// verbatim; blank context is treated as absent by [`TaskContext::optional`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskContext(String);

impl TaskContext {
    /// Creates validated context text no longer than `max_chars`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ContextTooLong`] when the value exceeds the
    /// limit.
    pub fn new(value: impl Into<String>, max_chars: usize) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let length = raw.chars().count();
        if length > max_chars {
            return Err(TaskDomainError::ContextTooLong {
                length,
                max: max_chars,
            });
        }
        Ok(Self(raw))
    }

    /// Validates optional context, mapping blank text to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::ContextTooLong`] when the value exceeds the
    /// limit.
    pub fn optional(
        value: Option<String>,
        max_chars: usize,
    ) -> Result<Option<Self>, TaskDomainError> {
        value
            .filter(|text| !text.trim().is_empty())
            .map(|text| Self::new(text, max_chars))
            .transpose()
    }

    /// Returns the context as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskContext {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Completion percentage in the range `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Progress(u8);

impl Progress {
    /// No work recorded.
    pub const ZERO: Self = Self(0);

    /// All work recorded.
    pub const COMPLETE: Self = Self(100);

    /// Creates a percentage, saturating values above 100.
    #[must_use]
    pub const fn saturating(percent: u8) -> Self {
        if percent > 100 {
            Self::COMPLETE
        } else {
            Self(percent)
        }
    }

    /// Returns the percentage of `done` out of `total` steps.
    ///
    /// A zero `total` is treated as finished work.
    #[must_use]
    pub fn of_steps(done: u32, total: u32) -> Self {
        let scaled = u64::from(done.min(total)).saturating_mul(100);
        let percent = scaled.checked_div(u64::from(total)).unwrap_or(100);
        Self::saturating(u8::try_from(percent).unwrap_or(100))
    }

    /// Returns the numeric percentage.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Maximum number of records returned by a single listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListLimit(usize);

impl ListLimit {
    /// Largest permitted listing size.
    pub const MAX: usize = 100;

    /// Listing size used when the caller does not supply one.
    pub const DEFAULT: Self = Self(10);

    /// Creates a validated listing limit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidListLimit`] when the value is zero or
    /// exceeds [`ListLimit::MAX`].
    pub const fn new(value: usize) -> Result<Self, TaskDomainError> {
        if value == 0 || value > Self::MAX {
            return Err(TaskDomainError::InvalidListLimit {
                requested: value,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    /// Returns the numeric limit.
    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }
}

impl Default for ListLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

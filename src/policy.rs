use {
    itertools::Itertools,
    std::{fmt, str::FromStr},
};

/// How a worker treats records that lack the attributes it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Policy {
    /// Fail on the first malformed record, naming its index and the offending attribute.
    #[default]
    Strict,
    /// Substitute [`crate::input::MISSING_KEY`] for absent keys and `null` for absent values.
    Permissive,
}

impl Policy {
    pub const ALL: [Policy; 2] = [Policy::Strict, Policy::Permissive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Strict => "strict",
            Policy::Permissive => "permissive",
        }
    }

    pub fn is_permissive(&self) -> bool {
        matches!(self, Policy::Permissive)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown policy '{value}', expected one of: {expected}")]
pub struct ParsePolicyError {
    value: String,
    expected: String,
}

impl FromStr for Policy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Policy::ALL
            .into_iter()
            .find(|policy| policy.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParsePolicyError {
                value: s.to_string(),
                expected: Policy::ALL.iter().map(Policy::as_str).join(", "),
            })
    }
}

impl ParsePolicyError {
    pub fn value(&self) -> &str {
        &self.value
    }
}

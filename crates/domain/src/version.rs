use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Client agent version in `major.minor.fix[-postfix]` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientVersion {
    major: u32,
    minor: u32,
    fix: u32,
    postfix: Option<String>,
}

impl ClientVersion {
    /// Creates a release version without postfix.
    #[must_use]
    pub fn new(major: u32, minor: u32, fix: u32) -> Self {
        Self {
            major,
            minor,
            fix,
            postfix: None,
        }
    }

    /// Parses a version reported by a client agent.
    ///
    /// Missing trailing segments default to `0` and segments past the third
    /// are ignored. Returns `None` for blank input, a leading `-`, or any
    /// non-numeric segment.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().is_empty() {
            return None;
        }

        let (numeric, postfix) = match value.find('-') {
            Some(0) => return None,
            Some(index) => {
                let postfix = &value[index + 1..];
                (
                    &value[..index],
                    (!postfix.is_empty()).then(|| postfix.to_owned()),
                )
            }
            None => (value, None),
        };

        let mut segments = [0_u32; 3];
        let mut rest = numeric;
        for segment in &mut segments {
            match rest.split_once('.') {
                Some((head, tail)) => {
                    *segment = head.parse().ok()?;
                    rest = tail;
                }
                None => {
                    if !rest.is_empty() {
                        *segment = rest.parse().ok()?;
                    }
                    break;
                }
            }
        }

        let [major, minor, fix] = segments;
        Some(Self {
            major,
            minor,
            fix,
            postfix,
        })
    }

    /// Returns the optional postfix such as `SNAPSHOT`.
    #[must_use]
    pub fn postfix(&self) -> Option<&str> {
        self.postfix.as_deref()
    }

    /// Compares numeric segments only; postfixes are ignored.
    #[must_use]
    pub fn is_at_least(&self, other: &Self) -> bool {
        (self.major, self.minor, self.fix) >= (other.major, other.minor, other.fix)
    }
}

impl Display for ClientVersion {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}.{}.{}", self.major, self.minor, self.fix)?;
        if let Some(postfix) = &self.postfix {
            write!(formatter, "-{postfix}")?;
        }
        Ok(())
    }
}

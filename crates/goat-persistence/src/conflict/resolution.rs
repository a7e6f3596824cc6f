use goat_core::GoatError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How to settle detected sync conflicts for a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictResolution {
    /// Discard all local state and resync from the server
    UseRemote,
    /// Keep local state; it is already what the user sees
    KeepLocal,
}

impl ConflictResolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UseRemote => "use-remote",
            Self::KeepLocal => "keep-local",
        }
    }
}

impl fmt::Display for ConflictResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictResolution {
    type Err = GoatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "use-remote" => Ok(Self::UseRemote),
            "keep-local" => Ok(Self::KeepLocal),
            other => Err(GoatError::Validation(format!(
                "unknown conflict resolution {:?}",
                other
            ))),
        }
    }
}

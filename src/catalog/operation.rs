//! The closed set of engine operations this client knows how to call.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A remote engine operation, named after the engine API's operation ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SwarmInspect,
    SwarmInit,
    SwarmJoin,
    SwarmLeave,
    SwarmUpdate,
    SwarmUnlockKey,
    SwarmUnlock,
    NodeList,
    NodeInspect,
    NodeUpdate,
    NodeDelete,
    SecretList,
    SecretInspect,
    SecretCreate,
    SecretUpdate,
    SecretDelete,
}

impl Operation {
    /// Every operation, in catalog order
    pub const ALL: [Operation; 16] = [
        Operation::SwarmInspect,
        Operation::SwarmInit,
        Operation::SwarmJoin,
        Operation::SwarmLeave,
        Operation::SwarmUpdate,
        Operation::SwarmUnlockKey,
        Operation::SwarmUnlock,
        Operation::NodeList,
        Operation::NodeInspect,
        Operation::NodeUpdate,
        Operation::NodeDelete,
        Operation::SecretList,
        Operation::SecretInspect,
        Operation::SecretCreate,
        Operation::SecretUpdate,
        Operation::SecretDelete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SwarmInspect => "SwarmInspect",
            Self::SwarmInit => "SwarmInit",
            Self::SwarmJoin => "SwarmJoin",
            Self::SwarmLeave => "SwarmLeave",
            Self::SwarmUpdate => "SwarmUpdate",
            Self::SwarmUnlockKey => "SwarmUnlockKey",
            Self::SwarmUnlock => "SwarmUnlock",
            Self::NodeList => "NodeList",
            Self::NodeInspect => "NodeInspect",
            Self::NodeUpdate => "NodeUpdate",
            Self::NodeDelete => "NodeDelete",
            Self::SecretList => "SecretList",
            Self::SecretInspect => "SecretInspect",
            Self::SecretCreate => "SecretCreate",
            Self::SecretUpdate => "SecretUpdate",
            Self::SecretDelete => "SecretDelete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| Error::UnknownOperation(s.to_string()))
    }
}

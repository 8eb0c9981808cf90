//! Identifier newtypes.
//!
//! Every identifier is a plain integer on the wire. Wrapping each in its own
//! type keeps a local correlation token from being mixed up with a
//! server-issued id or a foreign key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw integer id.
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw integer id.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

id_type!(
    /// Device-assigned record id, also the correlation token (`tempId`)
    /// sent with a submission. Never reassigned.
    LocalId
);

id_type!(
    /// Server-assigned permanent record id (`realId`).
    RemoteId
);

id_type!(
    /// Reference to a farm entity on the server.
    FarmId
);

id_type!(
    /// Reference to an operator (field agent) on the server.
    OperatorId
);

impl LocalId {
    /// The id that follows this one, or `None` once the id space is spent.
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

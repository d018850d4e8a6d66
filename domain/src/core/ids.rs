//! Typed identifiers for backend entities.
//!
//! Every id is a positive integer assigned by the backend. `0` is reserved
//! for entities that have not been persisted yet.

use super::error::DomainError;
use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Placeholder id for an entity the backend has not stored yet.
            pub const UNSAVED: Self = Self(0);

            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn get(self) -> u64 {
                self.0
            }

            pub const fn is_persisted(self) -> bool {
                self.0 != 0
            }

            /// Fail with [`DomainError::InvalidState`] unless the id refers to
            /// a stored entity.
            pub fn ensure_persisted(self, action: &str) -> Result<Self, DomainError> {
                if self.is_persisted() {
                    Ok(self)
                } else {
                    Err(DomainError::invalid_state(format!(
                        "cannot {} {} without a persisted id",
                        action, $label
                    )))
                }
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

entity_id!(
    /// Project that owns rules, voting rounds and members.
    ProjectId,
    "project"
);
entity_id!(
    /// Annotation rule id.
    RuleId,
    "annotation rule"
);
entity_id!(
    /// Voting configuration id.
    ConfigurationId,
    "voting configuration"
);
entity_id!(
    /// Ballot (annotation rule answer) id.
    BallotId,
    "ballot"
);
entity_id!(
    /// Project member id. Not the global user account id.
    MemberId,
    "member"
);

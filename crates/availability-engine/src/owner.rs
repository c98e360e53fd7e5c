//! Schedulable owners: a tutor or a counselor, never both, never neither.
//!
//! The backend tags records with two optional id fields. [`OwnerRef`] keeps
//! that wire shape; [`Owner`] is what the engine works with, and the only way
//! from one to the other is the checked [`TryFrom`] conversion.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};

/// The person whose availability is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Owner {
    Tutor(u64),
    Counselor(u64),
}

impl Owner {
    pub fn id(&self) -> u64 {
        match self {
            Owner::Tutor(id) | Owner::Counselor(id) => *id,
        }
    }

    /// Query parameter name used by the Data API for this kind of owner.
    pub fn param_name(&self) -> &'static str {
        match self {
            Owner::Tutor(_) => "tutor",
            Owner::Counselor(_) => "counselor",
        }
    }

    pub fn to_ref(self) -> OwnerRef {
        match self {
            Owner::Tutor(id) => OwnerRef {
                tutor: Some(id),
                counselor: None,
            },
            Owner::Counselor(id) => OwnerRef {
                tutor: None,
                counselor: Some(id),
            },
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.param_name(), self.id())
    }
}

impl FromStr for Owner {
    type Err = AvailabilityError;

    /// Parses `tutor:7` or `counselor:12`.
    fn from_str(s: &str) -> Result<Self> {
        let (kind, id) = s.split_once(':').ok_or_else(|| {
            AvailabilityError::InvalidOwner(format!(
                "owner must look like tutor:<id> or counselor:<id>, got {:?}",
                s
            ))
        })?;
        let id: u64 = id.trim().parse().map_err(|_| {
            AvailabilityError::InvalidOwner(format!("owner id is not a number: {:?}", id))
        })?;
        match kind.trim().to_ascii_lowercase().as_str() {
            "tutor" => Ok(Owner::Tutor(id)),
            "counselor" => Ok(Owner::Counselor(id)),
            other => Err(AvailabilityError::InvalidOwner(format!(
                "unknown owner kind {:?}",
                other
            ))),
        }
    }
}

/// Wire-level owner reference: two optional ids as the Data API sends them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutor: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counselor: Option<u64>,
}

impl TryFrom<OwnerRef> for Owner {
    type Error = AvailabilityError;

    fn try_from(r: OwnerRef) -> Result<Self> {
        match (r.tutor, r.counselor) {
            (Some(id), None) => Ok(Owner::Tutor(id)),
            (None, Some(id)) => Ok(Owner::Counselor(id)),
            (Some(t), Some(c)) => Err(AvailabilityError::InvariantViolation(format!(
                "record has both tutor {} and counselor {}",
                t, c
            ))),
            (None, None) => Err(AvailabilityError::InvariantViolation(
                "record has neither tutor nor counselor".to_string(),
            )),
        }
    }
}

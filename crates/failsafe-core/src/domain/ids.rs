//! DeadLetterId - dead-letter record の識別子
//!
//! Envelopes have no identity of their own. An id is minted only when a
//! failed record reaches the dead-letter boundary, so an operator can look
//! it up and replay it. The textual form is `dlq-<ulid>`, which is also what
//! serde reads and writes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;

const PREFIX: &str = "dlq-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DeadLetterId(Ulid);

impl DeadLetterId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for DeadLetterId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl fmt::Display for DeadLetterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("dead-letter id must start with 'dlq-': {0}")]
    MissingPrefix(String),

    #[error("invalid ulid in dead-letter id: {0}")]
    InvalidUlid(#[from] ulid::DecodeError),
}

impl FromStr for DeadLetterId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ulid = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| IdParseError::MissingPrefix(s.to_owned()))?;
        Ok(Self(Ulid::from_string(ulid)?))
    }
}

impl From<DeadLetterId> for String {
    fn from(id: DeadLetterId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for DeadLetterId {
    type Error = IdParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

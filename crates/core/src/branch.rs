//! Branch identifiers and naming.
//!
//! A branch is a capacity-bounded unit of the backing repository. Branch ids
//! are monotonically increasing integers starting at 1; a full branch is
//! never reused for new files but remains addressable to serve published
//! files. On the wire (git ref names and public URLs) a branch id is encoded
//! as fixed-width base-36, zero-padded so branch names sort lexicographically
//! the same way the ids sort numerically.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed width of an encoded branch name in characters.
pub const BRANCH_NAME_WIDTH: usize = 8;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Monotonically increasing branch identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BranchId(u64);

impl BranchId {
    /// The first branch of an empty repository.
    pub const FIRST: BranchId = BranchId(1);

    /// Create a branch id from a raw integer.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw integer value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The id of the branch opened by a rotation away from this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Encode as a fixed-width, lexicographically sortable base-36 name.
    pub fn to_name(&self) -> String {
        let mut buf = [b'0'; BRANCH_NAME_WIDTH];
        let mut n = self.0;
        let mut i = BRANCH_NAME_WIDTH;
        while n > 0 && i > 0 {
            i -= 1;
            buf[i] = BASE36_DIGITS[(n % 36) as usize];
            n /= 36;
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Parse a fixed-width base-36 branch name.
    pub fn from_name(name: &str) -> crate::Result<Self> {
        if name.len() != BRANCH_NAME_WIDTH {
            return Err(crate::Error::InvalidBranchName(format!(
                "expected {BRANCH_NAME_WIDTH} chars, got {}",
                name.len()
            )));
        }
        let mut value: u64 = 0;
        for c in name.chars() {
            let digit = c
                .to_digit(36)
                .ok_or_else(|| crate::Error::InvalidBranchName(name.to_string()))?;
            value = value
                .checked_mul(36)
                .and_then(|v| v.checked_add(u64::from(digit)))
                .ok_or_else(|| crate::Error::InvalidBranchName(name.to_string()))?;
        }
        Ok(Self(value))
    }
}

impl fmt::Debug for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BranchId({})", self.0)
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_name())
    }
}

/// The active capacity unit: a branch id plus its accumulated byte size.
///
/// The size is always recomputed from persisted asset rows at selection
/// time, never carried across process restarts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Branch {
    /// Branch identifier.
    pub id: BranchId,
    /// Accumulated byte size of files already published to this branch.
    pub size: u64,
}

impl Branch {
    /// The starting point of an empty repository.
    pub fn initial() -> Self {
        Self {
            id: BranchId::FIRST,
            size: 0,
        }
    }

    /// Remaining capacity before the given ceiling, saturating at zero.
    pub fn remaining(&self, ceiling: u64) -> u64 {
        ceiling.saturating_sub(self.size)
    }

    /// Whether this branch has reached the given capacity ceiling.
    pub fn is_full(&self, ceiling: u64) -> bool {
        self.size >= ceiling
    }
}

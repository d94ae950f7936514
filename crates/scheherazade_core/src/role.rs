//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Roles are shared across every prompt the pipeline builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    System,
    User,
    Assistant,
}

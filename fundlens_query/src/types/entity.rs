use std::fmt;

use serde::{Deserialize, Serialize};

/// The four record types the query engine knows how to plan over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Candidate,
    Committee,
    Contributor,
    Contribution,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Candidate,
        EntityKind::Committee,
        EntityKind::Contributor,
        EntityKind::Contribution,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Candidate => "candidate",
            EntityKind::Committee => "committee",
            EntityKind::Contributor => "contributor",
            EntityKind::Contribution => "contribution",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::SchemaKind;

/// The two lists exported for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Watchlist,
    Ratings,
}

impl Dataset {
    /// Export order: watchlist first, then ratings
    pub const ALL: [Dataset; 2] = [Dataset::Watchlist, Dataset::Ratings];

    /// Path segment of the MUBI endpoint serving this list
    pub fn endpoint(&self) -> &'static str {
        match self {
            Dataset::Watchlist => "wishes",
            Dataset::Ratings => "ratings",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Watchlist => "watchlist",
            Dataset::Ratings => "ratings",
        }
    }

    /// Output file name, e.g. `mubi_123_ratings_letterboxd.csv`
    pub fn file_name(&self, user_id: &str, kind: SchemaKind) -> String {
        format!("mubi_{}_{}{}.csv", user_id, self.name(), kind.file_suffix())
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

use crate::error::GconcError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const SCHEMA_VERSION: u32 = 1;

/// One commit as stored in the commit data files. Lists are newest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub author_name: String,
    pub author_email: String,
    #[serde(alias = "timestamp_authored", with = "crate::util::timestamp")]
    pub author_timestamp: DateTime<Utc>,
    pub committer_name: String,
    pub committer_email: String,
    #[serde(alias = "timestamp_committed", with = "crate::util::timestamp")]
    pub committer_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub lines_added: u64,
    #[serde(default)]
    pub lines_deleted: u64,
}

/// Which side of a commit identifies the contributing entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Author,
    Committer,
}

impl EntityType {
    pub const ALL: [EntityType; 2] = [EntityType::Author, EntityType::Committer];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Author => "author",
            EntityType::Committer => "committer",
        }
    }

    pub fn name<'a>(&self, commit: &'a Commit) -> &'a str {
        match self {
            EntityType::Author => &commit.author_name,
            EntityType::Committer => &commit.committer_name,
        }
    }

    pub fn email<'a>(&self, commit: &'a Commit) -> &'a str {
        match self {
            EntityType::Author => &commit.author_email,
            EntityType::Committer => &commit.committer_email,
        }
    }

    pub fn timestamp(&self, commit: &Commit) -> DateTime<Utc> {
        match self {
            EntityType::Author => commit.author_timestamp,
            EntityType::Committer => commit.committer_timestamp,
        }
    }
}

impl FromStr for EntityType {
    type Err = GconcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "author" => Ok(EntityType::Author),
            "committer" => Ok(EntityType::Committer),
            other => Err(GconcError::UnsupportedEntityType(other.to_string())),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much a single commit contributes to its entity's window total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightKind {
    Count,
    LinesAdded,
    LinesDeleted,
    LinesChanged,
    MergeCount,
}

impl WeightKind {
    pub const ALL: [WeightKind; 5] = [
        WeightKind::Count,
        WeightKind::LinesAdded,
        WeightKind::LinesDeleted,
        WeightKind::LinesChanged,
        WeightKind::MergeCount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightKind::Count => "count",
            WeightKind::LinesAdded => "lines_added",
            WeightKind::LinesDeleted => "lines_deleted",
            WeightKind::LinesChanged => "lines_changed",
            WeightKind::MergeCount => "merge_count",
        }
    }
}

impl FromStr for WeightKind {
    type Err = GconcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "count" | "number_of_commits" => Ok(WeightKind::Count),
            "lines_added" => Ok(WeightKind::LinesAdded),
            "lines_deleted" => Ok(WeightKind::LinesDeleted),
            "lines_changed" => Ok(WeightKind::LinesChanged),
            "merge_count" | "number_of_merge_commits" => Ok(WeightKind::MergeCount),
            other => Err(GconcError::UnsupportedWeightKind(other.to_string())),
        }
    }
}

impl fmt::Display for WeightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of consecutive commits per sampling window, or the whole history
/// as a single window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "GranularityRepr")]
pub enum Granularity {
    Commits(usize),
    WholeHistory,
}

impl Granularity {
    pub fn commits(size: usize) -> Result<Self, GconcError> {
        if size == 0 {
            return Err(GconcError::InvalidGranularity("0".to_string()));
        }
        Ok(Granularity::Commits(size))
    }

    /// Window index of the `position`-th commit counted from the oldest.
    pub fn window_of(&self, position: usize) -> usize {
        match self {
            Granularity::Commits(size) => position / size,
            Granularity::WholeHistory => 0,
        }
    }
}

impl FromStr for Granularity {
    type Err = GconcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "none" | "whole" | "whole_history" => Ok(Granularity::WholeHistory),
            other => {
                let size: usize = other
                    .parse()
                    .map_err(|_| GconcError::InvalidGranularity(other.to_string()))?;
                Granularity::commits(size)
            }
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Commits(size) => write!(f, "{size}"),
            Granularity::WholeHistory => f.write_str("all"),
        }
    }
}

impl Serialize for Granularity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Granularity::Commits(size) => serializer.serialize_u64(*size as u64),
            Granularity::WholeHistory => serializer.serialize_str("all"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GranularityRepr {
    Size(i64),
    Name(String),
}

impl TryFrom<GranularityRepr> for Granularity {
    type Error = GconcError;

    fn try_from(repr: GranularityRepr) -> Result<Self, Self::Error> {
        match repr {
            GranularityRepr::Size(n) if n > 0 => Granularity::commits(n as usize),
            GranularityRepr::Size(n) => Err(GconcError::InvalidGranularity(n.to_string())),
            GranularityRepr::Name(name) => name.parse(),
        }
    }
}

/// One (granularity, entity type, weight kind) analysis setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Combination {
    pub granularity: Granularity,
    pub entity_type: EntityType,
    pub weight_kind: WeightKind,
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.weight_kind, self.entity_type, self.granularity
        )
    }
}

use crate::model::{Commit, WeightKind};

const MERGE_PREFIX: &str = "Merge";

impl WeightKind {
    /// Contribution of one commit under this weight policy.
    pub fn weight(&self, commit: &Commit) -> u64 {
        match self {
            WeightKind::Count => 1,
            WeightKind::LinesAdded => commit.lines_added,
            WeightKind::LinesDeleted => commit.lines_deleted,
            WeightKind::LinesChanged => commit.lines_added + commit.lines_deleted,
            WeightKind::MergeCount => u64::from(commit.message.starts_with(MERGE_PREFIX)),
        }
    }
}

/// Parse `weight_kind` and apply it to `commit`.
pub fn weight(commit: &Commit, weight_kind: &str) -> crate::error::Result<u64> {
    let kind: WeightKind = weight_kind.parse()?;
    Ok(kind.weight(commit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GconcError;
    use crate::util::parse_timestamp;

    fn commit(message: &str, added: u64, deleted: u64) -> Commit {
        let ts = parse_timestamp("2022-06-01T00:00:00Z").unwrap();
        Commit {
            hash: None,
            author_name: "A".into(),
            author_email: "a@x".into(),
            author_timestamp: ts,
            committer_name: "A".into(),
            committer_email: "a@x".into(),
            committer_timestamp: ts,
            message: message.into(),
            lines_added: added,
            lines_deleted: deleted,
        }
    }

    #[test]
    fn weights_per_kind() {
        let c = commit("Fix overflow", 10, 4);
        assert_eq!(WeightKind::Count.weight(&c), 1);
        assert_eq!(WeightKind::LinesAdded.weight(&c), 10);
        assert_eq!(WeightKind::LinesDeleted.weight(&c), 4);
        assert_eq!(WeightKind::LinesChanged.weight(&c), 14);
        assert_eq!(WeightKind::MergeCount.weight(&c), 0);
    }

    #[test]
    fn merge_detection_is_a_literal_prefix() {
        assert_eq!(WeightKind::MergeCount.weight(&commit("Merge #123: bump", 0, 0)), 1);
        assert_eq!(WeightKind::MergeCount.weight(&commit("Merged upstream", 0, 0)), 1);
        assert_eq!(WeightKind::MergeCount.weight(&commit("merge branch", 0, 0)), 0);
        assert_eq!(WeightKind::MergeCount.weight(&commit(" Merge", 0, 0)), 0);
    }

    #[test]
    fn string_weight_kinds() {
        let c = commit("x", 2, 3);
        assert_eq!(weight(&c, "lines_changed").unwrap(), 5);
        assert_eq!(weight(&c, "number_of_commits").unwrap(), 1);
        assert!(matches!(weight(&c, "reviews"), Err(GconcError::UnsupportedWeightKind(_))));
    }
}

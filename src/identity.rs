//! E-mail based contributor identity resolution.

use crate::error::{GconcError, Result};
use crate::model::{Commit, EntityType};
use std::collections::BTreeMap;

/// Placeholder name used by some projects' merge bots.
const MERGE_SCRIPT: &str = "merge-script";

/// Canonical display name per e-mail for one repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityMap {
    repository: String,
    names: BTreeMap<String, String>,
}

impl IdentityMap {
    pub fn new(repository: impl Into<String>, names: BTreeMap<String, String>) -> Self {
        Self {
            repository: repository.into(),
            names,
        }
    }

    /// Build the map from a repository's commits, then apply `overrides`.
    pub fn from_commits(
        repository: impl Into<String>,
        commits: &[Commit],
        overrides: Option<&BTreeMap<String, String>>,
    ) -> Self {
        let mut names = assign_names(group_users_by_email(commits));
        if let Some(overrides) = overrides {
            for (email, name) in overrides {
                names.insert(email.clone(), name.clone());
            }
        }
        for name in names.values_mut() {
            if name.contains(',') {
                *name = name.replace(',', "");
            }
        }
        Self::new(repository, names)
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn names(&self) -> &BTreeMap<String, String> {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Canonical name for `email`; an unmapped e-mail is a configuration error.
    pub fn resolve(&self, email: &str) -> Result<&str> {
        self.names
            .get(email)
            .map(String::as_str)
            .ok_or_else(|| GconcError::MissingIdentity {
                repository: self.repository.clone(),
                email: email.to_string(),
            })
    }
}

/// Names used with one e-mail and their counts, in first-seen order.
pub type NameCounts = Vec<(String, usize)>;

/// How often each name was used with each e-mail, counting both the author
/// and the committer side of every commit. `commits` are newest-first.
pub fn group_users_by_email(commits: &[Commit]) -> BTreeMap<String, NameCounts> {
    let mut users: BTreeMap<String, NameCounts> = BTreeMap::new();
    for commit in commits {
        for side in EntityType::ALL {
            let names = users.entry(side.email(commit).to_string()).or_default();
            let name = side.name(commit);
            match names.iter_mut().find(|(n, _)| n.as_str() == name) {
                Some((_, count)) => *count += 1,
                None => names.push((name.to_string(), 1)),
            }
        }
    }
    users
}

/// Pick the most frequent name per e-mail; ties go to the name seen first.
/// `merge-script` is ignored when the e-mail has other names.
pub fn assign_names(users: BTreeMap<String, NameCounts>) -> BTreeMap<String, String> {
    users
        .into_iter()
        .filter_map(|(email, mut names)| {
            if names.len() > 1 {
                names.retain(|(name, _)| name != MERGE_SCRIPT);
            }
            names
                .into_iter()
                .reduce(|best, next| if next.1 > best.1 { next } else { best })
                .map(|(name, _)| (email, name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::parse_timestamp;

    fn commit(author: (&str, &str), committer: (&str, &str)) -> Commit {
        let ts = parse_timestamp("2023-01-01T00:00:00Z").unwrap();
        Commit {
            hash: None,
            author_name: author.0.to_string(),
            author_email: author.1.to_string(),
            author_timestamp: ts,
            committer_name: committer.0.to_string(),
            committer_email: committer.1.to_string(),
            committer_timestamp: ts,
            message: String::new(),
            lines_added: 0,
            lines_deleted: 0,
        }
    }

    #[test]
    fn most_frequent_name_wins() {
        let commits = vec![
            commit(("Alice", "a@x"), ("Alice Smith", "a@x")),
            commit(("Alice Smith", "a@x"), ("GitHub", "noreply@github.com")),
            commit(("B", "b@x"), ("GitHub", "noreply@github.com")),
        ];
        let map = IdentityMap::from_commits("repo", &commits, None);
        assert_eq!(map.resolve("a@x").unwrap(), "Alice Smith");
        assert_eq!(map.resolve("noreply@github.com").unwrap(), "GitHub");
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn ties_prefer_first_seen_and_merge_script_is_dropped() {
        let commits = vec![
            commit(("Zed", "z@x"), ("merge-script", "z@x")),
            commit(("Ann", "z@x"), ("merge-script", "z@x")),
            commit(("merge-script", "m@x"), ("merge-script", "m@x")),
        ];
        let map = IdentityMap::from_commits("repo", &commits, None);
        assert_eq!(map.resolve("z@x").unwrap(), "Zed");
        assert_eq!(map.resolve("m@x").unwrap(), "merge-script");
    }

    #[test]
    fn tie_goes_to_newest_commit_name() {
        // newest-first: Zoe twice, then Adam twice, on the same e-mail
        let commits = vec![
            commit(("Zoe", "dev@x"), ("Bot", "bot@x")),
            commit(("Zoe", "dev@x"), ("Bot", "bot@x")),
            commit(("Adam", "dev@x"), ("Bot", "bot@x")),
            commit(("Adam", "dev@x"), ("Bot", "bot@x")),
        ];
        let users = group_users_by_email(&commits);
        assert_eq!(users["dev@x"], vec![("Zoe".to_string(), 2), ("Adam".to_string(), 2)]);
        let map = IdentityMap::from_commits("repo", &commits, None);
        assert_eq!(map.resolve("dev@x").unwrap(), "Zoe");
    }

    #[test]
    fn overrides_apply_and_commas_are_stripped() {
        let commits = vec![commit(("Doe, Jane", "j@x"), ("Doe, Jane", "j@x"))];
        let overrides = BTreeMap::from([("o@x".to_string(), "Obscuren".to_string())]);
        let map = IdentityMap::from_commits("repo", &commits, Some(&overrides));
        assert_eq!(map.resolve("j@x").unwrap(), "Doe Jane");
        assert_eq!(map.resolve("o@x").unwrap(), "Obscuren");
    }

    #[test]
    fn unmapped_email_is_an_error() {
        let map = IdentityMap::new("geth", BTreeMap::new());
        assert!(matches!(
            map.resolve("ghost@x"),
            Err(GconcError::MissingIdentity { repository, email })
                if repository == "geth" && email == "ghost@x"
        ));
    }
}

//! Inbound push notification payload (Bitbucket webhook shape).

use chrono_tz::Tz;
use serde::Deserialize;

use crate::deploy::report::format_in_zone;

/// A decoded push notification
#[derive(Debug, Clone, Deserialize)]
pub struct PushNotification {
    pub repository: Repository,
    pub actor: Actor,
    pub push: Push,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Actor {
    pub display_name: String,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Push {
    #[serde(default)]
    pub changes: Vec<BranchUpdate>,
}

/// One branch update inside a push
#[derive(Debug, Clone, Deserialize)]
pub struct BranchUpdate {
    /// Target of the update. Absent for branch deletions.
    pub new: Option<BranchTarget>,

    #[serde(default)]
    pub commits: Vec<CommitRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchTarget {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub author: Author,
    pub message: String,
    pub date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub raw: String,
}

/// A commit accepted for deployment, its date already rendered in the
/// display timezone.
#[derive(Debug, Clone)]
pub struct CaughtCommit {
    pub author: String,
    pub date: String,
    pub message: String,
}

impl PushNotification {
    /// Actor identity as it appears in the run log.
    pub fn actor_label(&self) -> String {
        format!("{} <{}>", self.actor.display_name, self.actor.username)
    }

    /// Collect commit records from updates targeting the tracked branch, in
    /// payload order. Unparseable commit dates are kept verbatim.
    pub fn commits_for_branch(
        &self,
        branch: &str,
        timezone: Tz,
        date_format: &str,
    ) -> Vec<CaughtCommit> {
        let mut caught = Vec::new();

        for update in &self.push.changes {
            let Some(target) = &update.new else {
                continue;
            };
            if target.kind != "branch" || target.name != branch {
                continue;
            }

            for commit in &update.commits {
                if commit.kind != "commit" {
                    continue;
                }
                caught.push(CaughtCommit {
                    author: commit.author.raw.clone(),
                    date: format_in_zone(&commit.date, timezone, date_format)
                        .unwrap_or_else(|| commit.date.clone()),
                    message: commit.message.clone(),
                });
            }
        }

        caught
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_DATE_FORMAT;

    fn sample() -> PushNotification {
        let raw = r#"{
            "repository": {"full_name": "acme/site"},
            "actor": {"display_name": "Jane Doe", "username": "jdoe"},
            "push": {"changes": [
                {
                    "new": {"type": "branch", "name": "master"},
                    "commits": [
                        {"type": "commit",
                         "author": {"raw": "Jane Doe <jane@acme.dev>"},
                         "message": "Fix footer",
                         "date": "2024-05-01T10:00:00+00:00"},
                        {"type": "tag-ish",
                         "author": {"raw": "Jane Doe <jane@acme.dev>"},
                         "message": "not a commit",
                         "date": "2024-05-01T10:01:00+00:00"}
                    ]
                },
                {
                    "new": {"type": "branch", "name": "develop"},
                    "commits": [
                        {"type": "commit",
                         "author": {"raw": "Sam Roe <sam@acme.dev>"},
                         "message": "WIP",
                         "date": "2024-05-01T11:00:00+00:00"}
                    ]
                },
                {"new": null, "commits": []}
            ]}
        }"#;
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_actor_label() {
        assert_eq!(sample().actor_label(), "Jane Doe <jdoe>");
    }

    #[test]
    fn test_only_tracked_branch_commits_are_caught() {
        let caught =
            sample().commits_for_branch("master", chrono_tz::Europe::Minsk, DEFAULT_DATE_FORMAT);

        assert_eq!(caught.len(), 1);
        assert_eq!(caught[0].author, "Jane Doe <jane@acme.dev>");
        assert_eq!(caught[0].message, "Fix footer");
        assert_eq!(caught[0].date, "2024-05-01 13:00:00+03:00");
    }

    #[test]
    fn test_untracked_branch_catches_nothing() {
        let caught =
            sample().commits_for_branch("release", chrono_tz::UTC, DEFAULT_DATE_FORMAT);
        assert!(caught.is_empty());
    }

    #[test]
    fn test_unparseable_date_is_kept_verbatim() {
        let raw = r#"{
            "repository": {"full_name": "acme/site"},
            "actor": {"display_name": "Jane", "username": "j"},
            "push": {"changes": [{
                "new": {"type": "branch", "name": "master"},
                "commits": [{"type": "commit",
                             "author": {"raw": "Jane <j@a>"},
                             "message": "m",
                             "date": "last tuesday"}]
            }]}
        }"#;
        let push: PushNotification = serde_json::from_str(raw).unwrap();
        let caught = push.commits_for_branch("master", chrono_tz::UTC, DEFAULT_DATE_FORMAT);
        assert_eq!(caught[0].date, "last tuesday");
    }
}

use super::{admit, ActivityLedger, BranchTarget};
use crate::github::{CommitQuery, GitHubClient, Transport};
use crate::model::DateWindow;
use indicatif::ProgressBar;

/// One unfiltered listing per branch; each commit is matched against the
/// roster by its account login. A commit with no linked account has an
/// empty login and never matches.
pub(super) fn discover<T: Transport>(
    client: &GitHubClient<T>,
    repo: &str,
    contributors: &[String],
    targets: &[BranchTarget],
    window: &DateWindow,
    ledger: &mut ActivityLedger,
    progress: &ProgressBar,
) {
    for target in targets {
        progress.set_message(format!("{repo}@{target}"));
        let fetched = client.list_commits(
            repo,
            &CommitQuery {
                author: None,
                branch: target.sha(),
                window,
            },
        );

        let inspected = fetched.items.len();
        let mut matched = 0usize;
        for raw in fetched.items {
            let Some(contributor) = roster_handle(contributors, raw.author_login()) else {
                continue;
            };
            if let Some(record) = admit(raw, repo, target.context(), contributor, window) {
                if ledger.record(record) {
                    matched += 1;
                }
            }
        }
        log::debug!("{repo}@{target}: {matched} of {inspected} commits by roster members");

        if let Some(failure) = fetched.failure {
            ledger.note_failure(failure);
        }
        progress.tick();
    }
}

/// Roster spelling of `login`; logins compare case-insensitively.
fn roster_handle<'a>(contributors: &'a [String], login: &str) -> Option<&'a str> {
    if login.is_empty() {
        return None;
    }
    contributors
        .iter()
        .find(|c| c.eq_ignore_ascii_case(login))
        .map(String::as_str)
}

use super::{admit, ActivityLedger, BranchTarget};
use crate::github::{CommitQuery, GitHubClient, Transport};
use crate::model::DateWindow;
use indicatif::ProgressBar;

/// One author-filtered listing per contributor per branch. The API does the
/// author matching, so every returned commit is attributed to the
/// contributor the query was issued for.
pub(super) fn discover<T: Transport>(
    client: &GitHubClient<T>,
    repo: &str,
    contributors: &[String],
    targets: &[BranchTarget],
    window: &DateWindow,
    ledger: &mut ActivityLedger,
    progress: &ProgressBar,
) {
    for contributor in contributors {
        for target in targets {
            progress.set_message(format!("{repo}@{target} for {contributor}"));
            let fetched = client.list_commits(
                repo,
                &CommitQuery {
                    author: Some(contributor.as_str()),
                    branch: target.sha(),
                    window,
                },
            );

            let found = fetched.items.len();
            for raw in fetched.items {
                if let Some(record) = admit(raw, repo, target.context(), contributor, window) {
                    ledger.record(record);
                }
            }
            log::debug!("{repo}@{target}: {found} commits by {contributor}");

            if let Some(failure) = fetched.failure {
                ledger.note_failure(failure);
            }
            progress.tick();
        }
    }
}

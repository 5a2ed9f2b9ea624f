use super::{admit, ActivityLedger};
use crate::github::{GitHubClient, Transport};
use crate::model::{CommitContext, DateWindow};
use indicatif::ProgressBar;

/// Search each contributor's pull requests created in the window, then pull
/// their commits. A pull request's creation date only selects it; each
/// commit is kept or dropped on its own author date.
pub(super) fn discover<T: Transport>(
    client: &GitHubClient<T>,
    repo: &str,
    contributors: &[String],
    window: &DateWindow,
    max_results: usize,
    ledger: &mut ActivityLedger,
    progress: &ProgressBar,
) {
    for contributor in contributors {
        progress.set_message(format!("{repo} pull requests by {contributor}"));
        let search = client.search_pull_requests(repo, contributor, window, max_results);
        log::debug!("{repo}: {} pull requests by {contributor}", search.items.len());
        if let Some(failure) = search.failure {
            ledger.note_failure(failure);
        }

        for pr in search.items {
            let fetched = client.pull_request_commits(repo, pr.number);
            let context = CommitContext::PullRequest {
                number: pr.number,
                title: pr.title.clone(),
            };
            for raw in fetched.items {
                if let Some(record) = admit(raw, repo, context.clone(), contributor, window) {
                    ledger.record(record);
                }
            }
            if let Some(failure) = fetched.failure {
                ledger.note_failure(failure);
            }
            progress.tick();
        }
    }
}

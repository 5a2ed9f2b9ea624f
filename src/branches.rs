use crate::github::{BranchRef, GitHubClient, Transport};

pub const DEFAULT_BRANCH_LIMIT: usize = 100;

/// Searched first, in this order, whenever present.
pub const PREFERRED_BRANCHES: [&str; 2] = ["master", "main"];

/// Branch names to search, ordered by the API's listing order (assumed to be
/// most recently updated first). Falls back to `master`/`main` when the
/// listing fails so discovery always has somewhere to start.
pub fn list_branches<T: Transport>(client: &GitHubClient<T>, repo: &str, limit: usize) -> Vec<String> {
    match branch_refs(client, repo, limit) {
        Some(refs) => refs.into_iter().map(|b| b.name).collect(),
        None => fallback(),
    }
}

/// Move `master` and `main` to the front, keeping everything else in its
/// original relative order. Idempotent.
pub fn prioritize(names: &[String]) -> Vec<String> {
    let mut ordered: Vec<String> = PREFERRED_BRANCHES
        .iter()
        .filter(|p| names.iter().any(|n| n == **p))
        .map(|p| p.to_string())
        .collect();
    ordered.extend(
        names
            .iter()
            .filter(|n| !PREFERRED_BRANCHES.contains(&n.as_str()))
            .cloned(),
    );
    ordered
}

/// Discovered and prioritized search list. With `touched_by`, only branches
/// whose tip commit belongs to one of those handles are kept, plus the
/// preferred branches.
pub fn discover_branches<T: Transport>(
    client: &GitHubClient<T>,
    repo: &str,
    limit: usize,
    touched_by: Option<&[String]>,
) -> Vec<String> {
    let Some(refs) = branch_refs(client, repo, limit) else {
        return prioritize(&fallback());
    };

    let names: Vec<String> = match touched_by {
        Some(handles) => refs
            .into_iter()
            .filter(|b| is_preferred(&b.name) || tip_touched_by(client, repo, b, handles))
            .map(|b| b.name)
            .collect(),
        None => refs.into_iter().map(|b| b.name).collect(),
    };

    log::info!("{repo}: {} candidate branches", names.len());
    prioritize(&names)
}

fn branch_refs<T: Transport>(client: &GitHubClient<T>, repo: &str, limit: usize) -> Option<Vec<BranchRef>> {
    match client.list_branches(repo, limit).into_result() {
        Ok(refs) => Some(refs),
        Err(failure) => {
            log::warn!("Branch listing failed, falling back to master/main: {failure}");
            None
        }
    }
}

fn tip_touched_by<T: Transport>(
    client: &GitHubClient<T>,
    repo: &str,
    branch: &BranchRef,
    handles: &[String],
) -> bool {
    match client.get_commit(repo, &branch.commit.sha) {
        Ok(commit) => {
            let login = commit.author_login();
            !login.is_empty() && handles.iter().any(|h| h.eq_ignore_ascii_case(login))
        }
        // an unknown tip is searched rather than silently dropped
        Err(e) => {
            log::warn!("Could not resolve tip of {repo}@{}: {e}", branch.name);
            true
        }
    }
}

fn is_preferred(name: &str) -> bool {
    PREFERRED_BRANCHES.contains(&name)
}

fn fallback() -> Vec<String> {
    PREFERRED_BRANCHES.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::fake::{commit_json, FakeTransport};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const BRANCHES: &str = "https://api.test/repos/acme/app/branches";

    fn names(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn prioritize_moves_master_then_main_to_front() {
        let input = names(&["feature/x", "main", "develop", "master", "hotfix"]);
        assert_eq!(
            prioritize(&input),
            names(&["master", "main", "feature/x", "develop", "hotfix"])
        );
    }

    #[test]
    fn prioritize_is_idempotent() {
        let inputs = [
            names(&[]),
            names(&["main"]),
            names(&["b", "a", "main", "c"]),
            names(&["master", "x", "main"]),
            names(&["x", "y", "z"]),
        ];
        for xs in inputs {
            let once = prioritize(&xs);
            assert_eq!(prioritize(&once), once);
        }
    }

    #[test]
    fn listing_failure_falls_back_to_master_and_main() {
        let fake = FakeTransport::new().status(BRANCHES, &[], 403, "rate limited");
        let client = GitHubClient::new(&fake).with_base_url("https://api.test");

        assert_eq!(list_branches(&client, "acme/app", 100), names(&["master", "main"]));
        assert_eq!(
            discover_branches(&client, "acme/app", 100, None),
            names(&["master", "main"])
        );
    }

    #[test]
    fn touched_only_keeps_contributor_tips_and_preferred_branches() {
        let fake = FakeTransport::new()
            .page(
                BRANCHES,
                &[],
                json!([
                    {"name": "feature/mine", "commit": {"sha": "s1"}},
                    {"name": "feature/theirs", "commit": {"sha": "s2"}},
                    {"name": "main", "commit": {"sha": "s3"}}
                ]),
                None,
            )
            .page(
                "https://api.test/repos/acme/app/commits/s1",
                &[],
                commit_json("s1", Some("Alice"), "2025-01-02T00:00:00Z", "mine"),
                None,
            )
            .page(
                "https://api.test/repos/acme/app/commits/s2",
                &[],
                commit_json("s2", Some("mallory"), "2025-01-02T00:00:00Z", "theirs"),
                None,
            );
        let client = GitHubClient::new(&fake).with_base_url("https://api.test");
        let handles = names(&["alice"]);

        let found = discover_branches(&client, "acme/app", 100, Some(handles.as_slice()));

        assert_eq!(found, names(&["main", "feature/mine"]));
        assert_eq!(fake.calls_to("https://api.test/repos/acme/app/commits/s3"), 0);
    }
}

use super::transport::{Page, Transport};
use crate::error::{PulseError, Result};
use serde_json::Value;
use std::cell::RefCell;

struct Rule {
    url: String,
    params: Vec<(String, String)>,
    page: Page,
}

impl Rule {
    fn matches(&self, url: &str, query: &[(String, String)]) -> bool {
        self.url == url && self.params.iter().all(|p| query.contains(p))
    }
}

/// Canned responses keyed by URL plus required query pairs; first match wins.
#[derive(Default)]
pub struct FakeTransport {
    rules: Vec<Rule>,
    calls: RefCell<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, params: &[(&str, &str)], body: Value, next: Option<&str>) -> Self {
        self.rules.push(Rule {
            url: url.to_string(),
            params: owned(params),
            page: Page {
                status: 200,
                body: body.to_string(),
                next: next.map(str::to_string),
            },
        });
        self
    }

    pub fn status(mut self, url: &str, params: &[(&str, &str)], status: u16, body: &str) -> Self {
        self.rules.push(Rule {
            url: url.to_string(),
            params: owned(params),
            page: Page {
                status,
                body: body.to_string(),
                next: None,
            },
        });
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.borrow().iter().filter(|(u, _)| u == url).count()
    }
}

impl Transport for FakeTransport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<Page> {
        self.calls.borrow_mut().push((url.to_string(), query.to_vec()));
        self.rules
            .iter()
            .find(|rule| rule.matches(url, query))
            .map(|rule| rule.page.clone())
            .ok_or_else(|| PulseError::Parse(format!("connection refused: {url}")))
    }
}

fn owned(params: &[(&str, &str)]) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A commit-listing record as the REST API returns it.
pub fn commit_json(sha: &str, login: Option<&str>, date: &str, message: &str) -> Value {
    serde_json::json!({
        "sha": sha,
        "html_url": format!("https://github.com/acme/app/commit/{sha}"),
        "commit": {
            "message": message,
            "author": { "name": "Someone", "email": "someone@example.com", "date": date }
        },
        "author": login.map(|l| serde_json::json!({ "login": l })),
    })
}

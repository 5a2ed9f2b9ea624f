use crate::error::Result;
use std::time::Duration;

/// One HTTP response as the fetcher sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub status: u16,
    pub body: String,
    /// Continuation URL from the `Link: <..>; rel="next"` header.
    pub next: Option<String>,
}

impl Page {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A single authenticated GET. Implementations must not retry.
pub trait Transport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<Page>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<Page> {
        (**self).get(url, query)
    }
}

pub struct HttpTransport {
    agent: ureq::Agent,
    token: String,
}

impl HttpTransport {
    pub fn new(token: impl Into<String>) -> Self {
        let agent = ureq::config::Config::builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(60)))
            .user_agent("teampulse")
            .build()
            .new_agent();
        Self {
            agent,
            token: token.into(),
        }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<Page> {
        log::debug!("GET {url} {query:?}");
        let mut request = self
            .agent
            .get(url)
            .header("Authorization", &format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        for (key, value) in query {
            request = request.query(key, value);
        }

        let response = request.call()?;
        let status = response.status().as_u16();
        let next = response
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .and_then(super::link::next_link);
        let body = response.into_body().read_to_string()?;

        Ok(Page { status, body, next })
    }
}

use super::transport::Transport;
use crate::error::FetchFailure;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Records collected from a paged endpoint, plus the failure that cut the
/// walk short, if any. Records from pages before the failure are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub items: Vec<T>,
    pub failure: Option<FetchFailure>,
}

impl<T> Fetched<T> {
    pub fn complete(items: Vec<T>) -> Self {
        Self { items, failure: None }
    }

    pub fn failed(failure: FetchFailure) -> Self {
        Self {
            items: Vec::new(),
            failure: Some(failure),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    pub fn into_result(self) -> Result<Vec<T>, FetchFailure> {
        match self.failure {
            Some(failure) => Err(failure),
            None => Ok(self.items),
        }
    }
}

impl Fetched<Value> {
    /// Decode each raw record, dropping the ones that do not fit `T`.
    pub fn decode<T: DeserializeOwned>(self, endpoint: &str) -> Fetched<T> {
        let items = self
            .items
            .into_iter()
            .filter_map(|raw| match serde_json::from_value(raw) {
                Ok(item) => Some(item),
                Err(e) => {
                    log::warn!("Skipping malformed record from {endpoint}: {e}");
                    None
                }
            })
            .collect();
        Fetched {
            items,
            failure: self.failure,
        }
    }
}

pub struct PagedFetcher<T> {
    transport: T,
}

impl<T: Transport> PagedFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn fetch_all(&self, endpoint: &str, query: &[(String, String)]) -> Fetched<Value> {
        self.fetch_bounded(endpoint, query, None)
    }

    /// Walk `next` links until exhausted, the first failing page, or
    /// `max_items` records have been collected.
    pub fn fetch_bounded(
        &self,
        endpoint: &str,
        query: &[(String, String)],
        max_items: Option<usize>,
    ) -> Fetched<Value> {
        let mut items = Vec::new();
        let mut url = endpoint.to_string();
        let mut params: &[(String, String)] = query;

        loop {
            let page = match self.transport.get(&url, params) {
                Ok(page) => page,
                Err(e) => {
                    return Fetched {
                        items,
                        failure: Some(FetchFailure::new(endpoint, 0, e.to_string())),
                    };
                }
            };

            if !page.is_success() {
                return Fetched {
                    items,
                    failure: Some(FetchFailure::new(endpoint, page.status, page.body)),
                };
            }

            match records_of(&page.body) {
                Ok(records) => items.extend(records),
                Err(e) => {
                    return Fetched {
                        items,
                        failure: Some(FetchFailure::new(endpoint, page.status, e.to_string())),
                    };
                }
            }

            if let Some(max) = max_items {
                if items.len() >= max {
                    items.truncate(max);
                    break;
                }
            }

            match page.next {
                Some(next) => {
                    // the continuation URL already encodes the query
                    url = next;
                    params = &[];
                }
                None => break,
            }
        }

        Fetched::complete(items)
    }
}

/// Listing endpoints answer with an array, search endpoints with `{"items": [..]}`.
fn records_of(body: &str) -> serde_json::Result<Vec<Value>> {
    match serde_json::from_str::<Value>(body)? {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(records)) => Ok(records),
            _ => Ok(vec![Value::Object(map)]),
        },
        other => Ok(vec![other]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::fake::FakeTransport;
    use serde_json::json;

    const URL: &str = "https://api.test/repos/acme/app/commits";

    #[test]
    fn follows_next_links_and_drops_query_on_continuation() {
        let fake = FakeTransport::new()
            .page(URL, &[], json!([{"n": 1}, {"n": 2}]), Some("https://api.test/page2"))
            .page("https://api.test/page2", &[], json!([{"n": 3}]), None);
        let fetcher = PagedFetcher::new(&fake);

        let query = vec![("per_page".to_string(), "100".to_string())];
        let fetched = fetcher.fetch_all(URL, &query);

        assert!(fetched.is_complete());
        assert_eq!(fetched.items.len(), 3);
        let calls = fake.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, query);
        assert!(calls[1].1.is_empty());
    }

    #[test]
    fn stops_at_first_failing_page_and_keeps_earlier_records() {
        let fake = FakeTransport::new()
            .page(URL, &[], json!([{"n": 1}]), Some("https://api.test/page2"))
            .status("https://api.test/page2", &[], 502, "bad gateway");
        let fetcher = PagedFetcher::new(&fake);

        let fetched = fetcher.fetch_all(URL, &[]);

        assert_eq!(fetched.items.len(), 1);
        let failure = fetched.failure.unwrap();
        assert_eq!(failure.endpoint, URL);
        assert_eq!(failure.status, 502);
        assert_eq!(failure.body, "bad gateway");
        assert_eq!(fake.calls().len(), 2);
    }

    #[test]
    fn transport_error_is_reported_as_status_zero() {
        let fake = FakeTransport::new();
        let fetched = PagedFetcher::new(&fake).fetch_all(URL, &[]);
        assert!(fetched.items.is_empty());
        assert_eq!(fetched.failure.unwrap().status, 0);
    }

    #[test]
    fn bounded_fetch_stops_once_enough_records_arrive() {
        let fake = FakeTransport::new()
            .page(URL, &[], json!({"total_count": 5, "items": [{"n": 1}, {"n": 2}, {"n": 3}]}), Some("https://api.test/page2"))
            .page("https://api.test/page2", &[], json!({"items": [{"n": 4}, {"n": 5}]}), None);

        let fetched = PagedFetcher::new(&fake).fetch_bounded(URL, &[], Some(2));

        assert!(fetched.is_complete());
        assert_eq!(fetched.items, vec![json!({"n": 1}), json!({"n": 2})]);
        assert_eq!(fake.calls().len(), 1);
    }

    #[test]
    fn into_result_surfaces_failure() {
        let fetched: Fetched<Value> = Fetched::failed(FetchFailure::new(URL, 404, "Not Found"));
        let err = fetched.into_result().unwrap_err();
        assert_eq!(err.status, 404);
    }
}

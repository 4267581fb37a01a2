use super::{Document, RetrievalError, SearchProvider};
use crate::config::SearchConfig;
use reqwest::blocking::Client;
use std::time::Duration;

/// Google Programmable Search (Custom Search JSON API).
pub struct GoogleSearch {
    client: Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
    page_size: usize,
}

impl GoogleSearch {
    pub fn new(config: &SearchConfig) -> Result<Self, RetrievalError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(RetrievalError::MissingCredentials("GOOGLE_API_KEY"))?;
        let engine_id = config
            .engine_id
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(RetrievalError::MissingCredentials("GOOGLE_CSE_ID"))?;

        Ok(Self {
            client: crate::http::build_client(Duration::from_secs(config.timeout_secs))?,
            endpoint: config.endpoint.clone(),
            api_key,
            engine_id,
            page_size: config.page_size,
        })
    }
}

impl SearchProvider for GoogleSearch {
    fn search(&self, query: &str) -> Result<Vec<Document>, RetrievalError> {
        let num = self.page_size.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("start", "1"),
                ("num", num.as_str()),
            ])
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RetrievalError::Status(status.as_u16()));
        }

        let json: serde_json::Value = resp.json()?;
        parse_results(&json)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

/// Map result `items` to documents: `snippet` becomes the content.
/// A response without `items` has no results.
fn parse_results(json: &serde_json::Value) -> Result<Vec<Document>, RetrievalError> {
    let items = match json.get("items") {
        None => return Ok(vec![]),
        Some(items) => items
            .as_array()
            .ok_or_else(|| RetrievalError::Malformed("items is not a list".to_string()))?,
    };

    let field = |item: &serde_json::Value, key: &str| {
        item.get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };

    Ok(items
        .iter()
        .map(|item| Document {
            content: field(item, "snippet"),
            title: field(item, "title"),
            link: field(item, "link"),
        })
        .collect())
}

//! Candidate retrieval: keywords in, candidate source documents out.

pub mod ddg;
pub mod google;

use serde::{Deserialize, Serialize};

/// A candidate source. `link` identifies the source: two documents with the
/// same link are the same source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub title: String,
    pub link: String,
}

impl Document {
    /// Same source with normalized content.
    pub fn cleaned(&self) -> Self {
        Self {
            content: crate::text::clean(&self.content),
            title: self.title.clone(),
            link: self.link.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("search provider returned status {0}")]
    Status(u16),

    #[error("malformed search response: {0}")]
    Malformed(String),

    #[error("missing {0}")]
    MissingCredentials(&'static str),

    #[error("search provider unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for RetrievalError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(crate::http::get_error(&err))
    }
}

/// A web search backend.
pub trait SearchProvider: Send + Sync {
    /// Run one query and return the first page of results in rank order.
    fn search(&self, query: &str) -> Result<Vec<Document>, RetrievalError>;

    /// Get the name of this provider for logging
    fn name(&self) -> &'static str;
}

/// Stands in for a provider that failed to initialize; every query fails
/// with the initialization error.
pub struct Unconfigured {
    provider: &'static str,
    reason: String,
}

impl Unconfigured {
    pub fn new(provider: &'static str, reason: impl Into<String>) -> Self {
        Self {
            provider,
            reason: reason.into(),
        }
    }
}

impl SearchProvider for Unconfigured {
    fn search(&self, _query: &str) -> Result<Vec<Document>, RetrievalError> {
        Err(RetrievalError::Unavailable(self.reason.clone()))
    }

    fn name(&self) -> &'static str {
        self.provider
    }
}

/// OR-join keywords into a single query.
pub fn build_query<S: AsRef<str>>(keywords: &[S]) -> String {
    keywords
        .iter()
        .map(|k| k.as_ref())
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Turns keyword lists into candidate documents through a [`SearchProvider`].
pub struct CandidateRetriever {
    provider: Box<dyn SearchProvider>,
}

impl CandidateRetriever {
    pub fn new(provider: Box<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Query the provider, propagating failures. No keywords means no query.
    pub fn try_retrieve<S: AsRef<str>>(&self, keywords: &[S]) -> Result<Vec<Document>, RetrievalError> {
        if keywords.is_empty() {
            return Ok(vec![]);
        }

        let query = build_query(keywords);
        log::debug!("provider={} query={query:?}", self.provider.name());

        self.provider.search(&query)
    }

    /// Like [`Self::try_retrieve`], but any failure yields no candidates.
    pub fn retrieve<S: AsRef<str>>(&self, keywords: &[S]) -> Vec<Document> {
        match self.try_retrieve(keywords) {
            Ok(documents) => documents,
            Err(err) => {
                log::warn!("provider={} outcome=failed error={err}", self.provider.name());
                vec![]
            }
        }
    }
}

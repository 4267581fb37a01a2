mod pipeline;
mod web;

use crate::{
    app::App,
    config::{CrawlConfig, DetectionConfig},
    crawl::CommonCrawl,
    detect::Detector,
    embeddings::{WordEmbeddings, WordVectors},
    search::{CandidateRetriever, Document, RetrievalError, SearchProvider},
};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

pub const SOURCE_TEXT: &str = "Solar panels convert sunlight into electricity for homes.";

/// Search provider serving a fixed result list and counting queries.
pub struct StubProvider {
    documents: Vec<Document>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl StubProvider {
    pub fn new(documents: Vec<Document>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Self {
            documents,
            fail: false,
            calls: calls.clone(),
        };
        (provider, calls)
    }

    pub fn failing() -> Self {
        Self {
            documents: vec![],
            fail: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl SearchProvider for StubProvider {
    fn search(&self, _query: &str) -> Result<Vec<Document>, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RetrievalError::Status(503));
        }
        Ok(self.documents.clone())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

pub fn document(content: &str, link: &str) -> Document {
    Document {
        content: content.to_string(),
        title: format!("Title of {link}"),
        link: link.to_string(),
    }
}

/// A copy of [`SOURCE_TEXT`] and an unrelated page.
pub fn search_results() -> Vec<Document> {
    vec![
        document("The recipe needs flour, butter and two eggs.", "https://baking.example"),
        document(SOURCE_TEXT, "https://energy.example"),
    ]
}

/// Vectors for the lemmas of the test texts.
pub fn word_vectors() -> Arc<dyn WordEmbeddings> {
    let mut table = WordVectors::new(3);
    for (word, vector) in [
        ("solar", [1.0, 0.1, 0.0]),
        ("panel", [0.9, 0.2, 0.0]),
        ("convert", [0.5, 0.5, 0.0]),
        ("sunlight", [1.0, 0.0, 0.1]),
        ("electricity", [0.8, 0.0, 0.3]),
        ("home", [0.2, 0.6, 0.2]),
        ("recipe", [0.0, 0.1, 1.0]),
        ("flour", [0.0, 0.2, 0.9]),
        ("butter", [0.1, 0.0, 1.0]),
        ("egg", [0.0, 0.3, 0.8]),
    ] {
        table.insert(word, vector.to_vec()).unwrap();
    }
    Arc::new(table)
}

pub fn create_detector(
    provider: impl SearchProvider + 'static,
    embeddings: Option<Arc<dyn WordEmbeddings>>,
) -> Detector {
    Detector::new(
        CandidateRetriever::new(Box::new(provider)),
        DetectionConfig::default(),
        embeddings,
        true,
    )
}

/// An isolated app around `detector`. Downloads land in the returned temp dir.
pub fn create_app(detector: Detector) -> (App, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let crawl = CommonCrawl::new(&CrawlConfig::default(), tmp.path().join("downloads"))
        .expect("failed to create crawl client");
    let app = App::from_parts(detector, crawl, Duration::from_secs(5)).expect("failed to create app");
    (app, tmp)
}

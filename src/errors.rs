use crate::{
    crawl::CrawlError, embeddings::EmbeddingError, search::RetrievalError,
    similarity::ScoringError, validation::ValidationError,
};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Scoring(#[from] ScoringError),

    #[error("{0}")]
    Retrieval(#[from] RetrievalError),

    #[error("{0}")]
    Crawl(#[from] CrawlError),

    #[error("{0}")]
    Embedding(#[from] EmbeddingError),

    #[error("reqwest error: {0:?}")]
    Reqwest(#[from] reqwest::Error),

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("unexpected error: {0:?}")]
    Other(#[from] anyhow::Error),
}

use crate::{
    app::App,
    crawl::DownloadReport,
    detect::{ComparisonResult, PlagiarismReport, SentenceComparison},
    errors::AppError,
    search::Document,
    similarity::edit::{self, ChunkComparison, Granularity, Splitter},
    validation::{self, ValidationError},
};
use anyhow::{anyhow, Context};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::{path::PathBuf, sync::Arc};
use tokio::signal;

#[derive(Clone)]
struct SharedState {
    app: Arc<App>,
}

pub fn router(app: Arc<App>) -> Router {
    let shared_state = Arc::new(SharedState { app });

    Router::new()
        .route("/extract_keywords", post(extract_keywords))
        .route("/search", post(search))
        .route("/cosine-similarity", post(cosine_similarity))
        .route("/cosine-similarity-model", post(cosine_similarity_model))
        .route("/find_plagiarism", post(find_plagiarism))
        .route("/download-text", post(download_text))
        .route("/compare", post(compare))
        .route("/compare-chunks", post(compare_chunks))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_response(tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO)),
        )
        .with_state(shared_state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("failed to listen for ctrl+c: {err}");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                log::error!("failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::warn!("shutting down");
}

async fn start_app(app: App, listen: &str) -> anyhow::Result<()> {
    let router = router(Arc::new(app));

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;
    log::info!("listening on {listen}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

pub fn start_daemon(app: App, listen: &str) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?
        .block_on(start_app(app, listen))
}

#[derive(Debug)]
struct HttpError(AppError);

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AppError::Validation(_) => {
                log::debug!("{self:?}");
                StatusCode::BAD_REQUEST
            }
            _ => {
                log::error!("{self:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

impl<E> From<E> for HttpError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

type HttpResult<T> = Result<Json<T>, HttpError>;

#[derive(Debug, Serialize)]
struct ResultsResponse<T> {
    results: T,
}

async fn extract_keywords(State(state): State<Arc<SharedState>>, body: Bytes) -> HttpResult<ResultsResponse<Vec<String>>> {
    let app = state.app.clone();

    tokio::task::block_in_place(move || {
        let body = validation::parse_body(&body)?;
        let text = validation::require_text(&body, "text")?;

        Ok(Json(ResultsResponse {
            results: app.detector.extract_keywords(text),
        }))
    })
}

async fn search(State(state): State<Arc<SharedState>>, body: Bytes) -> HttpResult<ResultsResponse<Vec<Document>>> {
    let app = state.app.clone();

    tokio::task::block_in_place(move || {
        let body = validation::parse_body(&body)?;
        let keywords = validation::require_list(&body, "text")?;

        Ok(Json(ResultsResponse {
            results: app.detector.search(&keywords),
        }))
    })
}

async fn cosine_similarity(State(state): State<Arc<SharedState>>, body: Bytes) -> HttpResult<ComparisonResult> {
    let app = state.app.clone();

    tokio::task::block_in_place(move || {
        let body = validation::parse_body(&body)?;
        let inputs = validation::require_list(&body, "input_texts")?;
        let targets = validation::optional_list(&body, "target_texts")?;

        app.detector
            .compare(&inputs, targets.as_deref())
            .into_iter()
            .next()
            .map(Json)
            .ok_or_else(|| HttpError::from(AppError::Other(anyhow!("no comparison result"))))
    })
}

async fn cosine_similarity_model(
    State(state): State<Arc<SharedState>>,
    body: Bytes,
) -> HttpResult<Vec<SentenceComparison>> {
    let app = state.app.clone();

    tokio::task::block_in_place(move || {
        let body = validation::parse_body(&body)?;
        let inputs = validation::require_list(&body, "input_texts")?;
        let targets = validation::require_list(&body, "target_texts")?;

        // only the first input is compared, sentence by sentence
        Ok(Json(app.detector.compare_semantic(&inputs[0], &targets)?))
    })
}

async fn find_plagiarism(State(state): State<Arc<SharedState>>, body: Bytes) -> HttpResult<PlagiarismReport> {
    let app = state.app.clone();

    tokio::task::block_in_place(move || {
        let body = validation::parse_body(&body)?;
        let text = validation::require_text(&body, "text")?;

        Ok(Json(app.detector.find_plagiarism(text)))
    })
}

#[derive(Debug, Serialize)]
struct DownloadResponse {
    message: &'static str,
    files: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

async fn download_text(State(state): State<Arc<SharedState>>, body: Bytes) -> Result<Response, HttpError> {
    let app = state.app.clone();

    tokio::task::block_in_place(move || {
        let body = validation::parse_body(&body)?;
        let urls = validation::require_list(&body, "urls")?;

        let DownloadReport { files, errors } = app.crawl.download_all(&urls)?;

        if files.is_empty() && !errors.is_empty() {
            return Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"errors": errors}))).into_response());
        }

        Ok(Json(DownloadResponse {
            message: "Data download completed.",
            files,
            errors,
        })
        .into_response())
    })
}

#[derive(Debug, Serialize)]
struct SimilarityResponse {
    similarity: f64,
}

fn distance_threshold(body: &Value) -> Result<usize, ValidationError> {
    Ok(validation::optional_usize(body, "distanceThreshold")?.unwrap_or(edit::DEFAULT_DISTANCE_THRESHOLD))
}

async fn compare(body: Bytes) -> HttpResult<SimilarityResponse> {
    tokio::task::block_in_place(move || {
        let body = validation::parse_body(&body)?;
        let text1 = validation::require_text(&body, "text1")?;
        let text2 = validation::require_text(&body, "text2")?;
        let threshold = distance_threshold(&body)?;

        Ok(Json(SimilarityResponse {
            similarity: edit::percentage(text1, text2, threshold),
        }))
    })
}

/// `pattern` wins over `granularity`; sentences when neither is given.
fn splitter(body: &Value) -> Result<Splitter, ValidationError> {
    if let Some(pattern) = validation::optional_str(body, "pattern")? {
        return Splitter::from_pattern(pattern).map_err(|err| ValidationError::InvalidPattern {
            field: "pattern".to_string(),
            reason: err.to_string(),
        });
    }

    match validation::optional_str(body, "granularity")? {
        None | Some("sentences") => Ok(Granularity::Sentences.into()),
        Some("paragraphs") => Ok(Granularity::Paragraphs.into()),
        Some(_) => Err(ValidationError::WrongType {
            field: "granularity".to_string(),
            expected: "sentences or paragraphs",
        }),
    }
}

async fn compare_chunks(body: Bytes) -> HttpResult<ChunkComparison> {
    tokio::task::block_in_place(move || {
        let body = validation::parse_body(&body)?;
        let text1 = validation::require_text(&body, "text1")?;
        let text2 = validation::require_text(&body, "text2")?;
        let threshold = distance_threshold(&body)?;
        let splitter = splitter(&body)?;

        Ok(Json(edit::chunk_percentages(text1, text2, &splitter, threshold)))
    })
}

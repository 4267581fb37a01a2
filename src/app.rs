use crate::{
    config::{Config, EmbeddingSource, EmbeddingsConfig, SearchConfig, SearchProviderKind},
    crawl::CommonCrawl,
    detect::Detector,
    embeddings::{EmbeddingModel, WordEmbeddings, WordVectors},
    errors::AppError,
    search::{ddg::DdgSearch, google::GoogleSearch, CandidateRetriever, SearchProvider, Unconfigured},
};
use anyhow::{anyhow, Context};
use homedir::my_home;
use reqwest::blocking::Client;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

/// Everything a request needs, built once at startup.
pub struct App {
    pub detector: Arc<Detector>,
    pub crawl: Arc<CommonCrawl>,
    client: Client,
}

impl App {
    /// `SIMCHECK_BASE_PATH`, else `~/.local/share/simcheck`.
    pub fn base_path() -> anyhow::Result<PathBuf> {
        if let Ok(path) = std::env::var("SIMCHECK_BASE_PATH") {
            return Ok(PathBuf::from(path));
        }

        let home = my_home()
            .context("could not determine home directory")?
            .ok_or_else(|| anyhow!("home directory path is empty"))?;

        Ok(home.join(".local/share/simcheck"))
    }

    pub fn load_config() -> anyhow::Result<Config> {
        let base_path = Self::base_path()?;
        Config::load_with(&base_path)
    }

    pub fn new(config: Config) -> anyhow::Result<Self> {
        let retriever = CandidateRetriever::new(build_provider(&config.search));
        log::info!("search provider={}", retriever.provider_name());

        let embeddings = load_embeddings(&config.embeddings, config.base_path(), |p| config.resolve(p))?;
        let detector = Detector::new(
            retriever,
            config.detection.clone(),
            embeddings,
            config.embeddings.tfidf_weighted,
        );

        let crawl = CommonCrawl::new(&config.crawl, config.resolve(&config.crawl.download_dir))
            .context("failed to initialize crawl client")?;

        Self::from_parts(detector, crawl, Duration::from_secs(config.crawl.timeout_secs))
    }

    /// `timeout` applies to live page fetches.
    pub fn from_parts(detector: Detector, crawl: CommonCrawl, timeout: Duration) -> anyhow::Result<Self> {
        let client = crate::http::build_client(timeout).context("failed to build http client")?;

        Ok(Self {
            detector: Arc::new(detector),
            crawl: Arc::new(crawl),
            client,
        })
    }

    /// Paragraph text of a live page.
    pub fn page_text(&self, url: &str) -> Result<String, AppError> {
        Ok(crate::http::page_text(&self.client, url)?)
    }
}

/// A provider that cannot be built still answers, failing every query, so
/// commands that never search keep working.
fn build_provider(config: &SearchConfig) -> Box<dyn SearchProvider> {
    let (name, built) = match config.provider {
        SearchProviderKind::Google => (
            "google",
            GoogleSearch::new(config).map(|p| Box::new(p) as Box<dyn SearchProvider>),
        ),
        SearchProviderKind::Duckduckgo => (
            "duckduckgo",
            DdgSearch::new(config).map(|p| Box::new(p) as Box<dyn SearchProvider>),
        ),
    };

    built.unwrap_or_else(|err| {
        log::warn!("provider={name} outcome=unconfigured error={err}");
        Box::new(Unconfigured::new(name, err.to_string()))
    })
}

fn load_embeddings(
    config: &EmbeddingsConfig,
    base_path: &Path,
    resolve: impl Fn(&Path) -> PathBuf,
) -> anyhow::Result<Option<Arc<dyn WordEmbeddings>>> {
    if !config.enabled {
        log::info!("embeddings=disabled");
        return Ok(None);
    }

    let table = match config.source {
        EmbeddingSource::Word2vecBinary | EmbeddingSource::Word2vecText => {
            let path = config
                .path
                .as_deref()
                .map(&resolve)
                .context("embeddings.path is not set")?;

            log::info!("embeddings=loading source={:?} path={}", config.source, path.display());

            let table = if config.source == EmbeddingSource::Word2vecBinary {
                WordVectors::load_binary(&path, config.max_words)
            } else {
                WordVectors::load_text(&path, config.max_words)
            };
            table.with_context(|| format!("failed to load word vectors from {}", path.display()))?
        }
        EmbeddingSource::Fastembed => {
            let path = config
                .vocabulary
                .as_deref()
                .map(&resolve)
                .context("embeddings.vocabulary is not set")?;

            let words = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let mut words: Vec<String> = words
                .lines()
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect();
            if let Some(max) = config.max_words {
                words.truncate(max);
            }

            log::info!("embeddings=loading source=fastembed model={} words={}", config.model, words.len());

            let model = EmbeddingModel::new(&config.model, base_path.to_path_buf())?;
            WordVectors::from_model(&model, &words)?
        }
    };

    log::info!("embeddings=loaded words={} vector_size={}", table.len(), table.vector_size());

    Ok(Some(Arc::new(table)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_credentials_yield_failing_provider() {
        let config = SearchConfig::default();
        let provider = build_provider(&config);

        assert_eq!(provider.name(), "google");
        assert!(provider.search("anything").is_err());
    }

    #[test]
    fn test_disabled_embeddings_are_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let config = EmbeddingsConfig::default();
        let loaded = load_embeddings(&config, dir.path(), |p| dir.path().join(p)).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_text_embeddings_resolve_against_base_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("vectors.txt")).unwrap();
        writeln!(file, "cat 1.0 0.0").unwrap();
        writeln!(file, "dog 0.0 1.0").unwrap();

        let config = EmbeddingsConfig {
            enabled: true,
            source: EmbeddingSource::Word2vecText,
            path: Some(PathBuf::from("vectors.txt")),
            ..Default::default()
        };

        let table = load_embeddings(&config, dir.path(), |p| dir.path().join(p))
            .unwrap()
            .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.vector_size(), 2);
        assert_eq!(table.get("dog"), Some(&[0.0f32, 1.0][..]));
    }

    #[test]
    fn test_missing_vector_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = EmbeddingsConfig {
            enabled: true,
            source: EmbeddingSource::Word2vecBinary,
            path: Some(PathBuf::from("absent.bin")),
            ..Default::default()
        };
        assert!(load_embeddings(&config, dir.path(), |p| dir.path().join(p)).is_err());
    }
}

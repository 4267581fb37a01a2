use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_LISTEN: &str = "127.0.0.1:5000";
const DEFAULT_GOOGLE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
/// Google CSE never returns more than 10 results per page.
const GOOGLE_MAX_PAGE_SIZE: usize = 10;
const DEFAULT_PAGE_SIZE: usize = 10;
const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 10;

const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

const DEFAULT_ESCALATION_THRESHOLD: f64 = 0.3;
const DEFAULT_TOP_LINKS: usize = 5;
const DEFAULT_SEGMENT_COUNT: usize = 3;
const DEFAULT_MIN_SEGMENT_LENGTH: usize = 150;
const DEFAULT_MAX_KEYWORDS: usize = 5;

const DEFAULT_CRAWL_INDEX_URL: &str = "http://index.commoncrawl.org/collinfo.json";
const DEFAULT_CRAWL_DATA_URL: &str = "https://commoncrawl.s3.amazonaws.com";
const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
const DEFAULT_CRAWL_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProviderKind {
    #[default]
    Google,
    Duckduckgo,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub provider: SearchProviderKind,

    /// Google API key, `GOOGLE_API_KEY` takes precedence
    #[serde(default)]
    pub api_key: Option<String>,

    /// Google programmable search engine id, `GOOGLE_CSE_ID` takes precedence
    #[serde(default)]
    pub engine_id: Option<String>,

    #[serde(default = "default_google_endpoint")]
    pub endpoint: String,

    /// Results requested per query
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: SearchProviderKind::default(),
            api_key: None,
            engine_id: None,
            endpoint: default_google_endpoint(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_SEARCH_TIMEOUT_SECS,
        }
    }
}

fn default_google_endpoint() -> String {
    DEFAULT_GOOGLE_ENDPOINT.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_search_timeout_secs() -> u64 {
    DEFAULT_SEARCH_TIMEOUT_SECS
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingSource {
    #[default]
    Word2vecBinary,
    Word2vecText,
    Fastembed,
}

/// Word embeddings used by the semantic pass
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub source: EmbeddingSource,

    /// Vector file for the word2vec sources, relative paths resolve against the base path
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Load at most this many words from a vector file
    #[serde(default)]
    pub max_words: Option<usize>,

    /// fastembed model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Word list embedded with the fastembed model, one word per line
    #[serde(default)]
    pub vocabulary: Option<PathBuf>,

    /// Weight word vectors by their TF-IDF value
    #[serde(default = "default_true")]
    pub tfidf_weighted: bool,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            source: EmbeddingSource::default(),
            path: None,
            max_words: None,
            model: default_embedding_model(),
            vocabulary: None,
            tfidf_weighted: true,
        }
    }
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LexicalMethod {
    #[default]
    Tfidf,
    RawFrequency,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Semantic pass runs when the lexical max similarity is strictly above this
    #[serde(default = "default_escalation_threshold")]
    pub escalation_threshold: f64,

    #[serde(default = "default_top_links")]
    pub top_links: usize,

    #[serde(default = "default_segment_count")]
    pub segment_count: usize,

    /// Texts shorter than this (in characters) are not segmented
    #[serde(default = "default_min_segment_length")]
    pub min_segment_length: usize,

    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,

    #[serde(default)]
    pub lexical_method: LexicalMethod,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            escalation_threshold: DEFAULT_ESCALATION_THRESHOLD,
            top_links: DEFAULT_TOP_LINKS,
            segment_count: DEFAULT_SEGMENT_COUNT,
            min_segment_length: DEFAULT_MIN_SEGMENT_LENGTH,
            max_keywords: DEFAULT_MAX_KEYWORDS,
            lexical_method: LexicalMethod::default(),
        }
    }
}

fn default_escalation_threshold() -> f64 {
    DEFAULT_ESCALATION_THRESHOLD
}

fn default_top_links() -> usize {
    DEFAULT_TOP_LINKS
}

fn default_segment_count() -> usize {
    DEFAULT_SEGMENT_COUNT
}

fn default_min_segment_length() -> usize {
    DEFAULT_MIN_SEGMENT_LENGTH
}

fn default_max_keywords() -> usize {
    DEFAULT_MAX_KEYWORDS
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CrawlConfig {
    #[serde(default = "default_crawl_index_url")]
    pub index_url: String,

    #[serde(default = "default_crawl_data_url")]
    pub data_url: String,

    /// Relative paths resolve against the base path
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    #[serde(default = "default_crawl_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            index_url: default_crawl_index_url(),
            data_url: default_crawl_data_url(),
            download_dir: default_download_dir(),
            timeout_secs: DEFAULT_CRAWL_TIMEOUT_SECS,
        }
    }
}

fn default_crawl_index_url() -> String {
    DEFAULT_CRAWL_INDEX_URL.to_string()
}

fn default_crawl_data_url() -> String {
    DEFAULT_CRAWL_DATA_URL.to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DOWNLOAD_DIR)
}

fn default_crawl_timeout_secs() -> u64 {
    DEFAULT_CRAWL_TIMEOUT_SECS
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        let det = &self.detection;
        if !(0.0..=1.0).contains(&det.escalation_threshold) {
            bail!(
                "detection.escalation_threshold must be between 0.0 and 1.0, got {}",
                det.escalation_threshold
            );
        }
        if det.top_links == 0 {
            bail!("detection.top_links must be greater than 0");
        }
        if det.segment_count == 0 {
            bail!("detection.segment_count must be greater than 0");
        }
        if det.max_keywords == 0 {
            bail!("detection.max_keywords must be greater than 0");
        }

        let search = &self.search;
        if search.page_size == 0 {
            bail!("search.page_size must be greater than 0");
        }
        if search.provider == SearchProviderKind::Google && search.page_size > GOOGLE_MAX_PAGE_SIZE {
            bail!(
                "search.page_size must be at most {GOOGLE_MAX_PAGE_SIZE} for the google provider, got {}",
                search.page_size
            );
        }

        let emb = &self.embeddings;
        if emb.enabled {
            match emb.source {
                EmbeddingSource::Word2vecBinary | EmbeddingSource::Word2vecText if emb.path.is_none() => {
                    bail!("embeddings.path is required for the {:?} source", emb.source)
                }
                EmbeddingSource::Fastembed if emb.vocabulary.is_none() => {
                    bail!("embeddings.vocabulary is required for the fastembed source")
                }
                _ => {}
            }
        }

        Ok(())
    }

    pub fn load_with(base_path: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(base_path)
            .with_context(|| format!("failed to create {}", base_path.display()))?;

        let path = base_path.join(CONFIG_FILE);

        // create new if does not exist
        if !path.exists() {
            std::fs::write(&path, serde_yml::to_string(&Self::default())?)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }

        let config_str = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path.to_path_buf();
        config.apply_env();
        config.validate()?;

        Ok(config)
    }

    /// Credentials from the environment win over the file.
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            self.search.api_key = Some(key);
        }
        if let Ok(id) = std::env::var("GOOGLE_CSE_ID") {
            self.search.engine_id = Some(id);
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// `path` itself when absolute, else joined onto the base path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}

//! Common Crawl archive downloads.
//!
//! A URL is looked up in the newest crawl index (CDX API), then the matching
//! WARC record is fetched with a byte-range request and stored gzipped as
//! `data_<n>.warc.gz`.

use crate::{config::CrawlConfig, http::get_error};
use flate2::read::MultiGzDecoder;
use once_cell::sync::OnceCell;
use reqwest::{blocking::Client, header::RANGE, StatusCode};
use serde::{Deserialize, Serialize};
use std::{
    io::Read,
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("crawl index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("{0}")]
    Http(String),

    #[error("malformed CDX record: {0}")]
    MalformedRecord(String),

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),
}

impl From<reqwest::Error> for CrawlError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(get_error(&err))
    }
}

/// Location of one capture inside a crawl archive file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CdxRecord {
    pub filename: String,
    pub offset: String,
    pub length: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl CdxRecord {
    /// Inclusive byte range of the record.
    pub fn byte_range(&self) -> Result<(u64, u64), CrawlError> {
        let offset: u64 = self
            .offset
            .parse()
            .map_err(|_| CrawlError::MalformedRecord(format!("offset {:?}", self.offset)))?;
        let length: u64 = self
            .length
            .parse()
            .map_err(|_| CrawlError::MalformedRecord(format!("length {:?}", self.length)))?;
        if length == 0 {
            return Err(CrawlError::MalformedRecord("length 0".to_string()));
        }

        Ok((offset, offset + length - 1))
    }
}

/// Outcome of a batch download. Failures never stop the batch.
#[derive(Debug, Default, Serialize)]
pub struct DownloadReport {
    pub files: Vec<PathBuf>,
    pub errors: Vec<String>,
}

pub struct CommonCrawl {
    client: Client,
    index_url: String,
    data_url: String,
    download_dir: PathBuf,
    latest_index: OnceCell<String>,
}

impl CommonCrawl {
    pub fn new(config: &CrawlConfig, download_dir: PathBuf) -> Result<Self, CrawlError> {
        Ok(Self {
            client: crate::http::build_client(Duration::from_secs(config.timeout_secs))?,
            index_url: config.index_url.clone(),
            data_url: config.data_url.trim_end_matches('/').to_string(),
            download_dir,
            latest_index: OnceCell::new(),
        })
    }

    /// CDX endpoint of the newest crawl, resolved once per process.
    pub fn latest_index(&self) -> Result<&str, CrawlError> {
        self.latest_index
            .get_or_try_init(|| {
                let json: serde_json::Value = self
                    .client
                    .get(&self.index_url)
                    .send()
                    .and_then(|r| r.error_for_status())
                    .and_then(|r| r.json())
                    .map_err(|e| CrawlError::IndexUnavailable(get_error(&e)))?;

                let endpoint = parse_collinfo(&json)
                    .ok_or_else(|| CrawlError::IndexUnavailable("no collections listed".to_string()))?;
                log::info!("crawl index endpoint={endpoint}");

                Ok(endpoint)
            })
            .map(String::as_str)
    }

    /// Newest capture of `url`, if the crawl has one.
    pub fn cdx_record(&self, url: &str) -> Result<Option<CdxRecord>, CrawlError> {
        let index = self.latest_index()?;

        let resp = self
            .client
            .get(index)
            .query(&[("url", url), ("output", "json"), ("limit", "1")])
            .send()?;

        // the index answers 404 when there are no captures
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = resp.error_for_status()?.text()?;
        parse_cdx_lines(&body)
    }

    /// Fetch the record's byte range into `out_file`.
    pub fn download_record(&self, record: &CdxRecord, out_file: &Path) -> Result<(), CrawlError> {
        let (start, end) = record.byte_range()?;
        let warc_url = format!("{}/{}", self.data_url, record.filename);

        let bytes = self
            .client
            .get(&warc_url)
            .header(RANGE, format!("bytes={start}-{end}"))
            .send()?
            .error_for_status()?
            .bytes()?;

        std::fs::write(out_file, &bytes)?;
        log::debug!("{warc_url}: saved {} bytes to {}", bytes.len(), out_file.display());

        Ok(())
    }

    /// Download the newest capture of every URL. The n-th URL is stored as
    /// `data_<n>.warc.gz` in the download directory.
    pub fn download_all<S: AsRef<str>>(&self, urls: &[S]) -> Result<DownloadReport, CrawlError> {
        std::fs::create_dir_all(&self.download_dir)?;

        let mut report = DownloadReport::default();

        for (i, url) in urls.iter().enumerate() {
            let url = url.as_ref();
            let out_file = self.download_dir.join(format!("data_{i}.warc.gz"));

            let outcome = self
                .cdx_record(url)
                .and_then(|record| match record {
                    Some(record) => {
                        log::info!("{url}: capture={}", record.url.as_deref().unwrap_or(url));
                        self.download_record(&record, &out_file).map(Some)
                    }
                    None => Ok(None),
                });

            match outcome {
                Ok(Some(())) => report.files.push(out_file),
                Ok(None) => {
                    log::error!("{url}: no CDX record");
                    report.errors.push(format!("No CDX record found for URL: {url}"));
                }
                Err(err) => {
                    log::error!("{url}: {err}");
                    report.errors.push(format!("Error processing URL {url}: {err}"));
                }
            }
        }

        Ok(report)
    }
}

/// `cdx-api` endpoint of the first (newest) collection.
fn parse_collinfo(json: &serde_json::Value) -> Option<String> {
    json.as_array()?
        .first()?
        .get("cdx-api")?
        .as_str()
        .map(str::to_string)
}

/// First record of a newline-delimited JSON CDX response.
fn parse_cdx_lines(body: &str) -> Result<Option<CdxRecord>, CrawlError> {
    match body.lines().map(str::trim).find(|line| !line.is_empty()) {
        Some(line) => serde_json::from_str(line)
            .map(Some)
            .map_err(|e| CrawlError::MalformedRecord(e.to_string())),
        None => Ok(None),
    }
}

/// Paragraph text of the HTML payload inside a downloaded WARC record.
pub fn warc_text(path: &Path) -> Result<String, CrawlError> {
    let file = std::fs::File::open(path)?;
    let mut raw = Vec::new();
    MultiGzDecoder::new(file).read_to_end(&mut raw)?;

    let record = String::from_utf8_lossy(&raw);

    // WARC headers, then HTTP headers, then the body
    let body = record
        .splitn(3, "\r\n\r\n")
        .nth(2)
        .unwrap_or(&record);

    Ok(crate::http::paragraph_text(body))
}

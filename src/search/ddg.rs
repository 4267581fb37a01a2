use super::{Document, RetrievalError, SearchProvider};
use crate::config::SearchConfig;
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use std::time::Duration;

const DDG_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

static RESULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".result:not(.result--ad)").expect("result selector must parse"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".result__a").expect("title selector must parse"));
static SNIPPET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".result__snippet").expect("snippet selector must parse"));

/// DuckDuckGo HTML results page. Needs no credentials.
pub struct DdgSearch {
    client: Client,
    page_size: usize,
}

impl DdgSearch {
    pub fn new(config: &SearchConfig) -> Result<Self, RetrievalError> {
        Ok(Self {
            client: crate::http::build_client(Duration::from_secs(config.timeout_secs))?,
            page_size: config.page_size,
        })
    }
}

impl SearchProvider for DdgSearch {
    fn search(&self, query: &str) -> Result<Vec<Document>, RetrievalError> {
        let resp = self
            .client
            .get(DDG_HTML_ENDPOINT)
            .query(&[("q", query)])
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RetrievalError::Status(status.as_u16()));
        }

        let html = resp.text()?;
        let mut documents = parse_html(&html);
        documents.truncate(self.page_size);

        Ok(documents)
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}

/// Resolve DuckDuckGo's `/l/?uddg=<target>` redirect links to the target.
fn resolve_link(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    match url::Url::parse(&absolute) {
        Ok(parsed) if parsed.path() == "/l/" => parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, target)| target.into_owned())
            .unwrap_or(absolute),
        _ => absolute,
    }
}

fn parse_html(html: &str) -> Vec<Document> {
    let document = Html::parse_document(html);

    document
        .select(&RESULT_SELECTOR)
        .filter_map(|result| {
            let anchor = result.select(&TITLE_SELECTOR).next()?;
            let href = anchor.attr("href")?;

            let title = anchor.text().collect::<String>().trim().to_string();
            let content = result
                .select(&SNIPPET_SELECTOR)
                .next()
                .map(|s| s.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            Some(Document {
                content,
                title,
                link: resolve_link(href),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<html><body><div id="links">
        <div class="result results_links result--ad">
            <h2 class="result__title"><a class="result__a" href="https://ads.example.com">Sponsored</a></h2>
            <a class="result__snippet">Buy now</a>
        </div>
        <div class="result results_links web-result">
            <h2 class="result__title">
                <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FRust&amp;rut=abc">Rust - <b>Wikipedia</b></a>
            </h2>
            <a class="result__snippet" href="#">Rust is a <b>multi-paradigm</b> language.</a>
        </div>
        <div class="result results_links web-result">
            <h2 class="result__title"><a class="result__a" href="https://example.org/direct">Direct</a></h2>
        </div>
        <div class="result"><span>no anchor</span></div>
    </div></body></html>"##;

    #[test]
    fn test_parse_html() {
        let docs = parse_html(PAGE);
        assert_eq!(docs.len(), 2);

        assert_eq!(docs[0].title, "Rust - Wikipedia");
        assert_eq!(docs[0].link, "https://en.wikipedia.org/wiki/Rust");
        assert_eq!(docs[0].content, "Rust is a multi-paradigm language.");

        assert_eq!(docs[1].link, "https://example.org/direct");
        assert_eq!(docs[1].content, "");
    }

    #[test]
    fn test_resolve_link() {
        assert_eq!(
            resolve_link("//duckduckgo.com/l/?uddg=https%3A%2F%2Fa.com%2Fx%3Fy%3D1&rut=z"),
            "https://a.com/x?y=1"
        );
        assert_eq!(resolve_link("https://b.com/"), "https://b.com/");
        assert_eq!(resolve_link("not a url"), "not a url");
    }

    #[test]
    fn test_parse_empty_page() {
        assert!(parse_html("<html><body>No results.</body></html>").is_empty());
    }
}

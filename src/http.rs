use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use std::{error::Error, time::Duration};

pub const USER_AGENT_DEFAULT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0";

static PARAGRAPH_SELECTOR: Lazy<scraper::Selector> =
    Lazy::new(|| scraper::Selector::parse("p").expect("paragraph selector must parse"));

/// Innermost useful message of a reqwest error chain.
pub fn get_error(error: &reqwest::Error) -> String {
    match error.source() {
        Some(e) => match e.source() {
            Some(e) => e.to_string(),
            None => e.to_string(),
        },
        None => error.to_string(),
    }
}

pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT_DEFAULT)
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(10))
        .build()
}

/// Text of every `<p>` element, joined by single spaces.
pub fn paragraph_text(html: &str) -> String {
    let document = scraper::Html::parse_document(html);

    document
        .select(&PARAGRAPH_SELECTOR)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fetch `url` and return the text of its paragraphs.
pub fn page_text(client: &Client, url: &str) -> reqwest::Result<String> {
    log::debug!("{url}: requesting");

    let html = client.get(url).send()?.error_for_status()?.text()?;
    Ok(paragraph_text(&html))
}

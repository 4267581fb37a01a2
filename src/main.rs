use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod config;
mod crawl;
mod detect;
mod embeddings;
mod errors;
mod http;
mod keywords;
mod search;
mod similarity;
mod text;
#[cfg(test)]
mod tests;
mod validation;
mod web;

use app::App;
use cli::Command;

const DEFAULT_LOG_FILTER: &str = "simcheck=info,tower_http=info";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let args = cli::Args::parse();

    match args.command {
        Command::Distance { text1, text2, threshold } => print_json(&serde_json::json!({
            "similarity": similarity::edit::percentage(&text1, &text2, threshold),
        })),

        Command::Keywords { text } => {
            let config = App::load_config()?;
            let extractor = keywords::KeywordExtractor::new(config.detection.max_keywords);
            print_json(&extractor.extract(&text))
        }

        Command::Daemon { listen } => {
            let config = App::load_config()?;
            let listen = listen.unwrap_or_else(|| config.server.listen.clone());
            let app = App::new(config)?;
            web::start_daemon(app, &listen)
        }

        Command::Check { text, file } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, None) => anyhow::bail!("no text given"),
            };

            let app = App::new(App::load_config()?)?;
            print_json(&app.detector.find_plagiarism(&text))
        }

        Command::Compare { inputs, targets } => {
            let app = App::new(App::load_config()?)?;
            let targets = (!targets.is_empty()).then_some(targets);
            print_json(&app.detector.compare(&inputs, targets.as_deref()))
        }

        Command::Search { keywords } => {
            let app = App::new(App::load_config()?)?;
            print_json(&app.detector.search(&keywords))
        }

        Command::Download { urls, extract } => {
            let app = App::new(App::load_config()?)?;
            let report = app.crawl.download_all(&urls)?;

            if !extract {
                return print_json(&report);
            }

            let mut texts = Vec::with_capacity(report.files.len());
            for path in &report.files {
                texts.push(serde_json::json!({
                    "file": path,
                    "text": crawl::warc_text(path)?,
                }));
            }
            print_json(&serde_json::json!({
                "files": texts,
                "errors": report.errors,
            }))
        }

        Command::Fetch { url } => {
            let app = App::new(App::load_config()?)?;
            print_json(&serde_json::json!({
                "url": url,
                "text": app.page_text(&url)?,
            }))
        }
    }
}

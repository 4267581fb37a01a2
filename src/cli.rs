use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start simcheck as a service.
    Daemon {
        /// Address to listen on, overrides `server.listen`
        #[clap(short, long)]
        listen: Option<String>,
    },

    /// Check a text for plagiarism against web search results
    Check {
        /// Text to check
        #[clap(required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file
        #[clap(short, long)]
        file: Option<PathBuf>,
    },

    /// Compare texts by raw term frequency
    Compare {
        /// Input text, may be repeated
        #[clap(short, long = "input", required = true)]
        inputs: Vec<String>,

        /// Target text, may be repeated. Search results are used when omitted
        #[clap(short, long = "target")]
        targets: Vec<String>,
    },

    /// Print the search keywords of a text
    Keywords { text: String },

    /// Query the search provider with keywords
    Search {
        #[clap(required = true)]
        keywords: Vec<String>,
    },

    /// Download crawl-archive records of pages
    Download {
        #[clap(required = true)]
        urls: Vec<String>,

        /// Print the paragraph text of every downloaded record
        #[clap(short, long, default_value = "false")]
        extract: bool,
    },

    /// Print the paragraph text of a live page
    Fetch { url: String },

    /// Edit-distance similarity of two texts, in percent
    Distance {
        text1: String,
        text2: String,

        /// Give up once the distance exceeds this
        #[clap(short, long, default_value_t = crate::similarity::edit::DEFAULT_DISTANCE_THRESHOLD)]
        threshold: usize,
    },
}

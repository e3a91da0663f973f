use clap::{Parser, Subcommand, ValueEnum};
use scrape_view::config::Backend;
use scrape_view::pagination::{ContentFilter, Section};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scrape-view")]
#[command(about = "Scrapes web pages and serves cached, paginated results")]
#[command(version)]
pub struct Args {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Page fetching backend (overrides the config file)
    #[arg(short, long, value_enum, global = true)]
    pub backend: Option<BackendArg>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Scrape one URL and print the result
    Scrape {
        /// Page to scrape
        url: String,

        /// Section whose page is shown instead of its first display
        #[arg(short, long, value_enum)]
        section: Option<SectionArg>,

        /// Page of `--section` to show
        #[arg(short, long, default_value_t = 1, requires = "section")]
        page: usize,

        /// Only show one kind of content
        #[arg(short, long, value_enum, default_value_t = FilterArg::All)]
        filter: FilterArg,

        /// Print the raw JSON response instead of the text view
        #[arg(long)]
        json: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Http,
    Webdriver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SectionArg {
    Headings,
    Paragraphs,
    Links,
    Images,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FilterArg {
    All,
    Headings,
    Paragraphs,
    Links,
    Images,
}

/// Convert from CLI argument backend to config backend
pub fn convert_backend(arg: BackendArg) -> Backend {
    match arg {
        BackendArg::Http => Backend::Http,
        BackendArg::Webdriver => Backend::WebDriver,
    }
}

pub fn convert_section(arg: SectionArg) -> Section {
    match arg {
        SectionArg::Headings => Section::Headings,
        SectionArg::Paragraphs => Section::Paragraphs,
        SectionArg::Links => Section::Links,
        SectionArg::Images => Section::Images,
    }
}

pub fn convert_filter(arg: FilterArg) -> ContentFilter {
    match arg {
        FilterArg::All => ContentFilter::All,
        FilterArg::Headings => ContentFilter::Only(Section::Headings),
        FilterArg::Paragraphs => ContentFilter::Only(Section::Paragraphs),
        FilterArg::Links => ContentFilter::Only(Section::Links),
        FilterArg::Images => ContentFilter::Only(Section::Images),
    }
}

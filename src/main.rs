use anyhow::{bail, Context, Result};
use clap::Parser;
use listing_scout::config::{Config, FetcherConfig, FetcherKind};
use listing_scout::models::ListingRecord;
use listing_scout::output::JsonFileSink;
use listing_scout::scrapers::{
    parse_from_url, ChromeFetcher, FieldName, HttpFetcher, ListingSink, SiteProfile,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Extract real-estate listings from paginated search results
#[derive(Debug, Parser)]
#[command(name = "listing-scout", version)]
struct Cli {
    /// Configuration file with fetcher settings and site profiles
    #[arg(short, long, default_value = "config/sites.toml")]
    config: PathBuf,

    /// Site profile to use
    #[arg(short, long, required_unless_present = "check")]
    site: Option<String>,

    /// First result page
    #[arg(short, long, required_unless_present = "check")]
    url: Option<Url>,

    /// Load pages over plain HTTP instead of headless Chrome
    #[arg(long)]
    http: bool,

    /// Output JSON file
    #[arg(short, long, default_value = "listings.json")]
    output: PathBuf,

    /// Also write one JSON file per listing into this directory
    #[arg(long)]
    raw_dir: Option<PathBuf>,

    /// Only validate the site profiles and exit
    #[arg(long)]
    check: bool,
}

fn scrape(url: Url, profile: SiteProfile, fetcher: FetcherConfig, kind: FetcherKind) -> Result<Vec<ListingRecord>> {
    let listings = match kind {
        FetcherKind::Chrome => {
            let mut chrome = ChromeFetcher::new(fetcher)?;
            if let Some(wrapper) = profile.selector(FieldName::AdWrapper) {
                chrome = chrome.wait_for(wrapper);
            }
            parse_from_url(&url, &profile, chrome)?
        }
        FetcherKind::Http => parse_from_url(&url, &profile, HttpFetcher::new(&fetcher)?)?,
    };
    Ok(listings)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    info!("🏠 Listing Scout");

    let config = Config::load(&cli.config)?;
    let registry = config.registry()?;
    info!("Loaded {} site profiles from {}", registry.len(), cli.config.display());

    if cli.check {
        for site in registry.site_ids() {
            println!("{}", site);
        }
        return Ok(());
    }

    let (Some(site), Some(url)) = (cli.site, cli.url) else {
        bail!("--site and --url are required");
    };
    let profile = registry.get(&site)?.clone();
    let kind = if cli.http { FetcherKind::Http } else { config.fetcher.kind };
    let fetcher = config.fetcher.clone();

    info!("Starting {:?} scrape of {} from {}", kind, site, url);

    // Page fetching blocks, keep it off the async runtime
    let listings = tokio::task::spawn_blocking(move || scrape(url, profile, fetcher, kind))
        .await
        .context("Scrape task panicked")??;

    info!("\n✅ Scraped {} listings\n", listings.len());

    for (i, listing) in listings.iter().enumerate() {
        println!(
            "{}. {} ({} €)",
            i + 1,
            listing.title.as_deref().unwrap_or("(untitled)"),
            listing.price
        );
        println!("   {} rooms, {} m²", listing.rooms_count, listing.area);
        if let Some(location) = &listing.location {
            println!("   Location: {}", location);
        }
        if listing.new_build {
            println!("   New build");
        }
        println!("   URL: {}", listing.url);
        println!();
    }

    let mut sink = JsonFileSink::new(&cli.output);
    if let Some(raw_dir) = &cli.raw_dir {
        sink = sink.with_raw_dir(raw_dir);
    }
    sink.write(&listings).await?;

    Ok(())
}

use clap::Parser;
use event_pager::ScrapeSession;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging; RUST_LOG still wins over --verbose
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("{}", e);
            return ExitCode::from(2);
        }
    };

    ::log::info!("Starting scraper with the following settings:");
    ::log::info!("Listing URL: {}", config.listing_url);
    ::log::info!("Max pages: {}", config.max_pages);
    ::log::info!("Output file: {}", config.output_path.display());
    ::log::info!("Headless mode: {}", config.headless);

    let start_time = std::time::Instant::now();
    match ScrapeSession::new(config).execute().await {
        Ok(path) => {
            ::log::info!(
                "Finished in {:.2} seconds, output written to {}",
                start_time.elapsed().as_secs_f64(),
                path.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) if e.is_setup_failure() => {
            ::log::error!("Could not start scraping: {}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            ::log::error!("Error during scraping: {}", e);
            ExitCode::from(1)
        }
    }
}

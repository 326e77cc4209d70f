use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::error;
use tracing_subscriber::EnvFilter;

use garden_grab::garden::{GardenClient, GardenConfig};
use garden_grab::harvest::{HarvestConfig, Harvester, UnresolvedPolicy};
use garden_grab::resolver::{HttpRedirectSource, RedirectConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Grab the Radio Garden directory into an XSPF playlist")]
struct Args {
    /// Playlist title
    #[arg(long, default_value = "Radio Garden")]
    title: String,

    /// Output playlist path
    #[arg(long, short, default_value = "Radio Garden.xspf")]
    output: PathBuf,

    /// Root directory for the stream URL cache
    #[arg(long, default_value = "cache")]
    cache_dir: PathBuf,

    /// Content API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Abort the whole run when a station cannot be resolved,
    /// instead of skipping it
    #[arg(long)]
    abort_on_unresolved: bool,

    /// Hide the progress bar
    #[arg(long, short)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut garden_config = GardenConfig::new();
    if let Some(base_url) = &args.base_url {
        garden_config = garden_config.with_base_url(base_url);
    }

    let directory = match GardenClient::new(garden_config) {
        Ok(client) => client,
        Err(e) => {
            error!("failed to create API client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let source = match HttpRedirectSource::new(RedirectConfig::default()) {
        Ok(source) => source,
        Err(e) => {
            error!("failed to create redirect client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = HarvestConfig {
        title: args.title,
        output_path: args.output,
        cache_dir: args.cache_dir,
        unresolved: if args.abort_on_unresolved {
            UnresolvedPolicy::Abort
        } else {
            UnresolvedPolicy::Skip
        },
        ..HarvestConfig::default()
    };

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::no_length();
        bar.set_style(
            ProgressStyle::with_template(
                "{bar:40.cyan/blue} {pos}/{len} cities [{elapsed_precise}] {msg}",
            )
            .expect("valid progress template"),
        );
        bar
    };

    let harvester = Harvester::new(directory, source, config);

    let playlist = match harvester.run(&progress).await {
        Ok(playlist) => playlist,
        Err(e) => {
            progress.abandon();
            error!("harvest failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    progress.finish_and_clear();

    let output = &harvester.config().output_path;
    if let Err(e) = playlist.save(output) {
        error!("failed to write playlist: {e}");
        return ExitCode::FAILURE;
    }

    println!("{} tracks written to {}", playlist.len(), output.display());
    ExitCode::SUCCESS
}

//! Anime catalogue CLI application.

use anime_catalogue::{
    render, Browser, Catalogue, DetailOutcome, FilterDraft, FilterField, LoadOutcome,
};
use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use jikan_api::{FilterPatch, JikanClient};
use shared::{Config, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::BufReader;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a filtered listing
    List(ListArgs),

    /// Print the full record of one title
    Show {
        /// MyAnimeList id
        id: String,

        /// Print the raw record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the genre list
    Genres,

    /// Browse interactively
    Browse,

    /// Write the default configuration to the config path
    InitConfig {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ClapArgs, Debug)]
struct ListArgs {
    /// Title search
    #[arg(short, long)]
    query: Option<String>,

    /// Comma-separated genre ids or names
    #[arg(short, long)]
    genres: Option<String>,

    /// tv, movie, ova, special, ona, music, cm, pv, tv_special
    #[arg(long = "type")]
    anime_type: Option<String>,

    /// airing, complete, upcoming
    #[arg(long)]
    status: Option<String>,

    /// g, pg, pg13, r17, r, rx
    #[arg(long)]
    rating: Option<String>,

    #[arg(long)]
    order_by: Option<String>,

    /// asc or desc
    #[arg(long)]
    sort: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    start_date: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    end_date: Option<String>,

    /// Pages to load
    #[arg(short, long, default_value_t = 1)]
    pages: u32,

    /// Print the loaded titles as JSON
    #[arg(long)]
    json: bool,
}

impl ListArgs {
    fn fields(&self) -> Vec<(FilterField, &str)> {
        [
            (FilterField::Genres, &self.genres),
            (FilterField::Type, &self.anime_type),
            (FilterField::Status, &self.status),
            (FilterField::Rating, &self.rating),
            (FilterField::OrderBy, &self.order_by),
            (FilterField::Sort, &self.sort),
            (FilterField::StartDate, &self.start_date),
            (FilterField::EndDate, &self.end_date),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    /// Genre names need the genre list to resolve
    fn needs_genres(&self) -> bool {
        self.genres.as_deref().is_some_and(|g| {
            g.split(',')
                .map(str::trim)
                .any(|part| !part.is_empty() && part.parse::<u32>().is_err())
        })
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    if let Command::InitConfig { force } = args.command {
        if args.config.exists() && !force {
            eprintln!("{} already exists, pass --force to replace it", args.config.display());
            return Ok(ExitCode::FAILURE);
        }
        Config::default().save(&args.config)?;
        println!("Wrote {}", args.config.display());
        return Ok(ExitCode::SUCCESS);
    }

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        config.log_level()
    };

    shared::logging::init(LogConfig::from_settings(
        &config.logging,
        "anime-catalogue",
        log_level,
    ))?;

    info!(config_file = %args.config.display(), "Anime catalogue starting");

    // Initialize API client
    let client = JikanClient::new(
        &config.api.base_url,
        config.api.timeout(),
        &config.api.user_agent,
    )
    .context("Failed to create Jikan client")?;

    let mut catalogue = Catalogue::new(client, config.catalogue.page_limit);

    match args.command {
        Command::List(list_args) => run_list(&mut catalogue, list_args).await,
        Command::Show { id, json } => run_show(&mut catalogue, &id, json).await,
        Command::Genres => {
            let genres = catalogue
                .source()
                .get_genres()
                .await
                .context("Failed to load genres")?;
            print!("{}", render::render_genres(&genres));
            Ok(ExitCode::SUCCESS)
        }
        Command::Browse => {
            let stdin = BufReader::new(tokio::io::stdin());
            let mut browser = Browser::new(catalogue, &config.catalogue, std::io::stdout());
            browser.run(stdin).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::InitConfig { .. } => Ok(ExitCode::SUCCESS),
    }
}

async fn run_list(catalogue: &mut Catalogue<JikanClient>, args: ListArgs) -> Result<ExitCode> {
    if args.needs_genres() {
        catalogue.load_genres().await;
    }

    let mut draft = FilterDraft::open(&catalogue.state().list.filters);
    for (field, value) in args.fields() {
        draft
            .set(field, value, catalogue.genres())
            .with_context(|| format!("Invalid --{}", field.as_str().replace('_', "-")))?;
    }
    let mut patch = draft.into_patch();
    if let Some(query) = &args.query {
        patch = patch.and(FilterPatch::query(query.trim()));
    }
    catalogue.set_filters(patch);

    if let LoadOutcome::Failed(message) = catalogue.load_initial().await {
        eprintln!("Error: {}", message);
        return Ok(ExitCode::FAILURE);
    }
    for _ in 1..args.pages {
        match catalogue.load_more().await {
            LoadOutcome::Loaded { .. } => {}
            LoadOutcome::Failed(message) => {
                eprintln!("Error: {}", message);
                break;
            }
            LoadOutcome::Skipped | LoadOutcome::Stale => break,
        }
    }

    let list = &catalogue.state().list;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&list.data).context("Failed to serialize listing")?
        );
    } else {
        print!("{}", render::render_list(list, None));
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_show(catalogue: &mut Catalogue<JikanClient>, id: &str, json: bool) -> Result<ExitCode> {
    let outcome = catalogue.fetch_detail(id).await;
    let detail = &catalogue.state().detail;

    match (&outcome, &detail.anime) {
        (DetailOutcome::Loaded, Some(anime)) if json => {
            println!(
                "{}",
                serde_json::to_string_pretty(anime).context("Failed to serialize anime")?
            );
        }
        _ => print!("{}", render::render_detail(detail)),
    }

    Ok(match outcome {
        DetailOutcome::Loaded => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

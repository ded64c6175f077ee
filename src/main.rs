mod cli;

use sourcepool::config::{self, ManualSource};
use sourcepool::engine::SourceEngine;
use sourcepool::related::parse_search_query;
use sourcepool::source::ProviderError;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, MediaArgs};
use sourcepool_common::{Direction, Quality};
use std::path::Path;

fn open_engine(config_path: Option<&Path>) -> Result<SourceEngine> {
    let config = config::load_config_or_default(config_path)?;
    SourceEngine::open(config, Vec::new())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to start async runtime")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "sourcepool=debug,sourcepool_db=debug,sourcepool_common=debug".to_string()
        } else {
            "sourcepool=warn,sourcepool_db=warn".to_string()
        }
    });

    // Logs go to stderr so command output stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Providers { json } => list_providers(config_path, json),
        Commands::Enable { name } => {
            open_engine(config_path)?.registry().enable(&name)?;
            println!("Enabled {}", name);
            Ok(())
        }
        Commands::Disable { name } => {
            open_engine(config_path)?.registry().disable(&name)?;
            println!("Disabled {}", name);
            Ok(())
        }
        Commands::Move {
            name,
            direction,
            neighbor,
        } => move_provider(config_path, &name, direction, &neighbor),
        Commands::ResetStats => {
            let count = open_engine(config_path)?.stats().reset_all()?;
            println!("Reset counters for {} provider(s)", count);
            Ok(())
        }
        Commands::Sources { media, play, json } => {
            runtime()?.block_on(find_sources(config_path, &media, play, json))
        }
        Commands::Related { media } => runtime()?.block_on(show_related(config_path, &media)),
        Commands::SetUrl {
            provider,
            media,
            url,
        } => {
            let engine = open_engine(config_path)?;
            let changed = engine.set_related_url(&provider, &media.descriptor(), &url)?;
            match (changed, url.trim().is_empty()) {
                (false, _) => println!("Unchanged"),
                (true, true) => println!("Removed {} page for {}", provider, media.title),
                (true, false) => println!("Set {} page for {} to {}", provider, media.title, url),
            }
            Ok(())
        }
        Commands::ClearUrls { provider } => {
            let count = open_engine(config_path)?.related().clear(&provider)?;
            println!("Removed {} cached page(s) for {}", count, provider);
            Ok(())
        }
        Commands::Search {
            provider,
            video_type,
            query,
        } => runtime()?.block_on(search(config_path, &provider, video_type, &query)),
        Commands::AddSource {
            media,
            url,
            quality,
            provider,
        } => add_source(config_path, &media, url, quality, provider),
        Commands::Init { path, force } => init_config(&path, force),
        Commands::Validate { config: path } => validate_config(path.as_deref().or(config_path)),
        Commands::Version => {
            println!("sourcepool {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn list_providers(config_path: Option<&Path>, json: bool) -> Result<()> {
    let engine = open_engine(config_path)?;
    let overview = engine.provider_overview()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }

    println!(
        "{:<20} {:>8} {:<8} {:>6} {:>6} {:>5}",
        "PROVIDER", "PRIORITY", "STATE", "TRIES", "OK", "RATE"
    );
    for p in overview {
        println!(
            "{:<20} {:>8} {:<8} {:>6} {:>6} {:>4}%",
            p.name,
            p.priority,
            if p.enabled { "enabled" } else { "disabled" },
            p.try_count,
            p.success_count,
            p.success_rate
        );
    }
    Ok(())
}

fn move_provider(
    config_path: Option<&Path>,
    name: &str,
    direction: Direction,
    neighbor: &str,
) -> Result<()> {
    let engine = open_engine(config_path)?;
    engine.registry().reorder(name, direction, neighbor)?;
    let order: Vec<String> = engine
        .registry()
        .list_all()?
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    println!("Provider order: {}", order.join(", "));
    Ok(())
}

async fn find_sources(
    config_path: Option<&Path>,
    media: &MediaArgs,
    play: bool,
    json: bool,
) -> Result<()> {
    let engine = open_engine(config_path)?;
    let video = media.descriptor();
    let report = engine.get_sources(&video).await?;

    if !report.timed_out.is_empty() {
        eprintln!("Timed out: {}", report.timed_out.join(", "));
    }

    if play || engine.config().dispatch.auto_play {
        return match engine.auto_play(&report.results).await {
            Some((candidate, url)) => {
                println!("{}", url);
                tracing::info!(provider = %candidate.provider, "Auto-play picked source");
                Ok(())
            }
            None => anyhow::bail!("No playable source found for {}", video.title),
        };
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report.results)?);
        return Ok(());
    }

    if report.results.is_empty() {
        println!("No sources found for {}", video.title);
        return Ok(());
    }

    for (i, label) in engine.source_labels(&report.results).iter().enumerate() {
        println!("{:>3}. {}", i + 1, label);
    }
    Ok(())
}

async fn show_related(config_path: Option<&Path>, media: &MediaArgs) -> Result<()> {
    let engine = open_engine(config_path)?;
    let report = engine.related_urls(&media.descriptor()).await?;

    for entry in report.results {
        println!(
            "{:<20} {}",
            entry.provider,
            entry.url.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn search(
    config_path: Option<&Path>,
    provider: &str,
    video_type: sourcepool_common::VideoType,
    query: &str,
) -> Result<()> {
    let engine = open_engine(config_path)?;
    let (title, year) = parse_search_query(query);

    match engine.search(provider, video_type, &title, year).await {
        Ok(results) if results.is_empty() => println!("No results"),
        Ok(results) => {
            for r in results {
                match r.year {
                    Some(year) => println!("{} ({})  {}", r.title, year, r.url),
                    None => println!("{}  {}", r.title, r.url),
                }
            }
        }
        Err(e) if e.downcast_ref::<ProviderError>() == Some(&ProviderError::NotSupported) => {
            println!("{} does not support search", provider);
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

fn add_source(
    config_path: Option<&Path>,
    media: &MediaArgs,
    url: String,
    quality: Option<Quality>,
    provider: Option<String>,
) -> Result<()> {
    let Some(path) = config_path else {
        anyhow::bail!("add-source needs --config to know which file to edit");
    };

    let mut config = config::load_config(path)?;
    config.manual_sources.push(ManualSource {
        provider,
        video_type: media.video_type,
        title: media.title.clone(),
        year: media.year,
        season: media.season,
        episode: media.episode,
        url,
        quality,
    });
    config::validate_config(&config)?;
    config::persist::update_manual_sources(path, &config.manual_sources)?;

    println!(
        "Added manual source for {} ({} total)",
        media.title,
        config.manual_sources.len()
    );
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    let existing = path.exists();
    if existing && !force {
        anyhow::bail!("{:?} already exists (use --force to reset it)", path);
    }

    // An existing file is merged into, so its comments and extra keys survive.
    config::persist::save_config(path, &config::Config::default())?;
    if existing {
        println!("Reset {:?} to defaults", path);
    } else {
        println!("Wrote default config to {:?}", path);
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("✓ Configuration is valid");
    println!("  Database: {}", config.database.path.display());
    println!(
        "  Source timeout: {}s, max results: {}",
        config.dispatch.source_timeout_secs, config.dispatch.max_results
    );
    println!(
        "  Sorting: {} (keys: {})",
        if config.sort.enabled { "on" } else { "off" },
        config
            .sort
            .keys
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Known hosts: {}", config.hosts.known.len());
    println!("  Manual sources: {}", config.manual_sources.len());

    Ok(())
}

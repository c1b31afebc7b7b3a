//! Binary entrypoint for the Fabula CLI.
//!
//! Commands:
//! - `play [--game <file>]` - run a game interactively in the terminal
//! - `init` - create a starter `config.toml` and the demo game data
//! - `validate [--game <file>]` - check game data for reference mistakes
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn, LevelFilter};
use tokio::io::{AsyncBufReadExt, BufReader};

use fabula::config::Config;
use fabula::engine::{Banner, Extensions, GameDefinition, Session};
use fabula::storage::{SaveStore, SledSaveStore};
use fabula::validation::validate_game;

const DEMO_GAME: &str = include_str!("../data/demo_game.json");

#[derive(Parser)]
#[command(name = "fabula")]
#[command(about = "A free-text adventure engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game interactively
    Play {
        /// Game data file (overrides the configured one)
        #[arg(short, long)]
        game: Option<String>,

        /// Disable saving for this run
        #[arg(long)]
        no_save: bool,
    },
    /// Create a starter config.toml and demo game data
    Init,
    /// Check a game data file for authoring mistakes
    Validate {
        /// Game data file (overrides the configured one)
        #[arg(short, long)]
        game: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // config is optional everywhere; defaults keep the demo playable
    let config = match Config::load(&cli.config).await {
        Ok(config) => config,
        Err(_) => Config::default(),
    };
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Play { game, no_save } => {
            let game_file = game.unwrap_or_else(|| config.game.data_file.clone());
            play(&config, &game_file, no_save).await
        }
        Commands::Init => init().await,
        Commands::Validate { game } => {
            let game_file = game.unwrap_or_else(|| config.game.data_file.clone());
            validate(&game_file).await
        }
    }
}

fn init_logging(config: &Config, verbose: u8) {
    let level = match verbose {
        0 => config
            .logging
            .level
            .parse::<LevelFilter>()
            .unwrap_or(LevelFilter::Info),
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    if !atty::is(atty::Stream::Stdout) {
        // keep piped transcripts clean of color escapes
        builder.write_style(env_logger::WriteStyle::Never);
    }
    let _ = builder.try_init();
}

async fn load_definition(game_file: &str) -> Result<GameDefinition> {
    let raw = tokio::fs::read_to_string(game_file)
        .await
        .with_context(|| format!("reading game data {}", game_file))?;
    GameDefinition::from_json(&raw).with_context(|| format!("parsing game data {}", game_file))
}

async fn play(config: &Config, game_file: &str, no_save: bool) -> Result<()> {
    let definition = load_definition(game_file).await?;

    for issue in validate_game(&definition) {
        warn!("game data: {}", issue);
    }

    let store: Option<Box<dyn SaveStore>> = if config.storage.enabled && !no_save {
        match SledSaveStore::open(&config.storage.path) {
            Ok(store) => Some(Box::new(store)),
            Err(e) => {
                warn!("save store unavailable ({}); continuing without saves", e);
                None
            }
        }
    } else {
        None
    };

    let banner = Banner {
        title: config.game.title.clone(),
        description: config.game.description.clone(),
        show_help: config.game.show_help,
    };
    let mut session = Session::new(definition, store)?.with_banner(banner);
    let mut extensions = Extensions::new();

    for line in session.start(&mut extensions) {
        println!("{}", line.rendered());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(input) = lines.next_line().await? {
        let trimmed = input.trim();
        // quit and restart belong to the host, not the engine's verb table
        if trimmed.eq_ignore_ascii_case("quit") {
            info!("player quit");
            break;
        }
        let output = if trimmed.eq_ignore_ascii_case("restart") {
            session.restart(&mut extensions)?
        } else {
            session.submit(&input, &mut extensions)
        };
        for line in output {
            println!("{}", line.rendered());
        }
        if session.is_over() {
            break;
        }
    }

    Ok(())
}

async fn init() -> Result<()> {
    Config::create_default("config.toml").await?;
    tokio::fs::create_dir_all("data")
        .await
        .context("creating data directory")?;
    tokio::fs::write("data/demo_game.json", DEMO_GAME)
        .await
        .context("writing demo game data")?;
    println!("Wrote config.toml and data/demo_game.json");
    println!("Run `fabula play` to start the demo game.");
    Ok(())
}

async fn validate(game_file: &str) -> Result<()> {
    let definition = load_definition(game_file).await?;
    let issues = validate_game(&definition);
    if issues.is_empty() {
        println!("{}: no issues found", game_file);
    } else {
        println!("{}: {} issue(s)", game_file, issues.len());
        for issue in &issues {
            println!("  {}", issue);
        }
    }
    Ok(())
}

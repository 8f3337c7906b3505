use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use typecore::config::Config;
use typecore::engine::{Milestone, StatsTracker};
use typecore::replay::{self, KeyAction};
use typecore::session::TypingSession;
use typecore::session::result::SessionResult;

#[derive(Parser)]
#[command(name = "typecore", version, about = "Typing-session engine: replay and grade keystrokes")]
struct Cli {
    #[arg(short, long, global = true, help = "Config file (defaults to the user config dir)")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay keystrokes against a target text and print the result as JSON
    Replay {
        #[arg(short, long, help = "Target text to type")]
        text: String,

        #[arg(long, help = "JSON Lines transcript file, '-' for stdin", conflicts_with = "keys")]
        transcript: Option<PathBuf>,

        #[arg(short, long, help = "Keys typed at a fixed interval; \\b is backspace")]
        keys: Option<String>,

        #[arg(long, default_value_t = 200, help = "Interval between --keys in ms")]
        interval_ms: u64,

        #[arg(long, help = "Ignore letter case when grading")]
        case_insensitive: bool,

        #[arg(long, help = "Treat any whitespace as matching any other")]
        ignore_whitespace: bool,

        #[arg(long, help = "Refuse backspace")]
        no_backspace: bool,
    },
    /// Validate the config and print the effective settings
    CheckConfig,
}

#[derive(Serialize)]
struct ReplayReport {
    result: SessionResult,
    milestones: Vec<Milestone>,
    ignored: usize,
    refused_backspaces: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Replay {
            text,
            transcript,
            keys,
            interval_ms,
            case_insensitive,
            ignore_whitespace,
            no_backspace,
        } => {
            let mut policy = config.match_policy;
            if case_insensitive {
                policy = policy.case_insensitive();
            }
            if ignore_whitespace {
                policy = policy.lenient_whitespace();
            }
            if no_backspace {
                policy = policy.without_backspace();
            }

            let actions = match keys {
                Some(keys) => {
                    replay::actions_from_keys(&keys.replace("\\b", "\x08"), 0, interval_ms)
                }
                None => read_transcript(transcript)?,
            };

            let mut session = TypingSession::with_policy(policy);
            session.load_text(&text);
            let mut tracker = StatsTracker::new(config.milestones.clone());
            let outcome = replay::run(&mut session, &mut tracker, &actions);
            info!(
                wpm = outcome.snapshot.wpm,
                accuracy = outcome.snapshot.accuracy,
                "replay complete"
            );

            let report = ReplayReport {
                result: SessionResult::from_session(&session, &outcome.snapshot),
                milestones: outcome.milestones,
                ignored: outcome.ignored,
                refused_backspaces: outcome.refused_backspaces,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::CheckConfig => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            Config::load_from(path)
                .with_context(|| format!("could not load config from {}", path.display()))?
        }
        None => {
            let path = Config::config_path();
            info!(path = %path.display(), "loading default config");
            Config::load_or_default(&path)
                .with_context(|| format!("could not load config from {}", path.display()))?
        }
    };
    Ok(config)
}

fn read_transcript(path: Option<PathBuf>) -> Result<Vec<KeyAction>> {
    let actions = match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(&path)
                .with_context(|| format!("could not open transcript {}", path.display()))?;
            replay::parse_transcript(BufReader::new(file))?
        }
        _ => replay::parse_transcript(io::stdin().lock())?,
    };
    Ok(actions)
}

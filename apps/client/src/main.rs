//! Game client CLI - plays games against a remote game server.
//!
//! Creates a game, then polls its state and submits one action per active
//! player until the server reports the game has ended.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use client::runner::{
    ActionLoop, AutoConfirm, ConfirmationGate, GameOutcome, PromptGate, SubmissionMode,
};
use client::strategy::registry;
use client::strategy::{ActionStrategy, Interactive, PickFirst, RandomChoice};
use client::telemetry::init_tracing;
use client::{ClientConfig, ClientError, HttpGameClient};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "Plays games against a remote game server")]
struct Args {
    /// Game server address (host:port or URL); overrides GAME_SERVER_ADDRESS
    #[arg(long)]
    server_address: Option<String>,

    /// Request timeout in seconds, 0 disables; overrides GAME_CLIENT_TIMEOUT_SECS
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Action selection strategy for every player
    #[arg(long, default_value = "pick-first")]
    strategy: StrategyKind,

    /// Seed for the random strategy
    #[arg(long)]
    seed: Option<u64>,

    /// Ask for confirmation before each submission
    #[arg(long)]
    wait_for_key: bool,

    /// Send all players' actions together or one request per player
    #[arg(long, default_value = "combined")]
    submission_mode: ModeArg,

    /// Number of games to play, one after another
    #[arg(short, long, default_value = "1")]
    games: u32,

    /// Print the server's index document and exit
    #[arg(long)]
    server_info: bool,

    /// Show progress and a summary
    #[arg(long)]
    show_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyKind {
    PickFirst,
    Random,
    Interactive,
}

impl StrategyKind {
    fn name(self) -> &'static str {
        match self {
            StrategyKind::PickFirst => PickFirst::NAME,
            StrategyKind::Random => RandomChoice::NAME,
            StrategyKind::Interactive => Interactive::NAME,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Combined,
    PerPlayer,
}

impl From<ModeArg> for SubmissionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Combined => SubmissionMode::Combined,
            ModeArg::PerPlayer => SubmissionMode::PerPlayer,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Silent by default, only warnings and errors
    let level = if args.verbose {
        "debug"
    } else if args.show_progress {
        "info"
    } else {
        "warn"
    };
    init_tracing(level, args.json_logs);

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every game ran to completion.
async fn run(args: Args) -> Result<bool, ClientError> {
    let config = build_config(&args)?;
    let client = HttpGameClient::new(config)?;

    if args.server_info {
        let server = client.server_info().await?;
        println!("{}", server.message);
        if let Some(version) = server.version {
            println!("version: {version}");
        }
        if let Some(started) = server.games_started {
            println!("games started: {started}");
        }
        if let Some(new_game) = server.new_game {
            println!("new game: {new_game}");
        }
        return Ok(true);
    }

    let strategy = create_strategy(args.strategy, args.seed)?;
    let gate: Box<dyn ConfirmationGate> = if args.wait_for_key {
        Box::new(PromptGate)
    } else {
        Box::new(AutoConfirm)
    };

    info!(
        server = %client.base_url(),
        strategy = strategy.name(),
        games = args.games,
        mode = ?args.submission_mode,
        "starting game client"
    );

    let start = Instant::now();
    let mut outcomes = Vec::new();
    let mut errors = 0u32;

    for game_num in 1..=args.games {
        let mut game = ActionLoop::new(&client, strategy.as_ref())
            .with_gate(gate.as_ref())
            .with_submission_mode(args.submission_mode.into());

        match game.run().await {
            Ok(outcome) => {
                if args.show_progress {
                    println!(
                        "game {}: ended in state '{}' after {} rounds",
                        outcome.game_id, outcome.final_state_name, outcome.rounds
                    );
                }
                outcomes.push(outcome);
            }
            Err(e) => {
                errors += 1;
                warn!(
                    game_num,
                    game_id = ?game.game_id(),
                    code = e.code(),
                    "game {} failed: {}",
                    game_num,
                    e
                );
                if args.games == 1 {
                    return Err(e);
                }
            }
        }
    }

    if args.show_progress || args.games > 1 {
        print_summary(&outcomes, errors, start.elapsed(), args.games);
    }

    Ok(errors == 0)
}

fn build_config(args: &Args) -> Result<ClientConfig, ClientError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(address) = &args.server_address {
        config = config.with_server_address(address.clone());
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout((secs > 0).then(|| Duration::from_secs(secs)));
    }
    Ok(config)
}

fn create_strategy(
    kind: StrategyKind,
    seed: Option<u64>,
) -> Result<Box<dyn ActionStrategy>, ClientError> {
    let factory = registry::by_name(kind.name())
        .ok_or_else(|| ClientError::config(format!("unknown strategy: {}", kind.name())))?;
    Ok((factory.make)(seed))
}

fn print_summary(outcomes: &[GameOutcome], errors: u32, elapsed: Duration, total: u32) {
    println!("\n=== Game Summary ===");
    println!("Games completed: {}/{}", outcomes.len(), total);
    if errors > 0 {
        println!("Errors: {}", errors);
    }
    println!("Total time: {:?}", elapsed);

    if outcomes.is_empty() {
        return;
    }

    let rounds: u32 = outcomes.iter().map(|o| o.rounds).sum();
    let submissions: u32 = outcomes.iter().map(|o| o.submissions).sum();
    println!(
        "Average time per game: {:?}",
        elapsed / outcomes.len() as u32
    );
    println!(
        "Rounds: {} total, {:.1} per game",
        rounds,
        rounds as f64 / outcomes.len() as f64
    );
    println!("Submissions: {}", submissions);
}

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use mcts_connect_four::ai::MctsAgent;
use mcts_connect_four::config::{AppConfig, LogConfig};
use mcts_connect_four::game::{GameState, Player};
use mcts_connect_four::ui::{App, Console};

/// Play Connect Four against a Monte Carlo Tree Search opponent.
#[derive(Parser)]
#[command(name = "mcts_connect_four", about = "Play Connect Four against an MCTS opponent")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override MCTS iterations per computer move
    #[arg(long)]
    iterations: Option<u32>,

    /// Override the UCB1 exploration constant
    #[arg(long)]
    exploration: Option<f64>,

    /// Override the per-move time limit in milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Seed the computer's rollouts for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Side the human plays (X moves first)
    #[arg(long, value_enum)]
    human: Option<Side>,

    /// Plain line-based play instead of the terminal UI
    #[arg(long)]
    console: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    X,
    O,
}

impl From<Side> for Player {
    fn from(side: Side) -> Self {
        match side {
            Side::X => Player::X,
            Side::O => Player::O,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(iterations) = cli.iterations {
        config.mcts.iterations = iterations;
    }
    if let Some(exploration) = cli.exploration {
        config.mcts.exploration = exploration;
    }
    if let Some(time_limit_ms) = cli.time_limit_ms {
        config.mcts.time_limit_ms = Some(time_limit_ms);
    }
    if let Some(seed) = cli.seed {
        config.mcts.seed = Some(seed);
    }
    if let Some(side) = cli.human {
        config.game.human_player = side.into();
    }
    config.validate().context("validating command line overrides")?;

    init_tracing(&config.log, cli.console)?;
    info!(
        iterations = config.mcts.iterations,
        exploration = config.mcts.exploration,
        human = %config.game.human_player,
        console = cli.console,
        "starting game"
    );

    let agent = MctsAgent::new(config.mcts.clone());
    if cli.console {
        run_console(&config, agent)
    } else {
        run_tui(config.game.human_player, agent).context("running terminal UI")
    }
}

/// Logs go to `log.file` when set, otherwise to stderr in console mode.
/// The terminal UI owns stderr's screen, so without a file it does not log.
fn init_tracing(log: &LogConfig, console: bool) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    if let Some(path) = &log.file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
            .with(filter)
            .init();
    } else if console {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr))
            .with(filter)
            .init();
    }

    Ok(())
}

fn run_console(config: &AppConfig, mut agent: MctsAgent) -> Result<()> {
    let mut state = GameState::new(config.game.human_player);
    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout(), config.ui.clone());
    console
        .run(&mut state, &mut agent)
        .context("running console game")?;
    Ok(())
}

fn run_tui(human: Player, agent: MctsAgent) -> io::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run
    let mut app = App::new(human, agent);
    let res = app.run(&mut terminal);

    // Restore terminal, even on error
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    res
}

#![recursion_limit = "256"]

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use robo_knights::ai::{ActorCriticAgent, Agent, AgentConfig, RandomAgent};
use robo_knights::config::AppConfig;
use robo_knights::environment::ChessEnv;
use robo_knights::training::{
    play_episode_observed, EpisodeOptions, GameRecorder, Trainer,
};
use robo_knights::ui::{result_text, Viewer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Train,
    Play,
    Visualize,
}

/// Train chess agents by self-play, or watch two of them play.
#[derive(Parser)]
#[command(name = "robo-knights", about = "Self-play chess reinforcement learning")]
struct Cli {
    /// Operation mode
    #[arg(long, value_enum, default_value_t = Mode::Play)]
    mode: Mode,

    /// Model for the White agent
    #[arg(long, default_value = "models/agent1.model")]
    model1: PathBuf,

    /// Model for the Black agent
    #[arg(long, default_value = "models/agent2.model")]
    model2: PathBuf,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(episodes) = cli.episodes {
        app_config.training.num_episodes = episodes;
        app_config.validate().context("applying --episodes")?;
    }

    match cli.mode {
        Mode::Train => train(&cli, &app_config)?,
        Mode::Play => play(&cli, &app_config),
        Mode::Visualize => visualize(&cli, &app_config)?,
    }

    println!("Done!");
    Ok(())
}

/// Train two fresh agents against each other and overwrite both model files.
fn train(cli: &Cli, config: &AppConfig) -> Result<()> {
    let (white_config, black_config) = agent_configs(&config.agent);
    let mut white = ActorCriticAgent::new(white_config);
    let mut black = ActorCriticAgent::new(black_config);

    let trainer = Trainer::new(config.training.clone());
    trainer.train(&mut white, &mut black);

    white
        .save_model(&cli.model1)
        .with_context(|| format!("saving {}", cli.model1.display()))?;
    black
        .save_model(&cli.model2)
        .with_context(|| format!("saving {}", cli.model2.display()))?;
    println!("Training complete!");
    Ok(())
}

/// Play one game, printing the board after every move.
fn play(cli: &Cli, config: &AppConfig) {
    println!(
        "Playing game with models: {} and {}",
        cli.model1.display(),
        cli.model2.display()
    );
    let (white_config, black_config) = agent_configs(&config.agent);
    let mut white = load_agent(&cli.model1, white_config);
    let mut black = load_agent(&cli.model2, black_config);

    let mut rng = seeded_rng(config.agent.seed);
    let mut recorder = GameRecorder::new();
    let options = EpisodeOptions {
        max_plies: config.play.max_plies,
        ..Default::default()
    };
    let delay = Duration::from_millis(config.play.move_delay_ms);

    let result = play_episode_observed(
        &mut ChessEnv::new(),
        white.as_mut(),
        black.as_mut(),
        &mut rng,
        &options,
        Some(&mut recorder),
        |mv, position| {
            println!("{mv}\n{}\n", position.to_portable_notation());
            std::thread::sleep(delay);
            ControlFlow::Continue(())
        },
    );

    println!("Game complete! {}", result_text(&result));
    println!("Total moves: {}", recorder.current().total_moves);
}

/// Show one game in the terminal board view.
fn visualize(cli: &Cli, config: &AppConfig) -> Result<()> {
    let (white_config, black_config) = agent_configs(&config.agent);
    let mut white = load_agent(&cli.model1, white_config);
    let mut black = load_agent(&cli.model2, black_config);
    let mut rng = seeded_rng(config.agent.seed);
    let mut recorder = GameRecorder::new();
    let viewer = Viewer::new(
        Duration::from_millis(config.play.move_delay_ms),
        config.play.max_plies,
    );

    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal")?;

    let res = viewer.run(
        &mut terminal,
        white.as_mut(),
        black.as_mut(),
        &mut rng,
        &mut recorder,
    );

    // Restore terminal, always runs, even on error
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    let result = res.context("running viewer")?;
    println!("Game complete! {}", result_text(&result));
    println!("Total moves: {}", recorder.current().total_moves);
    Ok(())
}

/// Load a trained agent, or fall back to a random mover with a warning.
fn load_agent(path: &Path, config: AgentConfig) -> Box<dyn Agent> {
    if !path.exists() {
        log::warn!("No model found at {}, using random agent", path.display());
        return Box::new(RandomAgent::new());
    }
    match ActorCriticAgent::from_model_file(path, config) {
        Ok(agent) => Box::new(agent),
        Err(e) => {
            log::warn!(
                "Error loading model {}: {e}; using random agent",
                path.display()
            );
            Box::new(RandomAgent::new())
        }
    }
}

/// Per-colour agent settings; a fixed seed is offset for Black so the two differ.
fn agent_configs(base: &AgentConfig) -> (AgentConfig, AgentConfig) {
    let black = AgentConfig {
        seed: base.seed.map(|s| s.wrapping_add(1)),
        ..base.clone()
    };
    (base.clone(), black)
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(2)),
        None => StdRng::from_os_rng(),
    }
}

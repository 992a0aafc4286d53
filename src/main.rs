//! Gridtank - Entry Point
//!
//! Sets up file logging and the terminal, then drives the game at the
//! configured frame rate.
//!
//! `gridtank --export-config [PATH]` writes the default tuning file and exits.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};

use gridtank::data::{export_default_config, load_config, CONFIG_FILE};
use gridtank::game::{Game, GameState};
use gridtank::ui::App;

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if let Some(path) = export_path(&args) {
        export_default_config(&path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    // The TUI owns stdout, so logs go to a file
    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("gridtank.log")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    log::info!("Starting Gridtank v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new();
    let size = terminal.size()?;
    let arena = App::arena_for(Rect::new(0, 0, size.width, size.height));
    let result = Game::new(config, arena)
        .map_err(anyhow::Error::from)
        .and_then(|mut game| run_game_loop(&mut terminal, &mut app, &mut game));

    // Hand the terminal back even when the game failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("Game exited with error: {}", e);
        eprintln!("Error: {}", e);
    }

    log::info!("Gridtank shut down cleanly");
    result
}

/// Target of `--export-config`, defaulting to the working directory
fn export_path(args: &[String]) -> Option<PathBuf> {
    let index = args.iter().position(|arg| arg == "--export-config")?;
    let path = args
        .get(index + 1)
        .filter(|next| !next.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    Some(path)
}

fn run_game_loop(terminal: &mut Tui, app: &mut App, game: &mut Game) -> Result<()> {
    let frame_time = Duration::from_secs_f64(1.0 / game.config().fps.max(1) as f64);
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        let delta = frame_start.duration_since(last_frame);
        last_frame = frame_start;

        if event::poll(Duration::ZERO)? {
            match event::read()? {
                // Key repeats and releases are ignored
                Event::Key(key) if key.kind == KeyEventKind::Press => match app.handle_input(key, game) {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(e) => log::warn!("Input handling error: {}", e),
                },
                Event::Resize(width, height) => {
                    if let Err(e) = game.resize(App::arena_for(Rect::new(0, 0, width, height))) {
                        log::warn!("Keeping old arena: {}", e);
                    }
                }
                _ => {}
            }
        }

        game.update(delta);
        app.record_events(game.drain_events());

        terminal.draw(|frame| app.render(frame, game))?;

        if matches!(game.state(), GameState::Quit) {
            break;
        }

        let spent = frame_start.elapsed();
        if spent < frame_time {
            std::thread::sleep(frame_time - spent);
        }
    }

    Ok(())
}

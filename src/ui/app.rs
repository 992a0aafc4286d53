//! Main UI Application
//!
//! Draws the arena, the status sidebar and the message log, and routes key
//! presses to the game.

use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::input::{map_key, InputAction};
use crate::ecs::Faction;
use crate::entities::{Bullet, Tank};
use crate::game::{Game, GameEvent, GameState, PlayerCommand};
use crate::render::{detect_render_mode, RenderMode, CELL_HEIGHT, CELL_WIDTH};
use crate::world::{Arena, GridPos};

/// Width of the status sidebar in terminal columns
const SIDEBAR_WIDTH: u16 = 24;
/// Height of the message log, borders included
const MESSAGE_HEIGHT: u16 = 6;
/// Messages kept for the log
const MAX_MESSAGES: usize = 50;

/// Message categories for coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageCategory {
    Combat,
    Warning,
    System,
}

/// Main UI application
pub struct App {
    /// Current glyph set
    render_mode: RenderMode,
    /// Recent messages, oldest first
    messages: Vec<(String, MessageCategory)>,
}

impl App {
    pub fn new() -> Self {
        Self::with_render_mode(detect_render_mode())
    }

    pub fn with_render_mode(render_mode: RenderMode) -> Self {
        let mut app = Self {
            render_mode,
            messages: Vec::new(),
        };
        app.add_message("Arrows to drive, Space to fire", MessageCategory::System);
        app
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    /// Switch to the other glyph set
    pub fn cycle_render_mode(&mut self) {
        self.render_mode = self.render_mode.next();
        log::info!("Switched to {} rendering", self.render_mode.name());
        self.add_message(format!("{} rendering", self.render_mode.name()), MessageCategory::System);
    }

    pub fn messages(&self) -> &[(String, MessageCategory)] {
        &self.messages
    }

    pub fn add_message(&mut self, text: impl Into<String>, category: MessageCategory) {
        self.messages.push((text.into(), category));
        if self.messages.len() > MAX_MESSAGES {
            let excess = self.messages.len() - MAX_MESSAGES;
            self.messages.drain(..excess);
        }
    }

    /// Turn simulation events into log lines
    pub fn record_events(&mut self, events: Vec<GameEvent>) {
        for event in events {
            match event {
                GameEvent::EnemySpawned { pos } => self.add_message(
                    format!("Enemy tank at ({}, {})", pos.x, pos.y),
                    MessageCategory::System,
                ),
                GameEvent::EnemyDestroyed { score } => {
                    self.add_message(format!("Enemy destroyed! Score {}", score), MessageCategory::Combat)
                }
                GameEvent::PlayerHit { lives_left } => {
                    self.add_message(format!("You are hit! Lives left: {}", lives_left), MessageCategory::Warning)
                }
                GameEvent::GameOver { score } => {
                    self.add_message(format!("Game over. Final score {}", score), MessageCategory::Warning)
                }
            }
        }
    }

    /// Handle a key press. Returns true when the game should exit.
    pub fn handle_input(&mut self, key: KeyEvent, game: &mut Game) -> Result<bool> {
        let Some(action) = map_key(key) else {
            return Ok(false);
        };

        if action == InputAction::ToggleRenderMode {
            self.cycle_render_mode();
            return Ok(false);
        }

        if let Some(command) = action.command() {
            if command == PlayerCommand::Restart {
                self.messages.clear();
                self.add_message("New game", MessageCategory::System);
            }
            game.command(command);
        }

        Ok(matches!(game.state(), GameState::Quit))
    }

    /// Arena that fits the map pane of a terminal of the given size
    pub fn arena_for(area: Rect) -> Arena {
        let inner = arena_block(String::new()).inner(split_screen(area).0);
        Arena::fit(inner.width, inner.height, CELL_WIDTH, CELL_HEIGHT)
    }

    pub fn render(&self, frame: &mut Frame, game: &Game) {
        // Clear the entire screen first to prevent artifacts
        frame.render_widget(Clear, frame.area());

        if game.state() == &GameState::Quit {
            return;
        }

        let (map_area, message_area, sidebar_area) = split_screen(frame.area());
        self.render_arena(frame, game, map_area);
        self.render_messages(frame, message_area);
        self.render_sidebar(frame, game, sidebar_area);

        match game.state() {
            GameState::Paused => self.render_pause(frame),
            GameState::GameOver { score } => self.render_game_over(frame, *score, game.kills()),
            _ => {}
        }
    }

    fn render_arena(&self, frame: &mut Frame, game: &Game, area: Rect) {
        let arena = game.arena();
        let block = arena_block(format!(" Arena {}x{} [{}] ", arena.width, arena.height, self.render_mode.name()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let ground = self.render_mode.ground();
        for y in 0..arena.height {
            for x in 0..arena.width {
                self.put_cell(frame, inner, GridPos::new(x, y), ground, Color::DarkGray);
            }
        }

        let world = game.world();
        for (_, tank) in world.query::<&Tank>().iter() {
            let color = match tank.faction {
                Faction::Player => Color::Green,
                Faction::Enemy => Color::Red,
            };
            for cell in tank.cells() {
                self.put_cell(frame, inner, cell, self.render_mode.block(), color);
            }
        }

        for (_, bullet) in world.query::<&Bullet>().iter() {
            let color = match bullet.owner {
                Faction::Player => Color::Yellow,
                Faction::Enemy => Color::LightRed,
            };
            self.put_cell(frame, inner, bullet.pos(), self.render_mode.bullet(), color);
        }
    }

    /// Draw one arena cell, skipping anything outside the pane
    fn put_cell(&self, frame: &mut Frame, inner: Rect, cell: GridPos, glyphs: [char; 2], color: Color) {
        if cell.x < 0 || cell.y < 0 {
            return;
        }
        let screen_y = inner.y as i32 + cell.y * CELL_HEIGHT as i32;
        if screen_y >= (inner.y + inner.height) as i32 {
            return;
        }

        let buf = frame.buffer_mut();
        for (i, ch) in glyphs.iter().enumerate() {
            let screen_x = inner.x as i32 + cell.x * CELL_WIDTH as i32 + i as i32;
            if screen_x >= (inner.x + inner.width) as i32 {
                return;
            }
            let pos = (screen_x as u16, screen_y as u16);
            buf[pos].set_char(*ch);
            buf[pos].set_fg(color);
        }
    }

    fn render_messages(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Messages ")
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(area);

        let messages: Vec<Line> = self
            .messages
            .iter()
            .rev()
            .take(inner.height as usize)
            .rev()
            .map(|(text, category)| {
                let color = match category {
                    MessageCategory::Combat => Color::Yellow,
                    MessageCategory::Warning => Color::LightRed,
                    MessageCategory::System => Color::Cyan,
                };
                Line::from(Span::styled(text.as_str(), Style::default().fg(color)))
            })
            .collect();

        let para = Paragraph::new(messages).block(block);
        frame.render_widget(para, area);
    }

    fn render_sidebar(&self, frame: &mut Frame, game: &Game, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Status ")
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let label = Style::default().fg(Color::Gray);
        let lives_color = if game.lives() <= 1 { Color::Red } else { Color::Green };
        let aiming_color = if game.enemies_aiming() > 0 { Color::LightRed } else { Color::Gray };
        let heading = game
            .player_tank()
            .map(|tank| format!("{:?}", tank.heading))
            .unwrap_or_else(|| "-".to_string());

        let lines = vec![
            Line::from(vec![
                Span::styled("Score   ", label),
                Span::styled(game.score().to_string(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            ]),
            Line::from(vec![
                Span::styled("Lives   ", label),
                Span::styled("♥".repeat(game.lives() as usize), Style::default().fg(lives_color)),
            ]),
            Line::from(vec![
                Span::styled("Kills   ", label),
                Span::raw(game.kills().to_string()),
            ]),
            Line::from(vec![
                Span::styled("Enemies ", label),
                Span::raw(format!("{}/{}", game.enemy_count(), game.config().max_enemies)),
            ]),
            Line::from(vec![
                Span::styled("Aiming  ", label),
                Span::styled(game.enemies_aiming().to_string(), Style::default().fg(aiming_color)),
            ]),
            Line::from(vec![
                Span::styled("Facing  ", label),
                Span::raw(heading),
            ]),
            Line::from(vec![
                Span::styled("Time    ", label),
                Span::raw(format!("{:.0}s", game.elapsed())),
            ]),
            Line::from(""),
            Line::from(Span::styled("[Arrows] Drive", label)),
            Line::from(Span::styled("[Space]  Fire", label)),
            Line::from(Span::styled("[P] Pause [R] Restart", label)),
            Line::from(Span::styled("[M] Glyphs [Q] Quit", label)),
        ];

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_pause(&self, frame: &mut Frame) {
        let area = centered_rect(30, 30, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" PAUSED ")
            .border_style(Style::default().fg(Color::White));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let menu = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("[P] Resume", Style::default().fg(Color::White))),
            Line::from(""),
            Line::from(Span::styled("[Q] Quit", Style::default().fg(Color::Gray))),
        ])
        .alignment(Alignment::Center);

        frame.render_widget(menu, inner);
    }

    fn render_game_over(&self, frame: &mut Frame, score: u64, kills: u32) {
        let area = centered_rect(40, 40, frame.area());
        frame.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("Score: {}", score)),
            Line::from(format!("Tanks destroyed: {}", kills)),
            Line::from(""),
            Line::from(Span::styled(
                "[R] Restart  [Q] Quit",
                Style::default().fg(Color::Gray),
            )),
        ];

        let para = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));

        frame.render_widget(para, area);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn arena_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Gray))
}

/// Split the screen into map, message log and sidebar
fn split_screen(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(SIDEBAR_WIDTH)])
        .split(area);

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(MESSAGE_HEIGHT)])
        .split(chunks[0]);

    (left_chunks[0], left_chunks[1], chunks[1])
}

/// Create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GameConfig;
    use ratatui::{backend::TestBackend, Terminal};

    fn test_game(arena: Arena) -> Game {
        let config = GameConfig {
            seed: Some(7),
            ..GameConfig::default()
        };
        Game::new(config, arena).unwrap()
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_arena_fits_map_pane() {
        // 80 - 24 sidebar - 2 border = 54 columns, 27 cells
        // 24 - 6 log - 2 border = 16 rows
        assert_eq!(App::arena_for(Rect::new(0, 0, 80, 24)), Arena::from_cells(27, 16));
        // The odd column is dropped
        assert_eq!(App::arena_for(Rect::new(0, 0, 81, 24)), Arena::from_cells(27, 16));
    }

    #[test]
    fn test_events_become_messages() {
        let mut app = App::with_render_mode(RenderMode::Ascii);
        let before = app.messages().len();
        app.record_events(vec![
            GameEvent::EnemyDestroyed { score: 100 },
            GameEvent::PlayerHit { lives_left: 2 },
        ]);
        let messages = app.messages();
        assert_eq!(messages.len(), before + 2);
        assert_eq!(messages[before].1, MessageCategory::Combat);
        assert!(messages[before + 1].0.contains('2'));
    }

    #[test]
    fn test_message_log_is_bounded() {
        let mut app = App::with_render_mode(RenderMode::Ascii);
        for i in 0..MAX_MESSAGES * 2 {
            app.add_message(format!("line {}", i), MessageCategory::System);
        }
        assert_eq!(app.messages().len(), MAX_MESSAGES);
        assert_eq!(app.messages().last().unwrap().0, format!("line {}", MAX_MESSAGES * 2 - 1));
    }

    #[test]
    fn test_toggle_and_quit_keys() {
        use crossterm::event::{KeyCode, KeyModifiers};

        let mut app = App::with_render_mode(RenderMode::Ascii);
        let mut game = test_game(Arena::from_cells(20, 12));

        let quit = app.handle_input(KeyEvent::new(KeyCode::Char('m'), KeyModifiers::NONE), &mut game).unwrap();
        assert!(!quit);
        assert_eq!(app.render_mode(), RenderMode::Unicode);

        let quit = app.handle_input(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE), &mut game).unwrap();
        assert!(quit);
    }

    #[test]
    fn test_render_draws_player_and_status() {
        let area = Rect::new(0, 0, 80, 24);
        let app = App::with_render_mode(RenderMode::Ascii);
        let game = test_game(App::arena_for(area));

        let mut terminal = Terminal::new(TestBackend::new(area.width, area.height)).unwrap();
        terminal.draw(|frame| app.render(frame, &game)).unwrap();

        // Player tank at the origin, top-left cell of its sprite is filled
        let buffer = terminal.backend().buffer();
        assert_eq!(buffer[(1, 1)].symbol(), "[");
        assert_eq!(buffer[(2, 1)].symbol(), "]");

        let text = screen_text(&terminal);
        assert!(text.contains("Score"));
        assert!(text.contains("Lives"));
        assert!(text.contains("Aiming"));
    }
}

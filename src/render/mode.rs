//! Render mode detection and glyphs
//!
//! Picks Unicode or ASCII block glyphs from the terminal environment. Every
//! arena cell is two terminal columns wide so blocks come out roughly square.

use std::env;

/// Terminal columns per arena cell
pub const CELL_WIDTH: u16 = 2;
/// Terminal rows per arena cell
pub const CELL_HEIGHT: u16 = 1;

/// Available rendering modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Plain ASCII brackets. Works everywhere.
    #[default]
    Ascii,

    /// Framed square blocks
    Unicode,
}

impl RenderMode {
    /// Get a human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::Ascii => "ASCII",
            RenderMode::Unicode => "Unicode",
        }
    }

    /// Glyph pair for one filled block
    pub fn block(&self) -> [char; 2] {
        match self {
            RenderMode::Ascii => ['[', ']'],
            RenderMode::Unicode => ['▣', ' '],
        }
    }

    /// Glyph pair for a bullet
    pub fn bullet(&self) -> [char; 2] {
        match self {
            RenderMode::Ascii => ['<', '>'],
            RenderMode::Unicode => ['■', ' '],
        }
    }

    /// Glyph pair for empty ground
    pub fn ground(&self) -> [char; 2] {
        match self {
            RenderMode::Ascii => [' ', ' '],
            RenderMode::Unicode => ['·', ' '],
        }
    }

    pub fn next(&self) -> RenderMode {
        match self {
            RenderMode::Ascii => RenderMode::Unicode,
            RenderMode::Unicode => RenderMode::Ascii,
        }
    }
}

/// Detect the best rendering mode for the current terminal
pub fn detect_render_mode() -> RenderMode {
    let term = env::var("TERM").ok();
    let lang = env::var("LC_ALL").or_else(|_| env::var("LANG")).ok();
    let mode = mode_for(term.as_deref(), lang.as_deref());
    log::info!("Using {} rendering mode", mode.name());
    mode
}

fn mode_for(term: Option<&str>, lang: Option<&str>) -> RenderMode {
    // Linux console and dumb terminals lack the glyphs
    if let Some(term) = term {
        if term == "linux" || term == "dumb" {
            return RenderMode::Ascii;
        }
    }

    match lang {
        Some(lang) if lang.to_uppercase().contains("UTF") => RenderMode::Unicode,
        _ => RenderMode::Ascii,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_detection() {
        assert_eq!(mode_for(Some("xterm-256color"), Some("en_US.UTF-8")), RenderMode::Unicode);
        assert_eq!(mode_for(Some("xterm"), Some("en_US.utf8")), RenderMode::Unicode);
        assert_eq!(mode_for(Some("linux"), Some("en_US.UTF-8")), RenderMode::Ascii);
        assert_eq!(mode_for(Some("xterm"), Some("C")), RenderMode::Ascii);
        assert_eq!(mode_for(None, None), RenderMode::Ascii);
    }

    #[test]
    fn test_glyphs_fill_a_cell() {
        for mode in [RenderMode::Ascii, RenderMode::Unicode] {
            assert_eq!(mode.block().len(), CELL_WIDTH as usize);
            assert_ne!(mode.block(), mode.ground());
            assert_ne!(mode.bullet(), mode.ground());
        }
    }

    #[test]
    fn test_cycle() {
        assert_eq!(RenderMode::Ascii.next(), RenderMode::Unicode);
        assert_eq!(RenderMode::Unicode.next().next(), RenderMode::Unicode);
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Crossterm backend for the Harvest Defence glyph surface.
//!
//! Owns raw-mode setup/teardown, queued glyph writes, and non-blocking
//! keyboard polling. All game logic stays behind the [`GlyphSurface`]
//! contract; this crate only places characters and reads keys.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use anyhow::Result as AnyResult;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEventKind},
    execute, queue,
    style::{Color as TermColor, Print, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use harvest_defence_rendering::{Glyph, GlyphSurface};

/// Terminal-backed glyph surface.
pub struct Terminal {
    out: Stdout,
}

impl Terminal {
    /// Enters raw mode and the alternate screen.
    pub fn init() -> AnyResult<Self> {
        enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, Hide)?;
        Ok(Self { out })
    }

    /// Leaves the alternate screen and restores cooked mode.
    pub fn restore() -> AnyResult<()> {
        execute!(io::stdout(), Show, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        Ok(())
    }

    /// Queues a full-screen clear for the next frame.
    pub fn begin_frame(&mut self) -> AnyResult<()> {
        queue!(self.out, Clear(ClearType::All))?;
        Ok(())
    }

    /// Flushes every queued draw to the terminal.
    pub fn present(&mut self) -> AnyResult<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Sounds the terminal bell, the audible rejection signal.
    pub fn bell(&mut self) -> AnyResult<()> {
        queue!(self.out, Print('\u{7}'))?;
        self.out.flush()?;
        Ok(())
    }

    /// Returns the first character pressed since the last poll, draining
    /// the rest of the input queue so stale presses never pile up.
    pub fn poll_key(&mut self) -> AnyResult<Option<char>> {
        let mut pressed = None;
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let KeyCode::Char(ch) = key.code {
                    if pressed.is_none() {
                        pressed = Some(ch);
                    }
                }
            }
        }
        Ok(pressed)
    }
}

impl GlyphSurface for Terminal {
    fn draw_glyph(&mut self, column: u16, row: u16, glyph: Glyph) -> AnyResult<()> {
        queue!(
            self.out,
            MoveTo(column, row),
            SetForegroundColor(TermColor::AnsiValue(glyph.color.index())),
            Print(glyph.ch)
        )?;
        Ok(())
    }
}

/// Restores the terminal when dropped, even on an error path.
pub struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = Terminal::restore();
    }
}

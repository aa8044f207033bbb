#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Harvest Defence adapters.
//!
//! The world exposes a coordinate-grouped draw order; this crate turns it
//! into glyph draw calls against a backend-agnostic [`GlyphSurface`]. World
//! cells render two terminal columns wide, which is why every horizontal
//! screen offset is doubled.

use anyhow::Result as AnyResult;
use harvest_defence_core::{Position, Sprite, SpriteKind, TileKind, Viewport};

/// ANSI-256 colour index used when presenting glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(u8);

impl Color {
    /// Creates a colour from an ANSI-256 palette index.
    #[must_use]
    pub const fn ansi(index: u8) -> Self {
        Self(index)
    }

    /// Palette index carried by the colour.
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.0
    }
}

/// Field palette.
pub mod palette {
    use super::Color;

    /// Grass green.
    pub const GREEN: Color = Color::ansi(108);
    /// Boundary wall green.
    pub const DARK_GREEN: Color = Color::ansi(22);
    /// Player red.
    pub const DARK_RED: Color = Color::ansi(88);
    /// Still water.
    pub const DEEP_BLUE: Color = Color::ansi(21);
    /// Glistening water.
    pub const GLISTEN_BLUE: Color = Color::ansi(39);
    /// Tilled earth.
    pub const LIGHT_BROWN: Color = Color::ansi(136);
    /// Fresh planting.
    pub const LIGHT_YELLOW: Color = Color::ansi(184);
    /// Ripe wheat.
    pub const GOLDEN: Color = Color::ansi(178);
    /// Rat fur.
    pub const BLOOD_RED: Color = Color::ansi(52);
    /// Trader coat.
    pub const HOT_PINK: Color = Color::ansi(132);
    /// Scarecrow rags.
    pub const PURPLE: Color = Color::ansi(129);
    /// HUD text.
    pub const WHITE: Color = Color::ansi(255);
    /// Alert marker.
    pub const ALERT_YELLOW: Color = Color::ansi(226);
}

/// A single drawable character cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    /// Character to print.
    pub ch: char,
    /// Foreground colour.
    pub color: Color,
}

impl Glyph {
    /// Creates a glyph from a character and colour.
    #[must_use]
    pub const fn new(ch: char, color: Color) -> Self {
        Self { ch, color }
    }
}

/// Offset-aware rendering surface consumed by the presentation loop.
///
/// Implementations receive screen coordinates already translated by the
/// camera; they only place characters.
pub trait GlyphSurface {
    /// Draws a single glyph at the provided screen cell.
    fn draw_glyph(&mut self, column: u16, row: u16, glyph: Glyph) -> AnyResult<()>;
}

/// Maps an entity appearance to its glyph.
#[must_use]
pub fn glyph_for(sprite: SpriteKind) -> Glyph {
    match sprite {
        SpriteKind::Tile { kind, glistening } => match kind {
            TileKind::Grass => Glyph::new(';', palette::GREEN),
            TileKind::Boundary => Glyph::new('♠', palette::DARK_GREEN),
            TileKind::Hole => Glyph::new('o', palette::LIGHT_BROWN),
            TileKind::Water => {
                if glistening {
                    Glyph::new('~', palette::GLISTEN_BLUE)
                } else {
                    Glyph::new('~', palette::DEEP_BLUE)
                }
            }
            TileKind::Soil => Glyph::new('=', palette::LIGHT_BROWN),
            TileKind::PlantedSoil => Glyph::new(',', palette::LIGHT_YELLOW),
            TileKind::Wheat => Glyph::new('w', palette::GOLDEN),
            TileKind::Scarecrow => Glyph::new('T', palette::PURPLE),
        },
        SpriteKind::Player => Glyph::new('#', palette::DARK_RED),
        SpriteKind::Npc => Glyph::new('&', palette::HOT_PINK),
        SpriteKind::Rat => Glyph::new('@', palette::BLOOD_RED),
    }
}

/// Projects a world cell into screen coordinates.
///
/// The view is centred on the viewport focus; horizontal offsets double
/// because a world cell spans two terminal columns. Returns `None` for cells
/// outside the `extent × 2·extent` screen rectangle.
#[must_use]
pub fn project(viewport: &Viewport, cell: Position) -> Option<(u16, u16)> {
    let extent = viewport.extent() as i32;
    let corner_x = viewport.focus().x() - extent / 2;
    let corner_y = viewport.focus().y() - extent / 2;

    let screen_x = (cell.x() - corner_x) * 2;
    let screen_y = cell.y() - corner_y;

    if screen_x < 0 || screen_x >= extent * 2 {
        return None;
    }
    if screen_y < 0 || screen_y >= extent {
        return None;
    }

    Some((screen_x as u16, screen_y as u16))
}

/// Draws the world's sprite order onto the surface, culling off-view cells.
///
/// Sprites arrive grouped by coordinate with the highest-priority entity
/// last, so later draws overwrite earlier ones within a cell.
pub fn draw_world<S: GlyphSurface>(
    surface: &mut S,
    viewport: &Viewport,
    sprites: &[Sprite],
) -> AnyResult<()> {
    for sprite in sprites {
        let Some((column, row)) = project(viewport, sprite.cell) else {
            continue;
        };
        surface.draw_glyph(column, row, glyph_for(sprite.sprite))?;
    }
    Ok(())
}

/// Draws a line of HUD text starting at the provided screen cell.
pub fn draw_text<S: GlyphSurface>(
    surface: &mut S,
    column: u16,
    row: u16,
    text: &str,
    color: Color,
) -> AnyResult<()> {
    for (offset, ch) in text.chars().enumerate() {
        surface.draw_glyph(column + offset as u16, row, Glyph::new(ch, color))?;
    }
    Ok(())
}

/// Resumable incremental text reveal for dialogue boxes.
///
/// The presentation loop advances the reveal a few characters per tick, so
/// gradual text never blocks the simulation.
#[derive(Clone, Debug, Default)]
pub struct TextReveal {
    text: String,
    shown: usize,
}

impl TextReveal {
    /// Starts a fresh reveal of the provided text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            shown: 0,
        }
    }

    /// Advances the reveal by `chars` characters.
    pub fn advance(&mut self, chars: usize) {
        let total = self.text.chars().count();
        self.shown = (self.shown + chars).min(total);
    }

    /// Portion of the text revealed so far.
    #[must_use]
    pub fn visible(&self) -> &str {
        match self.text.char_indices().nth(self.shown) {
            Some((byte, _)) => &self.text[..byte],
            None => &self.text,
        }
    }

    /// Whether the whole text is visible.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.shown >= self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_doubles_horizontal_offsets() {
        let viewport = Viewport::new(Position::new(0, 0), 40);
        // The focus sits at the centre of the 40-row, 80-column screen.
        assert_eq!(project(&viewport, Position::new(0, 0)), Some((40, 20)));
        assert_eq!(project(&viewport, Position::new(1, 0)), Some((42, 20)));
        assert_eq!(project(&viewport, Position::new(0, 1)), Some((40, 21)));
    }

    #[test]
    fn projection_culls_offscreen_cells() {
        let viewport = Viewport::new(Position::new(0, 0), 40);
        assert_eq!(project(&viewport, Position::new(-21, 0)), None);
        assert_eq!(project(&viewport, Position::new(20, 0)), None);
        assert_eq!(project(&viewport, Position::new(0, -21)), None);
        assert_eq!(project(&viewport, Position::new(0, 20)), None);
    }

    #[test]
    fn glistening_water_changes_colour_only() {
        let still = glyph_for(SpriteKind::Tile {
            kind: TileKind::Water,
            glistening: false,
        });
        let glistening = glyph_for(SpriteKind::Tile {
            kind: TileKind::Water,
            glistening: true,
        });
        assert_eq!(still.ch, glistening.ch);
        assert_ne!(still.color, glistening.color);
    }

    #[test]
    fn text_reveal_is_resumable() {
        let mut reveal = TextReveal::new("Fine weather for wheat.");
        assert_eq!(reveal.visible(), "");

        reveal.advance(4);
        assert_eq!(reveal.visible(), "Fine");
        assert!(!reveal.is_complete());

        reveal.advance(100);
        assert_eq!(reveal.visible(), "Fine weather for wheat.");
        assert!(reveal.is_complete());
    }

    struct Recorder {
        cells: Vec<(u16, u16, char)>,
    }

    impl GlyphSurface for Recorder {
        fn draw_glyph(&mut self, column: u16, row: u16, glyph: Glyph) -> AnyResult<()> {
            self.cells.push((column, row, glyph.ch));
            Ok(())
        }
    }

    #[test]
    fn draw_world_paints_in_sprite_order() {
        let viewport = Viewport::new(Position::new(0, 0), 40);
        let sprites = [
            Sprite {
                cell: Position::new(0, 0),
                sprite: SpriteKind::Tile {
                    kind: TileKind::Grass,
                    glistening: false,
                },
            },
            Sprite {
                cell: Position::new(0, 0),
                sprite: SpriteKind::Player,
            },
        ];

        let mut recorder = Recorder { cells: Vec::new() };
        draw_world(&mut recorder, &viewport, &sprites).expect("recording never fails");

        assert_eq!(recorder.cells, vec![(40, 20, ';'), (40, 20, '#')]);
    }
}

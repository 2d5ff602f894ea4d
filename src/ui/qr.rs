//! QR code rendering with unicode block characters.
//!
//! The pass-code payload is encoded with the `qrcode` crate and drawn as
//! block glyphs. A terminal cell cannot be fractionally scaled, so the stored
//! zoom level selects one of three render densities: one module per two
//! columns, one module per column with half blocks, or four modules per cell
//! with quadrant blocks. Light modules are the drawn ones, which keeps the
//! code dark-on-light on dark terminals.

use qrcode::QrCode;
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};

use crate::ui::theme::COLOR_QR;

/// Quiet-zone width in modules on every side. Scanners need the border.
const QUIET_ZONE: usize = 2;

/// Half-block glyphs indexed by (top light) | (bottom light) << 1.
const HALF_BLOCKS: [char; 4] = [' ', '\u{2580}', '\u{2584}', '\u{2588}'];

/// Quadrant glyphs indexed by tl | tr << 1 | bl << 2 | br << 3.
const QUAD_BLOCKS: [char; 16] = [
    ' ', '\u{2598}', '\u{259D}', '\u{2580}', '\u{2596}', '\u{258C}', '\u{259E}', '\u{259B}',
    '\u{2597}', '\u{259A}', '\u{2590}', '\u{259C}', '\u{2584}', '\u{2599}', '\u{259F}',
    '\u{2588}',
];

/// Discrete render density derived from the stored zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Density {
    /// Two columns and one row per module.
    Large,
    /// One column per module, two modules per row via half blocks.
    Medium,
    /// Two modules per column and row via quadrant blocks.
    Small,
}

impl Density {
    /// Map a zoom level in [0.4, 1.0] onto a render density.
    pub fn for_scale(scale: f64) -> Self {
        if scale >= 0.8 {
            Density::Large
        } else if scale >= 0.6 {
            Density::Medium
        } else {
            Density::Small
        }
    }
}

/// Render a payload as QR text at the density for the given zoom level.
///
/// Returns `None` if the payload cannot be encoded (empty or too long).
pub fn qr_text(payload: &str, scale: f64) -> Option<Text<'static>> {
    let grid = module_grid(payload)?;
    let lines = match Density::for_scale(scale) {
        Density::Large => render_large(&grid),
        Density::Medium => render_medium(&grid),
        Density::Small => render_small(&grid),
    };
    Some(Text::from(lines))
}

/// Encode the payload and return the module grid including the quiet zone.
/// `true` means a light module.
fn module_grid(payload: &str) -> Option<Vec<Vec<bool>>> {
    if payload.is_empty() {
        return None;
    }
    let code = QrCode::new(payload.as_bytes()).ok()?;
    let width = code.width();
    let colors = code.to_colors();

    let size = width + 2 * QUIET_ZONE;
    let mut grid = vec![vec![true; size]; size];
    for y in 0..width {
        for x in 0..width {
            if colors[y * width + x] == qrcode::Color::Dark {
                grid[y + QUIET_ZONE][x + QUIET_ZONE] = false;
            }
        }
    }
    Some(grid)
}

/// A module outside the grid counts as light, same as the quiet zone.
fn light_at(grid: &[Vec<bool>], y: usize, x: usize) -> bool {
    grid.get(y).and_then(|row| row.get(x)).copied().unwrap_or(true)
}

fn styled_line(content: String) -> Line<'static> {
    Line::from(Span::styled(content, Style::default().fg(COLOR_QR)))
}

fn render_large(grid: &[Vec<bool>]) -> Vec<Line<'static>> {
    grid.iter()
        .map(|row| {
            let mut s = String::with_capacity(row.len() * 2);
            for &light in row {
                s.push_str(if light { "\u{2588}\u{2588}" } else { "  " });
            }
            styled_line(s)
        })
        .collect()
}

fn render_medium(grid: &[Vec<bool>]) -> Vec<Line<'static>> {
    let size = grid.len();
    let mut lines = Vec::with_capacity(size.div_ceil(2));
    for y in (0..size).step_by(2) {
        let mut s = String::with_capacity(size);
        for x in 0..size {
            let idx = light_at(grid, y, x) as usize | (light_at(grid, y + 1, x) as usize) << 1;
            s.push(HALF_BLOCKS[idx]);
        }
        lines.push(styled_line(s));
    }
    lines
}

fn render_small(grid: &[Vec<bool>]) -> Vec<Line<'static>> {
    let size = grid.len();
    let mut lines = Vec::with_capacity(size.div_ceil(2));
    for y in (0..size).step_by(2) {
        let mut s = String::with_capacity(size.div_ceil(2));
        for x in (0..size).step_by(2) {
            let idx = light_at(grid, y, x) as usize
                | (light_at(grid, y, x + 1) as usize) << 1
                | (light_at(grid, y + 1, x) as usize) << 2
                | (light_at(grid, y + 1, x + 1) as usize) << 3;
            s.push(QUAD_BLOCKS[idx]);
        }
        lines.push(styled_line(s));
    }
    lines
}

/// Width in terminal cells of a rendered QR text.
pub fn text_width(text: &Text<'_>) -> u16 {
    text.lines
        .iter()
        .map(|l| l.spans.iter().map(|s| s.content.chars().count()).sum::<usize>())
        .max()
        .unwrap_or(0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_for_scale() {
        assert_eq!(Density::for_scale(1.0), Density::Large);
        assert_eq!(Density::for_scale(0.9), Density::Large);
        assert_eq!(Density::for_scale(0.8), Density::Large);
        assert_eq!(Density::for_scale(0.7), Density::Medium);
        assert_eq!(Density::for_scale(0.6), Density::Medium);
        assert_eq!(Density::for_scale(0.5), Density::Small);
        assert_eq!(Density::for_scale(0.4), Density::Small);
    }

    #[test]
    fn test_module_grid_has_quiet_zone() {
        let grid = module_grid("PAYLOAD123").unwrap();
        let size = grid.len();
        // Borders are entirely light
        for i in 0..size {
            assert!(grid[0][i] && grid[1][i]);
            assert!(grid[size - 1][i] && grid[size - 2][i]);
            assert!(grid[i][0] && grid[i][1]);
            assert!(grid[i][size - 1] && grid[i][size - 2]);
        }
        // The finder pattern corner module is dark
        assert!(!grid[QUIET_ZONE][QUIET_ZONE]);
    }

    #[test]
    fn test_empty_payload_not_encodable() {
        assert!(qr_text("", 1.0).is_none());
    }

    #[test]
    fn test_render_sizes_shrink_with_density() {
        let payload = "https://example.com/pass/123456";
        let large = qr_text(payload, 1.0).unwrap();
        let medium = qr_text(payload, 0.7).unwrap();
        let small = qr_text(payload, 0.4).unwrap();

        let grid_size = module_grid(payload).unwrap().len();
        assert_eq!(large.lines.len(), grid_size);
        assert_eq!(medium.lines.len(), grid_size.div_ceil(2));
        assert_eq!(small.lines.len(), grid_size.div_ceil(2));

        assert_eq!(text_width(&large), (grid_size * 2) as u16);
        assert_eq!(text_width(&medium), grid_size as u16);
        assert_eq!(text_width(&small), grid_size.div_ceil(2) as u16);
    }

    #[test]
    fn test_same_payload_same_modules_across_densities() {
        // Medium packs two rows per line; unpacking the half blocks must give
        // back the same grid that Large draws directly.
        let payload = "GATE-7";
        let grid = module_grid(payload).unwrap();
        let medium = qr_text(payload, 0.6).unwrap();

        for (pair_idx, line) in medium.lines.iter().enumerate() {
            let content: Vec<char> = line.spans[0].content.chars().collect();
            for (x, &ch) in content.iter().enumerate() {
                let idx = HALF_BLOCKS.iter().position(|&b| b == ch).unwrap();
                assert_eq!(idx & 1 == 1, light_at(&grid, pair_idx * 2, x));
                assert_eq!(idx >> 1 == 1, light_at(&grid, pair_idx * 2 + 1, x));
            }
        }
    }
}

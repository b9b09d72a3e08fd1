//! Half-block rendering of the grain field and the clock face.
//!
//! Every terminal cell shows two grid pixels stacked vertically: the upper
//! one as the foreground of `▀`, the lower one as its background.

use driftclock_clock::DigitalClock;
use driftclock_core::PackedColor;
use driftclock_sim::Simulation;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

const UPPER_HALF: &str = "▀";

/// Grid pixels in row-major order, `None` where the background shows.
///
/// Layers are painted background, settled mass, falling grains, then the
/// clock face on top.
pub fn compose(sim: &Simulation, clock: &DigitalClock) -> Vec<Option<PackedColor>> {
    let (w, h) = (sim.width(), sim.height());
    let mut pixels = vec![None; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let color = sim.mass_at(x, y);
            if !color.is_empty() {
                pixels[(y * w + x) as usize] = Some(color);
            }
        }
    }
    for (x, y, color) in sim.particles() {
        pixels[(y * w + x) as usize] = Some(color);
    }
    let face = clock.color();
    for region in clock.regions() {
        for (x, y) in region.cells() {
            if x >= 0 && x < w && y >= 0 && y < h {
                pixels[(y * w + x) as usize] = Some(face);
            }
        }
    }
    pixels
}

fn to_color(pixel: Option<PackedColor>) -> Color {
    match pixel {
        Some(c) => Color::Rgb(c.r(), c.g(), c.b()),
        None => Color::Reset,
    }
}

/// Fold pixel rows in pairs into terminal lines, merging runs of equal style.
pub fn field_lines(pixels: &[Option<PackedColor>], width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return Vec::new();
    }
    let rows: Vec<&[Option<PackedColor>]> = pixels.chunks(width).collect();
    rows.chunks(2)
        .map(|pair| {
            let upper = pair[0];
            let lower = pair.get(1).copied();
            let mut spans: Vec<Span<'static>> = Vec::new();
            let mut run = String::new();
            let mut run_style: Option<Style> = None;
            for x in 0..width {
                let below = lower.and_then(|row| row[x]);
                let style = Style::new().fg(to_color(upper[x])).bg(to_color(below));
                if let Some(prev) = run_style.filter(|&s| s != style) {
                    spans.push(Span::styled(std::mem::take(&mut run), prev));
                }
                run_style = Some(style);
                run.push_str(UPPER_HALF);
            }
            if let Some(style) = run_style {
                spans.push(Span::styled(run, style));
            }
            Line::from(spans)
        })
        .collect()
}

/// Draw the whole field into `area`.
pub fn render_field(frame: &mut Frame, area: Rect, sim: &Simulation, clock: &DigitalClock) {
    let pixels = compose(sim, clock);
    let lines = field_lines(&pixels, sim.width().max(0) as usize);
    frame.render_widget(Paragraph::new(lines), area);
}

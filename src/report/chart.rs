//! Bar and pie charts, built as SVG markup and rasterised with resvg.

use super::ReportError;
use crate::insights::PartyShare;
use resvg::{tiny_skia, usvg};
use std::f64::consts::PI;
use std::fmt::Write as _;

pub const BAR_FILL: &str = "#ADC89B";
pub const PIE_COLORS: [&str; 3] = ["#FE9494", "#459AD8", "#F3DC8B"];
/// Degrees counter-clockwise from three o'clock.
pub const PIE_START_ANGLE: f64 = 140.0;

pub const BAR_SIZE: (u32, u32) = (1200, 800);
pub const PIE_SIZE: (u32, u32) = (800, 800);
const LABEL_CHARS: usize = 40;
const FONT: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";
const INK: &str = "#282828";
const GRID: &str = "#DCDCDC";

/// One bar: a category label and its value (missing draws no bar).
#[derive(Debug, Clone)]
pub struct Bar {
    pub label: String,
    pub value: Option<i64>,
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn truncate(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        label.to_string()
    } else {
        let mut s: String = label.chars().take(max.saturating_sub(2)).collect();
        s.push_str("..");
        s
    }
}

fn open_svg(svg: &mut String, (w, h): (u32, u32)) {
    let _ = writeln!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}'>"
    );
    let _ = writeln!(svg, "  <rect width='{w}' height='{h}' fill='#FFFFFF'/>");
}

fn title(svg: &mut String, x: f64, y: f64, text: &str) {
    let _ = writeln!(
        svg,
        "  <text x='{x:.0}' y='{y:.0}' text-anchor='middle' fill='{INK}' font-family='{FONT}' font-size='26' font-weight='600'>{}</text>",
        escape_text(text)
    );
}

// ── Bar chart ─────────────────────────────────────────────────────────────────

/// Vertical bars in the given order, one fill color, rotated labels under the axis.
pub fn bar_svg(title_text: &str, y_label: &str, bars: &[Bar]) -> Result<String, ReportError> {
    if bars.is_empty() {
        return Err(ReportError::EmptyChart { chart: "bar chart" });
    }

    let (w, h) = (BAR_SIZE.0 as f64, BAR_SIZE.1 as f64);
    let (left, right, top, bottom) = (100.0, 30.0, 70.0, 290.0);
    let plot_w = w - left - right;
    let plot_h = h - top - bottom;
    let axis_y = top + plot_h;
    let max = bars.iter().filter_map(|b| b.value).max().unwrap_or(0).max(1) as f64;

    let mut svg = String::new();
    open_svg(&mut svg, BAR_SIZE);
    title(&mut svg, w / 2.0, 40.0, title_text);

    for i in 0..=4 {
        let value = (max * i as f64 / 4.0).round();
        let y = axis_y - value / max * plot_h;
        let _ = writeln!(
            svg,
            "  <line x1='{left:.1}' y1='{y:.1}' x2='{:.1}' y2='{y:.1}' stroke='{GRID}' stroke-width='1'/>",
            left + plot_w
        );
        let _ = writeln!(
            svg,
            "  <text x='{:.1}' y='{:.1}' text-anchor='end' fill='{INK}' font-family='{FONT}' font-size='14'>{value:.0}</text>",
            left - 8.0,
            y + 5.0
        );
    }

    let (ylx, yly) = (30.0, top + plot_h / 2.0);
    let _ = writeln!(
        svg,
        "  <text x='{ylx:.0}' y='{yly:.0}' transform='rotate(-90 {ylx:.0} {yly:.0})' text-anchor='middle' fill='{INK}' font-family='{FONT}' font-size='18'>{}</text>",
        escape_text(y_label)
    );

    let slot = plot_w / bars.len() as f64;
    let bar_w = (slot * 0.8).max(1.0);
    for (i, bar) in bars.iter().enumerate() {
        let x = left + i as f64 * slot + slot * 0.1;
        if let Some(v) = bar.value.filter(|v| *v > 0) {
            let bh = v as f64 / max * plot_h;
            let _ = writeln!(
                svg,
                "  <rect x='{x:.2}' y='{:.2}' width='{bar_w:.2}' height='{bh:.2}' fill='{BAR_FILL}'/>",
                axis_y - bh
            );
        }

        let (lx, ly) = (x + bar_w / 2.0 + 4.0, axis_y + 8.0);
        let _ = writeln!(
            svg,
            "  <text x='{lx:.1}' y='{ly:.1}' transform='rotate(-90 {lx:.1} {ly:.1})' text-anchor='end' fill='{INK}' font-family='{FONT}' font-size='11'>{}</text>",
            escape_text(&truncate(&bar.label, LABEL_CHARS))
        );
    }

    let _ = writeln!(
        svg,
        "  <path d='M {left:.1} {top:.1} V {axis_y:.1} H {:.1}' fill='none' stroke='{INK}' stroke-width='1.2'/>",
        left + plot_w
    );
    let _ = writeln!(svg, "</svg>");
    Ok(svg)
}

// ── Pie chart ─────────────────────────────────────────────────────────────────

/// Slice boundaries as cumulative fractions of the whole, starting at 0.
fn slice_bounds(slices: &[PartyShare]) -> Option<Vec<f64>> {
    let total: i64 = slices.iter().map(|s| s.won.max(0)).sum();
    if total <= 0 {
        return None;
    }
    let mut acc = 0.0;
    let mut bounds = vec![0.0];
    for s in slices {
        acc += s.won.max(0) as f64 / total as f64;
        bounds.push(acc);
    }
    if let Some(last) = bounds.last_mut() {
        *last = 1.0;
    }
    Some(bounds)
}

/// Point on the circle at `frac` of a turn counter-clockwise from the start angle.
fn point_at(cx: f64, cy: f64, r: f64, frac: f64) -> (f64, f64) {
    let a = (PIE_START_ANGLE + frac * 360.0) * PI / 180.0;
    (cx + r * a.cos(), cy - r * a.sin())
}

/// Share of each party, counter-clockwise from the start angle, with
/// percentage labels inside the slices and party labels outside.
pub fn pie_svg(title_text: &str, slices: &[PartyShare]) -> Result<String, ReportError> {
    let bounds = slice_bounds(slices).ok_or(ReportError::EmptyChart { chart: "pie chart" })?;

    let w = PIE_SIZE.0 as f64;
    let (cx, cy, r) = (w / 2.0, 430.0, 260.0);

    let mut svg = String::new();
    open_svg(&mut svg, PIE_SIZE);
    title(&mut svg, w / 2.0, 50.0, title_text);

    for (i, slice) in slices.iter().enumerate() {
        let (from, to) = (bounds[i], bounds[i + 1]);
        let frac = to - from;
        if frac <= 0.0 {
            continue;
        }
        let color = PIE_COLORS[i % PIE_COLORS.len()];

        if frac >= 1.0 {
            let _ = writeln!(svg, "  <circle cx='{cx:.1}' cy='{cy:.1}' r='{r:.1}' fill='{color}'/>");
        } else {
            let (x0, y0) = point_at(cx, cy, r, from);
            let (x1, y1) = point_at(cx, cy, r, to);
            let large = if frac > 0.5 { 1 } else { 0 };
            // sweep 0: counter-clockwise on screen
            let _ = writeln!(
                svg,
                "  <path d='M {cx:.2} {cy:.2} L {x0:.2} {y0:.2} A {r:.1} {r:.1} 0 {large} 0 {x1:.2} {y1:.2} Z' fill='{color}'/>"
            );
        }

        let mid = from + frac / 2.0;
        let (px, py) = point_at(cx, cy, r * 0.6, mid);
        let _ = writeln!(
            svg,
            "  <text x='{px:.1}' y='{:.1}' text-anchor='middle' fill='{INK}' font-family='{FONT}' font-size='20'>{:.1}%</text>",
            py + 7.0,
            frac * 100.0
        );

        let (lx, ly) = point_at(cx, cy, r * 1.1, mid);
        let anchor = if lx >= cx { "start" } else { "end" };
        let _ = writeln!(
            svg,
            "  <text x='{lx:.1}' y='{:.1}' text-anchor='{anchor}' fill='{INK}' font-family='{FONT}' font-size='18'>{}</text>",
            ly + 6.0,
            escape_text(&truncate(&slice.party, 30))
        );
    }

    let _ = writeln!(svg, "</svg>");
    Ok(svg)
}

// ── Rasterising ───────────────────────────────────────────────────────────────

/// Render SVG markup to PNG bytes, with text laid out from the system fonts.
pub fn svg_to_png(svg: &str, (width, height): (u32, u32), chart: &'static str) -> Result<Vec<u8>, ReportError> {
    let render_err = |message: String| ReportError::Render { chart, message };

    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_data(svg.as_bytes(), &options)
        .map_err(|e| render_err(format!("SVG parse failed: {e}")))?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| render_err(format!("cannot allocate a {width}x{height} pixmap")))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|e| render_err(e.to_string()))
}

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::chart::{Chart, ValueAxis};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
/// `hue_shift` rotates the wheel so two palettes do not start on the same hue.
pub fn generate_palette(n: usize, hue_shift: f32, saturation: f32, lightness: f32) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = hue_shift + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, saturation, lightness);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Trace colours
// ---------------------------------------------------------------------------

/// One colour per trace of a chart, indexed like `chart.traces`.
/// Emotion lines are saturated and bright, COVID bars muted so lines stay on top visually.
pub fn trace_colors(chart: &Chart) -> Vec<Color32> {
    let n_lines = chart.traces_on(ValueAxis::Emotion).count();
    let n_bars = chart.traces_on(ValueAxis::Covid).count();

    let mut lines = generate_palette(n_lines, 0.0, 0.80, 0.55).into_iter();
    let mut bars = generate_palette(n_bars, 200.0, 0.35, 0.60).into_iter();

    chart
        .traces
        .iter()
        .map(|t| {
            let next = match t.axis {
                ValueAxis::Emotion => lines.next(),
                ValueAxis::Covid => bars.next(),
            };
            next.unwrap_or(Color32::GRAY)
        })
        .collect()
}

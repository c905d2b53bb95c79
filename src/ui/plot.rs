use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::Ui;
use egui_plot::{
    AxisHints, Bar, BarChart, GridMark, HPlacement, Legend, Line, Plot, PlotPoint, PlotPoints,
};

use crate::chart::axis::TwinAxis;
use crate::chart::{TraceStyle, ValueAxis};
use crate::data::dates::to_twint;
use crate::state::AppState;

/// Fraction of a day's slot filled by the bars of that day.
const BAR_GROUP_WIDTH: f64 = 0.8;

/// Days map to whole numbers on the x axis.
pub fn day_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

pub fn x_to_day(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

fn format_day(x: f64) -> String {
    if (x - x.round()).abs() > 1e-6 {
        return String::new();
    }
    x_to_day(x).map(to_twint).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Emotion / COVID plot (central panel)
// ---------------------------------------------------------------------------

/// Render the dual-axis chart in the central panel.
pub fn emotion_plot(ui: &mut Ui, state: &AppState) {
    let chart = match &state.chart {
        Some(chart) => chart,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open an emotion index (File → Open…) or fetch a date range");
            });
            return;
        }
    };

    let is_visible = |i: usize| state.visible.get(i).copied().unwrap_or(false);
    let twin = TwinAxis::for_visible(chart, &state.visible);

    let x_axis = AxisHints::new_x()
        .label(chart.x_title.as_str())
        .formatter(|mark: GridMark, _range: &RangeInclusive<f64>| format_day(mark.value));
    let covid_axis = AxisHints::new_y().label(chart.covid_axis_title.as_str());
    let emotion_axis = AxisHints::new_y()
        .label(chart.emotion_axis_title.as_str())
        .placement(HPlacement::Right)
        .formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            format!("{:.3}", twin.to_emotion(mark.value))
        });

    let emotion_names: Vec<String> = chart
        .traces_on(ValueAxis::Emotion)
        .map(|(_, t)| t.name.clone())
        .collect();

    let bar_traces: Vec<usize> = chart
        .traces_on(ValueAxis::Covid)
        .map(|(i, _)| i)
        .filter(|&i| is_visible(i))
        .collect();
    let bar_width = BAR_GROUP_WIDTH / bar_traces.len().max(1) as f64;

    ui.vertical_centered(|ui: &mut Ui| ui.heading(&chart.title));

    Plot::new("emotion_covid_plot")
        .legend(Legend::default())
        .custom_x_axes(vec![x_axis])
        .custom_y_axes(vec![covid_axis, emotion_axis])
        .label_formatter(move |name: &str, point: &PlotPoint| {
            let day = format_day(point.x.round());
            if name.is_empty() {
                day
            } else if emotion_names.iter().any(|n| n == name) {
                format!("{name}\n{day}\n{:.3}", twin.to_emotion(point.y))
            } else {
                format!("{name}\n{day}\n{:.0}", point.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            // Bars first so lines draw on top. Visible bar series share each day's slot.
            let centre = (bar_traces.len().max(1) - 1) as f64 / 2.0;
            for (slot, &idx) in bar_traces.iter().enumerate() {
                let trace = &chart.traces[idx];
                let offset = (slot as f64 - centre) * bar_width;
                let bars: Vec<Bar> = trace
                    .series
                    .iter()
                    .filter(|(_, v)| v.is_finite())
                    .map(|(d, v)| Bar::new(day_to_x(d) + offset, v).width(bar_width))
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name(&trace.name)
                        .color(state.colors[idx]),
                );
            }

            for (idx, trace) in chart.traces_on(ValueAxis::Emotion) {
                if !is_visible(idx) {
                    continue;
                }
                let width = match trace.style {
                    TraceStyle::Line { width } => width,
                    TraceStyle::Bar => 1.0,
                };
                let points: PlotPoints = trace
                    .series
                    .iter()
                    .filter(|(_, v)| v.is_finite())
                    .map(|(d, v)| [day_to_x(d), twin.to_plot(v)])
                    .collect();

                plot_ui.line(
                    Line::new(points)
                        .name(&trace.name)
                        .color(state.colors[idx])
                        .width(width),
                );
            }
        });
}

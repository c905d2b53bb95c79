//! Chart model and the two assemblers (live fetch, saved index).
//!
//! The model is toolkit-independent: [`crate::ui::plot`] turns it into
//! egui_plot items, tests inspect it directly.

pub mod axis;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::data::covid::CovidTable;
use crate::data::dates::DateRange;
use crate::data::emotion::{Emotion, EmotionRecord};
use crate::data::lexicon::EmotionScorer;
use crate::data::series::AlignedSeries;
use crate::data::store::load_emotion_index;
use crate::data::tweets::TweetSource;
use crate::error::SeriesError;

pub const TITLE: &str = "Sentimentality vs. COVID-19 Statistics";
pub const X_TITLE: &str = "Day";
pub const COVID_AXIS_TITLE: &str = "Covid Statistic";
pub const EMOTION_AXIS_TITLE: &str = "Emotion";
pub const EMOTION_LINE_WIDTH: f32 = 3.0;

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Which value axis a trace is plotted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueAxis {
    /// Left axis, COVID statistics.
    Covid,
    /// Right axis, emotion scores.
    Emotion,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraceStyle {
    Line { width: f32 },
    Bar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    pub style: TraceStyle,
    pub axis: ValueAxis,
    pub series: AlignedSeries,
    /// Whether the trace is drawn before the user toggles anything.
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_title: String,
    pub covid_axis_title: String,
    pub emotion_axis_title: String,
    /// Shared time axis: every day of the range.
    pub dates: Vec<NaiveDate>,
    pub traces: Vec<Trace>,
}

impl Chart {
    pub fn range_label(&self) -> String {
        match (self.dates.first(), self.dates.last()) {
            (Some(first), Some(last)) => format!("{first} to {last}"),
            _ => String::new(),
        }
    }

    pub fn traces_on(&self, axis: ValueAxis) -> impl Iterator<Item = (usize, &Trace)> + '_ {
        self.traces
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.axis == axis)
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// One hidden line per emotion (right axis) and one hidden bar series per
/// COVID statistic (left axis) over `range`.
pub fn assemble(
    range: &DateRange,
    emotions: &EmotionRecord,
    covid: &CovidTable,
) -> Result<Chart, SeriesError> {
    let mut traces = Vec::with_capacity(Emotion::ALL.len() + covid.statistics().len());

    for emotion in Emotion::ALL {
        traces.push(Trace {
            name: emotion.display_name().to_string(),
            style: TraceStyle::Line {
                width: EMOTION_LINE_WIDTH,
            },
            axis: ValueAxis::Emotion,
            series: emotions.series_within(emotion, range),
            visible: false,
        });
    }

    for statistic in covid.statistics() {
        traces.push(Trace {
            name: statistic.clone(),
            style: TraceStyle::Bar,
            axis: ValueAxis::Covid,
            series: covid.series(range, statistic)?,
            visible: false,
        });
    }

    Ok(Chart {
        title: TITLE.to_string(),
        x_title: X_TITLE.to_string(),
        covid_axis_title: COVID_AXIS_TITLE.to_string(),
        emotion_axis_title: EMOTION_AXIS_TITLE.to_string(),
        dates: range.days().collect(),
        traces,
    })
}

/// Fetch tweets for `range` and score them.
pub fn fetch_emotions(
    range: &DateRange,
    source: &dyn TweetSource,
    scorer: &dyn EmotionScorer,
) -> Result<EmotionRecord> {
    let tweets = source.fetch(range).context("fetching tweets")?;
    let record = scorer.score(&tweets);
    if record.len() < range.num_days() {
        log::warn!(
            "Only {} of {} days have tweets",
            record.len(),
            range.num_days()
        );
    }
    Ok(record)
}

/// Live variant: fresh tweets and emotion scores for an explicit range.
pub fn chart_for_range(
    range: &DateRange,
    source: &dyn TweetSource,
    scorer: &dyn EmotionScorer,
    covid: &CovidTable,
) -> Result<Chart> {
    let emotions = fetch_emotions(range, source, scorer)?;
    Ok(assemble(range, &emotions, covid)?)
}

/// Saved variant: the range is inferred from the persisted index.
pub fn chart_from_saved(path: &Path, covid: &CovidTable) -> Result<Chart> {
    let emotions = load_emotion_index(path)
        .with_context(|| format!("loading emotion index {}", path.display()))?;
    chart_from_record(&emotions, covid)
}

/// Assemble over the full span of an already loaded emotion record.
pub fn chart_from_record(emotions: &EmotionRecord, covid: &CovidTable) -> Result<Chart> {
    let range = emotions.date_range()?;
    Ok(assemble(&range, emotions, covid)?)
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};
use eframe::egui::Color32;

use crate::chart::{self, Chart, ValueAxis};
use crate::color::trace_colors;
use crate::config::SourcePaths;
use crate::data::covid::CovidTable;
use crate::data::dates::{dataset_epoch, DateRange};
use crate::data::emotion::EmotionRecord;
use crate::data::lexicon::{EmotionLexicon, LexiconScorer};
use crate::data::loader::load_covid_table;
use crate::data::store::{load_emotion_index, save_emotion_index};
use crate::data::tweets::TweetArchive;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Where tweets, lexicon, COVID data and the emotion index are read from.
    pub sources: SourcePaths,

    /// Date pickers for the live range.
    pub start: NaiveDate,
    pub end: NaiveDate,

    /// COVID table, loaded on first use.
    pub covid: Option<CovidTable>,

    /// Emotion index behind the current chart.
    pub emotions: Option<EmotionRecord>,

    /// Explicit range of the live variant; `None` charts the whole emotion index.
    pub range: Option<DateRange>,

    /// Assembled chart (None until both data sources are available).
    pub chart: Option<Chart>,

    /// Per-trace visibility, indexed like `chart.traces`.
    pub visible: Vec<bool>,

    /// Per-trace colour, indexed like `chart.traces`.
    pub colors: Vec<Color32>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(sources: SourcePaths) -> Self {
        let start = dataset_epoch();
        Self {
            sources,
            start,
            end: start.checked_add_days(Days::new(30)).unwrap_or(start),
            covid: None,
            emotions: None,
            range: None,
            chart: None,
            visible: Vec::new(),
            colors: Vec::new(),
            status_message: None,
        }
    }

    /// Run a fallible action, logging and surfacing any error in the status bar.
    fn attempt(&mut self, what: &str, action: impl FnOnce(&mut Self) -> Result<()>) {
        match action(self) {
            Ok(()) => self.status_message = None,
            Err(e) => {
                log::error!("Failed to {what}: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    fn covid_table(&mut self) -> Result<&CovidTable> {
        if self.covid.is_none() {
            self.covid = Some(load_covid_table(&self.sources.covid)?);
        }
        self.covid
            .as_ref()
            .context("COVID data not loaded")
    }

    /// Ingest a newly assembled chart; every trace starts as assembled (hidden).
    pub fn set_chart(&mut self, chart: Chart) {
        self.visible = chart.traces.iter().map(|t| t.visible).collect();
        self.colors = trace_colors(&chart);
        log::info!(
            "Charting {} traces over {}",
            chart.traces.len(),
            chart.range_label()
        );
        self.chart = Some(chart);
    }

    // ---- Entry points ----
    //
    // Each builds its chart from locals first; the state only changes once
    // the chart has been assembled.

    /// Live variant: fetch and score tweets for the picked dates, then chart them.
    pub fn draw_range(&mut self) {
        self.attempt("chart date range", |state| {
            let today = Local::now().date_naive();
            let range = DateRange::new(state.start, state.end)?.ensure_before(today)?;

            let source = TweetArchive::new(&state.sources.tweets);
            let lexicon = EmotionLexicon::load(&state.sources.lexicon)
                .with_context(|| format!("loading lexicon {}", state.sources.lexicon.display()))?;
            let scorer = LexiconScorer::new(lexicon);

            let emotions = chart::fetch_emotions(&range, &source, &scorer)?;
            let chart = build_chart(state.covid_table()?, &emotions, Some(range))?;

            state.emotions = Some(emotions);
            state.range = Some(range);
            state.set_chart(chart);
            Ok(())
        });
    }

    /// Saved variant: chart the persisted emotion index over its own date span.
    pub fn draw_saved(&mut self, path: PathBuf) {
        self.attempt("chart saved emotion index", |state| {
            let emotions = load_emotion_index(&path)
                .with_context(|| format!("loading emotion index {}", path.display()))?;
            let chart = build_chart(state.covid_table()?, &emotions, None)?;

            if let Ok(range) = emotions.date_range() {
                state.start = range.start();
                state.end = range.end();
            }
            state.emotions = Some(emotions);
            state.range = None;
            state.sources.emotions = path;
            state.set_chart(chart);
            Ok(())
        });
    }

    /// Replace the COVID table and redraw the current chart with it.
    pub fn load_covid(&mut self, path: PathBuf) {
        self.attempt("load COVID data", |state| {
            let covid = load_covid_table(&path)?;
            let chart = state
                .emotions
                .as_ref()
                .map(|emotions| build_chart(&covid, emotions, state.range))
                .transpose()?;

            state.covid = Some(covid);
            state.sources.covid = path;
            if let Some(chart) = chart {
                state.set_chart(chart);
            }
            Ok(())
        });
    }

    /// Persist the emotion index behind the current chart.
    pub fn save_emotions(&mut self, path: &Path) {
        self.attempt("save emotion index", |state| {
            let emotions = state.emotions.as_ref().context("no emotion data to save")?;
            save_emotion_index(path, emotions)?;
            Ok(())
        });
    }

    // ---- Visibility ----

    /// Toggle a single trace.
    pub fn toggle(&mut self, index: usize) {
        if let Some(v) = self.visible.get_mut(index) {
            *v = !*v;
        }
    }

    /// Show or hide every trace on one axis.
    pub fn set_axis_visible(&mut self, axis: ValueAxis, show: bool) {
        let Some(chart) = &self.chart else {
            return;
        };
        for (i, _) in chart.traces_on(axis) {
            if let Some(v) = self.visible.get_mut(i) {
                *v = show;
            }
        }
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|v| **v).count()
    }
}

/// Explicit range for the live variant, the record's own span otherwise.
fn build_chart(
    covid: &CovidTable,
    emotions: &EmotionRecord,
    range: Option<DateRange>,
) -> Result<Chart> {
    match range {
        Some(range) => Ok(chart::assemble(&range, emotions, covid)?),
        None => chart::chart_from_record(emotions, covid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dates::parse_twint_date;
    use crate::data::emotion::{Emotion, EmotionScores};
    use std::io::Write;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn fixture() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let covid = write(
            dir.path(),
            "covid.csv",
            "date,cases,deaths\n2020-04-01,10,0\n2020-04-02,20,1\n2020-04-03,30,2\n",
        );
        let tweets = write(
            dir.path(),
            "tweets.csv",
            "date,tweet\n2020-04-01,happy happy\n2020-04-02,scared of the virus\n",
        );
        let lexicon = write(dir.path(), "lexicon.txt", "happy\tjoy\t1\nvirus\tfear\t1\n");
        let sources = SourcePaths {
            covid,
            tweets,
            lexicon,
            emotions: dir.path().join("index.csv"),
        };
        (dir, AppState::new(sources))
    }

    #[test]
    fn live_range_builds_hidden_chart() {
        let (_dir, mut state) = fixture();
        state.start = parse_twint_date("2020-04-01").unwrap();
        state.end = parse_twint_date("2020-04-02").unwrap();
        state.draw_range();

        assert_eq!(state.status_message, None);
        let chart = state.chart.as_ref().unwrap();
        assert_eq!(chart.traces.len(), 12);
        assert_eq!(state.visible.len(), 12);
        assert_eq!(state.visible_count(), 0);
        assert_eq!(
            chart.traces[Emotion::Joy as usize].series.values,
            vec![1.0, 0.0]
        );
    }

    #[test]
    fn errors_land_in_status_message() {
        let (_dir, mut state) = fixture();
        state.start = parse_twint_date("2020-04-02").unwrap();
        state.end = parse_twint_date("2020-04-01").unwrap();
        state.draw_range();

        assert!(state.chart.is_none());
        assert!(state.status_message.unwrap().contains("must precede"));
    }

    #[test]
    fn saved_index_round_trips_through_state() {
        let (dir, mut state) = fixture();
        let record: EmotionRecord = [("2020-04-02", 0.4), ("2020-04-03", 0.6)]
            .into_iter()
            .map(|(day, joy)| {
                (
                    parse_twint_date(day).unwrap(),
                    EmotionScores::from_pairs([(Emotion::Joy, joy)]),
                )
            })
            .collect();
        let path = dir.path().join("saved.csv");
        save_emotion_index(&path, &record).unwrap();

        state.draw_saved(path);
        assert_eq!(state.status_message, None);
        assert_eq!(state.start, parse_twint_date("2020-04-02").unwrap());
        assert_eq!(state.chart.as_ref().unwrap().dates.len(), 2);

        let out = dir.path().join("copy.csv");
        state.save_emotions(&out);
        assert_eq!(load_emotion_index(&out).unwrap(), record);
    }

    #[test]
    fn failed_redraw_keeps_previous_data() {
        let (dir, mut state) = fixture();
        state.start = parse_twint_date("2020-04-01").unwrap();
        state.end = parse_twint_date("2020-04-02").unwrap();
        state.draw_range();
        assert_eq!(state.status_message, None);
        let before_range = state.range;
        let before_emotions = state.emotions.clone();
        let before_sources = state.sources.clone();

        // Emotion index for days the COVID table does not cover.
        let record: EmotionRecord = [("2020-05-10", 0.3), ("2020-05-11", 0.7)]
            .into_iter()
            .map(|(day, joy)| {
                (
                    parse_twint_date(day).unwrap(),
                    EmotionScores::from_pairs([(Emotion::Joy, joy)]),
                )
            })
            .collect();
        let path = dir.path().join("may.csv");
        save_emotion_index(&path, &record).unwrap();

        state.draw_saved(path);
        assert!(state
            .status_message
            .as_deref()
            .unwrap()
            .contains("no COVID data for 2020-05-10"));
        assert_eq!(state.emotions, before_emotions);
        assert_eq!(state.range, before_range);
        assert_eq!(state.start, parse_twint_date("2020-04-01").unwrap());
        assert_eq!(state.end, parse_twint_date("2020-04-02").unwrap());
        assert_eq!(state.sources, before_sources);
        assert_eq!(
            state.chart.as_ref().unwrap().range_label(),
            "2020-04-01 to 2020-04-02"
        );

        // A COVID table missing the charted days is rejected the same way.
        let short = write(dir.path(), "short.csv", "date,cases\n2020-04-01,10\n");
        state.load_covid(short);
        assert!(state.status_message.is_some());
        assert_eq!(state.covid.as_ref().unwrap().len(), 3);
        assert_eq!(state.sources, before_sources);

        let out = dir.path().join("saved.csv");
        state.save_emotions(&out);
        assert_eq!(Some(load_emotion_index(&out).unwrap()), before_emotions);
    }

    #[test]
    fn axis_toggles_only_touch_their_group() {
        let (_dir, mut state) = fixture();
        state.start = parse_twint_date("2020-04-01").unwrap();
        state.end = parse_twint_date("2020-04-03").unwrap();
        state.draw_range();

        state.set_axis_visible(ValueAxis::Covid, true);
        assert_eq!(state.visible_count(), 2);
        state.toggle(Emotion::Fear as usize);
        assert_eq!(state.visible_count(), 3);
        state.set_axis_visible(ValueAxis::Covid, false);
        assert_eq!(state.visible_count(), 1);
    }
}

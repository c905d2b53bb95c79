use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;

use covid_mood::app;
use covid_mood::chart::fetch_emotions;
use covid_mood::config::{Cli, Command, SourcePaths};
use covid_mood::data::dates::DateRange;
use covid_mood::data::lexicon::{EmotionLexicon, LexiconScorer};
use covid_mood::data::store::save_emotion_index;
use covid_mood::data::tweets::TweetArchive;
use covid_mood::state::AppState;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let sources = SourcePaths::from(cli.sources);
    let mut state = AppState::new(sources.clone());

    match cli.command {
        None => {}
        Some(Command::Range { start, end }) => {
            state.start = start;
            state.end = end;
            state.draw_range();
        }
        Some(Command::Saved) => state.draw_saved(sources.emotions.clone()),
        Some(Command::Score { start, end, out }) => {
            return score(&sources, start, end, out.as_deref());
        }
    }

    app::show(state).map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}

/// Headless scoring: fetch, score, persist.
fn score(
    sources: &SourcePaths,
    start: NaiveDate,
    end: NaiveDate,
    out: Option<&std::path::Path>,
) -> Result<()> {
    let range = DateRange::new(start, end)?.ensure_before(Local::now().date_naive())?;
    let source = TweetArchive::new(&sources.tweets);
    let lexicon = EmotionLexicon::load(&sources.lexicon)
        .with_context(|| format!("loading lexicon {}", sources.lexicon.display()))?;

    let record = fetch_emotions(&range, &source, &LexiconScorer::new(lexicon))?;
    let out = out.unwrap_or(sources.emotions.as_path());
    save_emotion_index(out, &record)
        .with_context(|| format!("writing emotion index {}", out.display()))?;
    Ok(())
}

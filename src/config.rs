use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::data::dates::parse_twint_date;
use crate::data::store::DEFAULT_EMOTION_INDEX;

pub const DEFAULT_COVID_DATA: &str = "covid_data.csv";
pub const DEFAULT_TWEETS: &str = "tweets.csv";
pub const DEFAULT_LEXICON: &str = "emotion_lexicon.txt";

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "covid-mood", version, about = "Tweet emotions vs. COVID-19 statistics")]
pub struct Cli {
    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// COVID statistics (.csv, .json or .parquet)
    #[arg(long, global = true)]
    pub covid: Option<PathBuf>,

    /// twint CSV export of tweets
    #[arg(long, global = true)]
    pub tweets: Option<PathBuf>,

    /// NRC word-emotion lexicon (tab separated)
    #[arg(long, global = true)]
    pub lexicon: Option<PathBuf>,

    /// Persisted emotion index
    #[arg(long, global = true)]
    pub emotions: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Score tweets for a date range and chart them against COVID data
    Range {
        #[arg(long, value_parser = parse_twint_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_twint_date)]
        end: NaiveDate,
    },
    /// Chart the persisted emotion index against COVID data
    Saved,
    /// Score tweets for a date range and write the emotion index, without a window
    Score {
        #[arg(long, value_parser = parse_twint_date)]
        start: NaiveDate,
        #[arg(long, value_parser = parse_twint_date)]
        end: NaiveDate,
        /// Output file (defaults to --emotions)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Resolved paths
// ---------------------------------------------------------------------------

/// Input files with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub covid: PathBuf,
    pub tweets: PathBuf,
    pub lexicon: PathBuf,
    pub emotions: PathBuf,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            covid: PathBuf::from(DEFAULT_COVID_DATA),
            tweets: PathBuf::from(DEFAULT_TWEETS),
            lexicon: PathBuf::from(DEFAULT_LEXICON),
            emotions: PathBuf::from(DEFAULT_EMOTION_INDEX),
        }
    }
}

impl From<SourceArgs> for SourcePaths {
    fn from(args: SourceArgs) -> Self {
        let defaults = SourcePaths::default();
        Self {
            covid: args.covid.unwrap_or(defaults.covid),
            tweets: args.tweets.unwrap_or(defaults.tweets),
            lexicon: args.lexicon.unwrap_or(defaults.lexicon),
            emotions: args.emotions.unwrap_or(defaults.emotions),
        }
    }
}

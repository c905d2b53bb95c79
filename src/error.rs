use chrono::NaiveDate;
use thiserror::Error;

use crate::data::emotion::Emotion;

// ---------------------------------------------------------------------------
// Typed failures of the data layer
// ---------------------------------------------------------------------------

/// A date range that violates the dataset's preconditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("{date} is before the dataset epoch {epoch}")]
    BeforeEpoch { date: NaiveDate, epoch: NaiveDate },

    #[error("start date {start} must precede end date {end}")]
    NotIncreasing { start: NaiveDate, end: NaiveDate },

    #[error("end date {end} must be before today ({today})")]
    InFuture { end: NaiveDate, today: NaiveDate },

    #[error("'{0}' is not a YYYY-MM-DD date")]
    Malformed(String),

    #[error("emotion index needs at least two distinct days, found {0}")]
    TooFewDays(usize),
}

/// A failed lookup while extracting an aligned series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("unknown emotion label '{0}'")]
    UnknownEmotion(String),

    #[error("unknown COVID statistic '{0}'")]
    UnknownStatistic(String),

    #[error("no COVID data for {0}")]
    MissingDate(NaiveDate),
}

/// Failure reading or writing the persisted emotion index.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("emotion index has no '{}' column", .0.label())]
    MissingColumn(Emotion),

    #[error("emotion index has no 'date' column")]
    MissingDateColumn,

    #[error("row {row}: {source}")]
    BadDate { row: usize, source: DateRangeError },

    #[error("row {row}, column '{column}': '{value}' is not a number")]
    BadScore {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: duplicate date {date}")]
    DuplicateDate { row: usize, date: NaiveDate },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure parsing an NRC-style word/emotion lexicon.
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("line {line}: expected 'word<TAB>emotion<TAB>association'")]
    Malformed { line: usize },

    #[error("line {line}: {source}")]
    UnknownEmotion { line: usize, source: SeriesError },

    #[error("line {line}: association '{value}' is not 0 or 1")]
    BadAssociation { line: usize, value: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

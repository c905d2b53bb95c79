//! Data layer: core types, loading, scoring and alignment.
//!
//! Architecture:
//! ```text
//!  tweets.csv ──► tweets ──► lexicon (score) ──┐
//!                                              ▼
//!  tweet_emotional_index.csv ◄──► store ──► emotion  (EmotionRecord)
//!                                              │
//!                                              ├──► series (AlignedSeries per emotion)
//!                                              │
//!  covid_data.{csv,json,parquet} ──► loader ──► covid  (CovidTable)
//!
//!  dates: DateRange expansion shared by all of the above
//! ```

pub mod covid;
pub mod dates;
pub mod emotion;
pub mod lexicon;
pub mod loader;
pub mod series;
pub mod store;
pub mod tweets;

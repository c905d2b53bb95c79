use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use super::dates::{parse_twint_date, DateRange};

// ---------------------------------------------------------------------------
// Tweet source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tweet {
    pub date: NaiveDate,
    pub text: String,
}

/// Retrieves the raw tweets posted on the days of a range.
pub trait TweetSource {
    fn fetch(&self, range: &DateRange) -> Result<Vec<Tweet>>;
}

/// The two columns of a twint CSV export we need; the rest are ignored.
#[derive(Debug, Deserialize)]
struct TwintRow {
    date: String,
    tweet: String,
}

/// Tweets previously scraped with twint and exported as CSV.
#[derive(Debug, Clone)]
pub struct TweetArchive {
    path: PathBuf,
}

impl TweetArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TweetSource for TweetArchive {
    fn fetch(&self, range: &DateRange) -> Result<Vec<Tweet>> {
        let file = std::fs::File::open(&self.path)
            .with_context(|| format!("opening tweet archive {}", self.path.display()))?;
        let tweets = read_twint_csv(file, range)?;
        log::info!(
            "Fetched {} tweets for {} days from {}",
            tweets.len(),
            range.num_days(),
            self.path.display()
        );
        Ok(tweets)
    }
}

/// Parse a twint CSV export, keeping tweets whose date falls inside `range`.
pub fn read_twint_csv<R: Read>(input: R, range: &DateRange) -> Result<Vec<Tweet>> {
    let mut reader = csv::Reader::from_reader(input);
    let mut tweets = Vec::new();

    for (row_no, result) in reader.deserialize::<TwintRow>().enumerate() {
        let row = result.with_context(|| format!("tweet CSV row {row_no}"))?;
        let date = parse_twint_date(&row.date).with_context(|| format!("tweet CSV row {row_no}"))?;
        if range.contains(date) {
            tweets.push(Tweet {
                date,
                text: row.tweet,
            });
        }
    }

    Ok(tweets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_tweets_inside_range() {
        let csv = "id,date,time,username,tweet\n\
                   1,2020-03-31,10:00:00,a,too early\n\
                   2,2020-04-01,11:00:00,b,\"hope, and fear\"\n\
                   3,2020-04-02,12:00:00,c,joy\n\
                   4,2020-04-03,12:00:00,d,too late\n";
        let range = DateRange::new(
            parse_twint_date("2020-04-01").unwrap(),
            parse_twint_date("2020-04-02").unwrap(),
        )
        .unwrap();

        let tweets = read_twint_csv(csv.as_bytes(), &range).unwrap();
        let texts: Vec<&str> = tweets.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["hope, and fear", "joy"]);
    }

    #[test]
    fn missing_tweet_column_is_an_error() {
        let range = DateRange::new(
            parse_twint_date("2020-04-01").unwrap(),
            parse_twint_date("2020-04-02").unwrap(),
        )
        .unwrap();
        assert!(read_twint_csv("date,text\n2020-04-01,hi\n".as_bytes(), &range).is_err());
    }
}

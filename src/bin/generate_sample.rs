use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;

use covid_mood::data::dates::{dataset_epoch, to_twint, DateRange};
use covid_mood::data::lexicon::{EmotionLexicon, EmotionScorer, LexiconScorer};
use covid_mood::data::store::{save_emotion_index, DEFAULT_EMOTION_INDEX};
use covid_mood::data::tweets::Tweet;

const DAYS: u64 = 120;
const TWEETS_PER_DAY: usize = 25;

/// Small NRC-style lexicon: (word, emotions).
const LEXICON: &[(&str, &[&str])] = &[
    ("virus", &["fear", "negative", "sadness"]),
    ("lockdown", &["anger", "negative", "sadness"]),
    ("sick", &["disgust", "fear", "negative", "sadness"]),
    ("death", &["anger", "fear", "negative", "sadness", "surprise"]),
    ("panic", &["fear", "negative"]),
    ("hoarding", &["anger", "disgust", "negative"]),
    ("hope", &["anticipation", "joy", "positive", "surprise", "trust"]),
    ("vaccine", &["anticipation", "positive", "trust"]),
    ("together", &["joy", "positive", "trust"]),
    ("nurses", &["joy", "positive", "trust"]),
    ("reopening", &["anticipation", "joy", "positive"]),
    ("grateful", &["joy", "positive"]),
];

const GRIM_WORDS: &[&str] = &["virus", "lockdown", "sick", "death", "panic", "hoarding"];
const HOPEFUL_WORDS: &[&str] = &["hope", "vaccine", "together", "nurses", "reopening", "grateful"];
const FILLER: &[&str] = &["today", "the", "news", "again", "everyone", "stay", "home", "update"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a>(&mut self, words: &[&'a str]) -> &'a str {
        words[(self.next_u64() % words.len() as u64) as usize]
    }
}

/// Share of grim words on day `n`: peaks early, eases off.
fn grimness(n: u64) -> f64 {
    let t = n as f64 / DAYS as f64;
    0.85 - 0.55 * t
}

/// Logistic growth of cumulative cases with a little noise.
fn cumulative_cases(n: u64, rng: &mut SimpleRng) -> f64 {
    let t = n as f64;
    let base = 250_000.0 / (1.0 + (-(t - 45.0) / 9.0).exp());
    (base * (0.97 + 0.06 * rng.next_f64())).round()
}

fn generate_tweets(range: &DateRange, rng: &mut SimpleRng) -> Vec<Tweet> {
    let mut tweets = Vec::new();
    for (n, date) in range.days().enumerate() {
        let grim = grimness(n as u64);
        for _ in 0..TWEETS_PER_DAY {
            let mut words = Vec::new();
            for _ in 0..6 {
                let roll = rng.next_f64();
                let word = if roll < 0.4 {
                    rng.pick(FILLER)
                } else if roll < 0.4 + 0.6 * grim {
                    rng.pick(GRIM_WORDS)
                } else {
                    rng.pick(HOPEFUL_WORDS)
                };
                words.push(word);
            }
            tweets.push(Tweet {
                date,
                text: words.join(" "),
            });
        }
    }
    tweets
}

fn write_tweets(path: &Path, tweets: &[Tweet]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating tweets CSV")?;
    writer.write_record(["id", "date", "time", "username", "tweet"])?;
    for (id, tweet) in tweets.iter().enumerate() {
        writer.write_record([
            id.to_string(),
            to_twint(tweet.date),
            "12:00:00".to_string(),
            format!("user{}", id % 97),
            tweet.text.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_lexicon(path: &Path) -> Result<()> {
    let mut file = File::create(path).context("creating lexicon")?;
    for (word, emotions) in LEXICON {
        for emotion in *emotions {
            writeln!(file, "{word}\t{emotion}\t1")?;
        }
    }
    Ok(())
}

struct CovidColumns {
    dates: Vec<NaiveDate>,
    cases: Vec<i64>,
    deaths: Vec<i64>,
    positivity: Vec<f64>,
}

fn generate_covid(range: &DateRange, rng: &mut SimpleRng) -> CovidColumns {
    let mut columns = CovidColumns {
        dates: Vec::new(),
        cases: Vec::new(),
        deaths: Vec::new(),
        positivity: Vec::new(),
    };
    let mut previous = 0.0;
    for (n, date) in range.days().enumerate() {
        let total = cumulative_cases(n as u64, rng).max(previous);
        let new_cases = total - previous;
        previous = total;

        columns.dates.push(date);
        columns.cases.push(new_cases as i64);
        columns.deaths.push((new_cases * 0.03 * (0.8 + 0.4 * rng.next_f64())) as i64);
        columns.positivity.push((new_cases / 1000.0).min(25.0) + rng.next_f64());
    }
    columns
}

fn write_covid_csv(path: &Path, covid: &CovidColumns) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating COVID CSV")?;
    writer.write_record(["date", "new_cases", "new_deaths", "test_positivity"])?;
    for i in 0..covid.dates.len() {
        writer.write_record([
            to_twint(covid.dates[i]),
            covid.cases[i].to_string(),
            covid.deaths[i].to_string(),
            format!("{:.2}", covid.positivity[i]),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_covid_parquet(path: &Path, covid: &CovidColumns) -> Result<()> {
    let dates: Vec<String> = covid.dates.iter().map(|d| to_twint(*d)).collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Utf8, false),
        Field::new("new_cases", DataType::Int64, false),
        Field::new("new_deaths", DataType::Int64, false),
        Field::new("test_positivity", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(dates)),
            Arc::new(Int64Array::from(covid.cases.clone())),
            Arc::new(Int64Array::from(covid.deaths.clone())),
            Arc::new(Float64Array::from(covid.positivity.clone())),
        ],
    )
    .context("building record batch")?;

    let file = File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample"));
    std::fs::create_dir_all(&out_dir).context("creating output directory")?;

    let start = dataset_epoch();
    let end = start
        .checked_add_days(chrono::Days::new(DAYS - 1))
        .context("sample range overflows")?;
    let range = DateRange::new(start, end)?;
    let mut rng = SimpleRng::new(42);

    let tweets = generate_tweets(&range, &mut rng);
    write_tweets(&out_dir.join("tweets.csv"), &tweets)?;

    let lexicon_path = out_dir.join("emotion_lexicon.txt");
    write_lexicon(&lexicon_path)?;

    let covid = generate_covid(&range, &mut rng);
    write_covid_csv(&out_dir.join("covid_data.csv"), &covid)?;
    write_covid_parquet(&out_dir.join("covid_data.parquet"), &covid)?;

    // Persist an index scored by the same lexicon so `covid-mood saved` works out of the box.
    let scorer = LexiconScorer::new(EmotionLexicon::load(&lexicon_path)?);
    let record = scorer.score(&tweets);
    save_emotion_index(&out_dir.join(DEFAULT_EMOTION_INDEX), &record)?;

    println!(
        "Wrote {} tweets over {} days and matching COVID data to {}",
        tweets.len(),
        range.num_days(),
        out_dir.display()
    );
    Ok(())
}

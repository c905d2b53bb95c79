use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;

use super::emotion::{Emotion, EmotionRecord, EmotionScores};
use super::tweets::Tweet;
use crate::error::LexiconError;

// ---------------------------------------------------------------------------
// EmotionLexicon – word → associated emotions (NRC word-level format)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct EmotionLexicon {
    words: HashMap<String, Vec<Emotion>>,
}

impl EmotionLexicon {
    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let file = std::fs::File::open(path)?;
        let lexicon = Self::from_reader(file)?;
        log::info!(
            "Loaded emotion lexicon with {} words from {}",
            lexicon.len(),
            path.display()
        );
        Ok(lexicon)
    }

    /// Parse `word<TAB>emotion<TAB>association` lines. Association `0` rows are dropped.
    pub fn from_reader<R: Read>(input: R) -> Result<Self, LexiconError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(input);

        let mut lexicon = Self::default();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            // Blank lines are skipped by the reader, so count from the source position.
            let line = record
                .position()
                .map_or(idx + 1, |pos| pos.line() as usize);
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            let (Some(word), Some(label), Some(assoc)) = (record.get(0), record.get(1), record.get(2))
            else {
                return Err(LexiconError::Malformed { line });
            };

            let emotion: Emotion = label
                .parse()
                .map_err(|source| LexiconError::UnknownEmotion { line, source })?;
            match assoc.trim() {
                "1" => lexicon.add(word, emotion),
                "0" => {}
                other => {
                    return Err(LexiconError::BadAssociation {
                        line,
                        value: other.to_string(),
                    })
                }
            }
        }
        Ok(lexicon)
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Emotion)>) -> Self {
        let mut lexicon = Self::default();
        for (word, emotion) in pairs {
            lexicon.add(word, emotion);
        }
        lexicon
    }

    fn add(&mut self, word: &str, emotion: Emotion) {
        let entry = self.words.entry(word.trim().to_lowercase()).or_default();
        if !entry.contains(&emotion) {
            entry.push(emotion);
        }
    }

    /// Emotions associated with a lowercase word.
    pub fn emotions_for(&self, word: &str) -> &[Emotion] {
        self.words.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Turns raw tweets into a per-day emotion index.
pub trait EmotionScorer {
    fn score(&self, tweets: &[Tweet]) -> EmotionRecord;
}

/// Scores each day by the share of lexicon hits that fall on each emotion.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    lexicon: EmotionLexicon,
}

impl LexiconScorer {
    pub fn new(lexicon: EmotionLexicon) -> Self {
        Self { lexicon }
    }

    fn count_hits(&self, text: &str, hits: &mut [u64; 10]) {
        for token in tokenize(text) {
            for &emotion in self.lexicon.emotions_for(&token) {
                hits[emotion as usize] += 1;
            }
        }
    }
}

impl EmotionScorer for LexiconScorer {
    fn score(&self, tweets: &[Tweet]) -> EmotionRecord {
        let mut hits_by_day: BTreeMap<NaiveDate, [u64; 10]> = BTreeMap::new();
        for tweet in tweets {
            let hits = hits_by_day.entry(tweet.date).or_insert([0; 10]);
            self.count_hits(&tweet.text, hits);
        }

        let record: EmotionRecord = hits_by_day
            .into_iter()
            .map(|(date, hits)| (date, frequencies(&hits)))
            .collect();
        log::debug!("Scored {} tweets into {} days", tweets.len(), record.len());
        record
    }
}

fn frequencies(hits: &[u64; 10]) -> EmotionScores {
    let total: u64 = hits.iter().sum();
    if total == 0 {
        return EmotionScores::default();
    }
    EmotionScores::from_pairs(
        Emotion::ALL
            .into_iter()
            .map(|e| (e, hits[e as usize] as f64 / total as f64)),
    )
}

/// Lowercase alphabetic runs; everything else separates words.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

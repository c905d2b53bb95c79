use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::dates::DateRange;
use super::series::AlignedSeries;
use crate::error::{DateRangeError, SeriesError};

// ---------------------------------------------------------------------------
// Emotion – the ten NRC emotion categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Emotion {
    Anger,
    Anticipation,
    Disgust,
    Fear,
    Joy,
    Negative,
    Positive,
    Sadness,
    Surprise,
    Trust,
}

impl Emotion {
    /// All categories in chart order.
    pub const ALL: [Emotion; 10] = [
        Emotion::Anger,
        Emotion::Anticipation,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Joy,
        Emotion::Negative,
        Emotion::Positive,
        Emotion::Sadness,
        Emotion::Surprise,
        Emotion::Trust,
    ];

    /// Lowercase label as used in lexicons and the emotion index header.
    pub fn label(self) -> &'static str {
        match self {
            Emotion::Anger => "anger",
            Emotion::Anticipation => "anticipation",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Joy => "joy",
            Emotion::Negative => "negative",
            Emotion::Positive => "positive",
            Emotion::Sadness => "sadness",
            Emotion::Surprise => "surprise",
            Emotion::Trust => "trust",
        }
    }

    /// Capitalized name shown in the legend.
    pub fn display_name(self) -> &'static str {
        match self {
            Emotion::Anger => "Anger",
            Emotion::Anticipation => "Anticipation",
            Emotion::Disgust => "Disgust",
            Emotion::Fear => "Fear",
            Emotion::Joy => "Joy",
            Emotion::Negative => "Negative",
            Emotion::Positive => "Positive",
            Emotion::Sadness => "Sadness",
            Emotion::Surprise => "Surprise",
            Emotion::Trust => "Trust",
        }
    }
}

impl FromStr for Emotion {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Emotion::ALL
            .into_iter()
            .find(|e| e.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SeriesError::UnknownEmotion(s.to_string()))
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// EmotionScores – one day's emotion index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EmotionScores {
    pub anger: f64,
    pub anticipation: f64,
    pub disgust: f64,
    pub fear: f64,
    pub joy: f64,
    pub negative: f64,
    pub positive: f64,
    pub sadness: f64,
    pub surprise: f64,
    pub trust: f64,
}

impl EmotionScores {
    pub fn get(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Anger => self.anger,
            Emotion::Anticipation => self.anticipation,
            Emotion::Disgust => self.disgust,
            Emotion::Fear => self.fear,
            Emotion::Joy => self.joy,
            Emotion::Negative => self.negative,
            Emotion::Positive => self.positive,
            Emotion::Sadness => self.sadness,
            Emotion::Surprise => self.surprise,
            Emotion::Trust => self.trust,
        }
    }

    pub fn get_mut(&mut self, emotion: Emotion) -> &mut f64 {
        match emotion {
            Emotion::Anger => &mut self.anger,
            Emotion::Anticipation => &mut self.anticipation,
            Emotion::Disgust => &mut self.disgust,
            Emotion::Fear => &mut self.fear,
            Emotion::Joy => &mut self.joy,
            Emotion::Negative => &mut self.negative,
            Emotion::Positive => &mut self.positive,
            Emotion::Sadness => &mut self.sadness,
            Emotion::Surprise => &mut self.surprise,
            Emotion::Trust => &mut self.trust,
        }
    }

    /// Build from `(emotion, score)` pairs; unspecified emotions are zero.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Emotion, f64)>) -> Self {
        let mut scores = Self::default();
        for (emotion, value) in pairs {
            *scores.get_mut(emotion) = value;
        }
        scores
    }
}

// ---------------------------------------------------------------------------
// EmotionRecord – date → EmotionScores, ascending by date
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmotionRecord {
    days: BTreeMap<NaiveDate, EmotionScores>,
}

impl EmotionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a day, returning the scores it replaced.
    pub fn insert(&mut self, date: NaiveDate, scores: EmotionScores) -> Option<EmotionScores> {
        self.days.insert(date, scores)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&EmotionScores> {
        self.days.get(&date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &EmotionScores)> + '_ {
        self.days.iter().map(|(d, s)| (*d, s))
    }

    /// One emotion's score for every recorded day, in date order.
    pub fn emotion_by_day(&self, emotion: Emotion) -> Vec<f64> {
        self.days.values().map(|s| s.get(emotion)).collect()
    }

    /// Like [`Self::emotion_by_day`] but keyed by label; unknown labels fail.
    pub fn emotion_by_label(&self, label: &str) -> Result<Vec<f64>, SeriesError> {
        let emotion: Emotion = label.parse()?;
        Ok(self.emotion_by_day(emotion))
    }

    pub fn series(&self, emotion: Emotion) -> AlignedSeries {
        self.iter().map(|(d, s)| (d, s.get(emotion))).collect()
    }

    /// The emotion's series restricted to days inside `range`.
    pub fn series_within(&self, emotion: Emotion, range: &DateRange) -> AlignedSeries {
        self.days
            .range(range.start()..=range.end())
            .map(|(d, s)| (*d, s.get(emotion)))
            .collect()
    }

    /// Range spanned by the earliest and latest recorded days.
    pub fn date_range(&self) -> Result<DateRange, DateRangeError> {
        match (self.days.keys().next(), self.days.keys().next_back()) {
            (Some(&start), Some(&end)) if start != end => DateRange::new(start, end),
            _ => Err(DateRangeError::TooFewDays(self.len())),
        }
    }
}

impl FromIterator<(NaiveDate, EmotionScores)> for EmotionRecord {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, EmotionScores)>>(iter: I) -> Self {
        Self {
            days: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dates::parse_twint_date;

    fn d(s: &str) -> NaiveDate {
        parse_twint_date(s).unwrap()
    }

    fn stub_record() -> EmotionRecord {
        [
            ("2020-04-01", 0.2, 0.7),
            ("2020-04-02", 0.5, 0.1),
            ("2020-04-03", 0.1, 0.3),
        ]
        .into_iter()
        .map(|(day, joy, fear)| {
            (
                d(day),
                EmotionScores::from_pairs([(Emotion::Joy, joy), (Emotion::Fear, fear)]),
            )
        })
        .collect()
    }

    #[test]
    fn labels_parse_back_to_emotions() {
        for emotion in Emotion::ALL {
            assert_eq!(emotion.label().parse::<Emotion>().unwrap(), emotion);
        }
        assert_eq!("Joy".parse::<Emotion>().unwrap(), Emotion::Joy);
        assert_eq!(Emotion::Anticipation.display_name(), "Anticipation");
    }

    #[test]
    fn emotion_by_label_returns_scores_in_date_order() {
        let record = stub_record();
        assert_eq!(record.emotion_by_label("joy").unwrap(), vec![0.2, 0.5, 0.1]);
        assert_eq!(record.emotion_by_day(Emotion::Fear), vec![0.7, 0.1, 0.3]);
    }

    #[test]
    fn absent_label_fails_instead_of_defaulting() {
        let record = stub_record();
        assert_eq!(
            record.emotion_by_label("happiness"),
            Err(SeriesError::UnknownEmotion("happiness".into()))
        );
        assert!(record.emotion_by_label("").is_err());
    }

    #[test]
    fn series_rezips_to_original_scores() {
        let record = stub_record();
        for emotion in Emotion::ALL {
            let series = record.series(emotion);
            assert_eq!(series.values, record.emotion_by_day(emotion));
            for (date, value) in series.iter() {
                assert_eq!(record.get(date).unwrap().get(emotion), value);
            }
        }
    }

    #[test]
    fn series_within_clips_to_range() {
        let record = stub_record();
        let range = DateRange::new(d("2020-04-02"), d("2020-04-10")).unwrap();
        let series = record.series_within(Emotion::Joy, &range);
        assert_eq!(series.dates, vec![d("2020-04-02"), d("2020-04-03")]);
        assert_eq!(series.values, vec![0.5, 0.1]);
    }

    #[test]
    fn date_range_spans_min_and_max() {
        let range = stub_record().date_range().unwrap();
        assert_eq!(range.start(), d("2020-04-01"));
        assert_eq!(range.end(), d("2020-04-03"));

        let single: EmotionRecord = [(d("2020-04-01"), EmotionScores::default())]
            .into_iter()
            .collect();
        assert_eq!(single.date_range(), Err(DateRangeError::TooFewDays(1)));
    }
}

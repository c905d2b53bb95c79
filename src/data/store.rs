use std::io::{Read, Write};
use std::path::Path;

use super::dates::{parse_twint_date, to_twint};
use super::emotion::{Emotion, EmotionRecord, EmotionScores};
use crate::error::StoreError;

/// Default location of the persisted emotion index.
pub const DEFAULT_EMOTION_INDEX: &str = "tweet_emotional_index.csv";

// ---------------------------------------------------------------------------
// Persisted emotion index
// ---------------------------------------------------------------------------

/// Layout: `date,anger,anticipation,…,trust`, one row per day, twint dates.
/// Column order in the file does not matter on read; every emotion must be present.
pub fn load_emotion_index(path: &Path) -> Result<EmotionRecord, StoreError> {
    let file = std::fs::File::open(path)?;
    let record = read_emotion_index(file)?;
    log::info!(
        "Loaded emotion index for {} days from {}",
        record.len(),
        path.display()
    );
    Ok(record)
}

pub fn read_emotion_index<R: Read>(input: R) -> Result<EmotionRecord, StoreError> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let date_idx = position("date").ok_or(StoreError::MissingDateColumn)?;
    let emotion_cols = Emotion::ALL
        .into_iter()
        .map(|e| position(e.label()).map(|i| (e, i)).ok_or(StoreError::MissingColumn(e)))
        .collect::<Result<Vec<(Emotion, usize)>, StoreError>>()?;

    let mut record = EmotionRecord::new();
    for (row, result) in reader.records().enumerate() {
        let line = result?;
        let date = parse_twint_date(line.get(date_idx).unwrap_or(""))
            .map_err(|source| StoreError::BadDate { row, source })?;

        let mut scores = EmotionScores::default();
        for &(emotion, idx) in &emotion_cols {
            let cell = line.get(idx).unwrap_or("").trim();
            *scores.get_mut(emotion) = cell.parse().map_err(|_| StoreError::BadScore {
                row,
                column: emotion.label().to_string(),
                value: cell.to_string(),
            })?;
        }

        if record.insert(date, scores).is_some() {
            return Err(StoreError::DuplicateDate { row, date });
        }
    }
    Ok(record)
}

pub fn save_emotion_index(path: &Path, record: &EmotionRecord) -> Result<(), StoreError> {
    let file = std::fs::File::create(path)?;
    write_emotion_index(file, record)?;
    log::info!(
        "Saved emotion index for {} days to {}",
        record.len(),
        path.display()
    );
    Ok(())
}

pub fn write_emotion_index<W: Write>(output: W, record: &EmotionRecord) -> Result<(), StoreError> {
    let mut writer = csv::Writer::from_writer(output);

    let mut header = vec!["date"];
    header.extend(Emotion::ALL.iter().map(|e| e.label()));
    writer.write_record(&header)?;

    for (date, scores) in record.iter() {
        let mut row = vec![to_twint(date)];
        row.extend(Emotion::ALL.iter().map(|&e| scores.get(e).to_string()));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "date,anger,anticipation,disgust,fear,joy,negative,positive,sadness,surprise,trust";

    #[test]
    fn reads_rows_in_date_order() {
        let csv = format!(
            "{HEADER}\n\
             2020-04-02,0,0,0,0,0.5,0,0,0,0,0\n\
             2020-04-01,0.1,0,0,0,0.2,0,0,0,0,0.7\n"
        );
        let record = read_emotion_index(csv.as_bytes()).unwrap();
        assert_eq!(record.emotion_by_day(Emotion::Joy), vec![0.2, 0.5]);
        assert_eq!(record.emotion_by_day(Emotion::Trust), vec![0.7, 0.0]);
    }

    #[test]
    fn missing_emotion_column_fails() {
        let csv = "date,anger,anticipation,disgust,fear,negative,positive,sadness,surprise,trust\n\
                   2020-04-01,0,0,0,0,0,0,0,0,0\n";
        let err = read_emotion_index(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::MissingColumn(Emotion::Joy)));
    }

    #[test]
    fn bad_cells_report_row_and_column() {
        let csv = format!("{HEADER}\n2020-04-01,0,0,0,0,high,0,0,0,0,0\n");
        let err = read_emotion_index(csv.as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "row 0, column 'joy': 'high' is not a number"
        );

        let csv = format!("{HEADER}\nyesterday,0,0,0,0,0,0,0,0,0,0\n");
        assert!(matches!(
            read_emotion_index(csv.as_bytes()),
            Err(StoreError::BadDate { row: 0, .. })
        ));
    }

    #[test]
    fn saved_index_reloads_identically() {
        let csv = format!(
            "{HEADER}\n\
             2020-04-01,0.1,0.05,0,0.2,0.25,0.1,0.1,0.05,0.05,0.1\n\
             2020-04-02,0,0,0,0,1,0,0,0,0,0\n"
        );
        let record = read_emotion_index(csv.as_bytes()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EMOTION_INDEX);
        save_emotion_index(&path, &record).unwrap();
        assert_eq!(load_emotion_index(&path).unwrap(), record);
    }
}

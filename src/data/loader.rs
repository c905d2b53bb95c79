use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::covid::CovidTable;
use super::dates::parse_twint_date;

/// Header of the first column in the statistic-per-row CSV layout.
const WIDE_LAYOUT_MARKER: &str = "header";
const DATE_COLUMN: &str = "date";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a COVID table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – one row per day (`date,cases,deaths,…`) or one row per
///                statistic (`header,2020-03-01,2020-03-02,…`)
/// * `.json`    – `[{ "date": "2020-03-01", "cases": 12, … }, …]`
/// * `.parquet` – a `date` column plus numeric statistic columns
pub fn load_covid_table(path: &Path) -> Result<CovidTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            read_covid_csv(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            parse_covid_json(&text)
        }
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading COVID data from {}", path.display()))?;

    log::info!(
        "Loaded {} days of COVID data with statistics {:?}",
        table.len(),
        table.statistics()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read either CSV layout. Empty cells become NaN.
pub fn read_covid_csv<R: Read>(input: R) -> Result<CovidTable> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() {
        bail!("CSV has no columns");
    }

    if headers[0] == WIDE_LAYOUT_MARKER {
        read_wide_csv(reader, &headers)
    } else {
        read_long_csv(reader, &headers)
    }
}

fn read_long_csv<R: Read>(mut reader: csv::Reader<R>, headers: &[String]) -> Result<CovidTable> {
    let date_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(DATE_COLUMN))
        .unwrap_or(0);

    let statistics: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_idx)
        .map(|(_, h)| h.clone())
        .collect();
    let mut table = CovidTable::new(statistics);

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let date = parse_twint_date(record.get(date_idx).unwrap_or(""))
            .with_context(|| format!("CSV row {row_no}"))?;

        let values = record
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_idx)
            .map(|(i, cell)| parse_cell(cell).with_context(|| format!("CSV row {row_no}, '{}'", headers[i])))
            .collect::<Result<Vec<f64>>>()?;

        table
            .insert_row(date, values)
            .with_context(|| format!("CSV row {row_no}"))?;
    }

    Ok(table)
}

/// Transposed layout: each row is a statistic, each remaining column a day.
fn read_wide_csv<R: Read>(mut reader: csv::Reader<R>, headers: &[String]) -> Result<CovidTable> {
    let dates = headers[1..]
        .iter()
        .map(|h| parse_twint_date(h).with_context(|| format!("CSV header '{h}'")))
        .collect::<Result<Vec<NaiveDate>>>()?;

    let mut statistics = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); dates.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let name = record.get(0).unwrap_or("").trim().to_string();
        if name.is_empty() {
            bail!("CSV row {row_no}: missing statistic name");
        }
        for (day_idx, column) in columns.iter_mut().enumerate() {
            let cell = record.get(day_idx + 1).unwrap_or("");
            column.push(parse_cell(cell).with_context(|| format!("CSV row {row_no} ({name})"))?);
        }
        statistics.push(name);
    }

    let mut table = CovidTable::new(statistics);
    for (date, values) in dates.into_iter().zip(columns) {
        table.insert_row(date, values)?;
    }
    Ok(table)
}

fn parse_cell(s: &str) -> Result<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(f64::NAN);
    }
    s.parse::<f64>()
        .with_context(|| format!("'{s}' is not a number"))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "date": "2020-03-01", "cases": 12, "deaths": 0 },
///   ...
/// ]
/// ```
///
/// Statistic names come from the first record.
pub fn parse_covid_json(text: &str) -> Result<CovidTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let statistics: Vec<String> = match records.first().and_then(|r| r.as_object()) {
        Some(first) => first
            .keys()
            .filter(|k| k.as_str() != DATE_COLUMN)
            .cloned()
            .collect(),
        None => Vec::new(),
    };
    let mut table = CovidTable::new(statistics.clone());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let date = obj
            .get(DATE_COLUMN)
            .and_then(|v| v.as_str())
            .with_context(|| format!("Row {i}: missing 'date' string"))?;
        let date = parse_twint_date(date).with_context(|| format!("Row {i}"))?;

        let values = statistics
            .iter()
            .map(|name| match obj.get(name) {
                Some(JsonValue::Null) | None => Ok(f64::NAN),
                Some(v) => v
                    .as_f64()
                    .with_context(|| format!("Row {i}, '{name}': not a number")),
            })
            .collect::<Result<Vec<f64>>>()?;

        table
            .insert_row(date, values)
            .with_context(|| format!("Row {i}"))?;
    }

    Ok(table)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing daily COVID statistics.
///
/// Expected schema:
/// - `date`: Utf8 / LargeUtf8 (`YYYY-MM-DD`) or Date32
/// - numeric columns (Int32, Int64, Float32, Float64) – one statistic each
/// - anything else is skipped
fn load_parquet(path: &Path) -> Result<CovidTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let schema = builder.schema().clone();
    let date_idx = schema
        .index_of(DATE_COLUMN)
        .map_err(|_| anyhow::anyhow!("Parquet file missing 'date' column"))?;

    // Numeric statistic columns, in schema order
    let stat_cols: Vec<(usize, String)> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_idx)
        .filter_map(|(i, f)| match f.data_type() {
            DataType::Int32 | DataType::Int64 | DataType::Float32 | DataType::Float64 => {
                Some((i, f.name().clone()))
            }
            other => {
                log::warn!("Skipping non-numeric column '{}' ({other:?})", f.name());
                None
            }
        })
        .collect();

    let mut table = CovidTable::new(stat_cols.iter().map(|(_, n)| n.clone()).collect());
    let reader = builder.build().context("building parquet reader")?;

    // Row numbers in errors count from the start of the file, not the batch.
    let mut offset = 0;
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let date_col = batch.column(date_idx);

        for row in 0..batch.num_rows() {
            let file_row = offset + row;
            let date = extract_date(date_col, row).with_context(|| format!("Row {file_row}"))?;
            let values = stat_cols
                .iter()
                .map(|(col_idx, _)| extract_f64(batch.column(*col_idx), row))
                .collect();
            table
                .insert_row(date, values)
                .with_context(|| format!("Row {file_row}"))?;
        }
        offset += batch.num_rows();
    }

    Ok(table)
}

// -- Parquet / Arrow helpers --

fn extract_date(col: &Arc<dyn Array>, row: usize) -> Result<NaiveDate> {
    if col.is_null(row) {
        bail!("null date");
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(parse_twint_date(arr.value(row))?)
        }
        DataType::LargeUtf8 => Ok(parse_twint_date(col.as_string::<i64>().value(row))?),
        DataType::Date32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Date32Array>()
                .context("expected Date32Array")?;
            arr.value_as_date(row).context("date out of range")
        }
        other => bail!("Expected Utf8 or Date32 date column, got {other:?}"),
    }
}

/// Numeric cell as `f64`; nulls and unexpected types become NaN.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> f64 {
    if col.is_null(row) {
        return f64::NAN;
    }
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        arr.value(row)
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        arr.value(row) as f64
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        arr.value(row) as f64
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        arr.value(row) as f64
    } else {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dates::DateRange;
    use arrow::array::{ArrayRef, LargeStringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use std::io::Write;

    fn d(s: &str) -> NaiveDate {
        parse_twint_date(s).unwrap()
    }

    #[test]
    fn long_csv_uses_date_column() {
        let csv = "cases,date,deaths\n10,2020-03-01,0\n12,2020-03-02,\n";
        let table = read_covid_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.statistics(), ["cases", "deaths"]);
        assert_eq!(table.value(d("2020-03-02"), "cases"), Ok(12.0));
        assert!(table.value(d("2020-03-02"), "deaths").unwrap().is_nan());
    }

    #[test]
    fn wide_csv_is_transposed() {
        let csv = "header,2020-03-01,2020-03-02\ncases,10,12\ndeaths,0,1\n";
        let table = read_covid_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.statistics(), ["cases", "deaths"]);

        let range = DateRange::new(d("2020-03-01"), d("2020-03-02")).unwrap();
        assert_eq!(table.series(&range, "deaths").unwrap().values, vec![0.0, 1.0]);
        assert_eq!(table.series(&range, "cases").unwrap().values, vec![10.0, 12.0]);
    }

    #[test]
    fn csv_rejects_non_numeric_cells_and_bad_dates() {
        assert!(read_covid_csv("date,cases\n2020-03-01,lots\n".as_bytes()).is_err());
        assert!(read_covid_csv("date,cases\n03/01/2020,1\n".as_bytes()).is_err());
        assert!(read_covid_csv("date,cases\n2020-03-01,1\n2020-03-01,2\n".as_bytes()).is_err());
    }

    #[test]
    fn json_records_with_nulls() {
        let json = r#"[
            {"date": "2020-03-01", "cases": 10, "deaths": null},
            {"date": "2020-03-02", "cases": 12.5, "deaths": 1}
        ]"#;
        let table = parse_covid_json(json).unwrap();
        assert_eq!(table.statistics(), ["cases", "deaths"]);
        assert_eq!(table.value(d("2020-03-02"), "cases"), Ok(12.5));
        assert!(table.value(d("2020-03-01"), "deaths").unwrap().is_nan());
    }

    #[test]
    fn json_keeps_column_order_of_first_record() {
        let json = r#"[{"date": "2020-03-01", "zeta_deaths": 1, "alpha_cases": 2}]"#;
        let table = parse_covid_json(json).unwrap();
        assert_eq!(table.statistics(), ["zeta_deaths", "alpha_cases"]);
        assert_eq!(table.value(d("2020-03-01"), "alpha_cases"), Ok(2.0));
    }

    // -- Parquet --

    fn epoch_days(s: &str) -> i32 {
        (d(s) - NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()).num_days() as i32
    }

    /// Write `batches` (sharing one schema) to a temporary `.parquet` file.
    fn write_parquet(batches: &[RecordBatch]) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer =
            ArrowWriter::try_new(file.reopen().unwrap(), batches[0].schema(), None).unwrap();
        for batch in batches {
            writer.write(batch).unwrap();
        }
        writer.close().unwrap();
        file
    }

    /// `date` column of the given array, nullable `cases`, a text column and `rate`.
    fn covid_batch(dates: ArrayRef, cases: Vec<Option<i64>>) -> RecordBatch {
        let n = cases.len();
        let schema = Arc::new(Schema::new(vec![
            Field::new("date", dates.data_type().clone(), false),
            Field::new("cases", DataType::Int64, true),
            Field::new("region", DataType::Utf8, false),
            Field::new("rate", DataType::Float32, false),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                dates,
                Arc::new(Int64Array::from(cases)),
                Arc::new(StringArray::from(vec!["US"; n])),
                Arc::new(Float32Array::from(vec![0.5; n])),
            ],
        )
        .unwrap()
    }

    fn assert_loaded(table: &CovidTable) {
        assert_eq!(table.dates().collect::<Vec<_>>(), [d("2020-03-01"), d("2020-03-02")]);
        assert_eq!(table.statistics(), ["cases", "rate"]);
        assert_eq!(table.value(d("2020-03-01"), "cases"), Ok(5.0));
        assert!(table.value(d("2020-03-02"), "cases").unwrap().is_nan());
        assert_eq!(table.value(d("2020-03-02"), "rate"), Ok(0.5));
    }

    #[test]
    fn parquet_accepts_each_date_type() {
        let cases = vec![Some(5), None];
        let utf8: ArrayRef = Arc::new(StringArray::from(vec!["2020-03-01", "2020-03-02"]));
        let large: ArrayRef = Arc::new(LargeStringArray::from(vec!["2020-03-01", "2020-03-02"]));
        let date32: ArrayRef = Arc::new(Date32Array::from(vec![
            epoch_days("2020-03-01"),
            epoch_days("2020-03-02"),
        ]));

        for dates in [utf8, large, date32] {
            let file = write_parquet(&[covid_batch(dates, cases.clone())]);
            assert_loaded(&load_covid_table(file.path()).unwrap());
        }
    }

    #[test]
    fn parquet_errors_report_file_row() {
        let first: ArrayRef = Arc::new(StringArray::from(vec!["2020-03-01", "2020-03-02"]));
        let second: ArrayRef = Arc::new(StringArray::from(vec!["2020-03-03", "2020-03-02"]));
        let file = write_parquet(&[
            covid_batch(first, vec![Some(1), Some(2)]),
            covid_batch(second, vec![Some(3), Some(4)]),
        ]);

        let err = load_covid_table(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Row 3"), "{err:#}");
    }

    #[test]
    fn parquet_without_date_column_fails() {
        let schema = Arc::new(Schema::new(vec![Field::new("cases", DataType::Int64, false)]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![1]))]).unwrap();
        let file = write_parquet(&[batch]);

        let err = load_covid_table(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("missing 'date' column"));
    }

    #[test]
    fn load_dispatches_on_extension() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "date,cases\n2020-03-01,4\n").unwrap();
        let table = load_covid_table(file.path()).unwrap();
        assert_eq!(table.len(), 1);

        let other = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let err = load_covid_table(other.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }
}

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use chrono::NaiveDate;

use super::dates::DateRange;
use super::series::AlignedSeries;
use crate::error::SeriesError;

// ---------------------------------------------------------------------------
// CovidTable – date-keyed rows with named statistic columns
// ---------------------------------------------------------------------------

/// COVID statistics keyed by day. Every row holds one value per statistic,
/// positionally matching [`CovidTable::statistics`]. Blank cells are NaN.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CovidTable {
    statistics: Vec<String>,
    rows: BTreeMap<NaiveDate, Vec<f64>>,
}

impl CovidTable {
    pub fn new(statistics: Vec<String>) -> Self {
        Self {
            statistics,
            rows: BTreeMap::new(),
        }
    }

    /// Add one day. The row must have one value per statistic and the date must be new.
    pub fn insert_row(&mut self, date: NaiveDate, values: Vec<f64>) -> Result<()> {
        if values.len() != self.statistics.len() {
            bail!(
                "{date}: expected {} values, got {}",
                self.statistics.len(),
                values.len()
            );
        }
        if self.rows.contains_key(&date) {
            bail!("duplicate row for {date}");
        }
        self.rows.insert(date, values);
        Ok(())
    }

    /// Statistic (column) names in dataset order.
    pub fn statistics(&self) -> &[String] {
        &self.statistics
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    fn column(&self, statistic: &str) -> Result<usize, SeriesError> {
        self.statistics
            .iter()
            .position(|s| s == statistic)
            .ok_or_else(|| SeriesError::UnknownStatistic(statistic.to_string()))
    }

    pub fn value(&self, date: NaiveDate, statistic: &str) -> Result<f64, SeriesError> {
        let col = self.column(statistic)?;
        self.rows
            .get(&date)
            .map(|row| row[col])
            .ok_or(SeriesError::MissingDate(date))
    }

    /// One statistic for every day of `range`, aligned to `range.days()`.
    /// Any day without a row is an error.
    pub fn series(&self, range: &DateRange, statistic: &str) -> Result<AlignedSeries, SeriesError> {
        let col = self.column(statistic)?;
        let mut series = AlignedSeries::with_capacity(range.num_days());
        for date in range.days() {
            let row = self.rows.get(&date).ok_or(SeriesError::MissingDate(date))?;
            series.push(date, row[col]);
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dates::parse_twint_date;

    fn d(s: &str) -> NaiveDate {
        parse_twint_date(s).unwrap()
    }

    fn stub_table() -> CovidTable {
        let mut table = CovidTable::new(vec!["cases".into(), "deaths".into()]);
        table.insert_row(d("2020-04-01"), vec![100.0, 3.0]).unwrap();
        table.insert_row(d("2020-04-02"), vec![140.0, 5.0]).unwrap();
        table.insert_row(d("2020-04-03"), vec![180.0, 9.0]).unwrap();
        table
    }

    #[test]
    fn series_is_aligned_to_range() {
        let table = stub_table();
        let range = DateRange::new(d("2020-04-02"), d("2020-04-03")).unwrap();

        let cases = table.series(&range, "cases").unwrap();
        let deaths = table.series(&range, "deaths").unwrap();

        let expected_dates: Vec<NaiveDate> = range.days().collect();
        assert_eq!(cases.dates, expected_dates);
        assert_eq!(cases.values, vec![140.0, 180.0]);
        assert_eq!(deaths.dates, expected_dates);
        assert_eq!(deaths.values, vec![5.0, 9.0]);
    }

    #[test]
    fn missing_day_is_an_error() {
        let table = stub_table();
        let range = DateRange::new(d("2020-04-02"), d("2020-04-05")).unwrap();
        assert_eq!(
            table.series(&range, "cases"),
            Err(SeriesError::MissingDate(d("2020-04-04")))
        );
    }

    #[test]
    fn unknown_statistic_is_an_error() {
        let table = stub_table();
        let range = DateRange::new(d("2020-04-01"), d("2020-04-02")).unwrap();
        assert_eq!(
            table.series(&range, "recovered"),
            Err(SeriesError::UnknownStatistic("recovered".into()))
        );
        assert_eq!(table.value(d("2020-04-01"), "deaths"), Ok(3.0));
    }

    #[test]
    fn insert_row_checks_width_and_duplicates() {
        let mut table = stub_table();
        assert!(table.insert_row(d("2020-04-09"), vec![1.0]).is_err());
        assert!(table.insert_row(d("2020-04-01"), vec![1.0, 2.0]).is_err());
        assert_eq!(table.len(), 3);
    }
}

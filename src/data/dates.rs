use chrono::{Days, NaiveDate};

use crate::error::DateRangeError;

// ---------------------------------------------------------------------------
// Twint date format
// ---------------------------------------------------------------------------

/// Date format used by twint exports and the persisted emotion index.
pub const TWINT_DATE_FORMAT: &str = "%Y-%m-%d";

/// First day covered by the tweet and COVID datasets.
pub fn dataset_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 3, 1).unwrap_or(NaiveDate::MIN)
}

/// Format a date the way the tweet source expects it.
pub fn to_twint(date: NaiveDate) -> String {
    date.format(TWINT_DATE_FORMAT).to_string()
}

/// Parse a twint date string (`2020-03-01`).
pub fn parse_twint_date(s: &str) -> Result<NaiveDate, DateRangeError> {
    NaiveDate::parse_from_str(s.trim(), TWINT_DATE_FORMAT)
        .map_err(|_| DateRangeError::Malformed(s.to_string()))
}

// ---------------------------------------------------------------------------
// DateRange – validated (start, end) pair
// ---------------------------------------------------------------------------

/// An inclusive range of calendar days with `epoch <= start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        let epoch = dataset_epoch();
        if start < epoch {
            return Err(DateRangeError::BeforeEpoch { date: start, epoch });
        }
        if start >= end {
            return Err(DateRangeError::NotIncreasing { start, end });
        }
        Ok(Self { start, end })
    }

    /// Reject ranges that reach today or later; tweets for those days are incomplete.
    pub fn ensure_before(self, today: NaiveDate) -> Result<Self, DateRangeError> {
        if self.end >= today {
            return Err(DateRangeError::InFuture {
                end: self.end,
                today,
            });
        }
        Ok(self)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range, both ends included.
    pub fn num_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every calendar day from `start` to `end` inclusive, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.num_days() as u64).filter_map(move |n| self.start.checked_add_days(Days::new(n)))
    }

    /// The expanded range in twint format.
    pub fn twint_dates(&self) -> Vec<String> {
        self.days().map(to_twint).collect()
    }
}

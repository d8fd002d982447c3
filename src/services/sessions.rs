//! Фильтрация сеансов и разбор времени показа.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Фильтр списка сеансов. Пустые поля не ограничивают выборку, заполненные
/// объединяются через AND.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionFilter {
    pub date: Option<NaiveDate>,
    pub movie_id: Option<i64>,
    /// Зона, в которой `date` сравнивается с `show_time`
    pub time_zone: Tz,
}

impl SessionFilter {
    pub fn new(time_zone: Tz) -> Self {
        Self { date: None, movie_id: None, time_zone }
    }

    /// Собирает фильтр из сырых query-параметров. Некорректные значения
    /// игнорируются.
    pub fn from_query(date: Option<&str>, movie: Option<&str>, time_zone: Tz) -> Self {
        let date = date.filter(|s| !s.is_empty()).and_then(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| debug!("ignoring malformed date filter {:?}: {}", s, e))
                .ok()
        });
        let movie_id = movie.filter(|s| !s.is_empty()).and_then(|s| {
            s.parse::<i64>()
                .map_err(|e| debug!("ignoring malformed movie filter {:?}: {}", s, e))
                .ok()
        });

        Self { date, movie_id, time_zone }
    }

    pub fn matches(&self, show_time: DateTime<Utc>, movie_id: i64) -> bool {
        if let Some(date) = self.date {
            if local_date(show_time, self.time_zone) != date {
                return false;
            }
        }
        if let Some(id) = self.movie_id {
            if id != movie_id {
                return false;
            }
        }
        true
    }
}

pub fn local_date(show_time: DateTime<Utc>, time_zone: Tz) -> NaiveDate {
    show_time.with_timezone(&time_zone).date_naive()
}

/// RFC 3339 берется как есть, время без смещения трактуется в `time_zone`.
pub fn parse_show_time(raw: &str, time_zone: Tz) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| time_zone.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
}

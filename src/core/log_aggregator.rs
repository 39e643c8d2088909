use crate::domain::model::{FuelLogEntry, TripLogEntry};
use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// A persisted record that can be grouped by month.
pub trait LogEntry {
    fn created_at(&self) -> Option<&str>;
    fn cost(&self) -> f64;
    fn liters(&self) -> f64;
    fn distance_km(&self) -> f64 {
        0.0
    }
}

impl LogEntry for FuelLogEntry {
    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    fn cost(&self) -> f64 {
        self.total_cost
    }

    fn liters(&self) -> f64 {
        self.liters
    }
}

impl LogEntry for TripLogEntry {
    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    fn cost(&self) -> f64 {
        self.fuel_cost
    }

    fn liters(&self) -> f64 {
        self.liters_needed
    }

    fn distance_km(&self) -> f64 {
        self.distance_km
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGroup<T> {
    /// `YYYY-MM`
    pub key: String,
    pub label: String,
    /// Most recent first.
    pub items: Vec<T>,
    pub total_entries: usize,
    pub total_cost: f64,
    pub total_liters: f64,
    pub total_distance_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LogTotals {
    pub total_entries: usize,
    pub total_cost: f64,
    pub total_liters: f64,
    pub total_distance_km: f64,
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (read as wall time in `tz`) and bare dates.
pub fn parse_created_at<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(tz));
    }
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        // Wall time skipped by a DST jump: move past the gap instead of dropping it.
        LocalResult::None => {
            let shifted = naive.checked_add_signed(Duration::hours(1))?;
            tz.from_local_datetime(&shifted).earliest()
        }
    }
}

fn month_label(key: &str) -> String {
    NaiveDate::parse_from_str(&format!("{}-01", key), "%Y-%m-%d")
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|_| key.to_string())
}

/// Groups records by calendar month of `createdAt` in local time.
pub fn group_by_month<T: LogEntry + Clone>(records: &[T]) -> Vec<MonthGroup<T>> {
    group_by_month_in(records, &Local)
}

/// Same as [`group_by_month`] with an explicit time zone.
///
/// Records without a parsable `createdAt` are skipped and count nowhere.
pub fn group_by_month_in<T, Tz>(records: &[T], tz: &Tz) -> Vec<MonthGroup<T>>
where
    T: LogEntry + Clone,
    Tz: TimeZone,
{
    let mut buckets: BTreeMap<String, Vec<(DateTime<Tz>, &T)>> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        let Some(created) = record.created_at().and_then(|raw| parse_created_at(raw, tz)) else {
            skipped += 1;
            continue;
        };
        let key = format!("{}-{:02}", created.year(), created.month());
        buckets.entry(key).or_default().push((created, record));
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} records without a valid createdAt", skipped);
    }

    buckets
        .into_iter()
        .rev()
        .map(|(key, mut dated)| {
            dated.sort_by(|a, b| b.0.cmp(&a.0));
            let items: Vec<T> = dated.into_iter().map(|(_, r)| r.clone()).collect();
            MonthGroup {
                label: month_label(&key),
                total_entries: items.len(),
                total_cost: items.iter().map(|r| finite_or_zero(r.cost())).sum(),
                total_liters: items.iter().map(|r| finite_or_zero(r.liters())).sum(),
                total_distance_km: items.iter().map(|r| finite_or_zero(r.distance_km())).sum(),
                items,
                key,
            }
        })
        .collect()
}

/// Global totals over the grouped (valid) records.
pub fn summarize<T>(groups: &[MonthGroup<T>]) -> LogTotals {
    groups.iter().fold(LogTotals::default(), |acc, g| LogTotals {
        total_entries: acc.total_entries + g.total_entries,
        total_cost: acc.total_cost + g.total_cost,
        total_liters: acc.total_liters + g.total_liters,
        total_distance_km: acc.total_distance_km + g.total_distance_km,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike, Utc};

    /// US Eastern for 2024 only: clocks jump from 02:00 to 03:00 on March 10.
    #[derive(Debug, Clone, Copy)]
    struct Eastern2024;

    impl Eastern2024 {
        fn est() -> FixedOffset {
            FixedOffset::west_opt(5 * 3600).unwrap()
        }

        fn edt() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }

        fn switch_day() -> NaiveDate {
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        }
    }

    impl TimeZone for Eastern2024 {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            Eastern2024
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let gap_start = Self::switch_day().and_hms_opt(2, 0, 0).unwrap();
            let gap_end = Self::switch_day().and_hms_opt(3, 0, 0).unwrap();
            if *local < gap_start {
                LocalResult::Single(Self::est())
            } else if *local < gap_end {
                LocalResult::None
            } else {
                LocalResult::Single(Self::edt())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::switch_day().and_hms_opt(7, 0, 0).unwrap() {
                Self::est()
            } else {
                Self::edt()
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        created_at: Option<String>,
        cost: f64,
        liters: f64,
        km: f64,
    }

    impl LogEntry for Entry {
        fn created_at(&self) -> Option<&str> {
            self.created_at.as_deref()
        }
        fn cost(&self) -> f64 {
            self.cost
        }
        fn liters(&self) -> f64 {
            self.liters
        }
        fn distance_km(&self) -> f64 {
            self.km
        }
    }

    fn entry(created_at: &str, cost: f64) -> Entry {
        Entry {
            created_at: Some(created_at.to_string()),
            cost,
            liters: cost / 50.0,
            km: 10.0,
        }
    }

    #[test]
    fn test_wall_time_in_dst_gap_is_kept() {
        let parsed = parse_created_at("2024-03-10 02:30:00", &Eastern2024).unwrap();
        assert_eq!((parsed.day(), parsed.hour(), parsed.minute()), (10, 3, 30));

        let records = vec![
            entry("2024-03-10 02:30:00", 100.0),
            entry("2024-03-11 02:30:00", 50.0),
        ];
        let groups = group_by_month_in(&records, &Eastern2024);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "2024-03");
        assert_eq!(groups[0].total_entries, 2);
        assert_eq!(groups[0].total_cost, 150.0);
        assert_eq!(groups[0].items[0].cost, 50.0);
    }

    #[test]
    fn test_groups_ordered_newest_first() {
        let records = vec![
            entry("2024-01-05T10:00:00Z", 100.0),
            entry("2024-01-20T10:00:00Z", 200.0),
            entry("2024-02-01T10:00:00Z", 300.0),
        ];
        let groups = group_by_month_in(&records, &Utc);

        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-02", "2024-01"]);

        let january = &groups[1];
        assert_eq!(january.total_entries, 2);
        assert_eq!(january.items[0].cost, 200.0);
        assert_eq!(january.items[1].cost, 100.0);
        assert_eq!(january.total_cost, 300.0);
        assert_eq!(january.total_distance_km, 20.0);
        assert_eq!(january.label, "January 2024");
        assert_eq!(groups[0].label, "February 2024");
    }

    #[test]
    fn test_invalid_dates_are_excluded_everywhere() {
        let records = vec![
            entry("2024-03-10 08:00:00", 100.0),
            entry("not a date", 999.0),
            Entry {
                created_at: None,
                cost: 555.0,
                liters: 1.0,
                km: 1.0,
            },
            entry("2023-12-31", 50.0),
        ];
        let groups = group_by_month_in(&records, &Utc);
        let totals = summarize(&groups);

        assert_eq!(totals.total_entries, 2);
        assert_eq!(totals.total_cost, 150.0);
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-03", "2023-12"]);
    }

    #[test]
    fn test_non_finite_values_count_as_zero() {
        let records = vec![
            Entry {
                created_at: Some("2024-05-01T00:00:00Z".to_string()),
                cost: f64::NAN,
                liters: f64::INFINITY,
                km: 12.5,
            },
            entry("2024-05-02T00:00:00Z", 100.0),
        ];
        let groups = group_by_month_in(&records, &Utc);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].total_cost, 100.0);
        assert_eq!(groups[0].total_liters, 2.0);
        assert_eq!(groups[0].total_distance_km, 22.5);
    }

    #[test]
    fn test_month_key_uses_given_time_zone() {
        let manila = FixedOffset::east_opt(8 * 3600).unwrap();
        let records = vec![entry("2024-01-31T20:00:00Z", 10.0)];

        assert_eq!(group_by_month_in(&records, &Utc)[0].key, "2024-01");
        assert_eq!(group_by_month_in(&records, &manila)[0].key, "2024-02");
    }

    #[test]
    fn test_group_sums_match_input_sums() {
        let records: Vec<Entry> = (1..=28)
            .map(|day| entry(&format!("2024-{:02}-{:02}T12:00:00Z", day % 5 + 1, day), day as f64))
            .collect();
        let groups = group_by_month_in(&records, &Utc);
        let totals = summarize(&groups);

        let expected: f64 = records.iter().map(|r| r.cost).sum();
        assert_eq!(totals.total_entries, records.len());
        assert!((totals.total_cost - expected).abs() < 1e-9);
        assert_eq!(
            groups.iter().map(|g| g.items.len()).sum::<usize>(),
            records.len()
        );
    }

    #[test]
    fn test_grouping_is_idempotent() {
        let records = vec![
            entry("2024-01-05T10:00:00Z", 100.0),
            entry("2024-02-01T10:00:00Z", 300.0),
            entry("bogus", 1.0),
        ];
        let snapshot = records.clone();
        let first = group_by_month_in(&records, &Utc);
        let second = group_by_month_in(&records, &Utc);
        assert_eq!(first, second);
        assert_eq!(records, snapshot);
    }

    #[test]
    fn test_empty_input() {
        let groups = group_by_month::<Entry>(&[]);
        assert!(groups.is_empty());
        assert_eq!(summarize(&groups), LogTotals::default());
    }

    #[test]
    fn test_parse_created_at_formats() {
        assert!(parse_created_at("2024-01-05T10:00:00+08:00", &Utc).is_some());
        assert!(parse_created_at("2024-01-05 10:00:00", &Utc).is_some());
        assert!(parse_created_at("2024-01-05 10:00:00.123", &Utc).is_some());
        assert!(parse_created_at("2024-01-05", &Utc).is_some());
        assert!(parse_created_at("", &Utc).is_none());
        assert!(parse_created_at("05/01/2024", &Utc).is_none());
    }
}

use crate::model::{CommitRecord, DateWindow, WeekBucket};
use chrono::{DateTime, Days, NaiveDate, Utc};

/// 1-based week of `timestamp` counted from `start`. Dates before `start`
/// clamp to week 1.
pub fn week_index(timestamp: &DateTime<Utc>, start: NaiveDate) -> u32 {
    let days = (timestamp.date_naive() - start).num_days().max(0);
    (days / 7) as u32 + 1
}

pub fn total_weeks(start: NaiveDate, end: NaiveDate) -> u32 {
    let days = (end - start).num_days().max(0);
    (days / 7) as u32 + 1
}

/// Every bucket of the window with a zero count. The last bucket ends on
/// the window's end date instead of running past it.
pub fn empty_buckets(window: &DateWindow) -> Vec<WeekBucket> {
    (1..=total_weeks(window.start, window.end))
        .map(|week| {
            let start = window.start + Days::new(u64::from(week - 1) * 7);
            let end = (start + Days::new(6)).min(window.end);
            WeekBucket {
                week,
                start,
                end,
                commit_count: 0,
            }
        })
        .collect()
}

/// Per-week commit counts across the whole window, zero-filled.
pub fn weekly_series<'a, I>(records: I, window: &DateWindow) -> Vec<WeekBucket>
where
    I: IntoIterator<Item = &'a CommitRecord>,
{
    let mut buckets = empty_buckets(window);
    for record in records {
        if !window.contains(&record.authored_at) {
            continue;
        }
        let idx = week_index(&record.authored_at, window.start) as usize - 1;
        if let Some(bucket) = buckets.get_mut(idx) {
            bucket.commit_count += 1;
        }
    }
    buckets
}

/// Counts only, indexed by `week - 1`.
pub fn weekly_counts<'a, I>(records: I, window: &DateWindow) -> Vec<u32>
where
    I: IntoIterator<Item = &'a CommitRecord>,
{
    weekly_series(records, window)
        .into_iter()
        .map(|b| b.commit_count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CommitContext;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn q1() -> DateWindow {
        DateWindow::new(date("2025-01-01"), date("2025-03-31")).unwrap()
    }

    fn record(sha: &str, at: &str) -> CommitRecord {
        CommitRecord {
            sha: sha.to_string(),
            authored_at: ts(at),
            message: "msg".to_string(),
            url: String::new(),
            repo: "acme/app".to_string(),
            context: CommitContext::branch("main"),
            contributor: "alice".to_string(),
        }
    }

    #[test]
    fn quarter_has_thirteen_weeks() {
        assert_eq!(total_weeks(date("2025-01-01"), date("2025-03-31")), 13);
        assert_eq!(total_weeks(date("2025-01-01"), date("2025-01-01")), 1);
        assert_eq!(total_weeks(date("2025-01-01"), date("2025-01-08")), 2);
    }

    #[test]
    fn week_index_uses_calendar_days() {
        let start = date("2025-01-01");
        assert_eq!(week_index(&ts("2025-01-01T00:00:00Z"), start), 1);
        assert_eq!(week_index(&ts("2025-01-07T23:59:59Z"), start), 1);
        assert_eq!(week_index(&ts("2025-01-08T00:00:00Z"), start), 2);
        assert_eq!(week_index(&ts("2025-03-31T12:00:00Z"), start), 13);
    }

    #[test]
    fn dates_before_start_clamp_to_week_one() {
        assert_eq!(week_index(&ts("2024-12-20T08:00:00Z"), date("2025-01-01")), 1);
    }

    #[test]
    fn buckets_partition_the_window_and_clamp_the_last() {
        let buckets = empty_buckets(&q1());

        assert_eq!(buckets.len(), 13);
        assert_eq!((buckets[0].start, buckets[0].end), (date("2025-01-01"), date("2025-01-07")));
        assert_eq!(buckets[12].start, date("2025-03-26"));
        assert_eq!(buckets[12].end, date("2025-03-31"));
        for pair in buckets.windows(2) {
            assert_eq!(pair[0].end.succ_opt().unwrap(), pair[1].start);
        }
    }

    #[test]
    fn empty_weeks_are_zero_filled() {
        let records = vec![
            record("a", "2025-01-02T09:00:00Z"),
            record("b", "2025-01-03T09:00:00Z"),
            record("c", "2025-03-30T09:00:00Z"),
        ];

        let series = weekly_series(&records, &q1());

        assert_eq!(series.len(), 13);
        assert_eq!(series[0].commit_count, 2);
        assert_eq!(series[1].commit_count, 0);
        assert_eq!(series[1].week, 2);
        assert_eq!(series[12].commit_count, 1);
        assert_eq!(weekly_counts(&records, &q1()).iter().sum::<u32>(), 3);
    }

    #[test]
    fn records_outside_the_window_are_not_counted() {
        let records = vec![record("x", "2024-12-31T23:00:00Z"), record("y", "2025-04-01T00:00:00Z")];
        assert!(weekly_series(&records, &q1()).iter().all(|b| b.commit_count == 0));
    }
}

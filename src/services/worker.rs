//! Folds worker clock records into per-worker man-hour rollups

use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::warn;

use super::classifier::{minutes_to_hours, Classification, TimeIntervalClassifier};
use super::collation::compare_names;
use crate::types::{ClockTime, LaborAggregate, SkippedRecord, WorkReport, WorkerRecord};

/// Output of one worker aggregation pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerAggregation {
    /// One row per worker, in Japanese name order
    pub labor: Vec<LaborAggregate>,
    /// Rows that contributed no hours
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Default, Clone, Copy)]
struct HourBuckets {
    normal: i64,
    overtime: i64,
    late_night: i64,
}

impl HourBuckets {
    fn add(&mut self, c: &Classification) {
        self.normal += c.normal_minutes;
        self.overtime += c.overtime_minutes;
        self.late_night += c.late_night_minutes;
    }
}

#[derive(Debug, Default)]
struct WorkerTally {
    weekday: HourBuckets,
    sunday: HourBuckets,
    travel_time: Decimal,
}

impl WorkerTally {
    fn into_aggregate(self, name: String) -> LaborAggregate {
        let mut row = LaborAggregate {
            name,
            weekday_normal: minutes_to_hours(self.weekday.normal),
            weekday_overtime: minutes_to_hours(self.weekday.overtime),
            weekday_late_night: minutes_to_hours(self.weekday.late_night),
            sunday_normal: minutes_to_hours(self.sunday.normal),
            sunday_overtime: minutes_to_hours(self.sunday.overtime),
            sunday_late_night: minutes_to_hours(self.sunday.late_night),
            travel_time: self.travel_time,
            ..Default::default()
        };
        row.recompute_subtotals();
        row
    }
}

/// Per-request worker aggregator
pub struct WorkerAggregator;

impl WorkerAggregator {
    pub fn aggregate(reports: &[WorkReport]) -> WorkerAggregation {
        let mut tallies: HashMap<String, WorkerTally> = HashMap::new();
        let mut skipped = Vec::new();

        for report in reports {
            for record in &report.worker_records {
                let name = record.name.trim();
                if name.is_empty() {
                    warn!(date = %report.date, "skipping worker record without a name");
                    skipped.push(SkippedRecord {
                        date: report.date,
                        worker: String::new(),
                        reason: "missing worker name".into(),
                    });
                    continue;
                }

                let tally = tallies.entry(name.to_string()).or_default();
                tally.travel_time += record.travel_time.unwrap_or(Decimal::ZERO);

                match parse_session(record) {
                    Ok((start, end)) => {
                        let c = TimeIntervalClassifier::classify(report.date, start, end);
                        if c.is_sunday {
                            tally.sunday.add(&c);
                        } else {
                            tally.weekday.add(&c);
                        }
                    }
                    Err(reason) => {
                        warn!(
                            date = %report.date,
                            worker = name,
                            %reason,
                            "skipping worker record with unusable times"
                        );
                        skipped.push(SkippedRecord {
                            date: report.date,
                            worker: name.to_string(),
                            reason,
                        });
                    }
                }
            }
        }

        let mut labor: Vec<LaborAggregate> = tallies
            .into_iter()
            .map(|(name, tally)| tally.into_aggregate(name))
            .collect();
        labor.sort_by(|a, b| compare_names(&a.name, &b.name));

        WorkerAggregation { labor, skipped }
    }
}

/// Validate the start/end pair of a record
fn parse_session(record: &WorkerRecord) -> std::result::Result<(ClockTime, ClockTime), String> {
    let start = required_time(record.start_time.as_deref(), "start")?;
    let end = required_time(record.end_time.as_deref(), "end")?;
    Ok((start, end))
}

fn required_time(raw: Option<&str>, which: &str) -> std::result::Result<ClockTime, String> {
    match raw.map(str::trim) {
        None | Some("") => Err(format!("missing {} time", which)),
        Some(s) => s.parse().map_err(|_| format!("malformed {} time '{}'", which, s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn report(y: i32, m: u32, d: u32, workers: Vec<WorkerRecord>) -> WorkReport {
        let mut r = WorkReport::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), Some("P-1"));
        r.worker_records = workers;
        r
    }

    fn worker(name: &str, start: &str, end: &str) -> WorkerRecord {
        WorkerRecord {
            name: name.to_string(),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            travel_time: None,
        }
    }

    // 2024-03-04 Monday, 2024-03-05 Tuesday, 2024-03-10 Sunday

    #[test]
    fn test_empty_reports() {
        let result = WorkerAggregator::aggregate(&[]);
        assert!(result.labor.is_empty());
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_weekday_normal_shift() {
        let result = WorkerAggregator::aggregate(&[report(2024, 3, 4, vec![worker("山田", "08:00", "17:00")])]);

        let row = &result.labor[0];
        assert_eq!(row.weekday_normal, dec!(9));
        assert_eq!(row.weekday_overtime, dec!(0));
        assert_eq!(row.weekday_subtotal, dec!(9));
        assert_eq!(row.total, dec!(9));
    }

    #[test]
    fn test_weekday_evening_overtime() {
        let result = WorkerAggregator::aggregate(&[report(2024, 3, 4, vec![worker("山田", "17:00", "23:00")])]);

        let row = &result.labor[0];
        assert_eq!(row.weekday_normal, dec!(0));
        assert_eq!(row.weekday_overtime, dec!(6));
        assert_eq!(row.weekday_late_night, dec!(1));
        assert_eq!(row.weekday_subtotal, dec!(6));
    }

    #[test]
    fn test_midnight_crossing_late_night_not_added() {
        let result = WorkerAggregator::aggregate(&[report(2024, 3, 5, vec![worker("山田", "23:00", "02:00")])]);

        let row = &result.labor[0];
        assert_eq!(row.weekday_overtime, dec!(3));
        assert_eq!(row.weekday_late_night, dec!(3));
        assert_eq!(row.weekday_subtotal, dec!(3));
    }

    #[test]
    fn test_sunday_goes_to_sunday_bucket() {
        let result = WorkerAggregator::aggregate(&[report(2024, 3, 10, vec![worker("山田", "08:00", "17:00")])]);

        let row = &result.labor[0];
        assert_eq!(row.sunday_normal, dec!(9));
        assert_eq!(row.sunday_subtotal, dec!(9));
        assert_eq!(row.weekday_normal, dec!(0));
        assert_eq!(row.weekday_overtime, dec!(0));
        assert_eq!(row.weekday_subtotal, dec!(0));
        assert_eq!(row.total, dec!(9));
    }

    #[test]
    fn test_same_worker_across_two_weekdays() {
        let reports = vec![
            report(2024, 3, 4, vec![worker("山田", "08:00", "17:00")]),
            report(2024, 3, 5, vec![worker("山田", "08:00", "11:00")]),
        ];

        let result = WorkerAggregator::aggregate(&reports);

        assert_eq!(result.labor.len(), 1);
        assert_eq!(result.labor[0].weekday_normal, dec!(12));
        assert_eq!(result.labor[0].total, dec!(12));
    }

    #[test]
    fn test_names_are_trimmed_into_one_key() {
        let reports = vec![report(
            2024,
            3,
            4,
            vec![worker("山田 ", "08:00", "12:00"), worker("山田", "13:00", "17:00")],
        )];

        let result = WorkerAggregator::aggregate(&reports);

        assert_eq!(result.labor.len(), 1);
        assert_eq!(result.labor[0].name, "山田");
        assert_eq!(result.labor[0].weekday_normal, dec!(8));
    }

    #[test]
    fn test_travel_time_accumulates() {
        let mut a = worker("佐藤", "08:00", "17:00");
        a.travel_time = Some(dec!(1.5));
        let mut b = worker("佐藤", "08:00", "17:00");
        b.travel_time = Some(dec!(2));
        let c = worker("佐藤", "08:00", "17:00");

        let result = WorkerAggregator::aggregate(&[
            report(2024, 3, 4, vec![a]),
            report(2024, 3, 5, vec![b]),
            report(2024, 3, 6, vec![c]),
        ]);

        assert_eq!(result.labor[0].travel_time, dec!(3.5));
        // travel time is not part of the hour total
        assert_eq!(result.labor[0].total, dec!(27));
    }

    #[test]
    fn test_output_sorted_by_japanese_name() {
        let result = WorkerAggregator::aggregate(&[report(
            2024,
            3,
            4,
            vec![
                worker("タナカ", "08:00", "17:00"),
                worker("あべ", "08:00", "17:00"),
                worker("サトウ", "08:00", "17:00"),
            ],
        )]);

        let names: Vec<&str> = result.labor.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["あべ", "サトウ", "タナカ"]);
    }

    // ========== Skips ==========

    #[test]
    fn test_malformed_time_is_skipped_not_fatal() {
        let result = WorkerAggregator::aggregate(&[report(
            2024,
            3,
            4,
            vec![worker("山田", "8時", "17:00"), worker("鈴木", "08:00", "17:00")],
        )]);

        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].worker, "山田");
        assert!(result.skipped[0].reason.contains("malformed start time"));

        let yamada = result.labor.iter().find(|l| l.name == "山田").unwrap();
        assert_eq!(yamada.total, dec!(0));
        let suzuki = result.labor.iter().find(|l| l.name == "鈴木").unwrap();
        assert_eq!(suzuki.total, dec!(9));
    }

    #[test]
    fn test_missing_end_time_is_skipped() {
        let mut record = worker("山田", "08:00", "");
        record.end_time = None;
        let result = WorkerAggregator::aggregate(&[report(2024, 3, 4, vec![record])]);

        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].reason, "missing end time");
        assert_eq!(result.labor[0].total, dec!(0));
    }

    #[test]
    fn test_skipped_record_still_counts_travel_time() {
        let mut record = worker("山田", "", "");
        record.travel_time = Some(dec!(2));
        let result = WorkerAggregator::aggregate(&[report(2024, 3, 4, vec![record])]);

        assert_eq!(result.labor[0].travel_time, dec!(2));
        assert_eq!(result.labor[0].total, dec!(0));
    }

    #[test]
    fn test_nameless_record_is_skipped_without_row() {
        let result = WorkerAggregator::aggregate(&[report(2024, 3, 4, vec![worker("  ", "08:00", "17:00")])]);

        assert!(result.labor.is_empty());
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].reason, "missing worker name");
    }
}

//! Monthly aggregation: period resolution, report filtering and the three rollups

use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::info;

use super::material::MaterialAggregator;
use super::period::{PeriodResolver, PeriodSpec};
use super::subcontractor::SubcontractorAggregator;
use super::worker::WorkerAggregator;
use crate::store::{filter_reports, ProjectDirectory, ReportStore};
use crate::types::{AggregationResult, AggregationTotals, DateRange, Period, Project, Result, WorkReport};

/// Runs one aggregation per request over a store snapshot
#[derive(Clone)]
pub struct AggregationService {
    store: Arc<dyn ReportStore>,
    directory: Arc<dyn ProjectDirectory>,
}

impl AggregationService {
    pub fn new(store: Arc<dyn ReportStore>, directory: Arc<dyn ProjectDirectory>) -> Self {
        Self { store, directory }
    }

    /// Aggregate relative to today's local date
    pub fn run(&self, spec: PeriodSpec, project_ref_id: Option<&str>) -> Result<AggregationResult> {
        self.run_at(spec, project_ref_id, Local::now().date_naive())
    }

    /// Aggregate relative to `today`
    pub fn run_at(
        &self,
        spec: PeriodSpec,
        project_ref_id: Option<&str>,
        today: NaiveDate,
    ) -> Result<AggregationResult> {
        let period = PeriodResolver::resolve(spec, today)?;
        let range = DateRange::from(period.clone());
        let project_ref_id = project_ref_id.map(str::trim).filter(|id| !id.is_empty());

        let reports = self.store.list_reports(&range, project_ref_id)?;
        // Stores are trusted to filter, but a lax one must not leak other months
        let reports = filter_reports(reports, &range, project_ref_id);
        let projects = self.directory.list_active_projects()?;

        let result = Self::aggregate(period, &reports, projects);
        info!(
            store = self.store.name(),
            period = %result.period.label,
            project = project_ref_id.unwrap_or("*"),
            reports = result.report_count,
            skipped = result.skipped.len(),
            "aggregation complete"
        );
        Ok(result)
    }

    /// Pure aggregation over an already filtered report set
    pub fn aggregate(period: Period, reports: &[WorkReport], projects: Vec<Project>) -> AggregationResult {
        let workers = WorkerAggregator::aggregate(reports);
        let materials = MaterialAggregator::aggregate(reports);
        let subcontractors = SubcontractorAggregator::aggregate(reports);
        let totals = AggregationTotals::from_rows(&workers.labor, &materials, &subcontractors);

        AggregationResult {
            period,
            report_count: reports.len(),
            labor: workers.labor,
            materials,
            subcontractors,
            projects,
            totals,
            skipped: workers.skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JsonlReportStore, MemoryReportStore};
    use crate::types::{NippoError, WorkerRecord};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::path::PathBuf;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn fixture_service() -> AggregationService {
        let store = Arc::new(JsonlReportStore::with_data_dir(
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"),
        ));
        AggregationService::new(store.clone(), store)
    }

    struct FailingStore;

    impl ReportStore for FailingStore {
        fn name(&self) -> &str {
            "failing"
        }

        fn list_reports(&self, _: &DateRange, _: Option<&str>) -> Result<Vec<WorkReport>> {
            Err(NippoError::Store("connection refused".into()))
        }
    }

    /// Ignores the requested window entirely
    struct LaxStore(Vec<WorkReport>);

    impl ReportStore for LaxStore {
        fn name(&self) -> &str {
            "lax"
        }

        fn list_reports(&self, _: &DateRange, _: Option<&str>) -> Result<Vec<WorkReport>> {
            Ok(self.0.clone())
        }
    }

    // ========== Fixture month ==========

    #[test]
    fn test_fixture_month_all_projects() {
        let result = fixture_service()
            .run_at(PeriodSpec::Offset(0), None, date(3, 20))
            .unwrap();

        assert_eq!(result.period.label, "2024年3月");
        assert_eq!(result.report_count, 4);

        let names: Vec<&str> = result.labor.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["佐藤", "山田", "田中"]);

        let yamada = &result.labor[1];
        assert_eq!(yamada.weekday_normal, dec!(9));
        assert_eq!(yamada.weekday_overtime, dec!(3));
        assert_eq!(yamada.weekday_late_night, dec!(3));
        assert_eq!(yamada.weekday_subtotal, dec!(12));
        assert_eq!(yamada.sunday_normal, dec!(9));
        assert_eq!(yamada.sunday_subtotal, dec!(9));
        assert_eq!(yamada.total, dec!(21));

        let sato = &result.labor[0];
        assert_eq!(sato.weekday_normal, dec!(4));
        assert_eq!(sato.weekday_overtime, dec!(6));
        assert_eq!(sato.weekday_late_night, dec!(1));
        assert_eq!(sato.travel_time, dec!(1));

        assert_eq!(result.labor[2].total, Decimal::ZERO);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].worker, "田中");

        assert_eq!(result.materials[0].name, "塗料");
        assert_eq!(result.materials[0].total_amount, dec!(7500));
        assert_eq!(result.materials[1].name, "セメント");
        assert_eq!(result.materials[1].total_quantity, dec!(6));
        assert_eq!(result.materials[1].total_amount, dec!(5200));
        assert_eq!(result.materials[1].distinct_project_count, 2);

        assert_eq!(result.subcontractors[0].name, "鈴木工業");
        assert_eq!(result.subcontractors[0].total_worker_count, 6);
        assert_eq!(result.subcontractors[0].total_days, 2);
        assert_eq!(result.subcontractors[0].avg_worker_per_day, dec!(3));

        assert_eq!(result.totals.labor_hours, dec!(31));
        assert_eq!(result.totals.material_amount, dec!(12700));
        assert_eq!(result.totals.subcontractor_count, 10);

        assert_eq!(result.projects.len(), 2);
    }

    #[test]
    fn test_fixture_month_single_project() {
        let result = fixture_service()
            .run_at(PeriodSpec::Offset(0), Some("P-002"), date(3, 20))
            .unwrap();

        assert_eq!(result.report_count, 2);
        let yamada = result.labor.iter().find(|l| l.name == "山田").unwrap();
        assert_eq!(yamada.weekday_subtotal, Decimal::ZERO);
        assert_eq!(yamada.sunday_subtotal, dec!(9));
        assert_eq!(result.totals.labor_hours, dec!(13));
        assert_eq!(result.totals.subcontractor_count, 4);
        // the dropdown still lists every active project
        assert_eq!(result.projects.len(), 2);
    }

    #[test]
    fn test_unknown_project_yields_empty_totals() {
        let result = fixture_service()
            .run_at(PeriodSpec::Offset(0), Some("P-999"), date(3, 20))
            .unwrap();

        assert_eq!(result.report_count, 0);
        assert!(result.labor.is_empty());
        assert!(result.materials.is_empty());
        assert!(result.subcontractors.is_empty());
        assert_eq!(result.totals, AggregationTotals::default());
    }

    #[test]
    fn test_blank_project_means_all() {
        let all = fixture_service()
            .run_at(PeriodSpec::Offset(0), None, date(3, 20))
            .unwrap();
        let blank = fixture_service()
            .run_at(PeriodSpec::Offset(0), Some("  "), date(3, 20))
            .unwrap();
        assert_eq!(all, blank);
    }

    #[test]
    fn test_previous_month_from_april() {
        let result = fixture_service()
            .run_at(PeriodSpec::Offset(-1), None, date(4, 2))
            .unwrap();
        assert_eq!(result.report_count, 4);
    }

    // ========== Totals invariants ==========

    #[test]
    fn test_totals_equal_row_sums() {
        let result = fixture_service()
            .run_at(PeriodSpec::Offset(0), None, date(3, 20))
            .unwrap();

        let labor: Decimal = result.labor.iter().map(|l| l.total).sum();
        let materials: Decimal = result.materials.iter().map(|m| m.total_amount).sum();
        let subs: u64 = result.subcontractors.iter().map(|s| s.total_worker_count).sum();

        assert_eq!(labor, result.totals.labor_hours);
        assert_eq!(materials, result.totals.material_amount);
        assert_eq!(subs, result.totals.subcontractor_count);
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let service = fixture_service();
        let first = service.run_at(PeriodSpec::Offset(0), None, date(3, 20)).unwrap();
        let second = service.run_at(PeriodSpec::Offset(0), None, date(3, 20)).unwrap();
        assert_eq!(first, second);
    }

    // ========== Failures ==========

    #[test]
    fn test_invalid_period_fails_request() {
        let service = fixture_service();
        let spec = PeriodSpec::Range {
            start: date(3, 31),
            end: date(3, 1),
        };
        let err = service.run_at(spec, None, date(3, 20)).unwrap_err();
        assert!(matches!(err, NippoError::InvalidPeriod(_)));
    }

    #[test]
    fn test_store_failure_is_fatal() {
        let service = AggregationService::new(Arc::new(FailingStore), Arc::new(MemoryReportStore::default()));
        let err = service.run_at(PeriodSpec::Offset(0), None, date(3, 20)).unwrap_err();
        assert!(matches!(err, NippoError::Store(_)));
    }

    #[test]
    fn test_lax_store_results_are_refiltered() {
        let mut inside = WorkReport::new(date(3, 4), Some("P-1"));
        inside.worker_records.push(WorkerRecord {
            name: "山田".into(),
            start_time: Some("08:00".into()),
            end_time: Some("17:00".into()),
            travel_time: None,
        });
        let mut outside = inside.clone();
        outside.date = date(4, 1);

        let service = AggregationService::new(
            Arc::new(LaxStore(vec![inside, outside])),
            Arc::new(MemoryReportStore::default()),
        );
        let result = service.run_at(PeriodSpec::Offset(0), None, date(3, 20)).unwrap();

        assert_eq!(result.report_count, 1);
        assert_eq!(result.totals.labor_hours, dec!(9));
    }

    #[test]
    fn test_aggregate_empty_period() {
        let period = PeriodResolver::resolve(PeriodSpec::Offset(0), date(3, 1)).unwrap();
        let result = AggregationService::aggregate(period, &[], Vec::new());
        assert_eq!(result.report_count, 0);
        assert_eq!(result.totals.labor_hours, Decimal::ZERO);
    }
}

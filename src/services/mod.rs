//! Services for classifying work sessions and aggregating daily reports

pub mod aggregation;
pub mod classifier;
pub mod collation;
pub mod material;
pub mod period;
pub mod subcontractor;
pub mod worker;

pub use aggregation::AggregationService;
pub use classifier::{Classification, TimeIntervalClassifier};
pub use material::MaterialAggregator;
pub use period::{PeriodResolver, PeriodSpec};
pub use subcontractor::SubcontractorAggregator;
pub use worker::{WorkerAggregation, WorkerAggregator};

pub mod collect;
pub mod config;
pub mod report;

pub use collect::CollectArgs;
pub use config::{ConfigAction, ConfigArgs};
pub use report::ReportArgs;

pub mod database;
pub mod metrics;
pub mod providers;

pub use database::Database;
pub use metrics::{get_metrics, init_metrics};

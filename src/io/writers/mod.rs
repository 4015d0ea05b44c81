pub mod report;
pub mod table;

pub use report::write_run_report;
pub use table::write_time_series;

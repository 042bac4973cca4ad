//! Background Tasks Module
//!
//! Contains background tasks that run periodically during proxy operation.
//!
//! # Tasks
//! - Cache report: logs a summary of cache activity at configured intervals

mod report;

pub use report::spawn_report_task;

pub mod classify;
pub mod config;
pub mod error;
pub mod fetch;
pub mod frame;
pub mod pipeline;
pub mod render;
pub mod table;

pub use classify::{Classification, Classifier, ColumnClass};
pub use config::Config;
pub use error::Error;
pub use frame::{Column, ColumnKey, TabularFrame};
pub use pipeline::{Pipeline, PipelineReport, SkippedTable};

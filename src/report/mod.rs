pub mod analyst;
pub mod pipeline;

pub use analyst::{Analyst, HttpAnalyst};
pub use pipeline::{ReportDraft, ReportPipeline};

//! Parallel transform pipeline producing per-frame render records.

pub mod parallel;
pub mod record;

pub use parallel::{CollectedFrame, TransformPipeline};
pub use record::{build_record, FrameSnapshot, RenderRecord, TaskFailure};

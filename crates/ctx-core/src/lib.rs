pub mod ai;
pub mod clock;
pub mod export;
pub mod id;
pub mod ingest;
pub mod model;
pub mod order;

pub use ai::{AiConfig, AiConfigPatch, AiError, ProviderConfig, SummaryRequest};
pub use clock::{Clock, ManualClock, Millis, SystemClock};
pub use export::{ExportError, ExportFormat, ExportPlan};
pub use id::BlockId;
pub use ingest::IngestError;
pub use model::*;
pub use order::{chronological, content_bounds, reading_order};

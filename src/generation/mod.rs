//! Sprite generation.
//!
//! Provides the job poller, the two-stage sprite pipeline, and batch runs
//! over a roster of archetypes.

pub mod batch;
pub mod pipeline;
pub mod poller;

// Re-export commonly used items
pub use batch::{default_roster, run_batch, BatchReport, SpriteSpec};
pub use pipeline::SpritePipeline;
pub use poller::{poll_job, Pause, ThreadSleep};

//! GitHub → Todoist synchronization
//!
//! # Components
//!
//! - **classifier**: repository name → section name (static table + fallbacks)
//! - **provisioner**: find-or-create sections, bounded by the project's section cap
//! - **publisher**: one task per issue or pull request
//! - **driver**: the sequential pass tying them together and committing the watermark
//!
//! # Example
//!
//! ```ignore
//! use issuesync::config::SyncConfig;
//! use issuesync::sync::SyncDriver;
//!
//! #[tokio::main]
//! async fn main() -> issuesync::Result<()> {
//!     let config = SyncConfig::load_default()?;
//!     let report = SyncDriver::from_env(config)?.run().await?;
//!     println!("{} tasks created", report.tasks_created);
//!     Ok(())
//! }
//! ```

mod classifier;
mod driver;
mod provisioner;
mod publisher;

pub use classifier::Classifier;
pub use driver::{SyncDriver, SyncPhase, SyncReport};
pub use provisioner::{ProvisionStats, SectionMap, SectionOutcome, SectionProvisioner};
pub use publisher::{build_task, TaskPublisher};

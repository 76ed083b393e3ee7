//! Metastage core: environment-scoped URN mutation and staged change
//! proposals for DataHub metadata.
//!
//! ```text
//! ConfigSource ──► MutationConfig (one snapshot per run)
//!                        │
//! EntitySubmission ──► mutate ──► remap_instance ──► assemble ──► StagingArea
//!                     (md5 suffix)  (platform inst.)   (one URN,     (<root>/<env>/<dir>/
//!                                                       N aspects)     mcp_file.json)
//! ```
//!
//! - The same logical entity gets a distinct, deterministic URN per
//!   environment when its category is enabled, and keeps its original URN
//!   otherwise.
//! - Every proposal assembled for one entity carries the same URN, including
//!   self-references inside aspect bodies.
//! - Batch files are replaced atomically and are byte-identical for
//!   identical input.
//!
//! Nothing here talks to DataHub; pushing staged batches is someone else's job.

pub mod aspect;
pub mod assembler;
pub mod config;
pub mod error;
pub mod instance;
pub mod mutation;
pub mod proposal;
pub mod run;
pub mod staging;
pub mod taxonomy;
pub mod urn;

pub use aspect::{Aspect, AspectPayload};
pub use assembler::{assemble, assemble_removal, resolve_entity_urn};
pub use config::{
    ConfigSource, InMemoryConfigSource, JsonFileConfigSource, MutationConfig, MutationConfigFile,
    StagingOptions,
};
pub use error::{StagingError, StagingResult};
pub use instance::remap_instance;
pub use mutation::{mutate, MutationOutcome};
pub use proposal::{ChangeProposal, ChangeType, EntityReference};
pub use run::{EntitySubmission, StageReport, StagingRun};
pub use staging::{StagingArea, WrittenBatch};
pub use taxonomy::EntityCategory;

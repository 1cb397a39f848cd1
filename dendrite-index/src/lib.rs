//! Incremental indexing pipeline for the Dendrite engine.
//!
//! This crate assembles the refresh machinery: the delta planner deciding what
//! to clean and reparse, the shared queues feeding parallel parser workers, the
//! merge/inject stages draining intermediate storages into the persistent
//! database, and the project controller orchestrating a refresh end to end.

pub mod access_proxy;
pub mod command_list;
pub mod delta;
pub mod file_register;
pub mod memory_storage;
pub mod pipeline;
pub mod project;
pub mod settings;
pub mod source_group;
pub mod storage_provider;
pub mod tasks;

pub use access_proxy::StorageAccessProxy;
pub use command_list::IndexerCommandList;
pub use delta::{plan_refresh, RefreshPlan};
pub use file_register::{FileIndexState, FileRegisterState};
pub use memory_storage::InMemoryStorage;
pub use pipeline::{build_refresh_root, PipelineSetup};
pub use project::{Project, ProjectState, RefreshGate, RefreshOptions};
pub use settings::ProjectSettings;
pub use source_group::DirectorySourceGroup;
pub use storage_provider::StorageProvider;

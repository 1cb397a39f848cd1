//! Project controller orchestrating load and refresh.

use std::sync::Arc;

use tracing::{info, warn};

use dendrite_core::config::EngineConfig;
use dendrite_core::error::Result;
use dendrite_core::events::{EventSink, IndexEvent};
use dendrite_core::traits::{FileQuery, Indexer, PersistentStorage, SourceGroup};
use dendrite_core::types::StorageMode;
use dendrite_scheduling::TaskScheduler;

use crate::access_proxy::StorageAccessProxy;
use crate::command_list::IndexerCommandList;
use crate::delta::{plan_refresh, RefreshPlan};
use crate::pipeline::{build_refresh_root, PipelineSetup};
use crate::settings::{normalize_settings_text, ProjectSettings};

/// Lifecycle state of a project, computed once on load and mutated only by
/// settings-change notifications and a successful refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectState {
    NotLoaded,
    Empty,
    Loaded,
    Outdated,
    Outversioned,
    SettingsUpdated,
    NeedsMigration,
}

/// Options a front-end may amend before indexing starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshOptions {
    pub full_refresh: bool,
    /// Run the preprocessor only; applies to C/C++ commands.
    pub preprocessor_only: bool,
}

/// Interactive confirmation hook consulted before a refresh.
///
/// A headless embedder passes no gate and every refresh proceeds with the
/// computed defaults.
pub trait RefreshGate: Send + Sync {
    /// Confirm a required full reindex. Returning `false` aborts the refresh.
    fn confirm_reindex(&self, _question: &str) -> bool {
        true
    }

    /// Offer the computed counts and default options. Returning `None` aborts
    /// the refresh.
    fn indexing_options(
        &self,
        _files_to_clean: usize,
        _files_to_index: usize,
        _total_files: usize,
        defaults: RefreshOptions,
    ) -> Option<RefreshOptions> {
        Some(defaults)
    }
}

/// Confirmation question for states that require a full reindex.
fn full_refresh_question(state: ProjectState) -> Option<&'static str> {
    match state {
        ProjectState::Outdated => Some(
            "The project file was changed after the last indexing. The project needs to get \
             fully reindexed to reflect the current project state. Do you want to reindex the \
             project?",
        ),
        ProjectState::Outversioned => Some(
            "This project was indexed with a different version of the indexer. It needs to be \
             fully reindexed to be used with this version. Do you want to reindex the project?",
        ),
        ProjectState::SettingsUpdated => Some(
            "Some settings were changed, the project needs to be fully reindexed. Do you want \
             to reindex the project?",
        ),
        ProjectState::NeedsMigration => Some(
            "This project was created with a different version of the indexer. The project \
             file needs to get updated and the project fully reindexed. Do you want to update \
             the project file and reindex the project?",
        ),
        _ => None,
    }
}

/// Owns the persistent storage and orchestrates loading and refreshing.
pub struct Project {
    settings: ProjectSettings,
    storage: Arc<dyn PersistentStorage>,
    source_groups: Vec<Arc<dyn SourceGroup>>,
    indexer: Arc<dyn Indexer>,
    proxy: Arc<StorageAccessProxy>,
    sink: Arc<dyn EventSink>,
    files: Arc<dyn FileQuery>,
    config: EngineConfig,
    state: ProjectState,
}

impl Project {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: ProjectSettings,
        storage: Arc<dyn PersistentStorage>,
        source_groups: Vec<Arc<dyn SourceGroup>>,
        indexer: Arc<dyn Indexer>,
        proxy: Arc<StorageAccessProxy>,
        sink: Arc<dyn EventSink>,
        files: Arc<dyn FileQuery>,
        config: EngineConfig,
    ) -> Self {
        Self {
            settings,
            storage,
            source_groups,
            indexer,
            proxy,
            sink,
            files,
            config,
            state: ProjectState::NotLoaded,
        }
    }

    pub fn state(&self) -> ProjectState {
        self.state
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    /// Mark the project as needing a full reindex after a settings change.
    pub fn set_state_settings_updated(&mut self) {
        if self.state != ProjectState::NotLoaded && self.state != ProjectState::Empty {
            self.state = ProjectState::SettingsUpdated;
        }
    }

    /// Classify the project state and, when loadable, open the storage for
    /// reading.
    pub fn load(&mut self) -> Result<()> {
        self.proxy.clear_subject();
        self.settings.reload()?;

        let can_load = if self.settings.needs_migration() {
            self.state = ProjectState::NeedsMigration;
            !self.storage.is_empty() && !self.storage.is_incompatible()
        } else if self.storage.is_empty() {
            self.state = ProjectState::Empty;
            false
        } else if self.storage.is_incompatible() {
            self.state = ProjectState::Outversioned;
            false
        } else if normalize_settings_text(self.settings.text())
            != normalize_settings_text(&self.storage.project_settings_text())
        {
            self.state = ProjectState::Outdated;
            true
        } else {
            self.state = ProjectState::Loaded;
            true
        };

        if can_load {
            self.storage.set_mode(StorageMode::Read)?;
            self.storage.build_caches();
            self.proxy.set_subject(&self.storage);
            self.sink.emit(IndexEvent::FinishedParsing);
            self.sink.emit(IndexEvent::status("Finished Loading"));
        } else {
            self.sink.emit(IndexEvent::status("Project not loaded"));
        }

        if self.state != ProjectState::Loaded {
            self.sink.emit(IndexEvent::Refresh);
        }

        info!(state = ?self.state, project = self.settings.project_name(), "project loaded");
        Ok(())
    }

    /// Run a refresh: plan the delta, build the task tree and hand it to the
    /// scheduler. Returns `false` when the refresh was aborted or there was
    /// nothing to do; the project state is left unchanged in that case.
    pub fn refresh(
        &mut self,
        scheduler: &TaskScheduler,
        force_refresh: bool,
        gate: Option<&dyn RefreshGate>,
    ) -> Result<bool> {
        if self.state == ProjectState::NotLoaded {
            return Ok(false);
        }

        let needs_full_refresh = !matches!(self.state, ProjectState::Loaded);

        if !force_refresh && needs_full_refresh {
            if let (Some(question), Some(gate)) = (full_refresh_question(self.state), gate) {
                if !gate.confirm_reindex(question) {
                    return Ok(false);
                }
            }
        }

        if self.state == ProjectState::NeedsMigration {
            self.settings.migrate()?;
        }
        self.settings.reload()?;

        if self.source_groups.is_empty() {
            warn!("refresh without source groups");
            self.sink
                .emit(IndexEvent::status_error("No source groups configured"));
            return Ok(false);
        }
        for group in &self.source_groups {
            if !group.prepare_refresh() {
                self.sink
                    .emit(IndexEvent::status_error("A source group cannot be refreshed"));
                return Ok(false);
            }
        }

        if self.request_index(scheduler, force_refresh, needs_full_refresh, gate)? {
            self.proxy.set_subject(&self.storage);
            self.state = ProjectState::Loaded;
            return Ok(true);
        }
        Ok(false)
    }

    fn request_index(
        &mut self,
        scheduler: &TaskScheduler,
        force_refresh: bool,
        needs_full_refresh: bool,
        gate: Option<&dyn RefreshGate>,
    ) -> Result<bool> {
        let mut plan = plan_refresh(
            &self.source_groups,
            self.storage.as_ref(),
            self.files.as_ref(),
            needs_full_refresh,
        );

        let mut full_refresh = force_refresh || needs_full_refresh;
        let mut preprocessor_only = false;

        if let Some(gate) = gate {
            let defaults = RefreshOptions {
                full_refresh: force_refresh,
                preprocessor_only: false,
            };
            let Some(options) = gate.indexing_options(
                plan.files_to_clean.len(),
                plan.files_to_index.len(),
                plan.all_source_paths.len(),
                defaults,
            ) else {
                return Ok(false);
            };
            full_refresh |= options.full_refresh;
            preprocessor_only = options.preprocessor_only;
        }

        if full_refresh && !plan.full {
            plan = plan_refresh(
                &self.source_groups,
                self.storage.as_ref(),
                self.files.as_ref(),
                true,
            );
        }

        if plan.is_noop() {
            self.sink.emit(IndexEvent::status(
                "Nothing to refresh, all files are up-to-date.",
            ));
            return Ok(false);
        }

        self.sink.emit(IndexEvent::status_busy(if full_refresh {
            "Reindexing Project"
        } else {
            "Refreshing Project"
        }));

        self.build_index(scheduler, plan, full_refresh, preprocessor_only)?;
        Ok(true)
    }

    fn build_index(
        &mut self,
        scheduler: &TaskScheduler,
        plan: RefreshPlan,
        full_refresh: bool,
        preprocessor_only: bool,
    ) -> Result<()> {
        self.sink.emit(IndexEvent::ClearErrorCount);

        if full_refresh {
            self.storage.clear()?;
        }
        self.storage.set_project_settings_text(self.settings.text())?;

        let commands = Arc::new(IndexerCommandList::new());
        for group in &self.source_groups {
            for mut command in group.indexer_commands(&plan.files_to_index) {
                command.set_cancel_on_fatal_errors(self.config.cancel_indexing_on_fatal_errors);
                command.set_preprocessor_only(preprocessor_only);
                commands.push(command);
            }
        }

        let worker_count = self.config.resolve_worker_count();
        if worker_count > 1 && commands.size() > 1 {
            commands.shuffle();
        }

        info!(
            commands = commands.size(),
            clean = plan.files_to_clean.len(),
            workers = worker_count,
            full = full_refresh,
            "dispatching refresh"
        );

        let root = build_refresh_root(PipelineSetup {
            storage: self.storage.clone(),
            proxy: self.proxy.clone(),
            indexer: self.indexer.clone(),
            sink: self.sink.clone(),
            commands,
            files_to_clean: plan.files_to_clean.into_iter().collect(),
            worker_count,
        });
        scheduler.dispatch(root);
        Ok(())
    }
}

//! # Yum Registry
//!
//! The registry is the process-wide service that knows which repositories
//! are yum repositories. It is created once at startup, binds each
//! registered repository id to its [`MetadataGenerator`], and is torn down
//! with [`YumRegistry::shutdown`].
//!
//! Registering a repository for the first time has three side effects:
//!
//! 1. A generator is created through the [`GeneratorFactory`].
//! 2. A virtual yum config file (`/.meta/<id>.repo`) is published into the
//!    repository's storage. Its content is rendered on request by the
//!    content generator named [`YUM_CONFIG_GENERATOR_ID`]. A failure here is
//!    logged and otherwise ignored.
//! 3. Hosted repositories get a metadata build submitted to the scheduler.
//!
//! Registering a known repository again returns the existing generator and
//! repeats none of them.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};

use crate::command::CommandExecutor;
use crate::error::Result;
use crate::generator::{GeneratorFactory, MetadataGenerator};
use crate::repository::{Repository, RepositoryId};
use crate::scheduler::Scheduler;
use crate::storage::ContentSource;
use crate::tasks::ScanTask;

/// Content generator rendering the yum `.repo` file of a repository.
pub const YUM_CONFIG_GENERATOR_ID: &str = "YumConfigContentGenerator";

/// Path of the virtual yum config file of a repository.
pub fn config_file_path(repository_id: &str) -> String {
    format!("/.meta/{}.repo", repository_id)
}

pub struct YumRegistry {
    generators: Mutex<HashMap<RepositoryId, Arc<MetadataGenerator>>>,
    scheduler: Arc<dyn Scheduler>,
    factory: Arc<dyn GeneratorFactory>,
    executor: Arc<dyn CommandExecutor>,
    server_temp_dir: PathBuf,
}

impl std::fmt::Debug for YumRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YumRegistry")
            .field("registered", &self.registered_ids())
            .field("server_temp_dir", &self.server_temp_dir)
            .field("max_parallel_threads", &self.max_parallel_threads())
            .finish()
    }
}

impl YumRegistry {
    pub fn new(
        server_temp_dir: impl Into<PathBuf>,
        scheduler: Arc<dyn Scheduler>,
        factory: Arc<dyn GeneratorFactory>,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            generators: Mutex::new(HashMap::new()),
            scheduler,
            factory,
            executor,
            server_temp_dir: server_temp_dir.into(),
        }
    }

    /// Registers `repository` as a yum repository and returns its generator.
    pub fn register(&self, repository: &Repository) -> Arc<MetadataGenerator> {
        let generator = {
            let mut generators = self.lock();
            if let Some(existing) = generators.get(&repository.id) {
                return Arc::clone(existing);
            }
            let generator = Arc::new(
                self.factory
                    .create(&self.temporary_directory(), repository),
            );
            generators.insert(repository.id.clone(), Arc::clone(&generator));
            generator
        };

        info!("Registered repository '{}' as Yum repository", repository.id);

        self.publish_yum_config(repository);

        if repository.kind.is_hosted() {
            self.dispatch_scan(&generator);
        }

        generator
    }

    /// Removes a repository, returning its generator if it was registered.
    pub fn unregister(&self, repository_id: &str) -> Option<Arc<MetadataGenerator>> {
        let generator = self.lock().remove(repository_id);
        if generator.is_some() {
            info!("Unregistered repository '{}' as Yum repository", repository_id);
        }
        generator
    }

    pub fn get(&self, repository_id: &str) -> Option<Arc<MetadataGenerator>> {
        self.lock().get(repository_id).cloned()
    }

    pub fn is_registered(&self, repository_id: &str) -> bool {
        self.lock().contains_key(repository_id)
    }

    /// Ids of all registered repositories, sorted.
    pub fn registered_ids(&self) -> Vec<RepositoryId> {
        let mut ids: Vec<RepositoryId> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of metadata jobs the scheduler runs at the same time.
    pub fn max_parallel_threads(&self) -> usize {
        self.scheduler.max_parallel_threads()
    }

    pub fn set_max_parallel_threads(&self, threads: usize) -> Result<&Self> {
        self.scheduler.set_max_parallel_threads(threads)?;
        Ok(self)
    }

    /// Scratch directory handed to every generator.
    pub fn temporary_directory(&self) -> PathBuf {
        self.server_temp_dir.join("generators")
    }

    /// Unregisters every repository, returning the released generators.
    pub fn shutdown(&self) -> Vec<Arc<MetadataGenerator>> {
        let drained: Vec<_> = self.lock().drain().map(|(_, generator)| generator).collect();
        info!("Yum registry shut down, {} repositories released", drained.len());
        drained
    }

    fn publish_yum_config(&self, repository: &Repository) {
        let path = config_file_path(&repository.id);
        let content = ContentSource::Generated {
            generator_id: YUM_CONFIG_GENERATOR_ID.to_string(),
        };
        if let Err(e) = repository.storage.store_item(&path, content) {
            warn!("Could not store '{}' of repository '{}': {}", path, repository.id, e);
        }
    }

    fn dispatch_scan(&self, generator: &Arc<MetadataGenerator>) {
        let submitted = ScanTask::submit(
            self.scheduler.as_ref(),
            Arc::clone(generator),
            Arc::clone(&self.executor),
        );
        if let Err(e) = submitted {
            warn!(
                "Could not submit metadata build of repository '{}': {}",
                generator.repository_id(),
                e
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RepositoryId, Arc<MetadataGenerator>>> {
        self.generators
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

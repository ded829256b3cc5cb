use std::sync::Arc;

use super::CancelToken;
use crate::confirm::Confirm;
use crate::exec::Executor;
use crate::logging::Log;
use crate::pkgmanager::ManagerRegistry;

/// Collaborators threaded through every module application.
pub struct Context {
    /// Logger for output.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Interactive yes/no prompt used for optional modules.
    pub confirm: Arc<dyn Confirm>,
    /// Configured package managers; empty unless the declaration has packages.
    pub managers: Arc<ManagerRegistry>,
    /// Polled by the engine before each module.
    pub cancel: CancelToken,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("log", &"<dyn Log>")
            .field("executor", &"<dyn Executor>")
            .field("confirm", &"<dyn Confirm>")
            .field("managers", &self.managers)
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl Context {
    /// Create a context with no package managers and a fresh cancel token.
    #[must_use]
    pub fn new(log: Arc<dyn Log>, executor: Arc<dyn Executor>, confirm: Arc<dyn Confirm>) -> Self {
        Self {
            log,
            executor,
            confirm,
            managers: Arc::new(ManagerRegistry::default()),
            cancel: CancelToken::new(),
        }
    }

    /// Replace the package-manager registry.
    #[must_use]
    pub fn with_managers(mut self, managers: ManagerRegistry) -> Self {
        self.managers = Arc::new(managers);
        self
    }

    /// Replace the cancel token, typically with one shared with a signal handler.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

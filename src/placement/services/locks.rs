//! Project-scoped mutual exclusion for placement mutations.

use crate::placement::domain::ProjectId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = HashMap<ProjectId, Arc<AsyncMutex<()>>>;

/// One async lock per project.
///
/// A placement mutation holds its project's guard across the whole
/// read-shift-commit-publish sequence. Mutations of different projects never
/// wait on each other. A project's entry is dropped once its last holder
/// releases it and nobody is queued behind, so the table only tracks projects
/// with a mutation in flight.
#[derive(Debug, Default)]
pub(crate) struct ProjectLocks {
    locks: Mutex<LockTable>,
}

impl ProjectLocks {
    /// Waits for exclusive access to a project.
    pub(crate) async fn acquire(&self, project_id: ProjectId) -> ProjectGuard<'_> {
        let lock = {
            let mut locks = self.table();
            Arc::clone(locks.entry(project_id).or_default())
        };
        tracing::trace!(project = %project_id, "acquiring project lock");
        ProjectGuard {
            owner: self,
            project_id,
            guard: lock.lock_owned().await,
        }
    }

    /// Number of projects with a holder or a waiter.
    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        self.table().len()
    }

    fn table(&self) -> std::sync::MutexGuard<'_, LockTable> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive access to one project, released on drop.
#[must_use = "the project is unlocked as soon as the guard is dropped"]
#[derive(Debug)]
pub(crate) struct ProjectGuard<'a> {
    owner: &'a ProjectLocks,
    project_id: ProjectId,
    guard: OwnedMutexGuard<()>,
}

impl Drop for ProjectGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self.owner.table();
        // Waiters clone the entry under the table lock, so two references
        // (the table and this guard) mean nobody else wants the project.
        let idle = locks.get(&self.project_id).is_some_and(|lock| {
            Arc::ptr_eq(lock, OwnedMutexGuard::mutex(&self.guard)) && Arc::strong_count(lock) == 2
        });
        if idle {
            locks.remove(&self.project_id);
        }
    }
}

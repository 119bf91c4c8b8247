//! Client-side merge of change events into a cached board.

use super::{ChangeEvent, ChangeKind, Displacement};
use crate::placement::domain::{Lane, ProjectId, Revision, Task, TaskId};
use std::collections::{HashMap, HashSet};

/// Result of folding one event into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The cache changed.
    Applied,
    /// Everything in the event was already superseded; the cache is
    /// unchanged.
    Stale,
    /// The event belongs to another project and was ignored.
    ForeignProject,
}

/// Locally cached view of one project's board.
///
/// Merging is idempotent and tolerant of reordering: a snapshot replaces the
/// cached task only when its revision is newer, and deletions leave a
/// tombstone so that older snapshots arriving later cannot resurrect the
/// task. A displacement naming a task the cache has not seen yet is held
/// back and applied once the task's snapshot arrives, unless that snapshot
/// is newer.
///
/// A client opens its subscription first, then fetches the board and hands
/// it to [`BoardReconciler::seed`]. Live events received in between are
/// never overwritten by the older fetch.
///
/// # Examples
///
/// ```
/// use laneboard::placement::domain::ProjectId;
/// use laneboard::propagation::domain::BoardReconciler;
///
/// let board = BoardReconciler::new(ProjectId::new());
/// assert!(board.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BoardReconciler {
    project_id: ProjectId,
    tasks: HashMap<TaskId, Task>,
    tombstones: HashMap<TaskId, Revision>,
    pending: HashMap<TaskId, Displacement>,
    live: HashSet<TaskId>,
}

impl BoardReconciler {
    /// Creates an empty cache for a project.
    #[must_use]
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            tasks: HashMap::new(),
            tombstones: HashMap::new(),
            pending: HashMap::new(),
            live: HashSet::new(),
        }
    }

    /// Merges a full board fetch into the cache.
    ///
    /// Fetched tasks go through the same revision and tombstone checks as
    /// live snapshots, so neither a deleted task nor an older revision comes
    /// back. Cached tasks missing from the fetch are dropped unless a live
    /// event delivered them since the previous seed or resync.
    pub fn seed(&mut self, tasks: impl IntoIterator<Item = Task>) {
        let fetched: HashMap<TaskId, Task> = tasks
            .into_iter()
            .filter(|task| task.project_id() == self.project_id)
            .map(|task| (task.id(), task))
            .collect();
        let live = std::mem::take(&mut self.live);
        self.tasks
            .retain(|id, _| fetched.contains_key(id) || live.contains(id));
        for task in fetched.into_values() {
            self.absorb(task);
        }
    }

    /// Forgets which tasks live events delivered.
    ///
    /// Call after opening a fresh subscription and before seeding, so that
    /// tasks learned on a dropped connection must reappear in the fetch.
    pub fn begin_resync(&mut self) {
        self.live.clear();
    }

    /// Folds an event into the cache.
    #[must_use]
    pub fn apply(&mut self, event: &ChangeEvent) -> MergeOutcome {
        if event.project_id() != self.project_id {
            return MergeOutcome::ForeignProject;
        }

        let subject_changed = match event.kind() {
            ChangeKind::Created | ChangeKind::Updated => event
                .snapshot()
                .is_some_and(|snapshot| self.merge_snapshot(snapshot)),
            ChangeKind::Deleted => self.merge_deletion(event.task_id(), event.revision()),
        };

        let mut changed = subject_changed;
        for displacement in event.displaced() {
            changed |= self.merge_displacement(displacement);
        }

        if changed {
            MergeOutcome::Applied
        } else {
            MergeOutcome::Stale
        }
    }

    /// Returns a cached task.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Returns the cached tasks of a lane sorted by position.
    #[must_use]
    pub fn lane(&self, lane: Lane) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .values()
            .filter(|task| task.lane() == lane)
            .collect();
        tasks.sort_by_key(|task| task.position());
        tasks
    }

    /// Returns every cached task sorted by lane, then position.
    #[must_use]
    pub fn board(&self) -> Vec<&Task> {
        Lane::ALL.into_iter().flat_map(|lane| self.lane(lane)).collect()
    }

    /// Returns the number of cached tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` when no task is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns the tombstone revision recorded for a deleted task.
    #[must_use]
    pub fn tombstone(&self, id: TaskId) -> Option<Revision> {
        self.tombstones.get(&id).copied()
    }

    fn is_superseded(&self, id: TaskId, revision: Revision) -> bool {
        let cached = self.tasks.get(&id).map(Task::revision);
        let buried = self.tombstones.get(&id).copied();
        cached.is_some_and(|current| current >= revision)
            || buried.is_some_and(|tombstone| tombstone >= revision)
    }

    fn merge_snapshot(&mut self, snapshot: &Task) -> bool {
        let absorbed = self.absorb(snapshot.clone());
        if absorbed {
            self.live.insert(snapshot.id());
        }
        absorbed
    }

    /// Stores a snapshot unless something newer is known, folding in any
    /// held-back displacement that outranks it.
    fn absorb(&mut self, mut task: Task) -> bool {
        if self.is_superseded(task.id(), task.revision()) {
            return false;
        }
        let revision = task.revision();
        if let Some(held) = self
            .pending
            .remove(&task.id())
            .filter(|held| held.revision > revision)
        {
            task.rebind(held.lane, held.position, held.revision);
        }
        self.tasks.insert(task.id(), task);
        true
    }

    fn merge_deletion(&mut self, id: TaskId, revision: Revision) -> bool {
        let removed = self.tasks.remove(&id).is_some();
        self.pending.remove(&id);
        self.live.remove(&id);
        let buried = match self.tombstones.get(&id) {
            Some(existing) if *existing >= revision => false,
            _ => {
                self.tombstones.insert(id, revision);
                true
            }
        };
        removed || buried
    }

    fn merge_displacement(&mut self, displacement: &Displacement) -> bool {
        let id = displacement.task_id;
        if self
            .tombstones
            .get(&id)
            .is_some_and(|tombstone| *tombstone >= displacement.revision)
        {
            return false;
        }
        if let Some(task) = self.tasks.get_mut(&id) {
            if task.revision() >= displacement.revision {
                return false;
            }
            task.rebind(
                displacement.lane,
                displacement.position,
                displacement.revision,
            );
            self.live.insert(id);
            return true;
        }
        if self
            .pending
            .get(&id)
            .is_some_and(|held| held.revision >= displacement.revision)
        {
            return false;
        }
        self.pending.insert(id, *displacement);
        true
    }
}

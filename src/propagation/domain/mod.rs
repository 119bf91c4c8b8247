//! Domain model for change propagation.
//!
//! Events are immutable facts about committed mutations. The reconciler is
//! the merge contract a client applies to fold them into its cached board.

mod event;
mod reconciler;

pub use event::{ChangeEvent, ChangeKind, Displacement};
pub use reconciler::{BoardReconciler, MergeOutcome};

//! The action-helper contract

use crate::columns::ColumnTypes;
use crate::error::Result;

/// A stateful action run by the event loop over rows of type `C`
///
/// The loop calls [`initialize`](ActionHelper::initialize) once with the
/// number of worker slots, then [`exec`](ActionHelper::exec) for every row,
/// concurrently from up to `n_slots` workers, and finally
/// [`finalize`](ActionHelper::finalize) to produce the result. `slot` is
/// stable for a worker and always below `n_slots`, so helpers may keep one
/// piece of state per slot without further synchronisation between slots.
pub trait ActionHelper<C: ColumnTypes>: Send + Sync + 'static {
    /// Value published to the result handle
    type Result: Send + Sync + 'static;

    /// Name used in logs and errors
    fn name(&self) -> String {
        "ActionHelper".to_string()
    }

    fn initialize(&mut self, _n_slots: usize) {}

    fn exec(&self, slot: usize, row: C) -> Result<()>;

    fn finalize(self) -> Result<Self::Result>;
}

use tokio_util::sync::CancellationToken;

use timex_types::EngineFailure;

/// Description returned by engines that stop because their token fired.
pub const INTERRUPTED: &str = "task interrupted";

/// Returns an "interrupted" failure once `cancel` has fired.
///
/// Engines call this between units of work; cancellation never stops a
/// thread by itself.
pub fn checkpoint(cancel: &CancellationToken) -> Result<(), EngineFailure> {
    if cancel.is_cancelled() {
        Err(EngineFailure::new(INTERRUPTED))
    } else {
        Ok(())
    }
}

use super::CollectionSignal;

/// Receives collection lifecycle signals.
///
/// Handlers are registered on the owning [`Collection`]; there is no
/// process-wide emitter. Dispatch is synchronous and in registration
/// order.
///
/// [`Collection`]: crate::collection::Collection
pub trait SignalHandler {
    fn handle_signal(&mut self, signal: &CollectionSignal);
}

/// Closures are handlers.
impl<F> SignalHandler for F
where
    F: FnMut(&CollectionSignal),
{
    fn handle_signal(&mut self, signal: &CollectionSignal) {
        self(signal)
    }
}

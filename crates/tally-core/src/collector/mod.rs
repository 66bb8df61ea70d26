//! Hooks that refresh derived values right before a snapshot is taken.
mod process;
pub use process::ProcessCollector;

/// Refreshes instruments whose values are computed rather than recorded.
///
/// Collectors are registered with [`Registry::register_collector`](crate::Registry::register_collector)
/// and invoked by [`Registry::gather`](crate::Registry::gather). Implementations
/// must be quick: they run on every scrape.
pub trait Collector: Send + Sync + 'static {
    fn collect(&self);
}

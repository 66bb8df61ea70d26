use tally_core::{Registry, RegistrySnapshot};

/// Source of the snapshot served on each scrape.
///
/// [`Registry`] is the stock implementation; custom sources can merge several
/// registries or filter families before exposition.
pub trait SnapshotSource: Send + Sync + 'static {
    /// Produce a point-in-time snapshot. Runs on a blocking worker thread.
    fn gather(&self) -> RegistrySnapshot;
}

impl SnapshotSource for Registry {
    fn gather(&self) -> RegistrySnapshot {
        Registry::gather(self)
    }
}

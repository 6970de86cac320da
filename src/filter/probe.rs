use std::path::Path;

/// Filesystem size lookups, swappable so transient failures can be simulated.
pub trait Probe: Send + Sync {
    /// Size of the file in bytes.
    fn bytes(&self, path: &Path) -> std::io::Result<u64>;
}

/// Probes the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disk;

impl Probe for Disk {
    fn bytes(&self, path: &Path) -> std::io::Result<u64> {
        std::fs::metadata(path).map(|meta| meta.len())
    }
}

impl<P> Probe for &P
where
    P: Probe + ?Sized,
{
    fn bytes(&self, path: &Path) -> std::io::Result<u64> {
        (**self).bytes(path)
    }
}

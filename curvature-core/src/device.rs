/// Represents the physical location where tensor data is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageDevice {
    /// Main system memory. The only device operations currently run on.
    #[default]
    CPU,
    /// Accelerator memory. Accepted by the type system, rejected by every op.
    GPU,
}

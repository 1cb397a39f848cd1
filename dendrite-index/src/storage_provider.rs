//! Shared pool of intermediate storages between pipeline stages.

use parking_lot::Mutex;

use dendrite_core::intermediate::IntermediateStorage;

/// FIFO pool of intermediate storages with smallest-first consumption.
///
/// Producers (`BuildIndex` workers) push without blocking; mergers and the
/// injector consume smallest-first, which keeps the quadratic re-copy cost of
/// repeated merging low and converges toward one large storage ready for
/// injection. Ties are broken by insertion order.
#[derive(Default)]
pub struct StorageProvider {
    storages: Mutex<Vec<IntermediateStorage>>,
}

impl StorageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, storage: IntermediateStorage) {
        self.storages.lock().push(storage);
    }

    pub fn size(&self) -> usize {
        self.storages.lock().len()
    }

    /// Remove and return the smallest storage by byte size, or `None` when the
    /// pool is empty.
    pub fn consume_smallest(&self) -> Option<IntermediateStorage> {
        let mut storages = self.storages.lock();
        let index = smallest_index(&storages)?;
        Some(storages.remove(index))
    }

    /// Atomically remove the two smallest storages, or `None` when fewer than
    /// two are pooled.
    pub fn consume_two_smallest(&self) -> Option<(IntermediateStorage, IntermediateStorage)> {
        let mut storages = self.storages.lock();
        if storages.len() < 2 {
            return None;
        }
        let first_index = smallest_index(&storages).unwrap_or(0);
        let first = storages.remove(first_index);
        let second_index = smallest_index(&storages).unwrap_or(0);
        let second = storages.remove(second_index);
        Some((first, second))
    }

    /// Drop everything still pooled; used on cancellation.
    pub fn clear(&self) {
        self.storages.lock().clear();
    }
}

/// Index of the smallest storage, first-inserted on ties.
fn smallest_index(storages: &[IntermediateStorage]) -> Option<usize> {
    storages
        .iter()
        .enumerate()
        .min_by_key(|(index, storage)| (storage.byte_size(), *index))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dendrite_core::intermediate::{Symbol, SymbolKind};

    fn storage_of_size(symbol_len: usize) -> IntermediateStorage {
        let mut storage = IntermediateStorage::new();
        storage.add_symbol(Symbol::new("x".repeat(symbol_len), SymbolKind::Function, "f"));
        storage
    }

    #[test]
    fn test_consume_smallest_orders_by_size() {
        let provider = StorageProvider::new();
        provider.push(storage_of_size(30));
        provider.push(storage_of_size(10));
        provider.push(storage_of_size(20));

        let sizes: Vec<usize> = std::iter::from_fn(|| provider.consume_smallest())
            .map(|s| s.byte_size())
            .collect();
        assert_eq!(sizes.len(), 3);
        assert!(sizes.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(provider.size(), 0);
    }

    #[test]
    fn test_consume_two_smallest_requires_two() {
        let provider = StorageProvider::new();
        assert!(provider.consume_two_smallest().is_none());

        provider.push(storage_of_size(10));
        assert!(provider.consume_two_smallest().is_none());
        assert_eq!(provider.size(), 1);

        provider.push(storage_of_size(5));
        provider.push(storage_of_size(20));
        let (a, b) = provider.consume_two_smallest().unwrap();
        assert!(a.byte_size() <= b.byte_size());
        assert_eq!(provider.size(), 1);
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let provider = StorageProvider::new();
        let mut first = storage_of_size(10);
        first.add_reference("a.cpp", "h.h");
        let mut second = storage_of_size(10);
        second.add_reference("b.cpp", "h.h");
        // Same byte size only if the reference paths match in length; use
        // identical sizes via equal-length names.
        assert_eq!(first.byte_size(), second.byte_size());

        provider.push(first.clone());
        provider.push(second);

        let consumed = provider.consume_smallest().unwrap();
        assert_eq!(consumed, first);
    }

    #[test]
    fn test_clear_discards_pool() {
        let provider = StorageProvider::new();
        provider.push(storage_of_size(1));
        provider.push(storage_of_size(2));
        provider.clear();
        assert_eq!(provider.size(), 0);
    }
}

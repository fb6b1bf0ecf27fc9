use crate::error::GeneratorError;
use crate::unique_id::{UniqueId, MAX_MACHINE_ID, MAX_SEQUENCE};
use burrow_core::SequenceStore;
use std::sync::Arc;
use tracing::{trace, warn};

/// Hands out machine-namespaced unique ids backed by a [`SequenceStore`].
///
/// The atomic increment of the store is the only serialization point: there is
/// no in-process locking, so any number of allocators, in this process or in
/// others sharing the store, can run concurrently. Each allocation packs the
/// new sequence number below the configured machine id (see [`UniqueId`]).
///
/// Once a counter passes [`MAX_SEQUENCE`] allocation fails with
/// [`GeneratorError::SequenceExhausted`] instead of letting sequence bits
/// spill into the machine id.
#[derive(Debug)]
pub struct SequenceAllocator<S> {
    store: Arc<S>,
    machine_id: u64,
}

impl<S> Clone for SequenceAllocator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            machine_id: self.machine_id,
        }
    }
}

impl<S: SequenceStore> SequenceAllocator<S> {
    /// Creates an allocator for `machine_id`.
    pub fn new(store: S, machine_id: u64) -> Result<Self, GeneratorError> {
        Self::with_shared_store(Arc::new(store), machine_id)
    }

    /// Creates an allocator over a store that is shared with other components.
    pub fn with_shared_store(store: Arc<S>, machine_id: u64) -> Result<Self, GeneratorError> {
        if machine_id > MAX_MACHINE_ID {
            return Err(GeneratorError::InvalidMachineId {
                machine_id,
                max_machine_id: MAX_MACHINE_ID,
            });
        }

        Ok(Self { store, machine_id })
    }

    /// Returns the machine id packed into every allocated id.
    pub fn machine_id(&self) -> u64 {
        self.machine_id
    }

    /// Allocates the next id from the counter called `counter`.
    pub async fn allocate(&self, counter: &str) -> Result<UniqueId, GeneratorError> {
        let sequence = self.store.increment(counter).await?;

        if sequence > MAX_SEQUENCE {
            warn!(counter, sequence, machine_id = self.machine_id, "sequence exhausted");
            return Err(GeneratorError::SequenceExhausted {
                counter: counter.to_string(),
                sequence,
                max_sequence: MAX_SEQUENCE,
            });
        }

        let id = UniqueId::new()
            .with_sequence(sequence as u32)
            .with_machine_id(self.machine_id);
        trace!(counter, sequence, id = id.value(), "allocated id");

        Ok(id)
    }
}

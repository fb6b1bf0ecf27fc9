use modular_bitfield::prelude::*;
use std::fmt;

/// Width of the per-machine sequence field; the machine id starts at this bit.
pub const SEQUENCE_BITS: u32 = 20;

/// Largest sequence number that fits below the machine id bits.
pub const MAX_SEQUENCE: u64 = (1_u64 << SEQUENCE_BITS) - 1;

/// Largest machine id that fits above the sequence bits.
pub const MAX_MACHINE_ID: u64 = (1_u64 << (64 - SEQUENCE_BITS)) - 1;

/// A globally unique identifier: `(machine_id << 20) | sequence`.
#[bitfield]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniqueId {
    /// 20 bits for the per-counter sequence number of one machine.
    pub sequence: B20,
    /// 44 bits for the id of the machine that allocated the sequence.
    pub machine_id: B44,
}

impl UniqueId {
    /// Returns the packed integer value.
    pub fn value(&self) -> u64 {
        (self.machine_id() << SEQUENCE_BITS) | u64::from(self.sequence())
    }
}

impl From<UniqueId> for u64 {
    fn from(id: UniqueId) -> Self {
        id.value()
    }
}

impl From<u64> for UniqueId {
    fn from(value: u64) -> Self {
        UniqueId::new()
            .with_sequence((value & MAX_SEQUENCE) as u32)
            .with_machine_id(value >> SEQUENCE_BITS)
    }
}

impl fmt::Debug for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueId")
            .field("machine_id", &self.machine_id())
            .field("sequence", &self.sequence())
            .field("value", &self.value())
            .finish()
    }
}

use burrow_core::StorageError;
use thiserror::Error;

/// Errors returned by sequence allocation and code generation.
#[derive(Debug, Clone, Error)]
pub enum GeneratorError {
    #[error("invalid machine id {machine_id}; expected 0..={max_machine_id}")]
    InvalidMachineId { machine_id: u64, max_machine_id: u64 },
    #[error("sequence '{counter}' exhausted at {sequence}; at most {max_sequence} ids per machine")]
    SequenceExhausted {
        counter: String,
        sequence: u64,
        max_sequence: u64,
    },
    #[error("sequence store failed: {0}")]
    Store(#[from] StorageError),
}

//! Short code generation for Burrow.
//!
//! Codes are derived from machine-namespaced ids handed out by a
//! [`SequenceAllocator`] and encoded as base62.

pub mod allocator;
pub mod error;
pub mod seq;
pub mod unique_id;

use async_trait::async_trait;
use burrow_core::ShortCode;

pub use allocator::SequenceAllocator;
pub use error::GeneratorError;
pub use seq::{SeqGenerator, SeqGeneratorSettings};
pub use unique_id::UniqueId;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with the record
/// store. They may still need I/O (e.g. a durable counter), hence `async`.
#[async_trait]
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;
    /// Generates a type that can be converted into a globally unique short code.
    async fn generate(&self) -> Result<Self::Output, GeneratorError>;
}

use crate::allocator::SequenceAllocator;
use crate::error::GeneratorError;
use crate::Generator;
use async_trait::async_trait;
use burrow_core::{SequenceStore, ShortCode, ShortCodeBase62};
use typed_builder::TypedBuilder;

/// Configures a [`SeqGenerator`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct SeqGeneratorSettings {
    /// Id of this deployed instance, packed into the high bits of every id.
    #[builder(default = 1)]
    pub machine_id: u64,
    /// Name of the durable counter that sequences are drawn from.
    #[builder(default = "url_id".to_string(), setter(into))]
    pub counter_name: String,
}

impl Default for SeqGeneratorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A short code generator backed by a durable sequence counter.
///
/// Each code is the base62 form of `(machine_id << 20) | sequence`. The
/// generator never consults the record store: uniqueness against custom
/// aliases is left to the store's constraint.
#[derive(Debug)]
pub struct SeqGenerator<S> {
    allocator: SequenceAllocator<S>,
    counter_name: String,
}

impl<S> Clone for SeqGenerator<S> {
    fn clone(&self) -> Self {
        Self {
            allocator: self.allocator.clone(),
            counter_name: self.counter_name.clone(),
        }
    }
}

impl<S: SequenceStore> SeqGenerator<S> {
    pub fn new(store: S, settings: SeqGeneratorSettings) -> Result<Self, GeneratorError> {
        Ok(Self::from_allocator(
            SequenceAllocator::new(store, settings.machine_id)?,
            settings.counter_name,
        ))
    }

    pub fn from_allocator(allocator: SequenceAllocator<S>, counter_name: impl Into<String>) -> Self {
        Self {
            allocator,
            counter_name: counter_name.into(),
        }
    }

    pub fn counter_name(&self) -> &str {
        &self.counter_name
    }
}

#[async_trait]
impl<S: SequenceStore> Generator for SeqGenerator<S> {
    type Output = ShortCode;

    async fn generate(&self) -> Result<Self::Output, GeneratorError> {
        let id = self.allocator.allocate(&self.counter_name).await?;
        Ok(ShortCode::generated(ShortCodeBase62::new(id.value())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_storage::InMemorySequenceStore;

    fn generator(machine_id: u64) -> SeqGenerator<InMemorySequenceStore> {
        let settings = SeqGeneratorSettings::builder().machine_id(machine_id).build();
        SeqGenerator::new(InMemorySequenceStore::new(), settings).unwrap()
    }

    #[test]
    fn default_settings() {
        let settings = SeqGeneratorSettings::default();
        assert_eq!(settings.machine_id, 1);
        assert_eq!(settings.counter_name, "url_id");
    }

    #[tokio::test]
    async fn machine_zero_starts_at_b() {
        let generator = generator(0);

        assert_eq!(generator.generate().await.unwrap().as_str(), "b");
        assert_eq!(generator.generate().await.unwrap().as_str(), "c");
    }

    #[tokio::test]
    async fn generated_codes_decode_to_packed_ids() {
        let generator = generator(1);

        let code = generator.generate().await.unwrap();

        match code {
            ShortCode::Generated(base62) => assert_eq!(base62.value(), (1 << 20) | 1),
            ShortCode::Custom(_) => panic!("expected a generated code"),
        }
    }

    #[tokio::test]
    async fn uses_configured_counter() {
        let store = InMemorySequenceStore::new();
        store.seed("links", 61);
        let settings = SeqGeneratorSettings::builder()
            .machine_id(0)
            .counter_name("links")
            .build();
        let generator = SeqGenerator::new(store, settings).unwrap();

        assert_eq!(generator.counter_name(), "links");
        assert_eq!(generator.generate().await.unwrap().as_str(), "ba");
    }
}

#![cfg(feature = "sharding")]

use std::sync::Arc;

use parking_lot::Mutex;
use zarrs_engine::{
    array::{codec::ShardingCodecBuilder, Array, ArrayBuilder, DataType, FillValue},
    array_subset::ArraySubset,
    byte_range::ByteRange,
    storage::{
        store::MemoryStore, Bytes, ReadableStorageTraits, StorageError, StoreKey, StorePrefix,
        WritableStorageTraits,
    },
};

/// A store that records every read request made against it.
#[derive(Default)]
struct RecordingStore {
    inner: MemoryStore,
    partial_reads: Mutex<Vec<(StoreKey, Vec<ByteRange>)>>,
    size_requests: Mutex<Vec<StoreKey>>,
}

impl RecordingStore {
    fn clear(&self) {
        self.partial_reads.lock().clear();
        self.size_requests.lock().clear();
    }
}

impl ReadableStorageTraits for RecordingStore {
    fn get_partial_values_key(
        &self,
        key: &StoreKey,
        byte_ranges: &[ByteRange],
    ) -> Result<Option<Vec<Bytes>>, StorageError> {
        self.partial_reads
            .lock()
            .push((key.clone(), byte_ranges.to_vec()));
        self.inner.get_partial_values_key(key, byte_ranges)
    }

    fn size_key(&self, key: &StoreKey) -> Result<Option<u64>, StorageError> {
        self.size_requests.lock().push(key.clone());
        self.inner.size_key(key)
    }
}

impl WritableStorageTraits for RecordingStore {
    fn set(&self, key: &StoreKey, value: Bytes) -> Result<(), StorageError> {
        self.inner.set(key, value)
    }

    fn erase(&self, key: &StoreKey) -> Result<(), StorageError> {
        self.inner.erase(key)
    }

    fn erase_prefix(&self, prefix: &StorePrefix) -> Result<(), StorageError> {
        self.inner.erase_prefix(prefix)
    }
}

const SHARD_SHAPE: u64 = 128;
const SHARD_INDICES: [u64; 4] = [0, 24, 24, 4];

fn value(y: u64, x: u64, z: u64) -> u8 {
    u8::try_from((y * 7 + x * 3 + z) % 251).unwrap()
}

fn sharded_builder() -> Result<ArrayBuilder, Box<dyn std::error::Error>> {
    let mut builder = ArrayBuilder::new(
        vec![1, 3200, 3200, 640],
        DataType::UInt8,
        vec![1, SHARD_SHAPE, SHARD_SHAPE, SHARD_SHAPE].try_into()?,
        FillValue::from(0u8),
    );
    builder.array_to_bytes_codec(Box::new(
        ShardingCodecBuilder::new(vec![1, 32, 32, 32].try_into()?).build(),
    ));
    Ok(builder)
}

fn write_shard(store: Arc<RecordingStore>) -> Result<(), Box<dyn std::error::Error>> {
    let array = sharded_builder()?.build(store, "/array")?;
    array.store_metadata()?;

    let [_, y0, x0, z0] = SHARD_INDICES.map(|i| i * SHARD_SHAPE);
    let mut elements = Vec::with_capacity((SHARD_SHAPE * SHARD_SHAPE * SHARD_SHAPE) as usize);
    for y in y0..y0 + SHARD_SHAPE {
        for x in x0..x0 + SHARD_SHAPE {
            for z in z0..z0 + SHARD_SHAPE {
                elements.push(value(y, x, z));
            }
        }
    }
    array.store_chunk(&SHARD_INDICES, elements)?;
    Ok(())
}

#[test]
fn sharding_partial_read_uses_byte_ranges() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(RecordingStore::default());
    write_shard(store.clone())?;

    let array = Array::new(store.clone(), "/array")?;
    store.clear();

    let offset = [0, 3073, 3073, 513];
    let shape = [1, 64, 64, 64];
    let elements = array.read_elements::<u8>(Some(&offset), Some(&shape))?;
    assert_eq!(elements.len(), 64 * 64 * 64);
    assert_eq!(elements[0], value(3073, 3073, 513));

    let mut expected = Vec::with_capacity(elements.len());
    for y in 3073..3073 + 64 {
        for x in 3073..3073 + 64 {
            for z in 513..513 + 64 {
                expected.push(value(y, x, z));
            }
        }
    }
    assert_eq!(elements, expected);

    // Only the shard was read, and never in full
    let shard_key = StoreKey::new("array/c/0/24/24/4")?;
    let partial_reads = store.partial_reads.lock();
    assert!(!partial_reads.is_empty());
    for (key, byte_ranges) in partial_reads.iter() {
        assert_eq!(key, &shard_key);
        assert!(!byte_ranges.is_empty());
        assert!(!byte_ranges.contains(&ByteRange::FromStart(0, None)));
    }
    // The shard index is read from the end of the shard
    assert!(matches!(
        partial_reads[0].1.as_slice(),
        [ByteRange::FromEnd(0, Some(_))]
    ));
    Ok(())
}

#[test]
fn sharding_partial_matches_full_decode() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(RecordingStore::default());
    write_shard(store.clone())?;
    let array = Array::new(store, "/array")?;

    let chunk_subset = ArraySubset::new_with_ranges(&[0..1, 1..65, 1..65, 1..65]);
    let partial = array.retrieve_chunk_subset(&SHARD_INDICES, &chunk_subset)?;
    let full = array.retrieve_chunk(&SHARD_INDICES)?;
    let full_subset =
        chunk_subset.extract_bytes(&full, &[1, SHARD_SHAPE, SHARD_SHAPE, SHARD_SHAPE], 1)?;
    assert_eq!(partial, full_subset);
    Ok(())
}

#[test]
fn sharding_missing_shard_is_fill() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(RecordingStore::default());
    write_shard(store.clone())?;
    let array = Array::new(store.clone(), "/array")?;

    let elements = array.read_elements::<u8>(Some(&[0, 0, 0, 0]), Some(&[1, 4, 4, 4]))?;
    assert_eq!(elements, vec![0; 64]);
    assert!(store.inner.get(&StoreKey::new("array/c/0/0/0/0")?)?.is_none());

    // Erasing the shard returns the region to the fill value
    array.erase_chunk(&SHARD_INDICES)?;
    let elements = array.read_elements::<u8>(Some(&[0, 3072, 3072, 512]), Some(&[1, 2, 2, 2]))?;
    assert_eq!(elements, vec![0; 8]);
    Ok(())
}

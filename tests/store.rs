use std::sync::Arc;

use zarrs_engine::{
    array::{Array, ArrayBuilder, DataType, FillValue},
    byte_range::ByteRange,
    storage::{
        store::{FilesystemStore, MemoryStore},
        Bytes, ListableStorageTraits, ReadableStorageTraits, ReadableWritableListableStorageTraits,
        StorageHandle, StoreKey, StorePrefix, WritableStorageTraits,
    },
};

fn key(key: &str) -> StoreKey {
    StoreKey::new(key).unwrap()
}

fn prefix(prefix: &str) -> StorePrefix {
    StorePrefix::new(prefix).unwrap()
}

/// Checks the behaviour every store shares.
fn store_read_write_list<TStorage: ReadableWritableListableStorageTraits>(
    store: &TStorage,
) -> Result<(), Box<dyn std::error::Error>> {
    store.set(&key("a/b"), Bytes::from_static(&[0, 1, 2, 3]))?;
    store.set(&key("a/c"), Bytes::from_static(&[4]))?;
    store.set(&key("a/d/e"), Bytes::from_static(&[]))?;
    store.set(&key("f"), Bytes::from_static(&[5, 6]))?;

    assert_eq!(store.get(&key("a/b"))?, Some(Bytes::from_static(&[0, 1, 2, 3])));
    assert_eq!(store.get(&key("a/d/e"))?, Some(Bytes::new()));
    assert_eq!(store.get(&key("a/x"))?, None);
    assert_eq!(store.size_key(&key("a/b"))?, Some(4));
    assert_eq!(store.size_key(&key("a/x"))?, None);
    assert!(store.exists(&key("f"))?);
    assert!(!store.exists(&key("a"))?);

    assert_eq!(
        store.get_partial_values_key(
            &key("a/b"),
            &[
                ByteRange::FromStart(1, Some(2)),
                ByteRange::FromEnd(0, Some(1)),
                ByteRange::FromEnd(1, None),
            ]
        )?,
        Some(vec![
            Bytes::from_static(&[1, 2]),
            Bytes::from_static(&[3]),
            Bytes::from_static(&[0, 1, 2]),
        ])
    );
    assert!(store
        .get_partial_values_key(&key("a/b"), &[ByteRange::FromStart(3, Some(2))])
        .is_err());
    assert_eq!(
        store.get_partial_values_key(&key("a/x"), &[ByteRange::FromStart(0, None)])?,
        None
    );

    assert_eq!(
        store.list()?,
        vec![key("a/b"), key("a/c"), key("a/d/e"), key("f")]
    );
    assert_eq!(store.list_prefix(&prefix("a/d/"))?, vec![key("a/d/e")]);
    let list_dir = store.list_dir(&prefix("a/"))?;
    assert_eq!(list_dir.keys(), &vec![key("a/b"), key("a/c")]);
    assert_eq!(list_dir.prefixes(), &vec![prefix("a/d/")]);
    let list_dir = store.list_dir(&StorePrefix::root())?;
    assert_eq!(list_dir.keys(), &vec![key("f")]);
    assert_eq!(list_dir.prefixes(), &vec![prefix("a/")]);

    // Overwrite
    store.set(&key("f"), Bytes::from_static(&[7]))?;
    assert_eq!(store.get(&key("f"))?, Some(Bytes::from_static(&[7])));

    store.erase(&key("a/c"))?;
    assert!(!store.exists(&key("a/c"))?);
    store.erase_prefix(&prefix("a/"))?;
    assert_eq!(store.list()?, vec![key("f")]);
    assert!(store.list_prefix(&prefix("a/"))?.is_empty());
    Ok(())
}

#[test]
fn store_memory() -> Result<(), Box<dyn std::error::Error>> {
    store_read_write_list(&MemoryStore::new())
}

#[test]
#[cfg_attr(miri, ignore)]
fn store_filesystem() -> Result<(), Box<dyn std::error::Error>> {
    let path = tempfile::TempDir::new()?;
    store_read_write_list(&FilesystemStore::new(path.path())?.sorted())
}

#[test]
fn store_handle_prefixed() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let handle = StorageHandle::with_prefix(store.clone(), "/root/");
    store_read_write_list(&handle)?;
    assert_eq!(store.list()?, vec![key("root/f")]);

    assert_eq!(handle.key_path(&["a", "zarr.json"]), "root/a/zarr.json");
    assert_eq!(
        handle.resolve(&["a"]).resolve_key(&["c", "0"])?.as_str(),
        "root/a/c/0"
    );
    let unprefixed = StorageHandle::new(store);
    assert_eq!(unprefixed.key_path(&["a", "zarr.json"]), "a/zarr.json");
    assert_eq!(unprefixed.prefix(), "");
    Ok(())
}

#[test]
fn store_handle_array() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let handle = Arc::new(StorageHandle::with_prefix(store.clone(), "dataset"));

    let array = ArrayBuilder::new(
        vec![4, 4],
        DataType::Int32,
        vec![2, 2].try_into()?,
        FillValue::from(0i32),
    )
    .build(handle.clone(), "/array")?;
    array.store_metadata()?;
    array.write_elements::<i32>(Some(&[0, 0]), &[2, 2], vec![1, 2, 3, 4])?;

    // Keys are written beneath the handle prefix
    assert!(store.exists(&key("dataset/array/zarr.json"))?);
    assert!(store.exists(&key("dataset/array/c/0/0"))?);

    let array = Array::new(handle, "/array")?;
    assert_eq!(
        array.read_elements::<i32>(Some(&[0, 0]), Some(&[2, 3]))?,
        vec![1, 2, 0, 3, 4, 0]
    );
    Ok(())
}

#[test]
#[cfg_attr(miri, ignore)]
fn store_filesystem_persists() -> Result<(), Box<dyn std::error::Error>> {
    let path = tempfile::TempDir::new()?;
    {
        let store = Arc::new(FilesystemStore::new(path.path())?);
        let array = ArrayBuilder::new(
            vec![3],
            DataType::UInt16,
            vec![2].try_into()?,
            FillValue::from(9u16),
        )
        .build(store, "/")?;
        array.store_metadata()?;
        array.write_elements::<u16>(None, &[3], vec![1, 2, 3])?;
    }
    assert!(path.path().join("zarr.json").is_file());
    assert!(path.path().join("c").join("1").is_file());

    let store = Arc::new(FilesystemStore::new(path.path())?);
    let array = Array::new(store, "/")?;
    assert_eq!(array.read_elements::<u16>(None, None)?, vec![1, 2, 3]);
    Ok(())
}

use std::sync::Arc;

use zarrs_engine::{
    array::{Array, ArrayBuilder, DataType, FillValue, FillValueMetadata},
    storage::{store::MemoryStore, ReadableStorageTraits, StoreKey, WritableStorageTraits},
};

fn store_with_array(data_type: &str, fill_value: &str) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let metadata = format!(
        r#"{{
    "zarr_format": 3,
    "node_type": "array",
    "shape": [4],
    "data_type": "{data_type}",
    "chunk_grid": {{"name": "regular", "configuration": {{"chunk_shape": [2]}}}},
    "chunk_key_encoding": {{"name": "default"}},
    "fill_value": {fill_value},
    "codecs": [{{"name": "bytes", "configuration": {{"endian": "little"}}}}]
}}"#
    );
    store
        .set(&StoreKey::new("array/zarr.json").unwrap(), metadata.into_bytes().into())
        .unwrap();
    store
}

#[test]
fn fill_value_hex_string() -> Result<(), Box<dyn std::error::Error>> {
    let array = Array::new(store_with_array("uint32", r#""0x00010203""#), "/array")?;
    assert_eq!(array.read_elements::<u32>(None, None)?, vec![50_462_976; 4]);

    let array = Array::new(store_with_array("uint8", r#""0b00000010""#), "/array")?;
    assert_eq!(array.read_elements::<u8>(None, None)?, vec![2; 4]);
    Ok(())
}

#[test]
fn fill_value_non_finite() -> Result<(), Box<dyn std::error::Error>> {
    let array = Array::new(store_with_array("float32", r#""NaN""#), "/array")?;
    assert!(array
        .read_elements::<f32>(None, None)?
        .iter()
        .all(|element| element.is_nan()));

    let array = Array::new(store_with_array("float64", r#""-Infinity""#), "/array")?;
    assert_eq!(
        array.read_elements::<f64>(None, None)?,
        vec![f64::NEG_INFINITY; 4]
    );

    let array = Array::new(store_with_array("float64", r#""Infinity""#), "/array")?;
    assert_eq!(array.read_elements::<f64>(None, None)?, vec![f64::INFINITY; 4]);
    Ok(())
}

#[test]
fn fill_value_incompatible() {
    for (data_type, fill_value) in [
        ("uint8", "256"),
        ("int8", "-129"),
        ("bool", "1"),
        ("uint16", r#""NaN""#),
        ("uint8", r#""0x0001""#),
    ] {
        assert!(
            Array::new(store_with_array(data_type, fill_value), "/array").is_err(),
            "{data_type} {fill_value}"
        );
    }
}

#[test]
fn fill_value_metadata_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    for (data_type, fill_value, expected) in [
        (DataType::Float32, FillValue::from(f32::NEG_INFINITY), r#""-Infinity""#),
        (DataType::Float64, FillValue::from(f64::NAN), r#""NaN""#),
        (DataType::Int16, FillValue::from(-3i16), "-3"),
        (DataType::Bool, FillValue::from(true), "true"),
    ] {
        let array = ArrayBuilder::new(
            vec![4],
            data_type.clone(),
            vec![2].try_into()?,
            fill_value.clone(),
        )
        .build(store.clone(), "/array")?;
        array.store_metadata()?;

        let json: serde_json::Value = serde_json::from_slice(
            &store
                .get(&StoreKey::new("array/zarr.json")?)?
                .ok_or("missing metadata")?,
        )?;
        assert_eq!(json["fill_value"], serde_json::from_str::<serde_json::Value>(expected)?);

        let opened = Array::new(store.clone(), "/array")?;
        assert_eq!(opened.fill_value(), &fill_value);
        assert_eq!(
            data_type.metadata_fill_value(opened.fill_value())?,
            FillValueMetadata::try_from(expected)?
        );
    }
    Ok(())
}

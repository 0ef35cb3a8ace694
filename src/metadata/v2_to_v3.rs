use thiserror::Error;

use crate::{
    array::{
        chunk_grid::RegularChunkGridConfiguration,
        chunk_key_encoding::V2ChunkKeyEncodingConfiguration, DataType,
    },
    metadata::{
        v2::{
            data_type_metadata_v2_to_endianness, ArrayMetadataV2Order,
            DataTypeMetadataV2InvalidEndiannessError, FillValueMetadataV2, MetadataV2,
        },
        v3::fill_value::FillValueFloatStringNonFinite,
        ArrayMetadataV2, ArrayMetadataV3, FillValueMetadata, Metadata,
    },
};

/// An error converting Zarr V2 array metadata to V3.
#[derive(Debug, Error)]
pub enum ArrayMetadataV2ToV3ConversionError {
    /// Unsupported data type.
    #[error("unsupported data type {_0:?}")]
    UnsupportedDataType(String),
    /// Invalid data type endianness.
    #[error(transparent)]
    InvalidEndianness(#[from] DataTypeMetadataV2InvalidEndiannessError),
    /// An unsupported codec.
    #[error("unsupported codec {_0} with configuration {_1:?}")]
    UnsupportedCodec(String, serde_json::Map<String, serde_json::Value>),
    /// An unsupported fill value.
    #[error("unsupported fill value {_1:?} for data type {_0}")]
    UnsupportedFillValue(String, FillValueMetadataV2),
    /// Serialization/deserialization error.
    #[error("JSON serialization or deserialization error: {_0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Convert a Zarr V2 data type (e.g. `"<f8"`) to a [`DataType`].
///
/// # Errors
/// Returns [`ArrayMetadataV2ToV3ConversionError::UnsupportedDataType`] if the data type is not supported.
pub fn data_type_metadata_v2_to_v3_data_type(
    data_type: &str,
) -> Result<DataType, ArrayMetadataV2ToV3ConversionError> {
    match data_type {
        "|b1" => Ok(DataType::Bool),
        "|i1" => Ok(DataType::Int8),
        "<i2" | ">i2" => Ok(DataType::Int16),
        "<i4" | ">i4" => Ok(DataType::Int32),
        "<i8" | ">i8" => Ok(DataType::Int64),
        "|u1" => Ok(DataType::UInt8),
        "<u2" | ">u2" => Ok(DataType::UInt16),
        "<u4" | ">u4" => Ok(DataType::UInt32),
        "<u8" | ">u8" => Ok(DataType::UInt64),
        "<f4" | ">f4" => Ok(DataType::Float32),
        "<f8" | ">f8" => Ok(DataType::Float64),
        _ => Err(ArrayMetadataV2ToV3ConversionError::UnsupportedDataType(
            data_type.to_string(),
        )),
    }
}

/// Convert Zarr V2 fill value metadata to [`FillValueMetadata`] for `data_type`.
///
/// A `null` fill value maps to zero (or `false`).
///
/// # Errors
/// Returns [`ArrayMetadataV2ToV3ConversionError::UnsupportedFillValue`] if the fill value is not compatible with the data type.
pub fn array_metadata_fill_value_v2_to_v3(
    fill_value: &FillValueMetadataV2,
    data_type: &DataType,
) -> Result<FillValueMetadata, ArrayMetadataV2ToV3ConversionError> {
    let err = || {
        ArrayMetadataV2ToV3ConversionError::UnsupportedFillValue(
            data_type.to_string(),
            fill_value.clone(),
        )
    };
    let fill_value = match fill_value {
        FillValueMetadataV2::Null => match data_type {
            DataType::Bool => FillValueMetadata::Bool(false),
            DataType::Float32 | DataType::Float64 => FillValueMetadata::Float(0.0),
            _ => FillValueMetadata::UInt(0),
        },
        FillValueMetadataV2::NaN => {
            FillValueMetadata::NonFinite(FillValueFloatStringNonFinite::NaN)
        }
        FillValueMetadataV2::Infinity => {
            FillValueMetadata::NonFinite(FillValueFloatStringNonFinite::PosInfinity)
        }
        FillValueMetadataV2::NegInfinity => {
            FillValueMetadata::NonFinite(FillValueFloatStringNonFinite::NegInfinity)
        }
        FillValueMetadataV2::Bool(bool) => FillValueMetadata::Bool(*bool),
        FillValueMetadataV2::Number(number) => {
            if let Some(u) = number.as_u64() {
                FillValueMetadata::UInt(u)
            } else if let Some(i) = number.as_i64() {
                FillValueMetadata::Int(i)
            } else if let Some(f) = number.as_f64() {
                FillValueMetadata::Float(f)
            } else {
                return Err(err());
            }
        }
    };

    if *data_type == DataType::Bool {
        // numpy stores boolean fill values as 0/1
        match fill_value {
            FillValueMetadata::Bool(_) => Ok(fill_value),
            FillValueMetadata::UInt(0) => Ok(FillValueMetadata::Bool(false)),
            FillValueMetadata::UInt(1) => Ok(FillValueMetadata::Bool(true)),
            _ => Err(err()),
        }
    } else {
        Ok(fill_value)
    }
}

fn numcodecs_configuration_value<'a>(
    compressor: &'a MetadataV2,
    field: &str,
) -> Option<&'a serde_json::Value> {
    compressor.configuration().get(field)
}

/// Convert Zarr V2 (numcodecs) compressor metadata to a Zarr V3 bytes to bytes codec.
///
/// The supported compressors are `blosc`, `gzip`, and `zstd`.
///
/// # Errors
/// Returns [`ArrayMetadataV2ToV3ConversionError::UnsupportedCodec`] for any other compressor or an invalid configuration.
pub fn codec_metadata_v2_to_v3(
    compressor: &MetadataV2,
    data_type: &DataType,
) -> Result<Metadata, ArrayMetadataV2ToV3ConversionError> {
    let unsupported = || {
        ArrayMetadataV2ToV3ConversionError::UnsupportedCodec(
            compressor.id().to_string(),
            compressor.configuration().clone(),
        )
    };
    let mut configuration = serde_json::Map::new();
    match compressor.id() {
        "blosc" => {
            for field in ["cname", "clevel"] {
                let value =
                    numcodecs_configuration_value(compressor, field).ok_or_else(unsupported)?;
                configuration.insert(field.to_string(), value.clone());
            }
            let shuffle = match numcodecs_configuration_value(compressor, "shuffle")
                .and_then(serde_json::Value::as_i64)
            {
                Some(0) => "noshuffle",
                Some(1) => "shuffle",
                Some(2) => "bitshuffle",
                Some(-1) if data_type.size() == 1 => "bitshuffle",
                Some(-1) => "shuffle",
                _ => return Err(unsupported()),
            };
            configuration.insert("shuffle".to_string(), shuffle.into());
            configuration.insert("typesize".to_string(), data_type.size().into());
            let blocksize = numcodecs_configuration_value(compressor, "blocksize")
                .cloned()
                .unwrap_or_else(|| 0.into());
            configuration.insert("blocksize".to_string(), blocksize);
        }
        "gzip" => {
            let level = numcodecs_configuration_value(compressor, "level")
                .cloned()
                .unwrap_or_else(|| 1.into());
            configuration.insert("level".to_string(), level);
        }
        "zstd" => {
            let level = numcodecs_configuration_value(compressor, "level")
                .cloned()
                .unwrap_or_else(|| 1.into());
            let checksum = numcodecs_configuration_value(compressor, "checksum")
                .cloned()
                .unwrap_or_else(|| false.into());
            configuration.insert("level".to_string(), level);
            configuration.insert("checksum".to_string(), checksum);
        }
        _ => return Err(unsupported()),
    }
    Ok(Metadata::new_with_configuration(
        compressor.id(),
        configuration,
    ))
}

/// Convert Zarr V2 array metadata to V3.
///
/// The conversion maps:
///  - `chunks` to a `regular` chunk grid,
///  - `dtype` to a data type and the endianness of a `bytes` codec,
///  - `order: "F"` to a `transpose` codec with a reversed dimension order,
///  - `compressor` to a bytes to bytes codec (see [`codec_metadata_v2_to_v3`]),
///  - `dimension_separator` to a `v2` chunk key encoding, and
///  - `fill_value` to fill value metadata (see [`array_metadata_fill_value_v2_to_v3`]).
///
/// # Errors
/// Returns a [`ArrayMetadataV2ToV3ConversionError`] if the metadata is invalid or is not compatible with Zarr V3 metadata.
/// Filters are not supported.
pub fn array_metadata_v2_to_v3(
    array_metadata_v2: &ArrayMetadataV2,
) -> Result<ArrayMetadataV3, ArrayMetadataV2ToV3ConversionError> {
    let shape = array_metadata_v2.shape.clone();
    let chunk_grid = Metadata::new_with_serializable_configuration(
        crate::array::chunk_grid::regular::IDENTIFIER,
        &RegularChunkGridConfiguration {
            chunk_shape: array_metadata_v2.chunks.clone(),
        },
    )?;

    let data_type = data_type_metadata_v2_to_v3_data_type(&array_metadata_v2.dtype)?;
    let endianness = data_type_metadata_v2_to_endianness(&array_metadata_v2.dtype)?;
    let fill_value = array_metadata_fill_value_v2_to_v3(&array_metadata_v2.fill_value, &data_type)?;

    if let Some(filter) = array_metadata_v2.filters.iter().flatten().next() {
        return Err(ArrayMetadataV2ToV3ConversionError::UnsupportedCodec(
            filter.id().to_string(),
            filter.configuration().clone(),
        ));
    }

    let mut codecs: Vec<Metadata> = vec![];

    // Array to array codecs
    if array_metadata_v2.order == ArrayMetadataV2Order::F {
        let order: Vec<usize> = (0..array_metadata_v2.shape.len()).rev().collect();
        codecs.push(Metadata::new_with_configuration(
            "transpose",
            serde_json::Map::from_iter([("order".to_string(), order.into())]),
        ));
    }

    // Array to bytes codec
    let mut bytes_configuration = serde_json::Map::new();
    if let Some(endianness) = endianness {
        bytes_configuration.insert(
            "endian".to_string(),
            serde_json::to_value(endianness)?,
        );
    }
    codecs.push(Metadata::new_with_configuration(
        "bytes",
        bytes_configuration,
    ));

    // Bytes to bytes codec
    if let Some(compressor) = &array_metadata_v2.compressor {
        codecs.push(codec_metadata_v2_to_v3(compressor, &data_type)?);
    }

    let chunk_key_encoding = Metadata::new_with_serializable_configuration(
        crate::array::chunk_key_encoding::v2::IDENTIFIER,
        &V2ChunkKeyEncodingConfiguration {
            separator: array_metadata_v2.dimension_separator,
        },
    )?;

    Ok(ArrayMetadataV3::new(
        shape,
        data_type.metadata(),
        chunk_grid,
        chunk_key_encoding,
        fill_value,
        codecs,
    )
    .with_attributes(array_metadata_v2.attributes.clone()))
}

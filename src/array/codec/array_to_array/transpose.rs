//! The `transpose` array to array codec.
//!
//! Permutes the dimensions of arrays.
//!
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/codecs/transpose/v1.0.html>.

mod transpose_codec;
mod transpose_configuration;
mod transpose_partial_decoder;

pub use transpose_codec::{TransposeCodec, IDENTIFIER};
pub use transpose_configuration::{
    InvalidPermutationError, TransposeCodecConfiguration, TransposeCodecConfigurationV1,
    TransposeOrder,
};

use crate::array::codec::CodecError;

/// The axis order to apply when encoding, with a trailing axis for the bytes of each element.
fn calculate_order_encode(order: &TransposeOrder) -> Vec<usize> {
    let dimensionality = order.len();
    let mut permutation_encode = Vec::with_capacity(dimensionality + 1);
    permutation_encode.extend(order.as_slice());
    permutation_encode.push(dimensionality);
    permutation_encode
}

/// The inverse of [`calculate_order_encode`].
fn calculate_order_decode(order: &TransposeOrder) -> Vec<usize> {
    let dimensionality = order.len();
    let mut permutation_decode = vec![0; dimensionality + 1];
    for (i, axis) in order.as_slice().iter().enumerate() {
        permutation_decode[*axis] = i;
    }
    permutation_decode[dimensionality] = dimensionality;
    permutation_decode
}

/// Permute the axes of the C-order array `bytes` with shape `shape` and `element_size` bytes per element.
fn transpose_array(
    permutation: &[usize],
    shape: &[u64],
    element_size: usize,
    bytes: &[u8],
) -> Result<Vec<u8>, CodecError> {
    let mut shape_n = Vec::with_capacity(shape.len() + 1);
    for size in shape {
        shape_n.push(usize::try_from(*size).map_err(|_| CodecError::from("shape exceeds usize"))?);
    }
    shape_n.push(element_size);
    let array = ndarray::ArrayViewD::<u8>::from_shape(shape_n, bytes).map_err(|_| {
        CodecError::UnexpectedChunkDecodedSize(
            bytes.len(),
            shape.iter().product::<u64>() * element_size as u64,
        )
    })?;
    Ok(array.permuted_axes(permutation).iter().copied().collect())
}

fn permute<T: Clone>(v: &[T], order: &TransposeOrder) -> Vec<T> {
    order.as_slice().iter().map(|axis| v[*axis].clone()).collect()
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU64;

    use crate::{
        array::{
            codec::{ArrayCodecTraits, ArrayToArrayCodecTraits, ArrayToBytesCodecTraits, BytesCodec},
            ChunkRepresentation, DataType, FillValue,
        },
        array_subset::ArraySubset,
    };

    use super::*;

    fn representation(
        shape: &[u64],
        data_type: DataType,
        fill_value: FillValue,
    ) -> ChunkRepresentation {
        ChunkRepresentation::new(
            shape.iter().map(|s| NonZeroU64::new(*s).unwrap()).collect(),
            data_type,
            fill_value,
        )
        .unwrap()
    }

    fn codec_transpose_round_trip_impl(json: &str, data_type: DataType, fill_value: FillValue) {
        let chunk_representation = representation(&[2, 2, 3], data_type, fill_value);
        let size = chunk_representation.size_usize();
        let bytes: Vec<u8> = (0..size).map(|s| s as u8).collect();

        let configuration: TransposeCodecConfiguration = serde_json::from_str(json).unwrap();
        let codec = TransposeCodec::new_with_configuration(&configuration);

        let encoded = codec.encode(bytes.clone(), &chunk_representation).unwrap();
        assert_ne!(encoded, bytes);
        let decoded = codec.decode(encoded, &chunk_representation).unwrap();
        assert_eq!(bytes, decoded);
    }

    #[test]
    fn codec_transpose_round_trip_array1() {
        const JSON: &str = r#"{
            "order": [0, 2, 1]
        }"#;
        codec_transpose_round_trip_impl(JSON, DataType::UInt8, FillValue::from(0u8));
    }

    #[test]
    fn codec_transpose_round_trip_array2() {
        const JSON: &str = r#"{
            "order": [2, 1, 0]
        }"#;
        codec_transpose_round_trip_impl(JSON, DataType::UInt16, FillValue::from(0u16));
    }

    #[test]
    fn codec_transpose_encode_2d() {
        // [[0, 1, 2], [3, 4, 5]] -> [[0, 3], [1, 4], [2, 5]]
        let chunk_representation = representation(&[2, 3], DataType::UInt8, FillValue::from(0u8));
        let codec = TransposeCodec::new(TransposeOrder::new(&[1, 0]).unwrap());
        let encoded = codec
            .encode((0..6).collect(), &chunk_representation)
            .unwrap();
        assert_eq!(encoded, vec![0, 3, 1, 4, 2, 5]);

        let encoded_representation = codec.compute_encoded_size(&chunk_representation).unwrap();
        assert_eq!(encoded_representation.shape_u64(), vec![3, 2]);
    }

    #[test]
    fn codec_transpose_incompatible_dimensionality() {
        let chunk_representation = representation(&[2, 3], DataType::UInt8, FillValue::from(0u8));
        let codec = TransposeCodec::new(TransposeOrder::new(&[2, 1, 0]).unwrap());
        assert!(codec.compute_encoded_size(&chunk_representation).is_err());
        assert!(codec.encode(vec![0; 6], &chunk_representation).is_err());
    }

    #[test]
    fn codec_transpose_partial_decode() {
        let codec = TransposeCodec::new(TransposeOrder::new(&[1, 0]).unwrap());

        let chunk_representation =
            representation(&[4, 4], DataType::Float32, FillValue::from(0f32));
        let elements: Vec<f32> = (0..16).map(|i| i as f32).collect();
        let bytes = bytemuck::cast_slice(&elements).to_vec();

        let encoded = codec.encode(bytes, &chunk_representation).unwrap();
        let encoded_representation = codec.compute_encoded_size(&chunk_representation).unwrap();
        let bytes_codec = BytesCodec::default();
        let encoded = bytes_codec.encode(encoded, &encoded_representation).unwrap();

        let input_handle = Box::new(std::io::Cursor::new(encoded));
        let bytes_partial_decoder = bytes_codec
            .partial_decoder(input_handle, &encoded_representation)
            .unwrap();
        let partial_decoder = codec
            .partial_decoder(bytes_partial_decoder, &chunk_representation)
            .unwrap();

        let decoded_regions = [
            ArraySubset::new_with_ranges(&[0..4, 1..2]),
            ArraySubset::new_with_ranges(&[1..3, 1..4]),
        ];
        let decoded_partial_chunk = partial_decoder.partial_decode(&decoded_regions).unwrap();
        let decoded_partial_chunk: Vec<Vec<f32>> = decoded_partial_chunk
            .iter()
            .map(|bytes| bytemuck::pod_collect_to_vec(bytes))
            .collect();
        assert_eq!(
            decoded_partial_chunk,
            vec![
                vec![1.0, 5.0, 9.0, 13.0],
                vec![5.0, 6.0, 7.0, 9.0, 10.0, 11.0],
            ]
        );
    }
}

//! Zarr fill values.
//!
//! A fill value is the logical value of any element that has never been written,
//! either because its chunk is absent or because it lies in the padding of a chunk beyond the array bounds.
//!
//! See <https://zarr-specs.readthedocs.io/en/latest/v3/core/v3.0.html#fill-value>.

/// The fill value of a Zarr array.
///
/// The fill value is held as the native endian bytes of a single element.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FillValue(Vec<u8>);

impl core::fmt::Display for FillValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<Vec<u8>> for FillValue {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl From<bool> for FillValue {
    fn from(value: bool) -> Self {
        Self(vec![u8::from(value)])
    }
}

macro_rules! fill_value_from_primitive {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FillValue {
                fn from(value: $t) -> Self {
                    Self(value.to_ne_bytes().to_vec())
                }
            }
        )*
    };
}

fill_value_from_primitive!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl FillValue {
    /// Create a new fill value composed of native endian `bytes`.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the size in bytes of the fill value.
    #[must_use]
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Return the native endian byte representation of the fill value.
    #[must_use]
    pub fn as_ne_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Return a byte vector of `num_elements` repetitions of the fill value.
    #[must_use]
    pub fn repeat(&self, num_elements: usize) -> Vec<u8> {
        self.0.repeat(num_elements)
    }

    /// Check if the bytes are equal to a sequence of the fill value.
    ///
    /// Returns false if the length of `bytes` is not a multiple of the fill value size.
    #[must_use]
    pub fn equals_all(&self, bytes: &[u8]) -> bool {
        match self.0.as_slice() {
            [] => bytes.is_empty(),
            [fill_value] => bytes.iter().all(|byte| byte == fill_value),
            fill_value => {
                bytes.len() % fill_value.len() == 0
                    && bytes
                        .chunks_exact(fill_value.len())
                        .all(|element| element == fill_value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_value() {
        let fill_value = FillValue::from(1u16);
        assert_eq!(fill_value.size(), 2);
        assert_eq!(fill_value.as_ne_bytes(), 1u16.to_ne_bytes());
        assert_eq!(fill_value.repeat(2).len(), 4);
        assert!(fill_value.equals_all(&fill_value.repeat(3)));
        assert!(!fill_value.equals_all(&[0, 0, 1]));
        assert!(!fill_value.equals_all(&2u16.to_ne_bytes()));
        assert!(FillValue::from(false).equals_all(&[0; 8]));
        assert!(!FillValue::from(false).equals_all(&[0, 1]));
    }
}

use std::mem::transmute;

/// The Zarr "NaN" fill value for a 64-bit IEEE 754 floating point number.
///
/// This is the canonical quiet NaN: sign bit clear, all exponent bits set, and only the most significant mantissa bit set.
#[allow(clippy::unusual_byte_groupings)]
pub const ZARR_NAN_F64: f64 = unsafe {
    transmute::<u64, f64>(0b0_11111111111_1000000000000000000000000000000000000000000000000000)
};

/// The Zarr "NaN" fill value for a 32-bit IEEE 754 floating point number.
#[allow(clippy::unusual_byte_groupings)]
pub const ZARR_NAN_F32: f32 =
    unsafe { transmute::<u32, f32>(0b0_11111111_10000000000000000000000) };

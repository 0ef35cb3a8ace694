use derive_more::Display;

/// The encoded representation of the output of a codec: bytes of a fixed, bounded, or unbounded size.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum BytesRepresentation {
    /// The output size is fixed.
    #[display("fixed size: {_0}")]
    FixedSize(u64),
    /// The output size is bounded.
    #[display("bounded size: {_0}")]
    BoundedSize(u64),
    /// The output size is unbounded/indeterminate.
    #[display("unbounded size")]
    UnboundedSize,
}

impl BytesRepresentation {
    /// Return the fixed or bounded size of the bytes representations, or [`None`] if the size is unbounded.
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        match self {
            Self::FixedSize(size) | Self::BoundedSize(size) => Some(*size),
            Self::UnboundedSize => None,
        }
    }

    /// Return the fixed size, or [`None`] if the size is bounded or unbounded.
    #[must_use]
    pub const fn fixed_size(&self) -> Option<u64> {
        match self {
            Self::FixedSize(size) => Some(*size),
            Self::BoundedSize(_) | Self::UnboundedSize => None,
        }
    }
}

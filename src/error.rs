//! Error taxonomy for the encoding pipeline.

/// Errors that can occur while encoding a payload into a QR code PNG.
///
/// Encoding never partially succeeds: the caller either gets a complete PNG
/// buffer or one of these. Retrying with the same payload reproduces the
/// same outcome, so callers should surface the message rather than retry.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// A single segment holds more characters than the character count
    /// field of any supported symbol version can express.
    #[error("Payload segment is too long for any supported symbol version")]
    SegmentTooLong,

    /// The payload does not fit the largest allowed symbol at the
    /// configured error correction level.
    #[error("Payload needs {needed} bits but the largest allowed symbol holds {capacity} bits")]
    OverCapacity {
        /// Bits required to encode the payload.
        needed: usize,
        /// Data capacity in bits of the largest version tried.
        capacity: usize,
    },

    /// PNG serialization of the raster image failed.
    #[error("Failed to serialize PNG: {0}")]
    Image(#[from] image::ImageError),
}

impl EncodeError {
    /// Whether this is a capacity-class failure (payload too large), as
    /// opposed to an image serialization failure.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            EncodeError::SegmentTooLong | EncodeError::OverCapacity { .. }
        )
    }
}

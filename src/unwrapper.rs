//! Envelope unwrapping: normalize, walk, classify.

use alloc::vec::Vec;

use crate::{
    encoding::EncodedEnvelope,
    errors::{Error, Result},
    payload::{is_p7m_file_name, DecodedPayload},
    signed_data::{ContentInfo, DEFAULT_MAX_NESTING},
};

/// Default bound on signature layers peeled by [`Unwrapper::unwrap_nested`].
pub const DEFAULT_MAX_LAYERS: usize = 4;

/// What to do with bytes following the outer `ContentInfo`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum TrailingData {
    /// Ignore them.
    #[default]
    Allow,

    /// Fail with [`Error::MalformedDer`] at the first trailing byte.
    Reject,
}

/// Unwrapping configuration.
///
/// ```
/// # fn main() -> Result<(), p7m::Error> {
/// use p7m::{TrailingData, Unwrapper};
///
/// let unwrapper = Unwrapper::new()
///     .max_nesting(2)
///     .trailing_data(TrailingData::Reject);
///
/// assert_eq!(unwrapper.unwrap(b"", "empty.p7m"), Err(p7m::Error::EmptyInput));
/// # Ok(())
/// # }
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Unwrapper {
    max_nesting: usize,
    max_layers: usize,
    trailing_data: TrailingData,
}

impl Default for Unwrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Unwrapper {
    /// Unwrapper with the default limits.
    pub const fn new() -> Self {
        Self {
            max_nesting: DEFAULT_MAX_NESTING,
            max_layers: DEFAULT_MAX_LAYERS,
            trailing_data: TrailingData::Allow,
        }
    }

    /// Maximum depth of nested constructed OCTET STRING fragments.
    pub const fn max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Maximum number of signature layers removed by
    /// [`Unwrapper::unwrap_nested`]. Values below 1 are treated as 1.
    pub const fn max_layers(mut self, max_layers: usize) -> Self {
        self.max_layers = max_layers;
        self
    }

    /// Handling of bytes after the outer `ContentInfo`.
    pub const fn trailing_data(mut self, trailing_data: TrailingData) -> Self {
        self.trailing_data = trailing_data;
        self
    }

    /// Recover the signed content of a DER or PEM envelope.
    pub fn extract(&self, envelope: &[u8]) -> Result<Vec<u8>> {
        let envelope = EncodedEnvelope::new(envelope)?;
        let der = envelope.to_der()?;

        let content_info = ContentInfo::from_der(&der)?;
        if self.trailing_data == TrailingData::Reject && content_info.encoded_len() < der.len() {
            return Err(Error::MalformedDer {
                offset: content_info.encoded_len(),
            });
        }

        let content = content_info
            .signed_data()?
            .encap_content_info
            .content_with_nesting(self.max_nesting)?;

        log::debug!(
            "extracted {} content bytes from {} byte {:?} envelope",
            content.len(),
            envelope.as_bytes().len(),
            envelope.encoding()
        );

        Ok(content)
    }

    /// Recover and classify the signed content of the envelope named
    /// `original_name`.
    pub fn unwrap(&self, envelope: &[u8], original_name: &str) -> Result<DecodedPayload> {
        let content = self.extract(envelope)?;
        Ok(DecodedPayload::classify(content, original_name))
    }

    /// Like [`Unwrapper::unwrap`], then keep unwrapping while the payload is
    /// itself named `*.p7m` and decodes as a signed envelope.
    ///
    /// An inner layer that fails to decode ends the walk; the payload of the
    /// last successful layer is returned.
    pub fn unwrap_nested(&self, envelope: &[u8], original_name: &str) -> Result<NestedPayload> {
        let mut payload = self.unwrap(envelope, original_name)?;
        let mut layers = 1;

        while layers < self.max_layers && is_p7m_file_name(&payload.suggested_name) {
            match self.unwrap(&payload.bytes, &payload.suggested_name) {
                Ok(inner) => {
                    payload = inner;
                    layers += 1;
                }
                Err(err) => {
                    log::debug!(
                        "\"{}\" is not a nested envelope: {}",
                        payload.suggested_name,
                        err
                    );
                    break;
                }
            }
        }

        Ok(NestedPayload { payload, layers })
    }
}

/// Innermost payload of a multiply signed envelope.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NestedPayload {
    /// Innermost content that could be recovered.
    pub payload: DecodedPayload,

    /// Number of signature layers removed.
    pub layers: usize,
}

/// Recover and classify the signed content of the envelope named
/// `original_name` using the default [`Unwrapper`].
pub fn unwrap(envelope: &[u8], original_name: &str) -> Result<DecodedPayload> {
    Unwrapper::new().unwrap(envelope, original_name)
}

/// Remove every signature layer of a `*.p7m.p7m` style envelope using the
/// default [`Unwrapper`].
pub fn unwrap_nested(envelope: &[u8], original_name: &str) -> Result<NestedPayload> {
    Unwrapper::new().unwrap_nested(envelope, original_name)
}

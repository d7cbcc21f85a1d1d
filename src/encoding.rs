//! Envelope encoding detection and normalization to DER.

use alloc::borrow::Cow;

use crate::errors::{Error, Result};

/// Textual marker that starts every PEM document.
const PEM_MARKER: &[u8] = b"-----BEGIN";

/// Encoding of a signed envelope.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Encoding {
    /// Binary ASN.1.
    Der,

    /// Base64 DER between `-----BEGIN`/`-----END` boundaries.
    Pem,

    /// No content to look at.
    Unknown,
}

impl Encoding {
    /// Detect the encoding of `bytes`.
    ///
    /// PEM is recognized by its textual marker after leading whitespace;
    /// anything else with content is assumed to be DER.
    pub fn detect(bytes: &[u8]) -> Self {
        let start = bytes
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(bytes.len());

        match &bytes[start..] {
            [] => Encoding::Unknown,
            rest if rest.starts_with(PEM_MARKER) => Encoding::Pem,
            _ => Encoding::Der,
        }
    }
}

/// Raw envelope bytes tagged with their detected [`Encoding`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EncodedEnvelope<'a> {
    bytes: &'a [u8],
    encoding: Encoding,
}

impl<'a> EncodedEnvelope<'a> {
    /// Wrap `bytes`, detecting their encoding.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        match Encoding::detect(bytes) {
            Encoding::Unknown => Err(Error::EmptyInput),
            encoding => Ok(Self { bytes, encoding }),
        }
    }

    /// Detected encoding.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Envelope bytes as supplied.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Canonical DER for the envelope. DER input is borrowed as is.
    pub fn to_der(&self) -> Result<Cow<'a, [u8]>> {
        log::debug!(
            "normalizing {} byte envelope ({:?})",
            self.bytes.len(),
            self.encoding
        );

        match self.encoding {
            Encoding::Der => Ok(Cow::Borrowed(self.bytes)),
            Encoding::Pem => pem_to_der(self.bytes).map(Cow::Owned),
            Encoding::Unknown => Err(Error::EmptyInput),
        }
    }
}

#[cfg(feature = "pem")]
fn pem_to_der(pem: &[u8]) -> Result<alloc::vec::Vec<u8>> {
    crate::pem::decode_vec(pem).map(|(_, der)| der)
}

#[cfg(not(feature = "pem"))]
fn pem_to_der(_pem: &[u8]) -> Result<alloc::vec::Vec<u8>> {
    Err(Error::UnsupportedEncoding { offset: 0 })
}

//! Error types.

use const_oid::ObjectIdentifier;
use core::fmt;

/// Alias for [`core::result::Result`] with the `p7m` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Envelope contains no bytes.
    EmptyInput,

    /// PEM boundaries present but the footer is missing, the label is not a
    /// PKCS#7/CMS label, or the body is not valid Base64.
    MalformedPem,

    /// A TLV runs past the end of its enclosing buffer, or a required field
    /// is missing or carries the wrong tag.
    MalformedDer {
        /// Offset into the DER document where parsing failed.
        offset: usize,
    },

    /// Content type is not one this crate can unwrap.
    UnsupportedContentType {
        /// Content type found in the document.
        oid: ObjectIdentifier,
    },

    /// Indefinite-length BER, or PEM input with the `pem` feature disabled.
    UnsupportedEncoding {
        /// Offset into the document where the encoding was rejected.
        offset: usize,
    },

    /// SignedData carries no `eContent`: the signature is detached.
    DetachedSignature,
}

impl Error {
    /// Offset into the DER document at which parsing failed, if known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::MalformedDer { offset } | Error::UnsupportedEncoding { offset } => Some(*offset),
            _ => None,
        }
    }
}

impl core::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input"),
            Error::MalformedPem => write!(f, "malformed PEM envelope"),
            Error::MalformedDer { offset } => write!(f, "malformed DER at offset {}", offset),
            Error::UnsupportedContentType { oid } => {
                write!(f, "unsupported content type: {}", oid)
            }
            Error::UnsupportedEncoding { offset } => {
                write!(f, "unsupported encoding at offset {}", offset)
            }
            Error::DetachedSignature => write!(f, "detached signature: no content to recover"),
        }
    }
}

#![cfg_attr(not(test), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Usage
//!
//! The [`unwrap`] function recovers the signed content of a `.p7m` file in
//! either DER or PEM form, and classifies it by the name it had before it
//! was signed:
//!
//! ```
//! # fn main() -> Result<(), p7m::Error> {
//! let envelope = include_bytes!("../tests/examples/p7m/fattura.xml.p7m");
//! let payload = p7m::unwrap(envelope, "fattura.xml.p7m")?;
//!
//! assert_eq!(payload.suggested_name, "fattura.xml");
//! assert_eq!(payload.mime_type, "application/xml");
//! assert!(payload.text().unwrap().contains("<FatturaElettronica"));
//! # Ok(())
//! # }
//! ```
//!
//! Signatures are **not** verified: certificates and signer infos are
//! skipped by length. Callers that need to trust the signer must validate
//! the envelope separately.
//!
//! PEC attachments are often signed more than once (`fattura.xml.p7m.p7m`).
//! [`unwrap_nested`] removes every layer:
//!
//! ```
//! # fn main() -> Result<(), p7m::Error> {
//! let envelope = include_bytes!("../tests/examples/p7m/fattura.xml.p7m");
//! let nested = p7m::unwrap_nested(envelope, "fattura.xml.p7m")?;
//! assert_eq!(nested.layers, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Inspecting the envelope
//!
//! [`ContentInfo`] and [`SignedData`] expose the decoded structure for
//! callers that need more than the payload:
//!
//! ```
//! # fn main() -> Result<(), p7m::Error> {
//! use p7m::{ContentInfo, ID_DATA};
//!
//! let der = include_bytes!("../tests/examples/p7m/fattura.xml.p7m");
//! let signed_data = ContentInfo::from_der(der)?.signed_data()?;
//!
//! assert_eq!(signed_data.version, [1]);
//! assert_eq!(signed_data.encap_content_info.econtent_type, ID_DATA);
//! assert!(signed_data.certificates.is_some());
//! # Ok(())
//! # }
//! ```

#[cfg(doctest)]
pub struct ReadmeDoctests;

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub use const_oid::ObjectIdentifier;

mod asn1;
pub mod content_type;
pub mod encoding;
pub mod errors;
mod payload;
#[cfg(feature = "pem")]
pub mod pem;
mod signed_data;
mod unwrapper;

pub use crate::{
    content_type::{ContentType, ContentTypeTable, CONTENT_TYPES},
    encoding::{EncodedEnvelope, Encoding},
    errors::{Error, Result},
    payload::{is_p7m_file_name, suggested_name, DecodedPayload},
    signed_data::{
        ContentInfo, EncapsulatedContentInfo, SignedData, DEFAULT_MAX_NESTING, ID_DATA,
        ID_SIGNED_DATA,
    },
    unwrapper::{
        unwrap, unwrap_nested, NestedPayload, TrailingData, Unwrapper, DEFAULT_MAX_LAYERS,
    },
};

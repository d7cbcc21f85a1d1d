//! PKCS#7 / CMS `ContentInfo` and `SignedData` as described in [RFC 5652].
//!
//! Decoding stops at what is needed to recover the encapsulated content.
//! Certificates, CRLs and signer infos are located by their lengths and
//! exposed as raw DER, but never parsed or verified.
//!
//! [RFC 5652]: https://www.rfc-editor.org/rfc/rfc5652

use alloc::vec::Vec;
use const_oid::ObjectIdentifier;

use der::{Tag, TagNumber};

use crate::asn1::{context_specific, Reader, Tlv};
use crate::errors::{Error, Result};

/// ObjectID for the PKCS#7 `data` content type.
pub const ID_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.1");

/// ObjectID for the PKCS#7 `signedData` content type.
pub const ID_SIGNED_DATA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.2");

/// Default bound on nested constructed OCTET STRING levels.
pub const DEFAULT_MAX_NESTING: usize = 8;

/// Outer `ContentInfo` wrapper.
///
/// ```text
/// ContentInfo ::= SEQUENCE {
///     contentType ContentType,
///     content [0] EXPLICIT ANY DEFINED BY contentType }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContentInfo<'a> {
    /// Type of the wrapped content.
    pub content_type: ObjectIdentifier,
    content: Option<Tlv<'a>>,
    encoded_len: usize,
}

impl<'a> ContentInfo<'a> {
    /// Decode the `ContentInfo` at the start of `der`.
    ///
    /// Bytes after the outer SEQUENCE are ignored; see
    /// [`ContentInfo::encoded_len`].
    pub fn from_der(der: &'a [u8]) -> Result<Self> {
        let outer = Reader::new(der)?.read_expected(Tag::Sequence)?;
        let mut reader = outer.reader()?;

        let content_type = reader.read_expected(Tag::ObjectIdentifier)?.oid()?;
        let content = reader.read_optional(context_specific(TagNumber::N0))?;

        Ok(Self {
            content_type,
            content,
            encoded_len: outer.encoded_len(),
        })
    }

    /// Number of bytes taken by the outer SEQUENCE.
    pub fn encoded_len(&self) -> usize {
        self.encoded_len
    }

    /// Decode the wrapped content as `SignedData`.
    pub fn signed_data(&self) -> Result<SignedData<'a>> {
        if self.content_type != ID_SIGNED_DATA {
            return Err(Error::UnsupportedContentType {
                oid: self.content_type,
            });
        }

        let explicit = self.content.ok_or(Error::MalformedDer {
            offset: self.encoded_len,
        })?;
        let sequence = explicit.reader()?.read_expected(Tag::Sequence)?;

        SignedData::decode(sequence)
    }
}

/// Signed content plus its (unverified) signatures.
///
/// ```text
/// SignedData ::= SEQUENCE {
///     version CMSVersion,
///     digestAlgorithms SET OF DigestAlgorithmIdentifier,
///     encapContentInfo EncapsulatedContentInfo,
///     certificates [0] IMPLICIT CertificateSet OPTIONAL,
///     crls [1] IMPLICIT RevocationInfoChoices OPTIONAL,
///     signerInfos SignerInfos }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedData<'a> {
    /// Content octets of the `version` INTEGER, as encoded.
    pub version: &'a [u8],

    /// DER of the `digestAlgorithms` SET contents.
    pub digest_algorithms: &'a [u8],

    /// Type and (optionally) value of the signed content.
    pub encap_content_info: EncapsulatedContentInfo<'a>,

    /// DER of the `certificates` field contents, if present.
    pub certificates: Option<&'a [u8]>,

    /// DER of the `crls` field contents, if present.
    pub crls: Option<&'a [u8]>,

    /// DER of the `signerInfos` SET contents, if present.
    pub signer_infos: Option<&'a [u8]>,
}

impl<'a> SignedData<'a> {
    /// Decode a bare `SignedData` SEQUENCE (without the `ContentInfo`).
    pub fn from_der(der: &'a [u8]) -> Result<Self> {
        Self::decode(Reader::new(der)?.read_expected(Tag::Sequence)?)
    }

    fn decode(sequence: Tlv<'a>) -> Result<Self> {
        let mut reader = sequence.reader()?;

        let version = reader.read_expected(Tag::Integer)?.value;
        let digest_algorithms = reader.read_expected(Tag::Set)?.value;
        let encap_content_info =
            EncapsulatedContentInfo::decode(reader.read_expected(Tag::Sequence)?)?;

        let mut signed_data = Self {
            version,
            digest_algorithms,
            encap_content_info,
            certificates: None,
            crls: None,
            signer_infos: None,
        };

        while !reader.is_finished() {
            let field = reader.read_tlv()?;
            let slot = match field.tag {
                tag if tag == context_specific(TagNumber::N0) => &mut signed_data.certificates,
                tag if tag == context_specific(TagNumber::N1) => &mut signed_data.crls,
                Tag::Set => &mut signed_data.signer_infos,
                _ => {
                    return Err(Error::MalformedDer {
                        offset: field.offset,
                    })
                }
            };

            if slot.replace(field.value).is_some() {
                return Err(Error::MalformedDer {
                    offset: field.offset,
                });
            }
        }

        log::trace!(
            "SignedData version={:02x?} certificates={} crls={} signer_infos={}",
            version,
            signed_data.certificates.is_some(),
            signed_data.crls.is_some(),
            signed_data.signer_infos.is_some()
        );

        Ok(signed_data)
    }
}

/// ```text
/// EncapsulatedContentInfo ::= SEQUENCE {
///     eContentType ContentType,
///     eContent [0] EXPLICIT OCTET STRING OPTIONAL }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncapsulatedContentInfo<'a> {
    /// Type of the signed content.
    pub econtent_type: ObjectIdentifier,
    econtent: Option<Tlv<'a>>,
}

impl<'a> EncapsulatedContentInfo<'a> {
    fn decode(sequence: Tlv<'a>) -> Result<Self> {
        let mut reader = sequence.reader()?;
        let econtent_type = reader.read_expected(Tag::ObjectIdentifier)?.oid()?;
        let econtent = reader.read_optional(context_specific(TagNumber::N0))?;

        if !reader.is_finished() {
            return Err(Error::MalformedDer {
                offset: reader.offset(),
            });
        }

        Ok(Self {
            econtent_type,
            econtent,
        })
    }

    /// Does the signature refer to content carried elsewhere?
    pub fn is_detached(&self) -> bool {
        self.econtent.is_none()
    }

    /// Recover the signed `id-data` content.
    pub fn content(&self) -> Result<Vec<u8>> {
        self.content_with_nesting(DEFAULT_MAX_NESTING)
    }

    /// Recover the signed `id-data` content, following at most `max_nesting`
    /// levels of constructed OCTET STRING fragments.
    pub fn content_with_nesting(&self, max_nesting: usize) -> Result<Vec<u8>> {
        let explicit = self.econtent.ok_or(Error::DetachedSignature)?;

        if self.econtent_type != ID_DATA {
            return Err(Error::UnsupportedContentType {
                oid: self.econtent_type,
            });
        }

        let mut reader = explicit.reader()?;
        let mut content = Vec::with_capacity(explicit.value.len());
        reader.read_octet_string_into(&mut content, max_nesting)?;

        if !reader.is_finished() {
            return Err(Error::MalformedDer {
                offset: reader.offset(),
            });
        }

        Ok(content)
    }
}

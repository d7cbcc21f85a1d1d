//! TLV walking on top of the `der` crate.
//!
//! Only the subset needed to reach `encapContentInfo.eContent` inside a
//! PKCS#7 / CMS `SignedData` is understood. Tags and definite lengths are
//! decoded by [`der`]; OCTET STRINGs in BER constructed form, which `der`
//! does not model, are reassembled here. Indefinite lengths are rejected.
//!
//! Every offset reported in an [`Error`] is absolute, i.e. relative to the
//! start of the DER document rather than to the enclosing TLV. A
//! [`Error::MalformedDer`] points at the identifier octet of the TLV that
//! could not be decoded.

use alloc::vec::Vec;
use const_oid::ObjectIdentifier;
use der::{Decode, Length, Reader as _, SliceReader, Tag, TagNumber};

use crate::errors::{Error, Result};

/// Identifier octet of a constructed (BER only) OCTET STRING.
const OCTET_STRING_CONSTRUCTED: u8 = 0x24;

/// Length octet announcing an indefinite length.
const INDEFINITE_LENGTH: u8 = 0x80;

/// Constructed context-specific tag `[number]`, as used by `EXPLICIT`
/// tagging and by `IMPLICIT` tagging of `SET OF` fields.
pub(crate) const fn context_specific(number: TagNumber) -> Tag {
    Tag::ContextSpecific {
        constructed: true,
        number,
    }
}

/// A single decoded TLV borrowed from the input.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Tlv<'a> {
    pub tag: Tag,
    /// Absolute offset of the identifier octet.
    pub offset: usize,
    /// Absolute offset of the first value octet.
    pub value_offset: usize,
    pub value: &'a [u8],
}

impl<'a> Tlv<'a> {
    /// Reader over the value octets of this TLV.
    pub fn reader(&self) -> Result<Reader<'a>> {
        Reader::nested(self.value, self.value_offset)
    }

    /// Length of the complete encoding, identifier and length octets included.
    pub fn encoded_len(&self) -> usize {
        self.value_offset - self.offset + self.value.len()
    }

    /// Fail unless this TLV carries `tag`.
    pub fn expect_tag(self, tag: Tag) -> Result<Self> {
        if self.tag == tag {
            Ok(self)
        } else {
            Err(Error::MalformedDer {
                offset: self.offset,
            })
        }
    }

    /// Decode the value octets as an OBJECT IDENTIFIER.
    pub fn oid(&self) -> Result<ObjectIdentifier> {
        ObjectIdentifier::from_bytes(self.value).map_err(|_| Error::MalformedDer {
            offset: self.value_offset,
        })
    }
}

/// Cursor over a DER buffer reporting absolute offsets.
#[derive(Clone, Debug)]
pub(crate) struct Reader<'a> {
    inner: SliceReader<'a>,
    /// Absolute offset of the first byte of `inner`.
    base: usize,
}

impl<'a> Reader<'a> {
    /// Reader over a complete DER document.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        Self::nested(bytes, 0)
    }

    /// Reader over `bytes`, which start at absolute offset `base`.
    fn nested(bytes: &'a [u8], base: usize) -> Result<Self> {
        let inner = SliceReader::new(bytes).map_err(|_| Error::MalformedDer { offset: base })?;
        Ok(Self { inner, base })
    }

    /// Absolute offset of the next unread byte.
    pub fn offset(&self) -> usize {
        // `SliceReader::new` caps the input at `Length::MAX`, which fits
        let position = usize::try_from(self.inner.position()).unwrap_or_default();
        self.base + position
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Tag of the next TLV without consuming it.
    pub fn peek_tag(&self) -> Option<Tag> {
        self.inner.peek_tag().ok()
    }

    /// Decode the length octets of the TLV whose identifier is at `offset`.
    fn read_length(&mut self, offset: usize) -> Result<Length> {
        if self.inner.peek_byte() == Some(INDEFINITE_LENGTH) {
            return Err(Error::UnsupportedEncoding {
                offset: self.offset(),
            });
        }

        Length::decode(&mut self.inner).map_err(|_| Error::MalformedDer { offset })
    }

    /// Take `length` value octets of the TLV whose identifier is at `offset`.
    fn read_value(&mut self, offset: usize, length: Length) -> Result<(usize, &'a [u8])> {
        let value_offset = self.offset();
        let value = self
            .inner
            .read_slice(length)
            .map_err(|_| Error::MalformedDer { offset })?;

        Ok((value_offset, value))
    }

    /// Read the next TLV, checking that its value fits in the buffer.
    pub fn read_tlv(&mut self) -> Result<Tlv<'a>> {
        let offset = self.offset();
        let tag = Tag::decode(&mut self.inner).map_err(|_| Error::MalformedDer { offset })?;
        let length = self.read_length(offset)?;
        let (value_offset, value) = self.read_value(offset, length)?;

        log::trace!("TLV tag={} offset={} len={}", tag, offset, value.len());

        Ok(Tlv {
            tag,
            offset,
            value_offset,
            value,
        })
    }

    /// Read the next TLV and fail unless it carries `tag`.
    pub fn read_expected(&mut self, tag: Tag) -> Result<Tlv<'a>> {
        self.read_tlv()?.expect_tag(tag)
    }

    /// Read the next TLV only if it carries `tag`.
    pub fn read_optional(&mut self, tag: Tag) -> Result<Option<Tlv<'a>>> {
        if self.peek_tag() == Some(tag) {
            self.read_tlv().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read an OCTET STRING and append its contents to `out`.
    ///
    /// Constructed strings are reassembled by concatenating their fragments
    /// in order. `depth` bounds how many constructed levels are followed.
    pub fn read_octet_string_into(&mut self, out: &mut Vec<u8>, depth: usize) -> Result<()> {
        if self.inner.peek_byte() != Some(OCTET_STRING_CONSTRUCTED) {
            let octets = self.read_expected(Tag::OctetString)?;
            out.extend_from_slice(octets.value);
            return Ok(());
        }

        let offset = self.offset();
        if depth == 0 {
            return Err(Error::MalformedDer { offset });
        }

        self.inner
            .read_byte()
            .map_err(|_| Error::MalformedDer { offset })?;
        let length = self.read_length(offset)?;
        let (value_offset, value) = self.read_value(offset, length)?;

        log::trace!(
            "constructed OCTET STRING offset={} len={}",
            offset,
            value.len()
        );

        let mut fragments = Reader::nested(value, value_offset)?;
        while !fragments.is_finished() {
            fragments.read_octet_string_into(out, depth - 1)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn read_tlv(bytes: &[u8]) -> Result<Tlv<'_>> {
        Reader::new(bytes).unwrap().read_tlv()
    }

    #[test]
    fn test_short_and_long_form_lengths() {
        let short = hex!("04 03 616263");
        let tlv = read_tlv(&short).unwrap();
        assert_eq!(tlv.tag, Tag::OctetString);
        assert_eq!(tlv.value, b"abc");
        assert_eq!(tlv.value_offset, 2);
        assert_eq!(tlv.encoded_len(), 5);

        let mut one_octet = vec![0x04, 0x81, 0x80];
        one_octet.extend_from_slice(&[0x55; 0x80]);
        let tlv = read_tlv(&one_octet).unwrap();
        assert_eq!(tlv.value.len(), 0x80);
        assert_eq!(tlv.value_offset, 3);

        let mut two_octets = vec![0x04, 0x82, 0x01, 0x00];
        two_octets.extend_from_slice(&[0xaa; 256]);
        let tlv = read_tlv(&two_octets).unwrap();
        assert_eq!(tlv.value.len(), 256);
        assert_eq!(tlv.encoded_len(), two_octets.len());
    }

    #[test]
    fn test_indefinite_length_rejected() {
        let ber = hex!("30 80 0201 01 0000");
        assert_eq!(
            read_tlv(&ber),
            Err(Error::UnsupportedEncoding { offset: 1 })
        );
    }

    #[test]
    fn test_truncated_input() {
        // length runs past the end of the buffer
        assert_eq!(
            read_tlv(&hex!("30 05 0201")),
            Err(Error::MalformedDer { offset: 0 })
        );
        // long form length with missing octets
        assert_eq!(
            read_tlv(&hex!("30 82 06")),
            Err(Error::MalformedDer { offset: 0 })
        );
        // no length at all
        assert_eq!(read_tlv(&hex!("30")), Err(Error::MalformedDer { offset: 0 }));
        // too many length octets
        assert_eq!(
            read_tlv(&hex!("30 89 0000000000000000 01")),
            Err(Error::MalformedDer { offset: 0 })
        );
    }

    #[test]
    fn test_non_minimal_length_rejected() {
        assert_eq!(
            read_tlv(&hex!("04 81 03 616263")),
            Err(Error::MalformedDer { offset: 0 })
        );
    }

    #[test]
    fn test_nested_offsets_are_absolute() {
        let der = hex!("30 07 02 01 01 04 82 00 01");
        let outer = read_tlv(&der).unwrap();
        let mut reader = outer.reader().unwrap();

        assert_eq!(reader.read_expected(Tag::Integer).unwrap().value_offset, 4);
        assert_eq!(reader.offset(), 5);
        assert_eq!(
            reader.read_tlv(),
            Err(Error::MalformedDer { offset: 5 })
        );
    }

    #[test]
    fn test_high_tag_number_rejected() {
        assert_eq!(
            read_tlv(&hex!("1f 81 00 00")),
            Err(Error::MalformedDer { offset: 0 })
        );
    }

    #[test]
    fn test_oid() {
        let der = hex!("06 09 2a864886f70d010702");
        let tlv = Reader::new(&der)
            .unwrap()
            .read_expected(Tag::ObjectIdentifier)
            .unwrap();
        assert_eq!(
            tlv.oid().unwrap(),
            ObjectIdentifier::new_unwrap("1.2.840.113549.1.7.2")
        );
    }

    #[test]
    fn test_constructed_octet_string() {
        // "he" + ("ll" + "o")
        let der = hex!("24 0d 04 02 6865 24 07 04 02 6c6c 04 01 6f");

        let mut out = Vec::new();
        Reader::new(&der)
            .unwrap()
            .read_octet_string_into(&mut out, 4)
            .unwrap();
        assert_eq!(out, b"hello");

        let mut out = Vec::new();
        assert_eq!(
            Reader::new(&der)
                .unwrap()
                .read_octet_string_into(&mut out, 1),
            Err(Error::MalformedDer { offset: 6 })
        );
    }

    #[test]
    fn test_constructed_octet_string_bad_fragment() {
        // a NULL among the fragments
        let der = hex!("24 05 04 01 61 05 00");
        let mut out = Vec::new();
        assert_eq!(
            Reader::new(&der)
                .unwrap()
                .read_octet_string_into(&mut out, 4),
            Err(Error::MalformedDer { offset: 5 })
        );
    }

    #[test]
    fn test_wrong_tag() {
        let der = hex!("31 00");
        assert_eq!(
            Reader::new(&der).unwrap().read_expected(Tag::Sequence),
            Err(Error::MalformedDer { offset: 0 })
        );
        assert_eq!(
            Reader::new(&der).unwrap().read_optional(Tag::Sequence),
            Ok(None)
        );
    }
}

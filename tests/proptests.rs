//! Property-based tests.

use hex_literal::hex;
use p7m::Error;
use proptest::prelude::*;

const ID_DATA: [u8; 11] = hex!("06 09 2a864886f70d010701");
const ID_SIGNED_DATA: [u8; 11] = hex!("06 09 2a864886f70d010702");
// SHA-256 AlgorithmIdentifier
const DIGEST_ALGORITHMS: [u8; 17] = hex!("31 0f 30 0d 06 09 608648016503040201 05 00");

fn tlv(tag: u8, value: &[u8]) -> Vec<u8> {
    let len = value.len();
    let mut out = vec![tag];
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let octets: Vec<u8> = len
            .to_be_bytes()
            .into_iter()
            .skip_while(|&b| b == 0)
            .collect();
        out.push(0x80 | octets.len() as u8);
        out.extend_from_slice(&octets);
    }
    out.extend_from_slice(value);
    out
}

/// Wrap an already encoded OCTET STRING in ContentInfo/SignedData.
fn signed_data(octet_string: &[u8]) -> Vec<u8> {
    let encap = tlv(0x30, &[&ID_DATA[..], &tlv(0xa0, octet_string)].concat());
    // a fake signer info: SET { SEQUENCE { INTEGER 1 } }
    let signer_infos = hex!("31 05 30 03 020101");
    let body = [&hex!("02 01 01")[..], &DIGEST_ALGORITHMS, &encap, &signer_infos].concat();
    tlv(
        0x30,
        &[&ID_SIGNED_DATA[..], &tlv(0xa0, &tlv(0x30, &body))].concat(),
    )
}

fn primitive(content: &[u8]) -> Vec<u8> {
    signed_data(&tlv(0x04, content))
}

fn constructed(content: &[u8], chunk: usize) -> Vec<u8> {
    let fragments: Vec<u8> = content
        .chunks(chunk)
        .flat_map(|fragment| tlv(0x04, fragment))
        .collect();
    signed_data(&tlv(0x24, &fragments))
}

fn to_pem(der: &[u8]) -> String {
    use base64ct::{Base64, Encoding};

    let body = Base64::encode_string(der);
    let mut pem = String::from("-----BEGIN PKCS7-----\n");
    for line in body.as_bytes().chunks(64) {
        pem.push_str(std::str::from_utf8(line).unwrap());
        pem.push('\n');
    }
    pem.push_str("-----END PKCS7-----\n");
    pem
}

proptest! {
    #[test]
    fn der_roundtrip(content in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let payload = p7m::unwrap(&primitive(&content), "dati.bin.p7m").unwrap();
        prop_assert_eq!(payload.bytes, content);
        prop_assert_eq!(payload.suggested_name, "dati.bin");
    }

    #[test]
    fn constructed_matches_primitive(
        content in proptest::collection::vec(any::<u8>(), 0..2048),
        chunk in 1usize..300,
    ) {
        let expected = p7m::unwrap(&primitive(&content), "a.pdf.p7m").unwrap();
        let fragmented = p7m::unwrap(&constructed(&content, chunk), "a.pdf.p7m").unwrap();
        prop_assert_eq!(fragmented, expected);
    }

    #[cfg(feature = "pem")]
    #[test]
    fn pem_matches_der(content in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let der = primitive(&content);
        let pem = to_pem(&der);
        prop_assert_eq!(
            p7m::unwrap(pem.as_bytes(), "a.xml.p7m"),
            p7m::unwrap(&der, "a.xml.p7m")
        );
    }

    #[test]
    fn truncation_is_malformed(
        content in proptest::collection::vec(any::<u8>(), 0..512),
        cut in any::<prop::sample::Index>(),
    ) {
        let der = primitive(&content);
        let len = cut.index(der.len() - 1) + 1;
        if len < der.len() {
            let result = p7m::unwrap(&der[..len], "a.p7m");
            prop_assert!(matches!(result, Err(Error::MalformedDer { .. })), "{:?}", result);
        }
    }

    #[test]
    fn corrupted_inner_length_is_located(
        content in proptest::collection::vec(any::<u8>(), 1..100),
        inner in any::<bool>(),
    ) {
        let mut der = primitive(&content);
        // the first id-data OID is eContentType; `[0]` and the OCTET STRING
        // follow it, both with short form lengths
        let explicit = der
            .windows(ID_DATA.len())
            .position(|window| window == ID_DATA)
            .unwrap()
            + ID_DATA.len();
        let header = if inner { explicit + 2 } else { explicit };

        // claim one byte more than the enclosing TLV holds
        der[header + 1] += 1;

        prop_assert_eq!(
            p7m::unwrap(&der, "a.p7m"),
            Err(Error::MalformedDer { offset: header })
        );
    }

    #[test]
    fn arbitrary_input_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = p7m::unwrap(&bytes, "a.p7m");
        let _ = p7m::unwrap_nested(&bytes, "a.p7m.p7m");
    }

    #[test]
    fn unwrap_is_idempotent(content in proptest::collection::vec(any::<u8>(), 0..1024)) {
        let der = primitive(&content);
        let first = p7m::unwrap(&der, "a.txt.p7m").unwrap();
        let second = p7m::unwrap(&der, "a.txt.p7m").unwrap();
        prop_assert_eq!(first.bytes, second.bytes);
    }
}

//! PEM to DER normalization.
//!
//! Documents are decoded with [`pem_rfc7468`] first. Envelopes that its
//! strict RFC 7468 grammar rejects, such as those with RFC 1421 style
//! `Name: value` headers, over-long lines or indented boundaries, are then
//! decoded by a lenient reader which skips headers and ignores line width.
//! Either way the label must be one of [`LABELS`].

use alloc::{string::String, vec::Vec};
use base64ct::{Base64, Encoding as _};

use crate::errors::{Error, Result};

/// Pre-encapsulation boundary prefix.
const PRE_ENCAPSULATION_BOUNDARY: &str = "-----BEGIN ";

/// Post-encapsulation boundary prefix.
const POST_ENCAPSULATION_BOUNDARY: &str = "-----END ";

const BOUNDARY_SUFFIX: &str = "-----";

/// Type labels accepted for signed envelopes.
pub const LABELS: &[&str] = &["PKCS7", "CMS", "PKCS #7 SIGNED DATA"];

/// Decode a PEM-wrapped PKCS#7/CMS document, returning its label and DER.
pub fn decode_vec(pem: &[u8]) -> Result<(&str, Vec<u8>)> {
    let (label, der) = match pem_rfc7468::decode_vec(pem) {
        Ok(decoded) => decoded,
        Err(err) => {
            log::debug!("strict PEM decoding failed ({}), retrying leniently", err);
            decode_lenient(pem)?
        }
    };

    if !LABELS.contains(&label) {
        log::debug!("unexpected PEM label \"{}\"", label);
        return Err(Error::MalformedPem);
    }

    log::debug!("decoded PEM \"{}\" envelope: {} DER bytes", label, der.len());
    Ok((label, der))
}

/// Decode PEM without enforcing line width, skipping header lines.
fn decode_lenient(pem: &[u8]) -> Result<(&str, Vec<u8>)> {
    let text = core::str::from_utf8(pem).map_err(|_| Error::MalformedPem)?;
    let mut lines = text.trim_start().lines().map(str::trim);

    let label = lines
        .next()
        .and_then(|line| boundary_label(line, PRE_ENCAPSULATION_BOUNDARY))
        .ok_or(Error::MalformedPem)?;

    let mut body = String::with_capacity(pem.len());
    let mut terminated = false;

    for line in lines {
        if line.starts_with(POST_ENCAPSULATION_BOUNDARY) {
            if boundary_label(line, POST_ENCAPSULATION_BOUNDARY) != Some(label) {
                return Err(Error::MalformedPem);
            }
            terminated = true;
            break;
        }

        if line.is_empty() || line.contains(':') {
            continue;
        }

        body.push_str(line);
    }

    if !terminated {
        return Err(Error::MalformedPem);
    }

    let der = Base64::decode_vec(&body).map_err(|_| Error::MalformedPem)?;
    Ok((label, der))
}

fn boundary_label<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix)?.strip_suffix(BOUNDARY_SUFFIX)
}

//! Decoded payload and its classification.

use alloc::{string::String, vec::Vec};

use crate::content_type::{ContentTypeTable, CONTENT_TYPES};

/// Suffix carried by signed envelopes.
const P7M_SUFFIX: &str = ".p7m";

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Content recovered from a signed envelope.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodedPayload {
    /// The signed content.
    pub bytes: Vec<u8>,

    /// Original file name with the `.p7m` suffix removed.
    pub suggested_name: String,

    /// MIME type guessed from the extension of `suggested_name`.
    pub mime_type: &'static str,

    /// Can the payload be rendered as text?
    pub is_text: bool,
}

impl DecodedPayload {
    /// Classify `bytes` recovered from the envelope called `original_name`
    /// using the built-in [`CONTENT_TYPES`] table.
    pub fn classify(bytes: Vec<u8>, original_name: &str) -> Self {
        Self::classify_with(&CONTENT_TYPES, bytes, original_name)
    }

    /// Classify `bytes` using a caller supplied table.
    pub fn classify_with(table: &ContentTypeTable, bytes: Vec<u8>, original_name: &str) -> Self {
        let suggested_name = suggested_name(original_name);
        let content_type = table.for_file_name(suggested_name);

        log::debug!(
            "classified \"{}\" as {} (text: {})",
            suggested_name,
            content_type.mime_type,
            content_type.is_text
        );

        Self {
            bytes,
            suggested_name: suggested_name.into(),
            mime_type: content_type.mime_type,
            is_text: content_type.is_text,
        }
    }

    /// The payload as text, if it is classified as text and is valid UTF-8.
    ///
    /// A leading byte order mark is not part of the returned text.
    pub fn text(&self) -> Option<&str> {
        if !self.is_text {
            return None;
        }

        let bytes = self.bytes.strip_prefix(UTF8_BOM).unwrap_or(&self.bytes[..]);
        core::str::from_utf8(bytes).ok()
    }

    /// Consume the payload, returning the content.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for DecodedPayload {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Does `name` end in `.p7m`, ignoring case?
pub fn is_p7m_file_name(name: &str) -> bool {
    strip_p7m_suffix(name).is_some()
}

/// `original_name` without a trailing `.p7m`, matched case-insensitively.
///
/// Only one suffix is removed: `a.pdf.p7m.p7m` becomes `a.pdf.p7m`.
pub fn suggested_name(original_name: &str) -> &str {
    strip_p7m_suffix(original_name).unwrap_or(original_name)
}

fn strip_p7m_suffix(name: &str) -> Option<&str> {
    let split = name.len().checked_sub(P7M_SUFFIX.len())?;
    if !name.is_char_boundary(split) {
        return None;
    }

    let (stem, suffix) = name.split_at(split);
    suffix.eq_ignore_ascii_case(P7M_SUFFIX).then_some(stem)
}

#[cfg(feature = "std")]
mod save {
    use super::DecodedPayload;
    use std::{
        format,
        fs::{self, File, OpenOptions},
        io::{self, Write},
        path::{Path, PathBuf},
    };

    /// Name used when the suggested name has no usable file name component.
    const FALLBACK_NAME: &str = "payload";

    const MAX_ATTEMPTS: usize = 10_000;

    impl DecodedPayload {
        /// Write the payload into `dir` under its suggested name.
        ///
        /// If that name is taken, `name (1).ext`, `name (2).ext`, ... are
        /// tried in turn; an existing file is never overwritten. Only the
        /// final component of the suggested name is used. Returns the path
        /// that was written.
        ///
        /// A file that cannot be written completely is removed again.
        pub fn save_in(&self, dir: impl AsRef<Path>) -> io::Result<PathBuf> {
            let dir = dir.as_ref();
            let name = Path::new(&self.suggested_name)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(FALLBACK_NAME);
            let (stem, ext) = split_name(name);

            for attempt in 0..MAX_ATTEMPTS {
                let path = match attempt {
                    0 => dir.join(name),
                    n => dir.join(format!("{stem} ({n}){ext}")),
                };

                match OpenOptions::new().write(true).create_new(true).open(&path) {
                    Ok(file) => {
                        write_or_remove(file, &path, |file| {
                            file.write_all(&self.bytes)?;
                            file.sync_all()
                        })?;
                        log::debug!("saved {} bytes to {}", self.bytes.len(), path.display());
                        return Ok(path);
                    }
                    Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                    Err(err) => return Err(err),
                }
            }

            Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("no free file name for {name} in {}", dir.display()),
            ))
        }
    }

    /// Run `write` on the newly created `file` at `path`, deleting the file
    /// if it fails.
    fn write_or_remove<F>(mut file: File, path: &Path, write: F) -> io::Result<()>
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        let result = write(&mut file);
        drop(file);

        if let Err(err) = &result {
            log::debug!("removing partial {}: {}", path.display(), err);
            if let Err(remove_err) = fs::remove_file(path) {
                log::warn!("could not remove {}: {}", path.display(), remove_err);
            }
        }

        result
    }

    /// Split `name` into stem and extension (dot included).
    fn split_name(name: &str) -> (&str, &str) {
        match name.rfind('.') {
            Some(0) | None => (name, ""),
            Some(dot) => name.split_at(dot),
        }
    }

}

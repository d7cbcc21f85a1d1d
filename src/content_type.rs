//! File extension to MIME type lookup.

/// MIME type of a payload and whether it can be shown as text.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ContentType {
    /// MIME type, e.g. `application/pdf`.
    pub mime_type: &'static str,

    /// Can the payload be rendered as text?
    pub is_text: bool,
}

impl ContentType {
    /// Fallback for unknown extensions.
    pub const OCTET_STREAM: Self = Self::binary("application/octet-stream");

    const fn text(mime_type: &'static str) -> Self {
        Self {
            mime_type,
            is_text: true,
        }
    }

    const fn binary(mime_type: &'static str) -> Self {
        Self {
            mime_type,
            is_text: false,
        }
    }
}

/// Static mapping from lowercase file extension to [`ContentType`].
#[derive(Copy, Clone, Debug)]
pub struct ContentTypeTable {
    entries: &'static [(&'static str, ContentType)],
}

impl ContentTypeTable {
    /// Build a table from `(extension, content type)` pairs. Extensions are
    /// given in lowercase without the leading dot.
    pub const fn new(entries: &'static [(&'static str, ContentType)]) -> Self {
        Self { entries }
    }

    /// Content type for `extension`, matched case-insensitively.
    pub fn lookup(&self, extension: &str) -> ContentType {
        let extension = extension.strip_prefix('.').unwrap_or(extension);

        self.entries
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|&(_, content_type)| content_type)
            .unwrap_or(ContentType::OCTET_STREAM)
    }

    /// Content type for the extension of `file_name`.
    pub fn for_file_name(&self, file_name: &str) -> ContentType {
        match extension(file_name) {
            Some(ext) => self.lookup(ext),
            None => ContentType::OCTET_STREAM,
        }
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, ContentType)> + '_ {
        self.entries.iter().copied()
    }
}

/// Extension of `file_name`, without the dot.
///
/// Names without a dot, or whose only dot is the last character, have none.
pub fn extension(file_name: &str) -> Option<&str> {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Content types of the attachments commonly found in PEC messages.
pub static CONTENT_TYPES: ContentTypeTable = ContentTypeTable::new(ENTRIES);

const ENTRIES: &[(&str, ContentType)] = &[
    // text
    ("txt", ContentType::text("text/plain")),
    ("log", ContentType::text("text/plain")),
    ("md", ContentType::text("text/markdown")),
    ("csv", ContentType::text("text/csv")),
    ("tsv", ContentType::text("text/tab-separated-values")),
    ("htm", ContentType::text("text/html")),
    ("html", ContentType::text("text/html")),
    ("css", ContentType::text("text/css")),
    ("xml", ContentType::text("application/xml")),
    ("xsl", ContentType::text("application/xslt+xml")),
    ("xslt", ContentType::text("application/xslt+xml")),
    ("json", ContentType::text("application/json")),
    ("svg", ContentType::text("image/svg+xml")),
    ("eml", ContentType::text("message/rfc822")),
    ("rtf", ContentType::text("application/rtf")),
    // binary
    ("pdf", ContentType::binary("application/pdf")),
    ("png", ContentType::binary("image/png")),
    ("jpg", ContentType::binary("image/jpeg")),
    ("jpeg", ContentType::binary("image/jpeg")),
    ("gif", ContentType::binary("image/gif")),
    ("tif", ContentType::binary("image/tiff")),
    ("tiff", ContentType::binary("image/tiff")),
    ("bmp", ContentType::binary("image/bmp")),
    ("zip", ContentType::binary("application/zip")),
    ("7z", ContentType::binary("application/x-7z-compressed")),
    ("rar", ContentType::binary("application/vnd.rar")),
    ("doc", ContentType::binary("application/msword")),
    (
        "docx",
        ContentType::binary(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ),
    ),
    ("xls", ContentType::binary("application/vnd.ms-excel")),
    (
        "xlsx",
        ContentType::binary("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ),
    ("ppt", ContentType::binary("application/vnd.ms-powerpoint")),
    (
        "pptx",
        ContentType::binary(
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ),
    ),
    ("odt", ContentType::binary("application/vnd.oasis.opendocument.text")),
    (
        "ods",
        ContentType::binary("application/vnd.oasis.opendocument.spreadsheet"),
    ),
    ("p7m", ContentType::binary("application/pkcs7-mime")),
    ("p7s", ContentType::binary("application/pkcs7-signature")),
    ("tsr", ContentType::binary("application/timestamp-reply")),
];

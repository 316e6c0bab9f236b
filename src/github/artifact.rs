//! Media types for uploaded release assets.

/// Kind of artifact being uploaded, derived from its target file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Java archive
    Jar,
    /// ZIP archive
    Zip,
    /// Gzip-compressed tarball
    Tarball,
    /// JSON document
    Json,
    /// Plain text (checksums, notes)
    Text,
    /// Anything else
    Binary,
}

impl ArtifactKind {
    /// Classify an artifact by the name it is published under
    pub fn from_file_name(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if name.ends_with(".jar") {
            Self::Jar
        } else if name.ends_with(".zip") {
            Self::Zip
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Self::Tarball
        } else if name.ends_with(".json") {
            Self::Json
        } else if name.ends_with(".txt") || name.ends_with(".md") {
            Self::Text
        } else {
            Self::Binary
        }
    }

    /// Value for the upload's `Content-Type` header
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jar => "application/java-archive",
            Self::Zip => "application/zip",
            Self::Tarball => "application/gzip",
            Self::Json => "application/json",
            Self::Text => "text/plain",
            Self::Binary => "application/octet-stream",
        }
    }
}

//! # unarchive Archive Type Detection (`common::archive::detect`)
//!
//! File: cli/src/common/archive/detect.rs
//!
//! ## Overview
//!
//! Decides which kind of archive a file is, without trusting its declared
//! type. Detection is an ordered fallback over three independent tiers; the
//! first tier that gives a confident, archive-specific answer wins:
//!
//! 1. **Content-type probe**: a MIME type from a [`ContentTypeProbe`]. The
//!    generic `application/octet-stream` answer, and any MIME type that is not
//!    one of the supported archive types, count as "don't know".
//! 2. **Magic bytes**: the first two bytes read as a little-endian `u16`
//!    (`0x8b1f` gzip, `0x4b50` zip, `0x5a42` bzip2). Files shorter than two
//!    bytes are simply inconclusive.
//! 3. **File name**: after dropping a `?query` suffix, the case-sensitive
//!    suffixes `.tar.gz`, `.tgz` and `.tar`, longest first.
//!
//! If no tier answers, the kind is [`ArchiveKind::Unknown`] and extraction
//! refuses to guess.
//!
//! ## Usage
//!
//! ```rust
//! let detection = detect::detect(Path::new("release-1.0.tgz"));
//! if detection.kind == ArchiveKind::Unknown {
//!     // refuse
//! }
//! ```
//!
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// The archive formats unarchive knows how to hand to an external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Zip,
    GzipTar,
    Bzip2Tar,
    PlainTar,
    Unknown,
}

impl ArchiveKind {
    /// Compression applied around the tar stream, or `None` for non-tar kinds.
    pub fn tar_compression(self) -> Option<TarCompression> {
        match self {
            ArchiveKind::GzipTar => Some(TarCompression::Gzip),
            ArchiveKind::Bzip2Tar => Some(TarCompression::Bzip2),
            ArchiveKind::PlainTar => Some(TarCompression::None),
            ArchiveKind::Zip | ArchiveKind::Unknown => None,
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::GzipTar => "tar.gz",
            ArchiveKind::Bzip2Tar => "tar.bz2",
            ArchiveKind::PlainTar => "tar",
            ArchiveKind::Unknown => "unknown",
        })
    }
}

/// Decompression step tar has to apply, selected by its command-line flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TarCompression {
    None,
    Gzip,
    Bzip2,
}

impl TarCompression {
    /// The combined tar extract flag, e.g. `-xzf` for gzip.
    pub fn extract_flag(self) -> &'static str {
        match self {
            TarCompression::None => "-xf",
            TarCompression::Gzip => "-xzf",
            TarCompression::Bzip2 => "-xjf",
        }
    }
}

/// Which tier produced a detection result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionTier {
    ContentType,
    MagicBytes,
    Extension,
    None,
}

impl fmt::Display for DetectionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DetectionTier::ContentType => "content type",
            DetectionTier::MagicBytes => "magic bytes",
            DetectionTier::Extension => "file extension",
            DetectionTier::None => "no match",
        })
    }
}

/// Result of running the detector on one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub kind: ArchiveKind,
    pub tier: DetectionTier,
}

/// Source of a file's MIME type, consulted as the first detection tier.
pub trait ContentTypeProbe {
    /// Returns the MIME type of the file at `path`, or `None` if unknown.
    fn probe(&self, path: &Path) -> Option<String>;
}

/// Probe backed by the `infer` signature database.
#[derive(Debug, Clone, Copy, Default)]
pub struct InferProbe;

impl ContentTypeProbe for InferProbe {
    fn probe(&self, path: &Path) -> Option<String> {
        match infer::get_from_path(path) {
            Ok(found) => found.map(|t| t.mime_type().to_string()),
            Err(e) => {
                debug!("Content-type probe could not read {:?}: {}", path, e);
                None
            }
        }
    }
}

const OCTET_STREAM: &str = "application/octet-stream";

/// Suffixes checked by the file-name tier, longest first.
const EXTENSION_KINDS: [(&str, ArchiveKind); 3] = [
    (".tar.gz", ArchiveKind::GzipTar),
    (".tgz", ArchiveKind::GzipTar),
    (".tar", ArchiveKind::PlainTar),
];

/// Detects the archive kind of `path` using the default [`InferProbe`].
pub fn detect(path: &Path) -> Detection {
    detect_with(path, &InferProbe)
}

/// Detects the archive kind of `path`, consulting `probe` for the first tier.
pub fn detect_with(path: &Path, probe: &dyn ContentTypeProbe) -> Detection {
    let probed = probe.probe(path);
    if let Some(kind) = probed.as_deref().and_then(kind_from_content_type) {
        return found(path, kind, DetectionTier::ContentType);
    }
    debug!("Content type of {:?} inconclusive ({:?})", path, probed);

    if let Some(kind) = read_magic(path).and_then(kind_from_magic) {
        return found(path, kind, DetectionTier::MagicBytes);
    }

    if let Some(kind) = kind_from_file_name(path) {
        return found(path, kind, DetectionTier::Extension);
    }

    debug!("No detection tier recognised {:?}", path);
    Detection {
        kind: ArchiveKind::Unknown,
        tier: DetectionTier::None,
    }
}

fn found(path: &Path, kind: ArchiveKind, tier: DetectionTier) -> Detection {
    debug!("Detected {:?} as {} by {}", path, kind, tier);
    Detection { kind, tier }
}

/// Maps a MIME type to an archive kind. Generic and non-archive types map to `None`.
pub fn kind_from_content_type(mime: &str) -> Option<ArchiveKind> {
    match mime {
        OCTET_STREAM => None,
        "application/zip" | "application/x-zip" => Some(ArchiveKind::Zip),
        "application/gzip" | "application/x-gzip" => Some(ArchiveKind::GzipTar),
        "application/x-bzip2" => Some(ArchiveKind::Bzip2Tar),
        "application/x-tar" => Some(ArchiveKind::PlainTar),
        _ => None,
    }
}

/// Reads at most the first two bytes of `path`. Short or unreadable files give `None`.
fn read_magic(path: &Path) -> Option<[u8; 2]> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            debug!("Could not open {:?} for magic bytes: {}", path, e);
            return None;
        }
    };
    let mut head = Vec::with_capacity(2);
    if let Err(e) = file.take(2).read_to_end(&mut head) {
        debug!("Could not read magic bytes of {:?}: {}", path, e);
        return None;
    }
    head.try_into().ok()
}

/// Interprets two leading bytes as a little-endian `u16` and matches known signatures.
pub fn kind_from_magic(bytes: [u8; 2]) -> Option<ArchiveKind> {
    match u16::from_le_bytes(bytes) {
        0x8b1f => Some(ArchiveKind::GzipTar),
        0x4b50 => Some(ArchiveKind::Zip),
        0x5a42 => Some(ArchiveKind::Bzip2Tar),
        _ => None,
    }
}

/// Matches the file name (query string removed) against the known suffixes.
pub fn kind_from_file_name(path: &Path) -> Option<ArchiveKind> {
    let full = path.to_string_lossy();
    let without_query = full.split('?').next().unwrap_or_default();
    let name = Path::new(without_query).file_name()?.to_string_lossy();
    EXTENSION_KINDS
        .iter()
        .find(|(suffix, _)| name.ends_with(suffix))
        .map(|(_, kind)| *kind)
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    /// Probe that always answers with a fixed MIME type.
    struct FixedProbe(Option<&'static str>);

    impl ContentTypeProbe for FixedProbe {
        fn probe(&self, _path: &Path) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    const GENERIC: FixedProbe = FixedProbe(Some(OCTET_STREAM));

    #[test]
    fn test_magic_values() {
        assert_eq!(kind_from_magic([0x1f, 0x8b]), Some(ArchiveKind::GzipTar));
        assert_eq!(kind_from_magic([0x50, 0x4b]), Some(ArchiveKind::Zip));
        assert_eq!(kind_from_magic(*b"BZ"), Some(ArchiveKind::Bzip2Tar));
        assert_eq!(kind_from_magic([0x8b, 0x1f]), None); // Byte order matters.
        assert_eq!(kind_from_magic([0x00, 0x00]), None);
    }

    #[test]
    fn test_gzip_magic_wins_regardless_of_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("payload.zip");
        fs::write(&path, [0x1f, 0x8b, 0x08, 0x00, 0x00]).unwrap();

        let detection = detect_with(&path, &GENERIC);
        assert_eq!(detection.kind, ArchiveKind::GzipTar);
        assert_eq!(detection.tier, DetectionTier::MagicBytes);
    }

    #[test]
    fn test_tgz_extension_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("release.tgz");
        fs::write(&path, b"not really compressed").unwrap();

        let detection = detect_with(&path, &GENERIC);
        assert_eq!(detection.kind, ArchiveKind::GzipTar);
        assert_eq!(detection.tier, DetectionTier::Extension);
    }

    #[test]
    fn test_short_tar_files_use_extension() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.tar");
        let one_byte = dir.path().join("one.tar");
        fs::write(&empty, b"").unwrap();
        fs::write(&one_byte, [0x1f]).unwrap();

        assert_eq!(detect(&empty).kind, ArchiveKind::PlainTar);
        assert_eq!(detect(&one_byte).kind, ArchiveKind::PlainTar);
        assert_eq!(detect_with(&one_byte, &GENERIC).tier, DetectionTier::Extension);
    }

    #[test]
    fn test_unrecognised_content_is_unknown() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("noise.bin");
        fs::write(&path, [0xde, 0xad, 0xbe, 0xef, 0x13, 0x37]).unwrap();

        let detection = detect_with(&path, &GENERIC);
        assert_eq!(detection.kind, ArchiveKind::Unknown);
        assert_eq!(detection.tier, DetectionTier::None);
    }

    #[test]
    fn test_content_type_tier_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.tgz");
        fs::write(&path, [0x50, 0x4b, 0x03, 0x04]).unwrap();

        let detection = detect_with(&path, &FixedProbe(Some("application/x-bzip2")));
        assert_eq!(detection.kind, ArchiveKind::Bzip2Tar);
        assert_eq!(detection.tier, DetectionTier::ContentType);
    }

    #[test]
    fn test_non_archive_content_type_falls_through() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bundle");
        fs::write(&path, [0x50, 0x4b, 0x03, 0x04]).unwrap();

        let detection = detect_with(&path, &FixedProbe(Some("text/plain")));
        assert_eq!(detection.kind, ArchiveKind::Zip);
        assert_eq!(detection.tier, DetectionTier::MagicBytes);
    }

    #[test]
    fn test_missing_file_is_unknown_without_panicking() {
        let dir = tempdir().unwrap();
        let detection = detect(&dir.path().join("missing"));
        assert_eq!(detection.kind, ArchiveKind::Unknown);
    }

    #[test]
    fn test_infer_probe_recognises_gzip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob");
        // Minimal gzip header: magic, deflate method, no flags, mtime, xfl, os.
        fs::write(&path, [0x1f, 0x8b, 0x08, 0x00, 0, 0, 0, 0, 0x00, 0x03]).unwrap();

        let detection = detect(&path);
        assert_eq!(detection.kind, ArchiveKind::GzipTar);
        assert_eq!(detection.tier, DetectionTier::ContentType);
    }

    #[test]
    fn test_file_name_rules() {
        let cases = [
            ("drupal-8.0.tar.gz", Some(ArchiveKind::GzipTar)),
            ("module.tgz?download=1", Some(ArchiveKind::GzipTar)),
            ("/srv/files/site.tar", Some(ArchiveKind::PlainTar)),
            ("site.tar?x=a.zip", Some(ArchiveKind::PlainTar)),
            ("RELEASE.TGZ", None), // Case-sensitive.
            ("archive.tar.bz2", None),
            ("archive.zip", None),
            ("tar", None),
        ];
        for (name, expected) in cases {
            assert_eq!(kind_from_file_name(Path::new(name)), expected, "{name}");
        }
    }

    #[test]
    fn test_kind_from_content_type() {
        assert_eq!(kind_from_content_type(OCTET_STREAM), None);
        assert_eq!(
            kind_from_content_type("application/x-zip"),
            Some(ArchiveKind::Zip)
        );
        assert_eq!(
            kind_from_content_type("application/gzip"),
            Some(ArchiveKind::GzipTar)
        );
        assert_eq!(
            kind_from_content_type("application/x-tar"),
            Some(ArchiveKind::PlainTar)
        );
        assert_eq!(kind_from_content_type("image/png"), None);
    }

    #[test]
    fn test_tar_flags() {
        assert_eq!(ArchiveKind::Zip.tar_compression(), None);
        assert_eq!(
            ArchiveKind::GzipTar.tar_compression().map(TarCompression::extract_flag),
            Some("-xzf")
        );
        assert_eq!(
            ArchiveKind::Bzip2Tar.tar_compression().map(TarCompression::extract_flag),
            Some("-xjf")
        );
        assert_eq!(
            ArchiveKind::PlainTar.tar_compression().map(TarCompression::extract_flag),
            Some("-xf")
        );
    }
}

//! HLS output layout: the variant ladder, deterministic directory naming
//! and the validation applied to client-supplied rendition/segment names.

use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// One rendition of the source video inside the HLS bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Fixed three-rung encoding ladder. Every bundle carries exactly these
/// renditions, each in its own subdirectory named after the variant.
pub const VARIANT_LADDER: [Variant; 3] = [
    Variant {
        name: "480p",
        width: 854,
        height: 480,
    },
    Variant {
        name: "720p",
        width: 1280,
        height: 720,
    },
    Variant {
        name: "1080p",
        width: 1920,
        height: 1080,
    },
];

/// Name of the top-level manifest referencing all variant playlists.
pub const MASTER_PLAYLIST: &str = "master.m3u8";

/// Name of the per-variant playlist inside each rendition directory.
pub const VARIANT_PLAYLIST: &str = "playlist.m3u8";

/// Derive the HLS bundle directory for a source file:
/// `{source_dir}/{basename_without_extension}_hls`.
///
/// The name depends only on the base name, so a re-run for the same source
/// lands in the same directory and overwrites previous output.
pub fn hls_dir_for(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("video"));
    source.with_file_name(format!("{}_hls", stem))
}

/// Create the bundle directory and one subdirectory per ladder variant.
///
/// `create_dir_all` makes this a no-op for directories that already exist,
/// so repeated runs for the same source are idempotent. Returns the bundle
/// directory for downstream steps.
pub fn prepare_output_layout(source: &Path) -> io::Result<PathBuf> {
    let hls_dir = hls_dir_for(source);
    for variant in &VARIANT_LADDER {
        std::fs::create_dir_all(hls_dir.join(variant.name))?;
    }
    Ok(hls_dir)
}

/// Accept only plain `segment_NNN.ts` names from clients. Anything with
/// path separators, parent references or another extension is rejected
/// before it ever reaches the filesystem.
pub fn is_valid_segment_name(name: &str) -> bool {
    static SEGMENT_RE: OnceLock<Regex> = OnceLock::new();
    SEGMENT_RE
        .get_or_init(|| Regex::new(r"^segment_\d{3}\.ts$").expect("segment name regex"))
        .is_match(name)
}

/// A requested rendition must be one of the ladder names.
pub fn is_valid_resolution(name: &str) -> bool {
    VARIANT_LADDER.iter().any(|variant| variant.name == name)
}

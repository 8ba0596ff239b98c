//! HTTP `Range` header parsing and content-type guessing.

/// A single byte range as requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    /// `bytes=START-END` (inclusive)
    Bounded(u64, u64),
    /// `bytes=START-`
    From(u64),
    /// `bytes=-SUFFIX` (last SUFFIX bytes)
    Suffix(u64),
}

impl RangeSpec {
    /// Resolve against a resource of `length` bytes into an inclusive
    /// `(start, end)` pair. `None` means the range is not satisfiable.
    pub fn resolve(self, length: u64) -> Option<(u64, u64)> {
        if length == 0 {
            return None;
        }
        let last = length - 1;

        match self {
            RangeSpec::Bounded(start, end) => {
                if start > end || start > last {
                    return None;
                }
                Some((start, end.min(last)))
            }
            RangeSpec::From(start) => {
                if start > last {
                    return None;
                }
                Some((start, last))
            }
            RangeSpec::Suffix(0) => None,
            RangeSpec::Suffix(suffix) => Some((length.saturating_sub(suffix), last)),
        }
    }
}

/// Parse HTTP Range header.
///
/// Supports formats:
/// - bytes=0-499
/// - bytes=500-
/// - bytes=-500 (last 500 bytes)
///
/// Multi-range requests and malformed values return `None`; callers then
/// serve the whole resource.
pub fn parse_range_header(header: &str) -> Option<RangeSpec> {
    let header = header.trim().strip_prefix("bytes=")?;
    if header.contains(',') {
        return None;
    }

    let (start, end) = header.split_once('-')?;
    let start = start.trim();
    let end = end.trim();

    match (start.is_empty(), end.is_empty()) {
        (true, false) => Some(RangeSpec::Suffix(end.parse().ok()?)),
        (false, true) => Some(RangeSpec::From(start.parse().ok()?)),
        (false, false) => Some(RangeSpec::Bounded(start.parse().ok()?, end.parse().ok()?)),
        (true, true) => None,
    }
}

/// Guess the MIME type from the display name's extension.
pub fn guess_content_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "ts" | "m2ts" => "video/mp2t",
        "3gp" => "video/3gpp",
        "m4a" => "audio/mp4",
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "ogg" | "oga" => "audio/ogg",
        "wav" => "audio/wav",
        "aac" => "audio/aac",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

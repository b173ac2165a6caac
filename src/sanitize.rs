use regex::Regex;
use std::sync::OnceLock;

const MAX_HINT_LEN: usize = 60;
const FALLBACK_STEM: &str = "generated";

/// Rewrites a free-form name hint into a filename-safe stem.
///
/// Every character outside `[A-Za-z0-9._-]` becomes `_`, the result is capped
/// at a fixed length, and hints that leave nothing usable (empty, or only
/// separators) fall back to a constant stem so the caller always gets a valid
/// filename component.
pub fn sanitize_hint(hint: &str) -> String {
    static UNSAFE_RE: OnceLock<Regex> = OnceLock::new();
    let unsafe_re = UNSAFE_RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]").expect("hint regex"));

    let cleaned = unsafe_re.replace_all(hint.trim(), "_");
    let stem: String = cleaned.chars().take(MAX_HINT_LEN).collect();

    if stem.chars().all(|c| c == '_' || c == '.') {
        return FALLBACK_STEM.to_string();
    }
    stem
}

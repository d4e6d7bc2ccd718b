//! Response sanitizer for opaque model payloads.
//!
//! Structure in model responses (JSON arrays, code-only replies) is a
//! convention we *request*, not a contract the model honors. Models routinely
//! wrap payloads in markdown fences or prefix them with a language tag, so
//! anything that will be machine-parsed goes through here first.

/// Strips markdown code-fence wrapping and an optional leading `json` tag.
///
/// Rules, applied in order:
/// 1. leading/trailing whitespace is trimmed;
/// 2. a first line starting with ``` (with or without a language tag) is
///    dropped;
/// 3. a last line starting with ``` is dropped;
/// 4. a leading `json` tag (any case) left over from a bare `json\n[...]`
///    reply is dropped.
///
/// Anything else passes through untouched.
pub fn sanitize_payload(response: &str) -> String {
    let mut cleaned = response.trim();

    if cleaned.starts_with("```") {
        cleaned = match cleaned.split_once('\n') {
            Some((_, rest)) => rest,
            None => "",
        };
    }
    if let Some((rest, last)) = cleaned.rsplit_once('\n') {
        if last.trim_start().starts_with("```") {
            cleaned = rest;
        }
    } else if cleaned.trim_start().starts_with("```") {
        // Single remaining line that is itself a fence.
        cleaned = "";
    }

    let cleaned = cleaned.trim();
    match cleaned.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => cleaned[4..].trim().to_string(),
        _ => cleaned.to_string(),
    }
}

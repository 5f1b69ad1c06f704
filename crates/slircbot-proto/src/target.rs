//! Message targets.

/// Longest channel name accepted, in characters.
const MAX_CHANNEL_LEN: usize = 50;

/// Whether `target` names a channel rather than a user.
///
/// Channels start with one of `#&+!` and contain no space, comma or
/// control character (RFC 2812 section 1.3).
pub fn is_channel_name(target: &str) -> bool {
    let Some(rest) = target.strip_prefix(['#', '&', '+', '!']) else {
        return false;
    };
    target.chars().count() <= MAX_CHANNEL_LEN
        && !rest.contains(|c: char| c == ' ' || c == ',' || c.is_control())
}

use bytes::Bytes;

pub const CURRENT_MARKER: &str = "<<<<<<< HEAD\n";
pub const SEPARATOR_MARKER: &str = "=======\n";
pub const END_MARKER: &str = ">>>>>>>\n";

/// Content of a conflicted working file
///
/// A deleted side contributes no bytes. Both sides are written verbatim, so a
/// side without a trailing newline runs into the following marker.
pub fn conflict_file(current: Option<&[u8]>, other: Option<&[u8]>) -> Bytes {
    let current = current.unwrap_or_default();
    let other = other.unwrap_or_default();

    let mut content = Vec::with_capacity(
        CURRENT_MARKER.len() + current.len() + SEPARATOR_MARKER.len() + other.len() + END_MARKER.len(),
    );
    content.extend_from_slice(CURRENT_MARKER.as_bytes());
    content.extend_from_slice(current);
    content.extend_from_slice(SEPARATOR_MARKER.as_bytes());
    content.extend_from_slice(other);
    content.extend_from_slice(END_MARKER.as_bytes());

    Bytes::from(content)
}

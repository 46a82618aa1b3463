//! Header/body splitting for inbound text frames.
//!
//! A wire message is a JSON object header immediately followed by a body that
//! carries no length field. The boundary is recovered structurally: braces are
//! counted from the start of the frame and the header ends as soon as the
//! depth returns to zero. A backslash consumes the following character so an
//! escaped brace inside a string does not move the depth.
//!
//! This is not a JSON parser. A bare, unescaped `}` inside a header string
//! value ends the header early; the header produced by
//! [`envelope::encode`](crate::envelope::encode) never contains one unless a
//! caller puts it in a path or header parameter value.

/// Return the byte length of the header segment at the start of `frame`.
///
/// The result is the position just past the brace that closes the first
/// top-level object. When the frame never balances (or contains no `{` at
/// all) the whole frame is treated as header.
///
/// # Examples
///
/// ```
/// use muxframe::framer::header_len;
///
/// assert_eq!(header_len(r#"{"id":"1"}rest"#), 10);
/// assert_eq!(header_len("not json"), 8);
/// ```
#[must_use]
pub fn header_len(frame: &str) -> usize {
    // The three structural bytes are ASCII, so scanning bytes is safe for
    // UTF-8: continuation bytes never compare equal to them, and a split only
    // ever happens right after a `}`.
    let bytes = frame.as_bytes();
    let mut depth: isize = 0;
    let mut opened = false;
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'{' => {
                depth += 1;
                opened = true;
            }
            b'}' => depth -= 1,
            b'\\' => index += 1,
            _ => {}
        }
        index += 1;
        if opened && depth == 0 {
            return index;
        }
    }
    bytes.len()
}

/// Split a frame into `(header, body)`.
///
/// The body is everything after the header and is empty when nothing
/// follows it.
///
/// # Examples
///
/// ```
/// use muxframe::framer::split_frame;
///
/// let (header, body) = split_frame(r#"{"id":"0","code":200}["general"]"#);
/// assert_eq!(header, r#"{"id":"0","code":200}"#);
/// assert_eq!(body, r#"["general"]"#);
/// ```
#[must_use]
pub fn split_frame(frame: &str) -> (&str, &str) { frame.split_at(header_len(frame)) }

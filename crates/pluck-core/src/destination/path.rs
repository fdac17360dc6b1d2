//! File name extraction from the URL path.

use url::Url;

/// Last non-empty segment of the URL path, percent-decoded.
///
/// Path separators and NUL that appear after decoding are replaced with `_`.
/// Returns `None` for a root or empty path, or when the segment is `.`/`..`.
pub fn filename_from_url(url: &Url) -> Option<String> {
    let segment = url.path().split('/').filter(|s| !s.is_empty()).last()?;
    let name: String = percent_decode(segment)
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || std::path::is_separator(c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name)
}

/// Decodes `%XX` escapes; malformed escapes are kept literally.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(high), Some(low)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(high << 4 | low);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

// SPDX-FileCopyrightText: The sharecard authors
// SPDX-License-Identifier: MPL-2.0

//! Format-level primitives of the published card contract

use std::{borrow::Cow, fmt};

use url::Url;

/// Media type advertised for published card resources.
///
/// Some platforms also accept the legacy `text/x-vcard`; the canonical
/// contract sticks to the registered type.
pub const MEDIA_TYPE: &str = "text/vcard";

/// Line terminator between content lines.
///
/// Every line, including the last, is terminated.
pub const LINE_TERMINATOR: &str = "\r\n";

/// First line of every record.
pub const BEGIN_MARKER: &str = "BEGIN:VCARD";

/// Versioned tag following the begin marker.
pub const VERSION_TAG: &str = "VERSION:3.0";

/// Last line of every record.
pub const END_MARKER: &str = "END:VCARD";

/// Check if the given string is a URI the card may carry.
///
/// An empty string is not a URI; absent fields must be skipped before
/// validation.
#[must_use]
pub fn is_valid_uri(uri: &str) -> bool {
    Url::parse(uri).is_ok()
}

fn needs_escape(ch: char) -> bool {
    matches!(ch, '\\' | ';' | ',' | '\r' | '\n')
}

/// Escape a TEXT value.
///
/// Backslashes, semicolons, commas, and line breaks are escaped as
/// required for TEXT values, with CR, LF, and CRLF all collapsing into a
/// single escaped line break.
///
/// <https://datatracker.ietf.org/doc/html/rfc2426#section-2.4.2>
#[must_use]
pub fn escape_text(text: &str) -> Cow<'_, str> {
    if !text.chars().any(needs_escape) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                escaped.push_str("\\n");
            }
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

fn is_valid_property_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-')
}

/// Write one property line with the value already in wire form.
///
/// URI values are written through this verbatim; escaping them would
/// corrupt the link targets.
pub(crate) fn write_property<W: fmt::Write>(
    writer: &mut W,
    name: &str,
    params: Option<&str>,
    value: &str,
) -> fmt::Result {
    debug_assert!(is_valid_property_name(name));
    debug_assert!(!value.contains(['\r', '\n']));
    writer.write_str(name)?;
    if let Some(params) = params {
        writer.write_char(';')?;
        writer.write_str(params)?;
    }
    writer.write_char(':')?;
    writer.write_str(value)?;
    writer.write_str(LINE_TERMINATOR)
}

/// Write one property line, escaping the TEXT value.
pub(crate) fn write_text_property<W: fmt::Write>(
    writer: &mut W,
    name: &str,
    params: Option<&str>,
    value: &str,
) -> fmt::Result {
    write_property(writer, name, params, &escape_text(value))
}

/// Write one unescaped line (the markers and the version tag).
pub(crate) fn write_raw_line<W: fmt::Write>(writer: &mut W, line: &str) -> fmt::Result {
    writer.write_str(line)?;
    writer.write_str(LINE_TERMINATOR)
}

/// Check that an encoded record is well-formed.
///
/// Well-formed means: the begin marker first, the version tag second, the
/// end marker last, exactly one record, no empty lines, and CRLF-only
/// line breaks.
#[must_use]
pub fn is_well_formed(encoded: &str) -> bool {
    let Some(body) = encoded.strip_suffix(LINE_TERMINATOR) else {
        return false;
    };
    let mut lines = body.split(LINE_TERMINATOR);
    if lines.next() != Some(BEGIN_MARKER) {
        return false;
    }
    if lines.next() != Some(VERSION_TAG) {
        return false;
    }
    let mut saw_end = false;
    for line in lines {
        if saw_end || line == BEGIN_MARKER || line.is_empty() || line.contains(['\r', '\n']) {
            return false;
        }
        if line == END_MARKER {
            saw_end = true;
        }
    }
    saw_end
}

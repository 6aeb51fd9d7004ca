// Copyright 2026 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::error::{RegTreeError, Result};
use core::char;
use core::convert::TryInto;

/// Reason why a UTF-16LE byte sequence could not be converted.
pub(crate) const ODD_UTF16_LENGTH: &str = "UTF-16LE data has an odd number of bytes";
pub(crate) const INVALID_UTF16: &str = "UTF-16LE data contains an unpaired surrogate";

fn utf16le_units(
    bytes: &[u8],
) -> core::result::Result<impl Iterator<Item = u16> + '_, &'static str> {
    if bytes.len() % 2 != 0 {
        return Err(ODD_UTF16_LENGTH);
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|two_bytes| u16::from_le_bytes(two_bytes.try_into().unwrap())))
}

/// Converts UTF-16LE bytes into a `String`, stopping at the first NUL character.
///
/// Some applications erroneously store NUL-terminated strings and others don't,
/// so both variants are accepted.
pub(crate) fn utf16le_to_string(bytes: &[u8]) -> core::result::Result<String, &'static str> {
    let u16_iter = utf16le_units(bytes)?;

    // Registry data hardly ever leaves the Basic Multilingual Plane.
    let mut string = String::with_capacity(bytes.len() / 2);

    for c in char::decode_utf16(u16_iter) {
        match c {
            Ok('\0') => break,
            Ok(c) => string.push(c),
            Err(_) => return Err(INVALID_UTF16),
        }
    }

    Ok(string)
}

/// Converts `REG_MULTI_SZ` bytes into its list of strings.
///
/// Each string is terminated by a NUL character and the list ends with an empty string.
/// Data without terminating NUL characters is accepted as well.
pub(crate) fn multi_utf16le_to_strings(
    bytes: &[u8],
) -> core::result::Result<Vec<String>, &'static str> {
    let u16_iter = utf16le_units(bytes)?;
    let mut strings = Vec::new();
    let mut string = String::new();

    for c in char::decode_utf16(u16_iter) {
        match c {
            Ok('\0') => {
                if string.is_empty() {
                    return Ok(strings);
                }

                strings.push(string);
                string = String::new();
            }
            Ok(c) => string.push(c),
            Err(_) => return Err(INVALID_UTF16),
        }
    }

    if !string.is_empty() {
        strings.push(string);
    }

    Ok(strings)
}

/// Encodes `string` as NUL-terminated UTF-16LE.
pub(crate) fn string_to_utf16le(string: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity((string.len() + 1) * 2);
    push_utf16le(&mut bytes, string);
    bytes.extend_from_slice(&[0, 0]);
    bytes
}

/// Encodes `strings` as `REG_MULTI_SZ` data (every string NUL-terminated, plus a final NUL).
pub(crate) fn strings_to_multi_utf16le<S>(strings: &[S]) -> Vec<u8>
where
    S: AsRef<str>,
{
    let mut bytes = Vec::new();

    for string in strings {
        push_utf16le(&mut bytes, string.as_ref());
        bytes.extend_from_slice(&[0, 0]);
    }

    bytes.extend_from_slice(&[0, 0]);
    bytes
}

fn push_utf16le(bytes: &mut Vec<u8>, string: &str) {
    for unit in string.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
}

/// Compares two key or value names the way the registry does.
///
/// Names are case-insensitive. Characters whose uppercase form consists of more
/// than one character are compared as-is.
pub(crate) fn names_equal(a: &str, b: &str) -> bool {
    let mut a = a.chars().map(uppercase);
    let mut b = b.chars().map(uppercase);

    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) if x == y => continue,
            (None, None) => return true,
            _ => return false,
        }
    }
}

/// Orders two names the same case-insensitive way [`names_equal`] compares them.
pub(crate) fn cmp_names(a: &str, b: &str) -> core::cmp::Ordering {
    a.chars().map(uppercase).cmp(b.chars().map(uppercase))
}

fn uppercase(c: char) -> char {
    let mut upper = c.to_uppercase();

    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Replaces every `%NAME%` placeholder in `text` with the value returned by `lookup`.
///
/// `lookup` returns
/// * `Ok(Some(value))` to substitute the placeholder,
/// * `Ok(None)` for an unknown variable, which keeps the placeholder verbatim,
/// * `Err(_)` if the variable cannot be resolved at all, which aborts the expansion.
///
/// A `%` without a closing partner is copied literally.
pub fn expand_environment_strings<F>(text: &str, mut lookup: F) -> Result<String>
where
    F: FnMut(&str) -> Result<Option<String>>,
{
    let mut expanded = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('%') {
        expanded.push_str(&rest[..start]);
        let after_start = &rest[start + 1..];

        let end = match after_start.find('%') {
            Some(end) => end,
            None => {
                // No closing '%', so this is no placeholder.
                expanded.push_str(&rest[start..]);
                return Ok(expanded);
            }
        };

        let name = &after_start[..end];
        if name.is_empty() {
            // "%%" is kept as it is.
            expanded.push_str("%%");
            rest = &after_start[end + 1..];
            continue;
        }

        match lookup(name)? {
            Some(value) => expanded.push_str(&value),
            None => {
                // Unknown variables are kept verbatim.
                expanded.push('%');
                expanded.push_str(name);
                expanded.push('%');
            }
        }

        rest = &after_start[end + 1..];
    }

    expanded.push_str(rest);
    Ok(expanded)
}

/// [`expand_environment_strings`] using the environment of the current process.
pub fn expand_process_environment_strings(text: &str) -> Result<String> {
    expand_environment_strings(text, process_environment_variable)
}

/// Looks up `name` in the environment of the current process.
///
/// A variable whose value is not valid Unicode cannot be resolved.
pub(crate) fn process_environment_variable(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(RegTreeError::UnresolvableVariable {
            variable: name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Result<Option<String>> {
        match name {
            "TEMP" => Ok(Some(r"C:\Temp".to_string())),
            "SystemRoot" => Ok(Some(r"C:\Windows".to_string())),
            "BROKEN" => Err(RegTreeError::UnresolvableVariable {
                variable: name.to_string(),
            }),
            _ => Ok(None),
        }
    }

    #[test]
    fn test_expand_environment_strings() {
        assert_eq!(
            expand_environment_strings(r"%TEMP%\cache", lookup).unwrap(),
            r"C:\Temp\cache"
        );
        assert_eq!(
            expand_environment_strings(r"%SystemRoot%\%TEMP%", lookup).unwrap(),
            r"C:\Windows\C:\Temp"
        );
        assert_eq!(
            expand_environment_strings("no placeholders", lookup).unwrap(),
            "no placeholders"
        );

        // Unknown variables and lone percent signs survive unchanged.
        assert_eq!(
            expand_environment_strings("%UNKNOWN%%TEMP%", lookup).unwrap(),
            r"%UNKNOWN%C:\Temp"
        );
        assert_eq!(
            expand_environment_strings("100% sure", lookup).unwrap(),
            "100% sure"
        );
        assert_eq!(expand_environment_strings("a%%b", lookup).unwrap(), "a%%b");

        assert_eq!(
            expand_environment_strings(r"%BROKEN%\x", lookup),
            Err(RegTreeError::UnresolvableVariable {
                variable: "BROKEN".to_string()
            })
        );
    }

    #[test]
    fn test_utf16le_conversion() {
        let bytes = string_to_utf16le("äöü-test");
        assert_eq!(bytes.len(), 9 * 2);
        assert_eq!(utf16le_to_string(&bytes).unwrap(), "äöü-test");

        // Data without a terminating NUL is fine as well.
        assert_eq!(utf16le_to_string(&bytes[..bytes.len() - 2]).unwrap(), "äöü-test");

        assert_eq!(utf16le_to_string(&[0x41, 0x00, 0x42]), Err(ODD_UTF16_LENGTH));
        assert_eq!(utf16le_to_string(&[0x00, 0xd8, 0x41, 0x00]), Err(INVALID_UTF16));
    }

    #[test]
    fn test_multi_string_conversion() {
        let bytes = strings_to_multi_utf16le(&["multi-sz-test", "line2", "line2"]);
        assert_eq!(
            multi_utf16le_to_strings(&bytes).unwrap(),
            vec!["multi-sz-test", "line2", "line2"]
        );

        let empty: [&str; 0] = [];
        assert!(multi_utf16le_to_strings(&strings_to_multi_utf16le(&empty))
            .unwrap()
            .is_empty());
        assert!(multi_utf16le_to_strings(&[]).unwrap().is_empty());

        // Missing terminators are tolerated.
        let bytes = string_to_utf16le("single");
        assert_eq!(
            multi_utf16le_to_strings(&bytes[..bytes.len() - 2]).unwrap(),
            vec!["single"]
        );
    }

    #[test]
    fn test_names_equal() {
        assert!(names_equal("CurrentControlSet", "CURRENTCONTROLSET"));
        assert!(names_equal("äöü", "ÄÖÜ"));
        assert!(!names_equal("Control", "Controls"));
        assert_eq!(cmp_names("key10", "KEY2"), core::cmp::Ordering::Less);
    }
}

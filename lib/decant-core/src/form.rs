//! `application/x-www-form-urlencoded` decoding.

use std::fmt;
use std::str::FromStr;

use percent_encoding::percent_decode_str;

use crate::{Error, Result};

/// Character encodings understood when decoding text and form bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    /// UTF-8, the default.
    #[default]
    Utf8,
    /// ISO-8859-1: every byte is the code point of the same value.
    Latin1,
    /// US-ASCII: bytes above `0x7F` are invalid.
    Ascii,
}

impl Charset {
    /// Canonical name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Latin1 => "ISO-8859-1",
            Self::Ascii => "US-ASCII",
        }
    }

    /// Decode bytes, replacing invalid sequences with U+FFFD.
    #[must_use]
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Latin1 => bytes.iter().copied().map(char::from).collect(),
            Self::Ascii => bytes
                .iter()
                .map(|&byte| {
                    if byte.is_ascii() {
                        char::from(byte)
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect(),
        }
    }
}

impl FromStr for Charset {
    type Err = Error;

    fn from_str(label: &str) -> Result<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "latin-1" | "l1" => {
                Ok(Self::Latin1)
            }
            "us-ascii" | "ascii" => Ok(Self::Ascii),
            _ => Err(Error::unsupported_charset(label)),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decode form-encoded text into its key/value pairs.
///
/// Pairs are split on `&`, then on the first `=`. Pieces without `=` are
/// dropped. Keys and values are percent-decoded (`+` is a space) and read
/// with the named charset. Order and duplicates are kept.
///
/// # Errors
///
/// Returns [`Error::UnsupportedCharset`] for an unknown charset label.
///
/// # Example
///
/// ```
/// use decant_core::decode_form;
///
/// let pairs = decode_form("a=1&b=2&bad", "UTF-8").expect("known charset");
/// assert_eq!(pairs, vec![
///     ("a".to_string(), "1".to_string()),
///     ("b".to_string(), "2".to_string()),
/// ]);
/// ```
pub fn decode_form(input: &str, charset: &str) -> Result<Vec<(String, String)>> {
    let charset = charset.parse()?;
    Ok(decode_form_with(input, charset))
}

/// [`decode_form`] with an already known [`Charset`].
#[must_use]
pub fn decode_form_with(input: &str, charset: Charset) -> Vec<(String, String)> {
    input
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| {
            (
                decode_component(key, charset),
                decode_component(value, charset),
            )
        })
        .collect()
}

/// Runs of `%XX` escapes are read with `charset`; literal characters are
/// already text and are copied as they are.
fn decode_component(raw: &str, charset: Charset) -> String {
    let mut decoded = String::with_capacity(raw.len());
    let mut rest = raw;
    while !rest.is_empty() {
        let escaped = escaped_run_len(rest);
        if escaped > 0 {
            let (run, tail) = rest.split_at(escaped);
            let bytes: Vec<u8> = percent_decode_str(run).collect();
            decoded.push_str(&charset.decode(&bytes));
            rest = tail;
            continue;
        }

        let mut chars = rest.chars();
        match chars.next() {
            Some('+') => decoded.push(' '),
            Some(literal) => decoded.push(literal),
            None => break,
        }
        rest = chars.as_str();
    }
    decoded
}

/// Length in bytes of the `%XX` escapes at the start of `raw`.
fn escaped_run_len(raw: &str) -> usize {
    raw.as_bytes()
        .chunks_exact(3)
        .take_while(|chunk| {
            matches!(chunk, [b'%', hi, lo] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit())
        })
        .count()
        * 3
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn drops_pieces_without_equals() {
        let decoded = decode_form("a=1&b=2&bad", "UTF-8").expect("decode");
        check!(decoded == pairs(&[("a", "1"), ("b", "2")]));
    }

    #[test]
    fn splits_on_first_equals_only() {
        let decoded = decode_form("expr=a=b&empty=&=anonymous", "utf-8").expect("decode");
        check!(decoded == pairs(&[("expr", "a=b"), ("empty", ""), ("", "anonymous")]));
    }

    #[test]
    fn keeps_order_and_duplicates() {
        let decoded = decode_form("tag=b&tag=a&&tag=b", "UTF-8").expect("decode");
        check!(decoded == pairs(&[("tag", "b"), ("tag", "a"), ("tag", "b")]));
    }

    #[test]
    fn percent_and_plus_decoding() {
        let decoded = decode_form("q=rust+http&sum=1%2B1&name=Z%C3%BCrich", "UTF-8").expect("decode");
        check!(decoded == pairs(&[("q", "rust http"), ("sum", "1+1"), ("name", "Zürich")]));
    }

    #[test]
    fn uses_requested_charset() {
        let decoded = decode_form("name=Z%FCrich", "ISO-8859-1").expect("decode");
        check!(decoded == pairs(&[("name", "Zürich")]));

        let decoded = decode_form("name=Z%FCrich", "US-ASCII").expect("decode");
        check!(decoded == pairs(&[("name", "Z\u{FFFD}rich")]));
    }

    #[test]
    fn literal_characters_are_not_decoded_again() {
        let decoded = decode_form("city=Zürich", "ISO-8859-1").expect("decode");
        check!(decoded == pairs(&[("city", "Zürich")]));

        let decoded = decode_form("city=Zürich&enc=Z%FCrich", "ISO-8859-1").expect("decode");
        check!(decoded == pairs(&[("city", "Zürich"), ("enc", "Zürich")]));

        let decoded = decode_form("city=Zürich+Nord&raw=%", "US-ASCII").expect("decode");
        check!(decoded == pairs(&[("city", "Zürich Nord"), ("raw", "%")]));
    }

    #[test]
    fn escape_runs_decode_as_one_sequence() {
        let decoded = decode_form("name=J%C3%BCrgen%20%C3%96", "UTF-8").expect("decode");
        check!(decoded == pairs(&[("name", "Jürgen Ö")]));

        let decoded = decode_form("bad=%zz%4", "UTF-8").expect("decode");
        check!(decoded == pairs(&[("bad", "%zz%4")]));
    }

    #[test]
    fn empty_input() {
        check!(decode_form("", "UTF-8").expect("decode").is_empty());
    }

    #[test]
    fn unknown_charset() {
        let result = decode_form("a=1", "EBCDIC");
        let_assert!(Err(Error::UnsupportedCharset(label)) = result);
        check!(label == "EBCDIC");
    }

    #[test]
    fn charset_labels() {
        check!("utf8".parse::<Charset>().expect("utf8") == Charset::Utf8);
        check!(" Latin1 ".parse::<Charset>().expect("latin1") == Charset::Latin1);
        check!("US-ASCII".parse::<Charset>().expect("ascii") == Charset::Ascii);
        check!(Charset::Latin1.to_string() == "ISO-8859-1");
    }
}

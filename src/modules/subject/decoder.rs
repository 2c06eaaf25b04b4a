// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::sync::LazyLock;

use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig},
        DecodePaddingMode,
    },
    Engine,
};
use regex::{Captures, Regex};
use tracing::{debug, warn};

/// `=?charset?encoding?encoded-text?=`, encoding is `B` or `Q` in either case.
pub static ENCODED_WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)=\?([^?]+)\?([BQ])\?([^?]+)\?=").unwrap());

// Mail agents are sloppy with trailing `=` in encoded words, accept both forms.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedWordError {
    Base64(base64::DecodeError),
    InvalidEscape { position: usize },
    UnknownEncoding(String),
}

impl fmt::Display for EncodedWordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodedWordError::Base64(e) => write!(f, "invalid base64: {}", e),
            EncodedWordError::InvalidEscape { position } => {
                write!(f, "invalid quoted-printable escape at offset {}", position)
            }
            EncodedWordError::UnknownEncoding(encoding) => {
                write!(f, "unknown encoding '{}'", encoding)
            }
        }
    }
}

impl std::error::Error for EncodedWordError {}

/// Decodes every RFC 2047 encoded word found in `subject`.
///
/// Tokens are replaced one by one from left to right. A token that fails to
/// decode is kept verbatim while the remaining tokens are still decoded.
/// The charset label is ignored: decoded bytes are always read as UTF-8.
pub fn decode_mime_subject(subject: &str) -> String {
    ENCODED_WORD_PATTERN
        .replace_all(subject, |caps: &Captures| {
            let token = &caps[0];
            let charset = &caps[1];
            let encoding = &caps[2];
            let encoded_text = &caps[3];
            match decode_encoded_word(encoding, encoded_text) {
                Ok(decoded) => {
                    debug!(
                        charset = %charset,
                        encoding = %encoding,
                        "Decoded encoded word: \"{}\" -> \"{}\"",
                        encoded_text,
                        decoded
                    );
                    decoded
                }
                Err(e) => {
                    warn!("Decode error for \"{}\": {}", encoded_text, e);
                    token.to_string()
                }
            }
        })
        .into_owned()
}

/// Same as [`decode_mime_subject`], absent input stays absent.
pub fn decode_optional(subject: Option<&str>) -> Option<String> {
    subject.map(decode_mime_subject)
}

pub fn decode_encoded_word(encoding: &str, encoded_text: &str) -> Result<String, EncodedWordError> {
    let bytes = if encoding.eq_ignore_ascii_case("B") {
        LENIENT_BASE64
            .decode(encoded_text)
            .map_err(EncodedWordError::Base64)?
    } else if encoding.eq_ignore_ascii_case("Q") {
        decode_q(encoded_text)?
    } else {
        return Err(EncodedWordError::UnknownEncoding(encoding.to_string()));
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// RFC 2047 "Q" decoding: `_` is a space and `=XX` is a hex encoded byte.
fn decode_q(encoded_text: &str) -> Result<Vec<u8>, EncodedWordError> {
    let input = encoded_text.as_bytes();
    let mut output = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'_' => {
                output.push(b' ');
                i += 1;
            }
            b'=' => {
                let byte = input
                    .get(i + 1..i + 3)
                    .and_then(hex_pair)
                    .ok_or(EncodedWordError::InvalidEscape { position: i })?;
                output.push(byte);
                i += 3;
            }
            other => {
                output.push(other);
                i += 1;
            }
        }
    }
    Ok(output)
}

fn hex_pair(pair: &[u8]) -> Option<u8> {
    let high = (pair[0] as char).to_digit(16)?;
    let low = (pair[1] as char).to_digit(16)?;
    Some((high * 16 + low) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_subject_is_unchanged() {
        let subject = "Invoice #4 for March";
        assert_eq!(decode_mime_subject(subject), subject);
        assert_eq!(decode_mime_subject(""), "");
    }

    #[test]
    fn decoding_is_stable_once_no_tokens_remain() {
        let once = decode_mime_subject("=?UTF-8?B?44GT44KT44Gr44Gh44Gv?=");
        assert_eq!(once, "こんにちは");
        assert_eq!(decode_mime_subject(&once), once);
    }

    #[test]
    fn mixed_base64_and_quoted_printable_tokens() {
        let subject = "=?utf-8?B?SGVsbG8=?= world =?utf-8?Q?Caf=C3=A9?=";
        assert_eq!(decode_mime_subject(subject), "Hello world Café");
    }

    #[test]
    fn encoding_letter_is_case_insensitive() {
        assert_eq!(decode_mime_subject("=?utf-8?b?SGVsbG8=?="), "Hello");
        assert_eq!(decode_mime_subject("=?utf-8?q?a_b?="), "a b");
    }

    #[test]
    fn base64_without_padding_is_accepted() {
        assert_eq!(decode_mime_subject("=?utf-8?B?SGVsbG8?="), "Hello");
    }

    #[test]
    fn underscore_becomes_space_and_escaped_underscore_survives() {
        assert_eq!(
            decode_mime_subject("=?iso-8859-1?Q?Re:_order=5F42?="),
            "Re: order_42"
        );
    }

    #[test]
    fn malformed_token_is_left_verbatim_others_still_decode() {
        let subject = "=?utf-8?B?SGVsbG8=?= =?utf-8?B?!!!?= =?utf-8?Q?bad=ZZ?= =?utf-8?Q?ok?=";
        assert_eq!(
            decode_mime_subject(subject),
            "Hello =?utf-8?B?!!!?= =?utf-8?Q?bad=ZZ?= ok"
        );
    }

    #[test]
    fn truncated_escape_is_an_error() {
        assert_eq!(
            decode_encoded_word("Q", "abc=4"),
            Err(EncodedWordError::InvalidEscape { position: 3 })
        );
    }

    #[test]
    fn signed_hex_is_not_an_escape() {
        assert!(decode_encoded_word("Q", "=+1").is_err());
    }

    #[test]
    fn absent_subject_stays_absent() {
        assert_eq!(decode_optional(None), None);
        assert_eq!(decode_optional(Some("x")), Some("x".to_string()));
    }
}

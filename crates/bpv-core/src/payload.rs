//! Uplink payload hex parsing.
//!
//! Fixture inputs and CLI arguments carry payloads as hex text. Authors
//! write them in several styles (`040164`, `04 01 64`, `0x04,0x01,0x64`,
//! `04:01:64`), all of which decode to the same bytes here. An empty
//! payload is valid: LoRaWAN uplinks may carry an fPort and no data.

use thiserror::Error;

/// Errors decoding a hex payload.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HexError {
    /// Odd number of hex digits.
    #[error("payload has an odd number of hex digits ({0})")]
    OddLength(usize),

    /// A character that is neither a hex digit nor a separator.
    #[error("invalid hex character {ch:?} at position {index}")]
    InvalidCharacter { ch: char, index: usize },

    /// No byte sequence could be found in free text.
    #[error("no hex byte sequence found; provide uplink data like '01 64 00 C8'")]
    NotFound,
}

/// Decode a hex payload, ignoring whitespace, `0x` prefixes and `,`/`:` separators.
pub fn parse_hex_payload(text: &str) -> Result<Vec<u8>, HexError> {
    let mut digits = String::with_capacity(text.len());
    for token in text.split(|c: char| c.is_whitespace() || c == ',' || c == ':') {
        let token = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        digits.push_str(token);
    }

    if digits.len() % 2 != 0 {
        return Err(HexError::OddLength(digits.len()));
    }

    hex::decode(&digits).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { c, index } => {
            HexError::InvalidCharacter { ch: c, index }
        }
        hex::FromHexError::OddLength => HexError::OddLength(digits.len()),
        hex::FromHexError::InvalidStringLength => HexError::OddLength(digits.len()),
    })
}

/// Find the first run of two or more space-separated hex byte tokens in
/// free text (e.g. an issue description) and return it verbatim.
pub fn extract_hex_bytes(text: &str) -> Result<String, HexError> {
    let is_byte = |t: &str| t.len() == 2 && t.chars().all(|c| c.is_ascii_hexdigit());

    let mut run: Vec<&str> = Vec::new();
    for token in text.split_whitespace() {
        if is_byte(token) {
            run.push(token);
            continue;
        }
        if run.len() >= 2 {
            break;
        }
        run.clear();
    }

    if run.len() >= 2 {
        Ok(run.join(" "))
    } else {
        Err(HexError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compact_hex() {
        assert_eq!(
            parse_hex_payload("040164010000000f41dc").unwrap(),
            vec![0x04, 0x01, 0x64, 0x01, 0x00, 0x00, 0x00, 0x0f, 0x41, 0xdc]
        );
    }

    #[test]
    fn parses_spaced_and_prefixed_hex() {
        let expected = vec![0x01, 0x64, 0x00, 0xc8];
        assert_eq!(parse_hex_payload("01 64 00 C8").unwrap(), expected);
        assert_eq!(parse_hex_payload("0x01,0x64,0x00,0xC8").unwrap(), expected);
        assert_eq!(parse_hex_payload("01:64:00:c8\n").unwrap(), expected);
    }

    #[test]
    fn empty_payload_is_no_bytes() {
        assert_eq!(parse_hex_payload("").unwrap(), Vec::<u8>::new());
        assert_eq!(parse_hex_payload("  ").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn rejects_odd_length() {
        assert_eq!(parse_hex_payload("abc").unwrap_err(), HexError::OddLength(3));
    }

    #[test]
    fn rejects_non_hex_characters() {
        match parse_hex_payload("0g").unwrap_err() {
            HexError::InvalidCharacter { ch, .. } => assert_eq!(ch, 'g'),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn extracts_first_byte_run_from_text() {
        let text = "Example uplink on port 2:\n01 64 00 C8 (temperature and humidity)";
        assert_eq!(extract_hex_bytes(text).unwrap(), "01 64 00 C8");
    }

    #[test]
    fn extract_ignores_single_byte_tokens() {
        let text = "port 10 then AA BB CC";
        assert_eq!(extract_hex_bytes(text).unwrap(), "AA BB CC");
    }

    #[test]
    fn extract_fails_without_bytes() {
        assert_eq!(extract_hex_bytes("no payload here").unwrap_err(), HexError::NotFound);
    }
}

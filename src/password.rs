use crate::error::{Result, StacksError};
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use rand::RngCore;

pub const DEFAULT_BYTES: usize = 16;
pub const MAX_BYTES: usize = 4096;

/// Parse the optional `[length]` argument of `password`.
pub fn parse_length(arg: Option<&str>) -> Result<usize> {
    let Some(raw) = arg else {
        return Ok(DEFAULT_BYTES);
    };
    let invalid = |message: String| StacksError::InvalidArgument {
        command: "password".to_string(),
        message,
    };
    let n: usize = raw
        .trim()
        .parse()
        .map_err(|_| invalid(format!("'{raw}' is not a byte count")))?;
    if n == 0 {
        return Err(invalid("length must be at least 1".to_string()));
    }
    if n > MAX_BYTES {
        return Err(invalid(format!("length must be at most {MAX_BYTES}")));
    }
    Ok(n)
}

/// Base64 of `bytes` random bytes, padding stripped: `ceil(4 * bytes / 3)` characters.
pub fn generate(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buf);
    STANDARD_NO_PAD.encode(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_len(n: usize) -> usize {
        (4 * n).div_ceil(3)
    }

    #[test]
    fn length_follows_the_encoding() {
        for n in [8, 16, 20, 32] {
            let pw = generate(n);
            assert_eq!(pw.len(), expected_len(n), "bytes = {n}");
            assert!(!pw.contains('='));
        }
        assert_eq!(generate(16).len(), 22);
        assert_eq!(generate(20).len(), 27);
    }

    #[test]
    fn output_is_base64_alphabet() {
        let pw = generate(64);
        assert!(pw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/'));
    }

    #[test]
    fn two_passwords_differ() {
        assert_ne!(generate(32), generate(32));
    }

    #[test]
    fn parses_length_argument() {
        assert_eq!(parse_length(None).unwrap(), DEFAULT_BYTES);
        assert_eq!(parse_length(Some("32")).unwrap(), 32);
        assert!(matches!(
            parse_length(Some("0")),
            Err(StacksError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse_length(Some("long")),
            Err(StacksError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn length_is_capped() {
        assert_eq!(parse_length(Some("4096")).unwrap(), MAX_BYTES);
        assert_eq!(generate(MAX_BYTES).len(), expected_len(MAX_BYTES));
        for raw in ["4097", "1000000000000", "18446744073709551615", "18446744073709551616"] {
            assert!(
                matches!(parse_length(Some(raw)), Err(StacksError::InvalidArgument { .. })),
                "{raw}"
            );
        }
    }
}

//! Leaf format checkers.
//!
//! The fixed patterns behind the format rules (`email`, `mobile`, `url`,
//! `base64`, `ip`), the national-ID checksum, and the reusable
//! [`FuncRule`] helpers for custom-validation hooks. Everything here is
//! interchangeable with the registry's format rules: one text in, pass or
//! fail out.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref EMAIL: Regex =
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")
            .expect("email pattern");
    /// Mainland mobile numbers: 11 digits, leading 1, second digit 3-9.
    pub static ref MOBILE: Regex = Regex::new(r"^1[3-9]\d{9}$").expect("mobile pattern");
    pub static ref URL: Regex =
        Regex::new(r"^(https?|ftp)://[^\s/$.?#][^\s]*$").expect("url pattern");
    pub static ref BASE64: Regex = Regex::new(
        r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$"
    )
    .expect("base64 pattern");
    pub static ref IP: Regex = Regex::new(
        r"^(?:(?:25[0-5]|2[0-4]\d|[01]?\d?\d)\.){3}(?:25[0-5]|2[0-4]\d|[01]?\d?\d)$"
    )
    .expect("ip pattern");
}

const ID_WEIGHTS: [u32; 17] = [7, 9, 10, 5, 8, 4, 2, 1, 6, 3, 7, 9, 10, 5, 8, 4, 2];
const ID_CHECK: [u8; 11] = *b"10X98765432";

/// Checksum validation for an 18-character national ID: weighted sum of
/// the first 17 digits, modulo-11 lookup into the check digit table.
pub fn id_card(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 18 {
        return false;
    }
    let mut sum = 0u32;
    for (i, &b) in bytes[..17].iter().enumerate() {
        if !b.is_ascii_digit() {
            return false;
        }
        sum += u32::from(b - b'0') * ID_WEIGHTS[i];
    }
    bytes[17] == ID_CHECK[(sum % 11) as usize]
}

/// A standalone check with its failure message, for use inside
/// `post_validate` hooks where a rule annotation cannot reach.
pub struct FuncRule {
    pub check: fn(&str) -> bool,
    pub msg: &'static str,
}

/// Username policy: 5-25 letters, digits, and underscores; at least one
/// letter; must not start or end with an underscore.
pub fn username() -> FuncRule {
    FuncRule {
        check: check_username,
        msg: "must be 5-25 letters, digits, and underscores, contain a letter, \
              and not start or end with an underscore",
    }
}

fn check_username(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 5 || bytes.len() > 25 {
        return false;
    }
    let mut has_letter = false;
    for &b in bytes {
        if b.is_ascii_alphabetic() {
            has_letter = true;
        } else if !b.is_ascii_digit() && b != b'_' {
            return false;
        }
    }
    has_letter && bytes[0] != b'_' && bytes[bytes.len() - 1] != b'_'
}

/// Password policy: 8-32 ASCII characters drawn from digits, letters, and
/// punctuation, mixing at least two of those classes.
pub fn password() -> FuncRule {
    FuncRule {
        check: check_password,
        msg: "must be 8-32 characters mixing at least two of: letters, digits, punctuation",
    }
}

fn check_password(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 8 || bytes.len() > 32 {
        return false;
    }
    let mut classes = 0u8;
    for &b in bytes {
        if b.is_ascii_digit() {
            classes |= 1;
        } else if b.is_ascii_alphabetic() {
            classes |= 2;
        } else if b.is_ascii_punctuation() {
            classes |= 4;
        } else {
            return false;
        }
    }
    classes.count_ones() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern() {
        assert!(EMAIL.is_match("dev@example.com"));
        assert!(EMAIL.is_match("first.last+tag@mail.example.co"));
        assert!(!EMAIL.is_match("not-an-email"));
        assert!(!EMAIL.is_match("a@b"));
    }

    #[test]
    fn mobile_pattern() {
        assert!(MOBILE.is_match("13812345678"));
        assert!(MOBILE.is_match("19912345678"));
        assert!(!MOBILE.is_match("12812345678"));
        assert!(!MOBILE.is_match("1381234567"));
    }

    #[test]
    fn url_pattern() {
        assert!(URL.is_match("https://example.com/"));
        assert!(URL.is_match("http://example.com/a/b?c=d"));
        assert!(URL.is_match("ftp://files.example.com"));
        assert!(!URL.is_match("example.com"));
        assert!(!URL.is_match("https://bad domain"));
    }

    #[test]
    fn base64_pattern() {
        assert!(BASE64.is_match("aGVsbG8="));
        assert!(BASE64.is_match("aGVsbG8gd29ybGQ="));
        assert!(!BASE64.is_match("aGVsbG8"));
        assert!(!BASE64.is_match("!!!"));
    }

    #[test]
    fn ip_pattern() {
        assert!(IP.is_match("127.0.0.1"));
        assert!(IP.is_match("255.255.255.255"));
        assert!(!IP.is_match("256.0.0.1"));
        assert!(!IP.is_match("1.2.3"));
    }

    #[test]
    fn id_card_checksum() {
        assert!(id_card("11010519491231002X"));
        assert!(!id_card("110105194912310021"));
        assert!(!id_card("11010519491231002")); // 17 chars
        assert!(!id_card("1101051949123100xX")); // non-digit body
    }

    #[test]
    fn username_policy() {
        let rule = username();
        assert!((rule.check)("ada_95"));
        assert!((rule.check)("abcde"));
        assert!(!(rule.check)("abcd")); // too short
        assert!(!(rule.check)("12345")); // no letter
        assert!(!(rule.check)("_abcde")); // leading underscore
        assert!(!(rule.check)("abcde_")); // trailing underscore
        assert!(!(rule.check)("ab cde")); // bad character
    }

    #[test]
    fn password_policy() {
        let rule = password();
        assert!((rule.check)("abc12345"));
        assert!((rule.check)("abc!defg"));
        assert!(!(rule.check)("abcdefgh")); // one class
        assert!(!(rule.check)("12345678")); // one class
        assert!(!(rule.check)("ab1!")); // too short
        assert!(!(rule.check)("pässword1")); // non-ascii
    }
}

//! Input normalization helper.
//!
//! The protocol core assumes canonical input: two spellings of the same
//! password must hash identically on both peers. Callers accepting
//! arbitrary user input should normalize usernames and passwords with
//! [`nfkd`] before handing them to the crate.

use unicode_normalization::UnicodeNormalization;

/// Return `s` as an NFKD-normalized string, stripped of leading and
/// trailing whitespace.
pub fn nfkd(s: &str) -> String {
    s.nfkd().collect::<String>().trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::nfkd;

    #[test]
    fn compatibility_forms_collapse() {
        // U+FB01 LATIN SMALL LIGATURE FI decomposes to "fi".
        assert_eq!(nfkd("\u{FB01}sh"), "fish");
        // U+00E9 and "e" + U+0301 normalize to the same sequence.
        assert_eq!(nfkd("caf\u{e9}"), nfkd("cafe\u{301}"));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(nfkd("  alice\t\n"), "alice");
    }
}

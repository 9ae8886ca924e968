// SPDX-License-Identifier: GPL-3.0-or-later

//! Credit-string normalization.
//!
//! Chart credits arrive in wildly inconsistent shapes ("Artist A feat. Artist
//! B & Artist C", "A w/ B", "A x B"). `normalize` derives four progressively
//! looser lookup keys from one credit, each tier stripping one class of
//! collaborator markup:
//!
//! - `raw`: lowercased, trimmed credit as given
//! - `l1`: truncated at featuring markers and opening brackets
//! - `l2`: truncated at joiner tokens (`x`, `+`, `&`, `,`, `and`, `with`, `duet`)
//! - `l3`: `$` folded to `s`, punctuation removed, whitespace collapsed
//!
//! Pure and total: any input, including blank strings, yields a `KeyTier`.

use crate::KeyTier;

/// Featuring markers scanned as plain substrings, in order.
const L1_SUBSTRING_MARKERS: [&str; 3] = ["feat", "w/", "/"];

/// Opening brackets that cut off parenthetical credits.
const L1_BRACKETS: [char; 3] = ['(', '[', '{'];

/// Joiner markers scanned as plain substrings, in order.
const L2_SUBSTRING_MARKERS: [&str; 3] = ["+", "&", ","];

/// Joiner markers that only count as standalone tokens.
const L2_WORD_MARKERS: [&str; 3] = ["and", "with", "duet"];

/// Derive all four lookup keys from a raw credit string.
pub fn normalize(raw: &str) -> KeyTier {
    let base = raw.trim().to_lowercase();
    if base.is_empty() {
        return KeyTier::default();
    }

    let l1 = derive_l1(&base);
    let l2 = derive_l2(&l1);
    let l3 = derive_l3(&l2);

    KeyTier {
        raw: base,
        l1,
        l2,
        l3,
    }
}

/// Reduce a full chart credit to its first-billed artist.
///
/// Used when building the unique-artist input set from raw chart rows, where
/// every co-credited artist collapses onto the lead credit.
pub fn primary_artist(raw: &str) -> String {
    let base = raw.trim().to_lowercase();
    if base.is_empty() {
        return String::new();
    }

    let mut cut = base.len();
    for marker in ["feat.", "&", ","] {
        if let Some(pos) = base.find(marker) {
            cut = cut.min(pos);
        }
    }
    for word in ["featuring", "with", "x", "and"] {
        if let Some(pos) = find_word(&base, word) {
            cut = cut.min(pos);
        }
    }

    collapse_whitespace(&base[..cut])
}

fn derive_l1(base: &str) -> String {
    let mut rest = base;
    for marker in L1_SUBSTRING_MARKERS {
        if let Some(pos) = rest.find(marker) {
            rest = &rest[..pos];
        }
    }
    for bracket in L1_BRACKETS {
        if let Some(pos) = rest.find(bracket) {
            rest = &rest[..pos];
        }
    }
    rest.trim().to_string()
}

fn derive_l2(l1: &str) -> String {
    let mut rest = l1;
    if let Some(pos) = find_word(rest, "x") {
        rest = &rest[..pos];
    }
    for marker in L2_SUBSTRING_MARKERS {
        if let Some(pos) = rest.find(marker) {
            rest = &rest[..pos];
        }
    }
    for word in L2_WORD_MARKERS {
        if let Some(pos) = find_word(rest, word) {
            rest = &rest[..pos];
        }
    }
    rest.trim().to_string()
}

fn derive_l3(l2: &str) -> String {
    let folded = l2.replace('$', "s");
    let cleaned: String = folded
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    collapse_whitespace(&cleaned)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte offset of the first occurrence of `word` as a standalone token.
fn find_word(haystack: &str, word: &str) -> Option<usize> {
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(word) {
        let abs = start + pos;
        let before_ok = haystack[..abs]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let after_ok = haystack[abs + word.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));
        if before_ok && after_ok {
            return Some(abs);
        }
        start = abs + word.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn featuring_credit_strips_to_lead_artist() {
        let keys = normalize("The Weeknd feat. Daft Punk");
        assert_eq!(keys.raw, "the weeknd feat. daft punk");
        assert_eq!(keys.l1, "the weeknd");
        assert_eq!(keys.l2, "the weeknd");
        assert_eq!(keys.l3, "the weeknd");
    }

    #[test]
    fn brackets_truncate_l1() {
        let keys = normalize("Selena Gomez (with Gucci Mane)");
        assert_eq!(keys.l1, "selena gomez");

        let keys = normalize("Artist [Remix Crew]");
        assert_eq!(keys.l1, "artist");

        let keys = normalize("Artist {Deluxe}");
        assert_eq!(keys.l1, "artist");
    }

    #[test]
    fn w_slash_and_bare_slash_truncate_l1() {
        let keys = normalize("Tyga w/ Rich The Kid");
        assert_eq!(keys.l1, "tyga");

        // A slash anywhere cuts the credit, band names included.
        let keys = normalize("AC/DC");
        assert_eq!(keys.raw, "ac/dc");
        assert_eq!(keys.l1, "ac");
    }

    #[test]
    fn joiner_tokens_truncate_l2() {
        assert_eq!(normalize("KAROL G x Nicki Minaj").l2, "karol g");
        assert_eq!(normalize("Marshmello + Khalid").l2, "marshmello");
        assert_eq!(normalize("Bill Medley & Jennifer Warnes").l2, "bill medley");
        assert_eq!(normalize("Beyonce, Shakira").l2, "beyonce");
        assert_eq!(normalize("Kenny Rogers and Dolly Parton").l2, "kenny rogers");
        assert_eq!(normalize("Barbra with Donna Summer").l2, "barbra");
        assert_eq!(normalize("Peaches duet Herb").l2, "peaches");
    }

    #[test]
    fn x_only_matches_as_standalone_token() {
        assert_eq!(normalize("XXXTENTACION").l2, "xxxtentacion");
        assert_eq!(normalize("Lil Nas X").l2, "lil nas");
        // Leading token consumes the whole key; empty keys are never queried.
        assert_eq!(normalize("X Ambassadors").l2, "");
        assert_eq!(normalize("X Ambassadors").l3, "");
    }

    #[test]
    fn and_inside_a_word_does_not_split() {
        assert_eq!(normalize("Wanda Jackson").l2, "wanda jackson");
        assert_eq!(normalize("Brandy").l2, "brandy");
    }

    #[test]
    fn l3_folds_dollar_and_strips_punctuation() {
        assert_eq!(normalize("Ke$ha").l3, "kesha");
        assert_eq!(normalize("A$AP Rocky").l3, "asap rocky");
        assert_eq!(normalize("P!nk").l3, "pnk");
        assert_eq!(normalize("Panic! At The Disco").l3, "panic at the disco");
    }

    #[test]
    fn l3_keeps_unicode_letters() {
        assert_eq!(normalize("Beyoncé").l3, "beyoncé");
    }

    #[test]
    fn l3_collapses_whitespace() {
        assert_eq!(normalize("Florida   Georgia  Line").l3, "florida georgia line");
    }

    #[test]
    fn blank_input_yields_empty_tiers() {
        assert_eq!(normalize(""), KeyTier::default());
        assert_eq!(normalize("   "), KeyTier::default());
        assert!(normalize("   ").is_empty());
    }

    #[test]
    fn tiers_shrink_monotonically() {
        let inputs = [
            "The Weeknd feat. Daft Punk",
            "Macklemore & Ryan Lewis feat. Wanz",
            "AC/DC",
            "Ke$ha",
            "Diddy - Dirty Money (feat. Skylar Grey)",
            "KAROL G x Nicki Minaj",
            "plain artist",
            "",
        ];
        for input in inputs {
            let keys = normalize(input);
            assert!(keys.l1.len() <= keys.raw.len(), "l1 grew for {input:?}");
            assert!(keys.l2.len() <= keys.l1.len(), "l2 grew for {input:?}");
            assert!(keys.l3.len() <= keys.l2.len(), "l3 grew for {input:?}");
        }
    }

    #[test]
    fn l3_is_a_fixed_point() {
        let inputs = [
            "The Weeknd feat. Daft Punk",
            "Ke$ha",
            "Panic! At The Disco",
            "Bill Medley & Jennifer Warnes",
            "Beyoncé",
        ];
        for input in inputs {
            let l3 = normalize(input).l3;
            assert_eq!(normalize(&l3).l3, l3, "l3 not stable for {input:?}");
        }
    }

    #[test]
    fn primary_artist_keeps_first_billing() {
        assert_eq!(
            primary_artist("Machine Gun Kelly, YUNGBLUD & Travis Barker"),
            "machine gun kelly"
        );
        assert_eq!(primary_artist("Shawn Mendes featuring Camila"), "shawn mendes");
        assert_eq!(primary_artist("Silk Sonic x Anderson .Paak"), "silk sonic");
        assert_eq!(primary_artist("Wanda Jackson"), "wanda jackson");
        assert_eq!(primary_artist(""), "");
    }
}

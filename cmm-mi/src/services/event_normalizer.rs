//! Event label normalization
//!
//! Source records carry free-text event labels with inconsistent casing,
//! gendered qualifiers and abbreviations. `normalize` maps them onto the
//! canonical key space used by the event catalog.
//!
//! Rules, applied in order:
//! 1. Strip a trailing gender qualifier ("(Male)", "(Men)", "(Female)",
//!    "(Women)"), remembering which gender it implied.
//! 2. "Short Program" labels become `<level> <Gender> Short Program`.
//! 3. "Excel"/"Championship" labels become `<label> <Gender> Freeskate`,
//!    keeping the full label (including the championship qualifier) as the
//!    level segment.
//! 4. "Pattern Dance" labels become `<level> Solo Pattern Dance`.
//! 5. Anything else passes through unchanged (team maneuvers and solo free
//!    dance carry no gender qualifier).
//!
//! Labels without a male qualifier normalize to the Ladies variant in rules
//! 2 and 3, matching how the source registration system labels its events.

/// Trailing qualifiers implying a gender; checked after title-casing
const MALE_QUALIFIERS: &[&str] = &[" (Male)", " (Men)"];
const FEMALE_QUALIFIERS: &[&str] = &[" (Female)", " (Women)", " (Ladies)"];

/// Normalize a free-text event label to its canonical catalog key.
///
/// Pure string mapping; whether the key names a real slot is the catalog's
/// call.
pub fn normalize(raw_label: &str) -> String {
    let label = title_case(&tidy_whitespace(raw_label));
    let (label, male) = strip_gender_qualifier(&label);

    if label.contains("Short Program") {
        let level = first_word(&label);
        if male {
            format!("{} Mens Short Program", level)
        } else {
            format!("{} Ladies Short Program", level)
        }
    } else if label.contains("Excel") || label.contains("Championship") {
        if male {
            format!("{} Mens Freeskate", label)
        } else {
            format!("{} Ladies Freeskate", label)
        }
    } else if label.contains("Pattern Dance") {
        format!("{} Solo Pattern Dance", first_word(&label))
    } else {
        label
    }
}

/// Remove a trailing gender qualifier, reporting whether it was male
fn strip_gender_qualifier(label: &str) -> (String, bool) {
    for qualifier in MALE_QUALIFIERS {
        if let Some(stripped) = label.strip_suffix(qualifier) {
            return (stripped.to_string(), true);
        }
    }
    for qualifier in FEMALE_QUALIFIERS {
        if let Some(stripped) = label.strip_suffix(qualifier) {
            return (stripped.to_string(), false);
        }
    }
    (label.to_string(), false)
}

fn first_word(label: &str) -> &str {
    label.split_whitespace().next().unwrap_or(label)
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Collapse internal whitespace runs and trim the ends
pub fn tidy_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_program_defaults_to_ladies() {
        assert_eq!(
            normalize("Juvenile Short Program"),
            "Juvenile Ladies Short Program"
        );
    }

    #[test]
    fn test_short_program_male_qualifier() {
        assert_eq!(
            normalize("Juvenile Short Program (Male)"),
            "Juvenile Mens Short Program"
        );
    }

    #[test]
    fn test_championship_keeps_qualifier_in_level_segment() {
        assert_eq!(
            normalize("Senior Championship (Men)"),
            "Senior Championship Mens Freeskate"
        );
        assert_eq!(
            normalize("Senior Championship"),
            "Senior Championship Ladies Freeskate"
        );
    }

    #[test]
    fn test_excel_freeskate() {
        assert_eq!(
            normalize("Excel Intermediate"),
            "Excel Intermediate Ladies Freeskate"
        );
    }

    #[test]
    fn test_pattern_dance_gains_solo_qualifier() {
        assert_eq!(
            normalize("Juvenile Pattern Dance"),
            "Juvenile Solo Pattern Dance"
        );
    }

    #[test]
    fn test_team_maneuvers_passes_through() {
        assert_eq!(normalize("Open Team Maneuvers"), "Open Team Maneuvers");
    }

    #[test]
    fn test_solo_free_dance_passes_through() {
        assert_eq!(
            normalize("Intermediate Solo Free Dance"),
            "Intermediate Solo Free Dance"
        );
    }

    #[test]
    fn test_casing_and_whitespace_are_normalized() {
        assert_eq!(
            normalize("  juvenile   SHORT program "),
            "Juvenile Ladies Short Program"
        );
    }

    #[test]
    fn test_female_qualifier_is_stripped() {
        assert_eq!(
            normalize("Juvenile Short Program (Female)"),
            "Juvenile Ladies Short Program"
        );
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("mai NGUYEN"), "Mai Nguyen");
        assert_eq!(title_case("o'brien"), "O'Brien");
        assert_eq!(title_case("ana-maria"), "Ana-Maria");
    }

    #[test]
    fn test_tidy_whitespace() {
        assert_eq!(tidy_whitespace("  Mai   Nguyen "), "Mai Nguyen");
        assert_eq!(tidy_whitespace(""), "");
    }
}

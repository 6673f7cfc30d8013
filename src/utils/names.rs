//! # Name Canonicalization
//!
//! Table outcomes arrive as display strings ("Flaming (Greater)", "Potion of
//! Retaliation (Lesser)", "3rd-rank Scroll"). These helpers turn them into
//! the identifiers and composed names the item records use.

/// Purifies a raw rune outcome into a canonical camel-case identifier.
///
/// A trailing parenthetical qualifier becomes a lowercase prefix and the
/// base name is re-cased to camel form; spaces and hyphens are stripped.
/// Already-purified identifiers pass through unchanged.
///
/// # Examples
///
/// ```
/// use lootforge::purify_rune_name;
///
/// assert_eq!(purify_rune_name("Flaming (Greater)"), "greaterFlaming");
/// assert_eq!(purify_rune_name("Ghost Touch"), "ghostTouch");
/// assert_eq!(purify_rune_name("Energy-Resistant (Greater)"), "greaterEnergyResistant");
/// assert_eq!(purify_rune_name("greaterFlaming"), "greaterFlaming");
/// ```
pub fn purify_rune_name(raw: &str) -> String {
    let trimmed = raw.trim();
    match split_trailing_parenthetical(trimmed) {
        Some((base, qualifier)) => {
            format!("{}{}", camel_case(qualifier, false), camel_case(base, true))
        }
        None => camel_case(trimmed, false),
    }
}

/// Splits `"Base Name (Qualifier)"` into `("Base Name", "Qualifier")`.
///
/// Returns `None` when the name carries no trailing parenthetical.
pub fn split_trailing_parenthetical(name: &str) -> Option<(&str, &str)> {
    if !name.ends_with(')') {
        return None;
    }
    let open = name.rfind(" (")?;
    let base = &name[..open];
    let qualifier = &name[open + 2..name.len() - 1];
    if base.is_empty() || qualifier.is_empty() {
        return None;
    }
    Some((base, qualifier))
}

/// Joins the space- and hyphen-separated words of `input`, upper-casing each
/// word's first letter. With `capitalize_first` false the very first letter
/// is lower-cased instead, yielding lower-camel form.
///
/// Characters beyond each word's first are left untouched so that purified
/// identifiers survive a second pass.
fn camel_case(input: &str, capitalize_first: bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut first_word = true;
    for word in input.split(|c: char| c == ' ' || c == '-') {
        if word.is_empty() {
            continue;
        }
        let mut chars = word.chars();
        if let Some(head) = chars.next() {
            if first_word && !capitalize_first {
                out.extend(head.to_lowercase());
            } else {
                out.extend(head.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
        first_word = false;
    }
    out
}

/// Injects an elemental descriptor into a Retaliation-style potion name:
/// `"Potion of X (Y)"` becomes `"Potion of <descriptor> X (Y)"`.
///
/// Names that do not match the pattern are returned unchanged.
///
/// # Examples
///
/// ```
/// use lootforge::add_element_to_retaliation;
///
/// assert_eq!(
///     add_element_to_retaliation("Potion of Retaliation (Lesser)", "Fire"),
///     "Potion of Fire Retaliation (Lesser)"
/// );
/// ```
pub fn add_element_to_retaliation(potion_name: &str, descriptor: &str) -> String {
    let Some(core) = potion_name.strip_prefix("Potion of ") else {
        return potion_name.to_string();
    };
    let (core_name, suffix) = match split_trailing_parenthetical(core) {
        Some((base, _)) => (base, &core[base.len()..]),
        None => (core, ""),
    };
    if core_name.is_empty() {
        return potion_name.to_string();
    }
    format!("Potion of {} {}{}", descriptor, core_name, suffix)
}

/// Injects an elemental descriptor into an Energy-Breath-style potion name:
/// `"X Potion"` becomes `"X Potion (<descriptor>)"`, merging with an
/// existing parenthetical as `"(<descriptor>, <existing>)"`.
///
/// Names that do not match the pattern are returned unchanged.
///
/// # Examples
///
/// ```
/// use lootforge::add_element_to_energy_breath;
///
/// assert_eq!(
///     add_element_to_energy_breath("Energy Breath Potion", "Fire"),
///     "Energy Breath Potion (Fire)"
/// );
/// assert_eq!(
///     add_element_to_energy_breath("Energy Breath Potion (Greater)", "Fire"),
///     "Energy Breath Potion (Fire, Greater)"
/// );
/// ```
pub fn add_element_to_energy_breath(potion_name: &str, descriptor: &str) -> String {
    if let Some((base, existing)) = split_trailing_parenthetical(potion_name) {
        if base.ends_with("Potion") {
            return format!("{} ({}, {})", base, descriptor, existing);
        }
        return potion_name.to_string();
    }
    if potion_name.ends_with("Potion") {
        return format!("{} ({})", potion_name, descriptor);
    }
    potion_name.to_string()
}

/// Extracts the numeric spell rank from a scroll name such as
/// `"3rd-rank Scroll"`. Names outside that shape yield rank 0.
///
/// # Examples
///
/// ```
/// use lootforge::extract_scroll_rank;
///
/// assert_eq!(extract_scroll_rank("3rd-rank Scroll"), 3);
/// assert_eq!(extract_scroll_rank("1st-rank Scroll"), 1);
/// assert_eq!(extract_scroll_rank("Scroll of Glibness"), 0);
/// ```
pub fn extract_scroll_rank(scroll_name: &str) -> i32 {
    let Some(ordinal) = scroll_name.strip_suffix("-rank Scroll") else {
        return 0;
    };
    let digits: String = ordinal.chars().take_while(|c| c.is_ascii_digit()).collect();
    let tail = &ordinal[digits.len()..];
    if digits.is_empty() || tail.is_empty() || !tail.chars().all(|c| c.is_ascii_lowercase()) {
        return 0;
    }
    digits.parse().unwrap_or(0)
}

/// Formats a spell rank as its English ordinal, the inverse of
/// [`extract_scroll_rank`]'s parsing.
///
/// # Examples
///
/// ```
/// use lootforge::rank_ordinal;
///
/// assert_eq!(rank_ordinal(3), "3rd");
/// assert_eq!(rank_ordinal(11), "11th");
/// ```
pub fn rank_ordinal(rank: i32) -> String {
    let suffix = match (rank % 10, rank % 100) {
        (1, n) if n != 11 => "st",
        (2, n) if n != 12 => "nd",
        (3, n) if n != 13 => "rd",
        _ => "th",
    };
    format!("{}{}", rank, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purify_plain_rune() {
        assert_eq!(purify_rune_name("Anarchic"), "anarchic");
        assert_eq!(purify_rune_name("Ghost Touch"), "ghostTouch");
    }

    #[test]
    fn test_purify_qualified_rune() {
        assert_eq!(purify_rune_name("Flaming (Greater)"), "greaterFlaming");
        assert_eq!(purify_rune_name("Fortification (Greater)"), "greaterFortification");
    }

    #[test]
    fn test_purify_hyphenated_rune() {
        assert_eq!(purify_rune_name("Energy-Resistant"), "energyResistant");
        assert_eq!(
            purify_rune_name("Energy-Absorbing (Greater)"),
            "greaterEnergyAbsorbing"
        );
    }

    #[test]
    fn test_purify_is_idempotent() {
        for raw in ["Flaming (Greater)", "Ghost Touch", "Anarchic", "Energy-Resistant"] {
            let once = purify_rune_name(raw);
            assert_eq!(purify_rune_name(&once), once, "second pass changed '{}'", raw);
        }
    }

    #[test]
    fn test_split_trailing_parenthetical() {
        assert_eq!(
            split_trailing_parenthetical("Flaming (Greater)"),
            Some(("Flaming", "Greater"))
        );
        assert_eq!(split_trailing_parenthetical("Flaming"), None);
        assert_eq!(split_trailing_parenthetical("(Greater)"), None);
    }

    #[test]
    fn test_retaliation_descriptor() {
        assert_eq!(
            add_element_to_retaliation("Potion of Retaliation (Lesser)", "Fire"),
            "Potion of Fire Retaliation (Lesser)"
        );
        assert_eq!(
            add_element_to_retaliation("Potion of Retaliation", "Cold"),
            "Potion of Cold Retaliation"
        );
    }

    #[test]
    fn test_retaliation_leaves_other_names_alone() {
        assert_eq!(
            add_element_to_retaliation("Elixir of Life (Minor)", "Fire"),
            "Elixir of Life (Minor)"
        );
    }

    #[test]
    fn test_energy_breath_descriptor() {
        assert_eq!(
            add_element_to_energy_breath("Energy Breath Potion", "Acid"),
            "Energy Breath Potion (Acid)"
        );
        assert_eq!(
            add_element_to_energy_breath("Energy Breath Potion (Greater)", "Acid"),
            "Energy Breath Potion (Acid, Greater)"
        );
    }

    #[test]
    fn test_energy_breath_leaves_other_names_alone() {
        assert_eq!(
            add_element_to_energy_breath("Potion of Expeditious Retreat", "Acid"),
            "Potion of Expeditious Retreat"
        );
    }

    #[test]
    fn test_scroll_rank_extraction() {
        assert_eq!(extract_scroll_rank("1st-rank Scroll"), 1);
        assert_eq!(extract_scroll_rank("2nd-rank Scroll"), 2);
        assert_eq!(extract_scroll_rank("3rd-rank Scroll"), 3);
        assert_eq!(extract_scroll_rank("10th-rank Scroll"), 10);
    }

    #[test]
    fn test_scroll_rank_rejects_other_shapes() {
        assert_eq!(extract_scroll_rank("Scroll"), 0);
        assert_eq!(extract_scroll_rank("rank Scroll"), 0);
        assert_eq!(extract_scroll_rank("x3rd-rank Scroll"), 0);
        assert_eq!(extract_scroll_rank("3-rank Scroll"), 0);
    }

    #[test]
    fn test_rank_ordinals() {
        assert_eq!(rank_ordinal(1), "1st");
        assert_eq!(rank_ordinal(2), "2nd");
        assert_eq!(rank_ordinal(3), "3rd");
        assert_eq!(rank_ordinal(4), "4th");
        assert_eq!(rank_ordinal(11), "11th");
        assert_eq!(rank_ordinal(12), "12th");
        assert_eq!(rank_ordinal(13), "13th");
        assert_eq!(rank_ordinal(21), "21st");
    }
}

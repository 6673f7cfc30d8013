//! # Potency Strings
//!
//! Potency outcomes arrive as `"+N <tier name>"` (for example
//! `"+2 Striking weapon"`). The numeric bonus drives the property-rune
//! budget and the tier suffix selects the fundamental rune family, so the
//! split has to be exact: malformed input is an error here, and call sites
//! that can tolerate it degrade instead (see `item::normalize`).

use crate::{ForgeError, ForgeResult};

/// A potency outcome split into its numeric bonus and tier suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotencySplit {
    /// Numeric bonus, the `N` of `"+N <tier>"`
    pub potency: i32,
    /// Everything after the bonus, e.g. `"Striking weapon"`
    pub bonus: String,
}

/// Splits a potency string of the form `"+N <rest>"` (the `+` is optional).
///
/// # Examples
///
/// ```
/// use lootforge::split_potency;
///
/// let split = split_potency("+2 Striking weapon").unwrap();
/// assert_eq!(split.potency, 2);
/// assert_eq!(split.bonus, "Striking weapon");
///
/// assert!(split_potency("Striking weapon").is_err());
/// ```
pub fn split_potency(input: &str) -> ForgeResult<PotencySplit> {
    let trimmed = input.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let Some(space) = unsigned.find(char::is_whitespace) else {
        return Err(ForgeError::Potency(input.to_string()));
    };
    let (number, rest) = unsigned.split_at(space);
    let bonus = rest.trim_start();
    if number.is_empty() || bonus.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ForgeError::Potency(input.to_string()));
    }
    let potency = number
        .parse::<i32>()
        .map_err(|_| ForgeError::Potency(input.to_string()))?;
    Ok(PotencySplit {
        potency,
        bonus: bonus.to_string(),
    })
}

/// Rewrites a staff/wand potency outcome onto the weapon scale so it parses
/// like any other potency string: the carrier wording `Enchanted` becomes
/// `Striking` and the implement noun becomes `weapon`.
///
/// # Examples
///
/// ```
/// use lootforge::map_carrier_potency;
///
/// assert_eq!(map_carrier_potency("+1 Enchanted Staff"), "+1 Striking weapon");
/// assert_eq!(map_carrier_potency("+3 Enchanted Wand"), "+3 Striking weapon");
/// ```
pub fn map_carrier_potency(input: &str) -> String {
    input
        .replace("Enchanted", "Striking")
        .replace("Staff", "weapon")
        .replace("Wand", "weapon")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_potency_with_plus() {
        let split = split_potency("+1 Resilient armor").unwrap();
        assert_eq!(split.potency, 1);
        assert_eq!(split.bonus, "Resilient armor");
    }

    #[test]
    fn test_split_potency_without_plus() {
        let split = split_potency("2 Property Runes").unwrap();
        assert_eq!(split.potency, 2);
        assert_eq!(split.bonus, "Property Runes");
    }

    #[test]
    fn test_split_potency_rejects_missing_number() {
        assert!(matches!(
            split_potency("Striking weapon"),
            Err(ForgeError::Potency(_))
        ));
    }

    #[test]
    fn test_split_potency_rejects_missing_suffix() {
        assert!(matches!(split_potency("+2"), Err(ForgeError::Potency(_))));
        assert!(matches!(split_potency("+2 "), Err(ForgeError::Potency(_))));
    }

    #[test]
    fn test_split_potency_rejects_glued_suffix() {
        assert!(matches!(
            split_potency("+2Striking"),
            Err(ForgeError::Potency(_))
        ));
    }

    #[test]
    fn test_carrier_mapping() {
        assert_eq!(map_carrier_potency("+2 Enchanted Staff"), "+2 Striking weapon");
        assert_eq!(map_carrier_potency("+1 Enchanted Wand"), "+1 Striking weapon");
        // Weapon potency strings pass through untouched
        assert_eq!(map_carrier_potency("+2 Striking weapon"), "+2 Striking weapon");
    }
}

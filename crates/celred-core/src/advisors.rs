//! The advisor directory: an ordered roster of WhatsApp contacts eligible to
//! receive routed leads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single advisor in the directory.
///
/// `number` is the normalized (digits-only) contact number and is the
/// advisor's identity within the roster. Name and image are display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorRecord {
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("contact number must contain at least one digit")]
    EmptyNumber,
    #[error("advisor '{0}' is already in the roster")]
    DuplicateNumber(String),
}

/// Strips every non-digit character from a raw contact number.
///
/// `"(300) 111-2222"` becomes `"3001112222"`. The result may be empty; callers
/// that require a usable number must reject empty output.
#[must_use]
pub fn normalize_number(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// The persisted advisor directory, in insertion order.
///
/// Order carries no meaning beyond display; identity is the normalized
/// number, so two entries that normalize to the same digits are the same
/// advisor regardless of formatting or display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    advisors: Vec<AdvisorRecord>,
}

impl Roster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps records already normalized elsewhere (e.g. read back from the
    /// database) without re-validating them.
    #[must_use]
    pub fn from_records(advisors: Vec<AdvisorRecord>) -> Self {
        Self { advisors }
    }

    /// Normalizes `raw_number` and appends a new advisor.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::EmptyNumber`] if no digits survive
    /// normalization, or [`RosterError::DuplicateNumber`] if an advisor with
    /// the same normalized number is already present. The roster is left
    /// unchanged on error.
    pub fn add(&mut self, raw_number: &str, name: Option<&str>) -> Result<(), RosterError> {
        let number = normalize_number(raw_number);
        if number.is_empty() {
            return Err(RosterError::EmptyNumber);
        }
        if self.contains(&number) {
            return Err(RosterError::DuplicateNumber(number));
        }

        let name = name.map(str::trim).filter(|n| !n.is_empty());
        self.advisors.push(AdvisorRecord {
            number,
            name: name.map(ToOwned::to_owned),
            image_url: None,
        });
        Ok(())
    }

    /// Removes the advisor with the given normalized number.
    ///
    /// Returns `true` if an entry was removed.
    pub fn remove(&mut self, number: &str) -> bool {
        let before = self.advisors.len();
        self.advisors.retain(|a| a.number != number);
        self.advisors.len() != before
    }

    /// Sets the image URL on an existing advisor. Returns `false` if the
    /// number is not in the roster.
    pub fn set_image_url(&mut self, number: &str, url: &str) -> bool {
        match self.advisors.iter_mut().find(|a| a.number == number) {
            Some(advisor) => {
                advisor.image_url = Some(url.to_owned());
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, number: &str) -> bool {
        self.advisors.iter().any(|a| a.number == number)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.advisors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.advisors.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[AdvisorRecord] {
        &self.advisors
    }

    #[must_use]
    pub fn into_records(self) -> Vec<AdvisorRecord> {
        self.advisors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_formatting() {
        assert_eq!(normalize_number("(300) 111-2222"), "3001112222");
        assert_eq!(normalize_number("+57 316 654 1275"), "573166541275");
        assert_eq!(normalize_number("573001111111"), "573001111111");
    }

    #[test]
    fn normalize_can_produce_empty_string() {
        assert_eq!(normalize_number("abc"), "");
        assert_eq!(normalize_number(" +()- "), "");
    }

    #[test]
    fn add_normalizes_and_keeps_insertion_order() {
        let mut roster = Roster::new();
        roster.add("573001111111", Some("Laura")).expect("first add");
        roster.add("(300) 111-2222", None).expect("second add");

        let numbers: Vec<&str> = roster.as_slice().iter().map(|a| a.number.as_str()).collect();
        assert_eq!(numbers, vec!["573001111111", "3001112222"]);
        assert_eq!(roster.as_slice()[0].name.as_deref(), Some("Laura"));
        assert_eq!(roster.as_slice()[1].name, None);
    }

    #[test]
    fn add_rejects_number_without_digits() {
        let mut roster = Roster::new();
        assert_eq!(roster.add("---", None), Err(RosterError::EmptyNumber));
        assert!(roster.is_empty());
    }

    #[test]
    fn add_rejects_duplicate_by_normalized_number() {
        let mut roster = Roster::new();
        roster.add("(300) 111-2222", Some("Laura")).expect("add");

        // Different formatting and a different display name still collide.
        let err = roster.add("300-111-2222", Some("Carlos")).unwrap_err();
        assert_eq!(err, RosterError::DuplicateNumber("3001112222".to_owned()));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn add_blanks_out_empty_display_name() {
        let mut roster = Roster::new();
        roster.add("573001111111", Some("   ")).expect("add");
        assert_eq!(roster.as_slice()[0].name, None);
    }

    #[test]
    fn remove_by_number() {
        let mut roster = Roster::new();
        roster.add("573001111111", None).expect("add");
        roster.add("573002222222", None).expect("add");

        assert!(roster.remove("573001111111"));
        assert!(!roster.remove("573009999999"));
        assert_eq!(roster.len(), 1);
        assert!(roster.contains("573002222222"));
    }

    #[test]
    fn set_image_url_only_touches_existing_advisors() {
        let mut roster = Roster::new();
        roster.add("573001111111", None).expect("add");

        assert!(roster.set_image_url("573001111111", "https://cdn.example.com/a.jpg"));
        assert!(!roster.set_image_url("573009999999", "https://cdn.example.com/b.jpg"));
        assert_eq!(
            roster.as_slice()[0].image_url.as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
    }

    #[test]
    fn roster_serializes_as_plain_array() {
        let mut roster = Roster::new();
        roster.add("573001111111", Some("Laura")).expect("add");
        let json = serde_json::to_string(&roster).expect("serialize");
        assert!(json.starts_with('['), "expected transparent array, got {json}");
        assert!(json.contains("\"number\":\"573001111111\""));
    }
}

//! The fixed country roster every aggregate runs over.

use std::env;

/// Environment override for the roster, comma-separated in display order.
pub const COUNTRIES_ENV_VAR: &str = "DOUZE_COUNTRIES";

/// The Eurovision 2024 grand final in running order (25 entries performed).
pub const DEFAULT_COUNTRIES: [&str; 25] = [
    "Sweden",
    "Ukraine",
    "Germany",
    "Luxembourg",
    "Israel",
    "Lithuania",
    "Spain",
    "Estonia",
    "Ireland",
    "Latvia",
    "Greece",
    "United Kingdom",
    "Norway",
    "Italy",
    "Serbia",
    "Finland",
    "Portugal",
    "Armenia",
    "Cyprus",
    "Switzerland",
    "Slovenia",
    "Croatia",
    "Georgia",
    "France",
    "Austria",
];

/// An ordered, duplicate-free list of country names.
/// Order is display order; it never changes after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    names: Vec<String>,
}

impl Default for Roster {
    fn default() -> Self {
        Roster {
            names: DEFAULT_COUNTRIES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Roster {
    /// Parse a comma-separated roster. Entries are trimmed; blank entries
    /// and duplicates are rejected.
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut names: Vec<String> = Vec::new();
        for entry in input.split(',') {
            let name = entry.trim();
            if name.is_empty() {
                return Err(format!("blank country entry in roster: {input:?}"));
            }
            if names.iter().any(|n| n == name) {
                return Err(format!("duplicate country in roster: {name:?}"));
            }
            names.push(name.to_string());
        }
        Ok(Roster { names })
    }

    /// Build the roster from `DOUZE_COUNTRIES` if set, else the default list.
    pub fn from_env() -> Result<Self, String> {
        match env::var(COUNTRIES_ENV_VAR) {
            Ok(value) => Self::parse(&value),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn contains(&self, country: &str) -> bool {
        self.names.iter().any(|n| n == country)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn default_roster_is_the_grand_final_running_order() {
        let roster = Roster::default();
        assert_eq!(roster.len(), 25);
        assert_eq!(roster.names()[0], "Sweden");
        assert_eq!(roster.names()[24], "Austria");
        assert!(roster.contains("United Kingdom"));
        assert!(!roster.contains("Australia"));
    }

    #[test_log::test]
    fn parse_trims_and_keeps_order() {
        let roster = Roster::parse("Sweden, France ,Estonia").unwrap();
        assert_eq!(roster.names(), ["Sweden", "France", "Estonia"]);
    }

    #[test_log::test]
    fn parse_rejects_blank_entries() {
        assert!(Roster::parse("Sweden,,France").is_err());
        assert!(Roster::parse("").is_err());
    }

    #[test_log::test]
    fn parse_rejects_duplicates() {
        assert!(Roster::parse("Sweden,France,Sweden").is_err());
    }
}

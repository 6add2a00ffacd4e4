//! # County List Module
//!
//! ## Purpose
//! Static list of the 67 Pennsylvania counties accepted by the portal's search
//! form, and resolution of a county selection against that list.
//!
//! ## Input/Output Specification
//! - **Input**: An explicit county list or the "all" sentinel
//! - **Output**: Canonically-cased county names, validated before any network use

use crate::errors::{Result, ScrapeError};

/// Every county accepted by the portal's `County` form field, in the order the
/// portal lists them. Fan-out follows this order when all counties are scraped.
pub const ALL_COUNTIES: [&str; 67] = [
    "Adams",
    "Allegheny",
    "Armstrong",
    "Beaver",
    "Bedford",
    "Berks",
    "Blair",
    "Bradford",
    "Bucks",
    "Butler",
    "Cambria",
    "Cameron",
    "Carbon",
    "Centre",
    "Chester",
    "Clarion",
    "Clearfield",
    "Clinton",
    "Columbia",
    "Crawford",
    "Cumberland",
    "Dauphin",
    "Delaware",
    "Elk",
    "Erie",
    "Fayette",
    "Forest",
    "Franklin",
    "Fulton",
    "Greene",
    "Huntingdon",
    "Indiana",
    "Jefferson",
    "Juniata",
    "Lackawanna",
    "Lancaster",
    "Lawrence",
    "Lebanon",
    "Lehigh",
    "Luzerne",
    "Lycoming",
    "McKean",
    "Mercer",
    "Mifflin",
    "Monroe",
    "Montgomery",
    "Montour",
    "Northampton",
    "Northumberland",
    "Perry",
    "Philadelphia",
    "Pike",
    "Potter",
    "Schuylkill",
    "Snyder",
    "Somerset",
    "Sullivan",
    "Susquehanna",
    "Tioga",
    "Union",
    "Venango",
    "Warren",
    "Washington",
    "Wayne",
    "Westmoreland",
    "Wyoming",
    "York",
];

/// Look up the canonical casing for a county name, case-insensitively.
pub fn canonical(name: &str) -> Option<&'static str> {
    let trimmed = name.trim();
    ALL_COUNTIES
        .iter()
        .find(|county| county.eq_ignore_ascii_case(trimmed))
        .copied()
}

/// Validate an explicit county list against the static list, returning the
/// canonically-cased names in input order.
pub fn resolve_list(names: &[String]) -> Result<Vec<String>> {
    names
        .iter()
        .map(|name| {
            canonical(name)
                .map(str::to_string)
                .ok_or_else(|| ScrapeError::Validation {
                    field: "counties".to_string(),
                    reason: format!("'{}' is not a Pennsylvania county", name.trim()),
                })
        })
        .collect()
}

//! Structured job posting header.
//!
//! Postings may start with a machine-readable header:
//!
//! ```text
//! Adressat: BWI GmbH Auf dem Steinbüchel 22 53340 Meckenheim Deutschland
//! Stelle: Senior DevOps Engineer (m/w/d)
//! Stellen-ID: 61383
//! ```
//!
//! Anything missing falls back to neutral defaults so callers can always
//! build [`ApplicationInputs`].

use serde::{Deserialize, Serialize};

use appligen_types::generation::ApplicationInputs;

const DEFAULT_COMPANY: &str = "Unternehmen";
const DEFAULT_POSITION: &str = "Position";
const DEFAULT_COUNTRY: &str = "Deutschland";

/// Legal-form tokens that end a company name in an address line.
const COMPANY_SUFFIXES: [&str; 7] = ["gmbh", "ag", "kg", "co.", "co", "ohg", "mbh"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingHeader {
    pub company_name: String,
    pub street: String,
    /// Postal code and city, e.g. `53340 Meckenheim`.
    pub postal_city: String,
    pub country: String,
    pub position_title: String,
    pub reference_id: Option<String>,
}

impl Default for PostingHeader {
    fn default() -> Self {
        Self {
            company_name: DEFAULT_COMPANY.to_string(),
            street: String::new(),
            postal_city: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            position_title: DEFAULT_POSITION.to_string(),
            reference_id: None,
        }
    }
}

impl PostingHeader {
    /// True when the posting named its company explicitly.
    pub fn has_company(&self) -> bool {
        self.company_name != DEFAULT_COMPANY
    }

    /// Combine with the profile and full posting text into generator inputs.
    pub fn into_inputs(self, profile_text: String, job_text: String) -> ApplicationInputs {
        ApplicationInputs {
            profile_text,
            job_text,
            company_name: self.company_name,
            position_title: self.position_title,
            reference_id: self.reference_id,
        }
    }
}

/// Parse the header lines of a posting. Unknown lines are ignored.
pub fn parse_posting_header(job_text: &str) -> PostingHeader {
    let mut header = PostingHeader::default();

    for line in job_text.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("Adressat:") {
            apply_address(&mut header, rest.trim());
        } else if let Some(rest) = line.strip_prefix("Stelle:") {
            let position = rest.trim();
            if !position.is_empty() {
                header.position_title = position.to_string();
            }
        } else if let Some(rest) = line.strip_prefix("Stellen-ID:") {
            let id = rest.trim();
            if !id.is_empty() {
                header.reference_id = Some(id.to_string());
            }
        }
    }

    header
}

/// Split `<company> <street> <5-digit postcode> <city...> [country]`.
fn apply_address(header: &mut PostingHeader, address: &str) {
    let parts: Vec<&str> = address.split_whitespace().collect();
    if parts.len() < 4 {
        return;
    }

    let Some(postcode_index) = parts
        .iter()
        .position(|p| p.len() == 5 && p.chars().all(|c| c.is_ascii_digit()))
    else {
        return;
    };
    if postcode_index == 0 {
        return;
    }

    let company_end = parts[..postcode_index.saturating_sub(1)]
        .iter()
        .position(|p| COMPANY_SUFFIXES.contains(&p.to_lowercase().as_str()))
        .map(|i| i + 1)
        .unwrap_or(1);

    let postcode = parts[postcode_index];
    let (city, country) = if parts.len() > postcode_index + 2 {
        (
            parts[postcode_index + 1..parts.len() - 1].join(" "),
            parts[parts.len() - 1].to_string(),
        )
    } else {
        (
            parts.get(postcode_index + 1).copied().unwrap_or_default().to_string(),
            DEFAULT_COUNTRY.to_string(),
        )
    };

    header.company_name = parts[..company_end].join(" ");
    header.street = parts[company_end..postcode_index].join(" ");
    header.postal_city = format!("{postcode} {city}").trim_end().to_string();
    header.country = country;
}

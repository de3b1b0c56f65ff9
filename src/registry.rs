//! Known-lender registry
//!
//! Immutable process-wide knowledge used by snippet selection, entity
//! filtering, and validation:
//! - Canonical lender display names (with precomputed normalized forms)
//! - Ordered alias list mapping free-text variants to canonical names
//! - Blacklist of terms that must never be treated as lenders
//! - Key phrases that anchor snippet extraction
//! - Keyword patterns that decide whether an extracted entity is
//!   lender-relevant at all
//!
//! The registry is built once and passed explicitly into each collaborator
//! rather than living in module-level statics, so tests can construct
//! small variants.

use regex::RegexSet;
use std::collections::HashMap;
use std::collections::HashSet;

use crate::normalizer::normalize;

/// Canonical display names of known lending institutions.
/// Order matters: the known-list validation stage scans in this order and
/// the first satisfying entry wins.
const KNOWN_LENDERS: &[&str] = &[
    "JPMorgan Chase",
    "Bank of America",
    "Citibank",
    "Wells Fargo",
    "U.S. Bank",
    "Truist",
    "Capital One",
    "Fifth Third Bank",
    "Regions Bank",
    "PNC Financial",
    "KeyBank",
    "BB&T",
    "SunTrust",
    "First Republic Bank",
    "M&T Bank",
    "Huntington Bancshares",
    "BMO Harris Bank",
    "Citizens Bank",
    "Associated Bank",
    "Old National Bank",
    "Bank of the West",
    "HSBC",
    "Barclays Bank",
    "Deutsche Bank",
    "Credit Suisse",
    "BNP Paribas",
    "Societe Generale",
    "UniCredit",
    "Santander Bank",
    "Standard Chartered",
    "ING Bank",
    "NatWest",
    "Lloyds Banking Group",
    "UBS",
    "Comerica",
    "Flagstar Bank",
    "First Citizens Bank",
    "Signature Bank",
    "Zions Bancorporation",
    "Investors Bank",
    "UMB Financial",
    "Associated Banc-Corp",
    "Iberiabank",
    "Mitsubishi UFJ Financial Group",
    "Sumitomo Mitsui Banking Corporation",
    "Mizuho Bank",
    "Bank of China",
    "Industrial and Commercial Bank of China",
    "Agricultural Bank of China",
    "China Construction Bank",
    "Bank of Communications",
    "China Merchants Bank",
    "Bank of Montreal",
    "Royal Bank of Canada",
    "Toronto-Dominion Bank",
    "Scotiabank",
    "Banco do Brasil",
    "Itau Unibanco",
    "Banco Bradesco",
    "Banco Santander Brasil",
    "Navy Federal Credit Union",
    "Pentagon Federal Credit Union",
    "OneMain Financial",
    "CIT Group",
    "Ally Financial",
    "GE Capital",
    "Investec Bank",
    "Rabobank",
    "MetLife",
    "Prudential",
    "New York Life",
    "AIG Financial",
    "American Express",
    "Synchrony Financial",
    "Wachovia",
    "LaSalle Bank",
];

/// Built-in alias -> canonical mappings, in priority order. The alias text
/// is matched as written (including punctuation) against the normalized
/// candidate name via substring containment.
const LENDER_ALIASES: &[(&str, &str)] = &[
    ("wells fargo bank", "Wells Fargo"),
    ("wells fargo bank, n.a.", "Wells Fargo"),
    ("j.p. morgan securities", "JPMorgan Chase"),
    ("bank of america, n.a.", "Bank of America"),
    ("bb&t", "BB&T"),
    ("suntrust bank", "SunTrust"),
    ("mufg bank", "Mitsubishi UFJ Financial Group"),
    ("wachovia bank", "Wachovia"),
    ("la salle bank", "LaSalle Bank"),
];

/// Lowercase terms that pass the keyword filter but are never lenders.
const BLACKLIST: &[&str] = &[
    "fasb",
    "eu",
    "u.s. financial accounting standards board",
    "credit facility",
    "loan agreement",
    "administrative agent",
];

/// Phrases that anchor snippet extraction, in scan order.
const KEY_PHRASES: &[&str] = &[
    "Credit Agreement",
    "Revolving Credit",
    "Term Loan",
    "Note Purchase Agreement",
    "Credit Facility",
    "Financing Arrangements",
    "Loan Agreement",
    "Indenture",
    "Credit and Security",
    "Loan and Security",
    "Administrative Agent",
    "Syndication Agent",
    "Documentation Agent",
    "Arranger",
    "Co-Arranger",
    "Agent Bank",
    "between",
];

/// Keyword patterns an extracted entity must match (lowercased) to be
/// considered lender-relevant.
const SEARCH_KEYWORDS: &[&str] = &[
    r"\bbank\b",
    r"\bfinancial\b",
    r"\btrust\b",
    r"\bcapital\b",
    r"\bcredit\b",
    r"\binsurance\b",
    r"\bpartners\b",
    r"\bfund\b",
    r"\bsecurities\b",
    r"\blender\b",
    r"\bagent\b",
    r"\barranger\b",
    r"\bsyndicate\b",
    r"\bsyndication\b",
];

/// Immutable lender knowledge shared by the extraction pipeline.
#[derive(Debug)]
pub struct LenderRegistry {
    known_lenders: Vec<String>,
    normalized_known: Vec<String>,
    aliases: Vec<(String, String)>,
    blacklist: HashSet<String>,
    key_phrases: Vec<String>,
    keywords: RegexSet,
}

impl LenderRegistry {
    /// Build the registry from the built-in lists.
    pub fn builtin() -> Self {
        Self::with_extra_aliases(&HashMap::new())
    }

    /// Build the registry with additional alias mappings appended after the
    /// built-in list. Built-in aliases keep priority; extra aliases are
    /// checked afterwards in sorted-key order so lookup stays deterministic.
    pub fn with_extra_aliases(extra: &HashMap<String, String>) -> Self {
        let known_lenders: Vec<String> = KNOWN_LENDERS.iter().map(|s| s.to_string()).collect();
        let normalized_known = known_lenders.iter().map(|k| normalize(k)).collect();

        let mut aliases: Vec<(String, String)> = LENDER_ALIASES
            .iter()
            .map(|(a, c)| (a.to_string(), c.to_string()))
            .collect();
        let mut extra_sorted: Vec<_> = extra.iter().collect();
        extra_sorted.sort_by(|a, b| a.0.cmp(b.0));
        for (alias, canonical) in extra_sorted {
            aliases.push((alias.to_lowercase(), canonical.clone()));
        }

        Self {
            known_lenders,
            normalized_known,
            aliases,
            blacklist: BLACKLIST.iter().map(|s| s.to_string()).collect(),
            key_phrases: KEY_PHRASES.iter().map(|s| s.to_string()).collect(),
            keywords: RegexSet::new(SEARCH_KEYWORDS).expect("built-in keyword patterns compile"),
        }
    }

    /// Canonical lender names in priority order.
    pub fn known_lenders(&self) -> &[String] {
        &self.known_lenders
    }

    /// Normalized forms of `known_lenders`, index-aligned.
    pub fn normalized_known(&self) -> &[String] {
        &self.normalized_known
    }

    /// Alias entries in priority order.
    pub fn aliases(&self) -> &[(String, String)] {
        &self.aliases
    }

    /// Key phrases for snippet selection, in scan order.
    pub fn key_phrases(&self) -> &[String] {
        &self.key_phrases
    }

    /// Whether a lowercased entity surface is blacklisted.
    pub fn is_blacklisted(&self, lowercased: &str) -> bool {
        self.blacklist.contains(lowercased)
    }

    /// Whether a lowercased entity surface matches any lender keyword.
    pub fn matches_keyword(&self, lowercased: &str) -> bool {
        self.keywords.is_match(lowercased)
    }
}

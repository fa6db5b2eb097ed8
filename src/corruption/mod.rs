//! Single-fault code corruption.
//!
//! [`FaultInjector`] takes a valid Python program and returns a variant with
//! exactly one defect from a fixed catalog of fault classes. Classes are tried
//! in a seed-determined order; for each class one applicable site is chosen
//! at random and the mutation is validated before it is accepted.

pub mod sites;
pub mod syntax;

pub use sites::{Edit, SiteLocator};
pub use syntax::SyntaxIssue;

use crate::generator::rng::SeededRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Catalog of single-site defects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultClass {
    /// Closing quote of one string literal removed.
    MissingQuote,
    /// One built-in function name upper-cased.
    WrongCapitalization,
    /// Colon removed from one block header.
    MissingColon,
    /// Leading whitespace removed from one indented line.
    WrongIndentation,
    /// Closing parenthesis removed from one call.
    MismatchedBrackets,
}

impl FaultClass {
    pub const ALL: [FaultClass; 5] = [
        FaultClass::MissingQuote,
        FaultClass::WrongCapitalization,
        FaultClass::MissingColon,
        FaultClass::WrongIndentation,
        FaultClass::MismatchedBrackets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FaultClass::MissingQuote => "missing_quote",
            FaultClass::WrongCapitalization => "wrong_capitalization",
            FaultClass::MissingColon => "missing_colon",
            FaultClass::WrongIndentation => "wrong_indentation",
            FaultClass::MismatchedBrackets => "mismatched_brackets",
        }
    }

    /// Whether a mutation of this class only counts when the program no
    /// longer parses. Capitalization faults parse fine and fail at run time.
    pub fn requires_parse_failure(&self) -> bool {
        !matches!(self, FaultClass::WrongCapitalization)
    }
}

/// Result of one injection call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultOutcome {
    pub content: String,
    /// `None` when no class could be applied and `content` is the input.
    pub applied: Option<FaultClass>,
}

impl FaultOutcome {
    pub fn is_corrupted(&self) -> bool {
        self.applied.is_some()
    }
}

/// One attempt, alive only inside the injection loop.
struct FaultRecord<'a> {
    class: FaultClass,
    original: &'a str,
    mutated: String,
}

impl FaultRecord<'_> {
    fn changed(&self) -> bool {
        self.mutated != self.original
    }
}

/// Introduces exactly one validated defect into a program.
#[derive(Debug, Clone)]
pub struct FaultInjector {
    sites: SiteLocator,
}

impl FaultInjector {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            sites: SiteLocator::new()?,
        })
    }

    /// Corrupts `source` at a single site.
    ///
    /// Falls back to the unmodified source with `applied: None` when no class
    /// yields a validated mutation; callers decide whether that is acceptable.
    pub fn inject(&self, rng: &mut SeededRng, source: &str) -> FaultOutcome {
        let mut classes = FaultClass::ALL;
        rng.shuffle(&mut classes);

        for class in classes {
            let sites = self.sites.locate(class, source);
            let Some(edit) = rng.choose(&sites) else {
                debug!(class = class.as_str(), "No applicable site");
                continue;
            };

            let record = FaultRecord {
                class,
                original: source,
                mutated: edit.apply(source),
            };
            if !record.changed() {
                continue;
            }
            if record.class.requires_parse_failure() {
                if let Err(issue) = syntax::check(&record.mutated) {
                    debug!(class = class.as_str(), %issue, "Fault validated");
                } else {
                    debug!(
                        class = class.as_str(),
                        offset = edit.start,
                        "Mutation still parses, trying next class"
                    );
                    continue;
                }
            }

            return FaultOutcome {
                content: record.mutated,
                applied: Some(record.class),
            };
        }

        FaultOutcome {
            content: source.to_string(),
            applied: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "records_count = 42\nif records_count > 0:\n    print(f\"Processing files...\")\n    print(f\"Complete: {records_count} files processed\")";

    /// Length of the differing middle once the common prefix and suffix are
    /// removed, as (original span, mutated span).
    fn diff_spans(a: &str, b: &str) -> (String, String) {
        let prefix = a
            .bytes()
            .zip(b.bytes())
            .take_while(|(x, y)| x == y)
            .count();
        let suffix = a[prefix..]
            .bytes()
            .rev()
            .zip(b[prefix..].bytes().rev())
            .take_while(|(x, y)| x == y)
            .count();
        (
            a[prefix..a.len() - suffix].to_string(),
            b[prefix..b.len() - suffix].to_string(),
        )
    }

    #[test]
    fn test_every_seed_yields_one_validated_fault() {
        let injector = FaultInjector::new().expect("injector");
        for seed in 0..200 {
            let mut rng = SeededRng::new(seed);
            let outcome = injector.inject(&mut rng, SCRIPT);
            let class = outcome.applied.expect("a class applies to this script");
            assert_ne!(outcome.content, SCRIPT);

            let (removed, inserted) = diff_spans(SCRIPT, &outcome.content);
            if class == FaultClass::WrongCapitalization {
                assert_eq!(inserted, removed.to_uppercase());
                assert!(syntax::parses(&outcome.content));
            } else {
                assert!(inserted.is_empty(), "{:?} inserted {:?}", class, inserted);
                assert!(!syntax::parses(&outcome.content), "{:?} still parses", class);
            }
        }
    }

    #[test]
    fn test_same_seed_same_fault() {
        let injector = FaultInjector::new().expect("injector");
        let a = injector.inject(&mut SeededRng::new(9), SCRIPT);
        let b = injector.inject(&mut SeededRng::new(9), SCRIPT);
        assert_eq!(a, b);
    }

    #[test]
    fn test_all_classes_occur() {
        let injector = FaultInjector::new().expect("injector");
        let mut seen = std::collections::HashSet::new();
        for seed in 0..300 {
            if let Some(class) = injector.inject(&mut SeededRng::new(seed), SCRIPT).applied {
                seen.insert(class);
            }
        }
        assert_eq!(seen.len(), FaultClass::ALL.len());
    }

    #[test]
    fn test_falls_back_when_nothing_applies() {
        let injector = FaultInjector::new().expect("injector");
        let outcome = injector.inject(&mut SeededRng::new(1), "x = 1");
        assert_eq!(outcome.content, "x = 1");
        assert!(!outcome.is_corrupted());
    }

    #[test]
    fn test_only_capitalization_survives_parse_check() {
        assert!(FaultClass::MissingQuote.requires_parse_failure());
        assert!(!FaultClass::WrongCapitalization.requires_parse_failure());
    }
}

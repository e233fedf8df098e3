//! Keyword heuristics that turn a lowercased command into an intent and its
//! parameters.
//!
//! Matching is plain substring membership, so overlapping customer names or
//! commands mixing several intents resolve by the fixed priority below rather
//! than by any grammar.

use crate::billing::Quantities;
use crate::services::CustomerView;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const NEW_CUSTOMER_PHRASE: &str = "add new customer";
pub const LOG_KEYWORDS: [&str; 4] = ["add", "log", "put", "set"];
pub const BILL_KEYWORDS: [&str; 4] = ["bill", "total", "summary", "due"];
pub const ANALYSIS_KEYWORDS: [&str; 6] = ["extra", "more", "less", "skip", "didn't take", "not take"];

static NEW_CUSTOMER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"add new customer\s+([a-zA-Z0-9_]+)").expect("new customer regex"));

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+\.?\d*)").expect("number regex"));

/// What a command targeting an existing customer asks for, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    LogVariation,
    Bill,
    Analysis,
    Unknown,
}

impl Intent {
    pub fn detect(command: &str) -> Self {
        if contains_any(command, &LOG_KEYWORDS) {
            Intent::LogVariation
        } else if contains_any(command, &BILL_KEYWORDS) {
            Intent::Bill
        } else if contains_any(command, &ANALYSIS_KEYWORDS) {
            Intent::Analysis
        } else {
            Intent::Unknown
        }
    }
}

/// A parsed `add new customer <name> ...` command.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    pub morning: f64,
    pub evening: f64,
}

impl NewCustomer {
    pub fn is_requested(command: &str) -> bool {
        command.contains(NEW_CUSTOMER_PHRASE)
    }

    /// Extracts the name token and the optional standing order.
    ///
    /// The command is split on `" and "`; in each part the first number goes
    /// to the morning slot if the part mentions "morning", else to the evening
    /// slot if it mentions "even" (which also catches typos like "evenign").
    pub fn parse(command: &str) -> Option<Self> {
        let name = NEW_CUSTOMER_RE
            .captures(command)
            .and_then(|caps| caps.get(1))
            .map(|m| title_case(m.as_str().trim()))?;

        let mut morning = 0.0;
        let mut evening = 0.0;
        for part in command.split(" and ") {
            let Some(quantity) = first_number(part) else {
                continue;
            };
            if part.contains("morning") {
                morning = quantity;
            } else if part.contains("even") {
                evening = quantity;
            }
        }

        Some(Self {
            name,
            morning,
            evening,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LogParseError {
    #[error("Couldn't figure out the quantity.")]
    MissingQuantity,
    #[error("Please specify morning or evening.")]
    MissingSlot,
}

/// Quantities for a log-variation command.
///
/// The first number in the command is the quantity. It fills the morning slot
/// if "morning" appears, else the evening slot for "evening", else both slots
/// for "both". The other slot is zero.
pub fn parse_log_quantities(command: &str) -> Result<Quantities, LogParseError> {
    let quantity = first_number(command).ok_or(LogParseError::MissingQuantity)?;

    if command.contains("morning") {
        Ok(Quantities::new(quantity, 0.0))
    } else if command.contains("evening") {
        Ok(Quantities::new(0.0, quantity))
    } else if command.contains("both") {
        Ok(Quantities::new(quantity, quantity))
    } else {
        Err(LogParseError::MissingSlot)
    }
}

/// Which sections a consumption-analysis reply should contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnalysisFocus {
    pub more: bool,
    pub less: bool,
    pub skipped: bool,
}

impl AnalysisFocus {
    pub fn from_command(command: &str) -> Self {
        Self {
            more: contains_any(command, &["extra", "more"]),
            less: contains_any(command, &["less", "not take"]),
            skipped: contains_any(command, &["skip", "didn't take"]),
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.more || self.less || self.skipped)
    }
}

/// First customer whose lowercased name occurs in `command`.
pub fn find_customer<'a>(command: &str, customers: &'a [CustomerView]) -> Option<&'a CustomerView> {
    customers
        .iter()
        .find(|c| !c.name.is_empty() && command.contains(&c.name.to_lowercase()))
}

fn first_number(text: &str) -> Option<f64> {
    NUMBER_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn contains_any(command: &str, words: &[&str]) -> bool {
    words.iter().any(|w| command.contains(w))
}

/// Uppercases the first letter of every run of letters, lowercasing the rest.
fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev_is_letter = false;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CustomerId;
    use rstest::rstest;

    fn customer(name: &str) -> CustomerView {
        CustomerView {
            id: CustomerId::new(),
            name: name.into(),
            address: String::new(),
            phone_number: String::new(),
            default_milk_morning: 1.0,
            default_milk_evening: 1.0,
            price_per_liter: 60.0,
        }
    }

    #[test]
    fn new_customer_with_both_slots() {
        let parsed = NewCustomer::parse("add new customer raj with 1 morning and 2 evening").unwrap();
        assert_eq!(
            parsed,
            NewCustomer {
                name: "Raj".into(),
                morning: 1.0,
                evening: 2.0
            }
        );
    }

    #[test]
    fn new_customer_tolerates_evening_typo_and_decimals() {
        let parsed = NewCustomer::parse("add new customer priya 1.5 evenign").unwrap();
        assert_eq!(parsed.morning, 0.0);
        assert_eq!(parsed.evening, 1.5);
    }

    #[test]
    fn new_customer_without_name() {
        assert!(NewCustomer::is_requested("add new customer"));
        assert!(NewCustomer::parse("add new customer").is_none());
        assert!(NewCustomer::parse("add new customer !!").is_none());
    }

    #[rstest]
    #[case("raj", "Raj")]
    #[case("raj_kumar", "Raj_Kumar")]
    #[case("r2d2x", "R2D2X")]
    fn names_are_title_cased(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(title_case(raw), expected);
    }

    #[rstest]
    #[case("log 2 liters morning for raj today", Intent::LogVariation)]
    #[case("set raj to 1 both", Intent::LogVariation)]
    #[case("what is the bill for raj", Intent::Bill)]
    #[case("how much is due from raj", Intent::Bill)]
    #[case("did raj skip any day", Intent::Analysis)]
    #[case("when did raj not take milk", Intent::Analysis)]
    #[case("hello raj", Intent::Unknown)]
    fn detects_intent(#[case] command: &str, #[case] expected: Intent) {
        assert_eq!(Intent::detect(command), expected);
    }

    #[test]
    fn log_keywords_win_over_bill_keywords() {
        assert_eq!(Intent::detect("add to the total for raj"), Intent::LogVariation);
    }

    #[rstest]
    #[case("log 2 liters morning", Ok(Quantities::new(2.0, 0.0)))]
    #[case("log 1.5 evening", Ok(Quantities::new(0.0, 1.5)))]
    #[case("put 3 both", Ok(Quantities::new(3.0, 3.0)))]
    #[case("log 3 for raj", Err(LogParseError::MissingSlot))]
    #[case("log morning for raj", Err(LogParseError::MissingQuantity))]
    fn log_quantities(#[case] command: &str, #[case] expected: Result<Quantities, LogParseError>) {
        assert_eq!(parse_log_quantities(command), expected);
    }

    #[test]
    fn finds_first_matching_customer() {
        let customers = vec![customer("Raj"), customer("Rajesh")];
        let found = find_customer("log 2 morning for rajesh", &customers).unwrap();
        // Substring matching: "raj" is found first.
        assert_eq!(found.name, "Raj");
        assert!(find_customer("log 2 morning for asha", &customers).is_none());
    }

    #[test]
    fn analysis_focus_flags() {
        let focus = AnalysisFocus::from_command("did raj take more or skip");
        assert!(focus.more && focus.skipped && !focus.less);
        assert!(AnalysisFocus::from_command("raj").is_empty());
    }
}

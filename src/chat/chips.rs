//! Multiple-choice chip picker over the intent vocabulary.

use serde::Serialize;

use super::intent::{OCCASION_VOCABULARY, ParsedIntent, STYLE_VOCABULARY};
use crate::api_types::SurveyRequest;
use crate::errors::Error;
use crate::survey::{Budget, Choice};

/// Which row of chips a pick applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipRow {
    Occasion,
    Style,
    Budget,
}

impl ChipRow {
    pub fn name(self) -> &'static str {
        match self {
            ChipRow::Occasion => "occasion",
            ChipRow::Style => "style",
            ChipRow::Budget => "budget",
        }
    }

    /// Chip labels in display order.
    pub fn labels(self) -> Vec<String> {
        match self {
            ChipRow::Occasion => OCCASION_VOCABULARY.iter().map(|(_, l)| l.to_string()).collect(),
            ChipRow::Style => STYLE_VOCABULARY.iter().map(|(_, l)| l.to_string()).collect(),
            ChipRow::Budget => Budget::options().iter().map(ToString::to_string).collect(),
        }
    }
}

/// Occasion, style and budget picked one chip at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChipPicker {
    occasion: Option<&'static str>,
    style: Option<&'static str>,
    budget: Option<Budget>,
}

impl ChipPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the chip at a 1-based `position` in `row`, replacing any earlier pick.
    pub fn pick(&mut self, row: ChipRow, position: usize) -> Result<(), Error> {
        let index = position.checked_sub(1);
        let missing = || {
            Error::InvalidInput(format!(
                "chip {position} is not available for {}",
                row.name()
            ))
        };
        match row {
            ChipRow::Occasion => {
                let (_, label) = index
                    .and_then(|i| OCCASION_VOCABULARY.get(i))
                    .ok_or_else(missing)?;
                self.occasion = Some(*label);
            }
            ChipRow::Style => {
                let (_, label) = index
                    .and_then(|i| STYLE_VOCABULARY.get(i))
                    .ok_or_else(missing)?;
                self.style = Some(*label);
            }
            ChipRow::Budget => {
                self.budget = Some(Budget::from_position(position).ok_or_else(missing)?);
            }
        }
        Ok(())
    }

    pub fn selected(&self, row: ChipRow) -> Option<String> {
        match row {
            ChipRow::Occasion => self.occasion.map(str::to_string),
            ChipRow::Style => self.style.map(str::to_string),
            ChipRow::Budget => self.budget.map(|b| b.to_string()),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.to_intent().is_some()
    }

    pub fn to_intent(&self) -> Option<ParsedIntent> {
        Some(ParsedIntent {
            occasion: self.occasion?,
            style: self.style?,
            budget: self.budget?,
        })
    }

    /// Survey body once all three rows are picked.
    pub fn to_request(&self) -> Option<SurveyRequest> {
        self.to_intent().map(|intent| intent.to_survey_request())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::intent::parse_intent;

    #[test]
    fn test_incomplete_pick_has_no_request() {
        let mut picker = ChipPicker::new();
        picker.pick(ChipRow::Occasion, 1).unwrap();
        picker.pick(ChipRow::Style, 1).unwrap();
        assert!(!picker.is_complete());
        assert!(picker.to_request().is_none());
    }

    #[test]
    fn test_complete_pick_matches_parser_output() {
        let mut picker = ChipPicker::new();
        picker.pick(ChipRow::Occasion, 1).unwrap();
        picker.pick(ChipRow::Style, 1).unwrap();
        picker.pick(ChipRow::Budget, 2).unwrap();

        let parsed = parse_intent("wedding, minimal style, budget $100–$300");
        assert_eq!(picker.to_request(), Some(parsed.to_survey_request()));
    }

    #[test]
    fn test_repick_overwrites() {
        let mut picker = ChipPicker::new();
        picker.pick(ChipRow::Style, 2).unwrap();
        picker.pick(ChipRow::Style, 5).unwrap();
        assert_eq!(picker.selected(ChipRow::Style).as_deref(), Some("Vintage"));
    }

    #[test]
    fn test_out_of_range_chip_rejected() {
        let mut picker = ChipPicker::new();
        assert!(matches!(
            picker.pick(ChipRow::Budget, 5),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            picker.pick(ChipRow::Occasion, 0),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_labels_follow_vocabulary_order() {
        let occasions = ChipRow::Occasion.labels();
        assert_eq!(occasions.first().map(String::as_str), Some("Wedding"));
        assert_eq!(ChipRow::Budget.labels().len(), 4);
    }
}

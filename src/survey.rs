//! Survey vocabulary and the answer record collected across the four picker steps.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::api_types::SurveyRequest;
use crate::errors::Error;

/// A single-choice survey option with a short description for its card.
pub trait Choice: Copy + PartialEq + std::fmt::Display + IntoEnumIterator + 'static {
    /// Card copy shown under the option label.
    fn description(self) -> &'static str;

    /// All options in display order.
    fn options() -> Vec<Self> {
        Self::iter().collect()
    }

    /// Option at a 1-based position, as typed by the kiosk user.
    fn from_position(position: usize) -> Option<Self> {
        position.checked_sub(1).and_then(|i| Self::iter().nth(i))
    }

    /// 1-based position of this option.
    fn position(self) -> usize {
        Self::iter().position(|c| c == self).map_or(0, |i| i + 1)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Style {
    Classic,
    Modern,
    Vintage,
    Bohemian,
}

impl Choice for Style {
    fn description(self) -> &'static str {
        match self {
            Style::Classic => "Timeless elegance with traditional designs",
            Style::Modern => "Contemporary and sleek minimalist pieces",
            Style::Vintage => "Romantic heritage with nostalgic charm",
            Style::Bohemian => "Free-spirited with artistic flair",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Occasion {
    Everyday,
    #[serde(rename = "Special Events")]
    #[strum(to_string = "Special Events")]
    SpecialEvents,
    Work,
    Romantic,
}

impl Choice for Occasion {
    fn description(self) -> &'static str {
        match self {
            Occasion::Everyday => "Daily wear pieces for your regular activities",
            Occasion::SpecialEvents => "Celebrations, parties, and memorable moments",
            Occasion::Work => "Professional settings and business meetings",
            Occasion::Romantic => "Date nights, anniversaries, and intimate occasions",
        }
    }
}

/// INR budget bands, lowest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Budget {
    #[serde(rename = "Under ₹8,000")]
    #[strum(to_string = "Under ₹8,000")]
    Entry,
    #[serde(rename = "₹8,000–₹25,000")]
    #[strum(to_string = "₹8,000–₹25,000")]
    Popular,
    #[serde(rename = "₹25,000–₹65,000")]
    #[strum(to_string = "₹25,000–₹65,000")]
    Premium,
    #[serde(rename = "₹65,000+")]
    #[strum(to_string = "₹65,000+")]
    Luxury,
}

impl Budget {
    /// Tier label shown beside the band.
    pub fn range_label(self) -> &'static str {
        match self {
            Budget::Entry => "Entry Level",
            Budget::Popular => "Popular Choice",
            Budget::Premium => "Premium",
            Budget::Luxury => "Luxury",
        }
    }

    pub fn is_most_popular(self) -> bool {
        self == Budget::Popular
    }
}

impl Choice for Budget {
    fn description(self) -> &'static str {
        match self {
            Budget::Entry => "Perfect starter pieces and everyday essentials",
            Budget::Popular => "Quality pieces for regular wear and gifting",
            Budget::Premium => "Premium jewelry for special occasions",
            Budget::Luxury => "Luxury pieces and investment jewelry",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Metal {
    Gold,
    Silver,
    Platinum,
    #[serde(rename = "Rose Gold")]
    #[strum(to_string = "Rose Gold")]
    RoseGold,
}

impl Choice for Metal {
    fn description(self) -> &'static str {
        match self {
            Metal::Gold => "Classic warmth with timeless appeal",
            Metal::Silver => "Cool elegance with versatile styling",
            Metal::Platinum => "Premium metal with sophisticated finish",
            Metal::RoseGold => "Romantic blush with contemporary charm",
        }
    }
}

/// One of the four picker screens, in flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum SurveyStep {
    Style,
    Occasion,
    Budget,
    Metal,
}

impl SurveyStep {
    /// Answer field written by this step.
    pub fn field_name(self) -> &'static str {
        match self {
            SurveyStep::Style => "style",
            SurveyStep::Occasion => "occasion",
            SurveyStep::Budget => "budget",
            SurveyStep::Metal => "metal",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SurveyStep::Style => "Your Style Preference",
            SurveyStep::Occasion => "The Occasion",
            SurveyStep::Budget => "Your Budget Range",
            SurveyStep::Metal => "Choose Your Metal",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            SurveyStep::Style => "Which look speaks to you?",
            SurveyStep::Occasion => "Where will you be wearing it?",
            SurveyStep::Budget => "What investment level are you comfortable with?",
            SurveyStep::Metal => "Which metal do you love?",
        }
    }

    /// 1-based position shown as "Step N of 4".
    pub fn position(self) -> usize {
        match self {
            SurveyStep::Style => 1,
            SurveyStep::Occasion => 2,
            SurveyStep::Budget => 3,
            SurveyStep::Metal => 4,
        }
    }

    pub fn next(self) -> Option<SurveyStep> {
        match self {
            SurveyStep::Style => Some(SurveyStep::Occasion),
            SurveyStep::Occasion => Some(SurveyStep::Budget),
            SurveyStep::Budget => Some(SurveyStep::Metal),
            SurveyStep::Metal => None,
        }
    }

    pub fn prev(self) -> Option<SurveyStep> {
        match self {
            SurveyStep::Style => None,
            SurveyStep::Occasion => Some(SurveyStep::Style),
            SurveyStep::Budget => Some(SurveyStep::Occasion),
            SurveyStep::Metal => Some(SurveyStep::Budget),
        }
    }

    /// Label, description and popularity flag for each option of this step.
    pub fn options(self) -> Vec<OptionCard> {
        fn cards<C: Choice>() -> Vec<OptionCard> {
            C::options()
                .into_iter()
                .map(|c| OptionCard {
                    label: c.to_string(),
                    description: c.description(),
                    popular: false,
                })
                .collect()
        }
        match self {
            SurveyStep::Style => cards::<Style>(),
            SurveyStep::Occasion => cards::<Occasion>(),
            SurveyStep::Budget => Budget::options()
                .into_iter()
                .map(|b| OptionCard {
                    label: b.to_string(),
                    description: b.description(),
                    popular: b.is_most_popular(),
                })
                .collect(),
            SurveyStep::Metal => cards::<Metal>(),
        }
    }
}

/// A rendered picker option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionCard {
    pub label: String,
    pub description: &'static str,
    pub popular: bool,
}

/// Answers accumulated one field per screen; empty until chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAnswers {
    pub style: Option<Style>,
    pub occasion: Option<Occasion>,
    pub budget: Option<Budget>,
    pub metal: Option<Metal>,
}

impl SurveyAnswers {
    /// Choose the option at a 1-based `position` for `step`, replacing any earlier pick.
    pub fn choose(&mut self, step: SurveyStep, position: usize) -> Result<(), Error> {
        let out_of_range = || {
            Error::InvalidInput(format!(
                "option {position} is not available for {}",
                step.field_name()
            ))
        };
        match step {
            SurveyStep::Style => self.style = Some(Style::from_position(position).ok_or_else(out_of_range)?),
            SurveyStep::Occasion => {
                self.occasion = Some(Occasion::from_position(position).ok_or_else(out_of_range)?)
            }
            SurveyStep::Budget => self.budget = Some(Budget::from_position(position).ok_or_else(out_of_range)?),
            SurveyStep::Metal => self.metal = Some(Metal::from_position(position).ok_or_else(out_of_range)?),
        }
        Ok(())
    }

    /// 1-based position of the current pick for `step`.
    pub fn selected_position(&self, step: SurveyStep) -> Option<usize> {
        match step {
            SurveyStep::Style => self.style.map(Choice::position),
            SurveyStep::Occasion => self.occasion.map(Choice::position),
            SurveyStep::Budget => self.budget.map(Choice::position),
            SurveyStep::Metal => self.metal.map(Choice::position),
        }
    }

    pub fn is_answered(&self, step: SurveyStep) -> bool {
        self.selected_position(step).is_some()
    }

    pub fn is_complete(&self) -> bool {
        SurveyStep::iter().all(|step| self.is_answered(step))
    }

    /// Request body for the survey endpoint, once every field is set.
    pub fn to_request(&self) -> Option<SurveyRequest> {
        Some(SurveyRequest {
            occasion: self.occasion?.to_string(),
            style: self.style?.to_string(),
            budget: self.budget?.to_string(),
            vibe_preference: None,
            metal: Some(self.metal?.to_string()),
        })
    }
}

//! Evaluation result types

use serde::{Deserialize, Serialize};

/// Overall verdict for a UX score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UxLabel {
    Excellent,
    Good,
    Average,
    Dense,
    Fatiguing,
}

impl UxLabel {
    pub fn from_score(score: u32) -> Self {
        match score {
            85.. => UxLabel::Excellent,
            70..=84 => UxLabel::Good,
            55..=69 => UxLabel::Average,
            40..=54 => UxLabel::Dense,
            _ => UxLabel::Fatiguing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UxLabel::Excellent => "Excellent",
            UxLabel::Good => "Good",
            UxLabel::Average => "Average",
            UxLabel::Dense => "Dense",
            UxLabel::Fatiguing => "Fatiguing",
        }
    }
}

/// Area a feedback message is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackCategory {
    Density,
    Spacing,
    Complexity,
    Readability,
    Structure,
}

/// One feedback message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub category: FeedbackCategory,
    pub message: String,
}

impl Feedback {
    pub fn new(category: FeedbackCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

/// Composite UX evaluation of a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UxEvaluation {
    /// 0-100
    pub score: u32,
    pub label: UxLabel,
    /// Text coverage of the page, percent
    pub text_density: u32,
    /// Average block gap against a 48px reference, percent
    pub white_space_ratio: u32,
    /// One decimal place
    pub elements_per_screen: f64,
    /// Readability composite, percent
    pub readability: u32,
    pub issues: Vec<Feedback>,
    pub suggestions: Vec<Feedback>,
    pub positives: Vec<Feedback>,
}

/// Points contributed by each scored category (each out of 25)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPoints {
    pub density: f64,
    pub white_space: f64,
    pub complexity: f64,
    pub readability: f64,
}

impl CategoryPoints {
    pub fn total(&self) -> f64 {
        self.density + self.white_space + self.complexity + self.readability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_bands() {
        assert_eq!(UxLabel::from_score(100), UxLabel::Excellent);
        assert_eq!(UxLabel::from_score(85), UxLabel::Excellent);
        assert_eq!(UxLabel::from_score(84), UxLabel::Good);
        assert_eq!(UxLabel::from_score(55), UxLabel::Average);
        assert_eq!(UxLabel::from_score(40), UxLabel::Dense);
        assert_eq!(UxLabel::from_score(39), UxLabel::Fatiguing);
    }

    #[test]
    fn test_evaluation_wire_names() {
        let eval = UxEvaluation {
            score: 72,
            label: UxLabel::Good,
            text_density: 30,
            white_space_ratio: 50,
            elements_per_screen: 12.5,
            readability: 90,
            issues: vec![],
            suggestions: vec![Feedback::new(FeedbackCategory::Spacing, "More room")],
            positives: vec![],
        };
        let json = serde_json::to_value(&eval).unwrap();
        assert_eq!(json["label"], "Good");
        assert_eq!(json["textDensity"], 30);
        assert_eq!(json["whiteSpaceRatio"], 50);
        assert_eq!(json["elementsPerScreen"], 12.5);
        assert_eq!(json["suggestions"][0]["category"], "Spacing");
    }
}

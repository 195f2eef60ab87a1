//! Tiered feedback
//!
//! Each scored category lands in one tier by its points out of 25: positive at
//! 20 or more, suggestions from 12, issues below that. Structure only produces
//! feedback.

use super::scoring::{COMPLEXITY, FOLD_DENSITY, OVERALL_DENSITY, WHITE_SPACE};
use super::types::{Feedback, FeedbackCategory};
use super::UxMetrics;

const POSITIVE_TIER: f64 = 20.0;
const SUGGESTION_TIER: f64 = 12.0;

/// Sub-metric score below which a suggestion is raised
const WEAK_SUB_SCORE: f64 = 70.0;
/// Density sub-metric score below which an issue is raised
const POOR_DENSITY_SCORE: f64 = 40.0;
/// Readability sub-metric score below which an issue is raised
const POOR_READABILITY_SCORE: f64 = 50.0;

/// Feedback lists by tier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackSet {
    pub issues: Vec<Feedback>,
    pub suggestions: Vec<Feedback>,
    pub positives: Vec<Feedback>,
}

enum Tier {
    Positive,
    Suggestion,
    Issue,
}

fn tier(points: f64) -> Tier {
    if points >= POSITIVE_TIER {
        Tier::Positive
    } else if points >= SUGGESTION_TIER {
        Tier::Suggestion
    } else {
        Tier::Issue
    }
}

fn pct(value: f64) -> i64 {
    value.round() as i64
}

/// Messages for one category, with a fallback when no sub-metric stood out
struct Collector<'a> {
    out: &'a mut Vec<Feedback>,
    category: FeedbackCategory,
    pushed: bool,
}

impl<'a> Collector<'a> {
    fn new(out: &'a mut Vec<Feedback>, category: FeedbackCategory) -> Self {
        Self {
            out,
            category,
            pushed: false,
        }
    }

    fn push_if(&mut self, condition: bool, message: impl FnOnce() -> String) {
        if condition {
            self.out.push(Feedback::new(self.category, message()));
            self.pushed = true;
        }
    }

    fn or_else(self, message: impl FnOnce() -> String) {
        if !self.pushed {
            self.out.push(Feedback::new(self.category, message()));
        }
    }
}

pub fn build_feedback(m: &UxMetrics) -> FeedbackSet {
    let mut set = FeedbackSet::default();
    density(m, &mut set);
    spacing(m, &mut set);
    complexity(m, &mut set);
    readability(m, &mut set);
    structure(m, &mut set);
    set
}

fn density(m: &UxMetrics, set: &mut FeedbackSet) {
    let d = &m.density;
    let overall = pct(d.overall);
    let fold = pct(d.above_fold);

    match tier(m.points.density) {
        Tier::Positive => set.positives.push(Feedback::new(
            FeedbackCategory::Density,
            format!("Content density is in the ideal range ({}%)", overall),
        )),
        Tier::Suggestion => {
            let mut c = Collector::new(&mut set.suggestions, FeedbackCategory::Density);
            c.push_if(d.overall_score < WEAK_SUB_SCORE, || {
                format!("Content density is {}% (ideal 10–55%)", overall)
            });
            c.push_if(d.fold_score < WEAK_SUB_SCORE, || {
                format!("First screen density is {}% (ideal 10–60%)", fold)
            });
            c.push_if(d.consistency < WEAK_SUB_SCORE, || {
                "Content distribution could be more even".to_string()
            });
            c.or_else(|| format!("Density is acceptable at {}% but could improve", overall));
        }
        Tier::Issue => {
            let mut c = Collector::new(&mut set.issues, FeedbackCategory::Density);
            c.push_if(d.overall_score < POOR_DENSITY_SCORE, || {
                if OVERALL_DENSITY.is_above(d.overall) {
                    format!("Too dense at {}% (recommend under 55%)", overall)
                } else {
                    format!("Very sparse at {}% (recommend 10% or more)", overall)
                }
            });
            c.push_if(d.fold_score < POOR_DENSITY_SCORE, || {
                if FOLD_DENSITY.is_above(d.above_fold) {
                    format!("First screen is crowded ({}%)", fold)
                } else {
                    format!("First screen lacks content ({}%)", fold)
                }
            });
            c.push_if(d.consistency < POOR_DENSITY_SCORE, || {
                "Uneven content distribution across the page".to_string()
            });
            c.or_else(|| format!("Content density needs work ({}%)", overall));
        }
    }
}

fn spacing(m: &UxMetrics, set: &mut FeedbackSet) {
    let gap = pct(m.average_gap);
    let too_loose = WHITE_SPACE.is_above(m.white_space_ratio);

    match tier(m.points.white_space) {
        Tier::Positive => set.positives.push(Feedback::new(
            FeedbackCategory::Spacing,
            format!("Good spacing (average {}px gap)", gap),
        )),
        Tier::Suggestion => set.suggestions.push(Feedback::new(
            FeedbackCategory::Spacing,
            format!("Average gap is {}px (recommend 12–40px)", gap),
        )),
        Tier::Issue => set.issues.push(Feedback::new(
            FeedbackCategory::Spacing,
            if too_loose {
                format!("Blocks are spread far apart (average {}px gap, recommend under 40px)", gap)
            } else {
                format!("Elements too cramped (average {}px gap, recommend 12px or more)", gap)
            },
        )),
    }
}

fn complexity(m: &UxMetrics, set: &mut FeedbackSet) {
    let eps = pct(m.elements_per_screen);

    match tier(m.points.complexity) {
        Tier::Positive => set.positives.push(Feedback::new(
            FeedbackCategory::Complexity,
            format!("Balanced complexity ({} items per screen)", eps),
        )),
        Tier::Suggestion => set.suggestions.push(Feedback::new(
            FeedbackCategory::Complexity,
            format!("{} items per screen (ideal 5–25)", eps),
        )),
        Tier::Issue => set.issues.push(Feedback::new(
            FeedbackCategory::Complexity,
            if COMPLEXITY.is_above(m.elements_per_screen) {
                format!("Too complex ({} items per screen, recommend under 25)", eps)
            } else {
                format!("Very few elements ({} items per screen)", eps)
            },
        )),
    }
}

fn readability(m: &UxMetrics, set: &mut FeedbackSet) {
    let r = &m.readability;
    let font = pct(r.font_size);
    let chars = pct(r.line_length);

    match tier(m.points.readability) {
        Tier::Positive => set.positives.push(Feedback::new(
            FeedbackCategory::Readability,
            format!("Good readability ({}% score)", pct(r.score)),
        )),
        Tier::Suggestion => {
            let mut c = Collector::new(&mut set.suggestions, FeedbackCategory::Readability);
            c.push_if(r.font_size_score < WEAK_SUB_SCORE, || {
                format!("Average font size is {}px (recommend 16px)", font)
            });
            c.push_if(r.line_height_score < WEAK_SUB_SCORE, || {
                format!("Line height ratio is {:.1}× (ideal 1.2–2.0×)", r.line_height)
            });
            c.push_if(r.line_length_score < WEAK_SUB_SCORE, || {
                format!("Average {} characters per line (ideal 35–90)", chars)
            });
            if let Some(ratio) = r.contrast {
                c.push_if(r.contrast_score < WEAK_SUB_SCORE, || {
                    format!("Contrast ratio is {:.1}:1 (recommend 4.5:1 or higher)", ratio)
                });
            }
            c.or_else(|| format!("Readability is decent ({}%) but has room to improve", pct(r.score)));
        }
        Tier::Issue => {
            let mut c = Collector::new(&mut set.issues, FeedbackCategory::Readability);
            c.push_if(r.font_size_score < POOR_READABILITY_SCORE, || {
                format!("Font too small (average {}px, recommend 16px)", font)
            });
            c.push_if(r.line_height_score < POOR_READABILITY_SCORE, || {
                if r.line_height > 2.0 {
                    format!("Line spacing too loose ({:.1}×, recommend 2.0× or less)", r.line_height)
                } else {
                    format!("Line spacing too tight ({:.1}×, recommend 1.2× or more)", r.line_height)
                }
            });
            c.push_if(r.line_length_score < POOR_READABILITY_SCORE, || {
                if r.line_length > 90.0 {
                    format!("Lines too wide ({} characters, recommend at most 90)", chars)
                } else {
                    format!("Lines too narrow ({} characters, recommend at least 35)", chars)
                }
            });
            if let Some(ratio) = r.contrast {
                c.push_if(r.contrast_score < POOR_READABILITY_SCORE, || {
                    format!("Low contrast ({:.1}:1, need 4.5:1)", ratio)
                });
            }
            c.or_else(|| format!("Text is hard to read ({}% score)", pct(r.score)));
        }
    }
}

fn structure(m: &UxMetrics, set: &mut FeedbackSet) {
    if m.heading_count >= 1 && m.paragraph_count >= 3 {
        set.positives.push(Feedback::new(
            FeedbackCategory::Structure,
            format!(
                "Well structured ({} headings, {} paragraphs)",
                m.heading_count, m.paragraph_count
            ),
        ));
    } else if m.heading_count >= 1 {
        set.suggestions.push(Feedback::new(
            FeedbackCategory::Structure,
            format!(
                "Only {} paragraphs found, consider adding more body content",
                m.paragraph_count
            ),
        ));
    } else {
        set.issues.push(Feedback::new(
            FeedbackCategory::Structure,
            "Missing heading hierarchy",
        ));
    }
}

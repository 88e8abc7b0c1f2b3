//! Skill-score math: public display ratings, win expectancy, Elo deltas.
//!
//! Internally players carry an Elo-like skill score (1000-2000 by default);
//! screens show a small friendly number (2.0-6.0). Everything here is a
//! pure function of its inputs.

use serde::{Deserialize, Serialize};

/// Linear skill<->display mapping plus the Elo update constant.
///
/// The K-factor is tunable configuration rather than a verified contract;
/// 32 is the standard club-play value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingConfig {
    pub skill_min: i32,
    pub skill_max: i32,
    pub display_min: f64,
    pub display_max: f64,
    pub k_factor: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self { skill_min: 1000, skill_max: 2000, display_min: 2.0, display_max: 6.0, k_factor: 32.0 }
    }
}

impl RatingConfig {
    fn skill_span(&self) -> f64 {
        (self.skill_max - self.skill_min) as f64
    }

    fn display_span(&self) -> f64 {
        self.display_max - self.display_min
    }

    /// Numeric public rating for a skill score, clamped to the public range.
    ///
    /// This is the value the inverse property holds over:
    /// `skill_from_display(display_value(s))` equals `s` within one skill
    /// point for any `s` inside the internal range.
    pub fn display_value(&self, skill: i32) -> f64 {
        let t = (skill - self.skill_min) as f64 / self.skill_span();
        (self.display_min + t * self.display_span()).clamp(self.display_min, self.display_max)
    }

    /// Public rating formatted to one decimal for display.
    pub fn display_rating(&self, skill: i32) -> String {
        format!("{:.1}", self.display_value(skill))
    }

    /// Inverse of the linear map, rounded to the nearest skill point.
    pub fn skill_from_display(&self, rating: f64) -> i32 {
        let t = (rating - self.display_min) / self.display_span();
        (self.skill_min as f64 + t * self.skill_span()).round() as i32
    }

    /// Logistic win expectancy for the first player, as a rounded percent.
    pub fn win_probability(&self, skill_a: i32, skill_b: i32) -> u8 {
        (expected_score(skill_a as f64, skill_b as f64) * 100.0).round() as u8
    }

    /// K-factor Elo update for one result: `round(K * (actual - expected))`.
    ///
    /// Positive after a win, negative after a loss; magnitude shrinks as the
    /// result becomes more expected.
    pub fn rating_delta(&self, skill_before: i32, opponent_skill: i32, won: bool) -> i32 {
        let expected = expected_score(skill_before as f64, opponent_skill as f64);
        let actual = if won { 1.0 } else { 0.0 };
        (self.k_factor * (actual - expected)).round() as i32
    }
}

/// Expected score for rating A against rating B.
fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / 400.0))
}

//! Fixed lookup tables turning ratings and scores into what the user sees.

use std::fmt;

/// RGB color of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
}

impl Color {
    /// Creates a color from its components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Rating 5 or "Pass".
pub const STRONG_GREEN: Color = Color::rgb(0x2e, 0x7d, 0x32);
/// Rating 4.
pub const LIGHT_GREEN: Color = Color::rgb(0x66, 0xbb, 0x6a);
/// Rating 3.
pub const AMBER: Color = Color::rgb(0xff, 0xa0, 0x00);
/// Rating 2.
pub const ORANGE: Color = Color::rgb(0xff, 0x70, 0x43);
/// Rating 1 or "Improvement Required".
pub const RED_ORANGE: Color = Color::rgb(0xf4, 0x51, 0x1e);
/// Rating 0.
pub const DEEP_RED: Color = Color::rgb(0xb7, 0x1c, 0x1c);
/// Awaiting inspection, exempt and anything unknown.
pub const NEUTRAL_GREY: Color = Color::rgb(0x9e, 0x9e, 0x9e);

// Covers both the FHRS (0-5) and the Scottish (pass/improvement required) schemes.
const RATING_COLORS: &[(&str, Color)] = &[
    ("5", STRONG_GREEN),
    ("pass", STRONG_GREEN),
    ("4", LIGHT_GREEN),
    ("3", AMBER),
    ("2", ORANGE),
    ("1", RED_ORANGE),
    ("improvement required", RED_ORANGE),
    ("0", DEEP_RED),
];

/// Marker color of a raw rating value.
pub fn rating_color(rating: Option<&str>) -> Color {
    let rating = rating.unwrap_or_default().to_lowercase();
    RATING_COLORS
        .iter()
        .find(|(value, _)| *value == rating)
        .map(|(_, color)| *color)
        .unwrap_or(NEUTRAL_GREY)
}

/// Short text shown inside a marker: the rating number, or the first letter of the rating.
pub fn rating_glyph(rating: Option<&str>) -> String {
    let rating = rating.unwrap_or_default().trim();
    if let Some(number) = leading_integer(rating) {
        return number.to_string();
    }

    match rating.chars().next() {
        Some(first) => first.to_uppercase().collect(),
        None => "?".to_string(),
    }
}

fn leading_integer(text: &str) -> Option<i64> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let sign_len = text.len() - unsigned.len();
    let digits_len = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    if digits_len == 0 {
        return None;
    }

    text[..sign_len + digits_len].parse().ok()
}

/// Inspection area a sub-score belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreCategory {
    /// Hygienic food handling.
    Hygiene,
    /// Cleanliness and condition of the facilities.
    Structural,
    /// Management of food safety.
    ConfidenceInManagement,
}

const HYGIENE_DESCRIPTORS: &[(u32, &str)] = &[
    (0, "Very good"),
    (5, "Good"),
    (10, "Generally satisfactory"),
    (15, "Improvement necessary"),
    (20, "Major improvement necessary"),
    (25, "Urgent improvement necessary"),
];

const STRUCTURAL_DESCRIPTORS: &[(u32, &str)] = HYGIENE_DESCRIPTORS;

const CONFIDENCE_DESCRIPTORS: &[(u32, &str)] = &[
    (0, "Very good"),
    (5, "Good"),
    (20, "Major improvement necessary"),
    (30, "Urgent improvement necessary"),
];

/// Text used for a missing or invalid score.
pub const NOT_AVAILABLE: &str = "N/A";

impl ScoreCategory {
    /// All categories in popup order.
    pub const ALL: [ScoreCategory; 3] = [
        ScoreCategory::Hygiene,
        ScoreCategory::Structural,
        ScoreCategory::ConfidenceInManagement,
    ];

    /// Name of the category as shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            ScoreCategory::Hygiene => "Hygiene",
            ScoreCategory::Structural => "Structural",
            ScoreCategory::ConfidenceInManagement => "Confidence in Management",
        }
    }

    fn descriptors(&self) -> &'static [(u32, &'static str)] {
        match self {
            ScoreCategory::Hygiene => HYGIENE_DESCRIPTORS,
            ScoreCategory::Structural => STRUCTURAL_DESCRIPTORS,
            ScoreCategory::ConfidenceInManagement => CONFIDENCE_DESCRIPTORS,
        }
    }

    /// Textual descriptor of a score in this category.
    ///
    /// Missing and negative scores give [`NOT_AVAILABLE`]; scores without a table entry are
    /// returned as their number.
    pub fn describe(&self, score: Option<f64>) -> String {
        let Some(score) = score.filter(|score| score.is_finite() && *score >= 0.0) else {
            return NOT_AVAILABLE.to_string();
        };

        self.descriptors()
            .iter()
            .find(|(key, _)| f64::from(*key) == score)
            .map(|(_, descriptor)| descriptor.to_string())
            .unwrap_or_else(|| score.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_and_five_share_a_color() {
        assert_eq!(rating_color(Some("5")), rating_color(Some("pass")));
        assert_eq!(rating_color(Some("Pass")), STRONG_GREEN);
    }

    #[test]
    fn zero_is_distinct_from_one() {
        assert_eq!(rating_color(Some("0")), DEEP_RED);
        assert_eq!(rating_color(Some("1")), RED_ORANGE);
        assert_ne!(rating_color(Some("0")), rating_color(Some("1")));
        assert_eq!(
            rating_color(Some("Improvement Required")),
            rating_color(Some("1"))
        );
    }

    #[test]
    fn other_ratings_are_grey() {
        for rating in [None, Some(""), Some("AwaitingInspection"), Some("Exempt"), Some("6")] {
            assert_eq!(rating_color(rating), NEUTRAL_GREY, "{rating:?}");
        }
    }

    #[test]
    fn color_hex() {
        assert_eq!(STRONG_GREEN.to_string(), "#2e7d32");
        assert_eq!(AMBER.to_string(), "#ffa000");
        assert_eq!(NEUTRAL_GREY.to_string(), "#9e9e9e");
    }

    #[test]
    fn glyphs() {
        assert_eq!(rating_glyph(Some("5")), "5");
        assert_eq!(rating_glyph(Some(" 3 ")), "3");
        assert_eq!(rating_glyph(Some("4.5")), "4");
        assert_eq!(rating_glyph(Some("Pass")), "P");
        assert_eq!(rating_glyph(Some("exempt")), "E");
        assert_eq!(rating_glyph(Some("AwaitingInspection")), "A");
        assert_eq!(rating_glyph(Some("-")), "-");
        assert_eq!(rating_glyph(Some("   ")), "?");
        assert_eq!(rating_glyph(None), "?");
    }

    #[test]
    fn hygiene_and_structural_descriptors() {
        assert_eq!(ScoreCategory::Hygiene.describe(Some(10.0)), "Generally satisfactory");
        assert_eq!(ScoreCategory::Structural.describe(Some(10.0)), "Generally satisfactory");
        assert_eq!(ScoreCategory::Hygiene.describe(Some(0.0)), "Very good");
        assert_eq!(
            ScoreCategory::Structural.describe(Some(25.0)),
            "Urgent improvement necessary"
        );
    }

    #[test]
    fn confidence_has_its_own_table() {
        assert_eq!(ScoreCategory::ConfidenceInManagement.describe(Some(10.0)), "10");
        assert_eq!(
            ScoreCategory::ConfidenceInManagement.describe(Some(20.0)),
            "Major improvement necessary"
        );
        assert_eq!(
            ScoreCategory::ConfidenceInManagement.describe(Some(30.0)),
            "Urgent improvement necessary"
        );
        assert_eq!(ScoreCategory::Hygiene.describe(Some(30.0)), "30");
    }

    #[test]
    fn invalid_scores_are_not_available() {
        for category in ScoreCategory::ALL {
            assert_eq!(category.describe(None), NOT_AVAILABLE);
            assert_eq!(category.describe(Some(-5.0)), NOT_AVAILABLE);
            assert_eq!(category.describe(Some(f64::NAN)), NOT_AVAILABLE);
        }
    }

    #[test]
    fn unknown_scores_pass_through() {
        assert_eq!(ScoreCategory::Hygiene.describe(Some(7.5)), "7.5");
        assert_eq!(ScoreCategory::Structural.describe(Some(40.0)), "40");
    }
}

//! Conversion of establishments into map markers.

use std::collections::HashSet;

use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::config::{Config, DEFAULT_DETAILS_URL};
use crate::establishment::Establishment;
use crate::geo::GeoPoint;
use crate::style::{rating_color, rating_glyph, Color, ScoreCategory};

/// Name shown for establishments without a business name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Round badge drawn at the establishment position.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerIcon {
    /// Fill and border color.
    pub color: Color,
    /// Text inside the badge.
    pub glyph: String,
    /// Width and height in pixels.
    pub size: (u32, u32),
    /// Pixel of the icon placed at the marker position.
    pub anchor: (i32, i32),
    /// Offset of the popup tip from the anchor.
    pub popup_anchor: (i32, i32),
}

impl MarkerIcon {
    /// Creates an icon of the standard size.
    pub fn new(color: Color, glyph: String) -> Self {
        Self {
            color,
            glyph,
            size: (26, 26),
            anchor: (13, 13),
            popup_anchor: (0, -12),
        }
    }

    /// HTML of the badge for web map widgets.
    pub fn to_html(&self) -> String {
        format!(
            r#"<div class="rating-marker" style="background:{color};border-color:{color}">{glyph}</div>"#,
            color = self.color,
            glyph = encode_text(&self.glyph),
        )
    }
}

/// Content of the popup opened by clicking a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    /// Business name.
    pub name: String,
    /// Date of the last inspection as `dd/mm/yyyy`.
    pub rated_on: Option<String>,
    /// Hygiene descriptor.
    pub hygiene: String,
    /// Structural descriptor.
    pub structural: String,
    /// Confidence in management descriptor.
    pub confidence: String,
    /// Link to the establishment page on the ratings website.
    pub details_url: Option<String>,
}

impl Popup {
    /// Descriptor lines in display order.
    pub fn score_lines(&self) -> [(&'static str, &str); 3] {
        [
            (ScoreCategory::Hygiene.label(), self.hygiene.as_str()),
            (ScoreCategory::Structural.label(), self.structural.as_str()),
            (
                ScoreCategory::ConfidenceInManagement.label(),
                self.confidence.as_str(),
            ),
        ]
    }

    /// HTML of the popup for web map widgets.
    pub fn to_html(&self) -> String {
        let mut lines = vec![format!("<strong>{}</strong><br/>", encode_text(&self.name))];

        if let Some(rated_on) = &self.rated_on {
            lines.push(format!("Rated: {rated_on}<br/>"));
        }

        for (label, descriptor) in self.score_lines() {
            lines.push(format!("{label}: {}<br/>", encode_text(descriptor)));
        }

        if let Some(url) = &self.details_url {
            lines.push(format!(
                r#"<a href="{}" target="_blank" rel="noopener">Details</a>"#,
                encode_double_quoted_attribute(url)
            ));
        }

        lines.join("\n")
    }
}

/// A marker ready to be put on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Unique key within one marker set.
    pub key: String,
    /// Marker position.
    pub position: GeoPoint,
    /// Badge.
    pub icon: MarkerIcon,
    /// Popup content.
    pub popup: Popup,
    /// Postal address, for hosts that show it as a tooltip.
    pub address: String,
}

/// Builds marker sets from establishment lists.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRenderer {
    details_url: String,
}

impl MarkerRenderer {
    /// Creates a renderer. `{id}` in the template is replaced with the establishment identifier.
    pub fn new(details_url: impl Into<String>) -> Self {
        Self {
            details_url: details_url.into(),
        }
    }

    /// Creates a renderer using the details link template of the config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.details_url.clone())
    }

    /// Builds one marker per distinct establishment that has a valid position.
    ///
    /// Establishments are keyed by identifier, or by position when they have none; the first
    /// occurrence of a key wins.
    pub fn render(&self, establishments: &[Establishment]) -> Vec<Marker> {
        let mut seen = HashSet::new();
        let mut markers = Vec::with_capacity(establishments.len());
        let mut without_position = 0usize;
        let mut duplicates = 0usize;

        for establishment in establishments {
            let Some(position) = establishment.location.filter(GeoPoint::is_finite) else {
                without_position += 1;
                continue;
            };

            let Some(key) = establishment.marker_key() else {
                continue;
            };

            if !seen.insert(key.clone()) {
                duplicates += 1;
                continue;
            }

            markers.push(self.marker(key, position, establishment));
        }

        if without_position > 0 || duplicates > 0 {
            log::debug!(
                "Rendered {} markers, skipped {without_position} without position and {duplicates} duplicates",
                markers.len()
            );
        }

        markers
    }

    fn marker(&self, key: String, position: GeoPoint, establishment: &Establishment) -> Marker {
        let rating = establishment.rating.as_deref();
        let scores = &establishment.scores;

        let popup = Popup {
            name: establishment
                .name
                .clone()
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            rated_on: establishment
                .rating_date
                .as_deref()
                .and_then(format_rating_date),
            hygiene: ScoreCategory::Hygiene.describe(scores.hygiene),
            structural: ScoreCategory::Structural.describe(scores.structural),
            confidence: ScoreCategory::ConfidenceInManagement
                .describe(scores.confidence_in_management),
            details_url: establishment
                .id
                .as_deref()
                .map(|id| self.details_url.replace("{id}", id)),
        };

        Marker {
            key,
            position,
            icon: MarkerIcon::new(rating_color(rating), rating_glyph(rating)),
            popup,
            address: establishment.address(),
        }
    }
}

impl Default for MarkerRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_DETAILS_URL)
    }
}

/// Formats an ISO 8601 date or date-time as `dd/mm/yyyy`.
fn format_rating_date(raw: &str) -> Option<String> {
    let date = raw.trim().get(..10)?;
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(date) => Some(date.format("%d/%m/%Y").to_string()),
        Err(err) => {
            log::debug!("Ignoring unreadable rating date {raw:?}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::establishment::Scores;
    use crate::style::{DEEP_RED, NEUTRAL_GREY, STRONG_GREEN};

    fn establishment(id: Option<&str>, location: Option<GeoPoint>, rating: &str) -> Establishment {
        Establishment {
            id: id.map(str::to_string),
            name: Some(format!("Cafe {}", id.unwrap_or("anonymous"))),
            location,
            rating: Some(rating.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_list_gives_no_markers() {
        assert!(MarkerRenderer::default().render(&[]).is_empty());
    }

    #[test]
    fn duplicates_keep_the_first_occurrence() {
        let location = Some(GeoPoint::new(51.5, -0.1));
        let markers = MarkerRenderer::default().render(&[
            establishment(Some("1"), location, "5"),
            establishment(Some("1"), Some(GeoPoint::new(52.0, -1.0)), "0"),
            establishment(Some("2"), location, "0"),
        ]);

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].key, "1");
        assert_eq!(markers[0].icon.color, STRONG_GREEN);
        assert_eq!(markers[1].key, "2");
        assert_eq!(markers[1].icon.color, DEEP_RED);
    }

    #[test]
    fn coordinates_are_the_fallback_key() {
        let markers = MarkerRenderer::default().render(&[
            establishment(None, Some(GeoPoint::new(51.5, -0.1)), "5"),
            establishment(None, Some(GeoPoint::new(51.5, -0.1)), "4"),
            establishment(None, Some(GeoPoint::new(51.6, -0.1)), "3"),
        ]);

        let keys: Vec<_> = markers.iter().map(|marker| marker.key.as_str()).collect();
        assert_eq!(keys, ["51.5,-0.1", "51.6,-0.1"]);
        assert_eq!(markers[0].popup.details_url, None);
    }

    #[test]
    fn records_without_valid_position_are_dropped() {
        let markers = MarkerRenderer::default().render(&[
            establishment(Some("1"), None, "5"),
            establishment(Some("2"), Some(GeoPoint::new(f64::NAN, 0.0)), "5"),
            establishment(Some("3"), Some(GeoPoint::new(51.0, f64::INFINITY)), "5"),
            establishment(Some("4"), Some(GeoPoint::new(51.0, 0.0)), "5"),
        ]);

        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].key, "4");
    }

    #[test]
    fn popup_content() {
        let renderer = MarkerRenderer::default();
        let markers = renderer.render(&[Establishment {
            id: Some("1234".into()),
            name: Some("Fish & Chips".into()),
            address_lines: vec!["2 Quay Road".into()],
            post_code: Some("PL1 2AB".into()),
            location: Some(GeoPoint::new(50.37, -4.14)),
            rating: Some("AwaitingInspection".into()),
            rating_date: Some("2022-11-03T00:00:00".into()),
            scores: Scores {
                hygiene: Some(10.0),
                structural: None,
                confidence_in_management: Some(10.0),
            },
        }]);

        let marker = &markers[0];
        assert_eq!(marker.icon.color, NEUTRAL_GREY);
        assert_eq!(marker.icon.glyph, "A");
        assert_eq!(marker.address, "2 Quay Road, PL1 2AB");

        let popup = &marker.popup;
        assert_eq!(popup.name, "Fish & Chips");
        assert_eq!(popup.rated_on.as_deref(), Some("03/11/2022"));
        assert_eq!(popup.hygiene, "Generally satisfactory");
        assert_eq!(popup.structural, "N/A");
        assert_eq!(popup.confidence, "10");
        assert_eq!(
            popup.details_url.as_deref(),
            Some("https://ratings.food.gov.uk/business/en-GB/1234")
        );

        insta::assert_snapshot!(popup.to_html(), @r#"
        <strong>Fish &amp; Chips</strong><br/>
        Rated: 03/11/2022<br/>
        Hygiene: Generally satisfactory<br/>
        Structural: N/A<br/>
        Confidence in Management: 10<br/>
        <a href="https://ratings.food.gov.uk/business/en-GB/1234" target="_blank" rel="noopener">Details</a>
        "#);
    }

    #[test]
    fn popup_defaults() {
        let markers = MarkerRenderer::default().render(&[Establishment {
            location: Some(GeoPoint::new(51.0, 0.0)),
            rating_date: Some("not a date".into()),
            ..Default::default()
        }]);

        let popup = &markers[0].popup;
        assert_eq!(popup.name, UNKNOWN_NAME);
        assert_eq!(popup.rated_on, None);
        assert_eq!(markers[0].icon.glyph, "?");
        assert_eq!(markers[0].icon.color, NEUTRAL_GREY);
    }

    #[test]
    fn markup_in_fields_is_escaped() {
        let popup = Popup {
            name: "<b>Joe's</b> Diner".into(),
            rated_on: None,
            hygiene: "N/A".into(),
            structural: "N/A".into(),
            confidence: "N/A".into(),
            details_url: Some(r#"https://example.org/?a=1&b="x""#.into()),
        };

        insta::assert_snapshot!(popup.to_html(), @r#"
        <strong>&lt;b&gt;Joe's&lt;/b&gt; Diner</strong><br/>
        Hygiene: N/A<br/>
        Structural: N/A<br/>
        Confidence in Management: N/A<br/>
        <a href="https://example.org/?a=1&amp;b=&quot;x&quot;" target="_blank" rel="noopener">Details</a>
        "#);

        let icon = MarkerIcon::new(NEUTRAL_GREY, "<".into());
        assert!(icon.to_html().ends_with(">&lt;</div>"));
    }

    #[test]
    fn icon_html() {
        let icon = MarkerIcon::new(STRONG_GREEN, "5".into());
        insta::assert_snapshot!(
            icon.to_html(),
            @r#"<div class="rating-marker" style="background:#2e7d32;border-color:#2e7d32">5</div>"#
        );
        assert_eq!(icon.size, (26, 26));
        assert_eq!(icon.anchor, (13, 13));
        assert_eq!(icon.popup_anchor, (0, -12));
    }

    #[test]
    fn custom_details_link() {
        let renderer = MarkerRenderer::new("https://example.org/place?id={id}");
        let markers = renderer.render(&[establishment(Some("7"), Some(GeoPoint::new(51.0, 0.0)), "3")]);
        assert_eq!(
            markers[0].popup.details_url.as_deref(),
            Some("https://example.org/place?id=7")
        );
    }
}

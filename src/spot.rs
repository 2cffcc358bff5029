//! Spots: the records pinned on the map, and the form that creates them.
//!
//! A spot is a street-speech location with a rating, the hours it works best,
//! the audience it reaches and whether a campaign car may stop there.

use crate::geometry::{LatLng, MapProjection, Point};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Audience attributes in display order. Stored lists follow this order.
pub const AUDIENCE_ATTRIBUTES: [&str; 5] = ["主婦", "学生", "社会人", "高齢者", "ファミリー"];

/// Selectable hours of the day.
pub const TIME_SLOTS: RangeInclusive<u8> = 8..=22;

pub const DEFAULT_RATING: u8 = 7;
pub const RATING_RANGE: RangeInclusive<u8> = 1..=10;

/// Map center used before the user has moved anywhere.
pub const MAP_DEFAULT_CENTER: LatLng = LatLng::new(35.6762, 139.7447);
pub const MAP_DEFAULT_ZOOM: f64 = 14.0;

pub const PIN_COLOR_HIGH: &str = "#ef4444";
pub const PIN_COLOR_MEDIUM: &str = "#3b82f6";
pub const PIN_COLOR_LOW: &str = "#9ca3af";

/// Label for a time slot, e.g. `"08:00"`.
pub fn time_slot_label(hour: u8) -> String {
    format!("{hour:02}:00")
}

/// Short description shown under the rating slider. Ratings below 5 have none.
pub fn rating_description(rating: u8) -> Option<&'static str> {
    match rating {
        10 => Some("【S級】広場・ランドマーク（確実な聴衆）"),
        8 | 9 => Some("【A級】主要駅・スーパー（主力）"),
        6 | 7 => Some("【B級】商店街・公園（堅実な対話）"),
        5 => Some("【C級】穴場（特定層向け）"),
        _ => None,
    }
}

pub fn pin_color(rating: u8) -> &'static str {
    if rating >= 8 {
        PIN_COLOR_HIGH
    } else if rating >= 5 {
        PIN_COLOR_MEDIUM
    } else {
        PIN_COLOR_LOW
    }
}

/// Whether a campaign car may be used at the spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarAccessibility {
    Allowed,
    BriefStop,
    NotAllowed,
}

impl CarAccessibility {
    pub const ALL: [CarAccessibility; 3] = [
        CarAccessibility::Allowed,
        CarAccessibility::BriefStop,
        CarAccessibility::NotAllowed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CarAccessibility::Allowed => "allowed",
            CarAccessibility::BriefStop => "brief_stop",
            CarAccessibility::NotAllowed => "not_allowed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CarAccessibility::Allowed => "使用可",
            CarAccessibility::BriefStop => "一瞬の乗降のみ可",
            CarAccessibility::NotAllowed => "不可",
        }
    }
}

impl fmt::Display for CarAccessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown car accessibility: {0} (expected allowed, brief_stop or not_allowed)")]
pub struct ParseCarAccessibilityError(String);

impl FromStr for CarAccessibility {
    type Err = ParseCarAccessibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseCarAccessibilityError(s.to_string()))
    }
}

/// Why a form cannot be submitted. Messages are shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("位置情報が取得できません")]
    MissingLocation,
    #[error("場所の名前を入力してください")]
    MissingTitle,
    #[error("写真を1枚以上追加してください")]
    NoImages,
    #[error("選挙カーの利用可否を選択してください")]
    MissingCarAccessibility,
    #[error("推奨レベルは1〜10で指定してください (got {0})")]
    RatingOutOfRange(u8),
    #[error("時間帯は8時〜22時で指定してください (got {0})")]
    TimeSlotOutOfRange(u8),
}

/// Editable state of the create/edit sheet, minus the images, which live in
/// an [`IngestPipeline`](crate::ingest::IngestPipeline).
#[derive(Debug, Clone, PartialEq)]
pub struct SpotForm {
    pub location: Option<LatLng>,
    pub title: String,
    pub description: String,
    pub rating: u8,
    pub best_time: Vec<u8>,
    pub audience_attributes: Vec<String>,
    pub car_accessibility: Option<CarAccessibility>,
}

impl Default for SpotForm {
    fn default() -> Self {
        Self {
            location: None,
            title: String::new(),
            description: String::new(),
            rating: DEFAULT_RATING,
            best_time: Vec::new(),
            audience_attributes: Vec::new(),
            car_accessibility: None,
        }
    }
}

impl SpotForm {
    pub fn at(location: LatLng) -> Self {
        Self {
            location: Some(location),
            ..Self::default()
        }
    }

    /// Prefill from a stored spot for editing.
    pub fn from_spot(spot: &Spot) -> Self {
        let r = &spot.record;
        Self {
            location: Some(LatLng::new(r.lat, r.lng)),
            title: r.title.clone(),
            description: r.description.clone().unwrap_or_default(),
            rating: r.rating,
            best_time: r.best_time.clone().unwrap_or_default(),
            audience_attributes: r.audience_attributes.clone().unwrap_or_default(),
            car_accessibility: Some(r.car_accessibility),
        }
    }

    pub fn toggle_time(&mut self, hour: u8) {
        toggle(&mut self.best_time, hour);
    }

    pub fn toggle_audience(&mut self, attribute: &str) {
        toggle(&mut self.audience_attributes, attribute.to_string());
    }

    /// Back to a blank form at the same location.
    pub fn reset(&mut self) {
        *self = Self {
            location: self.location,
            ..Self::default()
        };
    }

    /// Check the form in on-screen order, reporting the first problem.
    pub fn validate(&self, image_count: usize) -> Result<(), ValidationError> {
        if self.location.is_none() {
            return Err(ValidationError::MissingLocation);
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if image_count == 0 {
            return Err(ValidationError::NoImages);
        }
        if self.car_accessibility.is_none() {
            return Err(ValidationError::MissingCarAccessibility);
        }
        if !RATING_RANGE.contains(&self.rating) {
            return Err(ValidationError::RatingOutOfRange(self.rating));
        }
        if let Some(&hour) = self.best_time.iter().find(|&&h| !TIME_SLOTS.contains(&h)) {
            return Err(ValidationError::TimeSlotOutOfRange(hour));
        }
        Ok(())
    }
}

fn toggle<T: PartialEq>(list: &mut Vec<T>, value: T) {
    if let Some(pos) = list.iter().position(|v| *v == value) {
        list.remove(pos);
    } else {
        list.push(value);
    }
}

/// Ascending, without duplicates.
pub fn sort_best_time(hours: &[u8]) -> Vec<u8> {
    let mut sorted = hours.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted
}

/// Canonical [`AUDIENCE_ATTRIBUTES`] order; unknown attributes keep their
/// relative order at the end.
pub fn sort_audience_attributes(attributes: &[String]) -> Vec<String> {
    let mut sorted = attributes.to_vec();
    sorted.sort_by_key(|a| {
        AUDIENCE_ATTRIBUTES
            .iter()
            .position(|known| known == a)
            .unwrap_or(usize::MAX)
    });
    sorted
}

fn non_empty<T>(list: Vec<T>) -> Option<Vec<T>> {
    (!list.is_empty()).then_some(list)
}

/// What gets stored for a spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotRecord {
    pub title: String,
    pub description: Option<String>,
    pub rating: u8,
    pub best_time: Option<Vec<u8>>,
    pub lat: f64,
    pub lng: f64,
    pub audience_attributes: Option<Vec<String>>,
    pub car_accessibility: CarAccessibility,
    pub images: Vec<String>,
}

impl SpotRecord {
    /// Normalize a validated form and its uploaded image URLs into a record.
    pub fn from_form(form: &SpotForm, images: Vec<String>) -> Result<Self, ValidationError> {
        form.validate(images.len())?;
        let location = form.location.ok_or(ValidationError::MissingLocation)?;
        let car_accessibility = form
            .car_accessibility
            .ok_or(ValidationError::MissingCarAccessibility)?;
        let description = form.description.trim();

        Ok(Self {
            title: form.title.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            rating: form.rating,
            best_time: non_empty(sort_best_time(&form.best_time)),
            lat: location.lat,
            lng: location.lng,
            audience_attributes: non_empty(sort_audience_attributes(&form.audience_attributes)),
            car_accessibility,
            images,
        })
    }

    pub fn location(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// A stored spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    pub id: Uuid,
    #[serde(flatten)]
    pub record: SpotRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Spot {
    pub fn pin_color(&self) -> &'static str {
        pin_color(self.record.rating)
    }

    pub fn street_view_url(&self) -> String {
        format!(
            "https://www.google.com/maps/@?api=1&map_action=pano&viewpoint={},{}",
            self.record.lat, self.record.lng
        )
    }

    pub fn maps_url(&self) -> String {
        format!(
            "https://www.google.com/maps/search/?api=1&query={},{}",
            self.record.lat, self.record.lng
        )
    }
}

/// A request to create a spot where the user long-pressed the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewSpotRequest {
    pub location: LatLng,
}

impl NewSpotRequest {
    pub fn from_long_press(point: Point, projection: &impl MapProjection) -> Self {
        Self {
            location: projection.unproject(point),
        }
    }

    pub fn into_form(self) -> SpotForm {
        SpotForm::at(self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> SpotForm {
        SpotForm {
            title: "駅前広場".to_string(),
            car_accessibility: Some(CarAccessibility::BriefStop),
            ..SpotForm::at(LatLng::new(35.68, 139.76))
        }
    }

    // =========================================================================
    // Constants and lookups
    // =========================================================================

    #[test]
    fn pin_color_bands() {
        assert_eq!(pin_color(10), PIN_COLOR_HIGH);
        assert_eq!(pin_color(8), PIN_COLOR_HIGH);
        assert_eq!(pin_color(7), PIN_COLOR_MEDIUM);
        assert_eq!(pin_color(5), PIN_COLOR_MEDIUM);
        assert_eq!(pin_color(4), PIN_COLOR_LOW);
        assert_eq!(pin_color(1), PIN_COLOR_LOW);
    }

    #[test]
    fn rating_descriptions_cover_five_to_ten() {
        for r in 5..=10 {
            assert!(rating_description(r).is_some(), "rating {r}");
        }
        assert_eq!(rating_description(4), None);
        assert_eq!(rating_description(9), rating_description(8));
    }

    #[test]
    fn time_slot_labels_are_zero_padded() {
        assert_eq!(time_slot_label(8), "08:00");
        assert_eq!(time_slot_label(22), "22:00");
        assert_eq!(TIME_SLOTS.count(), 15);
    }

    #[test]
    fn car_accessibility_parses_and_serializes() {
        assert_eq!(
            "brief_stop".parse::<CarAccessibility>(),
            Ok(CarAccessibility::BriefStop)
        );
        assert!("sometimes".parse::<CarAccessibility>().is_err());
        assert_eq!(
            serde_json::to_string(&CarAccessibility::NotAllowed).unwrap(),
            "\"not_allowed\""
        );
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn validation_order_follows_form() {
        let blank = SpotForm::default();
        assert_eq!(blank.validate(0), Err(ValidationError::MissingLocation));

        let mut form = SpotForm::at(LatLng::new(0.0, 0.0));
        form.title = "   ".to_string();
        assert_eq!(form.validate(0), Err(ValidationError::MissingTitle));

        form.title = "公園".to_string();
        assert_eq!(form.validate(0), Err(ValidationError::NoImages));
        assert_eq!(
            form.validate(1),
            Err(ValidationError::MissingCarAccessibility)
        );

        form.car_accessibility = Some(CarAccessibility::Allowed);
        assert_eq!(form.validate(1), Ok(()));
    }

    #[test]
    fn rating_and_hours_checked() {
        let mut form = valid_form();
        form.rating = 0;
        assert_eq!(form.validate(1), Err(ValidationError::RatingOutOfRange(0)));

        form.rating = 7;
        form.best_time = vec![9, 23];
        assert_eq!(
            form.validate(1),
            Err(ValidationError::TimeSlotOutOfRange(23))
        );
    }

    #[test]
    fn toggles_add_and_remove() {
        let mut form = SpotForm::default();
        form.toggle_time(9);
        form.toggle_time(12);
        form.toggle_time(9);
        assert_eq!(form.best_time, vec![12]);

        form.toggle_audience("学生");
        form.toggle_audience("学生");
        assert!(form.audience_attributes.is_empty());
    }

    #[test]
    fn reset_keeps_location() {
        let mut form = valid_form();
        form.rating = 10;
        form.reset();
        assert_eq!(form.location, Some(LatLng::new(35.68, 139.76)));
        assert_eq!(form.rating, DEFAULT_RATING);
        assert!(form.title.is_empty());
        assert_eq!(form.car_accessibility, None);
    }

    // =========================================================================
    // Records
    // =========================================================================

    #[test]
    fn record_normalizes_lists() {
        let mut form = valid_form();
        form.best_time = vec![18, 8, 12, 8];
        form.audience_attributes = vec![
            "ファミリー".to_string(),
            "観光客".to_string(),
            "主婦".to_string(),
        ];

        let record = SpotRecord::from_form(&form, vec!["u1".to_string()]).unwrap();
        assert_eq!(record.best_time, Some(vec![8, 12, 18]));
        assert_eq!(
            record.audience_attributes,
            Some(vec![
                "主婦".to_string(),
                "ファミリー".to_string(),
                "観光客".to_string()
            ])
        );
    }

    #[test]
    fn record_empty_fields_become_none() {
        let record = SpotRecord::from_form(&valid_form(), vec!["u1".to_string()]).unwrap();
        assert_eq!(record.description, None);
        assert_eq!(record.best_time, None);
        assert_eq!(record.audience_attributes, None);
        assert_eq!(record.rating, DEFAULT_RATING);
    }

    #[test]
    fn record_requires_images() {
        assert_eq!(
            SpotRecord::from_form(&valid_form(), vec![]),
            Err(ValidationError::NoImages)
        );
    }

    #[test]
    fn spot_serializes_flat() {
        let record = SpotRecord::from_form(&valid_form(), vec!["u1".to_string()]).unwrap();
        let now = Utc::now();
        let spot = Spot {
            id: Uuid::nil(),
            record,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&spot).unwrap();
        assert_eq!(json["title"], "駅前広場");
        assert_eq!(json["car_accessibility"], "brief_stop");
        assert!(json["best_time"].is_null());

        let back: Spot = serde_json::from_value(json).unwrap();
        assert_eq!(back, spot);
    }

    #[test]
    fn external_map_links() {
        let record = SpotRecord::from_form(&valid_form(), vec!["u1".to_string()]).unwrap();
        let now = Utc::now();
        let spot = Spot {
            id: Uuid::new_v4(),
            record,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(
            spot.street_view_url(),
            "https://www.google.com/maps/@?api=1&map_action=pano&viewpoint=35.68,139.76"
        );
        assert_eq!(
            spot.maps_url(),
            "https://www.google.com/maps/search/?api=1&query=35.68,139.76"
        );
        assert_eq!(spot.pin_color(), PIN_COLOR_MEDIUM);
    }

    #[test]
    fn long_press_unprojects_point() {
        struct Flat;
        impl MapProjection for Flat {
            fn unproject(&self, point: Point) -> LatLng {
                LatLng::new(35.0 + point.y / 1000.0, 139.0 + point.x / 1000.0)
            }
        }

        let request = NewSpotRequest::from_long_press(Point::new(500.0, 250.0), &Flat);
        assert_eq!(request.location, LatLng::new(35.25, 139.5));
        assert_eq!(request.into_form().location, Some(request.location));
    }
}

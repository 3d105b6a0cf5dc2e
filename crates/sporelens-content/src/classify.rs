//! Shape-based value classification.
//!
//! [`classify`] decides how a value should be presented purely from its
//! runtime shape. The checks run in a fixed order and the first match wins:
//!
//! 1. boolean
//! 2. number
//! 3. string: empty → fallback, image reference, date-like, short tag,
//!    name, free text
//! 4. array: empty, then by the first element's type
//! 5. object: range (`min`/`max`), geo point, nested object
//!
//! The category is entirely data-driven. [`classify_field`] additionally lets
//! the field *name* shift the display priority (identity and safety fields
//! float up, metadata sinks), but never the category.

use std::cmp::Reverse;
use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Strings shorter than this (in chars) and on one line are tags.
const TAG_MAX_LEN: usize = 15;

/// Strings shorter than this (in chars) and on one line are names.
const NAME_MAX_LEN: usize = 30;

/// String arrays whose average element length is below this are tag lists.
const TAG_LIST_AVG_LEN: f64 = 20.0;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "avif", "tif", "tiff",
];

const IDENTITY_BONUS: i32 = 15;
const SAFETY_BONUS: i32 = 25;
const METADATA_PENALTY: i32 = -100;

const IDENTITY_WORDS: &[&str] = &["name", "title"];
const SAFETY_WORDS: &[&str] = &["edible", "edibility", "toxic", "safe", "poison"];
const METADATA_WORDS: &[&str] = &["created", "updated", "modified"];

static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\d{4}(-\d{2}(-\d{2}([T ]\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?)?)?)?$",
    )
    .expect("Invalid ISO date regex")
});

/// Loose human-written date formats.
const LOOSE_DATE_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y", "%m/%d/%Y", "%Y/%m/%d"];

// ============================================================================
// Categories
// ============================================================================

/// How a value should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationCategory {
    /// `true` / `false`.
    Boolean,
    /// Any JSON number.
    Number,
    /// Short single-line text, like a common name.
    Name,
    /// Very short single-line text, like "toxic".
    Tag,
    /// Image path or image URL.
    Image,
    /// ISO-like or human-written date.
    Date,
    /// Long or multi-line text.
    FreeText,
    /// An empty array.
    EmptyList,
    /// Array of short strings.
    TagList,
    /// Array of long strings.
    TextList,
    /// Array of numbers or booleans.
    SimpleList,
    /// Array of objects (or other non-scalar elements).
    ObjectList,
    /// Object with `min` and `max`.
    Range,
    /// Object with a latitude/longitude pair.
    Geo,
    /// Any other object.
    Nested,
    /// Empty strings, `null`, and anything unrecognized.
    Fallback,
}

impl PresentationCategory {
    /// Base display priority; higher sorts first.
    pub fn base_priority(self) -> i32 {
        match self {
            Self::Name => 100,
            Self::Image => 90,
            Self::Tag => 80,
            Self::TagList => 75,
            Self::FreeText => 70,
            Self::TextList => 65,
            Self::Number => 60,
            Self::Boolean => 50,
            Self::Range => 45,
            Self::SimpleList => 40,
            Self::ObjectList => 35,
            Self::Nested => 30,
            Self::EmptyList => 25,
            Self::Geo | Self::Date => 20,
            Self::Fallback => 0,
        }
    }

    /// Stable snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Name => "name",
            Self::Tag => "tag",
            Self::Image => "image",
            Self::Date => "date",
            Self::FreeText => "free_text",
            Self::EmptyList => "empty_list",
            Self::TagList => "tag_list",
            Self::TextList => "text_list",
            Self::SimpleList => "simple_list",
            Self::ObjectList => "object_list",
            Self::Range => "range",
            Self::Geo => "geo",
            Self::Nested => "nested",
            Self::Fallback => "fallback",
        }
    }

    /// Returns `true` for the array categories.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            Self::EmptyList | Self::TagList | Self::TextList | Self::SimpleList | Self::ObjectList
        )
    }

    /// Returns `true` for the link-like text categories (image and date).
    pub fn is_link_like(self) -> bool {
        matches!(self, Self::Image | Self::Date)
    }
}

impl fmt::Display for PresentationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Shape-derived category.
    pub category: PresentationCategory,
    /// Display ordering weight; never used for search relevance.
    pub priority: i32,
}

impl Classification {
    fn of(category: PresentationCategory) -> Self {
        Self {
            category,
            priority: category.base_priority(),
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Classify a value by shape.
///
/// Total: `null` (and a missing value, passed as `Value::Null`) classifies as
/// [`PresentationCategory::Fallback`] with the lowest base priority.
pub fn classify(value: &Value) -> Classification {
    let category = match value {
        Value::Bool(_) => PresentationCategory::Boolean,
        Value::Number(_) => PresentationCategory::Number,
        Value::String(s) => classify_str(s),
        Value::Array(items) => classify_array(items),
        Value::Object(map) => classify_object(map),
        Value::Null => PresentationCategory::Fallback,
    };
    Classification::of(category)
}

/// Classify a value and apply the field-name priority hint.
pub fn classify_field(name: &str, value: &Value) -> Classification {
    let mut classification = classify(value);
    classification.priority += name_hint(name);
    classification
}

/// Priority adjustment implied by a field name.
///
/// Identity words (`name`, `title`, `id`) add a bonus, safety words
/// (`edible`, `toxic`, `safe`, `poison`) a larger one, and metadata words
/// (`created`, `updated`, `modified`) a large penalty. Adjustments add up.
pub fn name_hint(name: &str) -> i32 {
    let lower = name.to_lowercase();
    let mut adjustment = 0;

    if IDENTITY_WORDS.iter().any(|w| lower.contains(w)) || has_id_word(name) {
        adjustment += IDENTITY_BONUS;
    }
    if SAFETY_WORDS.iter().any(|w| lower.contains(w)) {
        adjustment += SAFETY_BONUS;
    }
    if METADATA_WORDS.iter().any(|w| lower.contains(w)) {
        adjustment += METADATA_PENALTY;
    }
    adjustment
}

/// `id` as a whole word: `id`, `speciesId`, `record_id`, `ID`.
///
/// Substring matching would catch "acidity" and "humidity".
fn has_id_word(name: &str) -> bool {
    split_words(name).any(|w| w.eq_ignore_ascii_case("id"))
}

/// Split camelCase / snake_case / kebab-case identifiers into words.
fn split_words(name: &str) -> impl Iterator<Item = String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words.into_iter()
}

fn classify_str(s: &str) -> PresentationCategory {
    if s.is_empty() {
        return PresentationCategory::Fallback;
    }
    if is_image_reference(s) {
        return PresentationCategory::Image;
    }
    if is_date_like(s) {
        return PresentationCategory::Date;
    }

    let single_line = !s.contains('\n');
    let len = s.chars().count();
    if single_line && len < TAG_MAX_LEN {
        PresentationCategory::Tag
    } else if single_line && len < NAME_MAX_LEN {
        PresentationCategory::Name
    } else {
        PresentationCategory::FreeText
    }
}

fn classify_array(items: &[Value]) -> PresentationCategory {
    let Some(first) = items.first() else {
        return PresentationCategory::EmptyList;
    };

    match first {
        Value::String(_) => {
            let (total, count) = items
                .iter()
                .filter_map(Value::as_str)
                .fold((0usize, 0usize), |(total, count), s| {
                    (total + s.chars().count(), count + 1)
                });
            let average = total as f64 / count as f64;
            if average < TAG_LIST_AVG_LEN {
                PresentationCategory::TagList
            } else {
                PresentationCategory::TextList
            }
        }
        Value::Number(_) | Value::Bool(_) => PresentationCategory::SimpleList,
        Value::Object(_) | Value::Array(_) => PresentationCategory::ObjectList,
        Value::Null => PresentationCategory::Fallback,
    }
}

fn classify_object(map: &Map<String, Value>) -> PresentationCategory {
    if map.contains_key("min") && map.contains_key("max") {
        return PresentationCategory::Range;
    }
    let short_pair = map.contains_key("lat") && (map.contains_key("lng") || map.contains_key("lon"));
    let long_pair = map.contains_key("latitude") && map.contains_key("longitude");
    if short_pair || long_pair {
        return PresentationCategory::Geo;
    }
    PresentationCategory::Nested
}

/// Path-like with an image extension, or URL-like mentioning "image".
fn is_image_reference(s: &str) -> bool {
    let lower = s.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }

    let url_like = lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("data:");
    if url_like && lower.contains("image") {
        return true;
    }

    let path_like = !lower.chars().any(char::is_whitespace);
    if !path_like {
        return false;
    }
    let without_query = lower
        .split(['?', '#'])
        .next()
        .unwrap_or(lower.as_str());
    without_query
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && IMAGE_EXTENSIONS.contains(&ext))
}

/// ISO-like (`2024`, `2024-05`, `2024-05-17`, `2024-05-17T08:30:00Z`) or a
/// common human-written date (`June 5, 2021`, `05/06/2021`, RFC 2822).
fn is_date_like(s: &str) -> bool {
    let trimmed = s.trim();
    if ISO_DATE_RE.is_match(trimmed) {
        // Reject shapes like 2024-13-45; year and year-month forms pass.
        return match trimmed.get(..10) {
            Some(day) if trimmed.len() >= 10 => NaiveDate::parse_from_str(day, "%Y-%m-%d").is_ok(),
            _ => true,
        };
    }
    if DateTime::parse_from_rfc3339(trimmed).is_ok() || DateTime::parse_from_rfc2822(trimmed).is_ok() {
        return true;
    }
    LOOSE_DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(trimmed, fmt).is_ok())
}

// ============================================================================
// Field ordering
// ============================================================================

/// A field of an object, classified with its name hint.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedField<'a> {
    /// Field name.
    pub name: &'a str,
    /// Field value.
    pub value: &'a Value,
    /// Classification including the name hint.
    pub classification: Classification,
}

/// Order an object's fields for display: highest priority first.
///
/// Ties keep the object's own key order.
pub fn order_fields(map: &Map<String, Value>) -> Vec<ClassifiedField<'_>> {
    let mut fields: Vec<ClassifiedField<'_>> = map
        .iter()
        .map(|(name, value)| ClassifiedField {
            name,
            value,
            classification: classify_field(name, value),
        })
        .collect();
    fields.sort_by_key(|f| Reverse(f.classification.priority));
    fields
}

// ============================================================================
// Tests
// ============================================================================

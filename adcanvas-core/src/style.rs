//! Layer styling: a closed set of recognised keys with per-type defaults.
//!
//! [`LayerStyle`] is the stored form. Every key is optional and keys outside
//! the recognised set are ignored on load. [`ResolvedStyle`] is what renderers
//! and geometry consumers see: every key filled in from the layer type's
//! defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::layer::LayerKind;

/// Root font size in pixels used to resolve `rem` units.
pub const ROOT_FONT_PX: f32 = 16.0;

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Left aligned.
    Left,
    /// Centred.
    Center,
    /// Right aligned.
    Right,
    /// Justified.
    Justify,
}

impl FromStr for TextAlign {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" | "end" => Ok(Self::Right),
            "justify" => Ok(Self::Justify),
            other => Err(UnknownKeyword(other.to_string())),
        }
    }
}

/// Text case transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    /// Leave text as written.
    None,
    /// UPPERCASE.
    Uppercase,
    /// lowercase.
    Lowercase,
    /// Capitalize Each Word.
    Capitalize,
}

impl TextTransform {
    /// Apply the transform to a string.
    #[must_use]
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::None => text.to_string(),
            Self::Uppercase => text.to_uppercase(),
            Self::Lowercase => text.to_lowercase(),
            Self::Capitalize => text
                .split(' ')
                .map(|word| {
                    let mut chars = word.chars();
                    chars.next().map_or_else(String::new, |first| {
                        first.to_uppercase().chain(chars).collect()
                    })
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl FromStr for TextTransform {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "uppercase" => Ok(Self::Uppercase),
            "lowercase" => Ok(Self::Lowercase),
            "capitalize" => Ok(Self::Capitalize),
            other => Err(UnknownKeyword(other.to_string())),
        }
    }
}

/// How an image fills its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectFit {
    /// Scale to cover, cropping overflow.
    Cover,
    /// Scale to fit entirely.
    Contain,
    /// Stretch to the box.
    Fill,
    /// Natural size.
    None,
    /// The smaller of `none` and `contain`.
    ScaleDown,
}

impl ObjectFit {
    /// CSS / SVG keyword for this fit.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Contain => "contain",
            Self::Fill => "fill",
            Self::None => "none",
            Self::ScaleDown => "scale-down",
        }
    }
}

impl FromStr for ObjectFit {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cover" => Ok(Self::Cover),
            "contain" => Ok(Self::Contain),
            "fill" => Ok(Self::Fill),
            "none" => Ok(Self::None),
            "scale-down" => Ok(Self::ScaleDown),
            other => Err(UnknownKeyword(other.to_string())),
        }
    }
}

/// A keyword outside the recognised set for a style key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKeyword(pub String);

impl fmt::Display for UnknownKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised keyword '{}'", self.0)
    }
}

impl std::error::Error for UnknownKeyword {}

/// A CSS length that may arrive as a bare number or a unit string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CssLength {
    /// A bare number, interpreted as pixels.
    Number(f32),
    /// A CSS string such as `"12px 24px"` or `"0.05em"`.
    Text(String),
}

impl CssLength {
    /// Resolve every whitespace-separated component to pixels.
    ///
    /// `em` components are relative to `font_px`, `rem` to [`ROOT_FONT_PX`].
    /// Components that cannot be parsed resolve to 0.
    #[must_use]
    pub fn components_px(&self, font_px: f32) -> Vec<f32> {
        match self {
            Self::Number(n) => vec![crate::geometry::finite_or(*n, 0.0)],
            Self::Text(text) => text
                .split_whitespace()
                .map(|part| parse_length_px(part, font_px))
                .collect(),
        }
    }

    /// Resolve to a single pixel value (the first component).
    #[must_use]
    pub fn to_px(&self, font_px: f32) -> f32 {
        self.components_px(font_px).first().copied().unwrap_or(0.0)
    }
}

fn parse_length_px(part: &str, font_px: f32) -> f32 {
    let part = part.trim();
    let (number, scale) = if let Some(n) = part.strip_suffix("rem") {
        (n, ROOT_FONT_PX)
    } else if let Some(n) = part.strip_suffix("em") {
        (n, font_px)
    } else if let Some(n) = part.strip_suffix("px") {
        (n, 1.0)
    } else {
        (part, 1.0)
    };
    number
        .parse::<f32>()
        .map(|n| crate::geometry::finite_or(n * scale, 0.0))
        .unwrap_or(0.0)
}

/// Padding around a layer's content, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    /// Top padding.
    pub top: f32,
    /// Right padding.
    pub right: f32,
    /// Bottom padding.
    pub bottom: f32,
    /// Left padding.
    pub left: f32,
}

impl Insets {
    /// Uniform insets.
    #[must_use]
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Vertical then horizontal insets, as in CSS `padding: v h`.
    #[must_use]
    pub const fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// Expand CSS shorthand components (1 to 4 values).
    #[must_use]
    pub fn from_components(values: &[f32]) -> Self {
        match *values {
            [] => Self::default(),
            [all] => Self::uniform(all),
            [v, h] => Self::symmetric(v, h),
            [top, h, bottom] => Self {
                top,
                right: h,
                bottom,
                left: h,
            },
            [top, right, bottom, left, ..] => Self {
                top,
                right,
                bottom,
                left,
            },
        }
    }

    /// Total horizontal padding.
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Total vertical padding.
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Font weight given either numerically or as a CSS keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontWeight {
    /// Numeric weight, 100–900.
    Numeric(u16),
    /// Keyword or numeric string (`"bold"`, `"600"`).
    Keyword(String),
}

impl FontWeight {
    /// Resolve to a numeric weight, or `None` for an unknown keyword.
    #[must_use]
    pub fn value(&self) -> Option<u16> {
        match self {
            Self::Numeric(n) => Some((*n).clamp(100, 900)),
            Self::Keyword(k) => match k.trim().to_ascii_lowercase().as_str() {
                "normal" => Some(400),
                "bold" => Some(700),
                "bolder" => Some(800),
                "lighter" => Some(300),
                other => other.parse::<u16>().ok().map(|n| n.clamp(100, 900)),
            },
        }
    }
}

/// Stored layer style. Every key is optional; unknown keys are dropped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerStyle {
    /// Foreground (text) color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Font size in root-relative units (`rem`).
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub font_size: Option<f32>,
    /// Font weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    /// Font family stack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Text alignment.
    #[serde(
        default,
        deserialize_with = "lenient_keyword",
        skip_serializing_if = "Option::is_none"
    )]
    pub text_align: Option<TextAlign>,
    /// Fill color behind the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Padding shorthand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<CssLength>,
    /// Corner radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<CssLength>,
    /// Case transform.
    #[serde(
        default,
        deserialize_with = "lenient_keyword",
        skip_serializing_if = "Option::is_none"
    )]
    pub text_transform: Option<TextTransform>,
    /// Line height multiplier.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub line_height: Option<f32>,
    /// Extra spacing between letters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<CssLength>,
    /// Rotation in degrees about the layer's centre.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub rotate: Option<f32>,
    /// Image fit.
    #[serde(
        default,
        deserialize_with = "lenient_keyword",
        skip_serializing_if = "Option::is_none"
    )]
    pub object_fit: Option<ObjectFit>,
}

impl LayerStyle {
    /// Fill every key from the defaults of `kind`.
    #[must_use]
    pub fn resolve(&self, kind: LayerKind) -> ResolvedStyle {
        let defaults = ResolvedStyle::defaults_for(kind);
        let font_size_rem = self
            .font_size
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(defaults.font_size_rem);
        let font_px = font_size_rem * ROOT_FONT_PX;

        ResolvedStyle {
            color: self.color.clone().unwrap_or(defaults.color),
            font_size_rem,
            font_weight: self
                .font_weight
                .as_ref()
                .and_then(FontWeight::value)
                .unwrap_or(defaults.font_weight),
            font_family: self.font_family.clone().unwrap_or(defaults.font_family),
            text_align: self.text_align.unwrap_or(defaults.text_align),
            background_color: self.background_color.clone().or(defaults.background_color),
            padding: self.padding.as_ref().map_or(defaults.padding, |p| {
                Insets::from_components(&p.components_px(font_px))
            }),
            border_radius: self
                .border_radius
                .as_ref()
                .map_or(defaults.border_radius, |r| r.to_px(font_px)),
            text_transform: self.text_transform.unwrap_or(defaults.text_transform),
            line_height: self
                .line_height
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(defaults.line_height),
            letter_spacing: self
                .letter_spacing
                .as_ref()
                .map_or(defaults.letter_spacing, |l| l.to_px(font_px)),
            rotate: self
                .rotate
                .filter(|v| v.is_finite())
                .unwrap_or(defaults.rotate),
            object_fit: self.object_fit.unwrap_or(defaults.object_fit),
        }
    }
}

/// A fully resolved style with no missing keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStyle {
    /// Foreground color.
    pub color: String,
    /// Font size in `rem`.
    pub font_size_rem: f32,
    /// Numeric font weight.
    pub font_weight: u16,
    /// Font family stack.
    pub font_family: String,
    /// Text alignment.
    pub text_align: TextAlign,
    /// Fill color, if any.
    pub background_color: Option<String>,
    /// Padding in pixels.
    pub padding: Insets,
    /// Corner radius in pixels.
    pub border_radius: f32,
    /// Case transform.
    pub text_transform: TextTransform,
    /// Line height multiplier.
    pub line_height: f32,
    /// Letter spacing in pixels.
    pub letter_spacing: f32,
    /// Rotation in degrees.
    pub rotate: f32,
    /// Image fit.
    pub object_fit: ObjectFit,
}

impl ResolvedStyle {
    /// Defaults for a layer type.
    #[must_use]
    pub fn defaults_for(kind: LayerKind) -> Self {
        let base = Self {
            color: "#ffffff".to_string(),
            font_size_rem: 2.0,
            font_weight: 400,
            font_family: "Inter, sans-serif".to_string(),
            text_align: TextAlign::Center,
            background_color: None,
            padding: Insets::default(),
            border_radius: 0.0,
            text_transform: TextTransform::None,
            line_height: 1.2,
            letter_spacing: 0.0,
            rotate: 0.0,
            object_fit: ObjectFit::Cover,
        };
        match kind {
            LayerKind::Text => base,
            LayerKind::Button => Self {
                font_size_rem: 1.25,
                font_weight: 600,
                background_color: Some("#2563eb".to_string()),
                padding: Insets::symmetric(12.0, 24.0),
                border_radius: 8.0,
                line_height: 1.0,
                ..base
            },
            LayerKind::Image => Self {
                object_fit: ObjectFit::Contain,
                ..base
            },
        }
    }

    /// Font size in pixels.
    #[must_use]
    pub fn font_px(&self) -> f32 {
        self.font_size_rem * ROOT_FONT_PX
    }
}

/// Deserialize an optional keyword, ignoring values outside the enum.
fn lenient_keyword<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!("Ignoring style value: {e}");
            None
        }
    }))
}

/// Deserialize an optional number that may arrive as a numeric string.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f32),
        Text(String),
    }

    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        NumberOrText::Number(n) => Some(n),
        NumberOrText::Text(t) => t
            .trim()
            .trim_end_matches("deg")
            .trim_end_matches("rem")
            .parse::<f32>()
            .ok(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keys_are_ignored() {
        let style: LayerStyle = serde_json::from_str(
            r##"{"color": "#ff0000", "boxShadow": "0 0 4px black", "fontSize": 3}"##,
        )
        .expect("parse");
        assert_eq!(style.color.as_deref(), Some("#ff0000"));
        assert_eq!(style.font_size, Some(3.0));

        let json = serde_json::to_string(&style).expect("serialize");
        assert!(!json.contains("boxShadow"));
    }

    #[test]
    fn test_unknown_keyword_falls_back_to_default() {
        let style: LayerStyle =
            serde_json::from_str(r#"{"textAlign": "diagonal", "objectFit": "cover"}"#)
                .expect("parse");
        assert_eq!(style.text_align, None);
        assert_eq!(style.object_fit, Some(ObjectFit::Cover));
        assert_eq!(
            style.resolve(LayerKind::Text).text_align,
            TextAlign::Center
        );
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let style: LayerStyle =
            serde_json::from_str(r#"{"rotate": "15deg", "fontSize": "2.5rem", "lineHeight": "1.4"}"#)
                .expect("parse");
        assert_eq!(style.rotate, Some(15.0));
        assert_eq!(style.font_size, Some(2.5));
        assert_eq!(style.line_height, Some(1.4));
    }

    #[test]
    fn test_button_defaults() {
        let resolved = LayerStyle::default().resolve(LayerKind::Button);
        assert_eq!(resolved.font_weight, 600);
        assert_eq!(resolved.background_color.as_deref(), Some("#2563eb"));
        assert_eq!(resolved.padding, Insets::symmetric(12.0, 24.0));
    }

    #[test]
    fn test_padding_shorthand() {
        let style = LayerStyle {
            padding: Some(CssLength::Text("1rem 2em".to_string())),
            font_size: Some(1.0),
            ..LayerStyle::default()
        };
        let resolved = style.resolve(LayerKind::Button);
        assert_eq!(resolved.padding, Insets::symmetric(16.0, 32.0));
    }

    #[test]
    fn test_font_weight_keywords() {
        assert_eq!(FontWeight::Keyword("bold".into()).value(), Some(700));
        assert_eq!(FontWeight::Keyword("650".into()).value(), Some(650));
        assert_eq!(FontWeight::Numeric(1200).value(), Some(900));
        assert_eq!(FontWeight::Keyword("heavy-ish".into()).value(), None);
    }

    #[test]
    fn test_non_finite_values_use_defaults() {
        let style = LayerStyle {
            font_size: Some(f32::NAN),
            rotate: Some(f32::INFINITY),
            ..LayerStyle::default()
        };
        let resolved = style.resolve(LayerKind::Text);
        assert!((resolved.font_size_rem - 2.0).abs() < f32::EPSILON);
        assert!(resolved.rotate.abs() < f32::EPSILON);
    }

    #[test]
    fn test_text_transform_capitalize() {
        assert_eq!(TextTransform::Capitalize.apply("shop the sale"), "Shop The Sale");
        assert_eq!(TextTransform::Uppercase.apply("go"), "GO");
    }
}

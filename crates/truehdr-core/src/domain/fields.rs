//! The well-known keys of the `[Values]` section.
//!
//! Each key is described by a [`Field`] (key name + value type).  Options
//! that can be switched off additionally carry the default written when they
//! are switched back on; those are [`ToggleField`]s.
//!
//! | Key                  | Type               | On-default |
//! |----------------------|--------------------|------------|
//! | `Quality`            | [`Quality`]        | –          |
//! | `HDRDisplayMode`     | [`HdrDisplayMode`] | –          |
//! | `HDRVisualization`   | [`HdrVisualization`] | –        |
//! | `PeakBrightness`     | `i32` (nits)       | 1000       |
//! | `Paperwhite`         | `i32`              | 50         |
//! | `Contrast`           | `f32`              | 0.85       |
//! | `Saturation`         | `f32`              | 1.10       |
//! | `Strength`           | `f32`              | 1.10       |
//! | `Gamma`              | `f32`              | 1.10       |
//! | `SDRBrightness`      | `i32` (nits)       | 150        |
//! | `EnableIndicatorHUD` | [`IndicatorHud`]   | `Off`      |

use std::fmt;
use std::marker::PhantomData;

use crate::domain::settings::{
    FieldError, FieldValue, HdrDisplayMode, HdrVisualization, IndicatorHud, Quality, Sentinel,
};
use crate::ini::document::IniDocument;

/// Section holding every setting the editor knows about.
pub const VALUES_SECTION: &str = "Values";

/// A typed key inside [`VALUES_SECTION`].
pub struct Field<T> {
    key: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.key).finish()
    }
}

impl<T> Field<T> {
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _value: PhantomData,
        }
    }

    /// The INI key name, e.g. `"PeakBrightness"`.
    pub const fn key(&self) -> &'static str {
        self.key
    }
}

impl<T: FieldValue> Field<T> {
    /// Raw text stored for this field, if present.
    pub fn raw<'a>(&self, doc: &'a IniDocument) -> Option<&'a str> {
        doc.get(VALUES_SECTION, self.key)
    }

    /// Reads and parses the field.
    ///
    /// # Errors
    ///
    /// [`FieldError::Missing`] when the key is absent,
    /// [`FieldError::Format`] when its text does not parse as `T`.
    pub fn read(&self, doc: &IniDocument) -> Result<T, FieldError> {
        let raw = self
            .raw(doc)
            .ok_or(FieldError::Missing { key: self.key })?;
        T::parse_raw(raw).ok_or_else(|| FieldError::Format {
            key: self.key,
            raw: raw.to_string(),
            expected: T::EXPECTED,
        })
    }

    /// Stores `value`, returning `false` if the field already holds it.
    ///
    /// The comparison is done on the parsed value as well as on the text,
    /// so `Contrast=1` is left alone when writing `1.0`.  A malformed or
    /// missing entry is overwritten.
    pub fn write(&self, doc: &mut IniDocument, value: T) -> bool {
        let rendered = value.to_raw();
        if let Some(raw) = self.raw(doc) {
            if raw == rendered || T::parse_raw(raw) == Some(value) {
                return false;
            }
        }
        doc.set(VALUES_SECTION, self.key, rendered)
    }
}

/// A field that is switched off by storing its sentinel.
///
/// The "enabled" flag is not stored anywhere; it is derived from the value.
pub struct ToggleField<T> {
    pub field: Field<T>,
    /// Written when the option is switched on.
    pub default: T,
}

impl<T: Copy> Clone for ToggleField<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Copy> Copy for ToggleField<T> {}

impl<T: fmt::Debug> fmt::Debug for ToggleField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToggleField")
            .field("key", &self.field.key)
            .field("default", &self.default)
            .finish()
    }
}

impl<T> ToggleField<T> {
    pub const fn new(key: &'static str, default: T) -> Self {
        Self {
            field: Field::new(key),
            default,
        }
    }

    pub const fn key(&self) -> &'static str {
        self.field.key
    }
}

impl<T: Sentinel> ToggleField<T> {
    /// Value to store for the given enabled state.
    pub fn value_for(&self, enabled: bool) -> T {
        if enabled {
            self.default
        } else {
            T::DISABLED
        }
    }

    /// `true` unless `value` is the sentinel.
    pub fn is_enabled(value: T) -> bool {
        value != T::DISABLED
    }
}

// ── Field table ───────────────────────────────────────────────────────────────

pub const QUALITY: Field<Quality> = Field::new("Quality");
pub const HDR_DISPLAY_MODE: Field<HdrDisplayMode> = Field::new("HDRDisplayMode");
pub const HDR_VISUALIZATION: Field<HdrVisualization> = Field::new("HDRVisualization");

pub const PEAK_BRIGHTNESS: ToggleField<i32> = ToggleField::new("PeakBrightness", 1000);
pub const PAPER_WHITE: ToggleField<i32> = ToggleField::new("Paperwhite", 50);
pub const CONTRAST: ToggleField<f32> = ToggleField::new("Contrast", 0.85);
pub const SATURATION: ToggleField<f32> = ToggleField::new("Saturation", 1.1);
pub const STRENGTH: ToggleField<f32> = ToggleField::new("Strength", 1.1);
pub const GAMMA: ToggleField<f32> = ToggleField::new("Gamma", 1.1);
pub const SDR_BRIGHTNESS: ToggleField<i32> = ToggleField::new("SDRBrightness", 150);
pub const INDICATOR_HUD: ToggleField<IndicatorHud> =
    ToggleField::new("EnableIndicatorHUD", IndicatorHud::Off);

/// Untyped handle to one of the well-known settings, for callers that pick
/// a setting by name at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Quality,
    HdrDisplayMode,
    HdrVisualization,
    PeakBrightness,
    PaperWhite,
    Contrast,
    Saturation,
    Strength,
    Gamma,
    SdrBrightness,
    IndicatorHud,
}

impl SettingKey {
    /// Every setting, in the order the tool's own file lists them.
    pub const ALL: [SettingKey; 11] = [
        SettingKey::Quality,
        SettingKey::HdrDisplayMode,
        SettingKey::HdrVisualization,
        SettingKey::PeakBrightness,
        SettingKey::PaperWhite,
        SettingKey::Contrast,
        SettingKey::Saturation,
        SettingKey::Strength,
        SettingKey::Gamma,
        SettingKey::SdrBrightness,
        SettingKey::IndicatorHud,
    ];

    /// The INI key name.
    pub fn ini_key(self) -> &'static str {
        match self {
            SettingKey::Quality => QUALITY.key(),
            SettingKey::HdrDisplayMode => HDR_DISPLAY_MODE.key(),
            SettingKey::HdrVisualization => HDR_VISUALIZATION.key(),
            SettingKey::PeakBrightness => PEAK_BRIGHTNESS.key(),
            SettingKey::PaperWhite => PAPER_WHITE.key(),
            SettingKey::Contrast => CONTRAST.key(),
            SettingKey::Saturation => SATURATION.key(),
            SettingKey::Strength => STRENGTH.key(),
            SettingKey::Gamma => GAMMA.key(),
            SettingKey::SdrBrightness => SDR_BRIGHTNESS.key(),
            SettingKey::IndicatorHud => INDICATOR_HUD.key(),
        }
    }

    /// `true` for settings that can be switched off with the `-1` sentinel.
    pub fn is_toggle(self) -> bool {
        !matches!(
            self,
            SettingKey::Quality | SettingKey::HdrDisplayMode | SettingKey::HdrVisualization
        )
    }

    /// Looks a setting up by INI key, ignoring case, `-` and `_`.
    ///
    /// `EnableIndicatorHUD` is also accepted as `IndicatorHUD`.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = normalize(name);
        Self::ALL.into_iter().find(|setting| {
            let key = normalize(setting.ini_key());
            key == wanted || key.strip_prefix("enable") == Some(wanted.as_str())
        })
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ini_key())
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Text-level operations over a [`SettingsStore`].
//!
//! The store speaks typed values; a command line speaks strings.  This module
//! resolves setting names, parses user input for the chosen setting and
//! formats current values for display.
//!
//! Accepted input, per kind of setting:
//!
//! | Setting kind        | Accepted values                                   |
//! |---------------------|---------------------------------------------------|
//! | mode enums          | label or variant name (`sdr-to-hdr`), or the code |
//! | integer / float     | a number ≥ 0, `on` (default), `off` or `-1`       |
//! | `EnableIndicatorHUD`| `on`/`1`, `off`/`0`, `unset`/`-1`                 |

use std::fmt;

use thiserror::Error;
use truehdr_core::domain::fields::{
    CONTRAST, GAMMA, HDR_DISPLAY_MODE, HDR_VISUALIZATION, INDICATOR_HUD, PAPER_WHITE,
    PEAK_BRIGHTNESS, QUALITY, SATURATION, SDR_BRIGHTNESS, STRENGTH,
};
use truehdr_core::{
    FieldValue, HdrDisplayMode, HdrVisualization, IndicatorHud, Quality, Sentinel, SettingKey,
    ToggleField,
};

use crate::application::settings_store::{SettingsStore, StoreError};

const HUD_CHOICES: [IndicatorHud; 3] = [IndicatorHud::Unset, IndicatorHud::Off, IndicatorHud::On];

/// Errors produced while interpreting a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown setting {0:?}")]
    UnknownSetting(String),

    #[error("invalid value {input:?} for {setting}: expected {expected}")]
    InvalidValue {
        setting: SettingKey,
        input: String,
        expected: &'static str,
    },

    #[error("{0} cannot be enabled or disabled")]
    NotToggleable(SettingKey),

    #[error("settings are not loaded")]
    NotLoaded,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Looks up a setting by its INI key, ignoring case, `-` and `_`.
pub fn resolve(name: &str) -> Result<SettingKey, CommandError> {
    SettingKey::from_name(name).ok_or_else(|| CommandError::UnknownSetting(name.to_string()))
}

fn ensure_loaded(store: &SettingsStore) -> Result<(), CommandError> {
    if store.loaded() {
        Ok(())
    } else {
        Err(CommandError::NotLoaded)
    }
}

// ── Display ───────────────────────────────────────────────────────────────────

fn choice_text<T: FieldValue + fmt::Display>(value: T) -> String {
    format!("{value} ({})", value.to_raw())
}

fn toggle_text<T: Sentinel>(value: T, shown: impl FnOnce(T) -> String) -> String {
    match value.into_option() {
        Some(value) => shown(value),
        None => "off (-1)".to_string(),
    }
}

fn loaded<T>(value: Option<T>) -> Result<T, CommandError> {
    value.ok_or(CommandError::NotLoaded)
}

/// Formats the current value of one setting.
///
/// # Errors
///
/// [`CommandError::NotLoaded`] before a successful load, or the store's
/// field error when the stored text is missing or malformed.
pub fn describe(store: &SettingsStore, key: SettingKey) -> Result<String, CommandError> {
    ensure_loaded(store)?;
    let int = |v: i32| v.to_string();
    let float = |v: f32| format!("{v:.2}");
    let text = match key {
        SettingKey::Quality => choice_text(loaded(store.quality()?)?),
        SettingKey::HdrDisplayMode => choice_text(loaded(store.hdr_display_mode()?)?),
        SettingKey::HdrVisualization => choice_text(loaded(store.hdr_visualization()?)?),
        SettingKey::PeakBrightness => toggle_text(store.peak_brightness()?, int),
        SettingKey::PaperWhite => toggle_text(store.paper_white()?, int),
        SettingKey::Contrast => toggle_text(store.contrast()?, float),
        SettingKey::Saturation => toggle_text(store.saturation()?, float),
        SettingKey::Strength => toggle_text(store.strength()?, float),
        SettingKey::Gamma => toggle_text(store.gamma()?, float),
        SettingKey::SdrBrightness => toggle_text(store.sdr_brightness()?, int),
        SettingKey::IndicatorHud => choice_text(loaded(store.indicator_hud()?)?),
    };
    Ok(text)
}

/// Describes every setting.  A malformed field does not hide the others.
pub fn snapshot(
    store: &SettingsStore,
) -> Result<Vec<(SettingKey, Result<String, CommandError>)>, CommandError> {
    ensure_loaded(store)?;
    Ok(SettingKey::ALL
        .into_iter()
        .map(|key| (key, describe(store, key)))
        .collect())
}

// ── Parsing ───────────────────────────────────────────────────────────────────

fn squash(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn parse_choice<T: FieldValue + fmt::Display>(choices: &[T], input: &str) -> Option<T> {
    let wanted = squash(input);
    choices
        .iter()
        .copied()
        .find(|choice| {
            squash(&choice.to_string()) == wanted || squash(&format!("{choice:?}")) == wanted
        })
        .or_else(|| T::parse_raw(input))
}

/// `on`/`off` keywords, else a number that is either `-1` or non-negative.
fn parse_toggle<T>(toggle: ToggleField<T>, input: &str, non_negative: fn(T) -> bool) -> Option<T>
where
    T: Sentinel,
{
    match squash(input).as_str() {
        "off" | "disable" | "disabled" => return Some(T::DISABLED),
        "on" | "enable" | "enabled" | "default" => return Some(toggle.default),
        _ => {}
    }
    T::parse_raw(input).filter(|value| *value == T::DISABLED || non_negative(*value))
}

fn int_toggle(toggle: ToggleField<i32>, key: SettingKey, input: &str) -> Result<i32, CommandError> {
    parse_toggle(toggle, input, |v| v >= 0)
        .ok_or_else(|| invalid(key, input, "a whole number >= 0, on, off or -1"))
}

fn float_toggle(
    toggle: ToggleField<f32>,
    key: SettingKey,
    input: &str,
) -> Result<f32, CommandError> {
    parse_toggle(toggle, input, |v| v >= 0.0)
        .ok_or_else(|| invalid(key, input, "a number >= 0, on, off or -1"))
}

fn invalid(setting: SettingKey, input: &str, expected: &'static str) -> CommandError {
    CommandError::InvalidValue {
        setting,
        input: input.to_string(),
        expected,
    }
}

/// Parses `input` for `key` and stores it.  Returns `true` if the value
/// changed.
///
/// # Errors
///
/// [`CommandError::NotLoaded`] before a successful load,
/// [`CommandError::InvalidValue`] when `input` does not fit the setting.
pub fn apply(store: &SettingsStore, key: SettingKey, input: &str) -> Result<bool, CommandError> {
    ensure_loaded(store)?;
    let changed = match key {
        SettingKey::Quality => {
            let value = parse_choice(&Quality::ALL, input)
                .ok_or_else(|| invalid(key, input, "low, medium, high or 0-2"))?;
            store.set(QUALITY, value)
        }
        SettingKey::HdrDisplayMode => {
            let value = parse_choice(&HdrDisplayMode::ALL, input).ok_or_else(|| {
                invalid(key, input, "sdr, sdr-to-hdr, sdr-hdr-split, hdr-sdr-split or 0-3")
            })?;
            store.set(HDR_DISPLAY_MODE, value)
        }
        SettingKey::HdrVisualization => {
            let value = parse_choice(&HdrVisualization::ALL, input)
                .ok_or_else(|| invalid(key, input, "disabled, overbright or 0-1"))?;
            store.set(HDR_VISUALIZATION, value)
        }
        SettingKey::PeakBrightness => {
            store.set(PEAK_BRIGHTNESS.field, int_toggle(PEAK_BRIGHTNESS, key, input)?)
        }
        SettingKey::PaperWhite => store.set(PAPER_WHITE.field, int_toggle(PAPER_WHITE, key, input)?),
        SettingKey::Contrast => store.set(CONTRAST.field, float_toggle(CONTRAST, key, input)?),
        SettingKey::Saturation => {
            store.set(SATURATION.field, float_toggle(SATURATION, key, input)?)
        }
        SettingKey::Strength => store.set(STRENGTH.field, float_toggle(STRENGTH, key, input)?),
        SettingKey::Gamma => store.set(GAMMA.field, float_toggle(GAMMA, key, input)?),
        SettingKey::SdrBrightness => {
            store.set(SDR_BRIGHTNESS.field, int_toggle(SDR_BRIGHTNESS, key, input)?)
        }
        SettingKey::IndicatorHud => {
            let value = parse_choice(&HUD_CHOICES, input)
                .ok_or_else(|| invalid(key, input, "on, off, unset, 1, 0 or -1"))?;
            store.set(INDICATOR_HUD.field, value)
        }
    };
    Ok(changed)
}

/// Enables or disables a toggleable setting.
///
/// # Errors
///
/// [`CommandError::NotToggleable`] for the mode settings,
/// [`CommandError::NotLoaded`] before a successful load.
pub fn set_enabled(
    store: &SettingsStore,
    key: SettingKey,
    enabled: bool,
) -> Result<bool, CommandError> {
    ensure_loaded(store)?;
    let changed = match key {
        SettingKey::Quality | SettingKey::HdrDisplayMode | SettingKey::HdrVisualization => {
            return Err(CommandError::NotToggleable(key))
        }
        SettingKey::PeakBrightness => store.set_peak_brightness_enabled(enabled),
        SettingKey::PaperWhite => store.set_paper_white_enabled(enabled),
        SettingKey::Contrast => store.set_contrast_enabled(enabled),
        SettingKey::Saturation => store.set_saturation_enabled(enabled),
        SettingKey::Strength => store.set_strength_enabled(enabled),
        SettingKey::Gamma => store.set_gamma_enabled(enabled),
        SettingKey::SdrBrightness => store.set_sdr_brightness_enabled(enabled),
        SettingKey::IndicatorHud => store.set_indicator_hud_enabled(enabled),
    };
    Ok(changed)
}

/// Flips between SDR and SDR-to-HDR; any split mode goes back to SDR.
///
/// Requests a debounced save whatever the auto-write setting.  Returns the
/// new mode.
pub fn toggle_display_mode(store: &SettingsStore) -> Result<HdrDisplayMode, CommandError> {
    let current = loaded(store.hdr_display_mode()?)?;
    let next = match current {
        HdrDisplayMode::Sdr => HdrDisplayMode::SdrToHdr,
        _ => HdrDisplayMode::Sdr,
    };
    store.set_hdr_display_mode(next);
    drop(store.save());
    Ok(next)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::settings_store::StoreOptions;
    use crate::infrastructure::storage::mock::MemorySettingsFile;

    const SAMPLE: &str = "[Values]\nQuality=0\nHDRDisplayMode=0\nHDRVisualization=0\n\
PeakBrightness=-1\nPaperwhite=-1\nContrast=-1\nSaturation=-1\nStrength=-1\nGamma=-1\n\
SDRBrightness=-1\nEnableIndicatorHUD=-1\n";

    fn store_with(text: &str) -> SettingsStore {
        let store = SettingsStore::new(
            Arc::new(MemorySettingsFile::new(text)),
            StoreOptions::default(),
        )
        .unwrap();
        store.load().unwrap();
        store
    }

    #[test]
    fn test_resolve_accepts_ini_keys_and_reports_unknown() {
        assert_eq!(resolve("quality").unwrap(), SettingKey::Quality);
        assert_eq!(resolve("Paper_White").unwrap(), SettingKey::PaperWhite);
        assert!(matches!(
            resolve("exposure"),
            Err(CommandError::UnknownSetting(name)) if name == "exposure"
        ));
    }

    #[tokio::test]
    async fn test_apply_enum_by_label_name_or_code() {
        let store = store_with(SAMPLE);

        apply(&store, SettingKey::Quality, "High").unwrap();
        assert_eq!(store.quality().unwrap(), Some(Quality::High));

        apply(&store, SettingKey::HdrDisplayMode, "sdr-hdr-split").unwrap();
        assert_eq!(
            store.hdr_display_mode().unwrap(),
            Some(HdrDisplayMode::SdrHdrSplit)
        );

        apply(&store, SettingKey::HdrDisplayMode, "SDR to HDR").unwrap();
        assert_eq!(
            store.hdr_display_mode().unwrap(),
            Some(HdrDisplayMode::SdrToHdr)
        );

        apply(&store, SettingKey::HdrVisualization, "1").unwrap();
        assert_eq!(
            store.hdr_visualization().unwrap(),
            Some(HdrVisualization::Overbright)
        );
    }

    #[tokio::test]
    async fn test_apply_rejects_out_of_range_enum_code() {
        let store = store_with(SAMPLE);

        let result = apply(&store, SettingKey::Quality, "7");

        assert!(matches!(
            result,
            Err(CommandError::InvalidValue {
                setting: SettingKey::Quality,
                ..
            })
        ));
        assert!(!store.dirty());
    }

    #[tokio::test]
    async fn test_apply_numeric_toggle_keywords() {
        let store = store_with(SAMPLE);

        apply(&store, SettingKey::PeakBrightness, "on").unwrap();
        assert_eq!(store.peak_brightness().unwrap(), 1000);

        apply(&store, SettingKey::PeakBrightness, "1200").unwrap();
        assert_eq!(store.peak_brightness().unwrap(), 1200);

        apply(&store, SettingKey::PeakBrightness, "off").unwrap();
        assert_eq!(store.peak_brightness().unwrap(), -1);

        apply(&store, SettingKey::Gamma, "2.2").unwrap();
        assert_eq!(store.raw(SettingKey::Gamma).as_deref(), Some("2.20"));

        apply(&store, SettingKey::Gamma, "-1").unwrap();
        assert_eq!(store.raw(SettingKey::Gamma).as_deref(), Some("-1"));
    }

    #[tokio::test]
    async fn test_apply_rejects_negative_values_other_than_sentinel() {
        let store = store_with(SAMPLE);

        assert!(apply(&store, SettingKey::SdrBrightness, "-5").is_err());
        assert!(apply(&store, SettingKey::Contrast, "-0.5").is_err());
        assert!(apply(&store, SettingKey::Contrast, "high").is_err());
    }

    #[tokio::test]
    async fn test_apply_indicator_hud_tri_state() {
        let store = store_with(SAMPLE);

        apply(&store, SettingKey::IndicatorHud, "on").unwrap();
        assert_eq!(store.indicator_hud().unwrap(), Some(IndicatorHud::On));
        apply(&store, SettingKey::IndicatorHud, "0").unwrap();
        assert_eq!(store.indicator_hud().unwrap(), Some(IndicatorHud::Off));
        apply(&store, SettingKey::IndicatorHud, "unset").unwrap();
        assert_eq!(store.indicator_hud().unwrap(), Some(IndicatorHud::Unset));
    }

    #[tokio::test]
    async fn test_describe_formats_each_kind() {
        let store = store_with(SAMPLE);
        store.set_contrast(0.85);
        store.set_sdr_brightness(200);

        assert_eq!(describe(&store, SettingKey::Quality).unwrap(), "Low (0)");
        assert_eq!(describe(&store, SettingKey::Contrast).unwrap(), "0.85");
        assert_eq!(describe(&store, SettingKey::SdrBrightness).unwrap(), "200");
        assert_eq!(describe(&store, SettingKey::Gamma).unwrap(), "off (-1)");
        assert_eq!(
            describe(&store, SettingKey::IndicatorHud).unwrap(),
            "Unset (-1)"
        );
    }

    #[tokio::test]
    async fn test_snapshot_keeps_going_past_malformed_field() {
        let store = store_with("[Values]\nQuality=2\nGamma=??\n");

        let lines = snapshot(&store).unwrap();

        assert_eq!(lines.len(), SettingKey::ALL.len());
        assert_eq!(lines[0].1.as_deref().unwrap(), "High (2)");
        let gamma = lines
            .iter()
            .find(|(key, _)| *key == SettingKey::Gamma)
            .unwrap();
        assert!(gamma.1.is_err());
    }

    #[tokio::test]
    async fn test_set_enabled_rejects_mode_settings() {
        let store = store_with(SAMPLE);

        assert!(matches!(
            set_enabled(&store, SettingKey::Quality, true),
            Err(CommandError::NotToggleable(SettingKey::Quality))
        ));
        assert!(set_enabled(&store, SettingKey::Strength, true).unwrap());
        assert_eq!(store.strength().unwrap(), 1.1);
    }

    #[tokio::test]
    async fn test_toggle_display_mode_cycles_through_sdr() {
        // Arrange
        let store = store_with(SAMPLE);

        // Act / Assert
        assert_eq!(toggle_display_mode(&store).unwrap(), HdrDisplayMode::SdrToHdr);
        assert_eq!(toggle_display_mode(&store).unwrap(), HdrDisplayMode::Sdr);

        store.set_hdr_display_mode(HdrDisplayMode::HdrSdrSplit);
        assert_eq!(toggle_display_mode(&store).unwrap(), HdrDisplayMode::Sdr);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_display_mode_saves_without_auto_write() {
        // Arrange
        let file = Arc::new(MemorySettingsFile::new(SAMPLE));
        let store = SettingsStore::new(file.clone(), StoreOptions::default()).unwrap();
        store.load().unwrap();

        // Act
        toggle_display_mode(&store).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(600)).await;

        // Assert
        assert_eq!(file.write_count(), 1);
        assert!(file.contents().unwrap().contains("HDRDisplayMode=1\n"));
        assert!(!store.dirty());
    }

    #[tokio::test]
    async fn test_commands_require_loaded_store() {
        let store = SettingsStore::new(
            Arc::new(MemorySettingsFile::new(SAMPLE)),
            StoreOptions::default(),
        )
        .unwrap();

        assert!(matches!(
            describe(&store, SettingKey::Quality),
            Err(CommandError::NotLoaded)
        ));
        assert!(matches!(
            apply(&store, SettingKey::Quality, "high"),
            Err(CommandError::NotLoaded)
        ));
        assert!(matches!(
            toggle_display_mode(&store),
            Err(CommandError::NotLoaded)
        ));
        assert!(matches!(snapshot(&store), Err(CommandError::NotLoaded)));
    }
}

//! Typed setting values and their raw string forms.
//!
//! Every value in `[Values]` is stored as text.  [`FieldValue`] is the
//! two-way conversion between that text and a Rust type:
//!
//! | Rust type          | Raw form                         |
//! |--------------------|----------------------------------|
//! | `i32`              | plain decimal (`1000`, `-1`)     |
//! | `f32`              | `0.85` when ≥ 0, `-1` when < 0   |
//! | `Quality` etc.     | the variant's integer code       |
//! | `IndicatorHud`     | `-1`, `0` or `1`                 |
//!
//! The float rule is asymmetric: the tool writes the "disabled"
//! sentinel as the bare integer `-1`, so a negative float must never come
//! out as `-1.00`.

use std::fmt;

use thiserror::Error;

/// Error raised when a stored value cannot be projected to its typed form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    /// The key is absent from the section.
    #[error("setting {key} is missing")]
    Missing { key: &'static str },

    /// The raw text does not parse as the expected type.
    #[error("setting {key} holds {raw:?}, expected {expected}")]
    Format {
        key: &'static str,
        raw: String,
        expected: &'static str,
    },
}

/// Conversion between a typed setting value and its raw INI text.
pub trait FieldValue: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Human-readable description used in [`FieldError::Format`].
    const EXPECTED: &'static str;

    /// Parses the raw INI text.  Surrounding whitespace is ignored.
    fn parse_raw(raw: &str) -> Option<Self>;

    /// Renders the value the way the tool expects to read it.
    fn to_raw(self) -> String;
}

/// A value type with a reserved "option disabled" value.
///
/// The file has no separate on/off keys; writing the sentinel is how an
/// option is switched off.
pub trait Sentinel: FieldValue {
    /// The stored value meaning "disabled" (`-1` in the file).
    const DISABLED: Self;

    /// `None` when the value is the sentinel.
    fn into_option(self) -> Option<Self> {
        if self == Self::DISABLED {
            None
        } else {
            Some(self)
        }
    }
}

impl FieldValue for i32 {
    const EXPECTED: &'static str = "an integer";

    fn parse_raw(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn to_raw(self) -> String {
        self.to_string()
    }
}

impl Sentinel for i32 {
    const DISABLED: Self = -1;
}

impl FieldValue for f32 {
    const EXPECTED: &'static str = "a decimal number";

    fn parse_raw(raw: &str) -> Option<Self> {
        raw.trim().parse::<f32>().ok().filter(|v| v.is_finite())
    }

    fn to_raw(self) -> String {
        if self < 0.0 {
            format!("{self:.0}")
        } else {
            format!("{self:.2}")
        }
    }
}

impl Sentinel for f32 {
    const DISABLED: Self = -1.0;
}

// ── Mode enums ────────────────────────────────────────────────────────────────

/// HDR processing quality.  Changes take effect after a game restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Quality {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::Low, Quality::Medium, Quality::High];
}

impl TryFrom<i32> for Quality {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Quality::Low),
            1 => Ok(Quality::Medium),
            2 => Ok(Quality::High),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Quality::Low => "Low",
            Quality::Medium => "Medium",
            Quality::High => "High",
        })
    }
}

/// How the game image is mapped to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum HdrDisplayMode {
    /// Plain SDR output; uses `SDRBrightness`.
    Sdr = 0,
    /// SDR content converted to HDR.
    SdrToHdr = 1,
    /// Left half SDR, right half HDR.
    SdrHdrSplit = 2,
    /// Left half HDR, right half SDR.
    HdrSdrSplit = 3,
}

impl HdrDisplayMode {
    pub const ALL: [HdrDisplayMode; 4] = [
        HdrDisplayMode::Sdr,
        HdrDisplayMode::SdrToHdr,
        HdrDisplayMode::SdrHdrSplit,
        HdrDisplayMode::HdrSdrSplit,
    ];
}

impl TryFrom<i32> for HdrDisplayMode {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(HdrDisplayMode::Sdr),
            1 => Ok(HdrDisplayMode::SdrToHdr),
            2 => Ok(HdrDisplayMode::SdrHdrSplit),
            3 => Ok(HdrDisplayMode::HdrSdrSplit),
            _ => Err(()),
        }
    }
}

impl fmt::Display for HdrDisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HdrDisplayMode::Sdr => "SDR",
            HdrDisplayMode::SdrToHdr => "SDR to HDR",
            HdrDisplayMode::SdrHdrSplit => "SDR/HDR Split",
            HdrDisplayMode::HdrSdrSplit => "HDR/SDR Split",
        })
    }
}

/// Debug overlay that highlights over-bright pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum HdrVisualization {
    Disabled = 0,
    Overbright = 1,
}

impl HdrVisualization {
    pub const ALL: [HdrVisualization; 2] = [HdrVisualization::Disabled, HdrVisualization::Overbright];
}

impl TryFrom<i32> for HdrVisualization {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(HdrVisualization::Disabled),
            1 => Ok(HdrVisualization::Overbright),
            _ => Err(()),
        }
    }
}

impl fmt::Display for HdrVisualization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HdrVisualization::Disabled => "Disabled",
            HdrVisualization::Overbright => "Overbright",
        })
    }
}

/// Tri-state switch for the on-screen indicator HUD.
///
/// `Unset` leaves the decision to the tool and is stored as the `-1`
/// sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum IndicatorHud {
    Unset = -1,
    Off = 0,
    On = 1,
}

impl TryFrom<i32> for IndicatorHud {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(IndicatorHud::Unset),
            0 => Ok(IndicatorHud::Off),
            1 => Ok(IndicatorHud::On),
            _ => Err(()),
        }
    }
}

impl fmt::Display for IndicatorHud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndicatorHud::Unset => "Unset",
            IndicatorHud::Off => "Off",
            IndicatorHud::On => "On",
        })
    }
}

impl Sentinel for IndicatorHud {
    const DISABLED: Self = IndicatorHud::Unset;
}

/// Parses the integer code of an enum-valued setting.
fn parse_code<T: TryFrom<i32>>(raw: &str) -> Option<T> {
    raw.trim().parse::<i32>().ok()?.try_into().ok()
}

impl FieldValue for Quality {
    const EXPECTED: &'static str = "a quality level (0-2)";

    fn parse_raw(raw: &str) -> Option<Self> {
        parse_code(raw)
    }

    fn to_raw(self) -> String {
        (self as i32).to_string()
    }
}

impl FieldValue for HdrDisplayMode {
    const EXPECTED: &'static str = "a display mode (0-3)";

    fn parse_raw(raw: &str) -> Option<Self> {
        parse_code(raw)
    }

    fn to_raw(self) -> String {
        (self as i32).to_string()
    }
}

impl FieldValue for HdrVisualization {
    const EXPECTED: &'static str = "a visualization mode (0-1)";

    fn parse_raw(raw: &str) -> Option<Self> {
        parse_code(raw)
    }

    fn to_raw(self) -> String {
        (self as i32).to_string()
    }
}

impl FieldValue for IndicatorHud {
    const EXPECTED: &'static str = "-1, 0 or 1";

    fn parse_raw(raw: &str) -> Option<Self> {
        parse_code(raw)
    }

    fn to_raw(self) -> String {
        (self as i32).to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

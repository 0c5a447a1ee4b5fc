//! Physical units and paper sizes.
//!
//! Paper is specified in millimetres ([`PhysicalSize`]) and laid out in PDF
//! points ([`DeviceSize`]). The conversion factor is fixed: 1 inch = 72 pt =
//! 25.4 mm.

use crate::error::PosterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MM_PER_INCH: f64 = 25.4;
pub const PT_PER_INCH: f64 = 72.0;
/// Points per millimetre (≈ 2.83465).
pub const PT_PER_MM: f64 = PT_PER_INCH / MM_PER_INCH;

/// Convert millimetres to points.
#[inline]
pub fn to_points(mm: f64) -> f64 {
    mm * PT_PER_MM
}

/// Convert points to millimetres.
#[inline]
pub fn to_millimeters(pt: f64) -> f64 {
    pt / PT_PER_MM
}

/// A paper size in millimetres. Both dimensions are finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSize {
    width_mm: f64,
    height_mm: f64,
}

impl PhysicalSize {
    pub fn new(width_mm: f64, height_mm: f64) -> Result<Self, PosterError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width_mm) || !valid(height_mm) {
            return Err(PosterError::InvalidPaperFormat {
                input: format!("custom:{width_mm},{height_mm}"),
            });
        }
        Ok(Self {
            width_mm,
            height_mm,
        })
    }

    pub fn width_mm(&self) -> f64 {
        self.width_mm
    }

    pub fn height_mm(&self) -> f64 {
        self.height_mm
    }

    /// The same size in PDF points.
    pub fn to_device(&self) -> DeviceSize {
        DeviceSize {
            width: to_points(self.width_mm),
            height: to_points(self.height_mm),
        }
    }
}

/// A page size in PDF points. Always derived from a [`PhysicalSize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceSize {
    pub width: f64,
    pub height: f64,
}

/// Target paper for the exported tiles.
///
/// Parsed from an identifier string: a case-sensitive preset name (`A4`,
/// `A3`, `Letter`, `Legal`) or `custom:<W>,<H>` with both values in
/// millimetres (the `custom:` prefix is case-insensitive). An empty
/// identifier means `A4`.
///
/// ```rust
/// use poster_tiler::PaperSize;
///
/// let a3: PaperSize = "A3".parse().unwrap();
/// assert_eq!(a3.physical_size().width_mm(), 297.0);
///
/// let custom: PaperSize = "custom:100,150".parse().unwrap();
/// assert_eq!(custom.to_string(), "custom:100,150");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    /// 8.5 × 11 in
    Letter,
    /// 8.5 × 14 in
    Legal,
    Custom(PhysicalSize),
}

impl PaperSize {
    /// The four named presets, in the order they are listed to users.
    pub const PRESETS: [PaperSize; 4] = [
        PaperSize::A4,
        PaperSize::A3,
        PaperSize::Letter,
        PaperSize::Legal,
    ];

    /// Resolve a paper identifier.
    ///
    /// # Errors
    /// * [`PosterError::InvalidPaperFormat`] — a `custom` identifier with a
    ///   missing colon or comma, an extra field, or a value that is not a
    ///   positive number.
    /// * [`PosterError::UnsupportedPaperSize`] — anything else unknown.
    pub fn parse(input: &str) -> Result<Self, PosterError> {
        let id = input.trim();
        if id.is_empty() {
            return Ok(PaperSize::A4);
        }

        if let Some(preset) = Self::PRESETS.iter().find(|p| p.preset_name() == Some(id)) {
            return Ok(*preset);
        }

        let is_custom = id
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("custom"));
        if is_custom {
            return id[6..]
                .strip_prefix(':')
                .and_then(parse_custom)
                .map(PaperSize::Custom)
                .ok_or_else(|| PosterError::InvalidPaperFormat {
                    input: id.to_string(),
                });
        }

        Err(PosterError::UnsupportedPaperSize {
            input: id.to_string(),
        })
    }

    /// Preset identifier, or `None` for a custom size.
    pub fn preset_name(&self) -> Option<&'static str> {
        match self {
            PaperSize::A4 => Some("A4"),
            PaperSize::A3 => Some("A3"),
            PaperSize::Letter => Some("Letter"),
            PaperSize::Legal => Some("Legal"),
            PaperSize::Custom(_) => None,
        }
    }

    pub fn physical_size(&self) -> PhysicalSize {
        let (width_mm, height_mm) = match self {
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Custom(size) => return *size,
        };
        PhysicalSize {
            width_mm,
            height_mm,
        }
    }

    pub fn device_size(&self) -> DeviceSize {
        self.physical_size().to_device()
    }
}

/// `<W>,<H>` → size; `None` on any malformation.
fn parse_custom(rest: &str) -> Option<PhysicalSize> {
    let mut fields = rest.split(',');
    let width = fields.next()?.trim().parse::<f64>().ok()?;
    let height = fields.next()?.trim().parse::<f64>().ok()?;
    if fields.next().is_some() {
        return None;
    }
    PhysicalSize::new(width, height).ok()
}

impl FromStr for PaperSize {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaperSize::parse(s)
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperSize::Custom(size) => {
                write!(f, "custom:{},{}", size.width_mm(), size.height_mm())
            }
            preset => f.write_str(preset.preset_name().unwrap_or("A4")),
        }
    }
}

impl From<PaperSize> for String {
    fn from(paper: PaperSize) -> Self {
        paper.to_string()
    }
}

impl TryFrom<String> for PaperSize {
    type Error = PosterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PaperSize::parse(&value)
    }
}

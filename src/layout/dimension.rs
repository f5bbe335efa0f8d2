//! Paper dimensions and unit conversion
//!
//! Page sizes are pre-computed per paper size for a fixed set of screen
//! densities. A density outside the table degrades to [`FALLBACK_PAGE_SIZE`]
//! rather than failing.

use serde::{Deserialize, Serialize};

/// Millimetres per inch
pub const MM_PER_INCH: f64 = 25.4;

/// CSS reference density: `1dppx` is 96dpi
pub const CSS_DPI: f64 = 96.0;

/// Page size used when the screen density has no table entry
pub const FALLBACK_PAGE_SIZE: PageSize = PageSize {
    width: 404,
    height: 404,
};

/// Supported paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaperSize {
    #[default]
    Letter,
    Legal,
}

impl PaperSize {
    /// Parse a paper size name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "LETTER" => Some(PaperSize::Letter),
            "LEGAL" => Some(PaperSize::Legal),
            _ => None,
        }
    }

    /// Portrait pixel dimensions at the given density bucket, if tabulated
    pub fn dimensions(self, dpi: Dpi) -> Option<PageSize> {
        let (width, height) = match (self, dpi) {
            (PaperSize::Letter, Dpi::Dpi72) => (612, 791),
            (PaperSize::Letter, Dpi::Dpi96) => (816, 1054),
            (PaperSize::Letter, Dpi::Dpi120) => (1020, 1298),
            (PaperSize::Letter, Dpi::Dpi150) => (1276, 1648),
            (PaperSize::Letter, Dpi::Dpi200) => (1701, 2197),
            (PaperSize::Letter, Dpi::Dpi300) => (2551, 3295),
            (PaperSize::Legal, Dpi::Dpi72) => (612, 1009),
            (PaperSize::Legal, Dpi::Dpi96) => (816, 1346),
            (PaperSize::Legal, Dpi::Dpi120) => (1020, 1682),
            (PaperSize::Legal, Dpi::Dpi150) => (1271, 2102),
            (PaperSize::Legal, Dpi::Dpi200) => return None,
            (PaperSize::Legal, Dpi::Dpi300) => (2551, 4205),
        };
        Some(PageSize { width, height })
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Parse an orientation name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "PORTRAIT" => Some(Orientation::Portrait),
            "LANDSCAPE" => Some(Orientation::Landscape),
            _ => None,
        }
    }
}

/// Screen density buckets with tabulated page sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dpi {
    Dpi72,
    Dpi96,
    Dpi120,
    Dpi150,
    Dpi200,
    Dpi300,
}

impl Dpi {
    pub const ALL: [Dpi; 6] = [
        Dpi::Dpi72,
        Dpi::Dpi96,
        Dpi::Dpi120,
        Dpi::Dpi150,
        Dpi::Dpi200,
        Dpi::Dpi300,
    ];

    pub fn value(self) -> u32 {
        match self {
            Dpi::Dpi72 => 72,
            Dpi::Dpi96 => 96,
            Dpi::Dpi120 => 120,
            Dpi::Dpi150 => 150,
            Dpi::Dpi200 => 200,
            Dpi::Dpi300 => 300,
        }
    }

    /// Match a measured density to a bucket.
    ///
    /// The measurement is rounded to a whole DPI first so that pixel ratios
    /// such as `1.25` (which may come back as `119.99999`) still hit `120`.
    pub fn from_measured(dpi: f64) -> Option<Self> {
        if !dpi.is_finite() {
            return None;
        }
        let rounded = dpi.round();
        Dpi::ALL
            .into_iter()
            .find(|bucket| f64::from(bucket.value()) == rounded)
    }
}

/// Page dimensions in whole pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

impl PageSize {
    /// Swap axes for landscape output
    pub fn oriented(self, orientation: Orientation) -> Self {
        match orientation {
            Orientation::Portrait => self,
            Orientation::Landscape => Self {
                width: self.height,
                height: self.width,
            },
        }
    }
}

/// Unit a margin is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginUnit {
    #[default]
    Cm,
    Mm,
}

/// A physical page margin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub value: f64,
    pub unit: MarginUnit,
}

impl Default for Margin {
    fn default() -> Self {
        Self::cm(1.5)
    }
}

impl Margin {
    pub fn cm(value: f64) -> Self {
        Self {
            value,
            unit: MarginUnit::Cm,
        }
    }

    pub fn mm(value: f64) -> Self {
        Self {
            value,
            unit: MarginUnit::Mm,
        }
    }

    pub fn to_mm(self) -> f64 {
        match self.unit {
            MarginUnit::Cm => self.value * 10.0,
            MarginUnit::Mm => self.value,
        }
    }

    /// Margin in pixels at `dpi`, rounded up so content never bleeds into it
    pub fn to_px(self, dpi: f64) -> u32 {
        mm_to_px(self.to_mm(), dpi).ceil().max(0.0) as u32
    }
}

/// Pixel dimensions of `paper` at `dpi`, oriented.
///
/// Densities without a table entry yield [`FALLBACK_PAGE_SIZE`].
pub fn page_size(paper: PaperSize, orientation: Orientation, dpi: f64) -> PageSize {
    let size = match Dpi::from_measured(dpi).and_then(|bucket| paper.dimensions(bucket)) {
        Some(size) => size,
        None => {
            log::warn!(
                "no {:?} page size for {} dpi, using {}x{} fallback",
                paper,
                dpi,
                FALLBACK_PAGE_SIZE.width,
                FALLBACK_PAGE_SIZE.height
            );
            FALLBACK_PAGE_SIZE
        }
    };
    size.oriented(orientation)
}

pub fn mm_to_px(mm: f64, dpi: f64) -> f64 {
    mm * (dpi / MM_PER_INCH)
}

pub fn px_to_mm(px: f64, dpi: f64) -> f64 {
    px / (dpi / MM_PER_INCH)
}

/// Screen density derived from the host's device pixel ratio
pub fn screen_dpi(device_pixel_ratio: f64) -> f64 {
    device_pixel_ratio * CSS_DPI
}

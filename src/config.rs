//! Report table configuration

use crate::error::{Error, Result};
use crate::layout::{Margin, MarginUnit, Orientation, OverflowAllowance, PackOptions, PaperSize};
use serde::{Deserialize, Serialize};

/// Construction parameters for a [`crate::ReportTable`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
    /// Identifier of the source table element
    pub table_id: String,
    pub paper_size: PaperSize,
    /// Folio of the first generated page
    pub starting_folio: u32,
    pub orientation: Orientation,
    /// Page margin, in `margin_unit`
    pub margin: f64,
    pub margin_unit: MarginUnit,
    /// Fraction of the page budget rows may fill, `0..=1`
    pub gap_tolerance: Option<f64>,
    pub overflow: OverflowAllowance,
    /// Class for generated page containers. `None` uses the default class
    /// and injects its style rule.
    pub class_name: Option<String>,
    /// Restore the document if the print completion signal has not arrived
    /// after this many milliseconds
    pub print_timeout_ms: Option<f64>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            table_id: String::new(),
            paper_size: PaperSize::Letter,
            starting_folio: 1,
            orientation: Orientation::Portrait,
            margin: 1.5,
            margin_unit: MarginUnit::Cm,
            gap_tolerance: None,
            overflow: OverflowAllowance::AverageRow,
            class_name: None,
            print_timeout_ms: None,
        }
    }
}

impl ReportConfig {
    pub fn new(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON configuration object
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_paper_size(mut self, paper_size: PaperSize) -> Self {
        self.paper_size = paper_size;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_starting_folio(mut self, folio: u32) -> Self {
        self.starting_folio = folio;
        self
    }

    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin.value;
        self.margin_unit = margin.unit;
        self
    }

    pub fn with_gap_tolerance(mut self, tolerance: f64) -> Self {
        self.gap_tolerance = Some(tolerance);
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowAllowance) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_print_timeout_ms(mut self, timeout_ms: f64) -> Self {
        self.print_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn margin(&self) -> Margin {
        Margin {
            value: self.margin,
            unit: self.margin_unit,
        }
    }

    pub fn pack_options(&self) -> PackOptions {
        PackOptions {
            overflow: self.overflow,
            gap_tolerance: self.gap_tolerance,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.table_id.trim().is_empty() {
            return Err(Error::InvalidConfig("table id must not be empty".into()));
        }
        if self.starting_folio == 0 {
            return Err(Error::InvalidConfig("starting folio must be at least 1".into()));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "margin must be a non-negative number, got {}",
                self.margin
            )));
        }
        if let Some(tolerance) = self.gap_tolerance {
            if !(0.0..=1.0).contains(&tolerance) {
                return Err(Error::InvalidConfig(format!(
                    "gap tolerance must be within 0..=1, got {}",
                    tolerance
                )));
            }
        }
        if let Some(timeout) = self.print_timeout_ms {
            if !timeout.is_finite() || timeout < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "print timeout must be a non-negative number, got {}",
                    timeout
                )));
            }
        }
        if matches!(&self.class_name, Some(class) if class.trim().is_empty()) {
            return Err(Error::InvalidConfig("class name must not be empty".into()));
        }
        Ok(())
    }
}

//! Greedy row packing
//!
//! Rows are admitted front to back while the running height stays within the
//! page limit. The first row of a page is always admitted, so every call on a
//! non-empty queue makes progress even when that row overflows the page.

use serde::{Deserialize, Serialize};

/// Anything with a measured height in whole pixels
pub trait RowMetric {
    fn height(&self) -> u32;
}

impl RowMetric for u32 {
    fn height(&self) -> u32 {
        *self
    }
}

/// Extra room granted on top of the strict page budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverflowAllowance {
    /// Grow the budget by the mean height of the pending rows, so a page
    /// slightly overflows instead of leaving a near-empty one behind
    #[default]
    AverageRow,
    /// Strict budget
    None,
}

/// Tuning for [`RowPacker`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PackOptions {
    pub overflow: OverflowAllowance,
    /// Fraction of the (allowance-inflated) budget rows may fill, `0..=1`.
    /// `None` behaves as `1`.
    pub gap_tolerance: Option<f64>,
}

impl PackOptions {
    fn fill_fraction(&self) -> f64 {
        let tolerance = self
            .gap_tolerance
            .filter(|t| t.is_finite())
            .map_or(1.0, |t| t.clamp(0.0, 1.0));
        1.0 - (1.0 - tolerance)
    }
}

/// Packs a queue of rows into one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowPacker {
    /// Full page height
    capacity: u32,
    /// Height taken by the repeated header and both margins
    reserved: u32,
    options: PackOptions,
}

impl RowPacker {
    pub fn new(capacity: u32, reserved: u32, options: PackOptions) -> Self {
        Self {
            capacity,
            reserved,
            options,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    pub fn options(&self) -> &PackOptions {
        &self.options
    }

    /// Room left for rows once the header and margins are reserved
    pub fn budget(&self) -> u32 {
        self.capacity.saturating_sub(self.reserved)
    }

    /// Admission limit for the next page cut from `rows`
    pub fn limit_for<T: RowMetric>(&self, rows: &[T]) -> u64 {
        let allowance = match self.options.overflow {
            OverflowAllowance::AverageRow if !rows.is_empty() => {
                let total: u64 = rows.iter().map(|r| u64::from(r.height())).sum();
                total as f64 / rows.len() as f64
            }
            _ => 0.0,
        };

        let limit = (f64::from(self.budget()) + allowance) * self.options.fill_fraction();
        limit.ceil().max(0.0) as u64
    }

    /// Split `rows` into the rows placed on the next page and the rest.
    ///
    /// An empty queue yields two empty slices.
    pub fn pack<'a, T: RowMetric>(&self, rows: &'a [T]) -> (&'a [T], &'a [T]) {
        let Some(first) = rows.first() else {
            return rows.split_at(0);
        };

        let limit = self.limit_for(rows);
        let mut running = u64::from(first.height());
        let mut placed = 1;

        for row in &rows[1..] {
            let next = running + u64::from(row.height());
            if next > limit {
                break;
            }
            running = next;
            placed += 1;
        }

        log::debug!(
            "packed {} of {} rows ({}px of {}px limit)",
            placed,
            rows.len(),
            running,
            limit
        );

        rows.split_at(placed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packer(capacity: u32, reserved: u32) -> RowPacker {
        RowPacker::new(capacity, reserved, PackOptions::default())
    }

    #[test]
    fn test_average_row_allowance() {
        // budget 860, plus one average row of 300 = 1160
        let rows = [300u32, 300, 300, 300];
        let (placed, remaining) = packer(1000, 140).pack(&rows);
        assert_eq!(placed, &[300, 300, 300]);
        assert_eq!(remaining, &[300]);

        let (placed, remaining) = packer(1000, 140).pack(remaining);
        assert_eq!(placed, &[300]);
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_strict_budget() {
        let options = PackOptions {
            overflow: OverflowAllowance::None,
            gap_tolerance: None,
        };
        let rows = [300u32, 300, 300, 300];
        let (placed, _) = RowPacker::new(1000, 140, options).pack(&rows);
        assert_eq!(placed.len(), 2);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let options = PackOptions {
            overflow: OverflowAllowance::None,
            gap_tolerance: None,
        };
        let rows = [400u32, 460, 1];
        let (placed, remaining) = RowPacker::new(1000, 140, options).pack(&rows);
        assert_eq!(placed, &[400, 460]);
        assert_eq!(remaining, &[1]);
    }

    #[test]
    fn test_gap_tolerance_shrinks_fill() {
        let options = PackOptions {
            overflow: OverflowAllowance::None,
            gap_tolerance: Some(0.5),
        };
        let rows = [100u32; 10];
        let packer = RowPacker::new(1000, 0, options);
        assert_eq!(packer.limit_for(&rows), 500);
        assert_eq!(packer.pack(&rows).0.len(), 5);
    }

    #[test]
    fn test_gap_tolerance_is_clamped() {
        let options = PackOptions {
            overflow: OverflowAllowance::None,
            gap_tolerance: Some(7.0),
        };
        let packer = RowPacker::new(1000, 0, options);
        assert_eq!(packer.limit_for(&[1u32]), 1000);
    }

    #[test]
    fn test_empty_queue() {
        let rows: [u32; 0] = [];
        let (placed, remaining) = packer(1000, 140).pack(&rows);
        assert!(placed.is_empty());
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_oversized_row_placed_alone() {
        let rows = [2000u32, 10];
        let (placed, remaining) = packer(1000, 140).pack(&rows);
        assert_eq!(placed, &[2000]);
        assert_eq!(remaining, &[10]);
    }

    #[test]
    fn test_reservation_larger_than_page() {
        let rows = [10u32, 10];
        let packer = RowPacker::new(
            100,
            500,
            PackOptions {
                overflow: OverflowAllowance::None,
                gap_tolerance: None,
            },
        );
        assert_eq!(packer.budget(), 0);
        assert_eq!(packer.pack(&rows).0.len(), 1);
    }
}

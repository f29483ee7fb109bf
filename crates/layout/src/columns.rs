//! Table column sizing.
//!
//! Columns start from fixed proportional weights per role, are scaled to the
//! available table width, then clamped to per-role minimum floors. Width
//! reclaimed by clamping is deliberately not redistributed: the table may
//! overshoot its nominal width slightly, which downstream rendering
//! tolerates, and every column stays readable.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    SeqNo,
    Category,
    Description,
    Quantity,
    Unit,
    UnitPrice,
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 7] = [
        ColumnRole::SeqNo,
        ColumnRole::Category,
        ColumnRole::Description,
        ColumnRole::Quantity,
        ColumnRole::Unit,
        ColumnRole::UnitPrice,
        ColumnRole::Amount,
    ];

    /// Proportional base weight before scaling.
    pub fn base_weight(&self) -> f32 {
        match self {
            ColumnRole::SeqNo => 6.0,
            ColumnRole::Category => 12.0,
            ColumnRole::Description => 34.0,
            ColumnRole::Quantity => 10.0,
            ColumnRole::Unit => 8.0,
            ColumnRole::UnitPrice => 14.0,
            ColumnRole::Amount => 16.0,
        }
    }

    /// Minimum readable width in points. Clamping floor.
    pub fn min_width(&self) -> f32 {
        match self {
            ColumnRole::SeqNo => 24.0,
            ColumnRole::Category => 48.0,
            ColumnRole::Description => 90.0,
            ColumnRole::Quantity => 40.0,
            ColumnRole::Unit => 32.0,
            ColumnRole::UnitPrice => 56.0,
            ColumnRole::Amount => 64.0,
        }
    }

    /// Numeric columns are right-aligned, unit is centered, the rest left.
    pub fn alignment(&self) -> Alignment {
        match self {
            ColumnRole::Quantity | ColumnRole::UnitPrice | ColumnRole::Amount => Alignment::Right,
            ColumnRole::Unit => Alignment::Center,
            _ => Alignment::Left,
        }
    }

    pub fn header_label(&self) -> &'static str {
        match self {
            ColumnRole::SeqNo => "No.",
            ColumnRole::Category => "Category",
            ColumnRole::Description => "Description",
            ColumnRole::Quantity => "Qty",
            ColumnRole::Unit => "Unit",
            ColumnRole::UnitPrice => "Unit Price",
            ColumnRole::Amount => "Amount",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnLayout {
    pub role: ColumnRole,
    pub width: f32,
    pub align: Alignment,
}

/// Computes column widths for the given available table width.
///
/// `sum(width)` equals `available_width` unless floors kick in, in which
/// case the total overshoots by the clamped slack.
pub fn compute_columns(available_width: f32) -> Vec<ColumnLayout> {
    let weight_sum: f32 = ColumnRole::ALL.iter().map(|r| r.base_weight()).sum();
    let scale = available_width / weight_sum;

    ColumnRole::ALL
        .iter()
        .map(|role| {
            let scaled = role.base_weight() * scale;
            ColumnLayout {
                role: *role,
                width: scaled.max(role.min_width()),
                align: role.alignment(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_sum_to_available_width_when_no_floor_applies() {
        let columns = compute_columns(515.0);
        let total: f32 = columns.iter().map(|c| c.width).sum();
        assert!((total - 515.0).abs() < 0.01, "total was {total}");
    }

    #[test]
    fn no_column_falls_below_its_floor() {
        for width in [120.0_f32, 300.0, 515.0, 900.0] {
            for col in compute_columns(width) {
                assert!(
                    col.width >= col.role.min_width(),
                    "{:?} below floor at table width {width}",
                    col.role
                );
            }
        }
    }

    #[test]
    fn clamped_slack_is_not_redistributed() {
        // Narrow enough that every column clamps: the total equals the sum
        // of the floors, overshooting the nominal width.
        let columns = compute_columns(100.0);
        let total: f32 = columns.iter().map(|c| c.width).sum();
        let floor_sum: f32 = ColumnRole::ALL.iter().map(|r| r.min_width()).sum();
        assert!((total - floor_sum).abs() < 0.01);
        assert!(total > 100.0);
    }

    #[test]
    fn numeric_columns_right_align_and_unit_centers() {
        let columns = compute_columns(515.0);
        for col in columns {
            let expected = match col.role {
                ColumnRole::Quantity | ColumnRole::UnitPrice | ColumnRole::Amount => {
                    Alignment::Right
                }
                ColumnRole::Unit => Alignment::Center,
                _ => Alignment::Left,
            };
            assert_eq!(col.align, expected);
        }
    }
}

//! Panel health map: defects laid out on an approximate panel grid.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::defect::{Defect, Severity};
use crate::types::DbId;

/// Upper bound on the number of grid columns.
pub const MAX_MAP_COLUMNS: u32 = 20;

/// Approximate grid shape for an installation of `panel_count` panels,
/// as `(rows, cols)`. Aims for a 3:2 aspect, capped at [`MAX_MAP_COLUMNS`].
pub fn grid_dimensions(panel_count: u32) -> (u32, u32) {
    if panel_count == 0 {
        return (0, 0);
    }
    let cols = ((panel_count as f64 * 1.5).sqrt().ceil() as u32).clamp(1, MAX_MAP_COLUMNS);
    let rows = panel_count.div_ceil(cols);
    (rows, cols)
}

/// One panel cell that carries at least one defect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelCell {
    pub row: u32,
    pub col: u32,
    /// Worst severity among the cell's defects.
    pub severity: Severity,
    pub defect_ids: Vec<DbId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelMap {
    pub rows: u32,
    pub cols: u32,
    pub panel_count: u32,
    /// Occupied cells in row-major order.
    pub cells: Vec<PanelCell>,
    /// Defects with no location, or a location outside the grid.
    pub unplaced: Vec<DbId>,
}

impl PanelMap {
    pub fn build(panel_count: u32, defects: &[Defect]) -> Self {
        let (rows, cols) = grid_dimensions(panel_count);
        let mut cells: BTreeMap<(u32, u32), PanelCell> = BTreeMap::new();
        let mut unplaced = Vec::new();

        for defect in defects {
            let placed = defect.location.filter(|loc| {
                loc.row < rows && loc.col < cols && loc.row * cols + loc.col < panel_count
            });
            let Some(loc) = placed else {
                unplaced.push(defect.id);
                continue;
            };

            let cell = cells.entry((loc.row, loc.col)).or_insert_with(|| PanelCell {
                row: loc.row,
                col: loc.col,
                severity: defect.severity,
                defect_ids: Vec::new(),
            });
            if defect.severity.rank() > cell.severity.rank() {
                cell.severity = defect.severity;
            }
            cell.defect_ids.push(defect.id);
        }

        Self {
            rows,
            cols,
            panel_count,
            cells: cells.into_values().collect(),
            unplaced,
        }
    }
}

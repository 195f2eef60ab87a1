//! Grid rebuild
//!
//! Composites mouse heat and element dwell into the spatial grid. Sources are
//! combined with `max`, never summed.

use crate::catalog::TrackedElement;
use crate::grid::SpatialGrid;
use crate::heat::MouseHeatMap;
use std::collections::HashMap;

/// Dwell below this does not paint its element
pub const MIN_PAINTED_DWELL: f64 = 0.1;

/// Element dwell is painted at this fraction of its score
pub const DWELL_PAINT_SCALE: f64 = 0.8;

/// Row-bucketed lookup of tracked rectangles for point occlusion tests
struct RowIndex<'a> {
    cell_size: f64,
    rows: HashMap<i64, Vec<&'a TrackedElement>>,
}

impl<'a> RowIndex<'a> {
    fn build(elements: &'a [TrackedElement], cell_size: f64) -> Self {
        let mut rows: HashMap<i64, Vec<&'a TrackedElement>> = HashMap::new();
        for element in elements {
            let start = (element.rect.top / cell_size).floor() as i64;
            let end = (element.rect.bottom() / cell_size).ceil() as i64;
            for row in start..=end {
                rows.entry(row).or_default().push(element);
            }
        }
        Self { cell_size, rows }
    }

    fn covers(&self, x: f64, y: f64) -> bool {
        let row = (y / self.cell_size).floor() as i64;
        self.rows
            .get(&row)
            .map(|candidates| candidates.iter().any(|e| e.rect.contains_point(x, y)))
            .unwrap_or(false)
    }
}

/// Zero the grid and composite both sources into it
pub fn rebuild_grid(
    grid: &mut SpatialGrid,
    elements: &[TrackedElement],
    heat: &MouseHeatMap,
    influence_radius: f64,
) {
    grid.fill_zero();
    if grid.is_empty() {
        return;
    }
    diffuse_heat(grid, elements, heat, influence_radius);
    paint_dwell(grid, elements);
}

fn diffuse_heat(
    grid: &mut SpatialGrid,
    elements: &[TrackedElement],
    heat: &MouseHeatMap,
    influence_radius: f64,
) {
    let cell = grid.cell_size();
    let index = RowIndex::build(elements, cell);
    let reach = (influence_radius / cell).ceil() as i64;
    let rows = grid.rows() as i64;
    let cols = grid.cols() as i64;

    for ((col, row), intensity) in heat.iter() {
        let source_x = col as f64 * cell + cell / 2.0;
        let source_y = row as f64 * cell + cell / 2.0;

        for r in (row - reach).max(0)..=(row + reach).min(rows - 1) {
            for c in (col - reach).max(0)..=(col + reach).min(cols - 1) {
                let cell_x = c as f64 * cell + cell / 2.0;
                let cell_y = r as f64 * cell + cell / 2.0;
                if !index.covers(cell_x, cell_y) {
                    continue;
                }
                let distance = ((cell_x - source_x).powi(2) + (cell_y - source_y).powi(2)).sqrt();
                if distance < influence_radius {
                    let falloff = (1.0 - distance / influence_radius).powi(2);
                    grid.raise(r as usize, c as usize, (intensity * falloff) as f32);
                }
            }
        }
    }
}

fn paint_dwell(grid: &mut SpatialGrid, elements: &[TrackedElement]) {
    let cell = grid.cell_size();
    let clamp_row = |v: f64| (v.max(0.0) as usize).min(grid.rows());
    let clamp_col = |v: f64| (v.max(0.0) as usize).min(grid.cols());

    let mut spans = Vec::new();
    for element in elements.iter().filter(|e| e.dwell_score >= MIN_PAINTED_DWELL) {
        let rect = element.rect;
        spans.push((
            clamp_row((rect.top / cell).floor())..clamp_row((rect.bottom() / cell).ceil()),
            clamp_col((rect.left / cell).floor())..clamp_col((rect.right() / cell).ceil()),
            (element.dwell_score * DWELL_PAINT_SCALE) as f32,
        ));
    }

    for (rows, cols, value) in spans {
        for r in rows {
            for c in cols.clone() {
                grid.raise(r, c, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeId, Rect};

    fn element(node: u64, rect: Rect, dwell: f64) -> TrackedElement {
        TrackedElement {
            node: NodeId(node),
            tag: "P".to_string(),
            rect,
            dwell_score: dwell,
            priority_weight: 1.0,
            visible: true,
            style: None,
        }
    }

    #[test]
    fn test_dwell_fills_covering_cells() {
        let mut grid = SpatialGrid::new(10.0, 100.0, 100.0);
        let elements = vec![element(1, Rect::new(10.0, 20.0, 25.0, 15.0), 2.0)];
        rebuild_grid(&mut grid, &elements, &MouseHeatMap::new(10.0, 5.0), 150.0);

        // rows 1..3, cols 2..5
        assert_eq!(grid.get(1, 2), Some(1.6));
        assert_eq!(grid.get(2, 4), Some(1.6));
        assert_eq!(grid.get(3, 2), Some(0.0));
        assert_eq!(grid.get(1, 5), Some(0.0));
        assert_eq!(grid.summary().active_cells, 6);
    }

    #[test]
    fn test_low_dwell_is_not_painted() {
        let mut grid = SpatialGrid::new(10.0, 100.0, 100.0);
        let elements = vec![element(1, Rect::new(0.0, 0.0, 50.0, 50.0), 0.05)];
        rebuild_grid(&mut grid, &elements, &MouseHeatMap::new(10.0, 5.0), 150.0);
        assert_eq!(grid.summary().active_cells, 0);
    }

    #[test]
    fn test_heat_outside_elements_is_suppressed() {
        let mut grid = SpatialGrid::new(10.0, 200.0, 200.0);
        let mut heat = MouseHeatMap::new(10.0, 5.0);
        heat.add_heat(105.0, 105.0, 5.0);

        rebuild_grid(&mut grid, &[], &heat, 150.0);
        assert_eq!(grid.summary().active_cells, 0);

        let elements = vec![element(1, Rect::new(100.0, 100.0, 10.0, 10.0), 0.0)];
        rebuild_grid(&mut grid, &elements, &heat, 150.0);
        assert_eq!(grid.get(10, 10), Some(5.0));
        assert_eq!(grid.get(0, 0), Some(0.0));
    }

    #[test]
    fn test_heat_falls_off_with_distance() {
        let mut grid = SpatialGrid::new(10.0, 400.0, 100.0);
        let mut heat = MouseHeatMap::new(10.0, 5.0);
        heat.add_heat(5.0, 5.0, 4.0);
        let elements = vec![element(1, Rect::new(0.0, 0.0, 400.0, 10.0), 0.0)];

        rebuild_grid(&mut grid, &elements, &heat, 100.0);
        // 50px away: (1 - 0.5)^2 = 0.25
        assert_eq!(grid.get(0, 5), Some(1.0));
        // 100px away is outside the radius
        assert_eq!(grid.get(0, 10), Some(0.0));
    }

    #[test]
    fn test_sources_combine_with_max() {
        let mut grid = SpatialGrid::new(10.0, 100.0, 100.0);
        let mut heat = MouseHeatMap::new(10.0, 5.0);
        heat.add_heat(15.0, 15.0, 3.0);
        let elements = vec![element(1, Rect::new(10.0, 10.0, 10.0, 10.0), 5.0)];

        rebuild_grid(&mut grid, &elements, &heat, 150.0);
        assert_eq!(grid.get(1, 1), Some(4.0));

        heat.clear();
        heat.add_heat(15.0, 15.0, 5.0);
        let weak = vec![element(1, Rect::new(10.0, 10.0, 10.0, 10.0), 1.0)];
        rebuild_grid(&mut grid, &weak, &heat, 150.0);
        assert_eq!(grid.get(1, 1), Some(5.0));
    }
}

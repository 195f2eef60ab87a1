//! Mouse heat tracker
//!
//! Sparse, decaying heat keyed by grid cell. Heat is anchored to pointer activity
//! rather than to any element.

use std::collections::HashMap;

/// Integer cell coordinate `(col, row)`
pub type CellKey = (i64, i64);

/// Sparse map of cell → heat intensity
#[derive(Debug, Clone, Default)]
pub struct MouseHeatMap {
    cell_size: f64,
    cap: f64,
    cells: HashMap<CellKey, f64>,
}

impl MouseHeatMap {
    pub fn new(cell_size: f64, cap: f64) -> Self {
        Self {
            cell_size,
            cap,
            cells: HashMap::new(),
        }
    }

    /// Cell key for a document point
    pub fn key_for(&self, x: f64, y: f64) -> CellKey {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }

    /// Add heat at a document point, capped
    pub fn add_heat(&mut self, x: f64, y: f64, strength: f64) {
        let key = self.key_for(x, y);
        let cap = self.cap;
        let entry = self.cells.entry(key).or_insert(0.0);
        *entry = (*entry + strength).min(cap);
    }

    /// Multiply every entry by `factor`, dropping entries that fall below `floor`
    pub fn decay_tick(&mut self, factor: f64, floor: f64) {
        self.cells.retain(|_, heat| {
            *heat *= factor;
            *heat >= floor
        });
    }

    pub fn get(&self, key: CellKey) -> Option<f64> {
        self.cells.get(&key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellKey, f64)> + '_ {
        self.cells.iter().map(|(&k, &v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_then_decay() {
        let mut heat = MouseHeatMap::new(15.0, 5.0);
        heat.add_heat(100.0, 200.0, 2.5);
        assert_eq!(heat.get((6, 13)), Some(2.5));

        heat.decay_tick(0.96, 0.1);
        let value = heat.get((6, 13)).unwrap();
        assert!((value - 2.4).abs() < 1e-12);
    }

    #[test]
    fn test_add_heat_is_capped() {
        let mut heat = MouseHeatMap::new(15.0, 5.0);
        heat.add_heat(10.0, 10.0, 3.0);
        heat.add_heat(12.0, 14.0, 3.0);
        assert_eq!(heat.len(), 1);
        assert_eq!(heat.get((0, 0)), Some(5.0));
    }

    #[test]
    fn test_entries_below_floor_are_removed() {
        let mut heat = MouseHeatMap::new(15.0, 5.0);
        heat.add_heat(0.0, 0.0, 0.2);

        let mut previous = 0.2;
        let mut ticks = 0;
        while let Some(value) = heat.get((0, 0)) {
            assert!(value < previous || ticks == 0);
            assert!(value >= 0.1);
            previous = value;
            heat.decay_tick(0.96, 0.1);
            ticks += 1;
        }
        // 0.2 * 0.96^17 < 0.1 <= 0.2 * 0.96^16
        assert_eq!(ticks, 17);
        assert!(heat.is_empty());
    }

    #[test]
    fn test_negative_coordinates_floor() {
        let heat = MouseHeatMap::new(15.0, 5.0);
        assert_eq!(heat.key_for(-1000.0, -1000.0), (-67, -67));
    }
}

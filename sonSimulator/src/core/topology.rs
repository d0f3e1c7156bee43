//! Staggered hexagonal layout of base stations.
//!
//! Even rows hold `cols` stations offset by half a column, odd rows hold
//! `cols + 1` stations aligned to column boundaries. Stations are stored in
//! row-major order and [`HexGrid::index_of`] inverts that order exactly.

use tracing::debug;

use crate::config::constants::MAX_NEIGHBORS;
use crate::config::simulation_config::{ConfigError, SimulationConfig};
use crate::models::base_station::{BaseStation, BaseStationId};
use crate::models::coordinate::Coordinate;
use crate::utils::logging::{self, OperationCategory};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexGrid {
    rows: usize,
    cols: usize,
    window_size: f64,
}

impl HexGrid {
    pub fn new(rows: usize, cols: usize, window_size: f64) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyGrid { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            window_size,
        })
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        Self::new(config.grid_rows, config.grid_cols, config.window_size)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row_len(&self, row: usize) -> usize {
        if row % 2 == 0 {
            self.cols
        } else {
            self.cols + 1
        }
    }

    pub fn station_count(&self) -> usize {
        let even_rows = (self.rows + 1) / 2;
        let odd_rows = self.rows / 2;
        even_rows * self.cols + odd_rows * (self.cols + 1)
    }

    /// Arena index of the station at `(row, col)`, or `None` when the cell
    /// lies outside the grid.
    pub fn index_of(&self, row: isize, col: isize) -> Option<usize> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.rows || col >= self.row_len(row) {
            return None;
        }
        let even_rows_before = (row + 1) / 2;
        let odd_rows_before = row / 2;
        Some(even_rows_before * self.cols + odd_rows_before * (self.cols + 1) + col)
    }

    pub fn position(&self, row: usize, col: usize) -> Coordinate {
        let h_spacing = self.window_size / self.cols as f64;
        let v_spacing = self.window_size / self.rows as f64;
        let x = if row % 2 == 0 {
            (col as f64 + 0.5) * h_spacing
        } else {
            col as f64 * h_spacing
        };
        let y = (row as f64 + 0.5) * v_spacing;
        Coordinate::new(x, y)
    }

    /// Cells adjacent to `(row, col)`: above-left, above-right, left, right,
    /// below-left, below-right. Cells may lie outside the grid.
    pub fn neighbor_cells(&self, row: usize, col: usize) -> [(isize, isize); MAX_NEIGHBORS] {
        let (r, c) = (row as isize, col as isize);
        // Even rows sit half a column right of the odd rows around them.
        let (left, right) = if row % 2 == 0 { (c, c + 1) } else { (c - 1, c) };
        [
            (r - 1, left),
            (r - 1, right),
            (r, c - 1),
            (r, c + 1),
            (r + 1, left),
            (r + 1, right),
        ]
    }

    /// Creates every station, then links each one to its in-grid neighbours.
    pub fn build(&self, config: &SimulationConfig) -> Vec<BaseStation> {
        let _timing = logging::start_timing("build_topology", OperationCategory::Topology);

        let mut stations = Vec::with_capacity(self.station_count());
        for row in 0..self.rows {
            for col in 0..self.row_len(row) {
                let id = BaseStationId(stations.len());
                stations.push(BaseStation::new(
                    id,
                    self.position(row, col),
                    config.default_power,
                    config.min_power,
                    config.max_power,
                ));
            }
        }

        for row in 0..self.rows {
            for col in 0..self.row_len(row) {
                let Some(index) = self.index_of(row as isize, col as isize) else {
                    continue;
                };
                for (n_row, n_col) in self.neighbor_cells(row, col) {
                    if let Some(neighbor) = self.index_of(n_row, n_col) {
                        stations[index].add_neighbor(BaseStationId(neighbor));
                    }
                }
            }
        }

        debug!(
            rows = self.rows,
            cols = self.cols,
            stations = stations.len(),
            "Built hexagonal topology"
        );
        stations
    }
}

//! Terminal map projection.
//!
//! Equirectangular projection around the viewport center, scaled so the whole
//! search radius fits the canvas. Terminal cells are roughly twice as tall as
//! they are wide, so one row spans twice the distance of one column.

use crate::domain::Coordinate;

const KM_PER_DEGREE: f64 = 111.32;

/// Distance the resolved position must move before the map re-centers.
pub const RECENTER_THRESHOLD_KM: f64 = 0.05;

/// Maps coordinates to canvas cells. `(0, 0)` is the top-left cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    center: Coordinate,
    km_per_col: f64,
    width: usize,
    height: usize,
}

impl Projection {
    /// Frames a circle of `radius_km` around `center` on a `width` x `height` canvas.
    #[must_use]
    pub fn framing(center: Coordinate, radius_km: f64, width: usize, height: usize) -> Self {
        let diameter = (2.0 * radius_km).max(f64::EPSILON);
        let by_width = diameter / width.max(1) as f64;
        let by_height = diameter / (2 * height.max(1)) as f64;

        Self {
            center,
            km_per_col: by_width.max(by_height),
            width,
            height,
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Canvas cell of `coordinate`, or `None` when it falls outside the canvas.
    #[must_use]
    pub fn project(&self, coordinate: Coordinate) -> Option<(usize, usize)> {
        let (dx_km, dy_km) = self.offset_km(coordinate);
        let x = (self.width as f64 / 2.0 + dx_km / self.km_per_col).floor();
        let y = (self.height as f64 / 2.0 - dy_km / (2.0 * self.km_per_col)).floor();

        let inside = x >= 0.0 && y >= 0.0 && x < self.width as f64 && y < self.height as f64;
        inside.then(|| (x as usize, y as usize))
    }

    /// Cells whose center lies on the circle of `radius_km` around the center.
    #[must_use]
    pub fn ring(&self, radius_km: f64) -> Vec<(usize, usize)> {
        let tolerance = self.km_per_col;
        let mut cells = Vec::new();

        for y in 0..self.height {
            for x in 0..self.width {
                let dx = (x as f64 + 0.5 - self.width as f64 / 2.0) * self.km_per_col;
                let dy = (y as f64 + 0.5 - self.height as f64 / 2.0) * 2.0 * self.km_per_col;
                if ((dx * dx + dy * dy).sqrt() - radius_km).abs() < tolerance {
                    cells.push((x, y));
                }
            }
        }
        cells
    }

    fn offset_km(&self, coordinate: Coordinate) -> (f64, f64) {
        let mut dlon = coordinate.longitude() - self.center.longitude();
        if dlon > 180.0 {
            dlon -= 360.0;
        } else if dlon < -180.0 {
            dlon += 360.0;
        }
        let dlat = coordinate.latitude() - self.center.latitude();

        (
            dlon * KM_PER_DEGREE * self.center.latitude().to_radians().cos(),
            dlat * KM_PER_DEGREE,
        )
    }
}

/// Whether moving the viewport from `current` to `candidate` is worth a re-frame.
#[must_use]
pub fn is_material_move(current: Option<Coordinate>, candidate: Coordinate) -> bool {
    current.map_or(true, |c| c.distance_km(&candidate) > RECENTER_THRESHOLD_KM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_FALLBACK;

    #[test]
    fn center_lands_mid_canvas() {
        let p = Projection::framing(DEFAULT_FALLBACK, 50.0, 40, 20);
        assert_eq!(p.project(DEFAULT_FALLBACK), Some((20, 10)));
    }

    #[test]
    fn north_is_up_and_east_is_right() {
        let p = Projection::framing(DEFAULT_FALLBACK, 10.0, 40, 20);
        let north = Coordinate::new(37.80, -122.4194).unwrap();
        let east = Coordinate::new(37.7749, -122.38).unwrap();

        let (_, north_y) = p.project(north).unwrap();
        let (east_x, _) = p.project(east).unwrap();
        assert!(north_y < 10);
        assert!(east_x > 20);
    }

    #[test]
    fn far_points_are_off_canvas() {
        let p = Projection::framing(DEFAULT_FALLBACK, 5.0, 40, 20);
        let la = Coordinate::new(34.05, -118.24).unwrap();
        assert_eq!(p.project(la), None);
    }

    #[test]
    fn radius_ring_fits_the_canvas() {
        let p = Projection::framing(DEFAULT_FALLBACK, 50.0, 60, 20);
        let ring = p.ring(50.0);
        assert!(!ring.is_empty());
        assert!(ring.iter().all(|&(x, y)| x < 60 && y < 20));
    }

    #[test]
    fn small_moves_do_not_recenter() {
        let nudged = Coordinate::new(37.7751, -122.4194).unwrap();
        assert!(is_material_move(None, DEFAULT_FALLBACK));
        assert!(!is_material_move(Some(DEFAULT_FALLBACK), nudged));
        assert!(is_material_move(Some(DEFAULT_FALLBACK), Coordinate::new(37.8, -122.4).unwrap()));
    }
}

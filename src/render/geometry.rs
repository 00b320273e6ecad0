//! Shared geometry calculations for annotations
//!
//! Constants and math used by both the live overlay preview and the commit
//! into the persistent buffer, so a committed stroke matches its preview.

/// Arrow geometry constants
pub mod arrow {
    /// Length of each arrowhead line in pixels
    pub const HEAD_LENGTH: f32 = 15.0;
    /// Arrowhead angle from shaft in radians (30 degrees)
    pub const HEAD_ANGLE: f32 = std::f32::consts::FRAC_PI_6;

    /// Calculate arrow head points given start, end, and head length
    /// Returns (head1_x, head1_y, head2_x, head2_y) for the two head lines
    pub fn head_points(
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
        head_length: f32,
    ) -> (f32, f32, f32, f32) {
        let angle = (end_y - start_y).atan2(end_x - start_x);

        let head1_x = end_x - head_length * (angle - HEAD_ANGLE).cos();
        let head1_y = end_y - head_length * (angle - HEAD_ANGLE).sin();
        let head2_x = end_x - head_length * (angle + HEAD_ANGLE).cos();
        let head2_y = end_y - head_length * (angle + HEAD_ANGLE).sin();

        (head1_x, head1_y, head2_x, head2_y)
    }
}

/// Shape (rectangle/circle) geometry constants
pub mod shape {
    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Normalize min/max coordinates from arbitrary start/end points
#[inline]
pub fn normalize_rect(x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32, f32, f32) {
    let (min_x, max_x) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    let (min_y, max_y) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    (min_x, min_y, max_x, max_y)
}

/// Calculate ellipse center and radii from bounding box
#[inline]
pub fn ellipse_from_bounds(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> (f32, f32, f32, f32) {
    let cx = (min_x + max_x) * 0.5;
    let cy = (min_y + max_y) * 0.5;
    let rx = ((max_x - min_x) * 0.5).max(1.0);
    let ry = ((max_y - min_y) * 0.5).max(1.0);
    (cx, cy, rx, ry)
}

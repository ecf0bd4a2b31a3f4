/// Orbit camera: three fixed-point rotation angles plus a zoom scale
use crate::config::CameraConfig;

/// Fixed-point angle units per degree
pub const UNITS_PER_DEGREE: i32 = 16;

/// One full turn in angle units; angles live in `[0, FULL_TURN)`
pub const FULL_TURN: i32 = 360 * UNITS_PER_DEGREE;

/// Wrap any angle into `[0, FULL_TURN)`.
///
/// Same result as repeatedly adding or subtracting a full turn, for inputs of
/// any magnitude.
pub fn normalize(angle: i64) -> i32 {
    // rem_euclid with a positive modulus is always in [0, FULL_TURN)
    angle.rem_euclid(i64::from(FULL_TURN)) as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Rotation about X, Y and Z in fixed-point units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Orientation {
    x: i32,
    y: i32,
    z: i32,
}

impl Orientation {
    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self {
            x: normalize(x),
            y: normalize(y),
            z: normalize(z),
        }
    }

    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn degrees(&self, axis: Axis) -> f32 {
        self.get(axis) as f32 / UNITS_PER_DEGREE as f32
    }

    fn slot(&mut self, axis: Axis) -> &mut i32 {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

/// Which pair of axes a drag rotates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Vertical motion turns X, horizontal motion turns Y
    Primary,
    /// Vertical motion turns X, horizontal motion turns Z
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    /// Scroll forward, magnify
    Away,
    /// Scroll backward, shrink
    Toward,
}

/// Camera state mutated by user input.
///
/// Every mutator returns `true` when the change is visible and a redraw
/// should be requested.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    orientation: Orientation,
    scale: f32,
    initial: Orientation,
    sensitivity: i32,
    zoom_step: f32,
    min_scale: Option<f32>,
}

impl OrbitCamera {
    pub fn new(config: &CameraConfig) -> Self {
        let [x, y, z] = config.initial_rotation;
        let initial = Orientation::new(x, y, z);
        Self {
            orientation: initial,
            scale: 1.0,
            initial,
            sensitivity: config.drag_sensitivity,
            zoom_step: config.zoom_step,
            min_scale: config.min_scale,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn rotation(&self, axis: Axis) -> i32 {
        self.orientation.get(axis)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Set one angle, wrapped into range. Unchanged values request nothing.
    pub fn set_rotation(&mut self, axis: Axis, proposed: i64) -> bool {
        let angle = normalize(proposed);
        let slot = self.orientation.slot(axis);
        if *slot == angle {
            return false;
        }
        *slot = angle;
        true
    }

    /// Rotate by a mouse delta in screen units
    pub fn apply_drag(&mut self, dx: i32, dy: i32, mode: DragMode) -> bool {
        let step = i64::from(self.sensitivity);
        let horizontal = match mode {
            DragMode::Primary => Axis::Y,
            DragMode::Secondary => Axis::Z,
        };

        let x = i64::from(self.rotation(Axis::X)) + step * i64::from(dy);
        let h = i64::from(self.rotation(horizontal)) + step * i64::from(dx);

        let changed_x = self.set_rotation(Axis::X, x);
        let changed_h = self.set_rotation(horizontal, h);
        changed_x || changed_h
    }

    pub fn apply_zoom(&mut self, direction: ZoomDirection) -> bool {
        let scale = match direction {
            ZoomDirection::Away => self.scale + self.zoom_step,
            ZoomDirection::Toward => self.scale - self.zoom_step,
        };
        self.scale = match self.min_scale {
            Some(min) => scale.max(min),
            None => scale,
        };
        true
    }

    /// Restore the initial orientation and unit scale
    pub fn reset(&mut self) -> bool {
        let changed = self.orientation != self.initial || self.scale != 1.0;
        self.orientation = self.initial;
        self.scale = 1.0;
        changed
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at_origin() -> OrbitCamera {
        OrbitCamera::new(&CameraConfig {
            initial_rotation: [0, 0, 0],
            ..CameraConfig::default()
        })
    }

    #[test]
    fn test_normalize_known_values() {
        assert_eq!(normalize(0), 0);
        assert_eq!(normalize(5760), 0);
        assert_eq!(normalize(-16), 5744);
        assert_eq!(normalize(11520), 0);
        assert_eq!(normalize(5759), 5759);
        assert_eq!(normalize(-5760 * 3 - 1), 5759);
    }

    #[test]
    fn test_normalize_range_and_idempotence() {
        let samples = [
            i64::MIN,
            i64::MIN + 1,
            -1_000_000_007,
            -5761,
            -1,
            1,
            5761,
            123_456_789,
            i64::MAX,
        ];
        for n in samples {
            let once = normalize(n);
            assert!((0..FULL_TURN).contains(&once), "normalize({}) = {}", n, once);
            assert_eq!(normalize(i64::from(once)), once);
        }
    }

    #[test]
    fn test_primary_drag() {
        let mut camera = camera_at_origin();
        assert!(camera.apply_drag(10, 5, DragMode::Primary));
        assert_eq!(camera.rotation(Axis::X), 40);
        assert_eq!(camera.rotation(Axis::Y), 80);
        assert_eq!(camera.rotation(Axis::Z), 0);
    }

    #[test]
    fn test_secondary_drag() {
        let mut camera = camera_at_origin();
        assert!(camera.apply_drag(-3, 2, DragMode::Secondary));
        assert_eq!(camera.rotation(Axis::X), 16);
        assert_eq!(camera.rotation(Axis::Y), 0);
        assert_eq!(camera.rotation(Axis::Z), FULL_TURN - 24);
    }

    #[test]
    fn test_drag_full_turn_is_noop() {
        let mut camera = camera_at_origin();
        // 720 px * 8 = one full turn
        assert!(!camera.apply_drag(720, 720, DragMode::Primary));
        assert!(!camera.apply_drag(0, 0, DragMode::Secondary));
    }

    #[test]
    fn test_huge_drag_does_not_overflow() {
        let mut camera = camera_at_origin();
        camera.apply_drag(i32::MAX, i32::MIN, DragMode::Primary);
        assert!((0..FULL_TURN).contains(&camera.rotation(Axis::X)));
        assert!((0..FULL_TURN).contains(&camera.rotation(Axis::Y)));
    }

    #[test]
    fn test_set_rotation_unchanged_requests_nothing() {
        let mut camera = OrbitCamera::default();
        let current = camera.rotation(Axis::Y);
        assert!(!camera.set_rotation(Axis::Y, i64::from(current)));
        assert!(!camera.set_rotation(Axis::Y, i64::from(current) + i64::from(FULL_TURN)));
        assert!(camera.set_rotation(Axis::Y, i64::from(current) + 1));
    }

    #[test]
    fn test_default_orientation() {
        let camera = OrbitCamera::default();
        assert_eq!(camera.rotation(Axis::X), 2440);
        assert_eq!(camera.rotation(Axis::Y), 2160);
        assert_eq!(camera.rotation(Axis::Z), 0);
        assert!((camera.orientation().degrees(Axis::X) - 152.5).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_accumulates() {
        let mut camera = OrbitCamera::default();
        for _ in 0..3 {
            assert!(camera.apply_zoom(ZoomDirection::Away));
        }
        assert!((camera.scale() - 1.3).abs() < 1e-5);
        assert!(camera.apply_zoom(ZoomDirection::Toward));
        assert!((camera.scale() - 1.2).abs() < 1e-5);
    }

    #[test]
    fn test_zoom_unbounded_by_default() {
        let mut camera = OrbitCamera::default();
        for _ in 0..15 {
            camera.apply_zoom(ZoomDirection::Toward);
        }
        assert!(camera.scale() < 0.0);
    }

    #[test]
    fn test_zoom_clamped_with_min_scale() {
        let mut camera = OrbitCamera::new(&CameraConfig {
            min_scale: Some(0.5),
            ..CameraConfig::default()
        });
        for _ in 0..10 {
            assert!(camera.apply_zoom(ZoomDirection::Toward));
        }
        assert!((camera.scale() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_reset() {
        let mut camera = OrbitCamera::default();
        assert!(!camera.reset());
        camera.apply_drag(3, 4, DragMode::Primary);
        camera.apply_zoom(ZoomDirection::Away);
        assert!(camera.reset());
        assert_eq!(camera.orientation(), Orientation::new(2440, 2160, 0));
        assert_eq!(camera.scale(), 1.0);
    }
}

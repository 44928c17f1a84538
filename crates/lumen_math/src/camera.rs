use crate::{rotate_axis, Ray};
use glam::{Mat4, Vec3, Vec4};

/// Projection model used by both the rasterizer and the ray generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    Perspective,
    Orthographic,
}

/// Interactive camera shared by rasterization and ray tracing.
///
/// The camera frame is `right` (u), `up` (v) and `view_dir` (w). Camera
/// space has x along u, y along v and z along the view direction, so points
/// in front of the camera have positive depth. The world→camera and
/// projection matrices are cached and rebuilt whenever a parameter changes.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    right: Vec3,
    up: Vec3,
    view_dir: Vec3,

    projection: Projection,
    fov: f32,    // Vertical field of view in radians
    aspect: f32, // width / height
    near: f32,
    far: f32,

    image_width: u32,
    image_height: u32,

    // Cached matrices
    world_view: Mat4,
    view_world: Mat4,
    projection_matrix: Mat4,
}

impl Camera {
    /// Create a camera at the origin looking down -Z with Y up.
    pub fn new() -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            right: Vec3::X,
            up: Vec3::Y,
            view_dir: Vec3::NEG_Z,
            projection: Projection::Perspective,
            fov: 60.0_f32.to_radians(),
            aspect: 1.0,
            near: 1.0,
            far: 30.0,
            image_width: 512,
            image_height: 512,
            world_view: Mat4::IDENTITY,
            view_world: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        };
        camera.update_world_view();
        camera.update_projection();
        camera
    }

    /// Place the camera at `eye` looking towards `target`.
    ///
    /// `up` is only a hint for the up direction and must not be collinear
    /// with `target - eye`; that case is not checked and leaves a NaN basis.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.position = eye;
        self.view_dir = (target - eye).normalize();
        self.right = self.view_dir.cross(up).normalize();
        self.up = self.right.cross(self.view_dir).normalize();
        self.update_world_view();
    }

    /// Set the vertical field of view in radians. Must be > 0.
    pub fn set_fov(&mut self, fov: f32) {
        debug_assert!(fov > 0.0);
        self.fov = fov;
        self.update_projection();
    }

    /// Update aspect ratio (e.g., on window resize). Must be > 0.
    pub fn set_aspect(&mut self, aspect: f32) {
        debug_assert!(aspect > 0.0);
        self.aspect = aspect;
        self.update_projection();
    }

    /// Set the near and far clip distances. Requires `0 < near < far`.
    pub fn set_depth_clip(&mut self, near: f32, far: f32) {
        debug_assert!(near > 0.0);
        debug_assert!(near < far);
        self.near = near;
        self.far = far;
        self.update_projection();
    }

    pub fn set_projection(&mut self, projection: Projection) {
        if projection == self.projection {
            return;
        }
        self.projection = projection;
        self.update_projection();
    }

    /// Set the image size in pixels; the aspect ratio follows it.
    pub fn set_image_dimensions(&mut self, width: u32, height: u32) {
        self.image_width = width.max(1);
        self.image_height = height.max(1);
        self.set_aspect(self.image_width as f32 / self.image_height as f32);
    }

    /// Move along the view direction.
    pub fn move_forward(&mut self, distance: f32) {
        self.position += self.view_dir * distance;
        self.update_world_view();
    }

    /// Move along the up vector.
    pub fn move_up(&mut self, distance: f32) {
        self.position += self.up * distance;
        self.update_world_view();
    }

    /// Move along the right vector.
    pub fn strafe_right(&mut self, distance: f32) {
        self.position += self.right * distance;
        self.update_world_view();
    }

    /// Rotate about the up vector.
    pub fn rotate_right(&mut self, angle: f32) {
        let rot = rotate_axis(angle, self.up);
        self.right = (rot * self.right).normalize();
        self.view_dir = self.up.cross(self.right).normalize();
        self.up = self.right.cross(self.view_dir).normalize();
        self.update_world_view();
    }

    /// Rotate about the right vector.
    pub fn rotate_up(&mut self, angle: f32) {
        let rot = rotate_axis(angle, self.right);
        self.view_dir = (rot * self.view_dir).normalize();
        self.up = self.right.cross(self.view_dir).normalize();
        self.right = self.view_dir.cross(self.up).normalize();
        self.update_world_view();
    }

    /// Rotate about the view direction.
    pub fn spin(&mut self, angle: f32) {
        let rot = rotate_axis(angle, self.view_dir);
        self.up = (rot * self.up).normalize();
        self.right = self.view_dir.cross(self.up).normalize();
        self.view_dir = self.up.cross(self.right).normalize();
        self.update_world_view();
    }

    /// Generate the primary ray through image position (x, y).
    ///
    /// Integer coordinates are pixel centres, x grows to the right and y grows
    /// upwards (row 0 is the bottom of the image). Fractional coordinates are
    /// allowed for sub-pixel jitter.
    pub fn gen_view_ray(&self, x: f32, y: f32) -> Ray {
        let (top, right) = self.view_extents();
        let px = -right + 2.0 * right * (x + 0.5) / self.image_width as f32;
        let py = -top + 2.0 * top * (y + 0.5) / self.image_height as f32;

        match self.projection {
            Projection::Perspective => {
                let on_plane = self.view_world.transform_point3(Vec3::new(px, py, self.near));
                Ray::new(self.position, (on_plane - self.position).normalize())
            }
            Projection::Orthographic => {
                let origin = self.view_world.transform_point3(Vec3::new(px, py, 0.0));
                Ray::new(origin, self.view_dir)
            }
        }
    }

    /// Half extents `(top, right)` of the view plane at the near clip distance.
    pub fn view_extents(&self) -> (f32, f32) {
        let top = (self.fov / 2.0).tan() * self.near;
        (top, self.aspect * top)
    }

    /// Get the view matrix (world → camera space)
    pub fn world_view(&self) -> Mat4 {
        self.world_view
    }

    /// Get the projection matrix (camera → clip space)
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// Get the combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.world_view
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn view_dir(&self) -> Vec3 {
        self.view_dir
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    fn update_world_view(&mut self) {
        let (u, v, w, e) = (self.right, self.up, self.view_dir, self.position);
        // Rows are u, v, w; translation brings the eye to the origin.
        self.world_view = Mat4::from_cols(
            Vec4::new(u.x, v.x, w.x, 0.0),
            Vec4::new(u.y, v.y, w.y, 0.0),
            Vec4::new(u.z, v.z, w.z, 0.0),
            Vec4::new(-u.dot(e), -v.dot(e), -w.dot(e), 1.0),
        );
        self.view_world = self.world_view.inverse();
    }

    fn update_projection(&mut self) {
        let (n, f) = (self.near, self.far);
        let (t, r) = self.view_extents();

        // Maps [-r, r] x [-t, t] x [n, f] onto the [-1, 1] cube.
        let ortho = Mat4::from_cols(
            Vec4::new(1.0 / r, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0 / t, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 2.0 / (f - n), 0.0),
            Vec4::new(0.0, 0.0, -(n + f) / (f - n), 1.0),
        );

        self.projection_matrix = match self.projection {
            Projection::Perspective => {
                let perspective = Mat4::from_cols(
                    Vec4::new(n, 0.0, 0.0, 0.0),
                    Vec4::new(0.0, n, 0.0, 0.0),
                    Vec4::new(0.0, 0.0, n + f, 1.0),
                    Vec4::new(0.0, 0.0, -n * f, 0.0),
                );
                ortho * perspective
            }
            Projection::Orthographic => ortho,
        };
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(camera: &Camera) {
        let (u, v, w) = (camera.right(), camera.up(), camera.view_dir());
        for axis in [u, v, w] {
            assert!((axis.length() - 1.0).abs() < 1e-4, "axis not unit: {:?}", axis);
        }
        assert!(u.dot(v).abs() < 1e-4);
        assert!(u.dot(w).abs() < 1e-4);
        assert!(v.dot(w).abs() < 1e-4);
        // Right-handed: u x v points opposite the view direction
        assert!((u.cross(v) + w).length() < 1e-3);
    }

    /// Project a world point to fractional pixel coordinates.
    fn project_to_pixel(camera: &Camera, p: Vec3) -> (f32, f32) {
        let clip = camera.view_projection_matrix() * p.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        let x = (ndc.x + 1.0) * 0.5 * camera.image_width() as f32 - 0.5;
        let y = (ndc.y + 1.0) * 0.5 * camera.image_height() as f32 - 0.5;
        (x, y)
    }

    #[test]
    fn test_look_at_basis() {
        let mut camera = Camera::new();
        camera.look_at(Vec3::new(0.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y);

        assert_eq!(camera.position(), Vec3::new(0.0, 2.0, 3.0));
        let expected_w = Vec3::new(0.0, -2.0, -3.0).normalize();
        assert!((camera.view_dir() - expected_w).length() < 1e-5);
        assert!((camera.right() - Vec3::X).length() < 1e-5);
        assert!(camera.up().y > 0.0);
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_world_view_moves_eye_to_origin() {
        let mut camera = Camera::new();
        camera.look_at(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 0.0, -4.0), Vec3::Y);

        let eye = camera.world_view().transform_point3(camera.position());
        assert!(eye.length() < 1e-4);

        // A point straight ahead has positive depth along camera z
        let ahead = camera.position() + camera.view_dir() * 2.0;
        let ahead_cam = camera.world_view().transform_point3(ahead);
        assert!((ahead_cam - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-4);
    }

    #[test]
    fn test_moves_follow_basis() {
        let mut camera = Camera::new();
        camera.move_forward(2.0);
        assert!((camera.position() - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
        camera.strafe_right(1.0);
        camera.move_up(-0.5);
        assert!((camera.position() - Vec3::new(1.0, -0.5, -2.0)).length() < 1e-5);
    }

    #[test]
    fn test_rotations_stay_orthonormal() {
        let mut camera = Camera::new();
        camera.look_at(Vec3::new(0.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y);

        for i in 0..5000 {
            let a = 0.013 * (i % 7) as f32;
            camera.rotate_right(a);
            camera.rotate_up(-0.7 * a);
            camera.spin(0.3 * a);
        }

        assert_orthonormal(&camera);
    }

    #[test]
    fn test_rotate_right_quarter_turn() {
        let mut camera = Camera::new();
        camera.rotate_right(std::f32::consts::FRAC_PI_2);

        // Looking down -Z, a quarter turn about +Y looks down -X
        assert!((camera.view_dir() - Vec3::NEG_X).length() < 1e-4);
        assert!((camera.up() - Vec3::Y).length() < 1e-4);
        assert_orthonormal(&camera);
    }

    #[test]
    fn test_center_ray_points_down_view_dir() {
        let mut camera = Camera::new();
        camera.set_image_dimensions(101, 101);
        camera.look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);

        let ray = camera.gen_view_ray(50.0, 50.0);
        assert_eq!(ray.origin, camera.position());
        assert!((ray.direction - camera.view_dir()).length() < 1e-5);
        assert!((ray.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_corner_ray_angles() {
        let mut camera = Camera::new();
        camera.set_image_dimensions(200, 100);
        camera.set_fov(90.0_f32.to_radians());
        camera.set_depth_clip(0.5, 10.0);

        // Left edge of the image at mid height
        let ray = camera.gen_view_ray(-0.5, 49.5);
        // tan(45) * aspect 2 gives x/z = 2
        let d = ray.direction;
        assert!((d.x / -d.z + 2.0).abs() < 1e-4);
        assert!(d.y.abs() < 1e-5);

        // Row 0 is the bottom of the image
        let bottom = camera.gen_view_ray(99.5, -0.5);
        assert!(bottom.direction.y < 0.0);
    }

    #[test]
    fn test_rays_reproject_to_their_pixel() {
        let mut camera = Camera::new();
        camera.set_image_dimensions(64, 48);
        camera.set_depth_clip(0.5, 30.0);
        camera.look_at(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 0.5, 0.0), Vec3::Y);

        for projection in [Projection::Perspective, Projection::Orthographic] {
            camera.set_projection(projection);
            for &(x, y) in &[(0.0, 0.0), (10.25, 40.0), (63.0, 47.0), (31.5, 20.75)] {
                let ray = camera.gen_view_ray(x, y);
                for t in [1.0, 4.0, 12.0] {
                    let (px, py) = project_to_pixel(&camera, ray.at(t));
                    assert!((px - x).abs() < 1e-2, "{:?}: x {} vs {}", projection, px, x);
                    assert!((py - y).abs() < 1e-2, "{:?}: y {} vs {}", projection, py, y);
                }
            }
        }
    }

    #[test]
    fn test_projection_depth_range() {
        let mut camera = Camera::new();
        camera.set_depth_clip(0.5, 30.0);

        let near = camera.projection_matrix() * Vec4::new(0.0, 0.0, 0.5, 1.0);
        let far = camera.projection_matrix() * Vec4::new(0.0, 0.0, 30.0, 1.0);
        assert!((near.z / near.w + 1.0).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_aspect_update() {
        let mut camera = Camera::new();
        camera.set_image_dimensions(1920, 1080);
        assert!((camera.aspect() - 16.0 / 9.0).abs() < 1e-5);
        assert_eq!(camera.image_width(), 1920);
    }
}

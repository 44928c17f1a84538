//! Host-loop adapter: camera navigation while idle, time-sliced tracing
//! while tracing.

use std::time::Instant;

use bitflags::bitflags;
use lumen_math::{Camera, Projection};
use rand::RngCore;

use crate::config::TraceConfig;
use crate::progressive::{ProgressiveRenderer, SceneSampler};
use crate::scene::Scene;

bitflags! {
    /// Held camera movement keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Motion: u32 {
        const FORWARD = 0x001;
        const BACKWARD = 0x002;
        const STRAFE_RIGHT = 0x004;
        const STRAFE_LEFT = 0x008;
        const UP = 0x010;
        const DOWN = 0x020;
        const ROTATE_RIGHT = 0x040;
        const ROTATE_LEFT = 0x080;
        const ROTATE_UP = 0x100;
        const ROTATE_DOWN = 0x200;
        const SPIN_LEFT = 0x400;
        const SPIN_RIGHT = 0x800;
    }
}

/// What an `idle` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleOutcome {
    /// A renderer slice ran and traced this many rows
    Traced(u32),
    /// Held keys moved the camera
    CameraMoved,
    Unchanged,
}

pub struct Session {
    camera: Camera,
    renderer: ProgressiveRenderer,
    config: TraceConfig,
    motion: Motion,
    /// Units per second
    movement_speed: f32,
    /// Radians per second
    rotation_speed: f32,
    tracing: bool,
    camera_changed: bool,
    last_move: Option<Instant>,
}

impl Session {
    pub fn new(mut camera: Camera, width: u32, height: u32, config: TraceConfig) -> Self {
        camera.set_image_dimensions(width, height);
        let renderer =
            ProgressiveRenderer::new(camera.image_width(), camera.image_height(), &config);

        Self {
            camera,
            renderer,
            config,
            motion: Motion::empty(),
            movement_speed: 2.0,
            rotation_speed: 40.0_f32.to_radians(),
            tracing: false,
            camera_changed: true,
            last_move: None,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn renderer(&self) -> &ProgressiveRenderer {
        &self.renderer
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn is_tracing(&self) -> bool {
        self.tracing
    }

    pub fn camera_changed(&self) -> bool {
        self.camera_changed
    }

    pub fn set_speeds(&mut self, movement: f32, rotation: f32) {
        self.movement_speed = movement;
        self.rotation_speed = rotation;
    }

    /// Press or release a movement key. Ignored while tracing.
    pub fn set_motion(&mut self, motion: Motion, pressed: bool) {
        if self.tracing {
            log::warn!("Ignoring camera movement while tracing");
            return;
        }
        self.motion.set(motion, pressed);
        // The clock restarts at the next idle
        self.last_move = None;
    }

    /// Switch projection. Ignored while tracing.
    pub fn set_projection(&mut self, projection: Projection) {
        if self.tracing {
            log::warn!("Ignoring projection change while tracing");
            return;
        }
        if projection != self.camera.projection() {
            self.camera.set_projection(projection);
            self.camera_changed = true;
        }
    }

    /// Enter or leave tracing. Entering after the camera changed starts
    /// over from an empty buffer; otherwise the previous work resumes.
    pub fn toggle_tracing(&mut self) -> bool {
        self.tracing = !self.tracing;

        if self.tracing {
            if self.camera_changed {
                self.renderer.reset();
                self.camera_changed = false;
            }
            self.renderer.start();
            log::info!("Tracing started");
        } else {
            self.renderer.stop();
            log::info!(
                "Tracing stopped after {} passes",
                self.renderer.completed_passes()
            );
        }
        self.tracing
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_image_dimensions(width, height);
        self.renderer
            .resize(self.camera.image_width(), self.camera.image_height());
        self.camera_changed = true;
    }

    /// One host idle tick.
    pub fn idle(&mut self, now: Instant, scene: &Scene, rng: &mut dyn RngCore) -> IdleOutcome {
        if self.tracing {
            let sampler = SceneSampler::new(scene, &self.camera, self.config.max_depth);
            return IdleOutcome::Traced(self.renderer.step(&sampler, rng));
        }

        if self.motion.is_empty() {
            return IdleOutcome::Unchanged;
        }

        let Some(last) = self.last_move.replace(now) else {
            return IdleOutcome::Unchanged;
        };
        let dt = now.saturating_duration_since(last).as_secs_f32();
        if dt <= 0.0 {
            return IdleOutcome::Unchanged;
        }

        self.apply_motion(dt);
        self.camera_changed = true;
        IdleOutcome::CameraMoved
    }

    fn apply_motion(&mut self, dt: f32) {
        let step = self.movement_speed * dt;
        let turn = self.rotation_speed * dt;
        let m = self.motion;
        let camera = &mut self.camera;

        if m.contains(Motion::FORWARD) {
            camera.move_forward(step);
        }
        if m.contains(Motion::BACKWARD) {
            camera.move_forward(-step);
        }
        if m.contains(Motion::STRAFE_RIGHT) {
            camera.strafe_right(step);
        }
        if m.contains(Motion::STRAFE_LEFT) {
            camera.strafe_right(-step);
        }
        if m.contains(Motion::UP) {
            camera.move_up(step);
        }
        if m.contains(Motion::DOWN) {
            camera.move_up(-step);
        }
        if m.contains(Motion::ROTATE_UP) {
            camera.rotate_up(turn);
        }
        if m.contains(Motion::ROTATE_DOWN) {
            camera.rotate_up(-turn);
        }
        if m.contains(Motion::ROTATE_LEFT) {
            camera.rotate_right(turn);
        }
        if m.contains(Motion::ROTATE_RIGHT) {
            camera.rotate_right(-turn);
        }
        if m.contains(Motion::SPIN_LEFT) {
            camera.spin(turn);
        }
        if m.contains(Motion::SPIN_RIGHT) {
            camera.spin(-turn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progressive::TraceState;
    use lumen_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn session() -> Session {
        let mut camera = Camera::new();
        camera.look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let config = TraceConfig {
            max_passes: 2,
            slice_budget_ms: 10_000,
            ..Default::default()
        };
        Session::new(camera, 4, 4, config)
    }

    #[test]
    fn test_held_forward_moves_two_units_per_second() {
        let mut session = session();
        let scene = Scene::new();
        let mut rng = StdRng::seed_from_u64(0);
        let t0 = Instant::now();

        session.set_motion(Motion::FORWARD, true);
        assert_eq!(session.idle(t0, &scene, &mut rng), IdleOutcome::Unchanged);
        let outcome = session.idle(t0 + Duration::from_millis(500), &scene, &mut rng);

        assert_eq!(outcome, IdleOutcome::CameraMoved);
        assert!((session.camera().position().z - 4.0).abs() < 1e-4);
        assert!(session.camera_changed());
    }

    #[test]
    fn test_rotate_left_turns_view_left() {
        let mut session = session();
        let scene = Scene::new();
        let mut rng = StdRng::seed_from_u64(0);
        let t0 = Instant::now();

        session.set_motion(Motion::ROTATE_LEFT, true);
        session.idle(t0, &scene, &mut rng);
        session.idle(t0 + Duration::from_millis(100), &scene, &mut rng);

        assert!(session.camera().view_dir().x < 0.0);
    }

    #[test]
    fn test_release_stops_motion() {
        let mut session = session();
        session.set_motion(Motion::FORWARD | Motion::UP, true);
        session.set_motion(Motion::FORWARD, false);
        assert_eq!(session.motion(), Motion::UP);
    }

    #[test]
    fn test_input_ignored_while_tracing() {
        let mut session = session();
        assert!(session.toggle_tracing());

        session.set_motion(Motion::FORWARD, true);
        session.set_projection(Projection::Orthographic);

        assert!(session.motion().is_empty());
        assert_eq!(session.camera().projection(), Projection::Perspective);
    }

    #[test]
    fn test_tracing_resumes_without_camera_change() {
        let mut session = session();
        let scene = Scene::new();
        let mut rng = StdRng::seed_from_u64(0);
        let now = Instant::now();

        session.toggle_tracing();
        assert_eq!(session.idle(now, &scene, &mut rng), IdleOutcome::Traced(4));
        assert_eq!(
            session.renderer().state(),
            TraceState::PassComplete { pass: 0 }
        );

        session.toggle_tracing();
        assert_eq!(session.renderer().state(), TraceState::Idle);
        session.toggle_tracing();
        assert_eq!(session.renderer().completed_passes(), 1);

        session.toggle_tracing();
        session.set_projection(Projection::Orthographic);
        session.toggle_tracing();
        assert_eq!(session.renderer().completed_passes(), 0);
    }

    #[test]
    fn test_resize_updates_camera_and_buffer() {
        let mut session = session();
        session.resize(8, 2);

        assert_eq!(session.camera().image_width(), 8);
        assert!((session.camera().aspect() - 4.0).abs() < 1e-6);
        assert_eq!(session.renderer().buffer().pixels().len(), 16);
        assert!(session.camera_changed());
    }
}

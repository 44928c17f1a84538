//! Progressive refinement under a wall-clock budget.
//!
//! The image is traced one row at a time. Each call to
//! [`ProgressiveRenderer::step`] works until the slice budget runs out and
//! then returns, leaving a row cursor behind so the next call resumes where
//! this one stopped. Every pass adds one jittered sample per pixel to a
//! running mean.

use std::time::{Duration, Instant};

use lumen_math::{gen_f32, Camera, Interval, Vec3};
use rand::RngCore;

use crate::config::TraceConfig;
use crate::scene::Scene;

/// Produces one radiance sample for an image position.
pub trait PixelSampler {
    /// `x`, `y` are image coordinates with pixel centres on integers and
    /// row 0 at the bottom.
    fn sample(&self, x: f32, y: f32, rng: &mut dyn RngCore) -> Vec3;
}

/// Camera ray, nearest hit over the camera's depth range, then `shade_ray`.
pub struct SceneSampler<'a, 'g> {
    scene: &'a Scene<'g>,
    camera: &'a Camera,
    max_depth: u32,
}

impl<'a, 'g> SceneSampler<'a, 'g> {
    pub fn new(scene: &'a Scene<'g>, camera: &'a Camera, max_depth: u32) -> Self {
        Self {
            scene,
            camera,
            max_depth,
        }
    }
}

impl PixelSampler for SceneSampler<'_, '_> {
    fn sample(&self, x: f32, y: f32, rng: &mut dyn RngCore) -> Vec3 {
        let ray = self.camera.gen_view_ray(x, y);
        let range = Interval::new(self.camera.near(), self.camera.far());

        match self.scene.nearest_hit(&ray, range) {
            Some(hit) => self.scene.shade_ray(&ray, &hit, self.max_depth, rng),
            None => Vec3::ZERO,
        }
    }
}

/// Per-pixel running means, row 0 at the bottom.
#[derive(Debug, Clone)]
pub struct AccumulationBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
}

impl AccumulationBuffer {
    /// Both dimensions are clamped to at least one pixel.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            pixels: vec![Vec3::ZERO; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Vec3 {
        self.pixels[self.index(x, y)]
    }

    pub fn row(&self, y: u32) -> &[Vec3] {
        let start = self.index(0, y);
        &self.pixels[start..start + self.width as usize]
    }

    pub fn pixels(&self) -> &[Vec3] {
        &self.pixels
    }

    /// Fold a sample into the mean of `passes` earlier samples.
    pub fn merge(&mut self, x: u32, y: u32, sample: Vec3, passes: u32) {
        let index = self.index(x, y);
        let pixel = &mut self.pixels[index];
        let p = passes as f32;
        *pixel = (*pixel * p + sample) / (p + 1.0);
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Vec3::ZERO);
    }
}

/// Where the renderer is in its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceState {
    Idle,
    /// Tracing pass `pass`; `row` is the next row to trace
    InPass { pass: u32, row: u32 },
    /// Every row of pass `pass` is merged
    PassComplete { pass: u32 },
}

/// Time-sliced, row-at-a-time progressive tracer.
pub struct ProgressiveRenderer {
    buffer: AccumulationBuffer,
    active: bool,
    pass: u32,
    row: u32,
    max_passes: u32,
    budget: Duration,
    samples: u64,
}

impl ProgressiveRenderer {
    pub fn new(width: u32, height: u32, config: &TraceConfig) -> Self {
        Self {
            buffer: AccumulationBuffer::new(width, height),
            active: false,
            pass: 0,
            row: 0,
            max_passes: config.max_passes.max(1),
            budget: config.slice_budget(),
            samples: 0,
        }
    }

    pub fn state(&self) -> TraceState {
        if !self.active {
            TraceState::Idle
        } else if self.row >= self.buffer.height {
            TraceState::PassComplete { pass: self.pass }
        } else {
            TraceState::InPass {
                pass: self.pass,
                row: self.row,
            }
        }
    }

    /// Begin or resume tracing from the current cursor.
    pub fn start(&mut self) {
        self.active = true;
    }

    /// Stop tracing. Rows merged so far are kept and a later `start`
    /// resumes from the same row.
    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Back to pass 0, row 0, with an all-zero buffer.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.pass = 0;
        self.row = 0;
        self.samples = 0;
    }

    /// New image size; implies `reset`.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.buffer = AccumulationBuffer::new(width, height);
        self.reset();
        log::info!(
            "Trace buffer resized to {}x{}",
            self.buffer.width,
            self.buffer.height
        );
    }

    /// Number of fully merged passes.
    pub fn completed_passes(&self) -> u32 {
        if self.row >= self.buffer.height {
            self.pass + 1
        } else {
            self.pass
        }
    }

    /// All passes are merged; further steps do nothing.
    pub fn is_converged(&self) -> bool {
        self.completed_passes() >= self.max_passes
    }

    pub fn buffer(&self) -> &AccumulationBuffer {
        &self.buffer
    }

    pub fn set_budget(&mut self, budget: Duration) {
        self.budget = budget;
    }

    /// Run one time slice and return the number of rows traced.
    ///
    /// At least one row is traced per call while a pass is in progress.
    /// After the last row of a pass, the next call starts the following
    /// pass unless `max_passes` is reached.
    pub fn step(&mut self, sampler: &dyn PixelSampler, rng: &mut dyn RngCore) -> u32 {
        match self.state() {
            TraceState::Idle => return 0,
            TraceState::PassComplete { pass } => {
                if pass + 1 >= self.max_passes {
                    return 0;
                }
                self.pass += 1;
                self.row = 0;
            }
            TraceState::InPass { .. } => {}
        }

        let started = Instant::now();
        let first_row = self.row;

        loop {
            self.trace_row(sampler, rng);
            self.row += 1;

            if self.row >= self.buffer.height || started.elapsed() >= self.budget {
                break;
            }
        }

        log::debug!(
            "Pass {}: traced rows {}..{} in {:.1} ms",
            self.pass,
            first_row,
            self.row,
            started.elapsed().as_secs_f64() * 1000.0
        );
        if self.row >= self.buffer.height {
            log::info!("Pass {} complete ({} samples)", self.pass + 1, self.samples);
        }

        self.row - first_row
    }

    fn trace_row(&mut self, sampler: &dyn PixelSampler, rng: &mut dyn RngCore) {
        let r = self.row;
        for c in 0..self.buffer.width {
            let x = c as f32 - 0.5 + gen_f32(rng);
            let y = r as f32 - 0.5 + gen_f32(rng);
            let sample = sampler.sample(x, y, rng);
            self.buffer.merge(c, r, sample, self.pass);
        }
        self.samples += u64::from(self.buffer.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::{Cell, RefCell};

    /// Returns 0, 1, 2, ... on successive calls.
    struct Counter(Cell<u32>);

    impl PixelSampler for Counter {
        fn sample(&self, _x: f32, _y: f32, _rng: &mut dyn RngCore) -> Vec3 {
            let n = self.0.get();
            self.0.set(n + 1);
            Vec3::splat(n as f32)
        }
    }

    /// Records the positions it is asked for.
    struct Recorder(RefCell<Vec<(f32, f32)>>);

    impl PixelSampler for Recorder {
        fn sample(&self, x: f32, y: f32, _rng: &mut dyn RngCore) -> Vec3 {
            self.0.borrow_mut().push((x, y));
            Vec3::ONE
        }
    }

    fn config(max_passes: u32, budget_ms: u64) -> TraceConfig {
        TraceConfig {
            max_passes,
            slice_budget_ms: budget_ms,
            ..Default::default()
        }
    }

    #[test]
    fn test_running_mean_matches_arithmetic_mean() {
        let mut renderer = ProgressiveRenderer::new(1, 1, &config(10, 1000));
        let sampler = Counter(Cell::new(0));
        let mut rng = StdRng::seed_from_u64(0);
        renderer.start();

        for _ in 0..10 {
            renderer.step(&sampler, &mut rng);
        }

        // Mean of 0..10
        assert!((renderer.buffer().get(0, 0).x - 4.5).abs() < 1e-4);
        assert_eq!(renderer.completed_passes(), 10);
        assert!(renderer.is_converged());
    }

    #[test]
    fn test_one_row_per_step_with_zero_budget() {
        let mut renderer = ProgressiveRenderer::new(4, 3, &config(2, 0));
        let sampler = Counter(Cell::new(0));
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(renderer.state(), TraceState::Idle);
        assert_eq!(renderer.step(&sampler, &mut rng), 0);

        renderer.start();
        assert_eq!(renderer.state(), TraceState::InPass { pass: 0, row: 0 });
        assert_eq!(renderer.step(&sampler, &mut rng), 1);
        assert_eq!(renderer.state(), TraceState::InPass { pass: 0, row: 1 });
        renderer.step(&sampler, &mut rng);
        renderer.step(&sampler, &mut rng);
        assert_eq!(renderer.state(), TraceState::PassComplete { pass: 0 });

        // Next step opens pass 1 and traces its first row
        assert_eq!(renderer.step(&sampler, &mut rng), 1);
        assert_eq!(renderer.state(), TraceState::InPass { pass: 1, row: 1 });
        renderer.step(&sampler, &mut rng);
        renderer.step(&sampler, &mut rng);
        assert_eq!(renderer.state(), TraceState::PassComplete { pass: 1 });

        // max_passes reached: nothing more to do
        assert_eq!(renderer.step(&sampler, &mut rng), 0);
        assert_eq!(renderer.state(), TraceState::PassComplete { pass: 1 });
        assert_eq!(sampler.0.get(), 24);
    }

    #[test]
    fn test_whole_pass_fits_in_budget() {
        let mut renderer = ProgressiveRenderer::new(8, 8, &config(500, 10_000));
        let sampler = Counter(Cell::new(0));
        let mut rng = StdRng::seed_from_u64(2);
        renderer.start();

        assert_eq!(renderer.step(&sampler, &mut rng), 8);
        assert_eq!(renderer.state(), TraceState::PassComplete { pass: 0 });
    }

    #[test]
    fn test_jitter_stays_within_pixel() {
        let mut renderer = ProgressiveRenderer::new(3, 2, &config(1, 10_000));
        let sampler = Recorder(RefCell::new(Vec::new()));
        let mut rng = StdRng::seed_from_u64(3);
        renderer.start();
        renderer.step(&sampler, &mut rng);

        let positions = sampler.0.borrow();
        assert_eq!(positions.len(), 6);
        for (i, &(x, y)) in positions.iter().enumerate() {
            let (c, r) = ((i % 3) as f32, (i / 3) as f32);
            assert!(x >= c - 0.5 && x < c + 0.5, "x {} for column {}", x, c);
            assert!(y >= r - 0.5 && y < r + 0.5, "y {} for row {}", y, r);
        }
    }

    #[test]
    fn test_stop_keeps_rows_and_resumes() {
        let mut renderer = ProgressiveRenderer::new(2, 4, &config(5, 0));
        let sampler = Counter(Cell::new(1));
        let mut rng = StdRng::seed_from_u64(4);
        renderer.start();
        renderer.step(&sampler, &mut rng);
        renderer.step(&sampler, &mut rng);
        renderer.stop();

        assert_eq!(renderer.state(), TraceState::Idle);
        assert_eq!(renderer.step(&sampler, &mut rng), 0);
        assert!(renderer.buffer().row(1).iter().all(|p| p.x > 0.0));
        assert!(renderer.buffer().row(2).iter().all(|p| *p == Vec3::ZERO));

        renderer.start();
        assert_eq!(renderer.state(), TraceState::InPass { pass: 0, row: 2 });
    }

    #[test]
    fn test_reset_and_resize() {
        let mut renderer = ProgressiveRenderer::new(2, 2, &config(5, 10_000));
        let sampler = Counter(Cell::new(1));
        let mut rng = StdRng::seed_from_u64(5);
        renderer.start();
        renderer.step(&sampler, &mut rng);
        renderer.step(&sampler, &mut rng);

        renderer.reset();
        assert_eq!(renderer.state(), TraceState::InPass { pass: 0, row: 0 });
        assert!(renderer.buffer().pixels().iter().all(|p| *p == Vec3::ZERO));

        renderer.resize(5, 3);
        assert_eq!(renderer.buffer().width(), 5);
        assert_eq!(renderer.buffer().pixels().len(), 15);
        assert_eq!(renderer.completed_passes(), 0);
        assert!(renderer.is_active());
    }

    #[test]
    fn test_zero_sized_resize_keeps_one_pixel() {
        let mut renderer = ProgressiveRenderer::new(4, 4, &config(3, 10_000));
        let sampler = Counter(Cell::new(1));
        let mut rng = StdRng::seed_from_u64(6);
        renderer.start();

        renderer.resize(4, 0);
        assert_eq!(renderer.buffer().height(), 1);
        assert_eq!(renderer.step(&sampler, &mut rng), 1);
        assert_eq!(renderer.step(&sampler, &mut rng), 1);
        assert_eq!(renderer.completed_passes(), 2);

        let empty = ProgressiveRenderer::new(0, 0, &config(3, 0));
        assert_eq!(empty.buffer().pixels().len(), 1);
    }

    #[test]
    fn test_first_pass_overwrites() {
        let mut buffer = AccumulationBuffer::new(1, 1);
        buffer.merge(0, 0, Vec3::splat(3.0), 0);
        assert_eq!(buffer.get(0, 0), Vec3::splat(3.0));
        buffer.merge(0, 0, Vec3::splat(1.0), 1);
        assert_eq!(buffer.get(0, 0), Vec3::splat(2.0));
    }
}

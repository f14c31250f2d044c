//! Frame-driven lifecycle of the field
//!
//! ```text
//! Uninitialized --(frame, size > 0)--> Building --> Running --(unmount)--> TornDown
//!       ^   |
//!       +---+ (frame, size == 0: stay and reschedule)
//! ```
//!
//! The host calls [`FieldDriver::on_frame`] from its per-frame callback and
//! keeps rescheduling while it returns [`FrameOutcome::Reschedule`] or
//! [`FrameOutcome::Built`]. Every scheduled callback should check the
//! driver's [`CancelToken`] first; after unmount the driver itself also
//! ignores frames.

use std::cell::Cell;
use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::settings::FieldSettings;
use crate::sim::{PointerState, Stepper, Viewport, World, build_world, step};

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Mounted, waiting for a frame with a laid-out host
    Uninitialized,
    /// Constructing the world (only observable from inside the build)
    Building,
    /// Stepping and drawing every frame
    Running,
    /// Unmounted; nothing runs
    TornDown,
}

/// What the host should do after a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Schedule another frame
    Reschedule,
    /// The world was built this frame; create a surface for this viewport,
    /// attach it, and schedule another frame
    Built(Viewport),
    /// Stop scheduling frames
    Stop,
}

/// Shared cancellation flag, set once on unmount
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// A drawing surface owned by the field
pub trait FieldSurface {
    /// Paint the world's current state
    fn draw(&mut self, world: &World);
    /// Match a new host size
    fn resize(&mut self, viewport: Viewport);
    /// Detach from the page and free GPU resources
    fn release(&mut self);
}

/// Everything a running field owns
pub struct SimulationHandle<S> {
    pub world: World,
    pub pointer: PointerState,
    pub stepper: Stepper,
    surface: Option<S>,
    drawing: bool,
}

impl<S: FieldSurface> SimulationHandle<S> {
    fn new(world: World) -> Self {
        Self {
            pointer: PointerState::centered(world.viewport),
            world,
            stepper: Stepper::new(),
            surface: None,
            drawing: true,
        }
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Ordered teardown: drawing, surface, stepping, bodies
    fn teardown(mut self) {
        self.drawing = false;
        if let Some(mut surface) = self.surface.take() {
            surface.release();
        }
        self.stepper.stop();
        self.world.clear();
        // World is dropped with the handle
    }
}

/// Drives one mount of the field
pub struct FieldDriver<S> {
    phase: LoopPhase,
    settings: FieldSettings,
    token: CancelToken,
    rng: Pcg32,
    handle: Option<SimulationHandle<S>>,
    deferred_frames: u32,
}

impl<S: FieldSurface> FieldDriver<S> {
    /// Mount a new driver. Construction is deferred to the first frame.
    pub fn new(settings: FieldSettings, seed: u64) -> Self {
        let seed = settings.seed.unwrap_or(seed);
        log::info!("Field mounted (seed {})", seed);
        Self {
            phase: LoopPhase::Uninitialized,
            settings: settings.sanitized(),
            token: CancelToken::new(),
            rng: Pcg32::seed_from_u64(seed),
            handle: None,
            deferred_frames: 0,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Token to check at the top of every scheduled callback
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn settings(&self) -> &FieldSettings {
        &self.settings
    }

    pub fn world(&self) -> Option<&World> {
        self.handle.as_ref().map(|h| &h.world)
    }

    pub fn handle(&self) -> Option<&SimulationHandle<S>> {
        self.handle.as_ref()
    }

    /// Frames that found the host still unsized
    pub fn deferred_frames(&self) -> u32 {
        self.deferred_frames
    }

    /// Run one frame at `time_ms` with the host's current size
    pub fn on_frame(&mut self, time_ms: f64, viewport: Viewport) -> FrameOutcome {
        if self.token.is_cancelled() {
            return FrameOutcome::Stop;
        }

        match self.phase {
            LoopPhase::Uninitialized => self.build(viewport),
            LoopPhase::Building => FrameOutcome::Reschedule,
            LoopPhase::Running => {
                self.run_frame(time_ms);
                FrameOutcome::Reschedule
            }
            LoopPhase::TornDown => FrameOutcome::Stop,
        }
    }

    fn build(&mut self, viewport: Viewport) -> FrameOutcome {
        self.phase = LoopPhase::Building;
        match build_world(viewport, &self.settings, &mut self.rng) {
            Some(world) => {
                self.handle = Some(SimulationHandle::new(world));
                self.phase = LoopPhase::Running;
                FrameOutcome::Built(viewport)
            }
            None => {
                self.deferred_frames += 1;
                log::debug!(
                    "Host not laid out yet ({}x{}), deferring build",
                    viewport.width,
                    viewport.height
                );
                self.phase = LoopPhase::Uninitialized;
                FrameOutcome::Reschedule
            }
        }
    }

    fn run_frame(&mut self, time_ms: f64) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        let ticks = handle.stepper.advance(time_ms);
        for _ in 0..ticks {
            step(&mut handle.world, &handle.pointer, &self.settings);
        }

        if handle.drawing {
            if let Some(surface) = handle.surface.as_mut() {
                surface.draw(&handle.world);
            }
        }
    }

    /// Hand the driver a surface created for a [`FrameOutcome::Built`].
    ///
    /// After unmount the surface is released immediately and `false` is
    /// returned.
    pub fn attach_surface(&mut self, mut surface: S) -> bool {
        match self.handle.as_mut() {
            Some(handle) if !self.token.is_cancelled() => {
                if let Some(mut old) = handle.surface.replace(surface) {
                    old.release();
                }
                true
            }
            _ => {
                log::debug!("Surface arrived after teardown, releasing");
                surface.release();
                false
            }
        }
    }

    /// Record a pointer position (surface coordinates); last write wins
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        if let Some(handle) = self.handle.as_mut() {
            handle.pointer.set(x, y);
        }
    }

    /// Record a pointer position given in client coordinates, with the
    /// surface's client-space origin
    pub fn set_pointer_from_client(&mut self, client_x: f32, client_y: f32, origin: (f32, f32)) {
        if let Some(handle) = self.handle.as_mut() {
            handle
                .pointer
                .set_from_client(client_x, client_y, origin.0, origin.1);
        }
    }

    /// Current pointer position, once built
    pub fn pointer(&self) -> Option<PointerState> {
        self.handle.as_ref().map(|h| h.pointer)
    }

    /// Follow a host resize. Ignored until built and for empty sizes.
    pub fn resize(&mut self, viewport: Viewport) {
        if !viewport.is_ready() {
            return;
        }
        if let Some(handle) = self.handle.as_mut() {
            handle.world.fit_boundaries(viewport);
            if let Some(surface) = handle.surface.as_mut() {
                surface.resize(viewport);
            }
            log::info!("Field resized to {}x{}", viewport.width, viewport.height);
        }
    }

    /// Tear everything down. Safe to call more than once.
    pub fn unmount(&mut self) {
        if self.phase == LoopPhase::TornDown {
            return;
        }
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.teardown();
        }
        self.phase = LoopPhase::TornDown;
        log::info!("Field torn down");
    }
}

impl<S> Drop for FieldDriver<S> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const TICK: f64 = crate::consts::TICK_MS as f64;

    #[derive(Debug, Default)]
    struct SpyLog {
        draws: usize,
        resizes: usize,
        releases: usize,
        draws_after_release: usize,
    }

    /// Surface that records calls into a shared log
    struct SpySurface {
        log: Rc<RefCell<SpyLog>>,
        released: bool,
    }

    impl SpySurface {
        fn new(log: &Rc<RefCell<SpyLog>>) -> Self {
            Self {
                log: log.clone(),
                released: false,
            }
        }
    }

    impl FieldSurface for SpySurface {
        fn draw(&mut self, _world: &World) {
            let mut log = self.log.borrow_mut();
            log.draws += 1;
            if self.released {
                log.draws_after_release += 1;
            }
        }

        fn resize(&mut self, _viewport: Viewport) {
            self.log.borrow_mut().resizes += 1;
        }

        fn release(&mut self) {
            self.released = true;
            self.log.borrow_mut().releases += 1;
        }
    }

    fn driver() -> FieldDriver<SpySurface> {
        FieldDriver::new(FieldSettings::default(), 2024)
    }

    const SIZE: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };
    const EMPTY: Viewport = Viewport {
        width: 0.0,
        height: 0.0,
    };

    #[test]
    fn test_defers_until_sized() {
        let mut d = driver();
        assert_eq!(d.phase(), LoopPhase::Uninitialized);
        assert_eq!(d.on_frame(0.0, EMPTY), FrameOutcome::Reschedule);
        assert_eq!(d.on_frame(TICK, Viewport::new(800.0, 0.0)), FrameOutcome::Reschedule);
        assert_eq!(d.phase(), LoopPhase::Uninitialized);
        assert!(d.world().is_none());
        assert_eq!(d.deferred_frames(), 2);

        assert_eq!(d.on_frame(2.0 * TICK, SIZE), FrameOutcome::Built(SIZE));
        assert_eq!(d.phase(), LoopPhase::Running);
        assert_eq!(d.world().unwrap().body_count(), 44);
        assert_eq!(d.pointer().unwrap().pos, glam::Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_running_steps_then_draws() {
        let log = Rc::new(RefCell::new(SpyLog::default()));
        let mut d = driver();
        d.on_frame(0.0, SIZE);
        assert!(d.attach_surface(SpySurface::new(&log)));

        for i in 1..=10 {
            assert_eq!(d.on_frame(i as f64 * TICK, SIZE), FrameOutcome::Reschedule);
        }
        assert_eq!(log.borrow().draws, 10);
        assert!(d.world().unwrap().ticks >= 9);
    }

    #[test]
    fn test_runs_without_surface() {
        let mut d = driver();
        d.on_frame(0.0, SIZE);
        d.on_frame(TICK, SIZE);
        d.on_frame(2.0 * TICK, SIZE);
        assert!(d.world().unwrap().ticks > 0);
        assert!(!d.handle().unwrap().has_surface());
    }

    #[test]
    fn test_teardown_stops_all_draws() {
        let log = Rc::new(RefCell::new(SpyLog::default()));
        let mut d = driver();
        let token = d.token();
        d.on_frame(0.0, SIZE);
        d.attach_surface(SpySurface::new(&log));
        d.on_frame(TICK, SIZE);
        let draws_before = log.borrow().draws;

        d.unmount();
        assert!(token.is_cancelled());
        assert_eq!(d.phase(), LoopPhase::TornDown);
        assert_eq!(log.borrow().releases, 1);
        assert!(d.world().is_none());

        // Stale callbacks after teardown
        for i in 2..20 {
            assert_eq!(d.on_frame(i as f64 * TICK, SIZE), FrameOutcome::Stop);
        }
        assert_eq!(log.borrow().draws, draws_before);
        assert_eq!(log.borrow().draws_after_release, 0);
    }

    #[test]
    fn test_teardown_before_deferred_build() {
        let log = Rc::new(RefCell::new(SpyLog::default()));
        let mut d = driver();
        d.unmount();

        // The deferred build frame fires after unmount
        assert_eq!(d.on_frame(0.0, SIZE), FrameOutcome::Stop);
        assert!(d.world().is_none());
        assert!(!d.attach_surface(SpySurface::new(&log)));
        assert_eq!(log.borrow().releases, 1);
        assert_eq!(log.borrow().draws, 0);
    }

    #[test]
    fn test_teardown_while_surface_pending() {
        let log = Rc::new(RefCell::new(SpyLog::default()));
        let mut d = driver();
        assert_eq!(d.on_frame(0.0, SIZE), FrameOutcome::Built(SIZE));

        // Surface creation is still in flight when the view unmounts
        d.unmount();
        assert!(!d.attach_surface(SpySurface::new(&log)));
        d.on_frame(TICK, SIZE);

        let log = log.borrow();
        assert_eq!(log.draws, 0);
        assert_eq!(log.releases, 1);
    }

    #[test]
    fn test_teardown_while_unsized() {
        let mut d = driver();
        d.on_frame(0.0, EMPTY);
        d.unmount();
        assert_eq!(d.on_frame(TICK, SIZE), FrameOutcome::Stop);
        assert!(d.world().is_none());
    }

    #[test]
    fn test_unmount_twice_is_noop() {
        let log = Rc::new(RefCell::new(SpyLog::default()));
        let mut d = driver();
        d.on_frame(0.0, SIZE);
        d.attach_surface(SpySurface::new(&log));
        d.unmount();
        d.unmount();
        assert_eq!(log.borrow().releases, 1);
    }

    #[test]
    fn test_pointer_and_resize() {
        let log = Rc::new(RefCell::new(SpyLog::default()));
        let mut d = driver();

        // Ignored before build
        d.set_pointer(1.0, 1.0);
        assert!(d.pointer().is_none());

        d.on_frame(0.0, SIZE);
        d.attach_surface(SpySurface::new(&log));
        d.set_pointer(10.0, 20.0);
        d.set_pointer(30.0, 40.0);
        assert_eq!(d.pointer().unwrap().pos, glam::Vec2::new(30.0, 40.0));
        d.set_pointer_from_client(250.0, 170.0, (100.0, 50.0));
        assert_eq!(d.pointer().unwrap().pos, glam::Vec2::new(150.0, 120.0));

        d.resize(EMPTY);
        assert_eq!(log.borrow().resizes, 0);
        d.resize(Viewport::new(1200.0, 900.0));
        assert_eq!(log.borrow().resizes, 1);
        assert_eq!(d.world().unwrap().viewport, Viewport::new(1200.0, 900.0));
        assert_eq!(d.world().unwrap().bodies.len(), 40);
    }

    #[test]
    fn test_replacing_surface_releases_old() {
        let log = Rc::new(RefCell::new(SpyLog::default()));
        let mut d = driver();
        d.on_frame(0.0, SIZE);
        d.attach_surface(SpySurface::new(&log));
        d.attach_surface(SpySurface::new(&log));
        assert_eq!(log.borrow().releases, 1);
    }

    #[test]
    fn test_drop_cancels_token() {
        let d = driver();
        let token = d.token();
        drop(d);
        assert!(token.is_cancelled());
    }
}

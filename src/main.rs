//! Shape Field entry point
//!
//! On the web this mounts the field into the page. Natively it runs the
//! simulation headless and logs how the bodies behave.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_field {
    use std::cell::RefCell;

    use shape_field::{FieldSettings, QualityPreset};
    use shape_field::platform::{
        self,
        web::{FieldMount, MotionMount, SmoothScrollMount},
    };
    use wasm_bindgen::prelude::*;

    /// Host element mounted at startup
    const DEFAULT_HOST_ID: &str = "shape-field";

    thread_local! {
        static FIELD: RefCell<Option<FieldMount>> = const { RefCell::new(None) };
        static SCROLL: RefCell<Option<SmoothScrollMount>> = const { RefCell::new(None) };
        static MOTION: RefCell<Vec<MotionMount>> = const { RefCell::new(Vec::new()) };
    }

    /// Mount the field into `element_id`, replacing any current mount.
    /// Returns false when the element does not exist.
    #[wasm_bindgen]
    pub fn mount_field(element_id: &str) -> bool {
        platform::init();
        unmount_field();
        let mount = FieldMount::mount(element_id, FieldSettings::load());
        let mounted = mount.is_some();
        FIELD.with(|f| *f.borrow_mut() = mount);
        mounted
    }

    #[wasm_bindgen]
    pub fn unmount_field() {
        if let Some(mount) = FIELD.with(|f| f.borrow_mut().take()) {
            mount.unmount();
        }
    }

    #[wasm_bindgen]
    pub fn mount_smooth_scroll() -> bool {
        platform::init();
        unmount_smooth_scroll();
        let mount = SmoothScrollMount::mount();
        let mounted = mount.is_some();
        SCROLL.with(|s| *s.borrow_mut() = mount);
        mounted
    }

    #[wasm_bindgen]
    pub fn unmount_smooth_scroll() {
        if let Some(mount) = SCROLL.with(|s| s.borrow_mut().take()) {
            mount.unmount();
        }
    }

    /// Run the orbiting dot `dot_id` around button `button_id`
    #[wasm_bindgen]
    pub fn mount_orbit(button_id: &str, dot_id: &str) -> bool {
        platform::init();
        push_motion(MotionMount::orbit(button_id, dot_id))
    }

    /// Stagger in the children of `group_id` when it scrolls into view
    #[wasm_bindgen]
    pub fn mount_entrance(group_id: &str) -> bool {
        platform::init();
        push_motion(MotionMount::entrance(group_id))
    }

    /// Stop every orbit and entrance animation
    #[wasm_bindgen]
    pub fn unmount_motion() {
        for mount in MOTION.with(|m| std::mem::take(&mut *m.borrow_mut())) {
            mount.unmount();
        }
    }

    fn push_motion(mount: Option<MotionMount>) -> bool {
        match mount {
            Some(mount) => {
                MOTION.with(|m| m.borrow_mut().push(mount));
                true
            }
            None => false,
        }
    }

    /// Store settings JSON for the next mount. Returns false if it does not parse.
    #[wasm_bindgen]
    pub fn save_field_settings(json: &str) -> bool {
        match FieldSettings::from_json(json) {
            Ok(settings) => {
                settings.save();
                true
            }
            Err(e) => {
                log::warn!("Rejected field settings: {}", e);
                false
            }
        }
    }

    /// Store a quality preset ("low", "medium", "high") for the next mount
    #[wasm_bindgen]
    pub fn set_field_quality(name: &str) -> bool {
        let Some(preset) = QualityPreset::from_str(name) else {
            return false;
        };
        let mut settings = FieldSettings::load();
        settings.quality = preset;
        settings.save();
        log::info!("Field quality set to {}", preset.as_str());
        true
    }

    pub fn start() {
        platform::init();
        log::info!("Shape Field starting...");
        if !mount_field(DEFAULT_HOST_ID) {
            log::info!("No #{} element, waiting for mount_field()", DEFAULT_HOST_ID);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_field::start();
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use shape_field::consts::{TICK_MS, WALL_MARGIN};
    use shape_field::sim::{Viewport, World};
    use shape_field::{FieldDriver, FieldSettings, FieldSurface, FrameOutcome};

    /// Surface that only counts frames
    #[derive(Default)]
    pub struct CountingSurface {
        pub frames: u64,
    }

    impl FieldSurface for CountingSurface {
        fn draw(&mut self, _world: &World) {
            self.frames += 1;
        }

        fn resize(&mut self, _viewport: Viewport) {}

        fn release(&mut self) {
            log::info!("Headless surface released after {} frames", self.frames);
        }
    }

    fn escaped(world: &World) -> usize {
        world
            .bodies
            .iter()
            .filter(|b| !world.viewport.contains(b.pos, WALL_MARGIN))
            .count()
    }

    pub fn run(seed: u64, frames: u32) {
        let viewport = Viewport::new(800.0, 600.0);
        let settings = FieldSettings::load();
        let mut driver: FieldDriver<CountingSurface> = FieldDriver::new(settings, seed);

        for frame in 0..frames {
            let time = frame as f64 * TICK_MS as f64;
            match driver.on_frame(time, viewport) {
                FrameOutcome::Built(_) => {
                    driver.attach_surface(CountingSurface::default());
                }
                FrameOutcome::Reschedule => {}
                FrameOutcome::Stop => break,
            }

            if frame % 60 == 0 {
                if let Some(world) = driver.world() {
                    log::info!(
                        "tick {:>5}: energy {:>10.2}, outside margin {}",
                        world.ticks,
                        world.kinetic_energy(),
                        escaped(world)
                    );
                }
            }
        }

        if let Some(world) = driver.world() {
            log::info!(
                "Finished {} ticks with {} bodies, {} outside margin",
                world.ticks,
                world.body_count(),
                escaped(world)
            );
        }
        driver.unmount();
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    shape_field::platform::init();
    log::info!("Shape Field (native) starting headless run...");

    // Usage: shape-field [seed] [frames]
    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let frames = args.next().and_then(|s| s.parse().ok()).unwrap_or(600);

    headless::run(seed, frames);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

//! Browser glue: host lookup, canvas surface, listeners and frame scheduling

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, anyhow};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Element, Event, EventTarget, HtmlCanvasElement, HtmlElement,
    MouseEvent, TouchEvent, WheelEvent,
};

use crate::driver::{CancelToken, FieldDriver, FieldSurface, FrameOutcome};
use crate::motion::{Entrance, EntranceTimeline, OrbitDot, SmoothScroll};
use crate::renderer::RenderState;
use crate::settings::{FieldSettings, QualityPreset};
use crate::sim::{Viewport, World};

type SharedDriver = Rc<RefCell<FieldDriver<CanvasSurface>>>;

/// Distance entrance items rise from
const ENTRANCE_OFFSET_PX: f32 = 30.0;

fn js_err(value: JsValue) -> anyhow::Error {
    anyhow!("{:?}", value)
}

/// Host size in layout pixels
fn host_viewport(host: &Element) -> Viewport {
    let rect = host.get_bounding_client_rect();
    Viewport::new(rect.width() as f32, rect.height() as f32)
}

/// Canvas appended to the host plus its GPU state
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    state: RenderState,
}

impl FieldSurface for CanvasSurface {
    fn draw(&mut self, world: &World) {
        self.state.draw(world);
    }

    fn resize(&mut self, viewport: Viewport) {
        let ratio = self.state.pixel_ratio;
        self.canvas
            .set_width(((viewport.width * ratio) as u32).max(1));
        self.canvas
            .set_height(((viewport.height * ratio) as u32).max(1));
        FieldSurface::resize(&mut self.state, viewport);
    }

    fn release(&mut self) {
        self.state.release();
        self.canvas.remove();
    }
}

async fn create_surface(
    host: &Element,
    viewport: Viewport,
    quality: QualityPreset,
) -> anyhow::Result<CanvasSurface> {
    let window = web_sys::window().context("no window")?;
    let document = window.document().context("no document")?;

    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| anyhow!("created element is not a canvas"))?;

    let pixel_ratio = if quality.use_device_pixel_ratio() {
        window.device_pixel_ratio() as f32
    } else {
        1.0
    };
    let width = ((viewport.width * pixel_ratio) as u32).max(1);
    let height = ((viewport.height * pixel_ratio) as u32).max(1);
    canvas.set_width(width);
    canvas.set_height(height);

    let style = canvas.style();
    for (name, value) in [
        ("position", "absolute"),
        ("inset", "0"),
        ("width", "100%"),
        ("height", "100%"),
        ("display", "block"),
        ("pointer-events", "none"),
    ] {
        style.set_property(name, value).map_err(js_err)?;
    }
    host.append_child(&canvas).map_err(js_err)?;

    match init_gpu(&canvas, width, height, pixel_ratio, quality).await {
        Ok(state) => Ok(CanvasSurface { canvas, state }),
        Err(e) => {
            canvas.remove();
            Err(e)
        }
    }
}

async fn init_gpu(
    canvas: &HtmlCanvasElement,
    width: u32,
    height: u32,
    pixel_ratio: f32,
    quality: QualityPreset,
) -> anyhow::Result<RenderState> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
        ..Default::default()
    });

    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        .context("Failed to create surface")?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .context("Failed to get adapter")?;

    log::info!("Using adapter: {:?}", adapter.get_info().name);

    RenderState::new(
        surface,
        &adapter,
        width,
        height,
        pixel_ratio,
        quality.circle_segments(),
    )
    .await
}

/// An attached DOM listener, removed on [`Listener::detach`]
struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Self {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        let _ = target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            closure.as_ref().unchecked_ref(),
            &options,
        );
        Self {
            target: target.clone(),
            kind,
            closure,
        }
    }

    fn detach(self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

/// One mounted field: the host element, its driver and listeners
pub struct FieldMount {
    host: Element,
    driver: SharedDriver,
    listeners: Vec<Listener>,
}

impl FieldMount {
    /// Mount into the element with `element_id`. A missing host is a no-op.
    pub fn mount(element_id: &str, settings: FieldSettings) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let Some(host) = document.get_element_by_id(element_id) else {
            log::warn!("No host element #{}, field not mounted", element_id);
            return None;
        };

        let seed = js_sys::Date::now() as u64;
        let driver = Rc::new(RefCell::new(FieldDriver::new(settings, seed)));
        let mut mount = Self {
            host,
            driver,
            listeners: Vec::new(),
        };
        mount.attach_listeners();
        request_frame(mount.host.clone(), mount.driver.clone());
        Some(mount)
    }

    fn attach_listeners(&mut self) {
        let host_target: &EventTarget = self.host.as_ref();

        {
            let driver = self.driver.clone();
            let host = self.host.clone();
            self.listeners.push(Listener::attach(
                host_target,
                "mousemove",
                true,
                move |event| {
                    if let Some(event) = event.dyn_ref::<MouseEvent>() {
                        let rect = host.get_bounding_client_rect();
                        driver.borrow_mut().set_pointer_from_client(
                            event.client_x() as f32,
                            event.client_y() as f32,
                            (rect.left() as f32, rect.top() as f32),
                        );
                    }
                },
            ));
        }

        for kind in ["touchstart", "touchmove"] {
            let driver = self.driver.clone();
            let host = self.host.clone();
            self.listeners
                .push(Listener::attach(host_target, kind, true, move |event| {
                    let touch = event
                        .dyn_ref::<TouchEvent>()
                        .and_then(|e| e.touches().get(0));
                    if let Some(touch) = touch {
                        let rect = host.get_bounding_client_rect();
                        driver.borrow_mut().set_pointer_from_client(
                            touch.client_x() as f32,
                            touch.client_y() as f32,
                            (rect.left() as f32, rect.top() as f32),
                        );
                    }
                }));
        }

        if let Some(window) = web_sys::window() {
            let driver = self.driver.clone();
            let host = self.host.clone();
            self.listeners.push(Listener::attach(
                window.as_ref(),
                "resize",
                true,
                move |_event| {
                    driver.borrow_mut().resize(host_viewport(&host));
                },
            ));
        }
    }

    /// Detach listeners, then tear the driver down
    pub fn unmount(mut self) {
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
        self.driver.borrow_mut().unmount();
    }
}

fn request_frame(host: Element, driver: SharedDriver) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let token = driver.borrow().token();
    let closure = Closure::once(move |time: f64| {
        if token.is_cancelled() {
            return;
        }
        field_frame(host, driver, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn field_frame(host: Element, driver: SharedDriver, time: f64) {
    let outcome = driver.borrow_mut().on_frame(time, host_viewport(&host));
    match outcome {
        FrameOutcome::Stop => return,
        FrameOutcome::Reschedule => {}
        FrameOutcome::Built(viewport) => spawn_surface(&host, &driver, viewport),
    }
    request_frame(host, driver);
}

/// Create the canvas surface off-frame and hand it to the driver when ready
fn spawn_surface(host: &Element, driver: &SharedDriver, viewport: Viewport) {
    let (token, quality) = {
        let d = driver.borrow();
        (d.token(), d.settings().quality)
    };
    let host = host.clone();
    let driver = driver.clone();
    wasm_bindgen_futures::spawn_local(async move {
        match create_surface(&host, viewport, quality).await {
            Ok(mut surface) => {
                if token.is_cancelled() {
                    surface.release();
                    return;
                }
                // The host may have changed size while the GPU came up
                let current = host_viewport(&host);
                if current.is_ready() && current != viewport {
                    surface.resize(current);
                }
                driver.borrow_mut().attach_surface(surface);
            }
            Err(e) => log::error!("GPU init failed, field runs without drawing: {:#}", e),
        }
    });
}

/// Wheel-driven smooth scrolling of the window
pub struct SmoothScrollMount {
    token: CancelToken,
    listener: Option<Listener>,
}

impl SmoothScrollMount {
    pub fn mount() -> Option<Self> {
        let window = web_sys::window()?;
        let scroller = Rc::new(RefCell::new(SmoothScroll::new(scroll_limit(&window))));
        scroller.borrow_mut().jump_to(window.scroll_y().unwrap_or(0.0) as f32);

        let listener = {
            let scroller = scroller.clone();
            Listener::attach(window.as_ref(), "wheel", false, move |event| {
                if let Some(event) = event.dyn_ref::<WheelEvent>() {
                    event.prevent_default();
                    scroller.borrow_mut().on_wheel(event.delta_y() as f32);
                }
            })
        };

        let token = CancelToken::new();
        animate(token.clone(), move |dt| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let mut s = scroller.borrow_mut();
            s.set_limit(scroll_limit(&window));
            if !s.is_animating() {
                // Follow scrollbar and keyboard scrolling
                s.jump_to(window.scroll_y().unwrap_or(0.0) as f32);
            }
            if let Some(y) = s.advance(dt) {
                window.scroll_to_with_x_and_y(0.0, y as f64);
            }
        });
        log::info!("Smooth scroll mounted");
        Some(Self {
            token,
            listener: Some(listener),
        })
    }

    pub fn unmount(mut self) {
        self.token.cancel();
        if let Some(listener) = self.listener.take() {
            listener.detach();
        }
        log::info!("Smooth scroll unmounted");
    }
}

fn scroll_limit(window: &web_sys::Window) -> f32 {
    let inner = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let content = window
        .document()
        .and_then(|d| d.document_element())
        .map(|e| e.scroll_height() as f64)
        .unwrap_or(0.0);
    (content - inner).max(0.0) as f32
}

/// Run `frame(dt_seconds)` on every animation frame until `token` is cancelled
fn animate(token: CancelToken, frame: impl FnMut(f32) + 'static) {
    request_motion_frame(token, Rc::new(RefCell::new(frame)), None);
}

fn request_motion_frame(
    token: CancelToken,
    frame: Rc<RefCell<dyn FnMut(f32)>>,
    last_time: Option<f64>,
) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(move |time: f64| {
        if token.is_cancelled() {
            return;
        }
        let dt = last_time.map_or(0.0, |last| ((time - last) / 1000.0) as f32);
        (frame.borrow_mut())(dt);
        request_motion_frame(token, frame, Some(time));
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

/// A running element animation (orbit dot or entrance group)
pub struct MotionMount {
    token: CancelToken,
}

impl MotionMount {
    /// Move `dot_id` around the rounded outline of `button_id`, one lap per period
    pub fn orbit(button_id: &str, dot_id: &str) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let button = document.get_element_by_id(button_id)?;
        let dot: HtmlElement = document.get_element_by_id(dot_id)?.dyn_into().ok()?;

        let rect = button.get_bounding_client_rect();
        let mut orbit = OrbitDot::new(rect.width() as f32, rect.height() as f32);
        let token = CancelToken::new();
        animate(token.clone(), move |dt| {
            let rect = button.get_bounding_client_rect();
            orbit.resize(rect.width() as f32, rect.height() as f32);
            let style = dot.style();
            match orbit.advance(dt) {
                Some(p) => {
                    let _ = style.set_property("visibility", "visible");
                    let _ = style.set_property(
                        "transform",
                        &format!("translate({}px, {}px) translate(-50%, -50%)", p.x, p.y),
                    );
                }
                // Button not laid out yet
                None => {
                    let _ = style.set_property("visibility", "hidden");
                }
            }
        });
        log::info!("Orbit mounted on #{}", button_id);
        Some(Self { token })
    }

    /// Stagger the children of `group_id` in once the group scrolls into view,
    /// and back out when it scrolls away
    pub fn entrance(group_id: &str) -> Option<Self> {
        let window = web_sys::window()?;
        let group = window.document()?.get_element_by_id(group_id)?;
        let children = group.children();
        let items: Vec<HtmlElement> = (0..children.length())
            .filter_map(|i| children.item(i))
            .filter_map(|e| e.dyn_into::<HtmlElement>().ok())
            .collect();

        let mut timeline = EntranceTimeline::new(Entrance::default(), items.len());
        let mut shown: Option<f32> = None;
        let token = CancelToken::new();
        animate(token.clone(), move |dt| {
            let viewport_height = window
                .inner_height()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0) as f32;
            let top = group.get_bounding_client_rect().top() as f32;
            timeline.update(top, viewport_height, dt);
            if shown == Some(timeline.time()) {
                return;
            }
            shown = Some(timeline.time());
            for (i, item) in items.iter().enumerate() {
                let p = timeline.progress(i);
                let style = item.style();
                let _ = style.set_property("opacity", &p.to_string());
                let _ = style.set_property(
                    "transform",
                    &format!("translateY({}px)", (1.0 - p) * ENTRANCE_OFFSET_PX),
                );
            }
        });
        log::info!("Entrance mounted on #{}", group_id);
        Some(Self { token })
    }

    pub fn unmount(self) {
        self.token.cancel();
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Instant;

use crossbeam_utils::atomic::AtomicCell;
use geom::{Point, Rect};
use scopeguard::guard;
use tracing::info;

use crate::canvas::Canvas;
use crate::component::{Component, Container, ContainerCore, same_component};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::platform::{Color, Platform, Texture};
use crate::touch::{TouchResponse, TouchSample, Touchpad};

/// A cloneable cancellation handle for the frame loop, checked once per
/// frame. There is no mid-frame cancellation point: an in-progress frame
/// always completes.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the frame loop to stop after the current frame.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether `cancel` was called.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// The backdrop container at the top of the tree. Always visible, sized to
/// the display, and skipped by the input walk (it is passive).
pub struct Root {
    core: ContainerCore,
    background: Color,
    wallpaper: AtomicCell<Option<Texture>>,
}

impl Root {
    fn new(background: Color) -> Arc<Self> {
        Arc::new_cyclic(|me: &std::sync::Weak<Self>| {
            let root = Self {
                core: ContainerCore::default(),
                background,
                wallpaper: AtomicCell::new(None),
            };
            let weak: std::sync::Weak<dyn Component> = me.clone();
            root.core.component_core().adopt_this(weak);
            root
        })
    }

    /// Draw a wallpaper texture instead of clearing to the background color.
    pub fn set_wallpaper(&self, texture: Option<Texture>) {
        self.wallpaper.store(texture);
    }
}

impl Component for Root {
    fn core(&self) -> &crate::component::ComponentCore {
        self.core.component_core()
    }

    fn draw(&self, _canvas: &Canvas, platform: &mut dyn Platform) {
        match self.wallpaper.load() {
            Some(texture) => platform.draw_texture(texture, Point::zero(), Color::WHITE),
            None => platform.clear(self.background),
        }
    }

    fn as_container(&self) -> Option<&dyn Container> {
        Some(self)
    }
}

impl Container for Root {
    fn container_core(&self) -> &ContainerCore {
        &self.core
    }
}

/// Frame-thread-local traversal state: the canvas stack, the touchpad state
/// machine and the currently focus-locked acceptor. Never shared and never
/// persisted across `run` calls.
struct FrameState {
    cc: Canvas,
    tp: Touchpad,
    acceptor: Option<Arc<dyn Component>>,
}

impl FrameState {
    fn new(width: u32, height: u32) -> Self {
        Self {
            cc: Canvas::new(width, height),
            tp: Touchpad::default(),
            acceptor: None,
        }
    }

    fn is_acceptor(&self, c: &Arc<dyn Component>) -> bool {
        self.acceptor
            .as_ref()
            .is_some_and(|a| same_component(&**a, &**c))
    }
}

/// Owns the component tree and drives the per-frame sequence: input
/// sampling, focus-locked dispatch, hit-testing, frame ticks and the draw
/// traversal. One dedicated thread calls [`Display::run`]; everything inside
/// a frame happens sequentially on that thread.
pub struct Display {
    cfg: Config,
    running: AtomicBool,
    millis: AtomicI64,
    root: Arc<Root>,
}

impl Display {
    /// Create a display for the given configuration.
    pub fn new(cfg: Config) -> Self {
        let root = Root::new(cfg.display.background_color);
        root.set_bounds(Rect::new(
            0,
            0,
            cfg.display.width as i32,
            cfg.display.height as i32,
        ));
        Self {
            cfg,
            running: AtomicBool::new(false),
            millis: AtomicI64::new(0),
            root,
        }
    }

    /// The root container components are attached under.
    pub fn root(&self) -> &Arc<Root> {
        &self.root
    }

    /// The configuration this display was created with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// The frame loop's monotonic millisecond counter. Readable from any
    /// thread; only the frame thread advances it.
    pub fn millis(&self) -> i64 {
        self.millis.load(Ordering::Acquire)
    }

    /// Drive the frame loop until the platform reports a close request
    /// (returns `Ok`) or the token is cancelled (returns `Error::Cancelled`,
    /// the loop's termination cause). A second call while the loop is
    /// running fails fast with `Error::Exists`.
    pub fn run(&self, platform: &mut dyn Platform, cancel: &CancelToken) -> Result<()> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Exists("display loop is already running".into()));
        }
        let _running = guard(&self.running, |r| r.store(false, Ordering::Release));
        info!(config = ?self.cfg, "display loop starting");
        platform.init(&self.cfg.display);
        let result = self.frame_loop(platform, cancel);
        platform.close_window();
        info!("display loop finished");
        result
    }

    fn frame_loop(&self, platform: &mut dyn Platform, cancel: &CancelToken) -> Result<()> {
        let mut fs = FrameState::new(self.cfg.display.width, self.cfg.display.height);
        let start = Instant::now();
        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if platform.window_should_close() {
                return Ok(());
            }
            let millis = start.elapsed().as_millis() as i64;
            self.millis.store(millis, Ordering::Release);
            self.form_frame(&mut fs, millis, platform);
        }
    }

    /// One complete frame: input, ticks, draw. Strictly sequential; handlers
    /// run synchronously on the frame thread.
    fn form_frame(&self, fs: &mut FrameState, millis: i64, platform: &mut dyn Platform) {
        let tps = fs.tp.on_new_frame(millis, &*platform);

        // While a component holds the focus lock and keeps claiming the
        // pointer, everything else is bypassed. The lock is dropped when the
        // holder declines or was closed.
        let keep_lock = match &fs.acceptor {
            Some(a) if !a.core().is_closed() => {
                a.as_touch_handler().map(|h| h.on_touch(tps)) == Some(TouchResponse::Lock)
            }
            _ => false,
        };
        if !keep_lock {
            fs.acceptor = None;
            // The root is passive; start from its children.
            self.dispatch_touch_children(fs, &*self.root, tps);
        }

        if let Some(fl) = &self.cfg.frame_listener {
            fl.on_frame(millis);
        }
        Self::tick(&*self.root, millis);

        platform.begin_drawing();
        let root: Arc<dyn Component> = self.root.clone();
        self.draw_component(fs, platform, &root, true);
        platform.end_drawing();
    }

    /// Pre-order frame-tick walk. Every component implementing the listener
    /// capability is notified, regardless of visibility or clipping.
    fn tick(c: &dyn Component, millis: i64) {
        if let Some(fl) = c.as_frame_listener() {
            fl.on_frame(millis);
        }
        if let Some(cont) = c.as_container() {
            for child in cont.children().iter() {
                Self::tick(&**child, millis);
            }
        }
    }

    /// Hit-test scan over a container's children, topmost (last drawn)
    /// first. Children that don't contain the pointer, are invisible or were
    /// closed are skipped.
    fn dispatch_touch_children(
        &self,
        fs: &mut FrameState,
        cont: &dyn Container,
        tps: TouchSample,
    ) -> TouchResponse {
        if fs.acceptor.is_some() {
            return TouchResponse::Lock;
        }
        let (x, y) = fs.cc.relative_point(tps.pos.x as i32, tps.pos.y as i32);
        let children = cont.children();
        for child in children.iter().rev() {
            if !child.bounds().contains(Point::new(x, y))
                || !child.is_visible()
                || child.core().is_closed()
            {
                continue;
            }
            let res = self.dispatch_touch_component(fs, child, tps);
            if res != TouchResponse::Pass {
                return res;
            }
        }
        TouchResponse::Pass
    }

    /// Offer the sample to a component subtree: descendants get priority,
    /// then the component's own handler. A `Lock` result records the
    /// component as the focus holder for the following frames.
    fn dispatch_touch_component(
        &self,
        fs: &mut FrameState,
        c: &Arc<dyn Component>,
        tps: TouchSample,
    ) -> TouchResponse {
        let offset = c.as_scrollable().map(|s| s.offset()).unwrap_or_default();
        fs.cc.push_region(offset, c.bounds());
        let res = self.dispatch_touch_clipped(fs, c, tps);
        fs.cc.pop();
        res
    }

    fn dispatch_touch_clipped(
        &self,
        fs: &mut FrameState,
        c: &Arc<dyn Component>,
        tps: TouchSample,
    ) -> TouchResponse {
        if !fs.cc.physical_region().has_area() {
            return TouchResponse::Pass;
        }
        if let Some(cont) = c.as_container() {
            let res = self.dispatch_touch_children(fs, cont, tps);
            if res != TouchResponse::Pass {
                return res;
            }
        }
        if let Some(handler) = c.as_touch_handler() {
            let res = handler.on_touch(tps);
            if res == TouchResponse::Lock {
                fs.acceptor = Some(Arc::clone(c));
            }
            return res;
        }
        TouchResponse::Pass
    }

    /// Draw a component and its subtree. Returns false when the component is
    /// the focus-locked acceptor and `force` is not set - the caller defers
    /// it and draws it after its siblings so the active component lands on
    /// top. A clipped-to-nothing component counts as drawn.
    fn draw_component(
        &self,
        fs: &mut FrameState,
        platform: &mut dyn Platform,
        c: &Arc<dyn Component>,
        force: bool,
    ) -> bool {
        if !force && fs.is_acceptor(c) {
            return false;
        }
        let prev = fs.cc.physical_region();
        let offset = c.as_scrollable().map(|s| s.offset()).unwrap_or_default();
        fs.cc.push_region(offset, c.bounds());
        let cur = fs.cc.physical_region();
        let mut scissored = false;
        if cur.has_area() {
            if cur != prev {
                scissored = true;
                platform.begin_scissor(cur);
            }
            c.draw(&fs.cc, platform);
            if let Some(cont) = c.as_container() {
                self.draw_children(fs, platform, cont);
            }
            // Overlays render above all children, the deferred focus holder
            // included.
            if let Some(pd) = c.as_post_draw() {
                pd.draw_after(&fs.cc, platform);
            }
        }
        fs.cc.pop();
        if fs.cc.is_base() {
            platform.end_scissor();
        } else if scissored {
            platform.begin_scissor(prev);
        }
        true
    }

    /// Draw a container's children in insertion order, deferring the
    /// focus-locked acceptor (if among them) to the end.
    fn draw_children(&self, fs: &mut FrameState, platform: &mut dyn Platform, cont: &dyn Container) {
        let mut active: Option<Arc<dyn Component>> = None;
        let children = cont.children();
        for child in children.iter() {
            if !fs.cc.is_visible(child.bounds())
                || !child.is_visible()
                || child.core().is_closed()
            {
                continue;
            }
            if !self.draw_component(fs, platform, child, false) {
                active = Some(Arc::clone(child));
            }
        }
        if let Some(active) = active {
            self.draw_component(fs, platform, &active, true);
        }
    }
}

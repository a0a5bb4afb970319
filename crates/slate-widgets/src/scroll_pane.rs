use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use slate_core::{
    Canvas, Component, ComponentCore, Container, ContainerCore, FrameListener, InertialScroller,
    Platform, PostDraw, Rect, Result, ScrollAxes, Scrollable, TouchHandler, default_deceleration,
};

use crate::style::Style;

/// Which scrollbars a [`ScrollPane`] renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollBars(u8);

impl ScrollBars {
    /// No scrollbars.
    pub const NONE: Self = Self(0);
    /// A horizontal bar along the bottom edge.
    pub const HORIZONTAL: Self = Self(1);
    /// A vertical bar along the right edge.
    pub const VERTICAL: Self = Self(2);
    /// Both bars.
    pub const BOTH: Self = Self(3);

    fn horizontal(self) -> bool {
        self.0 & Self::HORIZONTAL.0 != 0
    }

    fn vertical(self) -> bool {
        self.0 & Self::VERTICAL.0 != 0
    }

    fn any(self) -> bool {
        self.0 != 0
    }
}

/// Construction options for a [`ScrollPane`].
#[derive(Debug, Clone, Copy)]
pub struct ScrollPaneOptions {
    /// Which axes the pane scrolls along.
    pub axes: ScrollAxes,
    /// Which scrollbars to render.
    pub bars: ScrollBars,
    /// Grow the virtual area every frame to enclose all children.
    pub auto_virtual_size: bool,
    /// Use the light scrollbar color.
    pub light_bars: bool,
}

impl Default for ScrollPaneOptions {
    fn default() -> Self {
        Self {
            axes: ScrollAxes::BOTH,
            bars: ScrollBars::BOTH,
            auto_virtual_size: true,
            light_bars: false,
        }
    }
}

/// A container whose children live on a virtual area larger than the pane,
/// scrolled with inertia.
///
/// The pane owns a [`ContainerCore`] for the tree and an
/// [`InertialScroller`] for the physics, forwarding the touch and scrollable
/// capabilities straight to the scroller and wrapping its frame tick to
/// track scrollbar fade-out. Scrollbars render in the post-draw hook so they
/// sit above the children. The pane draws no background of its own.
pub struct ScrollPane {
    core: ContainerCore,
    scroller: InertialScroller,
    style: Arc<Style>,
    opts: ScrollPaneOptions,
    /// -1 while the pointer is locked, otherwise the release frame time.
    release_millis: AtomicI64,
    last_millis: AtomicI64,
}

impl ScrollPane {
    /// Construct a pane. The scroller's deceleration and sample window are
    /// derived from the display's frame rate.
    pub fn new(style: Arc<Style>, opts: ScrollPaneOptions, fps: u32) -> Result<Arc<Self>> {
        let pane = Arc::new(Self {
            core: ContainerCore::default(),
            scroller: InertialScroller::default(),
            style,
            opts,
            release_millis: AtomicI64::new(0),
            last_millis: AtomicI64::new(0),
        });
        let handle: Arc<dyn Component> = pane.clone();
        pane.scroller.init(
            Arc::downgrade(&handle),
            Rect::default(),
            default_deceleration(fps),
            pane.opts.axes,
            fps,
        )?;
        Ok(pane)
    }

    /// Replace the virtual area (content size and scroll origin).
    pub fn set_virtual_bounds(&self, bounds: Rect) {
        self.scroller.set_virtual_bounds(bounds);
    }

    /// The virtual area.
    pub fn virtual_bounds(&self) -> Rect {
        self.scroller.virtual_bounds()
    }

    /// Whether the pane currently owns the pointer.
    pub fn is_locked(&self) -> bool {
        self.scroller.is_locked()
    }

    /// Grow the virtual area to enclose all children, keeping the current
    /// scroll origin.
    fn auto_resize(&self) {
        let bnds = self.bounds();
        let mut left = -1;
        let mut top = -1;
        let mut width = bnds.w;
        let mut height = bnds.h;
        for c in self.children().iter() {
            let b = c.bounds();
            if b.x >= 0 {
                left = if left < 0 { b.x } else { b.x.min(left) };
            }
            if b.y >= 0 {
                top = if top < 0 { b.y } else { b.y.min(top) };
            }
            width = (b.x + b.w).max(width);
            height = (b.y + b.h).max(height);
        }
        width += left;
        height += top;
        let mut vb = self.scroller.virtual_bounds();
        if width != vb.w || height != vb.h {
            vb.w = width;
            vb.h = height;
            self.scroller.set_virtual_bounds(vb);
        }
    }

    fn should_draw_bars(&self) -> bool {
        if !self.opts.bars.any() {
            return false;
        }
        if self.scroller.is_locked() {
            return true;
        }
        let released = self.release_millis.load(Ordering::Acquire);
        if released == 0 {
            return false;
        }
        self.last_millis.load(Ordering::Acquire) - released < self.style.scroll_bar_disappear_millis
    }
}

impl Component for ScrollPane {
    fn core(&self) -> &ComponentCore {
        self.core.component_core()
    }

    fn as_container(&self) -> Option<&dyn Container> {
        Some(self)
    }

    fn as_touch_handler(&self) -> Option<&dyn TouchHandler> {
        Some(&self.scroller)
    }

    fn as_scrollable(&self) -> Option<&dyn Scrollable> {
        Some(&self.scroller)
    }

    fn as_frame_listener(&self) -> Option<&dyn FrameListener> {
        Some(self)
    }

    fn as_post_draw(&self) -> Option<&dyn PostDraw> {
        Some(self)
    }
}

impl Container for ScrollPane {
    fn container_core(&self) -> &ContainerCore {
        &self.core
    }
}

impl FrameListener for ScrollPane {
    fn on_frame(&self, millis: i64) {
        if self.opts.auto_virtual_size {
            self.auto_resize();
        }
        if self.scroller.is_locked() {
            self.release_millis.store(-1, Ordering::Release);
        } else if self.release_millis.load(Ordering::Acquire) == -1 {
            self.release_millis.store(millis, Ordering::Release);
        }
        self.last_millis.store(millis, Ordering::Release);
        self.scroller.on_frame(millis);
    }
}

impl PostDraw for ScrollPane {
    fn draw_after(&self, canvas: &Canvas, platform: &mut dyn Platform) {
        if !self.should_draw_bars() {
            return;
        }
        let bi = self.bounds();
        let vbi = self.scroller.virtual_bounds();
        let (bw0, bh0) = (bi.w as f32, bi.h as f32);
        let (vbx, vby, vbw, vbh) = (vbi.x as f32, vbi.y as f32, vbi.w as f32, vbi.h as f32);

        let show_h = bw0 < vbw && self.opts.bars.horizontal();
        let show_v = bh0 < vbh && self.opts.bars.vertical();
        let col = if self.opts.light_bars {
            self.style.scroll_bar_light_color
        } else {
            self.style.scroll_bar_dark_color
        };
        let w = self.style.mm_to_px(self.style.scroll_bar_thickness_mm);
        let space = self.style.mm_to_px(self.style.scroll_bar_offset_mm);

        // The thumb length is proportional to the visible fraction,
        // shrinking further while the rubber band is stretched past either
        // end; the offset tracks the scroll position along the track.
        if show_h {
            let mut bw = bw0;
            if show_v {
                bw -= space + w;
            }
            let mut ln = bw * bw / vbw;
            if vbx < 0.0 {
                ln = bw * bw / (vbw - vbx);
            }
            if vbx > vbw - bw {
                ln = bw * bw / (vbx + bw);
            }
            ln = bw.min(ln.max(w));

            let mut offs = 0.0;
            if vbx > 0.0 {
                offs = (bw - ln) * 1.0_f32.min(vbx / (vbw - bw));
            }

            let (px, py) = canvas.physical_point(vbi.x, vbi.y);
            let x = px as f32 + offs;
            let y = py as f32 + bh0 - w - space;
            platform.fill_rounded_rect(
                Rect::new(x as i32, y as i32, ln as i32, w as i32),
                1.0,
                col,
            );
        }
        if show_v {
            let mut bh = bh0;
            if show_h {
                bh -= space + w;
            }
            let mut ln = bh * bh / vbh;
            if vby < 0.0 {
                ln = bh * bh / (vbh - vby);
            }
            if vby > vbh - bh {
                ln = bh * bh / (vby + bh);
            }
            ln = bh.min(ln.max(w));

            let mut offs = 0.0;
            if vby > 0.0 {
                offs = (bh - ln) * 1.0_f32.min(vby / (vbh - bh));
            }

            let (px, py) = canvas.physical_point(vbi.x, vbi.y);
            let x = px as f32 + bw0 - w - space;
            let y = py as f32 + offs;
            platform.fill_rounded_rect(
                Rect::new(x as i32, y as i32, w as i32, ln as i32),
                1.0,
                col,
            );
        }
    }
}

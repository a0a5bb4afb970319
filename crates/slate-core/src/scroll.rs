use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;

use crossbeam_utils::atomic::AtomicCell;
use geom::{Point, Rect, Vec2};
use parking_lot::Mutex;

use crate::component::{Component, FrameListener};
use crate::error::{Error, Result};
use crate::ring::RingBuffer;
use crate::touch::{TouchHandler, TouchPhase, TouchResponse, TouchSample};

/// Capability contract for components whose drawing grid is shifted relative
/// to their box. The returned point becomes the virtual offset of the canvas
/// frame pushed for the component, for both drawing and hit-testing.
pub trait Scrollable: Send + Sync {
    /// The current origin of the virtual area.
    fn offset(&self) -> Point;
}

/// Which axes a scroller moves along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAxes(u8);

impl ScrollAxes {
    /// Horizontal scrolling only.
    pub const HORIZONTAL: Self = Self(1);
    /// Vertical scrolling only.
    pub const VERTICAL: Self = Self(2);
    /// Free scrolling along both axes.
    pub const BOTH: Self = Self(3);

    /// Whether horizontal movement is enabled.
    pub fn horizontal(self) -> bool {
        self.0 & Self::HORIZONTAL.0 != 0
    }

    /// Whether vertical movement is enabled.
    pub fn vertical(self) -> bool {
        self.0 & Self::VERTICAL.0 != 0
    }

    /// Whether both axes are enabled.
    pub fn is_both(self) -> bool {
        self.0 & Self::BOTH.0 == Self::BOTH.0
    }
}

/// The default deceleration for the given frame rate, tuned for 60 FPS on an
/// 800x600 screen. Lower (more negative) values stop the movement faster.
pub fn default_deceleration(fps: u32) -> Vec2 {
    let d = -8.0 / fps.max(1) as f32;
    Vec2::new(d, d)
}

/// Scrolls a virtual area larger than the owning component's viewport, with
/// inertia after release.
///
/// The virtual bounds rectangle carries both the scrollable content size and
/// the current scroll offset: the offset is its origin. While a drag is
/// locked the offset follows the finger; on release a velocity estimate is
/// derived from a short trailing window of samples and decays over the
/// following frames. When no drag holds the scroller, an origin outside
/// `[0, content - viewport]` is eased back by roughly a third of the
/// overshoot per frame rather than snapped.
///
/// The scroller implements [`FrameListener`], [`Scrollable`] and
/// [`TouchHandler`]; a component owns one and forwards those capabilities to
/// it, optionally wrapping them to add its own per-frame work.
pub struct InertialScroller {
    virt_bounds: AtomicCell<Rect>,
    locked: AtomicBool,
    inner: Mutex<ScrollerInner>,
}

struct ScrollerInner {
    axes: ScrollAxes,
    /// Per-axis deceleration; both components strictly negative.
    decel: Vec2,
    owner: Option<Weak<dyn Component>>,
    prev_pos: Vec2,
    since_millis: i64,
    diff: Vec2,
    samples: RingBuffer<Vec2>,
    /// Post-release decay state.
    velo: Vec2,
    dir: Vec2,
}

impl Default for InertialScroller {
    fn default() -> Self {
        Self {
            virt_bounds: AtomicCell::new(Rect::default()),
            locked: AtomicBool::new(false),
            inner: Mutex::new(ScrollerInner {
                axes: ScrollAxes::BOTH,
                decel: Vec2::new(-1.0, -1.0),
                owner: None,
                prev_pos: Vec2::default(),
                since_millis: 0,
                diff: Vec2::default(),
                samples: RingBuffer::new(1),
                velo: Vec2::default(),
                dir: Vec2::default(),
            }),
        }
    }
}

impl InertialScroller {
    /// Configure the scroller. `decel` must be strictly negative on both
    /// axes; `fps` sizes the velocity sample window (a third of a second).
    pub fn init(
        &self,
        owner: Weak<dyn Component>,
        virt_bounds: Rect,
        decel: Vec2,
        axes: ScrollAxes,
        fps: u32,
    ) -> Result<()> {
        if decel.x >= 0.0 || decel.y >= 0.0 {
            return Err(Error::Invalid(format!(
                "deceleration ({}, {}) must be negative on both axes",
                decel.x, decel.y
            )));
        }
        let mut inner = self.inner.lock();
        inner.axes = axes;
        inner.decel = decel;
        inner.owner = Some(owner);
        inner.samples = RingBuffer::new((fps / 3) as usize);
        self.virt_bounds.store(virt_bounds);
        Ok(())
    }

    /// Replace the virtual bounds (content size and scroll origin).
    pub fn set_virtual_bounds(&self, bounds: Rect) {
        self.virt_bounds.store(bounds);
    }

    /// The virtual bounds: scroll origin and content size.
    pub fn virtual_bounds(&self) -> Rect {
        self.virt_bounds.load()
    }

    /// Whether the scroller currently owns the pointer.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Estimate the post-release velocity and direction from the sample
    /// window. Per axis, the extremes of the window and their scan positions
    /// determine the sign (whichever extreme came first) and the magnitude
    /// `0.5 * span / index-distance`; spans under 0.1 count as no movement.
    fn release_estimate(samples: &RingBuffer<Vec2>) -> (Vec2, Vec2) {
        let ln = samples.len();
        if ln == 0 {
            return (Vec2::default(), Vec2::default());
        }
        let first = samples.get(0);
        let (mut mn, mut mx) = (first, first);
        let (mut mnx, mut mny, mut mxx, mut mxy) = (ln, ln, ln, ln);
        for i in 0..ln {
            let v = samples.get(i);
            let rem = ln - 1 - i;
            if mn.x > v.x {
                mn.x = v.x;
                mnx = rem;
            }
            if mn.y > v.y {
                mn.y = v.y;
                mny = rem;
            }
            if mx.x < v.x {
                mx.x = v.x;
                mxx = rem;
            }
            if mx.y < v.y {
                mx.y = v.y;
                mxy = rem;
            }
        }
        let mut dir = Vec2::new(1.0, 1.0);
        if mnx > mxx {
            dir.x = -1.0;
            std::mem::swap(&mut mnx, &mut mxx);
        }
        if mny > mxy {
            dir.y = -1.0;
            std::mem::swap(&mut mny, &mut mxy);
        }
        let mut velo = Vec2::default();
        if mx.x - mn.x >= 0.1 {
            velo.x = 0.5 * (mx.x - mn.x) / (mxx - mnx) as f32;
        }
        if mx.y - mn.y >= 0.1 {
            velo.y = 0.5 * (mx.y - mn.y) / (mxy - mny) as f32;
        }
        (velo, dir)
    }
}

impl TouchHandler for InertialScroller {
    fn on_touch(&self, sample: TouchSample) -> TouchResponse {
        let mut s = self.inner.lock();
        s.diff = Vec2::default();
        if sample.phase == TouchPhase::Released && self.is_locked() {
            let (velo, dir) = Self::release_estimate(&s.samples);
            s.samples.clear();
            s.since_millis = sample.millis;
            s.velo = velo;
            s.dir = dir;
        }
        if sample.phase == TouchPhase::Moving {
            s.samples.push(sample.pos);
            if self.is_locked() {
                s.diff = s.prev_pos - sample.pos;
            } else {
                s.diff = Vec2::default();
            }
        }
        // A single-axis scroller grabs the pointer only once the movement is
        // clearly along its axis (3x the other axis); a both-axes scroller
        // locks on any movement.
        let locked = if !self.is_locked() && sample.phase == TouchPhase::Moving && !s.axes.is_both()
        {
            (s.axes.horizontal()
                && (s.prev_pos.x - sample.pos.x).abs() > 3.0 * (s.prev_pos.y - sample.pos.y).abs())
                || (s.axes.vertical()
                    && (s.prev_pos.y - sample.pos.y).abs()
                        > 3.0 * (s.prev_pos.x - sample.pos.x).abs())
        } else {
            sample.phase == TouchPhase::Moving
        };
        self.locked.store(locked, Ordering::Release);
        s.prev_pos = sample.pos;
        if locked {
            TouchResponse::Lock
        } else {
            TouchResponse::Pass
        }
    }
}

impl Scrollable for InertialScroller {
    fn offset(&self) -> Point {
        let r = self.virt_bounds.load();
        Point::new(r.x, r.y)
    }
}

impl FrameListener for InertialScroller {
    fn on_frame(&self, millis: i64) {
        let mut s = self.inner.lock();
        let locked = self.is_locked();
        if !locked && !s.dir.is_zero() {
            // Deceleration ramp; once both axes reach zero the decay is done.
            let elapsed = (millis - s.since_millis) as f32;
            s.diff.x = 0.0_f32.max(s.velo.x + s.decel.x * elapsed / 15.0 - s.decel.x / 2.0);
            s.diff.y = 0.0_f32.max(s.velo.y + s.decel.y * elapsed / 15.0 - s.decel.y / 2.0);
            if s.diff.is_zero() {
                s.dir = Vec2::default();
            }
            s.diff.x *= s.dir.x;
            s.diff.y *= s.dir.y;
        }

        if !s.axes.horizontal() {
            s.diff.x = 0.0;
        }
        if !s.axes.vertical() {
            s.diff.y = 0.0;
        }
        let diff = s.diff;

        let mut p = self.virt_bounds.load();
        p.x = (p.x as f32 + diff.x) as i32;
        p.y = (p.y as f32 + diff.y) as i32;
        if !locked {
            // Rubber-band: ease an out-of-range origin back by a third of
            // the overshoot plus one pixel per frame.
            if p.x < 0 {
                p.x = 0.min(p.x - p.x / 3 + 1);
            }
            if p.y < 0 {
                p.y = 0.min(p.y - p.y / 3 + 1);
            }
            if let Some(owner) = s.owner.as_ref().and_then(Weak::upgrade) {
                let r = owner.bounds();
                if p.x > 0 && r.w > p.w - p.x {
                    p.x = 0.max(p.x - (r.w - p.w + p.x) / 3 - 1);
                }
                if p.y > 0 && r.h > p.h - p.y {
                    p.y = 0.max(p.y - (r.h - p.h + p.y) / 3 - 1);
                }
            }
        }
        self.virt_bounds.store(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentCore;
    use std::sync::Arc;

    struct Owner {
        core: ComponentCore,
    }

    impl Component for Owner {
        fn core(&self) -> &ComponentCore {
            &self.core
        }
    }

    fn owner_with_bounds(r: Rect) -> Arc<Owner> {
        let o = Arc::new(Owner {
            core: ComponentCore::default(),
        });
        o.set_bounds(r);
        o
    }

    fn owner_weak(o: &Arc<Owner>) -> Weak<dyn Component> {
        let handle: Arc<dyn Component> = o.clone();
        Arc::downgrade(&handle)
    }

    fn moving(pos: Vec2, millis: i64) -> TouchSample {
        TouchSample {
            phase: TouchPhase::Moving,
            pos,
            millis,
            seq: 0,
        }
    }

    #[test]
    fn init_validates_deceleration() {
        let o = owner_with_bounds(Rect::new(0, 0, 100, 100));
        let s = InertialScroller::default();
        assert!(
            s.init(
                owner_weak(&o),
                Rect::default(),
                Vec2::new(-1.0, 2.0),
                ScrollAxes::BOTH,
                60
            )
            .is_err()
        );
        assert!(
            s.init(
                owner_weak(&o),
                Rect::default(),
                Vec2::new(1.0, -1.0),
                ScrollAxes::BOTH,
                60
            )
            .is_err()
        );
        let b = Rect::new(1, 2, 3, 4);
        s.init(
            owner_weak(&o),
            b,
            Vec2::new(-1.0, -1.0),
            ScrollAxes::BOTH,
            60,
        )
        .unwrap();
        assert_eq!(s.virtual_bounds(), b);
        assert_eq!(s.inner.lock().samples.capacity(), 20);
    }

    #[test]
    fn default_deceleration_is_negative() {
        let v = default_deceleration(60);
        assert!(v.x < 0.0 && v.y < 0.0 && v.x > -2.0 && v.y > -2.0);
    }

    #[test]
    fn release_derives_velocity_and_direction() {
        let o = owner_with_bounds(Rect::new(0, 0, 800, 480));
        let s = InertialScroller::default();
        s.init(
            owner_weak(&o),
            Rect::new(0, 0, 200, 200),
            default_deceleration(60),
            ScrollAxes::BOTH,
            60,
        )
        .unwrap();

        // A drag trace with positions decreasing toward the origin.
        for i in 0..60 {
            let p = Vec2::new((200 - i) as f32, (200 - i) as f32);
            assert_eq!(s.on_touch(moving(p, i as i64)), TouchResponse::Lock);
        }
        assert_eq!(
            s.on_touch(moving(Vec2::new(200.0, 200.0), 100)),
            TouchResponse::Lock
        );
        {
            let inner = s.inner.lock();
            assert_eq!(inner.samples.len(), inner.samples.capacity());
        }
        assert!(s.is_locked());

        let released = TouchSample {
            phase: TouchPhase::Released,
            pos: Vec2::new(100.0, 100.0),
            millis: 101,
            seq: 0,
        };
        assert_eq!(s.on_touch(released), TouchResponse::Pass);
        assert!(!s.is_locked());
        assert_eq!(s.offset(), Point::zero());
        let inner = s.inner.lock();
        assert_eq!(inner.velo, Vec2::new(29.5, 29.5));
        assert_eq!(inner.dir, Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn axis_masking() {
        // The per-frame delta is zeroed on axes the scroller is not
        // configured for. The origin starts well inside the valid range so
        // the rubber band stays out of the picture.
        let s = InertialScroller::default();
        s.set_virtual_bounds(Rect::new(50, 50, 400, 400));
        {
            let mut inner = s.inner.lock();
            inner.diff = Vec2::new(-1.0, -1.0);
            inner.axes = ScrollAxes::HORIZONTAL;
        }
        s.on_frame(0);
        assert_eq!(s.virtual_bounds().origin(), Point::new(49, 50));

        let s = InertialScroller::default();
        s.set_virtual_bounds(Rect::new(50, 50, 400, 400));
        {
            let mut inner = s.inner.lock();
            inner.diff = Vec2::new(-1.0, -1.0);
            inner.axes = ScrollAxes::VERTICAL;
        }
        s.on_frame(0);
        assert_eq!(s.virtual_bounds().origin(), Point::new(50, 49));
    }

    #[test]
    fn single_axis_lock_needs_a_dominant_axis() {
        let o = owner_with_bounds(Rect::new(0, 0, 100, 100));
        let s = InertialScroller::default();
        s.init(
            owner_weak(&o),
            Rect::new(0, 0, 400, 400),
            default_deceleration(60),
            ScrollAxes::VERTICAL,
            60,
        )
        .unwrap();

        // Seed the previous position.
        assert_eq!(
            s.on_touch(moving(Vec2::new(100.0, 100.0), 0)),
            TouchResponse::Pass
        );
        // Diagonal movement: no lock.
        assert_eq!(
            s.on_touch(moving(Vec2::new(110.0, 110.0), 1)),
            TouchResponse::Pass
        );
        // Dominantly vertical movement (more than 3x the horizontal): lock.
        assert_eq!(
            s.on_touch(moving(Vec2::new(111.0, 140.0), 2)),
            TouchResponse::Lock
        );
        // Once locked, any movement keeps the lock.
        assert_eq!(
            s.on_touch(moving(Vec2::new(150.0, 141.0), 3)),
            TouchResponse::Lock
        );
    }

    #[test]
    fn decay_step_applies_deceleration_and_rubber_band() {
        let o = owner_with_bounds(Rect::new(0, 0, 800, 480));
        let s = InertialScroller::default();
        s.init(
            owner_weak(&o),
            Rect::new(0, 0, 200, 200),
            default_deceleration(60),
            ScrollAxes::BOTH,
            60,
        )
        .unwrap();
        s.set_virtual_bounds(Rect::new(0, 0, 100, 100));
        {
            let mut inner = s.inner.lock();
            inner.velo = Vec2::new(10.0, 10.0);
            inner.decel = Vec2::new(-1.0, 1.0);
            inner.dir = Vec2::new(-1.0, -1.0);
            inner.since_millis = 0;
        }
        s.on_frame(10);
        assert_eq!(s.offset(), Point::new(-5, -6));
    }

    #[test]
    fn rubber_band_converges_to_zero_overshoot() {
        // The one-third-plus-a-nudge easing must reach the boundary exactly,
        // in a bounded number of frames, for representative overshoots.
        for overshoot in [1, 2, 3, 10, 100, 1000, 10_000] {
            let o = owner_with_bounds(Rect::new(0, 0, 100, 100));
            let s = InertialScroller::default();
            s.init(
                owner_weak(&o),
                Rect::new(-overshoot, -overshoot, 400, 400),
                default_deceleration(60),
                ScrollAxes::BOTH,
                60,
            )
            .unwrap();
            let mut frames = 0;
            while s.virtual_bounds().x < 0 || s.virtual_bounds().y < 0 {
                s.on_frame(frames);
                frames += 1;
                assert!(frames <= 64, "no convergence for overshoot {overshoot}");
            }
            assert_eq!(s.virtual_bounds().origin(), Point::zero());

            // Max-side overshoot: origin past content-size - viewport-size.
            s.set_virtual_bounds(Rect::new(400, 400, 400, 400));
            let mut frames = 0;
            while s.virtual_bounds().x > 300 || s.virtual_bounds().y > 300 {
                s.on_frame(frames);
                frames += 1;
                assert!(frames <= 64, "no convergence for max-side overshoot");
            }
        }
    }
}

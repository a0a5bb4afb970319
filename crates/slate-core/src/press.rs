use std::sync::atomic::{AtomicBool, Ordering};

use geom::Vec2;
use parking_lot::Mutex;

use crate::touch::{TouchHandler, TouchPhase, TouchResponse, TouchSample};

/// Recognizes a press gesture with noise tolerance.
///
/// A press stays registered while the touch point wanders within `radius`
/// pixels of the initial contact; sliding further away cancels it without
/// firing the release callback. A nonzero `delay_millis` keeps the pressed
/// flag down until the pointer has been held that long, filtering out
/// accidental brushes before the component visually reacts.
///
/// Widgets own a `Presser` and forward their touch capability to it; see the
/// button widget for the typical composition.
pub struct Presser {
    pressed: AtomicBool,
    inner: Mutex<PressInner>,
}

struct PressInner {
    radius: f32,
    delay_millis: i64,
    press_pos: Vec2,
    press_millis: i64,
    press_seq: i64,
    on_release: Option<Box<dyn Fn() + Send + Sync>>,
}

impl Default for Presser {
    /// A presser with zero radius and no delay: pressed immediately,
    /// cancelled by any movement, silent on release.
    fn default() -> Self {
        Self {
            pressed: AtomicBool::new(false),
            inner: Mutex::new(PressInner {
                radius: 0.0,
                delay_millis: 0,
                press_pos: Vec2::default(),
                press_millis: 0,
                press_seq: 0,
                on_release: None,
            }),
        }
    }
}

impl Presser {
    /// Construct a presser with the given noise radius (pixels), press delay
    /// (milliseconds, zero for immediate) and release callback.
    pub fn new(
        radius: f32,
        delay_millis: i64,
        on_release: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let p = Self::default();
        {
            let mut inner = p.inner.lock();
            inner.radius = radius;
            inner.delay_millis = delay_millis;
            inner.on_release = Some(Box::new(on_release));
        }
        p
    }

    /// Whether a press is currently registered.
    pub fn pressed(&self) -> bool {
        self.pressed.load(Ordering::Acquire)
    }
}

impl TouchHandler for Presser {
    fn on_touch(&self, sample: TouchSample) -> TouchResponse {
        let mut inner = self.inner.lock();
        match sample.phase {
            TouchPhase::Pressed => {
                if sample.seq != inner.press_seq {
                    // A new gesture segment: restart the delay clock.
                    inner.press_seq = sample.seq;
                    inner.press_millis = sample.millis;
                }
                let pressed = sample.millis - inner.press_millis >= inner.delay_millis;
                self.pressed.store(pressed, Ordering::Release);
                inner.press_pos = sample.pos;
            }
            TouchPhase::Moving => {
                if self.pressed() {
                    let dist = inner.press_pos.distance(sample.pos);
                    self.pressed.store(dist < inner.radius, Ordering::Release);
                }
            }
            TouchPhase::Released => {
                if self.pressed() {
                    if let Some(cb) = &inner.on_release {
                        cb();
                    }
                }
                self.pressed.store(false, Ordering::Release);
            }
            TouchPhase::Idle => {}
        }
        if self.pressed() {
            TouchResponse::Lock
        } else {
            TouchResponse::Pass
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    fn sample(phase: TouchPhase, pos: Vec2, millis: i64, seq: i64) -> TouchSample {
        TouchSample {
            phase,
            pos,
            millis,
            seq,
        }
    }

    #[test]
    fn default_presser_is_immediate() {
        let p = Presser::default();
        assert_eq!(
            p.on_touch(sample(TouchPhase::Moving, Vec2::default(), 0, 0)),
            TouchResponse::Pass
        );
        assert!(!p.pressed());
        assert_eq!(
            p.on_touch(sample(TouchPhase::Released, Vec2::default(), 0, 0)),
            TouchResponse::Pass
        );
        assert!(!p.pressed());
        assert_eq!(
            p.on_touch(sample(TouchPhase::Pressed, Vec2::default(), 0, 0)),
            TouchResponse::Lock
        );
        assert!(p.pressed());
        assert_eq!(
            p.on_touch(sample(TouchPhase::Released, Vec2::default(), 0, 0)),
            TouchResponse::Pass
        );
        assert!(!p.pressed());
    }

    #[test]
    fn press_delay_and_noise_radius() {
        let released = Arc::new(AtomicUsize::new(0));
        let r2 = released.clone();
        let p = Presser::new(10.0, 100, move || {
            r2.fetch_add(1, Ordering::SeqCst);
        });

        // Held for less than the delay: never pressed.
        assert_eq!(
            p.on_touch(sample(TouchPhase::Pressed, Vec2::default(), 0, 0)),
            TouchResponse::Pass
        );
        assert_eq!(
            p.on_touch(sample(TouchPhase::Pressed, Vec2::default(), 99, 0)),
            TouchResponse::Pass
        );
        assert_eq!(
            p.on_touch(sample(TouchPhase::Moving, Vec2::new(100.0, 100.0), 100, 0)),
            TouchResponse::Pass
        );

        // A new segment restarts the clock; pressed only once >= 100ms in.
        assert_eq!(
            p.on_touch(sample(TouchPhase::Pressed, Vec2::default(), 110, 1)),
            TouchResponse::Pass
        );
        assert_eq!(
            p.on_touch(sample(TouchPhase::Pressed, Vec2::default(), 220, 1)),
            TouchResponse::Lock
        );

        // Sliding beyond the radius cancels without a release event.
        assert_eq!(
            p.on_touch(sample(TouchPhase::Moving, Vec2::new(15.0, 15.0), 250, 1)),
            TouchResponse::Pass
        );
        assert_eq!(released.load(Ordering::SeqCst), 0);

        // Press again and release within the radius: one callback.
        assert_eq!(
            p.on_touch(sample(TouchPhase::Pressed, Vec2::default(), 300, 2)),
            TouchResponse::Pass
        );
        assert_eq!(
            p.on_touch(sample(TouchPhase::Pressed, Vec2::default(), 410, 2)),
            TouchResponse::Lock
        );
        assert_eq!(
            p.on_touch(sample(TouchPhase::Released, Vec2::default(), 420, 2)),
            TouchResponse::Pass
        );
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn moves_inside_radius_keep_the_press() {
        let p = Presser::new(10.0, 0, || {});
        assert_eq!(
            p.on_touch(sample(TouchPhase::Pressed, Vec2::new(50.0, 50.0), 0, 1)),
            TouchResponse::Lock
        );
        // distance(P0, P1) < radius keeps pressed=true.
        assert_eq!(
            p.on_touch(sample(TouchPhase::Moving, Vec2::new(55.0, 55.0), 10, 2)),
            TouchResponse::Lock
        );
        assert!(p.pressed());
        // distance >= radius clears it.
        assert_eq!(
            p.on_touch(sample(TouchPhase::Moving, Vec2::new(60.0, 58.0), 20, 2)),
            TouchResponse::Pass
        );
        assert!(!p.pressed());
    }
}

use geom::Vec2;

use crate::platform::Platform;

/// The discretized phase of the single tracked pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchPhase {
    /// No contact.
    #[default]
    Idle,
    /// Contact down, position unchanged since the press.
    Pressed,
    /// Contact down and moving. Once moving, a momentarily stationary
    /// pointer stays in this phase; it never reverts to `Pressed`.
    Moving,
    /// Contact just lifted; the position is the last touched point.
    Released,
}

/// A snapshot of the touchpad state handed to components once per frame.
///
/// `millis` is the frame timestamp the state was observed at, not the time
/// the phase was entered. `seq` changes exactly once per phase transition, so
/// all samples within one gesture segment (one press-to-release arc) compare
/// equal on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchSample {
    /// Discretized pointer phase.
    pub phase: TouchPhase,
    /// Position of the tracked point, in physical display coordinates.
    pub pos: Vec2,
    /// Frame timestamp in milliseconds.
    pub millis: i64,
    /// Monotonic gesture-segment identifier.
    pub seq: i64,
}

/// What a touch handler did with a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchResponse {
    /// Not handled; the hit-test scan continues with other components.
    Pass,
    /// Handled and focus-locked: all further samples go to this component
    /// until it stops returning `Lock`.
    Lock,
    /// Handled without locking; the scan stops for this frame.
    Stop,
}

/// Capability contract for components that consume pointer input. Invoked at
/// most once per frame, and only while the component is reachable by the
/// hit-test search or holds the focus lock.
pub trait TouchHandler: Send + Sync {
    /// React to the current frame's touchpad sample.
    fn on_touch(&self, sample: TouchSample) -> TouchResponse;
}

/// The pointer state machine. Advanced exactly once per frame from the raw
/// platform button/position state.
#[derive(Default)]
pub(crate) struct Touchpad {
    phase: TouchPhase,
    pos: Vec2,
    millis: i64,
    seq: i64,
}

impl Touchpad {
    /// Advance the state machine for a new frame and return the sample.
    pub(crate) fn on_new_frame(&mut self, millis: i64, platform: &dyn Platform) -> TouchSample {
        self.millis = millis;
        let prev = self.phase;
        if platform.is_touch_down() {
            match self.phase {
                TouchPhase::Idle | TouchPhase::Released => self.phase = TouchPhase::Pressed,
                TouchPhase::Pressed => {
                    if !platform.touch_delta().is_zero() {
                        self.phase = TouchPhase::Moving;
                    }
                }
                TouchPhase::Moving => {}
            }
            self.pos = platform.touch_position();
        } else {
            match self.phase {
                TouchPhase::Moving | TouchPhase::Pressed => self.phase = TouchPhase::Released,
                TouchPhase::Released => self.phase = TouchPhase::Idle,
                TouchPhase::Idle => {}
            }
        }
        if prev != self.phase {
            self.seq += 1;
        }
        self.sample()
    }

    /// The current state as a sample, without advancing.
    pub(crate) fn sample(&self) -> TouchSample {
        TouchSample {
            phase: self.phase,
            pos: self.pos,
            millis: self.millis,
            seq: self.seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tutils::TestPlatform;

    fn sample(phase: TouchPhase, pos: Vec2, millis: i64, seq: i64) -> TouchSample {
        TouchSample {
            phase,
            pos,
            millis,
            seq,
        }
    }

    #[test]
    fn state_machine() {
        let mut tp = Touchpad::default();
        let mut pxy = TestPlatform::default();

        let s = tp.on_new_frame(1, &pxy);
        assert_eq!(s, sample(TouchPhase::Idle, Vec2::default(), 1, 0));
        assert_eq!(tp.sample(), sample(TouchPhase::Idle, Vec2::default(), 1, 0));

        let s = tp.on_new_frame(2, &pxy);
        assert_eq!(s, sample(TouchPhase::Idle, Vec2::default(), 2, 0));

        // Contact down: pressed, sequence moves once.
        pxy.touch_down = true;
        pxy.touch_pos = Vec2::new(1.0, 2.0);
        let s = tp.on_new_frame(3, &pxy);
        assert_eq!(s, sample(TouchPhase::Pressed, pxy.touch_pos, 3, 1));
        let s = tp.on_new_frame(4, &pxy);
        assert_eq!(s, sample(TouchPhase::Pressed, pxy.touch_pos, 4, 1));

        // Nonzero delta while pressed: moving.
        pxy.touch_delta = Vec2::new(1.0, 1.0);
        let s = tp.on_new_frame(5, &pxy);
        assert_eq!(s, sample(TouchPhase::Moving, pxy.touch_pos, 5, 2));
        let s = tp.on_new_frame(6, &pxy);
        assert_eq!(s, sample(TouchPhase::Moving, pxy.touch_pos, 6, 2));

        // A stationary pointer stays in moving, never back to pressed.
        pxy.touch_delta = Vec2::default();
        let s = tp.on_new_frame(7, &pxy);
        assert_eq!(s, sample(TouchPhase::Moving, pxy.touch_pos, 7, 2));

        // Lift: released at the last position, then idle.
        let prev_pos = pxy.touch_pos;
        pxy.touch_down = false;
        pxy.touch_pos = Vec2::default();
        let s = tp.on_new_frame(8, &pxy);
        assert_eq!(s, sample(TouchPhase::Released, prev_pos, 8, 3));
        let s = tp.on_new_frame(9, &pxy);
        assert_eq!(s, sample(TouchPhase::Idle, prev_pos, 9, 4));
        let s = tp.on_new_frame(10, &pxy);
        assert_eq!(s, sample(TouchPhase::Idle, prev_pos, 10, 4));

        // Press and release with no movement at all.
        pxy.touch_down = true;
        pxy.touch_pos = prev_pos;
        let s = tp.on_new_frame(11, &pxy);
        assert_eq!(s, sample(TouchPhase::Pressed, prev_pos, 11, 5));
        pxy.touch_down = false;
        pxy.touch_pos = Vec2::default();
        let s = tp.on_new_frame(12, &pxy);
        assert_eq!(s, sample(TouchPhase::Released, prev_pos, 12, 6));
        let s = tp.on_new_frame(13, &pxy);
        assert_eq!(s, sample(TouchPhase::Idle, prev_pos, 13, 7));
    }
}

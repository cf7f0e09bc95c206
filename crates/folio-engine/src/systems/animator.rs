//! Frame animator: per-frame avatar motion driven by pointer and scroll.
//!
//! The motion itself is the pure [`step`]; [`FrameAnimator`] owns the
//! mounted lifecycle around it: the signal subscription, the elapsed clock
//! and the one-shot greeting timers.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use crate::components::avatar::{AvatarKinematics, AvatarPose};
use crate::core::smoothing::{approach, lerp};
use crate::core::time::TimerQueue;
use crate::input::signal::{PointerScrollSignal, SignalReader, Subscription};

/// Fraction of the remaining gap closed per frame (position and roll).
pub const SMOOTHING: f32 = 0.1;
/// The look-at point sits this many times further out than the target.
pub const LOOK_SCALE: f32 = 3.0;
/// Depth of the look-at point in front of the avatar.
pub const LOOK_DEPTH: f32 = 1.0;
/// Fraction of a full turn of roll at full scroll.
pub const SCROLL_ROLL: f32 = 0.1;
/// Body yaw added every frame, in radians.
pub const SPIN_PER_FRAME: f32 = 0.01;
/// Seconds after start before the greeting wave begins.
pub const GREETING_DELAY: f64 = 2.0;
/// Seconds the greeting wave lasts.
pub const GREETING_DURATION: f64 = 5.0;
pub const WAVE_FREQUENCY: f32 = 5.0;
pub const WAVE_AMPLITUDE: f32 = 0.2;

/// Map a normalized pointer (origin top-left) to scene space:
/// `x` in `[-1, 1]` rightwards, `y` in `[-1, 1]` upwards.
pub fn pointer_target(pointer: Vec2) -> Vec2 {
    Vec2::new(pointer.x * 2.0 - 1.0, -(pointer.y * 2.0 - 1.0))
}

/// Advance the avatar one frame.
pub fn step(state: &AvatarKinematics, signal: &PointerScrollSignal, dt: f32) -> AvatarKinematics {
    let target = pointer_target(signal.pointer);
    let idle_phase = state.idle_phase + f64::from(dt.max(0.0));
    let roll_target = signal.scroll_progress * TAU * SCROLL_ROLL;

    let tilt = if state.is_greeting {
        (idle_phase * f64::from(WAVE_FREQUENCY)).sin() as f32 * WAVE_AMPLITUDE
    } else {
        0.0
    };

    AvatarKinematics {
        position: approach(state.position, target, SMOOTHING),
        look_target: Vec3::new(target.x * LOOK_SCALE, target.y * LOOK_SCALE, LOOK_DEPTH),
        roll: lerp(state.roll, roll_target, SMOOTHING),
        spin: (state.spin + SPIN_PER_FRAME).rem_euclid(TAU),
        tilt,
        idle_phase,
        is_greeting: state.is_greeting,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GreetingTimer {
    Begin,
    End,
}

/// A mounted avatar animation.
///
/// Holds one signal subscription and the greeting timers; [`stop`](Self::stop)
/// (or drop) releases both, whatever point of the greeting it is in.
#[derive(Debug)]
pub struct FrameAnimator {
    state: AvatarKinematics,
    reader: SignalReader,
    subscription: Subscription,
    timers: TimerQueue<GreetingTimer>,
    running: bool,
    frames: u64,
}

impl FrameAnimator {
    /// Mount: subscribe to the signal and arm the greeting.
    pub fn start(signals: &SignalReader) -> Self {
        let mut timers = TimerQueue::new();
        timers.schedule(GREETING_DELAY, GreetingTimer::Begin);
        log::debug!("animator: started");
        Self {
            state: AvatarKinematics::default(),
            reader: signals.clone(),
            subscription: signals.subscribe(),
            timers,
            running: true,
            frames: 0,
        }
    }

    /// One redraw tick. Ignored once stopped.
    pub fn tick(&mut self, dt: f32) {
        if !self.running {
            return;
        }
        self.timers.advance(f64::from(dt));
        while let Some(timer) = self.timers.pop_due() {
            match timer {
                GreetingTimer::Begin => {
                    self.state.is_greeting = true;
                    self.timers.schedule(GREETING_DURATION, GreetingTimer::End);
                    log::debug!("animator: greeting");
                }
                GreetingTimer::End => {
                    self.state.is_greeting = false;
                }
            }
        }

        let signal = self.reader.current();
        self.state = step(&self.state, &signal, dt);
        self.frames += 1;
    }

    /// Unmount: cancel pending greeting timers and release the subscription.
    /// Returns false if already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.timers.cancel_all();
        self.subscription.release();
        log::debug!("animator: stopped after {} frames", self.frames);
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_greeting(&self) -> bool {
        self.state.is_greeting
    }

    pub fn state(&self) -> &AvatarKinematics {
        &self.state
    }

    pub fn pose(&self) -> AvatarPose {
        self.state.pose()
    }

    /// Seconds since start, on the animator's own clock.
    pub fn elapsed(&self) -> f64 {
        self.timers.now()
    }

    /// Pending greeting timers (zero once the greeting is over or stopped).
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Drop for FrameAnimator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::avatar::IDLE_AMPLITUDE;
    use crate::input::queue::InputEvent;
    use crate::input::signal::SignalSource;
    use proptest::prelude::*;

    fn signal(px: f32, py: f32, scroll: f32) -> PointerScrollSignal {
        PointerScrollSignal {
            pointer: Vec2::new(px, py),
            scroll_progress: scroll,
        }
    }

    #[test]
    fn pointer_target_maps_corners() {
        assert_eq!(pointer_target(Vec2::new(0.0, 0.0)), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_target(Vec2::new(1.0, 1.0)), Vec2::new(1.0, -1.0));
        assert_eq!(pointer_target(Vec2::splat(0.5)), Vec2::ZERO);
    }

    #[test]
    fn first_step_closes_a_tenth() {
        let s = step(&AvatarKinematics::default(), &signal(1.0, 0.0, 0.0), 1.0 / 60.0);
        assert!((s.position - Vec2::new(0.1, 0.1)).length() < 1e-6);
        assert_eq!(s.look_target, Vec3::new(3.0, 3.0, 1.0));
    }

    #[test]
    fn look_target_is_not_smoothed() {
        let mut s = AvatarKinematics::default();
        s = step(&s, &signal(1.0, 1.0, 0.0), 0.016);
        s = step(&s, &signal(0.0, 0.0, 0.0), 0.016);
        assert_eq!(s.look_target, Vec3::new(-3.0, 3.0, 1.0));
    }

    #[test]
    fn roll_lerps_towards_scroll_target() {
        let s = step(&AvatarKinematics::default(), &signal(0.5, 0.5, 1.0), 0.016);
        let target = TAU * SCROLL_ROLL;
        assert!((s.roll - target * SMOOTHING).abs() < 1e-6);

        let mut s = s;
        for _ in 0..500 {
            s = step(&s, &signal(0.5, 0.5, 1.0), 0.016);
        }
        assert!((s.roll - target).abs() < 1e-4);
        assert!(s.roll <= target + 1e-6);
    }

    #[test]
    fn tilt_only_while_greeting() {
        let quiet = step(&AvatarKinematics::default(), &signal(0.5, 0.5, 0.0), 0.1);
        assert_eq!(quiet.tilt, 0.0);

        let waving = AvatarKinematics { is_greeting: true, ..AvatarKinematics::default() };
        let s = step(&waving, &signal(0.5, 0.5, 0.0), 0.1);
        assert!((s.tilt - (0.1f32 * WAVE_FREQUENCY).sin() * WAVE_AMPLITUDE).abs() < 1e-6);
    }

    #[test]
    fn idle_clock_keeps_pace_on_long_sessions() {
        for start in [140_000.0, 300_000.0] {
            let mut s = AvatarKinematics { idle_phase: start, ..AvatarKinematics::default() };
            for _ in 0..600 {
                s = step(&s, &signal(0.5, 0.5, 0.0), 1.0 / 60.0);
            }
            assert!((s.idle_phase - start - 10.0).abs() < 1e-4, "from {start}");
        }
    }

    #[test]
    fn greeting_window_is_two_to_seven_seconds() {
        let source = SignalSource::new();
        let mut animator = FrameAnimator::start(&source.reader());

        let mut t = 0.0f64;
        while t < 10.0 {
            animator.tick(0.25);
            t += 0.25;
            let expected = (2.0..7.0).contains(&t);
            assert_eq!(animator.is_greeting(), expected, "at t={t}");
        }
        assert_eq!(animator.pending_timers(), 0);
    }

    #[test]
    fn long_frame_replays_whole_greeting() {
        let source = SignalSource::new();
        let mut animator = FrameAnimator::start(&source.reader());
        animator.tick(8.0);
        assert!(!animator.is_greeting());
        assert_eq!(animator.pending_timers(), 0);
        assert_eq!(animator.elapsed(), 8.0);
    }

    #[test]
    fn stop_during_greeting_cancels_and_releases() {
        let source = SignalSource::new();
        let mut animator = FrameAnimator::start(&source.reader());
        assert_eq!(source.subscriber_count(), 1);

        animator.tick(3.0);
        assert!(animator.is_greeting());
        assert_eq!(animator.pending_timers(), 1);

        assert!(animator.stop());
        assert!(!animator.stop());
        assert_eq!(animator.pending_timers(), 0);
        assert!(!source.has_subscribers());

        // Ticks after unmount change nothing.
        let before = *animator.state();
        animator.tick(10.0);
        assert_eq!(*animator.state(), before);
    }

    #[test]
    fn stop_before_greeting_cancels_delay() {
        let source = SignalSource::new();
        let mut animator = FrameAnimator::start(&source.reader());
        animator.tick(1.0);
        animator.stop();
        assert_eq!(animator.pending_timers(), 0);
        assert!(!animator.is_greeting());
    }

    #[test]
    fn drop_releases_subscription() {
        let source = SignalSource::new();
        {
            let _animator = FrameAnimator::start(&source.reader());
            assert!(source.has_subscribers());
        }
        assert!(!source.has_subscribers());
    }

    #[test]
    fn follows_live_signal() {
        let mut source = SignalSource::new();
        let mut animator = FrameAnimator::start(&source.reader());
        source.apply(&InputEvent::PointerMove { x: 800.0, y: 0.0, viewport_width: 800.0, viewport_height: 600.0 });
        for _ in 0..200 {
            animator.tick(1.0 / 60.0);
        }
        let p = animator.state().position;
        assert!((p - Vec2::new(1.0, 1.0)).length() < 1e-3);
    }

    proptest! {
        #[test]
        fn position_converges_without_overshoot(
            px in 0.0f32..=1.0,
            py in 0.0f32..=1.0,
            sx in -1.0f32..=1.0,
            sy in -1.0f32..=1.0,
            frames in 1usize..120,
        ) {
            let sig = signal(px, py, 0.0);
            let target = pointer_target(sig.pointer);
            let mut s = AvatarKinematics { position: Vec2::new(sx, sy), ..AvatarKinematics::default() };
            let initial = (s.position - target).length();
            let mut previous = initial;

            for n in 1..=frames {
                let before = s.position;
                s = step(&s, &sig, 1.0 / 60.0);
                let gap = (s.position - target).length();
                prop_assert!(gap <= previous + 1e-6);
                prop_assert!(gap <= initial * 0.9f32.powi(n as i32) + 1e-5);
                // Never crosses the target on either axis.
                prop_assert!((s.position.x - target.x) * (before.x - target.x) >= -1e-9);
                prop_assert!((s.position.y - target.y) * (before.y - target.y) >= -1e-9);
                previous = gap;
            }
        }

        #[test]
        fn idle_offset_is_bounded(phase in -1.0e6f64..1.0e6) {
            let s = AvatarKinematics { idle_phase: phase, ..AvatarKinematics::default() };
            let offset = s.idle_offset();
            prop_assert!((-IDLE_AMPLITUDE..=IDLE_AMPLITUDE).contains(&offset));
        }
    }
}

//! Animated scalar offsets and the motion curves that drive them.
//!
//! # Architecture
//!
//! Each card owns one [`AnimatedOffset`]: a shared scalar position the
//! host reads every frame to place the card. Three writers compete for
//! it — the drag gesture (direct writes), the card's own settle
//! animation, and registry-driven transitions started from another
//! card's swipe. Writers never block each other: every write bumps an
//! epoch counter, and an animation loop that observes a stale epoch
//! stops stepping immediately. The last writer wins, which is exactly
//! the behavior a finger-vs-animation race should have.
//!
//! Stepping runs on a `tokio::time::interval` at [`FRAME_PERIOD`], so
//! tests under `start_paused` runtimes resolve animations in virtual
//! time.
//!
//! The reveal interaction never overshoots: a card snapping open past
//! its end position reads as a rendering glitch. [`Spring::no_overshoot`]
//! is therefore critically damped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};

/// Offsets closer than this are considered equal; keeps floating-point
/// noise from churning animations forever.
pub const EPSILON: f32 = 1.0;

/// Animation stepping period (~60 Hz).
pub const FRAME_PERIOD: Duration = Duration::from_millis(16);

const FRAME_DT: f32 = 0.016;

/// Residual speed below which a spring is considered settled.
const SETTLE_VELOCITY: f32 = 1.0;

/// A damped spring motion curve.
#[derive(Debug, Clone, Copy)]
pub struct Spring {
    pub stiffness: f32,
    pub damping: f32,
}

impl Spring {
    /// Critically damped spring: approaches the target as fast as
    /// possible without ever crossing it.
    pub fn no_overshoot() -> Self {
        let stiffness = 400.0_f32;
        Self {
            stiffness,
            damping: 2.0 * stiffness.sqrt(),
        }
    }

    /// Advance one integration step toward `target`, returning the new
    /// `(position, velocity)` pair. Semi-implicit Euler, unit mass.
    pub fn step(&self, position: f32, velocity: f32, target: f32, dt: f32) -> (f32, f32) {
        let accel = self.stiffness * (target - position) - self.damping * velocity;
        let velocity = velocity + accel * dt;
        let position = position + velocity * dt;
        (position, velocity)
    }
}

/// Project where a fling released at `velocity` would coast to under
/// exponential decay with the given friction rate.
pub fn fling_projection(position: f32, velocity: f32, friction: f32) -> f32 {
    position + velocity / friction
}

#[derive(Debug)]
struct MotionState {
    position: f32,
    velocity: f32,
}

#[derive(Debug)]
struct OffsetInner {
    state: Mutex<MotionState>,
    /// Bumped by every writer; animation loops exit when theirs is stale.
    epoch: AtomicU64,
}

/// A shared, animatable scalar position.
///
/// Clones share the same underlying value. The card UI element owns the
/// offset's lifetime; the registry only keeps a lookup clone between
/// `register` and `unregister`.
#[derive(Debug, Clone)]
pub struct AnimatedOffset {
    inner: Arc<OffsetInner>,
}

impl AnimatedOffset {
    pub fn new(position: f32) -> Self {
        Self {
            inner: Arc::new(OffsetInner {
                state: Mutex::new(MotionState {
                    position,
                    velocity: 0.0,
                }),
                epoch: AtomicU64::new(0),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MotionState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current position.
    pub fn value(&self) -> f32 {
        self.lock().position
    }

    /// Set the position immediately, interrupting any running animation.
    pub fn snap_to(&self, position: f32) {
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        let mut state = self.lock();
        state.position = position;
        state.velocity = 0.0;
    }

    /// True once the offset rests within [`EPSILON`] of `target`.
    pub fn is_settled_at(&self, target: f32) -> bool {
        let state = self.lock();
        (state.position - target).abs() < EPSILON && state.velocity.abs() < SETTLE_VELOCITY
    }

    /// Animate toward `target` under `spring`, completing when the
    /// offset settles there.
    ///
    /// A newer write (another `animate_to`, a `snap_to`, or a drag)
    /// supersedes this animation; the superseded future returns without
    /// touching the value further. Dropping the returned future stops
    /// stepping at the current position — callers that need state
    /// reconciliation on cancellation handle it themselves (see the
    /// registry's transition guard).
    pub async fn animate_to(&self, target: f32, spring: Spring) {
        let epoch = self.inner.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        let mut frames = interval(FRAME_PERIOD);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick completes immediately; skip it so every step covers
        // a full frame.
        frames.tick().await;
        loop {
            frames.tick().await;
            let mut state = self.lock();
            if self.inner.epoch.load(Ordering::Acquire) != epoch {
                return;
            }
            let (position, velocity) =
                spring.step(state.position, state.velocity, target, FRAME_DT);
            state.position = position;
            state.velocity = velocity;
            if (position - target).abs() < EPSILON && velocity.abs() < SETTLE_VELOCITY {
                state.position = target;
                state.velocity = 0.0;
                return;
            }
        }
    }
}

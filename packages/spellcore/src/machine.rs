//! The gesture capture state machine. One instance exists per device; the
//! sensor loop feeds it one `WandSample` per poll tick and acts on the
//! events it emits. End of gesture is IR loss, debounced by
//! `ir_loss_timeout_ms`; every path eventually returns to idle.

use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use crate::geometry::{distance, Point};
use crate::trajectory::Trajectory;

/// Thresholds and timeouts, loaded from the preference store. Distances are
/// sensor pixels, times are milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tuning {
    pub movement_threshold: u16,
    pub stillness_threshold: u16,
    pub ready_stillness_ms: u32,
    pub gesture_timeout_ms: u32,
    pub ir_loss_timeout_ms: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            movement_threshold: 15,
            stillness_threshold: 20,
            ready_stillness_ms: 600,
            gesture_timeout_ms: 5_000,
            ir_loss_timeout_ms: 300,
        }
    }
}

/// One poll tick: the current time and the first valid IR point, if any.
#[derive(Clone, Copy, Debug)]
pub struct WandSample {
    pub now_ms: u64,
    pub point: Option<(u16, u16)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureEvent {
    /// IR appeared while idle; feedback "detected".
    WandDetected,
    /// Stillness held long enough; feedback "ready" (green + cue).
    ReadyToCast,
    RecordingStarted,
    /// Ready state timed out or lost the wand; back to idle quietly.
    ReadyAbandoned,
    /// Recording exceeded the gesture timeout; error feedback.
    RecordingTimedOut,
    /// IR loss ended the gesture; the trajectory is ready to classify.
    GestureComplete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Ready,
    Recording,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GestureOutput {
    pub events: [Option<GestureEvent>; 2],
}

#[derive(Clone, Copy, Debug, Default)]
struct DispatchContext {
    tuning: Tuning,
    events: [Option<GestureEvent>; 2],
}

impl DispatchContext {
    fn emit(&mut self, event: GestureEvent) {
        for slot in &mut self.events {
            if slot.is_none() {
                *slot = Some(event);
                return;
            }
        }
    }

    fn finish(self) -> GestureOutput {
        GestureOutput {
            events: self.events,
        }
    }
}

pub struct GestureEngine {
    machine: statig::blocking::StateMachine<WandHsm>,
    tuning: Tuning,
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

impl GestureEngine {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            machine: WandHsm::new().state_machine(),
            tuning,
        }
    }

    pub fn tick(&mut self, sample: WandSample) -> GestureOutput {
        let mut context = DispatchContext {
            tuning: self.tuning,
            ..Default::default()
        };
        self.machine
            .handle_with_context(&HsmEvent::Sample(sample), &mut context);
        context.finish()
    }

    /// Thresholds take effect on the next tick; the preference cache is the
    /// source of truth.
    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.tuning = tuning;
    }

    pub fn phase(&self) -> Phase {
        self.machine.inner().phase
    }

    pub fn is_idle(&self) -> bool {
        self.machine.inner().phase == Phase::Idle
    }

    /// The sensor loop polls fast only while the wand is in view.
    pub fn is_tracking(&self) -> bool {
        self.machine.inner().phase != Phase::Idle
    }

    /// The captured trajectory; valid between `GestureComplete` and the next
    /// recording start.
    pub fn trajectory(&self) -> &[Point] {
        self.machine.inner().traj.points()
    }

    /// Current wand position for the display trail, while tracking.
    pub fn current_point(&self) -> Option<(u16, u16)> {
        self.machine.inner().last_seen
    }
}

#[derive(Clone, Copy, Debug)]
enum HsmEvent {
    Sample(WandSample),
}

struct WandHsm {
    phase: Phase,
    /// Smoothed "still" position while in ready; its timestamp is the moment
    /// the anchor was (re)seeded, and becomes the first trajectory point.
    anchor: Point,
    ready_since: u64,
    stable: bool,
    started_ms: u64,
    ir_lost_since: Option<u64>,
    last_seen: Option<(u16, u16)>,
    traj: Trajectory,
}

impl WandHsm {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            anchor: Point::default(),
            ready_since: 0,
            stable: false,
            started_ms: 0,
            ir_lost_since: None,
            last_seen: None,
            traj: Trajectory::new(),
        }
    }

    fn seed_anchor(&mut self, now_ms: u64, x: u16, y: u16) {
        self.anchor = Point::new(x as i16, y as i16, now_ms as u32);
        self.ready_since = now_ms;
        self.stable = false;
    }

    fn to_idle(&mut self, context: &mut DispatchContext, event: GestureEvent) -> Outcome<State> {
        self.phase = Phase::Idle;
        self.stable = false;
        self.ir_lost_since = None;
        self.last_seen = None;
        context.emit(event);
        Transition(State::idle())
    }

    /// Debounced IR loss: true once the wand has been gone long enough.
    fn ir_lost(&mut self, now_ms: u64, timeout_ms: u32) -> bool {
        let since = *self.ir_lost_since.get_or_insert(now_ms);
        now_ms.saturating_sub(since) >= timeout_ms as u64
    }
}

#[state_machine(initial = "State::idle()")]
impl WandHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &HsmEvent) -> Outcome<State> {
        let HsmEvent::Sample(sample) = event;
        match sample.point {
            Some((x, y)) => {
                self.phase = Phase::Ready;
                self.seed_anchor(sample.now_ms, x, y);
                self.ir_lost_since = None;
                self.last_seen = Some((x, y));
                context.emit(GestureEvent::WandDetected);
                Transition(State::ready())
            }
            None => Handled,
        }
    }

    #[state]
    fn ready(&mut self, context: &mut DispatchContext, event: &HsmEvent) -> Outcome<State> {
        let HsmEvent::Sample(sample) = event;
        let now = sample.now_ms;

        if let Some((x, y)) = sample.point {
            self.ir_lost_since = None;
            self.last_seen = Some((x, y));
            let current = Point::new(x as i16, y as i16, now as u32);
            let drift = distance(current, self.anchor);

            if self.stable {
                if drift >= context.tuning.movement_threshold as f32 {
                    // The stable anchor is the true gesture start; the
                    // current point is already part of the stroke, and the
                    // gesture timeout runs from the anchor.
                    self.traj.clear();
                    self.traj.push(self.anchor);
                    self.traj.push(current);
                    self.started_ms = self.anchor.t as u64;
                    self.phase = Phase::Recording;
                    context.emit(GestureEvent::RecordingStarted);
                    return Transition(State::recording());
                }
            } else if drift < context.tuning.stillness_threshold as f32 {
                // Smooth the anchor in place; keep its original timestamp.
                self.anchor.x = current.x;
                self.anchor.y = current.y;
                if now.saturating_sub(self.ready_since) >= context.tuning.ready_stillness_ms as u64 {
                    self.stable = true;
                    context.emit(GestureEvent::ReadyToCast);
                }
            } else {
                self.seed_anchor(now, x, y);
            }

            if now.saturating_sub(self.ready_since) > context.tuning.gesture_timeout_ms as u64 {
                return self.to_idle(context, GestureEvent::ReadyAbandoned);
            }
            Handled
        } else if self.ir_lost(now, context.tuning.ir_loss_timeout_ms) {
            self.to_idle(context, GestureEvent::ReadyAbandoned)
        } else {
            Handled
        }
    }

    #[state]
    fn recording(&mut self, context: &mut DispatchContext, event: &HsmEvent) -> Outcome<State> {
        let HsmEvent::Sample(sample) = event;
        let now = sample.now_ms;

        if let Some((x, y)) = sample.point {
            self.ir_lost_since = None;
            self.last_seen = Some((x, y));
            let current = Point::new(x as i16, y as i16, now as u32);

            // Reflections are dropped here; the frame still counts for
            // timing.
            let _ = self.traj.accept(current);

            if now.saturating_sub(self.started_ms) > context.tuning.gesture_timeout_ms as u64 {
                self.traj.clear();
                return self.to_idle(context, GestureEvent::RecordingTimedOut);
            }
            Handled
        } else if self.ir_lost(now, context.tuning.ir_loss_timeout_ms) {
            self.to_idle(context, GestureEvent::GestureComplete)
        } else {
            Handled
        }
    }
}

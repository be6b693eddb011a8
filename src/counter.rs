//! One-shot count-up animation for the growth proof card.
//!
//! The card arms the first time its element is visible enough; from then on a
//! frame loop eases the displayed figure from zero to the configured value and
//! stops. Leaving and re-entering the viewport never restarts it.

use crate::logging::log_event;
use crate::scroll_spy::{VisibilityCallback, VisibilityObserver};
use log::Level;
use serde_json::json;
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

pub const DEFAULT_TRIGGER_THRESHOLD: f64 = 0.35;
pub const DEFAULT_DURATION_MS: f64 = 1_200.0;

/// Callback for one display refresh; receives the frame timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Once-per-refresh scheduling plus the monotonic clock the frames are measured on.
pub trait FrameScheduler {
    fn now(&self) -> f64;

    fn schedule_next(&self, callback: FrameCallback);
}

/// `1 - (1 - t)^3`, with `t` clamped to `0..=1`.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Whole-number share of `target` reached by `current`, capped at 100.
/// A zero target reports 0.
pub fn progress_percent(current: u64, target: u64) -> u32 {
    if target == 0 {
        return 0;
    }

    let percent = current as f64 / target as f64 * 100.0;
    percent.min(100.0).round() as u32
}

/// Counter value shown `elapsed_ms` into an animation towards `current`.
pub fn value_at(elapsed_ms: f64, duration_ms: f64, current: u64) -> u64 {
    if duration_ms <= 0.0 || elapsed_ms >= duration_ms {
        return current;
    }
    if elapsed_ms.is_nan() || elapsed_ms <= 0.0 {
        return 0;
    }

    let eased = ease_out_cubic(elapsed_ms / duration_ms);
    ((eased * current as f64).floor() as u64).min(current)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CounterSettings {
    pub current: u64,
    pub target: u64,
    pub duration_ms: f64,
    pub trigger_threshold: f64,
}

impl CounterSettings {
    pub fn progress(&self) -> u32 {
        progress_percent(self.current, self.target)
    }
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            current: 29_437,
            target: 100_000,
            duration_ms: DEFAULT_DURATION_MS,
            trigger_threshold: DEFAULT_TRIGGER_THRESHOLD,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CounterState {
    pub armed: bool,
    pub displayed: u64,
}

impl CounterState {
    /// Width of the progress bar: zero until armed, then the full progress.
    pub fn bar_width_percent(&self, settings: &CounterSettings) -> u32 {
        if self.armed {
            settings.progress()
        } else {
            0
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterPhase {
    Unarmed,
    Armed,
    Complete,
}

#[derive(Clone, Debug)]
pub struct GrowthCounter {
    settings: CounterSettings,
    state: CounterState,
    started_at: Option<f64>,
    complete: bool,
}

impl GrowthCounter {
    pub fn new(settings: CounterSettings) -> Self {
        Self {
            settings,
            state: CounterState::default(),
            started_at: None,
            complete: false,
        }
    }

    pub fn state(&self) -> CounterState {
        self.state
    }

    pub fn phase(&self) -> CounterPhase {
        match (self.state.armed, self.complete) {
            (false, _) => CounterPhase::Unarmed,
            (true, false) => CounterPhase::Armed,
            (true, true) => CounterPhase::Complete,
        }
    }

    pub fn crosses_trigger(&self, fraction: f64) -> bool {
        fraction >= self.settings.trigger_threshold
    }

    /// Starts the clock at `now`. Only the first call has any effect.
    pub fn arm(&mut self, now: f64) -> bool {
        if self.state.armed {
            return false;
        }
        self.state.armed = true;
        self.started_at = Some(now);
        true
    }

    /// Recomputes the displayed value for a frame at `now`. Returns whether
    /// another frame is needed.
    pub fn advance(&mut self, now: f64) -> bool {
        let Some(started_at) = self.started_at else {
            return false;
        };
        if self.complete {
            return false;
        }

        let elapsed = (now - started_at).max(0.0);
        let value = value_at(elapsed, self.settings.duration_ms, self.settings.current);
        self.state.displayed = self.state.displayed.max(value);

        if elapsed >= self.settings.duration_ms {
            self.state.displayed = self.settings.current;
            self.complete = true;
        }
        !self.complete
    }
}

struct AnimationShared<S> {
    counter: RefCell<GrowthCounter>,
    live: Cell<bool>,
    scheduler: S,
    on_update: Rc<dyn Fn(CounterState)>,
}

/// Watches the trigger element and drives a [`GrowthCounter`] off the
/// scheduler. Dropping it stops both the observer and the frame loop.
pub struct CounterAnimation<O: VisibilityObserver, S: FrameScheduler + 'static> {
    observer: O,
    region: String,
    watching: bool,
    shared: Rc<AnimationShared<S>>,
}

impl<O, S> CounterAnimation<O, S>
where
    O: VisibilityObserver,
    S: FrameScheduler + 'static,
{
    pub fn start(
        mut observer: O,
        scheduler: S,
        region: &str,
        settings: CounterSettings,
        on_update: Rc<dyn Fn(CounterState)>,
    ) -> Self {
        let shared = Rc::new(AnimationShared {
            counter: RefCell::new(GrowthCounter::new(settings)),
            live: Cell::new(true),
            scheduler,
            on_update,
        });

        let on_change: VisibilityCallback = {
            let shared = Rc::clone(&shared);
            Rc::new(move |fraction: f64| on_visibility(&shared, fraction))
        };
        let watching = observer.watch(region, on_change);
        if !watching {
            log_event(
                Level::Debug,
                "section_skipped",
                json!({ "section": region }),
            );
        }

        Self {
            observer,
            region: region.to_string(),
            watching,
            shared,
        }
    }

    pub fn state(&self) -> CounterState {
        self.shared.counter.borrow().state()
    }

    pub fn phase(&self) -> CounterPhase {
        self.shared.counter.borrow().phase()
    }

    /// Idempotent. Frames already handed to the scheduler become no-ops.
    pub fn stop(&mut self) {
        if !self.shared.live.replace(false) {
            return;
        }
        if self.watching {
            self.observer.unwatch(&self.region);
            self.watching = false;
        }
        self.observer.disconnect();

        let counter = self.shared.counter.borrow();
        if counter.phase() == CounterPhase::Armed {
            log_event(
                Level::Debug,
                "counter_torn_down",
                json!({ "displayed": counter.state().displayed }),
            );
        }
    }
}

impl<O, S> Drop for CounterAnimation<O, S>
where
    O: VisibilityObserver,
    S: FrameScheduler + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}

fn on_visibility<S: FrameScheduler + 'static>(shared: &Rc<AnimationShared<S>>, fraction: f64) {
    if !shared.live.get() {
        return;
    }

    let armed_state = {
        let mut counter = shared.counter.borrow_mut();
        if counter.crosses_trigger(fraction) && counter.arm(shared.scheduler.now()) {
            Some(counter.state())
        } else {
            None
        }
    };

    if let Some(state) = armed_state {
        log_event(Level::Info, "counter_armed", json!({ "fraction": fraction }));
        (shared.on_update)(state);
        schedule_frame(shared);
    }
}

fn schedule_frame<S: FrameScheduler + 'static>(shared: &Rc<AnimationShared<S>>) {
    let next = Rc::clone(shared);
    shared
        .scheduler
        .schedule_next(Box::new(move |timestamp| run_frame(next, timestamp)));
}

fn run_frame<S: FrameScheduler + 'static>(shared: Rc<AnimationShared<S>>, timestamp: f64) {
    if !shared.live.get() {
        return;
    }

    let (state, needs_more) = {
        let mut counter = shared.counter.borrow_mut();
        let needs_more = counter.advance(timestamp);
        (counter.state(), needs_more)
    };

    (shared.on_update)(state);

    if needs_more {
        schedule_frame(&shared);
    } else {
        log_event(
            Level::Info,
            "counter_completed",
            json!({ "displayed": state.displayed }),
        );
    }
}

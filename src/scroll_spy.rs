use crate::logging::log_event;
use crate::section::SectionId;
use log::Level;
use serde_json::json;
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

pub const DEFAULT_SECTION_THRESHOLD: f64 = 0.5;
const OBSERVATION_STEPS: u32 = 10;

/// Receives the visible fraction (`0.0..=1.0`) of one watched element.
pub type VisibilityCallback = Rc<dyn Fn(f64)>;

/// Push-based viewport visibility notifications.
pub trait VisibilityObserver {
    /// Starts reporting visibility changes of the element with `id`.
    /// Returns `false` if the document has no such element.
    fn watch(&mut self, id: &str, on_change: VisibilityCallback) -> bool;

    fn unwatch(&mut self, id: &str);

    /// Releases every watch at once.
    fn disconnect(&mut self);
}

/// Picks the most visible section from the latest fraction reported for each.
#[derive(Clone, Debug)]
pub struct SectionVisibilityTracker {
    order: Vec<SectionId>,
    fractions: Vec<Option<f64>>,
    threshold: f64,
    active: SectionId,
}

impl SectionVisibilityTracker {
    pub fn new(order: Vec<SectionId>, threshold: f64) -> Self {
        let fractions = vec![None; order.len()];
        Self {
            order,
            fractions,
            threshold,
            active: SectionId::default(),
        }
    }

    pub fn active(&self) -> SectionId {
        self.active
    }

    /// Stores the fraction for `section` and re-evaluates. Returns the new
    /// active section only when it changed.
    pub fn record(&mut self, section: SectionId, fraction: f64) -> Option<SectionId> {
        let index = self.order.iter().position(|candidate| *candidate == section)?;
        self.fractions[index] = Some(sanitize_fraction(fraction));
        self.reevaluate()
    }

    /// Most visible candidate; ties keep the earlier section.
    pub fn leader(&self) -> Option<SectionId> {
        let mut best: Option<(SectionId, f64)> = None;

        for (section, fraction) in self.order.iter().zip(&self.fractions) {
            let Some(fraction) = *fraction else {
                continue;
            };
            if fraction < self.threshold {
                continue;
            }
            match best {
                Some((_, best_fraction)) if fraction <= best_fraction => {}
                _ => best = Some((*section, fraction)),
            }
        }

        best.map(|(section, _)| section)
    }

    fn reevaluate(&mut self) -> Option<SectionId> {
        let leader = self.leader()?;
        if leader == self.active {
            return None;
        }
        self.active = leader;
        Some(leader)
    }
}

/// Visibility ratios the browser observer reports at: every tenth plus the
/// candidate threshold. A stored fraction is at most one step out of date.
pub fn observation_thresholds(candidate_threshold: f64) -> Vec<f64> {
    let mut thresholds: Vec<f64> = (0..=OBSERVATION_STEPS)
        .map(|step| f64::from(step) / f64::from(OBSERVATION_STEPS))
        .collect();
    let candidate = sanitize_fraction(candidate_threshold);
    if !thresholds.iter().any(|value| (value - candidate).abs() < f64::EPSILON) {
        thresholds.push(candidate);
        thresholds.sort_by(f64::total_cmp);
    }
    thresholds
}

fn sanitize_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

/// Wires a [`SectionVisibilityTracker`] to a [`VisibilityObserver`] for the
/// lifetime of the value. Dropping it releases the observer.
pub struct ScrollSpy<O: VisibilityObserver> {
    observer: O,
    tracker: Rc<RefCell<SectionVisibilityTracker>>,
    watched: Vec<SectionId>,
    live: Rc<Cell<bool>>,
}

impl<O: VisibilityObserver> ScrollSpy<O> {
    pub fn start(
        mut observer: O,
        sections: &[SectionId],
        threshold: f64,
        on_active: Rc<dyn Fn(SectionId)>,
    ) -> Self {
        let tracker = Rc::new(RefCell::new(SectionVisibilityTracker::new(
            sections.to_vec(),
            threshold,
        )));
        let live = Rc::new(Cell::new(true));
        let mut watched = Vec::with_capacity(sections.len());

        for &section in sections {
            let on_change: VisibilityCallback = {
                let tracker = Rc::clone(&tracker);
                let live = Rc::clone(&live);
                let on_active = Rc::clone(&on_active);
                Rc::new(move |fraction: f64| {
                    if !live.get() {
                        return;
                    }
                    // The borrow ends before `on_active` runs; it may read the tracker.
                    let changed = tracker.borrow_mut().record(section, fraction);
                    if let Some(active) = changed {
                        log_event(
                            Level::Debug,
                            "active_section_changed",
                            json!({ "section": active.as_str(), "fraction": fraction }),
                        );
                        on_active(active);
                    }
                })
            };

            if observer.watch(section.as_str(), on_change) {
                watched.push(section);
            } else {
                log_event(
                    Level::Debug,
                    "section_skipped",
                    json!({ "section": section.as_str() }),
                );
            }
        }

        Self {
            observer,
            tracker,
            watched,
            live,
        }
    }

    pub fn active(&self) -> SectionId {
        self.tracker.borrow().active()
    }

    pub fn watched(&self) -> &[SectionId] {
        &self.watched
    }

    /// Idempotent.
    pub fn stop(&mut self) {
        if !self.live.replace(false) {
            return;
        }
        for section in self.watched.drain(..) {
            self.observer.unwatch(section.as_str());
        }
        self.observer.disconnect();
    }
}

impl<O: VisibilityObserver> Drop for ScrollSpy<O> {
    fn drop(&mut self) {
        self.stop();
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeObserver;
    use super::*;

    fn all_sections() -> Vec<SectionId> {
        SectionId::ALL.to_vec()
    }

    fn recording_callback() -> (Rc<RefCell<Vec<SectionId>>>, Rc<dyn Fn(SectionId)>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let callback: Rc<dyn Fn(SectionId)> = {
            let seen = Rc::clone(&seen);
            Rc::new(move |section| seen.borrow_mut().push(section))
        };
        (seen, callback)
    }

    #[test]
    fn starts_on_home() {
        let tracker = SectionVisibilityTracker::new(all_sections(), DEFAULT_SECTION_THRESHOLD);
        assert_eq!(tracker.active(), SectionId::Home);
        assert_eq!(tracker.leader(), None);
    }

    #[test]
    fn most_visible_candidate_wins() {
        let mut tracker =
            SectionVisibilityTracker::new(all_sections(), DEFAULT_SECTION_THRESHOLD);

        assert_eq!(tracker.record(SectionId::Services, 0.6), Some(SectionId::Services));
        assert_eq!(tracker.record(SectionId::Work, 0.9), Some(SectionId::Work));
        assert_eq!(tracker.record(SectionId::Pricing, 0.2), None);
        assert_eq!(tracker.active(), SectionId::Work);
    }

    #[test]
    fn fraction_below_threshold_is_not_a_candidate() {
        let mut tracker =
            SectionVisibilityTracker::new(all_sections(), DEFAULT_SECTION_THRESHOLD);

        assert_eq!(tracker.record(SectionId::Services, 0.49), None);
        assert_eq!(tracker.active(), SectionId::Home);
    }

    #[test]
    fn exact_tie_resolves_to_earlier_section() {
        let mut tracker =
            SectionVisibilityTracker::new(all_sections(), DEFAULT_SECTION_THRESHOLD);

        tracker.record(SectionId::Work, 0.5);
        tracker.record(SectionId::Pricing, 0.5);
        assert_eq!(tracker.active(), SectionId::Work);

        // Report order does not matter once both fractions are known.
        let mut tracker =
            SectionVisibilityTracker::new(all_sections(), DEFAULT_SECTION_THRESHOLD);
        tracker.record(SectionId::Pricing, 0.5);
        tracker.record(SectionId::Work, 0.5);
        assert_eq!(tracker.active(), SectionId::Work);
    }

    #[test]
    fn active_section_is_sticky_without_candidates() {
        let mut tracker =
            SectionVisibilityTracker::new(all_sections(), DEFAULT_SECTION_THRESHOLD);

        tracker.record(SectionId::Pricing, 0.8);
        assert_eq!(tracker.active(), SectionId::Pricing);

        assert_eq!(tracker.record(SectionId::Pricing, 0.1), None);
        assert_eq!(tracker.active(), SectionId::Pricing);
    }

    #[test]
    fn unchanged_leader_is_not_reported_again() {
        let mut tracker =
            SectionVisibilityTracker::new(all_sections(), DEFAULT_SECTION_THRESHOLD);

        assert_eq!(tracker.record(SectionId::Services, 0.7), Some(SectionId::Services));
        assert_eq!(tracker.record(SectionId::Services, 0.95), None);
    }

    #[test]
    fn unknown_and_malformed_reports_are_harmless() {
        let mut tracker = SectionVisibilityTracker::new(
            vec![SectionId::Home, SectionId::Services],
            DEFAULT_SECTION_THRESHOLD,
        );

        assert_eq!(tracker.record(SectionId::Contact, 1.0), None);
        assert_eq!(tracker.record(SectionId::Services, f64::NAN), None);
        assert_eq!(tracker.active(), SectionId::Home);
    }

    #[test]
    fn spy_forwards_observer_reports() {
        let observer = FakeObserver::with_elements(&["home", "services", "work", "pricing", "contact"]);
        let (seen, on_active) = recording_callback();
        let spy = ScrollSpy::start(
            observer.clone(),
            &SectionId::ALL,
            DEFAULT_SECTION_THRESHOLD,
            on_active,
        );

        observer.report("services", 0.75);
        observer.report("home", 0.1);
        observer.report("contact", 0.55);

        assert_eq!(spy.active(), SectionId::Services);
        assert_eq!(*seen.borrow(), vec![SectionId::Services]);
    }

    #[test]
    fn missing_sections_are_skipped() {
        let observer = FakeObserver::with_elements(&["home", "services", "contact"]);
        let (seen, on_active) = recording_callback();
        let spy = ScrollSpy::start(
            observer.clone(),
            &SectionId::ALL,
            DEFAULT_SECTION_THRESHOLD,
            on_active,
        );

        assert_eq!(
            spy.watched(),
            &[SectionId::Home, SectionId::Services, SectionId::Contact]
        );

        observer.report("pricing", 1.0);
        observer.report("contact", 0.6);

        assert_eq!(*seen.borrow(), vec![SectionId::Contact]);
    }

    #[test]
    fn stop_releases_watches_and_silences_callbacks() {
        let observer = FakeObserver::with_elements(&["home", "services"]);
        let (seen, on_active) = recording_callback();
        let mut spy = ScrollSpy::start(
            observer.clone(),
            &[SectionId::Home, SectionId::Services],
            DEFAULT_SECTION_THRESHOLD,
            on_active,
        );
        let stale = observer
            .document
            .borrow()
            .callbacks
            .get("services")
            .cloned()
            .expect("services is watched");

        spy.stop();
        spy.stop();

        stale(1.0);
        assert!(seen.borrow().is_empty());
        assert_eq!(spy.active(), SectionId::Home);
        assert!(spy.watched().is_empty());

        let document = observer.document.borrow();
        assert!(document.callbacks.is_empty());
        assert_eq!(document.unwatched, vec!["home".to_string(), "services".to_string()]);
        assert_eq!(document.disconnects, 1);
    }

    #[test]
    fn dropping_spy_disconnects_observer() {
        let observer = FakeObserver::with_elements(&["home"]);
        let (_, on_active) = recording_callback();
        let spy = ScrollSpy::start(
            observer.clone(),
            &[SectionId::Home],
            DEFAULT_SECTION_THRESHOLD,
            on_active,
        );

        drop(spy);

        assert_eq!(observer.document.borrow().disconnects, 1);
    }

    /// Feeds `fraction` to the tracker only when the move from `previous`
    /// crosses one of `ladder`, the way `IntersectionObserver` notifies.
    fn report_on_crossing(
        tracker: &mut SectionVisibilityTracker,
        ladder: &[f64],
        section: SectionId,
        previous: f64,
        fraction: f64,
    ) {
        let (low, high) = if previous <= fraction {
            (previous, fraction)
        } else {
            (fraction, previous)
        };
        let crossed = ladder
            .iter()
            .any(|threshold| (*threshold > low && *threshold <= high) || *threshold == fraction);
        if crossed {
            tracker.record(section, fraction);
        }
    }

    #[test]
    fn observation_ladder_covers_candidate_threshold() {
        let ladder = observation_thresholds(DEFAULT_SECTION_THRESHOLD);
        assert_eq!(ladder.len(), 11);
        assert_eq!(ladder.first().copied(), Some(0.0));
        assert_eq!(ladder.last().copied(), Some(1.0));

        let ladder = observation_thresholds(0.35);
        assert_eq!(ladder.len(), 12);
        assert!(ladder.contains(&0.35));
        assert!(ladder.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn crossing_only_reports_keep_fractions_current() {
        let ladder = observation_thresholds(DEFAULT_SECTION_THRESHOLD);
        let mut tracker =
            SectionVisibilityTracker::new(all_sections(), DEFAULT_SECTION_THRESHOLD);

        // Initial observation of a mostly visible pricing section.
        tracker.record(SectionId::Pricing, 0.95);
        assert_eq!(tracker.active(), SectionId::Pricing);

        // Pricing scrolls up to 0.55; contact scrolls in to 0.6.
        report_on_crossing(&mut tracker, &ladder, SectionId::Pricing, 0.95, 0.55);
        report_on_crossing(&mut tracker, &ladder, SectionId::Contact, 0.0, 0.6);

        assert_eq!(tracker.active(), SectionId::Contact);
    }

    #[test]
    fn single_threshold_would_leave_stale_leader() {
        let mut tracker =
            SectionVisibilityTracker::new(all_sections(), DEFAULT_SECTION_THRESHOLD);

        tracker.record(SectionId::Pricing, 0.95);
        report_on_crossing(&mut tracker, &[0.5], SectionId::Pricing, 0.95, 0.55);
        report_on_crossing(&mut tracker, &[0.5], SectionId::Contact, 0.0, 0.6);

        assert_eq!(tracker.active(), SectionId::Pricing);
    }
}

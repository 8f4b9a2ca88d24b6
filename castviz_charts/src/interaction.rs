// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover, selection and playback state.
//!
//! [`Interaction`] is the per-chart state machine. Hover and selection run independently of
//! playback:
//! - hover and selection only request a restyle,
//! - filter changes and playback steps request a relayout,
//! - the state itself is a value ([`SelectionState`]) replaced wholesale on every transition.
//!
//! Everything the host must react to is queued as an [`InteractionEvent`].

extern crate alloc;

use alloc::vec::Vec;

use castviz_core::{CategoryId, TimeBucket};
use tracing::{debug, warn};

use crate::dispatch::{Dispatcher, Invalidation};
use crate::playback::{PLAYBACK_PERIOD_MS, Scheduler, TimerHandle};

/// A data entity addressed by hit-testing: a category, optionally within one time bucket.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Entity {
    /// Category (subject or speaker).
    pub category: CategoryId,
    /// Time bucket, when the chart resolves one.
    pub bucket: Option<TimeBucket>,
}

impl Entity {
    /// An entity with a bucket.
    pub fn new(category: impl Into<CategoryId>, bucket: TimeBucket) -> Self {
        Self {
            category: category.into(),
            bucket: Some(bucket),
        }
    }

    /// An entity addressing a whole category.
    pub fn category(category: impl Into<CategoryId>) -> Self {
        Self {
            category: category.into(),
            bucket: None,
        }
    }
}

/// Playback sub-state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackState {
    /// Whether the timer is running.
    pub is_playing: bool,
    /// Index into the available buckets of the bucket last shown.
    pub current_index: usize,
    /// Handle of the running timer.
    pub timer: Option<TimerHandle>,
}

/// Snapshot of hover, selection and playback.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
    /// Entity under the pointer.
    pub hovered: Option<Entity>,
    /// Clicked (pinned) entity.
    pub selected: Option<Entity>,
    /// Playback state.
    pub playback: PlaybackState,
}

impl SelectionState {
    /// The entity driving highlighting: the hovered one, else the selected one.
    pub fn focus(&self) -> Option<&Entity> {
        self.hovered.as_ref().or(self.selected.as_ref())
    }
}

/// Notifications for the host.
#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEvent {
    /// The selection changed; `None` when it was cleared.
    SelectionChanged(Option<Entity>),
    /// Playback started or stopped.
    PlaybackChanged {
        /// New playing state.
        playing: bool,
    },
}

/// Per-chart interaction state machine.
#[derive(Clone, Debug, Default)]
pub struct Interaction {
    state: SelectionState,
    categories: Vec<CategoryId>,
    available: Vec<TimeBucket>,
    included: Vec<TimeBucket>,
    events: Vec<InteractionEvent>,
    dispatch: Dispatcher,
}

impl Interaction {
    /// Creates the state for a freshly mounted chart showing `categories` over all of `available`.
    ///
    /// A full relayout is pending.
    pub fn new(categories: Vec<CategoryId>, available: Vec<TimeBucket>) -> Self {
        let available = sorted_unique(available);
        let mut dispatch = Dispatcher::default();
        dispatch.request(Invalidation::Relayout { animated: false });
        Self {
            state: SelectionState::default(),
            categories,
            included: available.clone(),
            available,
            events: Vec::new(),
            dispatch,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Active categories in draw/rank order.
    pub fn categories(&self) -> &[CategoryId] {
        &self.categories
    }

    /// All buckets of the dataset, ascending.
    pub fn available(&self) -> &[TimeBucket] {
        &self.available
    }

    /// Buckets currently included in layout, ascending.
    pub fn included(&self) -> &[TimeBucket] {
        &self.included
    }

    /// Whether playback is running.
    pub fn is_playing(&self) -> bool {
        self.state.playback.is_playing
    }

    /// Drains queued host notifications.
    pub fn take_events(&mut self) -> Vec<InteractionEvent> {
        core::mem::take(&mut self.events)
    }

    /// Returns and clears the pending invalidation.
    pub fn take_invalidation(&mut self) -> Invalidation {
        self.dispatch.take()
    }

    /// The pending invalidation, left in place.
    pub fn pending(&self) -> Invalidation {
        self.dispatch.pending()
    }

    /// Requests an invalidation (used by owners for viewport changes).
    pub fn invalidate(&mut self, invalidation: Invalidation) {
        self.dispatch.request(invalidation);
    }

    /// Pointer moved onto `entity` (or onto nothing).
    ///
    /// Ignored while playing. Leaving an entity keeps it hovered if it is also the selection.
    /// Entities outside the active categories or included buckets count as nothing.
    pub fn hover(&mut self, entity: Option<Entity>) {
        if self.is_playing() {
            return;
        }
        let hovered = match self.current(entity) {
            Some(e) => Some(e),
            None if self.state.hovered.is_some() && self.state.hovered == self.state.selected => {
                self.state.hovered.clone()
            }
            None => None,
        };
        if hovered == self.state.hovered {
            return;
        }
        self.replace(SelectionState {
            hovered,
            ..self.state.clone()
        });
        self.dispatch.request(Invalidation::Restyle);
    }

    /// Click on `entity` (or on the background).
    ///
    /// Stops playback first if it is running. Clicking the selected entity again, or clicking the
    /// background, clears the selection. An entity outside the active categories or included
    /// buckets counts as the background.
    pub fn click(&mut self, entity: Option<Entity>, scheduler: &mut dyn Scheduler) {
        self.stop(scheduler);
        let selected = match self.current(entity) {
            Some(e) if self.state.selected.as_ref() != Some(&e) => Some(e),
            _ => None,
        };
        self.commit_selection(selected);
    }

    /// Sets the selection from outside, reproducing the visual state of the equivalent click.
    ///
    /// A selection naming an inactive category or a bucket outside the included set is stale:
    /// the selection is cleared instead.
    pub fn set_selection(&mut self, entity: Option<Entity>, scheduler: &mut dyn Scheduler) {
        self.stop(scheduler);
        let selected = entity.filter(|e| {
            let valid = self.is_valid(e);
            if !valid {
                debug!(category = %e.category, bucket = ?e.bucket, "dropping stale selection");
            }
            valid
        });
        self.commit_selection(selected);
    }

    /// Changes the active categories. Clears hover and selection and forces a full relayout.
    pub fn set_category_filter(
        &mut self,
        categories: Vec<CategoryId>,
        scheduler: &mut dyn Scheduler,
    ) {
        self.stop(scheduler);
        self.categories = categories;
        self.clear_for_relayout();
    }

    /// Changes the included buckets. Unknown buckets are dropped.
    ///
    /// Clears hover and selection and forces a full relayout.
    pub fn set_included_buckets(
        &mut self,
        buckets: Vec<TimeBucket>,
        scheduler: &mut dyn Scheduler,
    ) {
        self.stop(scheduler);
        let buckets = sorted_unique(buckets);
        self.included = buckets
            .into_iter()
            .filter(|b| self.available.binary_search(b).is_ok())
            .collect();
        self.clear_for_relayout();
    }

    /// Replaces the dataset: new categories, new buckets (all included).
    pub fn reset_data(
        &mut self,
        categories: Vec<CategoryId>,
        available: Vec<TimeBucket>,
        scheduler: &mut dyn Scheduler,
    ) {
        self.stop(scheduler);
        self.available = sorted_unique(available);
        self.included = self.available.clone();
        self.categories = categories;
        self.replace(SelectionState {
            playback: PlaybackState::default(),
            ..self.state.clone()
        });
        self.clear_for_relayout();
    }

    /// Starts playback from the first bucket.
    ///
    /// Hover and selection are cleared; the included set becomes the first bucket alone.
    pub fn play(&mut self, scheduler: &mut dyn Scheduler) {
        if self.is_playing() {
            return;
        }
        let Some(first) = self.available.first().copied() else {
            debug!("nothing to play");
            return;
        };
        let had_selection = self.state.selected.is_some();
        let timer = scheduler.schedule_repeating(PLAYBACK_PERIOD_MS);
        self.included = alloc::vec![first];
        self.replace(SelectionState {
            hovered: None,
            selected: None,
            playback: PlaybackState {
                is_playing: true,
                current_index: 0,
                timer: Some(timer),
            },
        });
        if had_selection {
            self.events.push(InteractionEvent::SelectionChanged(None));
        }
        self.events
            .push(InteractionEvent::PlaybackChanged { playing: true });
        self.dispatch.request(Invalidation::Relayout { animated: true });
        debug!(bucket = %first, "playback started");
    }

    /// Stops playback, keeping the last shown bucket included.
    pub fn stop(&mut self, scheduler: &mut dyn Scheduler) {
        let playback = self.state.playback;
        if let Some(timer) = playback.timer {
            scheduler.cancel(timer);
        }
        if !playback.is_playing && playback.timer.is_none() {
            return;
        }
        self.replace(SelectionState {
            playback: PlaybackState {
                is_playing: false,
                timer: None,
                ..playback
            },
            ..self.state.clone()
        });
        self.events
            .push(InteractionEvent::PlaybackChanged { playing: false });
        self.dispatch.request(Invalidation::Restyle);
        debug!(index = playback.current_index, "playback stopped");
    }

    /// Starts or stops playback.
    pub fn toggle_play(&mut self, scheduler: &mut dyn Scheduler) {
        if self.is_playing() {
            self.stop(scheduler);
        } else {
            self.play(scheduler);
        }
    }

    /// Advances playback for a timer firing. Returns `false` for stale or unknown handles.
    pub fn tick(&mut self, handle: TimerHandle) -> bool {
        let playback = self.state.playback;
        if !playback.is_playing || playback.timer != Some(handle) {
            warn!(?handle, "ignoring stale playback tick");
            return false;
        }
        if self.available.is_empty() {
            return false;
        }
        let index = (playback.current_index + 1) % self.available.len();
        let bucket = self.available[index];
        self.included = alloc::vec![bucket];
        self.replace(SelectionState {
            playback: PlaybackState {
                current_index: index,
                ..playback
            },
            ..self.state.clone()
        });
        self.dispatch.request(Invalidation::Relayout { animated: true });
        debug!(%bucket, index, "playback step");
        true
    }

    fn is_valid(&self, e: &Entity) -> bool {
        self.categories.contains(&e.category)
            && e
                .bucket
                .is_none_or(|b| self.included.binary_search(&b).is_ok())
    }

    fn current(&self, entity: Option<Entity>) -> Option<Entity> {
        entity.filter(|e| {
            let valid = self.is_valid(e);
            if !valid {
                debug!(category = %e.category, bucket = ?e.bucket, "ignoring stale hit");
            }
            valid
        })
    }

    fn commit_selection(&mut self, selected: Option<Entity>) {
        if selected == self.state.selected {
            return;
        }
        debug!(selected = ?selected, "selection changed");
        self.events
            .push(InteractionEvent::SelectionChanged(selected.clone()));
        self.replace(SelectionState {
            selected,
            ..self.state.clone()
        });
        self.dispatch.request(Invalidation::Restyle);
    }

    fn clear_for_relayout(&mut self) {
        if self.state.selected.is_some() {
            self.events.push(InteractionEvent::SelectionChanged(None));
        }
        self.replace(SelectionState {
            hovered: None,
            selected: None,
            ..self.state.clone()
        });
        self.dispatch
            .request(Invalidation::Relayout { animated: false });
    }

    fn replace(&mut self, next: SelectionState) {
        self.state = next;
    }
}

fn sorted_unique(mut buckets: Vec<TimeBucket>) -> Vec<TimeBucket> {
    buckets.sort_unstable();
    buckets.dedup();
    buckets
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::playback::ManualScheduler;

    fn years() -> Vec<TimeBucket> {
        vec![TimeBucket::year(2019), TimeBucket::year(2020), TimeBucket::year(2021)]
    }

    fn machine() -> Interaction {
        let mut m = Interaction::new(vec!["A".into(), "B".into()], years());
        m.take_invalidation();
        m
    }

    #[test]
    fn hover_restyles_and_leave_clears() {
        let mut m = machine();
        m.hover(Some(Entity::category("A")));
        assert_eq!(m.take_invalidation(), Invalidation::Restyle);
        m.hover(Some(Entity::category("A")));
        assert_eq!(m.take_invalidation(), Invalidation::Clean, "same entity is a no-op");
        m.hover(None);
        assert_eq!(m.state().hovered, None);
    }

    #[test]
    fn leave_keeps_hover_pinned_by_selection() {
        let mut m = machine();
        let mut sched = ManualScheduler::new();
        let a = Entity::new("A", TimeBucket::year(2021));
        m.hover(Some(a.clone()));
        m.click(Some(a.clone()), &mut sched);
        m.hover(None);
        assert_eq!(m.state().hovered, Some(a));
    }

    #[test]
    fn click_toggles_and_background_clears() {
        let mut m = machine();
        let mut sched = ManualScheduler::new();
        let a = Entity::new("A", TimeBucket::year(2021));
        m.click(Some(a.clone()), &mut sched);
        m.click(Some(a.clone()), &mut sched);
        m.click(Some(a.clone()), &mut sched);
        m.click(None, &mut sched);
        assert_eq!(
            m.take_events(),
            vec![
                InteractionEvent::SelectionChanged(Some(a.clone())),
                InteractionEvent::SelectionChanged(None),
                InteractionEvent::SelectionChanged(Some(a)),
                InteractionEvent::SelectionChanged(None),
            ]
        );
        assert_eq!(m.take_invalidation(), Invalidation::Restyle);
    }

    #[test]
    fn hover_is_ignored_while_playing() {
        let mut m = machine();
        let mut sched = ManualScheduler::new();
        m.play(&mut sched);
        m.hover(Some(Entity::category("B")));
        assert_eq!(m.state().hovered, None);
    }

    #[test]
    fn click_while_playing_stops_then_selects() {
        let mut m = machine();
        let mut sched = ManualScheduler::new();
        m.play(&mut sched);
        let timer = m.state().playback.timer.unwrap();
        m.take_events();

        let b = Entity::new("B", TimeBucket::year(2019));
        m.click(Some(b.clone()), &mut sched);
        assert!(!m.is_playing());
        assert!(!sched.is_active(timer));
        assert_eq!(
            m.take_events(),
            vec![
                InteractionEvent::PlaybackChanged { playing: false },
                InteractionEvent::SelectionChanged(Some(b)),
            ]
        );
    }

    #[test]
    fn stale_external_selection_clears() {
        let mut m = machine();
        let mut sched = ManualScheduler::new();
        m.set_selection(Some(Entity::new("A", TimeBucket::year(2020))), &mut sched);
        m.take_events();
        m.set_selection(Some(Entity::new("Z", TimeBucket::year(2020))), &mut sched);
        assert_eq!(m.state().selected, None);
        assert_eq!(m.take_events(), vec![InteractionEvent::SelectionChanged(None)]);
    }

    #[test]
    fn hits_outside_the_filter_count_as_background() {
        let mut m = machine();
        let mut sched = ManualScheduler::new();
        let a = Entity::new("A", TimeBucket::year(2021));
        m.click(Some(a.clone()), &mut sched);
        m.set_included_buckets(vec![TimeBucket::year(2020)], &mut sched);
        m.take_events();

        m.hover(Some(a.clone()));
        assert_eq!(m.state().hovered, None);
        m.click(Some(a), &mut sched);
        m.click(Some(Entity::new("Z", TimeBucket::year(2020))), &mut sched);
        assert_eq!(m.state().selected, None);
        assert!(m.take_events().is_empty());
    }

    #[test]
    fn included_buckets_filter_unknown_values() {
        let mut m = machine();
        let mut sched = ManualScheduler::new();
        m.set_included_buckets(
            vec![TimeBucket::year(2021), TimeBucket::year(1999), TimeBucket::year(2019)],
            &mut sched,
        );
        assert_eq!(m.included(), &[TimeBucket::year(2019), TimeBucket::year(2021)]);
        assert_eq!(
            m.take_invalidation(),
            Invalidation::Relayout { animated: false }
        );
    }

    #[test]
    fn stale_tick_is_ignored() {
        let mut m = machine();
        let mut sched = ManualScheduler::new();
        m.play(&mut sched);
        let timer = m.state().playback.timer.unwrap();
        m.stop(&mut sched);
        assert!(!m.tick(timer));
        assert_eq!(m.included(), &[TimeBucket::year(2019)]);
    }

    #[test]
    fn playback_wraps_around() {
        let mut m = machine();
        let mut sched = ManualScheduler::new();
        m.play(&mut sched);
        let timer = m.state().playback.timer.unwrap();
        for _ in 0..3 {
            assert!(m.tick(timer));
        }
        assert_eq!(m.state().playback.current_index, 0);
        assert_eq!(m.included(), &[TimeBucket::year(2019)]);
    }
}

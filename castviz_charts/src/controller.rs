// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glue between a [`ChartGeometry`], its [`Interaction`] state and the retained [`Scene`].
//!
//! The host forwards pointer, viewport and timer events and calls [`ChartController::render`]
//! once per frame. Rendering consumes the pending invalidation:
//! - `Clean` emits nothing,
//! - `Restyle` reuses the last layout and only re-emits paint,
//! - `Relayout` recomputes geometry, morphing in place while playback is stepping.

extern crate alloc;

use alloc::vec::Vec;

use castviz_core::{MarkDiff, Scene, Transition};
use kurbo::{Point, Rect};
use tracing::{debug, trace};

use crate::dispatch::Invalidation;
use crate::geometry::{ChartGeometry, Highlight, LayoutFrame, Placeholder, placeholder_marks};
use crate::interaction::{Interaction, InteractionEvent, SelectionState};
use crate::playback::{PLAYBACK_PERIOD_MS, Scheduler, TimerHandle};
use crate::settings::Theme;

/// A mounted chart.
#[derive(Debug)]
pub struct ChartController<G> {
    geometry: G,
    interaction: Interaction,
    scene: Scene,
    plot: Rect,
    placeholder: Option<Placeholder>,
    theme: Theme,
}

impl<G: ChartGeometry> ChartController<G> {
    /// Mounts `geometry` in `plot`, showing every category over every bucket.
    pub fn new(geometry: G, plot: Rect) -> Self {
        let interaction = Interaction::new(geometry.categories(), geometry.buckets());
        Self {
            geometry,
            interaction,
            scene: Scene::new(),
            plot,
            placeholder: None,
            theme: Theme::default(),
        }
    }

    /// Sets the theme used for placeholder text.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// The chart geometry.
    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// The interaction state machine.
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Mutable access to the interaction state machine (filters, external selection).
    pub fn interaction_mut(&mut self) -> &mut Interaction {
        &mut self.interaction
    }

    /// Current hover, selection and playback snapshot.
    pub fn state(&self) -> &SelectionState {
        self.interaction.state()
    }

    /// The retained frame.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The placeholder shown by the last layout, if any.
    pub fn placeholder(&self) -> Option<Placeholder> {
        self.placeholder
    }

    /// The plot rectangle.
    pub fn plot(&self) -> Rect {
        self.plot
    }

    /// Drains queued host notifications.
    pub fn take_events(&mut self) -> Vec<InteractionEvent> {
        self.interaction.take_events()
    }

    /// Pointer moved to `point`.
    pub fn pointer_move(&mut self, point: Point) {
        self.sync_layout();
        let entity = self.geometry.hit(point);
        trace!(?point, ?entity, "pointer move");
        self.interaction.hover(entity);
    }

    /// Pointer left the chart.
    pub fn pointer_leave(&mut self) {
        self.interaction.hover(None);
    }

    /// Click at `point`.
    pub fn click(&mut self, point: Point, scheduler: &mut dyn Scheduler) {
        self.sync_layout();
        let entity = self.geometry.hit(point);
        self.interaction.click(entity, scheduler);
    }

    /// Playback timer fired.
    pub fn tick(&mut self, handle: TimerHandle) -> bool {
        self.interaction.tick(handle)
    }

    /// The viewport changed. Playback stops and geometry is recomputed without animation.
    pub fn resize(&mut self, plot: Rect, scheduler: &mut dyn Scheduler) {
        self.interaction.stop(scheduler);
        debug!(?plot, "resize");
        self.plot = plot;
        self.interaction
            .invalidate(Invalidation::Relayout { animated: false });
    }

    /// Swaps in a geometry built from new data. All buckets become included.
    pub fn replace_data(&mut self, geometry: G, scheduler: &mut dyn Scheduler) {
        let categories = geometry.categories();
        let buckets = geometry.buckets();
        self.geometry = geometry;
        self.interaction.reset_data(categories, buckets, scheduler);
    }

    /// Produces the diff for the current frame.
    pub fn render(&mut self) -> Vec<MarkDiff> {
        let transition = match self.interaction.take_invalidation() {
            Invalidation::Clean => return Vec::new(),
            Invalidation::Restyle => Transition::Immediate,
            Invalidation::Relayout { animated } => {
                self.layout();
                if animated {
                    Transition::Morph {
                        duration_ms: PLAYBACK_PERIOD_MS,
                    }
                } else {
                    Transition::Immediate
                }
            }
        };
        let marks = match self.placeholder {
            Some(p) => placeholder_marks(p, self.plot, self.theme),
            None => self.geometry.marks(&Highlight {
                focus: self.interaction.state().focus(),
            }),
        };
        let diffs = self.scene.tick(marks, transition);
        trace!(count = diffs.len(), "render");
        diffs
    }

    /// Brings hit geometry up to date with a filter or playback change that has not been
    /// rendered yet. The invalidation stays pending so the next frame still emits it.
    fn sync_layout(&mut self) {
        if matches!(self.interaction.pending(), Invalidation::Relayout { .. }) {
            self.layout();
        }
    }

    fn layout(&mut self) {
        let frame = LayoutFrame {
            categories: self.interaction.categories(),
            included: self.interaction.included(),
            plot: self.plot,
        };
        self.placeholder = self.geometry.layout(&frame);
    }

    /// Tears the chart down: the timer is cancelled and every retained mark exits.
    pub fn unmount(mut self, scheduler: &mut dyn Scheduler) -> Vec<MarkDiff> {
        self.interaction.stop(scheduler);
        self.scene.clear()
    }
}

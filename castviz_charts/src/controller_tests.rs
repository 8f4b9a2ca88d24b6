// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

extern crate std;

use alloc::vec;
use alloc::vec::Vec;

use castviz_core::{CategoryId, MarkDiff, Matrix, TimeBucket};
use kurbo::{Point, Rect};

use crate::{
    ChartController, ChartGeometry, Entity, InteractionEvent, ManualScheduler, PLACEHOLDER_MARK,
    Placeholder, RadarChart,
};

fn years() -> [TimeBucket; 3] {
    [
        TimeBucket::year(2019),
        TimeBucket::year(2020),
        TimeBucket::year(2021),
    ]
}

fn radar() -> RadarChart {
    let [y19, y20, y21] = years();
    RadarChart::new(Matrix::from_entries(vec![
        (y19, CategoryId::from("A"), 5.0),
        (y19, CategoryId::from("B"), 1.0),
        (y19, CategoryId::from("C"), 2.0),
        (y20, CategoryId::from("A"), 2.0),
        (y20, CategoryId::from("B"), 4.0),
        (y20, CategoryId::from("C"), 3.0),
        (y21, CategoryId::from("A"), 6.0),
        (y21, CategoryId::from("B"), 3.0),
        (y21, CategoryId::from("C"), 1.0),
    ]))
}

fn plot() -> Rect {
    Rect::new(0.0, 0.0, 300.0, 300.0)
}

fn mounted() -> ChartController<RadarChart> {
    let mut c = ChartController::new(radar(), plot());
    let diffs = c.render();
    assert!(
        diffs.iter().all(|d| matches!(d, MarkDiff::Enter { .. })),
        "first frame only enters marks"
    );
    c
}

#[test]
fn playback_steps_one_bucket_at_a_time() {
    let [y19, y20, _] = years();
    let mut c = mounted();
    let mut sched = ManualScheduler::new();

    c.interaction_mut().play(&mut sched);
    let timer = c.state().playback.timer.unwrap();
    assert_eq!(c.state().playback.current_index, 0);
    assert_eq!(c.interaction().included(), &[y19]);
    c.render();

    assert!(c.tick(timer));
    assert_eq!(c.interaction().included(), &[y20]);
    let diffs = c.render();
    assert!(
        diffs.iter().any(|d| matches!(d, MarkDiff::Morph { .. })),
        "stepping morphs the overlay in place"
    );
    assert!(
        !diffs.iter().any(|d| matches!(d, MarkDiff::Exit { .. })),
        "overlay ids are stable across steps"
    );

    c.interaction_mut().stop(&mut sched);
    assert!(!sched.is_active(timer));
    assert!(!c.interaction().is_playing());
    assert_eq!(c.interaction().included(), &[y20], "the last bucket stays shown");
    assert!(!c.tick(timer), "ticks after stop are ignored");
}

#[test]
fn filtering_out_the_selected_category_clears_selection_once() {
    let [_, _, y21] = years();
    let mut c = mounted();
    let mut sched = ManualScheduler::new();

    c.interaction_mut()
        .set_selection(Some(Entity::new("A", y21)), &mut sched);
    assert_eq!(
        c.take_events(),
        vec![InteractionEvent::SelectionChanged(Some(Entity::new("A", y21)))]
    );

    c.interaction_mut()
        .set_category_filter(vec!["B".into(), "C".into()], &mut sched);
    assert_eq!(c.state().selected, None);
    assert_eq!(c.take_events(), vec![InteractionEvent::SelectionChanged(None)]);
}

#[test]
fn hover_only_restyles() {
    let mut c = mounted();
    let before = c.scene().len();

    // Straight above the center is the first axis.
    c.pointer_move(Point::new(150.0, 120.0));
    assert!(c.state().hovered.is_some());
    let diffs = c.render();
    assert!(!diffs.is_empty());
    assert!(
        diffs.iter().all(|d| matches!(d, MarkDiff::Restyle { .. })),
        "hover never touches geometry"
    );
    assert_eq!(c.scene().len(), before);

    c.pointer_leave();
    assert_eq!(c.state().hovered, None);
    assert!(c.render().iter().all(|d| matches!(d, MarkDiff::Restyle { .. })));
    assert!(c.render().is_empty(), "nothing pending after the frame");
}

#[test]
fn resize_stops_playback_and_relayouts_immediately() {
    let mut c = mounted();
    let mut sched = ManualScheduler::new();
    c.interaction_mut().play(&mut sched);
    let timer = c.state().playback.timer.unwrap();
    c.render();

    c.resize(Rect::new(0.0, 0.0, 200.0, 200.0), &mut sched);
    assert!(!sched.is_active(timer));
    assert!(!c.interaction().is_playing());
    let diffs = c.render();
    assert!(!diffs.iter().any(|d| matches!(d, MarkDiff::Morph { .. })));
    assert!(diffs.iter().any(|d| matches!(d, MarkDiff::Replace { .. })));
}

#[test]
fn unmount_cancels_timer_and_exits_everything() {
    let mut c = mounted();
    let mut sched = ManualScheduler::new();
    c.interaction_mut().play(&mut sched);
    let timer = c.state().playback.timer.unwrap();
    c.render();
    let retained = c.scene().len();

    let diffs = c.unmount(&mut sched);
    assert!(!sched.is_active(timer));
    assert_eq!(diffs.len(), retained);
    assert!(diffs.iter().all(|d| matches!(d, MarkDiff::Exit { .. })));
}

#[test]
fn empty_filter_shows_placeholder() {
    let mut c = mounted();
    let mut sched = ManualScheduler::new();
    c.interaction_mut().set_category_filter(Vec::new(), &mut sched);
    c.render();
    assert_eq!(c.placeholder(), Some(Placeholder::NoData));
    assert_eq!(c.scene().len(), 1);
    assert!(c.scene().get(PLACEHOLDER_MARK).is_some());
    assert_eq!(c.geometry().hit(Point::new(150.0, 120.0)), None);
}

#[test]
fn click_on_background_clears_selection() {
    let mut c = mounted();
    let mut sched = ManualScheduler::new();
    c.click(Point::new(150.0, 120.0), &mut sched);
    let selected = c.state().selected.clone();
    assert!(selected.is_some());
    c.click(Point::new(1.0, 1.0), &mut sched);
    assert_eq!(c.state().selected, None);
    assert_eq!(
        c.take_events(),
        vec![
            InteractionEvent::SelectionChanged(selected),
            InteractionEvent::SelectionChanged(None),
        ]
    );
}

#[test]
fn replacing_data_includes_every_new_bucket() {
    let mut c = mounted();
    let mut sched = ManualScheduler::new();
    c.interaction_mut()
        .set_included_buckets(vec![TimeBucket::year(2019)], &mut sched);
    c.render();

    let next = RadarChart::new(Matrix::from_entries(vec![
        (TimeBucket::year(2022), CategoryId::from("D"), 1.0),
        (TimeBucket::year(2023), CategoryId::from("D"), 2.0),
    ]));
    c.replace_data(next, &mut sched);
    assert_eq!(
        c.interaction().included(),
        &[TimeBucket::year(2022), TimeBucket::year(2023)]
    );
    assert_eq!(c.interaction().categories(), &[CategoryId::from("D")]);
    c.render();
    assert_eq!(c.placeholder(), None);
}

#[test]
fn click_before_render_hits_the_filtered_layout() {
    let [_, _, y21] = years();
    let mut c = mounted();
    let mut sched = ManualScheduler::new();
    c.interaction_mut()
        .set_category_filter(vec!["B".into(), "C".into()], &mut sched);

    // With A gone, the top axis belongs to B.
    c.click(Point::new(150.0, 120.0), &mut sched);
    let b = Entity::new("B", y21);
    assert_eq!(c.state().selected, Some(b.clone()));
    assert_eq!(c.take_events(), vec![InteractionEvent::SelectionChanged(Some(b))]);

    let diffs = c.render();
    assert!(
        diffs.iter().any(|d| matches!(d, MarkDiff::Exit { .. })),
        "the pending relayout is still rendered"
    );
}

#[test]
fn click_after_unrendered_tick_selects_the_shown_bucket() {
    let [_, y20, _] = years();
    let mut c = mounted();
    let mut sched = ManualScheduler::new();
    c.interaction_mut().play(&mut sched);
    let timer = c.state().playback.timer.unwrap();
    c.render();
    assert!(c.tick(timer));
    c.take_events();

    c.click(Point::new(150.0, 120.0), &mut sched);
    assert_eq!(c.interaction().included(), &[y20]);
    let a = Entity::new("A", y20);
    assert_eq!(c.state().selected, Some(a.clone()));
    assert_eq!(
        c.take_events(),
        vec![
            InteractionEvent::PlaybackChanged { playing: false },
            InteractionEvent::SelectionChanged(Some(a)),
        ]
    );
}

#[test]
fn hover_before_render_ignores_removed_categories() {
    let mut c = mounted();
    let mut sched = ManualScheduler::new();
    c.interaction_mut()
        .set_category_filter(vec!["C".into()], &mut sched);
    c.pointer_move(Point::new(150.0, 120.0));
    let hovered = c.state().hovered.clone();
    assert!(hovered.is_none_or(|e| e.category == CategoryId::from("C")));
}

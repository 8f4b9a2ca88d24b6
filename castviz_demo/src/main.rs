// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offline demo for the castviz charts.
//!
//! Loads the sample analytics snapshots under `data/`, mounts the radar, river and box-plot
//! charts, drives them through a scripted hover / click / playback session with a
//! [`ManualScheduler`], and writes one SVG per rendered frame.
//!
//! Usage: `castviz_demo [OUT_DIR]` (defaults to `castviz_demo_out`). Set `RUST_LOG=debug` to see
//! the interaction trace.

mod svg;

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::path::{Path, PathBuf};

use castviz_charts::{
    BoxplotChart, ChartController, ChartGeometry, ChartSettings, DetailCache, Entity,
    InteractionEvent, LayoutSize, ManualScheduler, RadarChart, RiverChart, SettingsError,
    format_duration,
};
use castviz_core::{BoxplotInput, CategoryId, InputError, RadarInput, RiverInput, TimeBucket};
use castviz_transforms::{SummaryTable, radar_matrix, river_matrix};
use kurbo::{Point, Rect};
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Writes each rendered frame of one chart.
struct FrameWriter {
    dir: PathBuf,
    chart: &'static str,
    svg: svg::SvgScene,
}

impl FrameWriter {
    fn new(dir: &Path, chart: &'static str, settings: &ChartSettings, plot: Rect) -> Self {
        let mut svg = svg::SvgScene::default();
        svg.set_view_box(plot);
        svg.set_background(settings.theme.background());
        Self {
            dir: dir.to_path_buf(),
            chart,
            svg,
        }
    }

    fn frame<G: ChartGeometry>(
        &mut self,
        controller: &mut ChartController<G>,
        step: &str,
    ) -> Result<(), DemoError> {
        let diffs = controller.render();
        self.svg.apply_diffs(&diffs);
        let path = self.dir.join(format!("{}_{step}.svg", self.chart));
        std::fs::write(&path, self.svg.to_svg_string()).map_err(|source| DemoError::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), diffs = diffs.len(), "wrote frame");
        Ok(())
    }
}

fn main() -> Result<(), DemoError> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init();

    let dir = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("castviz_demo_out"), PathBuf::from);
    std::fs::create_dir_all(&dir).map_err(|source| DemoError::Write {
        path: dir.clone(),
        source,
    })?;

    let settings = ChartSettings::from_json(include_str!("../data/settings.json"))?;
    info!(?settings, "settings");
    let plot = match settings.layout {
        LayoutSize::Compact => Rect::new(0.0, 0.0, 360.0, 360.0),
        LayoutSize::Large => Rect::new(0.0, 0.0, 560.0, 480.0),
    };

    let mut details: DetailCache<Entity, String> = DetailCache::new();
    radar_session(&dir, &settings, plot, &mut details)?;
    river_session(&dir, &settings, plot, &mut details)?;
    boxplot_session(&dir, &settings, plot, &mut details)?;
    info!(cached = details.len(), "done");
    Ok(())
}

fn radar_session(
    dir: &Path,
    settings: &ChartSettings,
    plot: Rect,
    details: &mut DetailCache<Entity, String>,
) -> Result<(), DemoError> {
    let snapshots = [
        (2019, RadarInput::from_json(include_str!("../data/radar_2019.json"))?),
        (2020, RadarInput::from_json(include_str!("../data/radar_2020.json"))?),
        (2021, RadarInput::from_json(include_str!("../data/radar_2021.json"))?),
    ];
    let matrix = radar_matrix(
        snapshots.iter().map(|(y, s)| (TimeBucket::year(*y), s)),
        settings.radar_metric,
    );
    let top = matrix.top_categories(settings.top_n);
    let chart = RadarChart::new(matrix)
        .with_scale(settings.radar_scale)
        .with_layout(settings.layout)
        .with_theme(settings.theme);

    let mut sched = ManualScheduler::new();
    let mut radar = ChartController::new(chart, plot).with_theme(settings.theme);
    radar
        .interaction_mut()
        .set_category_filter(top, &mut sched);
    let mut out = FrameWriter::new(dir, "radar", settings, plot);
    out.frame(&mut radar, "initial")?;

    // Just above the center sits the first axis.
    let center = plot.center();
    let probe = Point::new(center.x, center.y - plot.height() * 0.15);
    radar.pointer_move(probe);
    out.frame(&mut radar, "hover")?;
    radar.click(probe, &mut sched);
    drain_events(&mut radar, details);
    out.frame(&mut radar, "selected")?;

    radar.interaction_mut().play(&mut sched);
    drain_events(&mut radar, details);
    out.frame(&mut radar, "play_0")?;
    if let Some(timer) = radar.state().playback.timer {
        let steps = radar.interaction().available().len().saturating_sub(1);
        for step in 1..=steps {
            if !radar.tick(timer) {
                warn!(step, "timer no longer current");
                break;
            }
            out.frame(&mut radar, &format!("play_{step}"))?;
        }
    }
    info!(morphs = out.svg.morphs(), "radar playback rendered");

    let exits = radar.unmount(&mut sched);
    debug!(exits = exits.len(), active = sched.active().len(), "radar unmounted");
    Ok(())
}

fn river_session(
    dir: &Path,
    settings: &ChartSettings,
    plot: Rect,
    details: &mut DetailCache<Entity, String>,
) -> Result<(), DemoError> {
    let input = RiverInput::from_json(include_str!("../data/river.json"))?;
    let names: BTreeMap<CategoryId, String> = input
        .subjects
        .keys()
        .filter_map(|id| Some((id.clone(), input.name(id)?.to_string())))
        .collect();
    let matrix = river_matrix(&input);
    let top = matrix.top_categories(settings.top_n);
    let chart = RiverChart::new(matrix)
        .with_names(&names)
        .with_offset(settings.stream_offset)
        .with_theme(settings.theme);

    let mut sched = ManualScheduler::new();
    let mut river = ChartController::new(chart, plot).with_theme(settings.theme);
    river
        .interaction_mut()
        .set_category_filter(top, &mut sched);
    let mut out = FrameWriter::new(dir, "river", settings, plot);
    out.frame(&mut river, "initial")?;

    let probe = plot.center();
    river.click(probe, &mut sched);
    drain_events(&mut river, details);
    out.frame(&mut river, "selected")?;

    // Narrowing the window clears the selection.
    let recent: Vec<TimeBucket> = river
        .interaction()
        .available()
        .iter()
        .rev()
        .take(2)
        .copied()
        .collect();
    river
        .interaction_mut()
        .set_included_buckets(recent, &mut sched);
    drain_events(&mut river, details);
    out.frame(&mut river, "recent")?;

    river.resize(plot.inflate(-40.0, -40.0), &mut sched);
    out.frame(&mut river, "resized")?;
    Ok(())
}

fn boxplot_session(
    dir: &Path,
    settings: &ChartSettings,
    plot: Rect,
    details: &mut DetailCache<Entity, String>,
) -> Result<(), DemoError> {
    let input = BoxplotInput::from_json(include_str!("../data/boxplot.json"))?;
    let table = SummaryTable::from_input(&input);
    for (bucket, end) in table.intervals() {
        debug!(
            start = %format_duration(bucket.as_f64()),
            end = %format_duration(end),
            "interval"
        );
    }
    let chart = BoxplotChart::new(table).with_theme(settings.theme);

    let mut sched = ManualScheduler::new();
    let mut boxplot = ChartController::new(chart, plot).with_theme(settings.theme);
    let mut out = FrameWriter::new(dir, "boxplot", settings, plot);
    out.frame(&mut boxplot, "initial")?;

    // Sweep the pointer across the plot until it lands on a cell.
    let y = plot.center().y;
    let hit = (0..40)
        .map(|i| Point::new(plot.x0 + plot.width() * f64::from(i) / 40.0, y))
        .find(|p| boxplot.geometry().hit(*p).is_some());
    match hit {
        Some(p) => {
            boxplot.pointer_move(p);
            out.frame(&mut boxplot, "hover")?;
            boxplot.click(p, &mut sched);
            drain_events(&mut boxplot, details);
            out.frame(&mut boxplot, "selected")?;
        }
        None => warn!("no box-plot cell under the sweep line"),
    }
    boxplot.pointer_leave();
    out.frame(&mut boxplot, "leave")?;
    Ok(())
}

/// Logs host notifications and fetches details for new selections.
fn drain_events<G: ChartGeometry>(
    controller: &mut ChartController<G>,
    details: &mut DetailCache<Entity, String>,
) {
    for event in controller.take_events() {
        match event {
            InteractionEvent::SelectionChanged(Some(entity)) => {
                info!(category = %entity.category, bucket = ?entity.bucket, "selected");
                if details.request(entity.clone(), |e| debug!(?e, "fetching details")) {
                    let summary = match entity.bucket {
                        Some(b) => format!("{} in {b}", entity.category),
                        None => entity.category.to_string(),
                    };
                    details.complete::<Infallible>(&entity, Ok(summary));
                }
            }
            InteractionEvent::SelectionChanged(None) => info!("selection cleared"),
            InteractionEvent::PlaybackChanged { playing } => info!(playing, "playback"),
        }
    }
}

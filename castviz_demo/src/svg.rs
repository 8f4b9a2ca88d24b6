// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal SVG dump of a diff-driven mark scene.

use std::collections::HashMap;
use std::fmt::Write as _;

use castviz_core::{Mark, MarkDiff, MarkId, Primitive, TextAnchor};
use kurbo::Rect;
use peniko::Brush;

/// Mirror of the renderer side: applies diffs and serializes the result.
#[derive(Debug, Default)]
pub(crate) struct SvgScene {
    marks: HashMap<MarkId, Mark>,
    view_box: Option<Rect>,
    background: Option<Brush>,
    morphs: usize,
}

impl SvgScene {
    pub(crate) fn set_view_box(&mut self, view_box: Rect) {
        self.view_box = Some(view_box);
    }

    pub(crate) fn set_background(&mut self, brush: impl Into<Brush>) {
        self.background = Some(brush.into());
    }

    /// Number of morph instructions seen so far.
    pub(crate) fn morphs(&self) -> usize {
        self.morphs
    }

    pub(crate) fn apply_diffs(&mut self, diffs: &[MarkDiff]) {
        for diff in diffs {
            match diff {
                MarkDiff::Enter { mark }
                | MarkDiff::Replace { mark }
                | MarkDiff::Restyle { mark } => {
                    self.marks.insert(mark.id, (**mark).clone());
                }
                // Offline output has no timeline; jump to the target shape.
                MarkDiff::Morph { to, .. } => {
                    self.morphs += 1;
                    self.marks.insert(to.id, (**to).clone());
                }
                MarkDiff::Exit { id } => {
                    self.marks.remove(id);
                }
            }
        }
    }

    pub(crate) fn to_svg_string(&self) -> String {
        let view_box = match (self.view_box, self.bounds()) {
            (Some(a), Some(b)) => Some(a.union(b)),
            (a, b) => a.or(b),
        };
        let view_box = view_box.unwrap_or_else(|| Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut out = String::new();

        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}" preserveAspectRatio="xMinYMin meet">"#,
            view_box.x0,
            view_box.y0,
            view_box.width(),
            view_box.height(),
            view_box.width(),
            view_box.height()
        );
        if let Some(bg) = &self.background {
            let _ = write!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                view_box.x0,
                view_box.y0,
                view_box.width(),
                view_box.height()
            );
            write_paint_attr(&mut out, "fill", bg);
            out.push_str("/>\n");
        }

        let mut marks: Vec<&Mark> = self.marks.values().collect();
        marks.sort_by_key(|m| (m.z_index, m.id));

        for mark in marks {
            match &mark.primitive {
                Primitive::Rect(r) => {
                    let _ = write!(
                        out,
                        r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                        r.x0,
                        r.y0,
                        r.width(),
                        r.height(),
                    );
                    write_shape_paint(&mut out, mark);
                    out.push_str("/>\n");
                }
                Primitive::Circle(c) => {
                    let _ = write!(
                        out,
                        r#"<circle cx="{}" cy="{}" r="{}""#,
                        c.center.x, c.center.y, c.radius
                    );
                    write_shape_paint(&mut out, mark);
                    out.push_str("/>\n");
                }
                Primitive::Line(l) => {
                    let _ = write!(
                        out,
                        r#"<line x1="{}" y1="{}" x2="{}" y2="{}""#,
                        l.p0.x, l.p0.y, l.p1.x, l.p1.y
                    );
                    write_shape_paint(&mut out, mark);
                    out.push_str("/>\n");
                }
                Primitive::Path(p) => {
                    let _ = write!(out, r#"<path d="{}""#, p.to_svg());
                    write_shape_paint(&mut out, mark);
                    out.push_str("/>\n");
                }
                Primitive::Text(t) => {
                    let _ = write!(
                        out,
                        r#"<text x="{}" y="{}" font-size="{}" dominant-baseline="middle""#,
                        t.pos.x, t.pos.y, t.font_size
                    );
                    if t.angle != 0.0 {
                        let _ = write!(
                            out,
                            r#" transform="rotate({} {} {})""#,
                            t.angle, t.pos.x, t.pos.y
                        );
                    }
                    out.push_str(match t.anchor {
                        TextAnchor::Start => r#" text-anchor="start""#,
                        TextAnchor::Middle => r#" text-anchor="middle""#,
                        TextAnchor::End => r#" text-anchor="end""#,
                    });
                    write_paint_attr(&mut out, "fill", &mark.fill);
                    write_opacity(&mut out, mark.opacity);
                    out.push('>');
                    if let Some(full) = &t.tooltip {
                        let _ = write!(out, "<title>{}</title>", escape_xml(full));
                    }
                    out.push_str(&escape_xml(&t.text));
                    out.push_str("</text>\n");
                }
            }
        }

        out.push_str("</svg>\n");
        out
    }

    fn bounds(&self) -> Option<Rect> {
        let pad = 10.0;
        self.marks
            .values()
            .filter_map(|m| match &m.primitive {
                Primitive::Text(t) => Some(estimate_text_bounds(
                    t.pos.x,
                    t.pos.y,
                    t.font_size,
                    t.anchor,
                    &t.text,
                )),
                p => p.bounds(),
            })
            .reduce(|a, b| a.union(b))
            .map(|r| r.inflate(pad, pad))
    }
}

fn estimate_text_bounds(x: f64, y: f64, font_size: f64, anchor: TextAnchor, text: &str) -> Rect {
    // Rough heuristic: ~0.6em average glyph width.
    let width = 0.6 * font_size * text.chars().count() as f64;
    let half_height = 0.5 * font_size;
    let (x0, x1) = match anchor {
        TextAnchor::Start => (x, x + width),
        TextAnchor::Middle => (x - width / 2.0, x + width / 2.0),
        TextAnchor::End => (x - width, x),
    };
    Rect::new(x0, y - half_height, x1, y + half_height)
}

fn svg_paint(brush: &Brush) -> (String, Option<f64>) {
    match brush {
        Brush::Solid(color) => {
            let rgba = color.to_rgba8();
            if rgba.a == 0 {
                return ("none".to_string(), None);
            }
            let value = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
            let opacity = (rgba.a != 255).then(|| f64::from(rgba.a) / 255.0);
            (value, opacity)
        }
        _ => ("none".to_string(), None),
    }
}

fn write_paint_attr(out: &mut String, name: &str, brush: &Brush) {
    let (value, opacity) = svg_paint(brush);
    let _ = write!(out, r#" {name}="{value}""#);
    if let Some(o) = opacity {
        let _ = write!(out, r#" {name}-opacity="{o}""#);
    }
}

fn write_shape_paint(out: &mut String, mark: &Mark) {
    write_paint_attr(out, "fill", &mark.fill);
    if mark.stroke_width > 0.0 {
        write_paint_attr(out, "stroke", &mark.stroke);
        let _ = write!(out, r#" stroke-width="{}""#, mark.stroke_width);
    }
    write_opacity(out, mark.opacity);
}

fn write_opacity(out: &mut String, opacity: f64) {
    if opacity < 1.0 {
        let _ = write!(out, r#" opacity="{opacity}""#);
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use castviz_core::{Scene, Transition};
    use kurbo::Circle;
    use peniko::color::palette::css;

    use super::*;

    #[test]
    fn exits_remove_marks_and_morphs_are_counted() {
        let mut scene = Scene::new();
        let mut svg = SvgScene::default();
        let dot = |x: f64| {
            Mark::new(
                MarkId(7),
                0,
                Primitive::Circle(Circle::new((x, 0.0), 2.0)),
                css::TOMATO,
            )
        };
        svg.apply_diffs(&scene.tick(vec![dot(0.0)], Transition::Immediate));
        svg.apply_diffs(&scene.tick(vec![dot(5.0)], Transition::Morph { duration_ms: 300 }));
        assert_eq!(svg.morphs(), 1);
        assert!(svg.to_svg_string().contains(r#"cx="5""#));
        svg.apply_diffs(&scene.clear());
        assert!(!svg.to_svg_string().contains("<circle"));
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape_xml("Q&A <live>"), "Q&amp;A &lt;live&gt;");
    }
}

//! Frame rendering.
//!
//! [`render`] turns the world, viewport, playback cursor and display flags into a
//! [`DisplayList`]: an ordered, serialisable list of draw commands grouped by
//! [`Layer`]. The browser host replays it on a 2D canvas; [`raster`] replays it
//! into an RGBA image. The renderer keeps no state between frames.

pub mod background;
pub mod palette;
pub mod raster;

use fleetview_protocol::{Agent, CanvasSize, DisplayFlags, MovementEvent, WorldPoint};
use serde::{Deserialize, Serialize};

use crate::config::MapConfig;
use crate::input::HoverState;
use crate::playback::PlaybackController;
use crate::viewport::Viewport;
use crate::world::WorldModel;

pub use background::{Background, ImageBounds, MapImage};
pub use palette::Rgba;

/// Back-to-front draw order. Hit-testing treats later layers as on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Background,
    Grid,
    Areas,
    Paths,
    Agents,
    Labels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
}

/// Drawing primitives in device pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCmd {
    Clear {
        color: Rgba,
    },
    Image {
        id: String,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
    FillRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Rgba,
    },
    StrokeRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Rgba,
        width: f64,
    },
    Line {
        from: [f64; 2],
        to: [f64; 2],
        color: Rgba,
        width: f64,
    },
    Polyline {
        points: Vec<[f64; 2]>,
        color: Rgba,
        width: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dash: Option<[f64; 2]>,
    },
    FillCircle {
        center: [f64; 2],
        radius: f64,
        color: Rgba,
    },
    StrokeCircle {
        center: [f64; 2],
        radius: f64,
        color: Rgba,
        width: f64,
    },
    Text {
        at: [f64; 2],
        text: String,
        size: f64,
        color: Rgba,
        align: TextAlign,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        plate: Option<Rgba>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerBatch {
    pub layer: Layer,
    pub commands: Vec<DrawCmd>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayList {
    /// Surface size in device pixels.
    pub width: u32,
    pub height: u32,
    pub layers: Vec<LayerBatch>,
}

impl DisplayList {
    pub fn layer(&self, layer: Layer) -> Option<&[DrawCmd]> {
        self.layers
            .iter()
            .find(|b| b.layer == layer)
            .map(|b| b.commands.as_slice())
    }

    pub fn commands(&self) -> impl Iterator<Item = &DrawCmd> {
        self.layers.iter().flat_map(|b| b.commands.iter())
    }
}

/// Everything a frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub world: &'a WorldModel,
    pub viewport: &'a Viewport,
    pub playback: &'a PlaybackController,
    pub flags: DisplayFlags,
    pub hover: &'a HoverState,
    pub selected: Option<&'a str>,
    pub background: &'a Background,
    pub config: &'a MapConfig,
    pub canvas: CanvasSize,
}

const MARKER_RADIUS: f64 = 7.0;
const HALO_RADIUS: f64 = 13.0;
const PATH_ALPHA: f64 = 0.85;
const PATH_DIMMED_ALPHA: f64 = 0.25;
const MAX_GRID_LINES: i64 = 400;
const GRID_INDEX_LIMIT: f64 = 9_007_199_254_740_992.0;
/// Extra CSS pixels kept around the canvas when culling markers.
const CULL_MARGIN: f64 = 48.0;

pub fn render(frame: &Frame<'_>) -> DisplayList {
    let ctx = Ctx::new(frame);
    let mut layers = vec![
        LayerBatch {
            layer: Layer::Background,
            commands: draw_background(&ctx),
        },
        LayerBatch {
            layer: Layer::Grid,
            commands: draw_grid(&ctx),
        },
    ];
    if frame.flags.show_areas {
        layers.push(LayerBatch {
            layer: Layer::Areas,
            commands: draw_areas(&ctx),
        });
    }
    if frame.flags.show_paths {
        layers.push(LayerBatch {
            layer: Layer::Paths,
            commands: draw_paths(&ctx),
        });
    }
    layers.push(LayerBatch {
        layer: Layer::Agents,
        commands: draw_agents(&ctx),
    });
    if frame.flags.show_labels {
        layers.push(LayerBatch {
            layer: Layer::Labels,
            commands: draw_labels(&ctx),
        });
    }
    DisplayList {
        width: ctx.device_width(),
        height: ctx.device_height(),
        layers,
    }
}

struct Ctx<'f, 'a> {
    f: &'f Frame<'a>,
    dpr: f64,
}

impl<'f, 'a> Ctx<'f, 'a> {
    fn new(f: &'f Frame<'a>) -> Self {
        let dpr = if f.canvas.dpr.is_finite() && f.canvas.dpr > 0.0 {
            f.canvas.dpr
        } else {
            1.0
        };
        Self { f, dpr }
    }

    fn device_width(&self) -> u32 {
        (self.f.canvas.width * self.dpr).round().max(0.0) as u32
    }

    fn device_height(&self) -> u32 {
        (self.f.canvas.height * self.dpr).round().max(0.0) as u32
    }

    /// World point to device pixels.
    fn project(&self, wx: f64, wy: f64) -> [f64; 2] {
        let p = self.f.viewport.world_to_screen(wx, wy, self.f.canvas);
        [p.x * self.dpr, p.y * self.dpr]
    }

    fn project_point(&self, p: WorldPoint) -> [f64; 2] {
        self.project(p.x as f64, p.y as f64)
    }

    /// CSS pixels to device pixels.
    fn px(&self, v: f64) -> f64 {
        v * self.dpr
    }

    fn on_screen(&self, p: [f64; 2]) -> bool {
        let m = self.px(CULL_MARGIN);
        let w = self.f.canvas.width * self.dpr;
        let h = self.f.canvas.height * self.dpr;
        p[0] >= -m && p[0] <= w + m && p[1] >= -m && p[1] <= h + m
    }
}

fn draw_background(ctx: &Ctx<'_, '_>) -> Vec<DrawCmd> {
    let mut out = vec![DrawCmd::Clear {
        color: palette::BACKDROP,
    }];
    match ctx.f.background.image() {
        Some(img) => {
            let tl = ctx.project(img.bounds.min_x, img.bounds.min_y);
            let br = ctx.project(img.bounds.max_x, img.bounds.max_y);
            out.push(DrawCmd::Image {
                id: img.id.clone(),
                x: tl[0],
                y: tl[1],
                w: br[0] - tl[0],
                h: br[1] - tl[1],
            });
        }
        None => draw_procedural_backdrop(ctx, &mut out),
    }
    out
}

/// Quadrant regions around the origin with a fine grid, used whenever no map
/// image is available.
fn draw_procedural_backdrop(ctx: &Ctx<'_, '_>, out: &mut Vec<DrawCmd>) {
    let w = ctx.f.canvas.width * ctx.dpr;
    let h = ctx.f.canvas.height * ctx.dpr;
    let origin = ctx.project(0.0, 0.0);
    let ox = origin[0].clamp(0.0, w);
    let oy = origin[1].clamp(0.0, h);

    let regions = [
        ("Northwest Reach", 0.0, 0.0, ox, oy, Rgba(30, 50, 88, 90)),
        ("Northeast Reach", ox, 0.0, w - ox, oy, Rgba(22, 55, 85, 90)),
        ("Southwest Reach", 0.0, oy, ox, h - oy, Rgba(18, 44, 70, 90)),
        ("Southeast Reach", ox, oy, w - ox, h - oy, Rgba(26, 40, 72, 90)),
    ];
    for (name, x, y, rw, rh, color) in regions {
        if rw <= 0.0 || rh <= 0.0 {
            continue;
        }
        out.push(DrawCmd::FillRect {
            x,
            y,
            w: rw,
            h: rh,
            color,
        });
        out.push(DrawCmd::Text {
            at: [x + rw * 0.5, y + rh * 0.5],
            text: name.to_string(),
            size: ctx.px(13.0),
            color: palette::TEXT_MUTED.faded(0.5),
            align: TextAlign::Center,
            plate: None,
        });
    }

    // Fine grid, one line per world unit, only when cells are large enough to read.
    let scale = ctx.f.viewport.scale();
    if scale >= 8.0 {
        grid_lines(ctx, 1, palette::GRID_MINOR, ctx.px(1.0), out);
    }
}

fn draw_grid(ctx: &Ctx<'_, '_>) -> Vec<DrawCmd> {
    let mut out = Vec::new();
    grid_lines(
        ctx,
        ctx.f.config.grid_major_every,
        palette::GRID_MAJOR,
        ctx.px(1.0),
        &mut out,
    );

    let w = ctx.f.canvas.width * ctx.dpr;
    let h = ctx.f.canvas.height * ctx.dpr;
    let origin = ctx.project(0.0, 0.0);
    if (0.0..=w).contains(&origin[0]) {
        out.push(DrawCmd::Line {
            from: [origin[0], 0.0],
            to: [origin[0], h],
            color: palette::AXIS,
            width: ctx.px(1.5),
        });
    }
    if (0.0..=h).contains(&origin[1]) {
        out.push(DrawCmd::Line {
            from: [0.0, origin[1]],
            to: [w, origin[1]],
            color: palette::AXIS,
            width: ctx.px(1.5),
        });
    }
    if ctx.on_screen(origin) {
        out.push(DrawCmd::Text {
            at: [origin[0] + ctx.px(4.0), origin[1] - ctx.px(4.0)],
            text: "(0,0)".to_string(),
            size: ctx.px(10.0),
            color: palette::AXIS,
            align: TextAlign::Left,
            plate: None,
        });
    }
    out
}

fn grid_lines(ctx: &Ctx<'_, '_>, every: i64, color: Rgba, width: f64, out: &mut Vec<DrawCmd>) {
    let every = every.max(1);
    let r = ctx.f.viewport.visible_world_rect(ctx.f.canvas);
    let w = ctx.f.canvas.width * ctx.dpr;
    let h = ctx.f.canvas.height * ctx.dpr;

    let step = every as f64;
    let first_x = (r.min_x / step).floor();
    let last_x = (r.max_x / step).ceil();
    let first_y = (r.min_y / step).floor();
    let last_y = (r.max_y / step).ceil();
    // Past 2^53 consecutive line indices are no longer distinct f64 values.
    let in_range = |v: f64| v.is_finite() && v.abs() < GRID_INDEX_LIMIT;
    if ![first_x, last_x, first_y, last_y].into_iter().all(in_range)
        || last_x - first_x > MAX_GRID_LINES as f64
        || last_y - first_y > MAX_GRID_LINES as f64
    {
        return;
    }
    for i in 0..=(last_x - first_x) as i64 {
        let x = ctx.project((first_x + i as f64) * step, 0.0)[0];
        out.push(DrawCmd::Line {
            from: [x, 0.0],
            to: [x, h],
            color,
            width,
        });
    }
    for j in 0..=(last_y - first_y) as i64 {
        let y = ctx.project(0.0, (first_y + j as f64) * step)[1];
        out.push(DrawCmd::Line {
            from: [0.0, y],
            to: [w, y],
            color,
            width,
        });
    }
}

fn draw_areas(ctx: &Ctx<'_, '_>) -> Vec<DrawCmd> {
    let mut out = Vec::new();
    for area in ctx.f.world.areas() {
        let hovered = ctx.f.hover.area_id.as_deref() == Some(area.id.as_str());
        let style = palette::area_style(area.area_type, hovered);
        let (x, y) = (area.rect.x as f64, area.rect.y as f64);
        let tl = ctx.project(x, y);
        let br = ctx.project(x + area.rect.width as f64, y + area.rect.height as f64);
        let (w, h) = (br[0] - tl[0], br[1] - tl[1]);
        out.push(DrawCmd::FillRect {
            x: tl[0],
            y: tl[1],
            w,
            h,
            color: style.fill,
        });
        out.push(DrawCmd::StrokeRect {
            x: tl[0],
            y: tl[1],
            w,
            h,
            color: style.border,
            width: ctx.px(if hovered { 3.0 } else { 1.0 }),
        });
        let title = if area.level_range.is_empty() {
            area.name.clone()
        } else {
            format!("{} ({})", area.name, area.level_range)
        };
        out.push(DrawCmd::Text {
            at: [tl[0] + ctx.px(6.0), tl[1] + ctx.px(14.0)],
            text: title,
            size: ctx.px(11.0),
            color: style.text,
            align: TextAlign::Left,
            plate: None,
        });
    }
    out
}

/// Splits one agent's events into connected runs: a new run starts whenever an
/// event does not begin where the previous one ended.
fn path_runs<'m>(events: impl Iterator<Item = &'m MovementEvent>) -> Vec<Vec<WorldPoint>> {
    let mut runs: Vec<Vec<WorldPoint>> = Vec::new();
    for ev in events {
        match runs.last_mut() {
            Some(run) if run.last() == Some(&ev.from) => run.push(ev.to),
            _ => runs.push(vec![ev.from, ev.to]),
        }
    }
    runs
}

fn draw_paths(ctx: &Ctx<'_, '_>) -> Vec<DrawCmd> {
    let world = ctx.f.world;
    let cutoff = ctx.f.playback.visible_until();
    let movements = world.movements();
    let mut out = Vec::new();

    for agent_id in world.agent_ids_with_history() {
        let events = world
            .movements_for(agent_id)
            .iter()
            .take_while(|&&i| cutoff.map_or(true, |c| i <= c))
            .map(|&i| &movements[i]);
        let base = world
            .agent(agent_id)
            .map(|a| palette::status_color(a.status))
            .unwrap_or(palette::PATH_ORPHAN);
        let alpha = match ctx.f.selected {
            Some(sel) if sel != agent_id => PATH_DIMMED_ALPHA,
            _ => PATH_ALPHA,
        };
        for run in path_runs(events) {
            out.push(DrawCmd::Polyline {
                points: run.iter().map(|p| ctx.project_point(*p)).collect(),
                color: base.faded(alpha),
                width: ctx.px(2.0),
                dash: Some([ctx.px(6.0), ctx.px(4.0)]),
            });
        }
    }

    if let Some(ev) = cutoff.and_then(|i| movements.get(i)) {
        out.push(DrawCmd::StrokeCircle {
            center: ctx.project_point(ev.to),
            radius: ctx.px(MARKER_RADIUS + 3.0),
            color: palette::PLAYHEAD,
            width: ctx.px(2.0),
        });
    }
    out
}

fn visible_agents<'w>(ctx: &'w Ctx<'_, 'w>) -> impl Iterator<Item = (&'w Agent, [f64; 2])> + 'w {
    ctx.f.world.agents().iter().filter_map(move |a| {
        let p = ctx.project(a.x as f64, a.y as f64);
        ctx.on_screen(p).then_some((a, p))
    })
}

fn draw_agents(ctx: &Ctx<'_, '_>) -> Vec<DrawCmd> {
    let mut out = Vec::new();
    for (agent, p) in visible_agents(ctx) {
        let selected = ctx.f.selected == Some(agent.id.as_str());
        let hovered = ctx.f.hover.agent_id.as_deref() == Some(agent.id.as_str());
        if selected || hovered {
            out.push(DrawCmd::FillCircle {
                center: p,
                radius: ctx.px(HALO_RADIUS),
                color: if selected {
                    palette::HALO_SELECTED
                } else {
                    palette::HALO_HOVER
                },
            });
        }
        out.push(DrawCmd::FillCircle {
            center: p,
            radius: ctx.px(MARKER_RADIUS),
            color: palette::status_color(agent.status),
        });
        out.push(DrawCmd::StrokeCircle {
            center: p,
            radius: ctx.px(MARKER_RADIUS),
            color: palette::MARKER_EDGE,
            width: ctx.px(1.5),
        });
        out.push(DrawCmd::Text {
            at: [p[0], p[1] + ctx.px(3.5)],
            text: palette::class_glyph(agent.class).to_string(),
            size: ctx.px(9.0),
            color: palette::MARKER_EDGE,
            align: TextAlign::Center,
            plate: None,
        });
    }
    out
}

fn draw_labels(ctx: &Ctx<'_, '_>) -> Vec<DrawCmd> {
    visible_agents(ctx)
        .map(|(agent, p)| DrawCmd::Text {
            at: [p[0], p[1] + ctx.px(MARKER_RADIUS + 13.0)],
            text: agent.display_name.clone(),
            size: ctx.px(11.0),
            color: palette::TEXT,
            align: TextAlign::Center,
            plate: Some(palette::LABEL_PLATE),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{agent, area, movement};
    use fleetview_protocol::AgentStatus;
    use std::time::Duration;

    struct Scene {
        world: WorldModel,
        viewport: Viewport,
        playback: PlaybackController,
        hover: HoverState,
        background: Background,
        config: MapConfig,
    }

    impl Scene {
        fn new() -> Self {
            let config = MapConfig::default();
            let mut world = WorldModel::new();
            world
                .replace_agents(vec![
                    agent("a", 0, 0, AgentStatus::Fighting),
                    agent("b", 5, 5, AgentStatus::Idle),
                ])
                .unwrap();
            world.replace_movements(vec![
                movement("a", (-3, 0), (-1, 0), 1),
                movement("a", (-1, 0), (0, 0), 2),
                movement("b", (5, 0), (5, 5), 3),
                movement("gone", (9, 9), (9, 9), 4),
            ]);
            world.replace_areas(vec![area("z", -2, -2, 4, 4)]);
            let mut playback =
                PlaybackController::new(Duration::from_millis(100), config.end_of_playback);
            playback.set_len(world.movements().len());
            Self {
                viewport: Viewport::new(&config),
                world,
                playback,
                hover: HoverState::default(),
                background: Background::Procedural,
                config,
            }
        }

        fn frame(&self, flags: DisplayFlags, selected: Option<&'static str>) -> DisplayList {
            render(&Frame {
                world: &self.world,
                viewport: &self.viewport,
                playback: &self.playback,
                flags,
                hover: &self.hover,
                selected,
                background: &self.background,
                config: &self.config,
                canvas: CanvasSize::new(800.0, 600.0),
            })
        }
    }

    fn polylines(list: &DisplayList) -> Vec<&DrawCmd> {
        list.layer(Layer::Paths)
            .unwrap_or(&[])
            .iter()
            .filter(|c| matches!(c, DrawCmd::Polyline { .. }))
            .collect()
    }

    #[test]
    fn layers_follow_fixed_order() {
        let scene = Scene::new();
        let list = scene.frame(DisplayFlags::default(), None);
        let order: Vec<Layer> = list.layers.iter().map(|b| b.layer).collect();
        assert_eq!(
            order,
            vec![
                Layer::Background,
                Layer::Grid,
                Layer::Areas,
                Layer::Paths,
                Layer::Agents,
                Layer::Labels
            ]
        );
    }

    #[test]
    fn flags_drop_optional_layers() {
        let scene = Scene::new();
        let list = scene.frame(
            DisplayFlags {
                show_labels: false,
                show_paths: false,
                show_areas: false,
            },
            None,
        );
        let order: Vec<Layer> = list.layers.iter().map(|b| b.layer).collect();
        assert_eq!(order, vec![Layer::Background, Layer::Grid, Layer::Agents]);
    }

    #[test]
    fn rendering_is_idempotent() {
        let scene = Scene::new();
        let one = scene.frame(DisplayFlags::default(), Some("a"));
        let two = scene.frame(DisplayFlags::default(), Some("a"));
        assert_eq!(one, two);
    }

    #[test]
    fn connected_events_form_one_run_and_orphans_still_draw() {
        let scene = Scene::new();
        let list = scene.frame(DisplayFlags::default(), None);
        let lines = polylines(&list);
        // a: one connected run, b: one, gone: one degenerate
        assert_eq!(lines.len(), 3);
        let DrawCmd::Polyline { points, color, .. } = lines[0] else {
            unreachable!()
        };
        assert_eq!(points.len(), 3);
        assert_eq!(
            *color,
            palette::status_color(AgentStatus::Fighting).faded(PATH_ALPHA)
        );
        let DrawCmd::Polyline { points, color, .. } = lines[2] else {
            unreachable!()
        };
        assert_eq!(points[0], points[1]);
        assert_eq!(*color, palette::PATH_ORPHAN.faded(PATH_ALPHA));
    }

    #[test]
    fn selection_dims_other_trails() {
        let scene = Scene::new();
        let list = scene.frame(DisplayFlags::default(), Some("b"));
        let alphas: Vec<u8> = polylines(&list)
            .iter()
            .map(|c| match c {
                DrawCmd::Polyline { color, .. } => color.3,
                _ => 0,
            })
            .collect();
        let dim = Rgba::rgb(0, 0, 0).faded(PATH_DIMMED_ALPHA).3;
        let full = Rgba::rgb(0, 0, 0).faded(PATH_ALPHA).3;
        assert_eq!(alphas, vec![dim, full, dim]);
    }

    #[test]
    fn replay_restricts_paths_to_cursor() {
        let mut scene = Scene::new();
        scene.playback.play();
        scene.playback.tick();
        let list = scene.frame(DisplayFlags::default(), None);
        let lines = polylines(&list);
        assert_eq!(lines.len(), 1);
        let DrawCmd::Polyline { points, .. } = lines[0] else {
            unreachable!()
        };
        assert_eq!(points.len(), 3);
        let playheads = list
            .layer(Layer::Paths)
            .unwrap()
            .iter()
            .filter(|c| matches!(c, DrawCmd::StrokeCircle { .. }))
            .count();
        assert_eq!(playheads, 1);
    }

    #[test]
    fn selected_agent_gets_halo_behind_marker() {
        let scene = Scene::new();
        let list = scene.frame(DisplayFlags::default(), Some("a"));
        let agents = list.layer(Layer::Agents).unwrap();
        match &agents[0] {
            DrawCmd::FillCircle { color, radius, .. } => {
                assert_eq!(*color, palette::HALO_SELECTED);
                assert_eq!(*radius, HALO_RADIUS);
            }
            other => panic!("expected halo first, got {other:?}"),
        }
    }

    #[test]
    fn hovered_area_has_thicker_border() {
        let mut scene = Scene::new();
        let width_of = |list: &DisplayList| {
            list.layer(Layer::Areas)
                .unwrap()
                .iter()
                .find_map(|c| match c {
                    DrawCmd::StrokeRect { width, .. } => Some(*width),
                    _ => None,
                })
                .unwrap()
        };
        let idle = width_of(&scene.frame(DisplayFlags::default(), None));
        scene.hover.area_id = Some("z".to_string());
        let hot = width_of(&scene.frame(DisplayFlags::default(), None));
        assert!(hot > idle);
    }

    #[test]
    fn failed_background_falls_back_to_procedural() {
        let mut scene = Scene::new();
        scene.background = Background::Failed("404".to_string());
        let list = scene.frame(DisplayFlags::default(), None);
        let bg = list.layer(Layer::Background).unwrap();
        assert!(bg.len() > 1);
        assert!(!bg.iter().any(|c| matches!(c, DrawCmd::Image { .. })));
        assert!(list.layer(Layer::Agents).is_some_and(|a| !a.is_empty()));
    }

    #[test]
    fn empty_world_draws_only_backdrop_and_grid() {
        let config = MapConfig::default();
        let world = WorldModel::new();
        let playback = PlaybackController::new(Duration::from_millis(100), config.end_of_playback);
        let list = render(&Frame {
            world: &world,
            viewport: &Viewport::new(&config),
            playback: &playback,
            flags: DisplayFlags::default(),
            hover: &HoverState::default(),
            selected: None,
            background: &Background::Procedural,
            config: &config,
            canvas: CanvasSize::new(320.0, 200.0),
        });
        for layer in [Layer::Areas, Layer::Paths, Layer::Agents, Layer::Labels] {
            assert!(list.layer(layer).is_some_and(|c| c.is_empty()), "{layer:?}");
        }
        assert!(!list.layer(Layer::Grid).unwrap().is_empty());
    }

    #[test]
    fn device_pixel_ratio_scales_geometry() {
        let scene = Scene::new();
        let mut canvas = CanvasSize::new(800.0, 600.0);
        canvas.dpr = 2.0;
        let list = render(&Frame {
            world: &scene.world,
            viewport: &scene.viewport,
            playback: &scene.playback,
            flags: DisplayFlags::default(),
            hover: &scene.hover,
            selected: None,
            background: &scene.background,
            config: &scene.config,
            canvas,
        });
        assert_eq!((list.width, list.height), (1600, 1200));
        let first_marker = list
            .layer(Layer::Agents)
            .unwrap()
            .iter()
            .find_map(|c| match c {
                DrawCmd::FillCircle { center, radius, .. } => Some((*center, *radius)),
                _ => None,
            })
            .unwrap();
        assert_eq!(first_marker, ([800.0, 600.0], MARKER_RADIUS * 2.0));
    }
}

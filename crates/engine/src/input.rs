use fleetview_protocol::{Agent, CanvasSize, MapArea, PointerEvent, ScreenPoint};

use crate::config::{MapConfig, ZoomAnchor};
use crate::viewport::Viewport;
use crate::world::WorldModel;

/// Hovered agent and hovered area are independent slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoverState {
    pub agent_id: Option<String>,
    pub area_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputOutcome {
    pub redraw: bool,
    pub hover_changed: bool,
    pub selection_changed: bool,
}

impl InputOutcome {
    fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DragAnchor {
    pointer: ScreenPoint,
    offset: (f64, f64),
    /// Farthest the pointer got from the anchor during this press.
    max_travel: f64,
}

/// Routes pointer and wheel events to the viewport, hover and selection.
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    drag: Option<DragAnchor>,
    hover: HoverState,
    selected: Option<String>,
    suppress_click: bool,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn handle(
        &mut self,
        event: PointerEvent,
        world: &WorldModel,
        viewport: &mut Viewport,
        canvas: CanvasSize,
        config: &MapConfig,
    ) -> InputOutcome {
        match event {
            PointerEvent::Down { x, y } => {
                self.drag = Some(DragAnchor {
                    pointer: ScreenPoint::new(x, y),
                    offset: viewport.offset(),
                    max_travel: 0.0,
                });
                self.suppress_click = false;
                InputOutcome::default()
            }
            PointerEvent::Move { x, y } => match self.drag.as_mut() {
                Some(anchor) => {
                    let dx = x - anchor.pointer.x;
                    let dy = y - anchor.pointer.y;
                    anchor.max_travel = anchor.max_travel.max(dx.hypot(dy));
                    // Always relative to the press position, never accumulated.
                    viewport.set_offset((anchor.offset.0 + dx, anchor.offset.1 + dy));
                    InputOutcome::redraw()
                }
                None => self.update_hover(ScreenPoint::new(x, y), world, viewport, canvas, config),
            },
            PointerEvent::Up { .. } => {
                if let Some(anchor) = self.drag.take() {
                    self.suppress_click = anchor.max_travel >= config.drag_threshold_px;
                }
                InputOutcome::default()
            }
            PointerEvent::Wheel { x, y, delta_y } => {
                let factor = if delta_y < 0.0 {
                    config.wheel_zoom_step
                } else if delta_y > 0.0 {
                    1.0 / config.wheel_zoom_step
                } else {
                    return InputOutcome::default();
                };
                let cursor = ScreenPoint::new(x, y);
                let anchor = match config.zoom_anchor {
                    ZoomAnchor::Center => None,
                    ZoomAnchor::Cursor => Some(cursor),
                };
                if !viewport.zoom_by(factor, anchor, canvas) {
                    return InputOutcome::default();
                }
                // Mid-drag, continue panning from the zoomed offset.
                if let Some(drag) = self.drag.as_mut() {
                    drag.pointer = cursor;
                    drag.offset = viewport.offset();
                }
                let mut outcome = self.update_hover(cursor, world, viewport, canvas, config);
                outcome.redraw = true;
                outcome
            }
            PointerEvent::Click { x, y } => {
                if std::mem::take(&mut self.suppress_click) {
                    return InputOutcome::default();
                }
                let (wx, wy) = viewport.screen_to_world(x, y, canvas);
                let hit = hit_test_agent(world.agents(), wx, wy, viewport, config.hit_radius_px)
                    .map(|a| a.id.clone());
                let next = match hit {
                    Some(id) if self.selected.as_deref() == Some(id.as_str()) => None,
                    other => other,
                };
                if next == self.selected {
                    return InputOutcome::default();
                }
                tracing::debug!(selected = ?next, "selection changed");
                self.selected = next;
                InputOutcome {
                    redraw: true,
                    hover_changed: false,
                    selection_changed: true,
                }
            }
            PointerEvent::Leave => {
                self.drag = None;
                let changed = self.hover != HoverState::default();
                self.hover = HoverState::default();
                InputOutcome {
                    redraw: changed,
                    hover_changed: changed,
                    selection_changed: false,
                }
            }
        }
    }

    pub fn select(&mut self, id: Option<String>) -> bool {
        if self.selected == id {
            return false;
        }
        self.selected = id;
        true
    }

    /// Drops hover/selection ids that no longer exist after a world replacement.
    pub fn retain_known(&mut self, world: &WorldModel) -> bool {
        let mut changed = false;
        if let Some(id) = &self.selected {
            if world.agent(id).is_none() {
                self.selected = None;
                changed = true;
            }
        }
        if let Some(id) = &self.hover.agent_id {
            if world.agent(id).is_none() {
                self.hover.agent_id = None;
                changed = true;
            }
        }
        if let Some(id) = &self.hover.area_id {
            if world.area(id).is_none() {
                self.hover.area_id = None;
                changed = true;
            }
        }
        changed
    }

    fn update_hover(
        &mut self,
        pointer: ScreenPoint,
        world: &WorldModel,
        viewport: &Viewport,
        canvas: CanvasSize,
        config: &MapConfig,
    ) -> InputOutcome {
        let (wx, wy) = viewport.screen_to_world(pointer.x, pointer.y, canvas);
        let next = HoverState {
            agent_id: hit_test_agent(world.agents(), wx, wy, viewport, config.hit_radius_px)
                .map(|a| a.id.clone()),
            area_id: hit_test_area(world.areas(), wx, wy).map(|a| a.id.clone()),
        };
        if next == self.hover {
            return InputOutcome::default();
        }
        self.hover = next;
        InputOutcome {
            redraw: true,
            hover_changed: true,
            selection_changed: false,
        }
    }
}

/// Agent under the world point `(wx, wy)`.
///
/// The radius is given in screen pixels and converted to world units with the
/// current scale, so the clickable disc looks the same size at every zoom.
/// When several agents qualify the smallest id wins.
pub fn hit_test_agent<'a>(
    agents: &'a [Agent],
    wx: f64,
    wy: f64,
    viewport: &Viewport,
    radius_px: f64,
) -> Option<&'a Agent> {
    let radius = viewport.px_to_world(radius_px);
    agents
        .iter()
        .filter(|a| (a.x as f64 - wx).hypot(a.y as f64 - wy) < radius)
        .min_by(|a, b| a.id.cmp(&b.id))
}

/// Area containing `(wx, wy)`; the last one drawn (top-most) wins.
pub fn hit_test_area(areas: &[MapArea], wx: f64, wy: f64) -> Option<&MapArea> {
    areas.iter().rev().find(|a| a.rect.contains(wx, wy))
}

use fleetview_protocol::{
    Agent, CanvasSize, DisplayFlags, MapArea, MovementEvent, PlaybackCommand, PointerEvent,
    ViewState,
};
use std::time::Duration;

use crate::config::MapConfig;
use crate::error::{EngineError, Result};
use crate::input::{InputOutcome, InputRouter};
use crate::playback::PlaybackController;
use crate::render::{self, Background, DisplayList, Frame};
use crate::scheduler::RedrawScheduler;
use crate::viewport::Viewport;
use crate::world::WorldModel;

const DEFAULT_CANVAS: CanvasSize = CanvasSize::new(800.0, 600.0);

/// One map view: world snapshot plus the viewport, playback and pointer state
/// layered on top of it.
///
/// All mutation is synchronous; every change that affects pixels requests a
/// redraw from the [`RedrawScheduler`].
#[derive(Debug)]
pub struct MapSession {
    config: MapConfig,
    world: WorldModel,
    viewport: Viewport,
    playback: PlaybackController,
    input: InputRouter,
    flags: DisplayFlags,
    background: Background,
    canvas: CanvasSize,
    redraw: RedrawScheduler,
}

impl MapSession {
    pub fn new(config: MapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            viewport: Viewport::new(&config),
            playback: PlaybackController::new(config.playback_interval(), config.end_of_playback),
            world: WorldModel::new(),
            input: InputRouter::new(),
            flags: DisplayFlags::default(),
            background: Background::Procedural,
            canvas: DEFAULT_CANVAS,
            redraw: RedrawScheduler::new(),
            config,
        })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn world(&self) -> &WorldModel {
        &self.world
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn playback_controller(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn input(&self) -> &InputRouter {
        &self.input
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn is_dirty(&self) -> bool {
        self.redraw.is_dirty()
    }

    pub fn ingest_agents(&mut self, agents: Vec<Agent>) -> Result<()> {
        self.world.replace_agents(agents)?;
        self.input.retain_known(&self.world);
        self.redraw.request();
        Ok(())
    }

    pub fn ingest_movements(&mut self, movements: Vec<MovementEvent>) {
        self.world.replace_movements(movements);
        self.playback.set_len(self.world.movements().len());
        self.redraw.request();
    }

    pub fn ingest_areas(&mut self, areas: Vec<MapArea>) {
        self.world.replace_areas(areas);
        self.input.retain_known(&self.world);
        self.redraw.request();
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
        self.redraw.request();
    }

    pub fn set_canvas(&mut self, canvas: CanvasSize) -> Result<()> {
        validate_canvas(canvas)?;
        if canvas != self.canvas {
            self.canvas = canvas;
            self.redraw.request();
        }
        Ok(())
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> InputOutcome {
        let outcome = self.input.handle(
            event,
            &self.world,
            &mut self.viewport,
            self.canvas,
            &self.config,
        );
        if outcome.redraw {
            self.redraw.request();
        }
        outcome
    }

    pub fn playback(&mut self, cmd: PlaybackCommand) -> bool {
        let changed = self.playback.apply(cmd);
        if changed {
            tracing::info!(?cmd, index = ?self.playback.index(), "playback command");
            self.redraw.request();
        }
        changed
    }

    /// Drives the playback timer with host time.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let ticks = self.playback.advance(elapsed);
        if ticks > 0 {
            self.redraw.request();
        }
        ticks
    }

    pub fn set_flags(&mut self, flags: DisplayFlags) {
        if flags != self.flags {
            self.flags = flags;
            self.redraw.request();
        }
    }

    /// Zoom buttons: steps around the canvas center.
    pub fn zoom_step(&mut self, zoom_in: bool) -> bool {
        let step = self.config.wheel_zoom_step;
        let factor = if zoom_in { step } else { 1.0 / step };
        let changed = self.viewport.zoom_by(factor, None, self.canvas);
        if changed {
            self.redraw.request();
        }
        changed
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
        self.redraw.request();
    }

    /// Centers the viewport on the selected agent, if there is one.
    pub fn focus_selected(&mut self) -> bool {
        let Some(agent) = self.input.selected().and_then(|id| self.world.agent(id)) else {
            return false;
        };
        self.viewport.center_on(agent.x as f64, agent.y as f64);
        self.redraw.request();
        true
    }

    pub fn select(&mut self, id: Option<String>) -> Result<bool> {
        if let Some(id) = &id {
            if self.world.agent(id).is_none() {
                return Err(EngineError::InvalidAgent {
                    id: id.clone(),
                    reason: "not in current snapshot".to_string(),
                });
            }
        }
        let changed = self.input.select(id);
        if changed {
            self.redraw.request();
        }
        Ok(changed)
    }

    pub fn view_state(&self) -> ViewState {
        let hover = self.input.hover();
        ViewState {
            hovered_agent_id: hover.agent_id.clone(),
            hovered_area_id: hover.area_id.clone(),
            selected_agent_id: self.input.selected().map(str::to_string),
            viewport: self.viewport.state(),
            playback: self.playback.state(),
            flags: self.flags,
            generation: self.redraw.revision(),
        }
    }

    /// Renders a frame for `canvas` and marks pending redraw requests as served.
    pub fn frame(&mut self, canvas: CanvasSize) -> Result<DisplayList> {
        self.set_canvas(canvas)?;
        if self.redraw.take() {
            tracing::trace!(
                frames = self.redraw.frames(),
                coalesced = self.redraw.coalesced(),
                "frame served"
            );
        }
        Ok(render::render(&Frame {
            world: &self.world,
            viewport: &self.viewport,
            playback: &self.playback,
            flags: self.flags,
            hover: self.input.hover(),
            selected: self.input.selected(),
            background: &self.background,
            config: &self.config,
            canvas,
        }))
    }

    /// Like [`Self::frame`] but only when something changed since the last one.
    pub fn frame_if_dirty(&mut self, canvas: CanvasSize) -> Result<Option<DisplayList>> {
        if !self.redraw.is_dirty() && canvas == self.canvas {
            return Ok(None);
        }
        self.frame(canvas).map(Some)
    }
}

fn validate_canvas(canvas: CanvasSize) -> Result<()> {
    let ok = |v: f64| v.is_finite() && v > 0.0;
    if ok(canvas.width) && ok(canvas.height) && ok(canvas.dpr) {
        Ok(())
    } else {
        Err(EngineError::InvalidCanvas {
            width: canvas.width,
            height: canvas.height,
        })
    }
}

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{Html, IntoResponse},
    routing::{get, post, put},
    Json, Router,
};
use fleetview_engine::render::raster;
use fleetview_engine::{Background, DisplayList, EngineError, MapSession};
use fleetview_protocol::{
    targets, Agent, CanvasSize, DisplayFlags, MapArea, MovementEvent, Patch, PlaybackCommand,
    PlaybackPhase, PointerEvent, UiUpdate, ViewState,
};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

pub mod config;
pub mod demo;
mod viewer;


use config::ServerConfig;

pub struct AppState {
    pub session: Mutex<MapSession>,
}

impl AppState {
    pub fn new(session: MapSession) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, MapSession>, ApiError> {
        self.session.lock().map_err(|_| {
            tracing::error!("map session lock poisoned");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "map session unavailable".to_string(),
            )
        })
    }
}

type ApiError = (StatusCode, String);
type Shared = State<Arc<AppState>>;

fn bad_request(e: EngineError) -> ApiError {
    tracing::warn!(error = %e, "request rejected");
    (StatusCode::BAD_REQUEST, e.to_string())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let frames = Router::new()
        .route("/api/frame", get(api_frame))
        .route("/api/frame.png", get(api_frame_png))
        .route("/api/map-image", get(api_map_image))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route("/", get(viewer))
        .route("/health", get(health))
        .route("/api/view", get(api_view))
        .route("/api/view/reset", post(api_view_reset))
        .route("/api/view/focus", post(api_view_focus))
        .route("/api/view/zoom", post(api_view_zoom))
        .route("/api/select", post(api_select))
        .route("/api/feed/agents", post(api_feed_agents))
        .route("/api/feed/movements", post(api_feed_movements))
        .route("/api/feed/areas", post(api_feed_areas))
        .route("/api/input", post(api_input))
        .route("/api/playback", post(api_playback))
        .route("/api/flags", put(api_flags))
        .route("/api/panel", get(api_panel))
        .route("/api/background/fallback", post(api_background_fallback))
        .merge(frames)
        .with_state(state)
        // Local security: allow only loopback + Tailscale by default.
        .layer(middleware::from_fn(ip_allowlist))
        // The feed endpoints replace the whole map; never use
        // `Access-Control-Allow-Origin: *` here.
        .layer(local_only_cors())
}

async fn health() -> &'static str {
    "ok"
}

async fn viewer() -> Html<&'static str> {
    Html(viewer::VIEWER_HTML)
}

async fn api_view(State(state): Shared) -> Result<Json<ViewState>, ApiError> {
    Ok(Json(state.session()?.view_state()))
}

async fn api_feed_agents(
    State(state): Shared,
    Json(agents): Json<Vec<Agent>>,
) -> Result<Json<ViewState>, ApiError> {
    let mut session = state.session()?;
    let count = agents.len();
    session.ingest_agents(agents).map_err(bad_request)?;
    tracing::info!(count, "agent snapshot ingested");
    Ok(Json(session.view_state()))
}

async fn api_feed_movements(
    State(state): Shared,
    Json(movements): Json<Vec<MovementEvent>>,
) -> Result<Json<ViewState>, ApiError> {
    let mut session = state.session()?;
    let count = movements.len();
    session.ingest_movements(movements);
    tracing::info!(count, "movement history ingested");
    Ok(Json(session.view_state()))
}

async fn api_feed_areas(
    State(state): Shared,
    Json(areas): Json<Vec<MapArea>>,
) -> Result<Json<ViewState>, ApiError> {
    let mut session = state.session()?;
    let count = areas.len();
    session.ingest_areas(areas);
    tracing::info!(count, "map areas ingested");
    Ok(Json(session.view_state()))
}

#[derive(Debug, Deserialize)]
struct InputBody {
    event: PointerEvent,
    #[serde(default)]
    canvas: Option<CanvasSize>,
}

#[derive(Debug, Serialize)]
struct InputReply {
    redraw: bool,
    hover_changed: bool,
    selection_changed: bool,
    view: ViewState,
}

async fn api_input(
    State(state): Shared,
    Json(body): Json<InputBody>,
) -> Result<Json<InputReply>, ApiError> {
    let mut session = state.session()?;
    if let Some(canvas) = body.canvas {
        session.set_canvas(canvas).map_err(bad_request)?;
    }
    let outcome = session.handle_pointer(body.event);
    Ok(Json(InputReply {
        redraw: outcome.redraw,
        hover_changed: outcome.hover_changed,
        selection_changed: outcome.selection_changed,
        view: session.view_state(),
    }))
}

#[derive(Debug, Deserialize)]
struct PlaybackInput {
    command: PlaybackCommand,
}

async fn api_playback(
    State(state): Shared,
    Json(input): Json<PlaybackInput>,
) -> Result<Json<ViewState>, ApiError> {
    let mut session = state.session()?;
    session.playback(input.command);
    Ok(Json(session.view_state()))
}

async fn api_flags(
    State(state): Shared,
    Json(flags): Json<DisplayFlags>,
) -> Result<Json<ViewState>, ApiError> {
    let mut session = state.session()?;
    session.set_flags(flags);
    Ok(Json(session.view_state()))
}

async fn api_view_reset(State(state): Shared) -> Result<Json<ViewState>, ApiError> {
    let mut session = state.session()?;
    session.reset_view();
    Ok(Json(session.view_state()))
}

async fn api_view_focus(State(state): Shared) -> Result<Json<ViewState>, ApiError> {
    let mut session = state.session()?;
    if !session.focus_selected() {
        return Err((StatusCode::CONFLICT, "no agent selected".to_string()));
    }
    Ok(Json(session.view_state()))
}

#[derive(Debug, Deserialize)]
struct ZoomInput {
    zoom_in: bool,
}

async fn api_view_zoom(
    State(state): Shared,
    Json(input): Json<ZoomInput>,
) -> Result<Json<ViewState>, ApiError> {
    let mut session = state.session()?;
    session.zoom_step(input.zoom_in);
    Ok(Json(session.view_state()))
}

#[derive(Debug, Deserialize)]
struct SelectInput {
    #[serde(default)]
    agent_id: Option<String>,
}

async fn api_select(
    State(state): Shared,
    Json(input): Json<SelectInput>,
) -> Result<Json<ViewState>, ApiError> {
    let mut session = state.session()?;
    session
        .select(input.agent_id)
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;
    Ok(Json(session.view_state()))
}

#[derive(Debug, Deserialize)]
struct FrameQuery {
    width: f64,
    height: f64,
    #[serde(default)]
    dpr: Option<f64>,
}

impl FrameQuery {
    fn canvas(&self) -> CanvasSize {
        CanvasSize {
            width: self.width,
            height: self.height,
            dpr: self.dpr.unwrap_or(1.0),
        }
    }
}

async fn api_frame(
    State(state): Shared,
    Query(q): Query<FrameQuery>,
) -> Result<Json<DisplayList>, ApiError> {
    let mut session = state.session()?;
    let list = session.frame(q.canvas()).map_err(bad_request)?;
    Ok(Json(list))
}

async fn api_frame_png(
    State(state): Shared,
    Query(q): Query<FrameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // Render under the lock, rasterize outside it.
    let (list, background) = {
        let mut session = state.session()?;
        let list = session.frame(q.canvas()).map_err(bad_request)?;
        (list, session.background().clone())
    };
    let png = tokio::task::spawn_blocking(move || {
        raster::rasterize(&list, &background).and_then(|img| raster::encode_png(&img))
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    .map_err(bad_request)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

async fn api_map_image(State(state): Shared) -> Result<impl IntoResponse, ApiError> {
    let pixels = {
        let session = state.session()?;
        session
            .background()
            .image()
            .and_then(|img| img.pixels.clone())
    };
    let Some(pixels) = pixels else {
        return Err((StatusCode::NOT_FOUND, "no map image".to_string()));
    };
    let png = tokio::task::spawn_blocking(move || raster::encode_png(&pixels))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// The browser could not display the map image; draw the procedural backdrop.
async fn api_background_fallback(State(state): Shared) -> Result<Json<ViewState>, ApiError> {
    let mut session = state.session()?;
    if !session.background().is_procedural() {
        tracing::warn!("viewer failed to load map image, falling back to procedural backdrop");
        session.set_background(Background::Failed("viewer load error".to_string()));
    }
    Ok(Json(session.view_state()))
}

async fn api_panel(State(state): Shared) -> Result<Json<UiUpdate>, ApiError> {
    let session = state.session()?;
    Ok(Json(panel_update(&session)))
}

fn esc(s: &str) -> String {
    html_escape::encode_text(s).into_owned()
}

/// Side panel, status bar and transport readouts for the current view.
pub fn panel_update(session: &MapSession) -> UiUpdate {
    let view = session.view_state();
    let world = session.world();
    let focus = view
        .selected_agent_id
        .as_deref()
        .or(view.hovered_agent_id.as_deref())
        .and_then(|id| world.agent(id));

    let details = match focus {
        Some(a) => {
            let trail = world.movements_for(&a.id);
            let last_activity = trail
                .last()
                .and_then(|&i| world.movements().get(i))
                .map(|m| m.activity.as_str())
                .unwrap_or("-");
            let updated = a
                .last_update
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "-".to_string());
            format!(
                "<div class=\"card\"><strong>{}</strong><div>{:?} lvl {} | {:?}</div>\
                 <div>pos {},{} on {}</div><div>{} moves, last: {}</div><div>updated {}</div></div>",
                esc(&a.display_name),
                a.class,
                a.level,
                a.status,
                a.x,
                a.y,
                esc(&a.server_id),
                trail.len(),
                esc(last_activity),
                esc(&updated),
            )
        }
        None => "<div class=\"card\">No agent selected.</div>".to_string(),
    };
    let area = view
        .hovered_area_id
        .as_deref()
        .and_then(|id| world.area(id))
        .map(|a| {
            format!(
                "<div class=\"card\"><strong>{}</strong><div>{:?} {}</div></div>",
                esc(&a.name),
                a.area_type,
                esc(&a.level_range)
            )
        })
        .unwrap_or_default();

    let pb = view.playback;
    let replay = session.playback_controller().visible_until();
    let transport = match (pb.phase, replay) {
        (PlaybackPhase::Stopped, _) | (_, None) => format!("{} events", pb.len),
        (phase, Some(i)) => format!(
            "{} {}/{}",
            if phase == PlaybackPhase::Playing {
                "playing"
            } else {
                "paused"
            },
            i + 1,
            pb.len
        ),
    };

    let mut update = UiUpdate::new(
        "map.view",
        vec![
            Patch::html(targets::PANEL_DETAILS, details + &area),
            Patch::html(
                targets::PANEL_BOTTOM_BAR,
                format!(
                    "{}% @ {:.0},{:.0}",
                    view.viewport.zoom_percent(),
                    view.viewport.offset_x,
                    view.viewport.offset_y
                ),
            ),
            Patch::html(targets::PANEL_TRANSPORT, transport),
        ],
    );
    update.payload = serde_json::to_value(&view).ok();
    update
}

/// Drives the playback timer from the tokio clock until aborted.
pub fn spawn_playback_clock(
    state: Arc<AppState>,
    tick: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut last = Instant::now();
        loop {
            interval.tick().await;
            let now = Instant::now();
            let elapsed = now - last;
            last = now;
            let advanced = match state.session.lock() {
                Ok(mut session) => {
                    let ticks = session.advance(elapsed);
                    Some((ticks, session.playback_controller().index()))
                }
                Err(_) => None,
            };
            match advanced {
                Some((0, _)) => {}
                Some((ticks, index)) => tracing::trace!(ticks, ?index, "playback advanced"),
                None => {
                    tracing::error!("map session lock poisoned, playback clock stopping");
                    return;
                }
            }
        }
    })
}

pub fn build_session(cfg: &ServerConfig) -> anyhow::Result<MapSession> {
    let mut session = MapSession::new(cfg.map.clone())?;
    if let Some(image) = &cfg.map_image {
        session.set_background(Background::load(&image.path, image.bounds()));
    }
    if cfg.demo {
        let fleet = demo::fleet();
        session.ingest_areas(fleet.areas);
        session.ingest_movements(fleet.movements);
        session.ingest_agents(fleet.agents)?;
        tracing::info!("demo fleet loaded");
    }
    Ok(session)
}

pub async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(cfg.addr).await?;
    serve_listener(listener, cfg, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;
    Ok(())
}

pub async fn serve_listener(
    listener: tokio::net::TcpListener,
    cfg: ServerConfig,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<SocketAddr> {
    let state = Arc::new(AppState::new(build_session(&cfg)?));
    let clock = spawn_playback_clock(state.clone(), cfg.clock_tick());
    let app = build_router(state);
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "fleetview listening");
    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await;
    clock.abort();
    served?;
    tracing::info!("fleetview stopped");
    Ok(addr)
}

async fn ip_allowlist(
    axum::extract::ConnectInfo(peer): axum::extract::ConnectInfo<SocketAddr>,
    req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let ip = peer.ip();
    if is_allowed_peer_ip(ip) {
        return next.run(req).await;
    }
    tracing::warn!(%ip, "peer rejected");
    (StatusCode::FORBIDDEN, "forbidden").into_response()
}

fn is_allowed_peer_ip(ip: IpAddr) -> bool {
    if ip.is_loopback() {
        return true;
    }

    // Tailscale CGNAT range (100.64.0.0/10).
    match ip {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            // 100.64.0.0 - 100.127.255.255
            o[0] == 100 && (64..=127).contains(&o[1])
        }
        IpAddr::V6(_v6) => false,
    }
}

fn local_only_cors() -> CorsLayer {
    use axum::http::Method;

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _req| {
            is_allowed_local_origin(origin)
        }))
}

fn is_allowed_local_origin(origin: &HeaderValue) -> bool {
    let Ok(s) = origin.to_str() else {
        return false;
    };
    is_http_origin_for_host(s, "localhost") || is_http_origin_for_host(s, "127.0.0.1")
}

fn is_http_origin_for_host(origin: &str, host: &str) -> bool {
    for scheme in ["http://", "https://"] {
        if let Some(rest) = origin.strip_prefix(scheme) {
            if let Some(after) = rest.strip_prefix(host) {
                // Origin is just scheme://host[:port]
                return after.is_empty() || after.starts_with(':');
            }
        }
    }
    false
}

use super::*;
use crate::testutil::{agent, area, movement};
use fleetview_protocol::{AgentStatus, CanvasSize, PlaybackCommand, PlaybackPhase, PointerEvent};
use std::time::Duration;

fn session() -> MapSession {
    MapSession::new(MapConfig::default()).unwrap()
}

#[test]
fn world_origin_is_canvas_center_at_default_view() {
    let s = session();
    let p = s
        .viewport()
        .world_to_screen(0.0, 0.0, CanvasSize::new(800.0, 600.0));
    assert_eq!((p.x, p.y), (400.0, 300.0));
}

#[test]
fn cursor_on_agent_hovers_it_and_far_away_does_not() {
    let mut s = session();
    assert_eq!(s.config().cell_size, 20.0);
    s.ingest_agents(vec![agent("bot-1", 3, -12, AgentStatus::Farming)])
        .unwrap();
    let canvas = s.canvas();
    let p = s.viewport().world_to_screen(3.0, -12.0, canvas);
    assert_eq!((p.x, p.y), (460.0, 60.0));

    s.handle_pointer(PointerEvent::Move { x: p.x, y: p.y });
    assert_eq!(s.view_state().hovered_agent_id.as_deref(), Some("bot-1"));

    s.handle_pointer(PointerEvent::Move {
        x: p.x + 1000.0,
        y: p.y,
    });
    assert_eq!(s.view_state().hovered_agent_id, None);
}

#[test]
fn five_big_zoom_steps_clamp_at_max() {
    let mut s = session();
    let canvas = s.canvas();
    let mut vp = s.viewport().clone();
    for _ in 0..5 {
        vp.zoom_by(1.5, None, canvas);
    }
    assert_eq!(vp.zoom(), 3.0);

    for _ in 0..40 {
        s.zoom_step(true);
    }
    assert_eq!(s.view_state().viewport.zoom, 3.0);
    assert_eq!(s.view_state().viewport.zoom_percent(), 300);
}

#[test]
fn playback_walks_full_timeline_then_parks() {
    let mut s = MapSession::new(MapConfig {
        playback_interval_ms: 100,
        ..MapConfig::default()
    })
    .unwrap();
    assert_eq!(s.view_state().playback.phase, PlaybackPhase::Stopped);
    s.ingest_movements((0..5).map(|i| movement("a", (i, 0), (i + 1, 0), i)).collect());
    let pb = s.view_state().playback;
    assert_eq!((pb.index, pb.phase), (Some(0), PlaybackPhase::Paused));

    assert!(s.playback(PlaybackCommand::Play));
    let mut seen = vec![s.view_state().playback.index];
    for _ in 0..4 {
        assert_eq!(s.advance(Duration::from_millis(100)), 1);
        seen.push(s.view_state().playback.index);
    }
    assert_eq!(seen, (0..5usize).map(Some).collect::<Vec<_>>());
    s.advance(Duration::from_millis(100));
    let pb = s.view_state().playback;
    assert_eq!(pb.index, Some(0));
    assert!(!pb.playing);
    assert_eq!(s.advance(Duration::from_secs(60)), 0);
}

#[test]
fn loop_mode_keeps_playing() {
    let mut s = MapSession::new(MapConfig {
        end_of_playback: EndOfPlayback::Loop,
        playback_interval_ms: 10,
        ..MapConfig::default()
    })
    .unwrap();
    s.ingest_movements(vec![
        movement("a", (0, 0), (1, 0), 0),
        movement("a", (1, 0), (2, 0), 1),
    ]);
    s.playback(PlaybackCommand::Play);
    s.advance(Duration::from_millis(20));
    let pb = s.view_state().playback;
    assert_eq!(pb.index, Some(0));
    assert!(pb.playing);
}

#[test]
fn replacing_agents_clears_stale_selection() {
    let mut s = session();
    s.ingest_agents(vec![agent("a", 0, 0, AgentStatus::Idle)]).unwrap();
    s.handle_pointer(PointerEvent::Click { x: 400.0, y: 300.0 });
    assert_eq!(s.view_state().selected_agent_id.as_deref(), Some("a"));
    s.ingest_agents(vec![agent("b", 0, 0, AgentStatus::Idle)])
        .unwrap();
    assert_eq!(s.view_state().selected_agent_id, None);
}

#[test]
fn focus_selected_centers_agent() {
    let mut s = session();
    s.ingest_agents(vec![agent("a", 10, 5, AgentStatus::Moving)])
        .unwrap();
    assert!(!s.focus_selected());
    s.select(Some("a".to_string())).unwrap();
    assert!(s.focus_selected());
    let p = s.viewport().world_to_screen(10.0, 5.0, s.canvas());
    assert!((p.x - 400.0).abs() < 1e-9 && (p.y - 300.0).abs() < 1e-9);
    assert!(s.select(Some("nobody".to_string())).is_err());
}

#[test]
fn frames_are_coalesced_until_something_changes() {
    let mut s = session();
    let canvas = CanvasSize::new(640.0, 480.0);
    assert!(s.frame_if_dirty(canvas).unwrap().is_some());
    assert!(s.frame_if_dirty(canvas).unwrap().is_none());
    for x in 0..20 {
        s.handle_pointer(PointerEvent::Down { x: 0.0, y: 0.0 });
        s.handle_pointer(PointerEvent::Move {
            x: x as f64,
            y: 0.0,
        });
    }
    assert!(s.frame_if_dirty(canvas).unwrap().is_some());
    assert!(s.frame_if_dirty(canvas).unwrap().is_none());
}

#[test]
fn frame_rejects_degenerate_canvas() {
    let mut s = session();
    assert!(matches!(
        s.frame(CanvasSize::new(0.0, 100.0)),
        Err(EngineError::InvalidCanvas { .. })
    ));
}

#[test]
fn hovered_area_and_agent_render_together() {
    let mut s = session();
    s.ingest_agents(vec![agent("a", 1, 1, AgentStatus::Banking)])
        .unwrap();
    s.ingest_areas(vec![area("vault", 0, 0, 4, 4)]);
    let canvas = s.canvas();
    let p = s.viewport().world_to_screen(1.0, 1.0, canvas);
    s.handle_pointer(PointerEvent::Move { x: p.x, y: p.y });
    let view = s.view_state();
    assert_eq!(view.hovered_agent_id.as_deref(), Some("a"));
    assert_eq!(view.hovered_area_id.as_deref(), Some("vault"));
    let list = s.frame(canvas).unwrap();
    assert!(list.layer(Layer::Areas).is_some_and(|c| !c.is_empty()));
}

#[test]
fn extreme_drag_still_renders() {
    let mut s = session();
    s.ingest_agents(vec![agent("a", 0, 0, AgentStatus::Idle)]).unwrap();
    s.ingest_movements(vec![movement("a", (-5, 0), (0, 0), 0)]);
    let canvas = CanvasSize::new(800.0, 600.0);
    for dx in [-1e21, 1e21] {
        s.handle_pointer(PointerEvent::Down { x: 0.0, y: 0.0 });
        s.handle_pointer(PointerEvent::Move { x: dx, y: -dx });
        s.handle_pointer(PointerEvent::Up { x: dx, y: -dx });
        let list = s.frame(canvas).unwrap();
        assert!(list.layer(Layer::Grid).is_some_and(|c| c.is_empty()));
        s.reset_view();
    }
}

#[test]
fn areas_at_the_edge_of_the_grid_render() {
    let mut s = session();
    s.ingest_areas(vec![
        area("far", i64::MAX - 1, 0, 10, 10),
        area("low", i64::MIN, i64::MIN, i64::MAX, i64::MAX),
    ]);
    let list = s.frame(CanvasSize::new(800.0, 600.0)).unwrap();
    assert!(list.layer(Layer::Areas).is_some_and(|c| !c.is_empty()));
}

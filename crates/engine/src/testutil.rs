use fleetview_protocol::{
    Agent, AgentClass, AgentStatus, AreaRect, AreaType, MapArea, MovementEvent, WorldPoint,
};
use time::OffsetDateTime;

pub(crate) fn at(secs: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_700_000_000 + secs).unwrap()
}

pub(crate) fn agent(id: &str, x: i64, y: i64, status: AgentStatus) -> Agent {
    Agent {
        id: id.to_string(),
        display_name: format!("Bot {id}"),
        class: AgentClass::Warrior,
        level: 10,
        x,
        y,
        server_id: "eu-1".to_string(),
        status,
        last_update: at(0),
    }
}

pub(crate) fn movement(agent_id: &str, from: (i64, i64), to: (i64, i64), secs: i64) -> MovementEvent {
    MovementEvent {
        agent_id: agent_id.to_string(),
        from: WorldPoint::new(from.0, from.1),
        to: WorldPoint::new(to.0, to.1),
        timestamp: at(secs),
        activity: "walking".to_string(),
    }
}

pub(crate) fn area(id: &str, x: i64, y: i64, width: i64, height: i64) -> MapArea {
    MapArea {
        id: id.to_string(),
        name: format!("Area {id}"),
        rect: AreaRect {
            x,
            y,
            width,
            height,
        },
        area_type: AreaType::Zone,
        level_range: "1-10".to_string(),
    }
}

pub(crate) fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

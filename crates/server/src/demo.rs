//! Deterministic demo fleet so the viewer has something to show without a feed.

use fleetview_protocol::{
    Agent, AgentClass, AgentStatus, AreaRect, AreaType, MapArea, MovementEvent, WorldPoint,
};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

const BASE: OffsetDateTime = datetime!(2024-05-01 12:00 UTC);

const CLASSES: [AgentClass; 6] = [
    AgentClass::Warrior,
    AgentClass::Mage,
    AgentClass::Ranger,
    AgentClass::Rogue,
    AgentClass::Cleric,
    AgentClass::Gatherer,
];

const STATUSES: [AgentStatus; 6] = [
    AgentStatus::Fighting,
    AgentStatus::Farming,
    AgentStatus::Banking,
    AgentStatus::Idle,
    AgentStatus::Moving,
    AgentStatus::Offline,
];

const NAMES: [&str; 10] = [
    "Ironhide", "Vexa", "Thornwick", "Mossfang", "Quillby", "Brasshand", "Nyx", "Oakvale",
    "Pyrelight", "Saltmarsh",
];

pub struct DemoFleet {
    pub agents: Vec<Agent>,
    pub movements: Vec<MovementEvent>,
    pub areas: Vec<MapArea>,
}

pub fn fleet() -> DemoFleet {
    DemoFleet {
        areas: areas(),
        movements: movements(),
        agents: agents(),
    }
}

fn area(id: &str, name: &str, rect: (i64, i64, i64, i64), kind: AreaType, levels: &str) -> MapArea {
    MapArea {
        id: id.to_string(),
        name: name.to_string(),
        rect: AreaRect {
            x: rect.0,
            y: rect.1,
            width: rect.2,
            height: rect.3,
        },
        area_type: kind,
        level_range: levels.to_string(),
    }
}

fn areas() -> Vec<MapArea> {
    vec![
        area("lumbridge", "Lumbridge", (-8, -6, 14, 10), AreaType::City, "1-15"),
        area("vault", "Old Vault", (-4, -3, 4, 3), AreaType::Bank, ""),
        area("marsh", "Saltmarsh Flats", (10, -14, 18, 12), AreaType::Zone, "15-30"),
        area("crypt", "Sunken Crypt", (-26, 8, 12, 10), AreaType::Dungeon, "30-45"),
    ]
}

/// Integer waypoints along a closed loop, one per agent phase.
fn waypoint(agent: usize, step: usize) -> WorldPoint {
    let cx = (agent as i64 % 4) * 9 - 14;
    let cy = (agent as i64 / 4) * 8 - 8;
    let ring = [(0, 0), (3, 0), (3, 2), (1, 4), (-2, 3), (-2, 1)];
    let (dx, dy) = ring[(step + agent) % ring.len()];
    WorldPoint::new(cx + dx, cy + dy)
}

fn agents() -> Vec<Agent> {
    (0..NAMES.len())
        .map(|i| {
            let pos = waypoint(i, 6);
            Agent {
                id: format!("bot-{:02}", i + 1),
                display_name: NAMES[i].to_string(),
                class: CLASSES[i % CLASSES.len()],
                level: 5 + (i as u32 * 7) % 60,
                x: pos.x,
                y: pos.y,
                server_id: format!("eu-{}", 1 + i % 3),
                status: STATUSES[i % STATUSES.len()],
                last_update: BASE + Duration::minutes(30),
            }
        })
        .collect()
}

fn movements() -> Vec<MovementEvent> {
    let activities = ["walking", "gathering", "hunting", "returning"];
    let mut out = Vec::new();
    for i in 0..NAMES.len() {
        for step in 0..6 {
            out.push(MovementEvent {
                agent_id: format!("bot-{:02}", i + 1),
                from: waypoint(i, step),
                to: waypoint(i, step + 1),
                timestamp: BASE + Duration::seconds((step * 60 + i * 7) as i64),
                activity: activities[(i + step) % activities.len()].to_string(),
            });
        }
    }
    // A bot that has since left the fleet; its trail still draws.
    out.push(MovementEvent {
        agent_id: "bot-retired".to_string(),
        from: WorldPoint::new(20, 12),
        to: WorldPoint::new(24, 14),
        timestamp: BASE + Duration::seconds(15),
        activity: "walking".to_string(),
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_agents_stand_at_end_of_their_trail() {
        let f = fleet();
        for a in &f.agents {
            let last = f
                .movements
                .iter()
                .filter(|m| m.agent_id == a.id)
                .max_by_key(|m| m.timestamp)
                .unwrap();
            assert_eq!(last.to, a.position());
        }
    }
}

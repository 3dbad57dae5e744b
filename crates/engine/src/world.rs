use fleetview_protocol::{Agent, MapArea, MovementEvent};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::error::{EngineError, Result};

/// Snapshot of everything the feed has told us about the world.
///
/// Each collection is replaced wholesale; cloning the model is cheap and a clone
/// never observes a later replacement.
#[derive(Debug, Clone, Default)]
pub struct WorldModel {
    agents: Arc<[Agent]>,
    movements: Arc<[MovementEvent]>,
    areas: Arc<[MapArea]>,
    tracks: Arc<BTreeMap<String, Vec<usize>>>,
}

impl WorldModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the agent list. Agents are kept sorted by id.
    pub fn replace_agents(&mut self, mut agents: Vec<Agent>) -> Result<()> {
        let mut seen = HashSet::with_capacity(agents.len());
        for a in &agents {
            if a.level < 1 {
                return Err(EngineError::InvalidAgent {
                    id: a.id.clone(),
                    reason: "level must be at least 1".to_string(),
                });
            }
            if !seen.insert(a.id.as_str()) {
                return Err(EngineError::DuplicateAgent(a.id.clone()));
            }
        }
        agents.sort_by(|a, b| a.id.cmp(&b.id));
        tracing::debug!(count = agents.len(), "agents replaced");
        self.agents = agents.into();
        Ok(())
    }

    /// Replaces the movement history, stable-sorted by timestamp.
    pub fn replace_movements(&mut self, mut movements: Vec<MovementEvent>) {
        movements.sort_by_key(|m| m.timestamp);
        let mut tracks: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, m) in movements.iter().enumerate() {
            tracks.entry(m.agent_id.clone()).or_default().push(i);
        }
        tracing::debug!(
            count = movements.len(),
            agents = tracks.len(),
            "movement history replaced"
        );
        self.movements = movements.into();
        self.tracks = Arc::new(tracks);
    }

    pub fn replace_areas(&mut self, areas: Vec<MapArea>) {
        tracing::debug!(count = areas.len(), "areas replaced");
        self.areas = areas.into();
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn movements(&self) -> &[MovementEvent] {
        &self.movements
    }

    pub fn areas(&self) -> &[MapArea] {
        &self.areas
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents
            .binary_search_by(|a| a.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.agents[i])
    }

    pub fn area(&self, id: &str) -> Option<&MapArea> {
        self.areas.iter().find(|a| a.id == id)
    }

    /// Indices into [`Self::movements`] for one agent, in timeline order.
    pub fn movements_for(&self, agent_id: &str) -> &[usize] {
        self.tracks.get(agent_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Agent ids that appear in the movement history, whether or not they are
    /// still present in the current agent snapshot.
    pub fn agent_ids_with_history(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{agent, area, movement};
    use fleetview_protocol::AgentStatus;

    #[test]
    fn agents_sorted_and_looked_up_by_id() {
        let mut world = WorldModel::new();
        world
            .replace_agents(vec![
                agent("b", 1, 1, AgentStatus::Idle),
                agent("a", 0, 0, AgentStatus::Fighting),
            ])
            .unwrap();
        assert_eq!(world.agents()[0].id, "a");
        assert_eq!(world.agent("b").map(|a| a.x), Some(1));
        assert!(world.agent("zzz").is_none());
    }

    #[test]
    fn duplicate_ids_rejected_and_previous_snapshot_kept() {
        let mut world = WorldModel::new();
        world
            .replace_agents(vec![agent("a", 0, 0, AgentStatus::Idle)])
            .unwrap();
        let err = world
            .replace_agents(vec![
                agent("x", 0, 0, AgentStatus::Idle),
                agent("x", 1, 1, AgentStatus::Idle),
            ])
            .unwrap_err();
        assert_eq!(err, EngineError::DuplicateAgent("x".to_string()));
        assert_eq!(world.agents().len(), 1);
        assert_eq!(world.agents()[0].id, "a");
    }

    #[test]
    fn zero_level_rejected() {
        let mut world = WorldModel::new();
        let mut a = agent("a", 0, 0, AgentStatus::Idle);
        a.level = 0;
        assert!(matches!(
            world.replace_agents(vec![a]),
            Err(EngineError::InvalidAgent { .. })
        ));
    }

    #[test]
    fn movements_sorted_stably_and_grouped_per_agent() {
        let mut world = WorldModel::new();
        world.replace_movements(vec![
            movement("b", (0, 0), (1, 1), 30),
            movement("a", (0, 0), (1, 0), 10),
            movement("b", (1, 1), (2, 2), 10),
            movement("a", (1, 0), (2, 0), 20),
        ]);
        let ts: Vec<i64> = world
            .movements()
            .iter()
            .map(|m| m.timestamp.unix_timestamp())
            .collect();
        assert_eq!(ts, vec![10, 10, 20, 30]);
        // equal timestamps keep feed order
        assert_eq!(world.movements()[0].agent_id, "a");
        assert_eq!(world.movements_for("a"), &[0, 2]);
        assert_eq!(world.movements_for("b"), &[1, 3]);
        assert!(world.movements_for("ghost").is_empty());
    }

    #[test]
    fn clones_do_not_observe_replacement() {
        let mut world = WorldModel::new();
        world.replace_areas(vec![area("town", 0, 0, 5, 5)]);
        let snapshot = world.clone();
        world.replace_areas(Vec::new());
        assert_eq!(snapshot.areas().len(), 1);
        assert!(world.areas().is_empty());
    }
}

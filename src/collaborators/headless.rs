//! # Headless Collaborators
//!
//! In-memory implementations of the collaborator traits. They back the command line
//! simulator and the test suite, and double as reference implementations for games
//! wiring in their own systems.

use super::{FactionState, FactionTag, GamePhase, GlobalGameState, RosterProvider, ShipId, SpawnPoint};
use serde::{Deserialize, Serialize};

/// Game phase held in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryGameState {
    phase: GamePhase,
    transitions: u32,
}

impl InMemoryGameState {
    /// Creates a game state sitting in the menu.
    pub fn new() -> Self {
        Self::with_phase(GamePhase::Menu)
    }

    /// Creates a game state already in `phase`.
    pub fn with_phase(phase: GamePhase) -> Self {
        Self {
            phase,
            transitions: 0,
        }
    }

    /// Number of phase changes requested so far.
    pub fn transitions(&self) -> u32 {
        self.transitions
    }
}

impl Default for InMemoryGameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalGameState for InMemoryGameState {
    fn current_state(&self) -> GamePhase {
        self.phase
    }

    fn change_state(&mut self, new_state: GamePhase) {
        log::debug!("Game phase {:?} -> {:?}", self.phase, new_state);
        self.phase = new_state;
        self.transitions += 1;
    }
}

/// Faction state that never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticFactionState {
    pub defending: Option<FactionTag>,
    pub invading: Vec<FactionTag>,
}

impl StaticFactionState {
    /// Creates a fixed faction state.
    pub fn new(defending: Option<FactionTag>, invading: Vec<FactionTag>) -> Self {
        Self {
            defending,
            invading,
        }
    }

    /// Faction state with nothing configured, exercising the fallback paths.
    pub fn unset() -> Self {
        Self::new(None, Vec::new())
    }
}

impl Default for StaticFactionState {
    fn default() -> Self {
        Self::new(Some(FactionTag::Syndicates), vec![FactionTag::ThraxArmada])
    }
}

impl FactionState for StaticFactionState {
    fn defending_faction(&self) -> Option<FactionTag> {
        self.defending
    }

    fn invading_factions(&self) -> Vec<FactionTag> {
        self.invading.clone()
    }
}

/// Roster with fixed ship and boss names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticRoster {
    pub defending_ships: Vec<ShipId>,
    pub invading_ships: Vec<ShipId>,
    pub formation_ship_names: Vec<String>,
    pub spawner_boss_name: String,
    pub shooter_boss_name: String,
    pub boss_spawn_points: Vec<SpawnPoint>,
}

impl StaticRoster {
    /// Roster with no ships at all, used to exercise degraded levels.
    pub fn empty() -> Self {
        Self {
            defending_ships: Vec::new(),
            invading_ships: Vec::new(),
            formation_ship_names: Vec::new(),
            spawner_boss_name: String::new(),
            shooter_boss_name: String::new(),
            boss_spawn_points: Vec::new(),
        }
    }
}

impl Default for StaticRoster {
    fn default() -> Self {
        Self {
            defending_ships: vec![
                ShipId::new("SmallShip"),
                ShipId::new("MediumShip"),
                ShipId::new("MeleeShip"),
            ],
            invading_ships: vec![ShipId::new("ThraxRaider"), ShipId::new("ThraxLancer")],
            formation_ship_names: vec!["SmallShip".to_string(), "MediumShip2".to_string()],
            spawner_boss_name: "Broodmother".to_string(),
            shooter_boss_name: "Gunship".to_string(),
            boss_spawn_points: vec![
                SpawnPoint::new(0.0, 120.0),
                SpawnPoint::new(-120.0, 0.0),
                SpawnPoint::new(120.0, 0.0),
            ],
        }
    }
}

impl RosterProvider for StaticRoster {
    fn determine_defending_ships(&self) -> Vec<ShipId> {
        self.defending_ships.clone()
    }

    fn determine_invading_ships(&self) -> Vec<ShipId> {
        self.invading_ships.clone()
    }

    fn formation_ship_names(&self) -> Vec<String> {
        self.formation_ship_names.clone()
    }

    fn spawner_boss_name(&self) -> String {
        self.spawner_boss_name.clone()
    }

    fn shooter_boss_name(&self) -> String {
        self.shooter_boss_name.clone()
    }

    fn boss_spawn_points(&self) -> Vec<SpawnPoint> {
        self.boss_spawn_points.clone()
    }
}

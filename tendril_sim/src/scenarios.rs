//! Scripted scenarios for the frame-stepping harness.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    /// SIM-001: anchor jumps across the scene, trailing segments must not
    Teleport,

    /// SIM-002: anchor holds still, chain must settle into its rest layout
    Stationary,

    /// SIM-003: anchor circles with the wiggle on, tail must follow it around
    Orbit,

    /// SIM-004: seeded random walk, replay must be bit-identical
    RandomWalk,

    /// SIM-005: facing rotator converges on a fixed target
    Facing,

    /// SIM-006: saturated turn speed tracks a moving target exactly
    FastTurn,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Teleport,
            ScenarioId::Stationary,
            ScenarioId::Orbit,
            ScenarioId::RandomWalk,
            ScenarioId::Facing,
            ScenarioId::FastTurn,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Teleport => "teleport",
            ScenarioId::Stationary => "stationary",
            ScenarioId::Orbit => "orbit",
            ScenarioId::RandomWalk => "random_walk",
            ScenarioId::Facing => "facing",
            ScenarioId::FastTurn => "fast_turn",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Teleport => "Anchor teleports 10 units; head follows instantly, tail eases in",
            ScenarioId::Stationary => "Anchor at rest, wiggle off; chain settles to its rest layout",
            ScenarioId::Orbit => "Anchor orbits with wiggle on; residual stays bounded and the tail keeps orbiting",
            ScenarioId::RandomWalk => "Seeded random walk for anchor and target; replay is identical",
            ScenarioId::Facing => "Fixed target at (-3, 4); facing error below half a degree",
            ScenarioId::FastTurn => "Turn speed saturates every frame; facing is exact while the target wanders",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "teleport" | "sim-001" => Ok(ScenarioId::Teleport),
            "stationary" | "sim-002" => Ok(ScenarioId::Stationary),
            "orbit" | "sim-003" => Ok(ScenarioId::Orbit),
            "random_walk" | "randomwalk" | "sim-004" => Ok(ScenarioId::RandomWalk),
            "facing" | "sim-005" => Ok(ScenarioId::Facing),
            "fast_turn" | "fastturn" | "sim-006" => Ok(ScenarioId::FastTurn),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

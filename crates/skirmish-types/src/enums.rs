//! Enumeration types shared across the Skirmish workspace.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Encounter state
// ---------------------------------------------------------------------------

/// The encounter-wide state of the combat state machine.
///
/// Transitions are broadcast on the event bus; external layers never poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatState {
    /// Nothing has been set up yet.
    Uninitialised,
    /// Timed intro before the first accrual tick.
    FadingIn,
    /// Preparation accrues until some actor is ready.
    Preparing,
    /// A human-controlled actor holds the turn token.
    AwaitingInput,
    /// An AI-controlled actor holds the turn token.
    Thinking,
    /// A skill has been chosen; waiting for a target.
    SelectingTarget,
    /// A target has been chosen; waiting for confirmation.
    ConfirmingSelectedTarget,
    /// A confirmed skill or move is resolving.
    Executing,
    /// One side has been eliminated.
    Celebration,
    /// Timed outro; terminal.
    FadingOut,
}

impl CombatState {
    /// States in which the token holder may choose what to do next.
    pub const fn is_decision_point(self) -> bool {
        matches!(self, Self::AwaitingInput | Self::Thinking)
    }

    /// States belonging to a turn in progress.
    pub const fn is_turn_phase(self) -> bool {
        matches!(
            self,
            Self::AwaitingInput
                | Self::Thinking
                | Self::SelectingTarget
                | Self::ConfirmingSelectedTarget
                | Self::Executing
        )
    }

    /// Whether the encounter has been decided.
    pub const fn is_concluding(self) -> bool {
        matches!(self, Self::Celebration | Self::FadingOut)
    }
}

impl core::fmt::Display for CombatState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Uninitialised => "uninitialised",
            Self::FadingIn => "fading_in",
            Self::Preparing => "preparing",
            Self::AwaitingInput => "awaiting_input",
            Self::Thinking => "thinking",
            Self::SelectingTarget => "selecting_target",
            Self::ConfirmingSelectedTarget => "confirming_selected_target",
            Self::Executing => "executing",
            Self::Celebration => "celebration",
            Self::FadingOut => "fading_out",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Occupants
// ---------------------------------------------------------------------------

/// Footprint size class of an occupant.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    /// One hex.
    #[default]
    Small,
    /// Four hexes.
    Medium,
    /// Seven hexes.
    Large,
}

impl SizeClass {
    /// All size classes, smallest first.
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Number of base hexes covered by this class.
    pub const fn hex_count(self) -> usize {
        match self {
            Self::Small => 1,
            Self::Medium => 4,
            Self::Large => 7,
        }
    }
}

/// Which side of the encounter an actor fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    /// The player's party.
    Party,
    /// Everything opposing the party.
    Hostile,
}

impl Faction {
    /// The other side.
    pub const fn opposing(self) -> Self {
        match self {
            Self::Party => Self::Hostile,
            Self::Hostile => Self::Party,
        }
    }
}

/// Who supplies decisions for an actor.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    /// Decisions arrive through interactions from the host.
    #[default]
    Human,
    /// Decisions come from a `Brain`.
    Ai,
}

/// A numeric actor statistic that publishes change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    /// Hit points.
    Health,
    /// Points spent by skills and movement during a turn.
    ActionPoints,
    /// Accrued readiness towards the next turn.
    Preparation,
}

/// Why a requested skill, target or turn action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// The request arrived in a state that does not accept it.
    InvalidState,
    /// Nobody holds the turn token.
    NoActiveActor,
    /// The skill is unknown or not known by the actor.
    UnknownSkill,
    /// The actor cannot afford the skill or the whole move.
    InsufficientActionPoints,
    /// The coordinates name no hex on the field.
    NoSuchHex,
    /// The hex holds no acceptable target for the skill.
    NoValidTarget,
    /// The target lies beyond the skill's range.
    OutOfRange,
    /// No route leads to the destination.
    Unreachable,
}

impl core::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Self::InvalidState => "not accepted in the current state",
            Self::NoActiveActor => "no actor holds the turn",
            Self::UnknownSkill => "unknown skill",
            Self::InsufficientActionPoints => "insufficient action points",
            Self::NoSuchHex => "no such hex",
            Self::NoValidTarget => "no valid target",
            Self::OutOfRange => "target out of range",
            Self::Unreachable => "destination unreachable",
        };
        f.write_str(text)
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish tactics engine.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative battle world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! so presentation code can log or animate what happened. Systems read
//! immutable unit snapshots and respond exclusively with new command batches.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of rows on the fixed battle board.
pub const BOARD_ROWS: i32 = 6;

/// Number of columns on the fixed battle board.
pub const BOARD_COLUMNS: i32 = 8;

/// Failures surfaced by query operations and construction helpers.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The addressed cell lies outside the fixed battle board.
    #[error("cell ({row}, {column}) lies outside the 6x8 board")]
    OutOfBounds {
        /// Row of the rejected cell.
        row: i32,
        /// Column of the rejected cell.
        column: i32,
    },
    /// An argument carried a value outside its accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// No unit with the provided name exists in the addressed roster.
    #[error("unit '{0}' not found")]
    NotFound(String),
    /// A terrain rectangle could not be applied to the grid.
    #[error("invalid terrain specification: {0}")]
    InvalidTerrainSpec(String),
}

impl CoreError {
    /// Builds an out-of-bounds error for the provided cell.
    #[must_use]
    pub fn out_of_bounds(cell: Cell) -> Self {
        Self::OutOfBounds {
            row: cell.row,
            column: cell.column,
        }
    }
}

/// Commands that express all permissible battle mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Flags the named unit as having moved this turn.
    MarkMoved {
        /// Name of the unit that finished moving.
        unit: String,
    },
    /// Flags the named unit as having acted this turn.
    MarkActed {
        /// Name of the unit that finished acting.
        unit: String,
    },
    /// Relocates a unit to a destination chosen by the movement planner.
    MoveUnit {
        /// Name of the unit being moved.
        unit: String,
        /// Destination cell.
        to: Cell,
    },
    /// Writes the outcome of a resolved attack or heal back into the rosters.
    ApplyInteraction {
        /// Outcome produced by the combat resolver.
        outcome: InteractionOutcome,
    },
    /// Forces the battle to hand control to the other group.
    AdvanceTurn,
    /// Re-asserts the liveness invariant for a single unit.
    ApplyAliveState {
        /// Name of the unit to inspect.
        unit: String,
    },
    /// Re-asserts the liveness invariant for every unit in both rosters.
    ApplyAliveStates,
    /// Pushes a snapshot of the current rosters onto the turn history.
    RecordTurn,
    /// Restores the snapshot preceding the most recent one.
    Undo,
    /// Re-applies the most recently undone snapshot.
    Redo,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a unit changed cells.
    UnitMoved {
        /// Name of the unit that moved.
        unit: String,
        /// Cell the unit occupied before the move.
        from: Cell,
        /// Cell the unit occupies after the move.
        to: Cell,
    },
    /// Confirms that a unit's moved flag was raised.
    UnitMarkedMoved {
        /// Name of the affected unit.
        unit: String,
    },
    /// Confirms that a unit's acted flag was raised.
    UnitMarkedActed {
        /// Name of the affected unit.
        unit: String,
    },
    /// Announces that a unit has nothing left to do this turn.
    UnitEndedTurn {
        /// Name of the unit whose turn completed.
        unit: String,
    },
    /// Reports an applied attack or heal.
    InteractionApplied {
        /// Kind of interaction that took place.
        kind: InteractionKind,
        /// Unit that initiated the interaction.
        actor: String,
        /// Unit that received the interaction.
        target: String,
        /// Damage dealt or healing done.
        amount: u32,
        /// Target hit points after the interaction.
        target_hp: u32,
    },
    /// Announces that a unit's hit points reached zero.
    UnitDefeated {
        /// Name of the defeated unit.
        unit: String,
    },
    /// Fired before the turn counter increments.
    TurnEnded {
        /// Turn number that just finished.
        turn: u32,
        /// Group that was active during the finished turn.
        group: Group,
    },
    /// Fired once the active group changed hands.
    ActiveGroupChanged {
        /// Group that gained control.
        group: Group,
    },
    /// Fired after the flags of both rosters were reset for the new turn.
    TurnStarted {
        /// Turn number that just began.
        turn: u32,
        /// Group that is now active.
        group: Group,
    },
    /// Confirms that a snapshot was appended to the history.
    TurnRecorded {
        /// Turn number captured by the snapshot.
        turn: u32,
        /// Number of snapshots held after recording.
        depth: usize,
    },
    /// Confirms that an earlier snapshot was restored.
    HistoryRewound {
        /// Turn number restored from history.
        turn: u32,
    },
    /// Confirms that an undone snapshot was re-applied.
    HistoryReplayed {
        /// Turn number restored from the redo stack.
        turn: u32,
    },
    /// Reports that a command was ignored.
    CommandRejected {
        /// Specific reason the command failed.
        reason: RejectionReason,
    },
}

/// Reasons a command may be rejected by the world.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// No unit with the provided name exists in either roster.
    UnknownUnit(String),
    /// The unit belongs to the group that is not currently active.
    InactiveGroup(String),
    /// The unit already moved during this turn.
    AlreadyMoved(String),
    /// The unit already acted during this turn.
    AlreadyActed(String),
    /// The unit tried to attack itself.
    SelfTarget(String),
    /// The unit is no longer alive.
    Defeated(String),
    /// The destination cell lies outside the board.
    OutOfBounds(Cell),
    /// The destination cell is held by another living unit.
    Occupied(Cell),
    /// The history holds only its earliest snapshot.
    NothingToUndo,
    /// No snapshot has been undone since the last redo.
    NothingToRedo,
}

/// Location of a single board cell expressed as row and column indices.
///
/// Coordinates are signed so that neighbours of edge cells can be described
/// and rejected with [`CoreError::OutOfBounds`] rather than wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    row: i32,
    column: i32,
}

impl Cell {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Reports whether the cell lies on the fixed battle board.
    #[must_use]
    pub const fn is_on_board(&self) -> bool {
        self.row >= 0 && self.row < BOARD_ROWS && self.column >= 0 && self.column < BOARD_COLUMNS
    }

    /// Returns the cell when it lies on the board.
    pub fn on_board(self) -> Result<Self, CoreError> {
        if self.is_on_board() {
            Ok(self)
        } else {
            Err(CoreError::out_of_bounds(self))
        }
    }

    /// Computes the Manhattan distance between two cells.
    #[must_use]
    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }

    /// The four orthogonal neighbours in north, east, south, west order.
    ///
    /// Neighbours are not clipped to the board.
    #[must_use]
    pub const fn neighbors(self) -> [Cell; 4] {
        [
            Cell::new(self.row - 1, self.column),
            Cell::new(self.row, self.column + 1),
            Cell::new(self.row + 1, self.column),
            Cell::new(self.row, self.column - 1),
        ]
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Axis-aligned terrain rectangle consumed when building a battle grid.
///
/// Both corners are inclusive. The terrain is kept as a name so that
/// collaborators can forward user input verbatim; it is parsed
/// case-insensitively when the grid is painted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainRect {
    /// Upper-left corner of the rectangle.
    pub top_left: Cell,
    /// Lower-right corner of the rectangle.
    pub bottom_right: Cell,
    /// Terrain name such as `"forest"` or `"Water"`.
    pub terrain: String,
}

impl TerrainRect {
    /// Creates a new terrain rectangle.
    #[must_use]
    pub fn new(top_left: Cell, bottom_right: Cell, terrain: impl Into<String>) -> Self {
        Self {
            top_left,
            bottom_right,
            terrain: terrain.into(),
        }
    }
}

/// Terrain types that can cover a board cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Open ground.
    #[default]
    Plain,
    /// Woodland that slows foot soldiers and blocks horses.
    Forest,
    /// Rough high ground passable on foot or on wings.
    Mountain,
    /// Open water only fliers can cross.
    Water,
    /// Solid obstacle nothing can cross.
    Wall,
}

impl Terrain {
    /// Every terrain variant in declaration order.
    pub const ALL: [Terrain; 5] = [
        Terrain::Plain,
        Terrain::Forest,
        Terrain::Mountain,
        Terrain::Water,
        Terrain::Wall,
    ];

    /// Cost charged to a unit of the provided class for entering this terrain.
    #[must_use]
    pub const fn cost_for(self, move_class: MoveClass) -> MoveCost {
        use MoveClass::{Armored, Cavalry, Flying, Infantry};

        match (self, move_class) {
            (Terrain::Plain, _) => MoveCost::new(1),
            (Terrain::Forest, Infantry | Armored) => MoveCost::new(2),
            (Terrain::Forest, Flying) => MoveCost::new(1),
            (Terrain::Mountain, Infantry) => MoveCost::new(3),
            (Terrain::Mountain, Flying) => MoveCost::new(1),
            (Terrain::Water, Flying) => MoveCost::new(1),
            (Terrain::Forest, Cavalry)
            | (Terrain::Mountain, Cavalry | Armored)
            | (Terrain::Water, Infantry | Cavalry | Armored)
            | (Terrain::Wall, _) => MoveCost::IMPASSABLE,
        }
    }
}

impl FromStr for Terrain {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "forest" => Ok(Self::Forest),
            "mountain" => Ok(Self::Mountain),
            "water" => Ok(Self::Water),
            "wall" => Ok(Self::Wall),
            _ => Err(CoreError::InvalidTerrainSpec(format!(
                "unknown terrain '{value}'"
            ))),
        }
    }
}

/// Categories of unit mobility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveClass {
    /// Foot soldiers.
    #[default]
    Infantry,
    /// Mounted units.
    Cavalry,
    /// Heavily armoured units.
    Armored,
    /// Winged units that ignore most terrain.
    Flying,
}

impl MoveClass {
    /// Movement budget granted to a unit of this class each turn.
    #[must_use]
    pub const fn default_budget(self) -> i32 {
        match self {
            Self::Infantry | Self::Flying => 2,
            Self::Cavalry => 3,
            Self::Armored => 1,
        }
    }
}

impl FromStr for MoveClass {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "infantry" => Ok(Self::Infantry),
            "cavalry" => Ok(Self::Cavalry),
            "armored" | "armoured" => Ok(Self::Armored),
            "flying" | "flier" => Ok(Self::Flying),
            _ => Err(CoreError::InvalidArgument(format!(
                "unknown move class '{value}'"
            ))),
        }
    }
}

/// Cost of entering a cell, with a sentinel for impassable terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MoveCost(u32);

impl MoveCost {
    /// Sentinel that compares greater than any feasible movement budget.
    pub const IMPASSABLE: MoveCost = MoveCost(u32::MAX);

    /// Creates a finite movement cost.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric cost.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the cost is finite.
    #[must_use]
    pub const fn is_passable(&self) -> bool {
        self.0 != u32::MAX
    }
}

/// The two sides taking part in a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    /// Player-controlled side; active on odd turns.
    Ally,
    /// Opposing side; active on even turns.
    Foe,
}

impl Group {
    /// Group that is active during the provided turn number.
    #[must_use]
    pub const fn active_on(turn_number: u32) -> Self {
        if turn_number % 2 == 1 {
            Self::Ally
        } else {
            Self::Foe
        }
    }

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Ally => Self::Foe,
            Self::Foe => Self::Ally,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ally => write!(f, "ally"),
            Self::Foe => write!(f, "foe"),
        }
    }
}

/// Individual classification tags carried by a weapon type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeaponTag {
    /// Red weapons: swords and red tomes.
    Red,
    /// Green weapons: axes and green tomes.
    Green,
    /// Blue weapons: lances and blue tomes.
    Blue,
    /// Weapons outside the triangle.
    Colorless,
    /// Attacks that target resistance rather than defence.
    Magic,
    /// Healing implements.
    Staff,
}

impl FromStr for WeaponTag {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            "colorless" | "colourless" => Ok(Self::Colorless),
            "magic" => Ok(Self::Magic),
            "staff" => Ok(Self::Staff),
            _ => Err(CoreError::InvalidArgument(format!(
                "unknown weapon tag '{value}'"
            ))),
        }
    }
}

/// Triangle colors derived from weapon tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponColor {
    /// Beats green, loses to blue.
    Red,
    /// Beats blue, loses to red.
    Green,
    /// Beats red, loses to green.
    Blue,
}

/// Set of tags describing a unit's weapon; a tome may be both `Red` and `Magic`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeaponType {
    tags: Vec<WeaponTag>,
}

impl WeaponType {
    /// Creates a weapon type from the provided tags, dropping duplicates.
    #[must_use]
    pub fn new(tags: impl IntoIterator<Item = WeaponTag>) -> Self {
        let mut collected: Vec<WeaponTag> = Vec::new();
        for tag in tags {
            if !collected.contains(&tag) {
                collected.push(tag);
            }
        }
        Self { tags: collected }
    }

    /// Tags carried by the weapon in insertion order.
    #[must_use]
    pub fn tags(&self) -> &[WeaponTag] {
        &self.tags
    }

    /// Reports whether the weapon carries the provided tag.
    #[must_use]
    pub fn has(&self, tag: WeaponTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Reports whether attacks with this weapon target resistance.
    #[must_use]
    pub fn is_magic(&self) -> bool {
        self.has(WeaponTag::Magic)
    }

    /// First triangle color carried by the weapon, if any.
    #[must_use]
    pub fn color(&self) -> Option<WeaponColor> {
        self.tags.iter().find_map(|tag| match tag {
            WeaponTag::Red => Some(WeaponColor::Red),
            WeaponTag::Green => Some(WeaponColor::Green),
            WeaponTag::Blue => Some(WeaponColor::Blue),
            WeaponTag::Colorless | WeaponTag::Magic | WeaponTag::Staff => None,
        })
    }
}

/// Mutable per-battle state of a single unit.
///
/// `is_alive == (hp > 0)` is not derived automatically: callers that change
/// `hp` must re-assert liveness through the turn state machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitState {
    /// Unique name within the battle.
    pub name: String,
    /// Side the unit fights for.
    pub group: Group,
    /// Mobility category.
    pub move_class: MoveClass,
    /// Experience level.
    pub level: u32,
    /// Weapon classification tags.
    pub weapon: WeaponType,
    /// Remaining hit points.
    pub hp: u32,
    /// Attack stat.
    pub atk: u32,
    /// Speed stat.
    pub spd: u32,
    /// Defence stat, used against physical attacks.
    pub def: u32,
    /// Resistance stat, used against magic attacks.
    pub res: u32,
    /// Cell currently occupied by the unit.
    pub position: Cell,
    /// Raised once the unit acted this turn.
    pub has_acted: bool,
    /// Raised once the unit moved this turn.
    pub has_moved: bool,
    /// Raised once the unit has both moved and acted.
    pub ended_turn: bool,
    /// Cleared permanently when hit points reach zero.
    pub is_alive: bool,
    /// Optional skill names attached to the unit.
    #[serde(default)]
    pub skills: Vec<String>,
}

impl UnitState {
    /// Reports whether the unit has both moved and acted.
    #[must_use]
    pub const fn has_finished_actions(&self) -> bool {
        self.has_moved && self.has_acted
    }

    /// Clears the per-turn action flags.
    pub fn reset_flags(&mut self) {
        self.has_acted = false;
        self.has_moved = false;
        self.ended_turn = false;
    }
}

/// Units belonging to one side, keyed by unique name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    units: BTreeMap<String, UnitState>,
}

impl Roster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a unit keyed by its name, returning any unit it replaced.
    pub fn insert(&mut self, unit: UnitState) -> Option<UnitState> {
        self.units.insert(unit.name.clone(), unit)
    }

    /// Looks up a unit by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UnitState> {
        self.units.get(name)
    }

    /// Looks up a unit by name for mutation.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut UnitState> {
        self.units.get_mut(name)
    }

    /// Reports whether the roster contains the named unit.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    /// Iterator over all units in name order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitState> {
        self.units.values()
    }

    /// Mutable iterator over all units in name order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut UnitState> {
        self.units.values_mut()
    }

    /// Iterator over the units that are still alive.
    pub fn living(&self) -> impl Iterator<Item = &UnitState> {
        self.units.values().filter(|unit| unit.is_alive)
    }

    /// Number of units held, living or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Reports whether the roster holds no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Full snapshot of both rosters at a point in the battle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Turn number at the time of capture.
    pub turn_number: u32,
    /// Deep copy of the ally roster.
    pub allies: Roster,
    /// Deep copy of the foe roster.
    pub foes: Roster,
}

/// Kinds of unit-to-unit interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    /// Offensive strike that deals damage.
    Attack,
    /// Support action that restores hit points.
    Heal,
}

impl FromStr for InteractionKind {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "attack" => Ok(Self::Attack),
            "heal" => Ok(Self::Heal),
            _ => Err(CoreError::InvalidArgument(
                "Invalid interaction type".to_owned(),
            )),
        }
    }
}

/// Minimal description of a resolved interaction that the world can apply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionOutcome {
    /// Kind of interaction that was resolved.
    pub kind: InteractionKind,
    /// Unit that initiated the interaction.
    pub actor: String,
    /// Unit that received the interaction.
    pub target: String,
    /// Damage dealt or healing done.
    pub amount: u32,
    /// Target hit points after the interaction.
    pub target_hp: u32,
}

/// Overall state of the battle derived from surviving units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BattleOutcome {
    /// Both sides still field living units.
    Ongoing,
    /// Every foe has been defeated.
    AllyVictory,
    /// Every ally has been defeated.
    FoeVictory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = Cell::new(1, 1);
        let destination = Cell::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn board_bounds_are_six_by_eight() {
        assert!(Cell::new(0, 0).is_on_board());
        assert!(Cell::new(5, 7).is_on_board());
        assert!(!Cell::new(6, 0).is_on_board());
        assert!(!Cell::new(0, 8).is_on_board());
        assert_eq!(
            Cell::new(-1, 2).on_board(),
            Err(CoreError::OutOfBounds { row: -1, column: 2 })
        );
    }

    #[test]
    fn terrain_names_parse_case_insensitively() {
        assert_eq!("FOREST".parse::<Terrain>(), Ok(Terrain::Forest));
        assert_eq!(" water ".parse::<Terrain>(), Ok(Terrain::Water));
        assert!(matches!(
            "lava".parse::<Terrain>(),
            Err(CoreError::InvalidTerrainSpec(_))
        ));
    }

    #[test]
    fn walls_are_impassable_for_every_class() {
        for class in [
            MoveClass::Infantry,
            MoveClass::Cavalry,
            MoveClass::Armored,
            MoveClass::Flying,
        ] {
            assert!(!Terrain::Wall.cost_for(class).is_passable());
            assert_eq!(Terrain::Plain.cost_for(class), MoveCost::new(1));
        }
    }

    #[test]
    fn impassable_sentinel_exceeds_any_budget() {
        assert!(MoveCost::IMPASSABLE.get() > i32::MAX as u32);
        assert!(!Terrain::Water.cost_for(MoveClass::Cavalry).is_passable());
        assert!(Terrain::Water.cost_for(MoveClass::Flying).is_passable());
    }

    #[test]
    fn turn_parity_selects_active_group() {
        assert_eq!(Group::active_on(1), Group::Ally);
        assert_eq!(Group::active_on(2), Group::Foe);
        assert_eq!(Group::active_on(7), Group::Ally);
        assert_eq!(Group::Ally.opponent(), Group::Foe);
    }

    #[test]
    fn weapon_color_uses_first_colored_tag() {
        let tome = WeaponType::new([WeaponTag::Magic, WeaponTag::Blue, WeaponTag::Blue]);
        assert!(tome.is_magic());
        assert_eq!(tome.color(), Some(WeaponColor::Blue));
        assert_eq!(tome.tags().len(), 2);
        assert_eq!(WeaponType::new([WeaponTag::Staff]).color(), None);
    }

    #[test]
    fn turn_record_round_trips_through_bincode() {
        let mut allies = Roster::new();
        let replaced = allies.insert(UnitState {
            name: "Rowan".to_owned(),
            group: Group::Ally,
            move_class: MoveClass::Infantry,
            level: 3,
            weapon: WeaponType::new([WeaponTag::Red]),
            hp: 40,
            atk: 30,
            spd: 20,
            def: 15,
            res: 10,
            position: Cell::new(5, 1),
            has_acted: true,
            has_moved: false,
            ended_turn: false,
            is_alive: true,
            skills: vec!["Guard".to_owned()],
        });
        assert!(replaced.is_none());

        let record = TurnRecord {
            turn_number: 3,
            allies,
            foes: Roster::new(),
        };
        let bytes = bincode::serialize(&record).expect("serialize");
        let restored: TurnRecord = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, record);
    }
}

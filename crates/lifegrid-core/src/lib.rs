//! Core board engine and pattern catalog for the lifegrid workspace.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use thiserror::Error;

/// Monotonic counter of completed transition steps.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Generation(pub u64);

impl Generation {
    /// The generation of a freshly initialized board.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// The generation following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Errors raised when constructing coordinates from untrusted components.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordError {
    /// A component was negative or does not fit the coordinate range.
    #[error("coordinate ({row}, {col}) has a negative or unrepresentable component")]
    Unrepresentable { row: i64, col: i64 },
}

/// Grid position addressed as `(row, col)` with `(0, 0)` at the top left.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Coord {
    pub row: u32,
    pub col: u32,
}

impl Coord {
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// This coordinate shifted down and right by `offset`.
    #[must_use]
    pub const fn translated(self, offset: Self) -> Self {
        Self::new(self.row + offset.row, self.col + offset.col)
    }
}

impl From<(u32, u32)> for Coord {
    fn from((row, col): (u32, u32)) -> Self {
        Self::new(row, col)
    }
}

impl TryFrom<(i64, i64)> for Coord {
    type Error = CoordError;

    fn try_from((row, col): (i64, i64)) -> Result<Self, Self::Error> {
        let converted = u32::try_from(row)
            .ok()
            .zip(u32::try_from(col).ok())
            .map(|(row, col)| Self::new(row, col));
        converted.ok_or(CoordError::Unrepresentable { row, col })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The three supported square board sizes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BoardSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl BoardSize {
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Side length of a square board of this size.
    #[must_use]
    pub const fn side(self) -> u32 {
        match self {
            Self::Small => 11,
            Self::Medium => 31,
            Self::Large => 101,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors raised when resolving patterns from the catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The requested name is not present in the catalog.
    #[error("unknown pattern `{0}`")]
    UnknownPattern(String),
    /// The pattern declares no anchor for the requested board size.
    #[error("pattern `{pattern}` does not fit on a {size} board")]
    UnsupportedSize { pattern: String, size: BoardSize },
}

/// Errors raised by board construction, initialization, and stepping.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// A coordinate fell outside the board.
    #[error("cell {cell} is outside the {height}x{width} board")]
    OutOfBounds {
        cell: Coord,
        height: u32,
        width: u32,
    },
    /// A stepping or query operation ran before `initialize`.
    #[error("board must be initialized before stepping or querying")]
    NotInitialized,
}

/// Anchor coordinates placing a pattern's reference cell on each board size.
///
/// `None` means the pattern is too large for that size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchors {
    pub small: Option<Coord>,
    pub medium: Option<Coord>,
    pub large: Option<Coord>,
}

impl Anchors {
    #[must_use]
    pub const fn new(small: Option<Coord>, medium: Option<Coord>, large: Option<Coord>) -> Self {
        Self {
            small,
            medium,
            large,
        }
    }

    #[must_use]
    pub const fn get(self, size: BoardSize) -> Option<Coord> {
        match size {
            BoardSize::Small => self.small,
            BoardSize::Medium => self.medium,
            BoardSize::Large => self.large,
        }
    }
}

/// Immutable named template of live cells.
///
/// Offsets are relative to the pattern's top-left reference cell; the anchor
/// for a given board size places that reference cell absolutely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    name: String,
    description: String,
    anchors: Anchors,
    offsets: Vec<Coord>,
}

impl Pattern {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        anchors: Anchors,
        offsets: &[(u32, u32)],
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            anchors,
            offsets: offsets
                .iter()
                .map(|&(row, col)| Coord::new(row, col))
                .collect(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn anchors(&self) -> Anchors {
        self.anchors
    }

    #[must_use]
    pub fn offsets(&self) -> &[Coord] {
        &self.offsets
    }

    /// Whether the pattern declares an anchor for `size`.
    #[must_use]
    pub const fn supports(&self, size: BoardSize) -> bool {
        self.anchors.get(size).is_some()
    }
}

/// Read-only registry of named patterns.
///
/// Built once at startup; names are unique and a duplicate `add` replaces the
/// previous entry (last write wins).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternCatalog {
    patterns: BTreeMap<String, Pattern>,
}

impl PatternCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pattern keyed by its name, silently replacing any existing
    /// entry with the same name.
    pub fn add(&mut self, pattern: Pattern) {
        self.patterns.insert(pattern.name.clone(), pattern);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Pattern> {
        self.patterns.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Pattern names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    /// `(name, description)` pairs in ascending name order, for display.
    pub fn describe_all(&self) -> impl Iterator<Item = (&str, &str)> {
        self.patterns
            .values()
            .map(|pattern| (pattern.name(), pattern.description()))
    }

    /// Absolute live-cell coordinates for `name` placed on a board of `size`.
    pub fn resolve(&self, name: &str, size: BoardSize) -> Result<Vec<Coord>, CatalogError> {
        let pattern = self
            .patterns
            .get(name)
            .ok_or_else(|| CatalogError::UnknownPattern(name.to_string()))?;
        let anchor = pattern
            .anchors
            .get(size)
            .ok_or_else(|| CatalogError::UnsupportedSize {
                pattern: name.to_string(),
                size,
            })?;
        Ok(pattern
            .offsets
            .iter()
            .map(|&offset| anchor.translated(offset))
            .collect())
    }

    /// The built-in pattern library: still lifes, oscillators, spaceships,
    /// methuselahs, and the Gosper gun, with placement anchors per board size.
    #[must_use]
    pub fn builtin() -> Self {
        fn anchors(
            small: Option<(u32, u32)>,
            medium: Option<(u32, u32)>,
            large: Option<(u32, u32)>,
        ) -> Anchors {
            let place = |cell: Option<(u32, u32)>| cell.map(|(row, col)| Coord::new(row, col));
            Anchors::new(place(small), place(medium), place(large))
        }

        let mut catalog = Self::new();
        catalog.add(Pattern::new(
            "beacon",
            "Small oscillator - Period 2",
            anchors(Some((3, 3)), Some((13, 13)), Some((48, 48))),
            &[(0, 0), (0, 1), (1, 0), (2, 3), (3, 2), (3, 3)],
        ));
        catalog.add(Pattern::new(
            "beehive",
            "Small still life",
            anchors(Some((4, 3)), Some((14, 13)), Some((49, 48))),
            &[(0, 1), (0, 2), (1, 0), (1, 3), (2, 1), (2, 2)],
        ));
        catalog.add(Pattern::new(
            "blinker",
            "Small oscillator - Period 2",
            anchors(Some((5, 4)), Some((15, 14)), Some((50, 49))),
            &[(0, 0), (0, 1), (0, 2)],
        ));
        catalog.add(Pattern::new(
            "block",
            "Small still life",
            anchors(Some((4, 4)), Some((14, 14)), Some((49, 49))),
            &[(0, 0), (0, 1), (1, 0), (1, 1)],
        ));
        catalog.add(Pattern::new(
            "boat",
            "Small still life",
            anchors(Some((4, 4)), Some((14, 14)), Some((49, 49))),
            &[(0, 0), (0, 1), (1, 0), (1, 2), (2, 1)],
        ));
        catalog.add(Pattern::new(
            "diehard",
            "Large methuselah that disappears after 130 generations",
            anchors(None, Some((14, 11)), Some((49, 46))),
            &[(0, 6), (1, 0), (1, 1), (2, 1), (2, 5), (2, 6), (2, 7)],
        ));
        catalog.add(Pattern::new(
            "glider",
            "Tiny spaceship that moves down and to the right indefinitely",
            anchors(Some((1, 1)), Some((1, 1)), Some((1, 1))),
            &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
        ));
        catalog.add(Pattern::new(
            "gosperglidergun",
            "Large gun that emits glider patterns indefinitely",
            anchors(None, None, Some((1, 1))),
            &[
                (0, 24),
                (1, 22),
                (1, 24),
                (2, 12),
                (2, 13),
                (2, 20),
                (2, 21),
                (2, 34),
                (2, 35),
                (3, 11),
                (3, 15),
                (3, 20),
                (3, 21),
                (3, 34),
                (3, 35),
                (4, 0),
                (4, 1),
                (4, 10),
                (4, 16),
                (4, 20),
                (4, 21),
                (5, 0),
                (5, 1),
                (5, 10),
                (5, 14),
                (5, 16),
                (5, 17),
                (5, 22),
                (5, 24),
                (6, 10),
                (6, 16),
                (6, 24),
                (7, 11),
                (7, 15),
                (8, 12),
                (8, 13),
            ],
        ));
        catalog.add(Pattern::new(
            "hwss",
            "Medium spaceship that moves to the right indefinitely",
            anchors(Some((2, 1)), Some((12, 1)), Some((47, 1))),
            &[
                (0, 2),
                (0, 3),
                (1, 0),
                (1, 5),
                (2, 6),
                (3, 0),
                (3, 6),
                (4, 1),
                (4, 2),
                (4, 3),
                (4, 4),
                (4, 5),
                (4, 6),
            ],
        ));
        catalog.add(Pattern::new(
            "loaf",
            "Small still life",
            anchors(Some((3, 3)), Some((13, 13)), Some((48, 48))),
            &[(0, 1), (0, 2), (1, 0), (1, 3), (2, 1), (2, 3), (3, 2)],
        ));
        catalog.add(Pattern::new(
            "lwss",
            "Small spaceship that moves to the right indefinitely",
            anchors(Some((3, 1)), Some((13, 1)), Some((48, 1))),
            &[
                (1, 3),
                (1, 4),
                (2, 1),
                (2, 2),
                (2, 4),
                (2, 5),
                (3, 1),
                (3, 2),
                (3, 3),
                (3, 4),
                (4, 2),
                (4, 3),
            ],
        ));
        catalog.add(Pattern::new(
            "mwss",
            "Medium spaceship that moves to the right indefinitely",
            anchors(Some((2, 1)), Some((12, 1)), Some((47, 1))),
            &[
                (0, 2),
                (1, 0),
                (1, 4),
                (2, 5),
                (3, 0),
                (3, 5),
                (4, 1),
                (4, 2),
                (4, 3),
                (4, 4),
                (4, 5),
            ],
        ));
        catalog.add(Pattern::new(
            "pentadecathlon",
            "Large oscillator - Period 15",
            anchors(None, Some((10, 14)), Some((45, 49))),
            &[
                (0, 1),
                (1, 1),
                (2, 0),
                (2, 2),
                (3, 1),
                (4, 1),
                (5, 1),
                (6, 1),
                (7, 0),
                (7, 2),
                (8, 1),
                (9, 1),
            ],
        ));
        catalog.add(Pattern::new(
            "pulsar",
            "Large oscillator - Period 3",
            anchors(None, Some((9, 9)), Some((44, 44))),
            &[
                (0, 2),
                (0, 3),
                (0, 4),
                (0, 8),
                (0, 9),
                (0, 10),
                (2, 0),
                (2, 5),
                (2, 7),
                (2, 12),
                (3, 0),
                (3, 5),
                (3, 7),
                (3, 12),
                (4, 0),
                (4, 5),
                (4, 7),
                (4, 12),
                (5, 2),
                (5, 3),
                (5, 4),
                (5, 8),
                (5, 9),
                (5, 10),
                (7, 2),
                (7, 3),
                (7, 4),
                (7, 8),
                (7, 9),
                (7, 10),
                (8, 0),
                (8, 5),
                (8, 7),
                (8, 12),
                (9, 0),
                (9, 5),
                (9, 7),
                (9, 12),
                (10, 0),
                (10, 5),
                (10, 7),
                (10, 12),
                (12, 2),
                (12, 3),
                (12, 4),
                (12, 8),
                (12, 9),
                (12, 10),
            ],
        ));
        catalog.add(Pattern::new(
            "r-pentomino",
            "Large methuselah that stabilizes after 1103 generations",
            anchors(Some((4, 4)), Some((14, 14)), Some((49, 49))),
            &[(0, 1), (0, 2), (1, 0), (1, 1), (2, 1)],
        ));
        catalog.add(Pattern::new(
            "toad",
            "Small oscillator - Period 2",
            anchors(Some((4, 3)), Some((14, 13)), Some((49, 48))),
            &[(0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (1, 2)],
        ));
        catalog.add(Pattern::new(
            "tub",
            "Small still life",
            anchors(Some((4, 4)), Some((14, 14)), Some((49, 49))),
            &[(0, 1), (1, 0), (1, 2), (2, 1)],
        ));
        catalog
    }
}

/// Dense 2-D cell grid with toroidal adjacency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    height: u32,
    width: u32,
    cells: Vec<bool>,
}

impl Grid {
    fn new(height: u32, width: u32) -> Self {
        Self {
            height,
            width,
            cells: vec![false; (height as usize) * (width as usize)],
        }
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    #[must_use]
    pub fn cells_mut(&mut self) -> &mut [bool] {
        &mut self.cells
    }

    /// Rows as contiguous slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks(self.width as usize)
    }

    /// Returns the flat index for `(row, col)` without bounds checks.
    #[inline]
    fn offset(&self, row: u32, col: u32) -> usize {
        (row as usize) * (self.width as usize) + (col as usize)
    }

    #[must_use]
    pub fn contains(&self, cell: Coord) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// Cell state, or `None` when the coordinate is out of bounds.
    #[must_use]
    pub fn get(&self, cell: Coord) -> Option<bool> {
        self.contains(cell)
            .then(|| self.cells[self.offset(cell.row, cell.col)])
    }

    fn set(&mut self, cell: Coord, alive: bool) {
        let idx = self.offset(cell.row, cell.col);
        self.cells[idx] = alive;
    }

    fn fill(&mut self, alive: bool) {
        self.cells.fill(alive);
    }

    /// Number of live cells in the grid.
    #[must_use]
    pub fn count_alive(&self) -> u32 {
        self.cells.iter().filter(|&&alive| alive).count() as u32
    }

    /// Live cells among the 8 Moore neighbors of `cell`, wrapping rows and
    /// columns independently around the torus.
    ///
    /// On degenerate boards (side 1 or 2) the wrap aliases neighbors onto the
    /// cell itself or onto each other; the count still reflects all 8
    /// neighbor positions, matching the modular adjacency rule.
    #[must_use]
    pub fn live_neighbors(&self, cell: Coord) -> u8 {
        let height = i64::from(self.height);
        let width = i64::from(self.width);
        let mut count = 0u8;
        for delta_row in -1i64..=1 {
            for delta_col in -1i64..=1 {
                if delta_row == 0 && delta_col == 0 {
                    continue;
                }
                let row = (i64::from(cell.row) + delta_row).rem_euclid(height) as u32;
                let col = (i64::from(cell.col) + delta_col).rem_euclid(width) as u32;
                if self.cells[self.offset(row, col)] {
                    count += 1;
                }
            }
        }
        debug_assert!(count <= 8, "neighbor count {count} outside Moore range");
        count
    }
}

/// Metrics emitted after each transition step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSummary {
    pub generation: Generation,
    pub population: u32,
    pub births: u32,
    pub deaths: u32,
}

/// Payload handed to frame sinks after each step.
#[derive(Debug, Clone)]
pub struct FrameBatch {
    pub summary: StepSummary,
    pub grid: Grid,
}

/// Per-frame sink invoked after each step.
pub trait FrameSink: Send {
    fn on_frame(&mut self, frame: &FrameBatch);
}

/// No-op frame sink.
#[derive(Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn on_frame(&mut self, _frame: &FrameBatch) {}
}

/// Static configuration for a board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Grid height in cells.
    pub height: u32,
    /// Grid width in cells.
    pub width: u32,
    /// Optional RNG seed for reproducible soups.
    pub rng_seed: Option<u64>,
    /// Maximum number of recent step summaries retained in-memory.
    pub history_capacity: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::for_size(BoardSize::Medium)
    }
}

impl BoardConfig {
    /// Configuration for a square board of the given size category.
    #[must_use]
    pub fn for_size(size: BoardSize) -> Self {
        Self {
            height: size.side(),
            width: size.side(),
            rng_seed: None,
            history_capacity: 64,
        }
    }

    fn validate(&self) -> Result<(), BoardError> {
        if self.height == 0 || self.width == 0 {
            return Err(BoardError::InvalidConfig(
                "board dimensions must be non-zero",
            ));
        }
        if self.history_capacity == 0 {
            return Err(BoardError::InvalidConfig(
                "history_capacity must be non-zero",
            ));
        }
        Ok(())
    }

    /// Returns the configured RNG, seeding from entropy when no seed is set.
    fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let seed: u64 = rand::random();
                SmallRng::seed_from_u64(seed)
            }
        }
    }
}

/// Double-buffered toroidal Game of Life board.
///
/// A board starts uninitialized; `initialize` (or `initialize_soup`) seeds
/// the live-cell set and enables stepping. Each `step` computes every cell's
/// next state from the prior grid only, so the whole board transitions
/// simultaneously.
pub struct Board {
    config: BoardConfig,
    current: Grid,
    next: Grid,
    initialized: bool,
    generation: Generation,
    rng: SmallRng,
    sink: Box<dyn FrameSink>,
    history: VecDeque<StepSummary>,
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("config", &self.config)
            .field("initialized", &self.initialized)
            .field("generation", &self.generation)
            .field("population", &self.current.count_alive())
            .finish()
    }
}

impl Board {
    /// Allocate an all-dead board with the given dimensions.
    pub fn new(height: u32, width: u32) -> Result<Self, BoardError> {
        Self::with_config(BoardConfig {
            height,
            width,
            ..BoardConfig::default()
        })
    }

    /// Allocate an all-dead square board of the given size category.
    pub fn for_size(size: BoardSize) -> Result<Self, BoardError> {
        Self::with_config(BoardConfig::for_size(size))
    }

    /// Allocate a board from an explicit configuration.
    pub fn with_config(config: BoardConfig) -> Result<Self, BoardError> {
        Self::with_sink(config, Box::new(NullSink))
    }

    /// Allocate a board from an explicit configuration and frame sink.
    pub fn with_sink(
        config: BoardConfig,
        sink: Box<dyn FrameSink>,
    ) -> Result<Self, BoardError> {
        config.validate()?;
        let rng = config.seeded_rng();
        let history_capacity = config.history_capacity;
        Ok(Self {
            current: Grid::new(config.height, config.width),
            next: Grid::new(config.height, config.width),
            config,
            initialized: false,
            generation: Generation::zero(),
            rng,
            sink,
            history: VecDeque::with_capacity(history_capacity),
        })
    }

    /// Replace the frame sink.
    pub fn set_sink(&mut self, sink: Box<dyn FrameSink>) {
        self.sink = sink;
    }

    #[must_use]
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.config.height
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.config.width
    }

    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Iterate over retained step summaries, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &StepSummary> {
        self.history.iter()
    }

    /// Seed the board with exactly the given live cells.
    ///
    /// Every coordinate is validated before anything is mutated, so a failed
    /// call leaves the board untouched. May be called again to reset.
    pub fn initialize(&mut self, live_cells: &[Coord]) -> Result<(), BoardError> {
        for &cell in live_cells {
            if !self.current.contains(cell) {
                return Err(self.out_of_bounds(cell));
            }
        }
        self.current.fill(false);
        self.next.fill(false);
        for &cell in live_cells {
            self.current.set(cell, true);
        }
        self.reset_progress();
        Ok(())
    }

    /// Seed the board with a random soup where each cell is alive with
    /// probability `density`, drawn from the configured RNG.
    pub fn initialize_soup(&mut self, density: f64) -> Result<(), BoardError> {
        if !(0.0..=1.0).contains(&density) {
            return Err(BoardError::InvalidConfig(
                "soup density must be within [0, 1]",
            ));
        }
        self.next.fill(false);
        for cell in self.current.cells_mut() {
            *cell = self.rng.random_bool(density);
        }
        self.reset_progress();
        Ok(())
    }

    fn reset_progress(&mut self) {
        self.generation = Generation::zero();
        self.history.clear();
        self.initialized = true;
    }

    fn out_of_bounds(&self, cell: Coord) -> BoardError {
        BoardError::OutOfBounds {
            cell,
            height: self.config.height,
            width: self.config.width,
        }
    }

    /// Live cells among the 8 Moore neighbors of `cell` in the current grid,
    /// wrapping around the torus.
    pub fn count_live_neighbors(&self, cell: Coord) -> Result<u8, BoardError> {
        if !self.initialized {
            return Err(BoardError::NotInitialized);
        }
        if !self.current.contains(cell) {
            return Err(self.out_of_bounds(cell));
        }
        Ok(self.current.live_neighbors(cell))
    }

    /// Advance the whole board one transition step.
    ///
    /// Next states are computed per cell from the current grid only and
    /// written into the back buffer; the buffers swap once every cell has
    /// been evaluated. Writing in place during the scan would corrupt
    /// neighbor counts for cells visited later, so the back buffer is not
    /// optional. Rows are independent and are evaluated in parallel.
    pub fn step(&mut self) -> Result<StepSummary, BoardError> {
        if !self.initialized {
            return Err(BoardError::NotInitialized);
        }

        let width = self.config.width as usize;
        let current = &self.current;
        self.next
            .cells_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(row, out)| {
                for (col, slot) in out.iter_mut().enumerate() {
                    let cell = Coord::new(row as u32, col as u32);
                    let neighbors = current.live_neighbors(cell);
                    let alive = current.get(cell).unwrap_or(false);
                    *slot = matches!((alive, neighbors), (true, 2 | 3) | (false, 3));
                }
            });

        let mut births = 0u32;
        let mut deaths = 0u32;
        for (&before, &after) in self.current.cells().iter().zip(self.next.cells()) {
            match (before, after) {
                (false, true) => births += 1,
                (true, false) => deaths += 1,
                _ => {}
            }
        }

        std::mem::swap(&mut self.current, &mut self.next);
        self.next.fill(false);
        self.generation = self.generation.next();

        let summary = StepSummary {
            generation: self.generation,
            population: self.current.count_alive(),
            births,
            deaths,
        };
        if self.history.len() >= self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(summary);

        let batch = FrameBatch {
            summary,
            grid: self.current.clone(),
        };
        self.sink.on_frame(&batch);
        Ok(summary)
    }

    /// Read-only view of the current grid.
    pub fn state(&self) -> Result<&Grid, BoardError> {
        if !self.initialized {
            return Err(BoardError::NotInitialized);
        }
        Ok(&self.current)
    }

    /// Owned copy of the current grid.
    pub fn snapshot(&self) -> Result<Grid, BoardError> {
        self.state().cloned()
    }
}

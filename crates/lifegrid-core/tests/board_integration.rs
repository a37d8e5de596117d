use lifegrid_core::{
    Board, BoardConfig, BoardError, BoardSize, CatalogError, Coord, PatternCatalog,
};
use std::collections::BTreeSet;

fn coords(cells: &[(u32, u32)]) -> Vec<Coord> {
    cells.iter().map(|&(row, col)| Coord::new(row, col)).collect()
}

fn live_set(board: &Board) -> BTreeSet<Coord> {
    let grid = board.state().expect("state");
    let mut live = BTreeSet::new();
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let cell = Coord::new(row, col);
            if grid.get(cell) == Some(true) {
                live.insert(cell);
            }
        }
    }
    live
}

#[test]
fn block_is_a_fixed_point() {
    let catalog = PatternCatalog::builtin();
    let mut board = Board::for_size(BoardSize::Medium).expect("board");
    let cells = catalog
        .resolve("block", BoardSize::Medium)
        .expect("resolve block");
    board.initialize(&cells).expect("initialize");

    let before = board.snapshot().expect("snapshot");
    board.step().expect("step");
    assert_eq!(board.state().expect("state"), &before);
}

#[test]
fn blinker_oscillates_with_period_two() {
    let catalog = PatternCatalog::builtin();
    let mut board = Board::for_size(BoardSize::Medium).expect("board");
    let cells = catalog
        .resolve("blinker", BoardSize::Medium)
        .expect("resolve blinker");
    board.initialize(&cells).expect("initialize");

    let original = board.snapshot().expect("snapshot");
    board.step().expect("first step");
    let flipped = board.snapshot().expect("snapshot");
    assert_ne!(flipped, original);
    board.step().expect("second step");
    assert_eq!(board.state().expect("state"), &original);
}

#[test]
fn pulsar_oscillates_with_period_three() {
    let catalog = PatternCatalog::builtin();
    let mut board = Board::for_size(BoardSize::Medium).expect("board");
    let cells = catalog
        .resolve("pulsar", BoardSize::Medium)
        .expect("resolve pulsar");
    board.initialize(&cells).expect("initialize");

    let original = board.snapshot().expect("snapshot");
    for _ in 0..3 {
        board.step().expect("step");
    }
    assert_eq!(board.state().expect("state"), &original);
}

#[test]
fn transition_is_simultaneous_across_the_grid() {
    // A horizontal blinker distinguishes double buffering from an in-place
    // scan: updating cells as they are visited would see the row's left end
    // already dead while evaluating its middle and right cells.
    let mut board = Board::new(7, 7).expect("board");
    board
        .initialize(&coords(&[(2, 1), (2, 2), (2, 3)]))
        .expect("initialize");

    board.step().expect("step");
    let expected: BTreeSet<Coord> = coords(&[(1, 2), (2, 2), (3, 2)]).into_iter().collect();
    assert_eq!(live_set(&board), expected);
}

#[test]
fn corner_cells_are_neighbors_through_the_torus() {
    let mut board = Board::new(9, 12).expect("board");
    board.initialize(&coords(&[(8, 11)])).expect("initialize");

    let count = board
        .count_live_neighbors(Coord::new(0, 0))
        .expect("neighbor count");
    assert_eq!(count, 1);
}

#[test]
fn glider_translates_diagonally_every_four_steps() {
    let catalog = PatternCatalog::builtin();
    let mut board = Board::for_size(BoardSize::Medium).expect("board");
    let cells = catalog
        .resolve("glider", BoardSize::Medium)
        .expect("resolve glider");
    board.initialize(&cells).expect("initialize");

    let start = live_set(&board);
    for _ in 0..4 {
        board.step().expect("step");
    }
    let moved: BTreeSet<Coord> = start
        .iter()
        .map(|cell| cell.translated(Coord::new(1, 1)))
        .collect();
    assert_eq!(live_set(&board), moved);
}

#[test]
fn neighbor_counts_stay_within_moore_range() {
    let config = BoardConfig {
        rng_seed: Some(0x5EED),
        ..BoardConfig::for_size(BoardSize::Small)
    };
    let mut board = Board::with_config(config).expect("board");
    board.initialize_soup(0.5).expect("soup");

    for row in 0..board.height() {
        for col in 0..board.width() {
            let count = board
                .count_live_neighbors(Coord::new(row, col))
                .expect("neighbor count");
            assert!(count <= 8);
        }
    }
}

#[test]
fn resolve_places_anchored_offsets_exactly() {
    let catalog = PatternCatalog::builtin();
    let cells = catalog
        .resolve("block", BoardSize::Small)
        .expect("resolve block");
    assert_eq!(cells, coords(&[(4, 4), (4, 5), (5, 4), (5, 5)]));

    let cells = catalog
        .resolve("block", BoardSize::Large)
        .expect("resolve block");
    assert_eq!(cells, coords(&[(49, 49), (49, 50), (50, 49), (50, 50)]));
}

#[test]
fn resolve_reports_missing_patterns_and_anchors() {
    let catalog = PatternCatalog::builtin();
    assert_eq!(
        catalog.resolve("spaghetti", BoardSize::Medium),
        Err(CatalogError::UnknownPattern("spaghetti".to_string()))
    );
    assert_eq!(
        catalog.resolve("diehard", BoardSize::Small),
        Err(CatalogError::UnsupportedSize {
            pattern: "diehard".to_string(),
            size: BoardSize::Small,
        })
    );
    assert_eq!(
        catalog.resolve("gosperglidergun", BoardSize::Medium),
        Err(CatalogError::UnsupportedSize {
            pattern: "gosperglidergun".to_string(),
            size: BoardSize::Medium,
        })
    );
}

#[test]
fn every_operation_requires_initialization() {
    let mut board = Board::for_size(BoardSize::Small).expect("board");
    assert_eq!(board.step().unwrap_err(), BoardError::NotInitialized);
    assert_eq!(board.state().unwrap_err(), BoardError::NotInitialized);
    assert_eq!(board.snapshot().unwrap_err(), BoardError::NotInitialized);
    assert_eq!(
        board.count_live_neighbors(Coord::new(0, 0)).unwrap_err(),
        BoardError::NotInitialized
    );
}

#[test]
fn failed_initialization_leaves_the_board_untouched() {
    let mut board = Board::for_size(BoardSize::Small).expect("board");
    let err = board
        .initialize(&coords(&[(5, 5), (11, 0)]))
        .unwrap_err();
    assert_eq!(
        err,
        BoardError::OutOfBounds {
            cell: Coord::new(11, 0),
            height: 11,
            width: 11,
        }
    );
    assert!(!board.is_initialized());
    assert_eq!(board.step().unwrap_err(), BoardError::NotInitialized);

    // A board that is already running keeps its state when a reset fails.
    board
        .initialize(&coords(&[(5, 4), (5, 5), (5, 6)]))
        .expect("initialize");
    let before = board.snapshot().expect("snapshot");
    assert!(board.initialize(&coords(&[(0, 99)])).is_err());
    assert!(board.is_initialized());
    assert_eq!(board.state().expect("state"), &before);
}

#[test]
fn seeded_soups_evolve_deterministically() {
    let config = BoardConfig {
        rng_seed: Some(42),
        ..BoardConfig::for_size(BoardSize::Medium)
    };
    let mut board_a = Board::with_config(config.clone()).expect("board_a");
    let mut board_b = Board::with_config(config).expect("board_b");

    board_a.initialize_soup(0.35).expect("soup_a");
    board_b.initialize_soup(0.35).expect("soup_b");
    assert_eq!(
        board_a.state().expect("state"),
        board_b.state().expect("state")
    );

    for _ in 0..5 {
        let summary_a = board_a.step().expect("step_a");
        let summary_b = board_b.step().expect("step_b");
        assert_eq!(summary_a, summary_b);
    }
    assert_eq!(
        board_a.state().expect("state"),
        board_b.state().expect("state")
    );
}

#[test]
fn step_summaries_account_for_births_and_deaths() {
    let mut board = Board::new(7, 7).expect("board");
    board
        .initialize(&coords(&[(2, 1), (2, 2), (2, 3)]))
        .expect("initialize");

    let summary = board.step().expect("step");
    assert_eq!(summary.population, 3);
    assert_eq!(summary.births, 2);
    assert_eq!(summary.deaths, 2);
    assert_eq!(
        summary.population,
        board.state().expect("state").count_alive()
    );
}

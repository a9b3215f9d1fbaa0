//! Integration tests for sorting, filtering and row selection.

use std::sync::Arc;

use lumex_grid::grid::{
    CellData, Column, DataGrid, GridOptions, Row, SelectionMode, SortDescriptor, SortDirection,
};
use parking_lot::Mutex;

#[derive(Debug)]
struct Fruit {
    name: &'static str,
    stock: i64,
}

fn fruits() -> Vec<Fruit> {
    [("banana", 1), ("apple", 1), ("cherry", 0), ("date", 1), ("elderberry", 2)]
        .into_iter()
        .map(|(name, stock)| Fruit { name, stock })
        .collect()
}

fn names(rows: &[Row<Fruit>]) -> Vec<&'static str> {
    rows.iter().map(|r| r.read().name).collect()
}

struct Fixture {
    grid: Arc<DataGrid<Fruit>>,
    name: Arc<Column<Fruit>>,
    stock: Arc<Column<Fruit>>,
    checkbox: Arc<Column<Fruit>>,
}

fn fixture(mode: SelectionMode) -> Fixture {
    let options = GridOptions {
        selection_mode: mode,
        ..GridOptions::default()
    };
    let grid = DataGrid::builder().options(options).items(fruits()).build().unwrap();
    let name = Arc::new(Column::property("Name", |f: &Fruit| CellData::from(f.name)));
    let stock = Arc::new(Column::property("Stock", |f: &Fruit| CellData::from(f.stock)));
    let checkbox = Arc::new(Column::checkbox());
    grid.collect_columns(|c| {
        c.register(checkbox.clone());
        c.register(name.clone());
        c.register(stock.clone());
    });
    Fixture {
        grid,
        name,
        stock,
        checkbox,
    }
}

// =========================================================================
// Sorting
// =========================================================================

#[tokio::test]
async fn test_sort_is_stable_in_both_directions() {
    let Fixture { grid, stock, .. } = fixture(SelectionMode::None);

    grid.sort_by_column(&stock, SortDirection::Auto).await.unwrap();
    assert_eq!(
        names(&grid.displayed_rows()),
        ["cherry", "banana", "apple", "date", "elderberry"]
    );

    // Re-selecting the same column flips the direction; ties keep input order.
    grid.sort_by_column(&stock, SortDirection::Auto).await.unwrap();
    assert_eq!(
        names(&grid.displayed_rows()),
        ["elderberry", "banana", "apple", "date", "cherry"]
    );
    assert!(grid.is_sorted_by(&stock));
}

#[tokio::test]
async fn test_switching_columns_sorts_ascending() {
    let Fixture { grid, name, stock, .. } = fixture(SelectionMode::None);

    let changes = Arc::new(Mutex::new(Vec::new()));
    {
        let changes = changes.clone();
        grid.signals
            .sort_changed
            .connect(move |sort: &Option<SortDescriptor>| changes.lock().push(sort.clone()));
    }

    grid.sort_by_column(&stock, SortDirection::Descending).await.unwrap();
    grid.sort_by_column(&name, SortDirection::Auto).await.unwrap();
    assert_eq!(
        names(&grid.displayed_rows()),
        ["apple", "banana", "cherry", "date", "elderberry"]
    );

    grid.clear_sort().await.unwrap();
    assert_eq!(
        names(&grid.displayed_rows()),
        ["banana", "apple", "cherry", "date", "elderberry"]
    );

    let changes = changes.lock();
    assert_eq!(changes.len(), 3);
    assert_eq!(changes[0].as_ref().map(|s| s.ascending), Some(false));
    assert_eq!(changes[1].as_ref().map(|s| s.column_title.as_str()), Some("Name"));
    assert!(changes[2].is_none());
}

#[tokio::test]
async fn test_unsortable_column_is_ignored() {
    let Fixture { grid, checkbox, .. } = fixture(SelectionMode::None);

    assert!(!grid.sort_by_column(&checkbox, SortDirection::Ascending).await.unwrap());
    assert!(grid.sort_descriptor().is_none());
    assert_eq!(grid.controller().fetch_count(), 0);
}

// =========================================================================
// Filtering
// =========================================================================

#[tokio::test]
async fn test_query_matches_any_indexed_column() {
    let Fixture { grid, .. } = fixture(SelectionMode::None);

    grid.set_filter_query("ERR").await.unwrap();
    assert_eq!(names(&grid.displayed_rows()), ["cherry", "elderberry"]);

    grid.set_filter_query("2").await.unwrap();
    assert_eq!(names(&grid.displayed_rows()), ["elderberry"]);

    grid.clear_filter().await.unwrap();
    assert_eq!(grid.total_count(), 5);
}

#[tokio::test]
async fn test_predicate_and_query_combine() {
    let Fixture { grid, name, .. } = fixture(SelectionMode::None);

    grid.set_filter_predicate(|f: &Fruit| f.stock > 0).await.unwrap();
    grid.set_filter_query("a").await.unwrap();
    grid.sort_by_column(&name, SortDirection::Descending).await.unwrap();
    assert_eq!(names(&grid.displayed_rows()), ["date", "banana", "apple"]);
}

// =========================================================================
// Selection
// =========================================================================

#[tokio::test]
async fn test_single_mode_replaces_selection() {
    let Fixture { grid, .. } = fixture(SelectionMode::Single);
    grid.refresh().await.unwrap();
    let rows = grid.displayed_rows();

    let changes = Arc::new(Mutex::new(Vec::new()));
    {
        let changes = changes.clone();
        grid.signals
            .selection_changed
            .connect(move |(selected, deselected): &(Vec<Row<Fruit>>, Vec<Row<Fruit>>)| {
                changes.lock().push((names(selected), names(deselected)));
            });
    }

    grid.toggle_selection(&rows[0], true);
    grid.toggle_selection(&rows[1], true);
    assert_eq!(names(&grid.selected_rows()), ["apple"]);

    let changes = changes.lock();
    assert_eq!(changes[0], (vec!["banana"], vec![]));
    assert_eq!(changes[1], (vec!["apple"], vec!["banana"]));

    // Single mode ignores select-all.
    drop(changes);
    grid.select_all();
    assert_eq!(grid.selected_rows().len(), 1);
}

#[tokio::test]
async fn test_none_mode_never_selects() {
    let Fixture { grid, .. } = fixture(SelectionMode::None);
    grid.refresh().await.unwrap();
    let rows = grid.displayed_rows();

    grid.toggle_selection(&rows[0], true);
    assert!(!grid.click_row(&rows[1], Some(1)));
    grid.select_all();
    assert!(grid.selected_rows().is_empty());
}

#[tokio::test]
async fn test_select_all_uses_filtered_rows() {
    let Fixture { grid, .. } = fixture(SelectionMode::Multiple);
    grid.set_filter_predicate(|f: &Fruit| f.stock == 1).await.unwrap();

    grid.select_all();
    assert_eq!(names(&grid.selected_rows()), ["banana", "apple", "date"]);
    assert!(grid.displayed_rows().iter().all(|row| grid.is_selected(row)));
}

#[tokio::test]
async fn test_mode_changes_trim_selection() {
    let Fixture { grid, .. } = fixture(SelectionMode::Multiple);
    grid.refresh().await.unwrap();
    let rows = grid.displayed_rows();

    grid.toggle_selection(&rows[0], true);
    grid.set_selection_mode(SelectionMode::Single);
    assert_eq!(grid.selected_rows().len(), 1);

    grid.set_selection_mode(SelectionMode::Multiple);
    grid.toggle_selection(&rows[2], true);
    grid.toggle_selection(&rows[3], true);
    assert_eq!(grid.selected_rows().len(), 3);
    grid.toggle_selection(&rows[2], false);
    assert_eq!(names(&grid.selected_rows()), ["banana", "date"]);

    grid.set_selection_mode(SelectionMode::Single);
    assert!(grid.selected_rows().is_empty());

    grid.set_selection_mode(SelectionMode::Multiple);
    grid.select_all();
    grid.set_selection_mode(SelectionMode::None);
    assert!(grid.selected_rows().is_empty());
}

#[tokio::test]
async fn test_checkbox_cells_reflect_selection() {
    let Fixture { grid, .. } = fixture(SelectionMode::Multiple);
    grid.refresh().await.unwrap();
    let rows = grid.displayed_rows();

    assert!(grid.click_row(&rows[4], None));
    let cell = grid.render_cell(0, &rows[4]).unwrap();
    assert_eq!(cell, lumex_grid::grid::Cell::Checkbox { selected: true });

    assert!(grid.click_row(&rows[4], Some(0)));
    assert!(!grid.is_selected(&rows[4]));
}

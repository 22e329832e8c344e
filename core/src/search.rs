//! Keyword search over every column.
//!
//! Plain case-insensitive substring matching on each cell's text form.
//! No tokenizing, no regex, no escaping.

use crate::{
    dataset::{Dataset, FilteredView},
    types::Row,
};

/// Rows where any cell contains `keyword`. Empty or absent keyword keeps all rows.
pub fn search<'a>(dataset: &'a Dataset, keyword: Option<&str>) -> FilteredView<'a> {
    let needle = match keyword {
        Some(k) if !k.is_empty() => k.to_lowercase(),
        _ => return dataset.full_view(),
    };

    let indices: Vec<usize> = dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row_matches(row, &needle))
        .map(|(i, _)| i)
        .collect();

    log::debug!("Search matched {} of {} rows", indices.len(), dataset.len());
    FilteredView::new(dataset, indices)
}

/// `needle` must already be lowercased.
fn row_matches(row: &Row, needle: &str) -> bool {
    row.iter()
        .any(|cell| cell.to_text().to_lowercase().contains(needle))
}

//! Page-selection input: `all`, `none`, numbers and ranges.

use recall_core::error::SelectionError;

/// Parse a selection over `total` listed items into zero-based indices.
///
/// Accepts `all`, `none` or blank, and comma-separated 1-based numbers or
/// inclusive `a-b` ranges. Out-of-range entries are ignored and duplicates
/// keep their first position. A part that is not a number fails the whole
/// selection.
pub fn parse_selection(input: &str, total: usize) -> Result<Vec<usize>, SelectionError> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return Ok((0..total).collect());
    }
    if input.is_empty() || input.eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }

    let in_range = |n: usize| (1..=total).contains(&n);
    let mut selected = Vec::new();
    for part in input.split(',').map(str::trim) {
        if let Some((start, end)) = part.split_once('-') {
            let start = parse_number(start)?;
            let end = parse_number(end)?;
            if in_range(start) && in_range(end) {
                selected.extend((start..=end).map(|n| n - 1));
            }
        } else {
            let n = parse_number(part)?;
            if in_range(n) {
                selected.push(n - 1);
            }
        }
    }

    let mut seen = std::collections::HashSet::new();
    selected.retain(|i| seen.insert(*i));
    Ok(selected)
}

fn parse_number(part: &str) -> Result<usize, SelectionError> {
    let part = part.trim();
    part.parse()
        .map_err(|_| SelectionError::InvalidNumber(part.to_string()))
}

//! Column alignment engine
//!
//! Lays out rows of cells into lines, padding whichever columns the caller
//! marks as aligned. Padding for an aligned column is computed from the
//! widest content to its left within the block plus one space, so every
//! enabled column starts at the same offset across the block.

/// Lay out `rows` (one `Vec<String>` of cells per row) into strings.
///
/// `aligned[k]` makes column `k` start at a common offset across all rows
/// that have a non-empty cell there. Unaligned non-empty cells are joined
/// with a single space. Empty cells take no space at all.
pub fn layout_rows(rows: &[Vec<String>], aligned: &[bool]) -> Vec<String> {
    let ncols = aligned.len();
    let mut outs: Vec<String> = vec![String::new(); rows.len()];

    for col in 0..ncols {
        if aligned[col] {
            let target = outs
                .iter()
                .zip(rows)
                .filter(|(_, row)| row.get(col).is_some_and(|c| !c.is_empty()))
                .map(|(out, _)| out.chars().count() + 1)
                .max()
                .unwrap_or(0);
            for (out, row) in outs.iter_mut().zip(rows) {
                let Some(cell) = row.get(col).filter(|c| !c.is_empty()) else {
                    continue;
                };
                let width = out.chars().count();
                if width < target {
                    out.push_str(&" ".repeat(target - width));
                }
                out.push_str(cell);
            }
        } else {
            for (out, row) in outs.iter_mut().zip(rows) {
                let Some(cell) = row.get(col).filter(|c| !c.is_empty()) else {
                    continue;
                };
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(cell);
            }
        }
    }

    for out in &mut outs {
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
    }
    outs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(row: &[&str]) -> Vec<String> {
        row.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn aligned_columns_start_at_max_width_plus_one() {
        let rows = vec![
            cells(&["1:", "i32", "id,"]),
            cells(&["2:", "string", "name,"]),
        ];
        let out = layout_rows(&rows, &[false, true, true]);
        assert_eq!(out[0], "1: i32    id,");
        assert_eq!(out[1], "2: string name,");
    }

    #[test]
    fn unaligned_columns_use_single_spaces() {
        let rows = vec![
            cells(&["1:", "i32", "id,"]),
            cells(&["2:", "string", "name,"]),
        ];
        let out = layout_rows(&rows, &[false, false, false]);
        assert_eq!(out[0], "1: i32 id,");
        assert_eq!(out[1], "2: string name,");
    }

    #[test]
    fn empty_cells_take_no_space() {
        let rows = vec![
            cells(&["A", "=", "1,", "// first"]),
            cells(&["LONGER,", "", "", "// second"]),
        ];
        let out = layout_rows(&rows, &[false, false, false, true]);
        assert_eq!(out[0], "A = 1,  // first");
        assert_eq!(out[1], "LONGER, // second");
    }

    #[test]
    fn single_row_blocks_get_no_extra_padding() {
        let rows = vec![cells(&["1:", "i32", "id"])];
        let out = layout_rows(&rows, &[false, true, true]);
        assert_eq!(out[0], "1: i32 id");
    }
}

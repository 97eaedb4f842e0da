//! Template layout cloning.
//!
//! Monthly report sheets are created at run time, one per employee, but must
//! look exactly like the client-approved template sheet. Three passes make a
//! fresh sheet visually indistinguishable from the template: cell values and
//! styles, column/row dimensions, and merged regions. All three must run
//! before the report writer fills in data.

use umya_spreadsheet::Worksheet;

/// Column names the dimension pass covers, matching the template width
const COLUMNS: [&str; 26] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
    "S", "T", "U", "V", "W", "X", "Y", "Z",
];

/// Copy every populated cell's value and full style onto the target sheet.
pub fn clone_cells(template: &Worksheet, target: &mut Worksheet) {
    for cell in template.get_cell_collection() {
        let coordinate = cell.get_coordinate();
        let col = *coordinate.get_col_num();
        let row = *coordinate.get_row_num();

        let target_cell = target.get_cell_mut((col, row));
        let value = cell.get_value();
        if !value.is_empty() {
            target_cell.set_value(value.to_string());
        }
        target_cell.set_style(cell.get_style().clone());
    }
}

/// Apply the template's column widths (A–Z) and explicit row heights
/// (rows 1..=`max_rows`) to the target sheet.
pub fn clone_dimensions(template: &Worksheet, target: &mut Worksheet, max_rows: u32) {
    for column in COLUMNS {
        if let Some(dimension) = template.get_column_dimension(column) {
            let width = *dimension.get_width();
            if width > 0.0 {
                target.get_column_dimension_mut(column).set_width(width);
            }
        }
    }
    for row in 1..=max_rows {
        if let Some(dimension) = template.get_row_dimension(&row) {
            let height = *dimension.get_height();
            if height > 0.0 {
                target.get_row_dimension_mut(&row).set_height(height);
            }
        }
    }
}

/// Re-create every merged rectangle of the template on the target sheet,
/// preserving the exact row/column spans.
pub fn clone_merged_regions(template: &Worksheet, target: &mut Worksheet) {
    for range in template.get_merge_cells() {
        target.add_merge_cells(range.get_range());
    }
}

/// All three cloning passes in the required order.
pub fn clone_layout(template: &Worksheet, target: &mut Worksheet, max_rows: u32) {
    clone_cells(template, target);
    clone_dimensions(template, target, max_rows);
    clone_merged_regions(template, target);
}

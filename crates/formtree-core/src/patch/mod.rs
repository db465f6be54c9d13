pub mod row;
pub mod set;

pub use row::{RowPatch, apply_row_patches};
pub use set::{PathError, get_value_at_path, set_value_at_path, set_value_at_path_with};

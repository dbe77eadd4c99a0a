//! Training plan input: table reading and row parsing.

pub mod table;
pub mod types;

pub use table::{PlanTable, RawRow};
pub use types::{
    weekday_name, BaseSpec, IntervalBlock, PlanError, PlanRow, RowError, RowId, TableError,
    DEFAULT_BASE_CODE, MANDATORY_COLUMNS, MAX_INTERVALS_PER_BLOCK, MAX_MINUTES,
};

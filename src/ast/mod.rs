pub mod builders;
pub mod query;
pub mod values;

pub use self::query::{OrderBy, Select, SortOrder, WhereNode};
pub use self::values::Value;

/// Namespace under which attributes are addressed in index filters.
pub const ATTRIBUTES_FIELD: &str = "attributes";

/// Index field holding the owning folder's name.
pub const FOLDER_FIELD: &str = "folder";

/// Index field holding the original file name.
pub const NAME_FIELD: &str = "name";

/// Aggregation output collection that holds the per-folder attribute name lists.
pub const ATTRIBUTE_NAMES_OUTPUT: &str = "attributes";

/// Separator used by the attribute-name reduction.
pub const ATTRIBUTE_NAME_SEPARATOR: char = ',';

// --- 查询分页默认值 ---
/// Number of records skipped when the caller supplies no paging.
pub const DEFAULT_QUERY_SKIP: usize = 0;

/// Maximum number of records returned when the caller supplies no (or an unbounded) limit.
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// Upper bound on the limit a caller may request.
pub const MAX_QUERY_LIMIT: usize = 1000;

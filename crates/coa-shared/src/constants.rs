//! Application-wide constants

/// Depth of a root account; every non-root sits at its parent's level + 1.
pub const ROOT_LEVEL: i32 = 1;

/// Upper bound on recompute-and-retry rounds when a freshly allocated code
/// loses the race to a concurrent writer. Must stay at least as large as
/// the expected number of concurrent allocators per parent.
pub const MAX_CODE_RETRIES: usize = 5;

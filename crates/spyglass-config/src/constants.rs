//! Default constants for all configuration values

/// Default maximum recursion depth for value inspection
pub const DEFAULT_MAX_LEVEL: usize = 2;
/// Default maximum number of collection children captured
pub const DEFAULT_MAX_SIZE: usize = 100;
/// Default maximum length of a primitive's textual form
pub const DEFAULT_MAX_LEN: usize = 255;
/// Default maximum number of object fields captured
pub const DEFAULT_MAX_FIELDS: usize = 20;

/// Default streaming-encoder buffer capacity (4 MiB)
pub const DEFAULT_BUFFER_CAPACITY: usize = 4 * (1 << 20);

/// Default per-probe events-per-second budget
pub const DEFAULT_PROBE_RATE: f64 = 1.0;

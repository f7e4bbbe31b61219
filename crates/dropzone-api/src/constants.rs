//! API constants

/// API base path prefix (version-independent)
pub const API_BASE: &str = "/api";

/// Prefix of every versioned route.
pub const API_PREFIX: &str = "/api/v1";

/// Multipart field that carries dropped files.
pub const UPLOAD_FILE_FIELD: &str = "file";

/// Files of one batch share a request body; the body limit allows this many
/// maximum-size files plus [`MULTIPART_OVERHEAD_BYTES`].
pub const MAX_FILES_PER_BODY: u64 = 4;

pub const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Server-level concurrency limit.
pub const HTTP_CONCURRENCY_LIMIT: usize = 1024;

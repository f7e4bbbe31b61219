//! Shared constants

/// Upload limit applied when `max_file_size` is absent (64 MB, decimal).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 64_000_000;

/// Field that receives the file name when a mapping does not name one.
pub const DEFAULT_NAME_FIELD: &str = "name";

/// Policy module checked by permission reports.
pub const PERMISSION_MODULE: &str = "content";

/// Policy function checked by permission reports.
pub const PERMISSION_FUNCTION: &str = "create";

/// Header value that marks a programmatic (XHR) request.
pub const XML_HTTP_REQUEST: &str = "XMLHttpRequest";

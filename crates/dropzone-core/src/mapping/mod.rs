//! Upload routing configuration: authored form, normalization, loading and
//! resolution.

mod loader;
mod normalizer;
mod raw;
mod resolver;

pub use loader::{load_mapping_configuration, load_raw_config};
pub use normalizer::normalize;
pub use raw::{RawFallbackContentType, RawLocationMapping, RawMappingConfig, RawMimeTypeMapping};
pub use resolver::{
    candidate_content_types, file_picker_filter, is_type_allowed, mime_matches_filter,
    resolve_mapping, ResolutionStep, RESOLUTION_ORDER,
};

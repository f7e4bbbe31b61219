//! Raw configuration -> [`MappingConfiguration`].
//!
//! Pure transform; every problem is reported here, at load time, as
//! [`AppError::InvalidConfig`].

use std::collections::{HashMap, HashSet};

use validator::Validate;

use super::raw::{RawFallbackContentType, RawLocationMapping, RawMappingConfig, RawMimeTypeMapping};
use crate::constants::{DEFAULT_MAX_FILE_SIZE, DEFAULT_NAME_FIELD};
use crate::models::{FallbackContentType, LocationMapping, MappingConfiguration, MimeTypeMapping};
use crate::AppError;

/// Normalize an authored configuration.
pub fn normalize(raw: &RawMappingConfig) -> Result<MappingConfiguration, AppError> {
    let location_mappings = normalize_location_mappings(
        raw.location_mappings.as_deref().unwrap_or_default(),
    )?;
    let default_mappings = normalize_mappings(
        raw.default_mappings.as_deref().unwrap_or_default(),
        "default_mappings",
    )?;
    let fallback_content_type = normalize_fallback(raw.fallback_content_type.as_ref());
    let max_file_size = normalize_max_file_size(raw.max_file_size)?;

    Ok(MappingConfiguration::new(
        location_mappings,
        default_mappings,
        fallback_content_type,
        max_file_size,
    ))
}

fn normalize_location_mappings(raw: &[RawLocationMapping]) -> Result<Vec<LocationMapping>, AppError> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(raw.len());

    for (index, location) in raw.iter().enumerate() {
        let scope = format!("location_mappings[{}]", index);
        location
            .validate()
            .map_err(|e| AppError::InvalidConfig(format!("{}: {}", scope, e)))?;

        let identifier =
            required_identifier(&location.content_type_identifier, "content_type_identifier", &scope)?;
        if !seen.insert(identifier.clone()) {
            return Err(AppError::InvalidConfig(format!(
                "{}: duplicate location mapping for content type '{}'",
                scope, identifier
            )));
        }

        let mime_type_filter = location
            .mime_type_filter
            .iter()
            .map(|f| f.trim().to_ascii_lowercase())
            .filter(|f| !f.is_empty())
            .collect();

        result.push(LocationMapping {
            container_content_type_identifier: identifier,
            mime_type_filter,
            mappings: normalize_mappings(&location.mappings, &format!("{}.mappings", scope))?,
        });
    }

    Ok(result)
}

fn normalize_mappings(raw: &[RawMimeTypeMapping], scope: &str) -> Result<Vec<MimeTypeMapping>, AppError> {
    let mappings = raw
        .iter()
        .enumerate()
        .map(|(index, mapping)| normalize_mapping(mapping, &format!("{}[{}]", scope, index)))
        .collect::<Result<Vec<_>, _>>()?;

    warn_on_shadowed_mime_types(&mappings, scope);

    Ok(mappings)
}

fn normalize_mapping(raw: &RawMimeTypeMapping, scope: &str) -> Result<MimeTypeMapping, AppError> {
    raw.validate()
        .map_err(|e| AppError::InvalidConfig(format!("{}: {}", scope, e)))?;

    let authored: Vec<&String> = match (&raw.mime_type, &raw.mime_types) {
        (Some(_), Some(_)) => {
            return Err(AppError::InvalidConfig(format!(
                "{}: use either mime_type or mime_types, not both",
                scope
            )))
        }
        (Some(single), None) => vec![single],
        (None, Some(list)) => list.iter().collect(),
        (None, None) => {
            return Err(AppError::InvalidConfig(format!(
                "{}: mime_types is required",
                scope
            )))
        }
    };

    let mut mime_types: Vec<String> = Vec::with_capacity(authored.len());
    for mime_type in authored {
        let mime_type = mime_type.trim().to_ascii_lowercase();
        if mime_type.is_empty() {
            return Err(AppError::InvalidConfig(format!(
                "{}: mime_types cannot contain empty values",
                scope
            )));
        }
        if !mime_types.contains(&mime_type) {
            mime_types.push(mime_type);
        }
    }
    if mime_types.is_empty() {
        return Err(AppError::InvalidConfig(format!(
            "{}: mime_types cannot be empty",
            scope
        )));
    }

    Ok(MimeTypeMapping {
        mime_types,
        content_type_identifier: required_identifier(
            &raw.content_type_identifier,
            "content_type_identifier",
            scope,
        )?,
        content_field_identifier: required_identifier(
            &raw.content_field_identifier,
            "content_field_identifier",
            scope,
        )?,
        name_field_identifier: non_empty(raw.name_field_identifier.as_deref())
            .unwrap_or(DEFAULT_NAME_FIELD)
            .to_string(),
    })
}

/// A fallback missing its content type or its content field collapses to all-null.
fn normalize_fallback(raw: Option<&RawFallbackContentType>) -> FallbackContentType {
    let Some(raw) = raw else {
        return FallbackContentType::unset();
    };

    match (
        non_empty(raw.content_type_identifier.as_deref()),
        non_empty(raw.content_field_identifier.as_deref()),
    ) {
        (Some(content_type), Some(content_field)) => FallbackContentType {
            content_type_identifier: Some(content_type.to_string()),
            content_field_identifier: Some(content_field.to_string()),
            name_field_identifier: Some(
                non_empty(raw.name_field_identifier.as_deref())
                    .unwrap_or(DEFAULT_NAME_FIELD)
                    .to_string(),
            ),
        },
        (content_type, content_field) => {
            if content_type.is_some() || content_field.is_some() {
                tracing::warn!(
                    content_type = ?content_type,
                    content_field = ?content_field,
                    "Partially configured fallback content type ignored"
                );
            }
            FallbackContentType::unset()
        }
    }
}

fn normalize_max_file_size(raw: Option<i64>) -> Result<u64, AppError> {
    match raw {
        None => Ok(DEFAULT_MAX_FILE_SIZE),
        Some(size) if size > 0 => Ok(size as u64),
        Some(size) => Err(AppError::InvalidConfig(format!(
            "max_file_size must be a positive integer, got {}",
            size
        ))),
    }
}

/// Trimmed identifier; blank values are rejected.
fn required_identifier(value: &str, field: &str, scope: &str) -> Result<String, AppError> {
    match value.trim() {
        "" => Err(AppError::InvalidConfig(format!(
            "{}: {} cannot be blank",
            scope, field
        ))),
        trimmed => Ok(trimmed.to_string()),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Repeated MIME types within one list are legal (first match wins) but almost
/// always a mistake.
fn warn_on_shadowed_mime_types(mappings: &[MimeTypeMapping], scope: &str) {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (index, mapping) in mappings.iter().enumerate() {
        for mime_type in &mapping.mime_types {
            if let Some(first) = first_seen.get(mime_type.as_str()) {
                tracing::warn!(
                    scope = scope,
                    mime_type = %mime_type,
                    shadowed_entry = index,
                    winning_entry = first,
                    "MIME type mapped more than once; the first entry wins"
                );
            } else {
                first_seen.insert(mime_type, index);
            }
        }
    }
}

impl MappingConfiguration {
    /// Authored form of this configuration; normalizing it yields `self` again.
    pub fn to_raw(&self) -> RawMappingConfig {
        RawMappingConfig {
            location_mappings: Some(
                self.location_mappings()
                    .iter()
                    .map(|location| RawLocationMapping {
                        content_type_identifier: location.container_content_type_identifier.clone(),
                        mime_type_filter: location.mime_type_filter.clone(),
                        mappings: location.mappings.iter().map(mapping_to_raw).collect(),
                    })
                    .collect(),
            ),
            default_mappings: Some(self.default_mappings().iter().map(mapping_to_raw).collect()),
            fallback_content_type: Some(RawFallbackContentType {
                content_type_identifier: self.fallback_content_type().content_type_identifier.clone(),
                content_field_identifier: self.fallback_content_type().content_field_identifier.clone(),
                name_field_identifier: self.fallback_content_type().name_field_identifier.clone(),
            }),
            max_file_size: Some(self.max_file_size() as i64),
        }
    }
}

fn mapping_to_raw(mapping: &MimeTypeMapping) -> RawMimeTypeMapping {
    RawMimeTypeMapping {
        mime_type: None,
        mime_types: Some(mapping.mime_types.clone()),
        content_type_identifier: mapping.content_type_identifier.clone(),
        content_field_identifier: mapping.content_field_identifier.clone(),
        name_field_identifier: Some(mapping.name_field_identifier.clone()),
    }
}

//! Human-readable text for sizes and upload failures.

use crate::error::HostError;

const UNITS: [&str; 4] = ["bytes", "KB", "MB", "GB"];
const KILOBYTE: f64 = 1024.0;

/// Format a byte count using 1024-based units, e.g. `512 bytes`, `1.5 KB`, `61.0 MB`.
pub fn format_file_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= KILOBYTE && unit_index < UNITS.len() - 1 {
        size /= KILOBYTE;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Message shown when creating or publishing the content for `file_name` failed.
///
/// Each host failure shape gets its own wording: transport errors carry only a
/// message, status failures carry a status code (or `N/A`) and status text, and
/// error documents carry the host's error code and description.
pub fn upload_failure_text(file_name: &str, error: &HostError) -> String {
    match error {
        HostError::Transport(message) => {
            format!("An error occurred while uploading a file: {} - {}", file_name, message)
        }
        HostError::Status { code, text } => {
            let status = match code {
                Some(code) if *code > 0 => code.to_string(),
                _ => "N/A".to_string(),
            };
            let text = text
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or("Unknown content type");
            format!(
                "Cannot upload a file. Status code: {}. {} - {}",
                status, file_name, text
            )
        }
        HostError::Domain {
            error_code,
            description,
        } => format!(
            "Cannot upload a file. Status code: {}. {} - {}",
            error_code, file_name, description
        ),
        HostError::NotFound(_) => {
            format!("An unexpected error occurred while uploading '{}'", file_name)
        }
    }
}

pub fn published_text(file_name: &str) -> String {
    format!("File '{}' has been published", file_name)
}

pub fn deleted_text(file_name: &str) -> String {
    format!("File '{}' has been deleted", file_name)
}

pub fn aborted_text(file_name: &str) -> String {
    format!("Upload of '{}' has been aborted", file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size_units() {
        assert_eq!(format_file_size(0), "0 bytes");
        assert_eq!(format_file_size(1023), "1023 bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(64_000_000), "61.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_format_file_size_caps_at_gigabytes() {
        assert_eq!(format_file_size(2048 * 1024 * 1024 * 1024), "2048.0 GB");
    }

    #[test]
    fn test_upload_failure_text_per_classification() {
        let transport = upload_failure_text("a.png", &HostError::Transport("timeout".into()));
        assert_eq!(
            transport,
            "An error occurred while uploading a file: a.png - timeout"
        );

        let status = upload_failure_text(
            "a.png",
            &HostError::Status {
                code: None,
                text: None,
            },
        );
        assert_eq!(
            status,
            "Cannot upload a file. Status code: N/A. a.png - Unknown content type"
        );

        let domain = upload_failure_text(
            "a.png",
            &HostError::Domain {
                error_code: "403".into(),
                description: "User is not allowed to create content".into(),
            },
        );
        assert!(domain.contains("Status code: 403"));
        assert!(domain.ends_with("a.png - User is not allowed to create content"));
    }
}

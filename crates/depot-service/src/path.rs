//! Logical path rules for the file namespace.
//!
//! Folder paths are stored normalized: a single leading and trailing `/`,
//! no duplicate separators, no relative segments. Names never contain
//! separators. Uniqueness of `(project, folder_path, name)` among
//! non-deleted entries is enforced by the database.

use depot_core::error::AppError;
use depot_core::result::AppResult;

/// Path separator used in logical paths.
pub const SEPARATOR: char = '/';

/// Normalize a logical folder path.
///
/// Accepts `""`, `"/"`, `"docs/reports"`, `"/docs//reports/"` and the
/// like; produces `"/"` or `"/docs/reports/"`. Rejects relative segments.
pub fn normalize_folder_path(path: &str) -> AppResult<String> {
    let mut segments = Vec::new();
    for segment in path.split(SEPARATOR) {
        match segment {
            "" => continue,
            "." | ".." => {
                return Err(AppError::validation(format!(
                    "Relative segment in path: '{path}'"
                )))
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Ok(SEPARATOR.to_string());
    }
    Ok(format!("/{}/", segments.join("/")))
}

/// Validate a file or folder name.
pub fn validate_name(name: &str) -> AppResult<()> {
    if name.is_empty() {
        return Err(AppError::validation("Name must not be empty"));
    }
    if name.contains(SEPARATOR) {
        return Err(AppError::validation(format!(
            "Name must not contain '{SEPARATOR}': '{name}'"
        )));
    }
    if name == "." || name == ".." {
        return Err(AppError::validation(format!("Invalid name: '{name}'")));
    }
    Ok(())
}

/// Join a normalized folder path and a name into a full logical path.
pub fn full_path(folder_path: &str, name: &str) -> String {
    format!("{folder_path}{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_canonical_form() {
        assert_eq!(normalize_folder_path("").unwrap(), "/");
        assert_eq!(normalize_folder_path("/").unwrap(), "/");
        assert_eq!(normalize_folder_path("docs").unwrap(), "/docs/");
        assert_eq!(normalize_folder_path("/docs/reports/").unwrap(), "/docs/reports/");
        assert_eq!(normalize_folder_path("//docs///reports").unwrap(), "/docs/reports/");
    }

    #[test]
    fn rejects_relative_segments() {
        assert!(normalize_folder_path("/docs/../etc").is_err());
        assert!(normalize_folder_path("./docs").is_err());
    }

    #[test]
    fn rejects_bad_names() {
        assert!(validate_name("").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("report.pdf").is_ok());
    }

    #[test]
    fn joins_paths() {
        assert_eq!(full_path("/docs/", "a.txt"), "/docs/a.txt");
        assert_eq!(full_path("/", "a.txt"), "/a.txt");
    }
}

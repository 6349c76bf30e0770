//! Maps file paths to language IDs.

use std::path::Path;

/// Returns the language ID for a file path, if the extension is known.
///
/// Unknown extensions return `None` and the widget applies its default
/// (plain text) mode.
pub fn language_id_from_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    match ext {
        "js" | "jsx" | "mjs" | "cjs" => Some("javascript"),
        "ts" | "tsx" => Some("typescript"),
        "json" => Some("json"),
        "css" => Some("css"),
        "html" | "htm" => Some("html"),
        "py" => Some("python"),
        "md" => Some("markdown"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_known_extensions() {
        assert_eq!(language_id_from_path(Path::new("app.js")), Some("javascript"));
        assert_eq!(language_id_from_path(Path::new("src/app.tsx")), Some("typescript"));
        assert_eq!(language_id_from_path(Path::new("style.css")), Some("css"));
        assert_eq!(language_id_from_path(Path::new("main.py")), Some("python"));
    }

    #[test]
    fn test_unknown_or_missing_extension() {
        assert_eq!(language_id_from_path(Path::new("Makefile")), None);
        assert_eq!(language_id_from_path(Path::new("data.bin")), None);
    }
}

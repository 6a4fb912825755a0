// All core functionality is in billparse-core
// This CLI acts as a thin wrapper around the core library

use std::path::{Path, PathBuf};

// Re-export core types for convenience
pub use billparse_core::*;

/// Output next to the input: `<dir>/<stem without .docling>.<ext>`
pub fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = document_stem(input);
    let file_name = format!("{}.{}", stem, format.extension());
    match input.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// First `max_blocks` content blocks of a section, cut to `max_chars`
/// characters with a trailing "..."
pub fn preview_section(section: &Section, max_blocks: usize, max_chars: usize) -> String {
    let preview = section
        .raw_text
        .split("\n\n")
        .take(max_blocks)
        .collect::<Vec<_>>()
        .join("\n");

    if preview.chars().count() > max_chars {
        format!("{}...", preview.chars().take(max_chars).collect::<String>())
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(raw_text: &str) -> Section {
        Section {
            id: "1-short-title".to_string(),
            index: 1,
            title: "Short title".to_string(),
            raw_text: raw_text.to_string(),
        }
    }

    #[test]
    fn output_path_replaces_docling_suffix() {
        assert_eq!(
            default_output_path(Path::new("output/bill.docling.json"), OutputFormat::Sections),
            PathBuf::from("output/bill.json")
        );
        assert_eq!(
            default_output_path(Path::new("output/bill.docling.json"), OutputFormat::Markdown),
            PathBuf::from("output/bill.md")
        );
        assert_eq!(
            default_output_path(Path::new("bill.json"), OutputFormat::Flat),
            PathBuf::from("bill.json")
        );
    }

    #[test]
    fn preview_takes_first_blocks() {
        let s = section("one\n\ntwo\n\nthree\n\nfour\n\nfive\n\nsix");
        assert_eq!(preview_section(&s, 5, 200), "one\ntwo\nthree\nfour\nfive");
        assert_eq!(preview_section(&section(""), 5, 200), "");
    }

    #[test]
    fn preview_truncates_on_char_boundaries() {
        let s = section(&"ü".repeat(250));
        let preview = preview_section(&s, 5, 200);
        assert_eq!(preview.chars().count(), 203);
        assert!(preview.ends_with("..."));
    }
}

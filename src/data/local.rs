//! Local Agribalyse spreadsheet export.

use std::path::Path;

use encoding_rs::WINDOWS_1252;
use tracing::{debug, info};

use super::{Dataset, SourceKind};
use crate::error::AppError;

pub const DEFAULT_LOCAL_PATH: &str = "data/agribalyse-31-synthese.csv";

/// Substring identifying the header row of the export.
pub const HEADER_MARKER: &str = "Nom du Produit en Français";

/// How many leading lines are searched for `HEADER_MARKER`.
pub const HEADER_SCAN_LINES: usize = 50;

/// Read and decode the local export, dropping everything above the header row.
pub fn read_local_dataset(path: &Path) -> Result<Dataset, AppError> {
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::usage(format!("Failed to read local dataset '{}': {e}", path.display())))?;

    let text = decode_windows_1252(&bytes);
    let body = strip_preamble(&text).ok_or_else(|| {
        AppError::usage(format!(
            "Header marker '{HEADER_MARKER}' not found in the first {HEADER_SCAN_LINES} lines of '{}'.",
            path.display()
        ))
    })?;

    info!(path = %path.display(), bytes = bytes.len(), "loaded local dataset");
    Ok(Dataset::new(SourceKind::Local, body))
}

/// Decode Windows-1252 bytes. A UTF-8 BOM switches decoding to UTF-8.
pub fn decode_windows_1252(bytes: &[u8]) -> String {
    let (text, encoding, _) = WINDOWS_1252.decode(bytes);
    if encoding != WINDOWS_1252 {
        debug!(encoding = encoding.name(), "byte order mark overrides Windows-1252");
    }
    text.into_owned()
}

/// Slice of `text` starting at the header row, if the marker is found within
/// the first `HEADER_SCAN_LINES` lines.
pub fn strip_preamble(text: &str) -> Option<&str> {
    let mut offset = 0;
    for line in text.split_inclusive('\n').take(HEADER_SCAN_LINES) {
        if line.contains(HEADER_MARKER) {
            return Some(&text[offset..]);
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn decodes_oe_ligature() {
        // "bœuf" in Windows-1252.
        let bytes = [b'b', 0x9C, b'u', b'f'];
        assert_eq!(decode_windows_1252(&bytes), "bœuf");
    }

    #[test]
    fn strips_title_lines_above_header() {
        let text = "AGRIBALYSE 3.1\n\nNom du Produit en Français;Changement climatique\nporc;3\n";
        let body = strip_preamble(text).unwrap();
        assert!(body.starts_with("Nom du Produit en Français;"));
        assert!(body.ends_with("porc;3\n"));
    }

    #[test]
    fn marker_beyond_scan_window_is_not_found() {
        let mut text = "x\n".repeat(HEADER_SCAN_LINES);
        text.push_str("Nom du Produit en Français;co2\n");
        assert!(strip_preamble(&text).is_none());

        let mut text = "x\n".repeat(HEADER_SCAN_LINES - 1);
        text.push_str("Nom du Produit en Français;co2\n");
        assert!(strip_preamble(&text).is_some());
    }

    #[test]
    fn reads_legacy_encoded_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Titre\nNom du Produit en Fran\xE7ais;Changement climatique\nSteak de b\x9Cuf;12,0\n")
            .unwrap();

        let dataset = read_local_dataset(file.path()).unwrap();
        assert_eq!(dataset.kind, SourceKind::Local);
        assert!(!dataset.fell_back);
        assert!(dataset.text.contains("Steak de bœuf;12,0"));
        assert!(dataset.text.starts_with("Nom du Produit"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_local_dataset(&dir.path().join("absent.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}

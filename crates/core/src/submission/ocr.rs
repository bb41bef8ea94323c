//! Envelope for handwriting recognition output stored on upload.

use serde_json::{json, Map, Value};

/// Model identifier recorded with every recognition result.
pub const OCR_ENGINE: &str = "microsoft/trocr-base-handwritten";

/// Recognition only covers the handwritten key fields of an invoice.
pub const OCR_SCOPE: &str = "key_fields";

/// Placeholder image reference for uploads until image storage exists.
pub const UPLOADED_IMAGE_URL: &str = "uploaded_file";

/// Wraps raw recognition text as `{"ocr": {raw_text, engine, scope}}`.
pub fn ocr_envelope(raw_text: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(
        "ocr".to_string(),
        json!({
            "raw_text": raw_text,
            "engine": OCR_ENGINE,
            "scope": OCR_SCOPE,
        }),
    );
    map
}

use serde::{Deserialize, Serialize};

pub const SHORT_TITLE_MAX_CHARS: usize = 60;
const HEADER_CODE_LEN: usize = 3;

/// Canonical flat row shape used for both the remote table and the local
/// JSON export. Field names match the remote schema column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcdCodeRecord {
    pub code: String,
    pub short_title: String,
    pub long_description: String,
    pub chapter: String,
    pub chapter_number: Option<u32>,
    pub is_billable: bool,
    pub is_header: bool,
    pub parent_code: Option<String>,
}

impl IcdCodeRecord {
    /// Assemble a record from parsed fields, deriving the short title, the
    /// header/billable flags, and the parent-code pointer. Three-character
    /// codes are non-billable category headers; longer codes are billable
    /// leaf diagnoses under the three-character category.
    pub fn build(code: &str, long_description: &str, chapter: &str, chapter_number: u32) -> Self {
        let code_len = code.chars().count();
        let is_header = code_len == HEADER_CODE_LEN;
        let parent_code =
            (code_len > HEADER_CODE_LEN).then(|| code.chars().take(HEADER_CODE_LEN).collect());

        Self {
            code: code.to_string(),
            short_title: short_title(long_description),
            long_description: long_description.to_string(),
            chapter: chapter.to_string(),
            chapter_number: Some(chapter_number),
            is_billable: !is_header,
            is_header,
            parent_code,
        }
    }
}

/// First 60 characters of the description with an ellipsis appended when
/// truncation occurred, else the full text verbatim.
pub fn short_title(description: &str) -> String {
    if description.chars().count() <= SHORT_TITLE_MAX_CHARS {
        description.to_string()
    } else {
        let head: String = description.chars().take(SHORT_TITLE_MAX_CHARS).collect();
        format!("{head}...")
    }
}

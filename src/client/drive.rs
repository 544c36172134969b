//! Drive file links.

use serde::{Deserialize, Serialize};

use crate::config::DriveLinkTemplates;

/// Links to one file in the drive provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveLinks {
    /// Opens the file in the provider's viewer.
    pub view_link: String,
    /// Downloads the file.
    pub direct_link: String,
    /// Embeddable preview.
    pub web_preview_link: String,
}

impl DriveLinks {
    /// Derives the links of `file_id` from the configured templates.
    ///
    /// # Example
    ///
    /// ```
    /// use invoice_engine::client::DriveLinks;
    /// use invoice_engine::config::DriveLinkTemplates;
    ///
    /// let links = DriveLinks::for_file(&DriveLinkTemplates::default(), "1AbC");
    /// assert_eq!(links.view_link, "https://drive.google.com/file/d/1AbC/view");
    /// ```
    pub fn for_file(templates: &DriveLinkTemplates, file_id: &str) -> Self {
        let file_id = file_id.trim();
        Self {
            view_link: templates.view.replace("{id}", file_id),
            direct_link: templates.direct.replace("{id}", file_id),
            web_preview_link: templates.web_preview.replace("{id}", file_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_templates() {
        let links = DriveLinks::for_file(&DriveLinkTemplates::default(), "file123");
        assert_eq!(
            links.direct_link,
            "https://drive.google.com/uc?export=download&id=file123"
        );
        assert_eq!(
            links.web_preview_link,
            "https://drive.google.com/file/d/file123/preview"
        );
    }

    #[test]
    fn test_custom_templates_and_trimmed_id() {
        let templates = DriveLinkTemplates {
            view: "https://files.example.com/{id}".to_string(),
            direct: "https://files.example.com/{id}/raw".to_string(),
            web_preview: "https://files.example.com/{id}/embed".to_string(),
        };
        let links = DriveLinks::for_file(&templates, " abc ");
        assert_eq!(links.view_link, "https://files.example.com/abc");
        assert_eq!(links.direct_link, "https://files.example.com/abc/raw");
    }

    #[test]
    fn test_serializes_camel_case() {
        let links = DriveLinks::for_file(&DriveLinkTemplates::default(), "x");
        let json = serde_json::to_value(&links).unwrap();
        assert!(json.get("viewLink").is_some());
        assert!(json.get("webPreviewLink").is_some());
    }
}

use serde::Deserialize;

use crate::config::OutputConfig;
use crate::error::Result;

/// A regulation document as supplied by the championship console.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Document {
    #[serde(default = "default_title")]
    pub title: String,
    pub championship: String,
    pub season: String,
    /// Logo location; resolved by an [`crate::ImageLoader`].
    #[serde(default)]
    pub logo: Option<String>,
    /// Display string for the cover page; the local time is used when absent.
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub order: i64,
}

fn default_title() -> String {
    "Regulamento".to_string()
}

impl Document {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sections sorted by `order`; ties keep their input order.
    pub fn ordered_sections(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self.sections.iter().collect();
        sections.sort_by_key(|section| section.order);
        sections
    }

    pub fn generation_timestamp(&self) -> String {
        match &self.generated_at {
            Some(at) => at.clone(),
            None => chrono::Local::now().format("%d/%m/%Y %H:%M").to_string(),
        }
    }

    pub fn filename(&self, output: &OutputConfig) -> String {
        pdf_filename_with_prefix(&output.filename_prefix, &self.championship, &self.season)
    }
}

/// Replace every character that is not an ASCII letter or digit with `_`.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// `regulamento_<championship>_<season>.pdf`, with both names sanitized and
/// the default [`OutputConfig`] prefix.
pub fn pdf_filename(championship: &str, season: &str) -> String {
    pdf_filename_with_prefix(&OutputConfig::default().filename_prefix, championship, season)
}

pub fn pdf_filename_with_prefix(prefix: &str, championship: &str, season: &str) -> String {
    format!("{prefix}_{}_{}.pdf", sanitize(championship), sanitize(season))
}

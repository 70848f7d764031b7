use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::style::Rgb;

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub page: PageConfig,
    pub fonts: FontConfig,
    pub colors: ColorConfig,
    pub paragraph: ParagraphConfig,
    pub heading: HeadingConfig,
    pub list: ListConfig,
    pub code: CodeConfig,
    pub table: TableConfig,
    pub section: SectionConfig,
    pub cover: CoverConfig,
    pub output: OutputConfig,
}

/// Page geometry in millimetres.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub width: f64,
    pub height: f64,
    /// Left/right margin and the top of every content page.
    pub margin: f64,
    /// A line whose baseline would pass `height - bottom_margin` moves to a new page.
    pub bottom_margin: f64,
    pub numbers: bool,
    /// Distance from the bottom edge to the page-number baseline.
    pub number_offset: f64,
    pub number_size: f64,
    /// `{page}` and `{total}` are replaced with content-page numbers.
    pub number_label: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin: 20.0,
            bottom_margin: 20.0,
            numbers: true,
            number_offset: 10.0,
            number_size: 9.0,
            number_label: "Página {page} de {total}".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Sans families, most preferred first. Text is measured with Helvetica
    /// widths, so metric-compatible families come first.
    pub sans: Vec<String>,
    pub mono: Vec<String>,
    /// Search installed system fonts in addition to the embedded ones.
    pub system: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            sans: vec![
                "Liberation Sans".to_string(),
                "Arial".to_string(),
                "Helvetica".to_string(),
                "DejaVu Sans".to_string(),
            ],
            mono: vec![
                "Liberation Mono".to_string(),
                "Courier New".to_string(),
                "DejaVu Sans Mono".to_string(),
            ],
            system: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub text: Rgb,
    pub primary: Rgb,
    pub muted: Rgb,
    pub code_text: Rgb,
    pub code_background: Rgb,
    pub table_border: Rgb,
    pub table_header_text: Rgb,
    pub table_body: Rgb,
    pub divider: Rgb,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            text: Rgb(51, 51, 51),
            primary: Rgb(41, 128, 185),
            muted: Rgb(128, 128, 128),
            code_text: Rgb(192, 57, 43),
            code_background: Rgb(245, 245, 245),
            table_border: Rgb(200, 200, 200),
            table_header_text: Rgb::WHITE,
            table_body: Rgb::WHITE,
            divider: Rgb(41, 128, 185),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParagraphConfig {
    pub size: f64,
    pub line_height: f64,
    pub spacing_after: f64,
}

impl Default for ParagraphConfig {
    fn default() -> Self {
        Self {
            size: 11.0,
            line_height: 6.0,
            spacing_after: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeadingConfig {
    pub line_height: f64,
    pub spacing_before: f64,
    pub spacing_after: f64,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            line_height: 8.0,
            spacing_before: 3.0,
            spacing_after: 2.0,
        }
    }
}

impl HeadingConfig {
    /// Heading font size in points: `max(12, 16 - 2 * level)`.
    pub fn size(level: u8) -> f64 {
        (16.0 - 2.0 * f64::from(level)).max(12.0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub bullet: String,
    pub bullet_indent: f64,
    pub text_indent: f64,
    pub item_spacing: f64,
    pub spacing_after: f64,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            bullet: "•".to_string(),
            bullet_indent: 5.0,
            text_indent: 10.0,
            item_spacing: 1.0,
            spacing_after: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    pub size: f64,
    pub line_height: f64,
    pub indent: f64,
    pub spacing_after: f64,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            size: 9.0,
            line_height: 5.0,
            indent: 4.0,
            spacing_after: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub size: f64,
    pub row_height: f64,
    pub cell_padding: f64,
    pub border_width: f64,
    pub spacing_after: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            size: 10.0,
            row_height: 8.0,
            cell_padding: 2.0,
            border_width: 0.2,
            spacing_after: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    pub title_size: f64,
    pub title_line_height: f64,
    pub spacing_after_title: f64,
    pub spacing_between: f64,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            title_size: 16.0,
            title_line_height: 9.0,
            spacing_after_title: 4.0,
            spacing_between: 8.0,
        }
    }
}

/// Fixed vertical offsets (mm from the top edge) of the cover page elements.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoverConfig {
    pub logo_y: f64,
    pub logo_size: f64,
    pub title_y: f64,
    pub title_size: f64,
    pub championship_y: f64,
    pub championship_size: f64,
    pub season_y: f64,
    pub season_size: f64,
    pub divider_y: f64,
    pub divider_width: f64,
    pub date_y: f64,
    pub date_size: f64,
    /// `{date}` is replaced with the document's generation timestamp.
    pub date_label: String,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            logo_y: 30.0,
            logo_size: 40.0,
            title_y: 95.0,
            title_size: 24.0,
            championship_y: 115.0,
            championship_size: 18.0,
            season_y: 128.0,
            season_size: 14.0,
            divider_y: 140.0,
            divider_width: 0.5,
            date_y: 152.0,
            date_size: 10.0,
            date_label: "Gerado em: {date}".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub filename_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filename_prefix: "regulamento".to_string(),
        }
    }
}

impl Config {
    /// The defaults shipped in `default_config.toml`.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file, or return defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| Error::Config {
                path: path.to_path_buf(),
                source: e,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                Ok(Self::compiled_default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn shipped_defaults_match_code_defaults() {
        assert_eq!(
            toml::from_str::<Config>(DEFAULT_CONFIG).expect("default config parses"),
            Config::default()
        );
    }

    #[test]
    fn heading_sizes() {
        assert_eq!(HeadingConfig::size(1), 14.0);
        assert_eq!(HeadingConfig::size(2), 12.0);
        assert_eq!(HeadingConfig::size(6), 12.0);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config: Config = toml::from_str(
            "[page]\nmargin = 15.0\n\n[colors]\nprimary = \"#c0392b\"\n",
        )
        .expect("config parses");
        assert_eq!(config.page.margin, 15.0);
        assert_eq!(config.page.width, 210.0);
        assert_eq!(config.colors.primary, Rgb(192, 57, 43));
        assert_eq!(config.colors.text, Rgb(51, 51, 51));
        assert_eq!(crate::layout::Geometry::from(&config.page).content_width(), 180.0);
    }

    #[test]
    fn bad_color_is_rejected() {
        assert!(toml::from_str::<Config>("[colors]\ntext = \"blue\"\n").is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rulebook.toml");
        fs::write(&path, "[page\nwidth = ").expect("write");
        assert!(matches!(Config::load(&path), Err(Error::Config { .. })));
    }
}

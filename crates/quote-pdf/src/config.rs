//! Renderer configuration
//!
//! TOML-based settings for the page format, asset lookup, fonts and issuer
//! defaults. Every field has a default, so an empty file is a valid config.

use anyhow::Context;
use quote_types::IssuerDefaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::layout::{PageGeometry, MM};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Page format of the emitted PDF
    #[serde(default)]
    pub page: PageConfig,
    /// Where the logo is looked up
    #[serde(default)]
    pub assets: AssetConfig,
    /// Font selection
    #[serde(default)]
    pub fonts: FontConfig,
    /// Values printed when the issuer fields are blank
    #[serde(default)]
    pub issuer: IssuerDefaults,
}

impl RenderConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML is malformed
    /// - The page is too small for its margins
    ///
    /// # Example
    ///
    /// ```no_run
    /// use quote_pdf::RenderConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = RenderConfig::from_file("render.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use quote_pdf::RenderConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = RenderConfig::from_str(r#"
    ///     [page]
    ///     margin_mm = 15.0
    ///
    ///     [issuer]
    ///     name = "ACME"
    /// "#)?;
    /// assert_eq!(config.page.width_mm, 210.0);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let page = &self.page;
        anyhow::ensure!(
            page.width_mm > 0.0 && page.height_mm > 0.0,
            "Page dimensions must be positive, got {}x{} mm",
            page.width_mm,
            page.height_mm
        );
        anyhow::ensure!(
            page.margin_mm >= 0.0
                && page.margin_mm * 2.0 < page.width_mm
                && page.margin_mm * 2.0 < page.height_mm,
            "Margin of {} mm leaves no room on a {}x{} mm page",
            page.margin_mm,
            page.width_mm,
            page.height_mm
        );
        Ok(())
    }
}

/// Page format in millimetres
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_width_mm")]
    pub width_mm: f32,
    #[serde(default = "default_height_mm")]
    pub height_mm: f32,
    #[serde(default = "default_margin_mm")]
    pub margin_mm: f32,
}

impl PageConfig {
    /// Page geometry in PDF points
    pub fn geometry(&self) -> PageGeometry {
        PageGeometry {
            width: self.width_mm * MM,
            height: self.height_mm * MM,
            margin: self.margin_mm * MM,
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width_mm: default_width_mm(),
            height_mm: default_height_mm(),
            margin_mm: default_margin_mm(),
        }
    }
}

fn default_width_mm() -> f32 {
    210.0
}

fn default_height_mm() -> f32 {
    297.0
}

fn default_margin_mm() -> f32 {
    20.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Directory the logo candidates are relative to
    #[serde(default = "default_asset_root")]
    pub root: PathBuf,
    /// Tried in order; the first one that reads and decodes wins
    #[serde(default = "default_logo_candidates")]
    pub logo_candidates: Vec<PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: default_asset_root(),
            logo_candidates: default_logo_candidates(),
        }
    }
}

fn default_asset_root() -> PathBuf {
    PathBuf::from("public")
}

fn default_logo_candidates() -> Vec<PathBuf> {
    ["logo.png", "logo.jpg", "logo.jpeg", "logo.svg"]
        .into_iter()
        .map(PathBuf::from)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    /// Bundled family to use when no explicit files are given
    #[serde(default = "default_font_family")]
    pub family: String,
    /// TTF/OTF file for regular text
    #[serde(default)]
    pub regular: Option<PathBuf>,
    /// TTF/OTF file for bold text
    #[serde(default)]
    pub bold: Option<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: default_font_family(),
            regular: None,
            bold: None,
        }
    }
}

fn default_font_family() -> String {
    "Libertinus Serif".to_string()
}

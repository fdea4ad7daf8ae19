//! Style providers: the settings and resources values compute against.

use std::collections::HashMap;

use crate::render::snapshot::Texture;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Environment settings styles are computed with.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Screen resolution in dots per inch.
    pub dpi: f64,
    /// Default font size; points unless `font_size_absolute` is set.
    /// `None` means 10pt.
    pub font_size: Option<f64>,
    /// Whether `font_size` is already in pixels.
    pub font_size_absolute: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dpi: 96.0,
            font_size: None,
            font_size_absolute: false,
        }
    }
}

impl Settings {
    /// Create default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the DPI (builder).
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the default font size in points (builder).
    pub fn with_font_size(mut self, points: f64) -> Self {
        self.font_size = Some(points);
        self.font_size_absolute = false;
        self
    }

    /// Set the default font size in pixels (builder).
    pub fn with_font_size_absolute(mut self, px: f64) -> Self {
        self.font_size = Some(px);
        self.font_size_absolute = true;
        self
    }

    /// The default font size in pixels at `dpi`.
    pub fn default_font_size_px(&self, dpi: f64) -> f64 {
        match self.font_size {
            None => 10.0 * dpi / 72.0,
            Some(px) if self.font_size_absolute => px,
            Some(points) => points * dpi / 72.0,
        }
    }
}

// ---------------------------------------------------------------------------
// StyleProvider
// ---------------------------------------------------------------------------

/// Supplies settings and resolves image URLs for value computation.
pub trait StyleProvider {
    fn settings(&self) -> &Settings;

    /// Load the image at `url`, `None` if it does not exist.
    fn lookup_image(&self, url: &str) -> Option<Texture>;
}

/// A provider with fixed settings and an in-memory image registry.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    settings: Settings,
    images: HashMap<String, Texture>,
}

impl StaticProvider {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            images: HashMap::new(),
        }
    }

    /// Register an image of the given size under `url`.
    pub fn add_image(&mut self, url: impl Into<String>, width: u32, height: u32) {
        let url = url.into();
        let texture = Texture::new(url.as_str(), width, height);
        self.images.insert(url, texture);
    }

    /// Register an image (builder).
    pub fn with_image(mut self, url: impl Into<String>, width: u32, height: u32) -> Self {
        self.add_image(url, width, height);
        self
    }
}

impl StyleProvider for StaticProvider {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn lookup_image(&self, url: &str) -> Option<Texture> {
        self.images.get(url).cloned()
    }
}

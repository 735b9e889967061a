//! Theme module - reader colour scheme

/// An RGB colour, `0xRRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u32);

impl Rgb {
    /// Lowercase `#rrggbb` form
    pub fn hex(self) -> String {
        format!("#{:06x}", self.0 & 0xFF_FFFF)
    }
}

/// Colour scheme for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Toolbar background
    pub toolbar_color: Rgb,
    /// Toolbar title and icons
    pub toolbar_text: Rgb,
    /// Page background
    pub background_color: Rgb,
    /// Progress and selection indicator
    pub indicator_color: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            toolbar_color: Rgb(0x004981),
            toolbar_text: Rgb(0xffffff),
            background_color: Rgb(0xeeeeee),
            indicator_color: Rgb(0x97c024),
        }
    }
}

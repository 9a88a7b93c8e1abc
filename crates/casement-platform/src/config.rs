//! Platform configuration.

/// Platform/runtime configuration.
///
/// `width`/`height` size the default window; `aspect_ratio` is the ratio
/// enforced for aspect-locked windows. `min_width`/`min_height` are the
/// clamps used by the resize policy.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub title: String,

    /// Default window width in physical pixels.
    pub width: u32,

    /// Default window height in physical pixels.
    pub height: u32,

    /// Width:height ratio applied to aspect-locked windows.
    pub aspect_ratio: f32,

    /// Capacity of the window handle table.
    pub max_windows: u16,

    /// Smallest width the resize policy will produce.
    pub min_width: u32,

    /// Smallest height the resize policy will produce.
    pub min_height: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "casement".to_string(),
            width: 1280,
            height: 720,
            aspect_ratio: 16.0 / 9.0,
            max_windows: 8,
            min_width: 1280 / 4,
            min_height: 720 / 4,
        }
    }
}

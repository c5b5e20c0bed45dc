//! Configuration module

mod site;

pub use site::ColorMode;
pub use site::HighlightConfig;
pub use site::Palette;
pub use site::Palettes;
pub use site::SiteConfig;
pub use site::ThemeConfig;

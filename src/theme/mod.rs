//! Theme module - page styling values and static assets
//!
//! Styling is an explicit [`Theme`] value inserted into the render context
//! of every page.

mod loader;

pub use loader::AssetLoader;

use serde::Serialize;

use crate::config::{ColorMode, Palette, SiteConfig};
use crate::helpers::url_for;

/// Styling passed to every template
#[derive(Debug, Clone, Serialize)]
pub struct Theme {
    /// Prefix of every CSS class name
    pub css_prefix: String,
    pub color_mode: ColorMode,
    pub light: Palette,
    pub dark: Palette,
    /// Navigation links with the site root applied
    pub menu: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub name: String,
    pub path: String,
}

impl Theme {
    pub fn from_config(config: &SiteConfig) -> Self {
        let theme = &config.theme;
        Self {
            css_prefix: theme.css_prefix.clone(),
            color_mode: theme.color_mode,
            light: theme.palette.light.clone(),
            dark: theme.palette.dark.clone(),
            menu: config
                .menu
                .iter()
                .map(|(name, path)| MenuItem {
                    name: name.clone(),
                    path: url_for(config, path),
                })
                .collect(),
        }
    }
}

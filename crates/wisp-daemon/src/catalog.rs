//! Store and theme catalogs behind the REST surface.

use wisp_types::{StorePlugin, Theme};

/// Source of store plugins and themes
pub trait Catalog: Send + Sync {
    fn store_plugins(&self) -> Vec<StorePlugin>;

    fn store_themes(&self) -> Vec<Theme>;

    fn installed_themes(&self) -> Vec<Theme>;
}

pub const DEFAULT_THEME_ID: &str = "default";

/// Offline catalog: an empty store and the bundled default theme
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinCatalog;

impl BuiltinCatalog {
    fn default_theme() -> Theme {
        Theme {
            theme_id: DEFAULT_THEME_ID.to_string(),
            theme_name: "Default".to_string(),
            theme_author: "Wisp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            is_installed: true,
        }
    }
}

impl Catalog for BuiltinCatalog {
    fn store_plugins(&self) -> Vec<StorePlugin> {
        Vec::new()
    }

    fn store_themes(&self) -> Vec<Theme> {
        vec![Self::default_theme()]
    }

    fn installed_themes(&self) -> Vec<Theme> {
        vec![Self::default_theme()]
    }
}

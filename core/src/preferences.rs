//! Player preferences. Stored apart from the game save and never
//! touched by a reset.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssetVariant {
    #[default]
    PixelArt,
    Vector,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "PreferencesDocument")]
pub struct Preferences {
    pub muted_music: bool,
    pub muted_sfx: bool,
    pub theme: Theme,
    pub asset_variant: AssetVariant,
}

/// Accepted input shape. Older documents stored the theme as a
/// `darkMode` flag and the asset variant as `usePixelArt`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PreferencesDocument {
    #[serde(alias = "mutedMusic")]
    muted_music: Option<bool>,
    #[serde(alias = "mutedSFX")]
    muted_sfx: Option<bool>,
    theme: Option<Theme>,
    #[serde(alias = "darkMode")]
    dark_mode: Option<bool>,
    asset_variant: Option<AssetVariant>,
    #[serde(alias = "usePixelArt")]
    use_pixel_art: Option<bool>,
}

impl From<PreferencesDocument> for Preferences {
    fn from(doc: PreferencesDocument) -> Self {
        let theme = doc
            .theme
            .or(doc.dark_mode.map(|dark| if dark { Theme::Dark } else { Theme::Light }))
            .unwrap_or_default();
        let asset_variant = doc
            .asset_variant
            .or(doc.use_pixel_art.map(|pixel| {
                if pixel {
                    AssetVariant::PixelArt
                } else {
                    AssetVariant::Vector
                }
            }))
            .unwrap_or_default();
        Self {
            muted_music: doc.muted_music.unwrap_or(false),
            muted_sfx: doc.muted_sfx.unwrap_or(false),
            theme,
            asset_variant,
        }
    }
}

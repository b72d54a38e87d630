#![forbid(unsafe_code)]

//! Modal configuration.
//!
//! [`ModalConfig`] holds every recognized option with the documented
//! defaults, so `ModalConfig::default()` is what an unconfigured modal uses.
//!
//! # Loading
//!
//! ```toml
//! # modal.toml
//! fade = false
//! backdrop = true
//! position = "center"
//! transition_duration = 250          # milliseconds
//! backdrop_transition_duration = 100 # milliseconds
//! ```
//!
//! ```rust,ignore
//! let config = ModalConfig::from_toml_file("modal.toml")?;
//! let config = ModalConfig::from_json_str(json)?;
//! ```
//!
//! Loading is available with the `config` feature and always validates.

#[cfg(feature = "config")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::RenderContext;

/// Upper bound accepted for any transition duration.
pub const MAX_TRANSITION_DURATION: Duration = Duration::from_secs(60);

/// Vertical placement of the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum DialogPosition {
    #[default]
    Top,
    Center,
}

/// Recognized modal options.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ModalConfig {
    /// Fade animations. `None` means "on, unless the page is a
    /// non-interactive rendering context".
    pub fade: Option<bool>,
    /// Render a backdrop behind the dialog.
    pub backdrop: bool,
    /// Clicking the backdrop closes the modal.
    pub backdrop_close: bool,
    /// Escape closes the modal.
    pub keyboard: bool,
    pub position: DialogPosition,
    /// Scroll inside the dialog body instead of the page.
    pub scrollable: bool,
    /// Dialog fade duration.
    #[cfg_attr(feature = "config", serde(with = "duration_ms"))]
    pub transition_duration: Duration,
    /// Backdrop fade duration; may differ from the dialog's.
    #[cfg_attr(feature = "config", serde(with = "duration_ms"))]
    pub backdrop_transition_duration: Duration,
    /// Render where declared instead of in the shared destination element.
    pub render_in_place: bool,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            fade: None,
            backdrop: true,
            backdrop_close: true,
            keyboard: true,
            position: DialogPosition::Top,
            scrollable: false,
            transition_duration: Duration::from_millis(300),
            backdrop_transition_duration: Duration::from_millis(150),
            render_in_place: false,
        }
    }
}

impl ModalConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set fade explicitly, overriding the context default.
    pub fn fade(mut self, fade: bool) -> Self {
        self.fade = Some(fade);
        self
    }

    pub fn backdrop(mut self, backdrop: bool) -> Self {
        self.backdrop = backdrop;
        self
    }

    pub fn backdrop_close(mut self, close: bool) -> Self {
        self.backdrop_close = close;
        self
    }

    pub fn keyboard(mut self, keyboard: bool) -> Self {
        self.keyboard = keyboard;
        self
    }

    pub fn position(mut self, position: DialogPosition) -> Self {
        self.position = position;
        self
    }

    pub fn scrollable(mut self, scrollable: bool) -> Self {
        self.scrollable = scrollable;
        self
    }

    pub fn transition_duration(mut self, duration: Duration) -> Self {
        self.transition_duration = duration;
        self
    }

    pub fn backdrop_transition_duration(mut self, duration: Duration) -> Self {
        self.backdrop_transition_duration = duration;
        self
    }

    pub fn render_in_place(mut self, in_place: bool) -> Self {
        self.render_in_place = in_place;
        self
    }

    /// Effective fade flag for the given rendering context.
    pub fn resolved_fade(&self, context: RenderContext) -> bool {
        self.fade.unwrap_or(!context.is_static())
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.transition_duration > MAX_TRANSITION_DURATION {
            errors.push(format!(
                "transition_duration must be at most {}ms, got {}ms",
                MAX_TRANSITION_DURATION.as_millis(),
                self.transition_duration.as_millis()
            ));
        }

        if self.backdrop_transition_duration > MAX_TRANSITION_DURATION {
            errors.push(format!(
                "backdrop_transition_duration must be at most {}ms, got {}ms",
                MAX_TRANSITION_DURATION.as_millis(),
                self.backdrop_transition_duration.as_millis()
            ));
        }

        errors
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Serialize to a TOML string.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::TomlSerialize)
    }

    #[cfg(feature = "config")]
    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors raised while loading a [`ModalConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read modal config: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "config")]
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[cfg(feature = "config")]
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(toml::ser::Error),
    #[cfg(feature = "config")]
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid modal config: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(feature = "config")]
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

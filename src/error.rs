//! Client error type

use std::fmt;

use crate::scene::SceneError;

/// Errors surfaced by the client outside the per-frame draw calls
///
/// SDL2 reports its own failures as plain strings, so those are carried
/// through the `Sdl` variant rather than wrapped in a richer type.
#[derive(Debug)]
pub enum ClientError {
    /// Reading a config, manifest or scenario file failed
    Io(std::io::Error),

    /// A config, manifest or scenario file is not valid JSON for its type
    Json(serde_json::Error),

    /// SDL2 call failed
    Sdl(String),

    /// A sprite the client cannot run without is not in the asset catalog
    MissingAsset(String),

    /// `update_ui` was called before `draw_ui` built the widgets
    UiNotDrawn,

    /// The scene's layer registry and child list disagree
    Scene(SceneError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Io(e) => write!(f, "IO error: {}", e),
            ClientError::Json(e) => write!(f, "JSON error: {}", e),
            ClientError::Sdl(msg) => write!(f, "SDL error: {}", msg),
            ClientError::MissingAsset(name) => write!(f, "Missing sprite asset: {}", name),
            ClientError::UiNotDrawn => write!(f, "UI widgets have not been drawn yet"),
            ClientError::Scene(e) => write!(f, "Scene error: {}", e),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Json(err)
    }
}

impl From<SceneError> for ClientError {
    fn from(err: SceneError) -> Self {
        ClientError::Scene(err)
    }
}

impl From<String> for ClientError {
    fn from(msg: String) -> Self {
        ClientError::Sdl(msg)
    }
}

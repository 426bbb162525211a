//! Start-up settings.
//!
//! Every field has a default, so the demo runs without any file. A JSON file
//! may override any subset of fields.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "meshfly.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Multisample count, 0 disables multisampling.
    pub samples: u8,
    pub clear_color: [f32; 4],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Hello world".to_string(),
            width: 1024,
            height: 768,
            vsync: true,
            samples: 4,
            clear_color: [0.0, 0.0, 0.4, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub object: PathBuf,
    /// Diffuse texture; a generated checkerboard is used when absent.
    pub texture: Option<PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            vertex_shader: PathBuf::from("shaders/SimpleVertexShader.vert"),
            fragment_shader: PathBuf::from("shaders/SimpleFragmentShader.frag"),
            object: PathBuf::from("objects/cube.obj"),
            texture: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub look_at: [f32; 3],
    pub fov_degrees: f32,
    /// Units per second.
    pub speed: f32,
    /// Radians per pixel of mouse motion.
    pub mouse_speed: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [4.0, 3.0, 3.0],
            look_at: [1.0, 1.0, 0.0],
            fov_degrees: 45.0,
            speed: 3.0,
            mouse_speed: 0.005,
            z_near: 0.1,
            z_far: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub camera: CameraConfig,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    /// Seconds between frame time reports, 0 disables them.
    pub stats_interval: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets: AssetConfig::default(),
            camera: CameraConfig::default(),
            log_level: "info".to_string(),
            log_file: None,
            stats_interval: 1.0,
        }
    }
}

impl std::str::FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Config {
    /// Reads a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        text.parse()
    }

    /// Loads the first configuration found, or the defaults when there is none.
    ///
    /// Search order: an explicit `--config <path>` argument (which must exist),
    /// `meshfly.json` in the working directory, then the user config directory.
    pub fn discover(args: impl IntoIterator<Item = String>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = config_arg(args) {
            return Ok((Self::load(&path)?, Some(path)));
        }

        let candidates = [
            Some(PathBuf::from(CONFIG_FILE_NAME)),
            dirs::config_dir().map(|dir| dir.join("meshfly").join("config.json")),
        ];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                return Ok((Self::load(&path)?, Some(path)));
            }
        }

        Ok((Self::default(), None))
    }
}

/// Finds `--config <path>` or `--config=<path>` among the arguments.
fn config_arg(args: impl IntoIterator<Item = String>) -> Option<PathBuf> {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults_reproduce_hello_world() {
        let config = Config::default();
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 768);
        assert_eq!(config.window.title, "Hello world");
        assert_eq!(config.assets.object, PathBuf::from("objects/cube.obj"));
        assert_eq!(config.camera.fov_degrees, 45.0);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config: Config = r#"{
            "window": { "width": 800, "vsync": false },
            "assets": { "texture": "textures/uv.png" },
            "log_level": "debug"
        }"#
        .parse()
        .unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 768);
        assert!(!config.window.vsync);
        assert_eq!(config.assets.texture, Some(PathBuf::from("textures/uv.png")));
        assert_eq!(
            config.assets.vertex_shader,
            PathBuf::from("shaders/SimpleVertexShader.vert")
        );
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let err = "{ \"window\": { \"width\": \"wide\" } }"
            .parse::<Config>()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_argument_forms() {
        assert_eq!(
            config_arg(args(&["meshfly", "--config", "a.json"])),
            Some(PathBuf::from("a.json"))
        );
        assert_eq!(
            config_arg(args(&["meshfly", "--config=b.json"])),
            Some(PathBuf::from("b.json"))
        );
        assert_eq!(config_arg(args(&["meshfly"])), None);
        assert_eq!(config_arg(args(&["meshfly", "--config"])), None);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = Config::discover(args(&["meshfly", "--config", "no/such/meshfly.json"]))
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let path =
            std::env::temp_dir().join(format!("meshfly-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "stats_interval": 0.0 }"#).unwrap();
        let (config, found) =
            Config::discover(args(&["meshfly", "--config", path.to_str().unwrap()])).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(found, Some(path));
        assert_eq!(config.stats_interval, 0.0);
    }
}

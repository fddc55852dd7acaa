//! Plot configuration for gnuplot3d.
//!
//! This module provides:
//! - A validated [`PlotConfig`] built from caller-supplied [`PlotOptions`]
//! - Per-platform defaults for the gnuplot executable and terminal
//! - TOML configuration file loading from `~/.gnuplot3d/config.toml`
//!
//! # Configuration File
//!
//! The configuration file is located at `~/.gnuplot3d/config.toml`:
//!
//! ```toml
//! # gnuplot binary (optional, platform default otherwise)
//! gnuplot = "/usr/bin/gnuplot"
//!
//! # Terminal kind gnuplot renders to
//! term = "qt"
//!
//! width = 300
//! height = 400
//!
//! xrange = [-1.0, 1.0]
//! yrange = [-1.0, 1.0]
//! zrange = [0, 10]
//!
//! # Leave the gnuplot window open after the session ends
//! persist = true
//! ```
//!
//! Every value is checked before a session can be built from it. A file that
//! exists but does not validate is an error, never a silent fallback.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder that older configs used for an unresolved executable or terminal.
pub const MISSING: &str = "missing";

const DEFAULT_WIDTH: u32 = 300;
const DEFAULT_HEIGHT: u32 = 400;
const DEFAULT_RANGE: AxisRange = AxisRange {
    low: -1.0,
    high: 1.0,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no default {key} for platform '{os}'; set it explicitly")]
    UnsupportedPlatform { key: &'static str, os: String },

    #[error("option '{key}' must be a non-empty name other than \"missing\"")]
    Missing { key: &'static str },

    #[error("option '{key}' must be a positive pixel count, got {value}")]
    InvalidDimension { key: &'static str, value: u32 },

    #[error("option '{key}' is not a valid axis range: {reason}")]
    InvalidRange { key: &'static str, reason: String },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// One of the three spatial axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in the order gnuplot is configured
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Lowercase axis letter
    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }

    /// Option key holding this axis' range
    pub fn range_key(self) -> &'static str {
        match self {
            Axis::X => "xrange",
            Axis::Y => "yrange",
            Axis::Z => "zrange",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Displayed extent along one axis, written as `[low, high]` in TOML
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct AxisRange {
    pub low: f64,
    pub high: f64,
}

impl AxisRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    fn validate(&self, key: &'static str) -> Result<()> {
        for (end, value) in [("low", self.low), ("high", self.high)] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidRange {
                    key,
                    reason: format!("{} bound {} is not a finite number", end, value),
                });
            }
        }
        Ok(())
    }
}

impl Default for AxisRange {
    fn default() -> Self {
        DEFAULT_RANGE
    }
}

impl From<[f64; 2]> for AxisRange {
    fn from([low, high]: [f64; 2]) -> Self {
        Self { low, high }
    }
}

impl From<AxisRange> for [f64; 2] {
    fn from(range: AxisRange) -> Self {
        [range.low, range.high]
    }
}

impl From<(f64, f64)> for AxisRange {
    fn from((low, high): (f64, f64)) -> Self {
        Self { low, high }
    }
}

/// Executable and terminal gnuplot uses on one platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDefaults {
    pub executable: &'static str,
    pub terminal: &'static str,
}

/// Known platforms, keyed by `std::env::consts::OS`
const PLATFORM_DEFAULTS: &[(&str, PlatformDefaults)] = &[
    (
        "linux",
        PlatformDefaults {
            executable: "/usr/local/bin/gnuplot",
            terminal: "wxt",
        },
    ),
    (
        "macos",
        PlatformDefaults {
            executable: "/usr/local/bin/gnuplot",
            terminal: "qt",
        },
    ),
    (
        "windows",
        PlatformDefaults {
            executable: "gnuplot.exe",
            terminal: "wxt",
        },
    ),
];

/// Look up the gnuplot defaults for a platform name
pub fn platform_defaults(os: &str) -> Option<PlatformDefaults> {
    PLATFORM_DEFAULTS
        .iter()
        .find(|(name, _)| *name == os)
        .map(|(_, defaults)| *defaults)
}

/// Caller-supplied overrides; anything left `None` takes the default
///
/// Deserializes from the config file format. Values are only type-checked
/// here; [`PlotConfig::new`] does the rest of the validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotOptions {
    #[serde(rename = "gnuplot")]
    pub executable: Option<String>,
    #[serde(rename = "term")]
    pub terminal: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub xrange: Option<AxisRange>,
    pub yrange: Option<AxisRange>,
    pub zrange: Option<AxisRange>,
    pub persist: Option<bool>,
}

impl PlotOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executable(mut self, path: impl Into<String>) -> Self {
        self.executable = Some(path.into());
        self
    }

    pub fn terminal(mut self, kind: impl Into<String>) -> Self {
        self.terminal = Some(kind.into());
        self
    }

    /// Window size in pixels
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn range(mut self, axis: Axis, range: impl Into<AxisRange>) -> Self {
        *self.range_slot(axis) = Some(range.into());
        self
    }

    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = Some(persist);
        self
    }

    fn range_slot(&mut self, axis: Axis) -> &mut Option<AxisRange> {
        match axis {
            Axis::X => &mut self.xrange,
            Axis::Y => &mut self.yrange,
            Axis::Z => &mut self.zrange,
        }
    }

    /// Overlay `other` on top of `self`; values set in `other` win
    pub fn merge(self, other: PlotOptions) -> Self {
        Self {
            executable: other.executable.or(self.executable),
            terminal: other.terminal.or(self.terminal),
            width: other.width.or(self.width),
            height: other.height.or(self.height),
            xrange: other.xrange.or(self.xrange),
            yrange: other.yrange.or(self.yrange),
            zrange: other.zrange.or(self.zrange),
            persist: other.persist.or(self.persist),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load options from the user config file; a missing file means no overrides
    pub fn load() -> Result<Self> {
        match PlotConfig::get_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

fn validate_name(key: &'static str, value: &str) -> Result<()> {
    if value.is_empty() || value == MISSING {
        return Err(ConfigError::Missing { key });
    }
    Ok(())
}

fn validate_dimension(key: &'static str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(ConfigError::InvalidDimension { key, value: 0 });
    }
    Ok(())
}

/// Validated plot configuration
///
/// The only way to get one is through [`PlotConfig::new`] (or the helpers that
/// call it), so a `PlotConfig` in hand is always safe to launch with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotConfig {
    /// Path of the gnuplot binary
    #[serde(rename = "gnuplot")]
    executable: String,
    /// gnuplot terminal kind (wxt, qt, x11, ...)
    #[serde(rename = "term")]
    terminal: String,
    width: u32,
    height: u32,
    xrange: AxisRange,
    yrange: AxisRange,
    zrange: AxisRange,
    /// Keep gnuplot alive after the session ends
    persist: bool,
}

impl PlotConfig {
    /// Merge `options` over the defaults for the running platform and validate
    pub fn new(options: PlotOptions) -> Result<Self> {
        Self::for_platform(std::env::consts::OS, options)
    }

    /// Merge `options` over the defaults for platform `os` and validate
    pub fn for_platform(os: &str, options: PlotOptions) -> Result<Self> {
        let defaults = platform_defaults(os);
        let unsupported = |key| ConfigError::UnsupportedPlatform {
            key,
            os: os.to_string(),
        };

        let executable = match options.executable {
            Some(path) => path,
            None => defaults
                .map(|d| d.executable.to_string())
                .ok_or_else(|| unsupported("gnuplot"))?,
        };
        let terminal = match options.terminal {
            Some(kind) => kind,
            None => defaults
                .map(|d| d.terminal.to_string())
                .ok_or_else(|| unsupported("term"))?,
        };

        let config = Self {
            executable: executable.trim().to_string(),
            terminal: terminal.trim().to_string(),
            width: options.width.unwrap_or(DEFAULT_WIDTH),
            height: options.height.unwrap_or(DEFAULT_HEIGHT),
            xrange: options.xrange.unwrap_or_default(),
            yrange: options.yrange.unwrap_or_default(),
            zrange: options.zrange.unwrap_or_default(),
            persist: options.persist.unwrap_or(true),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        validate_name("gnuplot", &self.executable)?;
        validate_name("term", &self.terminal)?;
        validate_dimension("width", self.width)?;
        validate_dimension("height", self.height)?;
        for axis in Axis::ALL {
            self.range(axis).validate(axis.range_key())?;
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::new(PlotOptions::from_toml_str(content)?)
    }

    /// Load the user config file, falling back to defaults when it is absent
    pub fn load() -> Result<Self> {
        Self::new(PlotOptions::load()?)
    }

    /// Render as TOML in the config file format
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get config file path
    pub fn get_config_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".gnuplot3d").join("config.toml"))
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn terminal(&self) -> &str {
        &self.terminal
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn range(&self, axis: Axis) -> AxisRange {
        match axis {
            Axis::X => self.xrange,
            Axis::Y => self.yrange,
            Axis::Z => self.zrange,
        }
    }

    pub fn persist(&self) -> bool {
        self.persist
    }
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn linux(options: PlotOptions) -> Result<PlotConfig> {
        PlotConfig::for_platform("linux", options)
    }

    #[test]
    fn test_linux_defaults() {
        let config = linux(PlotOptions::default()).unwrap();

        assert_eq!(config.executable(), "/usr/local/bin/gnuplot");
        assert_eq!(config.terminal(), "wxt");
        assert_eq!((config.width(), config.height()), (300, 400));
        for axis in Axis::ALL {
            assert_eq!(config.range(axis), AxisRange::new(-1.0, 1.0));
        }
        assert!(config.persist());
    }

    #[test]
    fn test_options_override_defaults() {
        let options = PlotOptions::new()
            .executable("/opt/gnuplot/bin/gnuplot")
            .terminal("qt")
            .size(640, 480)
            .range(Axis::Z, (0.0, 10.0))
            .persist(false);
        let config = linux(options).unwrap();

        assert_eq!(config.executable(), "/opt/gnuplot/bin/gnuplot");
        assert_eq!(config.terminal(), "qt");
        assert_eq!((config.width(), config.height()), (640, 480));
        assert_eq!(config.range(Axis::X), AxisRange::new(-1.0, 1.0));
        assert_eq!(config.range(Axis::Z), AxisRange::new(0.0, 10.0));
        assert!(!config.persist());
    }

    #[test]
    fn test_unsupported_platform() {
        let err = PlotConfig::for_platform("plan9", PlotOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedPlatform { key: "gnuplot", ref os } if os == "plan9"
        ));

        // Only the terminal is left to resolve
        let err = PlotConfig::for_platform("plan9", PlotOptions::new().executable("gnuplot"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedPlatform { key: "term", .. }));

        let config = PlotConfig::for_platform(
            "plan9",
            PlotOptions::new().executable("gnuplot").terminal("dumb"),
        )
        .unwrap();
        assert_eq!(config.terminal(), "dumb");
    }

    #[test]
    fn test_missing_names_rejected() {
        for bad in ["", "   ", MISSING, " missing "] {
            let err = linux(PlotOptions::new().executable(bad)).unwrap_err();
            assert!(matches!(err, ConfigError::Missing { key: "gnuplot" }), "{:?}", bad);

            let err = linux(PlotOptions::new().terminal(bad)).unwrap_err();
            assert!(matches!(err, ConfigError::Missing { key: "term" }), "{:?}", bad);
        }
    }

    #[test]
    fn test_names_are_trimmed() {
        let config = linux(PlotOptions::new().executable(" cat ").terminal("qt\n")).unwrap();
        assert_eq!(config.executable(), "cat");
        assert_eq!(config.terminal(), "qt");
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = linux(PlotOptions::new().size(0, 400)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDimension { key: "width", value: 0 }));
    }

    #[test]
    fn test_non_finite_range_rejected() {
        let err = linux(PlotOptions::new().range(Axis::Y, (f64::NAN, 1.0))).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { key: "yrange", .. }));

        let err = linux(PlotOptions::new().range(Axis::X, (0.0, f64::INFINITY))).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { .. }));
    }

    #[test]
    fn test_toml_options() {
        let options = PlotOptions::from_toml_str(
            r#"
            gnuplot = "/usr/bin/gnuplot"
            term = "x11"
            width = 800
            height = 600
            xrange = [0, 5]
            zrange = [-2.5, 2.5]
            persist = false
            "#,
        )
        .unwrap();

        assert_eq!(options.executable.as_deref(), Some("/usr/bin/gnuplot"));
        assert_eq!(options.terminal.as_deref(), Some("x11"));
        assert_eq!(options.width, Some(800));
        assert_eq!(options.height, Some(600));
        assert_eq!(options.xrange, Some(AxisRange::new(0.0, 5.0)));
        assert_eq!(options.yrange, None);
        assert_eq!(options.zrange, Some(AxisRange::new(-2.5, 2.5)));
        assert_eq!(options.persist, Some(false));
    }

    #[test]
    fn test_toml_wrong_types() {
        for bad in [
            r#"width = "wide""#,
            "height = 400.5",
            "width = -5",
            "gnuplot = 1",
            "term = [\"wxt\"]",
            r#"persist = "yes""#,
        ] {
            let err = PlotOptions::from_toml_str(bad).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "{} gave {:?}", bad, err);
        }
    }

    #[test]
    fn test_toml_range_shapes() {
        for bad in [
            "xrange = 1.0",
            "xrange = [1.0]",
            "xrange = [1.0, 2.0, 3.0]",
            r#"xrange = ["a", 1.0]"#,
            "xrange = [true, 1.0]",
        ] {
            let err = PlotOptions::from_toml_str(bad).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "{} gave {:?}", bad, err);
        }

        // Parses as a pair but cannot be plotted
        let err = PlotConfig::for_platform(
            "linux",
            PlotOptions::from_toml_str("zrange = [nan, 1.0]").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { key: "zrange", .. }));
    }

    #[test]
    fn test_toml_unknown_key() {
        let err = PlotOptions::from_toml_str("colour = \"red\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("colour"), "{}", err);
    }

    #[test]
    fn test_merge_prefers_later_options() {
        let file = PlotOptions::new().terminal("qt").size(100, 100);
        let cli = PlotOptions::new().terminal("wxt").persist(false);
        let merged = file.merge(cli);

        assert_eq!(merged.terminal.as_deref(), Some("wxt"));
        assert_eq!(merged.width, Some(100));
        assert_eq!(merged.persist, Some(false));
    }

    #[test]
    fn test_toml_zero_width_fails_validation() {
        // Well-typed, so it parses; the pixel check belongs to PlotConfig
        let options = PlotOptions::from_toml_str("width = 0").unwrap();
        let err = linux(options).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDimension { key: "width", value: 0 }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "term = \"dumb\"\nwidth = 120").unwrap();

        let options = PlotOptions::load_from(file.path()).unwrap();
        assert_eq!(options.terminal.as_deref(), Some("dumb"));
        assert_eq!(options.width, Some(120));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let options = PlotOptions::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(options, PlotOptions::default());
    }

    #[test]
    fn test_load_from_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "width = [").unwrap();

        let err = PlotOptions::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_to_toml_round_trips_through_validation() {
        let config = linux(PlotOptions::new().range(Axis::Y, (0.0, 2.0))).unwrap();
        let text = config.to_toml_string().unwrap();

        assert!(text.contains("gnuplot = \"/usr/local/bin/gnuplot\""));
        assert!(text.contains("term = \"wxt\""));

        let reparsed = linux(PlotOptions::from_toml_str(&text).unwrap()).unwrap();
        assert_eq!(reparsed, config);
    }
}

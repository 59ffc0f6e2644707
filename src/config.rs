//! 配置
//!
//! 优先级：命令行 > 配置文件 > 默认值。配置文件是可选的 TOML。

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::translator::Divisors;
use crate::virtual_pointer::DeviceIdentity;

pub const DEFAULT_SOURCE: &str = "/dev/input/event1";
pub const DEFAULT_SINK: &str = "/dev/uinput";
/// 等系统枚举到新设备
pub const DEFAULT_SETTLE_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("divisor for the {axis} axis must not be zero")]
    ZeroDivisor { axis: char },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub devices: DevicesConfig,
    pub translation: TranslationConfig,
    pub virtual_device: DeviceIdentity,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevicesConfig {
    /// 触摸屏的 evdev 节点
    pub source: PathBuf,
    /// uinput 控制节点
    pub sink: PathBuf,
    /// 独占触摸屏
    pub grab: bool,
    pub settle_ms: u64,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE),
            sink: PathBuf::from(DEFAULT_SINK),
            grab: false,
            settle_ms: DEFAULT_SETTLE_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslationConfig {
    pub divisor_x: i32,
    pub divisor_y: i32,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            divisor_x: Divisors::DEFAULT_X,
            divisor_y: Divisors::DEFAULT_Y,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn divisors(&self) -> Result<Divisors, ConfigError> {
        Divisors::new(self.translation.divisor_x, self.translation.divisor_y)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.devices.settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.devices.source, PathBuf::from("/dev/input/event1"));
        assert_eq!(config.devices.sink, PathBuf::from("/dev/uinput"));
        assert_eq!(config.divisors().unwrap(), Divisors::default());
        assert_eq!(config.settle(), Duration::from_secs(1));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::parse(
            r#"
            [devices]
            source = "/dev/input/by-id/usb-touch-event"
            grab = true

            [translation]
            divisor_y = 12

            [virtual_device]
            name = "panel mouse"
            vendor_id = 0x1d6b
            "#,
        )
        .unwrap();

        assert_eq!(
            config.devices.source,
            PathBuf::from("/dev/input/by-id/usb-touch-event")
        );
        assert!(config.devices.grab);
        assert_eq!(config.devices.sink, PathBuf::from(DEFAULT_SINK));
        assert_eq!(config.translation.divisor_x, 16);
        assert_eq!(config.translation.divisor_y, 12);
        assert_eq!(config.virtual_device.name, "panel mouse");
        assert_eq!(config.virtual_device.vendor_id, 0x1d6b);
        assert_eq!(config.virtual_device.product_id, 0x5678);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("[translation]\nacceleration = 2\n").is_err());
    }

    #[test]
    fn zero_divisor_fails_validation() {
        let config = Config::parse("[translation]\ndivisor_x = 0\n").unwrap();
        assert!(matches!(
            config.divisors(),
            Err(ConfigError::ZeroDivisor { axis: 'x' })
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[devices]\nsettle_ms = 250").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.settle(), Duration::from_millis(250));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("touchmouse.toml");
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[devices").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}

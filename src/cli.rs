use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::{Config, ConfigError};

/// Use a touchscreen as a relative mouse
#[derive(Parser, Debug, Default)]
#[command(name = "touchmouse", version, about, long_about = None)]
pub struct Cli {
    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Touchscreen evdev node [default: /dev/input/event1]
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// uinput control node [default: /dev/uinput]
    #[arg(long)]
    pub sink: Option<PathBuf>,

    /// Horizontal divisor [default: 16]
    #[arg(long, allow_negative_numbers = true)]
    pub divisor_x: Option<i32>,

    /// Vertical divisor [default: 9]
    #[arg(long, allow_negative_numbers = true)]
    pub divisor_y: Option<i32>,

    /// Delay after creating the virtual device, in milliseconds [default: 1000]
    #[arg(long)]
    pub settle_ms: Option<u64>,

    /// Grab the touchscreen exclusively
    #[arg(short, long)]
    pub grab: bool,

    /// Name of the virtual pointer
    #[arg(long)]
    pub name: Option<String>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// 读配置文件（如果有），再用命令行覆盖
    pub fn resolve(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        self.apply(&mut config);
        config.divisors()?;
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        if let Some(source) = &self.source {
            config.devices.source = source.clone();
        }
        if let Some(sink) = &self.sink {
            config.devices.sink = sink.clone();
        }
        if let Some(divisor_x) = self.divisor_x {
            config.translation.divisor_x = divisor_x;
        }
        if let Some(divisor_y) = self.divisor_y {
            config.translation.divisor_y = divisor_y;
        }
        if let Some(settle_ms) = self.settle_ms {
            config.devices.settle_ms = settle_ms;
        }
        if self.grab {
            config.devices.grab = true;
        }
        if let Some(name) = &self.name {
            config.virtual_device.name = name.clone();
        }
    }
}

use std::io;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::event_model::{OutputEvent, codes};

/// uinput 虚拟鼠标
pub mod uinput;

pub use uinput::UinputSink;

/// 虚拟设备会发出的按键和两个相对轴
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub click_button: u16,
    pub axis_x: u16,
    pub axis_y: u16,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            click_button: codes::BTN_LEFT,
            axis_x: codes::REL_X,
            axis_y: codes::REL_Y,
        }
    }
}

/// 注册到系统里的设备身份
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceIdentity {
    pub name: String,
    pub bus_type: u16,
    pub vendor_id: u16,
    pub product_id: u16,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            name: "touchmouse virtual pointer".to_string(),
            bus_type: codes::BUS_USB,
            vendor_id: 0x1234,
            product_id: 0x5678,
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open uinput at {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to declare virtual device capabilities")]
    Declare(#[source] io::Error),
    #[error("capabilities must be declared before the device is created")]
    NotDeclared,
    #[error("virtual device already created")]
    AlreadyCreated,
    #[error("failed to create the virtual device")]
    Create(#[source] io::Error),
    #[error("failed to write an event to the virtual device")]
    Write(#[source] io::Error),
    #[error("virtual device is gone")]
    Gone,
}

impl SinkError {
    /// 只有单次写失败可以忽略
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SinkError::Write(_))
    }
}

/// 虚拟鼠标
///
/// 调用顺序固定：`declare_capabilities` → `create` → `emit`... → `destroy`。
/// `destroy` 在任何状态下都可以调用，包括 `create` 失败或者根本没调用过。
pub trait PointerSink {
    fn declare_capabilities(&mut self, capabilities: &Capabilities) -> Result<(), SinkError>;

    fn create(&mut self, identity: &DeviceIdentity) -> Result<(), SinkError>;

    fn emit(&mut self, event: &OutputEvent) -> Result<(), SinkError>;

    fn destroy(&mut self);
}

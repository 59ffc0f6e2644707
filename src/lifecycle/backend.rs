use std::path::Path;

use nix::unistd::geteuid;

use crate::input_devices::{EventSource, SourceError, TouchSource};
use crate::virtual_pointer::{PointerSink, SinkError, UinputSink};

/// 控制器和操作系统之间的接缝：权限检查和两个设备的打开
pub trait Backend {
    type Source: EventSource;
    type Sink: PointerSink;

    fn is_privileged(&self) -> bool;

    fn open_source(&self, path: &Path) -> Result<Self::Source, SourceError>;

    fn open_sink(&self, path: &Path) -> Result<Self::Sink, SinkError>;
}

/// evdev + uinput
#[derive(Debug, Clone, Default)]
pub struct EvdevBackend {
    pub grab: bool,
}

impl Backend for EvdevBackend {
    type Source = TouchSource;
    type Sink = UinputSink;

    // /dev/input/event* 只有 root:input 能读
    fn is_privileged(&self) -> bool {
        geteuid().is_root()
    }

    fn open_source(&self, path: &Path) -> Result<TouchSource, SourceError> {
        let mut source = TouchSource::open(path)?;
        if self.grab {
            source.grab()?;
        }
        Ok(source)
    }

    fn open_sink(&self, path: &Path) -> Result<UinputSink, SinkError> {
        UinputSink::open(path)
    }
}

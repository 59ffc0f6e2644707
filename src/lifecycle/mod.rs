//! 设备的获取、事件循环和释放
//!
//! ```text
//! Uninitialized → SourceOpen → SinkOpen → CapabilitiesDeclared → DeviceCreated
//!     → Running → Stopped | Failed → TornDown
//! ```
//!
//! 不管从哪一步失败，已经拿到的设备都会被释放，虚拟设备只销毁一次。

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError};
use crate::input_devices::{EventSource, Readiness, SourceError};
use crate::translator::Translator;
use crate::virtual_pointer::{Capabilities, DeviceIdentity, PointerSink, SinkError};

pub mod backend;
pub mod cancel;

pub use backend::{Backend, EvdevBackend};
pub use cancel::CancelToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    SourceOpen,
    SinkOpen,
    CapabilitiesDeclared,
    DeviceCreated,
    Running,
    Stopped,
    Failed,
    TornDown,
}

impl Phase {
    fn advance(&mut self, next: Phase) {
        debug!(from = ?*self, to = ?next, "phase");
        *self = next;
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("you must be root to run this program")]
    NotPrivileged,
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

pub struct Controller<B: Backend> {
    backend: B,
    source_path: PathBuf,
    sink_path: PathBuf,
    capabilities: Capabilities,
    identity: DeviceIdentity,
    settle: Duration,
    translator: Translator,
    cancel: CancelToken,
    phase: Phase,
    source: Option<B::Source>,
    sink: Option<B::Sink>,
}

impl<B: Backend> Controller<B> {
    pub fn new(backend: B, config: &Config, cancel: CancelToken) -> Result<Self, ConfigError> {
        Ok(Self {
            backend,
            source_path: config.devices.source.clone(),
            sink_path: config.devices.sink.clone(),
            capabilities: Capabilities::default(),
            identity: config.virtual_device.clone(),
            settle: config.settle(),
            translator: Translator::new(config.divisors()?),
            cancel,
            phase: Phase::Uninitialized,
            source: None,
            sink: None,
        })
    }

    /// 一直运行到被取消（`Ok`）或者出现致命错误（`Err`），返回前一定完成释放
    pub fn run(mut self) -> Result<(), LifecycleError> {
        let result = self.acquire().and_then(|()| self.pump());
        match result {
            Ok(()) => {
                self.phase.advance(Phase::Stopped);
                info!("stopped");
            }
            Err(_) => self.phase.advance(Phase::Failed),
        }
        self.teardown();
        result
    }

    fn acquire(&mut self) -> Result<(), LifecycleError> {
        if !self.backend.is_privileged() {
            return Err(LifecycleError::NotPrivileged);
        }

        let source = self.source.insert(self.backend.open_source(&self.source_path)?);
        self.phase.advance(Phase::SourceOpen);

        let sink = self.sink.insert(self.backend.open_sink(&self.sink_path)?);
        self.phase.advance(Phase::SinkOpen);

        sink.declare_capabilities(&self.capabilities)?;
        self.phase.advance(Phase::CapabilitiesDeclared);

        sink.create(&self.identity)?;
        self.phase.advance(Phase::DeviceCreated);
        info!(
            device_file = %self.source_path.display(),
            device_name = %source.name(),
            "reading from touchscreen"
        );

        // 让系统先枚举到新设备，否则最开始的事件可能没人收
        if !self.settle.is_zero() {
            std::thread::sleep(self.settle);
        }
        Ok(())
    }

    fn pump(&mut self) -> Result<(), LifecycleError> {
        // acquire 成功后两个设备都在
        let Self {
            source: Some(source),
            sink: Some(sink),
            translator,
            cancel,
            phase,
            ..
        } = self
        else {
            return Ok(());
        };
        phase.advance(Phase::Running);

        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }
            if source.wait_readable(cancel)? == Readiness::Canceled {
                return Ok(());
            }

            let event = source.read_event()?;
            let Some(output) = translator.translate(event) else {
                continue;
            };
            match sink.emit(&output) {
                Ok(()) => {}
                Err(e) if !e.is_fatal() => warn!(error = %e, ?output, "dropped an output event"),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// 销毁虚拟设备，关闭触摸屏，再关闭 uinput；只执行一次
    fn teardown(&mut self) {
        if self.phase == Phase::TornDown {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.destroy();
        }
        drop(self.source.take());
        drop(self.sink.take());
        self.phase.advance(Phase::TornDown);
    }
}

impl<B: Backend> Drop for Controller<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

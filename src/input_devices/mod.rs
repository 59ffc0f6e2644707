use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::event_model::RawEvent;
use crate::lifecycle::CancelToken;

/// evdev 触摸屏
pub mod evdev;

pub use evdev::TouchSource;

/// `wait_readable` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    Canceled,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{} is not a valid input device", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to grab the input device")]
    Grab(#[source] io::Error),
    #[error("waiting for input failed")]
    Wait(#[source] io::Error),
    #[error("input device reported an error or hung up")]
    Hangup,
    #[error("wrong size when reading an input event")]
    ShortRead,
    #[error("reading an input event failed")]
    Read(#[source] io::Error),
}

/// 原始事件的来源
///
/// 除了取消以外，这里的任何错误对调用方来说都是致命的
pub trait EventSource {
    /// 设备名，拿不到的时候返回占位字符串
    fn name(&self) -> String;

    /// 阻塞直到有数据可读、设备出错或者被取消，没有超时
    fn wait_readable(&mut self, cancel: &CancelToken) -> Result<Readiness, SourceError>;

    /// 读出恰好一条事件
    fn read_event(&mut self) -> Result<RawEvent, SourceError>;
}

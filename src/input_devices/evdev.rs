use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use evdev_rs::util::event_code_to_int;
use evdev_rs::{Device, DeviceWrapper, GrabMode, ReadFlag, ReadStatus};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use tracing::{debug, warn};

use super::{EventSource, Readiness, SourceError};
use crate::event_model::RawEvent;
use crate::lifecycle::CancelToken;

const UNKNOWN_NAME: &str = "Unknown";

/// 通过 libevdev 读取的触摸屏
///
/// libevdev 自己会缓存读到的事件，所以 `poll` 之前要先问它还有没有没读完的。
pub struct TouchSource {
    path: PathBuf,
    device: Device,
    // 和 device 里的是同一个打开的文件，只用来 poll
    poll_handle: File,
}

impl TouchSource {
    /// 以只读、非阻塞方式打开
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let open_error = |source: io::Error| SourceError::Open {
            path: path.to_owned(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .custom_flags(OFlag::O_NONBLOCK.bits())
            .open(path)
            .map_err(open_error)?;
        let poll_handle = file.try_clone().map_err(open_error)?;
        let device = Device::new_from_file(file).map_err(open_error)?;

        debug!(path = %path.display(), "input device opened");
        Ok(Self {
            path: path.to_owned(),
            device,
            poll_handle,
        })
    }

    /// 独占设备，其他程序（包括桌面环境）不再收到这块屏的事件
    pub fn grab(&mut self) -> Result<(), SourceError> {
        self.device
            .grab(GrabMode::Grab)
            .map_err(SourceError::Grab)?;
        debug!(path = %self.path.display(), "input device grabbed");
        Ok(())
    }
}

/// 阻塞直到 `device` 可读、出错或者 `cancel` 被置位
///
/// `pending` 问的是 fd 之外的缓冲：libevdev 可能已经把事件读进来了，
/// 这时 fd 不可读但事件是有的。
fn wait_for(
    device: impl AsFd,
    cancel: &CancelToken,
    mut pending: impl FnMut() -> bool,
) -> Result<Readiness, SourceError> {
    loop {
        if cancel.is_cancelled() {
            return Ok(Readiness::Canceled);
        }
        if pending() {
            return Ok(Readiness::Ready);
        }

        let mut fds = [
            PollFd::new(device.as_fd(), PollFlags::POLLIN),
            PollFd::new(cancel.as_fd(), PollFlags::POLLIN),
        ];
        match poll(&mut fds, PollTimeout::NONE) {
            Ok(_) => {}
            // 信号打断了等待，取消与否由管道决定
            Err(Errno::EINTR) => continue,
            Err(_) if cancel.is_cancelled() => return Ok(Readiness::Canceled),
            Err(errno) => return Err(SourceError::Wait(errno.into())),
        }

        if cancel.is_cancelled() {
            return Ok(Readiness::Canceled);
        }
        let revents = fds[0].revents().unwrap_or(PollFlags::empty());
        if revents.intersects(PollFlags::POLLERR | PollFlags::POLLHUP | PollFlags::POLLNVAL) {
            return Err(SourceError::Hangup);
        }
        if revents.contains(PollFlags::POLLIN) {
            return Ok(Readiness::Ready);
        }
    }
}

impl EventSource for TouchSource {
    fn name(&self) -> String {
        self.device.name().unwrap_or(UNKNOWN_NAME).to_owned()
    }

    fn wait_readable(&mut self, cancel: &CancelToken) -> Result<Readiness, SourceError> {
        wait_for(&self.poll_handle, cancel, || self.device.has_event_pending())
    }

    fn read_event(&mut self) -> Result<RawEvent, SourceError> {
        match self.device.next_event(ReadFlag::NORMAL) {
            Ok((status, event)) => {
                if matches!(status, ReadStatus::Sync) {
                    warn!("kernel dropped input events, positions may be stale");
                }
                let (event_type, code) = event_code_to_int(&event.event_code);
                Ok(RawEvent::from_raw(event_type as u16, code as u16, event.value))
            }
            // poll 说可读却一条完整记录都没有
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(SourceError::ShortRead),
            Err(e) => Err(SourceError::Read(e)),
        }
    }
}

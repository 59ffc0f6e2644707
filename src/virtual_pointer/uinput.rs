use std::fs::{File, OpenOptions};
use std::io;
use std::mem;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::slice;

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::libc;
use nix::sys::ioctl::ioctl_param_type;
use nix::unistd::write;
use tracing::{debug, info, warn};

use super::{Capabilities, DeviceIdentity, PointerSink, SinkError};
use crate::event_model::{EventCategory, OutputEvent};

// linux/uinput.h
const UINPUT_IOCTL_BASE: u8 = b'U';

nix::ioctl_none!(ui_dev_create, UINPUT_IOCTL_BASE, 1);
nix::ioctl_none!(ui_dev_destroy, UINPUT_IOCTL_BASE, 2);
nix::ioctl_write_ptr!(ui_dev_setup, UINPUT_IOCTL_BASE, 3, libc::uinput_setup);
nix::ioctl_write_int!(ui_set_evbit, UINPUT_IOCTL_BASE, 100);
nix::ioctl_write_int!(ui_set_keybit, UINPUT_IOCTL_BASE, 101);
nix::ioctl_write_int!(ui_set_relbit, UINPUT_IOCTL_BASE, 102);

type SetBit = unsafe fn(libc::c_int, ioctl_param_type) -> nix::Result<libc::c_int>;

/// 基于 uinput 的虚拟鼠标
///
/// 所有 ioctl 和事件写入都走 `open` 打开的那个非阻塞句柄，
/// 句柄在 sink 被 drop 时关闭。
pub struct UinputSink {
    path: PathBuf,
    control: File,
    declared: bool,
    created: bool,
}

impl UinputSink {
    /// 以只写、非阻塞方式打开 uinput
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref();
        let control = OpenOptions::new()
            .write(true)
            .custom_flags(OFlag::O_NONBLOCK.bits())
            .open(path)
            .map_err(|source| SinkError::Open {
                path: path.to_owned(),
                source,
            })?;

        debug!(path = %path.display(), "uinput opened");
        Ok(Self {
            path: path.to_owned(),
            control,
            declared: false,
            created: false,
        })
    }
}

fn setup(identity: &DeviceIdentity) -> libc::uinput_setup {
    // SAFETY: uinput_setup 只有整数和字节数组，全零是合法值
    let mut setup: libc::uinput_setup = unsafe { mem::zeroed() };
    setup.id.bustype = identity.bus_type;
    setup.id.vendor = identity.vendor_id;
    setup.id.product = identity.product_id;

    // 最后一个字节留给 NUL
    let name = identity.name.as_bytes();
    for (dst, &src) in setup
        .name
        .iter_mut()
        .zip(name.iter().take(libc::UINPUT_MAX_NAME_SIZE - 1))
    {
        *dst = src as libc::c_char;
    }
    setup
}

fn record(event: &OutputEvent) -> libc::input_event {
    // SAFETY: 同上，时间戳留 0 由内核填
    let mut record: libc::input_event = unsafe { mem::zeroed() };
    record.type_ = event.event_type();
    record.code = event.code;
    record.value = event.value;
    record
}

fn write_error(errno: Errno) -> SinkError {
    match errno {
        Errno::ENODEV | Errno::EBADF => SinkError::Gone,
        errno => SinkError::Write(errno.into()),
    }
}

impl PointerSink for UinputSink {
    fn declare_capabilities(&mut self, capabilities: &Capabilities) -> Result<(), SinkError> {
        if self.created {
            return Err(SinkError::AlreadyCreated);
        }

        let bits: [(SetBit, u16); 6] = [
            (ui_set_evbit, EventCategory::Synchronization.into()),
            (ui_set_evbit, EventCategory::Key.into()),
            (ui_set_evbit, EventCategory::RelativeMotion.into()),
            (ui_set_keybit, capabilities.click_button),
            (ui_set_relbit, capabilities.axis_x),
            (ui_set_relbit, capabilities.axis_y),
        ];
        let fd = self.control.as_raw_fd();
        for (set_bit, bit) in bits {
            // SAFETY: 参数是整数，fd 由 self.control 持有
            unsafe { set_bit(fd, ioctl_param_type::from(bit)) }
                .map_err(|errno| SinkError::Declare(errno.into()))?;
        }

        debug!(?capabilities, "capabilities declared");
        self.declared = true;
        Ok(())
    }

    fn create(&mut self, identity: &DeviceIdentity) -> Result<(), SinkError> {
        if self.created {
            return Err(SinkError::AlreadyCreated);
        }
        if !self.declared {
            return Err(SinkError::NotDeclared);
        }

        let setup = setup(identity);
        let fd = self.control.as_raw_fd();
        // SAFETY: setup 在调用期间一直有效，内核只读它
        unsafe { ui_dev_setup(fd, &setup) }.map_err(|errno| SinkError::Create(errno.into()))?;
        unsafe { ui_dev_create(fd) }.map_err(|errno| SinkError::Create(errno.into()))?;

        self.created = true;
        info!(
            name = %identity.name,
            path = %self.path.display(),
            "virtual pointer created"
        );
        Ok(())
    }

    fn emit(&mut self, event: &OutputEvent) -> Result<(), SinkError> {
        if !self.created {
            return Err(SinkError::Gone);
        }

        let record = record(event);
        // SAFETY: input_event 是 repr(C) 的纯数据，按字节读没问题
        let bytes = unsafe {
            slice::from_raw_parts(
                (&record as *const libc::input_event).cast::<u8>(),
                mem::size_of::<libc::input_event>(),
            )
        };
        match write(&self.control, bytes) {
            Ok(written) if written == bytes.len() => Ok(()),
            Ok(written) => Err(SinkError::Write(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {written} of {} bytes", bytes.len()),
            ))),
            Err(errno) => Err(write_error(errno)),
        }
    }

    fn destroy(&mut self) {
        if self.created {
            self.created = false;
            // SAFETY: 无参数的 ioctl
            match unsafe { ui_dev_destroy(self.control.as_raw_fd()) } {
                Ok(_) => info!(path = %self.path.display(), "virtual pointer destroyed"),
                Err(errno) => warn!(%errno, "failed to destroy the virtual pointer"),
            }
        } else {
            debug!("virtual pointer was never created, nothing to destroy");
        }
        self.declared = false;
    }
}

use std::io;
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use nix::unistd;

/// 一次性的取消标记
///
/// 一旦置位就不会再清除。附带一个管道，置位时往里写一个字节，
/// 这样阻塞在 `poll` 上的线程可以立刻醒过来。
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    wake_rx: OwnedFd,
    wake_tx: OwnedFd,
}

impl CancelToken {
    pub fn new() -> io::Result<Self> {
        let (wake_rx, wake_tx) = unistd::pipe()?;
        Ok(Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                wake_rx,
                wake_tx,
            }),
        })
    }

    /// 可以在任意线程（包括信号处理线程）调用，重复调用无副作用
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            // 管道里有没有字节不影响标记本身
            let _ = unistd::write(&self.inner.wake_tx, &[1]);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }
}

/// 读端，取消后一直可读
impl AsFd for CancelToken {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.inner.wake_rx.as_fd()
    }
}

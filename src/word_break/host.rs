//! 宿主调度能力
//!
//! 调度器只通过这里的接口让出控制权和计时，便于在测试中替换为手动时钟。

use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

use futures::future::{self, FutureExt, LocalBoxFuture};

/// 宿主调度接口
pub trait Host {
    /// 让出控制权，直到宿主可以继续（下一帧）
    fn next_frame(&self) -> LocalBoxFuture<'_, ()>;

    /// 等待一段时间
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'_, ()>;

    /// 当前时间
    fn now(&self) -> Instant;
}

/// 基于 tokio 的宿主
///
/// 使用 tokio 的时钟，`tokio::time::pause` 下同样生效。
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioHost;

impl Host for TokioHost {
    fn next_frame(&self) -> LocalBoxFuture<'_, ()> {
        tokio::task::yield_now().boxed_local()
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'_, ()> {
        tokio::time::sleep(duration).boxed_local()
    }

    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// 手动时钟宿主
///
/// 所有等待立即完成，`sleep` 推进时钟；每次让帧可额外推进固定时长，
/// 用于模拟批次耗时。
#[derive(Debug)]
pub struct ManualHost {
    clock: Cell<Instant>,
    frame_cost: Duration,
    frames: Cell<usize>,
    sleeps: RefCell<Vec<Duration>>,
}

impl Default for ManualHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualHost {
    pub fn new() -> Self {
        Self::with_frame_cost(Duration::ZERO)
    }

    pub fn with_frame_cost(frame_cost: Duration) -> Self {
        Self {
            clock: Cell::new(Instant::now()),
            frame_cost,
            frames: Cell::new(0),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.clock.set(self.clock.get() + duration);
    }

    /// 已让出的帧数
    pub fn frames(&self) -> usize {
        self.frames.get()
    }

    /// 记录的等待时长
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Host for ManualHost {
    fn next_frame(&self) -> LocalBoxFuture<'_, ()> {
        self.frames.set(self.frames.get() + 1);
        self.advance(self.frame_cost);
        future::ready(()).boxed_local()
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'_, ()> {
        self.sleeps.borrow_mut().push(duration);
        self.advance(duration);
        future::ready(()).boxed_local()
    }

    fn now(&self) -> Instant {
        self.clock.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn manual_host_advances_on_sleep() {
        let host = ManualHost::with_frame_cost(Duration::from_millis(5));
        let start = host.now();

        host.next_frame().await;
        host.sleep(Duration::from_millis(10)).await;

        assert_eq!(host.now() - start, Duration::from_millis(15));
        assert_eq!(host.frames(), 1);
        assert_eq!(host.sleeps(), vec![Duration::from_millis(10)]);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_host_follows_paused_clock() {
        let host = TokioHost;
        let start = host.now();

        host.sleep(Duration::from_secs(2)).await;

        assert!(host.now() - start >= Duration::from_secs(2));
    }
}

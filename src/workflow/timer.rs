//! 倒计时器 - 流程层
//!
//! 可取消的定时任务。到期后只做一件事：向通道发送一次
//! 强制交卷事件；状态机在 Quiz 状态之外收到该事件会直接忽略，
//! 因此过期回调不可能在状态机前进之后再改动状态。

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::debug;

/// 可取消的倒计时任务
pub struct CountdownTimer {
    handle: JoinHandle<()>,
    limit_secs: u64,
}

impl CountdownTimer {
    /// 启动倒计时，到期后向 `tx` 发送强制交卷事件
    pub fn start(limit_secs: u64, tx: mpsc::Sender<()>) -> Self {
        debug!("⏱️ 倒计时启动: {} 秒", limit_secs);
        let handle = tokio::spawn(async move {
            sleep(Duration::from_secs(limit_secs)).await;
            // 接收端可能已随会话退出而关闭，发送失败直接忽略
            let _ = tx.send(()).await;
        });
        Self { handle, limit_secs }
    }

    /// 配置的时限（秒）
    pub fn limit_secs(&self) -> u64 {
        self.limit_secs
    }

    /// 取消倒计时（幂等）
    pub fn cancel(&self) {
        self.handle.abort();
        debug!("⏱️ 倒计时已取消");
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

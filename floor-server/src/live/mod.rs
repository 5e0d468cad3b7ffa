//! TableHub: 桌台状态实时分发
//!
//! ```text
//! REST handler (桌台增删改 / 订单占用与释放)
//!       │ TableEvent
//!       ▼
//! TableHub ── broadcast::Sender<TableEvent>
//!       │
//!       ▼
//! /ws handler (每个连接一个 Receiver → JSON text frame)
//! ```
//!
//! 不做过滤、确认或离线缓存；没有订阅者时发送结果直接丢弃。

use shared::live::TableEvent;
use tokio::sync::broadcast;

/// Broadcast channel 容量
const BROADCAST_CAPACITY: usize = 256;

/// 全局桌台广播 hub
#[derive(Clone)]
pub struct TableHub {
    tx: broadcast::Sender<TableEvent>,
}

impl Default for TableHub {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }
}

impl TableHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅之后发布的事件
    pub fn subscribe(&self) -> broadcast::Receiver<TableEvent> {
        self.tx.subscribe()
    }

    /// 推送给所有在线连接
    pub fn publish(&self, event: TableEvent) {
        let receivers = self.tx.receiver_count();
        tracing::debug!(receivers, ?event, "Publishing table event");
        let _ = self.tx.send(event);
    }

    /// 当前连接数
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::RecvError;

    #[tokio::test]
    async fn test_publish_fans_out() {
        let hub = TableHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();
        assert_eq!(hub.receiver_count(), 2);

        hub.publish(TableEvent::TableRemoved { table_id: 4 });

        assert_eq!(a.recv().await.unwrap(), TableEvent::TableRemoved { table_id: 4 });
        assert_eq!(b.recv().await.unwrap(), TableEvent::TableRemoved { table_id: 4 });
    }

    #[test]
    fn test_publish_without_subscribers() {
        let hub = TableHub::new();
        hub.publish(TableEvent::TableRemoved { table_id: 1 });
        assert_eq!(hub.receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags() {
        let hub = TableHub::new();
        let mut rx = hub.subscribe();
        for table_id in 0..(BROADCAST_CAPACITY as i64 + 10) {
            hub.publish(TableEvent::TableRemoved { table_id });
        }
        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(10))));
        assert_eq!(rx.recv().await.unwrap(), TableEvent::TableRemoved { table_id: 10 });
    }
}

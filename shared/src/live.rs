//! Live table events pushed over `/ws`

use crate::models::DiningTable;
use serde::{Deserialize, Serialize};

/// 桌台实时事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableEvent {
    /// 桌台被创建或修改 (含服务员姓名)
    TableUpdated { table: DiningTable },
    /// 桌台被删除
    TableRemoved { table_id: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TableStatus;

    #[test]
    fn test_table_event_wire_format() {
        let event = TableEvent::TableUpdated {
            table: DiningTable {
                id: 3,
                number: 3,
                capacity: 6,
                status: TableStatus::Occupied,
                x_position: 300,
                y_position: 100,
                server_id: None,
                server_name: None,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "table_updated");
        assert_eq!(json["table"]["status"], "occupied");

        let json = serde_json::to_value(TableEvent::TableRemoved { table_id: 9 }).unwrap();
        assert_eq!(json["type"], "table_removed");
        assert_eq!(json["table_id"], 9);
    }
}

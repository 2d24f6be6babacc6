use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 库存状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum InventoryStatus {
    InStock,
    LowStock,
    Ordered,
    Discontinued,
}

/// 库存记录 (inventory_items 表), workspace 内唯一归属
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    pub normalized_name: String,
    pub vendor: Option<String>,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub low_stock_threshold: f64,
    pub status: InventoryStatus,
    pub updated_at: DateTime<Utc>,
}

/// 待插入的新库存记录 (无 id)
#[derive(Debug, Clone)]
pub struct NewInventoryRecord {
    pub workspace_id: i64,
    pub name: String,
    pub normalized_name: String,
    pub vendor: Option<String>,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub low_stock_threshold: f64,
    pub status: InventoryStatus,
}

/// 数量变化后重算状态
///
/// 对账引擎只在 in_stock/low_stock 之间迁移, 绝不隐式解除
/// ordered/discontinued (那是显式编辑流程的事)。
/// 边界规则: quantity ≤ threshold 即 low_stock (含等于)。
pub fn next_status(current: InventoryStatus, quantity: f64, threshold: f64) -> InventoryStatus {
    match current {
        InventoryStatus::Ordered | InventoryStatus::Discontinued => current,
        _ => status_for_new(quantity, threshold),
    }
}

/// 新建记录的初始状态
pub fn status_for_new(quantity: f64, threshold: f64) -> InventoryStatus {
    if quantity <= threshold {
        InventoryStatus::LowStock
    } else {
        InventoryStatus::InStock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_at_threshold_is_low_stock() {
        // 含等于边界: 5 ≤ 5 仍是 low_stock
        assert_eq!(status_for_new(5.0, 5.0), InventoryStatus::LowStock);
        assert_eq!(status_for_new(5.1, 5.0), InventoryStatus::InStock);
        assert_eq!(status_for_new(0.0, 1.0), InventoryStatus::LowStock);
    }

    #[test]
    fn merge_never_lifts_discontinued_or_ordered() {
        assert_eq!(
            next_status(InventoryStatus::Discontinued, 100.0, 1.0),
            InventoryStatus::Discontinued
        );
        assert_eq!(
            next_status(InventoryStatus::Ordered, 100.0, 1.0),
            InventoryStatus::Ordered
        );
    }

    #[test]
    fn merge_moves_between_stock_states() {
        assert_eq!(
            next_status(InventoryStatus::LowStock, 12.0, 5.0),
            InventoryStatus::InStock
        );
        assert_eq!(
            next_status(InventoryStatus::InStock, 2.0, 5.0),
            InventoryStatus::LowStock
        );
    }
}

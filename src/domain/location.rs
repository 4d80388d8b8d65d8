// ==========================================
// 种植批次规则引擎 - 场地快照
// ==========================================
// 红线: 容量约束优先于批次操作
// 用途: 株数容量 / 面积容量校验
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// LocationSnapshot - 场地快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSnapshot {
    pub id: String,
    pub name: String,

    // ===== 株数容量 =====
    pub capacity: u32,           // 最大株数
    #[serde(default)]
    pub current_plant_count: u32, // 当前株数

    // ===== 面积容量(可选, 平方英尺) =====
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_area: Option<f64>,
}

impl LocationSnapshot {
    pub fn new(id: impl Into<String>, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity,
            current_plant_count: 0,
            area: None,
            used_area: None,
        }
    }

    pub fn with_plant_count(mut self, current_plant_count: u32) -> Self {
        self.current_plant_count = current_plant_count;
        self
    }

    pub fn with_area(mut self, area: f64, used_area: f64) -> Self {
        self.area = Some(area);
        self.used_area = Some(used_area);
        self
    }
}

// ==========================================
// Trait: CapacityConstraint
// ==========================================
// 用途: Capacity Validator 约束检查接口
pub trait CapacityConstraint {
    /// 检查是否可再放入 count 株
    fn can_add_plants(&self, count: u32) -> bool;

    /// 剩余株数容量(不为负)
    fn remaining_plant_capacity(&self) -> u32;

    /// 面积容量 (总面积, 已用面积); 未配置面积时返回 None
    fn area_capacity(&self) -> Option<(f64, f64)>;
}

impl CapacityConstraint for LocationSnapshot {
    fn can_add_plants(&self, count: u32) -> bool {
        u64::from(self.current_plant_count) + u64::from(count) <= u64::from(self.capacity)
    }

    fn remaining_plant_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.current_plant_count)
    }

    fn area_capacity(&self) -> Option<(f64, f64)> {
        self.area.map(|area| (area, self.used_area.unwrap_or(0.0)))
    }
}

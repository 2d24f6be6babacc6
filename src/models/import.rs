use serde::{Deserialize, Serialize};

/// 查重裁决动作 (封闭枚举, 未知取值在反序列化阶段即拒绝)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateAction {
    /// 引擎自行裁决: 有确定目标则合并, 否则新建
    #[default]
    Auto,
    /// 合并到既有记录
    Merge,
    /// 新建记录
    CreateNew,
    /// 待人工裁决, 不允许进入提交
    Review,
}

/// 抽取产物: 候选导入行, 评分后不再变更
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateItem {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub price: Option<f64>,
}

fn default_quantity() -> f64 {
    1.0
}

/// 单条疑似重复匹配 (每次请求现算, 不落库)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateCandidateMatch {
    pub record_id: i64,
    pub name: String,
    pub unit: String,
    pub category: String,
    pub quantity: f64,
    /// [0,1], 保留 3 位小数
    pub similarity_score: f64,
    /// 面向用户的解释, 不参与程序判断
    pub reason: String,
    pub unit_compatible: bool,
}

/// 一条候选行的查重建议
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateSuggestion {
    pub import_index: usize,
    pub import_name: String,
    pub import_unit: Option<String>,
    /// 得分降序, 同分按 record_id 升序, 截断 top-N
    pub candidates: Vec<DuplicateCandidateMatch>,
    pub recommended_action: DuplicateAction,
    pub recommended_merge_target: Option<i64>,
}

/// 用户最终确认的提交行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDecision {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub price: Option<f64>,
    #[serde(default)]
    pub duplicate_action: DuplicateAction,
    /// 显式合并目标, 优先于引擎推荐
    pub merge_target: Option<i64>,
    /// 新建记录的低库存阈值, 缺省用系统默认值
    pub low_stock_threshold: Option<f64>,
}

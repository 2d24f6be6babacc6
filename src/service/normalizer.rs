//! 规范化: 把候选行的名称/单位/分类折叠成可比较的键。
//! 全部是纯函数, 永不失败; 原始字符串保留用于展示和落库。

/// 单位量纲类别, 用于判断两个单位是否可比
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitClass {
    Count,
    Mass,
    Volume,
    Length,
    Other,
}

/// 规范化商品名称: 小写、压缩空白、去掉无语义标点
///
/// 连字符/撇号/& 属于名称的一部分 ("usb-c", "m&m's"), 保留。
pub fn normalize_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let cleaned: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '&' | '\'') {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 单位同义词映射到规范 token (仅用于比较, 不改写存储值)
pub fn normalize_unit(unit: Option<&str>) -> String {
    let raw = unit.map(|u| u.trim().to_lowercase()).unwrap_or_default();
    if raw.is_empty() {
        return "unit".to_string();
    }
    let canonical = match raw.as_str() {
        "unit" | "units" | "ea" | "each" => "unit",
        "pc" | "pcs" | "piece" | "pieces" => "piece",
        "pack" | "packs" => "pack",
        "box" | "boxes" => "box",
        "bag" | "bags" => "bag",
        "case" | "cases" => "case",
        "bottle" | "bottles" => "bottle",
        "roll" | "rolls" => "roll",
        "kg" | "kgs" | "kilogram" | "kilograms" => "kg",
        "g" | "gram" | "grams" => "g",
        "lb" | "lbs" | "pound" | "pounds" => "lb",
        "oz" | "ounce" | "ounces" => "oz",
        "l" | "liter" | "liters" | "litre" | "litres" => "l",
        "ml" | "milliliter" | "milliliters" => "ml",
        "gal" | "gallon" | "gallons" => "gal",
        "m" | "meter" | "meters" | "metre" | "metres" => "m",
        "cm" => "cm",
        // 未知单位原样保留
        other => other,
    };
    canonical.to_string()
}

/// 规范 token 的量纲类别
pub fn unit_class(canonical: &str) -> UnitClass {
    match canonical {
        "unit" | "piece" | "pack" | "box" | "bag" | "case" | "bottle" | "roll" => UnitClass::Count,
        "kg" | "g" | "lb" | "oz" => UnitClass::Mass,
        "l" | "ml" | "gal" => UnitClass::Volume,
        "m" | "cm" => UnitClass::Length,
        _ => UnitClass::Other,
    }
}

/// 两个规范单位是否可比
///
/// 同 token 必然可比; 已知量纲不同 (如质量 vs 计数) 不可比;
/// 任一方量纲未知时不下结论, 视为可比。
pub fn units_compatible(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (ca, cb) = (unit_class(a), unit_class(b));
    if ca == UnitClass::Other || cb == UnitClass::Other {
        return true;
    }
    ca == cb
}

/// 分类标签: 去空白 + 小写, 空串视为无
pub fn normalize_category(category: Option<&str>) -> Option<String> {
    let cleaned = category?.trim().to_lowercase();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// 供应商标签: 仅去空白, 空串视为无
pub fn normalize_vendor(vendor: Option<&str>) -> Option<String> {
    let cleaned = vendor?.trim().to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// 按名称关键词猜测分类, 兜底 "general"
pub fn suggest_category(name: &str) -> String {
    let lowered = name.to_lowercase();
    let hit = |tokens: &[&str]| tokens.iter().any(|t| lowered.contains(t));
    if hit(&["cable", "usb", "charger", "adapter", "ssd", "hdmi"]) {
        "electronics"
    } else if hit(&["paper", "pen", "notebook", "marker"]) {
        "office"
    } else if hit(&["milk", "bread", "fruit", "water", "snack", "coffee"]) {
        "groceries"
    } else if hit(&["cleaner", "soap", "detergent", "tissue"]) {
        "supplies"
    } else {
        "general"
    }
    .to_string()
}

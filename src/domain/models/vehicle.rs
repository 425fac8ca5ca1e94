// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 车辆记录实体
///
/// 自动化子进程从目标市场页面提取的单条车辆信息。
/// brand、model、price 为必填项；其余字段缺失时表示"未知"，
/// 而不是零值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// 品牌
    pub brand: String,
    /// 型号
    pub model: String,
    /// 年份（可能未知）
    pub year: Option<i32>,
    /// 公里数（可能未知）
    pub km: Option<u32>,
    /// 价格
    pub price: f64,
    /// 货币（可能未知）
    pub currency: Option<String>,
    /// 发布标题（可能未知）
    pub title: Option<String>,
}

impl VehicleRecord {
    /// 从交接文件中的一个JSON对象归一化出车辆记录
    ///
    /// 提取端把所有字段当作字符串传输，这里把数字样式的
    /// 字符串强制转换为数值。brand、model 或 price 缺失或
    /// 无效时整条记录被丢弃。
    ///
    /// # 参数
    ///
    /// * `value` - 交接文件数组中的一个元素
    ///
    /// # 返回值
    ///
    /// * `Some(VehicleRecord)` - 归一化成功
    /// * `None` - 必填字段缺失，记录被丢弃
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        let brand = non_empty_string(object.get("brand")?)?;
        let model = non_empty_string(object.get("model")?)?;
        let price = object.get("price").and_then(coerce_price)?;
        if price < 0.0 {
            return None;
        }

        // Out-of-range extractions are unknown, not wrapped into garbage.
        let year = object
            .get("year")
            .and_then(coerce_integer)
            .and_then(|y| i32::try_from(y).ok());
        let km = object
            .get("km")
            .and_then(coerce_integer)
            .and_then(|km| u32::try_from(km).ok());
        let currency = object.get("currency").and_then(non_empty_string);
        let title = object.get("title").and_then(non_empty_string);

        Some(Self {
            brand,
            model,
            year,
            km,
            price,
            currency,
            title,
        })
    }
}

/// 提取非空字符串字段
fn non_empty_string(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// 把JSON值强制转换为整数
///
/// 接受JSON数字和数字样式的字符串（容忍"45.000"或"45000 km"
/// 之类的千位分隔符和单位后缀）。
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(parsed) = trimmed.parse::<i64>() {
                return Some(parsed);
            }
            let digits: String = trimmed
                .chars()
                .take_while(|c| !c.is_alphabetic())
                .filter(|c| c.is_ascii_digit() || *c == '-')
                .collect();
            if digits.is_empty() || digits == "-" {
                None
            } else {
                digits.parse::<i64>().ok()
            }
        }
        _ => None,
    }
}

/// 把JSON值强制转换为价格
///
/// 字符串形式容忍货币符号、空格和常见的千位/小数分隔符
/// 组合（"15.000"、"15,000.50"、"US$ 15000"）。
fn coerce_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(parsed) = trimmed.parse::<f64>() {
                return Some(parsed);
            }

            let cleaned: String = trimmed
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
                .collect();
            if cleaned.is_empty() {
                return None;
            }

            // Both separators present: '.' is the thousands mark, ',' the decimal.
            let normalized = if cleaned.contains('.') && cleaned.contains(',') {
                cleaned.replace('.', "").replace(',', ".")
            } else if cleaned.matches('.').count() > 1 {
                cleaned.replace('.', "")
            } else if let Some(fraction) = cleaned.split(',').nth(1) {
                if fraction.len() == 2 {
                    cleaned.replace(',', ".")
                } else {
                    cleaned.replace(',', "")
                }
            } else {
                cleaned
            };

            normalized.parse::<f64>().ok()
        }
        _ => None,
    }
}

//! 产品数据模型

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 产品表中的一行，列名到值的映射，列集合由表结构决定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Product(pub Map<String, Value>);

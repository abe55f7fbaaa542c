//! 把任意表结构的一行转换成列名到 JSON 值的映射
//!
//! NULL 在按类型解码之前单独判断；其余按列值的类型名选择 Rust 类型，
//! 无法识别的类型按文本读取。

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde_json::{Map, Value};
use sqlx::{
    mysql::MySqlRow, postgres::PgRow, sqlite::SqliteRow, Column, ColumnIndex, Error, Row,
    TypeInfo, ValueRef,
};
use uuid::Uuid;

use super::model::Product;

/// 单列解码函数：行、列序号、列值的类型名
pub type DecodeFn<R> = fn(&R, usize, &str) -> Result<Value, Error>;

pub fn row_to_product<R>(row: &R, decode: DecodeFn<R>) -> Result<Product, Error>
where
    R: Row,
    usize: ColumnIndex<R>,
{
    let mut fields = Map::new();
    for column in row.columns() {
        let index = column.ordinal();
        let type_name = {
            let raw = row.try_get_raw(index)?;
            if raw.is_null() {
                None
            } else {
                Some(raw.type_info().name().to_string())
            }
        };

        let value = match type_name {
            Some(type_name) => decode(row, index, &type_name)?,
            None => Value::Null,
        };
        fields.insert(column.name().to_string(), value);
    }
    Ok(Product(fields))
}

pub fn mysql(row: &MySqlRow, index: usize, type_name: &str) -> Result<Value, Error> {
    let value = match type_name {
        "BOOLEAN" => Value::from(row.try_get::<bool, _>(index)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            Value::from(row.try_get::<i64, _>(index)?)
        }
        name if name.ends_with(" UNSIGNED") => Value::from(row.try_get::<u64, _>(index)?),
        "YEAR" => Value::from(row.try_get_unchecked::<u16, _>(index)?),
        "FLOAT" => Value::from(row.try_get::<f32, _>(index)?),
        "DOUBLE" => Value::from(row.try_get::<f64, _>(index)?),
        "DECIMAL" => decimal(row.try_get::<Decimal, _>(index)?),
        "DATETIME" => Value::from(row.try_get::<NaiveDateTime, _>(index)?.to_string()),
        "TIMESTAMP" => Value::from(row.try_get::<DateTime<Utc>, _>(index)?.to_rfc3339()),
        "DATE" => Value::from(row.try_get::<NaiveDate, _>(index)?.to_string()),
        "TIME" => Value::from(row.try_get::<NaiveTime, _>(index)?.to_string()),
        "JSON" => row.try_get::<Value, _>(index)?,
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => {
            Value::from(row.try_get::<Vec<u8>, _>(index)?)
        }
        _ => Value::from(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}

pub fn postgres(row: &PgRow, index: usize, type_name: &str) -> Result<Value, Error> {
    let value = match type_name {
        "BOOL" => Value::from(row.try_get::<bool, _>(index)?),
        "INT2" => Value::from(row.try_get::<i16, _>(index)?),
        "INT4" => Value::from(row.try_get::<i32, _>(index)?),
        "INT8" => Value::from(row.try_get::<i64, _>(index)?),
        "FLOAT4" => Value::from(row.try_get::<f32, _>(index)?),
        "FLOAT8" => Value::from(row.try_get::<f64, _>(index)?),
        "NUMERIC" => decimal(row.try_get::<Decimal, _>(index)?),
        "TIMESTAMP" => Value::from(row.try_get::<NaiveDateTime, _>(index)?.to_string()),
        "TIMESTAMPTZ" => Value::from(row.try_get::<DateTime<Utc>, _>(index)?.to_rfc3339()),
        "DATE" => Value::from(row.try_get::<NaiveDate, _>(index)?.to_string()),
        "TIME" => Value::from(row.try_get::<NaiveTime, _>(index)?.to_string()),
        "UUID" => Value::from(row.try_get::<Uuid, _>(index)?.to_string()),
        "JSON" | "JSONB" => row.try_get::<Value, _>(index)?,
        "BYTEA" => Value::from(row.try_get::<Vec<u8>, _>(index)?),
        _ => Value::from(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}

/// SQLite 的类型名是值的存储类别，声明为 DATETIME 等的列实际按 TEXT 存储
pub fn sqlite(row: &SqliteRow, index: usize, type_name: &str) -> Result<Value, Error> {
    let value = match type_name {
        "INTEGER" | "BOOLEAN" => Value::from(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" => Value::from(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => Value::from(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        _ => Value::from(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}

/// 十进制数按 JSON 数字输出，超出 f64 范围时退回字符串
fn decimal(value: Decimal) -> Value {
    value
        .to_f64()
        .map(Value::from)
        .unwrap_or_else(|| Value::from(value.to_string()))
}

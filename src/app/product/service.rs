//! 产品业务服务

use sqlx::{ColumnIndex, Row};

use super::{
    decode::{self, DecodeFn},
    model::Product,
};
use crate::{core::error::CoreError, infrastructure::database::DatabasePool};

#[derive(Clone)]
pub struct ProductService {
    pool: DatabasePool,
    table: String,
}

impl ProductService {
    /// `table` 必须已通过 [`crate::config::is_valid_identifier`] 校验
    pub fn new(pool: DatabasePool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    /// 读取产品表的全部记录
    pub async fn list_products(&self) -> Result<Vec<Product>, CoreError> {
        let sql = format!("SELECT * FROM {}", self.table);

        let products = match &self.pool {
            DatabasePool::MySql(pool) => {
                let rows = sqlx::query(&sql).fetch_all(pool).await?;
                to_products(&rows, decode::mysql)?
            }
            DatabasePool::Postgres(pool) => {
                let rows = sqlx::query(&sql).fetch_all(pool).await?;
                to_products(&rows, decode::postgres)?
            }
            DatabasePool::Sqlite(pool) => {
                let rows = sqlx::query(&sql).fetch_all(pool).await?;
                to_products(&rows, decode::sqlite)?
            }
        };

        Ok(products)
    }
}

fn to_products<R>(rows: &[R], decode: DecodeFn<R>) -> Result<Vec<Product>, sqlx::Error>
where
    R: Row,
    usize: ColumnIndex<R>,
{
    rows.iter()
        .map(|row| decode::row_to_product(row, decode))
        .collect()
}

use async_trait::async_trait;
use futures::TryStreamExt;
use modbot::store::{Error, Result, Store};
use sqlx::{mysql::MySqlPool, Row};

const CREATE_STRINGS: &str = "CREATE TABLE IF NOT EXISTS kv_strings (
    k VARCHAR(255) NOT NULL PRIMARY KEY,
    v TEXT NOT NULL
)";

const CREATE_SETS: &str = "CREATE TABLE IF NOT EXISTS kv_sets (
    k VARCHAR(255) NOT NULL,
    member VARCHAR(255) NOT NULL,
    PRIMARY KEY (k, member)
)";

/// A Store using the MySQL database.
#[derive(Clone, Debug)]
pub struct MysqlStore {
    pool: MySqlPool,
}

impl MysqlStore {
    pub async fn connect(uri: &str) -> Result<Self> {
        let pool = MySqlPool::connect(uri).await.map_err(Error::new)?;

        Ok(Self { pool })
    }

    /// Creates the tables used by the store if they don't exist yet.
    pub async fn migrate(&self) -> Result<()> {
        for sql in [CREATE_STRINGS, CREATE_SETS] {
            log::debug!("[MySQL] Executing SQL query: \"{}\"", sql);

            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(Error::new)?;
        }

        Ok(())
    }
}

#[async_trait]
impl Store for MysqlStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT v FROM kv_strings WHERE k = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::new)?;

        match row {
            Some(row) => Ok(Some(row.try_get(0).map_err(Error::new)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT INTO kv_strings (k, v) VALUES (?, ?) ON DUPLICATE KEY UPDATE v = VALUES(v)")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(Error::new)?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::new)?;

        sqlx::query("DELETE FROM kv_strings WHERE k = ?")
            .bind(key)
            .execute(&mut tx)
            .await
            .map_err(Error::new)?;

        sqlx::query("DELETE FROM kv_sets WHERE k = ?")
            .bind(key)
            .execute(&mut tx)
            .await
            .map_err(Error::new)?;

        tx.commit().await.map_err(Error::new)
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut tx = self.pool.begin().await.map_err(Error::new)?;

        sqlx::query(
            "INSERT INTO kv_strings (k, v) VALUES (?, '1') \
            ON DUPLICATE KEY UPDATE v = CAST(CAST(v AS SIGNED) + 1 AS CHAR)",
        )
        .bind(key)
        .execute(&mut tx)
        .await
        .map_err(Error::new)?;

        let row = sqlx::query("SELECT v FROM kv_strings WHERE k = ?")
            .bind(key)
            .fetch_one(&mut tx)
            .await
            .map_err(Error::new)?;

        tx.commit().await.map_err(Error::new)?;

        let value: String = row.try_get(0).map_err(Error::new)?;
        value.parse().map_err(Error::new)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool> {
        let res = sqlx::query("INSERT IGNORE INTO kv_sets (k, member) VALUES (?, ?)")
            .bind(key)
            .bind(member)
            .execute(&self.pool)
            .await
            .map_err(Error::new)?;

        Ok(res.rows_affected() > 0)
    }

    async fn srem(&self, key: &str, member: &str) -> Result<bool> {
        let res = sqlx::query("DELETE FROM kv_sets WHERE k = ? AND member = ?")
            .bind(key)
            .bind(member)
            .execute(&self.pool)
            .await
            .map_err(Error::new)?;

        Ok(res.rows_affected() > 0)
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        let mut rows = sqlx::query("SELECT member FROM kv_sets WHERE k = ? ORDER BY member")
            .bind(key)
            .fetch(&self.pool);

        let mut members = Vec::new();
        while let Some(row) = rows.try_next().await.map_err(Error::new)? {
            members.push(row.try_get(0).map_err(Error::new)?);
        }

        Ok(members)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM kv_strings WHERE k = ? UNION SELECT 1 FROM kv_sets WHERE k = ? LIMIT 1",
        )
        .bind(key)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::new)?;

        Ok(row.is_some())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let pattern = like_prefix(prefix);

        let mut rows = sqlx::query(
            "SELECT k FROM kv_strings WHERE k LIKE ? \
            UNION SELECT k FROM kv_sets WHERE k LIKE ? ORDER BY k",
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch(&self.pool);

        let mut keys = Vec::new();
        while let Some(row) = rows.try_next().await.map_err(Error::new)? {
            keys.push(row.try_get(0).map_err(Error::new)?);
        }

        Ok(keys)
    }
}

/// Builds a `LIKE` pattern matching all strings starting with `prefix`.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);

    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }

    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::like_prefix;

    #[test]
    fn test_like_prefix() {
        assert_eq!(like_prefix("guild_prefix:"), "guild\\_prefix:%");
        assert_eq!(like_prefix("100%"), "100\\%%");
        assert_eq!(like_prefix(""), "%");
    }
}

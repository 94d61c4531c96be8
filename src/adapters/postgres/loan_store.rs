use crate::domain::{
    loan::Loan,
    value_objects::{BookId, LoanId, UserId},
};
use crate::ports::loan_store::LoanStore as LoanStoreTrait;
use crate::ports::store_error::{Result, StoreError};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use sqlx::{PgPool, Row, postgres::PgRow};

/// PostgreSQLの行データをLoanに変換する
fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    let user_id: String = row.try_get("user_id")?;

    Ok(Loan {
        loan_id: LoanId::from_uuid(row.try_get("id")?),
        book_id: BookId::from_uuid(row.try_get("book_id")?),
        user_id: UserId::new(user_id),
        borrowed_at: row.try_get("borrowed_at")?,
        due_at: row.try_get("due_at")?,
        returned_at: row.try_get("returned_at")?,
    })
}

/// LoanStoreのPostgreSQL実装
///
/// 「利用者ごとに未返却は1件まで」は部分一意インデックス
/// `loans_one_active_per_user` で保証する。
pub struct LoanStore {
    pool: PgPool,
}

impl LoanStore {
    /// PostgreSQLコネクションプールから新しいLoanStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanStoreTrait for LoanStore {
    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT id, book_id, user_id, borrowed_at, due_at, returned_at
            FROM loans
            WHERE id = $1
            "#,
        )
        .bind(loan_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    async fn find_active_by_user(&self, user_id: &UserId) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT id, book_id, user_id, borrowed_at, due_at, returned_at
            FROM loans
            WHERE user_id = $1 AND returned_at IS NULL
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT id, book_id, user_id, borrowed_at, due_at, returned_at
            FROM loans
            WHERE user_id = $1
            ORDER BY borrowed_at ASC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    async fn has_active_for_book(&self, book_id: BookId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM loans WHERE book_id = $1 AND returned_at IS NULL
            )
            "#,
        )
        .bind(book_id.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, loan: Loan) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO loans (id, book_id, user_id, borrowed_at, due_at, returned_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.book_id.value())
        .bind(loan.user_id.as_str())
        .bind(loan.borrowed_at)
        .bind(loan.due_at)
        .bind(loan.returned_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 未返却の行のみ置き換える
    ///
    /// 返却済みの貸出は不変のため、`returned_at IS NULL` を条件に含める。
    async fn update(&self, loan: Loan) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET book_id = $2,
                user_id = $3,
                borrowed_at = $4,
                due_at = $5,
                returned_at = $6
            WHERE id = $1 AND returned_at IS NULL
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.book_id.value())
        .bind(loan.user_id.as_str())
        .bind(loan.borrowed_at)
        .bind(loan.due_at)
        .bind(loan.returned_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict);
        }

        Ok(())
    }

    fn stream_all(&self) -> BoxStream<'_, Result<Loan>> {
        let stream = sqlx::query(
            r#"
            SELECT id, book_id, user_id, borrowed_at, due_at, returned_at
            FROM loans
            ORDER BY borrowed_at ASC
            "#,
        )
        .fetch(&self.pool)
        .map(|row_result| {
            let row = row_result?;
            map_row_to_loan(&row)
        });

        Box::pin(stream)
    }
}

use crate::application::dependencies::ServiceDependencies;
use crate::application::errors::{
    AttemptError, LendingError, Result, lost_race, retry_once_on_conflict,
};
use crate::domain::{
    self,
    book::{self, Book},
    commands::{BorrowBook, ReturnBook},
    loan::Loan,
    value_objects::{BookId, UserId},
};
use chrono::{DateTime, Utc};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use std::collections::HashMap;

use super::loan_view::{LoanView, build_loan_view};

/// 書籍を借りる
///
/// ビジネスルール（この順で確認）：
/// 1. 利用者に未返却の貸出がないこと（同時に1冊まで）
/// 2. 書籍が存在し、貸出可能な冊数が1以上であること
///
/// 確認から書き込みまでを利用者・書籍ごとのロックで直列化する。
/// ストアが並行書き込みを拒否した場合は1回だけやり直し、
/// それでも負けた場合は前提条件の失敗と同じエラーを返す。
///
/// # 戻り値
/// 作成された貸出のビュー（書籍タイトル解決済み）
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<LoanView> {
    let cmd = &cmd;
    retry_once_on_conflict(move || try_borrow_book(deps, cmd)).await
}

async fn try_borrow_book(
    deps: &ServiceDependencies,
    cmd: &BorrowBook,
) -> std::result::Result<LoanView, AttemptError> {
    let _user_guard = deps.locks.users.lock(cmd.user_id.clone()).await;

    // 1. 未返却の貸出の確認
    let active_loan = deps
        .loan_store
        .find_active_by_user(&cmd.user_id)
        .await
        .map_err(LendingError::Store)?;

    if active_loan.is_some() {
        return Err(LendingError::ActiveLoanExists.into());
    }

    let _book_guard = deps.locks.books.lock(cmd.book_id).await;

    // 2. 書籍の存在と在庫の確認
    let book = deps
        .catalog_store
        .get(cmd.book_id)
        .await
        .map_err(LendingError::Store)?
        .ok_or(LendingError::BookNotFound)?;

    let checked_out = book::check_out_copy(&book).map_err(|_| LendingError::BookUnavailable)?;

    // 3. ドメイン層の純粋関数で貸出を作成
    let now = deps.clock.now();
    let (loan, event) = domain::loan::borrow_book(cmd.book_id, cmd.user_id.clone(), now);

    // 4. 書籍を保存（読み取った版と一致する場合のみ）
    deps.catalog_store
        .update(checked_out.clone())
        .await
        .map_err(|e| lost_race(e, LendingError::BookUnavailable))?;

    // 5. 貸出を保存。失敗した場合は書籍の冊数を戻す
    if let Err(err) = deps.loan_store.insert(loan.clone()).await {
        if let Err(restore_err) = restock_book(deps, cmd.book_id).await {
            tracing::error!(
                book_id = %cmd.book_id,
                error = %restore_err,
                "Failed to restore book copy after loan insert failure"
            );
        }
        return Err(lost_race(err, LendingError::ActiveLoanExists));
    }

    tracing::info!(
        loan_id = %event.loan_id,
        book_id = %event.book_id,
        user_id = %event.user_id,
        due_at = %event.due_at,
        "Book borrowed"
    );

    Ok(build_loan_view(&loan, Some(&checked_out.title), now))
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 貸出が存在し、要求した利用者の貸出であること
///   （他人の貸出は存在しないものとして扱う）
/// - 既に返却済みでないこと
///
/// 書籍の貸出可能冊数を先に1冊戻し、その後で貸出を返却済みにする。
/// 貸出の保存に失敗した場合は戻した1冊を取り消すため、
/// どの段階で失敗しても貸出は未返却のまま残り、再度返却できる。
/// 書籍が削除済みの場合は冊数の更新を省略し、貸出だけを返却済みにする。
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<LoanView> {
    let cmd = &cmd;
    retry_once_on_conflict(move || try_return_book(deps, cmd)).await
}

async fn try_return_book(
    deps: &ServiceDependencies,
    cmd: &ReturnBook,
) -> std::result::Result<LoanView, AttemptError> {
    let _user_guard = deps.locks.users.lock(cmd.user_id.clone()).await;

    // 1. 貸出の存在と所有者の確認
    let loan = deps
        .loan_store
        .get(cmd.loan_id)
        .await
        .map_err(LendingError::Store)?
        .filter(|loan| loan.user_id == cmd.user_id)
        .ok_or(LendingError::LoanNotFound)?;

    let _book_guard = deps.locks.books.lock(loan.book_id).await;

    // 2. ドメイン層の純粋関数で返却
    let now = deps.clock.now();
    let (returned, event) =
        domain::loan::return_book(&loan, now).map_err(|_| LendingError::AlreadyReturned)?;

    // 3. 書籍を書架に戻す
    let book = restock_book(deps, loan.book_id).await?;

    // 4. 貸出を保存（未返却の場合のみ）。失敗したら書籍の冊数を元に戻す
    if let Err(err) = deps.loan_store.update(returned.clone()).await {
        if book.is_some() {
            if let Err(undo_err) = withdraw_copy(deps, loan.book_id).await {
                tracing::error!(
                    book_id = %loan.book_id,
                    error = %undo_err,
                    "Failed to withdraw restocked copy after loan update failure"
                );
            }
        }
        return Err(lost_race(err, LendingError::AlreadyReturned));
    }

    if book.is_none() {
        tracing::warn!(
            loan_id = %loan.loan_id,
            book_id = %loan.book_id,
            "Returned loan references a deleted book"
        );
    }

    tracing::info!(
        loan_id = %event.loan_id,
        book_id = %event.book_id,
        user_id = %event.user_id,
        was_overdue = event.was_overdue,
        "Book returned"
    );

    Ok(build_loan_view(
        &returned,
        book.as_ref().map(|b| b.title.as_str()),
        now,
    ))
}

/// 貸出可能冊数の増減
#[derive(Debug, Clone, Copy)]
enum CopyMove {
    /// 書架に1冊戻す
    Restock,
    /// 書架から1冊取り出す
    Withdraw,
}

/// 書籍の貸出可能冊数を1冊戻す
///
/// 呼び出し側が書籍のロックを保持していること。
/// 書籍が削除済みの場合は`None`を返す。
async fn restock_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Option<Book>> {
    retry_once_on_conflict(|| try_move_copy(deps, book_id, CopyMove::Restock)).await
}

/// 書籍の貸出可能冊数を1冊減らす（返却の取り消し）
async fn withdraw_copy(deps: &ServiceDependencies, book_id: BookId) -> Result<Option<Book>> {
    retry_once_on_conflict(|| try_move_copy(deps, book_id, CopyMove::Withdraw)).await
}

async fn try_move_copy(
    deps: &ServiceDependencies,
    book_id: BookId,
    direction: CopyMove,
) -> std::result::Result<Option<Book>, AttemptError> {
    let Some(book) = deps
        .catalog_store
        .get(book_id)
        .await
        .map_err(LendingError::Store)?
    else {
        return Ok(None);
    };

    let moved = match direction {
        CopyMove::Restock => {
            book::restock_copy(&book).map_err(|_| LendingError::InventoryMismatch)?
        }
        CopyMove::Withdraw => {
            book::check_out_copy(&book).map_err(|_| LendingError::InventoryMismatch)?
        }
    };

    deps.catalog_store
        .update(moved.clone())
        .await
        .map_err(|e| lost_race(e, LendingError::ConcurrentUpdate))?;

    Ok(Some(moved))
}

/// 利用者の貸出一覧（返却済みを含む）
pub async fn list_user_loans(deps: &ServiceDependencies, user_id: &UserId) -> Result<Vec<LoanView>> {
    let loans = deps
        .loan_store
        .find_by_user(user_id)
        .await
        .map_err(LendingError::Store)?;

    resolve_loan_views(deps, loans).await
}

/// 全貸出の一覧
pub async fn list_all_loans(deps: &ServiceDependencies) -> Result<Vec<LoanView>> {
    let loans: Vec<Loan> = deps
        .loan_store
        .stream_all()
        .try_collect()
        .await
        .map_err(LendingError::Store)?;

    resolve_loan_views(deps, loans).await
}

/// 延滞中の貸出の一覧
pub async fn list_overdue_loans(deps: &ServiceDependencies) -> Result<Vec<LoanView>> {
    let loans: Vec<Loan> = scan_overdue(deps).try_collect().await?;
    resolve_loan_views(deps, loans).await
}

/// 延滞中の貸出を遅延評価で走査する
///
/// 未返却かつ返却期限が現在時刻より前の貸出だけを流す。
/// 読み取り専用で、呼び出しごとに現在の状態から計算し直す。
pub fn scan_overdue(deps: &ServiceDependencies) -> BoxStream<'_, Result<Loan>> {
    scan_overdue_at(deps, deps.clock.now())
}

pub(super) fn scan_overdue_at(
    deps: &ServiceDependencies,
    now: DateTime<Utc>,
) -> BoxStream<'_, Result<Loan>> {
    deps.loan_store
        .stream_all()
        .map_err(LendingError::Store)
        .try_filter(move |loan| futures::future::ready(domain::loan::is_overdue(loan, now)))
        .boxed()
}

/// 貸出ごとに書籍タイトルを解決してビューを組み立てる
///
/// 同じ書籍の読み込みは1回にまとめる。
async fn resolve_loan_views(
    deps: &ServiceDependencies,
    loans: Vec<Loan>,
) -> Result<Vec<LoanView>> {
    let now = deps.clock.now();
    let mut titles: HashMap<BookId, Option<String>> = HashMap::new();
    let mut views = Vec::with_capacity(loans.len());

    for loan in loans {
        if !titles.contains_key(&loan.book_id) {
            let title = deps
                .catalog_store
                .get(loan.book_id)
                .await
                .map_err(LendingError::Store)?
                .map(|book| book.title);
            titles.insert(loan.book_id, title);
        }

        let title = titles.get(&loan.book_id).and_then(|t| t.as_deref());
        views.push(build_loan_view(&loan, title, now));
    }

    Ok(views)
}

use crate::application::dependencies::ServiceDependencies;
use crate::application::errors::Result;
use crate::domain::{self, events::LoanBecameOverdue};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use super::loan_service::scan_overdue_at;

/// 延滞検出の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueReport {
    pub scanned_at: DateTime<Utc>,
    pub overdue: Vec<LoanBecameOverdue>,
}

/// 延滞検出バッチ
///
/// 延滞中の貸出を走査し、1件ごとにLoanBecameOverdueを報告する。
///
/// ビジネスルール：
/// - 返却期限を過ぎた未返却の貸出を延滞とする
/// - 貸出も書籍も変更しない（自動返却は行わない）
/// - 毎回現在の状態から計算し直すため、延滞が続く限り毎回報告される
pub async fn detect_overdue_loans(deps: &ServiceDependencies) -> Result<OverdueReport> {
    let scanned_at = deps.clock.now();
    let mut overdue = Vec::new();

    let mut loans = scan_overdue_at(deps, scanned_at);
    while let Some(loan) = loans.try_next().await? {
        if let Some(event) = domain::loan::detect_overdue(&loan, scanned_at) {
            tracing::warn!(
                loan_id = %event.loan_id,
                book_id = %event.book_id,
                user_id = %event.user_id,
                due_at = %event.due_at,
                "Loan is overdue"
            );
            overdue.push(event);
        }
    }

    tracing::info!(count = overdue.len(), "Overdue scan completed");

    Ok(OverdueReport {
        scanned_at,
        overdue,
    })
}

/// 延滞検出バッチを一定間隔で実行し続ける
///
/// 最初の検出は起動直後に行う。失敗はログに残して次の周期を待つ。
pub async fn run_overdue_sweeper(deps: ServiceDependencies, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if let Err(err) = detect_overdue_loans(&deps).await {
            tracing::error!(error = %err, "Overdue scan failed");
        }
    }
}

/*
 * Responsibility
 * - gateway authorizer プロセスのエントリポイント
 * - tokio runtime 上で app::run() を呼ぶだけ (decision ロジックは services::authz)
 */
use anyhow::Result;

mod api;
mod app;
mod config;
mod error;
mod middleware;
mod services;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    app::run().await
}

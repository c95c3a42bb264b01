/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Authorizer は起動後 read-only なので Arc で共有するだけ (同期不要)
 */
use std::sync::Arc;

use crate::services::authz::Authorizer;

#[derive(Clone, Debug)]
pub struct AppState {
    pub authorizer: Arc<Authorizer>,
}

impl AppState {
    pub fn new(authorizer: Arc<Authorizer>) -> Self {
        Self { authorizer }
    }
}

use bcrypt::{hash, DEFAULT_COST};
use rand::{distributions::Alphanumeric, Rng};

use crate::errors::SystemError;

const PLACEHOLDER_PASSWORD_LEN: usize = 16;

/// 匯入時建立的帳號給一組隨機密碼，員工之後需自行重設
pub fn placeholder_password_hash() -> Result<String, SystemError> {
    let password: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PLACEHOLDER_PASSWORD_LEN)
        .map(char::from)
        .collect();

    hash(password, DEFAULT_COST).map_err(|_| SystemError::Internal("密碼哈希失敗".to_string()))
}

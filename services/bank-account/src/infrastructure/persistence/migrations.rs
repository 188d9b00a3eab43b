//! 账户服务数据库迁移

use bank_adapter_postgres::Migration;

/// users 表由身份服务维护，这里只保证外键所需的最小结构存在
const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

const CREATE_BANK_ACCOUNTS: &str = r#"
CREATE TABLE bank_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    unique_id VARCHAR(32) NOT NULL,
    name VARCHAR(35) NOT NULL,
    user_id UUID NOT NULL REFERENCES users(id),
    balance NUMERIC(18, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT bank_accounts_unique_id_key UNIQUE (unique_id),
    CONSTRAINT bank_accounts_balance_check CHECK (balance >= 0)
);

CREATE INDEX idx_bank_accounts_user_id ON bank_accounts (user_id, created_at);
"#;

/// 按版本排列的迁移
pub fn account_migrations() -> Vec<Migration> {
    vec![
        Migration::new(1, "create_users", CREATE_USERS),
        Migration::new(2, "create_bank_accounts", CREATE_BANK_ACCOUNTS),
    ]
}

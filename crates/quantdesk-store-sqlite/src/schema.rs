//! SQL schema for the Quantdesk SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Clients are never hard-deleted; status flips between 'active'/'inactive'.
CREATE TABLE IF NOT EXISTS clients (
    client_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT,
    status      TEXT NOT NULL DEFAULT 'active',
    created_at  TEXT NOT NULL
);

-- Read-mostly catalog of investment strategies.
CREATE TABLE IF NOT EXISTS strategies (
    strategy_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

-- The subscription ledger. Rows are superseded, never deleted.
CREATE TABLE IF NOT EXISTS subscriptions (
    subscription_id TEXT PRIMARY KEY,
    client_id       TEXT NOT NULL REFERENCES clients(client_id),
    strategy_id     TEXT NOT NULL REFERENCES strategies(strategy_id),
    current_aum     REAL NOT NULL DEFAULT 0,
    status          TEXT NOT NULL DEFAULT 'active',  -- 'active' | 'paused' | 'expired'
    start_date      TEXT NOT NULL,
    expiry_date     TEXT,                            -- ISO 8601 UTC or NULL
    created_at      TEXT NOT NULL,
    CHECK (current_aum >= 0)
);

-- Staff identities; user_id is shared with the external identity provider.
CREATE TABLE IF NOT EXISTS profiles (
    user_id     TEXT PRIMARY KEY,
    full_name   TEXT,
    email       TEXT,
    role        TEXT NOT NULL DEFAULT 'viewer',      -- 'super_admin' | 'manager' | 'viewer'
    avatar_url  TEXT,
    created_at  TEXT NOT NULL
);

-- (user, client) is unique; duplicate grants are idempotent no-ops.
CREATE TABLE IF NOT EXISTS manager_client_assignments (
    user_id     TEXT NOT NULL REFERENCES profiles(user_id),
    client_id   TEXT NOT NULL REFERENCES clients(client_id),
    assigned_by TEXT,
    assigned_at TEXT NOT NULL,
    PRIMARY KEY (user_id, client_id)
);

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS audit_events (
    event_id    TEXT PRIMARY KEY,
    at          TEXT NOT NULL,
    actor       TEXT,                                -- NULL for the sweeper
    action      TEXT NOT NULL,
    detail      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS subscriptions_client_idx  ON subscriptions(client_id);
CREATE INDEX IF NOT EXISTS subscriptions_status_idx  ON subscriptions(status);
CREATE INDEX IF NOT EXISTS subscriptions_expiry_idx  ON subscriptions(expiry_date);
CREATE INDEX IF NOT EXISTS subscriptions_created_idx ON subscriptions(created_at);
CREATE INDEX IF NOT EXISTS audit_events_at_idx       ON audit_events(at);

PRAGMA user_version = 1;
";

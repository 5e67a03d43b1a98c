//! SQL schema for the roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.
//!
//! The partial unique indexes back the roster invariants at the storage
//! level: one open assignment per person and per position, one occupant per
//! position, and unique order values within the active status kinds.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS status_kinds (
    status_kind_id TEXT PRIMARY KEY,
    code           TEXT NOT NULL UNIQUE,
    name           TEXT NOT NULL,
    sort_order     INTEGER NOT NULL DEFAULT 0,   -- 1..=n when active, 0 otherwise
    is_active      INTEGER NOT NULL DEFAULT 1,
    created_at     TEXT NOT NULL,
    modified_at    TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS status_kinds_active_order_idx
    ON status_kinds(sort_order) WHERE is_active = 1;

CREATE TABLE IF NOT EXISTS persons (
    person_id           TEXT PRIMARY KEY,
    national_id         TEXT NOT NULL UNIQUE,
    last_name           TEXT NOT NULL,
    first_name          TEXT NOT NULL,
    middle_name         TEXT,
    rank                TEXT,
    callsign            TEXT,
    weapon              TEXT,
    current_position_id TEXT REFERENCES position_units(position_id),
    created_at          TEXT NOT NULL,
    modified_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS position_units (
    position_id    TEXT PRIMARY KEY,
    code           TEXT NOT NULL UNIQUE,
    short_name     TEXT NOT NULL,
    special_number TEXT,
    org_path       TEXT NOT NULL DEFAULT '',
    is_active      INTEGER NOT NULL DEFAULT 1,
    occupant_id    TEXT REFERENCES persons(person_id),
    created_at     TEXT NOT NULL,
    modified_at    TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS position_units_occupant_idx
    ON position_units(occupant_id) WHERE occupant_id IS NOT NULL;

CREATE TABLE IF NOT EXISTS position_assignments (
    assignment_id TEXT PRIMARY KEY,
    person_id     TEXT NOT NULL REFERENCES persons(person_id),
    position_id   TEXT NOT NULL REFERENCES position_units(position_id),
    opened_at     TEXT NOT NULL,
    closed_at     TEXT,
    note          TEXT,
    created_at    TEXT NOT NULL,
    modified_at   TEXT NOT NULL,
    CHECK (closed_at IS NULL OR closed_at >= opened_at)
);

CREATE UNIQUE INDEX IF NOT EXISTS assignments_open_person_idx
    ON position_assignments(person_id) WHERE closed_at IS NULL;
CREATE UNIQUE INDEX IF NOT EXISTS assignments_open_position_idx
    ON position_assignments(position_id) WHERE closed_at IS NULL;

-- Status history is strictly append-only.
-- `sequence` is the insertion order used to break effective-time ties.
CREATE TABLE IF NOT EXISTS status_changes (
    sequence       INTEGER PRIMARY KEY AUTOINCREMENT,
    change_id      TEXT NOT NULL UNIQUE,
    person_id      TEXT NOT NULL REFERENCES persons(person_id),
    status_kind_id TEXT NOT NULL REFERENCES status_kinds(status_kind_id),
    effective_at   TEXT NOT NULL,
    note           TEXT,
    created_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS status_changes_person_idx
    ON status_changes(person_id, effective_at);

CREATE TABLE IF NOT EXISTS plan_actions (
    plan_action_id TEXT PRIMARY KEY,
    person_id      TEXT NOT NULL REFERENCES persons(person_id),
    kind           TEXT NOT NULL,                   -- 'dispatch' | 'return'
    effective_at   TEXT NOT NULL,
    destination    TEXT,
    note           TEXT,
    state          TEXT NOT NULL DEFAULT 'planned', -- 'planned' | 'approved' | 'cancelled'
    order_ref      TEXT,
    approved_at    TEXT,
    cancel_reason  TEXT,
    cancelled_at   TEXT,
    created_at     TEXT NOT NULL,
    modified_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS plan_actions_person_idx    ON plan_actions(person_id);
CREATE INDEX IF NOT EXISTS plan_actions_effective_idx ON plan_actions(effective_at);

PRAGMA user_version = 1;
";

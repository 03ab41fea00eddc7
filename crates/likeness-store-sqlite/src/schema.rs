//! SQL schema for the Likeness SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per distinct file content.
CREATE TABLE IF NOT EXISTS photos (
    photo_id     TEXT PRIMARY KEY,
    fingerprint  TEXT NOT NULL UNIQUE,   -- lowercase hex SHA-256
    path         TEXT NOT NULL,
    filename     TEXT NOT NULL,
    captured_at  TEXT,                   -- local time, %Y-%m-%dT%H:%M:%S%.f
    city         TEXT,
    country      TEXT,
    width        INTEGER,
    height       INTEGER,
    analyzed     INTEGER NOT NULL DEFAULT 0,
    imported_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS persons (
    person_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    centroid    BLOB,                    -- little-endian f32 array
    face_count  INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

-- Faces are never updated except for person_id.
CREATE TABLE IF NOT EXISTS faces (
    face_id      TEXT PRIMARY KEY,
    photo_id     TEXT NOT NULL REFERENCES photos(photo_id) ON DELETE CASCADE,
    person_id    TEXT REFERENCES persons(person_id) ON DELETE SET NULL,
    embedding    BLOB NOT NULL,          -- little-endian f32 array
    bbox_left    INTEGER NOT NULL,
    bbox_top     INTEGER NOT NULL,
    bbox_right   INTEGER NOT NULL,
    bbox_bottom  INTEGER NOT NULL,
    detected_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS faces_photo_idx    ON faces(photo_id);
CREATE INDEX IF NOT EXISTS faces_person_idx   ON faces(person_id);
CREATE INDEX IF NOT EXISTS photos_captured_idx ON photos(captured_at);

PRAGMA user_version = 1;
";

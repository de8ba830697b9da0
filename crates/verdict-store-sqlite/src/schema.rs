//! SQL schema for the Verdict SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS submissions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    remote_id   TEXT    NOT NULL UNIQUE,   -- natural key from the source
    title       TEXT    NOT NULL,
    body_text   TEXT    NOT NULL,
    created_utc INTEGER NOT NULL,          -- epoch seconds
    permalink   TEXT    NOT NULL,
    score       INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    remote_id            TEXT    NOT NULL UNIQUE,
    remote_submission_id TEXT    NOT NULL REFERENCES submissions(remote_id),
    parent_id            TEXT    NOT NULL,
    message              TEXT    NOT NULL,
    created_utc          INTEGER NOT NULL,
    score                INTEGER NOT NULL
);

-- One row per analyzed submission; always rewritten whole.
CREATE TABLE IF NOT EXISTS summaries (
    id              INTEGER PRIMARY KEY REFERENCES submissions(id),
    sentiment_score REAL    NOT NULL,
    emotion_scores  TEXT    NOT NULL,   -- JSON object: emotion -> count
    top_tokens      TEXT    NOT NULL,   -- JSON array of {token, count}
    keyword_counts  TEXT    NOT NULL,   -- JSON object: category -> count
    comment_count   INTEGER NOT NULL
);

-- Denormalized keyword counters; written in the same transaction as summaries.
CREATE TABLE IF NOT EXISTS breakdowns (
    id   INTEGER PRIMARY KEY REFERENCES submissions(id),
    nta  INTEGER NOT NULL DEFAULT 0,
    yta  INTEGER NOT NULL DEFAULT 0,
    esh  INTEGER NOT NULL DEFAULT 0,
    info INTEGER NOT NULL DEFAULT 0,
    nah  INTEGER NOT NULL DEFAULT 0
);

-- Model-generated narrative per submission.
CREATE TABLE IF NOT EXISTS narratives (
    id   INTEGER PRIMARY KEY REFERENCES submissions(id),
    text TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS submissions_created_idx ON submissions(created_utc);
CREATE INDEX IF NOT EXISTS submissions_score_idx   ON submissions(score);
CREATE INDEX IF NOT EXISTS comments_submission_idx ON comments(remote_submission_id);

-- External-content full-text index over submissions, kept current by triggers.
CREATE VIRTUAL TABLE IF NOT EXISTS submission_fts USING fts5(
    title,
    body_text,
    content = 'submissions',
    content_rowid = 'id'
);

CREATE TRIGGER IF NOT EXISTS submissions_fts_insert AFTER INSERT ON submissions BEGIN
    INSERT INTO submission_fts (rowid, title, body_text)
    VALUES (new.id, new.title, new.body_text);
END;

CREATE TRIGGER IF NOT EXISTS submissions_fts_delete AFTER DELETE ON submissions BEGIN
    INSERT INTO submission_fts (submission_fts, rowid, title, body_text)
    VALUES ('delete', old.id, old.title, old.body_text);
END;

CREATE TRIGGER IF NOT EXISTS submissions_fts_update AFTER UPDATE ON submissions BEGIN
    INSERT INTO submission_fts (submission_fts, rowid, title, body_text)
    VALUES ('delete', old.id, old.title, old.body_text);
    INSERT INTO submission_fts (rowid, title, body_text)
    VALUES (new.id, new.title, new.body_text);
END;

PRAGMA user_version = 1;
";

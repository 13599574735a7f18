//! SQL schema for the Vigie SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision; there is no migration step beyond that.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Violations are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS violations (
    id_poursuite   INTEGER PRIMARY KEY,   -- upstream identifier; dedup key
    business_id    INTEGER NOT NULL,
    date           TEXT NOT NULL,         -- verbatim, normally YYYYMMDD
    description    TEXT NOT NULL,
    adresse        TEXT NOT NULL,
    date_jugement  TEXT,
    etablissement  TEXT NOT NULL,
    montant        TEXT NOT NULL,         -- verbatim
    proprietaire   TEXT NOT NULL,
    ville          TEXT NOT NULL,
    statut         TEXT NOT NULL,
    date_statut    TEXT,
    categorie      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS violations_date_idx          ON violations(date);
CREATE INDEX IF NOT EXISTS violations_establishment_idx ON violations(etablissement);

PRAGMA user_version = 1;
";

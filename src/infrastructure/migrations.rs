//! Schema migration registry.
//!
//! The registry is the single ordered list of schema changes for the
//! PostgreSQL store. Versions start at 1 and increase by exactly 1; append new
//! entries at the end and never edit an entry that has shipped.

use crate::domain::entities::Migration;

pub static MIGRATIONS: &[Migration] = &[
    Migration::new(
        1,
        "create_links",
        r#"
        CREATE TABLE links (
            short_code       VARCHAR(16) NOT NULL,
            original_url     TEXT        NOT NULL,
            created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            transition_count BIGINT      NOT NULL DEFAULT 0,
            CONSTRAINT links_pkey PRIMARY KEY (short_code),
            CONSTRAINT links_transition_count_non_negative CHECK (transition_count >= 0)
        )
        "#,
    )
    .reversible("DROP TABLE links"),
    Migration::new(
        2,
        "links_created_at_index",
        "CREATE INDEX links_created_at_idx ON links (created_at DESC)",
    )
    .reversible("DROP INDEX links_created_at_idx"),
    Migration::new(
        3,
        "links_original_url_index",
        "CREATE INDEX links_original_url_idx ON links USING HASH (original_url)",
    )
    .reversible("DROP INDEX links_original_url_idx"),
];

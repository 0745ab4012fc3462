pub(super) const UPSERT_KV: &str = r#"
    INSERT INTO kv_store (key, value, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

pub(super) const SELECT_KV: &str = r#"
    SELECT value FROM kv_store WHERE key = ?1
"#;

pub(super) const DELETE_KV: &str = r#"
    DELETE FROM kv_store WHERE key = ?1
"#;

pub(super) const INSERT_OUTGOING: &str = r#"
    INSERT INTO outgoing_queue (local_id, payload, created_req_id, created_at)
    VALUES (?1, ?2, ?3, ?4)
"#;

pub(super) const SELECT_OUTGOING: &str = r#"
    SELECT local_id, payload, created_req_id, created_at
    FROM outgoing_queue
    ORDER BY created_at ASC, id ASC
"#;

pub(super) const CONFIRM_OUTGOING: &str = r#"
    UPDATE outgoing_queue
    SET created_req_id = ?2
    WHERE local_id = ?1
"#;

pub(super) const DELETE_OUTGOING: &str = r#"
    DELETE FROM outgoing_queue WHERE local_id = ?1
"#;

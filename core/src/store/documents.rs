//! Store methods for the save and preferences documents.

use crate::{error::SimResult, types::Timestamp};
use rusqlite::{params, OptionalExtension};

use super::SimStore;

impl SimStore {
    // ── Save document ─────────────────────────────────────────────────

    /// Write (or replace) the save payload of `slot`.
    pub fn put_save(&self, slot: &str, payload: &str, saved_at: Timestamp) -> SimResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO save_document (slot, payload, saved_at)
             VALUES (?1, ?2, ?3)",
            params![slot, payload, saved_at],
        )?;
        Ok(())
    }

    pub fn get_save(&self, slot: &str) -> SimResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM save_document WHERE slot = ?1",
                params![slot],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    /// Delete the save of `slot`. Returns true when a row was removed.
    pub fn delete_save(&self, slot: &str) -> SimResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM save_document WHERE slot = ?1", params![slot])?;
        Ok(removed > 0)
    }

    // ── Preferences document ──────────────────────────────────────────

    pub fn put_preferences(&self, slot: &str, payload: &str, saved_at: Timestamp) -> SimResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO preferences_document (slot, payload, saved_at)
             VALUES (?1, ?2, ?3)",
            params![slot, payload, saved_at],
        )?;
        Ok(())
    }

    pub fn get_preferences(&self, slot: &str) -> SimResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM preferences_document WHERE slot = ?1",
                params![slot],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    // ── Test / summary helpers ────────────────────────────────────────

    /// Timestamp of the last save of `slot`, if any.
    pub fn save_timestamp(&self, slot: &str) -> SimResult<Option<Timestamp>> {
        let saved_at = self
            .conn
            .query_row(
                "SELECT saved_at FROM save_document WHERE slot = ?1",
                params![slot],
                |row| row.get(0),
            )
            .optional()?;
        Ok(saved_at)
    }
}

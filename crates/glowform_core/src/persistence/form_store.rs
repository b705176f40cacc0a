use super::{KeyValueStore, StoreResult};
use crate::model::form::{FormConfig, FormId};
use log::{info, warn};

/// Prefix for every stored form entry.
pub const FORM_KEY_PREFIX: &str = "feedback_form_";
/// Origin used for share links when none is configured.
pub const DEFAULT_SHARE_BASE: &str = "https://example.com";

/// Derives the storage key for a form.
pub fn form_key(id: FormId) -> String {
    format!("{FORM_KEY_PREFIX}{id}")
}

/// Saves, loads and links form snapshots over a key-value backend.
pub struct FormStore<S: KeyValueStore> {
    store: S,
    share_base: String,
}

impl<S: KeyValueStore> FormStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_share_base(store, DEFAULT_SHARE_BASE)
    }

    /// Uses `share_base` as the origin of share URLs. Trailing `/` is trimmed.
    pub fn with_share_base(store: S, share_base: impl Into<String>) -> Self {
        let share_base = share_base.into().trim_end_matches('/').to_string();
        Self { store, share_base }
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Writes the full configuration, replacing any earlier snapshot.
    ///
    /// An ill-formed configuration is rejected and the stored snapshot,
    /// if any, is left untouched.
    pub fn save(&mut self, config: &FormConfig) -> StoreResult<()> {
        if let Err(err) = config.validate() {
            warn!(
                "event=form_save module=persistence status=rejected form_id={} error={}",
                config.id, err
            );
            return Err(err.into());
        }
        let payload = serde_json::to_string(config)?;
        self.store.set(&form_key(config.id), &payload)?;
        info!(
            "event=form_save module=persistence status=ok form_id={} field_count={}",
            config.id,
            config.fields.len()
        );
        Ok(())
    }

    /// Reads a snapshot back.
    ///
    /// Missing entries, backend read errors and malformed payloads all
    /// yield `None`.
    pub fn load(&self, id: FormId) -> Option<FormConfig> {
        let raw = match self.store.get(&form_key(id)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(
                    "event=form_load module=persistence status=error form_id={} error={}",
                    id, err
                );
                return None;
            }
        };

        match serde_json::from_str::<FormConfig>(&raw) {
            Ok(config) => Some(config),
            Err(err) => {
                warn!(
                    "event=form_load module=persistence status=error form_id={} error_code=malformed_payload line={} column={}",
                    id,
                    err.line(),
                    err.column()
                );
                None
            }
        }
    }

    pub fn remove(&mut self, id: FormId) -> StoreResult<()> {
        self.store.remove(&form_key(id))
    }

    /// Share link for a form. Does not check that the form exists.
    pub fn url(&self, id: FormId) -> String {
        format!("{}/feedback/{id}", self.share_base)
    }
}

use chrono::Utc;
use contracts::shared::autosave::Autosave;
use contracts::shared::form::FormController;
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use super::storage::LocalStorage;

/// Ticks `autosave` every `interval_secs` until the form or the autosave
/// handle is disposed.
pub fn start_autosave(
    form: RwSignal<FormController>,
    autosave: StoredValue<Autosave<LocalStorage>>,
    interval_secs: u64,
) {
    let interval_ms = interval_secs.saturating_mul(1000).min(u32::MAX as u64) as u32;
    spawn_local(async move {
        loop {
            TimeoutFuture::new(interval_ms).await;
            let tick = form.try_with_untracked(|f| {
                autosave.try_update_value(|a| a.tick(f, Utc::now()))
            });
            match tick.flatten() {
                Some(Ok(_)) => {}
                Some(Err(e)) => log::warn!("autosave failed: {}", e),
                None => {
                    log::debug!("autosave stopped");
                    break;
                }
            }
        }
    });
}

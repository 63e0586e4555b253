//! Field session: the data side of the field UI.
//!
//! A [`FieldSession`] owns the local view of one field (cached value,
//! binding state, reload counter) and runs the editor's actions against
//! the host. Each action supersedes the previous one: starting an action
//! cancels whatever is still in flight, and a cancelled action never
//! writes to the field.
//!
//! Actions never fail loudly. Problems are shown through the host
//! notifier and reported as [`ActionOutcome::Failed`]; the field keeps
//! its last known-good value.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use brandlink_core::actions::{available_actions, FieldAction};
use brandlink_core::clock::{Clock, TokioClock};
use brandlink_core::config::FieldSettings;
use brandlink_core::notice::{
    Notice, MSG_FIELD_WRITE_FAILED, MSG_NATIVE_FETCH_FAILED, MSG_NEW_ASSET_FAILED,
    MSG_NEW_ASSET_NOT_READY, MSG_NO_EXTERNAL_SELECTION,
};
use brandlink_core::reload::{ReloadAffordance, ReloadPolicy};
use brandlink_core::state::BindingEvent;
use brandlink_core::{AssetBindingState, ContentHost, UnifiedAsset};
use brandlink_events::Subscription;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::binder::AssetBinder;
use crate::readiness::{await_ready, PollConfig, ReadinessError};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// How an editor action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The field was written or cleared.
    Applied,
    /// Nothing to do: picker cancelled, or action not valid for the value.
    NoOp,
    /// Superseded by a newer action or session shutdown; nothing written.
    Abandoned,
    /// Failed; a notice was shown and the field is unchanged.
    Failed,
}

/// What the field should render for its current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub title: String,
    /// Image to show; `None` means show `title` as a placeholder.
    pub image_url: Option<String>,
    pub affordance: ReloadAffordance,
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempts {
    Reset,
    Increment,
}

struct LocalState {
    value: Option<UnifiedAsset>,
    state: AssetBindingState,
    reload_attempts: u32,
    /// Token of the action currently allowed to write.
    action: CancellationToken,
    /// Number of remote changes applied so far.
    remote_changes: u64,
}

struct Inner {
    host: Arc<dyn ContentHost>,
    binder: AssetBinder,
    clock: Arc<dyn Clock>,
    poll: PollConfig,
    policy: ReloadPolicy,
    local: Mutex<LocalState>,
    /// Held across every field write or clear, so a superseded action
    /// cannot land after the action that replaced it.
    writes: tokio::sync::Mutex<()>,
    /// Cancelled on shutdown; parent of every action token.
    root: CancellationToken,
}

impl Inner {
    fn local(&self) -> MutexGuard<'_, LocalState> {
        self.local.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, event: BindingEvent) {
        let mut local = self.local();
        let current = std::mem::take(&mut local.state);
        local.state = current.apply(event);
    }

    /// Apply a value received from the host's change feed.
    fn apply_remote(&self, value: Option<UnifiedAsset>) {
        let mut local = self.local();
        local.remote_changes += 1;
        if local.value == value {
            return;
        }
        let previous_id = local.value.as_ref().and_then(|v| v.native_id().map(str::to_string));
        let next_id = value.as_ref().and_then(|v| v.native_id());
        if previous_id.as_deref() != next_id {
            local.reload_attempts = 0;
        }
        if value.is_none() && !local.state.is_busy() {
            local.state = AssetBindingState::Idle;
        }
        tracing::debug!(cleared = value.is_none(), "Field value changed remotely");
        local.value = value;
    }
}

// ---------------------------------------------------------------------------
// FieldSession
// ---------------------------------------------------------------------------

/// One editor's session on one asset field.
pub struct FieldSession {
    inner: Arc<Inner>,
    subscription: Mutex<Option<Subscription>>,
}

impl FieldSession {
    /// Create a session that sleeps on the tokio timer.
    pub fn new(host: Arc<dyn ContentHost>, settings: FieldSettings) -> Self {
        Self::with_clock(host, settings, Arc::new(TokioClock))
    }

    /// Create a session with an explicit clock for the readiness poller.
    pub fn with_clock(
        host: Arc<dyn ContentHost>,
        settings: FieldSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let root = CancellationToken::new();
        let inner = Inner {
            binder: AssetBinder::new(Arc::clone(&host)),
            host,
            clock,
            poll: PollConfig::from(&settings),
            policy: ReloadPolicy::new(settings.reload_threshold),
            local: Mutex::new(LocalState {
                value: None,
                state: AssetBindingState::Idle,
                reload_attempts: 0,
                action: root.child_token(),
                remote_changes: 0,
            }),
            writes: tokio::sync::Mutex::new(()),
            root,
        };
        Self {
            inner: Arc::new(inner),
            subscription: Mutex::new(None),
        }
    }

    /// Follow field changes and load the field's current value.
    ///
    /// The change feed is joined before the initial read, and a change
    /// delivered while that read is in flight wins over it.
    pub async fn start(&self) {
        let inner = Arc::clone(&self.inner);
        let subscription = self
            .inner
            .binder
            .subscribe(move |value| inner.apply_remote(value));
        *self.subscription_slot() = Some(subscription);

        let seen = self.inner.local().remote_changes;
        let current = self.inner.binder.current().await;
        {
            let mut local = self.inner.local();
            if local.remote_changes == seen {
                if current.is_some() {
                    local.state = AssetBindingState::Bound;
                }
                local.value = current;
            } else {
                tracing::debug!("Initial field value superseded by a remote change");
            }
        }
        tracing::info!(locale = self.inner.host.locale(), "Field session started");
    }

    /// Cancel pending work and stop following field changes.
    pub async fn shutdown(&self) {
        self.inner.root.cancel();
        let subscription = self.subscription_slot().take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe().await;
        }
        tracing::info!("Field session shut down");
    }

    // ---- read side ----

    pub fn value(&self) -> Option<UnifiedAsset> {
        self.inner.local().value.clone()
    }

    pub fn state(&self) -> AssetBindingState {
        self.inner.local().state.clone()
    }

    pub fn reload_attempts(&self) -> u32 {
        self.inner.local().reload_attempts
    }

    pub fn binder(&self) -> &AssetBinder {
        &self.inner.binder
    }

    /// Actions offered for the current value.
    pub fn actions(&self) -> Vec<FieldAction> {
        available_actions(self.inner.local().value.as_ref())
    }

    /// Preview of the current value, `None` when the field is empty.
    pub fn preview(&self) -> Option<Preview> {
        let local = self.inner.local();
        let asset = local.value.as_ref()?;
        Some(Preview {
            title: asset.title().to_string(),
            image_url: asset
                .is_previewable()
                .then(|| asset.thumbnail_url().to_string()),
            affordance: self.inner.policy.affordance(asset, local.reload_attempts),
        })
    }

    // ---- actions ----

    /// Run `action` as chosen from the field's menu.
    pub async fn run(&self, action: FieldAction) -> ActionOutcome {
        match action {
            FieldAction::AddExisting | FieldAction::ReplaceWithNative => self.add_existing().await,
            FieldAction::AddNew => self.add_new().await,
            FieldAction::ImportExternal | FieldAction::ReplaceWithExternal => {
                self.import_external().await
            }
            FieldAction::EditNative => self.open_editor().await,
            FieldAction::ReloadNative => self.reload().await,
            FieldAction::Remove => self.remove().await,
        }
    }

    /// Pick an existing native asset and bind it.
    pub async fn add_existing(&self) -> ActionOutcome {
        let token = self.begin_action();

        let picked = match guarded(&token, self.inner.host.select_asset_dialog()).await {
            None => return ActionOutcome::Abandoned,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Asset picker failed");
                return self.fail(MSG_NATIVE_FETCH_FAILED);
            }
            Some(Ok(None)) => return ActionOutcome::NoOp,
            Some(Ok(Some(id))) => id,
        };

        match guarded(&token, self.inner.binder.bind_native(&picked)).await {
            None => ActionOutcome::Abandoned,
            Some(Err(_)) => self.fail(MSG_NATIVE_FETCH_FAILED),
            Some(Ok(asset)) => self.commit(&token, asset, Attempts::Reset).await,
        }
    }

    /// Create a native asset, wait for it to be processed and bind it.
    ///
    /// The reference is stored even when the asset is not ready within
    /// the poll budget; the editor is told to reload later.
    pub async fn add_new(&self) -> ActionOutcome {
        let token = self.begin_action();

        let asset_id = match guarded(&token, self.inner.host.create_asset_flow()).await {
            None => return ActionOutcome::Abandoned,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Create-asset flow failed");
                return self.fail(MSG_NEW_ASSET_FAILED);
            }
            Some(Ok(None)) => return ActionOutcome::NoOp,
            Some(Ok(Some(id))) => id,
        };

        self.inner
            .transition(BindingEvent::PollStarted(asset_id.clone()));
        tracing::info!(asset_id = %asset_id, "Waiting for new asset to be processed");

        let polled = await_ready(
            self.inner.host.as_ref(),
            self.inner.clock.as_ref(),
            &asset_id,
            &self.inner.poll,
            &token,
        )
        .await;

        let asset = match polled {
            Ok(Some(ready)) => UnifiedAsset::from_host_asset(&ready, self.inner.host.locale()),
            Ok(None) => UnifiedAsset::unresolved_native(asset_id.clone()),
            Err(ReadinessError::Cancelled) => {
                self.abandon_poll(&asset_id);
                return ActionOutcome::Abandoned;
            }
            Err(ReadinessError::Host(_)) => return self.fail(MSG_NEW_ASSET_FAILED),
        };

        let previewable = asset.is_previewable();
        let outcome = self.commit(&token, asset, Attempts::Reset).await;
        if outcome == ActionOutcome::Abandoned {
            self.abandon_poll(&asset_id);
        }
        if outcome == ActionOutcome::Applied && !previewable {
            self.inner.host.notify(Notice::warning(MSG_NEW_ASSET_NOT_READY));
        }
        outcome
    }

    /// Open the external search dialog and bind its selection.
    pub async fn import_external(&self) -> ActionOutcome {
        let token = self.begin_action();

        let selected = match guarded(&token, self.inner.host.open_search_dialog()).await {
            None => return ActionOutcome::Abandoned,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Search dialog failed");
                return self.fail(MSG_NO_EXTERNAL_SELECTION);
            }
            Some(Ok(None)) => return ActionOutcome::NoOp,
            Some(Ok(Some(result))) => result,
        };

        match self.inner.binder.bind_external(&selected) {
            Ok(asset) => self.commit(&token, asset, Attempts::Reset).await,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected external selection");
                self.fail(MSG_NO_EXTERNAL_SELECTION)
            }
        }
    }

    /// Clear the field, cancelling anything in flight.
    pub async fn remove(&self) -> ActionOutcome {
        let token = self.begin_action();

        let _write = self.inner.writes.lock().await;
        if token.is_cancelled() {
            return ActionOutcome::Abandoned;
        }
        if self.inner.binder.clear().await.is_err() {
            return self.fail(MSG_FIELD_WRITE_FAILED);
        }

        {
            let mut local = self.inner.local();
            local.value = None;
            local.reload_attempts = 0;
        }
        self.inner.transition(BindingEvent::Cleared);
        ActionOutcome::Applied
    }

    /// Re-fetch the bound native asset. Counts towards the reload threshold.
    pub async fn reload(&self) -> ActionOutcome {
        let Some(asset_id) = self.native_id() else {
            return ActionOutcome::NoOp;
        };
        let token = self.begin_action();

        match guarded(&token, self.inner.binder.bind_native(&asset_id)).await {
            None => ActionOutcome::Abandoned,
            Some(Err(_)) => self.fail(MSG_NATIVE_FETCH_FAILED),
            Some(Ok(asset)) => self.commit(&token, asset, Attempts::Increment).await,
        }
    }

    /// Open the bound native asset in the host editor, then reload it
    /// with a fresh reload counter.
    pub async fn open_editor(&self) -> ActionOutcome {
        let Some(asset_id) = self.native_id() else {
            return ActionOutcome::NoOp;
        };
        let token = self.begin_action();

        match guarded(&token, self.inner.host.open_asset_editor(&asset_id)).await {
            None => return ActionOutcome::Abandoned,
            Some(Err(e)) => {
                tracing::warn!(asset_id = %asset_id, error = %e, "Asset editor failed");
                return self.fail(MSG_NATIVE_FETCH_FAILED);
            }
            Some(Ok(())) => {}
        }

        self.inner.local().reload_attempts = 0;
        self.reload().await
    }

    // ---- private helpers ----

    fn subscription_slot(&self) -> MutexGuard<'_, Option<Subscription>> {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn native_id(&self) -> Option<String> {
        self.inner
            .local()
            .value
            .as_ref()
            .and_then(|v| v.native_id().map(str::to_string))
    }

    /// Supersede the current action and return the new action's token.
    fn begin_action(&self) -> CancellationToken {
        let token = self.inner.root.child_token();
        let previous = std::mem::replace(&mut self.inner.local().action, token.clone());
        previous.cancel();
        token
    }

    /// Write `asset` unless `token` was superseded, then update local state.
    ///
    /// The write lock orders this write against any newer action's write
    /// or clear. If the action is superseded while its write is in flight,
    /// local state is left to the newer action.
    async fn commit(
        &self,
        token: &CancellationToken,
        asset: UnifiedAsset,
        attempts: Attempts,
    ) -> ActionOutcome {
        let _write = self.inner.writes.lock().await;
        if token.is_cancelled() {
            return ActionOutcome::Abandoned;
        }

        let written = self.inner.binder.write(&asset).await;
        if token.is_cancelled() {
            tracing::debug!("Field write superseded by a newer action");
            return ActionOutcome::Abandoned;
        }
        if written.is_err() {
            return self.fail(MSG_FIELD_WRITE_FAILED);
        }

        {
            let mut local = self.inner.local();
            local.value = Some(asset);
            local.reload_attempts = match attempts {
                Attempts::Reset => 0,
                Attempts::Increment => local.reload_attempts + 1,
            };
        }
        self.inner.transition(BindingEvent::Resolved);
        ActionOutcome::Applied
    }

    /// Leave `Polling` for `asset_id` if no newer action took over.
    fn abandon_poll(&self, asset_id: &str) {
        let polling_this = matches!(
            &self.inner.local().state,
            AssetBindingState::Polling { asset_id: id } if id == asset_id
        );
        if polling_this {
            self.inner.transition(BindingEvent::Abandoned);
        }
    }

    fn fail(&self, message: &str) -> ActionOutcome {
        self.inner.host.notify(Notice::error(message));
        self.inner.transition(BindingEvent::Failed(message.to_string()));
        ActionOutcome::Failed
    }
}

impl Drop for FieldSession {
    fn drop(&mut self) {
        self.inner.root.cancel();
    }
}

/// Run `fut` unless `token` is cancelled first.
async fn guarded<T>(token: &CancellationToken, fut: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        out = fut => Some(out),
    }
}

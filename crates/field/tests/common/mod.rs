#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use brandlink_core::asset::{AssetFile, AssetFields, AssetSys};
use brandlink_core::clock::Clock;
use brandlink_core::notice::{Notice, NoticeLevel};
use brandlink_core::{ContentHost, FieldChange, HostAsset, HostError, SearchResult};
use brandlink_events::FieldChannel;
use serde_json::Value;
use tokio::sync::{broadcast, Notify};

pub const LOCALE: &str = "en-US";

// ---------------------------------------------------------------------------
// Asset fixtures
// ---------------------------------------------------------------------------

/// An asset whose file has not been processed yet.
pub fn pending_asset(id: &str) -> HostAsset {
    HostAsset {
        sys: AssetSys {
            id: id.to_string(),
            version: 1,
            published_version: None,
        },
        fields: AssetFields::default(),
    }
}

/// A processed asset with a protocol-relative file URL.
pub fn ready_asset(id: &str, title: &str) -> HostAsset {
    let mut asset = pending_asset(id);
    asset
        .fields
        .title
        .insert(LOCALE.to_string(), title.to_string());
    asset.fields.file.insert(
        LOCALE.to_string(),
        AssetFile {
            url: Some(format!("//images.host.test/{id}.png")),
            file_name: Some(format!("{id}.png")),
            content_type: Some("image/png".to_string()),
        },
    );
    asset
}

pub fn search_result(id: &str, source_url: &str) -> SearchResult {
    SearchResult {
        id: id.to_string(),
        name: format!("Portal {id}"),
        thumbnail_url: format!("https://dam.test/web/{id}.jpg"),
        source_url: source_url.to_string(),
    }
}

// ---------------------------------------------------------------------------
// MemoryHost
// ---------------------------------------------------------------------------

/// In-memory content host with scripted assets and dialogs.
///
/// Each asset id maps to a queue of documents: every fetch pops the
/// front one until a single document is left, which is then returned
/// forever.
#[derive(Default)]
pub struct MemoryHost {
    channel: FieldChannel,
    value: Mutex<Option<Value>>,
    assets: Mutex<HashMap<String, VecDeque<HostAsset>>>,
    fetches: AtomicUsize,
    writes: AtomicUsize,
    created: Mutex<Option<String>>,
    picked: Mutex<Option<String>>,
    selection: Mutex<Option<SearchResult>>,
    notices: Mutex<Vec<Notice>>,
    editor_opens: Mutex<Vec<String>>,
    fetch_delay: Mutex<Duration>,
    write_delay: Mutex<Duration>,
    write_started: Notify,
}

impl MemoryHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Script the documents returned for `id`, in order.
    pub fn script_asset(&self, id: &str, documents: Vec<HostAsset>) {
        self.assets
            .lock()
            .unwrap()
            .insert(id.to_string(), documents.into());
    }

    pub fn set_created(&self, id: Option<&str>) {
        *self.created.lock().unwrap() = id.map(str::to_string);
    }

    pub fn set_picked(&self, id: Option<&str>) {
        *self.picked.lock().unwrap() = id.map(str::to_string);
    }

    pub fn set_selection(&self, result: Option<SearchResult>) {
        *self.selection.lock().unwrap() = result;
    }

    /// Delay every `get_asset` call by `delay`.
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = delay;
    }

    /// Delay every `set_field_value` call by `delay`.
    pub fn set_write_delay(&self, delay: Duration) {
        *self.write_delay.lock().unwrap() = delay;
    }

    /// Resolves once a `set_field_value` call has begun.
    pub async fn write_started(&self) {
        self.write_started.notified().await;
    }

    /// Clear the field as another editing session would.
    pub fn clear_remote(&self) {
        *self.value.lock().unwrap() = None;
        self.channel.publish_cleared();
    }

    /// Change the field as another editing session would.
    pub fn set_remote_value(&self, value: Value) {
        *self.value.lock().unwrap() = Some(value.clone());
        self.channel.publish_set(value);
    }

    pub fn raw_value(&self) -> Option<Value> {
        self.value.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of set and remove calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn notices_at(&self, level: NoticeLevel) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }

    pub fn editor_opens(&self) -> Vec<String> {
        self.editor_opens.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentHost for MemoryHost {
    fn locale(&self) -> &str {
        LOCALE
    }

    async fn get_asset(&self, id: &str) -> Result<HostAsset, HostError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.fetch_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut assets = self.assets.lock().unwrap();
        let queue = assets
            .get_mut(id)
            .ok_or_else(|| HostError::NotFound(id.to_string()))?;
        let document = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        document.ok_or_else(|| HostError::NotFound(id.to_string()))
    }

    fn field_value(&self) -> Option<Value> {
        self.raw_value()
    }

    async fn set_field_value(&self, value: Value) -> Result<(), HostError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.write_started.notify_one();
        let delay = *self.write_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        *self.value.lock().unwrap() = Some(value.clone());
        self.channel.publish_set(value);
        Ok(())
    }

    async fn remove_field_value(&self) -> Result<(), HostError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.value.lock().unwrap() = None;
        self.channel.publish_cleared();
        Ok(())
    }

    fn field_changes(&self) -> broadcast::Receiver<FieldChange> {
        self.channel.subscribe()
    }

    async fn open_asset_editor(&self, id: &str) -> Result<(), HostError> {
        self.editor_opens.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn create_asset_flow(&self) -> Result<Option<String>, HostError> {
        Ok(self.created.lock().unwrap().clone())
    }

    async fn select_asset_dialog(&self) -> Result<Option<String>, HostError> {
        Ok(self.picked.lock().unwrap().clone())
    }

    async fn open_search_dialog(&self) -> Result<Option<SearchResult>, HostError> {
        Ok(self.selection.lock().unwrap().clone())
    }

    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// Clock that records sleeps and returns immediately.
#[derive(Default)]
pub struct RecordingClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingClock {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}

/// Clock whose sleeps never finish. Signals when the first one starts.
#[derive(Default)]
pub struct StalledClock {
    pub sleeping: Notify,
}

#[async_trait]
impl Clock for StalledClock {
    async fn sleep(&self, _duration: Duration) {
        self.sleeping.notify_one();
        std::future::pending::<()>().await;
    }
}

/// Wait until `condition` holds, yielding to other tasks in between.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

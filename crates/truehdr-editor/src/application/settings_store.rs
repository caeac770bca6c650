//! The settings store: one loaded `truehdrtweaks.ini`, typed access to its
//! `[Values]` section, and the debounced write-back.
//!
//! # State
//!
//! ```text
//!   available ──load()──▶ loaded ──set(..)──▶ dirty ──save()/flush()──▶ clean
//! ```
//!
//! - `available` is decided once, in [`SettingsStore::new`].  A store whose
//!   file was missing at construction never loads.
//! - Until [`SettingsStore::load`] succeeds every getter returns its
//!   "unloaded" value ([`UNLOADED_INT`], [`UNLOADED_FLOAT`], `None` or
//!   `false`) and every setter is a no-op.
//!
//! # Debounced save
//!
//! [`SettingsStore::save`] does not write immediately.  It cancels whatever
//! save is still waiting, then spawns a task that sleeps for the debounce
//! window (500 ms by default) and writes the whole document.  A burst of
//! edits therefore produces exactly one write, carrying the final state.
//!
//! ```text
//!   save()  ─┐ cancel ─┐ cancel
//!   t=0      │  t=120  │  t=300
//!            ✗         ✗        └──── 500 ms ────▶ write
//! ```
//!
//! The delayed task re-checks its cancellation token under the state lock
//! right before writing, so a superseded task can never reach the disk even
//! if its sleep and a newer `save()` race.
//!
//! # Shutdown
//!
//! Dropping the store performs no I/O.  Callers that must not lose edits call
//! [`SettingsStore::flush`] before exiting; the CLI does.  A save that is
//! already waiting keeps the shared state alive and still completes if the
//! runtime keeps running.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use truehdr_core::domain::fields::{
    CONTRAST, GAMMA, HDR_DISPLAY_MODE, HDR_VISUALIZATION, INDICATOR_HUD, PAPER_WHITE,
    PEAK_BRIGHTNESS, QUALITY, SATURATION, SDR_BRIGHTNESS, STRENGTH,
};
use truehdr_core::{
    Field, FieldError, FieldValue, HdrDisplayMode, HdrVisualization, IndicatorHud, IniDocument,
    IniError, IniOptions, Quality, Sentinel, SettingKey, ToggleField, VALUES_SECTION,
};

use crate::infrastructure::storage::SettingsFile;

/// Quiet period between the last save request and the disk write.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Returned by integer getters while nothing is loaded.
pub const UNLOADED_INT: i32 = i32::MIN;

/// Returned by float getters while nothing is loaded.
pub const UNLOADED_FLOAT: f32 = f32::MIN;

// ── Options and errors ────────────────────────────────────────────────────────

/// Construction-time options for a [`SettingsStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    pub debounce: Duration,
    pub ini: IniOptions,
    /// Initial value of the auto-write switch.
    pub auto_write: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            ini: IniOptions::default(),
            auto_write: false,
        }
    }
}

/// Errors surfaced by the settings store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// `load()` was called but the file did not exist when the store was built.
    #[error("settings file not found at {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The file is not valid INI.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: IniError,
    },

    /// A stored value could not be read as its typed form.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Reading or writing the file failed.
    #[error("I/O error accessing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    /// The store was created outside a tokio runtime.
    #[error("settings store requires a tokio runtime")]
    NoRuntime,

    /// The background save task panicked or was aborted.
    #[error("background save failed: {0}")]
    SaveTask(String),
}

// ── Save handle ───────────────────────────────────────────────────────────────

/// How a save request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing was dirty; no write happened.
    Clean,
    /// The document was written to disk.
    Written,
    /// A newer request (or a reload or flush) replaced this one before it wrote.
    Superseded,
}

/// Handle to a save request.
///
/// Dropping the handle does not cancel the save.
#[derive(Debug)]
pub struct SaveHandle(SaveState);

#[derive(Debug)]
enum SaveState {
    Ready(SaveOutcome),
    Pending(JoinHandle<Result<SaveOutcome, StoreError>>),
}

impl SaveHandle {
    fn ready(outcome: SaveOutcome) -> Self {
        Self(SaveState::Ready(outcome))
    }

    /// `true` if a delayed write was scheduled.
    pub fn is_pending(&self) -> bool {
        matches!(self.0, SaveState::Pending(_))
    }

    /// Waits for the request to finish.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the write failed, [`StoreError::SaveTask`] if
    /// the task itself died.
    pub async fn wait(self) -> Result<SaveOutcome, StoreError> {
        match self.0 {
            SaveState::Ready(outcome) => Ok(outcome),
            SaveState::Pending(task) => task
                .await
                .map_err(|e| StoreError::SaveTask(e.to_string()))?,
        }
    }
}

// ── Shared state ──────────────────────────────────────────────────────────────

struct State {
    document: Option<IniDocument>,
    dirty: bool,
    auto_write: bool,
    pending: Option<CancellationToken>,
    last_error: Option<StoreError>,
}

struct Shared {
    file: Arc<dyn SettingsFile>,
    path: PathBuf,
    available: bool,
    options: StoreOptions,
    state: Mutex<State>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source: Arc::new(source),
        }
    }

    /// Renders and writes the document.  Clears `dirty` only on success.
    fn persist(&self, state: &mut State) -> Result<(), StoreError> {
        let Some(document) = state.document.as_ref() else {
            return Ok(());
        };
        let text = document.render();
        if let Err(e) = self.file.write(&text) {
            let err = self.io_error(e);
            state.last_error = Some(err.clone());
            return Err(err);
        }
        state.dirty = false;
        state.last_error = None;
        info!("wrote {} bytes to {}", text.len(), self.path.display());
        Ok(())
    }

    /// Body of a delayed save once its sleep has elapsed.
    fn write_if_current(&self, token: &CancellationToken) -> Result<SaveOutcome, StoreError> {
        let mut state = self.lock();
        if token.is_cancelled() {
            return Ok(SaveOutcome::Superseded);
        }
        state.pending = None;
        if !state.dirty {
            return Ok(SaveOutcome::Clean);
        }
        match self.persist(&mut state) {
            Ok(()) => Ok(SaveOutcome::Written),
            Err(e) => {
                error!("background save failed: {e}");
                Err(e)
            }
        }
    }
}

fn cancel_pending(state: &mut State) -> bool {
    match state.pending.take() {
        Some(token) => {
            token.cancel();
            true
        }
        None => false,
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// Owner of the in-memory settings document.
///
/// All methods take `&self`; the document and flags sit behind a mutex so
/// the delayed save task can reach them.
pub struct SettingsStore {
    shared: Arc<Shared>,
    runtime: Handle,
}

impl SettingsStore {
    /// Creates a store over `file`.  Checks once whether the file exists.
    ///
    /// # Errors
    ///
    /// [`StoreError::NoRuntime`] when called outside a tokio runtime.
    pub fn new(file: Arc<dyn SettingsFile>, options: StoreOptions) -> Result<Self, StoreError> {
        let runtime = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        let path = file.location();
        let available = file.exists();
        if !available {
            warn!("settings file not found at {}", path.display());
        }
        let state = State {
            document: None,
            dirty: false,
            auto_write: options.auto_write,
            pending: None,
            last_error: None,
        };
        Ok(Self {
            shared: Arc::new(Shared {
                file,
                path,
                available,
                options,
                state: Mutex::new(state),
            }),
            runtime,
        })
    }

    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// Whether the file existed when the store was created.
    pub fn available(&self) -> bool {
        self.shared.available
    }

    pub fn loaded(&self) -> bool {
        self.shared.lock().document.is_some()
    }

    /// Whether there are changes not yet on disk.
    pub fn dirty(&self) -> bool {
        self.shared.lock().dirty
    }

    pub fn auto_write(&self) -> bool {
        self.shared.lock().auto_write
    }

    /// Switches auto-write.  Turning it on while dirty schedules a save;
    /// passing the current value does nothing.
    pub fn set_auto_write(&self, enabled: bool) -> Option<SaveHandle> {
        let mut state = self.shared.lock();
        if state.auto_write == enabled {
            return None;
        }
        state.auto_write = enabled;
        if enabled && state.dirty {
            Some(self.schedule_save(&mut state))
        } else {
            None
        }
    }

    /// The error of the most recent failed write, cleared by the next
    /// successful one.
    pub fn last_error(&self) -> Option<StoreError> {
        self.shared.lock().last_error.clone()
    }

    /// Reads and parses the file, replacing any loaded document.
    ///
    /// A waiting save is cancelled and unsaved edits are discarded.
    ///
    /// # Errors
    ///
    /// - [`StoreError::FileNotFound`] if the store is not `available`.
    /// - [`StoreError::Io`] if reading fails.
    /// - [`StoreError::Parse`] if the text is not valid INI; the previous
    ///   document, if any, stays loaded.
    pub fn load(&self) -> Result<(), StoreError> {
        let shared = &self.shared;
        if !shared.available {
            return Err(StoreError::FileNotFound {
                path: shared.path.clone(),
            });
        }
        let text = shared.file.read().map_err(|e| shared.io_error(e))?;
        let document =
            IniDocument::parse(&text, &shared.options.ini).map_err(|source| StoreError::Parse {
                path: shared.path.clone(),
                source,
            })?;

        let mut state = shared.lock();
        cancel_pending(&mut state);
        if state.dirty {
            warn!("reload discards unsaved changes to {}", shared.path.display());
        }
        state.document = Some(document);
        state.dirty = false;
        state.last_error = None;
        info!("loaded settings from {}", shared.path.display());
        Ok(())
    }

    /// Requests a debounced save.
    ///
    /// Returns a ready [`SaveOutcome::Clean`] handle when nothing is dirty.
    /// Otherwise any waiting save is cancelled and a new delay starts.
    pub fn save(&self) -> SaveHandle {
        let mut state = self.shared.lock();
        if !state.dirty {
            return SaveHandle::ready(SaveOutcome::Clean);
        }
        self.schedule_save(&mut state)
    }

    /// Writes immediately, cancelling any waiting save.
    ///
    /// Returns `true` if something was written.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the write fails; the store stays dirty.
    pub fn flush(&self) -> Result<bool, StoreError> {
        let mut state = self.shared.lock();
        if cancel_pending(&mut state) {
            debug!("flush replaces the waiting save");
        }
        if !state.dirty {
            return Ok(false);
        }
        self.shared.persist(&mut state)?;
        Ok(true)
    }

    fn schedule_save(&self, state: &mut State) -> SaveHandle {
        if cancel_pending(state) {
            debug!("restarting save delay");
        }
        let token = CancellationToken::new();
        state.pending = Some(token.clone());

        let shared = Arc::clone(&self.shared);
        let delay = shared.options.debounce;
        let task = self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return Ok(SaveOutcome::Superseded),
                _ = tokio::time::sleep(delay) => {}
            }
            shared.write_if_current(&token)
        });
        SaveHandle(SaveState::Pending(task))
    }

    // ── Generic access ────────────────────────────────────────────────────────

    /// Reads a field; `Ok(None)` while nothing is loaded.
    ///
    /// # Errors
    ///
    /// [`StoreError::Field`] when the key is missing or malformed.
    pub fn get<T: FieldValue>(&self, field: Field<T>) -> Result<Option<T>, StoreError> {
        let state = self.shared.lock();
        match state.document.as_ref() {
            Some(doc) => Ok(Some(field.read(doc)?)),
            None => Ok(None),
        }
    }

    /// Stores a field value.  Returns `true` if the document changed.
    ///
    /// A no-op while nothing is loaded or when the value is already stored.
    /// With auto-write on, a change schedules a debounced save.
    pub fn set<T: FieldValue>(&self, field: Field<T>, value: T) -> bool {
        let mut state = self.shared.lock();
        let Some(doc) = state.document.as_mut() else {
            return false;
        };
        if !field.write(doc, value) {
            return false;
        }
        debug!("{} = {value:?}", field.key());
        state.dirty = true;
        if state.auto_write {
            // Fire and forget: failures land in `last_error`.
            drop(self.schedule_save(&mut state));
        }
        true
    }

    /// `false` while unloaded or when the stored value is the sentinel.
    ///
    /// # Errors
    ///
    /// [`StoreError::Field`] when the key is missing or malformed.
    pub fn enabled<T: Sentinel>(&self, toggle: ToggleField<T>) -> Result<bool, StoreError> {
        Ok(self
            .get(toggle.field)?
            .is_some_and(ToggleField::<T>::is_enabled))
    }

    /// Writes the option's default when enabling, the sentinel when disabling.
    pub fn set_enabled<T: Sentinel>(&self, toggle: ToggleField<T>, enabled: bool) -> bool {
        self.set(toggle.field, toggle.value_for(enabled))
    }

    /// Raw text stored for a setting.
    pub fn raw(&self, key: SettingKey) -> Option<String> {
        let state = self.shared.lock();
        state
            .document
            .as_ref()
            .and_then(|doc| doc.get(VALUES_SECTION, key.ini_key()))
            .map(str::to_string)
    }

    fn value_or<T: FieldValue>(&self, field: Field<T>, unloaded: T) -> Result<T, StoreError> {
        Ok(self.get(field)?.unwrap_or(unloaded))
    }

    // ── Named accessors ───────────────────────────────────────────────────────

    pub fn quality(&self) -> Result<Option<Quality>, StoreError> {
        self.get(QUALITY)
    }

    pub fn set_quality(&self, value: Quality) -> bool {
        self.set(QUALITY, value)
    }

    pub fn hdr_display_mode(&self) -> Result<Option<HdrDisplayMode>, StoreError> {
        self.get(HDR_DISPLAY_MODE)
    }

    pub fn set_hdr_display_mode(&self, value: HdrDisplayMode) -> bool {
        self.set(HDR_DISPLAY_MODE, value)
    }

    pub fn hdr_visualization(&self) -> Result<Option<HdrVisualization>, StoreError> {
        self.get(HDR_VISUALIZATION)
    }

    pub fn set_hdr_visualization(&self, value: HdrVisualization) -> bool {
        self.set(HDR_VISUALIZATION, value)
    }

    /// Peak brightness in nits, `-1` when disabled.
    pub fn peak_brightness(&self) -> Result<i32, StoreError> {
        self.value_or(PEAK_BRIGHTNESS.field, UNLOADED_INT)
    }

    pub fn set_peak_brightness(&self, nits: i32) -> bool {
        self.set(PEAK_BRIGHTNESS.field, nits)
    }

    pub fn peak_brightness_enabled(&self) -> Result<bool, StoreError> {
        self.enabled(PEAK_BRIGHTNESS)
    }

    pub fn set_peak_brightness_enabled(&self, enabled: bool) -> bool {
        self.set_enabled(PEAK_BRIGHTNESS, enabled)
    }

    pub fn paper_white(&self) -> Result<i32, StoreError> {
        self.value_or(PAPER_WHITE.field, UNLOADED_INT)
    }

    pub fn set_paper_white(&self, value: i32) -> bool {
        self.set(PAPER_WHITE.field, value)
    }

    pub fn paper_white_enabled(&self) -> Result<bool, StoreError> {
        self.enabled(PAPER_WHITE)
    }

    pub fn set_paper_white_enabled(&self, enabled: bool) -> bool {
        self.set_enabled(PAPER_WHITE, enabled)
    }

    pub fn contrast(&self) -> Result<f32, StoreError> {
        self.value_or(CONTRAST.field, UNLOADED_FLOAT)
    }

    pub fn set_contrast(&self, value: f32) -> bool {
        self.set(CONTRAST.field, value)
    }

    pub fn contrast_enabled(&self) -> Result<bool, StoreError> {
        self.enabled(CONTRAST)
    }

    pub fn set_contrast_enabled(&self, enabled: bool) -> bool {
        self.set_enabled(CONTRAST, enabled)
    }

    pub fn saturation(&self) -> Result<f32, StoreError> {
        self.value_or(SATURATION.field, UNLOADED_FLOAT)
    }

    pub fn set_saturation(&self, value: f32) -> bool {
        self.set(SATURATION.field, value)
    }

    pub fn saturation_enabled(&self) -> Result<bool, StoreError> {
        self.enabled(SATURATION)
    }

    pub fn set_saturation_enabled(&self, enabled: bool) -> bool {
        self.set_enabled(SATURATION, enabled)
    }

    pub fn strength(&self) -> Result<f32, StoreError> {
        self.value_or(STRENGTH.field, UNLOADED_FLOAT)
    }

    pub fn set_strength(&self, value: f32) -> bool {
        self.set(STRENGTH.field, value)
    }

    pub fn strength_enabled(&self) -> Result<bool, StoreError> {
        self.enabled(STRENGTH)
    }

    pub fn set_strength_enabled(&self, enabled: bool) -> bool {
        self.set_enabled(STRENGTH, enabled)
    }

    pub fn gamma(&self) -> Result<f32, StoreError> {
        self.value_or(GAMMA.field, UNLOADED_FLOAT)
    }

    pub fn set_gamma(&self, value: f32) -> bool {
        self.set(GAMMA.field, value)
    }

    pub fn gamma_enabled(&self) -> Result<bool, StoreError> {
        self.enabled(GAMMA)
    }

    pub fn set_gamma_enabled(&self, enabled: bool) -> bool {
        self.set_enabled(GAMMA, enabled)
    }

    /// SDR brightness in nits, `-1` when disabled.
    pub fn sdr_brightness(&self) -> Result<i32, StoreError> {
        self.value_or(SDR_BRIGHTNESS.field, UNLOADED_INT)
    }

    pub fn set_sdr_brightness(&self, nits: i32) -> bool {
        self.set(SDR_BRIGHTNESS.field, nits)
    }

    pub fn sdr_brightness_enabled(&self) -> Result<bool, StoreError> {
        self.enabled(SDR_BRIGHTNESS)
    }

    pub fn set_sdr_brightness_enabled(&self, enabled: bool) -> bool {
        self.set_enabled(SDR_BRIGHTNESS, enabled)
    }

    /// Tri-state HUD switch; `None` while unloaded.
    pub fn indicator_hud(&self) -> Result<Option<IndicatorHud>, StoreError> {
        self.get(INDICATOR_HUD.field)
    }

    pub fn set_indicator_hud(&self, value: IndicatorHud) -> bool {
        self.set(INDICATOR_HUD.field, value)
    }

    /// `true` for `Off` and `On`, `false` for `Unset`.
    pub fn indicator_hud_enabled(&self) -> Result<bool, StoreError> {
        self.enabled(INDICATOR_HUD)
    }

    pub fn set_indicator_hud_enabled(&self, enabled: bool) -> bool {
        self.set_enabled(INDICATOR_HUD, enabled)
    }
}

impl Drop for SettingsStore {
    fn drop(&mut self) {
        let state = self.shared.lock();
        if state.dirty && state.pending.is_none() {
            warn!(
                "unsaved changes to {} were not written",
                self.shared.path.display()
            );
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

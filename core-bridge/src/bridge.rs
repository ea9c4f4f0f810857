//! Script-facing capability dispatcher

use crate::event::GameEvent;
use crate::store::GameStore;
use async_trait::async_trait;
use bridge_traits::{
    BridgeCall, DeviceInfoProvider, DisplayController, DisplayMode, Haptics, Notifier,
    ScriptInterface, ShareSheet, UiDispatcher,
};
use core_runtime::config::ShellConfig;
use core_runtime::events::{BridgeEvent, EventBus, ShellEvent};
use futures::FutureExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_VIBRATION_MS: u64 = 50;
const ACHIEVEMENT_VIBRATION_MS: u64 = 100;
const SOUND_EFFECT_VIBRATION_MS: u64 = 30;
const SHARE_CHOOSER_TITLE: &str = "Share Game";

/// Parse a comma-separated list of millisecond durations.
///
/// `None` when the list is empty or any entry is not a non-negative integer.
pub fn parse_waveform(pattern: &str) -> Option<Vec<u64>> {
    let timings = pattern
        .split(',')
        .map(|part| part.trim().parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    (!timings.is_empty()).then_some(timings)
}

/// Host services the bridge reaches through
#[derive(Clone)]
pub struct BridgeServices {
    pub haptics: Arc<dyn Haptics>,
    pub share_sheet: Arc<dyn ShareSheet>,
    pub notifier: Arc<dyn Notifier>,
    pub device_info: Arc<dyn DeviceInfoProvider>,
    pub display: Arc<dyn DisplayController>,
    pub ui: Arc<dyn UiDispatcher>,
}

impl BridgeServices {
    pub fn from_config(config: &ShellConfig) -> Self {
        Self {
            haptics: Arc::clone(&config.haptics),
            share_sheet: Arc::clone(&config.share_sheet),
            notifier: Arc::clone(&config.notifier),
            device_info: Arc::clone(&config.device_info),
            display: Arc::clone(&config.display),
            ui: Arc::clone(&config.ui),
        }
    }
}

/// The native capability surface exposed to hosted content.
///
/// Every capability swallows its own failures: callers get `null`, `false`
/// or `0` and a warning is logged.
pub struct NativeBridge {
    store: GameStore,
    services: BridgeServices,
    app_version: String,
    events: Option<EventBus>,
}

impl NativeBridge {
    pub fn new(store: GameStore, services: BridgeServices, app_version: impl Into<String>) -> Self {
        Self {
            store,
            services,
            app_version: app_version.into(),
            events: None,
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(
            GameStore::new(Arc::clone(&config.settings_store)),
            BridgeServices::from_config(config),
            config.content.app_version.clone(),
        )
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    fn publish(&self, event: BridgeEvent) {
        if let Some(events) = &self.events {
            let _ = events.emit(ShellEvent::Bridge(event));
        }
    }

    fn absorb<T>(&self, method: &str, result: bridge_traits::error::Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(method, error = %e, "Bridge call failed");
                self.publish(BridgeEvent::CallFailed {
                    method: method.to_string(),
                    message: e.to_string(),
                });
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Haptics
    // ------------------------------------------------------------------

    pub fn vibrate(&self, duration_ms: u64) {
        debug!(duration_ms, "vibrate");
        let result = self
            .services
            .haptics
            .vibrate(Duration::from_millis(duration_ms));
        self.absorb("vibrate", result);
    }

    /// Malformed patterns are dropped without touching the device.
    pub fn vibrate_pattern(&self, pattern: &str) {
        match parse_waveform(pattern) {
            Some(timings) => {
                let result = self.services.haptics.vibrate_waveform(&timings);
                self.absorb("vibratePattern", result);
            }
            None => debug!(pattern, "Ignoring malformed vibration pattern"),
        }
    }

    // ------------------------------------------------------------------
    // Persisted data
    // ------------------------------------------------------------------

    pub async fn save_data(&self, key: &str, value: &str) {
        if self.absorb("saveData", self.store.save(key, value).await).is_some() {
            self.publish(BridgeEvent::DataSaved {
                key: key.to_string(),
            });
        }
    }

    pub async fn load_data(&self, key: &str) -> Option<String> {
        let value = self.absorb("loadData", self.store.load(key).await)?;
        debug!(key, found = value.is_some(), "loadData");
        value
    }

    pub async fn remove_data(&self, key: &str) {
        if self.absorb("removeData", self.store.remove(key).await).is_some() {
            self.publish(BridgeEvent::DataRemoved {
                key: key.to_string(),
            });
        }
    }

    pub async fn clear_all(&self) {
        if self.absorb("clearAll", self.store.clear().await).is_some() {
            self.publish(BridgeEvent::DataCleared);
        }
    }

    pub async fn high_score(&self) -> i64 {
        self.absorb("getHighScore", self.store.high_score().await)
            .unwrap_or(0)
    }

    pub async fn saved_level(&self) -> i64 {
        self.absorb("getSavedLevel", self.store.saved_level().await)
            .unwrap_or(1)
    }

    pub async fn is_first_time(&self) -> bool {
        self.absorb("isFirstTime", self.store.take_first_time().await)
            .unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Device services
    // ------------------------------------------------------------------

    pub fn share_game(&self, text: &str, url: &str) {
        let body = format!("{}\n{}", text, url);
        let result = self
            .services
            .share_sheet
            .share_text(SHARE_CHOOSER_TITLE, &body);
        self.absorb("shareGame", result);
    }

    pub fn show_toast(&self, message: &str) {
        let result = self.services.notifier.show_notice(message);
        self.absorb("showToast", result);
    }

    pub fn device_info(&self) -> Value {
        let device = self.services.device_info.descriptor();
        json!({
            "brand": device.brand,
            "model": device.model,
            "osVersion": device.os_version,
            "apiLevel": device.api_level,
            "appVersion": self.app_version,
        })
    }

    /// Queue a display change onto the UI context
    pub fn set_fullscreen(&self, immersive: bool) {
        let display = Arc::clone(&self.services.display);
        let events = self.events.clone();
        let job = async move {
            let mode = DisplayMode {
                immersive,
                keep_screen_on: true,
            };
            match display.apply(mode) {
                Ok(()) => {
                    if let Some(events) = events {
                        let _ = events.emit(ShellEvent::Bridge(BridgeEvent::FullscreenChanged {
                            immersive,
                        }));
                    }
                }
                Err(e) => warn!(immersive, error = %e, "Display change failed"),
            }
        }
        .boxed();

        let method = if immersive {
            "requestFullscreen"
        } else {
            "exitFullscreen"
        };
        self.absorb(method, self.services.ui.dispatch(job));
    }

    // ------------------------------------------------------------------
    // Game events
    // ------------------------------------------------------------------

    pub async fn handle_game_event(&self, json: &str) {
        let event = match GameEvent::parse(json) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Dropping game event");
                return;
            }
        };

        debug!(kind = event.kind(), "Game event received");

        match &event {
            GameEvent::Achievement { achievement } => {
                if let Some(true) = self.absorb(
                    "handleGameEvent",
                    self.store.add_achievement(achievement).await,
                ) {
                    info!(achievement = %achievement, "Achievement unlocked");
                }
                self.vibrate(ACHIEVEMENT_VIBRATION_MS);
            }
            GameEvent::LevelComplete { level, score } => {
                self.absorb(
                    "handleGameEvent",
                    self.store.record_level(*level, *score).await,
                );
            }
            GameEvent::GameOver { score } => {
                self.absorb("handleGameEvent", self.store.record_score(*score).await);
            }
            GameEvent::SoundEffect => self.vibrate(SOUND_EFFECT_VIBRATION_MS),
            GameEvent::Unrecognized { kind } => {
                info!(kind = %kind, "Unknown game event type");
                return;
            }
        }

        self.publish(BridgeEvent::GameEvent {
            kind: event.kind().to_string(),
        });
    }
}

fn missing_argument(method: &str, index: usize) -> Value {
    warn!(method, index, "Bridge call missing argument");
    Value::Null
}

#[async_trait]
impl ScriptInterface for NativeBridge {
    async fn invoke(&self, call: BridgeCall) -> Value {
        let method = call.method.as_str();
        match method {
            "vibrate" => {
                let ms = match call.args.first() {
                    None | Some(Value::Null) => Some(DEFAULT_VIBRATION_MS),
                    Some(_) => call.i64_arg(0).and_then(|ms| u64::try_from(ms).ok()),
                };
                match ms {
                    Some(ms) => self.vibrate(ms),
                    None => debug!("Ignoring invalid vibration duration"),
                }
                Value::Null
            }
            "vibratePattern" => {
                if let Some(pattern) = call.str_arg(0) {
                    self.vibrate_pattern(pattern);
                }
                Value::Null
            }
            "saveData" => match (call.str_arg(0), call.str_arg(1)) {
                (Some(key), Some(value)) => {
                    self.save_data(key, value).await;
                    Value::Null
                }
                (None, _) => missing_argument(method, 0),
                (_, None) => missing_argument(method, 1),
            },
            "loadData" => match call.str_arg(0) {
                Some(key) => self
                    .load_data(key)
                    .await
                    .map(Value::String)
                    .unwrap_or(Value::Null),
                None => missing_argument(method, 0),
            },
            "removeData" => match call.str_arg(0) {
                Some(key) => {
                    self.remove_data(key).await;
                    Value::Null
                }
                None => missing_argument(method, 0),
            },
            "clearAll" | "clearAllData" => {
                self.clear_all().await;
                Value::Null
            }
            "shareGame" => {
                self.share_game(
                    call.str_arg(0).unwrap_or_default(),
                    call.str_arg(1).unwrap_or_default(),
                );
                Value::Null
            }
            "showToast" => match call.str_arg(0) {
                Some(message) => {
                    self.show_toast(message);
                    Value::Null
                }
                None => missing_argument(method, 0),
            },
            // Script bridges only carry primitives, so the snapshot goes out as JSON text.
            "getDeviceInfo" => Value::String(self.device_info().to_string()),
            "handleGameEvent" => match call.str_arg(0) {
                Some(json) => {
                    self.handle_game_event(json).await;
                    Value::Null
                }
                None => missing_argument(method, 0),
            },
            "requestFullscreen" => {
                self.set_fullscreen(true);
                Value::Null
            }
            "exitFullscreen" => {
                self.set_fullscreen(false);
                Value::Null
            }
            "getHighScore" => json!(self.high_score().await),
            "getSavedLevel" => json!(self.saved_level().await),
            "isFirstTime" => json!(self.is_first_time().await),
            other => {
                warn!(method = other, "Unknown bridge method");
                Value::Null
            }
        }
    }
}

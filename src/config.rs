use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub backend: BackendConfig,
    pub classifier: ClassifierConfig,
    pub proctor: ProctorConfig,
    pub session: SessionDefaults,
    pub capture: CaptureConfig,
    pub resume: ResumeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// WebSocket endpoint of the dialogue backend.
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Replay script for the scripted scanner. The production landmark
    /// capability ignores this.
    pub script_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProctorConfig {
    pub lateral_gaze_threshold: f32,
    pub downward_gaze_threshold: f32,
    pub streak_threshold: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionDefaults {
    pub duration_minutes: u64,
    /// Countdown tick period. One second in production; tests shrink it.
    pub timer_tick_millis: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
    pub frame_interval_ms: u64,
    pub sample_rate: u32,
    pub channels: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResumeConfig {
    pub storage_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "interview-proctor".to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3900,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000/ws/interview".to_string(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { script_path: None }
    }
}

impl Default for ProctorConfig {
    fn default() -> Self {
        Self {
            lateral_gaze_threshold: 0.6,
            downward_gaze_threshold: 0.45,
            streak_threshold: 5,
        }
    }
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            duration_minutes: 10,
            timer_tick_millis: 1000,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            frame_interval_ms: 100,
            sample_rate: 16000,
            channels: 1,
        }
    }
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            storage_path: "data/resumes".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            backend: BackendConfig::default(),
            classifier: ClassifierConfig::default(),
            proctor: ProctorConfig::default(),
            session: SessionDefaults::default(),
            capture: CaptureConfig::default(),
            resume: ResumeConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

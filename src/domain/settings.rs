use crate::domain::wire;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_false")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_false")]
    pub show_file_line: bool,
    #[serde(default = "default_false")]
    pub show_thread_ids: bool,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_logging_enabled: default_false(),
            console_logging_enabled: default_true(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_file_line: default_false(),
            show_thread_ids: default_false(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "meccanoid".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Bluetooth address of the robot, colon separated
    #[serde(default = "default_device_address")]
    pub device_address: String,

    /// Characteristic handle commands are written to
    #[serde(default = "default_command_handle")]
    pub command_handle: u16,

    #[serde(default)]
    pub log_settings: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_address: default_device_address(),
            command_handle: default_command_handle(),
            log_settings: LogSettings::default(),
        }
    }
}

fn default_device_address() -> String {
    wire::DEFAULT_ADDRESS.to_string()
}
fn default_command_handle() -> u16 {
    wire::COMMAND_HANDLE
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
}

impl SettingsService {
    /// Load settings from the user's config directory
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Ok(Self::with_path(settings_path))
    }

    /// Load settings from an explicit file, defaulting anything missing
    pub fn with_path(settings_path: impl Into<PathBuf>) -> Self {
        let settings_path = settings_path.into();
        let settings = Self::load_from_file(&settings_path).unwrap_or_default();

        Self {
            settings,
            settings_path,
        }
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("Meccanoid");
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn set_device_address(&mut self, address: &str) -> anyhow::Result<()> {
        wire::parse_address(address)?;
        self.settings.device_address = address.to_string();
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_settings_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "meccanoid-settings-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir.join("settings.json")
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.device_address, "c4:be:84:d4:68:1b");
        assert_eq!(settings.command_handle, 0x001f);
        assert_eq!(settings.log_settings.level, "info");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "device_address": "aa:bb:cc:dd:ee:ff" }"#).unwrap();
        assert_eq!(settings.device_address, "aa:bb:cc:dd:ee:ff");
        assert_eq!(settings.command_handle, wire::COMMAND_HANDLE);
        assert!(settings.log_settings.console_logging_enabled);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = temp_settings_path("missing");
        let _ = fs::remove_file(&path);
        let service = SettingsService::with_path(&path);
        assert_eq!(service.get().device_address, wire::DEFAULT_ADDRESS);
    }

    #[test]
    fn test_save_and_reload() {
        let path = temp_settings_path("reload");
        let mut service = SettingsService::with_path(&path);
        service.set_device_address("01:02:03:04:05:06").unwrap();
        service.get_mut().command_handle = 0x0021;
        service.save().unwrap();

        let reloaded = SettingsService::with_path(&path);
        assert_eq!(reloaded.get().device_address, "01:02:03:04:05:06");
        assert_eq!(reloaded.get().command_handle, 0x0021);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_rejects_bad_address() {
        let path = temp_settings_path("bad-address");
        let mut service = SettingsService::with_path(&path);
        assert!(service.set_device_address("not-an-address").is_err());
        assert_eq!(service.get().device_address, wire::DEFAULT_ADDRESS);
    }
}

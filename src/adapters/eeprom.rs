//! EEPROM adapter.
//!
//! Implements both [`StoragePort`] and [`ConfigPort`] over a 1 KiB
//! byte image (the ATmega16's internal EEPROM size).
//!
//! # Layout
//!
//! | Address        | Contents                                   |
//! |----------------|--------------------------------------------|
//! | `0x000..0x005` | password digits, `0xFF` at 0 = never set   |
//! | `0x100`        | config length `n` (`0xFF` = no config)     |
//! | `0x101..`      | `n` bytes of postcard-encoded config       |
//!
//! The host backend can mirror the image to a file so the password
//! survives between simulation runs.  Every write goes straight through
//! to the file, as a real cell write is persistent on completion.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::SystemConfig;

pub const EEPROM_SIZE: u16 = 1024;
pub const CONFIG_ADDR: u16 = 0x100;
const ERASED: u8 = 0xFF;
/// Largest encoded config; `0xFF` is reserved for "erased".
const MAX_CONFIG_LEN: usize = 0xFE;

pub struct EepromAdapter {
    cells: Vec<u8>,
    backing: Option<PathBuf>,
}

impl EepromAdapter {
    /// Factory-fresh part: every cell reads `0xFF`.
    pub fn new() -> Self {
        info!("EepromAdapter: in-memory backend");
        Self {
            cells: vec![ERASED; EEPROM_SIZE as usize],
            backing: None,
        }
    }

    /// Load the image from `path` if it exists; [`flush`](Self::flush)
    /// writes it back.
    pub fn with_file(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let mut cells = vec![ERASED; EEPROM_SIZE as usize];
        match std::fs::read(&path) {
            Ok(image) => {
                let n = image.len().min(cells.len());
                cells[..n].copy_from_slice(&image[..n]);
                info!("EepromAdapter: loaded {} bytes from {}", n, path.display());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("EepromAdapter: {} absent, starting erased", path.display());
            }
            Err(e) => {
                warn!("EepromAdapter: cannot read {}: {}", path.display(), e);
                return Err(StorageError::IoError);
            }
        }
        Ok(Self {
            cells,
            backing: Some(path),
        })
    }

    /// Write the image to its backing file, if any.
    pub fn flush(&self) -> Result<(), StorageError> {
        if let Some(path) = &self.backing {
            std::fs::write(path, &self.cells).map_err(|e| {
                warn!("EepromAdapter: cannot write {}: {}", path.display(), e);
                StorageError::IoError
            })?;
        }
        Ok(())
    }

    /// Erase the config block so the next load falls back to defaults.
    pub fn erase_config(&mut self) {
        self.cells[CONFIG_ADDR as usize] = ERASED;
    }
}

impl Default for EepromAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ── StoragePort ───────────────────────────────────────────────

impl StoragePort for EepromAdapter {
    fn read_byte(&self, addr: u16) -> Result<u8, StorageError> {
        self.cells
            .get(addr as usize)
            .copied()
            .ok_or(StorageError::OutOfRange(addr))
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), StorageError> {
        let cell = self
            .cells
            .get_mut(addr as usize)
            .ok_or(StorageError::OutOfRange(addr))?;
        *cell = value;
        self.flush()
    }

    fn capacity(&self) -> u16 {
        EEPROM_SIZE
    }
}

// ── ConfigPort ────────────────────────────────────────────────

/// Range-check every field before persisting.
pub fn validate_config(cfg: &SystemConfig) -> Result<(), ConfigError> {
    if !(1..=9).contains(&cfg.max_attempts) {
        return Err(ConfigError::ValidationFailed("max_attempts must be 1–9"));
    }
    if cfg.alarm_ticks == 0 {
        return Err(ConfigError::ValidationFailed("alarm_ticks must be > 0"));
    }
    if cfg.motor_run_ticks == 0 {
        return Err(ConfigError::ValidationFailed("motor_run_ticks must be > 0"));
    }
    if cfg.motor_hold_ticks == 0 {
        return Err(ConfigError::ValidationFailed("motor_hold_ticks must be > 0"));
    }
    if cfg.tick_period_ms == 0 {
        return Err(ConfigError::ValidationFailed("tick_period_ms must be > 0"));
    }
    if cfg.link_timeout_ms == Some(0) {
        return Err(ConfigError::ValidationFailed(
            "link_timeout_ms must be > 0 when set",
        ));
    }
    if !cfg.speed_band_limits.windows(2).all(|w| w[0] < w[1]) {
        return Err(ConfigError::ValidationFailed(
            "speed_band_limits must be strictly ascending",
        ));
    }
    if cfg.speed_band_limits[2] > 1023 {
        return Err(ConfigError::ValidationFailed(
            "speed_band_limits must fit the 10-bit ADC",
        ));
    }
    Ok(())
}

impl ConfigPort for EepromAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let base = CONFIG_ADDR as usize;
        let len = self.cells[base];
        if len == ERASED {
            info!("EepromAdapter: no stored config, using defaults");
            return Ok(SystemConfig::default());
        }
        let start = base + 1;
        let bytes = &self.cells[start..start + len as usize];
        let cfg: SystemConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        validate_config(&cfg)?;
        info!("EepromAdapter: loaded config ({} bytes)", len);
        Ok(cfg)
    }

    fn save(&mut self, config: &SystemConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        let end = CONFIG_ADDR as usize + 1 + bytes.len();
        if bytes.len() > MAX_CONFIG_LEN || end > self.cells.len() {
            return Err(ConfigError::StorageFull);
        }
        let base = CONFIG_ADDR as usize;
        self.cells[base] = bytes.len() as u8;
        self.cells[base + 1..end].copy_from_slice(&bytes);
        self.flush().map_err(|_| ConfigError::IoError)?;
        info!("EepromAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}

//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] by storing [`RevendConfig`] as a single
//! `postcard` blob.
//!
//! - Validation: every field is range-checked before persistence and
//!   again after load, so a blob written by older firmware with looser
//!   limits is rejected instead of trusted.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - The simulation backend keeps the blob in memory (dev/test only).

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::RevendConfig;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
const CONFIG_NAMESPACE: &[u8] = b"revend\0";
#[cfg(target_os = "espidf")]
const CONFIG_KEY: &[u8] = b"cfg\0";

#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const MAX_BLOB_SIZE: usize = 1024;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    blob: std::cell::RefCell<Option<Vec<u8>>>,
}

impl NvsAdapter {
    /// Create the adapter and initialise NVS flash.
    ///
    /// On a full partition or a version mismatch the partition is erased
    /// and re-initialised. Returns [`ConfigError::IoError`] if that fails.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called from the main task before any other NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK || unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            blob: std::cell::RefCell::new(None),
        })
    }

    fn decode(bytes: &[u8]) -> Result<RevendConfig, ConfigError> {
        let cfg: RevendConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Open the config namespace, run `f` with the handle, then close it.
    #[cfg(target_os = "espidf")]
    fn with_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut handle: nvs_handle_t = 0;
        // SAFETY: namespace is NUL-terminated; handle is closed below.
        let ret = unsafe { nvs_open(CONFIG_NAMESPACE.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }
        let result = f(handle);
        unsafe { nvs_close(handle) };
        result
    }
}

impl ConfigPort for NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    fn load(&self) -> Result<RevendConfig, ConfigError> {
        let blob = self.blob.borrow();
        let bytes = blob.as_deref().ok_or(ConfigError::NotFound)?;
        let cfg = Self::decode(bytes)?;
        info!("NvsAdapter: loaded config from store");
        Ok(cfg)
    }

    #[cfg(target_os = "espidf")]
    fn load(&self) -> Result<RevendConfig, ConfigError> {
        let result = Self::with_handle(false, |handle| {
            let mut size: usize = 0;
            // SAFETY: size query with a null buffer.
            let ret = unsafe {
                nvs_get_blob(handle, CONFIG_KEY.as_ptr().cast(), core::ptr::null_mut(), &mut size)
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            if size == 0 || size > MAX_BLOB_SIZE {
                return Err(ESP_ERR_NVS_INVALID_LENGTH);
            }
            let mut buf = vec![0u8; size];
            // SAFETY: buf holds exactly `size` bytes.
            let ret = unsafe {
                nvs_get_blob(handle, CONFIG_KEY.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size)
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(buf)
        });

        match result {
            Ok(bytes) => {
                let cfg = Self::decode(&bytes)?;
                info!("NvsAdapter: loaded config from NVS ({} bytes)", bytes.len());
                Ok(cfg)
            }
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Err(ConfigError::NotFound),
            Err(e) => {
                warn!("NvsAdapter: NVS read error {}", e);
                Err(ConfigError::IoError)
            }
        }
    }

    fn save(&self, config: &RevendConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;

        #[cfg(not(target_os = "espidf"))]
        {
            info!("NvsAdapter: config saved ({} bytes, simulation)", bytes.len());
            *self.blob.borrow_mut() = Some(bytes);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_handle(true, |handle| {
                // SAFETY: key is NUL-terminated; bytes outlives the call.
                let ret = unsafe {
                    nvs_set_blob(handle, CONFIG_KEY.as_ptr().cast(), bytes.as_ptr().cast(), bytes.len())
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsAdapter: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}

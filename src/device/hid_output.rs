//! USB HID gadget writer (`/dev/hidg*`)

use super::OutputDevice;
use crate::error::HemiolaError;
use crate::keyboard::KeyReport;
use log::{debug, error, info, warn};
use nix::libc;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;

/// Writes 8-byte boot reports to the gadget device
#[derive(Debug)]
pub struct HidOutput {
    path: PathBuf,
    file: Option<File>,
}

impl HidOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }
}

impl OutputDevice for HidOutput {
    fn open(&mut self) -> Result<(), HemiolaError> {
        let file = OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(&self.path)
            .map_err(|source| HemiolaError::Open {
                path: self.path.clone(),
                source,
            })?;
        info!("Writing reports to {}", self.path.display());
        self.file = Some(file);
        Ok(())
    }

    fn close(&mut self) {
        if self.file.is_none() {
            return;
        }
        if let Err(e) = self.release_all() {
            warn!("Could not release keys on {}: {}", self.path.display(), e);
        }
        self.file = None;
        debug!("Closed {}", self.path.display());
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn write_report(&mut self, report: &KeyReport) -> Result<(), HemiolaError> {
        let file = self.file.as_mut().ok_or(HemiolaError::NotOpen("output"))?;
        file.write_all(&report.to_bytes()).map_err(|e| {
            error!("Write to {} failed: {}", self.path.display(), e);
            HemiolaError::Write(e)
        })
    }
}

impl Drop for HidOutput {
    fn drop(&mut self) {
        self.close();
    }
}

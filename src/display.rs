use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::DisplayConfig;

#[derive(thiserror::Error, Debug)]
pub enum DisplayError {
    #[error("Cannot start {0}: {1}")]
    Spawn(String, std::io::Error),

    #[error("{0} exited with {1}")]
    Failed(String, std::process::ExitStatus),
}

pub type DisplayResult<T> = Result<T, DisplayError>;

/// The e-paper panel, driven by an external command
pub struct EpaperDisplay {
    spi_device: PathBuf,
    command: Vec<String>,
}

impl EpaperDisplay {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            spi_device: config.spi_device.clone(),
            command: config.command.clone(),
        }
    }

    /// Only Linux boards with the panel's SPI device
    pub fn hardware_present(&self) -> bool {
        cfg!(target_os = "linux") && self.spi_device.exists()
    }

    pub fn show(&self, image: &Path) -> DisplayResult<()> {
        log::info!("Display {} on ePaper", image.display());

        if !self.hardware_present() {
            log::debug!("No panel at {}, skipping", self.spi_device.display());
            return Ok(());
        }

        let Some((program, args)) = self.command.split_first() else {
            log::warn!("Panel found but no display command configured");
            return Ok(());
        };

        let status = Command::new(program)
            .args(args)
            .arg(image)
            .status()
            .map_err(|e| DisplayError::Spawn(program.clone(), e))?;

        if !status.success() {
            return Err(DisplayError::Failed(program.clone(), status));
        }

        Ok(())
    }
}

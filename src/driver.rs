// Driver factory capability boundary
// The core does no browser automation itself. It only names the backends it
// can ask for, configures the instance it gets back, and closes it.

use crate::config::DriverConfig;
use crate::error::UnsupportedDriverError;
use anyhow::Result;
use std::str::FromStr;

/// Automation backends the factory knows how to identify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedDriver {
    Firefox,
    Chrome,
    HtmlUnit,
}

impl SupportedDriver {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedDriver::Firefox => "firefox",
            SupportedDriver::Chrome => "chrome",
            SupportedDriver::HtmlUnit => "htmlunit",
        }
    }
}

impl FromStr for SupportedDriver {
    type Err = UnsupportedDriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "firefox" => Ok(SupportedDriver::Firefox),
            "chrome" => Ok(SupportedDriver::Chrome),
            "htmlunit" => Ok(SupportedDriver::HtmlUnit),
            other => Err(UnsupportedDriverError(other.to_string())),
        }
    }
}

/// Opaque handle to a browser-automation session.
pub trait DriverHandle {
    /// Run a script inside the session.
    fn execute_script(&mut self, script: &str) -> Result<()>;

    /// Close the session and release its resources.
    fn quit(&mut self) -> Result<()>;
}

/// Supplies configured driver instances for a recognized backend.
pub trait DriverFactory {
    fn new_driver(&self, driver: SupportedDriver) -> Result<Box<dyn DriverHandle>>;
}

/// Resolve an identifier, create the driver, and apply the configured
/// startup window size. An unrecognized identifier fails the one test run
/// that needed the driver.
pub fn create_driver(
    factory: &dyn DriverFactory,
    identifier: &str,
    config: &DriverConfig,
) -> Result<Box<dyn DriverHandle>> {
    let driver: SupportedDriver = identifier.parse()?;
    let mut handle = factory.new_driver(driver)?;
    resize_window(handle.as_mut(), config)?;
    Ok(handle)
}

fn resize_window(handle: &mut dyn DriverHandle, config: &DriverConfig) -> Result<()> {
    if let (Some(width), Some(height)) = (config.snapshot_width, config.snapshot_height) {
        handle.execute_script(&format!("window.resizeTo({width},{height})"))?;
    }
    Ok(())
}

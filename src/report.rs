//! Display records for the tutorial output.

use std::fmt;

use crate::{
    Driver, Extent3d, PhysicalDevice, PhysicalDeviceKind, PhysicalDeviceProperties, QueueFlags,
    Version, VulkanError,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceReport {
    pub api_version: Version,
    pub driver_version: u32,
    pub device_name: String,
    pub device_kind: PhysicalDeviceKind,
}

impl From<PhysicalDeviceProperties> for DeviceReport {
    fn from(properties: PhysicalDeviceProperties) -> Self {
        Self {
            api_version: properties.api_version,
            driver_version: properties.driver_version,
            device_name: properties.device_name,
            device_kind: properties.device_kind,
        }
    }
}

impl fmt::Display for DeviceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\tAPI Version: {}", self.api_version)?;
        writeln!(f, "\tDriver Version: {}", self.driver_version)?;
        writeln!(f, "\tDevice Name: {}", self.device_name)?;
        writeln!(
            f,
            "\tDevice Type: {} ({})",
            self.device_kind.code(),
            self.device_kind
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueFamilyReport {
    pub index: u32,
    pub queue_count: u32,
    pub min_image_transfer_granularity: Extent3d,
    pub capabilities: QueueFlags,
}

impl fmt::Display for QueueFamilyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t Index: {}", self.index)?;
        writeln!(f, "\t Count of Queues: {}", self.queue_count)?;
        writeln!(
            f,
            "\t Minimum Image Transfer Granularity (Width Height Depth): {}",
            self.min_image_transfer_granularity
        )?;
        writeln!(f, "\t Supported operations on this queue:")?;

        for name in self.capabilities.capability_names() {
            writeln!(f, "\t\t {}", name)?;
        }

        Ok(())
    }
}

pub fn report_device_properties<D: Driver>(device: &PhysicalDevice<D>) -> DeviceReport {
    device.properties().into()
}

pub fn report_queue_families<D: Driver>(
    device: &PhysicalDevice<D>,
) -> Result<Vec<QueueFamilyReport>, VulkanError> {
    let families = device.try_queue_families()?;

    Ok(families
        .into_iter()
        .map(|family| QueueFamilyReport {
            index: family.index,
            queue_count: family.queue_count,
            min_image_transfer_granularity: family.min_image_transfer_granularity,
            capabilities: family.queue_flags,
        })
        .collect())
}

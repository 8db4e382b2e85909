use std::{ffi, fmt, sync::Arc};

use ash::vk;

use crate::{AshDriver, Driver, Extent3d, Instance, InstanceInner, Version, VulkanError, enumerate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhysicalDeviceKind {
    Other,
    IntegratedGpu,
    DiscreteGpu,
    VirtualGpu,
    Cpu,
}

impl PhysicalDeviceKind {
    pub fn from_vk(device_type: vk::PhysicalDeviceType) -> Self {
        match device_type {
            vk::PhysicalDeviceType::INTEGRATED_GPU => PhysicalDeviceKind::IntegratedGpu,
            vk::PhysicalDeviceType::DISCRETE_GPU => PhysicalDeviceKind::DiscreteGpu,
            vk::PhysicalDeviceType::VIRTUAL_GPU => PhysicalDeviceKind::VirtualGpu,
            vk::PhysicalDeviceType::CPU => PhysicalDeviceKind::Cpu,
            _ => PhysicalDeviceKind::Other,
        }
    }

    /// The raw `VkPhysicalDeviceType` value.
    pub fn code(self) -> i32 {
        match self {
            PhysicalDeviceKind::Other => vk::PhysicalDeviceType::OTHER,
            PhysicalDeviceKind::IntegratedGpu => vk::PhysicalDeviceType::INTEGRATED_GPU,
            PhysicalDeviceKind::DiscreteGpu => vk::PhysicalDeviceType::DISCRETE_GPU,
            PhysicalDeviceKind::VirtualGpu => vk::PhysicalDeviceType::VIRTUAL_GPU,
            PhysicalDeviceKind::Cpu => vk::PhysicalDeviceType::CPU,
        }
        .as_raw()
    }
}

impl fmt::Display for PhysicalDeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhysicalDeviceKind::Other => "Other",
            PhysicalDeviceKind::IntegratedGpu => "Integrated GPU",
            PhysicalDeviceKind::DiscreteGpu => "Discrete GPU",
            PhysicalDeviceKind::VirtualGpu => "Virtual GPU",
            PhysicalDeviceKind::Cpu => "CPU",
        };

        f.write_str(name)
    }
}

bitflags::bitflags! {
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct QueueFlags: u32 {
        const GRAPHICS           = 0x00000001;
        const COMPUTE            = 0x00000002;
        const TRANSFER           = 0x00000004;
        const SPARSE_BINDING     = 0x00000008;
        const PROTECTED          = 0x00000010;
        const VIDEO_DECODE       = 0x00000020;
        const VIDEO_ENCODE       = 0x00000040;
        const OPTICAL_FLOW       = 0x00000100;
    }
}

impl QueueFlags {
    const REPORTED: [(QueueFlags, &'static str); 4] = [
        (QueueFlags::GRAPHICS, "Graphics"),
        (QueueFlags::COMPUTE, "Compute"),
        (QueueFlags::TRANSFER, "Transfer"),
        (QueueFlags::SPARSE_BINDING, "Sparse Binding"),
    ];

    /// Names of the core operations this set supports, each tested on its own.
    pub fn capability_names(self) -> impl Iterator<Item = &'static str> {
        Self::REPORTED
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueFamilyProperties {
    /// Position in the enumeration, used to request queues from this family.
    pub index: u32,
    pub queue_flags: QueueFlags,
    pub queue_count: u32,
    pub min_image_transfer_granularity: Extent3d,
}

#[derive(Clone, Debug)]
pub struct PhysicalDeviceProperties {
    pub api_version: Version,
    /// Vendor specific encoding, kept as reported.
    pub driver_version: u32,
    pub vendor_id: u32,
    pub device_id: u32,
    pub device_kind: PhysicalDeviceKind,
    pub device_name: String,
}

impl PhysicalDeviceProperties {
    pub(crate) fn from_vk(properties: &vk::PhysicalDeviceProperties) -> Self {
        let name: Vec<u8> = properties.device_name.iter().map(|&c| c as u8).collect();
        let device_name = ffi::CStr::from_bytes_until_nul(&name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&name).into_owned());

        Self {
            api_version: Version::from_vk_version(properties.api_version),
            driver_version: properties.driver_version,
            vendor_id: properties.vendor_id,
            device_id: properties.device_id,
            device_kind: PhysicalDeviceKind::from_vk(properties.device_type),
            device_name,
        }
    }
}

pub struct PhysicalDevice<D: Driver = AshDriver> {
    pub(crate) handle: vk::PhysicalDevice,

    pub(crate) instance: Arc<InstanceInner<D>>,
}

impl<D: Driver> PhysicalDevice<D> {
    pub fn handle(&self) -> vk::PhysicalDevice {
        self.handle
    }

    pub fn properties(&self) -> PhysicalDeviceProperties {
        let properties = unsafe {
            (self.instance.driver).get_physical_device_properties(&self.instance.handle, self.handle)
        };

        PhysicalDeviceProperties::from_vk(&properties)
    }

    #[track_caller]
    pub fn queue_families(&self) -> Vec<QueueFamilyProperties> {
        self.try_queue_families()
            .expect("Failed to query queue family properties")
    }

    pub fn try_queue_families(&self) -> Result<Vec<QueueFamilyProperties>, VulkanError> {
        let families = enumerate(|count, properties| {
            unsafe {
                (self.instance.driver).get_physical_device_queue_family_properties(
                    &self.instance.handle,
                    self.handle,
                    count,
                    properties,
                );
            }

            vk::Result::SUCCESS
        })?;

        Ok(families
            .into_iter()
            .zip(0..)
            .map(|(family, index)| QueueFamilyProperties {
                index,
                queue_flags: QueueFlags::from_bits_truncate(family.queue_flags.as_raw()),
                queue_count: family.queue_count,
                min_image_transfer_granularity: family.min_image_transfer_granularity.into(),
            })
            .collect())
    }

    /// Index of the first queue family supporting every operation in `required`.
    pub fn find_queue_family(&self, required: QueueFlags) -> Result<Option<u32>, VulkanError> {
        let families = self.try_queue_families()?;

        Ok(families
            .iter()
            .find(|family| family.queue_flags.contains(required))
            .map(|family| family.index))
    }
}

impl<D: Driver> Clone for PhysicalDevice<D> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle,
            instance: self.instance.clone(),
        }
    }
}

impl<D: Driver> fmt::Debug for PhysicalDevice<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicalDevice")
            .field("handle", &self.handle)
            .finish()
    }
}

impl<D: Driver> Instance<D> {
    #[track_caller]
    pub fn enumerate_physical_devices(&self) -> Vec<PhysicalDevice<D>> {
        self.try_enumerate_physical_devices()
            .expect("Failed to enumerate physical devices")
    }

    /// Fails with [`VulkanError::NoDevicesFound`] when the driver reports no devices.
    pub fn try_enumerate_physical_devices(&self) -> Result<Vec<PhysicalDevice<D>>, VulkanError> {
        let handles = enumerate(|count, devices| unsafe {
            (self.inner.driver).enumerate_physical_devices(&self.inner.handle, count, devices)
        })?;

        if handles.is_empty() {
            return Err(VulkanError::NoDevicesFound);
        }

        tracing::debug!(count = handles.len(), "Enumerated physical devices");

        Ok(handles
            .into_iter()
            .map(|handle| PhysicalDevice {
                handle,
                instance: self.inner.clone(),
            })
            .collect())
    }
}

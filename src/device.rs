use std::{fmt, sync::Arc};

use ash::vk;

use crate::{
    AshDriver, Driver, PhysicalDevice, QueueFamilyProperties, QueueFlags, Validated,
    ValidationError, VulkanError, is_validation_enabled,
};

#[derive(Clone, Debug)]
pub struct QueueFamilyDescriptor<'a> {
    pub family_index: u32,
    pub priorities: &'a [f32],
}

#[derive(Clone, Debug, Default)]
pub struct DeviceDescriptor<'a> {
    pub queue_families: &'a [QueueFamilyDescriptor<'a>],
}

/// How to pick the queue family a device is created with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueueFamilySelection {
    /// Always family 0, whatever it supports.
    #[default]
    First,
    /// The first family supporting every operation in the set.
    Capable(QueueFlags),
}

impl QueueFamilySelection {
    pub fn select(self, families: &[QueueFamilyProperties]) -> Result<u32, VulkanError> {
        match self {
            QueueFamilySelection::First => {
                let supports_graphics = families
                    .first()
                    .is_some_and(|family| family.queue_flags.contains(QueueFlags::GRAPHICS));

                if !supports_graphics {
                    tracing::warn!("Queue family 0 selected without graphics support");
                }

                Ok(0)
            }
            QueueFamilySelection::Capable(required) => families
                .iter()
                .find(|family| family.queue_flags.contains(required))
                .map(|family| family.index)
                .ok_or(VulkanError::NoSuitableQueueFamily),
        }
    }
}

pub struct Device<D: Driver = AshDriver> {
    pub(crate) inner: Arc<DeviceInner<D>>,
}

impl<D: Driver> Device<D> {
    pub fn handle(&self) -> &D::Device {
        &self.inner.handle
    }

    pub fn physical(&self) -> &PhysicalDevice<D> {
        &self.inner.physical
    }

    /// Families and queue counts the device was created with.
    pub fn queue_families(&self) -> &[(u32, u32)] {
        &self.inner.queue_families
    }
}

impl<D: Driver> fmt::Debug for Device<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("physical", &self.inner.physical)
            .field("queue_families", &self.inner.queue_families)
            .finish()
    }
}

pub(crate) struct DeviceInner<D: Driver> {
    pub(crate) handle: D::Device,

    // keeps the instance alive until after the device is destroyed
    pub(crate) physical: PhysicalDevice<D>,

    pub(crate) queue_families: Vec<(u32, u32)>,
}

impl<D: Driver> Drop for DeviceInner<D> {
    fn drop(&mut self) {
        unsafe {
            tracing::trace!(
                physical = ?self.physical.handle,
                "Destroying Vulkan device"
            );

            (self.physical.instance.driver).destroy_device(&self.handle);
        }
    }
}

impl<D: Driver> PhysicalDevice<D> {
    #[track_caller]
    pub fn create_device(&self, desc: &DeviceDescriptor<'_>) -> Device<D> {
        self.try_create_device(desc)
            .expect("Failed to create device")
    }

    pub fn try_create_device(
        &self,
        desc: &DeviceDescriptor<'_>,
    ) -> Result<Device<D>, Validated<VulkanError>> {
        if is_validation_enabled() {
            let families = self.try_queue_families()?;
            validate_create_device(desc, &families)?;
        }

        unsafe { self.try_create_device_unchecked(desc).map_err(From::from) }
    }

    /// Creates a device with a single queue, at priority 1.0, from `family_index`.
    ///
    /// The queue families are always queried first; if that fails no device is created.
    pub fn try_create_device_for_family(
        &self,
        family_index: u32,
    ) -> Result<Device<D>, Validated<VulkanError>> {
        let families = self.try_queue_families()?;
        self.try_create_device_in(&families, family_index)
    }

    /// Like [`try_create_device_for_family`](Self::try_create_device_for_family), with
    /// `families` already queried from this device.
    pub fn try_create_device_in(
        &self,
        families: &[QueueFamilyProperties],
        family_index: u32,
    ) -> Result<Device<D>, Validated<VulkanError>> {
        tracing::debug!(
            family_index,
            family_count = families.len(),
            "Creating device with a single queue",
        );

        let queue_families = [QueueFamilyDescriptor {
            family_index,
            priorities: &[1.0],
        }];

        let desc = DeviceDescriptor {
            queue_families: &queue_families,
        };

        if is_validation_enabled() {
            validate_create_device(&desc, families)?;
        }

        unsafe { self.try_create_device_unchecked(&desc).map_err(From::from) }
    }

    /// # Safety
    /// - The 'queue_families' must not be empty.
    /// - The `family_index` in each `QueueFamilyDescriptor` must be unique.
    /// - The `family_index` in each `QueueFamilyDescriptor` must be a valid queue family index for the physical device.
    /// - The `priorities` in each `QueueFamilyDescriptor` must contain only valid queue priorities (between 0.0 and 1.0).
    /// - The `priorities` in each `QueueFamilyDescriptor` must not exceed the number of queues in the family.
    pub unsafe fn try_create_device_unchecked(
        &self,
        desc: &DeviceDescriptor<'_>,
    ) -> Result<Device<D>, VulkanError> {
        let queue_create_infos: Vec<_> = desc
            .queue_families
            .iter()
            .map(|family| vk::DeviceQueueCreateInfo {
                flags: vk::DeviceQueueCreateFlags::empty(),
                queue_family_index: family.family_index,
                queue_count: family.priorities.len() as u32,
                p_queue_priorities: family.priorities.as_ptr(),
                ..Default::default()
            })
            .collect();

        let create_info = vk::DeviceCreateInfo {
            flags: vk::DeviceCreateFlags::empty(),
            queue_create_info_count: queue_create_infos.len() as u32,
            p_queue_create_infos: queue_create_infos.as_ptr(),
            ..Default::default()
        };

        let handle = unsafe {
            (self.instance.driver).create_device(&self.instance.handle, self.handle, &create_info)?
        };

        tracing::debug!(physical = ?self.handle, "Created Vulkan device");

        let inner = DeviceInner {
            handle,

            physical: self.clone(),

            queue_families: desc
                .queue_families
                .iter()
                .map(|family| (family.family_index, family.priorities.len() as u32))
                .collect(),
        };

        Ok(Device {
            inner: Arc::new(inner),
        })
    }
}

fn validate_create_device(
    desc: &DeviceDescriptor<'_>,
    families: &[QueueFamilyProperties],
) -> Result<(), ValidationError> {
    if desc.queue_families.is_empty() {
        return Err(ValidationError {
            context: "desc.queue_families".into(),
            problem: "At least one queue family must be specified.".into(),
            vuids: &["VUID-VkDeviceCreateInfo-None-10778"],
        });
    }

    for (i, family) in desc.queue_families.iter().enumerate() {
        let Some(properties) = families.get(family.family_index as usize) else {
            return Err(ValidationError {
                context: "desc.queue_families[_].family_index".into(),
                problem: "Queue family index is out of bounds for the physical device.".into(),
                vuids: &["VUID-VkDeviceQueueCreateInfo-queueFamilyIndex-00381"],
            });
        };

        if family.priorities.is_empty() {
            return Err(ValidationError {
                context: "desc.queue_families[_].priorities".into(),
                problem: "At least one queue priority must be specified.".into(),
                vuids: &["VUID-VkDeviceQueueCreateInfo-queueCount-arraylength"],
            });
        }

        if family.priorities.len() > properties.queue_count as usize {
            return Err(ValidationError {
                context: "desc.queue_families[_].priorities".into(),
                problem: "Number of queue priorities exceeds the number of queues in the family."
                    .into(),
                vuids: &["VUID-VkDeviceQueueCreateInfo-queueCount-00382"],
            });
        }

        let has_duplicate = desc.queue_families[..i]
            .iter()
            .any(|f| f.family_index == family.family_index);

        if has_duplicate {
            return Err(ValidationError {
                context: "desc.queue_families[_].family_index".into(),
                problem: "Queue family index must be unique.".into(),
                vuids: &["VUID-VkDeviceCreateInfo-queueFamilyIndex-02802"],
            });
        }

        let priorities_out_of_bounds = family
            .priorities
            .iter()
            .any(|&p| !(0.0..=1.0).contains(&p) || p.is_nan());

        if priorities_out_of_bounds {
            return Err(ValidationError {
                context: "desc.queue_families[_].priorities".into(),
                problem: "Queue priorities must be between 0.0 and 1.0.".into(),
                vuids: &["VUID-VkDeviceQueueCreateInfo-pQueuePriorities-00383"],
            });
        }
    }

    Ok(())
}

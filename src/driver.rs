use std::{fmt, ptr};

use ash::vk;

/// The calls this crate makes into a Vulkan implementation.
///
/// Enumeration methods follow the raw two-call shape: when the output slice is
/// `None`, `count` receives the number of available elements; otherwise `count`
/// holds the slice length on input and the number of elements written on output.
pub trait Driver {
    type Instance;
    type Device;

    /// # Safety
    /// - Every pointer in `create_info` must be valid for the duration of the call.
    unsafe fn create_instance(
        &self,
        create_info: &vk::InstanceCreateInfo<'_>,
    ) -> Result<Self::Instance, vk::Result>;

    /// # Safety
    /// - `instance` must have been created by this driver and not yet destroyed.
    /// - No object created from `instance` may still be alive.
    unsafe fn destroy_instance(&self, instance: &Self::Instance);

    /// # Safety
    /// - `instance` must be alive.
    /// - If `devices` is `Some`, `*count` must equal its length.
    unsafe fn enumerate_physical_devices(
        &self,
        instance: &Self::Instance,
        count: &mut u32,
        devices: Option<&mut [vk::PhysicalDevice]>,
    ) -> vk::Result;

    /// # Safety
    /// - `physical` must have been enumerated from `instance`, which must be alive.
    unsafe fn get_physical_device_properties(
        &self,
        instance: &Self::Instance,
        physical: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceProperties;

    /// # Safety
    /// - `physical` must have been enumerated from `instance`, which must be alive.
    /// - If `properties` is `Some`, `*count` must equal its length.
    unsafe fn get_physical_device_queue_family_properties(
        &self,
        instance: &Self::Instance,
        physical: vk::PhysicalDevice,
        count: &mut u32,
        properties: Option<&mut [vk::QueueFamilyProperties]>,
    );

    /// # Safety
    /// - `physical` must have been enumerated from `instance`, which must be alive.
    /// - Every pointer in `create_info` must be valid for the duration of the call.
    unsafe fn create_device(
        &self,
        instance: &Self::Instance,
        physical: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo<'_>,
    ) -> Result<Self::Device, vk::Result>;

    /// # Safety
    /// - `device` must have been created by this driver and not yet destroyed.
    unsafe fn destroy_device(&self, device: &Self::Device);
}

/// [`Driver`] backed by the system Vulkan loader through `ash`.
pub struct AshDriver {
    entry: ash::Entry,
}

impl AshDriver {
    pub fn linked() -> Self {
        Self {
            entry: ash::Entry::linked(),
        }
    }
}

impl fmt::Debug for AshDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AshDriver").finish()
    }
}

impl Driver for AshDriver {
    type Instance = ash::Instance;
    type Device = ash::Device;

    unsafe fn create_instance(
        &self,
        create_info: &vk::InstanceCreateInfo<'_>,
    ) -> Result<ash::Instance, vk::Result> {
        unsafe { self.entry.create_instance(create_info, None) }
    }

    unsafe fn destroy_instance(&self, instance: &ash::Instance) {
        unsafe { instance.destroy_instance(None) }
    }

    unsafe fn enumerate_physical_devices(
        &self,
        instance: &ash::Instance,
        count: &mut u32,
        devices: Option<&mut [vk::PhysicalDevice]>,
    ) -> vk::Result {
        let devices = devices.map_or(ptr::null_mut(), |d| d.as_mut_ptr());

        unsafe { (instance.fp_v1_0().enumerate_physical_devices)(instance.handle(), count, devices) }
    }

    unsafe fn get_physical_device_properties(
        &self,
        instance: &ash::Instance,
        physical: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceProperties {
        unsafe { instance.get_physical_device_properties(physical) }
    }

    unsafe fn get_physical_device_queue_family_properties(
        &self,
        instance: &ash::Instance,
        physical: vk::PhysicalDevice,
        count: &mut u32,
        properties: Option<&mut [vk::QueueFamilyProperties]>,
    ) {
        let properties = properties.map_or(ptr::null_mut(), |p| p.as_mut_ptr());

        unsafe {
            (instance.fp_v1_0().get_physical_device_queue_family_properties)(
                physical, count, properties,
            )
        }
    }

    unsafe fn create_device(
        &self,
        instance: &ash::Instance,
        physical: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo<'_>,
    ) -> Result<ash::Device, vk::Result> {
        unsafe { instance.create_device(physical, create_info, None) }
    }

    unsafe fn destroy_device(&self, device: &ash::Device) {
        unsafe { device.destroy_device(None) }
    }
}

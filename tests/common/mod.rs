#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    ffi, slice,
};

use ash::vk::{self, Handle};
use vktut::{Driver, Entry};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateInstance {
        app_name: Option<String>,
        engine_version: u32,
        api_version: u32,
        layer_count: u32,
        extension_count: u32,
    },
    DestroyInstance(u64),
    EnumeratePhysicalDevices {
        capacity: Option<usize>,
    },
    GetProperties(u64),
    GetQueueFamilies {
        device: u64,
        capacity: Option<usize>,
    },
    CreateDevice {
        physical: u64,
        queues: Vec<(u32, Vec<f32>)>,
    },
    DestroyDevice(u64),
}

#[derive(Clone, Debug)]
pub struct MockPhysicalDevice {
    pub name: &'static str,
    pub device_type: vk::PhysicalDeviceType,
    pub api_version: u32,
    pub driver_version: u32,
    pub families: Vec<vk::QueueFamilyProperties>,
}

impl MockPhysicalDevice {
    pub fn new(name: &'static str, families: &[(vk::QueueFlags, u32)]) -> Self {
        Self {
            name,
            device_type: vk::PhysicalDeviceType::DISCRETE_GPU,
            api_version: vk::make_api_version(0, 1, 3, 275),
            driver_version: 1,
            families: families
                .iter()
                .map(|&(queue_flags, queue_count)| vk::QueueFamilyProperties {
                    queue_flags,
                    queue_count,
                    timestamp_valid_bits: 64,
                    min_image_transfer_granularity: vk::Extent3D {
                        width: 1,
                        height: 1,
                        depth: 1,
                    },
                })
                .collect(),
        }
    }
}

/// Records every call and answers from a fixed set of devices.
#[derive(Debug, Default)]
pub struct MockDriver {
    pub devices: Vec<MockPhysicalDevice>,
    pub create_instance_result: Option<vk::Result>,
    pub enumerate_result: Option<vk::Result>,
    pub create_device_result: Option<vk::Result>,
    /// Number of trailing devices hidden from the first count query.
    pub late_devices: Cell<usize>,
    pub calls: RefCell<Vec<Call>>,
    pub next_handle: Cell<u64>,
}

impl MockDriver {
    pub fn with_devices(devices: Vec<MockPhysicalDevice>) -> Self {
        Self {
            devices,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn position(&self, matches: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls.borrow().iter().position(matches)
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| matches(call)).count()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn allocate_handle(&self) -> u64 {
        let handle = self.next_handle.get() + 1;
        self.next_handle.set(handle);
        handle + 100
    }

    fn device(&self, physical: vk::PhysicalDevice) -> &MockPhysicalDevice {
        &self.devices[physical.as_raw() as usize - 1]
    }
}

pub fn physical_handle(index: usize) -> vk::PhysicalDevice {
    vk::PhysicalDevice::from_raw(index as u64 + 1)
}

fn read_name(name: *const ffi::c_char) -> Option<String> {
    if name.is_null() {
        return None;
    }

    let name = unsafe { ffi::CStr::from_ptr(name) };
    Some(name.to_string_lossy().into_owned())
}

impl Driver for MockDriver {
    type Instance = u64;
    type Device = u64;

    unsafe fn create_instance(
        &self,
        create_info: &vk::InstanceCreateInfo<'_>,
    ) -> Result<u64, vk::Result> {
        let app_info = unsafe { &*create_info.p_application_info };

        self.record(Call::CreateInstance {
            app_name: read_name(app_info.p_application_name),
            engine_version: app_info.engine_version,
            api_version: app_info.api_version,
            layer_count: create_info.enabled_layer_count,
            extension_count: create_info.enabled_extension_count,
        });

        match self.create_instance_result {
            Some(err) => Err(err),
            None => Ok(self.allocate_handle()),
        }
    }

    unsafe fn destroy_instance(&self, instance: &u64) {
        self.record(Call::DestroyInstance(*instance));
    }

    unsafe fn enumerate_physical_devices(
        &self,
        _instance: &u64,
        count: &mut u32,
        devices: Option<&mut [vk::PhysicalDevice]>,
    ) -> vk::Result {
        self.record(Call::EnumeratePhysicalDevices {
            capacity: devices.as_ref().map(|d| d.len()),
        });

        if let Some(err) = self.enumerate_result {
            return err;
        }

        let Some(devices) = devices else {
            *count = (self.devices.len() - self.late_devices.get()) as u32;
            return vk::Result::SUCCESS;
        };

        assert_eq!(*count as usize, devices.len());

        // late devices become visible once the count has been taken
        self.late_devices.set(0);

        let written = devices.len().min(self.devices.len());
        for (index, slot) in devices[..written].iter_mut().enumerate() {
            *slot = physical_handle(index);
        }
        *count = written as u32;

        if written < self.devices.len() {
            vk::Result::INCOMPLETE
        } else {
            vk::Result::SUCCESS
        }
    }

    unsafe fn get_physical_device_properties(
        &self,
        _instance: &u64,
        physical: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceProperties {
        self.record(Call::GetProperties(physical.as_raw()));

        let device = self.device(physical);
        let mut properties = vk::PhysicalDeviceProperties {
            api_version: device.api_version,
            driver_version: device.driver_version,
            vendor_id: 0x10DE,
            device_id: physical.as_raw() as u32,
            device_type: device.device_type,
            ..Default::default()
        };

        for (dst, src) in properties.device_name.iter_mut().zip(device.name.bytes()) {
            *dst = src as ffi::c_char;
        }

        properties
    }

    unsafe fn get_physical_device_queue_family_properties(
        &self,
        _instance: &u64,
        physical: vk::PhysicalDevice,
        count: &mut u32,
        properties: Option<&mut [vk::QueueFamilyProperties]>,
    ) {
        self.record(Call::GetQueueFamilies {
            device: physical.as_raw(),
            capacity: properties.as_ref().map(|p| p.len()),
        });

        let families = &self.device(physical).families;

        match properties {
            None => *count = families.len() as u32,
            Some(properties) => {
                assert_eq!(*count as usize, properties.len());

                let written = properties.len().min(families.len());
                properties[..written].copy_from_slice(&families[..written]);
                *count = written as u32;
            }
        }
    }

    unsafe fn create_device(
        &self,
        _instance: &u64,
        physical: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo<'_>,
    ) -> Result<u64, vk::Result> {
        let queue_infos = unsafe {
            slice::from_raw_parts(
                create_info.p_queue_create_infos,
                create_info.queue_create_info_count as usize,
            )
        };

        let queues = queue_infos
            .iter()
            .map(|info| {
                let priorities = unsafe {
                    slice::from_raw_parts(info.p_queue_priorities, info.queue_count as usize)
                };

                (info.queue_family_index, priorities.to_vec())
            })
            .collect();

        self.record(Call::CreateDevice {
            physical: physical.as_raw(),
            queues,
        });

        match self.create_device_result {
            Some(err) => Err(err),
            None => Ok(self.allocate_handle()),
        }
    }

    unsafe fn destroy_device(&self, device: &u64) {
        self.record(Call::DestroyDevice(*device));
    }
}

pub fn entry(driver: MockDriver) -> Entry<MockDriver> {
    Entry::new(driver)
}

/// Two devices; the first has families `[GRAPHICS|TRANSFER, COMPUTE, TRANSFER|SPARSE_BINDING]`.
pub fn two_devices() -> MockDriver {
    MockDriver::with_devices(vec![
        MockPhysicalDevice::new(
            "Mock Discrete",
            &[
                (vk::QueueFlags::GRAPHICS | vk::QueueFlags::TRANSFER, 16),
                (vk::QueueFlags::COMPUTE, 8),
                (vk::QueueFlags::TRANSFER | vk::QueueFlags::SPARSE_BINDING, 2),
            ],
        ),
        MockPhysicalDevice {
            device_type: vk::PhysicalDeviceType::INTEGRATED_GPU,
            ..MockPhysicalDevice::new("Mock Integrated", &[(vk::QueueFlags::GRAPHICS, 1)])
        },
    ])
}

pub fn output(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap()
}

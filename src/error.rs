use ash::vk;
use thiserror::Error;

/// Error returned by the driver, or synthesized when a query comes back empty.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum VulkanError {
    #[error("out of host memory ({})", vk::Result::ERROR_OUT_OF_HOST_MEMORY.as_raw())]
    OutOfHostMemory,

    #[error("out of device memory ({})", vk::Result::ERROR_OUT_OF_DEVICE_MEMORY.as_raw())]
    OutOfDeviceMemory,

    #[error("initialization failed ({})", vk::Result::ERROR_INITIALIZATION_FAILED.as_raw())]
    InitializationFailed,

    #[error("layer not present ({})", vk::Result::ERROR_LAYER_NOT_PRESENT.as_raw())]
    LayerNotPresent,

    #[error("extension not present ({})", vk::Result::ERROR_EXTENSION_NOT_PRESENT.as_raw())]
    ExtensionNotPresent,

    #[error("incompatible driver ({})", vk::Result::ERROR_INCOMPATIBLE_DRIVER.as_raw())]
    IncompatibleDriver,

    /// No physical device with Vulkan support was found.
    #[error("no device with Vulkan support present ({})", vk::Result::ERROR_INITIALIZATION_FAILED.as_raw())]
    NoDevicesFound,

    /// No queue family supports the requested capabilities.
    #[error("no queue family supports the requested operations ({})", vk::Result::ERROR_INITIALIZATION_FAILED.as_raw())]
    NoSuitableQueueFamily,

    #[error("{0:?} ({code})", code = .0.as_raw())]
    Other(vk::Result),
}

impl VulkanError {
    /// The raw `VkResult` value of this error.
    pub fn code(&self) -> i32 {
        self.as_vk_result().as_raw()
    }

    pub fn as_vk_result(&self) -> vk::Result {
        match self {
            VulkanError::OutOfHostMemory => vk::Result::ERROR_OUT_OF_HOST_MEMORY,
            VulkanError::OutOfDeviceMemory => vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
            VulkanError::InitializationFailed => vk::Result::ERROR_INITIALIZATION_FAILED,
            VulkanError::LayerNotPresent => vk::Result::ERROR_LAYER_NOT_PRESENT,
            VulkanError::ExtensionNotPresent => vk::Result::ERROR_EXTENSION_NOT_PRESENT,
            VulkanError::IncompatibleDriver => vk::Result::ERROR_INCOMPATIBLE_DRIVER,
            // synthesized, reported with the closest driver code
            VulkanError::NoDevicesFound | VulkanError::NoSuitableQueueFamily => {
                vk::Result::ERROR_INITIALIZATION_FAILED
            }
            VulkanError::Other(result) => *result,
        }
    }
}

impl From<vk::Result> for VulkanError {
    fn from(result: vk::Result) -> Self {
        match result {
            vk::Result::ERROR_OUT_OF_HOST_MEMORY => VulkanError::OutOfHostMemory,
            vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => VulkanError::OutOfDeviceMemory,
            vk::Result::ERROR_INITIALIZATION_FAILED => VulkanError::InitializationFailed,
            vk::Result::ERROR_LAYER_NOT_PRESENT => VulkanError::LayerNotPresent,
            vk::Result::ERROR_EXTENSION_NOT_PRESENT => VulkanError::ExtensionNotPresent,
            vk::Result::ERROR_INCOMPATIBLE_DRIVER => VulkanError::IncompatibleDriver,
            other => VulkanError::Other(other),
        }
    }
}

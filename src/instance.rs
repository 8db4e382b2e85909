use std::{cmp::Ordering, ffi, fmt, ptr, sync::Arc};

use ash::vk;

use crate::{AshDriver, Driver, Validated, ValidationError, VulkanError, is_validation_enabled};

pub struct Entry<D: Driver = AshDriver> {
    pub(crate) driver: Arc<D>,
}

impl Entry {
    pub fn linked() -> Self {
        Self::new(AshDriver::linked())
    }
}

impl<D: Driver> Entry<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver: Arc::new(driver),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: Driver> fmt::Debug for Entry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry").finish()
    }
}

/// A Vulkan version number, as packed into a `u32` by `VK_MAKE_API_VERSION`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const V1_0: Self = Self::new(1, 0, 0);
    pub const V1_1: Self = Self::new(1, 1, 0);
    pub const V1_2: Self = Self::new(1, 2, 0);
    pub const V1_3: Self = Self::new(1, 3, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub const fn from_vk_version(version: u32) -> Self {
        let major = (version >> 22) & 0x3FF;
        let minor = (version >> 12) & 0x3FF;
        let patch = version & 0xFFF;

        Self {
            major,
            minor,
            patch,
        }
    }

    pub const fn to_vk_version(self) -> u32 {
        vk::make_api_version(0, self.major, self.minor, self.patch)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major.cmp(&other.major))
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Clone, Debug)]
pub struct InstanceDescriptor<'a> {
    pub app_name: Option<&'a str>,
    pub app_version: Version,
    pub engine_name: Option<&'a str>,
    pub engine_version: Version,
    pub api_version: Version,
    pub enabled_layers: &'a [&'a str],
}

impl Default for InstanceDescriptor<'_> {
    fn default() -> Self {
        Self {
            app_name: None,
            app_version: Version::V1_0,
            engine_name: None,
            engine_version: Version::V1_0,
            api_version: Version::V1_0,
            enabled_layers: &[],
        }
    }
}

pub struct Instance<D: Driver = AshDriver> {
    pub(crate) inner: Arc<InstanceInner<D>>,
}

impl<D: Driver> Instance<D> {
    pub fn handle(&self) -> &D::Instance {
        &self.inner.handle
    }

    pub fn api_version(&self) -> Version {
        self.inner.api_version
    }

    pub fn app_name(&self) -> Option<&str> {
        self.inner.app_name.as_deref()
    }
}

impl<D: Driver> fmt::Debug for Instance<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("app_name", &self.inner.app_name)
            .field("api_version", &self.inner.api_version)
            .finish()
    }
}

pub(crate) struct InstanceInner<D: Driver> {
    pub(crate) handle: D::Instance,

    pub(crate) driver: Arc<D>,

    pub(crate) api_version: Version,
    pub(crate) app_name: Option<String>,
}

impl<D: Driver> Drop for InstanceInner<D> {
    fn drop(&mut self) {
        unsafe {
            tracing::trace!(
                app_name = ?self.app_name,
                "Destroying Vulkan instance",
            );

            self.driver.destroy_instance(&self.handle);
        }
    }
}

impl<D: Driver> Entry<D> {
    #[track_caller]
    pub fn create_instance(&self, desc: &InstanceDescriptor<'_>) -> Instance<D> {
        self.try_create_instance(desc)
            .expect("Failed to create Vulkan instance")
    }

    pub fn try_create_instance(
        &self,
        desc: &InstanceDescriptor<'_>,
    ) -> Result<Instance<D>, Validated<VulkanError>> {
        if is_validation_enabled() {
            validate_create_instance(desc)?;
        }

        unsafe { self.try_create_instance_unchecked(desc).map_err(From::from) }
    }

    /// # Safety
    /// - `app_name`, `engine_name` and every enabled layer name must not contain NUL bytes.
    pub unsafe fn try_create_instance_unchecked(
        &self,
        desc: &InstanceDescriptor<'_>,
    ) -> Result<Instance<D>, VulkanError> {
        tracing::debug!(
            app_name = ?desc.app_name,
            api_version = %desc.api_version,
            "Creating instance with API version",
        );

        let app_name = desc.app_name.map(ffi::CString::new).and_then(Result::ok);
        let engine_name = desc.engine_name.map(ffi::CString::new).and_then(Result::ok);

        let app_info = vk::ApplicationInfo {
            p_application_name: app_name.as_ref().map_or(ptr::null(), |s| s.as_ptr()),
            p_engine_name: engine_name.as_ref().map_or(ptr::null(), |s| s.as_ptr()),
            application_version: desc.app_version.to_vk_version(),
            engine_version: desc.engine_version.to_vk_version(),
            api_version: desc.api_version.to_vk_version(),
            ..Default::default()
        };

        let enabled_layers: Vec<_> = desc
            .enabled_layers
            .iter()
            .copied()
            .map(ffi::CString::new)
            .filter_map(Result::ok)
            .collect();

        let enabled_layers_ptrs: Vec<_> = enabled_layers.iter().map(|s| s.as_ptr()).collect();

        let create_info = vk::InstanceCreateInfo {
            flags: vk::InstanceCreateFlags::empty(),
            p_application_info: &app_info,
            enabled_layer_count: enabled_layers_ptrs.len() as u32,
            pp_enabled_layer_names: enabled_layers_ptrs.as_ptr(),
            enabled_extension_count: 0,
            pp_enabled_extension_names: ptr::null(),
            ..Default::default()
        };

        let handle = unsafe { self.driver.create_instance(&create_info)? };

        Ok(Instance {
            inner: Arc::new(InstanceInner {
                handle,

                driver: self.driver.clone(),

                api_version: desc.api_version,
                app_name: desc.app_name.map(str::to_owned),
            }),
        })
    }
}

fn validate_create_instance(desc: &InstanceDescriptor<'_>) -> Result<(), ValidationError> {
    if desc.app_name.is_some_and(|name| name.contains('\0')) {
        return Err(ValidationError {
            context: "desc.app_name".into(),
            problem: "Application name must not contain NUL bytes.".into(),
            vuids: &["VUID-VkApplicationInfo-pApplicationName-parameter"],
        });
    }

    if desc.engine_name.is_some_and(|name| name.contains('\0')) {
        return Err(ValidationError {
            context: "desc.engine_name".into(),
            problem: "Engine name must not contain NUL bytes.".into(),
            vuids: &["VUID-VkApplicationInfo-pEngineName-parameter"],
        });
    }

    if desc.enabled_layers.iter().any(|layer| layer.contains('\0')) {
        return Err(ValidationError {
            context: "desc.enabled_layers".into(),
            problem: "Layer names must not contain NUL bytes.".into(),
            vuids: &["VUID-VkInstanceCreateInfo-ppEnabledLayerNames-parameter"],
        });
    }

    Ok(())
}

//! The four tutorial programs as library functions.
//!
//! Every acquired object is a local of the inner function of each flow, so it
//! has been released, in reverse creation order, by the time the outer
//! function reports cleanup. A failed step writes its diagnostic to the same
//! output before anything is torn down.

use std::{io, process::ExitCode};

use thiserror::Error;

use crate::{
    Driver, Entry, Instance, InstanceDescriptor, QueueFamilySelection, Validated, Version,
    VulkanError, report,
};

#[derive(Debug, Error)]
pub enum TutorialError {
    #[error("Failed to create instance: {0}")]
    CreateInstance(Validated<VulkanError>),

    #[error("Failed to create physical devices list: {0}")]
    EnumeratePhysicalDevices(VulkanError),

    #[error("Failed to get the list of queue families: {0}")]
    QueueFamilies(VulkanError),

    #[error("Failed to select a queue family: {0}")]
    SelectQueueFamily(VulkanError),

    #[error("Failed to create device: {0}")]
    CreateDevice(Validated<VulkanError>),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[derive(Clone, Debug)]
pub struct TutorialConfig<'a> {
    pub app_name: &'a str,
    pub queue_family: QueueFamilySelection,
}

impl<'a> TutorialConfig<'a> {
    pub fn new(app_name: &'a str) -> Self {
        Self {
            app_name,
            queue_family: QueueFamilySelection::default(),
        }
    }

    pub fn instance_descriptor(&self) -> InstanceDescriptor<'a> {
        InstanceDescriptor {
            app_name: Some(self.app_name),
            engine_name: None,
            engine_version: Version::from_vk_version(1),
            api_version: Version::V1_0,
            ..Default::default()
        }
    }
}

/// `0` on success, `-1` (255) on failure.
pub fn exit_code<T, E>(result: &Result<T, E>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::from(u8::MAX),
    }
}

/// Turns the result of a flow into a process status. The flow has already
/// written its diagnostic.
pub fn finish(result: Result<(), TutorialError>) -> ExitCode {
    if let Err(err) = &result {
        tracing::error!(%err, "Tutorial failed");
    }

    exit_code(&result)
}

/// Writes the diagnostic for a failed step to `out` and passes the result on.
fn reported<T>(
    out: &mut impl io::Write,
    result: Result<T, TutorialError>,
) -> Result<T, TutorialError> {
    match &result {
        Err(TutorialError::Output(_)) | Ok(_) => {}
        Err(err) => {
            if let Err(write_err) = writeln!(out, "{}", err) {
                tracing::warn!(%write_err, %err, "Failed to write diagnostic");
            }
        }
    }

    result
}

fn create_instance<D: Driver>(
    entry: &Entry<D>,
    config: &TutorialConfig<'_>,
    out: &mut impl io::Write,
) -> Result<Instance<D>, TutorialError> {
    let result = entry
        .try_create_instance(&config.instance_descriptor())
        .map_err(TutorialError::CreateInstance);

    let instance = reported(out, result)?;
    tracing::debug!(app_name = ?instance.app_name(), "Tutorial instance ready");

    Ok(instance)
}

pub fn instance_creation<D: Driver>(
    entry: &Entry<D>,
    config: &TutorialConfig<'_>,
    out: &mut impl io::Write,
) -> Result<(), TutorialError> {
    let instance = create_instance(entry, config, out)?;

    writeln!(out, "Instance created successfully")?;

    drop(instance);

    writeln!(out, "Instance destroyed")?;

    Ok(())
}

pub fn physical_devices<D: Driver>(
    entry: &Entry<D>,
    config: &TutorialConfig<'_>,
    out: &mut impl io::Write,
) -> Result<(), TutorialError> {
    let instance = create_instance(entry, config, out)?;

    let devices = instance
        .try_enumerate_physical_devices()
        .map_err(TutorialError::EnumeratePhysicalDevices);
    let devices = reported(out, devices)?;

    writeln!(out, " {} physical device(s) found: ", devices.len())?;

    for device in &devices {
        writeln!(out, "{}", report::report_device_properties(device))?;
    }

    Ok(())
}

pub fn queue_families<D: Driver>(
    entry: &Entry<D>,
    config: &TutorialConfig<'_>,
    out: &mut impl io::Write,
) -> Result<(), TutorialError> {
    let instance = create_instance(entry, config, out)?;

    let result = print_queue_families(&instance, out);
    let result = reported(out, result);
    drop(instance);

    writeln!(out, " Cleanup done.")?;

    result
}

fn print_queue_families<D: Driver>(
    instance: &Instance<D>,
    out: &mut impl io::Write,
) -> Result<(), TutorialError> {
    let devices = instance
        .try_enumerate_physical_devices()
        .map_err(TutorialError::EnumeratePhysicalDevices)?;

    for device in &devices {
        let properties = device.properties();

        writeln!(
            out,
            " Device Name: {} (Type: {})",
            properties.device_name,
            properties.device_kind.code()
        )?;

        // a failed query only affects this device
        match report::report_queue_families(device) {
            Ok(families) => {
                writeln!(out, " Device Queue Family Count: {}", families.len())?;

                for family in families {
                    writeln!(out, "{}", family)?;
                }
            }
            Err(err) => {
                writeln!(out, " Device Queue Family Count: 0")?;
                writeln!(out, "\tError: Could not get the list of queue families: {}", err)?;
            }
        }
    }

    Ok(())
}

pub fn logical_device<D: Driver>(
    entry: &Entry<D>,
    config: &TutorialConfig<'_>,
    out: &mut impl io::Write,
) -> Result<(), TutorialError> {
    let instance = create_instance(entry, config, out)?;

    writeln!(out, " Instance created.")?;

    let result = create_logical_device(&instance, config, out);
    let result = reported(out, result);
    drop(instance);

    writeln!(out, " Cleanup done.")?;

    result
}

fn create_logical_device<D: Driver>(
    instance: &Instance<D>,
    config: &TutorialConfig<'_>,
    out: &mut impl io::Write,
) -> Result<(), TutorialError> {
    let devices = instance
        .try_enumerate_physical_devices()
        .map_err(TutorialError::EnumeratePhysicalDevices)?;

    writeln!(out, " List of queue families, obtained.")?;

    let physical = &devices[0];

    let families = physical
        .try_queue_families()
        .map_err(TutorialError::QueueFamilies)?;
    let family_index = config
        .queue_family
        .select(&families)
        .map_err(TutorialError::SelectQueueFamily)?;

    let device = physical
        .try_create_device_in(&families, family_index)
        .map_err(TutorialError::CreateDevice)?;

    writeln!(out, " Logical device created.")?;

    tracing::debug!(
        physical = ?device.physical().handle(),
        queue_families = ?device.queue_families(),
        "Releasing logical device",
    );

    Ok(())
}

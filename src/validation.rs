use std::borrow::Cow;

use ash::vk;
use thiserror::Error;

use crate::VulkanError;

/// Checks run before a call reaches the driver, unless the
/// `unsafe-disable-validation` feature is on.
pub(crate) fn is_validation_enabled() -> bool {
    !cfg!(feature = "unsafe-disable-validation")
}

/// A usage error caught before the call reached the driver.
#[derive(Clone, Debug, Default, Error, PartialEq, Eq)]
#[error("{context}: {problem} (VUIDs: {list})", list = .vuids.join(", "))]
pub struct ValidationError {
    /// Path of the offending descriptor field.
    pub context: Cow<'static, str>,
    pub problem: Cow<'static, str>,
    pub vuids: &'static [&'static str],
}

/// Either a driver failure or a rejected descriptor.
#[derive(Debug, Error)]
pub enum Validated<E> {
    #[error(transparent)]
    Error(E),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<vk::Result> for Validated<VulkanError> {
    fn from(result: vk::Result) -> Self {
        Validated::Error(result.into())
    }
}

impl From<VulkanError> for Validated<VulkanError> {
    fn from(err: VulkanError) -> Self {
        Validated::Error(err)
    }
}

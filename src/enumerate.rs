use ash::vk;

use crate::VulkanError;

/// Runs a count-then-fill query to completion.
///
/// `query` is first called without a buffer to learn the element count, then
/// again with a buffer of exactly that many elements. If the driver reports
/// [`vk::Result::INCOMPLETE`] because the count grew in between, the whole
/// sequence is repeated. A zero count returns an empty `Vec` without
/// allocating.
pub fn enumerate<T, F>(mut query: F) -> Result<Vec<T>, VulkanError>
where
    T: Default + Clone,
    F: FnMut(&mut u32, Option<&mut [T]>) -> vk::Result,
{
    loop {
        let mut count = 0;
        query(&mut count, None).result()?;

        if count == 0 {
            return Ok(Vec::new());
        }

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(count as usize)
            .map_err(|_| VulkanError::OutOfHostMemory)?;
        buffer.resize(count as usize, T::default());

        match query(&mut count, Some(&mut buffer)) {
            vk::Result::SUCCESS => {
                buffer.truncate(count as usize);
                return Ok(buffer);
            }
            vk::Result::INCOMPLETE => {
                tracing::debug!(
                    written = count,
                    "Element count changed between queries, querying again",
                );
            }
            err => return Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_matches_reported_count() {
        let available = [7u32, 8, 9];
        let mut capacities = Vec::new();

        let items = enumerate(|count: &mut u32, buffer: Option<&mut [u32]>| {
            capacities.push(buffer.as_ref().map(|b| b.len()));

            match buffer {
                None => *count = available.len() as u32,
                Some(buffer) => {
                    assert_eq!(*count as usize, buffer.len());
                    buffer.copy_from_slice(&available);
                }
            }

            vk::Result::SUCCESS
        })
        .unwrap();

        assert_eq!(items, available);
        assert_eq!(capacities, [None, Some(3)]);
    }

    #[test]
    fn zero_count_never_fills() {
        let mut calls = 0;

        let items = enumerate(|count: &mut u32, buffer: Option<&mut [u32]>| {
            calls += 1;
            assert!(buffer.is_none());
            *count = 0;
            vk::Result::SUCCESS
        })
        .unwrap();

        assert!(items.is_empty());
        assert_eq!(items.capacity(), 0);
        assert_eq!(calls, 1);
    }

    #[test]
    fn count_failure_propagates() {
        let result = enumerate(|_: &mut u32, _: Option<&mut [u32]>| {
            vk::Result::ERROR_INITIALIZATION_FAILED
        });

        assert_eq!(result, Err(VulkanError::InitializationFailed));
    }

    #[test]
    fn fill_failure_returns_no_partial_buffer() {
        let result = enumerate(|count: &mut u32, buffer: Option<&mut [u32]>| match buffer {
            None => {
                *count = 2;
                vk::Result::SUCCESS
            }
            Some(buffer) => {
                buffer[0] = 1;
                vk::Result::ERROR_OUT_OF_DEVICE_MEMORY
            }
        });

        assert_eq!(result, Err(VulkanError::OutOfDeviceMemory));
    }

    #[test]
    fn incomplete_queries_again() {
        // the second device appears between the count and fill calls
        let mut available = vec![1u32];
        let mut fills = 0;

        let items = enumerate(|count: &mut u32, buffer: Option<&mut [u32]>| match buffer {
            None => {
                *count = available.len() as u32;
                vk::Result::SUCCESS
            }
            Some(buffer) => {
                fills += 1;
                if fills == 1 {
                    available.push(2);
                }

                let written = buffer.len().min(available.len());
                buffer[..written].copy_from_slice(&available[..written]);
                *count = written as u32;

                if written < available.len() {
                    vk::Result::INCOMPLETE
                } else {
                    vk::Result::SUCCESS
                }
            }
        })
        .unwrap();

        assert_eq!(items, [1, 2]);
        assert_eq!(fills, 2);
    }

    #[test]
    fn shrinking_count_truncates() {
        let items = enumerate(|count: &mut u32, buffer: Option<&mut [u32]>| {
            match buffer {
                None => *count = 3,
                Some(buffer) => {
                    buffer[0] = 5;
                    *count = 1;
                }
            }

            vk::Result::SUCCESS
        })
        .unwrap();

        assert_eq!(items, [5]);
    }
}

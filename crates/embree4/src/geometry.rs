use std::mem::size_of;
use std::ptr::copy_nonoverlapping;

use embree4_sys::{
    RTCBufferType, RTCFormat, RTCGeometry, RTCGeometryType, rtcCommitGeometry, rtcNewGeometry, rtcReleaseGeometry,
    rtcSetGeometryIntersectFilterFunction, rtcSetGeometryOccludedFilterFunction, rtcSetNewGeometryBuffer,
};

use crate::scene::filter_trampoline;
use crate::{Device, EmbreeError};

/// A committed triangle mesh whose candidate hits go through the query's filter.
pub struct TriangleGeometry {
    pub(crate) handle: RTCGeometry,
}

impl TriangleGeometry {
    pub fn new(device: &Device, positions: &[[f32; 3]], indices: &[[u32; 3]]) -> Result<TriangleGeometry, EmbreeError> {
        let handle = unsafe { rtcNewGeometry(device.handle, RTCGeometryType::RTC_GEOMETRY_TYPE_TRIANGLE) };
        if handle.is_null() {
            return Err(EmbreeError::NullHandle("geometry"));
        }
        let geometry = TriangleGeometry { handle };

        unsafe {
            let vertex_buffer = rtcSetNewGeometryBuffer(
                handle,
                RTCBufferType::RTC_BUFFER_TYPE_VERTEX,
                0,
                RTCFormat::RTC_FORMAT_FLOAT3,
                size_of::<[f32; 3]>(),
                positions.len(),
            ) as *mut [f32; 3];
            let index_buffer = rtcSetNewGeometryBuffer(
                handle,
                RTCBufferType::RTC_BUFFER_TYPE_INDEX,
                0,
                RTCFormat::RTC_FORMAT_UINT3,
                size_of::<[u32; 3]>(),
                indices.len(),
            ) as *mut [u32; 3];
            if vertex_buffer.is_null() || index_buffer.is_null() {
                return Err(device.error().err().unwrap_or(EmbreeError::NullHandle("geometry buffer")));
            }

            // SAFETY: embree allocated the buffers with exactly these strides and counts
            copy_nonoverlapping(positions.as_ptr(), vertex_buffer, positions.len());
            copy_nonoverlapping(indices.as_ptr(), index_buffer, indices.len());

            rtcSetGeometryIntersectFilterFunction(handle, Some(filter_trampoline));
            rtcSetGeometryOccludedFilterFunction(handle, Some(filter_trampoline));
            rtcCommitGeometry(handle);
        }

        device.error()?;
        Ok(geometry)
    }
}

impl Drop for TriangleGeometry {
    fn drop(&mut self) {
        unsafe {
            rtcReleaseGeometry(self.handle);
        }
    }
}

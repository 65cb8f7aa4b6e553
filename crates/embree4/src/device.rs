use std::ffi::{CStr, c_char, c_void};
use std::ptr::{self, null_mut};

use embree4_sys::{RTCDevice, RTCError, rtcGetDeviceError, rtcNewDevice, rtcReleaseDevice, rtcSetDeviceErrorFunction};
use tracing::{debug, error};

use crate::error::{EmbreeError, error_from_code};

pub struct Device {
    pub(crate) handle: RTCDevice,
}

// SAFETY: Embree devices are internally synchronized
unsafe impl Send for Device {}
unsafe impl Sync for Device {}

impl Device {
    unsafe extern "C" fn log_errors(_user_ptr: *mut c_void, code: RTCError::Type, message: *const c_char) {
        let message = if message.is_null() {
            String::new()
        } else {
            // SAFETY: embree passes a nul terminated string that outlives the callback
            unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned()
        };
        error!(code = error_from_code(code), %message, "embree device error");
    }

    pub fn new() -> Result<Device, EmbreeError> {
        let handle = unsafe { rtcNewDevice(ptr::null()) };
        if handle.is_null() {
            let code = unsafe { rtcGetDeviceError(null_mut()) };
            return Err(EmbreeError::DeviceCreation(error_from_code(code)));
        }
        unsafe {
            rtcSetDeviceErrorFunction(handle, Some(Device::log_errors), null_mut());
        }
        Ok(Device { handle })
    }

    /// Takes the pending error of the device, if any.
    pub fn error(&self) -> Result<(), EmbreeError> {
        let code = unsafe { rtcGetDeviceError(self.handle) };
        match code {
            RTCError::RTC_ERROR_NONE => Ok(()),
            code => Err(EmbreeError::Device(error_from_code(code))),
        }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        debug!("releasing embree device");
        unsafe {
            rtcReleaseDevice(self.handle);
        }
    }
}

use embree4_sys::RTCError;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EmbreeError {
    #[error("embree device could not be created: {0}")]
    DeviceCreation(&'static str),
    #[error("embree returned a null {0} handle")]
    NullHandle(&'static str),
    #[error("embree error: {0}")]
    Device(&'static str),
}

pub(crate) fn error_from_code(error_code: RTCError::Type) -> &'static str {
    match error_code {
        RTCError::RTC_ERROR_NONE => "no error",
        RTCError::RTC_ERROR_INVALID_OPERATION => "invalid operation",
        RTCError::RTC_ERROR_CANCELLED => "operation canceled",
        RTCError::RTC_ERROR_INVALID_ARGUMENT => "invalid argument",
        RTCError::RTC_ERROR_OUT_OF_MEMORY => "out of memory",
        RTCError::RTC_ERROR_UNSUPPORTED_CPU => "unsupported cpu",
        _ => "unknown error",
    }
}

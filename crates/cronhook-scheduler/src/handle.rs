//! Byte-blob codec for the opaque timer handle.
//!
//! The durable record stores the handle as an opaque blob so the scheduler
//! logic stays independent of the timer primitive's internal layout. Codec
//! failures surface as [`SchedulerError::HandleCodec`], never a panic.

use crate::error::Result;
use crate::timer::TimerHandle;

pub fn encode_handle(handle: &TimerHandle) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(handle)?)
}

pub fn decode_handle(bytes: &[u8]) -> Result<TimerHandle> {
    Ok(serde_json::from_slice(bytes)?)
}

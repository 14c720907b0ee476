//! The boundary-framing protocol: token generation, the stream-splitting
//! codec, and the per-pipe capture driver.

pub mod boundary;
pub mod codec;
pub mod reader;

//! Size-bounded body accumulation.
//!
//! # Design Decisions
//! - The bound is checked on every chunk, before it is appended
//! - The stream is dropped as soon as it ends or fails; it is never polled
//!   after end-of-stream

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;

use crate::error::AdapterError;
use crate::http::request::BodyStream;

/// Appends body chunks in arrival order up to a fixed limit.
#[derive(Debug)]
pub struct BodyAccumulator {
    buf: BytesMut,
    limit: usize,
}

impl BodyAccumulator {
    pub fn new(limit: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            limit,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<(), AdapterError> {
        if self.buf.len() + chunk.len() > self.limit {
            return Err(AdapterError::BodyTooLarge { limit: self.limit });
        }
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Drain a body stream into a single buffer no larger than `limit`.
pub async fn read_body(mut stream: BodyStream, limit: usize) -> Result<Bytes, AdapterError> {
    let mut acc = BodyAccumulator::new(limit);
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(AdapterError::Body)?;
        acc.push(&chunk)?;
    }
    Ok(acc.finish())
}

use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use crate::upload::application::ports::outgoing::cloud_storage::ObjectContent;

/// Bodies up to this size stay in memory; larger ones move to a temp file.
pub const SPOOL_THRESHOLD_BYTES: usize = 5 * 1024 * 1024;

/// Accumulates a part body in memory, then in an anonymous temp file once it
/// outgrows `threshold`. Only one of the two holds data at any time.
pub struct ContentSpool {
    memory: BytesMut,
    file: Option<tokio::fs::File>,
    len: u64,
    threshold: usize,
}

impl ContentSpool {
    pub fn new(threshold: usize) -> Self {
        Self {
            memory: BytesMut::new(),
            file: None,
            len: 0,
            threshold,
        }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_spooled(&self) -> bool {
        self.file.is_some()
    }

    pub async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.write_all(chunk).await?;
        } else if self.memory.len() + chunk.len() <= self.threshold {
            self.memory.extend_from_slice(chunk);
        } else {
            let mut file = spill_file().await?;
            file.write_all(&self.memory).await?;
            file.write_all(chunk).await?;
            self.memory = BytesMut::new();
            self.file = Some(file);
        }

        self.len += chunk.len() as u64;
        Ok(())
    }

    /// Hands the content over, rewound to its first byte.
    pub async fn finish(self) -> io::Result<ObjectContent> {
        match self.file {
            None => Ok(ObjectContent::Memory(self.memory.freeze())),
            Some(mut file) => {
                file.flush().await?;
                file.rewind().await?;
                Ok(ObjectContent::Spooled {
                    file,
                    len: self.len,
                })
            }
        }
    }
}

async fn spill_file() -> io::Result<tokio::fs::File> {
    let file = tokio::task::spawn_blocking(tempfile::tempfile)
        .await
        .map_err(io::Error::other)??;
    tracing::debug!("upload body moved to a temporary file");
    Ok(tokio::fs::File::from_std(file))
}

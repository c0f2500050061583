//! Dummy buffer service for testing and development.
//!
//! This service doesn't touch a GPU. Chunks live in CPU memory with a
//! separate "device" copy that is only refreshed by an upload, so staleness
//! and upload counts behave like a real service and can be inspected.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::types::{BufferKind, ChunkDescriptor};

use super::{BackendError, BufferService, ChunkId, CommandContext};

/// A command recorded into a [`DummyCommandContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DummyCommand {
    /// Chunk contents were copied to the device.
    Upload {
        /// Uploaded chunk.
        chunk: ChunkId,
        /// Number of bytes copied.
        size: usize,
    },
    /// The buffer holding a chunk was bound.
    Bind {
        /// Bound chunk.
        chunk: ChunkId,
    },
}

/// Command context that records the commands issued by [`DummyBufferService`].
#[derive(Debug, Default)]
pub struct DummyCommandContext {
    commands: Vec<DummyCommand>,
}

impl DummyCommandContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded so far, in submission order.
    pub fn commands(&self) -> &[DummyCommand] {
        &self.commands
    }

    /// Drop all recorded commands.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl CommandContext for DummyCommandContext {
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[derive(Debug)]
struct DummyChunk {
    descriptor: ChunkDescriptor,
    start_index: usize,
    contents: Vec<u8>,
    device: Vec<u8>,
    stale: bool,
    prepared_frames: u64,
}

#[derive(Debug, Default)]
struct DummyState {
    next_id: u64,
    chunks: HashMap<ChunkId, DummyChunk>,
    // Records handed out so far per (kind, stride) buffer.
    buffer_records: HashMap<(BufferKind, usize), usize>,
    capacity: Option<usize>,
    used: usize,
    uploads: u64,
    binds: u64,
}

/// CPU-only [`BufferService`].
///
/// Chunks with the same kind and stride are packed into one virtual buffer,
/// so their start indices grow in allocation order.
#[derive(Debug, Default)]
pub struct DummyBufferService {
    state: Mutex<DummyState>,
}

impl DummyBufferService {
    /// Create a service with unbounded capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service that refuses chunks once `capacity` bytes are in use.
    pub fn with_capacity(capacity: usize) -> Self {
        let service = Self::new();
        service.set_capacity(Some(capacity));
        service
    }

    /// Change the capacity limit. `None` removes the limit.
    pub fn set_capacity(&self, capacity: Option<usize>) {
        self.state.lock().capacity = capacity;
    }

    /// Number of live chunks.
    pub fn chunk_count(&self) -> usize {
        self.state.lock().chunks.len()
    }

    /// Bytes held by live chunks.
    pub fn used_bytes(&self) -> usize {
        self.state.lock().used
    }

    /// Number of device uploads performed.
    pub fn upload_count(&self) -> u64 {
        self.state.lock().uploads
    }

    /// Number of binds performed.
    pub fn bind_count(&self) -> u64 {
        self.state.lock().binds
    }

    /// Descriptor the chunk was allocated with.
    pub fn chunk_descriptor(&self, chunk: ChunkId) -> Option<ChunkDescriptor> {
        self.state
            .lock()
            .chunks
            .get(&chunk)
            .map(|c| c.descriptor.clone())
    }

    /// Contents most recently uploaded to the "device".
    pub fn device_contents(&self, chunk: ChunkId) -> Option<Vec<u8>> {
        self.state.lock().chunks.get(&chunk).map(|c| c.device.clone())
    }

    /// Whether the chunk has contents that were not uploaded yet.
    pub fn is_stale(&self, chunk: ChunkId) -> Option<bool> {
        self.state.lock().chunks.get(&chunk).map(|c| c.stale)
    }

    /// Number of times the chunk was prepared for rendering.
    pub fn prepared_frames(&self, chunk: ChunkId) -> Option<u64> {
        self.state
            .lock()
            .chunks
            .get(&chunk)
            .map(|c| c.prepared_frames)
    }
}

fn record(context: &mut dyn CommandContext, command: DummyCommand) {
    if let Some(context) = context.as_any_mut().downcast_mut::<DummyCommandContext>() {
        context.commands.push(command);
    }
}

impl BufferService for DummyBufferService {
    fn name(&self) -> &'static str {
        "DummyBufferService"
    }

    fn allocate_chunk(
        &self,
        descriptor: &ChunkDescriptor,
        initial_data: &[u8],
    ) -> Result<ChunkId, BackendError> {
        let size = descriptor.size();
        if initial_data.len() != size {
            return Err(BackendError::InvalidParameter(format!(
                "initial data is {} bytes, chunk needs {size}",
                initial_data.len()
            )));
        }

        let mut state = self.state.lock();
        if let Some(capacity) = state.capacity {
            if state.used + size > capacity {
                log::trace!(
                    "DummyBufferService: refusing chunk {:?} ({} bytes, {} of {} in use)",
                    descriptor.label,
                    size,
                    state.used,
                    capacity
                );
                return Err(BackendError::OutOfMemory);
            }
        }

        let id = ChunkId::new(state.next_id);
        state.next_id += 1;

        let records = state
            .buffer_records
            .entry((descriptor.kind, descriptor.stride))
            .or_insert(0);
        let start_index = *records;
        *records += descriptor.vertex_count;

        state.used += size;
        state.chunks.insert(
            id,
            DummyChunk {
                descriptor: descriptor.clone(),
                start_index,
                contents: initial_data.to_vec(),
                device: Vec::new(),
                stale: true,
                prepared_frames: 0,
            },
        );

        log::trace!(
            "DummyBufferService: allocated chunk {} {:?} (stride: {}, records: {}, start: {})",
            id.raw(),
            descriptor.label,
            descriptor.stride,
            descriptor.vertex_count,
            start_index
        );
        Ok(id)
    }

    fn update_chunk_contents(&self, chunk: ChunkId, data: &[u8]) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        let entry = state
            .chunks
            .get_mut(&chunk)
            .ok_or(BackendError::UnknownChunk(chunk.raw()))?;
        if data.len() != entry.contents.len() {
            return Err(BackendError::InvalidParameter(format!(
                "update is {} bytes, chunk holds {}",
                data.len(),
                entry.contents.len()
            )));
        }
        entry.contents.copy_from_slice(data);
        entry.stale = true;
        Ok(())
    }

    fn upload_if_needed(
        &self,
        chunk: ChunkId,
        context: &mut dyn CommandContext,
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        let entry = state
            .chunks
            .get_mut(&chunk)
            .ok_or(BackendError::UnknownChunk(chunk.raw()))?;
        if !entry.stale {
            return Ok(());
        }

        entry.device.clone_from(&entry.contents);
        entry.stale = false;
        let size = entry.device.len();
        state.uploads += 1;

        log::trace!("DummyBufferService: uploaded chunk {} ({size} bytes)", chunk.raw());
        record(context, DummyCommand::Upload { chunk, size });
        Ok(())
    }

    fn bind(&self, chunk: ChunkId, context: &mut dyn CommandContext) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        if !state.chunks.contains_key(&chunk) {
            return Err(BackendError::UnknownChunk(chunk.raw()));
        }
        state.binds += 1;
        record(context, DummyCommand::Bind { chunk });
        Ok(())
    }

    fn prepare_for_rendering(&self, chunk: ChunkId) {
        if let Some(entry) = self.state.lock().chunks.get_mut(&chunk) {
            entry.prepared_frames += 1;
        }
    }

    fn chunk_start_index(&self, chunk: ChunkId) -> Option<usize> {
        self.state.lock().chunks.get(&chunk).map(|c| c.start_index)
    }

    fn release_chunk(&self, chunk: ChunkId) {
        let mut state = self.state.lock();
        if let Some(entry) = state.chunks.remove(&chunk) {
            state.used -= entry.descriptor.size();
        }
    }
}

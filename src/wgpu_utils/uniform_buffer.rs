// src/wgpu_utils/uniform_buffer.rs
//! Byte-level uniform and storage buffer wrapper
//!
//! The packing engine produces raw byte images of GPU blocks, so the
//! wrapper works on bytes rather than `bytemuck::Pod` structs. A write is
//! skipped when the content matches what the buffer already holds, which
//! keeps per-frame uploads cheap for static objects.

/// A uniform or storage buffer fed with pre-packed bytes.
pub struct RawBuffer {
    buffer: wgpu::Buffer,
    last_written: Vec<u8>,
}

impl RawBuffer {
    pub fn new_uniform(device: &wgpu::Device, size: u64, label: &str) -> Self {
        Self::with_usage(
            device,
            size,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            label,
        )
    }

    pub fn new_storage(device: &wgpu::Device, size: u64, label: &str) -> Self {
        Self::with_usage(
            device,
            size,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            label,
        )
    }

    fn with_usage(device: &wgpu::Device, size: u64, usage: wgpu::BufferUsages, label: &str) -> Self {
        RawBuffer {
            buffer: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage,
                mapped_at_creation: false,
            }),
            last_written: Vec::new(),
        }
    }

    /// Writes `content` unless it matches the previous write.
    ///
    /// `content` must not exceed the buffer size.
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: &[u8]) {
        if self.last_written == content {
            return;
        }
        queue.write_buffer(&self.buffer, 0, content);
        self.last_written.clear();
        self.last_written.extend_from_slice(content);
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}

use std::marker::PhantomData;
use std::thread::{self, ThreadId};

use super::GraphicsDevice;

/// Owns a graphics device and pins it to the thread that created it.
///
/// GL contexts are current on exactly one thread. `Gpu` is `!Send` and
/// `!Sync`, so shader programs and textures borrowing it cannot leave that
/// thread either. Device access additionally asserts the calling thread, which
/// catches hosts that smuggle the raw device out through `unsafe` code.
pub struct Gpu<D> {
    device: D,
    owner: ThreadId,

    /// Opts out of `Send`/`Sync`.
    _pinned: PhantomData<*const ()>,
}

impl<D: GraphicsDevice> Gpu<D> {
    /// Wraps `device`, recording the current thread as the context thread.
    pub fn new(device: D) -> Self {
        let owner = thread::current().id();
        log::debug!("graphics device pinned to thread {owner:?}");
        Self {
            device,
            owner,
            _pinned: PhantomData,
        }
    }

    /// Returns the device after checking the calling thread.
    ///
    /// # Panics
    ///
    /// Panics when called from any thread other than the one that created
    /// this `Gpu`.
    #[inline]
    pub fn device(&self) -> &D {
        self.assert_owner_thread();
        &self.device
    }

    /// Thread that owns the graphics context.
    pub fn owner_thread(&self) -> ThreadId {
        self.owner
    }

    /// Releases the device. Resources borrowing this `Gpu` must already be
    /// gone, which the borrow checker guarantees.
    pub fn into_inner(self) -> D {
        self.device
    }

    fn assert_owner_thread(&self) {
        let current = thread::current().id();
        assert_eq!(
            current, self.owner,
            "graphics device used off its context thread"
        );
    }
}

impl<D: std::fmt::Debug> std::fmt::Debug for Gpu<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gpu")
            .field("device", &self.device)
            .field("owner", &self.owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessDevice;

    #[test]
    fn records_creating_thread() {
        let gpu = Gpu::new(HeadlessDevice::new());
        assert_eq!(gpu.owner_thread(), thread::current().id());
    }

    #[test]
    fn device_access_on_owner_thread() {
        let gpu = Gpu::new(HeadlessDevice::new());
        assert_eq!(gpu.device().live_textures(), 0);
    }

    #[test]
    fn into_inner_returns_device() {
        let gpu = Gpu::new(HeadlessDevice::new());
        let device = gpu.into_inner();
        assert_eq!(device.live_programs(), 0);
    }
}

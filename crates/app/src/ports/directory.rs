//! Directory port — reading the cloud device/scene directory.

use std::future::Future;

use luxhub_domain::directory::DirectorySnapshot;
use luxhub_domain::error::LuxhubError;

/// Read side of the device-cloud collaborator.
pub trait DeviceDirectory {
    /// Fetch a fresh directory snapshot (all devices + all scenes).
    ///
    /// Implementations stamp `fetched_at` themselves.
    fn fetch_snapshot(&self) -> impl Future<Output = Result<DirectorySnapshot, LuxhubError>> + Send;
}

// One client instance is shared between the reconciler and the permission
// service; forwarding through `Arc` keeps the ports object-free.
impl<D: DeviceDirectory + Send + Sync> DeviceDirectory for std::sync::Arc<D> {
    fn fetch_snapshot(&self) -> impl Future<Output = Result<DirectorySnapshot, LuxhubError>> + Send {
        (**self).fetch_snapshot()
    }
}

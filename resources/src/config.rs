use std::default::Default;

/// Contains Config properties which will be used by the
/// [`ResourceManager`](crate::ResourceManager)
#[derive(Clone, Debug)]
pub struct ResourceConfig {
    /// File inside each resource directory describing the resource
    pub manifest_file_name: String,
    /// Handlers registered under this name receive every event
    pub wildcard_event_name: String,
    /// Emit `onResourceStarting`, `onResourceStart` and `onResourceStop`
    pub lifecycle_events: bool,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            manifest_file_name: "fxmanifest".to_string(),
            wildcard_event_name: "*".to_string(),
            lifecycle_events: true,
        }
    }
}

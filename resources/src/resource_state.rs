/// Lifecycle state of a [`Resource`](crate::Resource).
///
/// `Error` is entered only on a genuine parse or load failure and is left
/// only by parsing the resource again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResourceState {
    #[default]
    Stopped,
    Stopping,
    Starting,
    Running,
    Parsing,
    Error,
}

impl ResourceState {
    /// Whether an environment may exist in this state.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ResourceState::Starting | ResourceState::Running | ResourceState::Stopping
        )
    }
}

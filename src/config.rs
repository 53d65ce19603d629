/// Runtime configuration for the pause store task.
///
/// Use the builder methods to customize, or [`Default`] for sensible
/// defaults.
///
/// # Examples
///
/// ```rust
/// use fermata::Config;
///
/// let config = Config::default().with_channel_size(256);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Size of the store's event channel. Determines how many dispatched
    /// events can be queued before senders experience backpressure.
    /// Default: 128
    pub channel_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config { channel_size: 128 }
    }
}

impl Config {
    /// Set the event channel buffer size.
    ///
    /// Larger buffers absorb burstier dispatch patterns at the cost of
    /// memory; when the buffer is full, dispatchers await capacity.
    pub fn with_channel_size(mut self, size: usize) -> Self {
        self.channel_size = size;
        self
    }
}

/// Outbound progress collaborator owned by the caller.
///
/// `set_text` is best effort and serialized on the generating thread;
/// implementations must not call back into the generator. The `cancelled`
/// flag is polled at every stable iteration boundary; once it reads true the
/// run is abandoned and no partial output is delivered.
pub trait ProgressSink {
    fn set_text(&self, _text: &str) {}
    fn cancelled(&self) -> bool {
        false
    }
}

/// Sink that reports nothing and never cancels.
pub struct NullProgress;

impl ProgressSink for NullProgress {}

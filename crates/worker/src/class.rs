/// Execution classes used to label spawned work in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Work that directly drives what the user sees, such as the event poller.
	Interactive,
	/// Fire-and-forget host calls whose result nobody waits on.
	Background,
	/// Connection pumps reading and writing the host channel.
	Io,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
			Self::Io => "io",
		}
	}
}

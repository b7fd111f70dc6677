/// Control directive returned from per-frame callbacks.
///
/// Scenes return it from `advance_frame`; the runtime exits the event loop
/// when it sees `Exit`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

impl AppControl {
    pub fn is_exit(self) -> bool {
        self == AppControl::Exit
    }
}

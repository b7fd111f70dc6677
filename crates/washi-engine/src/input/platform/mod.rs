mod window_events;

pub(crate) use window_events::translate_window_event;

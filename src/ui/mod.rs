/// View helpers for the main window
///
/// Each function builds one panel from plain data owned by the caller, so
/// the coordinator is never borrowed past `view`.

pub mod detail;
pub mod log_view;
pub mod photo_list;

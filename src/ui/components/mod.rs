mod command_input;
mod confirm_dialog;
mod form_panel;
mod input;
mod key_result;
mod notification;
mod record_panel;
mod search_input;
mod status_picker;

pub use command_input::{CommandEvent, CommandInput};
pub use confirm_dialog::{ConfirmDialog, ConfirmEvent};
pub use form_panel::{FormEvent, FormPanel};
pub use key_result::KeyResult;
pub use notification::NotificationOverlay;
pub use record_panel::{PanelRow, RecordPanel, RecordPanelEvent};
pub use status_picker::{StatusPicker, StatusPickerEvent};

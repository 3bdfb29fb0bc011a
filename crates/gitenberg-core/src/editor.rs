use serde::Serialize;

use crate::remote::RemoteFileDescriptor;

/// Label of the leading "unlinked" entry in the file picker.
pub const UNLINKED_LABEL: &str = "None";

/// One entry of the editor's file picker dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// Data handed to the editor panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorData {
    pub repo: String,
    pub markdown_files: Vec<RemoteFileDescriptor>,
    pub options: Vec<SelectOption>,
}

/// Dropdown options: the unlinked sentinel (`value: ""`) followed by one entry per file.
pub fn file_picker_options(files: &[RemoteFileDescriptor]) -> Vec<SelectOption> {
    std::iter::once(SelectOption {
        label: UNLINKED_LABEL.to_string(),
        value: String::new(),
    })
    .chain(files.iter().map(|file| SelectOption {
        label: file.name.clone(),
        value: file.path.clone(),
    }))
    .collect()
}

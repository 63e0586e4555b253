//! Actions the field offers for its current value.

use serde::Serialize;

use crate::asset::UnifiedAsset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAction {
    AddExisting,
    AddNew,
    ImportExternal,
    ReplaceWithExternal,
    ReplaceWithNative,
    EditNative,
    ReloadNative,
    Remove,
}

impl FieldAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddExisting => "Add existing media",
            Self::AddNew => "Add new media",
            Self::ImportExternal => "Import from Brand Portal",
            Self::ReplaceWithExternal => "Replace with Bynder asset",
            Self::ReplaceWithNative => "Replace with CMS asset",
            Self::EditNative => "Edit CMS asset",
            Self::ReloadNative => "Reload CMS asset",
            Self::Remove => "Remove asset",
        }
    }
}

/// Actions available for a field holding `value`.
pub fn available_actions(value: Option<&UnifiedAsset>) -> Vec<FieldAction> {
    let Some(asset) = value else {
        return vec![
            FieldAction::AddExisting,
            FieldAction::AddNew,
            FieldAction::ImportExternal,
        ];
    };

    let mut actions = vec![FieldAction::ReplaceWithExternal, FieldAction::ReplaceWithNative];
    if asset.native_id().is_some() {
        actions.push(FieldAction::EditNative);
        actions.push(FieldAction::ReloadNative);
    }
    actions.push(FieldAction::Remove);
    actions
}

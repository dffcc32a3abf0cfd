//! Visibility policy for issue markers.

use bevy::prelude::*;

/// The two global mute toggles for the overlay
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueDisplaySettings {
    /// Hide every marker, dialog and highlight region, including the draft.
    /// This is a hard global switch that overrides every other flag.
    pub issues_hidden: bool,
    /// Hide markers of resolved issues only
    pub resolved_hidden: bool,
}

/// Decision table:
///
/// | issues_hidden | resolved_hidden | resolved | visible |
/// |---------------|-----------------|----------|---------|
/// | true          | any             | any      | false   |
/// | false         | true            | true     | false   |
/// | false         | true            | false    | true    |
/// | false         | false           | any      | true    |
pub fn marker_visible(settings: &IssueDisplaySettings, resolved: bool) -> bool {
    if settings.issues_hidden {
        return false;
    }
    if settings.resolved_hidden && resolved {
        return false;
    }
    true
}

use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow, SystemCursorIcon};
use bevy_egui::EguiContexts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewTool {
    #[default]
    Select,
    Issue,
}

impl ReviewTool {
    pub fn display_name(&self) -> &'static str {
        match self {
            ReviewTool::Select => "Select (V)",
            ReviewTool::Issue => "Issue (N)",
        }
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            ReviewTool::Select => CursorIcon::System(SystemCursorIcon::Default),
            ReviewTool::Issue => CursorIcon::System(SystemCursorIcon::Crosshair),
        }
    }

    pub fn all() -> &'static [ReviewTool] {
        &[ReviewTool::Select, ReviewTool::Issue]
    }
}

#[derive(Resource, Default)]
pub struct CurrentTool {
    pub tool: ReviewTool,
}

pub fn handle_tool_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut current_tool: ResMut<CurrentTool>,
    mut contexts: EguiContexts,
) {
    // Don't change tools if typing in a text field
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }

    if keyboard.just_pressed(KeyCode::KeyV) {
        current_tool.tool = ReviewTool::Select;
    } else if keyboard.just_pressed(KeyCode::KeyN) {
        current_tool.tool = ReviewTool::Issue;
    }
}

pub fn update_cursor_icon(
    current_tool: Res<CurrentTool>,
    window_query: Query<Entity, With<PrimaryWindow>>,
    mut commands: Commands,
    mut contexts: EguiContexts,
) {
    let Ok(entity) = window_query.single() else {
        return;
    };

    // Use default cursor over UI, tool cursor in canvas space
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.is_pointer_over_area()
    {
        commands
            .entity(entity)
            .insert(CursorIcon::System(SystemCursorIcon::Default));
        return;
    }

    commands.entity(entity).insert(current_tool.tool.cursor_icon());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_contain_shortcuts() {
        for tool in ReviewTool::all() {
            let name = tool.display_name();
            assert!(name.contains('('), "Display name should contain shortcut: {}", name);
            assert!(name.contains(')'), "Display name should contain shortcut: {}", name);
        }
    }

    #[test]
    fn test_default_tool_is_select() {
        assert_eq!(ReviewTool::default(), ReviewTool::Select);
        assert_eq!(CurrentTool::default().tool, ReviewTool::Select);
    }

    #[test]
    fn test_issue_tool_has_crosshair() {
        assert_eq!(
            ReviewTool::Issue.cursor_icon(),
            CursorIcon::System(SystemCursorIcon::Crosshair)
        );
    }
}

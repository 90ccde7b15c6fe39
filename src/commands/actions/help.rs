//! Help command handler.
//!
//! Displays the available commands with their syntax and the reactions
//! driving interactive messages.

use log::debug;

use crate::commands::{CommandResult, markdown_response::format_help};

/// Returns formatted help information about available commands.
pub fn handle_help() -> CommandResult {
    debug!("handling help command");

    CommandResult::text(format_help())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_help() {
        let result = handle_help();

        assert!(result.interactive.is_none());
        assert!(result.response.contains("Commands:"));
    }
}

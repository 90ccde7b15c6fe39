//! Guilds command handler.
//!
//! Shows the all-time guild XP leaderboard, 20 guilds per page. A leaderboard
//! longer than one page is answered with a paged message.

use log::{debug, error};

use crate::{
    commands::{
        CommandResult,
        markdown_response::{format_api_error, format_guild_page, format_no_guilds},
    },
    interactive::{Handler, InteractiveReply, PagedHandler},
    wynn::{Guild, Requester},
};

/// Guilds shown on a leaderboard page.
pub const GUILDS_PER_PAGE: usize = 20;

/// Fetches the guild leaderboard and renders its first page.
///
/// Guilds are sorted by XP, highest first.
pub async fn handle_guilds<R: Requester>(requester: &R) -> CommandResult {
    debug!("handling guilds command");

    let mut guilds: Vec<Guild> = match requester.get_guild_leaderboard().await {
        Ok(guilds) => guilds.into_iter().map(Guild::from).collect(),
        Err(e) => {
            error!("unable to fetch the guild leaderboard: {}", e);
            return CommandResult::text(format_api_error());
        }
    };

    if guilds.is_empty() {
        return CommandResult::text(format_no_guilds());
    }

    guilds.sort_by(|a, b| b.xp.cmp(&a.xp));
    debug!("{} guilds on the leaderboard", guilds.len());

    let max_page = (guilds.len() - 1) / GUILDS_PER_PAGE;
    if max_page == 0 {
        return CommandResult::text(format_guild_page(&guilds, 0, GUILDS_PER_PAGE));
    }

    let handler = PagedHandler::new(
        move |page| format_guild_page(&guilds, page, GUILDS_PER_PAGE),
        || max_page,
    );

    CommandResult {
        response: handler.content().to_string(),
        interactive: Some(InteractiveReply {
            handler: handler.into(),
            restrict_to_owner: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use mockito::Server;

    use super::*;
    use crate::interactive::InteractiveHandler;
    use crate::wynn::{GuildResponse, MockRequester, WynnRequester};

    fn guild(name: &str, xp: u64) -> GuildResponse {
        GuildResponse {
            name: name.to_string(),
            prefix: name[..3].to_string(),
            xp,
            level: 80,
            territories: 1,
        }
    }

    fn mock_leaderboard(count: usize) -> MockRequester {
        let mut mock_requester = MockRequester::new();
        mock_requester
            .expect_get_guild_leaderboard()
            .times(1)
            .returning(move || {
                Ok((0..count)
                    .map(|i| guild(&format!("Guild {:02}", i), 1_000 + i as u64))
                    .collect())
            });
        mock_requester
    }

    #[tokio::test]
    async fn test_handle_guilds_single_page_is_plain_text() {
        let mut mock_requester = MockRequester::new();
        mock_requester
            .expect_get_guild_leaderboard()
            .times(1)
            .returning(|| Ok(vec![guild("Low XP", 10), guild("High XP", 5_000)]));

        let result = handle_guilds(&mock_requester).await;

        assert!(result.interactive.is_none());
        let high = result.response.find("[Hig] High XP").unwrap();
        let low = result.response.find("[Low] Low XP").unwrap();
        assert!(high < low);
        assert!(result.response.contains("< page 1 / 1 >"));
    }

    #[tokio::test]
    async fn test_handle_guilds_exactly_one_page() {
        let result = handle_guilds(&mock_leaderboard(GUILDS_PER_PAGE)).await;

        assert!(result.interactive.is_none());
    }

    #[tokio::test]
    async fn test_handle_guilds_paged() {
        let result = handle_guilds(&mock_leaderboard(45)).await;

        let reply = result.interactive.unwrap();
        assert!(!reply.restrict_to_owner);
        match reply.handler {
            InteractiveHandler::Paged(handler) => {
                assert_eq!(handler.max_page(), 2);
                assert_eq!(handler.current_page(), 0);
                assert_eq!(handler.content(), result.response);
            }
            other => panic!("Expected a paged handler, got {:?}", other),
        }
        // Highest XP first
        assert!(result.response.contains("1.  [Gui] Guild 44"));
        assert!(result.response.contains("< page 1 / 3 >"));
    }

    #[tokio::test]
    async fn test_handle_guilds_empty_leaderboard() {
        let result = handle_guilds(&mock_leaderboard(0)).await;

        assert!(result.interactive.is_none());
        assert_eq!(result.response, format_no_guilds());
    }

    #[tokio::test]
    async fn test_handle_guilds_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;
        let requester = WynnRequester::new(&server.url());

        let result = handle_guilds(&requester).await;

        mock.assert_async().await;
        assert!(result.interactive.is_none());
        assert_eq!(result.response, format_api_error());
    }
}

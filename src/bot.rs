//! Bot module wiring Matrix, the commands and the interactive registry.
//!
//! # Overview
//!
//! The wynnbot answers `!wynn` commands in Matrix rooms. Some answers are
//! interactive: users drive them with reactions until they are dismissed or
//! expire.
//!
//! # Architecture
//!
//! The bot runs two concurrent tasks:
//!
//! 1. **Matrix Sync Task**: Listens for Matrix messages and reactions. Messages
//!    are parsed as commands and answered, reactions are dispatched to the
//!    interactive registry.
//!
//! 2. **Sweep Task**: Periodically tears down expired interactive messages.
//!
//! On `Ctrl-C`, or when the sync loop ends, every live interactive message is
//! torn down so that no marker is left behind.
//!
//! # Command Processing Flow
//!
//! ```text
//! Matrix Message → Parse Command → Execute → Reply or Registry::open
//! Matrix Reaction → ReactionEvent → Registry::dispatch
//! ```

use std::{sync::Arc, time::Duration};

use log::{error, info};

use crate::{
    commands::{CommandContext, CommandParseError, Commander},
    config::Config,
    interactive::{Messenger, ReactionEvent, Registry},
    matrix::{MatrixClient, UserCredentials},
    wynn::WynnRequester,
};

/// Everything needed to answer one message.
struct MessageContext {
    body: String,
    room_id: String,
    sender_id: String,
    event_id: String,
    matrix_client: Arc<MatrixClient>,
    commander: Arc<Commander<WynnRequester>>,
    registry: Arc<Registry>,
}

/// The running bot.
pub struct Bot {
    matrix_client: Arc<MatrixClient>,

    commander: Arc<Commander<WynnRequester>>,

    registry: Arc<Registry>,

    sweep_interval: Duration,
}

impl Bot {
    /// Logs in to Matrix and builds the command layer and the registry.
    ///
    /// # Arguments
    ///
    /// * `config` - Loaded configuration
    /// * `data_path` - Directory of the persisted Matrix session
    ///
    /// # Errors
    ///
    /// Returns an error if the Matrix client cannot be set up.
    pub async fn new(config: Config, data_path: &str) -> anyhow::Result<Self> {
        let matrix_client = Arc::new(
            MatrixClient::new(
                &UserCredentials {
                    user_id: config.matrix.user_id,
                    password: config.matrix.password,
                    passphrase: config.matrix.passphrase,
                },
                data_path,
            )
            .await?,
        );

        let messenger: Arc<dyn Messenger> = matrix_client.clone();
        let registry = Arc::new(Registry::new(messenger, config.interactive.timeout()));

        let commander = Arc::new(Commander::new(WynnRequester::new(&config.wynn.url)));

        Ok(Bot {
            matrix_client,
            commander,
            registry,
            sweep_interval: config.interactive.sweep_interval(),
        })
    }

    /// Runs the bot until the sync loop ends or `Ctrl-C` is received.
    pub async fn start(self) {
        info!(
            "sweeping expired interactive messages every {} seconds",
            self.sweep_interval.as_secs()
        );
        let sweep_task = self.registry.start_sweep_task(self.sweep_interval);

        let on_message = {
            let matrix_client = Arc::clone(&self.matrix_client);
            let commander = Arc::clone(&self.commander);
            let registry = Arc::clone(&self.registry);
            move |body: String, room_id: String, sender_id: String, event_id: String| {
                Self::handle_matrix_message(MessageContext {
                    body,
                    room_id,
                    sender_id,
                    event_id,
                    matrix_client: Arc::clone(&matrix_client),
                    commander: Arc::clone(&commander),
                    registry: Arc::clone(&registry),
                })
            }
        };

        let on_reaction = {
            let registry = Arc::clone(&self.registry);
            move |event: ReactionEvent| {
                tokio::spawn(registry.dispatch(event));
            }
        };

        tokio::select! {
            result = self.matrix_client.sync(on_message, on_reaction) => {
                if let Err(e) = result {
                    error!("matrix sync failed: {:?}", e);
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!("unable to listen for ctrl-c: {}", e);
                }
                info!("shutting down");
            }
        }

        sweep_task.abort();
        self.registry.shutdown().await;
        info!("bye");
    }

    fn handle_matrix_message(ctx: MessageContext) {
        tokio::spawn(async move {
            let command = match ctx.commander.parse(&ctx.body) {
                Ok(command) => command,
                Err(CommandParseError::NotForBot) => return,
                Err(CommandParseError::InvalidCommand(message)) => {
                    ctx.reply(&message).await;
                    return;
                }
            };

            info!("{} sent {:?} in {}", ctx.sender_id, command, ctx.room_id);

            let command_context = CommandContext {
                room_id: ctx.room_id.clone(),
                user_id: ctx.sender_id.clone(),
                registry: Arc::clone(&ctx.registry),
            };

            let command_result = ctx
                .commander
                .parse_command(&command, &command_context)
                .await;

            match command_result.interactive {
                Some(reply) => {
                    if let Err(e) = ctx.registry.open(&ctx.room_id, &ctx.sender_id, reply).await {
                        error!("failed to open interactive message in {}: {:?}", ctx.room_id, e);
                    }
                }
                None => ctx.reply(&command_result.response).await,
            }
        });
    }
}

impl MessageContext {
    async fn reply(&self, body: &str) {
        if let Err(e) = self
            .matrix_client
            .send_reply(&self.room_id, &self.sender_id, &self.event_id, body)
            .await
        {
            error!("failed to send reply in {}: {:?}", self.room_id, e);
        }
    }
}

//! Slack implementation of the chat client, over socket mode.

use crate::{
    base::{
        config::Config,
        types::{ChannelKind, HistoryMessage, InboundMessage, MessageBlock, MessageHandle, RenderedMessage, Res, Void},
    },
    interaction,
    service::answer::AnswerClient,
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{debug, info, instrument, warn};

use std::{ops::Deref, sync::Arc};

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config, answer: AnswerClient) -> Res<Self> {
        let client = SlackChatClient::new(config, answer).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<SlackChatClient> for ChatClient {
    fn from(client: SlackChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    chat: ChatClient,
    answer: AnswerClient,
    bot_user_id: String,
    history_limit: u16,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub app_token: SlackApiToken,
    pub bot_token: SlackApiToken,
    pub bot_user_id: String,
    pub client: Arc<FullClient>,
    pub answer: AnswerClient,
    pub history_limit: u16,
}

impl Deref for SlackChatClient {
    type Target = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config, answer: AnswerClient) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        Ok(Self {
            app_token,
            bot_token,
            bot_user_id,
            client,
            answer,
            history_limit: config.history_limit,
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    async fn start(&self) -> Void {
        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new()
            .with_command_events(handle_command_event)
            .with_interaction_events(handle_interaction_event)
            .with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState {
            chat: ChatClient::from(self.clone()),
            answer: self.answer.clone(),
            bot_user_id: self.bot_user_id.clone(),
            history_limit: self.history_limit,
        }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events,
        socket_mode_listener.listen_for(&self.app_token).await?;

        // Start WS connections calling Slack API to get WS url for the token,
        // and wait for Ctrl-C to shutdown.
        // There are also `.start()`/`.shutdown()` available to manage manually
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self, message))]
    async fn post_message(&self, channel_id: &str, message: &RenderedMessage) -> Res<MessageHandle> {
        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), to_slack_content(message));

        let session = self.client.open_session(&self.bot_token);

        let response = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to post message: {}", e))?;

        Ok(MessageHandle {
            channel_id: channel_id.to_string(),
            ts: response.ts.0,
        })
    }

    #[instrument(skip(self, message))]
    async fn update_message(&self, handle: &MessageHandle, message: &RenderedMessage) -> Void {
        let request = SlackApiChatUpdateRequest::new(
            SlackChannelId(handle.channel_id.clone()),
            to_slack_content(message),
            SlackTs(handle.ts.clone()),
        );

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_update(&request).await.map_err(|e| anyhow::anyhow!("Failed to update message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_history(&self, channel_id: &str, before_ts: &str, limit: u16) -> Res<Vec<HistoryMessage>> {
        let request = SlackApiConversationsHistoryRequest::new()
            .with_channel(SlackChannelId(channel_id.to_string()))
            .with_latest(SlackTs(before_ts.to_string()))
            .with_inclusive(false)
            .with_limit(limit);

        let session = self.client.open_session(&self.bot_token);

        let response = session
            .conversations_history(&request)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch history: {}", e))?;

        // Slack returns newest-first; the transcript formatter handles ordering.
        let messages = response
            .messages
            .into_iter()
            .map(|m| HistoryMessage {
                user_id: m.sender.user.map(|u| u.0),
                text: m.content.text.unwrap_or_default(),
                ts: m.origin.ts.0,
            })
            .collect();

        Ok(messages)
    }
}

/// Convert a rendered message into Slack message content with Block Kit blocks.
fn to_slack_content(message: &RenderedMessage) -> SlackMessageContent {
    let blocks: Vec<SlackBlock> = message
        .blocks
        .iter()
        .map(|block| match block {
            MessageBlock::Markdown(text) => {
                SlackBlock::Section(SlackSectionBlock::new().with_text(SlackBlockText::MarkDown(SlackBlockMarkDownText::new(text.clone()))))
            }
            MessageBlock::Divider => SlackBlock::Divider(SlackDividerBlock::new()),
        })
        .collect();

    SlackMessageContent::new().with_text(message.text.clone()).with_blocks(blocks)
}

// Socket mode listener callbacks for Slack.

/// Handles command events from Slack.
async fn handle_command_event(
    event: SlackCommandEvent,
    _client: Arc<SlackHyperClient>,
    _states: SlackClientEventsUserState,
) -> Result<SlackCommandEventResponse, Box<dyn std::error::Error + Send + Sync>> {
    warn!("[COMMAND] {:#?}", event);
    Ok(SlackCommandEventResponse::new(SlackMessageContent::new().with_text("No app commands are currently supported.".into())))
}

/// Handles interaction events from Slack.
async fn handle_interaction_event(event: SlackInteractionEvent, _client: Arc<SlackHyperClient>, _states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    warn!("[INTERACTION] {:#?}", event);
    Ok(())
}

/// Handles push events from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let event = event_callback.event;
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    match event {
        SlackEventCallbackBody::Message(slack_message_event) => {
            info!("Received message event ...");

            // Skip message edits / deletes / bot_message subtypes.
            if slack_message_event.subtype.is_some() {
                debug!("Skipping message event with a subtype.");
                return Ok(());
            }

            // Skip messages from other bots; they have no author to classify.
            if slack_message_event.sender.bot_id.is_some() {
                debug!("Skipping message event from a bot.");
                return Ok(());
            }

            let Some(inbound) = to_inbound_message(slack_message_event) else {
                debug!("Skipping message event without channel or author.");
                return Ok(());
            };

            interaction::direct_message::handle_direct_message(
                inbound,
                user_state.chat.clone(),
                user_state.answer.clone(),
                user_state.history_limit,
            );
        }
        _ => {
            warn!("Received unhandled push event.")
        }
    }

    Ok(())
}

/// Normalize a Slack message event into an [`InboundMessage`].
///
/// Returns `None` when the event has no channel or no author, which makes it
/// unanswerable.
fn to_inbound_message(event: SlackMessageEvent) -> Option<InboundMessage> {
    let channel_id = event.origin.channel.as_ref()?.0.clone();
    let user_id = event.sender.user.as_ref()?.0.clone();

    // Direct-message channels report channel_type "im"; fall back on the
    // channel id prefix when the field is absent.
    let is_direct = match &event.origin.channel_type {
        Some(channel_type) => channel_type.0 == "im",
        None => channel_id.starts_with('D'),
    };

    let channel_kind = if is_direct { ChannelKind::Direct } else { ChannelKind::Other };
    let text = event.content.and_then(|c| c.text).unwrap_or_default();

    Some(InboundMessage {
        channel_id,
        channel_kind,
        user_id,
        text,
        ts: event.origin.ts.0,
    })
}

// Tests.

#![cfg(test)]

use std::sync::Arc;

use answer_bot::{
    base::types::{
        AnswerResult, ChannelKind, HistoryMessage, InboundMessage, MessageBlock, MessageHandle, Res, RenderedMessage,
        SourceDocument, Void,
    },
    interaction::direct_message::{run_pipeline, PipelineOutcome, PipelineStage},
    service::{
        answer::{AnswerClient, GenericAnswerClient},
        chat::{ChatClient, GenericChatClient},
    },
};
use async_trait::async_trait;
use mockall::{mock, Sequence};

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        fn bot_user_id(&self) -> &str;
        async fn start(&self) -> Void;
        async fn post_message(&self, channel_id: &str, message: &RenderedMessage) -> Res<MessageHandle>;
        async fn update_message(&self, handle: &MessageHandle, message: &RenderedMessage) -> Void;
        async fn fetch_history(&self, channel_id: &str, before_ts: &str, limit: u16) -> Res<Vec<HistoryMessage>>;
    }
}

// Mock answer client for testing.

mock! {
    pub Answer {}

    #[async_trait]
    impl GenericAnswerClient for Answer {
        async fn answer(&self, question: &str, transcript: &[String]) -> Res<AnswerResult>;
    }
}

// Helpers.

fn direct_message(text: &str) -> InboundMessage {
    InboundMessage {
        channel_id: "D123".to_string(),
        channel_kind: ChannelKind::Direct,
        user_id: "U1".to_string(),
        text: text.to_string(),
        ts: "1700000000.000100".to_string(),
    }
}

fn handle_for(channel_id: &str) -> MessageHandle {
    MessageHandle {
        channel_id: channel_id.to_string(),
        ts: "1700000000.000200".to_string(),
    }
}

fn markdown_texts(message: &RenderedMessage) -> Vec<&str> {
    message
        .blocks
        .iter()
        .filter_map(|b| match b {
            MessageBlock::Markdown(text) => Some(text.as_str()),
            MessageBlock::Divider => None,
        })
        .collect()
}

// Scenario A: empty history, no sources; the final message still carries the
// sources header with zero source entries.
#[tokio::test]
async fn answers_direct_message_with_empty_history_and_no_sources() {
    let mut chat = MockChat::new();
    let mut answer = MockAnswer::new();
    let mut seq = Sequence::new();

    chat.expect_bot_user_id().return_const("UBOT".to_string());

    chat.expect_post_message()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|channel_id, message| channel_id == "D123" && message.text == "Thinking...")
        .returning(|channel_id, _| Ok(handle_for(channel_id)));

    chat.expect_fetch_history()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|channel_id, before_ts, limit| channel_id == "D123" && before_ts == "1700000000.000100" && *limit == 6)
        .returning(|_, _, _| Ok(vec![]));

    answer
        .expect_answer()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|question, transcript| question == "What is X?" && transcript.is_empty())
        .returning(|_, _| {
            Ok(AnswerResult {
                text: "X is...".to_string(),
                source_documents: vec![],
            })
        });

    chat.expect_update_message()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|handle, message| {
            handle == &handle_for("D123")
                && message.text == "X is..."
                && markdown_texts(message) == vec!["X is...", "*Top Source Documents:*"]
        })
        .returning(|_, _| Ok(()));

    let chat = ChatClient::new(Arc::new(chat));
    let answer = AnswerClient::new(Arc::new(answer));

    let outcome = run_pipeline(&direct_message("What is X?"), &chat, &answer, 6).await.unwrap();

    assert_eq!(outcome, PipelineOutcome::Completed(handle_for("D123")));
}

// Scenario B: duplicate titles are dropped, numbering reflects post-dedup
// order, and the duplicate's url never appears.
#[tokio::test]
async fn deduplicates_sources_in_final_message() {
    let mut chat = MockChat::new();
    let mut answer = MockAnswer::new();

    chat.expect_bot_user_id().return_const("UBOT".to_string());
    chat.expect_post_message().returning(|channel_id, _| Ok(handle_for(channel_id)));
    chat.expect_fetch_history().returning(|_, _, _| Ok(vec![]));

    answer.expect_answer().returning(|_, _| {
        Ok(AnswerResult {
            text: "Answer.".to_string(),
            source_documents: vec![
                SourceDocument::new("Doc A", "u1"),
                SourceDocument::new("Doc A", "u2"),
                SourceDocument::new("Doc B", "u3"),
            ],
        })
    });

    chat.expect_update_message()
        .times(1)
        .withf(|_, message| {
            markdown_texts(message)
                == vec![
                    "Answer.",
                    "*Top Source Documents:*",
                    "*<u1|Source 1: Doc A>*",
                    "*<u3|Source 2: Doc B>*",
                ]
        })
        .returning(|_, _| Ok(()));

    let chat = ChatClient::new(Arc::new(chat));
    let answer = AnswerClient::new(Arc::new(answer));

    let outcome = run_pipeline(&direct_message("Question"), &chat, &answer, 6).await.unwrap();

    assert!(matches!(outcome, PipelineOutcome::Completed(_)));
}

// Scenario C: a non-direct channel triggers zero collaborator calls.
#[tokio::test]
async fn ignores_channel_messages_without_collaborator_calls() {
    let mut chat = MockChat::new();
    let mut answer = MockAnswer::new();

    chat.expect_bot_user_id().return_const("UBOT".to_string());
    chat.expect_post_message().times(0);
    chat.expect_fetch_history().times(0);
    chat.expect_update_message().times(0);
    answer.expect_answer().times(0);

    let mut event = direct_message("What is X?");
    event.channel_kind = ChannelKind::Other;
    event.channel_id = "C456".to_string();

    let chat = ChatClient::new(Arc::new(chat));
    let answer = AnswerClient::new(Arc::new(answer));

    let outcome = run_pipeline(&event, &chat, &answer, 6).await.unwrap();

    assert_eq!(outcome, PipelineOutcome::Filtered);
}

#[tokio::test]
async fn ignores_empty_text_without_collaborator_calls() {
    let mut chat = MockChat::new();
    let mut answer = MockAnswer::new();

    chat.expect_bot_user_id().return_const("UBOT".to_string());
    chat.expect_post_message().times(0);
    chat.expect_fetch_history().times(0);
    chat.expect_update_message().times(0);
    answer.expect_answer().times(0);

    let chat = ChatClient::new(Arc::new(chat));
    let answer = AnswerClient::new(Arc::new(answer));

    let outcome = run_pipeline(&direct_message(""), &chat, &answer, 6).await.unwrap();

    assert_eq!(outcome, PipelineOutcome::Filtered);
}

// The transcript passed to the answer service is oldest-first and
// role-labeled relative to the asking user.
#[tokio::test]
async fn passes_role_labeled_transcript_to_answer_service() {
    let mut chat = MockChat::new();
    let mut answer = MockAnswer::new();

    chat.expect_bot_user_id().return_const("UBOT".to_string());
    chat.expect_post_message().returning(|channel_id, _| Ok(handle_for(channel_id)));

    // Newest-first, as Slack delivers it.
    chat.expect_fetch_history().returning(|_, _, _| {
        Ok(vec![
            HistoryMessage {
                user_id: None,
                text: "Earlier answer".to_string(),
                ts: "2.0".to_string(),
            },
            HistoryMessage {
                user_id: Some("U1".to_string()),
                text: "Earlier question".to_string(),
                ts: "1.0".to_string(),
            },
        ])
    });

    answer
        .expect_answer()
        .times(1)
        .withf(|_, transcript| transcript == ["USER MESSAGE:Earlier question", "SYSTEM RESPONSE:Earlier answer"])
        .returning(|_, _| {
            Ok(AnswerResult {
                text: "ok".to_string(),
                source_documents: vec![],
            })
        });

    chat.expect_update_message().returning(|_, _| Ok(()));

    let chat = ChatClient::new(Arc::new(chat));
    let answer = AnswerClient::new(Arc::new(answer));

    run_pipeline(&direct_message("Follow-up"), &chat, &answer, 6).await.unwrap();
}

// A collaborator failure after the placeholder post leaves the placeholder
// as-is: no update call is made and the error names the failing stage.
#[tokio::test]
async fn history_failure_leaves_placeholder_untouched() {
    let mut chat = MockChat::new();
    let mut answer = MockAnswer::new();

    chat.expect_bot_user_id().return_const("UBOT".to_string());
    chat.expect_post_message().times(1).returning(|channel_id, _| Ok(handle_for(channel_id)));
    chat.expect_fetch_history().times(1).returning(|_, _, _| Err(anyhow::anyhow!("history unavailable")));
    chat.expect_update_message().times(0);
    answer.expect_answer().times(0);

    let chat = ChatClient::new(Arc::new(chat));
    let answer = AnswerClient::new(Arc::new(answer));

    let err = run_pipeline(&direct_message("What is X?"), &chat, &answer, 6).await.unwrap_err();

    assert_eq!(err.stage, PipelineStage::FetchingHistory);
}

#[tokio::test]
async fn answer_failure_leaves_placeholder_untouched() {
    let mut chat = MockChat::new();
    let mut answer = MockAnswer::new();

    chat.expect_bot_user_id().return_const("UBOT".to_string());
    chat.expect_post_message().times(1).returning(|channel_id, _| Ok(handle_for(channel_id)));
    chat.expect_fetch_history().returning(|_, _, _| Ok(vec![]));
    chat.expect_update_message().times(0);
    answer.expect_answer().times(1).returning(|_, _| Err(anyhow::anyhow!("service down")));

    let chat = ChatClient::new(Arc::new(chat));
    let answer = AnswerClient::new(Arc::new(answer));

    let err = run_pipeline(&direct_message("What is X?"), &chat, &answer, 6).await.unwrap_err();

    assert_eq!(err.stage, PipelineStage::QueryingAnswerService);
}

// Concurrent runs are independent: each run edits the placeholder it posted.
#[tokio::test]
async fn concurrent_runs_use_their_own_handles() {
    fn make_clients(channel_id: &'static str, ts: &'static str) -> (ChatClient, AnswerClient) {
        let mut chat = MockChat::new();
        let mut answer = MockAnswer::new();

        chat.expect_bot_user_id().return_const("UBOT".to_string());
        chat.expect_post_message().times(1).returning(move |channel_id, _| {
            Ok(MessageHandle {
                channel_id: channel_id.to_string(),
                ts: ts.to_string(),
            })
        });
        chat.expect_fetch_history().returning(|_, _, _| Ok(vec![]));
        answer.expect_answer().returning(|_, _| {
            Ok(AnswerResult {
                text: "done".to_string(),
                source_documents: vec![],
            })
        });
        chat.expect_update_message()
            .times(1)
            .withf(move |handle, _| handle.channel_id == channel_id && handle.ts == ts)
            .returning(|_, _| Ok(()));

        (ChatClient::new(Arc::new(chat)), AnswerClient::new(Arc::new(answer)))
    }

    let (chat_a, answer_a) = make_clients("D111", "1.0");
    let (chat_b, answer_b) = make_clients("D222", "2.0");

    let mut event_a = direct_message("first");
    event_a.channel_id = "D111".to_string();
    let mut event_b = direct_message("second");
    event_b.channel_id = "D222".to_string();

    let (a, b) = tokio::join!(
        run_pipeline(&event_a, &chat_a, &answer_a, 6),
        run_pipeline(&event_b, &chat_b, &answer_b, 6),
    );

    let a = a.unwrap();
    let b = b.unwrap();

    assert!(matches!(a, PipelineOutcome::Completed(ref h) if h.channel_id == "D111"));
    assert!(matches!(b, PipelineOutcome::Completed(ref h) if h.channel_id == "D222"));
}

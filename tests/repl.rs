mod common;

use common::{ assistant_with, ok, reply_body, ScriptedTransport };
use flow_assistant::repl::run_chat;
use std::sync::Arc;

#[tokio::test]
async fn prompt_gets_answer_before_exit() {
    let transport = Arc::new(ScriptedTransport::new(vec![ok(200, &reply_body("Hello!"))]));
    let mut assistant = assistant_with(transport.clone());
    let mut output = Vec::new();

    run_chat(&mut assistant, &b"Hi\n"[..], &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("assistant: Hello!"), "output was: {}", text);
    assert_eq!(assistant.conversation().len(), 2);
    assert_eq!(transport.payloads().len(), 1);
}

#[tokio::test]
async fn failure_is_shown_and_history_rolled_back() {
    let transport = Arc::new(ScriptedTransport::new(vec![ok(503, "")]));
    let mut assistant = assistant_with(transport);
    let mut output = Vec::new();

    run_chat(&mut assistant, &b"Hi\n"[..], &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("error: Status 503"), "output was: {}", text);
    assert!(assistant.conversation().is_empty());
    assert!(!assistant.is_busy());
}

#[tokio::test]
async fn commands_and_blank_lines_never_reach_backend() {
    let transport = Arc::new(ScriptedTransport::new(vec![]));
    let mut assistant = assistant_with(transport.clone());
    let mut output = Vec::new();

    run_chat(&mut assistant, &b"\n   \n/help\n/reset\n/history\n/quit\nnever sent\n"[..], &mut output)
        .await
        .unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("(new conversation)"));
    assert!(transport.payloads().is_empty());
    assert!(assistant.conversation().is_empty());
}

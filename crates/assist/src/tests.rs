use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use quill_rpc::DataRequest;
use quill_rpc::mock::MockHost;
use quill_service::{ScriptingService, ServiceOptions};
use serde_json::json;

use super::*;

const READY: &str = r#"{"enabled":true,"installed":true,"loggedIn":true,"hubId":"hub"}"#;

async fn service(host: &Arc<MockHost>) -> Arc<ScriptingService> {
	let options = ServiceOptions {
		start_event_poller: false,
		..ServiceOptions::default()
	};
	Arc::new(ScriptingService::connect(host.clone(), options).await.unwrap())
}

async fn assist_with_status(status: serde_json::Value) -> (Arc<MockHost>, Arc<ScriptingService>, AiAssist) {
	let host = MockHost::new(json!({ "script": "" }));
	host.reply("ScriptingService.getAiCodeAssistantStatus", Ok(status));
	let service = service(&host).await;
	let assist = AiAssist::init(service.clone()).await;
	(host, service, assist)
}

fn suggestion(code: &str) -> serde_json::Value {
	json!({ "status": "SUCCESS", "code": json!({ "code": code }).to_string() })
}

#[tokio::test]
async fn init_merges_status() {
	let (host, service, assist) = assist_with_status(serde_json::from_str(READY).unwrap()).await;

	assert!(service.has_event_handler(HUB_LOGIN_EVENT));
	assert_eq!(
		assist.status(),
		AiCodeAssistantStatus {
			enabled: true,
			installed: true,
			logged_in: true,
			hub_id: Some("hub".into()),
		}
	);
	assert_eq!(assist.affordance(false), Affordance::Ready);
	assert_eq!(host.calls_to("ScriptingService.getAiCodeAssistantStatus").len(), 1);
}

#[tokio::test]
async fn partial_status_means_download() {
	let (host, _service, assist) = assist_with_status(json!({ "installed": false })).await;

	assert_eq!(assist.status(), AiCodeAssistantStatus::default());
	assert_eq!(assist.affordance(false), Affordance::Download);
	assert_eq!(host.calls().len(), 1, "no further calls after the status fetch");
}

#[tokio::test]
async fn failed_status_keeps_defaults() {
	let host = MockHost::new(json!({ "script": "" }));
	host.reply(
		"ScriptingService.getAiCodeAssistantStatus",
		Err(quill_rpc::Error::Disconnected),
	);
	let assist = AiAssist::init(service(&host).await).await;
	assert_eq!(assist.status(), AiCodeAssistantStatus::default());
}

#[test]
fn affordance_precedence() {
	let mut status = AiCodeAssistantStatus {
		installed: true,
		..AiCodeAssistantStatus::default()
	};
	assert_eq!(status.affordance(true), Affordance::Login);
	status.logged_in = true;
	assert_eq!(status.affordance(true), Affordance::ReadOnly);
	assert_eq!(status.affordance(false), Affordance::Ready);
	status.installed = false;
	assert_eq!(status.affordance(true), Affordance::Download);
}

#[test]
fn merge_skips_unknown_and_mistyped_fields() {
	let mut status = AiCodeAssistantStatus {
		hub_id: Some("old".into()),
		..AiCodeAssistantStatus::default()
	};
	status.merge(&json!({ "enabled": "yes", "installed": true, "extra": 1, "hubId": null }));
	assert_eq!(
		status,
		AiCodeAssistantStatus {
			installed: true,
			..AiCodeAssistantStatus::default()
		}
	);
}

#[tokio::test(start_paused = true)]
async fn hub_login_event_only_logs_in() {
	let (host, service, assist) = assist_with_status(json!({ "installed": true })).await;
	assert_eq!(assist.affordance(false), Affordance::Login);

	host.push_event(json!({ "type": HUB_LOGIN_EVENT, "data": false }));
	host.push_event(json!({ "type": HUB_LOGIN_EVENT, "data": true }));
	service.start_event_poller();
	host.wait_for_polls(3).await;
	service.stop_event_poller();

	assert!(assist.status().logged_in);
	assert_eq!(assist.affordance(false), Affordance::Ready);
}

#[tokio::test]
async fn refresh_can_log_out() {
	let (host, _service, assist) = assist_with_status(serde_json::from_str(READY).unwrap()).await;
	host.reply("ScriptingService.getAiCodeAssistantStatus", Ok(json!({ "loggedIn": false })));

	assist.refresh_status().await.unwrap();
	assert!(!assist.status().logged_in);
}

#[tokio::test]
async fn login_sends_request() {
	let (host, _service, assist) = assist_with_status(json!({})).await;
	assist.login_to_hub().await.unwrap();
	assert_eq!(host.calls_to("ScriptingService.loginToHub"), vec![DataRequest::new("ScriptingService.loginToHub")]);
}

#[tokio::test]
async fn successful_suggestion_fills_the_slot() {
	let (host, _service, assist) = assist_with_status(serde_json::from_str(READY).unwrap()).await;
	host.reply("ScriptingService.suggestCode", Ok(suggestion("import happy.hacking")));

	let outcome = assist.suggest_code("Do something!", "").await;
	let expected = PromptResponse {
		message: Message {
			role: Role::Request,
			content: "Do something!".into(),
		},
		suggested_code: "import happy.hacking".into(),
	};
	assert_eq!(outcome, SuggestionOutcome::Success(expected.clone()));
	assert_eq!(assist.prompt_response(), Some(expected));
	assert_eq!(
		host.calls_to("ScriptingService.suggestCode"),
		vec![DataRequest::with_options(
			"ScriptingService.suggestCode",
			vec![json!("Do something!"), json!("")]
		)]
	);
	assert!(!assist.is_waiting());

	assist.clear_prompt_response();
	assert_eq!(assist.prompt_response(), None);
}

#[tokio::test]
async fn error_status_is_an_outcome() {
	let (host, _service, assist) = assist_with_status(json!({})).await;
	host.reply(
		"ScriptingService.suggestCode",
		Ok(json!({ "status": "ERROR", "code": "", "error": "quota exceeded" })),
	);

	assert_eq!(
		assist.suggest_code("x", "y").await,
		SuggestionOutcome::Error("quota exceeded".into())
	);
	assert_eq!(assist.prompt_response(), None);
}

#[tokio::test]
async fn transport_failure_is_an_outcome() {
	let (host, _service, assist) = assist_with_status(json!({})).await;
	host.reply("ScriptingService.suggestCode", Err(quill_rpc::Error::Disconnected));

	assert!(matches!(assist.suggest_code("x", "y").await, SuggestionOutcome::Error(_)));
	assert!(!assist.is_waiting());
}

#[tokio::test]
async fn malformed_code_payload_is_an_outcome() {
	let (host, _service, assist) = assist_with_status(json!({})).await;
	host.reply(
		"ScriptingService.suggestCode",
		Ok(json!({ "status": "SUCCESS", "code": "not json" })),
	);

	assert!(matches!(assist.suggest_code("x", "y").await, SuggestionOutcome::Error(_)));
}

#[tokio::test]
async fn aborted_response_is_discarded() {
	let (host, _service, assist) = assist_with_status(json!({})).await;
	let assist = Arc::new(assist);
	let release = host.defer_reply("ScriptingService.suggestCode");

	let pending = tokio::spawn({
		let assist = assist.clone();
		async move { assist.suggest_code("x", "y").await }
	});
	while !assist.is_waiting() {
		tokio::task::yield_now().await;
	}

	assist.dismiss();
	assert!(!assist.is_waiting());
	release.send(Ok(suggestion("late"))).unwrap();

	assert_eq!(pending.await.unwrap(), SuggestionOutcome::Stale);
	assert_eq!(assist.prompt_response(), None);
	while host.calls_to("ScriptingService.abortSuggestCodeRequest").is_empty() {
		tokio::time::sleep(Duration::from_millis(1)).await;
	}
}

#[tokio::test]
async fn abort_without_request_sends_nothing() {
	let (host, _service, assist) = assist_with_status(json!({})).await;
	assert!(!assist.abort_request());
	assist.dismiss();
	tokio::task::yield_now().await;
	assert!(host.calls_to("ScriptingService.abortSuggestCodeRequest").is_empty());
}

#[tokio::test]
async fn reset_restores_initial_state() {
	let (host, _service, assist) = assist_with_status(serde_json::from_str(READY).unwrap()).await;
	host.reply("ScriptingService.suggestCode", Ok(suggestion("code")));
	assist.suggest_code("x", "").await;
	assist.acknowledge_disclaimer();
	assert!(!assist.show_disclaimer());

	assist.reset();
	assert_eq!(assist.status(), AiCodeAssistantStatus::default());
	assert_eq!(assist.prompt_response(), None);
	assert!(assist.show_disclaimer());
}

/// Session lifecycle tests: login, signup, logout, and startup restore.
///
/// Runs the full client against a scripted service and an in-memory
/// store; see `common/mod.rs`.
mod common;

use std::sync::Arc;

use common::{ScriptedApi, client, entry, login_ok, stats, unauthorized};
use phishguard::ClientError;
use phishguard::api::ApiError;
use phishguard::models::UrlAnalysis;
use phishguard::session::SessionState;
use phishguard::store::theme::Theme;
use phishguard::store::{LocalStore, MemoryStore, THEME_KEY, TOKEN_KEY, USERNAME_KEY};
use phishguard::sync::SyncOutcome;

fn stored_session() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_entries(&[
        (TOKEN_KEY, "T1"),
        (USERNAME_KEY, "alice"),
    ]))
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[test]
fn login_persists_session_and_loads_resources() {
    let api = ScriptedApi::new();
    let store = Arc::new(MemoryStore::new());
    api.on_login(login_ok("T1", "alice"));
    api.on_history(Ok(vec![entry("hola", "Segura")]));
    api.on_stats(Ok(stats(1)));

    let client = client(&api, &store);
    let session = client.login("alice", "pw").unwrap();

    assert_eq!(session.token, "T1");
    assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("T1"));
    assert_eq!(store.get(USERNAME_KEY).as_deref(), Some("alice"));
    assert!(client.session_state().is_verified());

    let snapshot = client.snapshot();
    assert_eq!(snapshot.history.len(), 1);
    assert_eq!(snapshot.stats.total, 1);

    let ui = client.ui_state();
    assert_eq!(ui.auth_control, "Logout");
    assert_eq!(ui.username, "alice");

    assert!(api.calls().contains(&"history T1".to_string()));
    assert!(api.calls().contains(&"stats T1".to_string()));
}

#[test]
fn login_trims_username() {
    let api = ScriptedApi::new();
    let store = Arc::new(MemoryStore::new());
    api.on_login(login_ok("T1", "alice"));

    client(&api, &store).login("  alice ", "pw").unwrap();
    assert_eq!(api.calls()[0], "login alice");
}

#[test]
fn rejected_login_keeps_logged_out() {
    let api = ScriptedApi::new();
    let store = Arc::new(MemoryStore::new());
    api.on_login(Err(ApiError::Unauthorized(Some(
        "invalid credentials".to_string(),
    ))));

    let client = client(&api, &store);
    let err = client.login("alice", "wrong").unwrap_err();

    assert_eq!(
        err,
        ClientError::InvalidCredentials(Some("invalid credentials".to_string()))
    );
    assert_eq!(client.session_state(), SessionState::LoggedOut);
    assert_eq!(store.get(TOKEN_KEY), None);
    assert_eq!(api.count("history"), 0);
}

#[test]
fn unreachable_server_on_login_is_network_error() {
    let api = ScriptedApi::new();
    let store = Arc::new(MemoryStore::new());
    api.on_login(Err(ApiError::Transport("connection refused".to_string())));

    let err = client(&api, &store).login("alice", "pw").unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}

#[test]
fn empty_credentials_fail_before_network() {
    let api = ScriptedApi::new();
    let store = Arc::new(MemoryStore::new());
    let client = client(&api, &store);

    assert!(matches!(
        client.login("", "pw"),
        Err(ClientError::Validation(_))
    ));
    assert!(matches!(
        client.login("alice", ""),
        Err(ClientError::Validation(_))
    ));
    assert!(matches!(
        client.signup("   ", "pw"),
        Err(ClientError::Validation(_))
    ));
    assert!(api.calls().is_empty());
}

#[test]
fn second_login_replaces_previous_user_data() {
    let api = ScriptedApi::new();
    let store = Arc::new(MemoryStore::new());
    api.on_login(login_ok("T1", "alice"));
    api.on_history(Ok(vec![entry("alice's", "Segura")]));
    api.on_login(login_ok("T2", "bob"));
    api.on_history(Ok(vec![entry("bob's", "Phishing")]));

    let client = client(&api, &store);
    client.login("alice", "pw").unwrap();
    client.login("bob", "pw").unwrap();

    assert_eq!(client.current_token().as_deref(), Some("T2"));
    assert_eq!(store.get(USERNAME_KEY).as_deref(), Some("bob"));
    let history = client.snapshot().history;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].input, "bob's");
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

#[test]
fn signup_does_not_log_in() {
    let api = ScriptedApi::new();
    let store = Arc::new(MemoryStore::new());
    api.on_signup(Ok(()));

    let client = client(&api, &store);
    client.signup("carol", "pw").unwrap();

    assert_eq!(client.session_state(), SessionState::LoggedOut);
    assert_eq!(store.get(TOKEN_KEY), None);
    assert_eq!(api.calls(), vec!["signup carol".to_string()]);
}

#[test]
fn signup_conflict_surfaces_server_detail() {
    let api = ScriptedApi::new();
    let store = Arc::new(MemoryStore::new());
    api.on_signup(Err(ApiError::Status {
        status: 400,
        detail: Some("username already exists".to_string()),
    }));

    let err = client(&api, &store).signup("alice", "pw").unwrap_err();
    assert_eq!(
        err,
        ClientError::Registration(Some("username already exists".to_string()))
    );
    assert_eq!(err.to_string(), "username already exists");
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

#[test]
fn logout_clears_everything_but_theme() {
    let api = ScriptedApi::new();
    let store = Arc::new(MemoryStore::new());
    api.on_login(login_ok("T1", "alice"));
    api.on_history(Ok(vec![entry("hola", "Segura")]));
    api.on_stats(Ok(stats(1)));

    let client = client(&api, &store);
    client.login("alice", "pw").unwrap();
    client.set_theme(Some(Theme::Light)).unwrap();
    client.logout().unwrap();

    assert_eq!(client.session_state(), SessionState::LoggedOut);
    assert_eq!(store.get(TOKEN_KEY), None);
    assert_eq!(store.get(USERNAME_KEY), None);
    assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
    assert!(client.snapshot().history.is_empty());
    assert_eq!(client.snapshot().stats.total, 0);
    assert!(api.calls().contains(&"logout T1".to_string()));

    let ui = client.ui_state();
    assert_eq!(ui.auth_control, "Login");
    assert_eq!(ui.kpis.total, "0");
    assert_eq!(ui.theme, Theme::Light);
}

#[test]
fn logout_succeeds_when_server_call_fails() {
    let api = ScriptedApi::new();
    let store = Arc::new(MemoryStore::new());
    api.on_login(login_ok("T1", "alice"));
    api.on_logout(Err(ApiError::Transport("timeout".to_string())));

    let client = client(&api, &store);
    client.login("alice", "pw").unwrap();
    client.logout().unwrap();

    assert_eq!(client.session_state(), SessionState::LoggedOut);
    assert_eq!(store.get(TOKEN_KEY), None);
}

// ---------------------------------------------------------------------------
// Restore
// ---------------------------------------------------------------------------

#[test]
fn restore_with_valid_token_is_verified_and_synced() {
    let api = ScriptedApi::new();
    let store = stored_session();
    api.on_validate(Ok("alice".to_string()));
    api.on_history(Ok(vec![entry("hola", "Segura")]));

    let client = client(&api, &store);
    let outcome = client.start().unwrap();

    assert!(matches!(outcome, SyncOutcome::Applied(_)));
    assert!(client.session_state().is_verified());
    assert_eq!(client.snapshot().history.len(), 1);
    assert_eq!(api.calls()[0], "validate T1");
}

#[test]
fn restore_adopts_server_username() {
    let api = ScriptedApi::new();
    let store = stored_session();
    api.on_validate(Ok("alice.smith".to_string()));

    let client = client(&api, &store);
    client.start().unwrap();

    assert_eq!(client.ui_state().username, "alice.smith");
    assert_eq!(store.get(USERNAME_KEY).as_deref(), Some("alice.smith"));
}

#[test]
fn restore_with_rejected_token_tears_down() {
    let api = ScriptedApi::new();
    let store = stored_session();
    api.on_validate(Err(unauthorized()));

    let client = client(&api, &store);
    let err = client.start().unwrap_err();

    assert_eq!(err, ClientError::SessionExpired);
    assert_eq!(client.session_state(), SessionState::LoggedOut);
    assert_eq!(store.get(TOKEN_KEY), None);
    assert_eq!(store.get(USERNAME_KEY), None);
    assert_eq!(api.count("history"), 0);
}

#[test]
fn restore_without_validation_endpoint_stays_unverified() {
    let api = ScriptedApi::new();
    let store = stored_session();
    api.on_validate(Err(ApiError::Status {
        status: 404,
        detail: None,
    }));

    let client = client(&api, &store);
    client.start().unwrap();

    let state = client.session_state();
    assert!(state.is_logged_in());
    assert!(!state.is_verified());
    assert_eq!(api.count("history"), 1);
}

#[test]
fn restore_with_unreachable_server_stays_unverified() {
    let api = ScriptedApi::new();
    let store = stored_session();

    let client = client(&api, &store);
    client.start().unwrap();

    assert!(matches!(client.session_state(), SessionState::Unverified(_)));
    assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("T1"));
}

#[test]
fn restore_with_single_key_clears_store() {
    let api = ScriptedApi::new();
    let store = Arc::new(MemoryStore::with_entries(&[(TOKEN_KEY, "T1")]));

    let client = client(&api, &store);
    let outcome = client.start().unwrap();

    assert_eq!(outcome, SyncOutcome::NoSession);
    assert_eq!(client.session_state(), SessionState::LoggedOut);
    assert_eq!(store.get(TOKEN_KEY), None);
    assert!(api.calls().is_empty());
}

#[test]
fn restore_skips_validation_when_disabled() {
    let api = ScriptedApi::new();
    let store = stored_session();

    let api_dyn: Arc<dyn phishguard::api::RiskApi> = api.clone();
    let store_dyn: Arc<dyn LocalStore> = store.clone();
    let client = phishguard::PhishGuardClient::new(api_dyn, store_dyn, false);
    client.start().unwrap();

    assert_eq!(api.count("validate"), 0);
    assert!(matches!(client.session_state(), SessionState::Unverified(_)));
}

#[test]
fn empty_store_starts_logged_out() {
    let api = ScriptedApi::new();
    let store = Arc::new(MemoryStore::new());

    let client = client(&api, &store);
    assert_eq!(client.start().unwrap(), SyncOutcome::NoSession);
    assert_eq!(client.ui_state().history_placeholder(), Some("No history"));
    assert!(api.calls().is_empty());
}

#[test]
fn restored_session_starts_without_result_panel() {
    let api = ScriptedApi::new();
    let store = Arc::new(MemoryStore::new());
    api.on_login(login_ok("T1", "alice"));
    api.on_analyze_url(Ok(UrlAnalysis {
        verdict: "Maliciosa".to_string(),
        reason: "listed".to_string(),
        details: None,
    }));
    let first = client(&api, &store);
    first.login("alice", "pw").unwrap();
    first.submit_url("http://sospechoso.com/login").unwrap();
    assert!(first.ui_state().result.is_some());

    api.on_validate(Ok("alice".to_string()));
    api.on_history(Ok(vec![entry("http://sospechoso.com/login", "Maliciosa")]));
    let second = client(&api, &store);
    second.start().unwrap();

    let ui = second.ui_state();
    assert!(ui.logged_in);
    assert_eq!(ui.history.len(), 1);
    assert!(ui.result.is_none());
}

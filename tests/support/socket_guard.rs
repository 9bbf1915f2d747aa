use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

/// True when `VIDSCOUT_REQUIRE_SOCKET_TESTS` asks for fail-fast behavior.
#[must_use]
pub fn socket_tests_required() -> bool {
    std::env::var("VIDSCOUT_REQUIRE_SOCKET_TESTS")
        .ok()
        .is_some_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

#[track_caller]
#[must_use]
pub fn should_skip_socket_bound_test() -> bool {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return false;
    }

    let location = Location::caller();
    let message = format!(
        "[mock-server] no localhost socket for {}:{}; skipping wiremock test",
        location.file(),
        location.line()
    );
    assert!(
        !socket_tests_required(),
        "{message}. Unset VIDSCOUT_REQUIRE_SOCKET_TESTS to allow skipping."
    );

    eprintln!("{message}. Set VIDSCOUT_REQUIRE_SOCKET_TESTS=1 to fail instead.");
    true
}

/// Starts a mock server, or returns `None` when sockets are unavailable.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if should_skip_socket_bound_test() {
        None
    } else {
        Some(MockServer::start().await)
    }
}

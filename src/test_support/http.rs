use httpmock::MockServer;

/// Start a fresh mock Graph API server for Conversions API tests.
pub fn start_mock_server() -> MockServer {
    MockServer::start()
}

use mock_server::{MockBackend, MockConfig};
use mvp_activities::{ClientConfig, Credentials, MvpActivitiesClient, UreqTransport};

/// Start the mock backend on a random port and return its handle plus the
/// base URL clients should use.
pub fn spawn_backend(config: MockConfig) -> (MockBackend, String) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let backend = MockBackend::new(config);
    let served = backend.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, served).await
        })
        .unwrap();
    });

    (backend, format!("http://{addr}/api"))
}

pub fn client(base_url: &str, token: &str, email: &str) -> MvpActivitiesClient<UreqTransport> {
    let config = ClientConfig::new(
        base_url,
        Credentials {
            auth_token: token.to_string(),
            email: email.to_string(),
        },
    );
    MvpActivitiesClient::with_transport(config, UreqTransport::new())
}

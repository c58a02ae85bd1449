pub mod server;

/// Action to execute once argument parsing and telemetry setup are done.
#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        frontend_url: String,
    },
}

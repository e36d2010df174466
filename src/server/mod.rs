pub mod api;

use crate::cli::Args;
use crate::relay::Relay;
use self::api::{ create_router, AppState };
use std::error::Error;
use std::net::SocketAddr;
use log::{ info, error };

pub struct Server {
    addr: String,
    relay: Relay,
    args: Args,
}

impl Server {
    pub fn new(
        addr: String,
        relay: Relay,
        args: Args,
    ) -> Self {
        Self {
            addr,
            relay,
            args,
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()
            .map_err(|e| format!("Invalid server address '{}': {}", self.addr, e))?;

        let app = create_router(AppState {
            relay: self.relay.clone(),
            max_body_bytes: self.args.max_body_bytes,
        });

        if self.args.enable_tls {
            let (cert_path, key_path) = match (&self.args.tls_cert_path, &self.args.tls_key_path) {
                (Some(cert), Some(key)) => (cert, key),
                (Some(_), None) | (None, Some(_)) => {
                    error!("Both --tls-cert-path and --tls-key-path must be provided to enable TLS.");
                    return Err("Missing TLS certificate or key path".into());
                }
                (None, None) => {
                    error!("--enable-tls was set but no certificate/key paths provided.");
                    return Err("TLS enabled without cert/key".into());
                }
            };

            info!(
                "TLS enabled. Loading certificate from '{}' and key from '{}'",
                cert_path,
                key_path
            );
            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                cert_path,
                key_path
            ).await?;

            info!("Relay listening on: https://{}{}", addr, api::CHAT_PATH);
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await?;
        } else {
            let listener = tokio::net::TcpListener::bind(addr).await
                .map_err(|e| format!("Failed to bind relay to {}: {}. Try a different port.", addr, e))?;

            info!("Relay listening on: http://{}{}", addr, api::CHAT_PATH);
            axum::serve(listener, app.into_make_service()).await?;
        }

        Ok(())
    }
}

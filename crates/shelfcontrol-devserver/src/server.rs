//! HTTP/1 server loop.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};

use crate::error::ServerError;
use crate::handler::DevHandler;
use crate::settings::DevSettings;

/// A bound development server.
#[derive(Debug)]
pub struct DevServer {
	listener: TcpListener,
	handler: Arc<DevHandler>,
}

impl DevServer {
	/// Binds `settings.listen` and prepares the handler.
	///
	/// Port `0` binds an ephemeral port; see [`local_addr`](Self::local_addr).
	pub async fn bind(settings: &DevSettings) -> Result<Self, ServerError> {
		let handler = DevHandler::new(settings)?;
		let listener = TcpListener::bind(settings.listen)
			.await
			.map_err(|error| ServerError::Bind {
				addr: settings.listen,
				error,
			})?;

		Ok(Self {
			listener,
			handler: Arc::new(handler),
		})
	}

	/// The address actually bound.
	pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
		Ok(self.listener.local_addr()?)
	}

	/// Serves until `shutdown` completes. In-flight connections are left to
	/// finish on their own tasks.
	pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<(), ServerError>
	where
		F: Future<Output = ()>,
	{
		tracing::info!(addr = %self.local_addr()?, "dev server listening");
		tokio::pin!(shutdown);

		loop {
			tokio::select! {
				accepted = self.listener.accept() => {
					let (stream, peer) = accepted?;
					let handler = Arc::clone(&self.handler);
					tokio::spawn(async move {
						if let Err(err) = handle_connection(stream, handler).await {
							tracing::debug!(%peer, %err, "connection closed with error");
						}
					});
				}
				_ = &mut shutdown => {
					tracing::info!("shutdown requested, no longer accepting connections");
					break;
				}
			}
		}

		Ok(())
	}

	/// Serves until the process receives Ctrl-C.
	pub async fn serve(self) -> Result<(), ServerError> {
		self.serve_with_shutdown(async {
			if let Err(err) = tokio::signal::ctrl_c().await {
				tracing::error!(%err, "failed to listen for Ctrl-C");
				std::future::pending::<()>().await;
			}
		})
		.await
	}
}

async fn handle_connection(stream: TcpStream, handler: Arc<DevHandler>) -> Result<(), hyper::Error> {
	let io = TokioIo::new(stream);
	let service = service_fn(move |req: hyper::Request<Incoming>| {
		let handler = Arc::clone(&handler);
		async move {
			let method = req.method().clone();
			let path = req.uri().path().to_string();
			let response = handler.handle(req).await;
			tracing::debug!(%method, path, status = response.status().as_u16(), "request");
			Ok::<_, Infallible>(response)
		}
	});

	http1::Builder::new().serve_connection(io, service).await
}

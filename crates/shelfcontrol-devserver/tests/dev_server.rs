//! End-to-end behaviour of the dev server against a real upstream.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, header};
use hyper_util::rt::TokioIo;
use rstest::rstest;
use shelfcontrol_devserver::{DevServer, DevSettings, ProxyRule};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// What the upstream saw for one request.
#[derive(Debug, Clone)]
struct Seen {
	target: String,
	host: Option<String>,
	origin: Option<String>,
	connection: Option<String>,
}

struct Upstream {
	addr: SocketAddr,
	seen: Arc<Mutex<Vec<Seen>>>,
}

impl Upstream {
	async fn start() -> Self {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let seen = Arc::new(Mutex::new(Vec::new()));

		let log = seen.clone();
		tokio::spawn(async move {
			loop {
				let Ok((stream, _)) = listener.accept().await else {
					continue;
				};
				let log = log.clone();
				tokio::spawn(async move {
					let service = hyper::service::service_fn(move |req: Request<Incoming>| {
						let log = log.clone();
						async move {
							let get = |name: header::HeaderName| {
								req.headers()
									.get(name)
									.and_then(|v| v.to_str().ok())
									.map(str::to_string)
							};
							let target = req
								.uri()
								.path_and_query()
								.map(|pq| pq.to_string())
								.unwrap_or_default();
							log.lock().unwrap().push(Seen {
								target: target.clone(),
								host: get(header::HOST),
								origin: get(header::ORIGIN),
								connection: get(header::CONNECTION),
							});
							let body = format!("upstream saw {}", target);
							Ok::<_, Infallible>(Response::new(Full::new(Bytes::from(body))))
						}
					});
					let _ = hyper::server::conn::http1::Builder::new()
						.serve_connection(TokioIo::new(stream), service)
						.await;
				});
			}
		});

		Self { addr, seen }
	}

	fn origin(&self) -> String {
		format!("http://{}", self.addr)
	}

	fn seen(&self) -> Vec<Seen> {
		self.seen.lock().unwrap().clone()
	}
}

/// A dev server on an ephemeral port, stopped when dropped.
struct Running {
	base: String,
	_stop: oneshot::Sender<()>,
	_dist: TempDir,
}

async fn start(settings: DevSettings) -> Running {
	let dist = TempDir::new().unwrap();
	std::fs::write(dist.path().join("index.html"), "<div id=\"app\"></div>").unwrap();

	let settings = DevSettings {
		listen: "127.0.0.1:0".parse().unwrap(),
		static_root: dist.path().to_path_buf(),
		..settings
	};
	let server = DevServer::bind(&settings).await.unwrap();
	let base = format!("http://{}", server.local_addr().unwrap());

	let (stop, stopped) = oneshot::channel::<()>();
	tokio::spawn(server.serve_with_shutdown(async {
		let _ = stopped.await;
	}));

	Running {
		base,
		_stop: stop,
		_dist: dist,
	}
}

fn backed_by(upstream: &Upstream) -> DevSettings {
	DevSettings {
		backend: upstream.origin(),
		..DevSettings::default()
	}
}

#[rstest]
#[case("/api/search?query=a")]
#[case("/img/3")]
#[tokio::test]
async fn test_proxied_prefix_reaches_backend_intact(#[case] target: &str) {
	// Arrange
	let upstream = Upstream::start().await;
	let server = start(backed_by(&upstream)).await;

	// Act
	let response = reqwest::get(format!("{}{}", server.base, target)).await.unwrap();

	// Assert
	assert_eq!(response.status(), 200);
	assert_eq!(response.text().await.unwrap(), format!("upstream saw {}", target));
	let seen = upstream.seen();
	assert_eq!(seen.len(), 1);
	assert_eq!(seen[0].target, target);
	assert_eq!(seen[0].host.as_deref(), Some(upstream.addr.to_string().as_str()));
}

#[tokio::test]
async fn test_origin_rewritten_and_hop_by_hop_dropped() {
	let upstream = Upstream::start().await;
	let server = start(backed_by(&upstream)).await;

	reqwest::Client::new()
		.post(format!("{}/api/book/1", server.base))
		.header(header::ORIGIN, "http://localhost:8080")
		.header(header::CONNECTION, "x-trace")
		.header("x-trace", "1")
		.body("payload")
		.send()
		.await
		.unwrap();

	let seen = upstream.seen();
	assert_eq!(seen[0].origin, Some(upstream.origin()));
	assert_ne!(seen[0].connection.as_deref(), Some("x-trace"));
}

#[tokio::test]
async fn test_origin_omits_backend_path() {
	let upstream = Upstream::start().await;
	let settings = DevSettings {
		backend: format!("{}/backend", upstream.origin()),
		..DevSettings::default()
	};
	let server = start(settings).await;

	reqwest::Client::new()
		.post(format!("{}/api/book/1", server.base))
		.header(header::ORIGIN, "http://localhost:8080")
		.send()
		.await
		.unwrap();

	let seen = upstream.seen();
	assert_eq!(seen[0].target, "/backend/api/book/1");
	assert_eq!(seen[0].origin, Some(upstream.origin()));
}

#[tokio::test]
async fn test_host_kept_without_change_origin() {
	let upstream = Upstream::start().await;
	let settings = DevSettings {
		proxy: vec![ProxyRule {
			change_origin: false,
			..ProxyRule::new("/api")
		}],
		..backed_by(&upstream)
	};
	let server = start(settings).await;

	reqwest::Client::new()
		.get(format!("{}/api/search", server.base))
		.header(header::HOST, "shelf.local:8080")
		.send()
		.await
		.unwrap();

	assert_eq!(upstream.seen()[0].host.as_deref(), Some("shelf.local:8080"));
}

#[tokio::test]
async fn test_history_fallback_serves_index() {
	let upstream = Upstream::start().await;
	let server = start(backed_by(&upstream)).await;

	let response = reqwest::Client::new()
		.get(format!("{}/books/x", server.base))
		.header(header::ACCEPT, "text/html")
		.send()
		.await
		.unwrap();

	assert_eq!(response.status(), 200);
	assert!(
		response.headers()[header::CONTENT_TYPE]
			.to_str()
			.unwrap()
			.starts_with("text/html")
	);
	assert_eq!(response.text().await.unwrap(), "<div id=\"app\"></div>");
	assert!(upstream.seen().is_empty());
}

#[rstest]
#[case(true, 200)]
#[case(false, 403)]
#[tokio::test]
async fn test_host_check(#[case] disabled: bool, #[case] status: u16) {
	let upstream = Upstream::start().await;
	let settings = DevSettings {
		disable_host_check: disabled,
		..backed_by(&upstream)
	};
	let server = start(settings).await;

	let response = reqwest::Client::new()
		.get(format!("{}/books", server.base))
		.header(header::HOST, "evil.example")
		.header(header::ACCEPT, "text/html")
		.send()
		.await
		.unwrap();

	assert_eq!(response.status(), status);
	if status == 403 {
		assert_eq!(response.text().await.unwrap(), "Invalid Host header");
	}
}

#[tokio::test]
async fn test_unreachable_backend_answers_gateway_timeout() {
	let server = start(DevSettings {
		backend: "http://127.0.0.1:1".to_string(),
		..DevSettings::default()
	})
	.await;

	let response = reqwest::get(format!("{}/api/search?query=a", server.base))
		.await
		.unwrap();

	assert_eq!(response.status(), 504);
	assert_eq!(
		response.text().await.unwrap(),
		"Error occurred while trying to proxy: http://127.0.0.1:1/api/search?query=a"
	);
}

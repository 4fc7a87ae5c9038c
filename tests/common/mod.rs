#![allow(dead_code)]

use coupon_dispenser::{Config, SeedCoupon};
use reqwest::header::{COOKIE, SET_COOKIE, USER_AGENT};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::sleep;

pub static SHARED_SERVER: OnceCell<TestServer> = OnceCell::const_new();

/// Test harness running the service on its own runtime thread
pub struct TestServer {
    _handle: JoinHandle<()>,
    e_port: u16,
    i_port: u16,
}

/// A simulated browser: fixed address and user agent, remembers its session cookie
#[derive(Debug, Clone)]
pub struct Visitor {
    pub address: String,
    pub user_agent: String,
    pub session: Option<String>,
}

impl Visitor {
    pub fn new(address: &str, user_agent: &str) -> Self {
        Self {
            address: address.to_string(),
            user_agent: user_agent.to_string(),
            session: None,
        }
    }

    /// Same browser after its cookies were cleared
    pub fn without_session(&self) -> Self {
        Self {
            session: None,
            ..self.clone()
        }
    }
}

impl TestServer {
    /// Get or create the shared test server, with an empty catalog
    pub async fn shared() -> &'static TestServer {
        SHARED_SERVER
            .get_or_init(|| async { Self::start(Vec::new(), false).await })
            .await
    }

    /// Start a dedicated server seeded with `coupons`
    pub async fn start(coupons: Vec<SeedCoupon>, seed_defaults: bool) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let e_port = portpicker::pick_unused_port().expect("No available port");
        let i_port = portpicker::pick_unused_port().expect("No available port");

        let config = Config {
            listen_on_port: e_port,
            internal_port: i_port,
            trust_forwarded_for: true,
            seed_defaults,
            coupons,
            ..Default::default()
        };

        // Spawn the server in a separate thread with its own runtime
        let handle = std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                coupon_dispenser::run(config).await.unwrap();
            });
        });

        let server = TestServer {
            _handle: handle,
            e_port,
            i_port,
        };

        // Poll until both listeners are ready
        let client = server.client();
        for _ in 0..200 {
            let public = client
                .get(format!("{}/health", server.ext_url()))
                .send()
                .await;
            let internal = client
                .get(format!("{}/health", server.int_url()))
                .send()
                .await;
            if matches!((&public, &internal), (Ok(p), Ok(i)) if p.status().is_success() && i.status().is_success())
            {
                break;
            }

            sleep(Duration::from_millis(10)).await;
        }

        server
    }

    pub fn int_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.i_port)
    }

    pub fn ext_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.e_port)
    }

    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap()
    }

    /// POST /claim as `visitor`, storing any session cookie the server issues
    pub async fn claim(
        &self,
        client: &reqwest::Client,
        visitor: &mut Visitor,
    ) -> (reqwest::StatusCode, serde_json::Value) {
        let response = self
            .public_request(client.post(format!("{}/claim", self.ext_url())), visitor)
            .send()
            .await
            .unwrap();

        if let Some(token) = session_cookie(&response) {
            visitor.session = Some(token);
        }

        let status = response.status();
        (status, response.json().await.unwrap())
    }

    /// GET /claims/mine as `visitor`
    pub async fn my_claims(
        &self,
        client: &reqwest::Client,
        visitor: &Visitor,
    ) -> Vec<serde_json::Value> {
        self.public_request(client.get(format!("{}/claims/mine", self.ext_url())), visitor)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    fn public_request(
        &self,
        builder: reqwest::RequestBuilder,
        visitor: &Visitor,
    ) -> reqwest::RequestBuilder {
        let builder = builder
            .header("X-Forwarded-For", &visitor.address)
            .header(USER_AGENT, &visitor.user_agent);
        match &visitor.session {
            Some(token) => builder.header(COOKIE, format!("sessionId={token}")),
            None => builder,
        }
    }

    /// Create a coupon through the admin API
    pub async fn add_coupon(
        &self,
        client: &reqwest::Client,
        code: &str,
        is_active: bool,
    ) -> serde_json::Value {
        let response = client
            .post(format!("{}/coupons", self.int_url()))
            .json(&serde_json::json!({
                "code": code,
                "description": format!("{code} description"),
                "is_active": is_active,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
        response.json().await.unwrap()
    }

    pub async fn list_coupons(&self, client: &reqwest::Client) -> Vec<serde_json::Value> {
        client
            .get(format!("{}/coupons", self.int_url()))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    pub async fn list_claims(&self, client: &reqwest::Client) -> Vec<serde_json::Value> {
        client
            .get(format!("{}/claims", self.int_url()))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

/// Extract the session token from a `Set-Cookie: sessionId=...` header
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find_map(|h| {
            h.split(';')
                .next()
                .and_then(|pair| pair.trim().strip_prefix("sessionId="))
                .map(str::to_string)
        })
}

pub fn seed(code: &str, is_active: bool) -> SeedCoupon {
    SeedCoupon {
        code: code.to_string(),
        description: format!("{code} description"),
        is_active,
        expires_at: None,
    }
}

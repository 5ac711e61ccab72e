//! Shared fixtures for unit and HTTP tests.

use std::sync::{Arc, Mutex};

use axum_test::TestServer;

use crate::access::{AccessEngine, Actor};
use crate::api::models::accounts::CurrentUser;
use crate::api::models::agents::AgentCreate;
use crate::api::models::auth::RegisterRequest;
use crate::api::models::leads::LeadCreate;
use crate::auth::password::Argon2Params;
use crate::config::{Config, DatabaseConfig, EmailTransportConfig, PasswordConfig};
use crate::db::{MemoryStorage, Storage};
use crate::email::EmailService;
use crate::notifications::{EmailNotifier, Notification, Notifier};
use crate::types::AgentId;
use crate::{AppState, Application};

/// Keeps every notice instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}

pub fn create_test_config() -> Config {
    let emails = std::env::temp_dir().join(format!("crmctl-test-emails-{}", std::process::id()));
    let fast = Argon2Params::fast();

    let mut config = Config {
        database_url: None,
        database: DatabaseConfig::Memory,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    };
    config.auth.native.password = PasswordConfig {
        argon2_memory_kib: fast.memory_kib,
        argon2_iterations: fast.iterations,
        argon2_parallelism: fast.parallelism,
        ..Default::default()
    };
    config.auth.native.session.cookie_secure = false;
    config.email.transport = EmailTransportConfig::File {
        path: emails.to_string_lossy().into_owned(),
    };
    config
}

/// An engine over fresh in-memory storage, with notices recorded.
pub struct TestWorld {
    pub config: Config,
    pub storage: Arc<MemoryStorage>,
    pub notifier: Arc<RecordingNotifier>,
    pub engine: AccessEngine,
}

impl TestWorld {
    pub fn new() -> Self {
        let config = create_test_config();
        let storage = Arc::new(MemoryStorage::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = AccessEngine::new(storage.clone(), notifier.clone(), &config);
        Self {
            config,
            storage,
            notifier,
            engine,
        }
    }

    /// Notices go to an SMTP server that refuses connections
    pub fn with_failing_notifier() -> Self {
        let mut world = Self::new();
        let mut smtp_config = world.config.clone();
        smtp_config.email.transport = EmailTransportConfig::Smtp {
            host: "127.0.0.1".to_string(),
            port: 1,
            username: "nobody".to_string(),
            password: "nothing".to_string(),
            use_tls: false,
        };
        let notifier = EmailNotifier::new(EmailService::new(&smtp_config).unwrap());
        world.engine = AccessEngine::new(world.storage.clone(), Arc::new(notifier), &world.config);
        world
    }

    pub fn app_state(&self) -> AppState {
        AppState::builder().config(self.config.clone()).engine(self.engine.clone()).build()
    }

    /// Register an organisor named `name` and return it as an actor
    pub async fn organisation(&self, name: &str) -> Actor {
        let account = self.engine.register_organisor(register_request(name)).await.unwrap();
        self.engine.resolve_actor(&CurrentUser::from(&account)).await.unwrap()
    }

    /// Have `organisor` provision an agent named `name` and return it as an actor
    pub async fn agent(&self, organisor: &Actor, name: &str) -> Actor {
        self.engine.create_agent(organisor, agent_request(name)).await.unwrap();
        let account = self.storage.get_account_by_username(name).await.unwrap().unwrap();
        self.engine.resolve_actor(&CurrentUser::from(&account)).await.unwrap()
    }
}

pub fn register_request(username: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        first_name: String::new(),
        last_name: String::new(),
        password: "password123".to_string(),
        is_organisor: None,
        is_agent: None,
    }
}

pub fn agent_request(username: &str) -> AgentCreate {
    AgentCreate {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        first_name: String::new(),
        last_name: String::new(),
    }
}

pub fn lead_request(first_name: &str, agent_id: Option<AgentId>) -> LeadCreate {
    LeadCreate {
        first_name: first_name.to_string(),
        last_name: "Lead".to_string(),
        age: 30,
        agent_id,
        description: String::new(),
        phone_number: "555-0100".to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
    }
}

/// A full application over in-memory storage, as a test server
pub async fn create_test_app() -> TestServer {
    let app = Application::new(create_test_config())
        .await
        .expect("Failed to create application");
    app.into_test_server()
}

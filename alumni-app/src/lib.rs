pub mod app;
pub mod busy;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod profile;
pub mod provider;
pub mod router;
pub mod screens;
pub mod session;
pub mod splash;
pub mod test_util;

pub use app::App;
pub use config::{Config, FirebaseConfig, LoggingConfig, SplashConfig};
pub use error::{Error, Result};
pub use profile::ProfileRepository;
pub use provider::firebase::{FirebaseAuth, FirestoreClient};
pub use provider::{Account, AccountId, DocumentStore, IdentityProvider, ProviderError};
pub use router::{RootView, Router, Screen};
pub use screens::{EditProfileScreen, HomeScreen, LoginScreen, RegisterScreen};
pub use session::{SessionChannel, SessionSubscription};

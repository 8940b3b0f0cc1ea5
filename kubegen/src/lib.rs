pub mod decode;
pub mod error;
pub mod generate;
pub mod inputs;
pub mod kubeconfig;
pub mod runner;
pub mod secret;

pub use error::{Error, Result};
pub use generate::{generate, Generated};
pub use inputs::{Credentials, EnvInputs, InputSource, Layered};

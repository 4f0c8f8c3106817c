//! HTTP bridge to the camera-control executable
//!
//! Each REST request is translated into exactly one invocation of an external
//! program whose JSON stdout becomes the response body.

pub mod config;
pub mod error;
pub mod http;
pub mod invoker;
pub mod operation;
pub mod server;

pub use config::{BridgeConfig, BridgeConfigBuilder};
pub use error::OperationError;
pub use http::{HttpRequest, HttpResponse};
pub use invoker::{CameraBridge, CommandRequest, CommandResult, CommandRunner, ProcessRunner};
pub use operation::Operation;
pub use server::{BridgeHandle, BridgeServer, error_response};

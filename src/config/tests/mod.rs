//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `operation_mode`: Operation mode determination tests
//! - `field_resolution`: Token, project, and API URL resolution tests
//! - `loading`: Loading from real CLI arguments and environment variables
//! - `validation`: Configuration consistency validation tests

mod helpers;
mod loading;
mod operation_mode;
mod precedence;
mod validation;

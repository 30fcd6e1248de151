// Security module for path validation and access control
//
// Every filesystem tool routes its paths through here so that operations stay
// inside the configured root directory.

pub mod path_validator;

pub use path_validator::{PathSecurityError, validate_new_path, validate_path};

//! Default values for loader configuration.

pub const BASE_PATH: &str = "components";
pub const ROUTES_PATH: &str = "pages";
pub const ROUTER_PATH: &str = "lib";
pub const COMPONENT_EXTENSION: &str = "js";
pub const ROUTE_EXTENSION: &str = "html";
pub const DEFAULT_ROUTE: &str = "home";
pub const CACHE: bool = true;

/// Environment variable consulted when the configuration names no environment.
pub const ENVIRONMENT_VAR: &str = "GROVE_ENV";

pub fn base_path() -> String { BASE_PATH.to_string() }
pub fn routes_path() -> String { ROUTES_PATH.to_string() }
pub fn router_path() -> String { ROUTER_PATH.to_string() }
pub fn component_extension() -> String { COMPONENT_EXTENSION.to_string() }
pub fn route_extension() -> String { ROUTE_EXTENSION.to_string() }
pub fn default_route() -> String { DEFAULT_ROUTE.to_string() }
pub fn cache() -> bool { CACHE }

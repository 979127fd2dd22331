//! Configuration resources compiled into the binary.

/// Name of the configuration used when none is specified.
pub const DEFAULT_RESOURCE: &str = "logging.toml";

static RESOURCES: &[(&str, &str)] = &[(
    DEFAULT_RESOURCE,
    include_str!("../../resources/logging.toml"),
)];

/// Look up an embedded resource by exact name.
pub fn resource(name: &str) -> Option<&'static str> {
    RESOURCES
        .iter()
        .find(|(resource_name, _)| *resource_name == name)
        .map(|(_, content)| *content)
}

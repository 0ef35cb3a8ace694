//! Registries for the array extension points.
//!
//! Chunk grids, chunk key encodings and codecs are named in array metadata as `{"name": ..., "configuration": ...}` (see [`Metadata`]).
//! Each implementation registers a [`Plugin`] with [`inventory`], holding a name matcher and a constructor.
//! [`create_from_registry`] finds the plugin for a metadata name and constructs the object from the configuration.

use thiserror::Error;

use crate::metadata::Metadata;

/// A registered constructor of `TPlugin` from [`Metadata`].
pub struct Plugin<TPlugin> {
    identifier: &'static str,
    match_name_fn: fn(name: &str) -> bool,
    create_fn: fn(metadata: &Metadata) -> Result<TPlugin, PluginCreateError>,
}

/// The configuration in the metadata of a plugin could not be parsed.
#[derive(Debug, Error)]
#[error("{plugin_type} {identifier} is unsupported with metadata: {metadata}")]
pub struct PluginMetadataInvalidError {
    identifier: &'static str,
    plugin_type: &'static str,
    metadata: Box<Metadata>,
}

impl PluginMetadataInvalidError {
    /// Create a new [`PluginMetadataInvalidError`] for the plugin `identifier` of `plugin_type` (e.g. `"codec"`).
    #[must_use]
    pub fn new(identifier: &'static str, plugin_type: &'static str, metadata: Metadata) -> Self {
        Self {
            identifier,
            plugin_type,
            metadata: Box::new(metadata),
        }
    }
}

/// A plugin creation error.
#[derive(Error, Debug)]
pub enum PluginCreateError {
    /// No plugin is registered for the name.
    #[error("{plugin_type} {name} is not supported")]
    Unsupported {
        /// The metadata name.
        name: String,
        /// The extension point, e.g. `"codec"`.
        plugin_type: String,
    },
    /// The metadata configuration is invalid for the plugin.
    #[error(transparent)]
    MetadataInvalid(#[from] PluginMetadataInvalidError),
    /// The configuration is well formed but its values are not usable.
    #[error("{_0}")]
    Other(String),
}

impl From<&str> for PluginCreateError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for PluginCreateError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

impl<TPlugin> Plugin<TPlugin> {
    /// Create a plugin for registration with [`inventory::submit!`].
    pub const fn new(
        identifier: &'static str,
        match_name_fn: fn(name: &str) -> bool,
        create_fn: fn(metadata: &Metadata) -> Result<TPlugin, PluginCreateError>,
    ) -> Self {
        Self {
            identifier,
            match_name_fn,
            create_fn,
        }
    }

    /// Construct a `TPlugin` from `metadata`.
    ///
    /// # Errors
    /// Returns a [`PluginCreateError`] if the configuration is invalid.
    pub fn create(&self, metadata: &Metadata) -> Result<TPlugin, PluginCreateError> {
        (self.create_fn)(metadata)
    }

    /// Returns true if `name` refers to this plugin.
    #[must_use]
    pub fn match_name(&self, name: &str) -> bool {
        (self.match_name_fn)(name)
    }

    /// The name the plugin writes to metadata.
    #[must_use]
    pub const fn identifier(&self) -> &'static str {
        self.identifier
    }
}

/// Construct a `TPlugin` from `metadata` with the registered plugin whose name matches.
///
/// `plugin_type` names the extension point in errors.
///
/// # Errors
/// Returns [`PluginCreateError::Unsupported`] if no plugin matches the metadata name, or the error of the matching plugin.
pub fn create_from_registry<TPlugin>(
    metadata: &Metadata,
    plugin_type: &str,
) -> Result<TPlugin, PluginCreateError>
where
    Plugin<TPlugin>: inventory::Collect,
{
    let plugin = inventory::iter::<Plugin<TPlugin>>
        .into_iter()
        .find(|plugin| plugin.match_name(metadata.name()));
    match plugin {
        Some(plugin) => {
            log::trace!("creating {plugin_type} {}", plugin.identifier());
            plugin.create(metadata)
        }
        None => Err(PluginCreateError::Unsupported {
            name: metadata.name().to_string(),
            plugin_type: plugin_type.to_string(),
        }),
    }
}

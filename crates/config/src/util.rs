// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use figment::Figment;
use serde::de::DeserializeOwned;

/// Boxed error returned when loading or validating a section
pub type SectionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Trait implemented by all configuration sections, to load a specific part
/// of the configuration out of a [`Figment`].
pub trait ConfigurationSection: Sized + DeserializeOwned {
    /// Where this section lives relative to the root, if not at the root
    const PATH: Option<&'static str> = None;

    /// Validate the configuration section
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    fn validate(&self, _figment: &Figment) -> Result<(), SectionError> {
        Ok(())
    }

    /// Extract and validate the section from a [`Figment`]
    ///
    /// # Errors
    ///
    /// Returns an error if the section is missing, can't be deserialized, or
    /// is invalid
    fn extract(figment: &Figment) -> Result<Self, SectionError> {
        let this: Self = match Self::PATH {
            Some(path) => figment.extract_inner(path)?,
            None => figment.extract()?,
        };

        this.validate(figment)?;
        Ok(this)
    }
}

/// Extension trait for sections which have a sensible default, so that they
/// can be omitted from the configuration.
pub trait ConfigurationSectionExt: ConfigurationSection + Default {
    /// Extract the section from the given [`Figment`], or return the default
    /// value if it is not present.
    ///
    /// # Errors
    ///
    /// Returns an error if the section is present but invalid
    fn extract_or_default(figment: &Figment) -> Result<Self, SectionError> {
        match Self::PATH {
            Some(path) if !figment.contains(path) => Ok(Self::default()),
            _ => Self::extract(figment),
        }
    }
}

impl<T: ConfigurationSection + Default> ConfigurationSectionExt for T {}

/// Attach the location of a field of the section at `section` to an error,
/// so that it points at the right place in the configuration sources.
pub(crate) fn error_on_field(
    figment: &Figment,
    section: &'static str,
    field: &'static str,
    mut error: figment::error::Error,
) -> figment::error::Error {
    error.metadata = figment.find_metadata(section).cloned();
    error.profile = Some(figment::Profile::Default);
    error.path = vec![section.to_owned(), field.to_owned()];
    error
}

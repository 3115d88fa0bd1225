// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A simple data taxonomy with universal data classes.
//!
//! Data classes in this taxonomy are generic in nature and are useful in a few situations:
//!
//! * [`Insensitive`] is used when data is specifically not classified.
//! * [`UnknownSensitivity`] is used when data is sensitive, but the specific
//!   classification is unknown.
//! * [`Sensitive`] is primarily intended for libraries to indicate particular
//!   data contains some form of sensitive information. General-purpose libraries
//!   are usually agnostic to the application's specific data taxonomy, so if they
//!   need to classify data, they can use [Sensitive] as a general indication to
//!   the application that the data is sensitive.

use data_privacy_macros::taxonomy;

/// A simple data taxonomy with universal data classes.
#[cfg_attr(feature = "serde", taxonomy(common, serde = true))]
#[cfg_attr(not(feature = "serde"), taxonomy(common, serde = false))]
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum CommonTaxonomy {
    /// The `sensitive` data class indicates data must be treated carefully.
    ///
    /// This data class is typically used in libraries which are agnostic to a
    /// specific data taxonomy.
    Sensitive,

    /// The `insensitive` data class indicates data is specifically not classified.
    Insensitive,

    /// The `unknown_sensitivity` data class indicates data has an unknown classification.
    UnknownSensitivity,
}

// Copyright 2022 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing output [`Feature`]s.

use serde::{Deserialize, Serialize};

use crate::{
    model::{pack::pack_u8_prefixed, utxo::Address, Pack},
    Error,
};

/// The different [`Feature`] variants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Feature {
    /// The sender feature.
    Sender {
        /// The address associated with the feature.
        address: Address,
    },
    /// The issuer feature.
    Issuer {
        /// The address associated with the feature.
        address: Address,
    },
    /// The metadata feature.
    Metadata {
        /// The data of the feature.
        #[serde(with = "serde_bytes")]
        data: Box<[u8]>,
    },
    /// The tag feature.
    Tag {
        /// The data of the feature.
        #[serde(with = "serde_bytes")]
        data: Box<[u8]>,
    },
}

impl Feature {
    /// The kind byte of the sender feature.
    pub const SENDER_KIND: u8 = 0;
    /// The kind byte of the issuer feature.
    pub const ISSUER_KIND: u8 = 1;
    /// The kind byte of the metadata feature.
    pub const METADATA_KIND: u8 = 2;
    /// The kind byte of the tag feature.
    pub const TAG_KIND: u8 = 3;

    /// Maximum length of metadata.
    pub const METADATA_LENGTH_MAX: usize = 8192;
    /// Maximum length of a tag.
    pub const TAG_LENGTH_MAX: usize = 64;

    /// Returns the kind byte of the feature.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Sender { .. } => Self::SENDER_KIND,
            Self::Issuer { .. } => Self::ISSUER_KIND,
            Self::Metadata { .. } => Self::METADATA_KIND,
            Self::Tag { .. } => Self::TAG_KIND,
        }
    }

    /// Returns the name used for the feature in documents and messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Sender { .. } => "sender",
            Self::Issuer { .. } => "issuer",
            Self::Metadata { .. } => "metadata",
            Self::Tag { .. } => "tag",
        }
    }

    fn validate(&self) -> Result<(), Error> {
        match self {
            Self::Metadata { data } if data.is_empty() || data.len() > Self::METADATA_LENGTH_MAX => Err(
                Error::InvalidFeature(format!("metadata length {} out of range", data.len())),
            ),
            Self::Tag { data } if data.is_empty() || data.len() > Self::TAG_LENGTH_MAX => Err(Error::InvalidFeature(
                format!("tag length {} out of range", data.len()),
            )),
            _ => Ok(()),
        }
    }
}

impl Pack for Feature {
    fn pack(&self, buf: &mut Vec<u8>) {
        self.kind().pack(buf);
        match self {
            Self::Sender { address } | Self::Issuer { address } => address.pack(buf),
            Self::Metadata { data } => {
                (data.len() as u16).pack(buf);
                buf.extend_from_slice(data);
            }
            Self::Tag { data } => {
                (data.len() as u8).pack(buf);
                buf.extend_from_slice(data);
            }
        }
    }
}

/// A set of [`Feature`]s, sorted by kind, in which every kind appears at most once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Feature>", into = "Vec<Feature>")]
pub struct Features(Vec<Feature>);

impl Features {
    /// Validates a list of features.
    pub fn new(features: impl IntoIterator<Item = Feature>) -> Result<Self, Error> {
        let mut features = features.into_iter().collect::<Vec<_>>();
        features.sort_by_key(Feature::kind);
        for pair in features.windows(2) {
            if pair[0].kind() == pair[1].kind() {
                return Err(Error::DuplicateFeature(pair[0].kind_name()));
            }
        }
        features.iter().try_for_each(Feature::validate)?;
        Ok(Self(features))
    }

    /// Iterates over the features in kind order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Feature> {
        self.0.iter()
    }

    /// Returns `true` if there are no features.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the sender address, if any.
    pub fn sender(&self) -> Option<&Address> {
        self.0.iter().find_map(|f| match f {
            Feature::Sender { address } => Some(address),
            _ => None,
        })
    }

    /// Returns the issuer address, if any.
    pub fn issuer(&self) -> Option<&Address> {
        self.0.iter().find_map(|f| match f {
            Feature::Issuer { address } => Some(address),
            _ => None,
        })
    }

    /// Returns the tag, if any.
    pub fn tag(&self) -> Option<&[u8]> {
        self.0.iter().find_map(|f| match f {
            Feature::Tag { data } => Some(data.as_ref()),
            _ => None,
        })
    }

    /// Fails if the set contains a kind outside of `allowed`.
    pub(crate) fn check_allowed(&self, what: &str, allowed: &[u8]) -> Result<(), Error> {
        if let Some(f) = self.0.iter().find(|f| !allowed.contains(&f.kind())) {
            return Err(Error::InvalidFeature(format!(
                "`{}` is not allowed as {what}",
                f.kind_name()
            )));
        }
        Ok(())
    }
}

impl TryFrom<Vec<Feature>> for Features {
    type Error = Error;

    fn try_from(value: Vec<Feature>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Features> for Vec<Feature> {
    fn from(value: Features) -> Self {
        value.0
    }
}

impl Pack for Features {
    fn pack(&self, buf: &mut Vec<u8>) {
        pack_u8_prefixed(self.0.iter(), buf);
    }
}

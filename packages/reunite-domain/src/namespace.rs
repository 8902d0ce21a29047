use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Logical partition of the vector store. Records in different namespaces are
/// never compared except by an explicit cross-namespace search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
	/// Identities registered by someone reporting a missing person.
	Report,
	/// Identities registered by someone who believes they found a match.
	Find,
	/// Provisional records written on a missed search, never registered into
	/// directly.
	Unconfirmed,
}

impl Namespace {
	pub const ALL: [Namespace; 3] = [Namespace::Report, Namespace::Find, Namespace::Unconfirmed];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Report => "report",
			Self::Find => "find",
			Self::Unconfirmed => "unconfirmed",
		}
	}

	/// Whether identities may be registered into or searched in this
	/// namespace. The two populations are `report` and `find`; `unconfirmed`
	/// is only ever written by the engine itself.
	pub fn is_population(&self) -> bool {
		matches!(self, Self::Report | Self::Find)
	}

	/// The opposite population for the paired report/find workflow. A "find"
	/// submission searches "report" and vice versa.
	pub fn counterpart(&self) -> Option<Namespace> {
		match self {
			Self::Report => Some(Self::Find),
			Self::Find => Some(Self::Report),
			Self::Unconfirmed => None,
		}
	}
}

impl fmt::Display for Namespace {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Namespace {
	type Err = UnknownNamespace;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"report" => Ok(Self::Report),
			"find" => Ok(Self::Find),
			"unconfirmed" => Ok(Self::Unconfirmed),
			other => Err(UnknownNamespace { raw: other.to_string() }),
		}
	}
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown namespace: {raw}.")]
pub struct UnknownNamespace {
	pub raw: String,
}

use serde_json::{Value, json};

use crate::{EMPLOYER_FIELD, STATE_FIELD};

/// The query shapes issued against the index.
///
/// Every clause is a `match` query, so values go through the engine's analyzer
/// (tokenization, case folding) instead of being compared byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
	Region { region: String },
	RegionAndEmployer { region: String, employer: String },
}
impl SearchQuery {
	pub fn by_region(region: impl Into<String>) -> Self {
		Self::Region { region: region.into() }
	}

	pub fn by_region_and_employer(region: impl Into<String>, employer: impl Into<String>) -> Self {
		Self::RegionAndEmployer { region: region.into(), employer: employer.into() }
	}

	/// Request body for the `_search` endpoint. No `size` is sent, so the engine's
	/// default page size applies.
	pub fn to_body(&self) -> Value {
		json!({ "query": self.clause() })
	}

	fn clause(&self) -> Value {
		match self {
			Self::Region { region } => match_clause(STATE_FIELD, region),
			Self::RegionAndEmployer { region, employer } => json!({
				"bool": {
					"must": [
						match_clause(STATE_FIELD, region),
						match_clause(EMPLOYER_FIELD, employer),
					]
				}
			}),
		}
	}
}

fn match_clause(field: &str, value: &str) -> Value {
	json!({ "match": { field: value } })
}

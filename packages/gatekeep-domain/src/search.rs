//! Parameters and result envelope for the vector similarity search action.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cosine distance spans `[0, 2]`.
pub const MAX_DISTANCE: f64 = 2.0;

#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
	pub vector_dim: u32,
	pub max_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
	#[error("parameters must be a JSON object.")]
	NotAnObject,
	#[error("parameters.{field} is required.")]
	Missing { field: &'static str },
	#[error("parameters.{field} {reason}")]
	Invalid { field: &'static str, reason: String },
}
impl ParamError {
	pub fn field(&self) -> Option<&'static str> {
		match self {
			Self::NotAnObject => None,
			Self::Missing { field } | Self::Invalid { field, .. } => Some(field),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
	pub embedding: Vec<f32>,
	pub similarity_threshold: f64,
	pub limit: u32,
}
impl SearchParams {
	pub fn from_value(value: &Value, limits: &SearchLimits) -> Result<Self, ParamError> {
		let object = value.as_object().ok_or(ParamError::NotAnObject)?;
		let embedding = object
			.get("embedding")
			.filter(|value| !value.is_null())
			.ok_or(ParamError::Missing { field: "embedding" })?;
		let threshold = object
			.get("similarity_threshold")
			.filter(|value| !value.is_null())
			.ok_or(ParamError::Missing { field: "similarity_threshold" })?;
		let limit = object
			.get("limit")
			.filter(|value| !value.is_null())
			.ok_or(ParamError::Missing { field: "limit" })?;

		Ok(Self {
			embedding: parse_embedding(embedding, limits.vector_dim)?,
			similarity_threshold: parse_threshold(threshold)?,
			limit: parse_limit(limit, limits.max_limit)?,
		})
	}

	pub fn query_params(&self) -> QueryParams {
		QueryParams { limit: self.limit, threshold: self.similarity_threshold }
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
	pub id: String,
	pub content: String,
	pub distance: f64,
	#[serde(default)]
	pub metadata: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
	pub limit: u32,
	pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEnvelope {
	pub matches: Vec<SearchMatch>,
	pub total_results: usize,
	pub query_params: QueryParams,
}
impl SearchEnvelope {
	/// One sentence suitable for reading back to a person.
	pub fn summary(&self) -> String {
		match self.total_results {
			0 => "No matching results found.".to_string(),
			1 => "Found 1 matching result.".to_string(),
			n => format!("Found {n} matching results."),
		}
	}
}

/// Normalizes raw matches: ascending distance, ties broken by id, capped at the requested limit.
pub fn format_results(params: &SearchParams, mut matches: Vec<SearchMatch>) -> SearchEnvelope {
	matches.sort_by(|left, right| match left.distance.total_cmp(&right.distance) {
		Ordering::Equal => left.id.cmp(&right.id),
		other => other,
	});
	matches.truncate(params.limit as usize);

	SearchEnvelope {
		total_results: matches.len(),
		matches,
		query_params: params.query_params(),
	}
}

fn parse_embedding(value: &Value, vector_dim: u32) -> Result<Vec<f32>, ParamError> {
	let items = value.as_array().ok_or_else(|| ParamError::Invalid {
		field: "embedding",
		reason: "must be an array of numbers.".to_string(),
	})?;

	if items.is_empty() {
		return Err(ParamError::Invalid {
			field: "embedding",
			reason: "must be non-empty.".to_string(),
		});
	}
	if items.len() != vector_dim as usize {
		return Err(ParamError::Invalid {
			field: "embedding",
			reason: format!("must have {vector_dim} dimensions, got {}.", items.len()),
		});
	}

	let mut out = Vec::with_capacity(items.len());

	for item in items {
		// Values beyond f32 range become infinite after the cast.
		let number = item
			.as_f64()
			.map(|number| number as f32)
			.filter(|number| number.is_finite())
			.ok_or_else(|| ParamError::Invalid {
				field: "embedding",
				reason: "must contain only finite numbers within single precision range."
					.to_string(),
			})?;

		out.push(number);
	}

	Ok(out)
}

fn parse_threshold(value: &Value) -> Result<f64, ParamError> {
	let threshold = value.as_f64().filter(|number| number.is_finite()).ok_or_else(|| {
		ParamError::Invalid {
			field: "similarity_threshold",
			reason: "must be a finite number.".to_string(),
		}
	})?;

	if !(0.0..=MAX_DISTANCE).contains(&threshold) {
		return Err(ParamError::Invalid {
			field: "similarity_threshold",
			reason: format!("must be in the range 0-{MAX_DISTANCE}."),
		});
	}

	Ok(threshold)
}

fn parse_limit(value: &Value, max_limit: u32) -> Result<u32, ParamError> {
	let limit = value.as_u64().ok_or_else(|| ParamError::Invalid {
		field: "limit",
		reason: "must be a positive integer.".to_string(),
	})?;

	if limit == 0 || limit > u64::from(max_limit) {
		return Err(ParamError::Invalid {
			field: "limit",
			reason: format!("must be in the range 1-{max_limit}."),
		});
	}

	// Bounded by max_limit above.
	Ok(limit as u32)
}

use serde_json::Value;
use sqlx::PgPool;

use gatekeep_domain::{SearchEnvelope, SearchLimits, SearchMatch, SearchParams, format_results};
use gatekeep_storage::documents;

use crate::{ActionError, ActionExecutor, ActionOutput, BoxFuture};

/// Where candidate documents come from.
pub trait DocumentSearch: Send + Sync {
	/// Matches within `params.similarity_threshold`, at most `params.limit` of them.
	fn search<'a>(
		&'a self,
		params: &'a SearchParams,
	) -> BoxFuture<'a, Result<Vec<SearchMatch>, ActionError>>;
}

/// pgvector cosine-distance search over the `documents` table.
#[derive(Clone, Debug)]
pub struct PgDocumentSearch {
	pool: PgPool,
}
impl PgDocumentSearch {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}
impl DocumentSearch for PgDocumentSearch {
	fn search<'a>(
		&'a self,
		params: &'a SearchParams,
	) -> BoxFuture<'a, Result<Vec<SearchMatch>, ActionError>> {
		Box::pin(async move {
			let hits = documents::search_documents(
				&self.pool,
				&params.embedding,
				params.similarity_threshold,
				params.limit,
			)
			.await
			.map_err(|err| ActionError::Failed { message: format!("Vector search failed: {err}") })?;

			Ok(hits
				.into_iter()
				.map(|hit| SearchMatch {
					id: hit.document_id,
					content: hit.content,
					distance: hit.distance,
					metadata: hit.metadata,
				})
				.collect())
		})
	}
}

pub struct VectorSearchAction<S> {
	source: S,
	limits: SearchLimits,
}
impl<S> VectorSearchAction<S>
where
	S: DocumentSearch,
{
	pub fn new(source: S, search: &gatekeep_config::Search) -> Self {
		Self {
			source,
			limits: SearchLimits { vector_dim: search.vector_dim, max_limit: search.max_limit },
		}
	}

	fn params(&self, parameters: &Value) -> Result<SearchParams, ActionError> {
		SearchParams::from_value(parameters, &self.limits).map_err(|err| {
			ActionError::InvalidParameters {
				field: err.field().map(ToString::to_string),
				message: err.to_string(),
			}
		})
	}
}
impl<S> ActionExecutor for VectorSearchAction<S>
where
	S: DocumentSearch,
{
	fn validate(&self, parameters: &Value) -> Result<(), ActionError> {
		self.params(parameters).map(|_| ())
	}

	fn execute<'a>(
		&'a self,
		parameters: &'a Value,
	) -> BoxFuture<'a, Result<ActionOutput, ActionError>> {
		Box::pin(async move {
			let params = self.params(parameters)?;
			let matches = self.source.search(&params).await?;
			let envelope = format_results(&params, matches);
			let summary = envelope.summary();
			let result = serde_json::to_value(&envelope).map_err(|err| ActionError::Failed {
				message: format!("Failed to encode search results: {err}"),
			})?;

			Ok(ActionOutput { result, summary })
		})
	}

	fn summarize(&self, result: &Value) -> String {
		match serde_json::from_value::<SearchEnvelope>(result.clone()) {
			Ok(envelope) => envelope.summary(),
			Err(_) => "The search completed.".to_string(),
		}
	}
}

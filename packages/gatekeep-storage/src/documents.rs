use serde_json::Value;
use sqlx::PgExecutor;

use crate::Result;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentHit {
	pub document_id: String,
	pub content: String,
	pub metadata: Value,
	pub distance: f64,
}

pub fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

pub async fn insert_document<'e, E>(
	executor: E,
	document_id: &str,
	content: &str,
	metadata: &Value,
	embedding: &[f32],
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO documents (document_id, content, metadata, embedding)
VALUES ($1, $2, $3, $4::text::vector)
ON CONFLICT (document_id) DO UPDATE
SET
	content = EXCLUDED.content,
	metadata = EXCLUDED.metadata,
	embedding = EXCLUDED.embedding",
	)
	.bind(document_id)
	.bind(content)
	.bind(metadata)
	.bind(vector_to_pg(embedding))
	.execute(executor)
	.await?;

	Ok(())
}

/// Cosine-distance search. Rows farther than `threshold` are dropped; closest first.
pub async fn search_documents<'e, E>(
	executor: E,
	embedding: &[f32],
	threshold: f64,
	limit: u32,
) -> Result<Vec<DocumentHit>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, DocumentHit>(
		"\
SELECT document_id, content, metadata, distance
FROM (
	SELECT
		document_id,
		content,
		metadata,
		(embedding <=> $1::text::vector)::float8 AS distance
	FROM documents
) AS scored
WHERE distance <= $2
ORDER BY distance ASC, document_id ASC
LIMIT $3",
	)
	.bind(vector_to_pg(embedding))
	.bind(threshold)
	.bind(i64::from(limit))
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

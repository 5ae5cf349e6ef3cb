use crate::schema::Document;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata key holding the id of the document a chunk came from.
pub const ORIG_DOC_ID_KEY: &str = "orig_doc_id";
/// Metadata key holding the name (`document_key_word`) of that document.
pub const ORIG_DOC_NAME_KEY: &str = "orig_doc_name";
/// Metadata key holding the chunk's important keywords.
pub const KEYWORDS_KEY: &str = "keywords";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chunk {
    pub content: String,
    pub content_ltks: String,
    pub document_id: String,
    pub document_key_word: String,
    pub highlight: String,
    pub id: String,
    pub image_id: String,
    pub important_keywords: Vec<String>,
    pub kb_id: String,
    pub positions: Vec<Value>,
    pub similarity: f64,
    pub term_similarity: f64,
    pub vector_similarity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocAgg {
    pub count: i64,
    pub doc_id: String,
    pub doc_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Data {
    pub chunks: Vec<Chunk>,
    pub doc_aggs: Vec<DocAgg>,
    pub total: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuccessResponse {
    pub code: i64,
    pub data: Data,
}

/// Body of a non-2xx reply. Only the message is used; `code` varies in type across versions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ErrorResponse {
    pub message: String,
}

impl Chunk {
    /// Maps the chunk onto a framework document. The document id is the
    /// parent document's id, so chunks of one file share it.
    pub fn to_doc(&self) -> Document {
        let mut doc = Document::new(self.document_id.clone(), self.content.clone());
        doc.with_score(self.similarity);
        set_org_doc_id(&mut doc, &self.document_id);
        set_keywords(&mut doc, &self.important_keywords);
        set_org_doc_name(&mut doc, &self.document_key_word);
        doc
    }
}

fn set_org_doc_id(doc: &mut Document, id: &str) {
    doc.meta_data
        .insert(ORIG_DOC_ID_KEY.to_string(), Value::from(id));
}

fn set_org_doc_name(doc: &mut Document, name: &str) {
    doc.meta_data
        .insert(ORIG_DOC_NAME_KEY.to_string(), Value::from(name));
}

fn set_keywords(doc: &mut Document, keywords: &[String]) {
    doc.meta_data
        .insert(KEYWORDS_KEY.to_string(), Value::from(keywords.to_vec()));
}

/// Id of the RAGFlow document the chunk was cut from; empty when unknown.
pub fn get_org_doc_id(doc: Option<&Document>) -> String {
    get_str(doc, ORIG_DOC_ID_KEY)
}

/// Name of the RAGFlow document the chunk was cut from; empty when unknown.
pub fn get_org_doc_name(doc: Option<&Document>) -> String {
    get_str(doc, ORIG_DOC_NAME_KEY)
}

/// Important keywords of the chunk; `None` when absent.
pub fn get_keywords(doc: Option<&Document>) -> Option<Vec<String>> {
    let values = doc?.meta_data.get(KEYWORDS_KEY)?.as_array()?;
    Some(
        values
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
    )
}

fn get_str(doc: Option<&Document>, key: &str) -> String {
    doc.and_then(|d| d.meta_data.get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chunk() -> Chunk {
        Chunk {
            content: "test content 1".to_string(),
            document_id: "1st".to_string(),
            document_key_word: "testName.file".to_string(),
            id: "1".to_string(),
            important_keywords: vec!["rust".to_string(), "ownership".to_string()],
            similarity: 0.8,
            ..Default::default()
        }
    }

    #[test]
    fn test_to_doc_uses_parent_document_id() {
        let doc = chunk().to_doc();
        assert_eq!(doc.id, "1st");
        assert_eq!(doc.content, "test content 1");
        assert_eq!(doc.score(), 0.8);
    }

    #[test]
    fn test_metadata_accessors() {
        let doc = chunk().to_doc();
        assert_eq!(get_org_doc_id(Some(&doc)), "1st");
        assert_eq!(get_org_doc_name(Some(&doc)), "testName.file");
        assert_eq!(
            get_keywords(Some(&doc)),
            Some(vec!["rust".to_string(), "ownership".to_string()])
        );
    }

    #[test]
    fn test_accessors_on_missing_metadata() {
        let doc = Document::new("x", "y");
        assert_eq!(get_org_doc_id(Some(&doc)), "");
        assert_eq!(get_org_doc_name(None), "");
        assert_eq!(get_keywords(Some(&doc)), None);
        assert_eq!(get_keywords(None), None);
    }

    #[test]
    fn test_decode_partial_chunk() {
        let resp: SuccessResponse = serde_json::from_value(json!({
            "code": 0,
            "data": {
                "chunks": [{"content": "c", "document_id": "d", "similarity": 0.5, "positions": [[1, 2, 3]]}],
                "doc_aggs": [{"count": 1, "doc_id": "d", "doc_name": "d.pdf"}],
                "total": 1
            }
        }))
        .unwrap();

        assert_eq!(resp.data.total, 1);
        assert_eq!(resp.data.chunks[0].document_id, "d");
        assert!(resp.data.chunks[0].important_keywords.is_empty());
        assert_eq!(resp.data.doc_aggs[0].doc_name, "d.pdf");
    }

    #[test]
    fn test_decode_error_envelope() {
        let err: ErrorResponse =
            serde_json::from_str(r#"{"code": "102", "message": "no dataset"}"#).unwrap();
        assert_eq!(err.message, "no dataset");

        let err: ErrorResponse = serde_json::from_str(r#"{"error":{"message":"x"}}"#).unwrap();
        assert!(err.message.is_empty());
    }
}

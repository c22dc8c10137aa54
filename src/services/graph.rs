use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{expect_success, join};
use crate::error::Result;
use crate::types::GraphNode;

const SERVICE: &str = "Neo4j";

/// Client for the graph database service.
#[derive(Clone)]
pub struct GraphClient {
    client: Client,
    base_url: String,
}

/// Body of a relation query: nodes reachable from a start node.
#[derive(Debug, Clone, Serialize)]
pub struct RelationQuery {
    pub start_label: Value,
    pub start_params: Value,
    pub end_label: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_params: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RelationRecord {
    #[serde(default)]
    r: Option<RelationEdge>,
    #[serde(default)]
    end_node: Option<GraphNode>,
}

#[derive(Debug, Deserialize)]
struct RelationEdge {
    #[serde(rename = "type")]
    kind: String,
}

/// Accepts either a bare list or an envelope with a `result` list.
fn into_list<T: for<'de> Deserialize<'de>>(value: Value) -> Result<Vec<T>> {
    let list = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => match map.remove("result") {
            Some(result @ Value::Array(_)) => result,
            _ => return Ok(Vec::new()),
        },
        _ => return Ok(Vec::new()),
    };
    Ok(serde_json::from_value(list)?)
}

impl GraphClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<Value> {
        let resp = self
            .client
            .post(join(&self.base_url, path))
            .json(body)
            .send()
            .await?;
        Ok(expect_success(SERVICE, resp).await?.json().await?)
    }

    pub async fn query_nodes(&self, label: &str, params: &Value) -> Result<Vec<GraphNode>> {
        let path = format!("/v1/neo4j/nodes/{label}/query");
        into_list(self.post(&path, params).await?)
    }

    pub async fn get_node(&self, label: &str, params: &Value) -> Result<Option<GraphNode>> {
        Ok(self.query_nodes(label, params).await?.into_iter().next())
    }

    pub async fn get_user(&self, username: &str) -> Result<Option<GraphNode>> {
        self.get_node("User", &json!({ "name": username })).await
    }

    pub async fn get_project(&self, code: &str) -> Result<Option<GraphNode>> {
        self.get_node("Container", &json!({ "code": code })).await
    }

    pub async fn list_projects(&self) -> Result<Vec<GraphNode>> {
        self.query_nodes("Container", &json!({ "is_all": true })).await
    }

    /// Type of the first relation between two nodes, if any.
    pub async fn get_relation_type(&self, start_id: i64, end_id: i64) -> Result<Option<String>> {
        let resp = self
            .client
            .get(join(&self.base_url, "/v1/neo4j/relations"))
            .query(&[("start_id", start_id), ("end_id", end_id)])
            .send()
            .await?;
        let value: Value = expect_success(SERVICE, resp).await?.json().await?;
        let records: Vec<RelationRecord> = into_list(value)?;
        Ok(records
            .into_iter()
            .next()
            .and_then(|record| record.r)
            .map(|edge| edge.kind))
    }

    /// End nodes of the relations matching `query`.
    pub async fn query_relations(&self, query: &RelationQuery) -> Result<Vec<GraphNode>> {
        let value = self.post("/v1/neo4j/relations/query", query).await?;
        let records: Vec<RelationRecord> = into_list(value)?;
        Ok(records.into_iter().filter_map(|r| r.end_node).collect())
    }

    /// Property query across labels, e.g. a folder inside one zone.
    pub async fn search_nodes(&self, query: &Value) -> Result<Vec<GraphNode>> {
        let value = self
            .post("/v2/neo4j/nodes/query", &json!({ "query": query }))
            .await?;
        into_list(value)
    }

    pub async fn get_nodes_by_geid(&self, geids: &[String]) -> Result<Vec<GraphNode>> {
        let value = self
            .post("/v1/neo4j/nodes/query/geids", &json!({ "geids": geids }))
            .await?;
        into_list(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_list_accepts_both_shapes() {
        let bare: Vec<GraphNode> = into_list(json!([{"id": 1, "labels": ["User"]}])).unwrap();
        assert_eq!(bare.len(), 1);

        let wrapped: Vec<GraphNode> =
            into_list(json!({"code": 200, "result": [{"id": 2}, {"id": 3}]})).unwrap();
        assert_eq!(wrapped[1].id, 3);

        let empty: Vec<GraphNode> = into_list(json!({"code": 200, "result": null})).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_relation_record_type() {
        let records: Vec<RelationRecord> = into_list(json!([
            {"r": {"type": "collaborator"}, "end_node": {"id": 9, "labels": ["Container"]}}
        ]))
        .unwrap();
        assert_eq!(records[0].r.as_ref().unwrap().kind, "collaborator");
        assert_eq!(records[0].end_node.as_ref().unwrap().id, 9);
    }

    #[test]
    fn test_relation_query_serializes_without_end_params() {
        let query = RelationQuery {
            start_label: json!("User"),
            start_params: json!({"name": "alice"}),
            end_label: json!("Dataset"),
            end_params: None,
        };
        let value = serde_json::to_value(&query).unwrap();
        assert!(value.get("end_params").is_none());
        assert_eq!(value["start_params"]["name"], "alice");
    }
}

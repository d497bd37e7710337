//! Typed endpoints for the project collection.

use serde::{Deserialize, Serialize};

use slate_types::{Credential, NewProject, Project, ProjectId};

use crate::{ApiClient, ClientError};

pub const PROJECTS_PATH: &str = "/api/projects";

/// Response wrapper used by every backend endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Clone)]
pub struct ProjectsApi {
    client: ApiClient,
}

impl ProjectsApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /api/projects`
    pub async fn list(&self, credential: Option<&Credential>) -> Result<Vec<Project>, ClientError> {
        let envelope: Envelope<Vec<Project>> = self.client.get(PROJECTS_PATH, credential).await?;
        Ok(envelope.data)
    }

    /// `POST /api/projects`
    pub async fn create(
        &self,
        draft: &NewProject,
        credential: Option<&Credential>,
    ) -> Result<Project, ClientError> {
        let envelope: Envelope<Project> = self
            .client
            .post(PROJECTS_PATH, draft, credential)
            .await?;
        Ok(envelope.data)
    }

    /// `DELETE /api/projects/{id}`, returning the deleted entity.
    pub async fn delete(
        &self,
        id: &ProjectId,
        credential: Option<&Credential>,
    ) -> Result<Project, ClientError> {
        let mut url = self.client.url(PROJECTS_PATH)?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidPath {
                path: format!("{PROJECTS_PATH}/{id}"),
            })?
            .push(id.as_str());
        let envelope: Envelope<Project> = self.client.delete_url(url, credential).await?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn project_json(id: &str, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "description": "",
            "created_at": "2025-03-01T12:00:00Z",
            "clerk_id": "user_1"
        })
    }

    async fn api(server: &MockServer) -> ProjectsApi {
        ProjectsApi::new(ApiClient::new(&server.uri()).unwrap())
    }

    #[tokio::test]
    async fn list_unwraps_data_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/projects"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [project_json("p2", "Beta"), project_json("p1", "Alpha")]
            })))
            .mount(&server)
            .await;

        let credential = Credential::new("tok").unwrap();
        let projects = api(&server).await.list(Some(&credential)).await.unwrap();
        let ids: Vec<&str> = projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p2", "p1"]);
    }

    #[tokio::test]
    async fn create_posts_name_and_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/projects"))
            .and(body_json(json!({ "name": "Alpha", "description": "A project" })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "data": project_json("p1", "Alpha") })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let created = api(&server)
            .await
            .create(&NewProject::new("Alpha", "A project"), None)
            .await
            .unwrap();
        assert_eq!(created.id, ProjectId::new("p1"));
        assert_eq!(created.name, "Alpha");
    }

    #[tokio::test]
    async fn delete_targets_id_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/projects/p1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": project_json("p1", "Alpha") })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let deleted = api(&server)
            .await
            .delete(&ProjectId::new("p1"), None)
            .await
            .unwrap();
        assert_eq!(deleted.id, ProjectId::new("p1"));
    }

    #[tokio::test]
    async fn delete_encodes_id_as_single_segment() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/projects/a%2Fb%20c"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": project_json("a/b c", "X") })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let deleted = api(&server)
            .await
            .delete(&ProjectId::new("a/b c"), None)
            .await
            .unwrap();
        assert_eq!(deleted.id.as_str(), "a/b c");
    }

    #[tokio::test]
    async fn missing_envelope_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([project_json("p1", "A")])))
            .mount(&server)
            .await;

        let err = api(&server).await.list(None).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
